use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use http::header::{HeaderValue, LOCATION};
use http::StatusCode;
use oauth_libre::{Error, HttpRequest, HttpResponse, Result, SecureRequestExecutor};

#[derive(Default)]
struct State {
    responses: VecDeque<HttpResponse>,
    requests: Vec<HttpRequest>,
}

/// Records every request and answers from a script.
#[derive(Clone, Default)]
pub struct MockExecutor {
    state: Arc<Mutex<State>>,
}

#[allow(dead_code)]
impl MockExecutor {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn respond(&self, status: u16, body: &str) -> &Self {
        let status = StatusCode::from_u16(status).unwrap();
        self.push(HttpResponse::new(status, body))
    }

    pub fn redirect(&self, status: u16, location: &str) -> &Self {
        let mut response = HttpResponse::new(StatusCode::from_u16(status).unwrap(), "");
        response
            .headers
            .insert(LOCATION, HeaderValue::from_str(location).unwrap());
        self.push(response)
    }

    fn push(&self, response: HttpResponse) -> &Self {
        self.state.lock().unwrap().responses.push_back(response);
        self
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn last_request(&self) -> HttpRequest {
        self.requests().pop().expect("no request was sent")
    }
}

#[async_trait]
impl SecureRequestExecutor for MockExecutor {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        let mut state = self.state.lock().unwrap();
        state.requests.push(request);
        state
            .responses
            .pop_front()
            .ok_or_else(|| Error::Network("connection refused".into()))
    }
}

#[allow(dead_code)]
pub fn header(request: &HttpRequest, name: &str) -> String {
    request
        .headers
        .get(name)
        .map(|v| v.to_str().unwrap().to_string())
        .unwrap_or_default()
}

#[allow(dead_code)]
pub fn body(request: &HttpRequest) -> String {
    String::from_utf8(request.body.clone()).unwrap()
}
