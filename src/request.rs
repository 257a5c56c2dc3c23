use http::header::{HeaderMap, LOCATION};
use http::{Method, StatusCode};
use reqwest::{Client as ReqwestClient, RequestBuilder as ReqwestRequestBuilder};
use url::Url;

/// A fully prepared request, ready for a
/// [`SecureRequestExecutor`](crate::SecureRequestExecutor).
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl HttpRequest {
    pub fn new(method: Method, url: Url) -> Self {
        HttpRequest {
            method,
            url,
            headers: HeaderMap::new(),
            body: Vec::new(),
        }
    }

    /// Turn the request into reqwest's `RequestBuilder` without sending it.
    ///
    /// This is the hook for caller-driven uploads: a request obtained from
    /// [`OAuthClient::open_stream`](crate::OAuthClient::open_stream) carries no
    /// body, so the caller can attach a streaming one before sending.
    pub fn into_reqwest(self, client: &ReqwestClient) -> ReqwestRequestBuilder {
        let builder = client
            .request(self.method, self.url)
            .headers(self.headers);
        if self.body.is_empty() {
            builder
        } else {
            builder.body(self.body)
        }
    }
}

/// Status, headers and buffered body of a completed call.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl HttpResponse {
    pub fn new<T: Into<String>>(status: StatusCode, body: T) -> Self {
        HttpResponse {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// `Location` of a 301/302 response, if present.
    pub fn redirect_location(&self) -> Option<&str> {
        match self.status {
            StatusCode::MOVED_PERMANENTLY | StatusCode::FOUND => self
                .headers
                .get(LOCATION)
                .and_then(|value| value.to_str().ok()),
            _ => None,
        }
    }
}

/// Layer header maps left to right; a later map replaces every value an
/// earlier one holds for the same name.
pub(crate) fn merge_headers<'a, I>(layers: I) -> HeaderMap
where
    I: IntoIterator<Item = &'a HeaderMap>,
{
    let mut merged = HeaderMap::new();
    for layer in layers {
        merged.extend(layer.clone());
    }
    merged
}
