//! OAuth 2.0 client: authorization URLs, code and refresh-token exchange, and
//! bearer-authenticated calls.
//!
//! Requests go through the same [`SecureRequestExecutor`] seam as the OAuth 1.0
//! client. Unlike OAuth 1.0 calls, 301 and 302 responses are handed back to
//! the caller untouched.

use base64::prelude::BASE64_STANDARD;
use base64::Engine;
use http::header::{
    HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_LENGTH, CONTENT_TYPE, USER_AGENT,
};
use http::{Method, StatusCode};
use url::Url;

use crate::config::{header_map, OAuth2ClientConfig, DEFAULT_CONTENT_TYPE, DEFAULT_USER_AGENT};
use crate::encoding::{decode_lossy, encode, encode_form};
use crate::executor::{ReqwestExecutor, SecureRequestExecutor};
use crate::params::ParameterSet;
use crate::request::merge_headers;
use crate::token_reader::{read_oauth2_token, OAuth2Token};
use crate::{ConfigError, Error, HttpRequest, HttpResponse, Result};

const CLIENT_ID_KEY: &str = "client_id";
const CLIENT_SECRET_KEY: &str = "client_secret";
const GRANT_TYPE_KEY: &str = "grant_type";
const CODE_KEY: &str = "code";
const REFRESH_TOKEN_KEY: &str = "refresh_token";

#[derive(Debug, Clone)]
pub struct OAuth2Client<E = ReqwestExecutor> {
    executor: E,
    config: OAuth2ClientConfig,
    headers: HeaderMap,
}

impl OAuth2Client<ReqwestExecutor> {
    /// Constructs a new `OAuth2Client` talking through `reqwest`, routed
    /// through the configured proxy.
    pub fn new(config: OAuth2ClientConfig) -> Result<Self> {
        let executor = ReqwestExecutor::with_proxy(&config.proxy)?;
        Self::with_executor(config, executor)
    }
}

impl<E> OAuth2Client<E>
where
    E: SecureRequestExecutor,
{
    pub fn with_executor(config: OAuth2ClientConfig, executor: E) -> Result<Self> {
        let headers = header_map(&config.custom_headers)?;
        Ok(OAuth2Client {
            executor,
            config,
            headers,
        })
    }

    pub fn config(&self) -> &OAuth2ClientConfig {
        &self.config
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    pub fn access_token_url(&self) -> String {
        format!("{}{}", self.config.base_site, self.config.access_token_path)
    }

    /// `<auth_method> <token>`, e.g. `Bearer abc`.
    pub fn build_auth_header(&self, token: &str) -> String {
        format!("{} {}", self.config.auth_method, token)
    }

    /// Where to send the resource owner; `client_id` is added to `params`.
    pub fn get_authorize_url(&self, params: ParameterSet) -> String {
        let mut params = params;
        params.set(CLIENT_ID_KEY, self.config.client_id.as_str());
        format!(
            "{}{}?{}",
            self.config.base_site,
            self.config.authorize_path,
            encode_form(params.iter())
        )
    }

    fn basic_authorization(&self) -> String {
        let credentials = format!("{}:{}", self.config.client_id, self.config.client_secret);
        format!("Basic {}", BASE64_STANDARD.encode(credentials))
    }

    /// Exchange an authorization code for tokens.
    ///
    /// With `grant_type=refresh_token` in `params`, `code` is sent as
    /// `refresh_token` instead of `code`; never both.
    pub async fn get_oauth_access_token(
        &self,
        code: &str,
        params: ParameterSet,
    ) -> Result<OAuth2Token> {
        let mut params = params;
        params.set(CLIENT_ID_KEY, self.config.client_id.as_str());
        params.set(CLIENT_SECRET_KEY, self.config.client_secret.as_str());
        let code_key = if params.get(GRANT_TYPE_KEY) == Some(REFRESH_TOKEN_KEY) {
            REFRESH_TOKEN_KEY
        } else {
            CODE_KEY
        };
        params.set(code_key, code);

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(DEFAULT_CONTENT_TYPE));
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&self.basic_authorization())
                .map_err(|_| ConfigError::InvalidHeader(AUTHORIZATION.to_string()))?,
        );
        let body = encode_form(params.iter()).into_bytes();
        let response = self
            .request(Method::POST, &self.access_token_url(), headers, body, None)
            .await?;
        Ok(read_oauth2_token(response.body)?)
    }

    /// GET with the token placed according to `use_authorization_header_for_get`.
    pub async fn get(&self, url: &str, access_token: &str) -> Result<HttpResponse> {
        if self.config.use_authorization_header_for_get {
            let mut headers = HeaderMap::new();
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&self.build_auth_header(access_token))
                    .map_err(|_| ConfigError::InvalidHeader(AUTHORIZATION.to_string()))?,
            );
            self.request(Method::GET, url, headers, Vec::new(), None)
                .await
        } else {
            self.get_protected_resource(url, access_token).await
        }
    }

    /// GET with the token in the query string.
    pub async fn get_protected_resource(
        &self,
        url: &str,
        access_token: &str,
    ) -> Result<HttpResponse> {
        self.request(Method::GET, url, HeaderMap::new(), Vec::new(), Some(access_token))
            .await
    }

    /// Send a request with the custom headers under `headers`.
    ///
    /// `access_token` goes into the query string as `access_token_name`,
    /// unless the merged headers already carry an Authorization header.
    /// 2xx, 301 and 302 responses are returned; anything else is an
    /// [`Error::Provider`].
    pub async fn request(
        &self,
        method: Method,
        url: &str,
        headers: HeaderMap,
        body: Vec<u8>,
        access_token: Option<&str>,
    ) -> Result<HttpResponse> {
        let mut url = Url::parse(url)?;
        let mut headers = merge_headers(vec![&self.headers, &headers]);
        if !headers.contains_key(USER_AGENT) {
            headers.insert(USER_AGENT, HeaderValue::from_static(DEFAULT_USER_AGENT));
        }
        headers.insert(CONTENT_LENGTH, HeaderValue::from(body.len()));

        if let Some(token) = access_token.filter(|t| !t.is_empty()) {
            if !headers.contains_key(AUTHORIZATION) {
                let query = with_query_token(url.query(), &self.config.access_token_name, token);
                url.set_query(Some(&query));
            }
        }

        let mut request = HttpRequest::new(method, url);
        request.headers = headers;
        request.body = body;

        let response = self.executor.execute(request).await?;
        match response.status {
            status if status.is_success() => Ok(response),
            StatusCode::MOVED_PERMANENTLY | StatusCode::FOUND => Ok(response),
            status => Err(Error::Provider {
                status_code: status.as_u16(),
                body: response.body,
            }),
        }
    }
}

/// Append `name=token` to a raw query, dropping earlier values of `name`.
/// The remaining segments are kept byte for byte.
fn with_query_token(query: Option<&str>, name: &str, token: &str) -> String {
    let mut segments: Vec<String> = query
        .unwrap_or_default()
        .split('&')
        .filter(|segment| !segment.is_empty())
        .filter(|segment| decode_lossy(segment.split('=').next().unwrap_or_default()) != name)
        .map(str::to_string)
        .collect();
    segments.push(format!("{}={}", encode(name), encode(token)));
    segments.join("&")
}
