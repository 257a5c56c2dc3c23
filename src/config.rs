//! Immutable client configuration.
//!
//! Every config derives `Deserialize` with field defaults, so a partial
//! document (for instance only `follow_redirects = false` under
//! `client_options`) merges over the defaults.

use std::collections::BTreeMap;
use std::fmt;

use http::header::{HeaderMap, HeaderName, HeaderValue};
use http::Method;
use serde::{Deserialize, Deserializer};

use crate::nonce::DEFAULT_NONCE_SIZE;
use crate::ConfigError;

pub const DEFAULT_VERSION: &str = "1.0";
pub const DEFAULT_CALLBACK: &str = "oob";
pub const DEFAULT_SIGNATURE_METHOD: &str = "HMAC-SHA1";
pub const DEFAULT_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
pub const DEFAULT_USER_AGENT: &str = "oauth-libre";
pub const DEFAULT_MAX_REDIRECTS: usize = 5;

fn default_version() -> String {
    DEFAULT_VERSION.to_string()
}

fn default_callback() -> Option<String> {
    Some(DEFAULT_CALLBACK.to_string())
}

fn default_signature_method() -> String {
    DEFAULT_SIGNATURE_METHOD.to_string()
}

fn default_nonce_size() -> usize {
    DEFAULT_NONCE_SIZE
}

fn default_post() -> Method {
    Method::POST
}

fn default_true() -> bool {
    true
}

fn default_max_redirects() -> usize {
    DEFAULT_MAX_REDIRECTS
}

fn deserialize_method<'de, D>(deserializer: D) -> Result<Method, D::Error>
where
    D: Deserializer<'de>,
{
    let name = String::deserialize(deserializer)?;
    Method::from_bytes(name.to_uppercase().as_bytes()).map_err(serde::de::Error::custom)
}

/// Transport behaviour of an OAuth 1.0 client.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClientOptions {
    #[serde(deserialize_with = "deserialize_method")]
    pub request_token_http_method: Method,
    #[serde(deserialize_with = "deserialize_method")]
    pub access_token_http_method: Method,
    pub follow_redirects: bool,
    pub max_redirects: usize,
}

impl Default for ClientOptions {
    fn default() -> Self {
        ClientOptions {
            request_token_http_method: default_post(),
            access_token_http_method: default_post(),
            follow_redirects: default_true(),
            max_redirects: default_max_redirects(),
        }
    }
}

impl ClientOptions {
    pub fn request_token_http_method(self, method: Method) -> Self {
        ClientOptions {
            request_token_http_method: method,
            ..self
        }
    }

    pub fn access_token_http_method(self, method: Method) -> Self {
        ClientOptions {
            access_token_http_method: method,
            ..self
        }
    }

    pub fn follow_redirects(self, follow_redirects: bool) -> Self {
        ClientOptions {
            follow_redirects,
            ..self
        }
    }

    pub fn max_redirects(self, max_redirects: usize) -> Self {
        ClientOptions {
            max_redirects,
            ..self
        }
    }
}

/// One OAuth 1.0 provider relationship.
#[derive(Clone, Deserialize)]
pub struct OAuthClientConfig {
    pub request_url: String,
    pub access_url: String,
    pub consumer_key: String,
    /// Shared secret, or the PEM private key under RSA-SHA1.
    pub consumer_secret: String,
    /// An empty version leaves `oauth_version` out entirely.
    #[serde(default = "default_version")]
    pub version: String,
    /// `None` never sends `oauth_callback`.
    #[serde(default = "default_callback")]
    pub callback: Option<String>,
    #[serde(default = "default_signature_method")]
    pub signature_method: String,
    #[serde(default = "default_nonce_size")]
    pub nonce_size: usize,
    /// Replaces the default header set when given.
    #[serde(default)]
    pub custom_headers: Option<BTreeMap<String, String>>,
    #[serde(default)]
    pub client_options: ClientOptions,
}

impl OAuthClientConfig {
    pub fn new<T1, T2, T3, T4>(
        request_url: T1,
        access_url: T2,
        consumer_key: T3,
        consumer_secret: T4,
    ) -> Self
    where
        T1: Into<String>,
        T2: Into<String>,
        T3: Into<String>,
        T4: Into<String>,
    {
        OAuthClientConfig {
            request_url: request_url.into(),
            access_url: access_url.into(),
            consumer_key: consumer_key.into(),
            consumer_secret: consumer_secret.into(),
            version: default_version(),
            callback: default_callback(),
            signature_method: default_signature_method(),
            nonce_size: default_nonce_size(),
            custom_headers: None,
            client_options: ClientOptions::default(),
        }
    }

    pub fn version<T: Into<String>>(self, version: T) -> Self {
        OAuthClientConfig {
            version: version.into(),
            ..self
        }
    }

    pub fn callback<T: Into<String>>(self, callback: Option<T>) -> Self {
        OAuthClientConfig {
            callback: callback.map(Into::into),
            ..self
        }
    }

    pub fn signature_method<T: Into<String>>(self, signature_method: T) -> Self {
        OAuthClientConfig {
            signature_method: signature_method.into(),
            ..self
        }
    }

    pub fn nonce_size(self, nonce_size: usize) -> Self {
        OAuthClientConfig { nonce_size, ..self }
    }

    pub fn custom_headers(self, headers: BTreeMap<String, String>) -> Self {
        OAuthClientConfig {
            custom_headers: Some(headers),
            ..self
        }
    }

    pub fn client_options(self, client_options: ClientOptions) -> Self {
        OAuthClientConfig {
            client_options,
            ..self
        }
    }
}

impl fmt::Debug for OAuthClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuthClientConfig")
            .field("request_url", &self.request_url)
            .field("access_url", &self.access_url)
            .field("consumer_key", &self.consumer_key)
            .field("consumer_secret", &"<redacted>")
            .field("version", &self.version)
            .field("callback", &self.callback)
            .field("signature_method", &self.signature_method)
            .field("nonce_size", &self.nonce_size)
            .field("custom_headers", &self.custom_headers)
            .field("client_options", &self.client_options)
            .finish()
    }
}

/// OAuth Echo: requests are signed for `verify_credentials` and the header is
/// handed to a third party in `X-Verify-Credentials-Authorization`.
#[derive(Clone, Deserialize)]
pub struct EchoConfig {
    pub realm: String,
    pub verify_credentials: String,
    pub consumer_key: String,
    pub consumer_secret: String,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default = "default_signature_method")]
    pub signature_method: String,
    #[serde(default = "default_nonce_size")]
    pub nonce_size: usize,
    #[serde(default)]
    pub custom_headers: Option<BTreeMap<String, String>>,
}

impl EchoConfig {
    pub fn new<T1, T2, T3, T4>(
        realm: T1,
        verify_credentials: T2,
        consumer_key: T3,
        consumer_secret: T4,
    ) -> Self
    where
        T1: Into<String>,
        T2: Into<String>,
        T3: Into<String>,
        T4: Into<String>,
    {
        EchoConfig {
            realm: realm.into(),
            verify_credentials: verify_credentials.into(),
            consumer_key: consumer_key.into(),
            consumer_secret: consumer_secret.into(),
            version: default_version(),
            signature_method: default_signature_method(),
            nonce_size: default_nonce_size(),
            custom_headers: None,
        }
    }

    pub fn signature_method<T: Into<String>>(self, signature_method: T) -> Self {
        EchoConfig {
            signature_method: signature_method.into(),
            ..self
        }
    }

    pub fn version<T: Into<String>>(self, version: T) -> Self {
        EchoConfig {
            version: version.into(),
            ..self
        }
    }
}

impl fmt::Debug for EchoConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EchoConfig")
            .field("realm", &self.realm)
            .field("verify_credentials", &self.verify_credentials)
            .field("consumer_key", &self.consumer_key)
            .field("consumer_secret", &"<redacted>")
            .field("version", &self.version)
            .field("signature_method", &self.signature_method)
            .field("nonce_size", &self.nonce_size)
            .field("custom_headers", &self.custom_headers)
            .finish()
    }
}

/// Where OAuth 2.0 requests get their proxy from.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProxySetting {
    /// Nothing configured: fall back to `HTTPS_PROXY` / `HTTP_PROXY`.
    Inherit,
    /// Explicitly no proxy, environment ignored.
    Disabled,
    Explicit(String),
}

impl Default for ProxySetting {
    fn default() -> Self {
        ProxySetting::Inherit
    }
}

/// Proxy URLs per target scheme.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedProxy {
    pub http: Option<String>,
    pub https: Option<String>,
}

impl ProxySetting {
    /// Resolve against the process environment.
    pub fn resolve(&self) -> ResolvedProxy {
        self.resolve_with(|name| std::env::var(name).ok())
    }

    /// Resolve with `lookup` standing in for the environment.
    pub fn resolve_with<F>(&self, lookup: F) -> ResolvedProxy
    where
        F: Fn(&str) -> Option<String>,
    {
        match self {
            ProxySetting::Disabled => ResolvedProxy::default(),
            ProxySetting::Explicit(url) => ResolvedProxy {
                http: Some(url.clone()),
                https: Some(url.clone()),
            },
            ProxySetting::Inherit => {
                let var = |names: &[&str]| {
                    names
                        .iter()
                        .filter_map(|name| lookup(name))
                        .find(|value| !value.is_empty())
                };
                let http = var(&["HTTP_PROXY", "http_proxy"]);
                let https = var(&["HTTPS_PROXY", "https_proxy"]).or_else(|| http.clone());
                ResolvedProxy { http, https }
            }
        }
    }
}

/// One OAuth 2.0 provider relationship.
#[derive(Clone, Deserialize)]
pub struct OAuth2ClientConfig {
    pub client_id: String,
    pub client_secret: String,
    pub base_site: String,
    #[serde(default = "default_authorize_path")]
    pub authorize_path: String,
    #[serde(default = "default_access_token_path")]
    pub access_token_path: String,
    #[serde(default = "default_access_token_name")]
    pub access_token_name: String,
    #[serde(default = "default_auth_method")]
    pub auth_method: String,
    #[serde(default)]
    pub custom_headers: BTreeMap<String, String>,
    #[serde(default)]
    pub use_authorization_header_for_get: bool,
    #[serde(default)]
    pub proxy: ProxySetting,
}

fn default_authorize_path() -> String {
    "/oauth/authorize".to_string()
}

fn default_access_token_path() -> String {
    "/oauth/access_token".to_string()
}

fn default_access_token_name() -> String {
    "access_token".to_string()
}

fn default_auth_method() -> String {
    "Bearer".to_string()
}

impl OAuth2ClientConfig {
    pub fn new<T1, T2, T3>(client_id: T1, client_secret: T2, base_site: T3) -> Self
    where
        T1: Into<String>,
        T2: Into<String>,
        T3: Into<String>,
    {
        OAuth2ClientConfig {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            base_site: base_site.into(),
            authorize_path: default_authorize_path(),
            access_token_path: default_access_token_path(),
            access_token_name: default_access_token_name(),
            auth_method: default_auth_method(),
            custom_headers: BTreeMap::new(),
            use_authorization_header_for_get: false,
            proxy: ProxySetting::default(),
        }
    }

    pub fn authorize_path<T: Into<String>>(self, path: T) -> Self {
        OAuth2ClientConfig {
            authorize_path: path.into(),
            ..self
        }
    }

    pub fn access_token_path<T: Into<String>>(self, path: T) -> Self {
        OAuth2ClientConfig {
            access_token_path: path.into(),
            ..self
        }
    }

    /// For providers that expect something other than `access_token` in the query.
    pub fn access_token_name<T: Into<String>>(self, name: T) -> Self {
        OAuth2ClientConfig {
            access_token_name: name.into(),
            ..self
        }
    }

    pub fn auth_method<T: Into<String>>(self, auth_method: T) -> Self {
        OAuth2ClientConfig {
            auth_method: auth_method.into(),
            ..self
        }
    }

    pub fn custom_headers(self, custom_headers: BTreeMap<String, String>) -> Self {
        OAuth2ClientConfig {
            custom_headers,
            ..self
        }
    }

    pub fn use_authorization_header_for_get(self, use_it: bool) -> Self {
        OAuth2ClientConfig {
            use_authorization_header_for_get: use_it,
            ..self
        }
    }

    pub fn proxy(self, proxy: ProxySetting) -> Self {
        OAuth2ClientConfig { proxy, ..self }
    }
}

impl fmt::Debug for OAuth2ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuth2ClientConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("base_site", &self.base_site)
            .field("authorize_path", &self.authorize_path)
            .field("access_token_path", &self.access_token_path)
            .field("access_token_name", &self.access_token_name)
            .field("auth_method", &self.auth_method)
            .field("custom_headers", &self.custom_headers)
            .field(
                "use_authorization_header_for_get",
                &self.use_authorization_header_for_get,
            )
            .field("proxy", &self.proxy)
            .finish()
    }
}

/// Headers sent by OAuth 1.0 clients when no custom set is configured.
pub fn default_oauth1_headers() -> BTreeMap<String, String> {
    let mut headers = BTreeMap::new();
    headers.insert("Accept".to_string(), "*/*".to_string());
    headers.insert("Connection".to_string(), "close".to_string());
    headers.insert("User-Agent".to_string(), DEFAULT_USER_AGENT.to_string());
    headers
}

/// Validate configured header names and values.
pub(crate) fn header_map(headers: &BTreeMap<String, String>) -> Result<HeaderMap, ConfigError> {
    let mut map = HeaderMap::new();
    for (name, value) in headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| ConfigError::InvalidHeader(name.clone()))?;
        let value = HeaderValue::from_str(value)
            .map_err(|_| ConfigError::InvalidHeader(format!("{}: {}", name, value)))?;
        map.insert(name, value);
    }
    Ok(map)
}
