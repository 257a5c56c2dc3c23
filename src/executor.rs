use std::sync::Arc;

use async_trait::async_trait;
use regex::Regex;
use reqwest::redirect::Policy;
use reqwest::{Client as ReqwestClient, Proxy};

use crate::config::ProxySetting;
use crate::{ConfigError, HttpRequest, HttpResponse, Result};

/// Hosts known to close the connection before the body is complete or
/// without a Content-Length.
pub const DEFAULT_EARLY_CLOSE_HOSTS: &str = ".*google(apis)?.com$";

/// Performs the HTTP(S) I/O for the OAuth clients.
///
/// Implementations report transport failures as [`Error::Network`](crate::Error::Network)
/// and must not follow redirects themselves: the OAuth 1.0 client re-signs
/// for every redirect target.
#[async_trait]
pub trait SecureRequestExecutor: Send + Sync {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse>;
}

#[async_trait]
impl<T> SecureRequestExecutor for Arc<T>
where
    T: SecureRequestExecutor + ?Sized,
{
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        (**self).execute(request).await
    }
}

/// [`SecureRequestExecutor`] backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct ReqwestExecutor {
    inner: ReqwestClient,
    early_close_hosts: Option<Regex>,
}

impl ReqwestExecutor {
    /// Constructs an executor with redirects disabled.
    pub fn new() -> Result<Self> {
        let inner = ReqwestClient::builder().redirect(Policy::none()).build()?;
        Ok(Self::with_client(inner))
    }

    /// Constructs an executor routing through the given proxy setting.
    pub fn with_proxy(proxy: &ProxySetting) -> Result<Self> {
        let resolved = proxy.resolve();
        let mut builder = ReqwestClient::builder()
            .redirect(Policy::none())
            .no_proxy();
        if let Some(url) = resolved.http {
            builder = builder.proxy(
                Proxy::http(url.as_str()).map_err(|_| ConfigError::InvalidProxy(url.clone()))?,
            );
        }
        if let Some(url) = resolved.https {
            builder = builder.proxy(
                Proxy::https(url.as_str()).map_err(|_| ConfigError::InvalidProxy(url.clone()))?,
            );
        }
        Ok(Self::with_client(builder.build()?))
    }

    /// Constructs an executor around a pre-configured `reqwest::Client`
    /// (timeouts, TLS roots and so on). The client should not follow redirects.
    pub fn with_client(client: ReqwestClient) -> Self {
        ReqwestExecutor {
            inner: client,
            early_close_hosts: Regex::new(DEFAULT_EARLY_CLOSE_HOSTS).ok(),
        }
    }

    /// Replace the early-close host pattern; `None` disables the tolerance.
    pub fn early_close_hosts(self, pattern: Option<Regex>) -> Self {
        ReqwestExecutor {
            early_close_hosts: pattern,
            ..self
        }
    }

    pub fn allows_early_close(&self, host: &str) -> bool {
        self.early_close_hosts
            .as_ref()
            .map(|pattern| pattern.is_match(host))
            .unwrap_or(false)
    }

    pub fn client(&self) -> &ReqwestClient {
        &self.inner
    }
}

#[async_trait]
impl SecureRequestExecutor for ReqwestExecutor {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        let host = request.url.host_str().unwrap_or_default().to_string();
        let allow_early_close = self.allows_early_close(&host);
        tracing::debug!(method = %request.method, url = %request.url, "sending request");

        let mut response = request.into_reqwest(&self.inner).send().await?;
        let status = response.status();
        let headers = response.headers().clone();

        let mut body = Vec::new();
        loop {
            match response.chunk().await {
                Ok(Some(chunk)) => body.extend_from_slice(&chunk),
                Ok(None) => break,
                Err(err) if allow_early_close => {
                    tracing::debug!(
                        %host,
                        error = %err,
                        "connection closed early, keeping received body"
                    );
                    break;
                }
                Err(err) => return Err(err.into()),
            }
        }

        Ok(HttpResponse {
            status,
            headers,
            body: String::from_utf8_lossy(&body).into_owned(),
        })
    }
}
