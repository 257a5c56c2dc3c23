use std::collections::BTreeMap;

use http::header::{
    HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_LENGTH, CONTENT_TYPE,
};
use http::Method;
use url::Url;

use crate::config::{
    default_oauth1_headers, header_map, ClientOptions, EchoConfig, OAuthClientConfig,
    DEFAULT_CONTENT_TYPE,
};
use crate::encoding::{encode, encode_form};
use crate::executor::{ReqwestExecutor, SecureRequestExecutor};
use crate::params::ParameterSet;
use crate::request::merge_headers;
use crate::signer::{authorization_header, DEFAULT_PARAMETER_SEPARATOR};
use crate::token_reader::{read_oauth_token, AccessToken, RequestToken};
use crate::{
    ClientCredentials, ConfigError, Error, HttpRequest, HttpResponse, OAuthParameters, Result,
    SignatureMethod, Signer, OAUTH_CALLBACK_KEY, OAUTH_CONSUMER_KEY, OAUTH_NONCE_KEY,
    OAUTH_SIGNATURE_KEY, OAUTH_SIGNATURE_METHOD_KEY, OAUTH_TIMESTAMP_KEY, OAUTH_TOKEN_KEY,
    OAUTH_VERIFIER_KEY, OAUTH_VERSION_KEY,
};

/// Header carrying the signed credentials of an OAuth Echo request.
pub const X_VERIFY_CREDENTIALS_AUTHORIZATION: &str = "x-verify-credentials-authorization";

#[derive(Debug, Clone)]
enum Mode {
    Standard {
        request_url: String,
        access_url: String,
        callback: Option<String>,
    },
    Echo {
        realm: String,
        verify_credentials: String,
    },
}

/// Body of a POST, PUT or PATCH call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestBody {
    /// Sent as-is with the given (or default) content type.
    Raw(Vec<u8>),
    /// Signed together with the OAuth parameters and sent form-encoded.
    Form(ParameterSet),
}

impl From<&str> for RequestBody {
    fn from(body: &str) -> Self {
        RequestBody::Raw(body.as_bytes().to_vec())
    }
}

impl From<String> for RequestBody {
    fn from(body: String) -> Self {
        RequestBody::Raw(body.into_bytes())
    }
}

impl From<Vec<u8>> for RequestBody {
    fn from(body: Vec<u8>) -> Self {
        RequestBody::Raw(body)
    }
}

impl From<ParameterSet> for RequestBody {
    fn from(params: ParameterSet) -> Self {
        RequestBody::Form(params)
    }
}

/// What a single signed call sends, before signing.
struct Outgoing<'a> {
    method: Method,
    url: &'a str,
    extra: ParameterSet,
    body: Option<Vec<u8>>,
    content_type: Option<&'a str>,
}

/// OAuth 1.0 / 1.0a client.
///
/// The client holds configuration only. Tokens are passed to every call, so
/// one instance can serve any number of users and concurrent requests.
///
/// ```no_run
/// # async fn run() -> oauth_libre::Result<()> {
/// use oauth_libre::{OAuthClient, OAuthClientConfig, ParameterSet};
///
/// let client = OAuthClient::new(OAuthClientConfig::new(
///     "https://api.twitter.com/oauth/request_token",
///     "https://api.twitter.com/oauth/access_token",
///     "[CONSUMER_KEY]",
///     "[CONSUMER_SECRET]",
/// ))?;
///
/// let request_token = client.get_request_token(ParameterSet::new()).await?;
/// // send the user to the provider, collect the verifier...
/// let access_token = client
///     .get_access_token(
///         &request_token.oauth_token,
///         &request_token.oauth_token_secret,
///         Some("[VERIFIER]"),
///         ParameterSet::new(),
///     )
///     .await?;
///
/// let timeline = client
///     .get(
///         "https://api.twitter.com/1.1/statuses/home_timeline.json",
///         &access_token.oauth_token,
///         &access_token.oauth_token_secret,
///     )
///     .await?;
/// println!("{}", timeline.body);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct OAuthClient<E = ReqwestExecutor> {
    executor: E,
    signer: Signer,
    mode: Mode,
    version: String,
    nonce_size: usize,
    headers: HeaderMap,
    default_content_type: HeaderValue,
    parameter_separator: String,
    client_options: ClientOptions,
    parameters: OAuthParameters,
}

impl OAuthClient<ReqwestExecutor> {
    /// Constructs a new `OAuthClient` talking through `reqwest`.
    pub fn new(config: OAuthClientConfig) -> Result<Self> {
        Self::with_executor(config, ReqwestExecutor::new()?)
    }

    /// Constructs an OAuth Echo client talking through `reqwest`.
    pub fn echo(config: EchoConfig) -> Result<Self> {
        Self::echo_with_executor(config, ReqwestExecutor::new()?)
    }
}

fn build_signer(
    consumer_key: &str,
    consumer_secret: &str,
    signature_method: &str,
) -> Result<Signer> {
    let method: SignatureMethod = signature_method.parse()?;
    let credentials = ClientCredentials::new(consumer_key, consumer_secret, method)?;
    Ok(Signer::new(credentials, method))
}

fn build_headers(custom: Option<BTreeMap<String, String>>) -> Result<(HeaderMap, HeaderValue)> {
    let mut headers = header_map(&custom.unwrap_or_else(default_oauth1_headers))?;
    let content_type = headers
        .remove(CONTENT_TYPE)
        .unwrap_or_else(|| HeaderValue::from_static(DEFAULT_CONTENT_TYPE));
    Ok((headers, content_type))
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value).map_err(|_| ConfigError::InvalidHeader(value.to_string()).into())
}

fn carries_form_body(method: &Method) -> bool {
    *method == Method::POST || *method == Method::PUT || *method == Method::PATCH
}

impl<E> OAuthClient<E>
where
    E: SecureRequestExecutor,
{
    /// Constructs a new `OAuthClient` dispatching through `executor`.
    ///
    /// Fails on an unsupported signature method, an unreadable RSA key or an
    /// invalid custom header.
    pub fn with_executor(config: OAuthClientConfig, executor: E) -> Result<Self> {
        let signer = build_signer(
            &config.consumer_key,
            &config.consumer_secret,
            &config.signature_method,
        )?;
        let (headers, default_content_type) = build_headers(config.custom_headers)?;
        Ok(OAuthClient {
            executor,
            signer,
            mode: Mode::Standard {
                request_url: config.request_url,
                access_url: config.access_url,
                callback: config.callback,
            },
            version: config.version,
            nonce_size: config.nonce_size,
            headers,
            default_content_type,
            parameter_separator: DEFAULT_PARAMETER_SEPARATOR.to_string(),
            client_options: config.client_options,
            parameters: OAuthParameters::new(),
        })
    }

    /// Constructs an OAuth Echo client dispatching through `executor`.
    ///
    /// Echo clients have no token endpoints; they only sign resource calls.
    pub fn echo_with_executor(config: EchoConfig, executor: E) -> Result<Self> {
        let signer = build_signer(
            &config.consumer_key,
            &config.consumer_secret,
            &config.signature_method,
        )?;
        let (headers, default_content_type) = build_headers(config.custom_headers)?;
        Ok(OAuthClient {
            executor,
            signer,
            mode: Mode::Echo {
                realm: config.realm,
                verify_credentials: config.verify_credentials,
            },
            version: config.version,
            nonce_size: config.nonce_size,
            headers,
            default_content_type,
            parameter_separator: DEFAULT_PARAMETER_SEPARATOR.to_string(),
            client_options: ClientOptions::default(),
            parameters: OAuthParameters::new(),
        })
    }

    /// Pin `oauth_nonce` / `oauth_timestamp` instead of generating them.
    pub fn with_parameters(self, parameters: OAuthParameters) -> Self {
        OAuthClient { parameters, ..self }
    }

    /// Separator between the items of the Authorization header.
    pub fn with_parameter_separator<T: Into<String>>(self, separator: T) -> Self {
        OAuthClient {
            parameter_separator: separator.into(),
            ..self
        }
    }

    /// Content type used when a call does not name one.
    pub fn with_default_content_type(self, content_type: &str) -> Result<Self> {
        Ok(OAuthClient {
            default_content_type: header_value(content_type)?,
            ..self
        })
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    pub fn signature_method(&self) -> SignatureMethod {
        self.signer.method()
    }

    pub fn is_echo(&self) -> bool {
        matches!(self.mode, Mode::Echo { .. })
    }

    /// Obtain temporary credentials from the request-token endpoint.
    ///
    /// The configured callback is sent as `oauth_callback`.
    pub async fn get_request_token(&self, extra: ParameterSet) -> Result<RequestToken> {
        let (request_url, callback) = match &self.mode {
            Mode::Standard {
                request_url,
                callback,
                ..
            } => (request_url, callback),
            Mode::Echo { .. } => return Err(ConfigError::MissingEndpoint("request token").into()),
        };
        let mut extra = extra;
        if let Some(callback) = callback {
            extra.set(OAUTH_CALLBACK_KEY, callback.as_str());
        }
        let outgoing = Outgoing {
            method: self.client_options.request_token_http_method.clone(),
            url: request_url,
            extra,
            body: None,
            content_type: None,
        };
        let response = self.perform_secure_request(None, None, outgoing).await?;
        let token = read_oauth_token(response.body)?;
        tracing::debug!(extra_fields = token.remain.len(), "received request token");
        Ok(token)
    }

    /// Exchange temporary credentials (and the verifier, for 1.0a) for token
    /// credentials.
    ///
    /// Any `Some` verifier is signed and sent, including an empty one.
    pub async fn get_access_token(
        &self,
        token: &str,
        token_secret: &str,
        verifier: Option<&str>,
        extra: ParameterSet,
    ) -> Result<AccessToken> {
        let access_url = match &self.mode {
            Mode::Standard { access_url, .. } => access_url,
            Mode::Echo { .. } => return Err(ConfigError::MissingEndpoint("access token").into()),
        };
        let mut extra = extra;
        if let Some(verifier) = verifier {
            extra.set(OAUTH_VERIFIER_KEY, verifier);
        }
        let outgoing = Outgoing {
            method: self.client_options.access_token_http_method.clone(),
            url: access_url,
            extra,
            body: None,
            content_type: None,
        };
        let response = self
            .perform_secure_request(Some(token), Some(token_secret), outgoing)
            .await?;
        let token = read_oauth_token(response.body)?;
        tracing::debug!(extra_fields = token.remain.len(), "received access token");
        Ok(token)
    }

    /// Signed call with any method and no body.
    pub async fn get_protected_resource(
        &self,
        url: &str,
        method: Method,
        token: &str,
        token_secret: &str,
    ) -> Result<HttpResponse> {
        let outgoing = Outgoing {
            method,
            url,
            extra: ParameterSet::new(),
            body: Some(Vec::new()),
            content_type: None,
        };
        self.perform_secure_request(Some(token), Some(token_secret), outgoing)
            .await
    }

    pub async fn get(&self, url: &str, token: &str, token_secret: &str) -> Result<HttpResponse> {
        self.get_protected_resource(url, Method::GET, token, token_secret)
            .await
    }

    pub async fn delete(&self, url: &str, token: &str, token_secret: &str) -> Result<HttpResponse> {
        self.get_protected_resource(url, Method::DELETE, token, token_secret)
            .await
    }

    /// Signed POST.
    ///
    /// A [`RequestBody::Form`] is signed along with the OAuth parameters and
    /// sent as `application/x-www-form-urlencoded` whatever `content_type`
    /// says; a raw body is sent untouched.
    pub async fn post<B>(
        &self,
        url: &str,
        token: &str,
        token_secret: &str,
        body: B,
        content_type: Option<&str>,
    ) -> Result<HttpResponse>
    where
        B: Into<RequestBody> + Send,
    {
        self.put_or_post(Method::POST, url, token, token_secret, body.into(), content_type)
            .await
    }

    /// Signed PUT, with the body rules of [`post`](Self::post).
    pub async fn put<B>(
        &self,
        url: &str,
        token: &str,
        token_secret: &str,
        body: B,
        content_type: Option<&str>,
    ) -> Result<HttpResponse>
    where
        B: Into<RequestBody> + Send,
    {
        self.put_or_post(Method::PUT, url, token, token_secret, body.into(), content_type)
            .await
    }

    /// Signed PATCH, with the body rules of [`post`](Self::post).
    pub async fn patch<B>(
        &self,
        url: &str,
        token: &str,
        token_secret: &str,
        body: B,
        content_type: Option<&str>,
    ) -> Result<HttpResponse>
    where
        B: Into<RequestBody> + Send,
    {
        self.put_or_post(Method::PATCH, url, token, token_secret, body.into(), content_type)
            .await
    }

    async fn put_or_post(
        &self,
        method: Method,
        url: &str,
        token: &str,
        token_secret: &str,
        body: RequestBody,
        content_type: Option<&str>,
    ) -> Result<HttpResponse> {
        let outgoing = match body {
            RequestBody::Raw(body) => Outgoing {
                method,
                url,
                extra: ParameterSet::new(),
                body: Some(body),
                content_type,
            },
            RequestBody::Form(params) => Outgoing {
                method,
                url,
                extra: params,
                body: None,
                content_type: Some(DEFAULT_CONTENT_TYPE),
            },
        };
        self.perform_secure_request(Some(token), Some(token_secret), outgoing)
            .await
    }

    /// Sign a request without sending it.
    ///
    /// The returned request carries the Authorization and Content-Type headers
    /// but neither a body nor a Content-Length, so the caller can stream the
    /// upload through [`HttpRequest::into_reqwest`].
    pub fn open_stream(
        &self,
        method: Method,
        url: &str,
        token: &str,
        token_secret: &str,
        content_type: Option<&str>,
    ) -> Result<HttpRequest> {
        self.signed_request(
            Some(token),
            Some(token_secret),
            &method,
            url,
            &ParameterSet::new(),
            content_type,
        )
    }

    /// `url` with every signed parameter appended to its query, ready to be
    /// handed out as a link. `method` defaults to GET.
    pub fn sign_url(
        &self,
        url: &str,
        token: Option<&str>,
        token_secret: Option<&str>,
        method: Option<Method>,
    ) -> Result<String> {
        let method = method.unwrap_or(Method::GET);
        let ordered =
            self.prepare_parameters(token, token_secret, &method, url, &ParameterSet::new())?;
        let parsed = Url::parse(url)?;
        let query = ordered
            .iter()
            .map(|(k, v)| format!("{}={}", k, encode(v)))
            .collect::<Vec<_>>()
            .join("&");
        let port = parsed
            .port()
            .map(|p| format!(":{}", p))
            .unwrap_or_default();
        Ok(format!(
            "{}://{}{}{}?{}",
            parsed.scheme(),
            parsed.host_str().unwrap_or_default(),
            port,
            parsed.path(),
            query
        ))
    }

    /// The Authorization header value a call to `url` would carry.
    pub fn auth_header(
        &self,
        url: &str,
        token: Option<&str>,
        token_secret: Option<&str>,
        method: Option<Method>,
    ) -> Result<String> {
        let method = method.unwrap_or(Method::GET);
        let ordered =
            self.prepare_parameters(token, token_secret, &method, url, &ParameterSet::new())?;
        Ok(self.build_authorization_header(&ordered))
    }

    /// Assemble and sign the parameters of one call.
    ///
    /// The OAuth parameters are overlaid with `extra`, then with the query of
    /// `url`; the result is sorted by name and value with `oauth_signature`
    /// appended last. Echo clients sign the OAuth parameters alone, against
    /// `GET` and their `verify_credentials` URL.
    pub fn prepare_parameters(
        &self,
        token: Option<&str>,
        token_secret: Option<&str>,
        method: &Method,
        url: &str,
        extra: &ParameterSet,
    ) -> Result<Vec<(String, String)>> {
        let mut params = ParameterSet::new();
        params.push(OAUTH_TIMESTAMP_KEY, self.parameters.resolve_timestamp());
        params.push(OAUTH_NONCE_KEY, self.parameters.resolve_nonce(self.nonce_size));
        if !self.version.is_empty() {
            params.push(OAUTH_VERSION_KEY, self.version.as_str());
        }
        params.push(OAUTH_SIGNATURE_METHOD_KEY, self.signer.method().as_str());
        params.push(OAUTH_CONSUMER_KEY, self.signer.credentials().consumer_key());
        if let Some(token) = token.filter(|t| !t.is_empty()) {
            params.push(OAUTH_TOKEN_KEY, token);
        }

        let signature = match &self.mode {
            Mode::Echo {
                verify_credentials, ..
            } => self.signer.signature(
                Method::GET.as_str(),
                verify_credentials,
                &params.normalize(),
                token_secret,
            )?,
            Mode::Standard { .. } => {
                params.merge(extra.clone());
                if let Some(query) = Url::parse(url)?.query() {
                    params.merge(ParameterSet::parse_query(query));
                }
                self.signer
                    .signature(method.as_str(), url, &params.normalize(), token_secret)?
            }
        };

        let mut ordered = params.sorted();
        ordered.push((OAUTH_SIGNATURE_KEY.to_string(), signature));
        Ok(ordered)
    }

    fn build_authorization_header(&self, ordered: &[(String, String)]) -> String {
        let realm = match &self.mode {
            Mode::Echo { realm, .. } => Some(realm.as_str()),
            Mode::Standard { .. } => None,
        };
        authorization_header(
            ordered.iter().map(|(k, v)| (k.as_str(), v.as_str())),
            realm,
            &self.parameter_separator,
        )
    }

    fn signed_request(
        &self,
        token: Option<&str>,
        token_secret: Option<&str>,
        method: &Method,
        url: &str,
        extra: &ParameterSet,
        content_type: Option<&str>,
    ) -> Result<HttpRequest> {
        let ordered = self.prepare_parameters(token, token_secret, method, url, extra)?;
        let authorization = header_value(&self.build_authorization_header(&ordered))?;

        let mut per_request = HeaderMap::new();
        let content_type = match content_type {
            Some(content_type) => header_value(content_type)?,
            None => self.default_content_type.clone(),
        };
        per_request.insert(CONTENT_TYPE, content_type);

        let mut computed = HeaderMap::new();
        match self.mode {
            Mode::Echo { .. } => {
                computed.insert(
                    HeaderName::from_static(X_VERIFY_CREDENTIALS_AUTHORIZATION),
                    authorization,
                );
            }
            Mode::Standard { .. } => {
                computed.insert(AUTHORIZATION, authorization);
            }
        }

        let mut request = HttpRequest::new(method.clone(), Url::parse(url)?);
        request.headers = merge_headers(vec![&self.headers, &per_request, &computed]);
        Ok(request)
    }

    async fn perform_secure_request(
        &self,
        token: Option<&str>,
        token_secret: Option<&str>,
        outgoing: Outgoing<'_>,
    ) -> Result<HttpResponse> {
        let Outgoing {
            method,
            url,
            extra,
            body,
            content_type,
        } = outgoing;
        let body = match body {
            Some(body) => body,
            None if carries_form_body(&method) => {
                encode_form(extra.without_oauth_parameters().iter()).into_bytes()
            }
            None => Vec::new(),
        };

        let mut target = url.to_string();
        let mut redirects = 0;
        loop {
            let mut request =
                self.signed_request(token, token_secret, &method, &target, &extra, content_type)?;
            request
                .headers
                .insert(CONTENT_LENGTH, HeaderValue::from(body.len()));
            request.body = body.clone();

            let response = self.executor.execute(request).await?;
            if response.is_success() {
                return Ok(response);
            }
            if self.client_options.follow_redirects {
                if let Some(location) = response.redirect_location() {
                    if redirects >= self.client_options.max_redirects {
                        tracing::warn!(
                            limit = self.client_options.max_redirects,
                            url = %target,
                            "redirect limit reached"
                        );
                        return Err(Error::TooManyRedirects {
                            limit: self.client_options.max_redirects,
                        });
                    }
                    let next = Url::parse(&target)?.join(location)?;
                    tracing::debug!(
                        status = %response.status,
                        location = %next,
                        "following redirect"
                    );
                    redirects += 1;
                    target = next.to_string();
                    continue;
                }
            }
            return Err(Error::Provider {
                status_code: response.status.as_u16(),
                body: response.body,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_KEY: &str = include_str!("../tests/fixtures/rsa_private_key.pem");

    fn fixed() -> OAuthParameters {
        OAuthParameters::new()
            .nonce("ybHPeOEkAUJ3k2wJT9Xb43MjtSgTvKqp")
            .timestamp(1_272_399_856u64)
    }

    fn client() -> OAuthClient {
        OAuthClient::new(OAuthClientConfig::new(
            "http://foo.com/RequestToken",
            "http://foo.com/AccessToken",
            "consumerkey",
            "consumersecret",
        ))
        .unwrap()
        .with_parameters(fixed())
    }

    fn keys(ordered: &[(String, String)]) -> Vec<&str> {
        ordered.iter().map(|(k, _)| k.as_str()).collect()
    }

    #[test]
    fn rejects_unknown_signature_method() {
        let err = OAuthClient::new(
            OAuthClientConfig::new("http://r", "http://a", "k", "s")
                .signature_method("HMAC-SHA256"),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            Error::Configuration(ConfigError::UnsupportedSignatureMethod(_))
        ));
    }

    #[test]
    fn rejects_bad_rsa_key() {
        let err = OAuthClient::new(
            OAuthClientConfig::new("http://r", "http://a", "k", "not a pem")
                .signature_method("RSA-SHA1"),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            Error::Configuration(ConfigError::InvalidPrivateKey(_))
        ));
    }

    #[test]
    fn accepts_supported_methods() {
        for (method, secret) in &[
            ("PLAINTEXT", "secret"),
            ("HMAC-SHA1", "secret"),
            ("RSA-SHA1", TEST_KEY),
        ] {
            let client = OAuthClient::new(
                OAuthClientConfig::new("http://r", "http://a", "k", *secret)
                    .signature_method(*method),
            )
            .unwrap();
            assert_eq!(client.signature_method().as_str(), *method);
        }
    }

    #[test]
    fn sign_url_without_token() {
        assert_eq!(
            client()
                .sign_url("http://somehost.com:3323/foo/poop?bar=foo", None, None, None)
                .unwrap(),
            "http://somehost.com:3323/foo/poop?bar=foo&oauth_consumer_key=consumerkey&oauth_nonce=ybHPeOEkAUJ3k2wJT9Xb43MjtSgTvKqp&oauth_signature_method=HMAC-SHA1&oauth_timestamp=1272399856&oauth_version=1.0&oauth_signature=7ytO8vPSLut2GzHjU9pn1SV9xjc%3D"
        );
    }

    #[test]
    fn sign_url_with_token() {
        assert_eq!(
            client()
                .sign_url("http://somehost.com:3323/foo/poop?bar=foo", Some("token"), None, None)
                .unwrap(),
            "http://somehost.com:3323/foo/poop?bar=foo&oauth_consumer_key=consumerkey&oauth_nonce=ybHPeOEkAUJ3k2wJT9Xb43MjtSgTvKqp&oauth_signature_method=HMAC-SHA1&oauth_timestamp=1272399856&oauth_token=token&oauth_version=1.0&oauth_signature=9LwCuCWw5sURtpMroIolU3YwsdI%3D"
        );
    }

    #[test]
    fn sign_url_with_token_and_secret() {
        assert_eq!(
            client()
                .sign_url(
                    "http://somehost.com:3323/foo/poop?bar=foo",
                    Some("token"),
                    Some("tokensecret"),
                    None
                )
                .unwrap(),
            "http://somehost.com:3323/foo/poop?bar=foo&oauth_consumer_key=consumerkey&oauth_nonce=ybHPeOEkAUJ3k2wJT9Xb43MjtSgTvKqp&oauth_signature_method=HMAC-SHA1&oauth_timestamp=1272399856&oauth_token=token&oauth_version=1.0&oauth_signature=zeOR0Wsm6EG6XSg0Vw%2FsbpoSib8%3D"
        );
    }

    #[test]
    fn sign_url_plaintext() {
        let client = OAuthClient::new(
            OAuthClientConfig::new("http://r", "http://a", "consumerkey", "consumersecret")
                .signature_method("PLAINTEXT"),
        )
        .unwrap()
        .with_parameters(fixed());
        assert_eq!(
            client
                .sign_url(
                    "http://somehost.com:3323/foo/poop?bar=foo",
                    Some("token"),
                    Some("tokensecret"),
                    None
                )
                .unwrap(),
            "http://somehost.com:3323/foo/poop?bar=foo&oauth_consumer_key=consumerkey&oauth_nonce=ybHPeOEkAUJ3k2wJT9Xb43MjtSgTvKqp&oauth_signature_method=PLAINTEXT&oauth_timestamp=1272399856&oauth_token=token&oauth_version=1.0&oauth_signature=consumersecret%26tokensecret"
        );
    }

    #[test]
    fn auth_header_with_token_and_secret() {
        assert_eq!(
            client()
                .auth_header(
                    "http://somehost.com:3323/foo/poop?bar=foo",
                    Some("token"),
                    Some("tokensecret"),
                    None
                )
                .unwrap(),
            "OAuth oauth_consumer_key=\"consumerkey\",oauth_nonce=\"ybHPeOEkAUJ3k2wJT9Xb43MjtSgTvKqp\",oauth_signature_method=\"HMAC-SHA1\",oauth_timestamp=\"1272399856\",oauth_token=\"token\",oauth_version=\"1.0\",oauth_signature=\"zeOR0Wsm6EG6XSg0Vw%2FsbpoSib8%3D\""
        );
    }

    #[test]
    fn custom_separator() {
        let header = client()
            .with_parameter_separator(", ")
            .auth_header("http://somehost.com/", None, None, None)
            .unwrap();
        assert!(header.starts_with("OAuth oauth_consumer_key=\"consumerkey\", oauth_nonce="));
    }

    #[test]
    fn prepare_parameters_sorts_query_parameters() {
        let ordered = client()
            .prepare_parameters(
                None,
                None,
                &Method::POST,
                "http://foo.com?foo[bar]=xxx&bar[foo]=yyy",
                &ParameterSet::new(),
            )
            .unwrap();
        assert_eq!(ordered[0], ("bar[foo]".to_string(), "yyy".to_string()));
        assert_eq!(ordered[1], ("foo[bar]".to_string(), "xxx".to_string()));
        assert_eq!(ordered.last().unwrap().0, OAUTH_SIGNATURE_KEY);
    }

    #[test]
    fn prepare_parameters_keeps_repeated_query_keys() {
        let ordered = client()
            .prepare_parameters(
                None,
                None,
                &Method::GET,
                "http://foo.com/?z=2&z=1&a=x+y",
                &ParameterSet::new(),
            )
            .unwrap();
        assert_eq!(&ordered[0], &("a".to_string(), "x y".to_string()));
        let z: Vec<&str> = ordered
            .iter()
            .filter(|(k, _)| k == "z")
            .map(|(_, v)| v.as_str())
            .collect();
        assert_eq!(z, vec!["1", "2"]);
    }

    #[test]
    fn query_overrides_extra_parameters() {
        let extra = ParameterSet::new().with("q", "extra").with("only_extra", "1");
        let ordered = client()
            .prepare_parameters(None, None, &Method::GET, "http://foo.com/?q=query", &extra)
            .unwrap();
        let q: Vec<&str> = ordered
            .iter()
            .filter(|(k, _)| k == "q")
            .map(|(_, v)| v.as_str())
            .collect();
        assert_eq!(q, vec!["query"]);
        assert!(keys(&ordered).contains(&"only_extra"));
    }

    #[test]
    fn signs_query_with_undecodable_escapes() {
        let client = client();
        let ordered = client
            .prepare_parameters(
                None,
                None,
                &Method::GET,
                "http://h.com/p?data=%FF%FE",
                &ParameterSet::new(),
            )
            .unwrap();
        assert_eq!(
            &ordered[0],
            &("data".to_string(), "\u{FFFD}\u{FFFD}".to_string())
        );

        let signed = client
            .sign_url("http://h.com/p?data=%FF%FE", None, None, None)
            .unwrap();
        assert!(signed.starts_with("http://h.com/p?data=%EF%BF%BD%EF%BF%BD&oauth_consumer_key"));
        assert!(signed.contains("&oauth_signature="));
    }

    #[test]
    fn empty_version_and_token_are_omitted() {
        let client = OAuthClient::new(
            OAuthClientConfig::new("http://r", "http://a", "consumerkey", "consumersecret")
                .version(""),
        )
        .unwrap()
        .with_parameters(fixed());
        let ordered = client
            .prepare_parameters(
                Some(""),
                None,
                &Method::GET,
                "http://foo.com/",
                &ParameterSet::new(),
            )
            .unwrap();
        assert_eq!(
            keys(&ordered),
            vec![
                "oauth_consumer_key",
                "oauth_nonce",
                "oauth_signature_method",
                "oauth_timestamp",
                "oauth_signature"
            ]
        );
    }

    #[test]
    fn rfc5849_photos_resource_signature() {
        let client = OAuthClient::new(
            OAuthClientConfig::new(
                "https://photos.example.net/initiate",
                "https://photos.example.net/token",
                "dpf43f3p2l4k3l03",
                "kd94hf93k423kf44",
            )
            .version(""),
        )
        .unwrap()
        .with_parameters(OAuthParameters::new().nonce("chapoH").timestamp(137_131_202u64));
        let ordered = client
            .prepare_parameters(
                Some("nnch734d00sl2jdk"),
                Some("pfkkdhi9sl3r4s00"),
                &Method::GET,
                "http://photos.example.net/photos?file=vacation.jpg&size=original",
                &ParameterSet::new(),
            )
            .unwrap();
        assert_eq!(
            ordered.last().unwrap(),
            &(
                OAUTH_SIGNATURE_KEY.to_string(),
                "MdpQcU8iPSUjWoN/UDMsK2sui9I=".to_string()
            )
        );
    }

    #[test]
    fn content_type_from_custom_headers_becomes_default() {
        let mut custom = BTreeMap::new();
        custom.insert("Content-Type".to_string(), "application/json".to_string());
        custom.insert("X-Extra".to_string(), "1".to_string());
        let client = OAuthClient::new(
            OAuthClientConfig::new("http://r", "http://a", "k", "s").custom_headers(custom),
        )
        .unwrap();
        let request = client
            .open_stream(Method::POST, "http://foo.com/upload", "t", "s", None)
            .unwrap();
        assert_eq!(request.headers[CONTENT_TYPE], "application/json");
        assert_eq!(request.headers.get_all(CONTENT_TYPE).iter().count(), 1);
        assert_eq!(request.headers["x-extra"], "1");
    }

    #[test]
    fn open_stream_is_signed_without_body() {
        let request = client()
            .open_stream(
                Method::PUT,
                "http://foo.com/upload",
                "token",
                "tokensecret",
                Some("image/png"),
            )
            .unwrap();
        assert_eq!(request.method, Method::PUT);
        assert!(request.body.is_empty());
        assert!(request.headers.get(CONTENT_LENGTH).is_none());
        assert_eq!(request.headers[CONTENT_TYPE], "image/png");
        assert_eq!(request.headers["user-agent"], "oauth-libre");
        let authorization = request.headers[AUTHORIZATION].to_str().unwrap();
        assert!(authorization.starts_with("OAuth oauth_consumer_key=\"consumerkey\""));
        assert!(authorization.contains("oauth_token=\"token\""));
    }

    #[test]
    fn echo_signs_verify_credentials() {
        let client = OAuthClient::echo(EchoConfig::new(
            "http://api.twitter.com/",
            "https://api.twitter.com/1/account/verify_credentials.json",
            "consumerkey",
            "consumersecret",
        ))
        .unwrap()
        .with_parameters(fixed());
        assert!(client.is_echo());

        let request = client
            .open_stream(Method::POST, "http://upload.example.com/?x=1", "token", "secret", None)
            .unwrap();
        assert!(request.headers.get(AUTHORIZATION).is_none());
        let header = request.headers[X_VERIFY_CREDENTIALS_AUTHORIZATION]
            .to_str()
            .unwrap();
        assert!(header.starts_with("OAuth realm=\"http://api.twitter.com/\",oauth_consumer_key="));
        assert!(!header.contains("x="));

        // the target URL plays no part in an Echo signature
        let a = client
            .auth_header("http://one.example.com/", Some("token"), Some("secret"), None)
            .unwrap();
        let b = client
            .auth_header(
                "http://two.example.com/?y=2",
                Some("token"),
                Some("secret"),
                Some(Method::POST),
            )
            .unwrap();
        assert_eq!(a, b);
    }
}
