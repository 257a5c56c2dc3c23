use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;
pub type SignResult<T> = std::result::Result<T, SignError>;
pub type TokenReaderResult<T> = std::result::Result<T, TokenReaderError>;

/// Boxed transport error as reported by a [`SecureRequestExecutor`](crate::SecureRequestExecutor).
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid client configuration : {0}")]
    Configuration(#[from] ConfigError),
    #[error("token acquisition failed : {0}")]
    TokenReader(#[from] TokenReaderError),
    #[error("OAuth sign failed : {0}")]
    Signer(#[from] SignError),
    #[error("invalid url : {0}")]
    Url(#[from] url::ParseError),
    #[error("request failed : {0}")]
    Network(#[source] BoxError),
    #[error("provider responded with status {status_code} : {body}")]
    Provider { status_code: u16, body: String },
    #[error("redirect limit of {limit} exceeded")]
    TooManyRedirects { limit: usize },
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Network(Box::new(err))
    }
}

impl Error {
    /// HTTP status of a provider rejection, if this is one.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Error::Provider { status_code, .. } => Some(*status_code),
            _ => None,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("un-supported signature method : {0}")]
    UnsupportedSignatureMethod(String),
    #[error("RSA-SHA1 requires a PEM encoded private key : {0}")]
    InvalidPrivateKey(String),
    #[error("invalid header {0}")]
    InvalidHeader(String),
    #[error("invalid proxy url {0}")]
    InvalidProxy(String),
    #[error("OAuth Echo clients have no {0} endpoint")]
    MissingEndpoint(&'static str),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SignError {
    #[error("HMAC-SHA1 signing failed : {0}")]
    Hmac(String),
    #[error("RSA-SHA1 signing failed : {0}")]
    Rsa(String),
    #[error("url has no host : {0}")]
    MissingHost(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenReaderError {
    #[error("response has malformed format: not found {0} in {1}")]
    TokenKeyNotFound(&'static str, String),
    #[error("response is not valid form encoding : {0}")]
    MalformedResponse(String),
}
