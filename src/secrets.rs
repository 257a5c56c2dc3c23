use std::fmt;

use rsa::pkcs1::DecodeRsaPrivateKey;
use rsa::pkcs8::DecodePrivateKey;
use rsa::RsaPrivateKey;

use crate::encoding::encode;
use crate::{ConfigError, SignatureMethod};

/// Consumer credentials of an OAuth 1.0 application.
///
/// The consumer secret is percent-encoded once here and reused for every
/// signature. Under RSA-SHA1 the secret is the PEM private key instead and is
/// parsed up front.
#[derive(Clone)]
pub struct ClientCredentials {
    consumer_key: String,
    encoded_consumer_secret: String,
    private_key: Option<RsaPrivateKey>,
}

impl ClientCredentials {
    pub fn new<TKey, TSecret>(
        consumer_key: TKey,
        consumer_secret: TSecret,
        signature_method: SignatureMethod,
    ) -> Result<Self, ConfigError>
    where
        TKey: Into<String>,
        TSecret: AsRef<str>,
    {
        let consumer_secret = consumer_secret.as_ref();
        let private_key = match signature_method {
            SignatureMethod::RsaSha1 => Some(parse_private_key(consumer_secret)?),
            _ => None,
        };
        Ok(ClientCredentials {
            consumer_key: consumer_key.into(),
            encoded_consumer_secret: encode(consumer_secret),
            private_key,
        })
    }

    pub fn consumer_key(&self) -> &str {
        &self.consumer_key
    }

    pub(crate) fn encoded_consumer_secret(&self) -> &str {
        &self.encoded_consumer_secret
    }

    pub(crate) fn private_key(&self) -> Option<&RsaPrivateKey> {
        self.private_key.as_ref()
    }
}

impl fmt::Debug for ClientCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientCredentials")
            .field("consumer_key", &self.consumer_key)
            .field("consumer_secret", &"<redacted>")
            .field("private_key", &self.private_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Parse a PEM private key, PKCS#8 first and PKCS#1 as a fallback.
fn parse_private_key(pem: &str) -> Result<RsaPrivateKey, ConfigError> {
    RsaPrivateKey::from_pkcs8_pem(pem).or_else(|pkcs8_err| {
        RsaPrivateKey::from_pkcs1_pem(pem).map_err(|pkcs1_err| {
            ConfigError::InvalidPrivateKey(format!("pkcs8: {}, pkcs1: {}", pkcs8_err, pkcs1_err))
        })
    })
}
