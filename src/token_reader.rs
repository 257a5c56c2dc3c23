use std::collections::HashMap;

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::params::ParameterSet;
use crate::{TokenReaderError, TokenReaderResult, OAUTH_TOKEN_KEY};

const OAUTH_TOKEN_SECRET_KEY: &str = "oauth_token_secret";

const ACCESS_TOKEN_KEY: &str = "access_token";

const REFRESH_TOKEN_KEY: &str = "refresh_token";

/// Represents response of token acquisition.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TokenResponse {
    /// OAuth Token
    pub oauth_token: String,
    /// OAuth Token Secret
    pub oauth_token_secret: String,
    /// Other contents
    #[serde(flatten)]
    pub remain: HashMap<String, String>,
}

/// Temporary credentials returned by the request-token endpoint.
pub type RequestToken = TokenResponse;

/// Token credentials returned by the access-token endpoint.
pub type AccessToken = TokenResponse;

impl TokenResponse {
    pub fn new<TKey, TSecret>(oauth_token: TKey, oauth_token_secret: TSecret) -> Self
    where
        TKey: Into<String>,
        TSecret: Into<String>,
    {
        TokenResponse {
            oauth_token: oauth_token.into(),
            oauth_token_secret: oauth_token_secret.into(),
            remain: HashMap::new(),
        }
    }
}

/// Parse a form-encoded OAuth 1.0 token response, taking `oauth_token` and
/// `oauth_token_secret` out and keeping everything else in `remain`.
pub(crate) fn read_oauth_token(text: String) -> TokenReaderResult<TokenResponse> {
    let mut destructured = ParameterSet::parse(&text)?
        .into_iter()
        .collect::<HashMap<String, String>>();
    let oauth_token = destructured.remove(OAUTH_TOKEN_KEY);
    let oauth_token_secret = destructured.remove(OAUTH_TOKEN_SECRET_KEY);
    match (oauth_token, oauth_token_secret) {
        (Some(t), Some(s)) => Ok(TokenResponse {
            oauth_token: t,
            oauth_token_secret: s,
            remain: destructured,
        }),
        (None, _) => Err(TokenReaderError::TokenKeyNotFound(OAUTH_TOKEN_KEY, text)),
        (_, _) => Err(TokenReaderError::TokenKeyNotFound(
            OAUTH_TOKEN_SECRET_KEY,
            text,
        )),
    }
}

/// Bearer credentials from an OAuth 2.0 token endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct OAuth2Token {
    pub access_token: String,
    pub refresh_token: Option<String>,
    /// Remaining response fields (`expires_in`, `scope`, `token_type`, ...).
    pub extra: Map<String, Value>,
}

/// Parse an OAuth 2.0 token response: a JSON object, or form encoding for
/// providers that still answer that way.
pub(crate) fn read_oauth2_token(text: String) -> TokenReaderResult<OAuth2Token> {
    let mut fields = match serde_json::from_str::<Value>(&text) {
        Ok(Value::Object(map)) => map,
        _ => {
            tracing::trace!("token response is not a JSON object, reading it as a form");
            serde_urlencoded::from_str::<Vec<(String, String)>>(&text)
                .map_err(|e| TokenReaderError::MalformedResponse(e.to_string()))?
                .into_iter()
                .map(|(k, v)| (k, Value::String(v)))
                .collect()
        }
    };
    let access_token = match fields.remove(ACCESS_TOKEN_KEY) {
        Some(Value::String(token)) => token,
        _ => return Err(TokenReaderError::TokenKeyNotFound(ACCESS_TOKEN_KEY, text)),
    };
    let refresh_token = match fields.remove(REFRESH_TOKEN_KEY) {
        Some(Value::String(token)) => Some(token),
        _ => None,
    };
    Ok(OAuth2Token {
        access_token,
        refresh_token,
        extra: fields,
    })
}

#[cfg(test)]
mod test {

    use super::*;

    #[test]
    fn parse_response_typical() {
        let resp_str_sample = "oauth_token=Z6eEdO8MOmk394WozF5oKyuAv855l4Mlqo7hhlSLik&oauth_token_secret=Kd75W4OQfb2oJTV0vzGzeXftVAwgMnEK9MumzYcM&oauth_callback_confirmed=true";
        for parsed in &[
            read_oauth_token(resp_str_sample.to_string()).unwrap(),
            serde_urlencoded::from_str::<TokenResponse>(resp_str_sample).unwrap(),
        ] {
            assert_eq!(
                parsed.oauth_token,
                "Z6eEdO8MOmk394WozF5oKyuAv855l4Mlqo7hhlSLik"
            );
            assert_eq!(
                parsed.oauth_token_secret,
                "Kd75W4OQfb2oJTV0vzGzeXftVAwgMnEK9MumzYcM"
            );
            assert_eq!(parsed.remain.len(), 1);
            let oauth_callback_confirmed = parsed.remain.get("oauth_callback_confirmed").unwrap();
            assert_eq!(oauth_callback_confirmed, "true");
        }
    }

    #[test]
    fn parse_response_edge() {
        let resp_str_sample = "oauth_token==&oauth_token_secret=&keyonly=&keyonly2&=&&";
        let parsed = read_oauth_token(resp_str_sample.to_string()).unwrap();
        assert_eq!(parsed.oauth_token, "=");
        assert_eq!(parsed.oauth_token_secret, "");
        assert_eq!(parsed.remain.len(), 3);
        let keyonly = parsed.remain.get("keyonly").unwrap();
        assert_eq!(keyonly, "");
        let keyonly2 = parsed.remain.get("keyonly2").unwrap();
        assert_eq!(keyonly2, "");
        let empty = parsed.remain.get("").unwrap();
        assert_eq!(empty, "");
    }

    #[test]
    fn parse_response_decodes_values() {
        let body = "oauth_token=abc%2B123&oauth_token_secret=xyz%3D789&screen_name=a+b";
        let parsed = read_oauth_token(body.to_string()).unwrap();
        assert_eq!(parsed.oauth_token, "abc+123");
        assert_eq!(parsed.oauth_token_secret, "xyz=789");
        assert_eq!(parsed.remain.get("screen_name").unwrap(), "a b");
    }

    #[test]
    fn parse_minimal() {
        let resp_str_sample = "oauth_token&oauth_token_secret";
        let parsed = read_oauth_token(resp_str_sample.to_string()).unwrap();
        assert_eq!(parsed.oauth_token, "");
        assert_eq!(parsed.oauth_token_secret, "");
        assert_eq!(parsed.remain.len(), 0);
    }

    #[test]
    fn parse_token_notfound() {
        let resp_str_sample = "oauth_token_secret=";
        let parsed = read_oauth_token(resp_str_sample.to_string());
        assert_eq!(
            parsed,
            Err(TokenReaderError::TokenKeyNotFound(
                OAUTH_TOKEN_KEY,
                resp_str_sample.to_string()
            ))
        );
    }

    #[test]
    fn parse_token_secret_notfound() {
        let resp_str_sample = "oauth_token=";
        let parsed = read_oauth_token(resp_str_sample.to_string());
        assert_eq!(
            parsed,
            Err(TokenReaderError::TokenKeyNotFound(
                OAUTH_TOKEN_SECRET_KEY,
                resp_str_sample.to_string()
            ))
        );
    }

    #[test]
    fn parse_malformed_encoding() {
        let parsed = read_oauth_token("oauth_token=%FF&oauth_token_secret=x".to_string());
        assert!(matches!(
            parsed,
            Err(TokenReaderError::MalformedResponse(_))
        ));
    }

    #[test]
    fn oauth2_form_encoded() {
        let body = "access_token=access&refresh_token=refresh";
        let token = read_oauth2_token(body.to_string()).unwrap();
        assert_eq!(token.access_token, "access");
        assert_eq!(token.refresh_token.as_deref(), Some("refresh"));
        assert!(token.extra.is_empty());
    }

    #[test]
    fn oauth2_json_with_extras() {
        let token = read_oauth2_token(
            r#"{"access_token":"access","refresh_token":"refresh","extra_1":1, "extra_2":"foo"}"#
                .to_string(),
        )
        .unwrap();
        assert_eq!(token.access_token, "access");
        assert_eq!(token.refresh_token.as_deref(), Some("refresh"));
        assert_eq!(token.extra.get("extra_1"), Some(&Value::from(1)));
        assert_eq!(token.extra.get("extra_2"), Some(&Value::from("foo")));
        assert!(!token.extra.contains_key("access_token"));
    }

    #[test]
    fn oauth2_without_refresh_token() {
        let token = read_oauth2_token(
            "access_token=e72e16c7e42f292c6912e7710c838347ae178b4a&token_type=bearer".to_string(),
        )
        .unwrap();
        assert_eq!(token.refresh_token, None);
        assert_eq!(token.extra.get("token_type"), Some(&Value::from("bearer")));
    }

    #[test]
    fn oauth2_missing_access_token() {
        let body = r#"{"error":"bad_verification_code"}"#;
        let err = read_oauth2_token(body.to_string()).unwrap_err();
        assert!(matches!(
            err,
            TokenReaderError::TokenKeyNotFound(ACCESS_TOKEN_KEY, _)
        ));
    }
}
