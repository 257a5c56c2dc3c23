/*!
oauth-libre: OAuth 1.0/1.0a request signing and OAuth 2.0 token exchange.

# Overview

This library signs requests the way RFC 5849 describes (PLAINTEXT, HMAC-SHA1
and RSA-SHA1), walks the three-legged OAuth 1.0a flow, supports OAuth Echo,
and carries a small OAuth 2.0 client for authorization-code and refresh-token
exchanges. HTTP goes through the [`SecureRequestExecutor`] trait; the default
[`ReqwestExecutor`] is built on [reqwest](https://crates.io/crates/reqwest).

The signing core is available on its own: [`encode`], [`ParameterSet::normalize`],
[`signature_base`] and [`Signer`] are pure functions of their inputs.

# How to use

## Basic usecase 1 - Acquiring OAuth token & secret

```no_run
# async fn run() -> oauth_libre::Result<()> {
use std::io;
use oauth_libre::{OAuthClient, OAuthClientConfig, ParameterSet};

let client = OAuthClient::new(OAuthClientConfig::new(
    "https://api.twitter.com/oauth/request_token",
    "https://api.twitter.com/oauth/access_token",
    "[CONSUMER_KEY]",
    "[CONSUMER_SECRET]",
))?;

// step 1: acquire request token & token secret
let request_token = client.get_request_token(ParameterSet::new()).await?;

// step 2. acquire user pin
println!(
    "please access to: https://api.twitter.com/oauth/authorize?oauth_token={}",
    request_token.oauth_token
);
let mut user_input = String::new();
io::stdin().read_line(&mut user_input).ok();
let pin = user_input.trim();

// step 3. acquire access token
let access_token = client
    .get_access_token(
        &request_token.oauth_token,
        &request_token.oauth_token_secret,
        Some(pin),
        ParameterSet::new(),
    )
    .await?;
println!(
    "your token and secret is: \n token: {}\n secret: {}",
    access_token.oauth_token, access_token.oauth_token_secret
);
println!("other attributes: {:#?}", access_token.remain);
# Ok(())
# }
```

## Basic usecase 2 - sending the tweet

```no_run
# async fn run() -> oauth_libre::Result<()> {
use oauth_libre::{OAuthClient, OAuthClientConfig, ParameterSet};

let client = OAuthClient::new(OAuthClientConfig::new(
    "https://api.twitter.com/oauth/request_token",
    "https://api.twitter.com/oauth/access_token",
    "[CONSUMER_KEY]",
    "[CONSUMER_SECRET]",
))?;

// form parameters are signed and sent as the body
let status = ParameterSet::new().with("status", "Hello, Twitter!");
let resp = client
    .post(
        "https://api.twitter.com/1.1/statuses/update.json",
        "[ACCESS_TOKEN]",
        "[TOKEN_SECRET]",
        status,
        None,
    )
    .await?;
println!("{}", resp.body);
# Ok(())
# }
```

## Basic usecase 3 - OAuth 2.0 code exchange

```no_run
# async fn run() -> oauth_libre::Result<()> {
use oauth_libre::{OAuth2Client, OAuth2ClientConfig, ParameterSet};

let client = OAuth2Client::new(OAuth2ClientConfig::new(
    "[CLIENT_ID]",
    "[CLIENT_SECRET]",
    "https://github.com/login",
))?;
let url = client.get_authorize_url(
    ParameterSet::new().with("redirect_uri", "http://localhost:8080/callback"),
);
println!("please access to: {}", url);

let token = client
    .get_oauth_access_token("[CODE]", ParameterSet::new())
    .await?;
let user = client.get("https://api.github.com/user", &token.access_token).await?;
println!("{}", user.body);
# Ok(())
# }
```
*/
pub mod callback;
mod client;
mod config;
mod encoding;
mod error;
mod executor;
mod nonce;
mod oauth2;
mod params;
mod request;
mod secrets;
mod signer;
mod token_reader;

// exposed to external program
pub use client::{OAuthClient, RequestBody, X_VERIFY_CREDENTIALS_AUTHORIZATION};
pub use config::{
    default_oauth1_headers, ClientOptions, EchoConfig, OAuth2ClientConfig, OAuthClientConfig,
    ProxySetting, ResolvedProxy, DEFAULT_CALLBACK, DEFAULT_CONTENT_TYPE, DEFAULT_MAX_REDIRECTS,
    DEFAULT_SIGNATURE_METHOD, DEFAULT_USER_AGENT, DEFAULT_VERSION,
};
pub use encoding::{decode, decode_lossy, encode, encode_form};
pub use error::{
    BoxError, ConfigError, Error, Result, SignError, SignResult, TokenReaderError,
    TokenReaderResult,
};
pub use executor::{ReqwestExecutor, SecureRequestExecutor, DEFAULT_EARLY_CLOSE_HOSTS};
pub use nonce::{generate_nonce, generate_timestamp, DEFAULT_NONCE_SIZE};
pub use oauth2::OAuth2Client;
pub use params::{is_oauth_parameter, sort_pairs, ParameterSet};
pub use request::{HttpRequest, HttpResponse};
pub use secrets::ClientCredentials;
pub use signer::{
    authorization_header, normalize_url, signature_base, OAuthParameters, SignatureMethod,
    Signer, DEFAULT_PARAMETER_SEPARATOR,
};
pub use token_reader::{AccessToken, OAuth2Token, RequestToken, TokenResponse};

// exposed constant variables
/// Represents `oauth_callback`.
pub const OAUTH_CALLBACK_KEY: &str = "oauth_callback";
/// Represents `oauth_nonce`.
pub const OAUTH_NONCE_KEY: &str = "oauth_nonce";
/// Represents `oauth_timestamp`.
pub const OAUTH_TIMESTAMP_KEY: &str = "oauth_timestamp";
/// Represents `oauth_verifier`.
pub const OAUTH_VERIFIER_KEY: &str = "oauth_verifier";
/// Represents `oauth_version`.
pub const OAUTH_VERSION_KEY: &str = "oauth_version";
/// Represents `oauth_signature`.
pub const OAUTH_SIGNATURE_KEY: &str = "oauth_signature";
/// Represents `realm`.
pub const REALM_KEY: &str = "realm";

// crate-private constant variables
pub(crate) const OAUTH_KEY_PREFIX: &str = "oauth_";
pub(crate) const OAUTH_SIGNATURE_METHOD_KEY: &str = "oauth_signature_method";
pub(crate) const OAUTH_CONSUMER_KEY: &str = "oauth_consumer_key";
pub(crate) const OAUTH_TOKEN_KEY: &str = "oauth_token";
