//! Callback-style completion for the future-based API.
//!
//! ```no_run
//! # async fn run() -> oauth_libre::Result<()> {
//! use oauth_libre::{callback, OAuthClient, OAuthClientConfig, ParameterSet};
//!
//! let client = OAuthClient::new(OAuthClientConfig::new(
//!     "https://api.example.com/oauth/request_token",
//!     "https://api.example.com/oauth/access_token",
//!     "[CONSUMER_KEY]",
//!     "[CONSUMER_SECRET]",
//! ))?;
//! let handle = callback::deliver(
//!     async move { client.get_request_token(ParameterSet::new()).await },
//!     |result| match result {
//!         Ok(token) => println!("authorize {}", token.oauth_token),
//!         Err(err) => eprintln!("{}", err),
//!     },
//! );
//! handle.await.ok();
//! # Ok(())
//! # }
//! ```

use std::future::Future;

use tokio::task::JoinHandle;

use crate::Result;

/// Run `future` on the tokio runtime and hand its outcome to `callback`,
/// exactly once. Must be called from within a runtime.
pub fn deliver<F, T, C>(future: F, callback: C) -> JoinHandle<()>
where
    F: Future<Output = Result<T>> + Send + 'static,
    T: Send + 'static,
    C: FnOnce(Result<T>) + Send + 'static,
{
    tokio::spawn(async move { callback(future.await) })
}
