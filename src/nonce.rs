use std::time::{SystemTime, UNIX_EPOCH};

use rand::distributions::Alphanumeric;
use rand::Rng;

/// Default number of characters in an `oauth_nonce`.
pub const DEFAULT_NONCE_SIZE: usize = 32;

/// Random `[A-Za-z0-9]` string of `size` characters.
pub fn generate_nonce(size: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(size)
        .map(char::from)
        .collect()
}

/// Seconds since the UNIX epoch.
pub fn generate_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nonce_has_requested_size_and_charset() {
        let nonce = generate_nonce(DEFAULT_NONCE_SIZE);
        assert_eq!(nonce.len(), 32);
        assert!(nonce.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_eq!(generate_nonce(7).len(), 7);
        assert_eq!(generate_nonce(0), "");
    }

    #[test]
    fn nonces_differ() {
        assert_ne!(generate_nonce(32), generate_nonce(32));
    }

    #[test]
    fn timestamp_is_recent() {
        // 2020-01-01T00:00:00Z
        assert!(generate_timestamp() > 1_577_836_800);
    }
}
