//! RFC 3986 percent-encoding as OAuth 1.0 requires it.
//!
//! [`encode`] escapes everything outside the unreserved set, so `!`, `'`, `(`,
//! `)` and `*` come out as `%21 %27 %28 %29 %2A` even though generic URI
//! encoders leave them alone. [`decode`] goes the other way and additionally
//! reads `+` as a space, following the form-encoding convention providers use
//! in their token responses.

use std::borrow::Cow;

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::{TokenReaderError, TokenReaderResult};

/// Unreserved characters: `A-Z a-z 0-9 - . _ ~`.
const OAUTH_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Percent-encode `input` per RFC 3986 section 2.1.
pub fn encode(input: &str) -> String {
    if input.is_empty() {
        return String::new();
    }
    utf8_percent_encode(input, OAUTH_ENCODE_SET).to_string()
}

/// Decode a percent-encoded string, treating `+` as an encoded space.
///
/// # Errors
///
/// Fails when the decoded bytes are not valid UTF-8.
pub fn decode(input: &str) -> TokenReaderResult<String> {
    let spaced: Cow<str> = if input.contains('+') {
        Cow::Owned(input.replace('+', " "))
    } else {
        Cow::Borrowed(input)
    };
    percent_decode_str(&spaced)
        .decode_utf8()
        .map(Cow::into_owned)
        .map_err(|_| TokenReaderError::MalformedResponse(input.to_string()))
}

/// Like [`decode`], but invalid UTF-8 sequences become `U+FFFD` instead of
/// failing. Used for request URLs, which are signed whatever they carry.
pub fn decode_lossy(input: &str) -> String {
    let spaced = input.replace('+', " ");
    percent_decode_str(&spaced).decode_utf8_lossy().into_owned()
}

/// Serialize pairs as an `application/x-www-form-urlencoded` body using
/// [`encode`] for both keys and values, preserving the given order.
pub fn encode_form<'a, I>(pairs: I) -> String
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    pairs
        .into_iter()
        .map(|(k, v)| format!("{}={}", encode(k), encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}
