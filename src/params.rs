//! Ordered request parameters and their RFC 5849 normalization.

use std::cmp::Ordering;
use std::iter::FromIterator;

use crate::encoding::{decode, decode_lossy, encode};
use crate::{TokenReaderResult, OAUTH_KEY_PREFIX};

/// An ordered list of `(name, value)` pairs.
///
/// Names may repeat: a parameter carrying several values is stored as one
/// pair per value, in the order the values were given, and every occurrence
/// is signed and sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterSet {
    pairs: Vec<(String, String)>,
}

impl ParameterSet {
    pub fn new() -> Self {
        Default::default()
    }

    /// Append a single pair.
    pub fn push<K, V>(&mut self, key: K, value: V)
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.pairs.push((key.into(), value.into()));
    }

    /// Append one pair per element of `values`, keeping their order.
    pub fn push_all<K, V, I>(&mut self, key: K, values: I)
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = V>,
    {
        let key = key.into();
        for value in values {
            self.pairs.push((key.clone(), value.into()));
        }
    }

    /// Builder-style [`push`](Self::push).
    pub fn with<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.push(key, value);
        self
    }

    /// Set `key` to a single value.
    ///
    /// An existing key keeps its position and loses any further occurrences;
    /// a new key is appended.
    pub fn set<K, V>(&mut self, key: K, value: V)
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.replace(key.into(), vec![value.into()]);
    }

    /// Overlay `other` on top of `self`: each name present in `other`
    /// replaces all of its occurrences here with all of its occurrences there.
    pub fn merge(&mut self, other: ParameterSet) {
        let mut grouped: Vec<(String, Vec<String>)> = Vec::new();
        for (key, value) in other.pairs {
            match grouped.iter_mut().find(|(k, _)| *k == key) {
                Some((_, values)) => values.push(value),
                None => grouped.push((key, vec![value])),
            }
        }
        for (key, values) in grouped {
            self.replace(key, values);
        }
    }

    fn replace(&mut self, key: String, values: Vec<String>) {
        match self.pairs.iter().position(|(k, _)| *k == key) {
            Some(at) => {
                self.pairs.retain(|(k, _)| *k != key);
                let tail = self.pairs.split_off(at);
                self.pairs
                    .extend(values.into_iter().map(|v| (key.clone(), v)));
                self.pairs.extend(tail);
            }
            None => self
                .pairs
                .extend(values.into_iter().map(|v| (key.clone(), v))),
        }
    }

    /// First value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.pairs.iter().any(|(k, _)| k == key)
    }

    /// Remove every occurrence of `key`, returning the removed values.
    pub fn remove(&mut self, key: &str) -> Vec<String> {
        let mut removed = Vec::new();
        self.pairs.retain(|(k, v)| {
            if k == key {
                removed.push(v.clone());
                false
            } else {
                true
            }
        });
        removed
    }

    /// The same set minus every `oauth_*` parameter.
    pub fn without_oauth_parameters(&self) -> ParameterSet {
        self.pairs
            .iter()
            .filter(|(k, _)| !is_oauth_parameter(k))
            .cloned()
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn into_pairs(self) -> Vec<(String, String)> {
        self.pairs
    }

    /// Parse a query string or form-encoded body.
    ///
    /// Pairs are split on the first `=`; a segment without `=` is a key with
    /// an empty value and empty segments are skipped. Keys and values are
    /// decoded with [`decode`].
    pub fn parse(input: &str) -> TokenReaderResult<Self> {
        let mut set = ParameterSet::new();
        for segment in input.split('&').filter(|s| !s.is_empty()) {
            let mut kv = segment.splitn(2, '=');
            let key = kv.next().unwrap_or_default();
            let value = kv.next().unwrap_or_default();
            set.push(decode(key)?, decode(value)?);
        }
        Ok(set)
    }

    /// Parse the query component of a request URL.
    ///
    /// Splits like [`ParameterSet::parse`] but never fails: escapes that do
    /// not decode to UTF-8 are replaced via [`decode_lossy`].
    pub fn parse_query(query: &str) -> Self {
        query
            .split('&')
            .filter(|s| !s.is_empty())
            .map(|segment| {
                let mut kv = segment.splitn(2, '=');
                let key = kv.next().unwrap_or_default();
                let value = kv.next().unwrap_or_default();
                (decode_lossy(key), decode_lossy(value))
            })
            .collect()
    }

    /// The RFC 5849 section 3.4.1.3.2 parameter string: every name and value
    /// encoded, sorted by name then value, joined as `k=v&k=v`.
    pub fn normalize(&self) -> String {
        let mut encoded: Vec<(String, String)> = self
            .pairs
            .iter()
            .map(|(k, v)| (encode(k), encode(v)))
            .collect();
        sort_pairs(&mut encoded);
        encoded
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Pairs sorted by raw name then raw value.
    pub fn sorted(&self) -> Vec<(String, String)> {
        let mut pairs = self.pairs.clone();
        sort_pairs(&mut pairs);
        pairs
    }
}

impl<K, V> FromIterator<(K, V)> for ParameterSet
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        ParameterSet {
            pairs: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl IntoIterator for ParameterSet {
    type Item = (String, String);
    type IntoIter = std::vec::IntoIter<(String, String)>;

    fn into_iter(self) -> Self::IntoIter {
        self.pairs.into_iter()
    }
}

/// Sort by name, ties broken by value, comparing strings lexicographically.
pub fn sort_pairs(pairs: &mut [(String, String)]) {
    pairs.sort_by(|a, b| match a.0.cmp(&b.0) {
        Ordering::Equal => a.1.cmp(&b.1),
        other => other,
    });
}

/// Whether `name` is an OAuth protocol parameter (case-sensitive `oauth_` prefix).
pub fn is_oauth_parameter(name: &str) -> bool {
    name.starts_with(OAUTH_KEY_PREFIX)
}
