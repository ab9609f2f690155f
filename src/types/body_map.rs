//! Ordered parameter bag for request bodies and query strings

use std::collections::BTreeMap;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::WechatPayError;

// RFC 3986 unreserved characters stay as-is
pub(crate) const QUERY_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// String-keyed parameter map with lexically ordered keys.
///
/// Serializes as a flat JSON object, so it can be sent directly as a
/// request body.
///
/// ```rust
/// use wechat_pay_smartguide::types::BodyMap;
///
/// let mut bm = BodyMap::new();
/// bm.set("store_id", 1234).set("limit", 10);
/// assert_eq!(bm.encode_get_params(), "limit=10&store_id=1234");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BodyMap(BTreeMap<String, Value>);

impl BodyMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Value rendered as text: strings unquoted, other scalars as JSON,
    /// `null` and absent keys as `None`.
    pub fn get_string(&self, key: &str) -> Option<String> {
        match self.0.get(key)? {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Fail with [`WechatPayError::MissingParam`] naming the first key that is
    /// absent, `null` or an empty string.
    pub fn check_empty_error(&self, keys: &[&str]) -> Result<(), WechatPayError> {
        for key in keys {
            let empty = match self.get_string(key) {
                None => true,
                Some(value) => value.is_empty(),
            };
            if empty {
                return Err(WechatPayError::MissingParam((*key).to_string()));
            }
        }
        Ok(())
    }

    /// Encode as `k=v&k=v` in key order, percent-encoding values.
    /// Keys with empty or `null` values are skipped.
    pub fn encode_get_params(&self) -> String {
        self.0
            .keys()
            .filter_map(|key| {
                let value = self.get_string(key)?;
                if value.is_empty() {
                    return None;
                }
                Some(format!(
                    "{}={}",
                    utf8_percent_encode(key, QUERY_VALUE),
                    utf8_percent_encode(&value, QUERY_VALUE)
                ))
            })
            .collect::<Vec<_>>()
            .join("&")
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for BodyMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}
