//! Key-Value Patch Store
//!
//! Ordered multimap used for assembly inputs/outputs, policy rules and event
//! descriptions. Updates go through nuke-and-set: every entry whose key is
//! being written is removed first, unrelated entries keep their position.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// A single key/value entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonPair {
    pub key: String,
    pub value: String,
}

impl JsonPair {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Ordered list of key/value entries. Keys may repeat.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JsonPairs(Vec<JsonPair>);

impl JsonPairs {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.push(JsonPair::new(key, value));
    }

    /// First value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|pair| pair.key == key)
            .map(|pair| pair.value.as_str())
    }

    /// First value stored under `key`, or an empty string.
    pub fn matched(&self, key: &str) -> &str {
        self.get(key).unwrap_or_default()
    }

    /// Replace every entry whose key appears in `patch`, leaving other
    /// entries untouched. New entries are appended in key order.
    pub fn nuke_and_set(&mut self, patch: &BTreeMap<String, Vec<String>>) {
        self.0.retain(|pair| !patch.contains_key(&pair.key));
        for (key, values) in patch {
            for value in values {
                self.0.push(JsonPair::new(key.clone(), value.clone()));
            }
        }
    }

    /// Remove every entry stored under `key`.
    pub fn nuke_keys(&mut self, key: &str) {
        self.0.retain(|pair| pair.key != key);
    }

    /// Flatten to a plain map. Later entries win on repeated keys.
    pub fn to_map(&self) -> BTreeMap<String, String> {
        self.0
            .iter()
            .map(|pair| (pair.key.clone(), pair.value.clone()))
            .collect()
    }

    /// Render as `key=value` strings in stored order.
    pub fn to_strings(&self) -> Vec<String> {
        self.0
            .iter()
            .map(|pair| format!("{}={}", pair.key, pair.value))
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &JsonPair> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, String)> for JsonPairs {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(key, value)| JsonPair { key, value })
                .collect(),
        )
    }
}

/// Deserialize an explicit `null` as the empty value.
///
/// Records written by older writers carry `null` for empty lists.
pub fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Build a nuke-and-set patch from single-valued entries.
pub fn patch<K, V, I>(entries: I) -> BTreeMap<String, Vec<String>>
where
    K: Into<String>,
    V: Into<String>,
    I: IntoIterator<Item = (K, V)>,
{
    entries
        .into_iter()
        .map(|(k, v)| (k.into(), vec![v.into()]))
        .collect()
}
