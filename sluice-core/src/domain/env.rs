//! Environment entries injected into task execution

use serde::{Deserialize, Serialize};

/// A key/value pair in a task's execution environment
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyVal {
    pub key: String,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub is_credential: bool,
}

impl KeyVal {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            is_credential: false,
        }
    }

    /// Creates an entry flagged as sensitive
    pub fn credential(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            is_credential: true,
            ..Self::new(key, value)
        }
    }
}

/// Ordered accumulation of environment entries
///
/// Entries are only ever appended. A key that appears more than once
/// resolves to its last occurrence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Envs(Vec<KeyVal>);

impl Envs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: KeyVal) {
        self.0.push(entry);
    }

    /// Looks up the effective value of `key` (last write wins)
    pub fn get(&self, key: &str) -> Option<&KeyVal> {
        self.0.iter().rev().find(|kv| kv.key == key)
    }

    pub fn value(&self, key: &str) -> Option<&str> {
        self.get(key).map(|kv| kv.value.as_str())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, KeyVal> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Extend<KeyVal> for Envs {
    fn extend<I: IntoIterator<Item = KeyVal>>(&mut self, iter: I) {
        self.0.extend(iter);
    }
}

impl FromIterator<KeyVal> for Envs {
    fn from_iter<I: IntoIterator<Item = KeyVal>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for Envs {
    type Item = KeyVal;
    type IntoIter = std::vec::IntoIter<KeyVal>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Envs {
    type Item = &'a KeyVal;
    type IntoIter = std::slice::Iter<'a, KeyVal>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
