//! Directory entry representation.
//!
//! # Responsibility
//! - Carry attribute values between commands and backends.
//!
//! # Invariants
//! - Attribute names are unique keys; iteration order is by attribute name.
//! - The primary-key attribute identifies the entry. Backends may refuse writes
//!   that change it; every other key is schema- or backend-defined.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::btree_map;
use std::collections::BTreeMap;

/// Ordered mapping from attribute name to JSON value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Entry(BTreeMap<String, Value>);

impl Entry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, attribute: &str) -> Option<&Value> {
        self.0.get(attribute)
    }

    /// Returns the attribute rendered as text.
    ///
    /// Strings are returned as-is, numbers and booleans are formatted, and
    /// `null`, arrays and mappings yield `None`.
    pub fn text(&self, attribute: &str) -> Option<String> {
        match self.0.get(attribute)? {
            Value::String(value) => Some(value.clone()),
            Value::Number(value) => Some(value.to_string()),
            Value::Bool(value) => Some(value.to_string()),
            _ => None,
        }
    }

    pub fn contains_key(&self, attribute: &str) -> bool {
        self.0.contains_key(attribute)
    }

    pub fn insert(&mut self, attribute: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(attribute.into(), value.into())
    }

    pub fn remove(&mut self, attribute: &str) -> Option<Value> {
        self.0.remove(attribute)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, Value> {
        self.0.iter()
    }

    /// Merges `changes` into this entry.
    ///
    /// A `null` value removes the attribute; any other value replaces it.
    pub fn merge(&mut self, changes: Entry) {
        for (attribute, value) in changes {
            if value.is_null() {
                self.0.remove(&attribute);
            } else {
                self.0.insert(attribute, value);
            }
        }
    }

    /// Returns a copy holding only the listed attributes that are present.
    pub fn project(&self, attributes: &[String]) -> Entry {
        attributes
            .iter()
            .filter_map(|name| {
                self.0
                    .get_key_value(name.as_str())
                    .map(|(key, value)| (key.clone(), value.clone()))
            })
            .collect()
    }

    /// Converts a JSON object into an entry; other JSON values yield `None`.
    pub fn from_value(value: Value) -> Option<Entry> {
        match value {
            Value::Object(map) => Some(map.into_iter().collect()),
            _ => None,
        }
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0.into_iter().collect::<Map<String, Value>>())
    }
}

impl FromIterator<(String, Value)> for Entry {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for Entry {
    type Item = (String, Value);
    type IntoIter = btree_map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Entry {
    type Item = (&'a String, &'a Value);
    type IntoIter = btree_map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
