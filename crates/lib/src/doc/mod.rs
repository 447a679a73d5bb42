//! Document model.
//!
//! A stored document is a [`Doc`]: a mapping from string keys to [`Value`]s,
//! where values may themselves be nested mappings or lists. The root of the
//! store is always a `Doc`, so "the document" can never be a bare scalar.
//!
//! # Usage
//!
//! ```
//! use docstash::doc::{Doc, Value};
//!
//! let mut doc = Doc::new();
//! doc.set("alice", Value::from_json_slice(br#"{"score": 10}"#).unwrap());
//!
//! let mut update = Doc::new();
//! update.set("bob", 7);
//! doc.update(update);
//!
//! assert_eq!(doc.len(), 2);
//! let alice = doc.get("alice").and_then(Value::as_doc).unwrap();
//! assert_eq!(alice.get("score"), Some(&Value::from(10)));
//! ```

use std::collections::{BTreeMap, btree_map};

pub mod path;
pub mod value;

pub use path::{Path, PathError};
pub use value::Value;

/// A mapping from string keys to values.
///
/// Keys are kept in sorted order, which also fixes the order they are
/// written to the backing file.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Doc {
    children: BTreeMap<String, Value>,
}

impl Doc {
    /// Creates an empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys at this level.
    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn contains_key(&self, key: impl AsRef<str>) -> bool {
        self.children.contains_key(key.as_ref())
    }

    pub fn get(&self, key: impl AsRef<str>) -> Option<&Value> {
        self.children.get(key.as_ref())
    }

    pub fn get_mut(&mut self, key: impl AsRef<str>) -> Option<&mut Value> {
        self.children.get_mut(key.as_ref())
    }

    /// Sets `key` to `value`, returning the previous value if there was one.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.children.insert(key.into(), value.into())
    }

    /// Removes `key`, returning its value if it was present.
    pub fn remove(&mut self, key: impl AsRef<str>) -> Option<Value> {
        self.children.remove(key.as_ref())
    }

    /// Shallow merge: every key of `other` overwrites the same key here.
    ///
    /// Nested mappings under colliding keys are replaced wholesale, not
    /// merged recursively.
    pub fn update(&mut self, other: Doc) {
        self.children.extend(other.children);
    }

    /// Returns the mapping stored under `key`, creating it first if `key` is
    /// missing or holds anything other than a mapping.
    ///
    /// A non-mapping value under `key` is discarded.
    pub fn child_doc_mut(&mut self, key: impl Into<String>) -> &mut Doc {
        let slot = self
            .children
            .entry(key.into())
            .or_insert_with(|| Value::Doc(Doc::new()));
        if !slot.is_doc() {
            *slot = Value::Doc(Doc::new());
        }
        match slot {
            Value::Doc(doc) => doc,
            _ => unreachable!("Just assigned a map"),
        }
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, Value> {
        self.children.iter()
    }
}

impl FromIterator<(String, Value)> for Doc {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            children: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Doc {
    type Item = (String, Value);
    type IntoIter = btree_map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.children.into_iter()
    }
}

impl<'a> IntoIterator for &'a Doc {
    type Item = (&'a String, &'a Value);
    type IntoIter = btree_map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.children.iter()
    }
}

impl TryFrom<Value> for Doc {
    type Error = Value;

    /// Unwraps a mapping, handing back the original value if it is anything else.
    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Doc(doc) => Ok(doc),
            other => Err(other),
        }
    }
}
