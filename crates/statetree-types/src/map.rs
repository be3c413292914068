//! Persistent ordered map with structural sharing.
//!
//! A [`StateMap`] is never mutated in place. Every write returns a new map;
//! the old one stays valid. Maps are `im::OrdMap`s, so a write copies only
//! the B-tree nodes on the way to the written key, and the values held in
//! those nodes are reference-counted handles. Every subtree and leaf off the
//! written path is shared between the old and new versions.

use std::collections::BTreeMap;
use std::fmt;

use im::OrdMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{ValueError, ValueResult};
use crate::path::StatePath;
use crate::value::Value;

/// An immutable, ordered map from string keys to [`Value`]s.
#[derive(Clone, Default, PartialEq)]
pub struct StateMap {
    entries: OrdMap<String, Value>,
}

impl StateMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys at this level.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the map has no keys.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up a direct child by key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Returns `true` if `key` is bound at this level.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.entries.iter()
    }

    /// Keys in order.
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.entries.keys()
    }

    /// Returns `true` if both maps share the same root node.
    ///
    /// This is how structural sharing is observed: a subtree untouched by a
    /// write is `ptr_eq` to its counterpart in the previous version.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        self.entries.ptr_eq(&other.entries)
    }

    /// Return a new map with `key` bound to `value`.
    pub fn insert(&self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            entries: self.entries.update(key.into(), value.into()),
        }
    }

    /// Return a new map without `key`. Unchanged if `key` is absent.
    pub fn remove(&self, key: &str) -> Self {
        if !self.contains_key(key) {
            return self.clone();
        }
        Self {
            entries: self.entries.without(key),
        }
    }

    /// Follow `path` from this map.
    ///
    /// Returns `None` if a key is missing or an intermediate value is not a
    /// map. The empty path has no `Value` to borrow and also yields `None`;
    /// callers wanting the root should use the map itself.
    pub fn get_in(&self, path: &StatePath) -> Option<&Value> {
        let (last, parents) = path.segments().split_last()?;
        let mut node = self;
        for key in parents {
            node = node.get(key)?.as_map()?;
        }
        node.get(last)
    }

    /// Return a new map with `value` written at `path`.
    ///
    /// Missing intermediate keys, and intermediate keys holding a leaf, are
    /// replaced by empty maps on the way down. At the empty path the value
    /// replaces the whole map, which requires it to be a map itself.
    pub fn set_in(&self, path: &StatePath, value: Value) -> ValueResult<Self> {
        if path.is_root() {
            return match value {
                Value::Map(map) => Ok(map),
                other => Err(ValueError::RootNotMap {
                    found: other.kind(),
                }),
            };
        }
        Ok(self.assoc_in(path.segments(), value))
    }

    /// Apply `f` to the value at `path` and write the result back.
    ///
    /// `f` receives an empty map when nothing is stored at `path`, and the
    /// whole map (as [`Value::Map`]) when `path` is empty.
    pub fn update_in<F>(&self, path: &StatePath, f: F) -> ValueResult<Self>
    where
        F: FnOnce(Value) -> Value,
    {
        let current = self.value_at_or_empty(path);
        self.set_in(path, f(current))
    }

    /// The value at `path`, or an empty map if there is none.
    pub fn value_at_or_empty(&self, path: &StatePath) -> Value {
        if path.is_root() {
            return Value::Map(self.clone());
        }
        self.get_in(path).cloned().unwrap_or_else(Value::empty_map)
    }

    fn assoc_in(&self, segments: &[String], value: Value) -> Self {
        let Some((head, rest)) = segments.split_first() else {
            return self.clone();
        };
        let child = if rest.is_empty() {
            value
        } else {
            let existing = match self.get(head) {
                Some(Value::Map(map)) => map.clone(),
                _ => StateMap::new(),
            };
            Value::Map(existing.assoc_in(rest, value))
        };
        self.insert(head.clone(), child)
    }
}

impl From<BTreeMap<String, Value>> for StateMap {
    fn from(entries: BTreeMap<String, Value>) -> Self {
        entries.into_iter().collect()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for StateMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl fmt::Debug for StateMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.entries.iter()).finish()
    }
}

impl Serialize for StateMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.entries.iter())
    }
}

impl<'de> Deserialize<'de> for StateMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        BTreeMap::<String, Value>::deserialize(deserializer).map(Self::from)
    }
}
