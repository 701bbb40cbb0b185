//! Ordered map type for UXF data.
//!
//! This module provides [`Map`], a wrapper around [`IndexMap`] that keeps
//! key/value pairs in insertion order. Order preservation is a format
//! requirement: reading a UXF map and writing it back must reproduce the
//! original entry order.
//!
//! ## Why IndexMap?
//!
//! A plain `HashMap` iterates in arbitrary order, which would scramble
//! documents on round-trip. `IndexMap` gives hash-map lookups plus a
//! stable, insertion-ordered iteration.
//!
//! ## Examples
//!
//! ```rust
//! use uxf::{Key, Map, Value};
//!
//! let mut map = Map::default();
//! map.insert(Key::from("name"), Value::from("Alice"));
//! map.insert(Key::from("age"), Value::from(30));
//!
//! assert_eq!(map.len(), 2);
//! assert_eq!(
//!     map.get(&Key::from("name")).and_then(|v| v.as_str()),
//!     Some("Alice")
//! );
//! ```

use crate::check;
use crate::error::{Error, Result};
use crate::event::{self, Event};
use crate::value::{Key, Value};
use indexmap::IndexMap;

/// An insertion-ordered mapping from [`Key`] to [`Value`].
///
/// A map may carry a *ktype* (one of `bytes`, `date`, `datetime`, `int`,
/// `str`) constraining its keys and a *vtype* constraining its values, and
/// an optional comment.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct Map {
    ktype: Option<String>,
    vtype: Option<String>,
    comment: Option<String>,
    items: IndexMap<Key, Value>,
}

impl Map {
    /// Creates an empty untyped map.
    #[must_use]
    pub fn new() -> Self {
        Map::default()
    }

    /// Creates an empty map with the given key/value type constraints and
    /// comment.
    ///
    /// # Errors
    ///
    /// Fails if `ktype` is not a legal key type, or `vtype` is neither a
    /// built-in type name nor a legal identifier. A `vtype` without a
    /// `ktype` is also rejected — the concrete syntax cannot express it.
    pub fn with_types(
        ktype: Option<&str>,
        vtype: Option<&str>,
        comment: Option<&str>,
    ) -> Result<Self> {
        if let Some(ktype) = ktype {
            if !check::is_ktype(ktype) {
                return Err(Error::fatal(Event::error(
                    0,
                    event::E_TYPE_UNKNOWN,
                    format!("map key type must be one of {:?}, got {ktype}", check::KTYPES),
                    "-",
                )));
            }
        }
        if let Some(vtype) = vtype {
            if ktype.is_none() {
                return Err(Error::fatal(Event::error(
                    0,
                    event::E_TYPE_UNKNOWN,
                    "a map value type requires a key type",
                    "-",
                )));
            }
            check::check_vtype(vtype)?;
        }
        Ok(Map {
            ktype: ktype.map(str::to_string),
            vtype: vtype.map(str::to_string),
            comment: comment.map(str::to_string),
            items: IndexMap::new(),
        })
    }

    /// The key type constraint, if any.
    #[must_use]
    pub fn ktype(&self) -> Option<&str> {
        self.ktype.as_deref()
    }

    /// The value type constraint, if any.
    #[must_use]
    pub fn vtype(&self) -> Option<&str> {
        self.vtype.as_deref()
    }

    /// The comment, if any.
    #[must_use]
    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    pub fn set_comment(&mut self, comment: Option<&str>) {
        self.comment = comment.map(str::to_string);
    }

    /// Inserts a key/value pair, returning the previous value if the key
    /// was already present (the entry keeps its original position).
    pub fn insert(&mut self, key: Key, value: Value) -> Option<Value> {
        self.items.insert(key, value)
    }

    /// Returns a reference to the value for `key`.
    #[must_use]
    pub fn get(&self, key: &Key) -> Option<&Value> {
        self.items.get(key)
    }

    pub fn get_mut(&mut self, key: &Key) -> Option<&mut Value> {
        self.items.get_mut(key)
    }

    /// Returns `true` if the map contains `key`.
    #[must_use]
    pub fn contains_key(&self, key: &Key) -> bool {
        self.items.contains_key(key)
    }

    /// The number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if the map has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterates over entries in insertion order.
    pub fn iter(&self) -> indexmap::map::Iter<'_, Key, Value> {
        self.items.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> indexmap::map::IterMut<'_, Key, Value> {
        self.items.iter_mut()
    }

    /// Iterates over keys in insertion order.
    pub fn keys(&self) -> indexmap::map::Keys<'_, Key, Value> {
        self.items.keys()
    }

    /// Iterates over values in insertion order.
    pub fn values(&self) -> indexmap::map::Values<'_, Key, Value> {
        self.items.values()
    }
}

impl IntoIterator for Map {
    type Item = (Key, Value);
    type IntoIter = indexmap::map::IntoIter<Key, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl FromIterator<(Key, Value)> for Map {
    fn from_iter<T: IntoIterator<Item = (Key, Value)>>(iter: T) -> Self {
        Map {
            ktype: None,
            vtype: None,
            comment: None,
            items: IndexMap::from_iter(iter),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insertion_order_is_preserved() {
        let mut map = Map::new();
        for key in ["zebra", "aardvark", "mongoose"] {
            map.insert(Key::from(key), Value::Null);
        }
        let keys: Vec<&Key> = map.keys().collect();
        assert_eq!(
            keys,
            vec![
                &Key::from("zebra"),
                &Key::from("aardvark"),
                &Key::from("mongoose")
            ]
        );
    }

    #[test]
    fn reinsert_keeps_position_and_returns_old() {
        let mut map = Map::new();
        map.insert(Key::from(1i64), Value::from("a"));
        map.insert(Key::from(2i64), Value::from("b"));
        let old = map.insert(Key::from(1i64), Value::from("c"));
        assert_eq!(old, Some(Value::Str("a".into())));
        let keys: Vec<&Key> = map.keys().collect();
        assert_eq!(keys, vec![&Key::from(1i64), &Key::from(2i64)]);
    }

    #[test]
    fn typed_construction() {
        assert!(Map::with_types(Some("str"), Some("int"), None).is_ok());
        assert!(Map::with_types(Some("int"), None, Some("ids")).is_ok());
        // bool is not a key type
        assert!(Map::with_types(Some("bool"), None, None).is_err());
        // vtype without ktype is unrepresentable
        assert!(Map::with_types(None, Some("int"), None).is_err());
    }

    #[test]
    fn mixed_key_kinds() {
        let mut map = Map::new();
        map.insert(Key::from(7i64), Value::from("seven"));
        map.insert(Key::Bytes(vec![0xAB, 0xCD]), Value::from("bytes"));
        assert!(map.contains_key(&Key::from(7i64)));
        assert!(map.contains_key(&Key::Bytes(vec![0xAB, 0xCD])));
        assert_eq!(map.len(), 2);
    }
}
