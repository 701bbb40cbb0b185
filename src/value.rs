//! Dynamic value representation for UXF data.
//!
//! This module provides the [`Value`] enum which represents any valid UXF
//! value, and the [`Key`] enum covering the subset of values that may key
//! a UXF map.
//!
//! ## Core Types
//!
//! - [`Value`]: a tagged union over null, bool, int, real, date, datetime,
//!   str, bytes, list, map, and table
//! - [`Key`]: the hashable subset `int | date | datetime | str | bytes`
//!
//! ## Usage Patterns
//!
//! ### Creating Values
//!
//! ```rust
//! use uxf::Value;
//!
//! let null = Value::Null;
//! let flag = Value::from(true);
//! let count = Value::from(42);
//! let name = Value::from("hello");
//! ```
//!
//! ### Type Checking and Extraction
//!
//! ```rust
//! use uxf::Value;
//!
//! let value = Value::from(42);
//! assert!(value.is_int());
//! assert_eq!(value.as_int(), Some(42));
//! assert_eq!(value.as_str(), None);
//! ```
//!
//! ### Interop
//!
//! `Value` implements `serde::Serialize` (lists as sequences, maps as
//! maps, tables as sequences of field-name→value maps), so UXF data can be
//! handed to any serde format:
//!
//! ```rust
//! let doc = uxf::from_str("uxf 1.0\n[1 2 3]\n").unwrap();
//! let json = serde_json::to_string(doc.value()).unwrap();
//! assert_eq!(json, "[1,2,3]");
//! ```

use crate::list::List;
use crate::map::Map;
use crate::table::Table;
use chrono::{NaiveDate, NaiveDateTime};
use serde::ser::{SerializeMap, SerializeSeq, Serializer};
use serde::Serialize;

pub(crate) const ISO_DATE: &str = "%Y-%m-%d";
pub(crate) const ISO_DATETIME: &str = "%Y-%m-%dT%H:%M:%S";
pub(crate) const ISO_DATETIME_NO_SECONDS: &str = "%Y-%m-%dT%H:%M";

/// A dynamically-typed representation of any valid UXF value.
///
/// Scalar arms hold their payload directly; collection arms own their
/// [`List`], [`Map`], or [`Table`]. The tree is strictly owning — no
/// sharing, no cycles.
#[derive(Clone, Debug, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Real(f64),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Str(String),
    Bytes(Vec<u8>),
    List(List),
    Map(Map),
    Table(Table),
}

/// The subset of values that may be used as map keys.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    Int(i64),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Str(String),
    Bytes(Vec<u8>),
}

impl Value {
    /// Returns `true` if the value is null.
    #[inline]
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns `true` if the value is a boolean.
    #[inline]
    #[must_use]
    pub const fn is_bool(&self) -> bool {
        matches!(self, Value::Bool(_))
    }

    /// Returns `true` if the value is an integer.
    #[inline]
    #[must_use]
    pub const fn is_int(&self) -> bool {
        matches!(self, Value::Int(_))
    }

    /// Returns `true` if the value is a real.
    #[inline]
    #[must_use]
    pub const fn is_real(&self) -> bool {
        matches!(self, Value::Real(_))
    }

    /// Returns `true` if the value is a date.
    #[inline]
    #[must_use]
    pub const fn is_date(&self) -> bool {
        matches!(self, Value::Date(_))
    }

    /// Returns `true` if the value is a datetime.
    #[inline]
    #[must_use]
    pub const fn is_datetime(&self) -> bool {
        matches!(self, Value::DateTime(_))
    }

    /// Returns `true` if the value is a string.
    #[inline]
    #[must_use]
    pub const fn is_str(&self) -> bool {
        matches!(self, Value::Str(_))
    }

    /// Returns `true` if the value is a byte string.
    #[inline]
    #[must_use]
    pub const fn is_bytes(&self) -> bool {
        matches!(self, Value::Bytes(_))
    }

    /// Returns `true` if the value is a list.
    #[inline]
    #[must_use]
    pub const fn is_list(&self) -> bool {
        matches!(self, Value::List(_))
    }

    /// Returns `true` if the value is a map.
    #[inline]
    #[must_use]
    pub const fn is_map(&self) -> bool {
        matches!(self, Value::Map(_))
    }

    /// Returns `true` if the value is a table.
    #[inline]
    #[must_use]
    pub const fn is_table(&self) -> bool {
        matches!(self, Value::Table(_))
    }

    /// Returns `true` for any value other than list, map, or table.
    #[inline]
    #[must_use]
    pub const fn is_scalar(&self) -> bool {
        !matches!(self, Value::List(_) | Value::Map(_) | Value::Table(_))
    }

    /// If the value is a boolean, returns it.
    #[inline]
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// If the value is an integer, returns it.
    #[inline]
    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// If the value is a real, returns it.
    #[inline]
    #[must_use]
    pub fn as_real(&self) -> Option<f64> {
        match self {
            Value::Real(r) => Some(*r),
            _ => None,
        }
    }

    /// If the value is a string, returns a reference to it.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// If the value is a byte string, returns a reference to it.
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }

    /// If the value is a date, returns it.
    #[inline]
    #[must_use]
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Value::Date(d) => Some(*d),
            _ => None,
        }
    }

    /// If the value is a datetime, returns it.
    #[inline]
    #[must_use]
    pub fn as_datetime(&self) -> Option<NaiveDateTime> {
        match self {
            Value::DateTime(dt) => Some(*dt),
            _ => None,
        }
    }

    /// If the value is a list, returns a reference to it.
    #[inline]
    #[must_use]
    pub fn as_list(&self) -> Option<&List> {
        match self {
            Value::List(lst) => Some(lst),
            _ => None,
        }
    }

    /// If the value is a map, returns a reference to it.
    #[inline]
    #[must_use]
    pub fn as_map(&self) -> Option<&Map> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    /// If the value is a table, returns a reference to it.
    #[inline]
    #[must_use]
    pub fn as_table(&self) -> Option<&Table> {
        match self {
            Value::Table(t) => Some(t),
            _ => None,
        }
    }

    /// The UXF type name of this value (`null` for [`Value::Null`],
    /// ttype name for tables).
    #[must_use]
    pub fn type_name(&self) -> &str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Real(_) => "real",
            Value::Date(_) => "date",
            Value::DateTime(_) => "datetime",
            Value::Str(_) => "str",
            Value::Bytes(_) => "bytes",
            Value::List(_) => "list",
            Value::Map(_) => "map",
            Value::Table(t) => t.ttype(),
        }
    }
}

impl Key {
    /// The UXF type name of this key.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Key::Int(_) => "int",
            Key::Date(_) => "date",
            Key::DateTime(_) => "datetime",
            Key::Str(_) => "str",
            Key::Bytes(_) => "bytes",
        }
    }
}

impl From<Key> for Value {
    fn from(key: Key) -> Self {
        match key {
            Key::Int(i) => Value::Int(i),
            Key::Date(d) => Value::Date(d),
            Key::DateTime(dt) => Value::DateTime(dt),
            Key::Str(s) => Value::Str(s),
            Key::Bytes(b) => Value::Bytes(b),
        }
    }
}

impl TryFrom<Value> for Key {
    type Error = Value;

    /// Fails with the original value when it is not a legal key kind.
    fn try_from(value: Value) -> Result<Self, Value> {
        match value {
            Value::Int(i) => Ok(Key::Int(i)),
            Value::Date(d) => Ok(Key::Date(d)),
            Value::DateTime(dt) => Ok(Key::DateTime(dt)),
            Value::Str(s) => Ok(Key::Str(s)),
            Value::Bytes(b) => Ok(Key::Bytes(b)),
            other => Err(other),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(value as i64)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Real(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}

impl From<Vec<u8>> for Value {
    fn from(value: Vec<u8>) -> Self {
        Value::Bytes(value)
    }
}

impl From<NaiveDate> for Value {
    fn from(value: NaiveDate) -> Self {
        Value::Date(value)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(value: NaiveDateTime) -> Self {
        Value::DateTime(value)
    }
}

impl From<List> for Value {
    fn from(value: List) -> Self {
        Value::List(value)
    }
}

impl From<Map> for Value {
    fn from(value: Map) -> Self {
        Value::Map(value)
    }
}

impl From<Table> for Value {
    fn from(value: Table) -> Self {
        Value::Table(value)
    }
}

impl From<&str> for Key {
    fn from(value: &str) -> Self {
        Key::Str(value.to_string())
    }
}

impl From<String> for Key {
    fn from(value: String) -> Self {
        Key::Str(value)
    }
}

impl From<i64> for Key {
    fn from(value: i64) -> Self {
        Key::Int(value)
    }
}

/// Converts a string to the most specific UXF value it spells.
///
/// Recognizes (case-insensitively) `t`, `true`, `y`, `yes` and `f`,
/// `false`, `n`, `no` as booleans, then tries int, real, datetime
/// (`YYYY-MM-DDTHH:MM[:SS]`), and date (`YYYY-MM-DD`), in that order.
/// Anything else — including the empty string — comes back unchanged as
/// [`Value::Str`].
///
/// # Examples
///
/// ```rust
/// use uxf::{naturalize, Value};
///
/// assert_eq!(naturalize("yes"), Value::Bool(true));
/// assert_eq!(naturalize("-17"), Value::Int(-17));
/// assert_eq!(naturalize("1.5"), Value::Real(1.5));
/// assert_eq!(naturalize(""), Value::Str(String::new()));
/// ```
#[must_use]
pub fn naturalize(s: &str) -> Value {
    match s.to_uppercase().as_str() {
        "T" | "TRUE" | "Y" | "YES" => return Value::Bool(true),
        "F" | "FALSE" | "N" | "NO" => return Value::Bool(false),
        _ => {}
    }
    if let Ok(i) = s.parse::<i64>() {
        return Value::Int(i);
    }
    if let Ok(r) = s.parse::<f64>() {
        return Value::Real(r);
    }
    if s.contains('T') {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, ISO_DATETIME) {
            return Value::DateTime(dt);
        }
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, ISO_DATETIME_NO_SECONDS) {
            return Value::DateTime(dt);
        }
    } else if let Ok(d) = NaiveDate::parse_from_str(s, ISO_DATE) {
        return Value::Date(d);
    }
    Value::Str(s.to_string())
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(i) => serializer.serialize_i64(*i),
            Value::Real(r) => serializer.serialize_f64(*r),
            Value::Date(d) => serializer.serialize_str(&d.format(ISO_DATE).to_string()),
            Value::DateTime(dt) => {
                serializer.serialize_str(&dt.format(ISO_DATETIME).to_string())
            }
            Value::Str(s) => serializer.serialize_str(s),
            Value::Bytes(b) => serializer.serialize_bytes(b),
            Value::List(lst) => {
                let mut seq = serializer.serialize_seq(Some(lst.len()))?;
                for value in lst.iter() {
                    seq.serialize_element(value)?;
                }
                seq.end()
            }
            Value::Map(m) => {
                let mut map = serializer.serialize_map(Some(m.len()))?;
                for (key, value) in m.iter() {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
            Value::Table(t) => {
                struct Record<'a> {
                    names: &'a [&'a str],
                    cells: &'a [Value],
                }
                impl Serialize for Record<'_> {
                    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
                    where
                        S: Serializer,
                    {
                        let mut row = serializer.serialize_map(Some(self.names.len()))?;
                        for (name, cell) in self.names.iter().zip(self.cells) {
                            row.serialize_entry(name, cell)?;
                        }
                        row.end()
                    }
                }
                let names: Vec<&str> =
                    t.tclass().fields().iter().map(|f| f.name()).collect();
                let mut seq = serializer.serialize_seq(Some(t.len()))?;
                for cells in t.records() {
                    seq.serialize_element(&Record { names: &names, cells })?;
                }
                seq.end()
            }
        }
    }
}

impl Serialize for Key {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Key::Int(i) => serializer.serialize_i64(*i),
            Key::Date(d) => serializer.serialize_str(&d.format(ISO_DATE).to_string()),
            Key::DateTime(dt) => {
                serializer.serialize_str(&dt.format(ISO_DATETIME).to_string())
            }
            Key::Str(s) => serializer.serialize_str(s),
            Key::Bytes(b) => {
                let hex: String = b.iter().map(|byte| format!("{byte:02X}")).collect();
                serializer.serialize_str(&hex)
            }
        }
    }
}
