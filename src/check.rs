//! Identifier rules, reserved words, and type conformance.
//!
//! UXF identifiers (ttype names and field names) are 1–60 letters, digits,
//! or underscores, start with a letter or underscore, and are never one of
//! the reserved words. Type annotations on containers and fields are
//! checked against values with [`fit_value`].

use crate::error::{Error, Result};
use crate::event::{self, Event};
use crate::value::{naturalize, Value};

pub(crate) const MAX_IDENTIFIER_LEN: usize = 60;

pub(crate) const VTYPE_BOOL: &str = "bool";
pub(crate) const VTYPE_BYTES: &str = "bytes";
pub(crate) const VTYPE_DATE: &str = "date";
pub(crate) const VTYPE_DATETIME: &str = "datetime";
pub(crate) const VTYPE_INT: &str = "int";
pub(crate) const VTYPE_LIST: &str = "list";
pub(crate) const VTYPE_MAP: &str = "map";
pub(crate) const VTYPE_REAL: &str = "real";
pub(crate) const VTYPE_STR: &str = "str";
pub(crate) const VTYPE_TABLE: &str = "table";

const NAME_NULL: &str = "null";
const BOOL_TRUE: &str = "yes";
const BOOL_FALSE: &str = "no";

/// Words that may never be used as ttype or field names.
pub static RESERVED_WORDS: [&str; 13] = [
    VTYPE_BOOL,
    VTYPE_BYTES,
    VTYPE_DATE,
    VTYPE_DATETIME,
    VTYPE_INT,
    VTYPE_LIST,
    VTYPE_MAP,
    NAME_NULL,
    VTYPE_REAL,
    VTYPE_STR,
    VTYPE_TABLE,
    BOOL_TRUE,
    BOOL_FALSE,
];

/// Legal map key types.
pub static KTYPES: [&str; 5] = [VTYPE_BYTES, VTYPE_DATE, VTYPE_DATETIME, VTYPE_INT, VTYPE_STR];

/// Built-in value types (ttype names extend this set per document).
pub static VTYPES: [&str; 10] = [
    VTYPE_BOOL,
    VTYPE_BYTES,
    VTYPE_DATE,
    VTYPE_DATETIME,
    VTYPE_INT,
    VTYPE_LIST,
    VTYPE_MAP,
    VTYPE_REAL,
    VTYPE_STR,
    VTYPE_TABLE,
];

pub(crate) fn is_reserved(word: &str) -> bool {
    RESERVED_WORDS.contains(&word)
}

pub(crate) fn is_ktype(name: &str) -> bool {
    KTYPES.contains(&name)
}

pub(crate) fn is_builtin_vtype(name: &str) -> bool {
    VTYPES.contains(&name)
}

/// Why a candidate name cannot be used as an identifier, if it can't.
///
/// Returns the stable diagnostic code and a message; `None` means the name
/// is acceptable.
pub(crate) fn ident_problem(name: &str) -> Option<(&'static str, String)> {
    if name.is_empty() {
        return Some((event::E_TYPE_IDENT, "identifiers must be nonempty".to_string()));
    }
    if is_reserved(name) {
        return Some((
            event::E_TYPE_RESERVED,
            format!("a reserved word cannot be used as an identifier, got {name}"),
        ));
    }
    let mut chars = name.chars();
    let first = chars.next().unwrap_or('\0');
    if !(first == '_' || first.is_alphabetic()) {
        return Some((
            event::E_TYPE_IDENT,
            format!("identifiers must start with a letter or underscore, got {name}"),
        ));
    }
    if name.chars().count() > MAX_IDENTIFIER_LEN {
        return Some((
            event::E_TYPE_IDENT,
            format!("identifiers may be at most {MAX_IDENTIFIER_LEN} characters long, got {name}"),
        ));
    }
    for c in chars {
        if !(c == '_' || c.is_alphanumeric()) {
            return Some((
                event::E_TYPE_IDENT,
                format!("identifiers may only contain letters, digits, or underscores, got {name}"),
            ));
        }
    }
    None
}

/// Validates a ttype or field name, for use by API constructors.
pub(crate) fn check_ident(name: &str) -> Result<()> {
    match ident_problem(name) {
        None => Ok(()),
        Some((code, message)) => Err(Error::fatal(Event::error(0, code, message, "-"))),
    }
}

/// Validates a vtype annotation: a built-in type name or a ttype-shaped
/// identifier (whether the ttype exists is resolved against the document).
pub(crate) fn check_vtype(vtype: &str) -> Result<()> {
    if is_builtin_vtype(vtype) {
        Ok(())
    } else {
        check_ident(vtype)
    }
}

/// The outcome of placing a value in a slot typed `vtype`.
#[derive(Debug, PartialEq)]
pub(crate) enum Fit {
    /// The value conforms as-is (`null` fits every typed slot).
    Ok,
    /// An int literal in a `real` slot; the promotion is mandatory.
    Promoted(Value),
    /// A fix-types conversion; callers warn `W-TYPE-COERCED`.
    Coerced(Value),
    /// Not assignable.
    Mismatch,
}

/// Checks `value` against the type annotation `vtype`.
///
/// `vtype` not naming a built-in is taken to be a ttype name; whether that
/// ttype is actually defined is invariant territory checked elsewhere.
pub(crate) fn fit_value(vtype: &str, value: &Value, fix_types: bool) -> Fit {
    if value.is_null() {
        return Fit::Ok;
    }
    match vtype {
        VTYPE_BOOL => match value {
            Value::Bool(_) => Fit::Ok,
            Value::Str(s) if fix_types => match naturalize(s) {
                Value::Bool(b) => Fit::Coerced(Value::Bool(b)),
                _ => Fit::Mismatch,
            },
            _ => Fit::Mismatch,
        },
        VTYPE_INT => match value {
            Value::Int(_) => Fit::Ok,
            Value::Real(r) if fix_types && r.fract() == 0.0 => Fit::Coerced(Value::Int(*r as i64)),
            Value::Str(s) if fix_types => match naturalize(s) {
                Value::Int(i) => Fit::Coerced(Value::Int(i)),
                _ => Fit::Mismatch,
            },
            _ => Fit::Mismatch,
        },
        VTYPE_REAL => match value {
            Value::Real(_) => Fit::Ok,
            Value::Int(i) => Fit::Promoted(Value::Real(*i as f64)),
            Value::Str(s) if fix_types => match naturalize(s) {
                Value::Real(r) => Fit::Coerced(Value::Real(r)),
                Value::Int(i) => Fit::Coerced(Value::Real(i as f64)),
                _ => Fit::Mismatch,
            },
            _ => Fit::Mismatch,
        },
        VTYPE_DATE => match value {
            Value::Date(_) => Fit::Ok,
            Value::Str(s) if fix_types => match naturalize(s) {
                Value::Date(d) => Fit::Coerced(Value::Date(d)),
                _ => Fit::Mismatch,
            },
            _ => Fit::Mismatch,
        },
        VTYPE_DATETIME => match value {
            Value::DateTime(_) => Fit::Ok,
            Value::Str(s) if fix_types => match naturalize(s) {
                Value::DateTime(dt) => Fit::Coerced(Value::DateTime(dt)),
                _ => Fit::Mismatch,
            },
            _ => Fit::Mismatch,
        },
        VTYPE_STR => match value {
            Value::Str(_) => Fit::Ok,
            _ => Fit::Mismatch,
        },
        VTYPE_BYTES => match value {
            Value::Bytes(_) => Fit::Ok,
            _ => Fit::Mismatch,
        },
        VTYPE_LIST => match value {
            Value::List(_) => Fit::Ok,
            _ => Fit::Mismatch,
        },
        VTYPE_MAP => match value {
            Value::Map(_) => Fit::Ok,
            _ => Fit::Mismatch,
        },
        VTYPE_TABLE => match value {
            Value::Table(_) => Fit::Ok,
            _ => Fit::Mismatch,
        },
        ttype => match value {
            Value::Table(t) if t.ttype() == ttype => Fit::Ok,
            _ => Fit::Mismatch,
        },
    }
}
