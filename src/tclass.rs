//! Table schemas (*ttypes*).
//!
//! A [`TClass`] gives a table its shape: a validated ttype name, zero or
//! more [`Field`]s, and an optional comment. A TClass with no fields is
//! legal and acts as an enumerated tag — its tables never hold values.

use crate::check;
use crate::error::Result;
use crate::field::Field;

/// A user-defined table schema.
///
/// # Examples
///
/// ```rust
/// use uxf::{Field, TClass};
///
/// let tclass = TClass::new(
///     "Point",
///     vec![
///         Field::new("x", Some("real")).unwrap(),
///         Field::new("y", Some("real")).unwrap(),
///     ],
///     None,
/// )
/// .unwrap();
/// assert_eq!(tclass.ttype(), "Point");
/// assert_eq!(tclass.len(), 2);
/// assert!(!tclass.is_fieldless());
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct TClass {
    ttype: String,
    fields: Vec<Field>,
    comment: Option<String>,
}

impl TClass {
    /// Creates a schema with the given fields.
    ///
    /// # Errors
    ///
    /// Fails if `ttype` is reserved or malformed.
    pub fn new(ttype: &str, fields: Vec<Field>, comment: Option<&str>) -> Result<Self> {
        check::check_ident(ttype)?;
        Ok(TClass {
            ttype: ttype.to_string(),
            fields,
            comment: comment.map(str::to_string),
        })
    }

    /// Creates a fieldless schema (an enumerated tag).
    ///
    /// # Errors
    ///
    /// Fails if `ttype` is reserved or malformed.
    pub fn new_fieldless(ttype: &str, comment: Option<&str>) -> Result<Self> {
        TClass::new(ttype, Vec::new(), comment)
    }

    /// The schema's name.
    #[must_use]
    pub fn ttype(&self) -> &str {
        &self.ttype
    }

    /// The fields, in declaration order.
    #[must_use]
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// The comment, if any.
    #[must_use]
    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    /// The number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` for a schema with no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Returns `true` for a schema with no fields.
    #[must_use]
    pub fn is_fieldless(&self) -> bool {
        self.fields.is_empty()
    }

    /// Structural equality: same name and same fields (names and vtypes,
    /// in order), ignoring comments.
    ///
    /// This is the equivalence under which duplicate definitions — e.g.
    /// the same ttype arriving via two imports — coalesce silently.
    #[must_use]
    pub fn same_structure(&self, other: &TClass) -> bool {
        self.ttype == other.ttype && self.fields == other.fields
    }
}
