//! A single named, optionally typed column of a table schema.

use crate::check;
use crate::error::Result;

/// One field of a [`TClass`](crate::TClass): a name and an optional value
/// type.
///
/// The name must be a legal identifier (1–60 letters, digits, or
/// underscores, starting with a letter or underscore, not a reserved
/// word). The vtype, when present, is a built-in type name or a ttype
/// name.
///
/// # Examples
///
/// ```rust
/// use uxf::Field;
///
/// let field = Field::new("Price", Some("real")).unwrap();
/// assert_eq!(field.name(), "Price");
/// assert_eq!(field.vtype(), Some("real"));
///
/// assert!(Field::new("int", None).is_err()); // reserved word
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Field {
    name: String,
    vtype: Option<String>,
}

impl Field {
    /// Creates a field, validating the name and vtype.
    ///
    /// # Errors
    ///
    /// Fails with `E-TYPE-RESERVED` for reserved words and `E-TYPE-IDENT`
    /// for malformed names.
    pub fn new(name: &str, vtype: Option<&str>) -> Result<Self> {
        check::check_ident(name)?;
        if let Some(vtype) = vtype {
            check::check_vtype(vtype)?;
        }
        Ok(Field {
            name: name.to_string(),
            vtype: vtype.map(str::to_string),
        })
    }

    /// The field's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The field's value type, if declared.
    #[must_use]
    pub fn vtype(&self) -> Option<&str> {
        self.vtype.as_deref()
    }
}
