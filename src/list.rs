//! The UXF list: an ordered sequence of values with an optional element
//! type and an optional comment.

use crate::check;
use crate::error::Result;
use crate::value::Value;

/// An ordered sequence of [`Value`]s.
///
/// A list may carry a *vtype* — a built-in type name or a ttype name —
/// constraining what its elements may be (`null` always being allowed),
/// and an optional comment.
///
/// # Examples
///
/// ```rust
/// use uxf::{List, Value};
///
/// let mut list = List::default();
/// list.push(Value::from(1));
/// list.push(Value::Null);
/// assert_eq!(list.len(), 2);
/// assert_eq!(list.get(0), Some(&Value::Int(1)));
/// ```
#[derive(Clone, Debug, PartialEq, Default)]
pub struct List {
    vtype: Option<String>,
    comment: Option<String>,
    values: Vec<Value>,
}

impl List {
    /// Creates an empty untyped list.
    #[must_use]
    pub fn new() -> Self {
        List::default()
    }

    /// Creates an empty list with the given element type and comment.
    ///
    /// # Errors
    ///
    /// Fails if `vtype` is neither a built-in type name nor a legal
    /// identifier.
    pub fn with_vtype(vtype: Option<&str>, comment: Option<&str>) -> Result<Self> {
        if let Some(vtype) = vtype {
            check::check_vtype(vtype)?;
        }
        Ok(List {
            vtype: vtype.map(str::to_string),
            comment: comment.map(str::to_string),
            values: Vec::new(),
        })
    }

    /// The element type constraint, if any.
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

    /// The number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if the list has no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Appends a value. No type checking happens here; use
    /// [`Uxf::validate`](crate::Uxf::validate) to re-check a built tree.
    pub fn push(&mut self, value: Value) {
        self.values.push(value);
    }

    /// Returns the element at `index`, if in bounds.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Value> {
        self.values.get_mut(index)
    }

    /// Iterates over the elements in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.values.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> std::slice::IterMut<'_, Value> {
        self.values.iter_mut()
    }
}

impl IntoIterator for List {
    type Item = Value;
    type IntoIter = std::vec::IntoIter<Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.into_iter()
    }
}

impl<'a> IntoIterator for &'a List {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}

impl FromIterator<Value> for List {
    fn from_iter<T: IntoIterator<Item = Value>>(iter: T) -> Self {
        List {
            vtype: None,
            comment: None,
            values: Vec::from_iter(iter),
        }
    }
}
