//! The UXF table: records conforming to a [`TClass`].
//!
//! Cells are stored in one flat row-major vector rather than a vector of
//! row vectors, so iterating a large table touches contiguous memory.
//! Records are exposed as slices via [`Table::records`] and individual
//! cells via [`Table::get`].

use crate::error::{Error, Result};
use crate::event::{self, Event};
use crate::tclass::TClass;
use crate::value::Value;

/// An ordered sequence of fixed-length records.
///
/// Every record has exactly as many cells as the table's [`TClass`] has
/// fields. A table whose TClass is fieldless never holds cells; it acts as
/// an enumerated tag.
///
/// # Examples
///
/// ```rust
/// use uxf::{Field, Table, TClass, Value};
///
/// let tclass = TClass::new(
///     "Pair",
///     vec![Field::new("a", None).unwrap(), Field::new("b", None).unwrap()],
///     None,
/// )
/// .unwrap();
/// let mut table = Table::new(tclass, None);
/// table.push_record(vec![Value::from(1), Value::from(2)]).unwrap();
/// assert_eq!(table.len(), 1);
/// assert_eq!(table.get(0, 1), Some(&Value::Int(2)));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Table {
    tclass: TClass,
    comment: Option<String>,
    cells: Vec<Value>,
}

impl Table {
    /// Creates an empty table over the given schema.
    #[must_use]
    pub fn new(tclass: TClass, comment: Option<&str>) -> Self {
        Table {
            tclass,
            comment: comment.map(str::to_string),
            cells: Vec::new(),
        }
    }

    /// The schema's name.
    #[must_use]
    pub fn ttype(&self) -> &str {
        self.tclass.ttype()
    }

    /// The table's schema.
    #[must_use]
    pub fn tclass(&self) -> &TClass {
        &self.tclass
    }

    /// The comment, if any.
    #[must_use]
    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    pub fn set_comment(&mut self, comment: Option<&str>) {
        self.comment = comment.map(str::to_string);
    }

    /// The number of complete records.
    #[must_use]
    pub fn len(&self) -> usize {
        let width = self.tclass.len();
        if width == 0 {
            0
        } else {
            self.cells.len() / width
        }
    }

    /// Returns `true` if the table holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// The cell at `(row, col)`, if in bounds.
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> Option<&Value> {
        let width = self.tclass.len();
        if col >= width {
            return None;
        }
        self.cells.get(row * width + col)
    }

    pub fn get_mut(&mut self, row: usize, col: usize) -> Option<&mut Value> {
        let width = self.tclass.len();
        if col >= width {
            return None;
        }
        self.cells.get_mut(row * width + col)
    }

    /// Appends a single cell, filling records left to right.
    ///
    /// # Errors
    ///
    /// Fails for fieldless tables, which cannot hold cells.
    pub fn push(&mut self, value: Value) -> Result<()> {
        if self.tclass.is_fieldless() {
            return Err(Error::fatal(Event::error(
                0,
                event::E_PARSE_TABLE_LEN,
                format!("fieldless table {} cannot hold values", self.ttype()),
                "-",
            )));
        }
        self.cells.push(value);
        Ok(())
    }

    /// Appends one whole record.
    ///
    /// # Errors
    ///
    /// Fails unless `record` has exactly one cell per field and the table
    /// currently ends on a record boundary.
    pub fn push_record(&mut self, record: Vec<Value>) -> Result<()> {
        let width = self.tclass.len();
        if record.len() != width || width == 0 {
            return Err(Error::fatal(Event::error(
                0,
                event::E_PARSE_TABLE_LEN,
                format!(
                    "table {} records need {width} values, got {}",
                    self.ttype(),
                    record.len()
                ),
                "-",
            )));
        }
        if !self.ends_on_record_boundary() {
            return Err(Error::fatal(Event::error(
                0,
                event::E_PARSE_TABLE_LEN,
                format!("table {} has a dangling partial record", self.ttype()),
                "-",
            )));
        }
        self.cells.extend(record);
        Ok(())
    }

    /// Iterates over complete records as slices.
    pub fn records(&self) -> impl Iterator<Item = &[Value]> {
        let width = self.tclass.len().max(1);
        self.cells.chunks_exact(width)
    }

    pub(crate) fn cells_mut(&mut self) -> std::slice::IterMut<'_, Value> {
        self.cells.iter_mut()
    }

    pub(crate) fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub(crate) fn ends_on_record_boundary(&self) -> bool {
        let width = self.tclass.len();
        width == 0 || self.cells.len() % width == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::Field;

    fn pair() -> TClass {
        TClass::new(
            "Pair",
            vec![Field::new("a", None).unwrap(), Field::new("b", None).unwrap()],
            None,
        )
        .unwrap()
    }

    #[test]
    fn flat_storage_roundtrips_rows() {
        let mut table = Table::new(pair(), None);
        table.push_record(vec![Value::from(1), Value::from(2)]).unwrap();
        table.push_record(vec![Value::from(3), Value::from(4)]).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.get(0, 0), Some(&Value::Int(1)));
        assert_eq!(table.get(1, 1), Some(&Value::Int(4)));
        assert_eq!(table.get(1, 2), None);
        assert_eq!(table.get(2, 0), None);
        let rows: Vec<&[Value]> = table.records().collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1], &[Value::Int(3), Value::Int(4)][..]);
    }

    #[test]
    fn record_arity_is_checked() {
        let mut table = Table::new(pair(), None);
        let err = table
            .push_record(vec![Value::from(1), Value::from(2), Value::from(3)])
            .unwrap_err();
        assert_eq!(err.code(), Some("E-PARSE-TABLE-LEN"));
    }

    #[test]
    fn fieldless_rejects_cells() {
        let tag = TClass::new_fieldless("Sealed", None).unwrap();
        let mut table = Table::new(tag, None);
        assert!(table.push(Value::Null).is_err());
        assert!(table.push_record(vec![]).is_err());
        assert_eq!(table.len(), 0);
        assert_eq!(table.records().count(), 0);
    }

    #[test]
    fn cells_may_hold_collections() {
        let mut table = Table::new(pair(), None);
        let nested: crate::List = [Value::from(1)].into_iter().collect();
        table
            .push_record(vec![Value::List(nested), Value::Null])
            .unwrap();
        assert!(table.get(0, 0).unwrap().is_list());
    }
}
