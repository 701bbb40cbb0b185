//! The UXF document root.
//!
//! A [`Uxf`] owns everything read from one UXF source: the custom header
//! text, an optional file comment, the ttype registry, the import table,
//! and exactly one root collection value. Dropping the document drops the
//! whole tree.

use crate::check::{self, Fit};
use crate::error::{Error, Result};
use crate::event::{self, deliver, Event};
use crate::list::List;
use crate::parser::ParseOptions;
use crate::tclass::TClass;
use crate::value::Value;
use indexmap::IndexMap;
use std::collections::HashSet;

/// One in-memory UXF document.
///
/// The root value is always a list, map, or table; a new document holds an
/// empty untyped list.
///
/// # Examples
///
/// ```rust
/// use uxf::{Uxf, Value};
///
/// let mut doc = Uxf::new("Price List", None);
/// assert_eq!(doc.custom(), "Price List");
/// assert!(doc.value().as_list().unwrap().is_empty());
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Uxf {
    custom: String,
    comment: Option<String>,
    tclasses: IndexMap<String, TClass>,
    imports: IndexMap<String, String>,
    value: Value,
}

impl Default for Uxf {
    fn default() -> Self {
        Uxf {
            custom: String::new(),
            comment: None,
            tclasses: IndexMap::new(),
            imports: IndexMap::new(),
            value: Value::List(List::default()),
        }
    }
}

impl Uxf {
    /// Creates an empty document with the given custom text and comment.
    #[must_use]
    pub fn new(custom: &str, comment: Option<&str>) -> Self {
        Uxf {
            custom: custom.to_string(),
            comment: comment.map(str::to_string),
            ..Uxf::default()
        }
    }

    /// The header's custom text (empty if none).
    #[must_use]
    pub fn custom(&self) -> &str {
        &self.custom
    }

    pub fn set_custom(&mut self, custom: &str) {
        self.custom = custom.to_string();
    }

    /// The file-level comment, if any.
    #[must_use]
    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    pub fn set_comment(&mut self, comment: Option<&str>) {
        self.comment = comment.map(str::to_string);
    }

    /// The root value.
    #[must_use]
    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn value_mut(&mut self) -> &mut Value {
        &mut self.value
    }

    /// Replaces the root value.
    ///
    /// # Errors
    ///
    /// Fails unless `value` is a list, map, or table.
    pub fn set_value(&mut self, value: Value) -> Result<()> {
        if !matches!(value, Value::List(_) | Value::Map(_) | Value::Table(_)) {
            return Err(Error::fatal(Event::error(
                0,
                event::E_TYPE_MISMATCH,
                format!(
                    "a document's value must be a list, map, or table, got {}",
                    value.type_name()
                ),
                "-",
            )));
        }
        self.value = value;
        Ok(())
    }

    /// The ttype registry, in first-definition order.
    #[must_use]
    pub fn tclasses(&self) -> &IndexMap<String, TClass> {
        &self.tclasses
    }

    /// Looks up a ttype by name.
    #[must_use]
    pub fn tclass(&self, ttype: &str) -> Option<&TClass> {
        self.tclasses.get(ttype)
    }

    /// The import table: ttype name → the import source it came from.
    #[must_use]
    pub fn imports(&self) -> &IndexMap<String, String> {
        &self.imports
    }

    /// Registers a ttype definition.
    ///
    /// A duplicate that is structurally identical coalesces silently. A
    /// name that arrived via an import is replaced outright (and leaves
    /// the import table) — an in-document definition wins.
    ///
    /// # Errors
    ///
    /// Fails with `E-TYPE-CONFLICT` when the name is already defined
    /// in-document with a different structure.
    pub fn add_tclass(&mut self, tclass: TClass) -> Result<()> {
        let name = tclass.ttype().to_string();
        if let Some(existing) = self.tclasses.get(&name) {
            if self.imports.contains_key(&name) {
                self.imports.shift_remove(&name);
                self.tclasses.insert(name, tclass);
                return Ok(());
            }
            if existing.same_structure(&tclass) {
                return Ok(());
            }
            return Err(Error::fatal(Event::error(
                0,
                event::E_TYPE_CONFLICT,
                format!("conflicting definitions for ttype {name}"),
                "-",
            )));
        }
        self.tclasses.insert(name, tclass);
        Ok(())
    }

    /// Registers a ttype that arrived via the import `source`.
    ///
    /// Collisions across imports coalesce when structurally identical.
    ///
    /// # Errors
    ///
    /// Fails with `E-IMP-CONFLICT` when the name is already bound to a
    /// structurally different ttype.
    pub fn add_imported_tclass(&mut self, tclass: TClass, source: &str) -> Result<()> {
        let name = tclass.ttype().to_string();
        if let Some(existing) = self.tclasses.get(&name) {
            if existing.same_structure(&tclass) {
                return Ok(());
            }
            return Err(Error::fatal(Event::error(
                0,
                event::E_IMP_CONFLICT,
                format!("import {source} redefines ttype {name} differently"),
                "-",
            )));
        }
        self.tclasses.insert(name.clone(), tclass);
        self.imports.insert(name, source.to_string());
        Ok(())
    }

    /// Re-checks the whole tree against its type annotations.
    ///
    /// In strict mode (`options.fix_types == false`) the first violation
    /// aborts via the handler; in fix-types mode convertible values are
    /// rewritten in place with a `W-TYPE-COERCED` warning. Unused ttypes
    /// are reported (`W-TYPE-UNUSED`) and, under `options.drop_unused`,
    /// removed.
    pub fn validate(
        &mut self,
        options: &ParseOptions,
        on_event: &mut dyn FnMut(&Event) -> Result<()>,
    ) -> Result<()> {
        let mut value = std::mem::take(&mut self.value);
        let result = walk_value(&mut value, None, &self.tclasses, options.fix_types, on_event);
        self.value = value;
        result?;
        self.scan_unused(options.drop_unused, on_event)
    }

    /// Reports (and under `drop_unused` removes) ttypes nothing uses.
    pub(crate) fn scan_unused(
        &mut self,
        drop_unused: bool,
        on_event: &mut dyn FnMut(&Event) -> Result<()>,
    ) -> Result<()> {
        let mut used = HashSet::new();
        collect_used_ttypes(&self.value, &mut used);
        // A used ttype pulls in the ttypes its fields reference.
        loop {
            let mut grew = false;
            for (name, tclass) in &self.tclasses {
                if !used.contains(name.as_str()) {
                    continue;
                }
                for field in tclass.fields() {
                    if let Some(vtype) = field.vtype() {
                        if self.tclasses.contains_key(vtype) && used.insert(vtype.to_string()) {
                            grew = true;
                        }
                    }
                }
            }
            if !grew {
                break;
            }
        }
        let unused: Vec<String> = self
            .tclasses
            .keys()
            .filter(|name| !used.contains(name.as_str()))
            .cloned()
            .collect();
        for name in &unused {
            deliver(
                on_event,
                Event::warning(0, event::W_TYPE_UNUSED, format!("unused ttype {name}"), "-"),
            )?;
        }
        if drop_unused {
            for name in &unused {
                self.tclasses.shift_remove(name);
                self.imports.shift_remove(name);
            }
        }
        Ok(())
    }
}

fn collect_used_ttypes(value: &Value, used: &mut HashSet<String>) {
    match value {
        Value::List(lst) => {
            if let Some(vtype) = lst.vtype() {
                used.insert(vtype.to_string());
            }
            for v in lst.iter() {
                collect_used_ttypes(v, used);
            }
        }
        Value::Map(m) => {
            if let Some(vtype) = m.vtype() {
                used.insert(vtype.to_string());
            }
            for (_, v) in m.iter() {
                collect_used_ttypes(v, used);
            }
        }
        Value::Table(t) => {
            used.insert(t.ttype().to_string());
            for record in t.records() {
                for cell in record {
                    collect_used_ttypes(cell, used);
                }
            }
        }
        _ => {}
    }
}

/// Checks a name used as a type annotation against the registry.
fn check_known_type(
    vtype: &str,
    tclasses: &IndexMap<String, TClass>,
    on_event: &mut dyn FnMut(&Event) -> Result<()>,
) -> Result<()> {
    if check::is_builtin_vtype(vtype) || tclasses.contains_key(vtype) {
        Ok(())
    } else {
        deliver(
            on_event,
            Event::error(0, event::E_TYPE_UNKNOWN, format!("unknown type {vtype}"), "-"),
        )
    }
}

fn check_slot(
    vtype: &str,
    slot: &mut Value,
    fix_types: bool,
    on_event: &mut dyn FnMut(&Event) -> Result<()>,
) -> Result<()> {
    match check::fit_value(vtype, slot, fix_types) {
        Fit::Ok => Ok(()),
        Fit::Promoted(fixed) => {
            *slot = fixed;
            Ok(())
        }
        Fit::Coerced(fixed) => {
            let message = format!("converted {} to {vtype}", slot.type_name());
            *slot = fixed;
            deliver(
                on_event,
                Event::warning(0, event::W_TYPE_COERCED, message, "-"),
            )
        }
        Fit::Mismatch => deliver(
            on_event,
            Event::error(
                0,
                event::E_TYPE_MISMATCH,
                format!("expected {vtype}, got {}", slot.type_name()),
                "-",
            ),
        ),
    }
}

fn walk_value(
    value: &mut Value,
    vtype: Option<&str>,
    tclasses: &IndexMap<String, TClass>,
    fix_types: bool,
    on_event: &mut dyn FnMut(&Event) -> Result<()>,
) -> Result<()> {
    if let Some(vtype) = vtype {
        check_known_type(vtype, tclasses, on_event)?;
        check_slot(vtype, value, fix_types, on_event)?;
    }
    match value {
        Value::List(lst) => {
            let vtype = lst.vtype().map(str::to_string);
            for element in lst.iter_mut() {
                walk_value(element, vtype.as_deref(), tclasses, fix_types, on_event)?;
            }
            Ok(())
        }
        Value::Map(m) => {
            if let Some(ktype) = m.ktype() {
                let ktype = ktype.to_string();
                for (key, _) in m.iter() {
                    if key.type_name() != ktype {
                        deliver(
                            on_event,
                            Event::error(
                                0,
                                event::E_TYPE_MISMATCH,
                                format!("expected {ktype} key, got {}", key.type_name()),
                                "-",
                            ),
                        )?;
                    }
                }
            }
            let vtype = m.vtype().map(str::to_string);
            for (_, entry) in m.iter_mut() {
                walk_value(entry, vtype.as_deref(), tclasses, fix_types, on_event)?;
            }
            Ok(())
        }
        Value::Table(t) => {
            match tclasses.get(t.ttype()) {
                None => {
                    return deliver(
                        on_event,
                        Event::error(
                            0,
                            event::E_TYPE_UNKNOWN,
                            format!("table uses undefined ttype {}", t.ttype()),
                            "-",
                        ),
                    );
                }
                Some(registered) => {
                    if !registered.same_structure(t.tclass()) {
                        return deliver(
                            on_event,
                            Event::error(
                                0,
                                event::E_TYPE_CONFLICT,
                                format!(
                                    "table's ttype {} disagrees with its definition",
                                    t.ttype()
                                ),
                                "-",
                            ),
                        );
                    }
                }
            }
            if !t.ends_on_record_boundary() {
                return deliver(
                    on_event,
                    Event::error(
                        0,
                        event::E_PARSE_TABLE_LEN,
                        format!(
                            "table {} has {} values which is not a multiple of {}",
                            t.ttype(),
                            t.cell_count(),
                            t.tclass().len()
                        ),
                        "-",
                    ),
                );
            }
            let field_vtypes: Vec<Option<String>> = t
                .tclass()
                .fields()
                .iter()
                .map(|f| f.vtype().map(str::to_string))
                .collect();
            let width = field_vtypes.len().max(1);
            for (i, cell) in t.cells_mut().enumerate() {
                let vtype = field_vtypes[i % width].as_deref();
                walk_value(cell, vtype, tclasses, fix_types, on_event)?;
            }
            Ok(())
        }
        _ => Ok(()),
    }
}
