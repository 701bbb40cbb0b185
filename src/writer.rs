//! The UXF writer: [`Uxf`] tree → canonical text.
//!
//! Output is deterministic for a given tree and [`Format`]: header, file
//! comment, import lines, ttype definitions in insertion order, then the
//! root value. Collections whose one-line render fits within
//! `max_short_len` stay inline; everything else goes multi-line with one
//! item per line at increasing indent.

use crate::error::{Error, Result};
use crate::format::Format;
use crate::tclass::TClass;
use crate::uxf::Uxf;
use crate::value::{Key, Value, ISO_DATE, ISO_DATETIME};

pub(crate) fn write_document(uxf: &Uxf, format: &Format) -> Result<String> {
    let mut writer = Writer {
        format,
        out: String::new(),
    };
    writer.document(uxf)?;
    Ok(writer.out)
}

struct Writer<'a> {
    format: &'a Format,
    out: String,
}

impl Writer<'_> {
    fn document(&mut self, uxf: &Uxf) -> Result<()> {
        self.out.push_str("uxf 1.0");
        if !uxf.custom().is_empty() {
            self.out.push(' ');
            self.out.push_str(uxf.custom());
        }
        self.out.push('\n');
        if let Some(comment) = uxf.comment() {
            self.out.push_str(&format!("#<{}>\n", escape(comment)));
        }
        if !self.format.replace_imports {
            // One `!` line per distinct source, in first-appearance order.
            let mut seen = Vec::new();
            for source in uxf.imports().values() {
                if !seen.contains(&source) {
                    seen.push(source);
                    self.out.push_str(&format!("!{source}\n"));
                }
            }
        }
        for (name, tclass) in uxf.tclasses() {
            if !self.format.replace_imports && uxf.imports().contains_key(name) {
                continue;
            }
            self.ttypedef(tclass);
        }
        self.value(uxf.value(), 0, "")?;
        Ok(())
    }

    fn ttypedef(&mut self, tclass: &TClass) {
        self.out.push('=');
        if let Some(comment) = tclass.comment() {
            self.out.push_str(&format!("#<{}> ", escape(comment)));
        }
        self.out.push_str(tclass.ttype());
        for field in tclass.fields() {
            self.out.push(' ');
            self.out.push_str(field.name());
            if let Some(vtype) = field.vtype() {
                self.out.push(':');
                self.out.push_str(vtype);
            }
        }
        self.out.push('\n');
    }

    /// Writes one value as one or more whole lines. `prefix` is text that
    /// belongs before the value on its first line (a map key, typically).
    fn value(&mut self, value: &Value, depth: usize, prefix: &str) -> Result<()> {
        let pad = self.format.indent.repeat(depth);
        if let Value::Table(table) = value {
            if !table.ends_on_record_boundary() {
                return Err(Error::Write(format!(
                    "table {} has a partial record",
                    table.ttype()
                )));
            }
        }
        match value {
            Value::Bytes(b) if hex_len(b.len()) > self.format.wrap_width => {
                self.wrapped_bytes(b, depth, prefix);
                Ok(())
            }
            _ if value.is_scalar() => {
                let rendered = self.scalar(value)?;
                self.line(&pad, prefix, &rendered);
                Ok(())
            }
            _ => {
                if let Some(inline) = self.inline(value)? {
                    if inline.len() <= self.format.max_short_len {
                        self.line(&pad, prefix, &inline);
                        return Ok(());
                    }
                }
                match value {
                    Value::List(_) => self.long_list(value, depth, prefix),
                    Value::Map(_) => self.long_map(value, depth, prefix),
                    Value::Table(_) => self.long_table(value, depth, prefix),
                    _ => unreachable!("scalars are handled above"),
                }
            }
        }
    }

    fn line(&mut self, pad: &str, prefix: &str, text: &str) {
        self.out.push_str(pad);
        self.out.push_str(prefix);
        self.out.push_str(text);
        self.out.push('\n');
    }

    fn long_list(&mut self, value: &Value, depth: usize, prefix: &str) -> Result<()> {
        let Value::List(list) = value else { unreachable!() };
        let pad = self.format.indent.repeat(depth);
        let mut open = String::from("[");
        if let Some(comment) = list.comment() {
            open.push_str(&format!("#<{}>", escape(comment)));
        }
        if let Some(vtype) = list.vtype() {
            if open.len() > 1 {
                open.push(' ');
            }
            open.push_str(vtype);
        }
        self.line(&pad, prefix, &open);
        for element in list.iter() {
            self.value(element, depth + 1, "")?;
        }
        self.line(&pad, "", "]");
        Ok(())
    }

    fn long_map(&mut self, value: &Value, depth: usize, prefix: &str) -> Result<()> {
        let Value::Map(map) = value else { unreachable!() };
        let pad = self.format.indent.repeat(depth);
        let mut open = String::from("{");
        if let Some(comment) = map.comment() {
            open.push_str(&format!("#<{}>", escape(comment)));
        }
        if let Some(ktype) = map.ktype() {
            if open.len() > 1 {
                open.push(' ');
            }
            open.push_str(ktype);
            if let Some(vtype) = map.vtype() {
                open.push(' ');
                open.push_str(vtype);
            }
        }
        self.line(&pad, prefix, &open);
        for (key, entry) in map.iter() {
            let mut key_prefix = self.key(key)?;
            key_prefix.push(' ');
            self.value(entry, depth + 1, &key_prefix)?;
        }
        self.line(&pad, "", "}");
        Ok(())
    }

    fn long_table(&mut self, value: &Value, depth: usize, prefix: &str) -> Result<()> {
        let Value::Table(table) = value else { unreachable!() };
        let pad = self.format.indent.repeat(depth);
        let mut open = String::from("(");
        if let Some(comment) = table.comment() {
            open.push_str(&format!("#<{}> ", escape(comment)));
        }
        open.push_str(table.ttype());
        self.line(&pad, prefix, &open);
        let record_pad = self.format.indent.repeat(depth + 1);
        for record in table.records() {
            match self.inline_record(record)? {
                Some(line) if record_pad.len() + line.len() <= self.format.wrap_width => {
                    self.line(&record_pad, "", &line);
                }
                _ => {
                    for cell in record {
                        self.value(cell, depth + 1, "")?;
                    }
                }
            }
        }
        self.line(&pad, "", ")");
        Ok(())
    }

    fn inline_record(&self, record: &[Value]) -> Result<Option<String>> {
        let mut parts = Vec::with_capacity(record.len());
        for cell in record {
            match self.inline(cell)? {
                Some(part) => parts.push(part),
                None => return Ok(None),
            }
        }
        Ok(Some(parts.join(" ")))
    }

    /// Renders a value on a single line, or `None` when it embeds a
    /// newline (a multi-line string somewhere inside).
    fn inline(&self, value: &Value) -> Result<Option<String>> {
        match value {
            Value::Str(s) if s.contains('\n') => Ok(None),
            _ if value.is_scalar() => self.scalar(value).map(Some),
            Value::List(list) => {
                let mut parts = Vec::new();
                if let Some(comment) = comment_part(list.comment()) {
                    let Some(comment) = comment else { return Ok(None) };
                    parts.push(comment);
                }
                if let Some(vtype) = list.vtype() {
                    parts.push(vtype.to_string());
                }
                for element in list.iter() {
                    match self.inline(element)? {
                        Some(part) => parts.push(part),
                        None => return Ok(None),
                    }
                }
                Ok(Some(format!("[{}]", parts.join(" "))))
            }
            Value::Map(map) => {
                let mut parts = Vec::new();
                if let Some(comment) = comment_part(map.comment()) {
                    let Some(comment) = comment else { return Ok(None) };
                    parts.push(comment);
                }
                if let Some(ktype) = map.ktype() {
                    parts.push(ktype.to_string());
                    if let Some(vtype) = map.vtype() {
                        parts.push(vtype.to_string());
                    }
                }
                for (key, entry) in map.iter() {
                    let key = self.key(key)?;
                    if key.contains('\n') {
                        return Ok(None);
                    }
                    parts.push(key);
                    match self.inline(entry)? {
                        Some(part) => parts.push(part),
                        None => return Ok(None),
                    }
                }
                Ok(Some(format!("{{{}}}", parts.join(" "))))
            }
            Value::Table(table) => {
                let mut parts = Vec::new();
                if let Some(comment) = comment_part(table.comment()) {
                    let Some(comment) = comment else { return Ok(None) };
                    parts.push(comment);
                }
                parts.push(table.ttype().to_string());
                for record in table.records() {
                    match self.inline_record(record)? {
                        Some(part) => parts.push(part),
                        None => return Ok(None),
                    }
                }
                Ok(Some(format!("({})", parts.join(" "))))
            }
            _ => unreachable!("scalars are handled above"),
        }
    }

    fn key(&self, key: &Key) -> Result<String> {
        self.scalar(&Value::from(key.clone()))
    }

    fn scalar(&self, value: &Value) -> Result<String> {
        Ok(match value {
            Value::Null => "?".to_string(),
            Value::Bool(true) => {
                if self.format.use_true_false { "true" } else { "yes" }.to_string()
            }
            Value::Bool(false) => {
                if self.format.use_true_false { "false" } else { "no" }.to_string()
            }
            Value::Int(i) => i.to_string(),
            Value::Real(r) => format_real(*r, self.format.realdp)?,
            Value::Date(d) => d.format(ISO_DATE).to_string(),
            Value::DateTime(dt) => dt.format(ISO_DATETIME).to_string(),
            Value::Str(s) => format!("<{}>", escape(s)),
            Value::Bytes(b) => {
                let pairs: Vec<String> = b.iter().map(|byte| format!("{byte:02X}")).collect();
                format!("(:{}:)", pairs.join(" "))
            }
            _ => {
                return Err(Error::Write(format!(
                    "{} is not a scalar",
                    value.type_name()
                )))
            }
        })
    }

    /// Long byte strings get their own block, hex pairs wrapped at the
    /// soft width.
    fn wrapped_bytes(&mut self, bytes: &[u8], depth: usize, prefix: &str) {
        let pad = self.format.indent.repeat(depth);
        let inner_pad = self.format.indent.repeat(depth + 1);
        self.line(&pad, prefix, "(:");
        let per_line = ((self.format.wrap_width.saturating_sub(inner_pad.len())) / 3).max(1);
        for chunk in bytes.chunks(per_line) {
            let pairs: Vec<String> = chunk.iter().map(|byte| format!("{byte:02X}")).collect();
            self.line(&inner_pad, "", &pairs.join(" "));
        }
        self.line(&pad, "", ":)");
    }
}

/// `Some(None)` means a comment exists but cannot be inlined.
fn comment_part(comment: Option<&str>) -> Option<Option<String>> {
    let comment = comment?;
    if comment.contains('\n') {
        Some(None)
    } else {
        Some(Some(format!("#<{}>", escape(comment))))
    }
}

fn hex_len(byte_count: usize) -> usize {
    // "(:" + pairs with separating spaces + ":)"
    if byte_count == 0 {
        4
    } else {
        4 + byte_count * 3 - 1
    }
}

pub(crate) fn escape(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

/// Renders a real so it parses back as a real: when no precision is fixed
/// the shortest form gains a decimal point if it lacks one (`1` → `1.0`,
/// `1e300` → `1.0e300`).
fn format_real(r: f64, realdp: Option<u8>) -> Result<String> {
    if !r.is_finite() {
        return Err(Error::Write(format!("{r} has no UXF representation")));
    }
    let mut s = match realdp {
        Some(dp) => format!("{:.*}", dp as usize, r),
        None => format!("{r}"),
    };
    if !s.contains('.') {
        match s.find(['e', 'E']) {
            Some(i) => s.insert_str(i, ".0"),
            None => s.push_str(".0"),
        }
    }
    Ok(s)
}
