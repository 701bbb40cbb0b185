//! The UXF parser: token stream → [`Uxf`] tree.
//!
//! Recursive descent over the lexer's tokens. Type annotations are checked
//! inline as values are built, imports are resolved as their directives
//! are met, and every diagnostic flows through the caller's event handler.

use crate::check::{self, Fit};
use crate::error::{Error, Result};
use crate::event::{self, deliver, Event};
use crate::field::Field;
use crate::import;
use crate::lexer::{self, Token, TokenKind};
use crate::list::List;
use crate::map::Map;
use crate::table::Table;
use crate::tclass::TClass;
use crate::uxf::Uxf;
use crate::value::{Key, Value};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Options controlling how UXF input is read.
///
/// # Examples
///
/// ```rust
/// use uxf::ParseOptions;
///
/// let options = ParseOptions {
///     fix_types: true,
///     ..ParseOptions::default()
/// };
/// assert!(!options.drop_unused);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct ParseOptions {
    /// Convert convertible mismatches (`real`↔`int`, strings that spell
    /// the target type) instead of rejecting them; each conversion warns
    /// `W-TYPE-COERCED`.
    pub fix_types: bool,
    /// Remove ttypes nothing uses instead of merely warning about them.
    pub drop_unused: bool,
    /// Per-request timeout for imports fetched over HTTP(S).
    pub http_timeout: Duration,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions {
            fix_types: false,
            drop_unused: false,
            http_timeout: Duration::from_secs(30),
        }
    }
}

/// Parses UXF text into a document.
///
/// `is_import` marks nested parses performed by the import resolver: they
/// skip the unused-ttype scan (an imported document's ttypes are *meant*
/// to be unused there).
pub(crate) fn parse_text(
    text: &str,
    filename: &str,
    options: &ParseOptions,
    on_event: &mut dyn FnMut(&Event) -> Result<()>,
    actives: &mut Vec<String>,
    is_import: bool,
) -> Result<Uxf> {
    let lexed = lexer::tokenize(text, filename, on_event)?;
    let mut parser = Parser {
        tokens: lexed.tokens,
        pos: 0,
        filename: filename.to_string(),
        options,
        on_event,
        doc: Uxf::default(),
        actives,
        def_lines: HashMap::new(),
    };
    parser.doc.set_custom(&lexed.custom);
    parser.run(is_import)?;
    Ok(parser.doc)
}

struct Parser<'a> {
    tokens: Vec<Token>,
    pos: usize,
    filename: String,
    options: &'a ParseOptions,
    on_event: &'a mut dyn FnMut(&Event) -> Result<()>,
    doc: Uxf,
    actives: &'a mut Vec<String>,
    def_lines: HashMap<String, usize>,
}

impl Parser<'_> {
    fn current(&self) -> &Token {
        // The token vector always ends with Eof.
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn advance(&mut self) -> Token {
        let token = self.current().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        token
    }

    fn line(&self) -> usize {
        self.current().line
    }

    fn warn(&mut self, line: usize, code: &'static str, message: String) -> Result<()> {
        deliver(
            self.on_event,
            Event::warning(line, code, message, self.filename.clone()),
        )
    }

    fn fail<T>(&mut self, line: usize, code: &'static str, message: String) -> Result<T> {
        let event = Event::error(line, code, message, self.filename.clone());
        (self.on_event)(&event)?;
        Err(Error::Fatal(event))
    }

    /// Re-homes an error produced by a registry operation onto a source
    /// line before delivering it.
    fn relocate(&mut self, result: Result<()>, line: usize) -> Result<()> {
        match result {
            Ok(()) => Ok(()),
            Err(Error::Fatal(mut event)) => {
                event.line = line;
                event.filename = self.filename.clone();
                (self.on_event)(&event)?;
                Err(Error::Fatal(event))
            }
            Err(other) => Err(other),
        }
    }

    fn run(&mut self, is_import: bool) -> Result<()> {
        if let TokenKind::Comment(comment) = &self.current().kind {
            let comment = comment.clone();
            self.doc.set_comment(Some(&comment));
            self.advance();
        }
        while let TokenKind::Import(source) = &self.current().kind {
            let source = source.clone();
            let line = self.advance().line;
            self.resolve_import(&source, line)?;
        }
        while self.current().kind == TokenKind::TtypeBegin {
            self.parse_ttypedef()?;
        }
        self.check_field_vtypes()?;
        let value = match self.current().kind {
            TokenKind::ListOpen | TokenKind::MapOpen | TokenKind::TableOpen => {
                self.parse_value()?
            }
            _ => {
                let line = self.line();
                return self.fail(
                    line,
                    event::E_PARSE_MISSING_VALUE,
                    "expected a map, list, or table".to_string(),
                );
            }
        };
        if self.current().kind != TokenKind::Eof {
            let line = self.line();
            let got = format!("{:?}", self.current().kind);
            return self.fail(
                line,
                event::E_PARSE_UNEXPECTED,
                format!("expected end of document, got {got}"),
            );
        }
        let set_value_result = self.doc.set_value(value);
        self.relocate(set_value_result, 0)?;
        if !is_import {
            let drop_unused = self.options.drop_unused;
            let mut doc = std::mem::take(&mut self.doc);
            let result = doc.scan_unused(drop_unused, self.on_event);
            self.doc = doc;
            result?;
        }
        Ok(())
    }

    fn resolve_import(&mut self, source: &str, line: usize) -> Result<()> {
        if source.is_empty() {
            return self.fail(
                line,
                event::E_IMP_NOT_FOUND,
                "missing import source".to_string(),
            );
        }
        let importer_dir = self.importer_dir();
        let tclasses = import::resolve(
            source,
            importer_dir.as_deref(),
            line,
            &self.filename,
            self.options,
            self.on_event,
            self.actives,
        )?;
        for tclass in tclasses {
            let result = self.doc.add_imported_tclass(tclass, source);
            self.relocate(result, line)?;
        }
        Ok(())
    }

    fn importer_dir(&self) -> Option<PathBuf> {
        if self.filename == "-" {
            return None;
        }
        Path::new(&self.filename).parent().map(Path::to_path_buf)
    }

    fn parse_ttypedef(&mut self) -> Result<()> {
        let def_line = self.advance().line; // =
        let comment = match &self.current().kind {
            TokenKind::Comment(comment) => {
                let comment = comment.clone();
                self.advance();
                Some(comment)
            }
            _ => None,
        };
        let name = self.expect_ident("a ttype name")?;
        let mut fields = Vec::new();
        while matches!(
            self.current().kind,
            TokenKind::Ident(_) | TokenKind::TypeName(_) | TokenKind::Bool(_)
        ) {
            let field_line = self.line();
            let field_name = self.expect_ident("a field name")?;
            let vtype = if self.current().kind == TokenKind::Colon {
                self.advance();
                Some(self.expect_vtype()?)
            } else {
                None
            };
            let field = match Field::new(&field_name, vtype.as_deref()) {
                Ok(field) => field,
                Err(err) => return self.relocate(Err(err), field_line),
            };
            fields.push(field);
        }
        let tclass = match TClass::new(&name, fields, comment.as_deref()) {
            Ok(tclass) => tclass,
            Err(err) => return self.relocate(Err(err), def_line),
        };
        self.def_lines.insert(name, def_line);
        let result = self.doc.add_tclass(tclass);
        self.relocate(result, def_line)
    }

    fn expect_ident(&mut self, what: &str) -> Result<String> {
        let line = self.line();
        match self.current().kind.clone() {
            TokenKind::Ident(name) => {
                self.advance();
                Ok(name)
            }
            TokenKind::TypeName(name) => self.fail(
                line,
                event::E_TYPE_RESERVED,
                format!("expected {what}, got reserved word {name}"),
            ),
            TokenKind::Bool(_) => self.fail(
                line,
                event::E_TYPE_RESERVED,
                format!("expected {what}, got a reserved word"),
            ),
            other => self.fail(
                line,
                event::E_PARSE_UNEXPECTED,
                format!("expected {what}, got {other:?}"),
            ),
        }
    }

    fn expect_vtype(&mut self) -> Result<String> {
        let line = self.line();
        match self.current().kind.clone() {
            TokenKind::TypeName(name) => {
                self.advance();
                Ok(name.to_string())
            }
            TokenKind::Ident(name) => {
                self.advance();
                Ok(name)
            }
            other => self.fail(
                line,
                event::E_PARSE_UNEXPECTED,
                format!("expected a type name, got {other:?}"),
            ),
        }
    }

    /// Field vtypes may reference ttypes defined later in the document, so
    /// they are resolved once the definition section ends.
    fn check_field_vtypes(&mut self) -> Result<()> {
        let mut missing = Vec::new();
        for (name, tclass) in self.doc.tclasses() {
            for field in tclass.fields() {
                if let Some(vtype) = field.vtype() {
                    if !check::is_builtin_vtype(vtype) && self.doc.tclass(vtype).is_none() {
                        let line = self.def_lines.get(name).copied().unwrap_or(0);
                        missing.push((line, vtype.to_string(), name.clone()));
                    }
                }
            }
        }
        if let Some((line, vtype, name)) = missing.into_iter().next() {
            return self.fail(
                line,
                event::E_TYPE_UNKNOWN,
                format!("field of ttype {name} uses undefined type {vtype}"),
            );
        }
        Ok(())
    }

    fn parse_value(&mut self) -> Result<Value> {
        let line = self.line();
        match self.current().kind.clone() {
            TokenKind::Null => {
                self.advance();
                Ok(Value::Null)
            }
            TokenKind::Bool(b) => {
                self.advance();
                Ok(Value::Bool(b))
            }
            TokenKind::Int(i) => {
                self.advance();
                Ok(Value::Int(i))
            }
            TokenKind::Real(r) => {
                self.advance();
                Ok(Value::Real(r))
            }
            TokenKind::Date(d) => {
                self.advance();
                Ok(Value::Date(d))
            }
            TokenKind::DateTime(dt) => {
                self.advance();
                Ok(Value::DateTime(dt))
            }
            TokenKind::Str(s) => {
                self.advance();
                Ok(Value::Str(s))
            }
            TokenKind::Bytes(b) => {
                self.advance();
                Ok(Value::Bytes(b))
            }
            TokenKind::ListOpen => self.parse_list(),
            TokenKind::MapOpen => self.parse_map(),
            TokenKind::TableOpen => self.parse_table(),
            other => self.fail(
                line,
                event::E_PARSE_UNEXPECTED,
                format!("expected a value, got {other:?}"),
            ),
        }
    }

    fn parse_comment(&mut self) -> Option<String> {
        match &self.current().kind {
            TokenKind::Comment(comment) => {
                let comment = comment.clone();
                self.advance();
                Some(comment)
            }
            _ => None,
        }
    }

    /// A leading type token inside a list is its vtype; a ttype name must
    /// resolve (every definition has been seen by now).
    fn parse_container_vtype(&mut self) -> Result<Option<String>> {
        match self.current().kind.clone() {
            TokenKind::TypeName(name) => {
                self.advance();
                Ok(Some(name.to_string()))
            }
            TokenKind::Ident(name) => {
                let line = self.line();
                if self.doc.tclass(&name).is_none() {
                    return self.fail(
                        line,
                        event::E_TYPE_UNKNOWN,
                        format!("unknown type {name}"),
                    );
                }
                self.advance();
                Ok(Some(name))
            }
            _ => Ok(None),
        }
    }

    /// Checks a freshly parsed value against a slot's type annotation,
    /// promoting or coercing in place where allowed.
    fn conform(&mut self, vtype: Option<&str>, value: &mut Value, line: usize) -> Result<()> {
        let Some(vtype) = vtype else { return Ok(()) };
        match check::fit_value(vtype, value, self.options.fix_types) {
            Fit::Ok => Ok(()),
            Fit::Promoted(fixed) => {
                *value = fixed;
                Ok(())
            }
            Fit::Coerced(fixed) => {
                let message = format!("converted {} to {vtype}", value.type_name());
                *value = fixed;
                self.warn(line, event::W_TYPE_COERCED, message)
            }
            Fit::Mismatch => self.fail(
                line,
                event::E_TYPE_MISMATCH,
                format!("expected {vtype}, got {}", value.type_name()),
            ),
        }
    }

    fn parse_list(&mut self) -> Result<Value> {
        let open_line = self.advance().line; // [
        let comment = self.parse_comment();
        let vtype = self.parse_container_vtype()?;
        let mut list = List::with_vtype(vtype.as_deref(), comment.as_deref())?;
        loop {
            match self.current().kind {
                TokenKind::ListClose => {
                    self.advance();
                    return Ok(Value::List(list));
                }
                TokenKind::Eof => {
                    return self.fail(
                        open_line,
                        event::E_PARSE_UNTERMINATED,
                        "unterminated list".to_string(),
                    );
                }
                _ => {
                    let line = self.line();
                    let mut value = self.parse_value()?;
                    self.conform(vtype.as_deref(), &mut value, line)?;
                    list.push(value);
                }
            }
        }
    }

    fn parse_map(&mut self) -> Result<Value> {
        let open_line = self.advance().line; // {
        let comment = self.parse_comment();
        let ktype = match self.current().kind.clone() {
            TokenKind::TypeName(name) => {
                let line = self.line();
                if !check::is_ktype(name) {
                    return self.fail(
                        line,
                        event::E_TYPE_UNKNOWN,
                        format!(
                            "map key type must be one of {:?}, got {name}",
                            check::KTYPES
                        ),
                    );
                }
                self.advance();
                Some(name.to_string())
            }
            _ => None,
        };
        let vtype = if ktype.is_some() {
            self.parse_container_vtype()?
        } else {
            None
        };
        let mut map = Map::with_types(ktype.as_deref(), vtype.as_deref(), comment.as_deref())?;
        loop {
            let key_line = self.line();
            let key = match self.current().kind.clone() {
                TokenKind::MapClose => {
                    self.advance();
                    return Ok(Value::Map(map));
                }
                TokenKind::Eof => {
                    return self.fail(
                        open_line,
                        event::E_PARSE_UNTERMINATED,
                        "unterminated map".to_string(),
                    );
                }
                TokenKind::Int(i) => Key::Int(i),
                TokenKind::Date(d) => Key::Date(d),
                TokenKind::DateTime(dt) => Key::DateTime(dt),
                TokenKind::Str(s) => Key::Str(s),
                TokenKind::Bytes(b) => Key::Bytes(b),
                other => {
                    return self.fail(
                        key_line,
                        event::E_PARSE_UNEXPECTED,
                        format!(
                            "map keys may only be int, date, datetime, str, or bytes, \
                             got {other:?}"
                        ),
                    );
                }
            };
            self.advance();
            if let Some(ktype) = &ktype {
                if key.type_name() != ktype.as_str() {
                    return self.fail(
                        key_line,
                        event::E_TYPE_MISMATCH,
                        format!("expected {ktype} key, got {}", key.type_name()),
                    );
                }
            }
            match self.current().kind {
                TokenKind::MapClose | TokenKind::Eof => {
                    return self.fail(
                        open_line,
                        event::E_PARSE_MAP_ODD,
                        "a map must hold an even number of items".to_string(),
                    );
                }
                _ => {}
            }
            let value_line = self.line();
            let mut value = self.parse_value()?;
            self.conform(vtype.as_deref(), &mut value, value_line)?;
            if map.insert(key, value).is_some() {
                self.warn(
                    key_line,
                    event::W_PARSE_DUPLICATE_KEY,
                    "duplicate map key overwrites the earlier value".to_string(),
                )?;
            }
        }
    }

    fn parse_table(&mut self) -> Result<Value> {
        let open_line = self.advance().line; // (
        let comment = self.parse_comment();
        let name = self.expect_ident("a ttype name")?;
        let Some(tclass) = self.doc.tclass(&name).cloned() else {
            return self.fail(
                open_line,
                event::E_TYPE_UNKNOWN,
                format!("table uses undefined ttype {name}"),
            );
        };
        let field_vtypes: Vec<Option<String>> = tclass
            .fields()
            .iter()
            .map(|f| f.vtype().map(str::to_string))
            .collect();
        let width = field_vtypes.len();
        let mut table = Table::new(tclass, comment.as_deref());
        let mut cells = 0usize;
        loop {
            match self.current().kind {
                TokenKind::TableClose => {
                    self.advance();
                    if !table.ends_on_record_boundary() {
                        return self.fail(
                            open_line,
                            event::E_PARSE_TABLE_LEN,
                            format!(
                                "table {name} has {cells} values which is not a multiple of \
                                 {width}"
                            ),
                        );
                    }
                    return Ok(Value::Table(table));
                }
                TokenKind::Eof => {
                    return self.fail(
                        open_line,
                        event::E_PARSE_UNTERMINATED,
                        "unterminated table".to_string(),
                    );
                }
                _ => {
                    let line = self.line();
                    if width == 0 {
                        return self.fail(
                            line,
                            event::E_PARSE_TABLE_LEN,
                            format!("fieldless table {name} cannot hold values"),
                        );
                    }
                    let mut value = self.parse_value()?;
                    self.conform(field_vtypes[cells % width].as_deref(), &mut value, line)?;
                    let result = table.push(value);
                    self.relocate(result, line)?;
                    cells += 1;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::ignore;

    fn parse(text: &str) -> Result<Uxf> {
        parse_text(
            text,
            "-",
            &ParseOptions::default(),
            &mut ignore,
            &mut Vec::new(),
            false,
        )
    }

    fn parse_err(text: &str) -> &'static str {
        match parse(text) {
            Err(Error::Fatal(event)) => event.code,
            other => panic!("expected a fatal event, got {other:?}"),
        }
    }

    #[test]
    fn minimal_empty_document() {
        let doc = parse("uxf 1.0\n[]\n").unwrap();
        assert!(doc.value().as_list().unwrap().is_empty());
        assert_eq!(doc.custom(), "");
        assert_eq!(doc.comment(), None);
        assert!(doc.tclasses().is_empty());
    }

    #[test]
    fn file_comment_and_custom() {
        let doc = parse("uxf 1.0 Config v2\n#<master settings>\n{}\n").unwrap();
        assert_eq!(doc.custom(), "Config v2");
        assert_eq!(doc.comment(), Some("master settings"));
        assert!(doc.value().is_map());
    }

    #[test]
    fn nested_collections() {
        let doc = parse("uxf 1.0\n[{<k> [1 2]} (::)]\n").unwrap();
        let list = doc.value().as_list().unwrap();
        assert_eq!(list.len(), 2);
        let inner = list.get(0).unwrap().as_map().unwrap();
        let nested = inner.get(&Key::from("k")).unwrap().as_list().unwrap();
        assert_eq!(nested.len(), 2);
        assert!(list.get(1).unwrap().is_bytes());
    }

    #[test]
    fn typed_list_accepts_and_rejects() {
        let doc = parse("uxf 1.0\n[int 1 2 ? 3]\n").unwrap();
        assert_eq!(doc.value().as_list().unwrap().vtype(), Some("int"));
        assert_eq!(parse_err("uxf 1.0\n[int 1 <two>]\n"), event::E_TYPE_MISMATCH);
    }

    #[test]
    fn typed_list_promotes_ints_to_real() {
        let doc = parse("uxf 1.0\n[real 1 2.5]\n").unwrap();
        let list = doc.value().as_list().unwrap();
        assert_eq!(list.get(0), Some(&Value::Real(1.0)));
        assert_eq!(list.get(1), Some(&Value::Real(2.5)));
    }

    #[test]
    fn map_requires_alternating_items() {
        assert_eq!(parse_err("uxf 1.0\n{<a>}\n"), event::E_PARSE_MAP_ODD);
        assert_eq!(parse_err("uxf 1.0\n{<a> 1 <b>}\n"), event::E_PARSE_MAP_ODD);
    }

    #[test]
    fn map_key_kinds_are_restricted() {
        assert_eq!(parse_err("uxf 1.0\n{yes 1}\n"), event::E_PARSE_UNEXPECTED);
        assert_eq!(parse_err("uxf 1.0\n{3.5 1}\n"), event::E_PARSE_UNEXPECTED);
        assert_eq!(parse_err("uxf 1.0\n{[] 1}\n"), event::E_PARSE_UNEXPECTED);
    }

    #[test]
    fn typed_map_checks_keys_and_values() {
        let doc = parse("uxf 1.0\n{str int <a> 1 <b> 2}\n").unwrap();
        let map = doc.value().as_map().unwrap();
        assert_eq!(map.ktype(), Some("str"));
        assert_eq!(map.vtype(), Some("int"));
        assert_eq!(parse_err("uxf 1.0\n{str int 7 1}\n"), event::E_TYPE_MISMATCH);
        assert_eq!(
            parse_err("uxf 1.0\n{str int <a> <b>}\n"),
            event::E_TYPE_MISMATCH
        );
        assert_eq!(parse_err("uxf 1.0\n{bool <a> 1}\n"), event::E_TYPE_UNKNOWN);
    }

    #[test]
    fn duplicate_keys_warn_and_overwrite() {
        let mut codes = Vec::new();
        let doc = parse_text(
            "uxf 1.0\n{<a> 1 <a> 2}\n",
            "-",
            &ParseOptions::default(),
            &mut |event| {
                codes.push(event.code);
                Ok(())
            },
            &mut Vec::new(),
            false,
        )
        .unwrap();
        assert_eq!(codes, vec![event::W_PARSE_DUPLICATE_KEY]);
        let map = doc.value().as_map().unwrap();
        assert_eq!(map.len(), 1);
        assert_eq!(map.get(&Key::from("a")), Some(&Value::Int(2)));
    }

    #[test]
    fn map_insertion_order_is_source_order() {
        let doc = parse("uxf 1.0\n{<z> 1 <a> 2 <m> 3}\n").unwrap();
        let keys: Vec<String> = doc
            .value()
            .as_map()
            .unwrap()
            .keys()
            .map(|k| match k {
                Key::Str(s) => s.clone(),
                other => panic!("unexpected key {other:?}"),
            })
            .collect();
        assert_eq!(keys, vec!["z", "a", "m"]);
    }

    #[test]
    fn table_with_typed_fields() {
        let doc = parse(
            "uxf 1.0 Price List\n\
             =PriceList Date:date Price:real Quantity:int ID:str Description:str\n\
             (PriceList 2022-09-21 3.99 2 <CH1-A2> <Chisels (pair), 1in &amp; 1\u{BC}in>)\n",
        )
        .unwrap();
        assert_eq!(doc.custom(), "Price List");
        let table = doc.value().as_table().unwrap();
        assert_eq!(table.ttype(), "PriceList");
        assert_eq!(table.len(), 1);
        assert_eq!(
            table.get(0, 4),
            Some(&Value::Str("Chisels (pair), 1in & 1\u{BC}in".to_string()))
        );
        assert_eq!(table.get(0, 1), Some(&Value::Real(3.99)));
    }

    #[test]
    fn null_fits_typed_table_cell() {
        let doc = parse("uxf 1.0\n=Cust CID:int Addr:str\n(Cust 19 ?)\n").unwrap();
        let table = doc.value().as_table().unwrap();
        assert_eq!(table.get(0, 1), Some(&Value::Null));
    }

    #[test]
    fn strict_mode_rejects_real_in_int_field() {
        assert_eq!(parse_err("uxf 1.0\n=T x:int\n(T 3.14)\n"), event::E_TYPE_MISMATCH);
    }

    #[test]
    fn fix_types_truncates_whole_real() {
        let mut codes = Vec::new();
        let options = ParseOptions {
            fix_types: true,
            ..ParseOptions::default()
        };
        let doc = parse_text(
            "uxf 1.0\n=T x:int y:bool\n(T 3.0 <yes>)\n",
            "-",
            &options,
            &mut |event| {
                codes.push(event.code);
                Ok(())
            },
            &mut Vec::new(),
            false,
        )
        .unwrap();
        assert_eq!(codes, vec![event::W_TYPE_COERCED, event::W_TYPE_COERCED]);
        let table = doc.value().as_table().unwrap();
        assert_eq!(table.get(0, 0), Some(&Value::Int(3)));
        assert_eq!(table.get(0, 1), Some(&Value::Bool(true)));
    }

    #[test]
    fn record_length_must_divide_evenly() {
        assert_eq!(parse_err("uxf 1.0\n=Pair a b\n(Pair 1 2 3)\n"), event::E_PARSE_TABLE_LEN);
    }

    #[test]
    fn fieldless_table_accepts_no_values() {
        let doc = parse("uxf 1.0\n=Sealed\n(Sealed)\n").unwrap();
        let table = doc.value().as_table().unwrap();
        assert!(table.tclass().is_fieldless());
        assert_eq!(table.len(), 0);
        assert_eq!(parse_err("uxf 1.0\n=Sealed\n(Sealed 1)\n"), event::E_PARSE_TABLE_LEN);
    }

    #[test]
    fn unknown_ttype_in_table() {
        assert_eq!(parse_err("uxf 1.0\n(Ghost 1)\n"), event::E_TYPE_UNKNOWN);
    }

    #[test]
    fn reserved_word_cannot_name_a_ttype_or_field() {
        assert_eq!(parse_err("uxf 1.0\n=int x\n[]\n"), event::E_TYPE_RESERVED);
        assert_eq!(parse_err("uxf 1.0\n=T int\n[]\n"), event::E_TYPE_RESERVED);
        assert_eq!(parse_err("uxf 1.0\n=yes x\n[]\n"), event::E_TYPE_RESERVED);
    }

    #[test]
    fn conflicting_ttype_definitions() {
        assert_eq!(
            parse_err("uxf 1.0\n=P x:int\n=P x:real\n[]\n"),
            event::E_TYPE_CONFLICT
        );
        // An identical duplicate coalesces.
        let doc = parse("uxf 1.0\n=P x:int\n=P x:int\n[(P 1)]\n").unwrap();
        assert_eq!(doc.tclasses().len(), 1);
    }

    #[test]
    fn field_vtype_may_reference_later_ttype() {
        let doc = parse("uxf 1.0\n=Outer inner:Inner\n=Inner x:int\n[(Outer (Inner 1))]\n")
            .unwrap();
        assert_eq!(doc.tclasses().len(), 2);
        assert_eq!(
            parse_err("uxf 1.0\n=Outer inner:Ghost\n[(Outer ?)]\n"),
            event::E_TYPE_UNKNOWN
        );
    }

    #[test]
    fn ttype_slot_checks_table_kind() {
        let doc = parse("uxf 1.0\n=P x:int\n[P (P 1) (P 2)]\n").unwrap();
        assert_eq!(doc.value().as_list().unwrap().len(), 2);
        assert_eq!(
            parse_err("uxf 1.0\n=P x:int\n[P 7]\n"),
            event::E_TYPE_MISMATCH
        );
    }

    #[test]
    fn missing_top_level_value() {
        assert_eq!(parse_err("uxf 1.0\n"), event::E_PARSE_MISSING_VALUE);
        assert_eq!(parse_err("uxf 1.0\n=P x\n"), event::E_PARSE_MISSING_VALUE);
    }

    #[test]
    fn trailing_tokens_rejected() {
        assert_eq!(parse_err("uxf 1.0\n[] 1\n"), event::E_PARSE_UNEXPECTED);
        assert_eq!(parse_err("uxf 1.0\n[] []\n"), event::E_PARSE_UNEXPECTED);
    }

    #[test]
    fn unterminated_containers() {
        assert_eq!(parse_err("uxf 1.0\n[1 2\n"), event::E_PARSE_UNTERMINATED);
        assert_eq!(parse_err("uxf 1.0\n{<a> 1\n"), event::E_PARSE_UNTERMINATED);
        assert_eq!(parse_err("uxf 1.0\n=P x\n(P 1\n"), event::E_PARSE_UNTERMINATED);
    }

    #[test]
    fn container_comments_are_kept() {
        let doc = parse("uxf 1.0\n[#<things> 1 2]\n").unwrap();
        assert_eq!(doc.value().as_list().unwrap().comment(), Some("things"));
        let doc = parse("uxf 1.0\n=T #<schema comment>\n[]\n");
        // A ttype comment precedes the name; the empty def above is the
        // degenerate case where the comment belongs to the ttype.
        assert!(doc.is_err());
    }

    #[test]
    fn ttype_comment_position() {
        let doc = parse("uxf 1.0\n=#<pairs of things> Pair a b\n[(Pair 1 2)]\n").unwrap();
        assert_eq!(
            doc.tclass("Pair").unwrap().comment(),
            Some("pairs of things")
        );
    }

    #[test]
    fn unused_ttype_warns() {
        let mut codes = Vec::new();
        parse_text(
            "uxf 1.0\n=Orphan x\n[]\n",
            "-",
            &ParseOptions::default(),
            &mut |event| {
                codes.push(event.code);
                Ok(())
            },
            &mut Vec::new(),
            false,
        )
        .unwrap();
        assert_eq!(codes, vec![event::W_TYPE_UNUSED]);
    }

    #[test]
    fn handler_may_promote_warnings() {
        let result = parse_text(
            "uxf 1.0\n=Orphan x\n[]\n",
            "-",
            &ParseOptions::default(),
            &mut |event| {
                Err(Error::Fatal(Event {
                    fatal: true,
                    ..event.clone()
                }))
            },
            &mut Vec::new(),
            false,
        );
        assert!(result.is_err());
    }
}
