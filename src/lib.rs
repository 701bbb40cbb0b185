//! # uxf
//!
//! A reader/writer library for UXF (Uniform eXchange Format).
//!
//! ## What is UXF?
//!
//! UXF is a plain-text, human-readable, optionally-typed storage format.
//! It may serve as a convenient alternative to CSV, INI, JSON, TOML, XML,
//! or YAML. A UXF document holds exactly one list, map, or table; maps
//! keep insertion order, tables conform to user-defined schemas
//! (*ttypes*), and any container or field may carry a type annotation
//! that is validated on load.
//!
//! ## Key Features
//!
//! - **Round-trippable**: parse → write → parse yields an equal tree, and
//!   writing is idempotent byte-for-byte
//! - **Optionally typed**: untyped documents just work; annotated ones
//!   are validated, with an opt-in fix-types mode for convertible values
//! - **Imports**: ttype definitions can be shared across documents via
//!   files, search paths, URLs, or the built-in system registry
//! - **gzip aware**: reads and writes `.gz` sources transparently
//! - **Pluggable diagnostics**: every warning and error flows through a
//!   caller-supplied handler with stable string codes
//!
//! ## Quick Start
//!
//! ```rust
//! let doc = uxf::from_str(
//!     "uxf 1.0 Price List\n\
//!      =PriceList Date:date Price:real Quantity:int ID:str Description:str\n\
//!      (PriceList 2022-09-21 3.99 2 <CH1-A2> <Chisels (pair), 1in &amp; 1\u{BC}in>)\n",
//! )
//! .unwrap();
//!
//! let table = doc.value().as_table().unwrap();
//! assert_eq!(table.ttype(), "PriceList");
//! assert_eq!(table.get(0, 2).and_then(|v| v.as_int()), Some(2));
//!
//! // Write it back out canonically.
//! let text = uxf::to_string(&doc).unwrap();
//! assert!(text.starts_with("uxf 1.0 Price List\n"));
//! ```
//!
//! ## Building documents programmatically
//!
//! ```rust
//! use uxf::{Key, Map, Uxf, Value};
//!
//! let mut map = Map::new();
//! map.insert(Key::from("greeting"), Value::from("hello"));
//! map.insert(Key::from("count"), Value::from(3));
//!
//! let mut doc = Uxf::default();
//! doc.set_value(Value::Map(map)).unwrap();
//! assert_eq!(uxf::to_string(&doc).unwrap(), "uxf 1.0\n{<greeting> <hello> <count> 3}\n");
//! ```
//!
//! ## Diagnostics
//!
//! Load problems are reported as [`Event`]s with stable codes (e.g.
//! `E-PARSE-TABLE-LEN`, `W-TYPE-UNUSED`) through a handler you can
//! replace; see the [`event`] module. The default handler prints to
//! stderr and only fatal events abort the load.

pub mod error;
pub mod event;
pub mod field;
pub mod format;
pub mod list;
pub mod map;
pub mod table;
pub mod tclass;
pub mod uxf;
pub mod value;

mod check;
mod import;
mod lexer;
mod parser;
mod writer;

pub use crate::check::{KTYPES, RESERVED_WORDS, VTYPES};
pub use crate::error::{Error, Result};
pub use crate::event::Event;
pub use crate::field::Field;
pub use crate::format::Format;
pub use crate::list::List;
pub use crate::map::Map;
pub use crate::parser::ParseOptions;
pub use crate::table::Table;
pub use crate::tclass::TClass;
pub use crate::uxf::Uxf;
pub use crate::value::{naturalize, Key, Value};

use std::io::Write;
use std::path::Path;
use tracing::debug;

/// The highest UXF format version this crate reads, and the version it
/// writes.
pub const VERSION: f64 = 1.0;

/// Parses UXF text with default options.
///
/// Diagnostics go to the default stderr handler; the first fatal one
/// aborts the load.
///
/// # Examples
///
/// ```rust
/// let doc = uxf::from_str("uxf 1.0\n[1 2 3]\n").unwrap();
/// assert_eq!(doc.value().as_list().unwrap().len(), 3);
/// ```
///
/// # Errors
///
/// Returns an error for malformed or type-invalid input.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_str(text: &str) -> Result<Uxf> {
    from_str_with_options(
        text,
        "-",
        &ParseOptions::default(),
        &mut event::report_to_stderr,
    )
}

/// Parses UXF text with explicit options and event handler.
///
/// `filename` is only used in diagnostics (pass `"-"` for in-memory
/// input) and to resolve relative imports.
///
/// # Errors
///
/// Returns an error for malformed or type-invalid input, or when the
/// handler promotes a diagnostic.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_str_with_options(
    text: &str,
    filename: &str,
    options: &ParseOptions,
    on_event: &mut dyn FnMut(&Event) -> Result<()>,
) -> Result<Uxf> {
    parser::parse_text(text, filename, options, on_event, &mut Vec::new(), false)
}

/// Loads a UXF document from a file, gunzipping if necessary.
///
/// gzip content is detected by magic bytes or a `.gz` suffix; a UTF-8 BOM
/// is consumed.
///
/// # Errors
///
/// Returns an error if the file cannot be read or its content does not
/// parse.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Uxf> {
    from_path_with_options(
        path,
        &ParseOptions::default(),
        &mut event::report_to_stderr,
    )
}

/// Loads a UXF document from a file with explicit options and handler.
///
/// # Errors
///
/// Returns an error if the file cannot be read or its content does not
/// parse.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_path_with_options<P: AsRef<Path>>(
    path: P,
    options: &ParseOptions,
    on_event: &mut dyn FnMut(&Event) -> Result<()>,
) -> Result<Uxf> {
    let path = path.as_ref();
    debug!(path = %path.display(), "reading uxf file");
    let bytes = std::fs::read(path)?;
    let filename = path.to_string_lossy().into_owned();
    let text = import::decode(bytes, &filename)
        .map_err(|(_, message)| Error::io(message))?;
    // Seed the cycle stack so the root file cannot be imported back.
    let id = path
        .canonicalize()
        .unwrap_or_else(|_| path.to_path_buf())
        .to_string_lossy()
        .into_owned();
    parser::parse_text(&text, &filename, options, on_event, &mut vec![id], false)
}

/// Writes a document as canonical UXF text with the default [`Format`].
///
/// # Examples
///
/// ```rust
/// let doc = uxf::from_str("uxf 1.0\n[1 2 3]\n").unwrap();
/// assert_eq!(uxf::to_string(&doc).unwrap(), "uxf 1.0\n[1 2 3]\n");
/// ```
///
/// # Errors
///
/// Returns an error if the tree holds something the concrete syntax
/// cannot express (e.g. a non-finite real).
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string(uxf: &Uxf) -> Result<String> {
    writer::write_document(uxf, &Format::default())
}

/// Writes a document as UXF text with a custom [`Format`].
///
/// # Errors
///
/// Returns an error if the tree cannot be expressed.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string_with_format(uxf: &Uxf, format: &Format) -> Result<String> {
    writer::write_document(uxf, format)
}

/// Writes a document to any [`Write`] sink with the default format.
///
/// # Errors
///
/// Returns an error if rendering fails or the sink rejects the bytes.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_writer<W: Write>(writer: W, uxf: &Uxf) -> Result<()> {
    to_writer_with_format(writer, uxf, &Format::default())
}

/// Writes a document to any [`Write`] sink with a custom format.
///
/// # Errors
///
/// Returns an error if rendering fails or the sink rejects the bytes.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_writer_with_format<W: Write>(mut writer: W, uxf: &Uxf, format: &Format) -> Result<()> {
    let text = writer::write_document(uxf, format)?;
    writer.write_all(text.as_bytes())?;
    Ok(())
}

/// Writes a document to a file, gzipping when `compress` is set or the
/// path ends in `.gz`.
///
/// # Errors
///
/// Returns an error if rendering or writing fails.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_path<P: AsRef<Path>>(
    path: P,
    uxf: &Uxf,
    format: &Format,
    compress: bool,
) -> Result<()> {
    let path = path.as_ref();
    debug!(path = %path.display(), compress, "writing uxf file");
    let text = writer::write_document(uxf, format)?;
    let compress = compress || path.extension().is_some_and(|ext| ext == "gz");
    if compress {
        let file = std::fs::File::create(path)?;
        let mut encoder = flate2::write::GzEncoder::new(file, flate2::Compression::default());
        encoder.write_all(text.as_bytes())?;
        encoder.finish()?;
    } else {
        std::fs::write(path, text)?;
    }
    Ok(())
}

/// Reads a UXF file and rewrites it under the given format.
///
/// Covers pretty-printing, compacting, and compressing/uncompressing
/// (driven by the output path's `.gz` suffix).
///
/// # Errors
///
/// Returns an error if loading or writing fails.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn pretty_print<P: AsRef<Path>, Q: AsRef<Path>>(
    infile: P,
    outfile: Q,
    format: &Format,
) -> Result<()> {
    let doc = from_path(infile)?;
    to_path(outfile, &doc, format, false)
}

/// Reads a UXF file and rewrites it with every import expanded into ttype
/// definitions.
///
/// # Errors
///
/// Returns an error if loading or writing fails.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn inline_imports<P: AsRef<Path>, Q: AsRef<Path>>(
    infile: P,
    outfile: Q,
    format: &Format,
) -> Result<()> {
    let doc = from_path(infile)?;
    let format = format.clone().with_replaced_imports(true);
    to_path(outfile, &doc, &format, false)
}

/// Parses UXF text purely for its diagnostics.
///
/// Every event — warnings and the fatal error, if any — is returned in
/// order. An empty vector means a clean document.
///
/// # Examples
///
/// ```rust
/// use uxf::ParseOptions;
///
/// let events = uxf::lint("uxf 1.0\n{<a> 1 <a> 2}\n", "-", &ParseOptions::default());
/// assert_eq!(events.len(), 1);
/// assert_eq!(events[0].code, "W-PARSE-DUPLICATE-KEY");
/// ```
#[must_use]
pub fn lint(text: &str, filename: &str, options: &ParseOptions) -> Vec<Event> {
    let mut events = Vec::new();
    let _ = from_str_with_options(text, filename, options, &mut |event| {
        events.push(event.clone());
        Ok(())
    });
    events
}
