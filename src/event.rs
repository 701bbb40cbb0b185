//! Diagnostic events and the pluggable event handler.
//!
//! Every problem found while lexing, parsing, validating, or resolving
//! imports is reported as an [`Event`] carrying a 1-based line number, a
//! stable string code, a human-readable message, the source filename
//! (`"-"` for in-memory input), and a fatality flag.
//!
//! Events flow through a handler injected into the load call. The default
//! handler, [`report_to_stderr`], prints a formatted diagnostic and lets
//! processing continue; fatal events abort the load afterwards regardless
//! of what the handler returns. A handler may also *promote* any event —
//! warnings included — to an abort by returning an error:
//!
//! ```rust
//! use uxf::{from_str_with_options, Error, ParseOptions};
//!
//! // Collect every diagnostic instead of printing them.
//! let mut events = Vec::new();
//! let _ = from_str_with_options(
//!     "uxf 1.0\n{<a> 1 <a> 2}\n",
//!     "-",
//!     &ParseOptions::default(),
//!     &mut |event| {
//!         events.push(event.clone());
//!         Ok(())
//!     },
//! );
//! assert_eq!(events[0].code, "W-PARSE-DUPLICATE-KEY");
//! ```
//!
//! ## Stable codes
//!
//! Codes are prefixed by phase: `E-LEX-*`, `E-PARSE-*`, `E-TYPE-*`,
//! `E-IMP-*`, `E-RANGE-*` for errors and `W-*` for warnings. They are part
//! of the public contract and never change meaning between releases.

use crate::error::Result;
use std::fmt;

// Lexical errors.
pub const E_LEX_HEADER: &str = "E-LEX-HEADER";
pub const E_LEX_CHAR: &str = "E-LEX-CHAR";
pub const E_LEX_STR: &str = "E-LEX-STR";
pub const E_LEX_ENTITY: &str = "E-LEX-ENTITY";
pub const E_LEX_BYTES: &str = "E-LEX-BYTES";
pub const E_LEX_NUM: &str = "E-LEX-NUM";
pub const E_LEX_COMMENT: &str = "E-LEX-COMMENT";

// Syntactic and structural errors.
pub const E_PARSE_UNEXPECTED: &str = "E-PARSE-UNEXPECTED";
pub const E_PARSE_UNTERMINATED: &str = "E-PARSE-UNTERMINATED";
pub const E_PARSE_MISSING_VALUE: &str = "E-PARSE-MISSING-VALUE";
pub const E_PARSE_MAP_ODD: &str = "E-PARSE-MAP-ODD";
pub const E_PARSE_TABLE_LEN: &str = "E-PARSE-TABLE-LEN";

// Type errors.
pub const E_TYPE_MISMATCH: &str = "E-TYPE-MISMATCH";
pub const E_TYPE_UNKNOWN: &str = "E-TYPE-UNKNOWN";
pub const E_TYPE_RESERVED: &str = "E-TYPE-RESERVED";
pub const E_TYPE_CONFLICT: &str = "E-TYPE-CONFLICT";
pub const E_TYPE_IDENT: &str = "E-TYPE-IDENT";

// Import errors.
pub const E_IMP_NOT_FOUND: &str = "E-IMP-NOT-FOUND";
pub const E_IMP_CYCLE: &str = "E-IMP-CYCLE";
pub const E_IMP_CONFLICT: &str = "E-IMP-CONFLICT";
pub const E_IMP_NET: &str = "E-IMP-NET";
pub const E_IMP_GZIP: &str = "E-IMP-GZIP";

// Range errors.
pub const E_RANGE_DATE: &str = "E-RANGE-DATE";
pub const E_RANGE_INT: &str = "E-RANGE-INT";

// Warnings.
pub const W_LEX_VERSION: &str = "W-LEX-VERSION";
pub const W_DATETIME_IMPRECISE: &str = "W-DATETIME-IMPRECISE";
pub const W_TYPE_COERCED: &str = "W-TYPE-COERCED";
pub const W_TYPE_UNUSED: &str = "W-TYPE-UNUSED";
pub const W_PARSE_DUPLICATE_KEY: &str = "W-PARSE-DUPLICATE-KEY";

/// One diagnostic produced while processing UXF input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Event {
    /// 1-based source line, `0` if unknown.
    pub line: usize,
    /// Stable code, e.g. `E-PARSE-TABLE-LEN`.
    pub code: &'static str,
    /// Human-readable description.
    pub message: String,
    /// Source filename, `"-"` for in-memory input.
    pub filename: String,
    /// Whether the load aborts after this event is delivered.
    pub fatal: bool,
}

impl Event {
    /// Creates a fatal event.
    pub fn error(
        line: usize,
        code: &'static str,
        message: impl Into<String>,
        filename: impl Into<String>,
    ) -> Self {
        Event {
            line,
            code,
            message: message.into(),
            filename: filename.into(),
            fatal: true,
        }
    }

    /// Creates a non-fatal (warning) event.
    pub fn warning(
        line: usize,
        code: &'static str,
        message: impl Into<String>,
        filename: impl Into<String>,
    ) -> Self {
        Event {
            line,
            code,
            message: message.into(),
            filename: filename.into(),
            fatal: false,
        }
    }

    /// Returns `true` for `W-*` events.
    #[must_use]
    pub fn is_warning(&self) -> bool {
        !self.fatal
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = if self.fatal { "error" } else { "warning" };
        write!(
            f,
            "uxf:{kind}:{}:{}:{}: {}",
            self.filename, self.line, self.code, self.message
        )
    }
}

/// The default event handler: prints the diagnostic to standard error and
/// lets processing continue (fatal events still abort the load).
pub fn report_to_stderr(event: &Event) -> Result<()> {
    eprintln!("{event}");
    Ok(())
}

/// An event handler that discards everything.
///
/// Useful when a caller only cares about the final [`Result`].
pub fn ignore(_event: &Event) -> Result<()> {
    Ok(())
}

/// Hands an event to the handler, then aborts if it was fatal.
///
/// The abort happens whatever the handler returned; a handler can promote
/// but never demote.
pub(crate) fn deliver(
    on_event: &mut dyn FnMut(&Event) -> Result<()>,
    event: Event,
) -> Result<()> {
    on_event(&event)?;
    if event.fatal {
        Err(crate::error::Error::Fatal(event))
    } else {
        Ok(())
    }
}
