//! Configuration options for UXF output.
//!
//! [`Format`] controls how the writer lays out a document: indentation,
//! the soft wrap target, real-number precision, the inline-collection
//! threshold, boolean vocabulary, and whether imports are kept or expanded
//! into ttype definitions.
//!
//! ## Examples
//!
//! ```rust
//! use uxf::{to_string_with_format, Format};
//!
//! let doc = uxf::from_str("uxf 1.0\n[yes no]\n").unwrap();
//!
//! // Default vocabulary.
//! let text = to_string_with_format(&doc, &Format::default()).unwrap();
//! assert_eq!(text, "uxf 1.0\n[yes no]\n");
//!
//! // Alternate boolean spelling.
//! let format = Format::new().with_true_false(true);
//! let text = to_string_with_format(&doc, &format).unwrap();
//! assert_eq!(text, "uxf 1.0\n[true false]\n");
//! ```

/// Output configuration for the writer.
#[derive(Clone, Debug, PartialEq)]
pub struct Format {
    /// Per-level indent string; empty for compact output.
    pub indent: String,
    /// Soft line-wrap target in columns (long hex byte runs wrap here).
    pub wrap_width: usize,
    /// Decimal digits after the point for reals; `None` keeps the
    /// shortest representation that round-trips.
    pub realdp: Option<u8>,
    /// Collections whose one-line render is at most this long stay on one
    /// line.
    pub max_short_len: usize,
    /// Emit `true`/`false` instead of the canonical `yes`/`no`.
    pub use_true_false: bool,
    /// Expand imports into ttype definitions instead of emitting `!`
    /// lines.
    pub replace_imports: bool,
}

impl Default for Format {
    fn default() -> Self {
        Format {
            indent: "  ".to_string(),
            wrap_width: 96,
            realdp: None,
            max_short_len: 60,
            use_true_false: false,
            replace_imports: false,
        }
    }
}

impl Format {
    /// Creates the default format (two-space indent, 96-column wrap,
    /// shortest reals, `yes`/`no`, imports retained).
    #[must_use]
    pub fn new() -> Self {
        Format::default()
    }

    /// Sets the per-level indent string. `""` produces compact output.
    #[must_use]
    pub fn with_indent(mut self, indent: &str) -> Self {
        self.indent = indent.to_string();
        self
    }

    /// Sets the soft wrap target in columns.
    #[must_use]
    pub fn with_wrap_width(mut self, wrap_width: usize) -> Self {
        self.wrap_width = wrap_width;
        self
    }

    /// Fixes the number of decimal digits written for reals.
    #[must_use]
    pub fn with_realdp(mut self, realdp: u8) -> Self {
        self.realdp = Some(realdp);
        self
    }

    /// Sets the inline-collection threshold.
    #[must_use]
    pub fn with_max_short_len(mut self, max_short_len: usize) -> Self {
        self.max_short_len = max_short_len;
        self
    }

    /// Chooses `true`/`false` over `yes`/`no`.
    #[must_use]
    pub fn with_true_false(mut self, use_true_false: bool) -> Self {
        self.use_true_false = use_true_false;
        self
    }

    /// Expands imports into ttype definitions on output.
    #[must_use]
    pub fn with_replaced_imports(mut self, replace_imports: bool) -> Self {
        self.replace_imports = replace_imports;
        self
    }
}
