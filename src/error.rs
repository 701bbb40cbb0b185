//! Error types for UXF reading and writing.
//!
//! Most diagnostics produced while processing UXF text are [`Event`]s
//! delivered to a handler (see the [`event`](crate::event) module); an
//! [`Error`] is what a load or dump call returns once processing cannot
//! continue.
//!
//! ## Examples
//!
//! ```rust
//! use uxf::{from_str, Error};
//!
//! let result = from_str("uxf 1.0\n[1 2");
//! assert!(matches!(result, Err(Error::Fatal(_))));
//! ```

use crate::event::Event;
use thiserror::Error;

/// All the ways a UXF operation can fail.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// IO error during reading or writing.
    #[error("IO error: {0}")]
    Io(String),

    /// A diagnostic that aborted processing, either because it was fatal
    /// or because the installed event handler promoted it.
    #[error("{0}")]
    Fatal(Event),

    /// The in-memory tree contains something the concrete syntax cannot
    /// express (e.g., a non-finite real).
    #[error("cannot write: {0}")]
    Write(String),
}

impl Error {
    /// Creates an I/O error from a display message.
    pub fn io<T: std::fmt::Display>(msg: T) -> Self {
        Error::Io(msg.to_string())
    }

    /// Wraps a diagnostic event as a fatal error.
    pub fn fatal(event: Event) -> Self {
        Error::Fatal(event)
    }

    /// The diagnostic event behind this error, if there is one.
    #[must_use]
    pub fn event(&self) -> Option<&Event> {
        match self {
            Error::Fatal(event) => Some(event),
            _ => None,
        }
    }

    /// The stable diagnostic code behind this error, if there is one.
    ///
    /// # Examples
    ///
    /// ```rust
    /// let err = uxf::from_str("uxf 1.0\n=Pair a b\n(Pair 1 2 3)").unwrap_err();
    /// assert_eq!(err.code(), Some("E-PARSE-TABLE-LEN"));
    /// ```
    #[must_use]
    pub fn code(&self) -> Option<&'static str> {
        self.event().map(|event| event.code)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
