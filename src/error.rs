//! Error types for terminal-facing operations.
//!
//! Only operations that reach the terminal can fail. Geometry, pens and
//! buffers report "no match" with `Option`/`bool` instead.

use crate::terminal::TermCtl;
use thiserror::Error;

/// Error type for casement operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Writing to the terminal failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The control can be queried but not set.
    #[error("terminal control {0:?} is read-only")]
    ReadOnlyCtl(TermCtl),

    /// The value is out of range for the control, or of the wrong kind.
    #[error("invalid value {value:?} for terminal control {ctl:?}")]
    InvalidCtlValue {
        /// The control being set.
        ctl: TermCtl,
        /// The rejected value, rendered as text.
        value: String,
    },
}

/// Result type alias using the crate's [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
