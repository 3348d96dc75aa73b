//! Error types and native error translation
//!
//! Every failure reported by SQLite is captured as a [`Diagnostic`]: the
//! numeric result code, the connection's last error message and the generic
//! description of the code. The diagnostic is rendered into its final string
//! when it is created, so it stays readable after the connection that
//! produced it has been closed.

use libsqlite3_sys as ffi;
use std::ffi::CStr;
use std::fmt;
use std::os::raw::{c_char, c_int};
use thiserror::Error;

/// Immutable snapshot of a native error state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    code: i32,
    message: String,
    description: String,
    rendered: String,
}

impl Diagnostic {
    /// Capture the last error recorded on a connection handle
    ///
    /// A null handle is accepted; SQLite reports it as an out-of-memory
    /// condition, which is what a failed `sqlite3_open_v2` without a handle
    /// means.
    ///
    /// # Safety
    ///
    /// `db` must be null or a live handle returned by `sqlite3_open_v2`.
    pub(crate) unsafe fn from_handle(db: *mut ffi::sqlite3) -> Self {
        let code = ffi::sqlite3_errcode(db);
        let message = owned_str(ffi::sqlite3_errmsg(db));
        Self::with_message(code, message)
    }

    /// Capture the error behind a non-OK result code `rc`
    ///
    /// Falls back to the generic description of `rc` when the handle's error
    /// state does not belong to this failure (or there is no handle).
    ///
    /// # Safety
    ///
    /// `db` must be null or a live connection handle.
    pub(crate) unsafe fn from_result(db: *mut ffi::sqlite3, rc: c_int) -> Self {
        if !db.is_null() {
            let diag = Self::from_handle(db);
            if diag.primary_code() == rc & 0xff {
                return diag;
            }
        }
        Self::with_message(rc, code_description(rc))
    }

    /// Build a diagnostic for a condition detected by this crate rather than
    /// by the engine, using the engine's description of `code`
    pub(crate) fn with_message(code: c_int, message: impl Into<String>) -> Self {
        let message = message.into();
        let description = code_description(code);
        let rendered = format!(
            "Error: {}\nErrorCode: {} - {}",
            message, code, description
        );

        Diagnostic {
            code,
            message,
            description,
            rendered,
        }
    }

    /// Result code reported by the engine
    ///
    /// Extended codes only appear when the connection has them enabled; the
    /// primary code is always available through [`Diagnostic::primary_code`].
    pub fn code(&self) -> i32 {
        self.code
    }

    /// Primary result code (the low byte of the extended code)
    pub fn primary_code(&self) -> i32 {
        self.code & 0xff
    }

    /// Contextual message from the connection, e.g. `near "SELEC": syntax error`
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Generic English description of the code, e.g. `SQL logic error`
    pub fn description(&self) -> &str {
        &self.description
    }

    /// The fully rendered diagnostic
    pub fn as_str(&self) -> &str {
        &self.rendered
    }

    /// True when the failure was caused by a lock held by another connection
    pub fn is_busy(&self) -> bool {
        matches!(self.primary_code(), ffi::SQLITE_BUSY | ffi::SQLITE_LOCKED)
    }

    /// True when a constraint (UNIQUE, NOT NULL, CHECK, ...) rejected a write
    pub fn is_constraint_violation(&self) -> bool {
        self.primary_code() == ffi::SQLITE_CONSTRAINT
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.rendered)
    }
}

/// Errors surfaced by sqlitekit
#[derive(Error, Debug)]
pub enum Error {
    #[error("Open error: {0}")]
    Open(Diagnostic),

    #[error("Prepare error: {0}")]
    Prepare(Diagnostic),

    #[error("Bind error: {0}")]
    Bind(Diagnostic),

    #[error("Step error: {0}")]
    Step(Diagnostic),

    #[error("Unknown parameter: {0}")]
    UnknownParameter(String),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Deserialization error: {0}")]
    Deserialize(#[from] serde_json::Error),
}

impl Error {
    /// The native diagnostic carried by this error, if it came from the engine
    pub fn diagnostic(&self) -> Option<&Diagnostic> {
        match self {
            Error::Open(d) | Error::Prepare(d) | Error::Bind(d) | Error::Step(d) => Some(d),
            _ => None,
        }
    }

    /// Result code, if the error came from the engine
    pub fn code(&self) -> Option<i32> {
        self.diagnostic().map(Diagnostic::code)
    }
}

/// Result type used throughout sqlitekit
pub type Result<T> = std::result::Result<T, Error>;

/// `sqlite3_errstr` for an arbitrary code
pub(crate) fn code_description(code: c_int) -> String {
    unsafe { owned_str(ffi::sqlite3_errstr(code)) }
}

/// Copy a NUL-terminated engine string; null becomes the empty string
///
/// # Safety
///
/// `ptr` must be null or point to a valid NUL-terminated string.
pub(crate) unsafe fn owned_str(ptr: *const c_char) -> String {
    if ptr.is_null() {
        return String::new();
    }
    CStr::from_ptr(ptr).to_string_lossy().into_owned()
}
