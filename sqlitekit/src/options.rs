//! Connection configuration

use libsqlite3_sys as ffi;
use serde::{Deserialize, Serialize};
use std::os::raw::c_int;

/// How a connection is opened
///
/// The defaults match `sqlite3_open`: read-write, create the file if missing,
/// no URI filenames, no busy timeout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenOptions {
    /// Open the database read-only
    pub read_only: bool,

    /// Create the database file if it does not exist (ignored when read-only)
    pub create: bool,

    /// Interpret the path as a `file:` URI
    pub uri: bool,

    /// Milliseconds to retry on a locked database before failing with BUSY
    pub busy_timeout_ms: Option<u32>,
}

impl Default for OpenOptions {
    fn default() -> Self {
        Self {
            read_only: false,
            create: true,
            uri: false,
            busy_timeout_ms: None,
        }
    }
}

impl OpenOptions {
    /// Read-write, creating the file when missing
    pub fn read_write() -> Self {
        Self::default()
    }

    /// Read-only on an existing database
    pub fn read_only() -> Self {
        Self {
            read_only: true,
            create: false,
            ..Self::default()
        }
    }

    pub fn with_create(mut self, create: bool) -> Self {
        self.create = create;
        self
    }

    pub fn with_uri(mut self, uri: bool) -> Self {
        self.uri = uri;
        self
    }

    pub fn with_busy_timeout(mut self, millis: u32) -> Self {
        self.busy_timeout_ms = Some(millis);
        self
    }

    /// Flags passed to `sqlite3_open_v2`
    pub(crate) fn flags(&self) -> c_int {
        let mut flags = if self.read_only {
            ffi::SQLITE_OPEN_READONLY
        } else {
            ffi::SQLITE_OPEN_READWRITE
        };
        if self.create && !self.read_only {
            flags |= ffi::SQLITE_OPEN_CREATE;
        }
        if self.uri {
            flags |= ffi::SQLITE_OPEN_URI;
        }
        flags
    }
}
