//! sqlitekit - Typed, resource-safe Rust API over the SQLite C library
//!
//! This crate wraps SQLite's handle-based interface (open/close, prepare,
//! bind, step, reset, finalize, read columns, last error) in owning types
//! whose lifetimes make the usual misuse impossible: a statement cannot
//! outlive its connection, a statement has at most one active cursor, and a
//! transaction that is not committed is rolled back.
//!
//! # Quick Start
//!
//! ```no_run
//! use sqlitekit::{params, Connection, Error};
//!
//! # fn main() -> Result<(), Error> {
//! let db = Connection::open("store.db")?;
//! db.execute("CREATE TABLE store (article TEXT, category TEXT, amount INT)")?;
//!
//! let mut insert = db.prepare("INSERT INTO store VALUES (?, ?, ?)")?;
//! insert.bind_all(params!["apple", "fruit", 125])?;
//! insert.exec()?;
//! insert.bind_all(params!["banana", "fruit", 70])?;
//! insert.exec()?;
//!
//! let mut query = db.prepare("SELECT article, amount FROM store")?;
//! for row in query.begin()? {
//!     let row = row?;
//!     println!("{}: {}", row.text(0).unwrap_or_default(), row.text(1).unwrap_or_default());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │   Application Code (Your Rust App)      │
//! └─────────────────────────────────────────┘
//!                  │
//!                  ▼
//! ┌─────────────────────────────────────────┐
//! │  sqlitekit (this crate)                 │
//! │  - Connection (owns sqlite3*)           │
//! │  - Statement (owns sqlite3_stmt*)       │
//! │  - Cursor (borrows a Statement)         │
//! │  - Transaction (rollback-on-drop)       │
//! │  - Error / Diagnostic                   │
//! └─────────────────────────────────────────┘
//!                  │
//!                  ▼
//! ┌─────────────────────────────────────────┐
//! │  libsqlite3-sys (bundled SQLite)        │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Module Organization
//!
//! - [`connection`] - Connection lifecycle, change counters, statement factory
//! - [`statement`] - Prepared statements and parameter binding
//! - [`cursor`] - Row iteration and typed column access
//! - [`transaction`] - Transaction scopes
//! - [`row`] - Owned rows and dynamically typed values
//! - [`params`] - Bind values and the [`params!`] macro
//! - [`options`] - Open flags and busy timeout
//! - [`error`] - Error types and native error translation

pub mod connection;
pub mod cursor;
pub mod error;
pub mod options;
pub mod params;
pub mod row;
pub mod statement;
pub mod transaction;

pub use connection::Connection;
pub use cursor::Cursor;
pub use error::{Diagnostic, Error, Result};
pub use options::OpenOptions;
pub use params::Param;
pub use row::{ColumnType, Row, Value};
pub use statement::Statement;
pub use transaction::{DropBehavior, Transaction, TransactionMode};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Version string of the linked SQLite library, e.g. `3.45.0`
pub fn sqlite_version() -> &'static str {
    // SAFETY: sqlite3_libversion returns a pointer to a static string
    unsafe {
        std::ffi::CStr::from_ptr(libsqlite3_sys::sqlite3_libversion())
            .to_str()
            .unwrap_or("unknown")
    }
}
