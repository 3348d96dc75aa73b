//! Step-driven row cursor
//!
//! A [`Cursor`] walks the pending result rows of one statement. It is either
//! **active** (positioned on a row) or **exhausted** (terminal). The first
//! step happens when the cursor is created by [`Statement::begin`]; every
//! [`Cursor::advance`] performs one more step.
//!
//! The cursor mutably borrows its statement, so a statement can have at most
//! one live cursor, and cannot be rebound or finalized while it is iterated.
//!
//! [`Statement::begin`]: crate::Statement::begin

use crate::error::{Diagnostic, Error, Result};
use crate::row::{ColumnType, Row, Value};
use crate::statement::Statement;
use libsqlite3_sys as ffi;
use std::fmt;
use std::iter::FusedIterator;
use std::marker::PhantomData;
use std::os::raw::c_int;
use std::ptr::NonNull;
use std::sync::Arc;

/// Forward-only view over the rows of a [`Statement`]
///
/// Besides the explicit `is_active` / `advance` protocol, a cursor is an
/// [`Iterator`] of owned [`Row`] snapshots.
///
/// ```no_run
/// # use sqlitekit::Connection;
/// # let db = Connection::open_in_memory()?;
/// let mut stmt = db.prepare("SELECT article, amount FROM store")?;
/// for row in stmt.begin()? {
///     let row = row?;
///     println!("{} {}", row.text(0).unwrap_or_default(), row.text(1).unwrap_or_default());
/// }
/// # Ok::<(), sqlitekit::Error>(())
/// ```
pub struct Cursor<'stmt> {
    stmt: Option<NonNull<ffi::sqlite3_stmt>>,
    columns: Arc<[String]>,
    failed: Option<Error>,
    _marker: PhantomData<&'stmt mut ()>,
}

impl<'stmt> Cursor<'stmt> {
    pub(crate) fn new(stmt: &'stmt mut Statement<'_>) -> Result<Self> {
        let mut cursor = Cursor {
            stmt: Some(stmt.raw()),
            columns: stmt.column_names().into(),
            failed: None,
            _marker: PhantomData,
        };
        cursor.advance()?;
        Ok(cursor)
    }

    pub(crate) fn exhausted() -> Self {
        Cursor {
            stmt: None,
            columns: Arc::from(Vec::<String>::new()),
            failed: None,
            _marker: PhantomData,
        }
    }

    /// True while the cursor is positioned on a row
    pub fn is_active(&self) -> bool {
        self.stmt.is_some()
    }

    /// Step to the next row
    ///
    /// Stepping past the last row makes the cursor exhausted. A step failure
    /// also exhausts it and is returned as [`Error::Step`]. Advancing an
    /// exhausted cursor does nothing.
    pub fn advance(&mut self) -> Result<()> {
        let Some(raw) = self.stmt else {
            return Ok(());
        };

        match unsafe { ffi::sqlite3_step(raw.as_ptr()) } {
            ffi::SQLITE_ROW => Ok(()),
            ffi::SQLITE_DONE => {
                self.stmt = None;
                Ok(())
            }
            rc => {
                self.stmt = None;
                let diag = unsafe {
                    let diag = Diagnostic::from_result(ffi::sqlite3_db_handle(raw.as_ptr()), rc);
                    ffi::sqlite3_reset(raw.as_ptr());
                    diag
                };
                Err(Error::Step(diag))
            }
        }
    }

    /// Number of result columns
    ///
    /// Column names are captured when the cursor is created, so this and
    /// [`Cursor::column_name`] keep answering after the cursor is exhausted.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn column_name(&self, index: usize) -> Option<&str> {
        self.columns.get(index).map(String::as_str)
    }

    /// Column names in result order
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Storage class of a column in the current row
    pub fn column_type(&self, index: usize) -> ColumnType {
        self.column(index).map_or(ColumnType::Null, |(raw, i)| {
            ColumnType::from_code(unsafe { ffi::sqlite3_column_type(raw, i) })
        })
    }

    /// Column rendered as text; `None` for NULL
    ///
    /// Numbers are converted by the engine, so an INT column holding 125
    /// reads as `"125"`.
    pub fn column_text(&self, index: usize) -> Option<String> {
        let (raw, i) = self.column(index)?;
        unsafe {
            let ptr = ffi::sqlite3_column_text(raw, i);
            if ptr.is_null() {
                return None;
            }
            let len = usize::try_from(ffi::sqlite3_column_bytes(raw, i)).unwrap_or(0);
            let bytes = std::slice::from_raw_parts(ptr, len);
            Some(String::from_utf8_lossy(bytes).into_owned())
        }
    }

    /// Column as raw bytes; `None` for NULL
    pub fn column_blob(&self, index: usize) -> Option<Vec<u8>> {
        let (raw, i) = self.column(index)?;
        unsafe {
            if ffi::sqlite3_column_type(raw, i) == ffi::SQLITE_NULL {
                return None;
            }
            let ptr = ffi::sqlite3_column_blob(raw, i);
            let len = usize::try_from(ffi::sqlite3_column_bytes(raw, i)).unwrap_or(0);
            if ptr.is_null() || len == 0 {
                return Some(Vec::new());
            }
            Some(std::slice::from_raw_parts(ptr.cast::<u8>(), len).to_vec())
        }
    }

    pub fn column_int(&self, index: usize) -> i32 {
        self.column(index)
            .map_or(0, |(raw, i)| unsafe { ffi::sqlite3_column_int(raw, i) })
    }

    pub fn column_int64(&self, index: usize) -> i64 {
        self.column(index)
            .map_or(0, |(raw, i)| unsafe { ffi::sqlite3_column_int64(raw, i) })
    }

    pub fn column_double(&self, index: usize) -> f64 {
        self.column(index)
            .map_or(0.0, |(raw, i)| unsafe { ffi::sqlite3_column_double(raw, i) })
    }

    /// Column converted according to its storage class
    pub fn column_value(&self, index: usize) -> Value {
        match self.column_type(index) {
            ColumnType::Null => Value::Null,
            ColumnType::Integer => Value::Integer(self.column_int64(index)),
            ColumnType::Real => Value::Real(self.column_double(index)),
            ColumnType::Text => Value::Text(self.column_text(index).unwrap_or_default()),
            ColumnType::Blob => Value::Blob(self.column_blob(index).unwrap_or_default()),
        }
    }

    /// Owned snapshot of the current row, `None` once exhausted
    pub fn row(&self) -> Option<Row> {
        self.stmt?;
        let values = (0..self.columns.len())
            .map(|i| self.column_value(i))
            .collect();
        Some(Row::new(Arc::clone(&self.columns), values))
    }

    fn column(&self, index: usize) -> Option<(*mut ffi::sqlite3_stmt, c_int)> {
        let raw = self.stmt?;
        if index >= self.columns.len() {
            return None;
        }
        Some((raw.as_ptr(), c_int::try_from(index).ok()?))
    }
}

impl Iterator for Cursor<'_> {
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(err) = self.failed.take() {
            return Some(Err(err));
        }

        let row = self.row()?;
        if let Err(err) = self.advance() {
            self.failed = Some(err);
        }
        Some(Ok(row))
    }
}

impl FusedIterator for Cursor<'_> {}

/// Two cursors are equal when both are exhausted or both sit on the same
/// statement
impl<'a, 'b> PartialEq<Cursor<'b>> for Cursor<'a> {
    fn eq(&self, other: &Cursor<'b>) -> bool {
        self.stmt == other.stmt
    }
}

impl Default for Cursor<'_> {
    fn default() -> Self {
        Cursor::exhausted()
    }
}

impl Drop for Cursor<'_> {
    fn drop(&mut self) {
        // an abandoned cursor must not keep the statement's read lock
        if let Some(raw) = self.stmt.take() {
            unsafe {
                ffi::sqlite3_reset(raw.as_ptr());
            }
        }
    }
}

impl fmt::Debug for Cursor<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cursor")
            .field("active", &self.is_active())
            .field("columns", &self.columns)
            .finish()
    }
}
