//! Prepared statements
//!
//! A [`Statement`] owns one compiled `sqlite3_stmt` and finalizes it exactly
//! once, on drop. It is either executed directly with [`Statement::exec`]
//! (one step, then reset) or iterated through a [`Cursor`] obtained from
//! [`Statement::begin`].

use crate::connection::Connection;
use crate::cursor::Cursor;
use crate::error::{Diagnostic, Error, Result};
use crate::params::Param;
use libsqlite3_sys as ffi;
use std::ffi::{CStr, CString};
use std::fmt;
use std::os::raw::{c_char, c_int};
use std::ptr::NonNull;

/// A compiled SQL statement bound to the connection that prepared it
///
/// Created only by [`Connection::prepare`]; cannot outlive the connection.
///
/// # Examples
///
/// ```no_run
/// use sqlitekit::{params, Connection};
///
/// # fn main() -> Result<(), sqlitekit::Error> {
/// let db = Connection::open_in_memory()?;
/// db.execute("CREATE TABLE store (article TEXT, category TEXT, amount INT)")?;
///
/// let mut stmt = db.prepare("INSERT INTO store (article, category, amount) VALUES (?, ?, ?)")?;
/// stmt.bind(1, "apple")?;
/// stmt.bind(2, "fruit")?;
/// stmt.bind(3, 125)?;
/// stmt.exec()?;
///
/// stmt.bind_all(params!["banana", "fruit", 70])?;
/// stmt.exec()?;
/// # Ok(())
/// # }
/// ```
pub struct Statement<'conn> {
    raw: NonNull<ffi::sqlite3_stmt>,
    conn: &'conn Connection,
}

impl<'conn> Statement<'conn> {
    pub(crate) fn new(conn: &'conn Connection, raw: NonNull<ffi::sqlite3_stmt>) -> Self {
        log::trace!("statement prepared with handle {:p}", raw.as_ptr());
        Statement { raw, conn }
    }

    /// Bind a value to a 1-based parameter position
    ///
    /// The position is not range-checked here; the engine rejects positions
    /// outside `1..=parameter_count()` and that rejection is returned as
    /// [`Error::Bind`]. Text and blobs are copied by the engine.
    pub fn bind<'v, V: Into<Param<'v>>>(&mut self, position: usize, value: V) -> Result<()> {
        let position = c_int::try_from(position).unwrap_or(c_int::MAX);
        self.bind_param(position, value.into())
    }

    /// Bind a value to a named parameter such as `:amount`, `@amount` or `$amount`
    ///
    /// The name must include its prefix character. An unknown name fails with
    /// [`Error::UnknownParameter`].
    pub fn bind_named<'v, V: Into<Param<'v>>>(&mut self, name: &str, value: V) -> Result<()> {
        match self.parameter_index(name) {
            Some(position) => self.bind(position, value),
            None => Err(Error::UnknownParameter(name.to_string())),
        }
    }

    /// Bind `values` to positions 1, 2, 3, ... in order
    ///
    /// The number of values need not match [`Statement::parameter_count`];
    /// extra values are rejected by the engine, missing ones keep their
    /// previous binding.
    ///
    /// ```no_run
    /// # use sqlitekit::{params, Connection};
    /// # let db = Connection::open_in_memory()?;
    /// let mut stmt = db.prepare("INSERT INTO store VALUES (?, ?, ?)")?;
    /// stmt.bind_all(params!["banana", "fruit", 70])?;
    /// # Ok::<(), sqlitekit::Error>(())
    /// ```
    pub fn bind_all<'v, I>(&mut self, values: I) -> Result<()>
    where
        I: IntoIterator,
        I::Item: Into<Param<'v>>,
    {
        for (offset, value) in values.into_iter().enumerate() {
            self.bind(offset + 1, value)?;
        }
        Ok(())
    }

    /// Reset every parameter to NULL
    pub fn clear_bindings(&mut self) {
        unsafe {
            ffi::sqlite3_clear_bindings(self.raw.as_ptr());
        }
    }

    /// Number of SQL parameters (the largest parameter index)
    pub fn parameter_count(&self) -> usize {
        let count = unsafe { ffi::sqlite3_bind_parameter_count(self.raw.as_ptr()) };
        usize::try_from(count).unwrap_or(0)
    }

    /// Position of the named parameter, `None` if there is no such name
    pub fn parameter_index(&self, name: &str) -> Option<usize> {
        let name = CString::new(name).ok()?;
        let index = unsafe { ffi::sqlite3_bind_parameter_index(self.raw.as_ptr(), name.as_ptr()) };
        usize::try_from(index).ok().filter(|&i| i > 0)
    }

    /// Name (with prefix) of the parameter at a 1-based position
    ///
    /// `None` for positional `?` parameters and out-of-range positions.
    pub fn parameter_name(&self, index: usize) -> Option<&str> {
        let index = c_int::try_from(index).ok()?;
        unsafe {
            let ptr = ffi::sqlite3_bind_parameter_name(self.raw.as_ptr(), index);
            if ptr.is_null() {
                None
            } else {
                CStr::from_ptr(ptr).to_str().ok()
            }
        }
    }

    /// Number of result columns; 0 for statements that produce no rows
    pub fn column_count(&self) -> usize {
        let count = unsafe { ffi::sqlite3_column_count(self.raw.as_ptr()) };
        usize::try_from(count).unwrap_or(0)
    }

    /// Result column names in order
    pub fn column_names(&self) -> Vec<String> {
        (0..self.column_count())
            .map(|i| unsafe {
                crate::error::owned_str(ffi::sqlite3_column_name(self.raw.as_ptr(), i as c_int))
            })
            .collect()
    }

    /// The SQL text the statement was compiled from
    pub fn sql(&self) -> Option<&str> {
        unsafe {
            let ptr: *const c_char = ffi::sqlite3_sql(self.raw.as_ptr());
            if ptr.is_null() {
                None
            } else {
                CStr::from_ptr(ptr).to_str().ok()
            }
        }
    }

    /// Perform exactly one step, then reset
    ///
    /// Meant for statements without result rows. For a query, the first row
    /// is produced and discarded. Bindings survive the reset, so the
    /// statement can be rebound and executed again.
    pub fn exec(&mut self) -> Result<()> {
        let rc = unsafe { ffi::sqlite3_step(self.raw.as_ptr()) };
        let result = match rc {
            ffi::SQLITE_ROW | ffi::SQLITE_DONE => Ok(()),
            _ => Err(Error::Step(unsafe {
                Diagnostic::from_result(self.conn.handle(), rc)
            })),
        };
        self.reset();
        result
    }

    /// Return the statement to its pre-execution state
    ///
    /// Bound parameter values are kept.
    pub fn reset(&mut self) {
        unsafe {
            ffi::sqlite3_reset(self.raw.as_ptr());
        }
    }

    /// Reset the statement and start iterating its result rows
    ///
    /// The first step happens here: a query that fails at its first row
    /// returns [`Error::Step`], and a query with no rows yields a cursor that
    /// is already exhausted.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use sqlitekit::Connection;
    /// # let db = Connection::open_in_memory()?;
    /// let mut stmt = db.prepare("SELECT article, amount FROM store")?;
    /// let mut cursor = stmt.begin()?;
    /// while cursor.is_active() {
    ///     println!("{:?}: {}", cursor.column_text(0), cursor.column_int(1));
    ///     cursor.advance()?;
    /// }
    /// # Ok::<(), sqlitekit::Error>(())
    /// ```
    pub fn begin(&mut self) -> Result<Cursor<'_>> {
        self.reset();
        Cursor::new(self)
    }

    /// The exhausted cursor every finished iteration compares equal to
    pub fn end(&self) -> Cursor<'static> {
        Cursor::exhausted()
    }

    /// Step until the statement is done, then reset
    pub(crate) fn drain(&mut self) -> Result<()> {
        let result = loop {
            match unsafe { ffi::sqlite3_step(self.raw.as_ptr()) } {
                ffi::SQLITE_ROW => continue,
                ffi::SQLITE_DONE => break Ok(()),
                rc => {
                    break Err(Error::Step(unsafe {
                        Diagnostic::from_result(self.conn.handle(), rc)
                    }))
                }
            }
        };
        self.reset();
        result
    }

    pub(crate) fn raw(&self) -> NonNull<ffi::sqlite3_stmt> {
        self.raw
    }

    fn bind_param(&mut self, position: c_int, param: Param<'_>) -> Result<()> {
        let raw = self.raw.as_ptr();
        let rc = unsafe {
            match param {
                Param::Null => ffi::sqlite3_bind_null(raw, position),
                Param::Int(v) => ffi::sqlite3_bind_int(raw, position, v),
                Param::Int64(v) => ffi::sqlite3_bind_int64(raw, position, v),
                Param::Double(v) => ffi::sqlite3_bind_double(raw, position, v),
                Param::Text(s) => ffi::sqlite3_bind_text(
                    raw,
                    position,
                    s.as_ptr() as *const c_char,
                    length(s.len())?,
                    ffi::SQLITE_TRANSIENT(),
                ),
                Param::Blob(b) => ffi::sqlite3_bind_blob(
                    raw,
                    position,
                    b.as_ptr().cast(),
                    length(b.len())?,
                    ffi::SQLITE_TRANSIENT(),
                ),
            }
        };

        if rc != ffi::SQLITE_OK {
            return Err(Error::Bind(unsafe {
                Diagnostic::from_result(self.conn.handle(), rc)
            }));
        }

        log::trace!("bound {} to position {}", param.type_name(), position);
        Ok(())
    }
}

impl Drop for Statement<'_> {
    fn drop(&mut self) {
        log::trace!("statement finalize with handle {:p}", self.raw.as_ptr());
        unsafe {
            ffi::sqlite3_finalize(self.raw.as_ptr());
        }
    }
}

impl fmt::Debug for Statement<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Statement")
            .field("handle", &self.raw.as_ptr())
            .field("sql", &self.sql())
            .finish()
    }
}

/// Byte length as the `c_int` the bind API takes
fn length(len: usize) -> Result<c_int> {
    c_int::try_from(len).map_err(|_| {
        Error::Bind(Diagnostic::with_message(
            ffi::SQLITE_TOOBIG,
            "value is too large to bind",
        ))
    })
}
