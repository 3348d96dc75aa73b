//! Database connection
//!
//! [`Connection`] owns exactly one native `sqlite3*` handle. The handle is
//! either open or null; it is released exactly once, by [`Connection::close`]
//! or when the value is dropped. Statements borrow the connection, so the
//! compiler rejects closing or reopening it while any statement is alive.

use crate::error::{Diagnostic, Error, Result};
use crate::options::OpenOptions;
use crate::statement::Statement;
use crate::transaction::{Transaction, TransactionMode};
use libsqlite3_sys as ffi;
use std::ffi::CString;
use std::fmt;
use std::os::raw::{c_char, c_int};
use std::path::Path;
use std::ptr::{self, NonNull};

/// An open (or closed) connection to a SQLite database
///
/// Move-only; not `Clone`.
///
/// # Examples
///
/// ```no_run
/// use sqlitekit::Connection;
///
/// # fn main() -> Result<(), sqlitekit::Error> {
/// let db = Connection::open("./store.db")?;
/// db.execute("CREATE TABLE IF NOT EXISTS store (article TEXT, amount INT)")?;
/// println!("last rowid: {}", db.last_insert_rowid());
/// # Ok(())
/// # }
/// ```
pub struct Connection {
    handle: *mut ffi::sqlite3,
}

impl Connection {
    /// A closed connection; call [`Connection::reopen`] to open it
    pub fn new() -> Self {
        Connection {
            handle: ptr::null_mut(),
        }
    }

    /// Open (creating if necessary) the database at `path`
    ///
    /// Fails with [`Error::Open`] if the engine cannot open the file.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use sqlitekit::Connection;
    ///
    /// let db = Connection::open("./mydb.sqlite")?;
    /// # Ok::<(), sqlitekit::Error>(())
    /// ```
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with(path, &OpenOptions::default())
    }

    /// Open the database at `path` with explicit options
    pub fn open_with<P: AsRef<Path>>(path: P, options: &OpenOptions) -> Result<Self> {
        let mut conn = Connection::new();
        conn.reopen_with(path, options)?;
        Ok(conn)
    }

    /// Open a private, temporary in-memory database
    pub fn open_in_memory() -> Result<Self> {
        Self::open(":memory:")
    }

    /// Close the current handle (if any) and open `path` in its place
    pub fn reopen<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        self.reopen_with(path, &OpenOptions::default())
    }

    /// Close the current handle (if any) and open `path` with `options`
    ///
    /// On failure the connection is left closed. A handle the engine
    /// allocated during the failed attempt is released before the error is
    /// returned.
    pub fn reopen_with<P: AsRef<Path>>(&mut self, path: P, options: &OpenOptions) -> Result<()> {
        self.close();

        let path = path.as_ref();
        let c_path = path_to_cstring(path)?;
        let mut handle: *mut ffi::sqlite3 = ptr::null_mut();

        let rc = unsafe {
            ffi::sqlite3_open_v2(c_path.as_ptr(), &mut handle, options.flags(), ptr::null())
        };

        if rc != ffi::SQLITE_OK {
            let diag = unsafe { Diagnostic::from_result(handle, rc) };
            unsafe {
                ffi::sqlite3_close(handle);
            }
            return Err(Error::Open(diag));
        }

        if let Some(millis) = options.busy_timeout_ms {
            let millis = c_int::try_from(millis).unwrap_or(c_int::MAX);
            unsafe {
                ffi::sqlite3_busy_timeout(handle, millis);
            }
        }

        log::trace!("database open with handle {:p} at {}", handle, path.display());
        self.handle = handle;
        Ok(())
    }

    /// Release the native handle
    ///
    /// Idempotent and infallible: a failure reported by the engine is logged
    /// and otherwise ignored.
    pub fn close(&mut self) {
        if self.handle.is_null() {
            return;
        }

        log::trace!("database close with handle {:p}", self.handle);
        let rc = unsafe { ffi::sqlite3_close_v2(self.handle) };
        if rc != ffi::SQLITE_OK {
            let diag = unsafe { Diagnostic::from_result(self.handle, rc) };
            log::warn!("Failed to close database handle: {}", diag);
        }
        self.handle = ptr::null_mut();
    }

    /// Whether the connection currently holds a native handle
    pub fn is_open(&self) -> bool {
        !self.handle.is_null()
    }

    /// Compile the first statement in `sql`
    ///
    /// Text after the first complete statement is ignored. Fails with
    /// [`Error::Prepare`] on a compile error, on SQL that contains no
    /// statement at all, or when the connection is closed.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use sqlitekit::Connection;
    /// # let db = Connection::open_in_memory()?;
    /// let mut stmt = db.prepare("INSERT INTO store (article, amount) VALUES (?, ?)")?;
    /// stmt.bind(1, "apple")?;
    /// stmt.bind(2, 125)?;
    /// stmt.exec()?;
    /// # Ok::<(), sqlitekit::Error>(())
    /// ```
    pub fn prepare(&self, sql: &str) -> Result<Statement<'_>> {
        let (stmt, tail) = self.prepare_first(sql)?;

        if !tail.trim().is_empty() {
            log::debug!("Ignoring SQL after the first statement: {}", tail.trim());
        }

        stmt.ok_or_else(|| {
            Error::Prepare(Diagnostic::with_message(
                ffi::SQLITE_MISUSE,
                "SQL text contains no statement",
            ))
        })
    }

    /// Prepare and execute a single statement, returning `changes()`
    ///
    /// Intended for INSERT/UPDATE/DELETE and DDL. A row produced by the
    /// statement is discarded.
    pub fn execute(&self, sql: &str) -> Result<i32> {
        self.prepare(sql)?.exec()?;
        Ok(self.changes())
    }

    /// Execute every statement in `sql`, in order, each run to completion
    ///
    /// Stops at the first failing statement; statements before it keep
    /// their effects.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use sqlitekit::Connection;
    /// # let db = Connection::open_in_memory()?;
    /// db.execute_batch(
    ///     "CREATE TABLE store (article TEXT, amount INT);
    ///      INSERT INTO store VALUES ('apple', 125);
    ///      INSERT INTO store VALUES ('banana', 70);",
    /// )?;
    /// # Ok::<(), sqlitekit::Error>(())
    /// ```
    pub fn execute_batch(&self, sql: &str) -> Result<()> {
        let mut rest = sql;

        while !rest.trim().is_empty() {
            let (stmt, tail) = self.prepare_first(rest)?;
            if let Some(mut stmt) = stmt {
                log::debug!("Executing batch statement: {}", stmt.sql().unwrap_or_default());
                stmt.drain()?;
            }
            if tail.len() == rest.len() {
                break;
            }
            rest = tail;
        }

        Ok(())
    }

    /// Rows modified by the most recent INSERT, UPDATE or DELETE
    ///
    /// Returns 0 on a closed connection.
    pub fn changes(&self) -> i32 {
        self.with_handle(0, |db| unsafe { ffi::sqlite3_changes(db) })
    }

    /// Rows modified since the connection was opened
    ///
    /// Returns 0 on a closed connection.
    pub fn total_changes(&self) -> i32 {
        self.with_handle(0, |db| unsafe { ffi::sqlite3_total_changes(db) })
    }

    /// Rowid of the most recent successful INSERT
    ///
    /// Returns 0 on a closed connection.
    pub fn last_insert_rowid(&self) -> i64 {
        self.with_handle(0, |db| unsafe { ffi::sqlite3_last_insert_rowid(db) })
    }

    /// Begin a transaction in the given locking mode
    ///
    /// `BEGIN <mode>` is executed immediately. The returned guard rolls the
    /// transaction back when dropped unless [`Transaction::commit`] was
    /// called.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use sqlitekit::{Connection, TransactionMode};
    /// # let db = Connection::open_in_memory()?;
    /// let mut tx = db.begin_transaction(TransactionMode::Immediate)?;
    /// tx.execute("INSERT INTO store VALUES ('cherry', 'fruit', 12)")?;
    /// tx.commit()?;
    /// # Ok::<(), sqlitekit::Error>(())
    /// ```
    pub fn begin_transaction(&self, mode: TransactionMode) -> Result<Transaction<'_>> {
        Transaction::begin(self, mode)
    }

    /// Begin a deferred transaction
    pub fn transaction(&self) -> Result<Transaction<'_>> {
        self.begin_transaction(TransactionMode::Deferred)
    }

    /// Exchange the native handles of two connections
    pub fn swap(&mut self, other: &mut Connection) {
        std::mem::swap(&mut self.handle, &mut other.handle);
    }

    pub(crate) fn handle(&self) -> *mut ffi::sqlite3 {
        self.handle
    }

    fn with_handle<T>(&self, closed: T, f: impl FnOnce(*mut ffi::sqlite3) -> T) -> T {
        if self.handle.is_null() {
            closed
        } else {
            f(self.handle)
        }
    }

    /// Compile the first statement of `sql` and return it with the unused tail
    ///
    /// The statement is `None` when `sql` holds only whitespace or comments.
    fn prepare_first<'s>(&self, sql: &'s str) -> Result<(Option<Statement<'_>>, &'s str)> {
        if self.handle.is_null() {
            return Err(Error::Prepare(Diagnostic::with_message(
                ffi::SQLITE_MISUSE,
                "database connection is closed",
            )));
        }

        let len = c_int::try_from(sql.len()).map_err(|_| {
            Error::Prepare(Diagnostic::with_message(
                ffi::SQLITE_TOOBIG,
                "SQL text is too long",
            ))
        })?;

        let mut raw: *mut ffi::sqlite3_stmt = ptr::null_mut();
        let mut tail: *const c_char = ptr::null();
        let rc = unsafe {
            ffi::sqlite3_prepare_v2(
                self.handle,
                sql.as_ptr() as *const c_char,
                len,
                &mut raw,
                &mut tail,
            )
        };

        if rc != ffi::SQLITE_OK {
            let diag = unsafe { Diagnostic::from_result(self.handle, rc) };
            if !raw.is_null() {
                unsafe {
                    ffi::sqlite3_finalize(raw);
                }
            }
            return Err(Error::Prepare(diag));
        }

        let consumed = if tail.is_null() {
            sql.len()
        } else {
            (tail as usize).saturating_sub(sql.as_ptr() as usize)
        };
        let rest = sql.get(consumed..).unwrap_or("");

        let stmt = NonNull::new(raw).map(|raw| Statement::new(self, raw));
        Ok((stmt, rest))
    }
}

impl Default for Connection {
    fn default() -> Self {
        Connection::new()
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        self.close();
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("handle", &self.handle)
            .field("open", &self.is_open())
            .finish()
    }
}

fn path_to_cstring(path: &Path) -> Result<CString> {
    let s = path
        .to_str()
        .ok_or_else(|| Error::InvalidPath(path.display().to_string()))?;
    CString::new(s).map_err(|_| Error::InvalidPath(path.display().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_connection_is_closed() {
        let mut conn = Connection::new();
        assert!(!conn.is_open());
        assert_eq!(conn.changes(), 0);
        assert_eq!(conn.last_insert_rowid(), 0);

        // close on a closed connection is a no-op
        conn.close();
        conn.close();
        assert!(!conn.is_open());
    }

    #[test]
    fn test_prepare_on_closed_connection() {
        let conn = Connection::new();
        let err = conn.prepare("SELECT 1").unwrap_err();
        assert!(matches!(err, Error::Prepare(_)));
        assert_eq!(err.code(), Some(ffi::SQLITE_MISUSE));
    }

    #[test]
    fn test_prepare_empty_sql() {
        let conn = Connection::open_in_memory().unwrap();
        assert!(matches!(conn.prepare("   "), Err(Error::Prepare(_))));
        assert!(matches!(conn.prepare("-- nothing"), Err(Error::Prepare(_))));
    }

    #[test]
    fn test_reopen_replaces_handle() {
        let mut conn = Connection::open_in_memory().unwrap();
        conn.execute("CREATE TABLE t (x INT)").unwrap();

        conn.reopen(":memory:").unwrap();
        assert!(conn.is_open());
        // fresh in-memory database: the table is gone
        assert!(conn.prepare("SELECT x FROM t").is_err());
    }

    #[test]
    fn test_swap() {
        let mut a = Connection::open_in_memory().unwrap();
        let mut b = Connection::new();
        a.swap(&mut b);
        assert!(!a.is_open());
        assert!(b.is_open());
    }

    #[test]
    fn test_path_with_nul_is_rejected() {
        let err = Connection::open("bad\0path").unwrap_err();
        assert!(matches!(err, Error::InvalidPath(_)));
    }
}
