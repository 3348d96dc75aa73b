//! Transaction scopes
//!
//! Follows the rusqlite pattern:
//! - Transactions automatically roll back when dropped (unless committed)
//! - RAII ensures no forgotten rollbacks, including on `?` early returns
//! - Explicit `commit()` required to persist changes

use crate::connection::Connection;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::ops::Deref;

/// Locking mode used by `BEGIN`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TransactionMode {
    /// No lock until the first read or write
    #[default]
    Deferred,
    /// Write lock taken immediately; readers may continue
    Immediate,
    /// Exclusive lock taken immediately; other connections cannot read
    Exclusive,
}

impl TransactionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionMode::Deferred => "DEFERRED",
            TransactionMode::Immediate => "IMMEDIATE",
            TransactionMode::Exclusive => "EXCLUSIVE",
        }
    }

    /// The statement that opens a transaction in this mode
    pub fn begin_sql(&self) -> &'static str {
        match self {
            TransactionMode::Deferred => "BEGIN DEFERRED",
            TransactionMode::Immediate => "BEGIN IMMEDIATE",
            TransactionMode::Exclusive => "BEGIN EXCLUSIVE",
        }
    }
}

impl std::fmt::Display for TransactionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for TransactionMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "DEFERRED" => Ok(TransactionMode::Deferred),
            "IMMEDIATE" => Ok(TransactionMode::Immediate),
            "EXCLUSIVE" => Ok(TransactionMode::Exclusive),
            _ => Err(format!("Unknown transaction mode: {}", s)),
        }
    }
}

/// Behavior when a transaction is dropped without `commit()`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DropBehavior {
    /// Roll the transaction back (default)
    #[default]
    Rollback,
    /// Commit the transaction
    Commit,
    /// Panic, unless the thread is already panicking
    Panic,
    /// Do nothing; the transaction stays open on the connection
    Ignore,
}

/// An open transaction on a [`Connection`]
///
/// Created by [`Connection::begin_transaction`] or [`Connection::transaction`],
/// which issue `BEGIN` before returning. The guard derefs to the connection,
/// so statements are prepared through it directly.
///
/// # Examples
///
/// ```no_run
/// # use sqlitekit::{Connection, TransactionMode};
/// # let db = Connection::open("store.db")?;
/// {
///     let mut tx = db.begin_transaction(TransactionMode::Immediate)?;
///     tx.execute("INSERT INTO store VALUES ('cherry', 'fruit', 30)")?;
///     tx.commit()?; // persisted
/// }
///
/// {
///     let tx = db.transaction()?;
///     tx.execute("DELETE FROM store")?;
///     // dropped here without commit: rolled back
/// }
/// # Ok::<(), sqlitekit::Error>(())
/// ```
pub struct Transaction<'conn> {
    conn: &'conn Connection,
    mode: TransactionMode,
    committed: bool,
    drop_behavior: DropBehavior,
}

impl<'conn> Transaction<'conn> {
    pub(crate) fn begin(conn: &'conn Connection, mode: TransactionMode) -> Result<Self> {
        conn.prepare(mode.begin_sql())?.exec()?;
        log::debug!("transaction started ({})", mode);

        Ok(Transaction {
            conn,
            mode,
            committed: false,
            drop_behavior: DropBehavior::default(),
        })
    }

    /// Issue `COMMIT`
    ///
    /// Call at most once. A second call finds no open transaction and
    /// returns the engine's error as [`Error::Step`](crate::Error::Step).
    pub fn commit(&mut self) -> Result<()> {
        self.conn.prepare("COMMIT")?.exec()?;
        self.committed = true;
        log::debug!("transaction committed");
        Ok(())
    }

    /// Issue `ROLLBACK`
    ///
    /// The committed flag is left untouched, so the drop behavior still runs
    /// when the guard goes out of scope; its failure is only logged.
    pub fn rollback(&self) -> Result<()> {
        self.conn.prepare("ROLLBACK")?.exec()?;
        log::debug!("transaction rolled back");
        Ok(())
    }

    pub fn set_drop_behavior(&mut self, behavior: DropBehavior) {
        self.drop_behavior = behavior;
    }

    pub fn drop_behavior(&self) -> DropBehavior {
        self.drop_behavior
    }

    pub fn mode(&self) -> TransactionMode {
        self.mode
    }

    pub fn is_committed(&self) -> bool {
        self.committed
    }
}

impl Deref for Transaction<'_> {
    type Target = Connection;

    fn deref(&self) -> &Connection {
        self.conn
    }
}

impl Drop for Transaction<'_> {
    fn drop(&mut self) {
        if self.committed {
            return;
        }

        match self.drop_behavior {
            DropBehavior::Rollback => {
                if let Err(e) = self.rollback() {
                    log::warn!("Failed to rollback transaction on drop: {}", e);
                }
            }
            DropBehavior::Commit => {
                if let Err(e) = self.commit() {
                    log::warn!("Failed to commit transaction on drop: {}", e);
                }
            }
            DropBehavior::Panic => {
                if !std::thread::panicking() {
                    panic!("Transaction dropped without explicit commit");
                }
            }
            DropBehavior::Ignore => {}
        }
    }
}

impl std::fmt::Debug for Transaction<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transaction")
            .field("mode", &self.mode)
            .field("committed", &self.committed)
            .field("drop_behavior", &self.drop_behavior)
            .finish()
    }
}
