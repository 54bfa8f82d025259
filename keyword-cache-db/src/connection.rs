// SPDX-FileCopyrightText: 2025 Jörg Thalheim
// SPDX-License-Identifier: MIT

//! Database connection management.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use rusqlite::{Connection, OpenFlags};
use tracing::debug;

use crate::error::{Result, StorageError};
use crate::schema::SCHEMA_SQL;

/// How long a statement waits on a lock held by another process.
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(30);

/// SQLite-backed keyword cache.
///
/// The single connection sits behind a mutex, so a `KeywordDb` can be
/// shared between threads, but operations run one at a time.
pub struct KeywordDb {
    conn: Mutex<Option<Connection>>,
    path: Option<PathBuf>,
}

impl KeywordDb {
    /// Open or create a cache database at `path`.
    ///
    /// Creates the schema if the file does not have it yet.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_timeout(path, DEFAULT_BUSY_TIMEOUT)
    }

    /// Open or create a cache database with an explicit busy timeout.
    pub fn open_with_timeout<P: AsRef<Path>>(path: P, busy_timeout: Duration) -> Result<Self> {
        let path = path.as_ref();
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE;
        let conn = Connection::open_with_flags(path, flags)
            .and_then(|conn| {
                conn.busy_timeout(busy_timeout)?;
                Ok(conn)
            })
            .map_err(|e| StorageError::DatabaseOpen {
                path: path.to_owned(),
                source: e,
            })?;

        let db = Self {
            conn: Mutex::new(Some(conn)),
            path: Some(path.to_owned()),
        };
        db.configure_pragmas()?;
        db.create_schema()?;

        debug!(
            "Opened keyword cache at {} (busy timeout {:?})",
            path.display(),
            busy_timeout
        );
        Ok(db)
    }

    /// Create an in-memory database (for testing).
    ///
    /// The database is initialized with the full schema.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self {
            conn: Mutex::new(Some(conn)),
            path: None,
        };
        db.configure_pragmas()?;
        db.create_schema()?;
        debug!("Created in-memory keyword cache");
        Ok(db)
    }

    /// Location of the database file, `None` for in-memory databases.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn configure_pragmas(&self) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute_batch("PRAGMA foreign_keys = ON;")?;
            Ok(())
        })
    }

    /// Create the database schema if it is missing.
    pub fn create_schema(&self) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute_batch(SCHEMA_SQL)?;
            Ok(())
        })?;
        debug!("Ensured keyword cache schema");
        Ok(())
    }

    /// Check if both cache tables exist.
    pub fn has_schema(&self) -> Result<bool> {
        self.with_conn(|conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name IN ('libraries', 'keywords')",
                [],
                |row| row.get(0),
            )?;
            Ok(count == 2)
        })
    }

    /// Release the connection.
    ///
    /// Every later call, including another `close`, fails with
    /// [`StorageError::Closed`].
    pub fn close(&self) -> Result<()> {
        let conn = self.lock()?.take().ok_or(StorageError::Closed)?;
        conn.close().map_err(|(_, e)| StorageError::Sqlite(e))?;
        debug!("Closed keyword cache");
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Option<Connection>>> {
        self.conn.lock().map_err(|_| StorageError::LockPoisoned)
    }

    /// Run `f` against the open connection.
    pub(crate) fn with_conn<T>(&self, f: impl FnOnce(&Connection) -> Result<T>) -> Result<T> {
        let guard = self.lock()?;
        let conn = guard.as_ref().ok_or(StorageError::Closed)?;
        f(conn)
    }

    /// Run `f` with mutable access, needed for transactions.
    pub(crate) fn with_conn_mut<T>(
        &self,
        f: impl FnOnce(&mut Connection) -> Result<T>,
    ) -> Result<T> {
        let mut guard = self.lock()?;
        let conn = guard.as_mut().ok_or(StorageError::Closed)?;
        f(conn)
    }
}
