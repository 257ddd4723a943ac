//! `SQLite` backed driver.
//!
//! Implements the driver contract over rusqlite so the adapter can run
//! against a real engine in development and tests. A connection serves one
//! statement at a time: while a cursor is streaming rows, preparing another
//! statement on the same driver returns `SqlAnywhereDbError::ConnectionBusy`.

mod params;
mod query;
mod statement;
mod worker;

pub use params::{Params, row_value_to_sqlite_value};
pub use query::{extract_row, sqlite_extract_value_sync};
pub use statement::SqliteStatement;

use std::fmt;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, TryLockError};

use rusqlite::Connection;

use crate::driver::{ConnectionAttribute, DriverClient};
use crate::error::SqlAnywhereDbError;

/// A rusqlite connection exposed through the driver contract.
///
/// Cloning shares the underlying connection.
#[derive(Clone)]
pub struct SqliteDriver {
    conn: Arc<Mutex<Connection>>,
    location: String,
}

impl SqliteDriver {
    /// Open (or create) a database file in WAL mode.
    ///
    /// # Errors
    /// Returns `SqlAnywhereDbError::SqliteError` if the file cannot be opened.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SqlAnywhereDbError> {
        let path = path.as_ref();
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode = WAL;")?;
        tracing::debug!(path = %path.display(), "opened SQLite database");
        Ok(Self::from_connection(conn, path.display().to_string()))
    }

    /// Open a private in-memory database.
    ///
    /// # Errors
    /// Returns `SqlAnywhereDbError::SqliteError` if `SQLite` cannot allocate the database.
    pub fn open_in_memory() -> Result<Self, SqlAnywhereDbError> {
        Ok(Self::from_connection(Connection::open_in_memory()?, ":memory:"))
    }

    #[must_use]
    pub fn from_connection(conn: Connection, location: impl Into<String>) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
            location: location.into(),
        }
    }

    /// Where this database lives: a file path or `:memory:`.
    #[must_use]
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Run one or more statements without bindings, e.g. schema setup.
    ///
    /// # Errors
    /// Returns `ConnectionBusy` while a cursor is open, or the `SQLite` error.
    pub fn execute_batch(&self, sql: &str) -> Result<(), SqlAnywhereDbError> {
        let conn = lock_connection(&self.conn)?;
        conn.execute_batch(sql)?;
        Ok(())
    }

    /// Whether a statement currently holds the connection.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        matches!(self.conn.try_lock(), Err(TryLockError::WouldBlock))
    }
}

impl fmt::Debug for SqliteDriver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteDriver")
            .field("location", &self.location)
            .field("busy", &self.is_busy())
            .finish()
    }
}

impl DriverClient for SqliteDriver {
    type Statement = SqliteStatement;

    fn prepare(&self, sql: &str) -> Result<Self::Statement, SqlAnywhereDbError> {
        let conn = lock_connection(&self.conn)?;
        let stmt = conn
            .prepare_cached(sql)
            .map_err(|err| SqlAnywhereDbError::Preparation(err.to_string()))?;
        let (column_count, readonly) = (stmt.column_count(), stmt.readonly());
        drop(stmt);
        drop(conn);
        Ok(SqliteStatement::new(
            Arc::clone(&self.conn),
            sql.to_string(),
            column_count,
            readonly,
        ))
    }

    fn attribute(&self, attribute: ConnectionAttribute) -> Option<String> {
        match attribute {
            ConnectionAttribute::ServerVersion => Some(rusqlite::version().to_string()),
            ConnectionAttribute::ClientVersion => Some(env!("CARGO_PKG_VERSION").to_string()),
            ConnectionAttribute::DriverName => Some("sqlite".to_string()),
            ConnectionAttribute::ConnectionStatus => Some(
                if self.is_busy() { "busy" } else { "idle" }.to_string(),
            ),
        }
    }
}

/// Take the connection lock without waiting.
pub(crate) fn lock_connection(
    conn: &Mutex<Connection>,
) -> Result<MutexGuard<'_, Connection>, SqlAnywhereDbError> {
    conn.try_lock().map_err(|err| match err {
        TryLockError::WouldBlock => SqlAnywhereDbError::ConnectionBusy(
            "SQLite connection is held by an open cursor".into(),
        ),
        TryLockError::Poisoned(_) => {
            SqlAnywhereDbError::ConnectionError("SQLite connection mutex poisoned".into())
        }
    })
}
