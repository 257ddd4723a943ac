//! Async facade over the blocking adapter.
//!
//! Driver calls block, so every operation runs on tokio's blocking pool while
//! holding the connection behind a `tokio::sync::Mutex`.

use std::fmt;
use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tokio::task::spawn_blocking;

use crate::connection::{Cursor, SqlAnywhereConnection};
use crate::driver::DriverClient;
use crate::error::SqlAnywhereDbError;
use crate::results::{CustomDbRow, ResultSet};
use crate::runner::{QueryRecorder, QueryRunner};
use crate::types::Bindings;

/// Shareable async handle to a [`SqlAnywhereConnection`].
///
/// ```rust,no_run
/// # use sqlanywhere_middleware::prelude::*;
/// # async fn demo<D: DriverClient + 'static>(
/// #     conn: SqlAnywhereConnection<D>,
/// # ) -> Result<(), SqlAnywhereDbError> {
/// let conn = AsyncConnection::new(conn);
/// let mut cursor = conn.cursor("SELECT id FROM t", Bindings::none(), true).await?;
/// while let Some(row) = cursor.next_row().await {
///     println!("{:?}", row?.get("id"));
/// }
/// # Ok(()) }
/// ```
pub struct AsyncConnection<D: DriverClient, R: QueryRunner = QueryRecorder> {
    inner: Arc<Mutex<SqlAnywhereConnection<D, R>>>,
}

impl<D: DriverClient, R: QueryRunner> Clone for AsyncConnection<D, R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<D: DriverClient, R: QueryRunner> fmt::Debug for AsyncConnection<D, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncConnection").finish_non_exhaustive()
    }
}

impl<D, R> AsyncConnection<D, R>
where
    D: DriverClient + 'static,
    R: QueryRunner + 'static,
{
    #[must_use]
    pub fn new(conn: SqlAnywhereConnection<D, R>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(conn)),
        }
    }

    /// The shared connection, for callers that need direct access.
    #[must_use]
    pub fn shared(&self) -> Arc<Mutex<SqlAnywhereConnection<D, R>>> {
        Arc::clone(&self.inner)
    }

    /// Run `func` against the connection on the blocking pool.
    ///
    /// # Errors
    /// Returns `func`'s error, or `ExecutionError` if the blocking task panicked.
    pub async fn with_connection<F, T>(&self, func: F) -> Result<T, SqlAnywhereDbError>
    where
        F: FnOnce(&mut SqlAnywhereConnection<D, R>) -> Result<T, SqlAnywhereDbError>
            + Send
            + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.inner);
        spawn_blocking(move || {
            let mut guard = conn.blocking_lock();
            func(&mut guard)
        })
        .await
        .map_err(|e| SqlAnywhereDbError::ExecutionError(format!("blocking task failed: {e}")))?
    }

    /// # Errors
    /// Same as [`SqlAnywhereConnection::select`].
    pub async fn select(
        &self,
        query: impl Into<String>,
        bindings: impl Into<Bindings>,
        use_read_pdo: bool,
    ) -> Result<ResultSet, SqlAnywhereDbError> {
        let query = query.into();
        let bindings = bindings.into();
        self.with_connection(move |conn| conn.select(&query, bindings, use_read_pdo))
            .await
    }

    /// Open a cursor that keeps the connection locked until it is exhausted,
    /// closed or dropped.
    ///
    /// Other calls on this connection wait while the cursor is open, so a task
    /// holding the cursor must not await them.
    ///
    /// # Errors
    /// Same as [`SqlAnywhereConnection::cursor`].
    pub async fn cursor(
        &self,
        query: impl Into<String>,
        bindings: impl Into<Bindings>,
        use_read_pdo: bool,
    ) -> Result<AsyncCursor<D, R>, SqlAnywhereDbError> {
        let query = query.into();
        let bindings = bindings.into();
        let mut guard = Arc::clone(&self.inner).lock_owned().await;
        let (guard, opened) = spawn_blocking(move || {
            let opened = guard.cursor(&query, bindings, use_read_pdo);
            (guard, opened)
        })
        .await
        .map_err(|e| SqlAnywhereDbError::ExecutionError(format!("blocking task failed: {e}")))?;
        Ok(AsyncCursor::new(opened?, guard))
    }

    /// # Errors
    /// Same as [`SqlAnywhereConnection::affecting_statement`].
    pub async fn affecting_statement(
        &self,
        query: impl Into<String>,
        bindings: impl Into<Bindings>,
    ) -> Result<usize, SqlAnywhereDbError> {
        let query = query.into();
        let bindings = bindings.into();
        self.with_connection(move |conn| conn.affecting_statement(&query, bindings))
            .await
    }

    /// # Errors
    /// Same as [`SqlAnywhereConnection::statement`].
    pub async fn statement(
        &self,
        query: impl Into<String>,
        bindings: impl Into<Bindings>,
    ) -> Result<bool, SqlAnywhereDbError> {
        let query = query.into();
        let bindings = bindings.into();
        self.with_connection(move |conn| conn.statement(&query, bindings))
            .await
    }

    /// # Errors
    /// Returns `ExecutionError` if the blocking task panicked.
    pub async fn server_version(&self) -> Result<String, SqlAnywhereDbError> {
        self.with_connection(|conn| Ok(conn.server_version())).await
    }

    pub async fn set_pretending(&self, pretending: bool) {
        self.inner.lock().await.set_pretending(pretending);
    }

    pub async fn pretending(&self) -> bool {
        self.inner.lock().await.pretending()
    }
}

/// A [`Cursor`] whose fetches run on the blocking pool.
///
/// The cursor owns the connection lock while its statement is open. The lock
/// is given back once the statement is released: on exhaustion, `close()`, or
/// drop. Dropping it inside a runtime releases the statement and the lock on
/// the blocking pool, and a later call on the connection queues behind that
/// release. Outside a runtime both are released inline.
pub struct AsyncCursor<D, R = QueryRecorder>
where
    D: DriverClient + 'static,
    R: QueryRunner + 'static,
{
    cursor: Option<Cursor<D::Statement>>,
    guard: Option<OwnedMutexGuard<SqlAnywhereConnection<D, R>>>,
}

impl<D, R> AsyncCursor<D, R>
where
    D: DriverClient + 'static,
    R: QueryRunner + 'static,
{
    fn new(
        cursor: Cursor<D::Statement>,
        guard: OwnedMutexGuard<SqlAnywhereConnection<D, R>>,
    ) -> Self {
        let guard = cursor.is_open().then_some(guard);
        Self {
            cursor: Some(cursor),
            guard,
        }
    }

    /// Pull the next row; `None` once the cursor is exhausted or closed.
    pub async fn next_row(&mut self) -> Option<Result<CustomDbRow, SqlAnywhereDbError>> {
        let mut cursor = self.cursor.take()?;
        let item = match spawn_blocking(move || {
            let item = cursor.next();
            (cursor, item)
        })
        .await
        {
            Ok((cursor, item)) => {
                self.cursor = Some(cursor);
                item
            }
            Err(e) => Some(Err(SqlAnywhereDbError::ExecutionError(format!(
                "blocking task failed: {e}"
            )))),
        };
        if !self.is_open() {
            self.guard = None;
        }
        item
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.cursor.as_ref().is_some_and(Cursor::is_open)
    }

    /// Release the statement and the connection now.
    pub async fn close(&mut self) {
        let guard = self.guard.take();
        if let Some(mut cursor) = self.cursor.take()
            && let Err(err) = spawn_blocking(move || {
                cursor.close();
                drop(guard);
            })
            .await
        {
            tracing::error!(error = %err, "releasing async cursor failed");
        }
    }

    /// Pull every remaining row.
    ///
    /// # Errors
    /// Returns the first fetch error; the statement is released either way.
    pub async fn collect_rows(mut self) -> Result<Vec<CustomDbRow>, SqlAnywhereDbError> {
        let mut rows = Vec::new();
        while let Some(row) = self.next_row().await {
            rows.push(row?);
        }
        Ok(rows)
    }
}

impl<D, R> fmt::Debug for AsyncCursor<D, R>
where
    D: DriverClient + 'static,
    R: QueryRunner + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncCursor")
            .field("open", &self.is_open())
            .field("holds_connection", &self.guard.is_some())
            .finish()
    }
}

impl<D, R> Drop for AsyncCursor<D, R>
where
    D: DriverClient + 'static,
    R: QueryRunner + 'static,
{
    fn drop(&mut self) {
        let cursor = self.cursor.take();
        let guard = self.guard.take();
        if cursor.as_ref().is_some_and(Cursor::is_open)
            && let Ok(handle) = Handle::try_current()
        {
            handle.spawn_blocking(move || {
                drop(cursor);
                drop(guard);
            });
        }
    }
}
