use std::fmt;
use std::iter::FusedIterator;

use super::statement::StatementHandle;
use crate::driver::DriverStatement;
use crate::error::SqlAnywhereDbError;
use crate::results::CustomDbRow;

/// Lazy, forward-only view over an executed statement.
///
/// Each call to [`Iterator::next`] blocks on the driver's fetch. The
/// statement is released as soon as the rows run out, a fetch fails,
/// [`Cursor::close`] is called, or the cursor is dropped. After that every
/// pull returns `None`.
///
/// ```rust,no_run
/// # use sqlanywhere_middleware::prelude::*;
/// # fn demo<D: DriverClient>(
/// #     conn: &mut SqlAnywhereConnection<D>,
/// # ) -> Result<(), SqlAnywhereDbError> {
/// for row in conn.cursor("SELECT id FROM t", Bindings::none(), true)? {
///     let row = row?;
///     if row.get("id") == Some(&RowValues::Int(5)) {
///         break; // the statement is released when the cursor drops
///     }
/// }
/// # Ok(()) }
/// ```
pub struct Cursor<S: DriverStatement> {
    handle: Option<StatementHandle<S>>,
    fetched: usize,
}

impl<S: DriverStatement> Cursor<S> {
    pub(crate) fn new(handle: StatementHandle<S>) -> Self {
        Self {
            handle: Some(handle),
            fetched: 0,
        }
    }

    /// A cursor that yields nothing and holds no statement.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            handle: None,
            fetched: 0,
        }
    }

    /// Whether the underlying statement is still held.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.handle.as_ref().is_some_and(StatementHandle::is_open)
    }

    /// Rows pulled so far.
    #[must_use]
    pub fn fetched(&self) -> usize {
        self.fetched
    }

    /// Release the statement early. Further pulls yield `None`.
    pub fn close(&mut self) {
        if let Some(mut handle) = self.handle.take() {
            handle.release();
        }
    }

    /// Pull every remaining row.
    ///
    /// # Errors
    /// Returns the first fetch error; the statement is released either way.
    pub fn collect_rows(self) -> Result<Vec<CustomDbRow>, SqlAnywhereDbError> {
        self.collect()
    }
}

impl<S: DriverStatement> Iterator for Cursor<S> {
    type Item = Result<CustomDbRow, SqlAnywhereDbError>;

    fn next(&mut self) -> Option<Self::Item> {
        let handle = self.handle.as_mut()?;
        match handle.fetch_next() {
            Ok(Some(row)) => {
                self.fetched += 1;
                Some(Ok(row))
            }
            Ok(None) => {
                self.close();
                None
            }
            Err(err) => {
                self.close();
                Some(Err(err))
            }
        }
    }
}

impl<S: DriverStatement> FusedIterator for Cursor<S> {}

impl<S: DriverStatement> fmt::Debug for Cursor<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cursor")
            .field("open", &self.is_open())
            .field("fetched", &self.fetched)
            .finish()
    }
}
