//! The driver client contract consumed by the connection adapter.
//!
//! A driver owns a live database session and hands out prepared statements.
//! Every call is blocking. Implementations never retry on their own; failures
//! are returned to the adapter unchanged.

use crate::error::SqlAnywhereDbError;
use crate::results::{CustomDbRow, ResultSet};
use crate::types::RowValues;

/// Connection-level attributes a driver may report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionAttribute {
    ServerVersion,
    ClientVersion,
    DriverName,
    ConnectionStatus,
}

/// A live database session able to prepare statements.
pub trait DriverClient: Send {
    type Statement: DriverStatement;

    /// Compile `sql` into a statement bound to this session.
    ///
    /// # Errors
    /// Returns `SqlAnywhereDbError::Preparation` for malformed SQL, or a driver error
    /// if the session cannot accept a new statement.
    fn prepare(&self, sql: &str) -> Result<Self::Statement, SqlAnywhereDbError>;

    /// Read a connection attribute; `None` when the driver cannot report it.
    fn attribute(&self, attribute: ConnectionAttribute) -> Option<String>;
}

/// A prepared statement. Owned by exactly one caller at a time.
pub trait DriverStatement: Send {
    /// Bind `values` positionally and execute once.
    ///
    /// # Errors
    /// Returns the driver's execution error.
    fn execute(&mut self, values: &[RowValues]) -> Result<(), SqlAnywhereDbError>;

    /// Fetch every remaining row.
    ///
    /// # Errors
    /// Returns the driver's fetch error.
    fn fetch_all(&mut self) -> Result<ResultSet, SqlAnywhereDbError>;

    /// Fetch the next row, `None` once the result set is exhausted.
    ///
    /// Fetching past exhaustion keeps returning `Ok(None)`.
    ///
    /// # Errors
    /// Returns the driver's fetch error.
    fn fetch_next(&mut self) -> Result<Option<CustomDbRow>, SqlAnywhereDbError>;

    /// Rows affected by the last execution.
    fn affected_rows(&self) -> usize;

    /// Release driver-side resources. Must be idempotent.
    fn close(&mut self) {}
}
