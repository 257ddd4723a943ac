//! Connection adapter for SQL Anywhere style drivers.
//!
//! [`SqlAnywhereConnection`] wraps a blocking [`DriverClient`] and exposes the
//! execution primitives a query layer needs: eager [`select`], lazy
//! [`cursor`] iteration, [`affecting_statement`] for writes, default grammars
//! carrying the table prefix, and the reported server version. Every
//! primitive honors pretend mode, in which nothing reaches the driver.
//!
//! [`select`]: SqlAnywhereConnection::select
//! [`cursor`]: SqlAnywhereConnection::cursor
//! [`affecting_statement`]: SqlAnywhereConnection::affecting_statement
//!
//! ```rust,no_run
//! use sqlanywhere_middleware::prelude::*;
//! use sqlanywhere_middleware::sqlite::SqliteDriver;
//!
//! # fn demo() -> Result<(), SqlAnywhereDbError> {
//! let driver = SqliteDriver::open_in_memory()?;
//! driver.execute_batch("CREATE TABLE users (id INTEGER, name TEXT)")?;
//! let mut conn = SqlAnywhereConnection::new(driver, "main", "", SqlAnywhereOptions::new("main"));
//!
//! conn.affecting_statement(
//!     "INSERT INTO users (id, name) VALUES (?, ?)",
//!     vec![RowValues::Int(1), RowValues::Text("alice".into())],
//! )?;
//! let rows = conn.select(
//!     "SELECT name FROM users WHERE id = :id",
//!     Bindings::named([("id", RowValues::Int(1))]),
//!     true,
//! )?;
//! assert_eq!(rows.first().and_then(|r| r.get("name")), Some(&RowValues::Text("alice".into())));
//! # Ok(()) }
//! ```

pub mod bindings;
pub mod config;
pub mod connection;
pub mod driver;
pub mod error;
pub mod executor;
pub mod grammar;
pub mod prelude;
pub mod query;
pub mod results;
pub mod runner;
pub mod types;

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(feature = "test-utils")]
pub mod test_utils;

pub use config::{ReadOptions, SqlAnywhereOptions, SqlAnywhereOptionsBuilder};
pub use connection::{
    Cursor, DatabaseConnection, PretendScope, ServerVersion, SqlAnywhereConnection,
};
pub use driver::{ConnectionAttribute, DriverClient, DriverStatement};
pub use error::{QueryError, SqlAnywhereDbError};
pub use executor::{AsyncConnection, AsyncCursor};
pub use grammar::{Grammar, QueryGrammar, SchemaGrammar};
pub use query::QueryAndParams;
pub use results::{CustomDbRow, ResultSet};
pub use runner::{QueryContext, QueryExecuted, QueryListener, QueryLog, QueryRecorder, QueryRunner};
pub use types::{Bindings, RowValues};
