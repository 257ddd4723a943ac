//! Convenient imports for common functionality.
//!
//! This module re-exports the most commonly used types
//! to make it easier to get started with the library.

pub use crate::config::SqlAnywhereOptions;
pub use crate::connection::{Cursor, DatabaseConnection, SqlAnywhereConnection};
pub use crate::driver::{ConnectionAttribute, DriverClient, DriverStatement};
pub use crate::error::SqlAnywhereDbError;
pub use crate::executor::{AsyncConnection, AsyncCursor};
pub use crate::grammar::{Grammar, QueryGrammar, SchemaGrammar};
pub use crate::query::QueryAndParams;
pub use crate::results::{CustomDbRow, ResultSet};
pub use crate::runner::{QueryLog, QueryRecorder, QueryRunner};
pub use crate::types::{Bindings, RowValues};
