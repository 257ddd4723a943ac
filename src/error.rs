use thiserror::Error;

use crate::types::RowValues;

#[derive(Debug, Error)]
pub enum SqlAnywhereDbError {
    #[cfg(feature = "sqlite")]
    #[error(transparent)]
    SqliteError(#[from] rusqlite::Error),

    #[error(transparent)]
    Query(#[from] QueryError),

    #[error("Preparation error: {0}")]
    Preparation(String),

    #[error("Binding error: {0}")]
    Binding(String),

    #[error("Driver error: {0}")]
    Driver(String),

    #[error("Connection busy: {0}")]
    ConnectionBusy(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("SQL execution error: {0}")]
    ExecutionError(String),

    #[error("Other database error: {0}")]
    Other(String),
}

impl SqlAnywhereDbError {
    /// Strip any `Query` wrappers added by the run wrapper and return the underlying error.
    #[must_use]
    pub fn root(&self) -> &SqlAnywhereDbError {
        let mut current = self;
        while let SqlAnywhereDbError::Query(inner) = current {
            current = inner.source.as_ref();
        }
        current
    }

    #[must_use]
    pub fn is_binding_error(&self) -> bool {
        matches!(self.root(), SqlAnywhereDbError::Binding(_))
    }

    #[must_use]
    pub fn is_preparation_error(&self) -> bool {
        matches!(self.root(), SqlAnywhereDbError::Preparation(_))
    }
}

/// A failed statement together with the SQL text and bindings it ran with.
#[derive(Debug, Error)]
#[error("{source} (SQL: {sql})")]
pub struct QueryError {
    pub connection_name: String,
    pub sql: String,
    pub bindings: Vec<RowValues>,
    pub source: Box<SqlAnywhereDbError>,
}

impl QueryError {
    #[must_use]
    pub fn new(
        connection_name: impl Into<String>,
        sql: impl Into<String>,
        bindings: Vec<RowValues>,
        source: SqlAnywhereDbError,
    ) -> Self {
        Self {
            connection_name: connection_name.into(),
            sql: sql.into(),
            bindings,
            source: Box::new(source),
        }
    }
}

impl From<serde_json::Error> for SqlAnywhereDbError {
    fn from(err: serde_json::Error) -> Self {
        SqlAnywhereDbError::ConfigError(format!("invalid connection options: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_unwraps_nested_query_errors() {
        let inner = SqlAnywhereDbError::Binding("expected 1 binding, got 0".into());
        let wrapped = SqlAnywhereDbError::Query(QueryError::new(
            "sqlanywhere",
            "SELECT ?",
            vec![],
            inner,
        ));
        assert!(wrapped.is_binding_error());
        assert!(!wrapped.is_preparation_error());
        assert!(matches!(wrapped.root(), SqlAnywhereDbError::Binding(_)));
    }

    #[test]
    fn query_error_display_includes_sql() {
        let err = QueryError::new(
            "sqlanywhere",
            "DELETE FROM t",
            vec![],
            SqlAnywhereDbError::Driver("lost connection".into()),
        );
        assert_eq!(
            err.to_string(),
            "Driver error: lost connection (SQL: DELETE FROM t)"
        );
    }
}
