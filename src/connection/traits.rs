use super::{Cursor, SqlAnywhereConnection};
use crate::driver::DriverClient;
use crate::error::SqlAnywhereDbError;
use crate::grammar::{QueryGrammar, SchemaGrammar};
use crate::results::ResultSet;
use crate::runner::QueryRunner;
use crate::types::Bindings;

/// The execution surface a framework layer calls into.
///
/// Implemented by [`SqlAnywhereConnection`]; lets callers stay generic over the
/// driver and run wrapper.
pub trait DatabaseConnection {
    type Statement: crate::driver::DriverStatement;

    /// # Errors
    /// Returns binding, preparation or driver errors.
    fn select(
        &mut self,
        query: &str,
        bindings: Bindings,
        use_read_pdo: bool,
    ) -> Result<ResultSet, SqlAnywhereDbError>;

    /// # Errors
    /// Returns binding, preparation or execution errors.
    fn cursor(
        &mut self,
        query: &str,
        bindings: Bindings,
        use_read_pdo: bool,
    ) -> Result<Cursor<Self::Statement>, SqlAnywhereDbError>;

    /// # Errors
    /// Returns binding, preparation or driver errors.
    fn affecting_statement(
        &mut self,
        query: &str,
        bindings: Bindings,
    ) -> Result<usize, SqlAnywhereDbError>;

    fn default_query_grammar(&self) -> QueryGrammar;

    fn default_schema_grammar(&self) -> SchemaGrammar;

    fn server_version(&self) -> String;

    fn pretending(&self) -> bool;
}

impl<D: DriverClient, R: QueryRunner> DatabaseConnection for SqlAnywhereConnection<D, R> {
    type Statement = D::Statement;

    fn select(
        &mut self,
        query: &str,
        bindings: Bindings,
        use_read_pdo: bool,
    ) -> Result<ResultSet, SqlAnywhereDbError> {
        SqlAnywhereConnection::select(self, query, bindings, use_read_pdo)
    }

    fn cursor(
        &mut self,
        query: &str,
        bindings: Bindings,
        use_read_pdo: bool,
    ) -> Result<Cursor<Self::Statement>, SqlAnywhereDbError> {
        SqlAnywhereConnection::cursor(self, query, bindings, use_read_pdo)
    }

    fn affecting_statement(
        &mut self,
        query: &str,
        bindings: Bindings,
    ) -> Result<usize, SqlAnywhereDbError> {
        SqlAnywhereConnection::affecting_statement(self, query, bindings)
    }

    fn default_query_grammar(&self) -> QueryGrammar {
        SqlAnywhereConnection::default_query_grammar(self)
    }

    fn default_schema_grammar(&self) -> SchemaGrammar {
        SqlAnywhereConnection::default_schema_grammar(self)
    }

    fn server_version(&self) -> String {
        SqlAnywhereConnection::server_version(self)
    }

    fn pretending(&self) -> bool {
        SqlAnywhereConnection::pretending(self)
    }
}
