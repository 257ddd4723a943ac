use super::SqlAnywhereConnection;
use super::statement::prepare_and_execute;
use crate::driver::DriverClient;
use crate::error::SqlAnywhereDbError;
use crate::query::QueryAndParams;
use crate::runner::{QueryContext, QueryRunner};
use crate::types::Bindings;

impl<D: DriverClient, R: QueryRunner> SqlAnywhereConnection<D, R> {
    /// Run a statement on the write driver and return the affected-row count.
    ///
    /// No rows are fetched. Returns `0` without touching a driver while pretending.
    ///
    /// # Errors
    /// Returns binding, preparation or driver errors, as shaped by the runner.
    pub fn affecting_statement(
        &mut self,
        query: &str,
        bindings: impl Into<Bindings>,
    ) -> Result<usize, SqlAnywhereDbError> {
        let bindings = bindings.into();
        let Self {
            write,
            config,
            query_grammar,
            runner,
            pretending,
            records_modified,
            ..
        } = self;
        let pretending = *pretending;

        runner.run(
            QueryContext::new(&config.name, query, &bindings),
            |query, bindings| {
                if pretending {
                    return Ok(0);
                }
                let statement = prepare_and_execute(&*write, query_grammar, query, bindings)?;
                let affected = statement.affected_rows();
                if affected > 0 {
                    *records_modified = true;
                }
                Ok(affected)
            },
        )
    }

    /// [`SqlAnywhereConnection::affecting_statement`] for a bundled request.
    ///
    /// # Errors
    /// Same as [`SqlAnywhereConnection::affecting_statement`].
    pub fn affecting_query(
        &mut self,
        request: &QueryAndParams,
    ) -> Result<usize, SqlAnywhereDbError> {
        self.affecting_statement(&request.query, &request.params)
    }

    /// Run a statement on the write driver and report success.
    ///
    /// Returns `true` without touching a driver while pretending.
    ///
    /// # Errors
    /// Returns binding, preparation or driver errors, as shaped by the runner.
    pub fn statement(
        &mut self,
        query: &str,
        bindings: impl Into<Bindings>,
    ) -> Result<bool, SqlAnywhereDbError> {
        let bindings = bindings.into();
        let Self {
            write,
            config,
            query_grammar,
            runner,
            pretending,
            records_modified,
            ..
        } = self;
        let pretending = *pretending;

        runner.run(
            QueryContext::new(&config.name, query, &bindings),
            |query, bindings| {
                if pretending {
                    return Ok(true);
                }
                prepare_and_execute(&*write, query_grammar, query, bindings)?;
                *records_modified = true;
                Ok(true)
            },
        )
    }

    /// # Errors
    /// Same as [`SqlAnywhereConnection::statement`].
    pub fn insert(
        &mut self,
        query: &str,
        bindings: impl Into<Bindings>,
    ) -> Result<bool, SqlAnywhereDbError> {
        self.statement(query, bindings)
    }

    /// # Errors
    /// Same as [`SqlAnywhereConnection::affecting_statement`].
    pub fn update(
        &mut self,
        query: &str,
        bindings: impl Into<Bindings>,
    ) -> Result<usize, SqlAnywhereDbError> {
        self.affecting_statement(query, bindings)
    }

    /// # Errors
    /// Same as [`SqlAnywhereConnection::affecting_statement`].
    pub fn delete(
        &mut self,
        query: &str,
        bindings: impl Into<Bindings>,
    ) -> Result<usize, SqlAnywhereDbError> {
        self.affecting_statement(query, bindings)
    }
}
