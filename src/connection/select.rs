use super::statement::prepare_and_execute;
use super::{Cursor, SqlAnywhereConnection};
use crate::driver::DriverClient;
use crate::error::SqlAnywhereDbError;
use crate::query::QueryAndParams;
use crate::results::{CustomDbRow, ResultSet};
use crate::runner::{QueryContext, QueryRunner};
use crate::types::Bindings;

impl<D: DriverClient, R: QueryRunner> SqlAnywhereConnection<D, R> {
    /// Run a SELECT and materialize every row.
    ///
    /// Uses the read driver when `use_read_pdo` is set. Returns an empty set
    /// without touching a driver while pretending.
    ///
    /// # Errors
    /// Returns binding, preparation or driver errors, as shaped by the runner.
    pub fn select(
        &mut self,
        query: &str,
        bindings: impl Into<Bindings>,
        use_read_pdo: bool,
    ) -> Result<ResultSet, SqlAnywhereDbError> {
        let bindings = bindings.into();
        let Self {
            write,
            read,
            config,
            query_grammar,
            runner,
            pretending,
            ..
        } = self;
        let driver = if use_read_pdo {
            read.as_ref().unwrap_or(&*write)
        } else {
            &*write
        };
        let pretending = *pretending;

        runner.run(
            QueryContext::new(&config.name, query, &bindings),
            |query, bindings| {
                if pretending {
                    return Ok(ResultSet::default());
                }
                let mut statement = prepare_and_execute(driver, query_grammar, query, bindings)?;
                statement.fetch_all()
            },
        )
    }

    /// Run a SELECT and return the first row, if any.
    ///
    /// # Errors
    /// Same as [`SqlAnywhereConnection::select`].
    pub fn select_one(
        &mut self,
        query: &str,
        bindings: impl Into<Bindings>,
        use_read_pdo: bool,
    ) -> Result<Option<CustomDbRow>, SqlAnywhereDbError> {
        let rows = self.select(query, bindings, use_read_pdo)?;
        Ok(rows.into_iter().next())
    }

    /// [`SqlAnywhereConnection::select`] for a bundled request.
    ///
    /// # Errors
    /// Same as [`SqlAnywhereConnection::select`].
    pub fn select_query(
        &mut self,
        request: &QueryAndParams,
        use_read_pdo: bool,
    ) -> Result<ResultSet, SqlAnywhereDbError> {
        self.select(&request.query, &request.params, use_read_pdo)
    }

    /// Run a SELECT and return a cursor that pulls rows one at a time.
    ///
    /// The statement stays open until the cursor is exhausted, closed, or
    /// dropped. While pretending the cursor is empty and no driver is touched.
    ///
    /// # Errors
    /// Returns binding, preparation or execution errors. Fetch errors are
    /// yielded by the cursor itself.
    pub fn cursor(
        &mut self,
        query: &str,
        bindings: impl Into<Bindings>,
        use_read_pdo: bool,
    ) -> Result<Cursor<D::Statement>, SqlAnywhereDbError> {
        let bindings = bindings.into();
        let Self {
            write,
            read,
            config,
            query_grammar,
            runner,
            pretending,
            ..
        } = self;
        let driver = if use_read_pdo {
            read.as_ref().unwrap_or(&*write)
        } else {
            &*write
        };
        let pretending = *pretending;

        runner.run(
            QueryContext::new(&config.name, query, &bindings),
            |query, bindings| {
                if pretending {
                    return Ok(Cursor::empty());
                }
                let statement = prepare_and_execute(driver, query_grammar, query, bindings)?;
                Ok(Cursor::new(statement))
            },
        )
    }
}
