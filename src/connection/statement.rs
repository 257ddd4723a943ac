use crate::bindings::{prepare_bindings, resolve};
use crate::driver::{DriverClient, DriverStatement};
use crate::error::SqlAnywhereDbError;
use crate::grammar::QueryGrammar;
use crate::results::{CustomDbRow, ResultSet};
use crate::types::{Bindings, RowValues};

/// Owns a driver statement and closes it when dropped.
pub(crate) struct StatementHandle<S: DriverStatement> {
    inner: Option<S>,
}

impl<S: DriverStatement> StatementHandle<S> {
    pub(crate) fn new(statement: S) -> Self {
        Self {
            inner: Some(statement),
        }
    }

    fn statement(&mut self) -> Result<&mut S, SqlAnywhereDbError> {
        self.inner
            .as_mut()
            .ok_or_else(|| SqlAnywhereDbError::ExecutionError("statement already released".into()))
    }

    pub(crate) fn execute(&mut self, values: &[RowValues]) -> Result<(), SqlAnywhereDbError> {
        self.statement()?.execute(values)
    }

    pub(crate) fn fetch_all(&mut self) -> Result<ResultSet, SqlAnywhereDbError> {
        self.statement()?.fetch_all()
    }

    /// `Ok(None)` once released, so pulls past exhaustion stay idempotent.
    pub(crate) fn fetch_next(&mut self) -> Result<Option<CustomDbRow>, SqlAnywhereDbError> {
        match self.inner.as_mut() {
            Some(statement) => statement.fetch_next(),
            None => Ok(None),
        }
    }

    pub(crate) fn affected_rows(&self) -> usize {
        self.inner.as_ref().map_or(0, DriverStatement::affected_rows)
    }

    pub(crate) fn is_open(&self) -> bool {
        self.inner.is_some()
    }

    pub(crate) fn release(&mut self) {
        if let Some(mut statement) = self.inner.take() {
            statement.close();
            tracing::trace!("statement handle released");
        }
    }
}

impl<S: DriverStatement> Drop for StatementHandle<S> {
    fn drop(&mut self) {
        self.release();
    }
}

/// Resolve and normalize bindings, prepare on `driver`, bind, and execute once.
///
/// Binding problems surface before the driver sees the statement.
pub(crate) fn prepare_and_execute<D: DriverClient>(
    driver: &D,
    grammar: &QueryGrammar,
    query: &str,
    bindings: &Bindings,
) -> Result<StatementHandle<D::Statement>, SqlAnywhereDbError> {
    let (sql, values) = resolve(query, bindings)?;
    let values = prepare_bindings(values, grammar.date_format());
    let mut handle = StatementHandle::new(driver.prepare(&sql)?);
    handle.execute(&values)?;
    Ok(handle)
}
