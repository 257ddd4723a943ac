use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::driver::{ConnectionAttribute, DriverClient, DriverStatement};
use crate::error::SqlAnywhereDbError;
use crate::results::{CustomDbRow, ResultSet};
use crate::types::RowValues;

/// One interaction a [`RecordingDriver`] observed.
#[derive(Debug, Clone, PartialEq)]
pub enum DriverCall {
    Prepare(String),
    Execute(Vec<RowValues>),
    FetchAll,
    FetchNext,
    Close,
    Attribute(ConnectionAttribute),
}

#[derive(Debug, Default)]
struct Script {
    calls: Vec<DriverCall>,
    columns: Vec<String>,
    rows: Vec<Vec<RowValues>>,
    affected_rows: usize,
    server_version: Option<String>,
    fail_prepare: Option<String>,
    fail_execute: Option<String>,
    fail_fetch_at: Option<usize>,
    open_statements: usize,
}

/// Scripted in-memory driver that records every call made to it.
///
/// Clones share the script and the call log, so a test can keep one clone
/// to inspect after handing the other to a connection. Statements it hands
/// out are only released through `close`; dropping one without closing
/// leaves it counted in [`RecordingDriver::open_statements`].
#[derive(Debug, Clone, Default)]
pub struct RecordingDriver {
    script: Arc<Mutex<Script>>,
}

impl RecordingDriver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn script(&self) -> MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Rows every executed statement will produce.
    #[must_use]
    pub fn with_rows(self, columns: &[&str], rows: Vec<Vec<RowValues>>) -> Self {
        {
            let mut script = self.script();
            script.columns = columns.iter().map(|c| (*c).to_string()).collect();
            script.rows = rows;
        }
        self
    }

    #[must_use]
    pub fn with_affected_rows(self, affected_rows: usize) -> Self {
        self.script().affected_rows = affected_rows;
        self
    }

    #[must_use]
    pub fn with_server_version(self, version: impl Into<String>) -> Self {
        self.script().server_version = Some(version.into());
        self
    }

    /// Make every `prepare` fail with a preparation error.
    #[must_use]
    pub fn failing_prepare(self, message: impl Into<String>) -> Self {
        self.script().fail_prepare = Some(message.into());
        self
    }

    /// Make every `execute` fail with a driver error.
    #[must_use]
    pub fn failing_execute(self, message: impl Into<String>) -> Self {
        self.script().fail_execute = Some(message.into());
        self
    }

    /// Make the fetch of the zero-based row `index` fail.
    #[must_use]
    pub fn failing_fetch_at(self, index: usize) -> Self {
        self.script().fail_fetch_at = Some(index);
        self
    }

    #[must_use]
    pub fn calls(&self) -> Vec<DriverCall> {
        self.script().calls.clone()
    }

    /// Number of recorded calls matching `predicate`.
    pub fn count<F>(&self, predicate: F) -> usize
    where
        F: Fn(&DriverCall) -> bool,
    {
        self.script().calls.iter().filter(|call| predicate(call)).count()
    }

    #[must_use]
    pub fn prepare_count(&self) -> usize {
        self.count(|call| matches!(call, DriverCall::Prepare(_)))
    }

    #[must_use]
    pub fn execute_count(&self) -> usize {
        self.count(|call| matches!(call, DriverCall::Execute(_)))
    }

    #[must_use]
    pub fn fetch_all_count(&self) -> usize {
        self.count(|call| matches!(call, DriverCall::FetchAll))
    }

    #[must_use]
    pub fn fetch_next_count(&self) -> usize {
        self.count(|call| matches!(call, DriverCall::FetchNext))
    }

    #[must_use]
    pub fn close_count(&self) -> usize {
        self.count(|call| matches!(call, DriverCall::Close))
    }

    /// Whether anything other than attribute reads reached the driver.
    #[must_use]
    pub fn touched(&self) -> bool {
        self.count(|call| !matches!(call, DriverCall::Attribute(_))) > 0
    }

    /// Statements prepared but not yet closed.
    #[must_use]
    pub fn open_statements(&self) -> usize {
        self.script().open_statements
    }

    #[must_use]
    pub fn prepared_sql(&self) -> Vec<String> {
        self.script()
            .calls
            .iter()
            .filter_map(|call| match call {
                DriverCall::Prepare(sql) => Some(sql.clone()),
                _ => None,
            })
            .collect()
    }

    /// Bindings handed to each `execute`, in order.
    #[must_use]
    pub fn executed_bindings(&self) -> Vec<Vec<RowValues>> {
        self.script()
            .calls
            .iter()
            .filter_map(|call| match call {
                DriverCall::Execute(values) => Some(values.clone()),
                _ => None,
            })
            .collect()
    }
}

impl DriverClient for RecordingDriver {
    type Statement = RecordingStatement;

    fn prepare(&self, sql: &str) -> Result<Self::Statement, SqlAnywhereDbError> {
        let mut script = self.script();
        script.calls.push(DriverCall::Prepare(sql.to_string()));
        if let Some(message) = &script.fail_prepare {
            return Err(SqlAnywhereDbError::Preparation(message.clone()));
        }
        script.open_statements += 1;
        Ok(RecordingStatement {
            script: Arc::clone(&self.script),
            rows: Vec::new(),
            position: 0,
            closed: false,
        })
    }

    fn attribute(&self, attribute: ConnectionAttribute) -> Option<String> {
        let mut script = self.script();
        script.calls.push(DriverCall::Attribute(attribute));
        match attribute {
            ConnectionAttribute::ServerVersion => script.server_version.clone(),
            ConnectionAttribute::DriverName => Some("recording".to_string()),
            ConnectionAttribute::ClientVersion | ConnectionAttribute::ConnectionStatus => None,
        }
    }
}

/// Statement handed out by [`RecordingDriver`].
#[derive(Debug)]
pub struct RecordingStatement {
    script: Arc<Mutex<Script>>,
    rows: Vec<Vec<RowValues>>,
    position: usize,
    closed: bool,
}

impl RecordingStatement {
    fn script(&self) -> MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn columns(&self) -> Arc<Vec<String>> {
        Arc::new(self.script().columns.clone())
    }
}

impl DriverStatement for RecordingStatement {
    fn execute(&mut self, values: &[RowValues]) -> Result<(), SqlAnywhereDbError> {
        let rows = {
            let mut script = self.script();
            script.calls.push(DriverCall::Execute(values.to_vec()));
            if let Some(message) = &script.fail_execute {
                return Err(SqlAnywhereDbError::Driver(message.clone()));
            }
            script.rows.clone()
        };
        self.rows = rows;
        self.position = 0;
        Ok(())
    }

    fn fetch_all(&mut self) -> Result<ResultSet, SqlAnywhereDbError> {
        self.script().calls.push(DriverCall::FetchAll);
        let mut result_set = ResultSet::with_capacity(self.rows.len());
        result_set.set_column_names(self.columns());
        for values in self.rows.drain(self.position..) {
            result_set.add_row_values(values);
        }
        Ok(result_set)
    }

    fn fetch_next(&mut self) -> Result<Option<CustomDbRow>, SqlAnywhereDbError> {
        let fail_at = {
            let mut script = self.script();
            script.calls.push(DriverCall::FetchNext);
            script.fail_fetch_at
        };
        if fail_at == Some(self.position) {
            return Err(SqlAnywhereDbError::Driver(format!(
                "fetch of row {} failed",
                self.position
            )));
        }
        let Some(values) = self.rows.get(self.position).cloned() else {
            return Ok(None);
        };
        self.position += 1;
        Ok(Some(CustomDbRow::new(self.columns(), values)))
    }

    fn affected_rows(&self) -> usize {
        self.script().affected_rows
    }

    fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        let mut script = self.script();
        script.calls.push(DriverCall::Close);
        script.open_statements = script.open_statements.saturating_sub(1);
    }
}
