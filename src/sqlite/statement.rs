use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use rusqlite::{Connection, params_from_iter};

use super::lock_connection;
use super::params::Params;
use super::query::extract_row;
use super::worker::{CursorWorker, Frame};
use crate::driver::DriverStatement;
use crate::error::SqlAnywhereDbError;
use crate::results::{CustomDbRow, ResultSet, index_columns};
use crate::types::RowValues;

enum State {
    Idle,
    /// A statement without result columns ran to completion.
    Executed,
    Streaming {
        worker: CursorWorker,
        columns: Arc<Vec<String>>,
        cache: Arc<HashMap<String, usize>>,
    },
    /// A writing statement with result columns (`RETURNING`) ran to completion.
    Buffered {
        rows: VecDeque<Vec<RowValues>>,
        columns: Arc<Vec<String>>,
        cache: Arc<HashMap<String, usize>>,
    },
    Closed,
}

/// A prepared `SQLite` statement.
///
/// Read-only statements that return columns stream their rows from a worker
/// thread holding the connection until the rows run out or the statement is
/// closed. Writing statements run to completion on the calling thread, so the
/// affected count is the one `SQLite` reports, `RETURNING` rows included.
pub struct SqliteStatement {
    conn: Arc<Mutex<Connection>>,
    sql: String,
    column_count: usize,
    readonly: bool,
    affected: usize,
    state: State,
}

impl SqliteStatement {
    pub(super) fn new(
        conn: Arc<Mutex<Connection>>,
        sql: String,
        column_count: usize,
        readonly: bool,
    ) -> Self {
        Self {
            conn,
            sql,
            column_count,
            readonly,
            affected: 0,
            state: State::Idle,
        }
    }

    #[must_use]
    pub fn sql(&self) -> &str {
        &self.sql
    }

    #[must_use]
    pub fn column_count(&self) -> usize {
        self.column_count
    }

    #[must_use]
    pub fn readonly(&self) -> bool {
        self.readonly
    }

    fn stop_worker(&mut self) {
        if let State::Streaming { worker, .. } = std::mem::replace(&mut self.state, State::Closed)
        {
            worker.shutdown();
        }
    }

    /// Run a writing statement to completion, keeping any rows it returns.
    fn execute_inline(&mut self, params: &Params) -> Result<(), SqlAnywhereDbError> {
        let conn = lock_connection(&self.conn)?;
        let mut stmt = conn.prepare_cached(&self.sql)?;
        if self.column_count == 0 {
            stmt.execute(params_from_iter(params.as_values()))?;
            drop(stmt);
            self.affected = usize::try_from(conn.changes()).unwrap_or(usize::MAX);
            self.state = State::Executed;
            return Ok(());
        }

        let columns: Arc<Vec<String>> = Arc::new(
            stmt.column_names()
                .into_iter()
                .map(str::to_string)
                .collect(),
        );
        let width = columns.len();
        let mut buffered = VecDeque::new();
        let mut rows = stmt.query(params_from_iter(params.as_values()))?;
        while let Some(row) = rows.next()? {
            buffered.push_back(extract_row(row, width)?);
        }
        drop(rows);
        drop(stmt);
        self.affected = usize::try_from(conn.changes()).unwrap_or(usize::MAX);
        let cache = Arc::new(index_columns(&columns));
        self.state = State::Buffered {
            rows: buffered,
            columns,
            cache,
        };
        Ok(())
    }
}

impl DriverStatement for SqliteStatement {
    fn execute(&mut self, values: &[RowValues]) -> Result<(), SqlAnywhereDbError> {
        self.stop_worker();
        let params = Params::convert(values);

        if self.column_count == 0 || !self.readonly {
            return self.execute_inline(&params);
        }

        let worker = CursorWorker::spawn(
            Arc::clone(&self.conn),
            self.sql.clone(),
            params.into_values(),
        )?;
        let first = worker.frames.recv();
        match first {
            Ok(Frame::Ready(columns)) => {
                let cache = Arc::new(index_columns(&columns));
                self.affected = 0;
                self.state = State::Streaming {
                    worker,
                    columns,
                    cache,
                };
                Ok(())
            }
            Ok(Frame::Failed(err)) => {
                worker.shutdown();
                Err(err)
            }
            Ok(Frame::Row(_) | Frame::Done) | Err(_) => {
                worker.shutdown();
                Err(SqlAnywhereDbError::ExecutionError(
                    "SQLite cursor thread exited before executing".into(),
                ))
            }
        }
    }

    fn fetch_all(&mut self) -> Result<ResultSet, SqlAnywhereDbError> {
        let mut result_set = ResultSet::with_capacity(10);
        if let State::Streaming { columns, .. } | State::Buffered { columns, .. } = &self.state {
            result_set.set_column_names(Arc::clone(columns));
        }
        while let Some(row) = self.fetch_next()? {
            result_set.add_row(row);
        }
        Ok(result_set)
    }

    fn fetch_next(&mut self) -> Result<Option<CustomDbRow>, SqlAnywhereDbError> {
        if let State::Buffered {
            rows,
            columns,
            cache,
        } = &mut self.state
        {
            let Some(values) = rows.pop_front() else {
                self.state = State::Closed;
                return Ok(None);
            };
            return Ok(Some(CustomDbRow::with_cache(
                Arc::clone(columns),
                Arc::clone(cache),
                values,
            )));
        }

        let State::Streaming {
            worker,
            columns,
            cache,
        } = &self.state
        else {
            return Ok(None);
        };

        let frame = worker.frames.recv();
        match frame {
            Ok(Frame::Row(values)) => {
                self.affected += 1;
                Ok(Some(CustomDbRow::with_cache(
                    Arc::clone(columns),
                    Arc::clone(cache),
                    values,
                )))
            }
            Ok(Frame::Done) => {
                self.stop_worker();
                Ok(None)
            }
            Ok(Frame::Failed(err)) => {
                self.stop_worker();
                Err(err)
            }
            Ok(Frame::Ready(_)) | Err(_) => {
                self.stop_worker();
                Err(SqlAnywhereDbError::ExecutionError(
                    "SQLite cursor thread exited mid-stream".into(),
                ))
            }
        }
    }

    /// Rows changed by a writing statement, or rows fetched so far for a query.
    fn affected_rows(&self) -> usize {
        self.affected
    }

    fn close(&mut self) {
        self.stop_worker();
    }
}

impl Drop for SqliteStatement {
    fn drop(&mut self) {
        self.stop_worker();
    }
}
