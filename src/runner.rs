//! The run wrapper every statement executes inside.
//!
//! [`QueryRunner`] is the seam where framework behavior plugs in: timing,
//! logging, event dispatch and error translation. [`QueryRecorder`] is the
//! stock implementation.

use std::fmt;
use std::time::{Duration, Instant};

use crate::error::{QueryError, SqlAnywhereDbError};
use crate::types::{Bindings, RowValues};

/// What the runner knows about the statement it is wrapping.
#[derive(Debug, Clone, Copy)]
pub struct QueryContext<'a> {
    pub connection_name: &'a str,
    pub query: &'a str,
    pub bindings: &'a Bindings,
}

impl<'a> QueryContext<'a> {
    #[must_use]
    pub fn new(connection_name: &'a str, query: &'a str, bindings: &'a Bindings) -> Self {
        Self {
            connection_name,
            query,
            bindings,
        }
    }
}

/// One entry of the query log.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryLog {
    pub query: String,
    pub bindings: Vec<RowValues>,
    pub time: Duration,
}

/// Event handed to listeners after a statement completes successfully.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryExecuted {
    pub connection_name: String,
    pub sql: String,
    pub bindings: Vec<RowValues>,
    pub time: Duration,
}

pub type QueryListener = Box<dyn Fn(&QueryExecuted) + Send + Sync>;

/// Wraps the execution of a single statement.
pub trait QueryRunner: Send {
    /// Run `callback` with the statement's query and bindings.
    ///
    /// The callback result is returned as-is on success. Implementations may
    /// rewrap failures but must not retry or swallow them.
    ///
    /// # Errors
    /// Returns the callback's error, possibly translated.
    fn run<T, F>(&mut self, ctx: QueryContext<'_>, callback: F) -> Result<T, SqlAnywhereDbError>
    where
        F: FnOnce(&str, &Bindings) -> Result<T, SqlAnywhereDbError>;
}

/// Times statements, keeps an optional query log, notifies listeners and
/// attaches SQL text to failures.
pub struct QueryRecorder {
    logging: bool,
    log: Vec<QueryLog>,
    listeners: Vec<QueryListener>,
    translate_errors: bool,
}

impl Default for QueryRecorder {
    fn default() -> Self {
        Self {
            logging: false,
            log: Vec::new(),
            listeners: Vec::new(),
            translate_errors: true,
        }
    }
}

impl fmt::Debug for QueryRecorder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryRecorder")
            .field("logging", &self.logging)
            .field("log", &self.log)
            .field("listeners", &self.listeners.len())
            .field("translate_errors", &self.translate_errors)
            .finish()
    }
}

impl QueryRecorder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_error_translation(mut self, enabled: bool) -> Self {
        self.translate_errors = enabled;
        self
    }

    #[must_use]
    pub fn with_logging(mut self, enabled: bool) -> Self {
        self.logging = enabled;
        self
    }

    pub fn enable_query_log(&mut self) {
        self.logging = true;
    }

    pub fn disable_query_log(&mut self) {
        self.logging = false;
    }

    #[must_use]
    pub fn logging_queries(&self) -> bool {
        self.logging
    }

    #[must_use]
    pub fn query_log(&self) -> &[QueryLog] {
        &self.log
    }

    pub fn flush_query_log(&mut self) {
        self.log.clear();
    }

    pub fn listen<F>(&mut self, listener: F)
    where
        F: Fn(&QueryExecuted) + Send + Sync + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    /// Swap in an empty log with logging forced on; returns the previous state.
    pub(crate) fn begin_fresh_log(&mut self) -> (bool, Vec<QueryLog>) {
        let previous = std::mem::take(&mut self.log);
        let was_logging = std::mem::replace(&mut self.logging, true);
        (was_logging, previous)
    }

    /// Restore state saved by `begin_fresh_log`, returning the entries logged since.
    pub(crate) fn end_fresh_log(
        &mut self,
        was_logging: bool,
        previous: Vec<QueryLog>,
    ) -> Vec<QueryLog> {
        self.logging = was_logging;
        std::mem::replace(&mut self.log, previous)
    }

    fn log_query(&mut self, ctx: &QueryContext<'_>, time: Duration) {
        let bindings = ctx.bindings.values();
        if !self.listeners.is_empty() {
            let event = QueryExecuted {
                connection_name: ctx.connection_name.to_string(),
                sql: ctx.query.to_string(),
                bindings: bindings.clone(),
                time,
            };
            for listener in &self.listeners {
                listener(&event);
            }
        }
        if self.logging {
            self.log.push(QueryLog {
                query: ctx.query.to_string(),
                bindings,
                time,
            });
        }
    }
}

impl QueryRunner for QueryRecorder {
    fn run<T, F>(&mut self, ctx: QueryContext<'_>, callback: F) -> Result<T, SqlAnywhereDbError>
    where
        F: FnOnce(&str, &Bindings) -> Result<T, SqlAnywhereDbError>,
    {
        let start = Instant::now();
        let result = callback(ctx.query, ctx.bindings);
        let elapsed = start.elapsed();

        match result {
            Ok(value) => {
                tracing::debug!(
                    connection = ctx.connection_name,
                    sql = ctx.query,
                    bindings = ctx.bindings.len(),
                    elapsed_ms = elapsed.as_secs_f64() * 1000.0,
                    "statement executed"
                );
                self.log_query(&ctx, elapsed);
                Ok(value)
            }
            Err(err) => {
                tracing::warn!(
                    connection = ctx.connection_name,
                    sql = ctx.query,
                    error = %err,
                    "statement failed"
                );
                if !self.translate_errors || matches!(err, SqlAnywhereDbError::Query(_)) {
                    return Err(err);
                }
                Err(SqlAnywhereDbError::Query(QueryError::new(
                    ctx.connection_name,
                    ctx.query,
                    ctx.bindings.values(),
                    err,
                )))
            }
        }
    }
}
