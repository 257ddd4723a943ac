use std::ops::{Deref, DerefMut};

use super::SqlAnywhereConnection;
use crate::driver::DriverClient;
use crate::runner::{QueryExecuted, QueryLog, QueryRecorder};

/// Pretend mode scoped to a borrow of the connection.
///
/// While the scope lives the connection pretends and logs every statement it
/// would have run. Dropping the scope restores the previous pretend flag and
/// query log, on unwinding as well.
pub struct PretendScope<'a, D: DriverClient> {
    conn: &'a mut SqlAnywhereConnection<D, QueryRecorder>,
    was_pretending: bool,
    saved: Option<(bool, Vec<QueryLog>)>,
}

impl<'a, D: DriverClient> PretendScope<'a, D> {
    fn enter(conn: &'a mut SqlAnywhereConnection<D, QueryRecorder>) -> Self {
        let was_pretending = conn.pretending;
        let saved = conn.runner.begin_fresh_log();
        conn.pretending = true;
        Self {
            conn,
            was_pretending,
            saved: Some(saved),
        }
    }

    /// Leave pretend mode and return the statements that would have run.
    #[must_use]
    pub fn finish(mut self) -> Vec<QueryLog> {
        self.restore()
    }

    fn restore(&mut self) -> Vec<QueryLog> {
        self.conn.pretending = self.was_pretending;
        match self.saved.take() {
            Some((was_logging, previous)) => self.conn.runner.end_fresh_log(was_logging, previous),
            None => Vec::new(),
        }
    }
}

impl<D: DriverClient> Deref for PretendScope<'_, D> {
    type Target = SqlAnywhereConnection<D, QueryRecorder>;

    fn deref(&self) -> &Self::Target {
        self.conn
    }
}

impl<D: DriverClient> DerefMut for PretendScope<'_, D> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.conn
    }
}

impl<D: DriverClient> Drop for PretendScope<'_, D> {
    fn drop(&mut self) {
        if self.saved.is_some() {
            self.restore();
        }
    }
}

impl<D: DriverClient> SqlAnywhereConnection<D, QueryRecorder> {
    /// Run `callback` in pretend mode and return the statements it would have executed.
    ///
    /// ```rust,no_run
    /// # use sqlanywhere_middleware::prelude::*;
    /// # fn demo<D: DriverClient>(conn: &mut SqlAnywhereConnection<D>) {
    /// let queries = conn.pretend(|conn| {
    ///     let _ = conn.affecting_statement("DELETE FROM t WHERE id = ?", vec![RowValues::Int(5)]);
    /// });
    /// assert_eq!(queries[0].query, "DELETE FROM t WHERE id = ?");
    /// # }
    /// ```
    pub fn pretend<F>(&mut self, callback: F) -> Vec<QueryLog>
    where
        F: FnOnce(&mut Self),
    {
        let mut scope = PretendScope::enter(self);
        callback(&mut *scope);
        scope.finish()
    }

    /// Enter pretend mode until the returned scope is finished or dropped.
    pub fn pretend_scope(&mut self) -> PretendScope<'_, D> {
        PretendScope::enter(self)
    }

    pub fn enable_query_log(&mut self) {
        self.runner.enable_query_log();
    }

    pub fn disable_query_log(&mut self) {
        self.runner.disable_query_log();
    }

    #[must_use]
    pub fn logging_queries(&self) -> bool {
        self.runner.logging_queries()
    }

    #[must_use]
    pub fn query_log(&self) -> &[QueryLog] {
        self.runner.query_log()
    }

    pub fn flush_query_log(&mut self) {
        self.runner.flush_query_log();
    }

    /// Register a listener called after every successful statement.
    pub fn listen<F>(&mut self, listener: F)
    where
        F: Fn(&QueryExecuted) + Send + Sync + 'static,
    {
        self.runner.listen(listener);
    }
}
