//! The connection adapter.
//!
//! `SqlAnywhereConnection` owns a write driver, an optional read driver, the
//! grammars, and a [`QueryRunner`]. Every execution primitive goes through the
//! runner and short-circuits before touching a driver while pretending.

mod cursor;
mod dml;
mod pretend;
mod select;
mod statement;
mod traits;
mod version;

pub use cursor::Cursor;
pub use pretend::PretendScope;
pub use traits::DatabaseConnection;
pub use version::ServerVersion;

use std::fmt;

use crate::config::SqlAnywhereOptions;
use crate::driver::DriverClient;
use crate::grammar::{Grammar, QueryGrammar, SchemaGrammar};
use crate::runner::{QueryRecorder, QueryRunner};
use crate::types::{Bindings, RowValues};

/// Connection adapter over a SQL Anywhere style driver.
pub struct SqlAnywhereConnection<D: DriverClient, R: QueryRunner = QueryRecorder> {
    write: D,
    read: Option<D>,
    database: String,
    table_prefix: String,
    config: SqlAnywhereOptions,
    query_grammar: QueryGrammar,
    schema_grammar: SchemaGrammar,
    runner: R,
    pretending: bool,
    records_modified: bool,
}

impl<D: DriverClient> SqlAnywhereConnection<D, QueryRecorder> {
    /// Create a connection with the stock [`QueryRecorder`] run wrapper.
    ///
    /// `database` and `table_prefix` take precedence over the matching fields of `config`.
    pub fn new(
        driver: D,
        database: impl Into<String>,
        table_prefix: impl Into<String>,
        config: SqlAnywhereOptions,
    ) -> Self {
        let runner = QueryRecorder::new()
            .with_logging(config.log_queries)
            .with_error_translation(config.translate_errors);
        Self::with_runner(driver, database, table_prefix, config, runner)
    }

    /// Create a connection taking database name and prefix from `config`.
    pub fn from_options(driver: D, config: SqlAnywhereOptions) -> Self {
        let database = config.database.clone();
        let prefix = config.prefix.clone();
        Self::new(driver, database, prefix, config)
    }
}

impl<D: DriverClient, R: QueryRunner> SqlAnywhereConnection<D, R> {
    /// Create a connection with a caller-supplied run wrapper.
    pub fn with_runner(
        driver: D,
        database: impl Into<String>,
        table_prefix: impl Into<String>,
        config: SqlAnywhereOptions,
        runner: R,
    ) -> Self {
        let database = database.into();
        let table_prefix = table_prefix.into();
        let mut config = config;
        config.database.clone_from(&database);
        config.prefix.clone_from(&table_prefix);

        let mut conn = Self {
            write: driver,
            read: None,
            database,
            table_prefix,
            config,
            query_grammar: QueryGrammar::default(),
            schema_grammar: SchemaGrammar::default(),
            runner,
            pretending: false,
            records_modified: false,
        };
        conn.use_default_query_grammar();
        conn.use_default_schema_grammar();
        conn
    }

    /// Route reads with `use_read_pdo = true` to a separate driver.
    #[must_use]
    pub fn with_read_driver(mut self, read: D) -> Self {
        self.read = Some(read);
        self
    }

    pub fn set_read_driver(&mut self, read: Option<D>) {
        self.read = read;
    }

    /// Drop the read driver; reads go to the write driver afterwards.
    pub fn without_read_driver(&mut self) -> Option<D> {
        self.read.take()
    }

    #[must_use]
    pub fn write_driver(&self) -> &D {
        &self.write
    }

    /// The read driver, falling back to the write driver when none is configured.
    #[must_use]
    pub fn read_driver(&self) -> &D {
        self.read.as_ref().unwrap_or(&self.write)
    }

    #[must_use]
    pub fn has_read_driver(&self) -> bool {
        self.read.is_some()
    }

    /// Connection name used in logs and query events.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.config.name
    }

    #[must_use]
    pub fn database_name(&self) -> &str {
        &self.database
    }

    #[must_use]
    pub fn table_prefix(&self) -> &str {
        &self.table_prefix
    }

    #[must_use]
    pub fn config(&self) -> &SqlAnywhereOptions {
        &self.config
    }

    /// Change the table prefix and re-apply it to both grammars.
    pub fn set_table_prefix(&mut self, prefix: impl Into<String>) {
        self.table_prefix = prefix.into();
        self.config.prefix.clone_from(&self.table_prefix);
        self.query_grammar.set_table_prefix(&self.table_prefix);
        self.schema_grammar.set_table_prefix(&self.table_prefix);
    }

    /// A fresh query grammar carrying this connection's prefix.
    #[must_use]
    pub fn default_query_grammar(&self) -> QueryGrammar {
        QueryGrammar::new(self.table_prefix.clone())
    }

    /// A fresh schema grammar carrying this connection's prefix.
    #[must_use]
    pub fn default_schema_grammar(&self) -> SchemaGrammar {
        SchemaGrammar::new(self.table_prefix.clone())
    }

    pub fn use_default_query_grammar(&mut self) {
        self.query_grammar = self.default_query_grammar();
    }

    pub fn use_default_schema_grammar(&mut self) {
        self.schema_grammar = self.default_schema_grammar();
    }

    #[must_use]
    pub fn query_grammar(&self) -> &QueryGrammar {
        &self.query_grammar
    }

    /// Replace the query grammar, e.g. to change the date format. The prefix is re-applied.
    pub fn set_query_grammar(&mut self, mut grammar: QueryGrammar) {
        grammar.set_table_prefix(&self.table_prefix);
        self.query_grammar = grammar;
    }

    #[must_use]
    pub fn schema_grammar(&self) -> &SchemaGrammar {
        &self.schema_grammar
    }

    /// Normalize bindings the way they will be handed to the driver.
    #[must_use]
    pub fn prepare_bindings(&self, bindings: &Bindings) -> Vec<RowValues> {
        crate::bindings::prepare_bindings(bindings.values(), self.query_grammar.date_format())
    }

    #[must_use]
    pub fn pretending(&self) -> bool {
        self.pretending
    }

    /// Enter or leave pretend mode. Prefer [`SqlAnywhereConnection::pretend`] for scoped use.
    pub fn set_pretending(&mut self, pretending: bool) {
        self.pretending = pretending;
    }

    /// Whether any statement on this connection reported modified rows.
    #[must_use]
    pub fn has_modified_records(&self) -> bool {
        self.records_modified
    }

    pub fn forget_record_modification_state(&mut self) {
        self.records_modified = false;
    }

    #[must_use]
    pub fn runner(&self) -> &R {
        &self.runner
    }

    pub fn runner_mut(&mut self) -> &mut R {
        &mut self.runner
    }
}

impl<D: DriverClient, R: QueryRunner> fmt::Debug for SqlAnywhereConnection<D, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqlAnywhereConnection")
            .field("name", &self.config.name)
            .field("database", &self.database)
            .field("table_prefix", &self.table_prefix)
            .field("has_read_driver", &self.read.is_some())
            .field("pretending", &self.pretending)
            .finish_non_exhaustive()
    }
}
