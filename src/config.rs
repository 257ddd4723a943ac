use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::SqlAnywhereDbError;

/// Default TCP port of a SQL Anywhere network server.
pub const DEFAULT_PORT: u16 = 2638;

/// Host override for the read side of a read/write split.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadOptions {
    pub host: String,
    #[serde(default)]
    pub port: Option<u16>,
}

/// Options for a SQL Anywhere connection.
///
/// Deserializes from the same shape an application config file would carry:
/// ```rust
/// use sqlanywhere_middleware::config::SqlAnywhereOptions;
///
/// let opts = SqlAnywhereOptions::from_json(r#"{
///     "host": "db.internal",
///     "database": "demo",
///     "username": "dba",
///     "password": "sql",
///     "prefix": "app_"
/// }"#)?;
/// assert_eq!(opts.port, 2638);
/// # Ok::<(), sqlanywhere_middleware::SqlAnywhereDbError>(())
/// ```
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SqlAnywhereOptions {
    /// Connection name reported in logs and query events.
    pub name: String,
    pub host: String,
    pub port: u16,
    /// SQL Anywhere server name (`ServerName=`), if different from the host.
    pub server: Option<String>,
    pub database: String,
    pub username: String,
    pub password: String,
    pub charset: String,
    /// Table-name prefix applied by the grammars.
    pub prefix: String,
    pub read: Option<ReadOptions>,
    /// Start with the query log enabled.
    pub log_queries: bool,
    /// Wrap failures in `QueryError` with the SQL text attached.
    pub translate_errors: bool,
}

impl Default for SqlAnywhereOptions {
    fn default() -> Self {
        Self {
            name: "sqlanywhere".to_string(),
            host: "localhost".to_string(),
            port: DEFAULT_PORT,
            server: None,
            database: String::new(),
            username: String::new(),
            password: String::new(),
            charset: "utf8".to_string(),
            prefix: String::new(),
            read: None,
            log_queries: false,
            translate_errors: true,
        }
    }
}

impl fmt::Debug for SqlAnywhereOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqlAnywhereOptions")
            .field("name", &self.name)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("server", &self.server)
            .field("database", &self.database)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("charset", &self.charset)
            .field("prefix", &self.prefix)
            .field("read", &self.read)
            .field("log_queries", &self.log_queries)
            .field("translate_errors", &self.translate_errors)
            .finish()
    }
}

impl SqlAnywhereOptions {
    #[must_use]
    pub fn new(database: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn builder(database: impl Into<String>) -> SqlAnywhereOptionsBuilder {
        SqlAnywhereOptionsBuilder::new(database)
    }

    /// Parse options from a JSON document.
    ///
    /// # Errors
    /// Returns `SqlAnywhereDbError::ConfigError` if the document is malformed or fails validation.
    pub fn from_json(json: &str) -> Result<Self, SqlAnywhereDbError> {
        let opts: Self = serde_json::from_str(json)?;
        opts.validate()?;
        Ok(opts)
    }

    /// Parse options from an already-decoded JSON value.
    ///
    /// # Errors
    /// Returns `SqlAnywhereDbError::ConfigError` if the value is malformed or fails validation.
    pub fn from_value(value: serde_json::Value) -> Result<Self, SqlAnywhereDbError> {
        let opts: Self = serde_json::from_value(value)?;
        opts.validate()?;
        Ok(opts)
    }

    /// # Errors
    /// Returns `SqlAnywhereDbError::ConfigError` when required fields are empty.
    pub fn validate(&self) -> Result<(), SqlAnywhereDbError> {
        if self.host.trim().is_empty() {
            return Err(SqlAnywhereDbError::ConfigError("host must not be empty".into()));
        }
        if self.port == 0 {
            return Err(SqlAnywhereDbError::ConfigError("port must not be 0".into()));
        }
        if self
            .read
            .as_ref()
            .is_some_and(|read| read.host.trim().is_empty())
        {
            return Err(SqlAnywhereDbError::ConfigError(
                "read.host must not be empty".into(),
            ));
        }
        Ok(())
    }

    /// Connection string for the write side, in SQL Anywhere `KEY=value;` form.
    #[must_use]
    pub fn connection_string(&self) -> String {
        self.render_connection_string(&self.host, self.port)
    }

    /// Connection string for the read side, if a read host is configured.
    #[must_use]
    pub fn read_connection_string(&self) -> Option<String> {
        self.read.as_ref().map(|read| {
            self.render_connection_string(&read.host, read.port.unwrap_or(self.port))
        })
    }

    fn render_connection_string(&self, host: &str, port: u16) -> String {
        let mut parts = vec![format!("HOST={}", quote_value(&format!("{host}:{port}")))];
        if let Some(server) = &self.server {
            parts.push(format!("ServerName={}", quote_value(server)));
        }
        if !self.database.is_empty() {
            parts.push(format!("DBN={}", quote_value(&self.database)));
        }
        if !self.username.is_empty() {
            parts.push(format!("UID={}", quote_value(&self.username)));
        }
        if !self.password.is_empty() {
            parts.push(format!("PWD={}", quote_value(&self.password)));
        }
        if !self.charset.is_empty() {
            parts.push(format!("CHARSET={}", quote_value(&self.charset)));
        }
        parts.join(";")
    }
}

// Values containing separators or braces must be wrapped in `{}`; a literal `}` is doubled.
fn quote_value(value: &str) -> String {
    let needs_braces = value.contains([';', '{', '}', '='])
        || value.starts_with(' ')
        || value.ends_with(' ');
    if needs_braces {
        format!("{{{}}}", value.replace('}', "}}"))
    } else {
        value.to_string()
    }
}

/// Fluent builder for [`SqlAnywhereOptions`].
#[derive(Debug, Clone)]
pub struct SqlAnywhereOptionsBuilder {
    opts: SqlAnywhereOptions,
}

impl SqlAnywhereOptionsBuilder {
    #[must_use]
    pub fn new(database: impl Into<String>) -> Self {
        Self {
            opts: SqlAnywhereOptions::new(database),
        }
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.opts.name = name.into();
        self
    }

    #[must_use]
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.opts.host = host.into();
        self
    }

    #[must_use]
    pub fn port(mut self, port: u16) -> Self {
        self.opts.port = port;
        self
    }

    #[must_use]
    pub fn server(mut self, server: impl Into<String>) -> Self {
        self.opts.server = Some(server.into());
        self
    }

    #[must_use]
    pub fn credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.opts.username = username.into();
        self.opts.password = password.into();
        self
    }

    #[must_use]
    pub fn charset(mut self, charset: impl Into<String>) -> Self {
        self.opts.charset = charset.into();
        self
    }

    #[must_use]
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.opts.prefix = prefix.into();
        self
    }

    #[must_use]
    pub fn read_host(mut self, host: impl Into<String>, port: Option<u16>) -> Self {
        self.opts.read = Some(ReadOptions {
            host: host.into(),
            port,
        });
        self
    }

    #[must_use]
    pub fn log_queries(mut self, enabled: bool) -> Self {
        self.opts.log_queries = enabled;
        self
    }

    #[must_use]
    pub fn translate_errors(mut self, enabled: bool) -> Self {
        self.opts.translate_errors = enabled;
        self
    }

    /// # Errors
    /// Returns `SqlAnywhereDbError::ConfigError` if the options fail validation.
    pub fn finish(self) -> Result<SqlAnywhereOptions, SqlAnywhereDbError> {
        self.opts.validate()?;
        Ok(self.opts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connection_string_includes_configured_parts() {
        let opts = SqlAnywhereOptions::builder("demo")
            .host("db.internal")
            .port(2639)
            .server("demo_srv")
            .credentials("dba", "p;w")
            .finish()
            .unwrap();
        assert_eq!(
            opts.connection_string(),
            "HOST=db.internal:2639;ServerName=demo_srv;DBN=demo;UID=dba;PWD={p;w};CHARSET=utf8"
        );
        assert_eq!(opts.read_connection_string(), None);
    }

    #[test]
    fn read_host_inherits_port() {
        let opts = SqlAnywhereOptions::builder("demo")
            .read_host("replica", None)
            .finish()
            .unwrap();
        let read = opts.read_connection_string().unwrap();
        assert!(read.starts_with("HOST=replica:2638;"));
    }

    #[test]
    fn json_defaults_and_validation() {
        let opts = SqlAnywhereOptions::from_json(r#"{"database": "demo"}"#).unwrap();
        assert_eq!(opts.name, "sqlanywhere");
        assert_eq!(opts.host, "localhost");
        assert!(opts.translate_errors);

        let err = SqlAnywhereOptions::from_json(r#"{"host": ""}"#).unwrap_err();
        assert!(matches!(err, SqlAnywhereDbError::ConfigError(_)));

        let err = SqlAnywhereOptions::from_json("not json").unwrap_err();
        assert!(matches!(err, SqlAnywhereDbError::ConfigError(_)));
    }

    #[test]
    fn debug_redacts_password() {
        let opts = SqlAnywhereOptions::builder("demo")
            .credentials("dba", "secret")
            .finish()
            .unwrap();
        let rendered = format!("{opts:?}");
        assert!(!rendered.contains("secret"));
    }
}
