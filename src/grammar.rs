//! Grammar providers handed to the query and schema builders.
//!
//! The adapter only configures them; rendering lives with the caller.

/// Default datetime format used when binding timestamps.
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Shared identifier handling for query and schema grammars.
pub trait Grammar {
    fn table_prefix(&self) -> &str;

    fn set_table_prefix(&mut self, prefix: &str);

    /// Quote a single identifier segment. `*` is left alone.
    fn wrap_value(&self, value: &str) -> String {
        if value == "*" {
            return value.to_string();
        }
        format!("\"{}\"", value.replace('"', "\"\""))
    }

    /// Quote a possibly dotted identifier, honoring a trailing ` as alias`.
    fn wrap(&self, value: &str) -> String {
        if let Some((column, alias)) = split_alias(value) {
            return format!("{} AS {}", self.wrap(column), self.wrap_value(alias));
        }
        value
            .split('.')
            .map(|segment| self.wrap_value(segment.trim()))
            .collect::<Vec<_>>()
            .join(".")
    }

    /// Quote a table name, applying the prefix to the table segment only.
    fn wrap_table(&self, table: &str) -> String {
        if let Some((name, alias)) = split_alias(table) {
            return format!(
                "{} AS {}",
                self.wrap_table(name),
                self.wrap_value(&format!("{}{}", self.table_prefix(), alias))
            );
        }
        match table.rsplit_once('.') {
            Some((owner, name)) => format!(
                "{}.{}",
                self.wrap(owner),
                self.wrap_value(&format!("{}{}", self.table_prefix(), name.trim()))
            ),
            None => self.wrap_value(&format!("{}{}", self.table_prefix(), table.trim())),
        }
    }
}

fn split_alias(value: &str) -> Option<(&str, &str)> {
    let lower = value.to_ascii_lowercase();
    lower
        .find(" as ")
        .map(|idx| (value[..idx].trim(), value[idx + 4..].trim()))
}

/// Grammar used to compile DML and SELECT statements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryGrammar {
    table_prefix: String,
    date_format: String,
}

impl Default for QueryGrammar {
    fn default() -> Self {
        Self {
            table_prefix: String::new(),
            date_format: DEFAULT_DATE_FORMAT.to_string(),
        }
    }
}

impl QueryGrammar {
    #[must_use]
    pub fn new(table_prefix: impl Into<String>) -> Self {
        Self {
            table_prefix: table_prefix.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_date_format(mut self, date_format: impl Into<String>) -> Self {
        self.date_format = date_format.into();
        self
    }

    /// `chrono` format string applied to timestamp bindings.
    #[must_use]
    pub fn date_format(&self) -> &str {
        &self.date_format
    }

    /// `?, ?, ?` for `count` values.
    #[must_use]
    pub fn parameterize(&self, count: usize) -> String {
        vec!["?"; count].join(", ")
    }
}

impl Grammar for QueryGrammar {
    fn table_prefix(&self) -> &str {
        &self.table_prefix
    }

    fn set_table_prefix(&mut self, prefix: &str) {
        self.table_prefix = prefix.to_string();
    }
}

/// Grammar used to compile DDL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaGrammar {
    table_prefix: String,
}

impl SchemaGrammar {
    #[must_use]
    pub fn new(table_prefix: impl Into<String>) -> Self {
        Self {
            table_prefix: table_prefix.into(),
        }
    }
}

impl Grammar for SchemaGrammar {
    fn table_prefix(&self) -> &str {
        &self.table_prefix
    }

    fn set_table_prefix(&mut self, prefix: &str) {
        self.table_prefix = prefix.to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_table_prefixes_only_the_table_segment() {
        let grammar = QueryGrammar::new("app_");
        assert_eq!(grammar.wrap_table("users"), "\"app_users\"");
        assert_eq!(grammar.wrap_table("dba.users"), "\"dba\".\"app_users\"");
        assert_eq!(
            grammar.wrap_table("users as u"),
            "\"app_users\" AS \"app_u\""
        );
    }

    #[test]
    fn wrap_handles_aliases_stars_and_quotes() {
        let grammar = SchemaGrammar::default();
        assert_eq!(grammar.wrap("t.*"), "\"t\".*");
        assert_eq!(grammar.wrap("name AS n"), "\"name\" AS \"n\"");
        assert_eq!(grammar.wrap_value("we\"ird"), "\"we\"\"ird\"");
    }

    #[test]
    fn parameterize_joins_placeholders() {
        assert_eq!(QueryGrammar::default().parameterize(3), "?, ?, ?");
        assert_eq!(QueryGrammar::default().parameterize(0), "");
    }
}
