//! Binding resolution and normalization.
//!
//! Statements reach the driver with positional `?` placeholders only. Named
//! bindings are rewritten here, and every value goes through
//! [`prepare_bindings`] before it is bound.

use std::borrow::Cow;
use std::collections::{HashMap, HashSet};

mod parsers;
mod scanner;

use scanner::{PlaceholderKind, scan_placeholders};

use crate::error::SqlAnywhereDbError;
use crate::types::{Bindings, RowValues};

/// Rewrite `sql` for positional binding and order `bindings` to match its placeholders.
///
/// Fails with [`SqlAnywhereDbError::Binding`] when the placeholder count does not match,
/// when a named placeholder has no value, when a named value is never used, or when
/// positional and named placeholders are mixed.
///
/// ```rust
/// use sqlanywhere_middleware::bindings::resolve;
/// use sqlanywhere_middleware::prelude::*;
///
/// let bindings = Bindings::named([("id", RowValues::Int(5))]);
/// let (sql, values) = resolve("SELECT * FROM t WHERE id = :id OR parent = :id", &bindings)?;
/// assert_eq!(sql, "SELECT * FROM t WHERE id = ? OR parent = ?");
/// assert_eq!(values, vec![RowValues::Int(5), RowValues::Int(5)]);
/// # Ok::<(), SqlAnywhereDbError>(())
/// ```
///
/// # Errors
/// Returns `SqlAnywhereDbError::Binding` as described above.
pub fn resolve<'a>(
    sql: &'a str,
    bindings: &Bindings,
) -> Result<(Cow<'a, str>, Vec<RowValues>), SqlAnywhereDbError> {
    let spans = scan_placeholders(sql);

    match bindings {
        Bindings::Positional(values) => {
            if let Some(name) = spans.iter().find_map(|span| match span.kind {
                PlaceholderKind::Named(name) => Some(name),
                PlaceholderKind::Positional => None,
            }) {
                return Err(SqlAnywhereDbError::Binding(format!(
                    "placeholder :{name} requires named bindings"
                )));
            }
            if spans.len() != values.len() {
                return Err(SqlAnywhereDbError::Binding(format!(
                    "statement has {} placeholder(s) but {} binding(s) were supplied",
                    spans.len(),
                    values.len()
                )));
            }
            Ok((Cow::Borrowed(sql), values.clone()))
        }
        Bindings::Named(pairs) => {
            if spans
                .iter()
                .any(|span| span.kind == PlaceholderKind::Positional)
            {
                return Err(SqlAnywhereDbError::Binding(
                    "cannot mix positional placeholders with named bindings".into(),
                ));
            }

            let mut lookup: HashMap<&str, &RowValues> = HashMap::with_capacity(pairs.len());
            for (name, value) in pairs {
                let key = name.trim_start_matches(':');
                if lookup.insert(key, value).is_some() {
                    return Err(SqlAnywhereDbError::Binding(format!(
                        "named binding :{key} supplied more than once"
                    )));
                }
            }

            let mut rewritten = String::with_capacity(sql.len());
            let mut values = Vec::with_capacity(spans.len());
            let mut used: HashSet<&str> = HashSet::with_capacity(lookup.len());
            let mut last = 0;
            for span in &spans {
                let PlaceholderKind::Named(name) = span.kind else {
                    continue;
                };
                let value = lookup.get(name).ok_or_else(|| {
                    SqlAnywhereDbError::Binding(format!("no value supplied for :{name}"))
                })?;
                rewritten.push_str(&sql[last..span.start]);
                rewritten.push('?');
                values.push((*value).clone());
                used.insert(name);
                last = span.end;
            }
            rewritten.push_str(&sql[last..]);

            if let Some(unused) = lookup.keys().find(|key| !used.contains(*key)) {
                return Err(SqlAnywhereDbError::Binding(format!(
                    "named binding :{unused} does not appear in the statement"
                )));
            }

            if spans.is_empty() {
                Ok((Cow::Borrowed(sql), values))
            } else {
                Ok((Cow::Owned(rewritten), values))
            }
        }
    }
}

/// Normalize values before they are bound: booleans become `0`/`1` and timestamps
/// are rendered with the grammar's date format.
#[must_use]
pub fn prepare_bindings(values: Vec<RowValues>, date_format: &str) -> Vec<RowValues> {
    values
        .into_iter()
        .map(|value| match value {
            RowValues::Bool(b) => RowValues::Int(i64::from(b)),
            RowValues::Timestamp(dt) => RowValues::Text(dt.format(date_format).to_string()),
            other => other,
        })
        .collect()
}
