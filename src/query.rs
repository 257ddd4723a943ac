use crate::types::{Bindings, RowValues};

/// A SQL string and its bindings bundled together.
///
/// ```rust
/// use sqlanywhere_middleware::prelude::*;
///
/// let qp = QueryAndParams::new(
///     "INSERT INTO t (id, name) VALUES (?, ?)",
///     vec![RowValues::Int(1), RowValues::Text("alice".into())],
/// );
/// # let _ = qp;
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct QueryAndParams {
    /// The SQL query string
    pub query: String,
    /// The bindings for the query's placeholders
    pub params: Bindings,
}

impl QueryAndParams {
    pub fn new(query: impl Into<String>, params: impl Into<Bindings>) -> Self {
        Self {
            query: query.into(),
            params: params.into(),
        }
    }

    /// Create a new `QueryAndParams` with no bindings
    pub fn new_without_params(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            params: Bindings::default(),
        }
    }

    /// Create a new `QueryAndParams` with named bindings.
    pub fn named<I, K>(query: impl Into<String>, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, RowValues)>,
        K: Into<String>,
    {
        Self {
            query: query.into(),
            params: Bindings::named(pairs),
        }
    }
}
