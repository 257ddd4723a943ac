//! Test utilities for exercising the adapter without a live server.

mod recording;

pub use recording::{DriverCall, RecordingDriver, RecordingStatement};

use std::sync::Arc;

use crate::results::CustomDbRow;
use crate::types::RowValues;

/// Create a test row with the given column names and values.
#[must_use]
pub fn create_test_row(column_names: Vec<String>, values: Vec<RowValues>) -> CustomDbRow {
    CustomDbRow::new(Arc::new(column_names), values)
}
