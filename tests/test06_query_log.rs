use std::sync::{Arc, Mutex};

use sqlanywhere_middleware::prelude::*;
use sqlanywhere_middleware::test_utils::RecordingDriver;

fn connect(
    driver: RecordingDriver,
    opts: SqlAnywhereOptions,
) -> SqlAnywhereConnection<RecordingDriver> {
    SqlAnywhereConnection::from_options(driver, opts)
}

#[test]
fn query_log_records_successful_statements() -> Result<(), SqlAnywhereDbError> {
    let mut conn = connect(RecordingDriver::new(), SqlAnywhereOptions::new("demo"));
    assert!(!conn.logging_queries());

    conn.select("SELECT 1", Bindings::none(), false)?;
    assert!(conn.query_log().is_empty());

    conn.enable_query_log();
    conn.select("SELECT * FROM t WHERE id = ?", vec![RowValues::Int(9)], false)?;
    conn.affecting_statement("DELETE FROM t", Bindings::none())?;

    let log = conn.query_log();
    assert_eq!(log.len(), 2);
    assert_eq!(log[0].query, "SELECT * FROM t WHERE id = ?");
    assert_eq!(log[0].bindings, vec![RowValues::Int(9)]);
    assert_eq!(log[1].query, "DELETE FROM t");

    conn.flush_query_log();
    assert!(conn.query_log().is_empty());
    conn.disable_query_log();
    conn.select("SELECT 1", Bindings::none(), false)?;
    assert!(conn.query_log().is_empty());
    Ok(())
}

#[test]
fn log_queries_option_starts_with_logging_enabled() -> Result<(), SqlAnywhereDbError> {
    let opts = SqlAnywhereOptions::builder("demo").log_queries(true).finish()?;
    let mut conn = connect(RecordingDriver::new(), opts);

    conn.select("SELECT 1", Bindings::none(), false)?;

    assert!(conn.logging_queries());
    assert_eq!(conn.query_log().len(), 1);
    Ok(())
}

#[test]
fn listeners_receive_connection_name_and_sql() -> Result<(), SqlAnywhereDbError> {
    let opts = SqlAnywhereOptions::builder("demo").name("reporting").finish()?;
    let mut conn = connect(RecordingDriver::new(), opts);
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    conn.listen(move |event| {
        sink.lock()
            .unwrap()
            .push((event.connection_name.clone(), event.sql.clone()));
    });

    conn.select("SELECT 1", Bindings::none(), false)?;
    conn.affecting_statement("UPDATE t SET a = 1", Bindings::none())?;
    let _ = conn.select("SELECT ?", Bindings::none(), false);

    let seen = seen.lock().unwrap();
    assert_eq!(
        *seen,
        vec![
            ("reporting".to_string(), "SELECT 1".to_string()),
            ("reporting".to_string(), "UPDATE t SET a = 1".to_string()),
        ]
    );
    Ok(())
}

#[test]
fn failures_carry_sql_and_bindings() {
    let driver = RecordingDriver::new().failing_execute("connection reset");
    let mut conn = connect(driver, SqlAnywhereOptions::new("demo"));
    conn.enable_query_log();

    let err = conn
        .affecting_statement("DELETE FROM t WHERE id = ?", vec![RowValues::Int(3)])
        .unwrap_err();

    match &err {
        SqlAnywhereDbError::Query(query) => {
            assert_eq!(query.connection_name, "sqlanywhere");
            assert_eq!(query.sql, "DELETE FROM t WHERE id = ?");
            assert_eq!(query.bindings, vec![RowValues::Int(3)]);
            assert!(matches!(*query.source, SqlAnywhereDbError::Driver(_)));
        }
        other => panic!("expected a query error, got {other:?}"),
    }
    assert!(err.to_string().contains("(SQL: DELETE FROM t WHERE id = ?)"));
    assert!(conn.query_log().is_empty());
}

#[test]
fn translation_can_be_turned_off() -> Result<(), SqlAnywhereDbError> {
    let opts = SqlAnywhereOptions::builder("demo").translate_errors(false).finish()?;
    let mut conn = connect(RecordingDriver::new(), opts);

    let err = conn
        .select("SELECT ?", Bindings::none(), false)
        .unwrap_err();

    assert!(matches!(err, SqlAnywhereDbError::Binding(_)));
    Ok(())
}
