use std::panic::{AssertUnwindSafe, catch_unwind};

use sqlanywhere_middleware::prelude::*;
use sqlanywhere_middleware::test_utils::RecordingDriver;

fn scripted() -> RecordingDriver {
    RecordingDriver::new()
        .with_rows(&["id"], vec![vec![RowValues::Int(1)]])
        .with_affected_rows(4)
}

fn connect(driver: RecordingDriver) -> SqlAnywhereConnection<RecordingDriver> {
    SqlAnywhereConnection::new(driver, "demo", "", SqlAnywhereOptions::new("demo"))
}

#[test]
fn pretend_mode_never_touches_the_driver() -> Result<(), SqlAnywhereDbError> {
    let write = scripted();
    let read = scripted();
    let mut conn = connect(write.clone()).with_read_driver(read.clone());
    conn.set_pretending(true);
    assert!(conn.pretending());

    assert!(conn.select("SELECT id FROM t", Bindings::none(), true)?.is_empty());
    assert!(conn.select("SELECT id FROM t", Bindings::none(), false)?.is_empty());
    assert!(conn.select_one("SELECT id FROM t", Bindings::none(), false)?.is_none());
    let mut cursor = conn.cursor("SELECT id FROM t", Bindings::none(), true)?;
    assert!(cursor.next().is_none());
    assert!(!cursor.is_open());
    assert_eq!(conn.affecting_statement("DELETE FROM t", Bindings::none())?, 0);
    assert!(conn.insert("INSERT INTO t VALUES (1)", Bindings::none())?);

    assert!(!write.touched());
    assert!(!read.touched());
    assert!(!conn.has_modified_records());
    Ok(())
}

#[test]
fn pretend_collects_would_be_queries_and_restores_mode() -> Result<(), SqlAnywhereDbError> {
    let driver = scripted();
    let mut conn = connect(driver.clone());

    let queries = conn.pretend(|conn| {
        conn.affecting_statement("DELETE FROM users WHERE id = ?", vec![RowValues::Int(5)])
            .unwrap();
        conn.select("SELECT * FROM users", Bindings::none(), false).unwrap();
    });

    assert_eq!(queries.len(), 2);
    assert_eq!(queries[0].query, "DELETE FROM users WHERE id = ?");
    assert_eq!(queries[0].bindings, vec![RowValues::Int(5)]);
    assert_eq!(queries[1].query, "SELECT * FROM users");
    assert!(!conn.pretending());
    assert!(!conn.logging_queries());
    assert!(conn.query_log().is_empty());
    assert!(!driver.touched());

    assert_eq!(conn.affecting_statement("DELETE FROM users", Bindings::none())?, 4);
    assert!(driver.touched());
    Ok(())
}

#[test]
fn pretend_keeps_the_existing_query_log() -> Result<(), SqlAnywhereDbError> {
    let mut conn = connect(scripted());
    conn.enable_query_log();
    conn.select("SELECT 1", Bindings::none(), false)?;

    let queries = conn.pretend(|conn| {
        conn.select("SELECT 2", Bindings::none(), false).unwrap();
    });

    assert_eq!(queries.len(), 1);
    assert_eq!(queries[0].query, "SELECT 2");
    assert!(conn.logging_queries());
    assert_eq!(conn.query_log().len(), 1);
    assert_eq!(conn.query_log()[0].query, "SELECT 1");
    Ok(())
}

#[test]
fn pretend_restores_mode_when_the_closure_panics() {
    let driver = scripted();
    let mut conn = connect(driver.clone());

    let outcome = catch_unwind(AssertUnwindSafe(|| {
        conn.pretend(|conn| {
            conn.select("SELECT 1", Bindings::none(), false).unwrap();
            panic!("caller bug");
        })
    }));

    assert!(outcome.is_err());
    assert!(!conn.pretending());
    assert!(!conn.logging_queries());
    assert!(!driver.touched());
}

#[test]
fn pretend_scope_restores_on_drop() -> Result<(), SqlAnywhereDbError> {
    let driver = scripted();
    let mut conn = connect(driver.clone());

    {
        let mut scope = conn.pretend_scope();
        assert!(scope.pretending());
        assert_eq!(scope.affecting_statement("DELETE FROM t", Bindings::none())?, 0);
    }

    assert!(!conn.pretending());
    assert!(!driver.touched());
    Ok(())
}

#[test]
fn nested_pretend_keeps_outer_mode() {
    let mut conn = connect(scripted());
    conn.set_pretending(true);

    let queries = conn.pretend(|conn| {
        conn.select("SELECT 1", Bindings::none(), false).unwrap();
    });

    assert_eq!(queries.len(), 1);
    assert!(conn.pretending());
}
