use sqlanywhere_middleware::prelude::*;
use sqlanywhere_middleware::test_utils::{DriverCall, RecordingDriver};

fn three_rows() -> RecordingDriver {
    RecordingDriver::new().with_rows(
        &["id"],
        vec![
            vec![RowValues::Int(1)],
            vec![RowValues::Int(2)],
            vec![RowValues::Int(3)],
        ],
    )
}

fn connect(driver: RecordingDriver) -> SqlAnywhereConnection<RecordingDriver> {
    SqlAnywhereConnection::new(driver, "demo", "", SqlAnywhereOptions::new("demo"))
}

fn id(row: &CustomDbRow) -> Option<i64> {
    row.get("id").and_then(RowValues::as_int).copied()
}

#[test]
fn cursor_yields_rows_in_order_then_stays_exhausted() -> Result<(), SqlAnywhereDbError> {
    let driver = three_rows();
    let mut conn = connect(driver.clone());

    let mut cursor = conn.cursor("SELECT id FROM t ORDER BY id", Bindings::none(), false)?;
    assert!(cursor.is_open());
    assert_eq!(driver.fetch_next_count(), 0);

    for expected in 1..=3 {
        let row = cursor.next().expect("row available")?;
        assert_eq!(id(&row), Some(expected));
    }
    assert!(cursor.next().is_none());
    assert!(!cursor.is_open());
    assert!(cursor.next().is_none());
    assert!(cursor.next().is_none());

    assert_eq!(cursor.fetched(), 3);
    assert_eq!(driver.fetch_next_count(), 4);
    assert_eq!(driver.fetch_all_count(), 0);
    assert_eq!(driver.close_count(), 1);
    assert_eq!(driver.open_statements(), 0);
    Ok(())
}

#[test]
fn rows_are_pulled_one_at_a_time() -> Result<(), SqlAnywhereDbError> {
    let driver = three_rows();
    let mut conn = connect(driver.clone());

    let mut cursor = conn.cursor("SELECT id FROM t", Bindings::none(), false)?;
    let first = cursor.next().expect("first row")?;

    assert_eq!(id(&first), Some(1));
    assert_eq!(driver.fetch_next_count(), 1);
    Ok(())
}

#[test]
fn abandoning_a_cursor_releases_its_statement() -> Result<(), SqlAnywhereDbError> {
    let driver = three_rows();
    let mut conn = connect(driver.clone());

    for row in conn.cursor("SELECT id FROM t", Bindings::none(), false)? {
        if id(&row?) == Some(1) {
            break;
        }
    }

    assert_eq!(driver.open_statements(), 0);
    assert_eq!(driver.close_count(), 1);
    assert_eq!(driver.fetch_next_count(), 1);
    Ok(())
}

#[test]
fn explicit_close_is_idempotent() -> Result<(), SqlAnywhereDbError> {
    let driver = three_rows();
    let mut conn = connect(driver.clone());

    let mut cursor = conn.cursor("SELECT id FROM t", Bindings::none(), false)?;
    cursor.close();
    cursor.close();
    assert!(cursor.next().is_none());
    drop(cursor);

    assert_eq!(driver.close_count(), 1);
    assert_eq!(driver.open_statements(), 0);
    Ok(())
}

#[test]
fn fetch_error_is_yielded_once_then_cursor_ends() -> Result<(), SqlAnywhereDbError> {
    let driver = three_rows().failing_fetch_at(1);
    let mut conn = connect(driver.clone());

    let mut cursor = conn.cursor("SELECT id FROM t", Bindings::none(), false)?;
    assert_eq!(id(&cursor.next().expect("first row")?), Some(1));
    let err = cursor.next().expect("error item").unwrap_err();
    assert!(matches!(err, SqlAnywhereDbError::Driver(_)));
    assert!(cursor.next().is_none());
    assert_eq!(driver.open_statements(), 0);
    Ok(())
}

#[test]
fn collect_rows_drains_the_cursor() -> Result<(), SqlAnywhereDbError> {
    let driver = three_rows();
    let mut conn = connect(driver.clone());

    let rows = conn
        .cursor("SELECT id FROM t WHERE id > ?", vec![RowValues::Int(0)], false)?
        .collect_rows()?;

    assert_eq!(rows.iter().filter_map(id).collect::<Vec<_>>(), vec![1, 2, 3]);
    assert_eq!(driver.open_statements(), 0);
    Ok(())
}

#[test]
fn cursor_honors_read_driver_selection() -> Result<(), SqlAnywhereDbError> {
    let write = three_rows();
    let read = three_rows();
    let mut conn = connect(write.clone()).with_read_driver(read.clone());

    let first = conn.cursor("SELECT id FROM t", Bindings::none(), true)?.next();
    assert!(first.is_some());
    assert_eq!(read.prepare_count(), 1);
    assert!(!write.touched());

    let first = conn.cursor("SELECT id FROM t", Bindings::none(), false)?.next();
    assert!(first.is_some());
    assert_eq!(write.prepare_count(), 1);
    assert_eq!(read.open_statements() + write.open_statements(), 0);
    Ok(())
}

#[test]
fn cursor_execution_happens_before_first_pull() -> Result<(), SqlAnywhereDbError> {
    let driver = three_rows();
    let mut conn = connect(driver.clone());

    let cursor = conn.cursor("SELECT id FROM t WHERE id = ?", vec![RowValues::Int(2)], false)?;

    assert_eq!(
        driver.calls(),
        vec![
            DriverCall::Prepare("SELECT id FROM t WHERE id = ?".into()),
            DriverCall::Execute(vec![RowValues::Int(2)]),
        ]
    );
    drop(cursor);
    assert_eq!(driver.open_statements(), 0);
    Ok(())
}
