use chrono::NaiveDate;
use sqlanywhere_middleware::prelude::*;
use sqlanywhere_middleware::test_utils::RecordingDriver;

fn connect(driver: RecordingDriver) -> SqlAnywhereConnection<RecordingDriver> {
    SqlAnywhereConnection::new(driver, "demo", "", SqlAnywhereOptions::new("demo"))
}

#[test]
fn named_bindings_are_rewritten_in_placeholder_order() -> Result<(), SqlAnywhereDbError> {
    let driver = RecordingDriver::new().with_rows(&["id"], Vec::new());
    let mut conn = connect(driver.clone());

    conn.select(
        "SELECT id FROM users WHERE org = :org AND (id = :id OR parent = :id) AND note <> ':skip'",
        Bindings::named([("id", RowValues::Int(1)), ("org", RowValues::Int(2))]),
        false,
    )?;

    assert_eq!(
        driver.prepared_sql(),
        vec![
            "SELECT id FROM users WHERE org = ? AND (id = ? OR parent = ?) AND note <> ':skip'"
                .to_string()
        ]
    );
    assert_eq!(
        driver.executed_bindings(),
        vec![vec![RowValues::Int(2), RowValues::Int(1), RowValues::Int(1)]]
    );
    Ok(())
}

#[test]
fn binding_count_mismatch_fails_before_the_driver_sees_it() {
    let driver = RecordingDriver::new();
    let mut conn = connect(driver.clone());

    let err = conn
        .affecting_statement("UPDATE t SET a = ? WHERE b = ?", vec![RowValues::Int(1)])
        .unwrap_err();

    assert!(err.is_binding_error());
    assert_eq!(driver.prepare_count(), 0);
}

#[test]
fn missing_and_unused_names_are_binding_errors() {
    let driver = RecordingDriver::new();
    let mut conn = connect(driver.clone());

    let missing = conn
        .select(
            "SELECT * FROM t WHERE a = :a AND b = :b",
            Bindings::named([("a", RowValues::Int(1))]),
            false,
        )
        .unwrap_err();
    assert!(missing.is_binding_error());

    let unused = conn
        .select(
            "SELECT * FROM t WHERE a = :a",
            Bindings::named([("a", RowValues::Int(1)), ("z", RowValues::Int(2))]),
            false,
        )
        .unwrap_err();
    assert!(unused.is_binding_error());

    let cursor = conn.cursor("SELECT * FROM t WHERE a = :a", vec![RowValues::Int(1)], false);
    assert!(cursor.unwrap_err().is_binding_error());

    assert!(!driver.touched());
}

#[test]
fn values_are_normalized_before_binding() -> Result<(), SqlAnywhereDbError> {
    let driver = RecordingDriver::new();
    let mut conn = connect(driver.clone());
    let ts = NaiveDate::from_ymd_opt(2024, 1, 2)
        .unwrap()
        .and_hms_opt(3, 4, 5)
        .unwrap();

    conn.affecting_statement(
        "INSERT INTO events (at, flag, note, missing) VALUES (?, ?, ?, ?)",
        vec![
            RowValues::Timestamp(ts),
            RowValues::Bool(true),
            RowValues::Text("x".into()),
            RowValues::Null,
        ],
    )?;

    assert_eq!(
        driver.executed_bindings(),
        vec![vec![
            RowValues::Text("2024-01-02 03:04:05".into()),
            RowValues::Int(1),
            RowValues::Text("x".into()),
            RowValues::Null,
        ]]
    );
    Ok(())
}

#[test]
fn custom_date_format_comes_from_the_query_grammar() -> Result<(), SqlAnywhereDbError> {
    let driver = RecordingDriver::new();
    let mut conn = connect(driver.clone());
    conn.set_query_grammar(QueryGrammar::default().with_date_format("%Y%m%d"));
    let ts = NaiveDate::from_ymd_opt(2023, 12, 31)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();

    let prepared = conn.prepare_bindings(&Bindings::from(vec![
        RowValues::Timestamp(ts),
        RowValues::Bool(false),
    ]));
    assert_eq!(prepared, vec![RowValues::Text("20231231".into()), RowValues::Int(0)]);

    conn.affecting_statement("DELETE FROM t WHERE day = ?", vec![RowValues::Timestamp(ts)])?;
    assert_eq!(driver.executed_bindings(), vec![vec![RowValues::Text("20231231".into())]]);
    Ok(())
}
