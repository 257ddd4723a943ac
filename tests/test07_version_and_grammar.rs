use sqlanywhere_middleware::prelude::*;
use sqlanywhere_middleware::test_utils::{DriverCall, RecordingDriver};
use sqlanywhere_middleware::ServerVersion;

fn connect(driver: RecordingDriver, prefix: &str) -> SqlAnywhereConnection<RecordingDriver> {
    SqlAnywhereConnection::new(driver, "demo", prefix, SqlAnywhereOptions::new("ignored"))
}

#[test]
fn server_version_reads_the_driver_attribute() {
    let conn = connect(RecordingDriver::new().with_server_version("17.0.10.5963"), "");

    assert_eq!(conn.server_version(), "17.0.10.5963");
    assert_eq!(
        conn.parsed_server_version(),
        Some(ServerVersion {
            major: 17,
            minor: 0,
            patch: 10,
            build: 5963
        })
    );
}

#[test]
fn missing_server_version_is_empty() {
    let driver = RecordingDriver::new();
    let conn = connect(driver.clone(), "");

    assert_eq!(conn.server_version(), "");
    assert_eq!(conn.parsed_server_version(), None);
    assert_eq!(driver.calls().len(), 2);
    assert_eq!(
        driver.count(|call| {
            matches!(call, DriverCall::Attribute(ConnectionAttribute::ServerVersion))
        }),
        2
    );
}

#[test]
fn server_version_is_available_in_pretend_mode() {
    let mut conn = connect(RecordingDriver::new().with_server_version("16.0"), "");
    conn.set_pretending(true);
    assert_eq!(conn.server_version(), "16.0");
}

#[test]
fn grammars_carry_the_table_prefix() {
    let mut conn = connect(RecordingDriver::new(), "app_");

    assert_eq!(conn.database_name(), "demo");
    assert_eq!(conn.table_prefix(), "app_");
    assert_eq!(conn.config().database, "demo");
    assert_eq!(conn.config().prefix, "app_");
    assert_eq!(conn.query_grammar().table_prefix(), "app_");
    assert_eq!(conn.schema_grammar().table_prefix(), "app_");
    assert_eq!(conn.default_query_grammar().wrap_table("users"), "\"app_users\"");
    assert_eq!(
        conn.default_schema_grammar().wrap_table("dba.users as u"),
        "\"dba\".\"app_users\" AS \"app_u\""
    );

    conn.set_table_prefix("tmp_");
    assert_eq!(conn.query_grammar().wrap_table("users"), "\"tmp_users\"");
    assert_eq!(conn.schema_grammar().table_prefix(), "tmp_");
    assert_eq!(conn.default_query_grammar().table_prefix(), "tmp_");
}

#[test]
fn replaced_query_grammar_keeps_the_prefix() {
    let mut conn = connect(RecordingDriver::new(), "app_");
    conn.set_query_grammar(QueryGrammar::new("other_").with_date_format("%d.%m.%Y"));

    assert_eq!(conn.query_grammar().table_prefix(), "app_");
    assert_eq!(conn.query_grammar().date_format(), "%d.%m.%Y");

    conn.use_default_query_grammar();
    assert_eq!(conn.query_grammar().date_format(), "%Y-%m-%d %H:%M:%S");
}

fn select_and_wrap<C: DatabaseConnection>(
    conn: &mut C,
) -> Result<(usize, String), SqlAnywhereDbError> {
    let rows = conn.select("SELECT 1", Bindings::none(), false)?.len();
    Ok((rows, conn.default_query_grammar().wrap("a.b")))
}

#[test]
fn connection_is_usable_through_the_trait() -> Result<(), SqlAnywhereDbError> {
    let mut conn = connect(
        RecordingDriver::new().with_rows(&["one"], vec![vec![RowValues::Int(1)]]),
        "",
    );
    let (rows, wrapped) = select_and_wrap(&mut conn)?;
    assert_eq!(rows, 1);
    assert_eq!(wrapped, "\"a\".\"b\"");
    assert!(!DatabaseConnection::pretending(&conn));
    Ok(())
}
