use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;
use std::fs;

mod common;
use common::{setup_test_db, temp_out, ts, zka};

use zkattend::db::initialize::init_db;
use zkattend::db::queries::{ensure_user, insert_punch};

/// Initialize a DB via the CLI and seed it with punches through the library,
/// since punches only ever arrive from a terminal.
fn init_db_with_data(db_path: &str) {
    zka()
        .args(["--db", db_path, "--test", "init"])
        .assert()
        .success();

    let conn = rusqlite::Connection::open(db_path).expect("open db");
    init_db(&conn).expect("init db");
    ensure_user(&conn, 1).expect("user");
    insert_punch(&conn, 1, &ts("2024-03-04 08:00:00"), 0, 1).expect("punch");
    insert_punch(&conn, 1, &ts("2024-03-04 17:30:00"), 1, 1).expect("punch");
}

#[test]
fn test_init_creates_database() {
    let db_path = setup_test_db("init_creates");

    zka()
        .args(["--db", &db_path, "--test", "init"])
        .assert()
        .success()
        .stdout(contains("Database initialized"));

    assert!(fs::metadata(&db_path).is_ok());
}

#[test]
fn test_users_set_and_list() {
    let db_path = setup_test_db("users_set_list");

    zka()
        .args(["--db", &db_path, "--test", "init"])
        .assert()
        .success();

    zka()
        .args([
            "--db",
            &db_path,
            "users",
            "set",
            "1",
            "--name",
            "Alice Smith",
            "--department",
            "Engineering",
        ])
        .assert()
        .success()
        .stdout(contains("User 1 updated"));

    zka()
        .args(["--db", &db_path, "users", "list"])
        .assert()
        .success()
        .stdout(contains("Alice Smith"))
        .stdout(contains("Engineering"));
}

#[test]
fn test_users_del_unknown_user_fails() {
    let db_path = setup_test_db("users_del_unknown");

    zka()
        .args(["--db", &db_path, "--test", "init"])
        .assert()
        .success();

    zka()
        .args(["--db", &db_path, "users", "del", "42"])
        .assert()
        .failure()
        .stderr(contains("Unknown user: 42"));
}

#[test]
fn test_makeup_set_list_and_del() {
    let db_path = setup_test_db("makeup_cycle");

    zka()
        .args(["--db", &db_path, "--test", "init"])
        .assert()
        .success();

    zka()
        .args([
            "--db",
            &db_path,
            "makeup",
            "set",
            "1",
            "2024-03-04",
            "2.5",
            "--note",
            "forgot badge",
        ])
        .assert()
        .success()
        .stdout(contains("+2.50h"));

    zka()
        .args(["--db", &db_path, "makeup", "list"])
        .assert()
        .success()
        .stdout(contains("2024-03-04"))
        .stdout(contains("forgot badge"));

    zka()
        .args(["--db", &db_path, "makeup", "del", "1", "2024-03-04"])
        .assert()
        .success()
        .stdout(contains("removed"));

    zka()
        .args(["--db", &db_path, "makeup", "list"])
        .assert()
        .success()
        .stdout(contains("No make-up entries"));
}

#[test]
fn test_makeup_set_rejects_bad_date() {
    let db_path = setup_test_db("makeup_bad_date");

    zka()
        .args(["--db", &db_path, "--test", "init"])
        .assert()
        .success();

    zka()
        .args(["--db", &db_path, "makeup", "set", "1", "04-03-2024", "2.0"])
        .assert()
        .failure()
        .stderr(contains("Invalid date format"));
}

#[test]
fn test_summary_table_output() {
    let db_path = setup_test_db("summary_table");
    init_db_with_data(&db_path);

    zka()
        .args(["--db", &db_path, "summary"])
        .assert()
        .success()
        .stdout(contains("2024-03-04"))
        .stdout(contains("9.50"));
}

#[test]
fn test_summary_json_output() {
    let db_path = setup_test_db("summary_json");
    init_db_with_data(&db_path);

    zka()
        .args(["--db", &db_path, "summary", "--json"])
        .assert()
        .success()
        .stdout(contains("\"user_id\": 1"))
        .stdout(contains("\"worked_hours\": 9.5"));
}

#[test]
fn test_summary_rejects_inverted_range() {
    let db_path = setup_test_db("summary_inverted");
    init_db_with_data(&db_path);

    zka()
        .args([
            "--db",
            &db_path,
            "summary",
            "--from",
            "2024-03-10",
            "--to",
            "2024-03-01",
        ])
        .assert()
        .failure()
        .stderr(contains("Invalid date range"));
}

#[test]
fn test_summary_filter_excludes_other_days() {
    let db_path = setup_test_db("summary_filtered");
    init_db_with_data(&db_path);

    let conn = rusqlite::Connection::open(&db_path).expect("open db");
    insert_punch(&conn, 1, &ts("2024-03-10 08:00:00"), 0, 1).expect("punch");

    zka()
        .args([
            "--db",
            &db_path,
            "summary",
            "--from",
            "2024-03-01",
            "--to",
            "2024-03-05",
        ])
        .assert()
        .success()
        .stdout(contains("2024-03-04"))
        .stdout(contains("2024-03-10").not());
}

#[test]
fn test_export_csv() {
    let db_path = setup_test_db("export_csv");
    let out = temp_out("export_csv", "csv");
    init_db_with_data(&db_path);

    zka()
        .args([
            "--db", &db_path, "export", "--format", "csv", "--file", &out,
        ])
        .assert()
        .success()
        .stdout(contains("export completed"));

    let content = fs::read_to_string(&out).expect("read export");
    assert!(content.contains("user_id"));
    assert!(content.contains("2024-03-04"));
    assert!(content.contains("9.5"));
}

#[test]
fn test_export_json() {
    let db_path = setup_test_db("export_json");
    let out = temp_out("export_json", "json");
    init_db_with_data(&db_path);

    zka()
        .args([
            "--db", &db_path, "export", "--format", "json", "--file", &out,
        ])
        .assert()
        .success();

    let content = fs::read_to_string(&out).expect("read export");
    assert!(content.contains("\"user_id\""));
    assert!(content.contains("2024-03-04"));
}

#[test]
fn test_export_empty_db_writes_nothing() {
    let db_path = setup_test_db("export_empty");
    let out = temp_out("export_empty", "csv");

    zka()
        .args(["--db", &db_path, "--test", "init"])
        .assert()
        .success();

    zka()
        .args([
            "--db", &db_path, "export", "--format", "csv", "--file", &out,
        ])
        .assert()
        .success()
        .stdout(contains("Nothing to export"));

    assert!(fs::metadata(&out).is_err());
}

#[test]
fn test_db_info_and_check() {
    let db_path = setup_test_db("db_info_check");
    init_db_with_data(&db_path);

    zka()
        .args(["--db", &db_path, "db", "--info"])
        .assert()
        .success()
        .stdout(contains("Users"));

    zka()
        .args(["--db", &db_path, "db", "--check"])
        .assert()
        .success()
        .stdout(contains("Integrity check passed"));
}

#[test]
fn test_log_print_shows_audit_trail() {
    let db_path = setup_test_db("log_print");

    zka()
        .args(["--db", &db_path, "--test", "init"])
        .assert()
        .success();

    zka()
        .args(["--db", &db_path, "makeup", "set", "1", "2024-03-04", "1.0"])
        .assert()
        .success();

    zka()
        .args(["--db", &db_path, "log", "--print"])
        .assert()
        .success()
        .stdout(contains("init"))
        .stdout(contains("makeup"));
}

#[test]
fn test_probe_unreachable_host_fails() {
    // Nothing listens on the discard port; the probe must fail cleanly.
    zka()
        .args([
            "probe", "--host", "127.0.0.1", "--port", "9", "--timeout", "1",
        ])
        .assert()
        .failure()
        .stderr(contains("Device connection error"));
}

#[test]
fn test_backup_copies_database() {
    let db_path = setup_test_db("backup_copy");
    let out = temp_out("backup_copy", "sqlite");
    init_db_with_data(&db_path);

    zka()
        .args(["--db", &db_path, "backup", "--file", &out])
        .assert()
        .success();

    let src_len = fs::metadata(&db_path).expect("src").len();
    let dst_len = fs::metadata(&out).expect("dst").len();
    assert_eq!(src_len, dst_len);
}
