use crate::ui::messages::success;
use rusqlite::{Connection, OptionalExtension, Result};

/// Ensure that the `log` table exists with the modern schema.
fn ensure_log_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS log (
            id        INTEGER PRIMARY KEY AUTOINCREMENT,
            date      TEXT NOT NULL,
            operation TEXT NOT NULL,
            target    TEXT DEFAULT '',
            message   TEXT NOT NULL
        );
        "#,
    )?;
    Ok(())
}

fn table_exists(conn: &Connection, name: &str) -> Result<bool> {
    let mut stmt =
        conn.prepare("SELECT name FROM sqlite_master WHERE type='table' AND name=?1")?;
    let exists: Option<String> = stmt.query_row([name], |row| row.get(0)).optional()?;
    Ok(exists.is_some())
}

/// Create the three attendance tables with the modern schema.
///
/// The punch-uniqueness key is `(user_id, timestamp)`: re-syncing the
/// device's full log must never duplicate a punch, so the constraint lives in
/// the store and the insert path treats a conflict as a benign skip.
fn create_attendance_tables(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            user_id    INTEGER PRIMARY KEY,
            name       TEXT,
            department TEXT,
            created_at TEXT NOT NULL,
            synced_at  TEXT
        );

        CREATE TABLE IF NOT EXISTS punches (
            id            INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id       INTEGER NOT NULL REFERENCES users(user_id),
            timestamp     TEXT NOT NULL,
            punch_type    INTEGER NOT NULL DEFAULT 0,
            verify_method INTEGER NOT NULL DEFAULT 0,
            synced_at     TEXT NOT NULL,
            UNIQUE (user_id, timestamp)
        );

        CREATE TABLE IF NOT EXISTS makeup_entries (
            id         INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id    INTEGER NOT NULL,
            date       TEXT NOT NULL,
            hours      REAL NOT NULL,
            note       TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            UNIQUE (user_id, date)
        );

        CREATE INDEX IF NOT EXISTS idx_punches_user_ts ON punches(user_id, timestamp);
        CREATE INDEX IF NOT EXISTS idx_makeup_user_date ON makeup_entries(user_id, date);
        "#,
    )?;
    Ok(())
}

/// Lift rows out of a legacy `attendance` table (pre-rename schema keyed on
/// `(user_id, timestamp, status)`) into `punches`, collapsing same-second
/// duplicates that the old triple key allowed.
fn migrate_legacy_attendance(conn: &Connection) -> Result<()> {
    let version = "20250604_0001_rekey_attendance_to_punches";

    // 1) Already applied?
    let mut chk = conn.prepare(
        "SELECT 1 FROM log
         WHERE operation = 'migration_applied' AND target = ?1
         LIMIT 1",
    )?;
    if chk.query_row([version], |_| Ok(())).optional()?.is_some() {
        return Ok(());
    }

    if !table_exists(conn, "attendance")? {
        return Ok(()); // fresh database, nothing to lift
    }

    conn.execute_batch(
        r#"
        BEGIN;

        INSERT OR IGNORE INTO users (user_id, created_at)
        SELECT DISTINCT user_id, datetime('now') FROM attendance;

        INSERT OR IGNORE INTO punches (user_id, timestamp, punch_type, synced_at)
        SELECT user_id, timestamp, status, datetime('now') FROM attendance;

        DROP TABLE attendance;

        COMMIT;
        "#,
    )?;

    // 3) Mark as applied
    conn.execute(
        "INSERT INTO log (date, operation, target, message)
         VALUES (datetime('now'), 'migration_applied', ?1, 'Rekeyed legacy attendance rows into punches')",
        [version],
    )?;

    success(format!(
        "Migration applied: {} → legacy attendance table rekeyed into punches",
        version
    ));

    Ok(())
}

/// Public entry point: run all pending migrations.
///
/// Invoked from db::init_db().
pub fn run_pending_migrations(conn: &Connection) -> Result<()> {
    // 1) Ensure log table
    ensure_log_table(conn)?;

    // 2) Ensure modern attendance schema
    create_attendance_tables(conn)?;

    // 3) Lift legacy data if present
    migrate_legacy_attendance(conn)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_schema_has_all_tables() {
        let conn = Connection::open_in_memory().unwrap();
        run_pending_migrations(&conn).unwrap();

        for t in ["users", "punches", "makeup_entries", "log"] {
            assert!(table_exists(&conn, t).unwrap(), "missing table {t}");
        }
    }

    #[test]
    fn legacy_attendance_rows_are_lifted_and_deduplicated() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            r#"
            CREATE TABLE attendance (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                timestamp TEXT NOT NULL,
                status INTEGER NOT NULL,
                synced_at TEXT,
                UNIQUE (user_id, timestamp, status)
            );
            INSERT INTO attendance (user_id, timestamp, status) VALUES
                (7, '2024-01-10 08:00:00', 0),
                (7, '2024-01-10 08:00:00', 1),
                (7, '2024-01-10 17:30:00', 1);
            "#,
        )
        .unwrap();

        run_pending_migrations(&conn).unwrap();

        // Same-second duplicate collapsed by the new (user_id, timestamp) key.
        let n: i64 = conn
            .query_row("SELECT COUNT(*) FROM punches", [], |r| r.get(0))
            .unwrap();
        assert_eq!(n, 2);
        assert!(!table_exists(&conn, "attendance").unwrap());

        // Running again is a no-op.
        run_pending_migrations(&conn).unwrap();
        let n: i64 = conn
            .query_row("SELECT COUNT(*) FROM punches", [], |r| r.get(0))
            .unwrap();
        assert_eq!(n, 2);
    }
}
