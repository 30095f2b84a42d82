use crate::errors::{AppError, AppResult};
use crate::models::filter::SummaryFilter;
use crate::models::makeup::MakeupEntry;
use crate::models::punch::Punch;
use crate::models::user::User;
use crate::utils::date::{format_timestamp, now_rfc3339, parse_date, parse_timestamp};
use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::{Connection, OptionalExtension, Result, Row, params};

// ---------------------------------------------------------------------------
// Row mapping
// ---------------------------------------------------------------------------

pub fn map_user_row(row: &Row) -> Result<User> {
    Ok(User {
        user_id: row.get("user_id")?,
        name: row.get("name")?,
        department: row.get("department")?,
        created_at: row.get("created_at")?,
        synced_at: row.get("synced_at")?,
    })
}

pub fn map_punch_row(row: &Row) -> Result<Punch> {
    let ts_str: String = row.get("timestamp")?;
    let timestamp = parse_timestamp(&ts_str).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            0,
            rusqlite::types::Type::Text,
            Box::new(AppError::InvalidDate(ts_str.clone())),
        )
    })?;

    Ok(Punch {
        id: row.get("id")?,
        user_id: row.get("user_id")?,
        timestamp,
        punch_type: row.get("punch_type")?,
        verify_method: row.get("verify_method")?,
        synced_at: row.get("synced_at")?,
    })
}

pub fn map_makeup_row(row: &Row) -> Result<MakeupEntry> {
    let date_str: String = row.get("date")?;
    let date = parse_date(&date_str).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            0,
            rusqlite::types::Type::Text,
            Box::new(AppError::InvalidDate(date_str.clone())),
        )
    })?;

    Ok(MakeupEntry {
        id: row.get("id")?,
        user_id: row.get("user_id")?,
        date,
        hours: row.get("hours")?,
        note: row.get("note")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// Roster-driven upsert used by sync.
///
/// New user → inserted with the device name. Existing user → `name` is filled
/// only when still NULL (local enrichment wins) and `synced_at` is refreshed.
/// Returns true when a new row was created.
pub fn upsert_roster_user(conn: &Connection, user_id: i64, name: Option<&str>) -> AppResult<bool> {
    let now = now_rfc3339();
    let added = conn.execute(
        "INSERT OR IGNORE INTO users (user_id, name, created_at, synced_at)
         VALUES (?1, ?2, ?3, ?3)",
        params![user_id, name, now],
    )? > 0;

    if !added {
        conn.execute(
            "UPDATE users
             SET name = COALESCE(name, ?2),
                 synced_at = ?3
             WHERE user_id = ?1",
            params![user_id, name, now],
        )?;
    }

    Ok(added)
}

/// Create a minimal placeholder row so an orphan punch is never dropped for
/// lack of a user record. Returns true when a new row was created.
pub fn ensure_user(conn: &Connection, user_id: i64) -> AppResult<bool> {
    let added = conn.execute(
        "INSERT OR IGNORE INTO users (user_id, created_at) VALUES (?1, ?2)",
        params![user_id, now_rfc3339()],
    )? > 0;
    Ok(added)
}

/// Manual edit from the `users set` command: the one writer allowed to
/// overwrite enrichment fields. Creates the row when missing.
pub fn set_user_fields(
    conn: &Connection,
    user_id: i64,
    name: Option<&str>,
    department: Option<&str>,
) -> AppResult<()> {
    conn.execute(
        "INSERT OR IGNORE INTO users (user_id, created_at) VALUES (?1, ?2)",
        params![user_id, now_rfc3339()],
    )?;
    conn.execute(
        "UPDATE users
         SET name = COALESCE(?2, name),
             department = COALESCE(?3, department)
         WHERE user_id = ?1",
        params![user_id, name, department],
    )?;
    Ok(())
}

pub fn get_user(conn: &Connection, user_id: i64) -> AppResult<Option<User>> {
    let mut stmt = conn.prepare("SELECT * FROM users WHERE user_id = ?1")?;
    Ok(stmt.query_row([user_id], map_user_row).optional()?)
}

pub fn list_users(conn: &Connection) -> AppResult<Vec<User>> {
    let mut stmt = conn.prepare("SELECT * FROM users ORDER BY user_id ASC")?;
    let rows = stmt.query_map([], map_user_row)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

/// Remove a user and related punches/make-up entries.
pub fn delete_user(conn: &Connection, user_id: i64) -> AppResult<()> {
    conn.execute("DELETE FROM punches WHERE user_id = ?1", [user_id])?;
    conn.execute("DELETE FROM makeup_entries WHERE user_id = ?1", [user_id])?;
    conn.execute("DELETE FROM users WHERE user_id = ?1", [user_id])?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Punches
// ---------------------------------------------------------------------------

/// Insert a punch keyed on `(user_id, timestamp)`.
///
/// The UNIQUE constraint is the arbiter: a conflict means the punch is
/// already stored (or a concurrent sync won the race) and is reported as a
/// skip, not an error.
pub fn insert_punch(
    conn: &Connection,
    user_id: i64,
    timestamp: &NaiveDateTime,
    punch_type: i64,
    verify_method: i64,
) -> AppResult<bool> {
    let inserted = conn.execute(
        "INSERT OR IGNORE INTO punches (user_id, timestamp, punch_type, verify_method, synced_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            user_id,
            format_timestamp(timestamp),
            punch_type,
            verify_method,
            now_rfc3339(),
        ],
    )? > 0;
    Ok(inserted)
}

/// Load punches constrained by the optional filter, ordered by timestamp.
pub fn load_punches(conn: &Connection, filter: &SummaryFilter) -> AppResult<Vec<Punch>> {
    let mut sql = String::from("SELECT * FROM punches");
    let mut clauses: Vec<&str> = Vec::new();
    let mut args: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

    if let Some(user_id) = filter.user_id {
        clauses.push("user_id = ?");
        args.push(Box::new(user_id));
    }
    if let Some(from) = filter.date_from {
        clauses.push("date(timestamp) >= date(?)");
        args.push(Box::new(from.format("%Y-%m-%d").to_string()));
    }
    if let Some(to) = filter.date_to {
        clauses.push("date(timestamp) <= date(?)");
        args.push(Box::new(to.format("%Y-%m-%d").to_string()));
    }

    if !clauses.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&clauses.join(" AND "));
    }
    sql.push_str(" ORDER BY timestamp ASC");

    let mut stmt = conn.prepare(&sql)?;
    let params_ref: Vec<&dyn rusqlite::ToSql> = args.iter().map(|b| b.as_ref()).collect();
    let rows = stmt.query_map(rusqlite::params_from_iter(params_ref), map_punch_row)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

// ---------------------------------------------------------------------------
// Make-up entries
// ---------------------------------------------------------------------------

/// Create or replace the make-up entry for the given user/date.
pub fn set_makeup(
    conn: &Connection,
    user_id: i64,
    date: NaiveDate,
    hours: f64,
    note: Option<&str>,
) -> AppResult<()> {
    let now = now_rfc3339();
    conn.execute(
        "INSERT INTO makeup_entries (user_id, date, hours, note, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?5)
         ON CONFLICT(user_id, date)
         DO UPDATE SET
             hours = excluded.hours,
             note = excluded.note,
             updated_at = excluded.updated_at",
        params![
            user_id,
            date.format("%Y-%m-%d").to_string(),
            hours,
            note,
            now
        ],
    )?;
    Ok(())
}

/// Returns true when an entry existed and was removed.
pub fn delete_makeup(conn: &Connection, user_id: i64, date: NaiveDate) -> AppResult<bool> {
    let n = conn.execute(
        "DELETE FROM makeup_entries WHERE user_id = ?1 AND date = ?2",
        params![user_id, date.format("%Y-%m-%d").to_string()],
    )?;
    Ok(n > 0)
}

/// Load make-up entries constrained by the optional filter, ordered by date.
pub fn load_makeup(conn: &Connection, filter: &SummaryFilter) -> AppResult<Vec<MakeupEntry>> {
    let mut sql = String::from("SELECT * FROM makeup_entries");
    let mut clauses: Vec<&str> = Vec::new();
    let mut args: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

    if let Some(user_id) = filter.user_id {
        clauses.push("user_id = ?");
        args.push(Box::new(user_id));
    }
    if let Some(from) = filter.date_from {
        clauses.push("date >= date(?)");
        args.push(Box::new(from.format("%Y-%m-%d").to_string()));
    }
    if let Some(to) = filter.date_to {
        clauses.push("date <= date(?)");
        args.push(Box::new(to.format("%Y-%m-%d").to_string()));
    }

    if !clauses.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&clauses.join(" AND "));
    }
    sql.push_str(" ORDER BY date ASC, user_id ASC");

    let mut stmt = conn.prepare(&sql)?;
    let params_ref: Vec<&dyn rusqlite::ToSql> = args.iter().map(|b| b.as_ref()).collect();
    let rows = stmt.query_map(rusqlite::params_from_iter(params_ref), map_makeup_row)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::initialize::init_db;

    fn test_conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        init_db(&conn).unwrap();
        conn
    }

    fn ts(s: &str) -> NaiveDateTime {
        parse_timestamp(s).unwrap()
    }

    #[test]
    fn punch_insert_is_deduplicating() {
        let conn = test_conn();
        ensure_user(&conn, 1).unwrap();

        assert!(insert_punch(&conn, 1, &ts("2024-01-10 08:00:00"), 0, 1).unwrap());
        assert!(!insert_punch(&conn, 1, &ts("2024-01-10 08:00:00"), 0, 1).unwrap());
        // Same instant for another user is a different punch.
        ensure_user(&conn, 2).unwrap();
        assert!(insert_punch(&conn, 2, &ts("2024-01-10 08:00:00"), 0, 1).unwrap());
    }

    #[test]
    fn roster_upsert_preserves_local_name() {
        let conn = test_conn();

        assert!(upsert_roster_user(&conn, 5, Some("device name")).unwrap());
        set_user_fields(&conn, 5, Some("Alice"), Some("QA")).unwrap();

        // Device now reports a different name; the local edit must survive.
        assert!(!upsert_roster_user(&conn, 5, Some("other name")).unwrap());
        let u = get_user(&conn, 5).unwrap().unwrap();
        assert_eq!(u.name.as_deref(), Some("Alice"));
        assert_eq!(u.department.as_deref(), Some("QA"));
    }

    #[test]
    fn roster_upsert_fills_placeholder_name() {
        let conn = test_conn();

        ensure_user(&conn, 9).unwrap();
        assert!(!upsert_roster_user(&conn, 9, Some("Bob")).unwrap());
        let u = get_user(&conn, 9).unwrap().unwrap();
        assert_eq!(u.name.as_deref(), Some("Bob"));
    }

    #[test]
    fn makeup_set_replaces_existing_entry() {
        let conn = test_conn();
        let d = parse_date("2024-01-10").unwrap();

        set_makeup(&conn, 1, d, 2.0, Some("forgot badge")).unwrap();
        set_makeup(&conn, 1, d, -1.0, None).unwrap();

        let entries = load_makeup(&conn, &SummaryFilter::default()).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].hours, -1.0);
        assert!(entries[0].note.is_none());

        assert!(delete_makeup(&conn, 1, d).unwrap());
        assert!(!delete_makeup(&conn, 1, d).unwrap());
    }

    #[test]
    fn punch_filter_is_inclusive_on_both_ends() {
        let conn = test_conn();
        ensure_user(&conn, 1).unwrap();
        insert_punch(&conn, 1, &ts("2024-01-09 23:59:59"), 0, 0).unwrap();
        insert_punch(&conn, 1, &ts("2024-01-10 08:00:00"), 0, 0).unwrap();
        insert_punch(&conn, 1, &ts("2024-01-10 17:30:00"), 0, 0).unwrap();
        insert_punch(&conn, 1, &ts("2024-01-11 00:00:00"), 0, 0).unwrap();

        let d = parse_date("2024-01-10").unwrap();
        let filter = SummaryFilter {
            date_from: Some(d),
            date_to: Some(d),
            ..Default::default()
        };
        let punches = load_punches(&conn, &filter).unwrap();
        assert_eq!(punches.len(), 2);
        assert!(punches.iter().all(|p| p.date() == d));
    }

    #[test]
    fn delete_user_cascades() {
        let conn = test_conn();
        ensure_user(&conn, 3).unwrap();
        insert_punch(&conn, 3, &ts("2024-01-10 08:00:00"), 0, 0).unwrap();
        set_makeup(&conn, 3, parse_date("2024-01-10").unwrap(), 1.0, None).unwrap();

        delete_user(&conn, 3).unwrap();

        assert!(get_user(&conn, 3).unwrap().is_none());
        assert!(load_punches(&conn, &SummaryFilter::default()).unwrap().is_empty());
        assert!(load_makeup(&conn, &SummaryFilter::default()).unwrap().is_empty());
    }
}
