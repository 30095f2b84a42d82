use crate::db::pool::DbPool;
use crate::utils::colors::{CYAN, GREEN, GREY, RESET, YELLOW};
use rusqlite::OptionalExtension;
use std::fs;

pub fn print_db_info(pool: &mut DbPool, db_path: &str) -> rusqlite::Result<()> {
    println!();

    //
    // 1) FILE SIZE
    //
    let file_size = fs::metadata(db_path).map(|m| m.len()).unwrap_or(0);
    let file_mb = (file_size as f64) / (1024.0 * 1024.0);

    println!("{}• File:{} {}{}{}", CYAN, RESET, YELLOW, db_path, RESET);
    println!("{}• Size:{} {:.2} MB", CYAN, RESET, file_mb);

    //
    // 2) ROW COUNTS
    //
    let users: i64 = pool
        .conn
        .query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
    let punches: i64 = pool
        .conn
        .query_row("SELECT COUNT(*) FROM punches", [], |row| row.get(0))?;
    let makeup: i64 = pool
        .conn
        .query_row("SELECT COUNT(*) FROM makeup_entries", [], |row| row.get(0))?;

    println!("{}• Users:{} {}{}{}", CYAN, RESET, GREEN, users, RESET);
    println!("{}• Punches:{} {}{}{}", CYAN, RESET, GREEN, punches, RESET);
    println!("{}• Make-up entries:{} {}{}{}", CYAN, RESET, GREEN, makeup, RESET);

    //
    // 3) PUNCH DATE RANGE
    //
    let first: Option<String> = pool
        .conn
        .query_row(
            "SELECT date(timestamp) FROM punches ORDER BY timestamp ASC LIMIT 1",
            [],
            |row| row.get(0),
        )
        .optional()?;

    let last: Option<String> = pool
        .conn
        .query_row(
            "SELECT date(timestamp) FROM punches ORDER BY timestamp DESC LIMIT 1",
            [],
            |row| row.get(0),
        )
        .optional()?;

    let fmt_first = first.unwrap_or_else(|| format!("{GREY}--{RESET}"));
    let fmt_last = last.unwrap_or_else(|| format!("{GREY}--{RESET}"));

    println!("{}• Punch range:{}", CYAN, RESET);
    println!("    from: {}", fmt_first);
    println!("    to:   {}", fmt_last);

    //
    // 4) LAST SYNC
    //
    let last_sync: Option<String> = pool
        .conn
        .query_row(
            "SELECT date FROM log WHERE operation = 'sync' ORDER BY id DESC LIMIT 1",
            [],
            |row| row.get(0),
        )
        .optional()?;

    match last_sync {
        Some(ts) => println!("{}• Last sync:{} {}", CYAN, RESET, ts),
        None => println!("{}• Last sync:{} {GREY}never{RESET}", CYAN, RESET),
    }

    println!();
    Ok(())
}
