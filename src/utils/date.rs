use chrono::{Local, NaiveDate, NaiveDateTime};

pub fn now_rfc3339() -> String {
    Local::now().to_rfc3339()
}

pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

/// Punch timestamps are stored as `YYYY-MM-DD HH:MM:SS` text so SQLite's
/// `date()` and lexicographic ordering both work on them.
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").ok()
}

pub fn format_timestamp(ts: &NaiveDateTime) -> String {
    ts.format("%Y-%m-%d %H:%M:%S").to_string()
}
