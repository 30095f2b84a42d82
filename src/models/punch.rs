use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

/// A single clock event pulled from the terminal.
/// Created only by sync, immutable afterwards; `(user_id, timestamp)` is
/// unique in the store.
#[derive(Debug, Clone, Serialize)]
pub struct Punch {
    pub id: i64,
    pub user_id: i64,
    pub timestamp: NaiveDateTime, // ⇔ punches.timestamp (TEXT "YYYY-MM-DD HH:MM:SS")
    pub punch_type: i64,          // ⇔ punches.punch_type (device-reported, informational)
    pub verify_method: i64,       // ⇔ punches.verify_method (fingerprint/card/pin code)
    pub synced_at: String,        // ⇔ punches.synced_at (TEXT, ISO8601)
}

impl Punch {
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }
}
