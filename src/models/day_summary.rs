use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

/// Computed attendance for one (user, calendar day).
///
/// `worked_hours` is the span between the earliest and latest punch of the
/// day; a day with a single punch yields zero, which the caller surfaces as a
/// data-quality hint rather than an error. `total_hours` never goes below
/// zero even when a negative make-up entry outweighs the worked time.
#[derive(Debug, Clone, Serialize)]
pub struct DaySummary {
    pub user_id: i64,
    pub name: Option<String>,
    pub department: Option<String>,
    pub date: NaiveDate,
    pub first_punch: Option<NaiveDateTime>,
    pub last_punch: Option<NaiveDateTime>,
    pub worked_hours: f64,
    pub makeup_hours: f64,
    pub makeup_note: Option<String>,
    pub total_hours: f64,
}

impl DaySummary {
    /// True when the day has no usable in/out pair.
    pub fn missing_pair(&self) -> bool {
        self.first_punch.is_none() || self.first_punch == self.last_punch
    }
}
