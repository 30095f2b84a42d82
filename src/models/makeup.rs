use chrono::NaiveDate;
use serde::Serialize;

/// A manual hour adjustment for one user-day.
///
/// Hours are signed: a negative entry corrects over-counted time. At most one
/// entry exists per (user, date); `makeup set` replaces. Only the `makeup`
/// commands touch this table, sync never does.
#[derive(Debug, Clone, Serialize)]
pub struct MakeupEntry {
    pub id: i64,
    pub user_id: i64,
    pub date: NaiveDate,
    pub hours: f64,
    pub note: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}
