use crate::models::day_summary::DaySummary;
use serde::Serialize;

/// Flat, stringly row for the export writers.
#[derive(Serialize, Clone, Debug)]
pub struct SummaryExport {
    pub user_id: i64,
    pub name: String,
    pub department: String,
    pub date: String,
    pub first_punch: String,
    pub last_punch: String,
    pub worked_hours: f64,
    pub makeup_hours: f64,
    pub total_hours: f64,
    pub note: String,
}

impl From<&DaySummary> for SummaryExport {
    fn from(s: &DaySummary) -> Self {
        SummaryExport {
            user_id: s.user_id,
            name: s.name.clone().unwrap_or_default(),
            department: s.department.clone().unwrap_or_default(),
            date: s.date.format("%Y-%m-%d").to_string(),
            first_punch: s
                .first_punch
                .map(|t| t.format("%H:%M:%S").to_string())
                .unwrap_or_default(),
            last_punch: s
                .last_punch
                .map(|t| t.format("%H:%M:%S").to_string())
                .unwrap_or_default(),
            worked_hours: s.worked_hours,
            makeup_hours: s.makeup_hours,
            total_hours: s.total_hours,
            note: s.makeup_note.clone().unwrap_or_default(),
        }
    }
}

/// Header for CSV / JSON / XLSX
pub(crate) fn get_headers() -> Vec<&'static str> {
    vec![
        "user_id",
        "name",
        "department",
        "date",
        "first_punch",
        "last_punch",
        "worked_hours",
        "makeup_hours",
        "total_hours",
        "note",
    ]
}

/// One summary as a row of display strings.
pub(crate) fn summary_to_row(s: &SummaryExport) -> Vec<String> {
    vec![
        s.user_id.to_string(),
        s.name.clone(),
        s.department.clone(),
        s.date.clone(),
        s.first_punch.clone(),
        s.last_punch.clone(),
        format!("{:.2}", s.worked_hours),
        format!("{:.2}", s.makeup_hours),
        format!("{:.2}", s.total_hours),
        s.note.clone(),
    ]
}
