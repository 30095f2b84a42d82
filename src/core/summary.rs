//! Attendance aggregator: stored punches + make-up entries → per-user,
//! per-day summaries.

use crate::db::pool::DbPool;
use crate::db::queries::{list_users, load_makeup, load_punches};
use crate::errors::AppResult;
use crate::models::day_summary::DaySummary;
use crate::models::filter::SummaryFilter;
use chrono::{NaiveDate, NaiveDateTime};
use std::collections::{BTreeMap, HashMap};

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

pub struct SummaryLogic;

impl SummaryLogic {
    /// Compute summaries for the given filter.
    ///
    /// Grouping key is (date, user id), which also fixes the output order:
    /// date ascending, then user id — the dashboard and the exports rely on
    /// that determinism. A day holding only a make-up entry still produces a
    /// row; a day with a single punch reports zero worked hours.
    pub fn summarize(pool: &mut DbPool, filter: &SummaryFilter) -> AppResult<Vec<DaySummary>> {
        filter.validate()?;

        let punches = load_punches(&pool.conn, filter)?;
        let makeup = load_makeup(&pool.conn, filter)?;
        let users = list_users(&pool.conn)?;

        let user_meta: HashMap<i64, (Option<String>, Option<String>)> = users
            .into_iter()
            .map(|u| (u.user_id, (u.name, u.department)))
            .collect();

        // First/last punch per (date, user).
        let mut spans: BTreeMap<(NaiveDate, i64), (NaiveDateTime, NaiveDateTime)> =
            BTreeMap::new();
        for p in &punches {
            let key = (p.date(), p.user_id);
            spans
                .entry(key)
                .and_modify(|(first, last)| {
                    if p.timestamp < *first {
                        *first = p.timestamp;
                    }
                    if p.timestamp > *last {
                        *last = p.timestamp;
                    }
                })
                .or_insert((p.timestamp, p.timestamp));
        }

        // Make-up lookup, plus rows for days that only carry an adjustment.
        let mut adjustments: HashMap<(NaiveDate, i64), (f64, Option<String>)> = HashMap::new();
        let mut day_keys: BTreeMap<(NaiveDate, i64), ()> =
            spans.keys().map(|k| (*k, ())).collect();
        for entry in makeup {
            let key = (entry.date, entry.user_id);
            adjustments.insert(key, (entry.hours, entry.note));
            day_keys.insert(key, ());
        }

        let mut out = Vec::with_capacity(day_keys.len());
        for (date, user_id) in day_keys.into_keys() {
            let span = spans.get(&(date, user_id));
            let worked_hours = match span {
                Some((first, last)) => {
                    round2((*last - *first).num_seconds() as f64 / 3600.0)
                }
                None => 0.0,
            };

            let (makeup_hours, makeup_note) = adjustments
                .remove(&(date, user_id))
                .unwrap_or((0.0, None));

            let (name, department) = user_meta
                .get(&user_id)
                .cloned()
                .unwrap_or((None, None));

            out.push(DaySummary {
                user_id,
                name,
                department,
                date,
                first_punch: span.map(|(first, _)| *first),
                last_punch: span.map(|(_, last)| *last),
                worked_hours,
                makeup_hours: round2(makeup_hours),
                makeup_note,
                total_hours: round2((worked_hours + makeup_hours).max(0.0)),
            });
        }

        Ok(out)
    }
}
