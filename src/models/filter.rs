use crate::errors::{AppError, AppResult};
use chrono::NaiveDate;

/// Optional constraints for summary/export queries.
/// Date bounds are inclusive on both ends; an absent field means unbounded on
/// that side.
#[derive(Debug, Clone, Default)]
pub struct SummaryFilter {
    pub user_id: Option<i64>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

impl SummaryFilter {
    /// Reject inverted ranges at the boundary so the aggregator never sees
    /// them.
    pub fn validate(&self) -> AppResult<()> {
        if let (Some(from), Some(to)) = (self.date_from, self.date_to)
            && to < from
        {
            return Err(AppError::InvalidRange(format!(
                "end date {} is before start date {}",
                to, from
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn inverted_range_is_rejected() {
        let f = SummaryFilter {
            date_from: Some(d("2024-02-01")),
            date_to: Some(d("2024-01-01")),
            ..Default::default()
        };
        assert!(f.validate().is_err());
    }

    #[test]
    fn single_day_range_is_valid() {
        let f = SummaryFilter {
            date_from: Some(d("2024-01-10")),
            date_to: Some(d("2024-01-10")),
            ..Default::default()
        };
        f.validate().unwrap();
    }

    #[test]
    fn open_bounds_are_valid() {
        SummaryFilter::default().validate().unwrap();

        let f = SummaryFilter {
            date_from: Some(d("2024-01-10")),
            ..Default::default()
        };
        f.validate().unwrap();
    }
}
