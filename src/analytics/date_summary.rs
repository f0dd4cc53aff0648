use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{StatusTally, percentage};
use crate::model::attendance::AttendanceRecord;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DateSummary {
    #[schema(example = "2026-01-05", value_type = String, format = "date")]
    pub date: NaiveDate,
    pub present: u64,
    pub absent: u64,
    pub late: u64,
    #[schema(example = 80.0)]
    pub attendance_rate: f64,
}

/// Per-date counts, most recent date first.
///
/// Only the records present for a date are counted; missing employees are
/// not inferred absent here.
pub fn compute_date_summaries(
    records: &[AttendanceRecord],
    employee_count: u64,
) -> Vec<DateSummary> {
    let mut by_date: BTreeMap<NaiveDate, StatusTally> = BTreeMap::new();
    for record in records {
        by_date.entry(record.date).or_default().add(record.status);
    }

    by_date
        .into_iter()
        .rev()
        .map(|(date, tally)| DateSummary {
            date,
            present: tally.present,
            absent: tally.absent,
            late: tally.late,
            attendance_rate: percentage(tally.present, employee_count),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::attendance::AttendanceStatus::*;

    fn d(month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, month, day).unwrap()
    }

    #[test]
    fn ordered_most_recent_first() {
        let records = vec![
            AttendanceRecord::new(d(1, 5), "e1", Present),
            AttendanceRecord::new(d(3, 1), "e1", Present),
            AttendanceRecord::new(d(2, 9), "e1", Absent),
        ];

        let dates: Vec<_> = compute_date_summaries(&records, 1)
            .into_iter()
            .map(|s| s.date)
            .collect();

        assert_eq!(dates, [d(3, 1), d(2, 9), d(1, 5)]);
    }

    #[test]
    fn partial_day_counts_only_recorded_employees() {
        let records = vec![
            AttendanceRecord::new(d(1, 5), "e1", Present),
            AttendanceRecord::new(d(1, 5), "e2", Late),
        ];

        let summaries = compute_date_summaries(&records, 3);

        assert_eq!(summaries.len(), 1);
        let day = &summaries[0];
        assert_eq!((day.present, day.absent, day.late), (2, 0, 1));
        assert_eq!(day.attendance_rate, 66.67);
    }

    #[test]
    fn zero_employees_gives_zero_rate() {
        let records = vec![AttendanceRecord::new(d(1, 5), "e1", Present)];
        assert_eq!(compute_date_summaries(&records, 0)[0].attendance_rate, 0.0);
        assert!(compute_date_summaries(&[], 0).is_empty());
    }
}
