//! Attendance KPI aggregation.
//!
//! Every function here is a pure reduction over an immutable snapshot of
//! attendance records, meeting days and the roster. Callers recompute on
//! every data refresh; nothing is patched incrementally.
//!
//! Precondition for all operations: at most one record per
//! `(date, employee_id)`. Use [`dedupe_records`] first when that cannot be
//! guaranteed upstream.

pub mod date_summary;
pub mod employee_summary;
pub mod error;
pub mod kpi;
pub mod monthly;

use std::collections::{BTreeSet, HashMap};

use chrono::NaiveDate;

use crate::model::attendance::{AttendanceRecord, AttendanceStatus};

pub use date_summary::{DateSummary, compute_date_summaries};
pub use employee_summary::{EmployeeSummary, compute_employee_summaries};
pub use error::AnalyticsError;
pub use kpi::{GlobalKpis, compute_global_kpis};
pub use monthly::{DayCell, MonthlyEmployeeRow, MonthlyKpis, MonthlyMatrix, compute_monthly_matrix};

/// `numerator / denominator` as a percentage rounded half up to two decimals.
/// A zero denominator yields `0.0`.
pub fn percentage(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        return 0.0;
    }
    ((numerator as f64 / denominator as f64) * 10_000.0).round() / 100.0
}

/// Distinct dates present in `records`.
pub fn distinct_dates(records: &[AttendanceRecord]) -> BTreeSet<NaiveDate> {
    records.iter().map(|r| r.date).collect()
}

/// Drops duplicate `(date, employee_id)` records. The last occurrence wins and
/// keeps the position of the first one.
pub fn dedupe_records(records: &[AttendanceRecord]) -> Vec<AttendanceRecord> {
    let mut index: HashMap<(NaiveDate, &str), usize> = HashMap::with_capacity(records.len());
    let mut out: Vec<AttendanceRecord> = Vec::with_capacity(records.len());

    for record in records {
        match index.get(&(record.date, record.employee_id.as_str())) {
            Some(&pos) => out[pos] = record.clone(),
            None => {
                index.insert((record.date, record.employee_id.as_str()), out.len());
                out.push(record.clone());
            }
        }
    }

    out
}

/// Present/absent/late counts over a set of records.
///
/// `present` includes late records.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StatusTally {
    pub present: u64,
    pub absent: u64,
    pub late: u64,
}

impl StatusTally {
    pub fn add(&mut self, status: AttendanceStatus) {
        if status.is_attended() {
            self.present += 1;
        }
        if status.is_late() {
            self.late += 1;
        }
        if status == AttendanceStatus::Absent {
            self.absent += 1;
        }
    }

    pub fn late_rate(&self) -> f64 {
        percentage(self.late, self.present)
    }
}

impl<'a> FromIterator<&'a AttendanceRecord> for StatusTally {
    fn from_iter<I: IntoIterator<Item = &'a AttendanceRecord>>(iter: I) -> Self {
        let mut tally = StatusTally::default();
        for record in iter {
            tally.add(record.status);
        }
        tally
    }
}

/// Keeps only records whose date falls in `start..=end`.
pub fn filter_range(
    records: &[AttendanceRecord],
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Vec<AttendanceRecord> {
    records
        .iter()
        .filter(|r| start.is_none_or(|s| r.date >= s) && end.is_none_or(|e| r.date <= e))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use AttendanceStatus::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, day).unwrap()
    }

    #[test]
    fn percentage_rounds_to_two_decimals() {
        assert_eq!(percentage(1, 3), 33.33);
        assert_eq!(percentage(2, 3), 66.67);
        assert_eq!(percentage(3, 4), 75.0);
        assert_eq!(percentage(1, 8), 12.5);
        assert_eq!(percentage(5, 5), 100.0);
    }

    #[test]
    fn percentage_of_zero_denominator_is_zero() {
        assert_eq!(percentage(0, 0), 0.0);
        assert_eq!(percentage(7, 0), 0.0);
    }

    #[test]
    fn percentage_rounds_half_up() {
        // 1/16 = 6.25%, 1/32 = 3.125% -> 3.13
        assert_eq!(percentage(1, 16), 6.25);
        assert_eq!(percentage(1, 32), 3.13);
    }

    #[test]
    fn tally_counts_late_as_present() {
        let records = vec![
            AttendanceRecord::new(d(1), "e1", Present),
            AttendanceRecord::new(d(1), "e2", Late),
            AttendanceRecord::new(d(1), "e3", Absent),
        ];
        let tally: StatusTally = records.iter().collect();

        assert_eq!(tally, StatusTally { present: 2, absent: 1, late: 1 });
        assert_eq!(tally.late_rate(), 50.0);
    }

    #[test]
    fn dedupe_keeps_last_seen_in_first_position() {
        let records = vec![
            AttendanceRecord::new(d(1), "e1", Absent),
            AttendanceRecord::new(d(1), "e2", Present),
            AttendanceRecord::new(d(1), "e1", Late),
            AttendanceRecord::new(d(2), "e1", Present),
        ];

        let deduped = dedupe_records(&records);

        assert_eq!(
            deduped,
            vec![
                AttendanceRecord::new(d(1), "e1", Late),
                AttendanceRecord::new(d(1), "e2", Present),
                AttendanceRecord::new(d(2), "e1", Present),
            ]
        );
    }

    #[test]
    fn filter_range_is_inclusive() {
        let records = vec![
            AttendanceRecord::new(d(1), "e1", Present),
            AttendanceRecord::new(d(2), "e1", Present),
            AttendanceRecord::new(d(3), "e1", Present),
        ];

        let filtered = filter_range(&records, Some(d(2)), Some(d(3)));
        assert_eq!(filtered.len(), 2);
        assert_eq!(filter_range(&records, None, None).len(), 3);
        assert_eq!(filter_range(&records, None, Some(d(1))).len(), 1);
    }
}
