use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{StatusTally, distinct_dates, percentage};
use crate::model::attendance::AttendanceRecord;

/// Aggregate attendance across the whole record set.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct GlobalKpis {
    #[schema(example = 2)]
    pub days_tracked: u64,
    #[schema(example = 3)]
    pub present: u64,
    #[schema(example = 1)]
    pub absent: u64,
    #[schema(example = 1)]
    pub late: u64,
    #[schema(example = 4)]
    pub possible_attendance: u64,
    #[schema(example = 75.0)]
    pub attendance_rate: f64,
    #[schema(example = 33.33)]
    pub late_rate: f64,
}

/// `employee_count` is the active head count used as the per-day denominator.
pub fn compute_global_kpis(records: &[AttendanceRecord], employee_count: u64) -> GlobalKpis {
    let days_tracked = distinct_dates(records).len() as u64;
    let tally: StatusTally = records.iter().collect();
    let possible_attendance = employee_count * days_tracked;

    GlobalKpis {
        days_tracked,
        present: tally.present,
        absent: tally.absent,
        late: tally.late,
        possible_attendance,
        attendance_rate: percentage(tally.present, possible_attendance),
        late_rate: tally.late_rate(),
    }
}
