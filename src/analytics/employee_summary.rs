use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{StatusTally, distinct_dates, percentage};
use crate::model::attendance::AttendanceRecord;
use crate::model::employee::Employee;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct EmployeeSummary {
    pub employee: Employee,
    pub present: u64,
    pub absent: u64,
    pub late: u64,
    #[schema(example = 66.67)]
    pub attendance_rate: f64,
    #[schema(example = 50.0)]
    pub late_rate: f64,
}

/// One summary per roster employee, in roster order.
///
/// The attendance rate is measured against the number of distinct dates in
/// the whole record set, not only the dates this employee has records for.
pub fn compute_employee_summaries(
    records: &[AttendanceRecord],
    roster: &[Employee],
) -> Vec<EmployeeSummary> {
    let days_tracked = distinct_dates(records).len() as u64;

    let mut by_employee: HashMap<&str, StatusTally> = HashMap::new();
    for record in records {
        by_employee
            .entry(record.employee_id.as_str())
            .or_default()
            .add(record.status);
    }

    roster
        .iter()
        .map(|employee| {
            let tally = by_employee
                .get(employee.id.as_str())
                .copied()
                .unwrap_or_default();

            EmployeeSummary {
                employee: employee.clone(),
                present: tally.present,
                absent: tally.absent,
                late: tally.late,
                attendance_rate: percentage(tally.present, days_tracked),
                late_rate: tally.late_rate(),
            }
        })
        .collect()
}
