use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{AnalyticsError, StatusTally, percentage};
use crate::model::attendance::{AttendanceRecord, AttendanceStatus};
use crate::model::employee::Employee;

/// One cell of the month grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DayCell {
    /// No meeting took place; never counted.
    NotTracked,
    /// Meeting day with a status. `inferred` marks an absence filled in for a
    /// missing record.
    Marked {
        status: AttendanceStatus,
        inferred: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MonthlyEmployeeRow {
    pub employee: Employee,
    /// `cells[day - 1]` for every day of the month.
    #[schema(value_type = Vec<Object>)]
    pub cells: Vec<DayCell>,
    pub present: u64,
    /// Meeting days minus present days. Signed so that
    /// `present + absent == total_meeting_days` always holds.
    pub absent: i64,
    pub late: u64,
    pub attendance_rate: f64,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MonthlyKpis {
    pub total_meeting_days: u64,
    pub total_present: u64,
    pub total_absent: i64,
    pub total_late: u64,
    pub overall_attendance_rate: f64,
    pub overall_late_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MonthlyMatrix {
    pub year: i32,
    pub month: u32,
    pub days_in_month: u32,
    /// Days of the month (1-based) that had a meeting, ascending.
    pub meeting_days: Vec<u32>,
    pub rows: Vec<MonthlyEmployeeRow>,
    pub kpis: MonthlyKpis,
}

/// First and last day of a calendar month.
pub fn month_bounds(year: i32, month: u32) -> Result<(NaiveDate, NaiveDate), AnalyticsError> {
    let invalid = || AnalyticsError::InvalidMonth { year, month };

    let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)?;
    let last = first
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .ok_or_else(invalid)?;

    Ok((first, last))
}

/// Builds the employee x day grid for one month.
///
/// `meeting_days` may span any range; only those inside the month count.
/// A meeting day without a record for an employee is inferred absent for
/// that employee. Records outside the month are ignored entirely.
pub fn compute_monthly_matrix(
    year: i32,
    month: u32,
    records: &[AttendanceRecord],
    meeting_days: &[NaiveDate],
    roster: &[Employee],
) -> Result<MonthlyMatrix, AnalyticsError> {
    let (first, last) = month_bounds(year, month)?;
    let in_month = |date: &NaiveDate| *date >= first && *date <= last;

    let meeting: BTreeSet<u32> = meeting_days
        .iter()
        .filter(|d| in_month(d))
        .map(|d| d.day())
        .collect();
    let meeting_count = meeting.len() as u64;

    let mut by_employee: HashMap<&str, Vec<&AttendanceRecord>> = HashMap::new();
    for record in records.iter().filter(|r| in_month(&r.date)) {
        by_employee
            .entry(record.employee_id.as_str())
            .or_default()
            .push(record);
    }

    let rows: Vec<MonthlyEmployeeRow> = roster
        .iter()
        .map(|employee| {
            let own = by_employee
                .get(employee.id.as_str())
                .map(Vec::as_slice)
                .unwrap_or_default();
            build_row(employee, own, &meeting, last.day())
        })
        .collect();

    let mut kpis = MonthlyKpis {
        total_meeting_days: meeting_count,
        ..MonthlyKpis::default()
    };
    for row in &rows {
        kpis.total_present += row.present;
        kpis.total_absent += row.absent;
        kpis.total_late += row.late;
    }
    kpis.overall_attendance_rate =
        percentage(kpis.total_present, meeting_count * roster.len() as u64);
    kpis.overall_late_rate = percentage(kpis.total_late, kpis.total_present);

    Ok(MonthlyMatrix {
        year,
        month,
        days_in_month: last.day(),
        meeting_days: meeting.into_iter().collect(),
        rows,
        kpis,
    })
}

fn build_row(
    employee: &Employee,
    records: &[&AttendanceRecord],
    meeting: &BTreeSet<u32>,
    days_in_month: u32,
) -> MonthlyEmployeeRow {
    let mut statuses: BTreeMap<u32, (AttendanceStatus, bool)> = records
        .iter()
        .map(|r| (r.date.day(), (r.status, false)))
        .collect();

    // Absence inference: a meeting day with no record is an absence.
    for day in meeting {
        statuses.entry(*day).or_insert((AttendanceStatus::Absent, true));
    }

    let cells = (1..=days_in_month)
        .map(|day| match statuses.get(&day) {
            Some(&(status, inferred)) if meeting.contains(&day) => DayCell::Marked { status, inferred },
            _ => DayCell::NotTracked,
        })
        .collect();

    let tally: StatusTally = records.iter().copied().collect();
    let meeting_count = meeting.len() as u64;

    MonthlyEmployeeRow {
        employee: employee.clone(),
        cells,
        present: tally.present,
        absent: meeting_count as i64 - tally.present as i64,
        late: tally.late,
        attendance_rate: percentage(tally.present, meeting_count),
    }
}
