use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

use crate::analytics::error::AnalyticsError;

/// Status of one employee on one meeting day.
///
/// `Late` counts as attended for attendance rates and is tallied separately
/// for lateness rates.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    ToSchema,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AttendanceStatus {
    Present,
    Absent,
    Late,
}

impl AttendanceStatus {
    /// Present and late both count towards attendance.
    #[inline]
    pub fn is_attended(self) -> bool {
        matches!(self, AttendanceStatus::Present | AttendanceStatus::Late)
    }

    #[inline]
    pub fn is_late(self) -> bool {
        self == AttendanceStatus::Late
    }
}

/// One employee's recorded status for one meeting day, as consumed by the
/// analytics engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AttendanceRecord {
    #[schema(example = "2026-01-05", value_type = String, format = "date")]
    pub date: NaiveDate,

    #[schema(example = "6f1c2f3e-0d4b-4f8e-9d0a-3c2b1a0f9e8d")]
    pub employee_id: String,

    pub status: AttendanceStatus,
}

impl AttendanceRecord {
    pub fn new(date: NaiveDate, employee_id: impl Into<String>, status: AttendanceStatus) -> Self {
        Self {
            date,
            employee_id: employee_id.into(),
            status,
        }
    }
}

/// Row of `meeting_attendance` with the status still as stored text.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AttendanceRow {
    pub id: String,
    pub meeting_date: NaiveDate,
    pub employee_id: String,
    pub status: String,
    pub remarks: Option<String>,
}

/// Validated attendance row returned by the listing endpoints.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AttendanceEntry {
    pub id: String,

    #[schema(value_type = String, format = "date")]
    pub meeting_date: NaiveDate,

    pub employee_id: String,
    pub status: AttendanceStatus,

    #[schema(nullable = true)]
    pub remarks: Option<String>,
}

impl TryFrom<AttendanceRow> for AttendanceEntry {
    type Error = AnalyticsError;

    fn try_from(row: AttendanceRow) -> Result<Self, Self::Error> {
        let status = parse_status(&row.status, &row.employee_id, row.meeting_date)?;

        Ok(AttendanceEntry {
            id: row.id,
            meeting_date: row.meeting_date,
            employee_id: row.employee_id,
            status,
            remarks: row.remarks,
        })
    }
}

impl From<&AttendanceEntry> for AttendanceRecord {
    fn from(entry: &AttendanceEntry) -> Self {
        AttendanceRecord {
            date: entry.meeting_date,
            employee_id: entry.employee_id.clone(),
            status: entry.status,
        }
    }
}

/// A date known to have had a meeting, whether or not every employee has a
/// record for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct MeetingDay {
    pub id: String,

    #[schema(example = "2026-01-05", value_type = String, format = "date")]
    pub meeting_date: NaiveDate,

    #[schema(nullable = true)]
    pub notes: Option<String>,
}

/// Strict status parsing; anything outside the closed set is rejected.
pub fn parse_status(
    value: &str,
    employee_id: &str,
    date: NaiveDate,
) -> Result<AttendanceStatus, AnalyticsError> {
    AttendanceStatus::from_str(value).map_err(|_| AnalyticsError::InvalidStatus {
        employee_id: employee_id.to_string(),
        date,
        value: value.to_string(),
    })
}
