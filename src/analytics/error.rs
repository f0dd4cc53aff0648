use chrono::NaiveDate;
use thiserror::Error;

/// Contract violations in the data handed to the analytics engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalyticsError {
    #[error("invalid attendance status {value:?} for employee {employee_id} on {date}")]
    InvalidStatus {
        employee_id: String,
        date: NaiveDate,
        value: String,
    },

    #[error("invalid month {year}-{month}")]
    InvalidMonth { year: i32, month: u32 },
}
