use crate::analytics::{DateSummary, EmployeeSummary, GlobalKpis, MonthlyEmployeeRow, MonthlyKpis, MonthlyMatrix};
use crate::api::analytics::{MonthQuery, RangeQuery};
use crate::api::attendance::{AttendanceQuery, BulkUpdateItem, CreateMeetingDay, UpdateAttendance};
use crate::model::attendance::{AttendanceEntry, AttendanceRecord, AttendanceStatus, MeetingDay};
use crate::model::employee::Employee;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Meeting Attendance API",
        version = "0.1.0",
        description = r#"
## Meeting Attendance

Tracks which team members attended each daily meeting and turns the records
into attendance KPIs.

### Features
- **Meeting days**
  - Create, list and delete the days a meeting took place
  - Initialize a day so everyone without a record is marked absent
- **Attendance records**
  - List by date, employee or date range; update one or many statuses
- **Analytics**
  - Global KPIs, per-employee and per-date summaries
  - Monthly employee x day matrix with inferred absences

### Rules
- `late` counts as attended and is also tallied for the lateness rate
- Rates are percentages rounded to two decimals; an empty denominator gives `0`
- A meeting day without a record for an employee counts as an absence in the monthly view
"#,
    ),
    paths(
        crate::api::employee::list_employees,

        crate::api::attendance::list_meeting_days,
        crate::api::attendance::create_meeting_day,
        crate::api::attendance::delete_meeting_day,
        crate::api::attendance::initialize_attendance,
        crate::api::attendance::list_attendance,
        crate::api::attendance::update_attendance,
        crate::api::attendance::bulk_update_attendance,

        crate::api::analytics::global_kpis,
        crate::api::analytics::employee_summaries,
        crate::api::analytics::date_summaries,
        crate::api::analytics::monthly_matrix
    ),
    components(
        schemas(
            Employee,
            AttendanceStatus,
            AttendanceRecord,
            AttendanceEntry,
            MeetingDay,
            CreateMeetingDay,
            UpdateAttendance,
            BulkUpdateItem,
            AttendanceQuery,
            RangeQuery,
            MonthQuery,
            GlobalKpis,
            EmployeeSummary,
            DateSummary,
            MonthlyKpis,
            MonthlyEmployeeRow,
            MonthlyMatrix
        )
    ),
    tags(
        (name = "Employee", description = "Roster lookup"),
        (name = "Attendance", description = "Meeting days and attendance records"),
        (name = "Analytics", description = "Attendance KPIs"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_lists_analytics_paths() {
        let doc = ApiDoc::openapi();
        let json = serde_json::to_value(&doc).unwrap();

        for path in [
            "/api/analytics/kpis",
            "/api/analytics/employees",
            "/api/analytics/dates",
            "/api/analytics/monthly",
            "/api/attendance/days/{date}/initialize",
        ] {
            assert!(json["paths"].get(path).is_some(), "missing {path}");
        }
        assert!(json["components"]["schemas"].get("MonthlyMatrix").is_some());
    }

    #[test]
    fn response_bodies_reference_registered_schemas() {
        let json = serde_json::to_value(ApiDoc::openapi()).unwrap();
        let schema_ref = |path: &str, method: &str, status: &str| {
            let schema = &json["paths"][path][method]["responses"][status]["content"]
                ["application/json"]["schema"];
            schema["$ref"]
                .as_str()
                .or_else(|| schema["items"]["$ref"].as_str())
                .unwrap_or_default()
                .to_string()
        };

        for (path, method, status, name) in [
            ("/api/employees", "get", "200", "Employee"),
            ("/api/attendance/days", "get", "200", "MeetingDay"),
            ("/api/attendance/days", "post", "201", "MeetingDay"),
            ("/api/analytics/kpis", "get", "200", "GlobalKpis"),
            ("/api/analytics/employees", "get", "200", "EmployeeSummary"),
            ("/api/analytics/dates", "get", "200", "DateSummary"),
            ("/api/analytics/monthly", "get", "200", "MonthlyMatrix"),
        ] {
            let reference = schema_ref(path, method, status);
            assert!(reference.ends_with(name), "{method} {path}: {reference}");
            assert!(json["components"]["schemas"].get(name).is_some(), "{name}");
        }
    }
}
