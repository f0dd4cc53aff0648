use actix_web::{HttpResponse, Responder, web};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use sqlx::MySqlPool;
use tracing::{info, instrument};
use utoipa::{IntoParams, ToSchema};

use crate::db::attendance::{self as repo, AttendanceFilter, StatusUpdate};
use crate::error::ApiError;
use crate::model::attendance::{AttendanceEntry, AttendanceStatus};
use crate::utils::snapshot_cache::SnapshotCache;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateMeetingDay {
    #[schema(example = "2026-01-05", value_type = String, format = "date")]
    pub date: NaiveDate,

    #[schema(example = "Weekly sync", nullable = true)]
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateAttendance {
    pub status: AttendanceStatus,

    #[schema(example = "Joined 10 minutes late", nullable = true)]
    pub remarks: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct BulkUpdateItem {
    pub id: String,
    pub status: AttendanceStatus,

    #[schema(nullable = true)]
    pub remarks: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct AttendanceQuery {
    /// Records of a single meeting day.
    #[param(example = "2026-01-05")]
    #[schema(value_type = Option<String>, format = "date")]
    pub date: Option<NaiveDate>,

    /// Records of a single employee.
    pub employee_id: Option<String>,

    /// Inclusive range; requires `end`.
    #[param(example = "2026-01-01")]
    #[schema(value_type = Option<String>, format = "date")]
    pub start: Option<NaiveDate>,

    /// Inclusive range; requires `start`.
    #[param(example = "2026-01-31")]
    #[schema(value_type = Option<String>, format = "date")]
    pub end: Option<NaiveDate>,
}

impl AttendanceQuery {
    /// `date` wins over `employee_id`, which wins over a range.
    pub fn to_filter(&self) -> Result<AttendanceFilter, ApiError> {
        if let Some(date) = self.date {
            return Ok(AttendanceFilter::Date(date));
        }
        if let Some(employee_id) = &self.employee_id {
            return Ok(AttendanceFilter::Employee(employee_id.clone()));
        }

        match (self.start, self.end) {
            (None, None) => Ok(AttendanceFilter::All),
            (Some(start), Some(end)) if start <= end => Ok(AttendanceFilter::Range { start, end }),
            (Some(_), Some(_)) => Err(ApiError::BadRequest(
                "start must not be after end".to_string(),
            )),
            _ => Err(ApiError::BadRequest(
                "start and end must be given together".to_string(),
            )),
        }
    }
}

/// List meeting days
#[utoipa::path(
    get,
    path = "/api/attendance/days",
    responses(
        (status = 200, description = "Meeting days, most recent first", body = [crate::model::attendance::MeetingDay])
    ),
    tag = "Attendance"
)]
pub async fn list_meeting_days(pool: web::Data<MySqlPool>) -> Result<impl Responder, ApiError> {
    let days = repo::list_meeting_days(pool.get_ref(), None, None).await?;
    Ok(HttpResponse::Ok().json(days))
}

/// Create (or fetch) the meeting day for a date
#[utoipa::path(
    post,
    path = "/api/attendance/days",
    request_body = CreateMeetingDay,
    responses(
        (status = 201, description = "Meeting day created", body = crate::model::attendance::MeetingDay),
        (status = 200, description = "Meeting day already existed", body = crate::model::attendance::MeetingDay)
    ),
    tag = "Attendance"
)]
#[instrument(name = "create_meeting_day", skip(pool, cache, payload), fields(date = %payload.date))]
pub async fn create_meeting_day(
    pool: web::Data<MySqlPool>,
    cache: web::Data<SnapshotCache>,
    payload: web::Json<CreateMeetingDay>,
) -> Result<impl Responder, ApiError> {
    let (day, created) =
        repo::get_or_create_meeting_day(pool.get_ref(), payload.date, payload.notes.as_deref())
            .await?;

    if created {
        cache.invalidate();
        info!("Meeting day created");
        Ok(HttpResponse::Created().json(day))
    } else {
        Ok(HttpResponse::Ok().json(day))
    }
}

/// Delete a meeting day and its attendance records
#[utoipa::path(
    delete,
    path = "/api/attendance/days/{date}",
    params(
        ("date" = String, Path, description = "Meeting date (YYYY-MM-DD)")
    ),
    responses(
        (status = 200, description = "Meeting day deleted", body = Object, example = json!({
            "message": "Meeting day deleted"
        })),
        (status = 404, description = "No meeting day on that date")
    ),
    tag = "Attendance"
)]
#[instrument(name = "delete_meeting_day", skip(pool, cache))]
pub async fn delete_meeting_day(
    pool: web::Data<MySqlPool>,
    cache: web::Data<SnapshotCache>,
    path: web::Path<NaiveDate>,
) -> Result<impl Responder, ApiError> {
    let date = path.into_inner();

    if !repo::delete_meeting_day(pool.get_ref(), date).await? {
        return Err(ApiError::NotFound(format!("No meeting day on {date}")));
    }

    cache.invalidate();
    info!("Meeting day deleted");

    Ok(HttpResponse::Ok().json(json!({
        "message": "Meeting day deleted"
    })))
}

/// Give every employee without a record on this date an `absent` record
#[utoipa::path(
    post,
    path = "/api/attendance/days/{date}/initialize",
    params(
        ("date" = String, Path, description = "Meeting date (YYYY-MM-DD)")
    ),
    responses(
        (status = 200, description = "Attendance initialized", body = Object, example = json!({
            "inserted": 4
        }))
    ),
    tag = "Attendance"
)]
#[instrument(name = "initialize_attendance", skip(pool, cache))]
pub async fn initialize_attendance(
    pool: web::Data<MySqlPool>,
    cache: web::Data<SnapshotCache>,
    path: web::Path<NaiveDate>,
) -> Result<impl Responder, ApiError> {
    let date = path.into_inner();
    let inserted = repo::initialize_attendance(pool.get_ref(), date).await?;

    // The meeting day itself may be new even when nothing was inserted.
    cache.invalidate();
    info!(inserted, "Attendance initialized");

    Ok(HttpResponse::Ok().json(json!({ "inserted": inserted })))
}

/// List attendance records
#[utoipa::path(
    get,
    path = "/api/attendance",
    params(AttendanceQuery),
    responses(
        (status = 200, description = "Attendance records, most recent first", body = [AttendanceEntry]),
        (status = 400, description = "Invalid filter"),
        (status = 422, description = "Stored attendance data is invalid")
    ),
    tag = "Attendance"
)]
pub async fn list_attendance(
    pool: web::Data<MySqlPool>,
    query: web::Query<AttendanceQuery>,
) -> Result<impl Responder, ApiError> {
    let filter = query.to_filter()?;

    let entries = repo::list_attendance(pool.get_ref(), &filter)
        .await?
        .into_iter()
        .map(AttendanceEntry::try_from)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(HttpResponse::Ok().json(entries))
}

/// Update one attendance record
#[utoipa::path(
    put,
    path = "/api/attendance/{id}",
    request_body = UpdateAttendance,
    params(
        ("id" = String, Path, description = "Attendance record id")
    ),
    responses(
        (status = 200, description = "Attendance updated", body = Object, example = json!({
            "message": "Attendance updated"
        })),
        (status = 400, description = "Unknown status value"),
        (status = 404, description = "Attendance record not found")
    ),
    tag = "Attendance"
)]
#[instrument(name = "update_attendance", skip(pool, cache, body), fields(status = %body.status))]
pub async fn update_attendance(
    pool: web::Data<MySqlPool>,
    cache: web::Data<SnapshotCache>,
    path: web::Path<String>,
    body: web::Json<UpdateAttendance>,
) -> Result<impl Responder, ApiError> {
    let body = body.into_inner();
    let update = StatusUpdate {
        id: path.into_inner(),
        status: body.status,
        remarks: body.remarks,
    };

    if !repo::update_attendance(pool.get_ref(), &update).await? {
        return Err(ApiError::NotFound(format!(
            "Attendance record {} not found",
            update.id
        )));
    }

    cache.invalidate();

    Ok(HttpResponse::Ok().json(json!({
        "message": "Attendance updated"
    })))
}

/// Update several attendance records at once (all or nothing)
#[utoipa::path(
    put,
    path = "/api/attendance/bulk",
    request_body = [BulkUpdateItem],
    responses(
        (status = 200, description = "Attendance updated", body = Object, example = json!({
            "updated": 3
        })),
        (status = 400, description = "Empty batch or unknown status value"),
        (status = 404, description = "One of the records was not found; nothing was changed")
    ),
    tag = "Attendance"
)]
#[instrument(name = "bulk_update_attendance", skip_all, fields(count = body.len()))]
pub async fn bulk_update_attendance(
    pool: web::Data<MySqlPool>,
    cache: web::Data<SnapshotCache>,
    body: web::Json<Vec<BulkUpdateItem>>,
) -> Result<impl Responder, ApiError> {
    if body.is_empty() {
        return Err(ApiError::BadRequest("No updates provided".to_string()));
    }

    let updates: Vec<StatusUpdate> = body
        .into_inner()
        .into_iter()
        .map(|item| StatusUpdate {
            id: item.id,
            status: item.status,
            remarks: item.remarks,
        })
        .collect();

    let updated = repo::bulk_update_attendance(pool.get_ref(), &updates).await?;

    cache.invalidate();
    info!(updated, "Bulk attendance update applied");

    Ok(HttpResponse::Ok().json(json!({ "updated": updated })))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn empty_query_lists_everything() {
        assert_eq!(AttendanceQuery::default().to_filter().unwrap(), AttendanceFilter::All);
    }

    #[test]
    fn date_takes_precedence() {
        let query = AttendanceQuery {
            date: Some(d("2026-01-05")),
            employee_id: Some("e1".into()),
            ..Default::default()
        };
        assert_eq!(query.to_filter().unwrap(), AttendanceFilter::Date(d("2026-01-05")));
    }

    #[test]
    fn employee_filter() {
        let query = AttendanceQuery {
            employee_id: Some("e1".into()),
            ..Default::default()
        };
        assert_eq!(query.to_filter().unwrap(), AttendanceFilter::Employee("e1".into()));
    }

    #[test]
    fn range_requires_both_ends_in_order() {
        let half = AttendanceQuery {
            start: Some(d("2026-01-01")),
            ..Default::default()
        };
        assert!(matches!(half.to_filter(), Err(ApiError::BadRequest(_))));

        let reversed = AttendanceQuery {
            start: Some(d("2026-02-01")),
            end: Some(d("2026-01-01")),
            ..Default::default()
        };
        assert!(matches!(reversed.to_filter(), Err(ApiError::BadRequest(_))));

        let ok = AttendanceQuery {
            start: Some(d("2026-01-01")),
            end: Some(d("2026-01-31")),
            ..Default::default()
        };
        assert_eq!(
            ok.to_filter().unwrap(),
            AttendanceFilter::Range { start: d("2026-01-01"), end: d("2026-01-31") }
        );
    }

    #[test]
    fn update_body_rejects_unknown_status() {
        let parsed: Result<UpdateAttendance, _> =
            serde_json::from_str(r#"{"status": "excused"}"#);
        assert!(parsed.is_err());

        let parsed: UpdateAttendance = serde_json::from_str(r#"{"status": "late"}"#).unwrap();
        assert_eq!(parsed.status, AttendanceStatus::Late);
        assert!(parsed.remarks.is_none());
    }
}
