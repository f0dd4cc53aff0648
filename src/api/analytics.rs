use actix_web::{HttpResponse, Responder, web};
use chrono::NaiveDate;
use serde::Deserialize;
use sqlx::MySqlPool;
use tracing::{debug, instrument};
use utoipa::{IntoParams, ToSchema};

use crate::analytics::{
    self, compute_date_summaries, compute_employee_summaries, compute_global_kpis,
    compute_monthly_matrix,
};
use crate::error::ApiError;
use crate::utils::snapshot_cache::SnapshotCache;

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct RangeQuery {
    /// Inclusive lower bound.
    #[param(example = "2026-01-01")]
    #[schema(value_type = Option<String>, format = "date")]
    pub start: Option<NaiveDate>,

    /// Inclusive upper bound.
    #[param(example = "2026-01-31")]
    #[schema(value_type = Option<String>, format = "date")]
    pub end: Option<NaiveDate>,
}

impl RangeQuery {
    pub fn validate(&self) -> Result<(), ApiError> {
        match (self.start, self.end) {
            (Some(start), Some(end)) if start > end => Err(ApiError::BadRequest(
                "start must not be after end".to_string(),
            )),
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct MonthQuery {
    #[param(example = 2026)]
    pub year: i32,

    /// 1 = January.
    #[param(example = 1)]
    pub month: u32,
}

/// Global attendance KPIs
#[utoipa::path(
    get,
    path = "/api/analytics/kpis",
    params(RangeQuery),
    responses(
        (status = 200, description = "Global attendance KPIs", body = crate::analytics::GlobalKpis),
        (status = 400, description = "Invalid range"),
        (status = 422, description = "Stored attendance data is invalid")
    ),
    tag = "Analytics"
)]
#[instrument(name = "analytics_kpis", skip(pool, cache))]
pub async fn global_kpis(
    pool: web::Data<MySqlPool>,
    cache: web::Data<SnapshotCache>,
    query: web::Query<RangeQuery>,
) -> Result<impl Responder, ApiError> {
    query.validate()?;

    let snapshot = cache.get(pool.get_ref()).await?;
    let records = analytics::filter_range(&snapshot.records, query.start, query.end);

    let kpis = compute_global_kpis(&records, snapshot.employee_count());
    debug!(days_tracked = kpis.days_tracked, "Computed global KPIs");

    Ok(HttpResponse::Ok().json(kpis))
}

/// Attendance summary per employee
#[utoipa::path(
    get,
    path = "/api/analytics/employees",
    params(RangeQuery),
    responses(
        (status = 200, description = "One summary per roster employee", body = [crate::analytics::EmployeeSummary]),
        (status = 400, description = "Invalid range"),
        (status = 422, description = "Stored attendance data is invalid")
    ),
    tag = "Analytics"
)]
#[instrument(name = "analytics_employees", skip(pool, cache))]
pub async fn employee_summaries(
    pool: web::Data<MySqlPool>,
    cache: web::Data<SnapshotCache>,
    query: web::Query<RangeQuery>,
) -> Result<impl Responder, ApiError> {
    query.validate()?;

    let snapshot = cache.get(pool.get_ref()).await?;
    let records = analytics::filter_range(&snapshot.records, query.start, query.end);

    Ok(HttpResponse::Ok().json(compute_employee_summaries(&records, &snapshot.roster)))
}

/// Attendance summary per meeting date
#[utoipa::path(
    get,
    path = "/api/analytics/dates",
    params(RangeQuery),
    responses(
        (status = 200, description = "Per-date summaries, most recent first", body = [crate::analytics::DateSummary]),
        (status = 400, description = "Invalid range"),
        (status = 422, description = "Stored attendance data is invalid")
    ),
    tag = "Analytics"
)]
#[instrument(name = "analytics_dates", skip(pool, cache))]
pub async fn date_summaries(
    pool: web::Data<MySqlPool>,
    cache: web::Data<SnapshotCache>,
    query: web::Query<RangeQuery>,
) -> Result<impl Responder, ApiError> {
    query.validate()?;

    let snapshot = cache.get(pool.get_ref()).await?;
    let records = analytics::filter_range(&snapshot.records, query.start, query.end);

    Ok(HttpResponse::Ok().json(compute_date_summaries(&records, snapshot.employee_count())))
}

/// Monthly attendance matrix
#[utoipa::path(
    get,
    path = "/api/analytics/monthly",
    params(MonthQuery),
    responses(
        (status = 200, description = "Employee x day grid with monthly KPIs", body = crate::analytics::MonthlyMatrix),
        (status = 400, description = "Invalid month", body = Object, example = json!({
            "error": "invalid month 2026-13",
            "code": "INVALID_MONTH"
        })),
        (status = 422, description = "Stored attendance data is invalid")
    ),
    tag = "Analytics"
)]
#[instrument(name = "analytics_monthly", skip(pool, cache))]
pub async fn monthly_matrix(
    pool: web::Data<MySqlPool>,
    cache: web::Data<SnapshotCache>,
    query: web::Query<MonthQuery>,
) -> Result<impl Responder, ApiError> {
    // Reject a bad month before touching the database.
    analytics::monthly::month_bounds(query.year, query.month)?;

    let snapshot = cache.get(pool.get_ref()).await?;
    let matrix = compute_monthly_matrix(
        query.year,
        query.month,
        &snapshot.records,
        &snapshot.meeting_days,
        &snapshot.roster,
    )?;

    debug!(
        meeting_days = matrix.kpis.total_meeting_days,
        "Computed monthly matrix"
    );

    Ok(HttpResponse::Ok().json(matrix))
}
