use actix_web::{HttpResponse, Responder, web};
use sqlx::MySqlPool;
use tracing::debug;

use crate::db::attendance as repo;
use crate::error::ApiError;

/// List the roster attendance is tracked against
#[utoipa::path(
    get,
    path = "/api/employees",
    responses(
        (status = 200, description = "Roster, ordered by name", body = [crate::model::employee::Employee]),
        (status = 500, description = "Internal server error", body = Object, example = json!({
            "error": "Internal Server Error",
            "code": "INTERNAL_SERVER_ERROR"
        }))
    ),
    tag = "Employee"
)]
pub async fn list_employees(pool: web::Data<MySqlPool>) -> Result<impl Responder, ApiError> {
    let roster = repo::list_employees(pool.get_ref()).await?;
    debug!(count = roster.len(), "Roster listed");

    Ok(HttpResponse::Ok().json(roster))
}
