use crate::{
    api::{analytics, attendance, employee},
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{guard, web};
use anyhow::{Result, anyhow};
use std::sync::Arc;

type Limiter = Arc<Governor<PeerIpKeyExtractor, NoOpMiddleware>>;

/// Per-IP limiters, built once and shared by every worker.
#[derive(Clone)]
pub struct RateLimiters {
    read: Limiter,
    write: Limiter,
}

impl RateLimiters {
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self {
            read: Arc::new(build_limiter(config.rate_read_per_min)?),
            write: Arc::new(build_limiter(config.rate_write_per_min)?),
        })
    }
}

fn build_limiter(requests_per_min: u32) -> Result<Governor<PeerIpKeyExtractor, NoOpMiddleware>> {
    let requests_per_min = requests_per_min.max(1);
    let per_ms = (60_000 / requests_per_min as u64).max(1);

    let cfg = GovernorConfigBuilder::default()
        .per_millisecond(per_ms)
        .burst_size(requests_per_min)
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .ok_or_else(|| anyhow!("invalid rate limit: {requests_per_min} per minute"))?;

    Ok(Governor::new(&cfg))
}

pub fn configure(cfg: &mut web::ServiceConfig, config: &Config, limiters: &RateLimiters) {
    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(limiters.read.clone())
            .service(
                web::scope("/employees")
                    // /employees
                    .service(web::resource("").route(web::get().to(employee::list_employees))),
            )
            .service(
                web::scope("/attendance")
                    // /attendance
                    .service(web::resource("").route(web::get().to(attendance::list_attendance)))
                    // /attendance/days, split by method so POST gets the write limiter
                    .service(
                        web::resource("/days")
                            .guard(guard::Get())
                            .route(web::get().to(attendance::list_meeting_days)),
                    )
                    .service(
                        web::resource("/days")
                            .guard(guard::Post())
                            .wrap(limiters.write.clone())
                            .route(web::post().to(attendance::create_meeting_day)),
                    )
                    // /attendance/days/{date}
                    .service(
                        web::resource("/days/{date}")
                            .wrap(limiters.write.clone())
                            .route(web::delete().to(attendance::delete_meeting_day)),
                    )
                    // /attendance/days/{date}/initialize
                    .service(
                        web::resource("/days/{date}/initialize")
                            .wrap(limiters.write.clone())
                            .route(web::post().to(attendance::initialize_attendance)),
                    )
                    // /attendance/bulk (before /{id})
                    .service(
                        web::resource("/bulk")
                            .wrap(limiters.write.clone())
                            .route(web::put().to(attendance::bulk_update_attendance)),
                    )
                    // /attendance/{id}
                    .service(
                        web::resource("/{id}")
                            .wrap(limiters.write.clone())
                            .route(web::put().to(attendance::update_attendance)),
                    ),
            )
            .service(
                web::scope("/analytics")
                    .service(web::resource("/kpis").route(web::get().to(analytics::global_kpis)))
                    .service(
                        web::resource("/employees")
                            .route(web::get().to(analytics::employee_summaries)),
                    )
                    .service(
                        web::resource("/dates").route(web::get().to(analytics::date_summaries)),
                    )
                    .service(
                        web::resource("/monthly").route(web::get().to(analytics::monthly_matrix)),
                    ),
            ),
    );
}
