use std::time::Duration;

use actix_web::middleware::NormalizePath;
use actix_web::web::Data;
use actix_web::{App, HttpServer, Responder, get};
use anyhow::Context;
use dotenvy::dotenv;

use meeting_attendance::config::Config;
use meeting_attendance::db::init_db;
use meeting_attendance::docs::ApiDoc;
use meeting_attendance::routes::{self, RateLimiters};
use meeting_attendance::utils::snapshot_cache::{SnapshotCache, warmup_snapshot_cache};

use tracing::{error, info};
use tracing_appender::rolling;
use utoipa::OpenApi; // ← needed for ApiDoc::openapi()
use utoipa_swagger_ui::SwaggerUi;

#[get("/")]
async fn index() -> impl Responder {
    "Meeting attendance service"
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let config = Config::from_env()?;

    // Rolling daily log
    let file_appender = rolling::daily(&config.log_dir, "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(config.log_level)
        .with_ansi(false)
        .with_target(false) // removes module path
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .pretty()
        .init();

    info!("Server starting...");

    let pool = init_db(&config.database_url).await?;
    let cache = SnapshotCache::new(Duration::from_secs(config.snapshot_ttl_secs));
    let limiters = RateLimiters::from_config(&config)?;

    let pool_for_warmup = pool.clone();
    let cache_for_warmup = cache.clone();
    let server_addr = config.server_addr.clone();

    actix_web::rt::spawn(async move {
        if let Err(e) = warmup_snapshot_cache(&cache_for_warmup, &pool_for_warmup).await {
            error!(error = %e, "Failed to warm up attendance snapshot");
        }
    });

    HttpServer::new(move || {
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}") // ← important: wildcard {_:.*} to match JS/CSS files
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(Data::new(pool.clone()))
            .app_data(Data::new(cache.clone()))
            .service(index)
            .configure(|cfg| routes::configure(cfg, &config, &limiters))
    })
    .bind(&server_addr)
    .with_context(|| format!("Failed to bind {server_addr}"))?
    .run()
    .await?;

    Ok(())
}
