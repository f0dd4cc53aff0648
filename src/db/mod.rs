pub mod attendance;

use anyhow::{Context, Result};
use sqlx::MySqlPool;

pub async fn init_db(database_url: &str) -> Result<MySqlPool> {
    MySqlPool::connect(database_url)
        .await
        .context("Failed to connect to database")
}
