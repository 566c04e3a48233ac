//! Connection pool lifecycle.
//!
//! `main` calls `connect`, then `migrate`, hands the pool to `PgStore`, and calls
//! `close` once the HTTP server has stopped.

use std::time::Duration;

use sqlx::postgres::{PgPool, PgPoolOptions};

use crate::config::Config;
use crate::error::AppError;

/// How long a request waits for a free connection before failing.
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(30);

/// Creates the pool and checks that the database answers.
pub async fn connect(database_url: &str, config: &Config) -> Result<PgPool, AppError> {
    log::info!(
        "Creating database connection pool (max_connections={})",
        config.database_max_connections
    );

    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .acquire_timeout(ACQUIRE_TIMEOUT)
        .connect(database_url)
        .await?;

    health_check(&pool).await?;
    Ok(pool)
}

/// Applies the embedded migrations from `migrations/`.
pub async fn migrate(pool: &PgPool) -> Result<(), AppError> {
    sqlx::migrate!("./migrations").run(pool).await?;
    log::info!("Database migrations applied");
    Ok(())
}

pub async fn health_check(pool: &PgPool) -> Result<(), AppError> {
    let (one,): (i32,) = sqlx::query_as("SELECT 1").fetch_one(pool).await?;
    if one != 1 {
        return Err(AppError::DatabaseError(format!(
            "health check returned {}",
            one
        )));
    }
    Ok(())
}

pub async fn close(pool: PgPool) {
    log::info!("Closing database connection pool");
    pool.close().await;
}
