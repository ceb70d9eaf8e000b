//! Database module
//!
//! Pool construction, health probe, user persistence and migrations.

pub mod migrations;
pub mod models;
pub mod operations;

pub use models::User;
pub use operations::{PgUserStore, UserStore};

use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use tracing::info;
use crate::config::Settings;
use crate::Result;

/// Builds the pool without touching the network; the first query connects.
pub fn connect(settings: &Settings) -> Result<PgPool> {
    let options = settings.postgres.connect_options(settings.env)?;

    info!(
        host = %settings.postgres.host,
        port = settings.postgres.port,
        database = %settings.database_name()?,
        max_connections = settings.postgres.max_connections,
        "Configuring database connection pool"
    );

    Ok(PgPoolOptions::new()
        .max_connections(settings.postgres.max_connections)
        .acquire_timeout(Duration::from_secs(5))
        .connect_lazy_with(options))
}

pub async fn ping(pool: &PgPool) -> Result<()> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_connect_is_lazy() {
        let settings = Settings::new_for_test().expect("Failed to load test config");
        let pool = connect(&settings).expect("lazy pool");
        assert_eq!(pool.size(), 0);
    }
}
