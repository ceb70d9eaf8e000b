//! Embedded, reversible schema migrations.
//!
//! Mirrors the usual `up` / `down` / `reset` workflow of a migration CLI,
//! with the scripts compiled in from `migrations/`.

use sqlx::migrate::{Migrate, Migrator};
use sqlx::PgPool;
use tracing::info;
use crate::Result;

pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationStatus {
    pub version: i64,
    pub description: String,
    pub applied: bool,
}

/// Applies every pending migration.
pub async fn up(pool: &PgPool) -> Result<()> {
    MIGRATOR.run(pool).await?;
    info!("Migrations applied");
    Ok(())
}

/// Reverts the most recently applied migration. Returns the reverted version.
pub async fn down(pool: &PgPool) -> Result<Option<i64>> {
    let mut applied = applied_versions(pool).await?;
    applied.sort_unstable_by(|a, b| b.cmp(a));

    let Some(&latest) = applied.first() else {
        info!("No applied migrations to revert");
        return Ok(None);
    };
    let target = applied.get(1).copied().unwrap_or(0);

    MIGRATOR.undo(pool, target).await?;
    info!(version = latest, "Reverted migration");
    Ok(Some(latest))
}

/// Reverts every applied migration.
pub async fn reset(pool: &PgPool) -> Result<()> {
    MIGRATOR.undo(pool, 0).await?;
    info!("All migrations reverted");
    Ok(())
}

pub async fn status(pool: &PgPool) -> Result<Vec<MigrationStatus>> {
    let applied = applied_versions(pool).await?;
    Ok(merge_status(&MIGRATOR, &applied))
}

async fn applied_versions(pool: &PgPool) -> Result<Vec<i64>> {
    let mut conn = pool.acquire().await?;
    conn.ensure_migrations_table().await?;
    let applied = conn.list_applied_migrations().await?;
    Ok(applied.into_iter().map(|m| m.version).collect())
}

fn merge_status(migrator: &Migrator, applied: &[i64]) -> Vec<MigrationStatus> {
    migrator
        .iter()
        .filter(|m| !m.migration_type.is_down_migration())
        .map(|m| MigrationStatus {
            version: m.version,
            description: m.description.to_string(),
            applied: applied.contains(&m.version),
        })
        .collect()
}
