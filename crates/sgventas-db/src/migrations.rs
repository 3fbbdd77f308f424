//! # Database Migrations
//!
//! Embedded SQL migrations for SGVentas.
//!
//! `001_initial_schema.sql` creates `products`, `sales` and `sale_items`.
//! Suppliers and expenses live in the JSON ledger files, not here.
//! [`crate::Database::new`] applies anything pending before handing out
//! repositories.

use sqlx::SqlitePool;
use tracing::info;

use crate::error::DbResult;

/// Embedded from `migrations/sqlite` at compile time.
static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations/sqlite");

/// Brings the catalog and sales schema up to date.
pub async fn run_migrations(pool: &SqlitePool) -> DbResult<()> {
    MIGRATOR.run(pool).await?;

    let (embedded, applied) = migration_status(pool).await?;
    info!(embedded, applied, "Schema up to date");
    Ok(())
}

/// `(embedded, applied)` migration counts.
pub async fn migration_status(pool: &SqlitePool) -> DbResult<(usize, usize)> {
    let total = MIGRATOR.migrations.len();

    let applied: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations")
        .fetch_one(pool)
        .await?;

    Ok((total, applied as usize))
}
