//! aud-db
//!
//! Postgres access for the audit core. Hand-written SQL via `sqlx::query`/
//! `query_as` (no compile-time-checked macros — there is no live database to
//! check against at build time); every row is mapped explicitly with
//! `row.try_get`, matching the rest of this workspace's DB layer.

use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

pub mod actions;
pub mod discrepancies;
pub mod expected_items;
pub mod item_results;
pub mod plans;
pub mod report;
pub mod scans;
pub mod sessions;

pub use actions::*;
pub use discrepancies::*;
pub use expected_items::*;
pub use item_results::*;
pub use plans::*;
pub use report::*;
pub use scans::*;
pub use sessions::*;

pub const ENV_DB_URL: &str = "AUDIT_DATABASE_URL";

/// Connect to Postgres using `AUDIT_DATABASE_URL`.
pub async fn connect(database_url: &str) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await
        .context("failed to connect to Postgres")?;
    Ok(pool)
}

/// Run embedded SQLx migrations.
pub async fn migrate(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("../../migrations").run(pool).await.context("db migrate failed")?;
    Ok(())
}

/// Test helper: connect using `AUDIT_DATABASE_URL` and ensure migrations are
/// applied.
pub async fn testkit_db_pool() -> Result<PgPool> {
    let url = std::env::var(ENV_DB_URL).with_context(|| format!("missing env var {ENV_DB_URL}"))?;
    let pool = connect(&url).await?;
    migrate(&pool).await?;
    Ok(pool)
}
