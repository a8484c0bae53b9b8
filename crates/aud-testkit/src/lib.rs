//! aud-testkit
//!
//! Test-only helpers shared by `aud-service`/`aud-daemon` integration tests:
//! a real-Postgres pool plus `wiremock` stubs for every collaborator contract
//! in §6, so tests never talk to a live auth/inventory/location/notification
//! service.

use sqlx::PgPool;

pub mod stubs;

pub use stubs::CollaboratorStubs;

/// Connect via `AUDIT_DATABASE_URL` and ensure migrations are applied.
pub async fn testkit_db_pool() -> anyhow::Result<PgPool> {
    aud_db::testkit_db_pool().await
}
