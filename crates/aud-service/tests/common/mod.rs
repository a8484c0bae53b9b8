//! Shared scaffolding for aud-service scenario tests: a migrated Postgres
//! pool plus wiremock stubs for every collaborator the scenarios in
//! spec.md §8 touch.

use aud_collab::{InventoryClient, LocationClient};
use aud_testkit::stubs::CollaboratorStubs;
pub use aud_testkit::stubs;
use sqlx::PgPool;

pub struct Harness {
    pub pool: PgPool,
    pub stubs: CollaboratorStubs,
    pub location: LocationClient,
    pub inventory: InventoryClient,
}

pub async fn setup() -> Harness {
    let pool = aud_testkit::testkit_db_pool().await.expect("migrated test db pool");
    let stubs = CollaboratorStubs::start().await;
    let location = LocationClient::new(stubs.location.uri());
    let inventory = InventoryClient::new(stubs.inventory.uri());
    Harness { pool, stubs, location, inventory }
}

pub async fn new_session(h: &Harness, location_id: i64) -> aud_schemas::Session {
    stubs::stub_room_access(&h.stubs.location, location_id, true).await;
    aud_service::session_crud::create_session(&h.pool, &h.location, None, location_id, "test-token")
        .await
        .expect("create_session")
}
