//! Expected-set snapshotting on session start.
//!
//! Grounded on `audit_session_service.start_session` in the original. Fetches
//! the room's current item set from the inventory collaborator, drains any
//! pre-existing snapshot, seeds ExpectedItem + ItemResult, and commits the
//! `draft -> in_progress` transition — all four writes in one transaction.

use anyhow::{Context, Result};
use aud_collab::InventoryClient;
use aud_db::{expected_items, item_results, sessions};
use aud_schemas::{Session, SessionStatus};
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{from_collab, AuditError};

pub async fn start_session(
    pool: &PgPool,
    inventory: &InventoryClient,
    session_id: Uuid,
    caller_id: i64,
    caller_token: &str,
) -> Result<Session, AuditError> {
    let session = sessions::get_session(pool, session_id)
        .await
        .map_err(|e| AuditError::StateConflict(e.to_string()))?
        .ok_or_else(|| AuditError::not_found("session_not_found"))?;

    aud_engine::can_start(session.status)?;

    let items = inventory
        .list_items_by_room(caller_token, session.location_id)
        .await
        .map_err(|e| from_collab(e, "room_forbidden"))?;

    let mut tx = pool.begin().await.map_err(|e| AuditError::StateConflict(e.to_string()))?;

    // Re-check under a row lock: the status read above ran before the
    // collaborator call, so a concurrent start could have committed while
    // this request was in flight. The locked read makes the precondition
    // check and the `draft -> in_progress` write atomic against that race.
    let locked = sessions::get_session_for_update(&mut tx, session_id)
        .await
        .map_err(|e| AuditError::StateConflict(e.to_string()))?
        .ok_or_else(|| AuditError::not_found("session_not_found"))?;
    aud_engine::can_start(locked.status)?;

    expected_items::delete_for_session(&mut *tx, session_id)
        .await
        .map_err(|e| AuditError::StateConflict(e.to_string()))?;
    item_results::delete_for_session(&mut *tx, session_id)
        .await
        .map_err(|e| AuditError::StateConflict(e.to_string()))?;

    for raw in &items {
        let expected_location_id = raw.location_id;
        expected_items::insert(
            &mut *tx,
            session_id,
            &expected_items::NewExpectedItem {
                item_id: raw.id,
                expected_location_id,
                expected_responsible_id: raw.responsible_id,
                barcode_id: raw.barcode_id,
            },
        )
        .await
        .map_err(|e| AuditError::StateConflict(e.to_string()))?;

        item_results::seed_missing(&mut *tx, session_id, raw.id, expected_location_id)
            .await
            .map_err(|e| AuditError::StateConflict(e.to_string()))?;
    }

    let snapshot_version = Uuid::new_v4();
    let updated = sessions::start_session(&mut tx, session_id, caller_id, Utc::now(), snapshot_version)
        .await
        .map_err(|e| AuditError::StateConflict(e.to_string()))?;

    tx.commit().await.context("commit start_session").map_err(|e| AuditError::StateConflict(e.to_string()))?;

    debug_assert_eq!(updated.status, SessionStatus::InProgress);
    Ok(updated)
}
