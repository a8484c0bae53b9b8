//! Session close: canonical discrepancy rebuild, then awaiting_approval.
//!
//! Grounded on `audit_session_service.close_session`. Two separate commits:
//! first `in_progress -> reconciling` (stamping `closed_by`/`closed_at`),
//! then the canonical rebuild, then `reconciling -> awaiting_approval`.
//! Callers observing the session between the two commits legitimately see
//! `reconciling`.

use aud_db::{discrepancies, expected_items, scans, sessions};
use aud_engine::{rebuild_discrepancies, DiscrepancyDraft, ExpectedItemFacts, ScanFacts};
use aud_schemas::Session;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AuditError;

pub async fn close_session(pool: &PgPool, session_id: Uuid, closed_by: i64) -> Result<Session, AuditError> {
    // Status check and the `in_progress -> reconciling` write happen under
    // the same row lock, so a scan that is mid-flight sees either the
    // pre-close `in_progress` status or loses the race entirely — never a
    // half-applied close.
    let mut tx = pool.begin().await.map_err(|e| AuditError::StateConflict(e.to_string()))?;
    let session = sessions::get_session_for_update(&mut tx, session_id)
        .await
        .map_err(|e| AuditError::StateConflict(e.to_string()))?
        .ok_or_else(|| AuditError::not_found("session_not_found"))?;

    aud_engine::can_close(session.status)?;

    sessions::mark_reconciling(&mut tx, session_id, closed_by, Utc::now())
        .await
        .map_err(|e| AuditError::StateConflict(e.to_string()))?;
    tx.commit().await.map_err(|e| AuditError::StateConflict(e.to_string()))?;

    rebuild_session_discrepancies(pool, session_id).await?;

    let updated = sessions::mark_awaiting_approval(pool, session_id)
        .await
        .map_err(|e| AuditError::StateConflict(e.to_string()))?;

    Ok(updated)
}

/// Canonical rebuild: delete the session's Discrepancy rows, recompute the
/// authoritative set from Expected ⋈ Scan, and reinsert. Order-independent
/// in its result set; emitted in the fixed missing/duplicate/unexpected/
/// misplaced/unknown_barcode order so repeat rebuilds of identical inputs
/// produce identical insert sequences.
async fn rebuild_session_discrepancies(pool: &PgPool, session_id: Uuid) -> Result<(), AuditError> {
    let expected = expected_items::list_for_session(pool, session_id)
        .await
        .map_err(|e| AuditError::StateConflict(e.to_string()))?
        .into_iter()
        .map(|e| ExpectedItemFacts { item_id: e.item_id, expected_location_id: e.expected_location_id })
        .collect::<Vec<_>>();

    let scan_rows = scans::list_for_session(pool, session_id)
        .await
        .map_err(|e| AuditError::StateConflict(e.to_string()))?
        .into_iter()
        .map(|s| ScanFacts {
            item_id: s.item_id,
            barcode_value: s.barcode_value,
            found_location_id: s.found_location_id,
            scan_time: s.scan_time,
        })
        .collect::<Vec<_>>();

    let drafts = rebuild_discrepancies(&expected, &scan_rows);

    let mut tx = pool.begin().await.map_err(|e| AuditError::StateConflict(e.to_string()))?;
    discrepancies::delete_for_session(&mut *tx, session_id)
        .await
        .map_err(|e| AuditError::StateConflict(e.to_string()))?;

    for draft in &drafts {
        insert_draft(&mut tx, session_id, draft).await?;
    }

    tx.commit().await.map_err(|e| AuditError::StateConflict(e.to_string()))?;
    Ok(())
}

async fn insert_draft(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    session_id: Uuid,
    draft: &DiscrepancyDraft,
) -> Result<(), AuditError> {
    discrepancies::insert(
        &mut **tx,
        session_id,
        &discrepancies::NewDiscrepancy {
            discrepancy_type: draft.discrepancy_type,
            item_id: draft.item_id,
            barcode_value: draft.barcode_value.clone(),
            expected_location_id: draft.expected_location_id,
            found_location_id: draft.found_location_id,
            resolution_payload: draft.resolution_payload.clone(),
        },
    )
    .await
    .map_err(|e| AuditError::StateConflict(e.to_string()))
}
