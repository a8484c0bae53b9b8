//! Scan ingestion.
//!
//! Grounded on `audit_scan_service.create_scan` in the original. Resolves a
//! scan's item (by `item_id` or barcode), inserts it idempotently keyed on
//! `(session_id, client_scan_id)`, and applies the incremental classifier
//! against whichever row ends up persisted — including the race-losing path,
//! where a retried scan must still converge.

use anyhow::Context as _;
use aud_collab::InventoryClient;
use aud_db::{discrepancies, item_results, scans};
use aud_engine::{classify_scan, item_result_outcome, DiscrepancyDraft, ExpectedItemFacts, ItemResultOutcome, ScanFacts};
use aud_schemas::{ItemResultStatus, Scan, SessionStatus};
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{from_collab, AuditError};

pub struct ScanPayload {
    pub item_id: Option<i64>,
    pub barcode_value: Option<String>,
    pub found_location_id: i64,
    pub notes: Option<String>,
    pub photo_url: Option<String>,
    pub client_scan_id: String,
    pub extra: Option<serde_json::Value>,
}

pub async fn create_scan(
    pool: &PgPool,
    inventory: &InventoryClient,
    session_id: Uuid,
    payload: ScanPayload,
    scanner_user_id: i64,
    caller_token: &str,
) -> Result<Scan, AuditError> {
    let session = aud_db::get_session(pool, session_id)
        .await
        .map_err(|e| AuditError::StateConflict(e.to_string()))?
        .ok_or_else(|| AuditError::not_found("session_not_found"))?;

    if session.status != SessionStatus::InProgress {
        return Err(AuditError::state_conflict("session_not_in_progress"));
    }
    if payload.found_location_id != session.location_id {
        return Err(AuditError::validation("location_mismatch"));
    }
    if payload.item_id.is_none() && payload.barcode_value.as_deref().unwrap_or("").is_empty() {
        return Err(AuditError::validation("missing_item_or_barcode"));
    }

    let resolved_item_id = resolve_item_id(inventory, &payload, caller_token).await?;

    let new_scan = scans::NewScan {
        scanner_user_id,
        barcode_value: payload.barcode_value.clone(),
        item_id: resolved_item_id,
        found_location_id: payload.found_location_id,
        notes: payload.notes,
        photo_url: payload.photo_url,
        client_scan_id: payload.client_scan_id.clone(),
        extra: payload.extra,
    };

    let (scan, is_retry) = match scans::try_insert(pool, session_id, &new_scan).await {
        Ok(Some(scan)) => (scan, false),
        Ok(None) => {
            let existing = scans::find_by_client_id(pool, session_id, &payload.client_scan_id)
                .await
                .map_err(|e| AuditError::StateConflict(e.to_string()))?
                .context("unique violation but no row found on re-read")
                .map_err(|e| AuditError::StateConflict(e.to_string()))?;
            (existing, true)
        }
        Err(e) => return Err(AuditError::StateConflict(e.to_string())),
    };
    let _ = is_retry; // re-applying classification below covers both paths uniformly.

    apply_incremental_classification(pool, session_id, &scan).await?;

    Ok(scan)
}

async fn resolve_item_id(
    inventory: &InventoryClient,
    payload: &ScanPayload,
    caller_token: &str,
) -> Result<Option<i64>, AuditError> {
    if let Some(item_id) = payload.item_id {
        return Ok(Some(item_id));
    }
    let barcode_value = payload.barcode_value.as_deref().unwrap_or("");
    let normalized = aud_schemas::barcode::normalize(barcode_value).map_err(|_| AuditError::validation("invalid_barcode"))?;

    match inventory.resolve_by_barcode(caller_token, &normalized).await {
        Ok(Some(item)) => Ok(Some(item.id)),
        Ok(None) => Ok(None),
        Err(e) => Err(from_collab(e, "inventory_forbidden")),
    }
}

/// The incremental, best-effort preview applied after every accepted scan:
/// upgrade the matching ItemResult (if the scan resolved to a known item)
/// and upsert the open discrepancy row the classifier derives.
async fn apply_incremental_classification(pool: &PgPool, session_id: Uuid, scan: &Scan) -> Result<(), AuditError> {
    let expected = match scan.item_id {
        Some(item_id) => aud_db::expected_items::list_for_session(pool, session_id)
            .await
            .map_err(|e| AuditError::StateConflict(e.to_string()))?
            .into_iter()
            .find(|e| e.item_id == item_id),
        None => None,
    };
    let expected_facts = expected
        .as_ref()
        .map(|e| ExpectedItemFacts { item_id: e.item_id, expected_location_id: e.expected_location_id });

    if let Some(item_id) = scan.item_id {
        if let Some(exp) = &expected_facts {
            let outcome = item_result_outcome(exp.expected_location_id, scan.found_location_id);
            let status = match outcome {
                ItemResultOutcome::FoundInPlace => ItemResultStatus::FoundInPlace,
                ItemResultOutcome::Found => ItemResultStatus::Found,
            };
            item_results::apply_scan_result(pool, session_id, item_id, scan.found_location_id, status, scan.scan_time)
                .await
                .map_err(|e| AuditError::StateConflict(e.to_string()))?;
        }
    }

    let scan_facts = ScanFacts {
        item_id: scan.item_id,
        barcode_value: scan.barcode_value.clone(),
        found_location_id: scan.found_location_id,
        scan_time: scan.scan_time,
    };

    if let Some(draft) = classify_scan(expected_facts.as_ref(), &scan_facts) {
        upsert_draft(pool, session_id, &draft).await?;
    }

    Ok(())
}

async fn upsert_draft(pool: &PgPool, session_id: Uuid, draft: &DiscrepancyDraft) -> Result<(), AuditError> {
    discrepancies::upsert_open(
        pool,
        session_id,
        draft.discrepancy_type,
        draft.item_id,
        draft.barcode_value.as_deref(),
        draft.expected_location_id,
        draft.found_location_id,
    )
    .await
    .map_err(|e| AuditError::StateConflict(e.to_string()))
}
