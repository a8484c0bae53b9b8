//! Grouped aggregate queries backing plan/session reporting. Rate math
//! itself lives in `aud-engine::report` — this module only fetches the raw
//! counts per session.

use anyhow::{Context, Result};
use aud_schemas::{DiscrepancyType, ResolutionStatus};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{discrepancies, item_results, scans, sessions::SessionFilter};

pub struct SessionRawCounts {
    pub session_id: Uuid,
    pub missing: i64,
    pub found: i64,
    pub found_in_place: i64,
    pub scan_count: i64,
    pub unexpected: i64,
    pub duplicate: i64,
    pub unknown_barcode: i64,
    pub discrepancies_total: i64,
    pub discrepancies_open: i64,
    pub discrepancies_resolved: i64,
    pub discrepancies_ignored: i64,
}

/// All sessions for a plan plus their per-session discrepancy/item-result/
/// action counts, stitched together per session.
pub async fn plan_raw_counts(pool: &PgPool, plan_id: Uuid) -> Result<Vec<(aud_schemas::Session, SessionRawCounts)>> {
    let sessions = sessions_for_plan(pool, plan_id).await?;
    if sessions.is_empty() {
        return Ok(Vec::new());
    }
    let session_ids: Vec<Uuid> = sessions.iter().map(|s| s.id).collect();

    let scan_counts = scans::counts_by_session(pool, &session_ids).await?;
    let discrepancy_counts = discrepancies::counts_by_type_and_resolution(pool, &session_ids).await?;

    let mut out = Vec::with_capacity(sessions.len());
    for session in sessions {
        let (missing, found, found_in_place) = item_results::counts_by_status(pool, session.id).await?;
        let scan_count = scan_counts.get(&session.id).copied().unwrap_or(0);

        let by_type_and_resolution = discrepancy_counts.get(&session.id).cloned().unwrap_or_default();
        let sum_where = |pred: &dyn Fn(DiscrepancyType, ResolutionStatus) -> bool| -> i64 {
            by_type_and_resolution.iter().filter(|(t, r, _)| pred(*t, *r)).map(|(_, _, n)| n).sum()
        };

        let unexpected = sum_where(&|t, _| t == DiscrepancyType::Unexpected);
        let duplicate = sum_where(&|t, _| t == DiscrepancyType::Duplicate);
        let unknown_barcode = sum_where(&|t, _| t == DiscrepancyType::UnknownBarcode);
        let discrepancies_total: i64 = by_type_and_resolution.iter().map(|(_, _, n)| n).sum();
        let discrepancies_open = sum_where(&|_, r| r == ResolutionStatus::Open);
        let discrepancies_resolved = sum_where(&|_, r| r == ResolutionStatus::Resolved);
        let discrepancies_ignored = sum_where(&|_, r| r == ResolutionStatus::Ignored);

        let counts = SessionRawCounts {
            session_id: session.id,
            missing,
            found,
            found_in_place,
            scan_count,
            unexpected,
            duplicate,
            unknown_barcode,
            discrepancies_total,
            discrepancies_open,
            discrepancies_resolved,
            discrepancies_ignored,
        };
        out.push((session, counts));
    }

    Ok(out)
}

async fn sessions_for_plan(pool: &PgPool, plan_id: Uuid) -> Result<Vec<aud_schemas::Session>> {
    crate::sessions::list_sessions(
        pool,
        &SessionFilter { location_id: None, plan_id: Some(plan_id), status: None, limit: 500, offset: 0 },
    )
    .await
    .context("sessions_for_plan failed")
}
