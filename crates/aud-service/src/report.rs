//! Plan/session reporting, service layer. Stitches `aud_db::report`'s raw
//! per-session counts together with `aud_engine::report`'s rate math and
//! totals the plan up from per-session figures (never averaged).

use aud_db::report::{plan_raw_counts, SessionRawCounts};
use aud_engine::{plan_totals, session_figures, SessionFigures};
use aud_schemas::Session;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AuditError;

pub struct SessionReport {
    pub session: Session,
    pub figures: SessionFigures,
    pub scan_count: i64,
    pub unexpected: i64,
    pub duplicate: i64,
    pub unknown_barcode: i64,
    pub discrepancies_total: i64,
    pub discrepancies_open: i64,
    pub discrepancies_resolved: i64,
    pub discrepancies_ignored: i64,
}

pub struct PlanReport {
    pub plan_id: Uuid,
    pub sessions: Vec<SessionReport>,
    pub totals: SessionFigures,
    pub rooms_done: i64,
}

pub async fn get_plan_report(pool: &PgPool, plan_id: Uuid) -> Result<PlanReport, AuditError> {
    let rows = plan_raw_counts(pool, plan_id).await.map_err(|e| AuditError::StateConflict(e.to_string()))?;
    if rows.is_empty() {
        return Err(AuditError::not_found("plan_not_found"));
    }

    let rooms_done = rows
        .iter()
        .filter(|(s, _)| matches!(s.status, aud_schemas::SessionStatus::Applied | aud_schemas::SessionStatus::Closed))
        .count() as i64;

    let sessions: Vec<SessionReport> = rows
        .into_iter()
        .map(|(session, counts): (Session, SessionRawCounts)| {
            let figures = session_figures(counts.missing, counts.found, counts.found_in_place);
            SessionReport {
                session,
                figures,
                scan_count: counts.scan_count,
                unexpected: counts.unexpected,
                duplicate: counts.duplicate,
                unknown_barcode: counts.unknown_barcode,
                discrepancies_total: counts.discrepancies_total,
                discrepancies_open: counts.discrepancies_open,
                discrepancies_resolved: counts.discrepancies_resolved,
                discrepancies_ignored: counts.discrepancies_ignored,
            }
        })
        .collect();

    let totals = plan_totals(&sessions.iter().map(|s| s.figures).collect::<Vec<_>>());

    Ok(PlanReport { plan_id, sessions, totals, rooms_done })
}
