//! Session approval, gated on every discrepancy being resolved.

use aud_db::{discrepancies, sessions};
use aud_schemas::Session;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AuditError;

/// `awaiting_approval -> approved`, rejecting the transition if any
/// Discrepancy for the session is still `resolution_status = open`.
pub async fn approve_session(pool: &PgPool, session_id: Uuid, approved_by: i64) -> Result<Session, AuditError> {
    let session = sessions::get_session(pool, session_id)
        .await
        .map_err(|e| AuditError::StateConflict(e.to_string()))?
        .ok_or_else(|| AuditError::not_found("session_not_found"))?;

    aud_engine::can_approve(session.status)?;

    let open_count = discrepancies::count_open(pool, session_id)
        .await
        .map_err(|e| AuditError::StateConflict(e.to_string()))?;
    if open_count > 0 {
        return Err(AuditError::state_conflict("discrepancies_not_resolved"));
    }

    sessions::approve_session(pool, session_id, approved_by, Utc::now())
        .await
        .map_err(|e| AuditError::StateConflict(e.to_string()))
}
