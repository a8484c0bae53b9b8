//! Discrepancy resolution. Pure CRUD: records the supervisor's decision with
//! no side effects on Actions — `build_actions_from_resolutions` is a
//! separate, explicit step.

use aud_db::discrepancies;
use aud_schemas::{Discrepancy, ResolutionStatus};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AuditError;

pub async fn resolve_discrepancy(
    pool: &PgPool,
    discrepancy_id: Uuid,
    resolution_status: ResolutionStatus,
    resolution_payload: Option<serde_json::Value>,
) -> Result<Discrepancy, AuditError> {
    discrepancies::resolve(pool, discrepancy_id, resolution_status, resolution_payload)
        .await
        .map_err(|e| AuditError::StateConflict(e.to_string()))?
        .ok_or_else(|| AuditError::not_found("discrepancy_not_found"))
}
