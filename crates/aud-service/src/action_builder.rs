//! Action building from resolved discrepancies, service layer.
//!
//! Grounded on `audit_action_service.build_actions_from_resolutions`. Walks
//! every `resolved` Discrepancy for the session, parses its
//! `resolution_payload` as a move instruction (aud-engine, pure), and inserts
//! one pending Action per well-formed instruction. Re-invocation is
//! idempotent: the deterministic idempotency key collides on retry and
//! `aud_db::actions::insert_pending` swallows the conflict.

use aud_db::actions;
use aud_engine::{move_idempotency_key, parse_move_instruction};
use aud_schemas::{ActionType, SessionStatus};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AuditError;

pub async fn build_actions_from_resolutions(pool: &PgPool, session_id: Uuid) -> Result<usize, AuditError> {
    let session = aud_db::get_session(pool, session_id)
        .await
        .map_err(|e| AuditError::StateConflict(e.to_string()))?
        .ok_or_else(|| AuditError::not_found("session_not_found"))?;

    if session.status != SessionStatus::Approved {
        return Err(AuditError::state_conflict("session_not_approved"));
    }

    let resolved = aud_db::discrepancies::list_resolved_for_session(pool, session_id)
        .await
        .map_err(|e| AuditError::StateConflict(e.to_string()))?;

    let mut created = 0usize;
    for discrepancy in resolved {
        let Some(payload) = &discrepancy.resolution_payload else { continue };
        let Some(instr) = parse_move_instruction(payload) else { continue };
        let Some(item_id) = discrepancy.item_id else { continue };

        let idempotency_key = move_idempotency_key(session_id, discrepancy.id, &instr);
        let new_action = actions::NewAction {
            action_type: ActionType::Move,
            payload: json!({
                "item_id": item_id,
                "discrepancy_id": discrepancy.id,
                "to_location_id": instr.to_location_id,
                "responsible_id_is_set": instr.responsible_id.is_set,
                "responsible_id": instr.responsible_id.value,
            }),
            idempotency_key,
        };

        if actions::insert_pending(pool, session_id, &new_action)
            .await
            .map_err(|e| AuditError::StateConflict(e.to_string()))?
            .is_some()
        {
            created += 1;
        }
    }

    Ok(created)
}
