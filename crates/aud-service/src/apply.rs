//! Applying a session's resolved Actions against the inventory collaborator.
//!
//! Grounded on `audit_action_service.apply_session`. Loads every `pending`
//! Action, groups by `(to_location_id, responsible_id_is_set,
//! responsible_id)` — the shape `inventory.bulk_move` accepts — and applies
//! each group independently. A group's failure never rolls back another
//! group's success; the session reaches `applied` only once every Action it
//! owns is `done`. A `failed` Action is never picked back up automatically —
//! retrying it requires a new resolution to produce a fresh Action (a new
//! idempotency key) via `build_actions_from_resolutions`.

use std::collections::BTreeMap;

use aud_collab::{BulkMoveResponsible, InventoryClient};
use aud_db::{actions, sessions};
use aud_schemas::{Action, Session, SessionStatus};
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AuditError;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct GroupKey {
    to_location_id: i64,
    is_set: bool,
    responsible_id: Option<i64>,
}

struct ParsedAction {
    action: Action,
    item_id: i64,
    key: GroupKey,
}

fn parse_action(action: Action) -> Option<ParsedAction> {
    let obj = action.payload.as_object()?;
    let item_id = obj.get("item_id")?.as_i64()?;
    let to_location_id = obj.get("to_location_id")?.as_i64()?;
    let is_set = obj.get("responsible_id_is_set")?.as_bool()?;
    let responsible_id = obj.get("responsible_id").and_then(|v| v.as_i64());
    let key = GroupKey { to_location_id, is_set, responsible_id };
    Some(ParsedAction { action, item_id, key })
}

pub async fn apply_session(pool: &PgPool, inventory: &InventoryClient, session_id: Uuid, caller_token: &str) -> Result<Session, AuditError> {
    let session = sessions::get_session(pool, session_id)
        .await
        .map_err(|e| AuditError::StateConflict(e.to_string()))?
        .ok_or_else(|| AuditError::not_found("session_not_found"))?;

    if session.status != SessionStatus::Approved {
        return Err(AuditError::state_conflict("session_not_approved"));
    }

    let pending = actions::list_pending_for_session(pool, session_id)
        .await
        .map_err(|e| AuditError::StateConflict(e.to_string()))?;

    let mut groups: BTreeMap<GroupKey, Vec<ParsedAction>> = BTreeMap::new();
    for raw in pending {
        if let Some(parsed) = parse_action(raw) {
            groups.entry(parsed.key.clone()).or_default().push(parsed);
        }
        // A malformed payload is skipped entirely — it is neither marked
        // done nor failed, matching the original's "undefined" handling of
        // an action whose shape doesn't match any group.
    }

    for (key, members) in groups {
        let action_ids: Vec<Uuid> = members.iter().map(|m| m.action.id).collect();
        let item_ids: Vec<i64> = members.iter().map(|m| m.item_id).collect();
        let responsible = BulkMoveResponsible { is_set: key.is_set, value: key.responsible_id };

        let result = inventory.bulk_move(caller_token, &item_ids, key.to_location_id, &responsible).await;

        match result {
            Ok(()) => {
                actions::mark_done(pool, &action_ids).await.map_err(|e| AuditError::StateConflict(e.to_string()))?;
            }
            Err(err) => {
                actions::mark_failed(pool, &action_ids, &err.to_string())
                    .await
                    .map_err(|e| AuditError::StateConflict(e.to_string()))?;
            }
        }
    }

    // Applied only once every Action the session owns is `done`. A group
    // that failed leaves its Actions `failed`; they stay that way until a
    // new resolution rebuilds a fresh Action for the same discrepancy — a
    // bare `apply_session` retry only re-attempts what is still `pending`.
    let not_done = actions::count_not_done(pool, session_id)
        .await
        .map_err(|e| AuditError::StateConflict(e.to_string()))?;
    if not_done > 0 {
        return sessions::get_session(pool, session_id)
            .await
            .map_err(|e| AuditError::StateConflict(e.to_string()))?
            .ok_or_else(|| AuditError::not_found("session_not_found"));
    }

    sessions::mark_applied(pool, session_id, Utc::now())
        .await
        .map_err(|e| AuditError::StateConflict(e.to_string()))
}
