//! Resolution parsing and action-idempotency-key derivation.
//!
//! Deterministic, pure logic. No IO. Parses a resolved discrepancy's
//! `resolution_payload` into a move instruction (or `None` for any other
//! resolution shape) and derives the stable idempotency key that makes
//! `build_actions_from_resolutions` safe to re-invoke.

use aud_schemas::ResponsibleId;
use serde_json::Value;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveInstruction {
    pub to_location_id: i64,
    pub responsible_id: ResponsibleId,
}

/// Extracts a move instruction from a resolved discrepancy's payload.
/// Returns `None` for `assign_responsible`, `clear_responsible`, `ignored`,
/// or any payload that isn't a well-formed `{"action":"move", ...}` object.
pub fn parse_move_instruction(payload: &Value) -> Option<MoveInstruction> {
    let obj = payload.as_object()?;
    if obj.get("action")?.as_str()? != "move" {
        return None;
    }
    let to_location_id = obj.get("to_location_id")?.as_i64()?;

    let responsible_id = match obj.get("responsible_id") {
        None => ResponsibleId::untouched(),
        Some(Value::Null) => ResponsibleId::clear(),
        Some(v) => ResponsibleId::set(v.as_i64()?),
    };

    Some(MoveInstruction { to_location_id, responsible_id })
}

/// `"session:{S}:discrepancy:{D}:move:{to_location_id}:{is_set}:{responsible_id}"`
pub fn move_idempotency_key(session_id: Uuid, discrepancy_id: Uuid, instr: &MoveInstruction) -> String {
    let responsible = match instr.responsible_id.value {
        Some(v) => v.to_string(),
        None => "None".to_string(),
    };
    format!(
        "session:{session_id}:discrepancy:{discrepancy_id}:move:{}:{}:{responsible}",
        instr.to_location_id, instr.responsible_id.is_set,
    )
}
