//! Request bodies for aud-daemon's HTTP surface. Response bodies are the
//! `aud-schemas` entity types directly — they already derive `Serialize`.

use aud_schemas::{PlanStatus, ScopeType};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use aud_db::plans::{NewPlan, PlanPatch};
use aud_service::AuditError;

#[derive(Debug, Deserialize)]
pub struct CreatePlanRequest {
    pub title: String,
    pub scope_type: ScopeType,
    #[serde(default = "default_scope_payload")]
    pub scope_payload: Value,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

fn default_scope_payload() -> Value {
    Value::Object(Default::default())
}

impl CreatePlanRequest {
    pub fn into_new_plan(self, created_by: i64) -> NewPlan {
        NewPlan {
            title: self.title,
            scope_type: self.scope_type,
            scope_payload: self.scope_payload,
            start_date: self.start_date,
            end_date: self.end_date,
            created_by,
        }
    }
}

/// `PATCH /plans/{id}` is a true partial patch: a field absent from the
/// request body leaves the column untouched, while `start_date`/`end_date`
/// additionally distinguish "absent" from "present and null" — the same
/// tri-state concern as `ResponsibleId`. A raw `Value` lets
/// the handler tell those two cases apart before building a typed
/// [`PlanPatch`]; a typed `Option<Option<T>>` field can't express it without
/// a custom deserializer.
pub fn parse_plan_patch(body: &Value) -> Result<PlanPatch, AuditError> {
    let obj = body.as_object().ok_or_else(|| AuditError::validation("invalid_patch_body"))?;

    let title = match obj.get("title") {
        None => None,
        Some(v) => Some(v.as_str().ok_or_else(|| AuditError::validation("title_must_be_string"))?.to_string()),
    };
    let scope_type = match obj.get("scope_type") {
        None => None,
        Some(v) => {
            let s = v.as_str().ok_or_else(|| AuditError::validation("scope_type_must_be_string"))?;
            Some(ScopeType::parse(s).ok_or_else(|| AuditError::validation("invalid_scope_type"))?)
        }
    };
    let scope_payload = obj.get("scope_payload").cloned();
    let status = match obj.get("status") {
        None => None,
        Some(v) => {
            let s = v.as_str().ok_or_else(|| AuditError::validation("status_must_be_string"))?;
            Some(PlanStatus::parse(s).ok_or_else(|| AuditError::validation("invalid_plan_status"))?)
        }
    };

    let start_date = parse_tri_state_date(obj.get("start_date"))?;
    let end_date = parse_tri_state_date(obj.get("end_date"))?;

    Ok(PlanPatch { title, scope_type, scope_payload, start_date, end_date, status })
}

fn parse_tri_state_date(raw: Option<&Value>) -> Result<Option<Option<DateTime<Utc>>>, AuditError> {
    match raw {
        None => Ok(None),
        Some(Value::Null) => Ok(Some(None)),
        Some(v) => {
            let s = v.as_str().ok_or_else(|| AuditError::validation("date_must_be_rfc3339_string"))?;
            let parsed: DateTime<Utc> =
                s.parse().map_err(|_| AuditError::validation("date_must_be_rfc3339_string"))?;
            Ok(Some(Some(parsed)))
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateSessionRequest {
    pub plan_id: Option<Uuid>,
    pub location_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct CreateScanRequest {
    pub item_id: Option<i64>,
    pub barcode_value: Option<String>,
    pub found_location_id: i64,
    pub notes: Option<String>,
    pub photo_url: Option<String>,
    pub client_scan_id: String,
    pub extra: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub struct ResolveDiscrepancyRequest {
    pub resolution_status: aud_schemas::ResolutionStatus,
    pub resolution_payload: Option<Value>,
}
