//! aud-schemas
//!
//! Entity DTOs and the barcode normaliser shared across the audit core.
//! Deterministic pure logic only — no IO, no DB types.

pub mod barcode;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanStatus {
    Draft,
    Scheduled,
    Active,
    Closed,
    Canceled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScopeType {
    Location,
    Department,
    Custom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Draft,
    InProgress,
    Reconciling,
    AwaitingApproval,
    Approved,
    Applied,
    Closed,
    Canceled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemResultStatus {
    Missing,
    Found,
    FoundInPlace,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscrepancyType {
    Missing,
    Misplaced,
    Unexpected,
    Duplicate,
    UnknownBarcode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionStatus {
    Open,
    Resolved,
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    Move,
    AssignResponsible,
    ClearResponsible,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionStatus {
    Pending,
    Sent,
    Done,
    Failed,
}

macro_rules! pg_enum_str {
    ($ty:ty, $($variant:ident => $s:literal),+ $(,)?) => {
        impl $ty {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(<$ty>::$variant => $s,)+
                }
            }

            pub fn parse(s: &str) -> Option<Self> {
                match s {
                    $($s => Some(<$ty>::$variant),)+
                    _ => None,
                }
            }
        }

        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.as_str())
            }
        }
    };
}

pg_enum_str!(PlanStatus,
    Draft => "draft", Scheduled => "scheduled", Active => "active",
    Closed => "closed", Canceled => "canceled",
);
pg_enum_str!(ScopeType, Location => "location", Department => "department", Custom => "custom");
pg_enum_str!(SessionStatus,
    Draft => "draft", InProgress => "in_progress", Reconciling => "reconciling",
    AwaitingApproval => "awaiting_approval", Approved => "approved",
    Applied => "applied", Closed => "closed", Canceled => "canceled",
);
pg_enum_str!(ItemResultStatus, Missing => "missing", Found => "found", FoundInPlace => "found_in_place");
pg_enum_str!(DiscrepancyType,
    Missing => "missing", Misplaced => "misplaced", Unexpected => "unexpected",
    Duplicate => "duplicate", UnknownBarcode => "unknown_barcode",
);
pg_enum_str!(ResolutionStatus, Open => "open", Resolved => "resolved", Ignored => "ignored");
pg_enum_str!(ActionType, Move => "move", AssignResponsible => "assign_responsible", ClearResponsible => "clear_responsible");
pg_enum_str!(ActionStatus, Pending => "pending", Sent => "sent", Done => "done", Failed => "failed");

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
    pub id: Uuid,
    pub title: String,
    pub scope_type: ScopeType,
    pub scope_payload: serde_json::Value,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub status: PlanStatus,
    pub created_by: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: Uuid,
    pub plan_id: Option<Uuid>,
    pub location_id: i64,
    pub status: SessionStatus,
    pub started_by: Option<i64>,
    pub started_at: Option<DateTime<Utc>>,
    pub closed_by: Option<i64>,
    pub closed_at: Option<DateTime<Utc>>,
    pub approved_by: Option<i64>,
    pub approved_at: Option<DateTime<Utc>>,
    pub applied_at: Option<DateTime<Utc>>,
    pub expected_snapshot_version: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpectedItem {
    pub id: Uuid,
    pub session_id: Uuid,
    pub item_id: i64,
    pub expected_location_id: Option<i64>,
    pub expected_responsible_id: Option<i64>,
    pub barcode_id: Option<i64>,
    pub captured_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scan {
    pub id: Uuid,
    pub session_id: Uuid,
    pub scanner_user_id: i64,
    pub scan_time: DateTime<Utc>,
    pub barcode_value: Option<String>,
    pub item_id: Option<i64>,
    pub found_location_id: i64,
    pub notes: Option<String>,
    pub photo_url: Option<String>,
    pub client_scan_id: String,
    pub extra: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemResult {
    pub id: Uuid,
    pub session_id: Uuid,
    pub item_id: i64,
    pub status: ItemResultStatus,
    pub expected_location_id: Option<i64>,
    pub found_location_id: Option<i64>,
    pub first_found_at: Option<DateTime<Utc>>,
    pub last_scan_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Discrepancy {
    pub id: Uuid,
    pub session_id: Uuid,
    pub discrepancy_type: DiscrepancyType,
    pub item_id: Option<i64>,
    pub barcode_value: Option<String>,
    pub expected_location_id: Option<i64>,
    pub found_location_id: Option<i64>,
    pub resolution_status: ResolutionStatus,
    pub resolution_payload: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Action {
    pub id: Uuid,
    pub session_id: Uuid,
    pub action_type: ActionType,
    pub payload: serde_json::Value,
    pub status: ActionStatus,
    pub idempotency_key: String,
    pub last_error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The tri-state `responsible_id` carried in a move resolution/action payload:
/// `is_set=false` means "do not touch", `is_set=true, value=None` means
/// "explicitly clear". JSON alone can't distinguish "null" from "absent" once
/// deserialised into a typed struct, so both flags are stored explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponsibleId {
    pub is_set: bool,
    pub value: Option<i64>,
}

impl ResponsibleId {
    pub fn untouched() -> Self {
        Self { is_set: false, value: None }
    }

    pub fn clear() -> Self {
        Self { is_set: true, value: None }
    }

    pub fn set(value: i64) -> Self {
        Self { is_set: true, value: Some(value) }
    }
}
