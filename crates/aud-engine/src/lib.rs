//! aud-engine
//!
//! Deterministic, pure logic for the audit core: discrepancy classification,
//! the session state machine, action building, report rate math, and role
//! membership checks. No IO. No DB calls. No collaborator calls.

pub mod action_builder;
pub mod classifier;
pub mod report;
pub mod roles;
pub mod state_machine;

pub use action_builder::{move_idempotency_key, parse_move_instruction, MoveInstruction};
pub use classifier::{classify_scan, item_result_outcome, rebuild_discrepancies, DiscrepancyDraft, ExpectedItemFacts, ItemResultOutcome, ScanFacts};
pub use report::{plan_totals, session_figures, SessionFigures};
pub use roles::{has_role, Role, RoleNames};
pub use state_machine::{can_apply, can_approve, can_build_actions, can_close, can_start, TransitionError};
