//! Session status transition validation.
//!
//! Deterministic, pure logic. No IO. Validates transitions only; the service
//! layer owns timestamps, actor ids, and commit ordering.

use aud_schemas::SessionStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionError {
    /// The session was not in the state this transition requires.
    WrongState { expected: SessionStatus },
}

impl std::fmt::Display for TransitionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransitionError::WrongState { expected } => {
                write!(f, "session_not_{}", expected.as_str())
            }
        }
    }
}

impl std::error::Error for TransitionError {}

fn require(current: SessionStatus, expected: SessionStatus) -> Result<(), TransitionError> {
    if current == expected {
        Ok(())
    } else {
        Err(TransitionError::WrongState { expected })
    }
}

/// `draft --start--> in_progress`
pub fn can_start(current: SessionStatus) -> Result<(), TransitionError> {
    require(current, SessionStatus::Draft)
}

/// `in_progress --close--> reconciling` (the service then rebuilds and
/// commits the follow-on transition to `awaiting_approval` separately).
pub fn can_close(current: SessionStatus) -> Result<(), TransitionError> {
    require(current, SessionStatus::InProgress)
}

/// `awaiting_approval --approve--> approved`. Caller must separately enforce
/// invariant I3 (no open discrepancies) before committing.
pub fn can_approve(current: SessionStatus) -> Result<(), TransitionError> {
    require(current, SessionStatus::AwaitingApproval)
}

/// `approved --build_actions--> approved` (idempotent, no state change).
pub fn can_build_actions(current: SessionStatus) -> Result<(), TransitionError> {
    require(current, SessionStatus::Approved)
}

/// `approved --apply--> applied | approved`
pub fn can_apply(current: SessionStatus) -> Result<(), TransitionError> {
    require(current, SessionStatus::Approved)
}
