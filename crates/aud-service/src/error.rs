//! `AuditError`: the one error type every `aud-service` operation returns.
//! Mirrors the original's `HTTPException(status_code, detail=...)` pairs —
//! `detail` strings are preserved verbatim since mobile/supervisor clients
//! may already match on them. `aud-daemon` maps each variant to HTTP status
//! via `IntoResponse` (kept out of this crate so `aud-service` stays
//! framework-agnostic).

use aud_collab::CollabError;

#[derive(Debug, Clone)]
pub enum AuditError {
    NotFound(String),
    StateConflict(String),
    Validation(String),
    Forbidden(String),
    Unauthorised(String),
    UpstreamUnavailable(String),
    UpstreamError(String),
}

impl AuditError {
    pub fn not_found(detail: impl Into<String>) -> Self {
        AuditError::NotFound(detail.into())
    }

    pub fn state_conflict(detail: impl Into<String>) -> Self {
        AuditError::StateConflict(detail.into())
    }

    pub fn validation(detail: impl Into<String>) -> Self {
        AuditError::Validation(detail.into())
    }

    pub fn forbidden(detail: impl Into<String>) -> Self {
        AuditError::Forbidden(detail.into())
    }

    pub fn detail(&self) -> &str {
        match self {
            AuditError::NotFound(d)
            | AuditError::StateConflict(d)
            | AuditError::Validation(d)
            | AuditError::Forbidden(d)
            | AuditError::Unauthorised(d)
            | AuditError::UpstreamUnavailable(d)
            | AuditError::UpstreamError(d) => d,
        }
    }
}

impl std::fmt::Display for AuditError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.detail())
    }
}

impl std::error::Error for AuditError {}

impl From<aud_engine::TransitionError> for AuditError {
    fn from(err: aud_engine::TransitionError) -> Self {
        AuditError::StateConflict(err.to_string())
    }
}

/// Maps a collaborator error using the caller-supplied detail string for the
/// `Forbidden` case — call sites disagree on that string (`room_forbidden`
/// vs `inventory_forbidden`) so it isn't baked into a blanket `From` impl.
pub fn from_collab(err: CollabError, forbidden_detail: &str) -> AuditError {
    match err {
        CollabError::Unavailable(detail) => AuditError::UpstreamUnavailable(detail),
        CollabError::Forbidden => AuditError::Forbidden(forbidden_detail.to_string()),
        CollabError::NotFound => AuditError::NotFound("upstream_not_found".to_string()),
        CollabError::Upstream(detail) => AuditError::UpstreamError(detail),
    }
}
