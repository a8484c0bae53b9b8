//! Collaborator error mapping shared by every adapter in this crate.
//!
//! Transport failures and timeouts become `Unavailable` (503 at the HTTP
//! boundary); 403 becomes `Forbidden`; 404 becomes `NotFound` (or, for
//! lookups that treat "not found" as a legitimate empty result, is handled
//! by the caller before this type is ever constructed); any other non-2xx or
//! a malformed body becomes `Upstream`.

#[derive(Debug, Clone)]
pub enum CollabError {
    Unavailable(String),
    Forbidden,
    NotFound,
    Upstream(String),
}

impl std::fmt::Display for CollabError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CollabError::Unavailable(detail) => write!(f, "upstream_unavailable: {detail}"),
            CollabError::Forbidden => write!(f, "forbidden"),
            CollabError::NotFound => write!(f, "not_found"),
            CollabError::Upstream(detail) => write!(f, "upstream_error: {detail}"),
        }
    }
}

impl std::error::Error for CollabError {}

impl From<reqwest::Error> for CollabError {
    fn from(err: reqwest::Error) -> Self {
        CollabError::Unavailable(err.to_string())
    }
}

/// Maps a response whose status is already known to be non-2xx. Callers that
/// treat 404 as a normal outcome (e.g. barcode resolution) must check the
/// status themselves before reaching this helper.
pub fn map_error_status(status: reqwest::StatusCode) -> CollabError {
    match status {
        reqwest::StatusCode::FORBIDDEN => CollabError::Forbidden,
        reqwest::StatusCode::NOT_FOUND => CollabError::NotFound,
        other => CollabError::Upstream(format!("unexpected status {other}")),
    }
}
