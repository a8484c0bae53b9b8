//! Bearer-token authentication and role enforcement at the HTTP boundary.
//!
//! Every mutating (and most read) handlers call [`authenticate`] first: it
//! extracts the `Authorization: Bearer <token>` header, validates it against
//! the auth collaborator's `/auth/me`, and hands back the caller's id/roles
//! plus the raw token (forwarded to downstream collaborator calls so
//! authorisation flows through).

use axum::http::HeaderMap;

use aud_collab::{AuthClient, AuthUser};
use aud_engine::{has_role, Role, RoleNames};
use aud_service::AuditError;

pub struct Caller {
    pub id: i64,
    pub roles: Vec<String>,
    pub token: String,
}

pub async fn authenticate(auth: &AuthClient, headers: &HeaderMap) -> Result<Caller, AuditError> {
    let token = bearer_token(headers).ok_or_else(|| AuditError::Unauthorised("missing_bearer_token".to_string()))?;

    let user: AuthUser = auth.me(&token).await.map_err(|_| AuditError::Unauthorised("token_rejected".to_string()))?;

    Ok(Caller { id: user.id, roles: user.roles, token })
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let raw = headers.get(axum::http::header::AUTHORIZATION)?.to_str().ok()?;
    raw.strip_prefix("Bearer ").map(|s| s.to_string())
}

pub fn require_role(caller: &Caller, role_names: &RoleNames, required: Role) -> Result<(), AuditError> {
    if has_role(&caller.roles, role_names, required) {
        Ok(())
    } else {
        Err(AuditError::forbidden("role_required"))
    }
}
