//! Session creation and read paths. Creation requires room access *before*
//! the row exists; `start_session` (`snapshot.rs`) is the later, separate
//! call that snapshots.

use aud_collab::LocationClient;
use aud_db::sessions::{self, SessionFilter};
use aud_schemas::Session;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{from_collab, AuditError};

pub async fn create_session(
    pool: &PgPool,
    location: &LocationClient,
    plan_id: Option<Uuid>,
    location_id: i64,
    caller_token: &str,
) -> Result<Session, AuditError> {
    location
        .assert_room_access(caller_token, location_id)
        .await
        .map_err(|e| from_collab(e, "room_forbidden"))?;

    sessions::create_session(pool, plan_id, location_id)
        .await
        .map_err(|e| AuditError::StateConflict(e.to_string()))
}

pub async fn get_session(pool: &PgPool, session_id: Uuid) -> Result<Session, AuditError> {
    sessions::get_session(pool, session_id)
        .await
        .map_err(|e| AuditError::StateConflict(e.to_string()))?
        .ok_or_else(|| AuditError::not_found("session_not_found"))
}

pub async fn list_sessions(pool: &PgPool, filter: &SessionFilter) -> Result<Vec<Session>, AuditError> {
    sessions::list_sessions(pool, filter).await.map_err(|e| AuditError::StateConflict(e.to_string()))
}
