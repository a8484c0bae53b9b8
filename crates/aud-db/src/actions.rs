use anyhow::{Context, Result};
use aud_schemas::{Action, ActionStatus, ActionType};
use sqlx::{PgPool, Postgres, Row};
use uuid::Uuid;

fn row_to_action(row: sqlx::postgres::PgRow) -> Result<Action> {
    let type_str: String = row.try_get("action_type")?;
    let status_str: String = row.try_get("status")?;
    Ok(Action {
        id: row.try_get("id")?,
        session_id: row.try_get("session_id")?,
        action_type: ActionType::parse(&type_str).context("unknown action_type in db")?,
        payload: row.try_get("payload")?,
        status: ActionStatus::parse(&status_str).context("unknown action status in db")?,
        idempotency_key: row.try_get("idempotency_key")?,
        last_error: row.try_get("last_error")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

const ACTION_COLUMNS: &str = r#"
    id, session_id, action_type::text as action_type, payload, status::text as status,
    idempotency_key, last_error, created_at, updated_at
"#;

pub struct NewAction {
    pub action_type: ActionType,
    pub payload: serde_json::Value,
    pub idempotency_key: String,
}

/// Insert a pending Action. Duplicate `idempotency_key`s are swallowed so
/// `build_actions_from_resolutions` stays idempotent across retries.
pub async fn insert_pending(pool: &PgPool, session_id: Uuid, new: &NewAction) -> Result<Option<Action>> {
    let result = sqlx::query(&format!(
        r#"
        insert into audit_actions (session_id, action_type, payload, idempotency_key)
        values ($1, $2::audit_action_type, $3, $4)
        returning {ACTION_COLUMNS}
        "#
    ))
    .bind(session_id)
    .bind(new.action_type.as_str())
    .bind(&new.payload)
    .bind(&new.idempotency_key)
    .fetch_one(pool)
    .await;

    match result {
        Ok(row) => Ok(Some(row_to_action(row)?)),
        Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => Ok(None),
        Err(err) => Err(err).context("insert action failed"),
    }
}

pub async fn list_for_session(pool: &PgPool, session_id: Uuid) -> Result<Vec<Action>> {
    let rows = sqlx::query(&format!(
        "select {ACTION_COLUMNS} from audit_actions where session_id = $1 order by created_at asc"
    ))
    .bind(session_id)
    .fetch_all(pool)
    .await
    .context("list actions for session failed")?;

    rows.into_iter().map(row_to_action).collect()
}

/// `pending` Actions for a session — what `apply_session` attempts on each
/// invocation. A `failed` Action is never re-selected here: retrying it
/// requires a new resolution to produce a fresh Action row via
/// `build_actions_from_resolutions` (a new idempotency key), not an automatic
/// re-pick of the failed one.
pub async fn list_pending_for_session(pool: &PgPool, session_id: Uuid) -> Result<Vec<Action>> {
    let rows = sqlx::query(&format!(
        r#"
        select {ACTION_COLUMNS} from audit_actions
        where session_id = $1 and status = 'pending'
        order by created_at asc
        "#
    ))
    .bind(session_id)
    .fetch_all(pool)
    .await
    .context("list_pending_for_session failed")?;

    rows.into_iter().map(row_to_action).collect()
}

pub async fn mark_done(pool: &PgPool, action_ids: &[Uuid]) -> Result<()> {
    sqlx::query("update audit_actions set status = 'done', last_error = null, updated_at = now() where id = any($1)")
        .bind(action_ids)
        .execute(pool)
        .await
        .context("mark_done failed")?;
    Ok(())
}

pub async fn mark_failed(pool: &PgPool, action_ids: &[Uuid], error: &str) -> Result<()> {
    sqlx::query("update audit_actions set status = 'failed', last_error = $2, updated_at = now() where id = any($1)")
        .bind(action_ids)
        .bind(error)
        .execute(pool)
        .await
        .context("mark_failed failed")?;
    Ok(())
}

pub async fn count_not_done(pool: &PgPool, session_id: Uuid) -> Result<i64> {
    let row = sqlx::query(
        "select count(*)::bigint as n from audit_actions where session_id = $1 and status != 'done'",
    )
    .bind(session_id)
    .fetch_one(pool)
    .await
    .context("count_not_done failed")?;
    row.try_get("n").context("read action count")
}
