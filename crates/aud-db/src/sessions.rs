use anyhow::{Context, Result};
use aud_schemas::{Session, SessionStatus};
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Row};
use uuid::Uuid;

fn row_to_session(row: sqlx::postgres::PgRow) -> Result<Session> {
    let status_str: String = row.try_get("status")?;
    Ok(Session {
        id: row.try_get("id")?,
        plan_id: row.try_get("plan_id")?,
        location_id: row.try_get("location_id")?,
        status: SessionStatus::parse(&status_str).context("unknown session status in db")?,
        started_by: row.try_get("started_by")?,
        started_at: row.try_get("started_at")?,
        closed_by: row.try_get("closed_by")?,
        closed_at: row.try_get("closed_at")?,
        approved_by: row.try_get("approved_by")?,
        approved_at: row.try_get("approved_at")?,
        applied_at: row.try_get("applied_at")?,
        expected_snapshot_version: row.try_get("expected_snapshot_version")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

const SESSION_COLUMNS: &str = r#"
    id, plan_id, location_id, status::text as status, started_by, started_at,
    closed_by, closed_at, approved_by, approved_at, applied_at,
    expected_snapshot_version, created_at, updated_at
"#;

pub struct SessionFilter {
    pub location_id: Option<i64>,
    pub plan_id: Option<Uuid>,
    pub status: Option<SessionStatus>,
    pub limit: i64,
    pub offset: i64,
}

pub async fn list_sessions(pool: &PgPool, filter: &SessionFilter) -> Result<Vec<Session>> {
    let limit = filter.limit.clamp(1, 500);
    let rows = sqlx::query(&format!(
        r#"
        select {SESSION_COLUMNS}
        from audit_sessions
        where ($1::bigint is null or location_id = $1)
          and ($2::uuid is null or plan_id = $2)
          and ($3::text is null or status::text = $3)
        order by created_at desc
        limit $4 offset $5
        "#
    ))
    .bind(filter.location_id)
    .bind(filter.plan_id)
    .bind(filter.status.map(|s| s.as_str()))
    .bind(limit)
    .bind(filter.offset.max(0))
    .fetch_all(pool)
    .await
    .context("list_sessions failed")?;

    rows.into_iter().map(row_to_session).collect()
}

pub async fn get_session(pool: &PgPool, session_id: Uuid) -> Result<Option<Session>> {
    let row = sqlx::query(&format!("select {SESSION_COLUMNS} from audit_sessions where id = $1"))
        .bind(session_id)
        .fetch_optional(pool)
        .await
        .context("get_session failed")?;
    row.map(row_to_session).transpose()
}

/// Same read, locked for update — used inside transitions that must observe
/// and then commit a status change atomically against concurrent writers.
pub async fn get_session_for_update<'e>(
    tx: &mut sqlx::Transaction<'e, Postgres>,
    session_id: Uuid,
) -> Result<Option<Session>> {
    let row = sqlx::query(&format!(
        "select {SESSION_COLUMNS} from audit_sessions where id = $1 for update"
    ))
    .bind(session_id)
    .fetch_optional(&mut **tx)
    .await
    .context("get_session_for_update failed")?;
    row.map(row_to_session).transpose()
}

pub async fn create_session(pool: &PgPool, plan_id: Option<Uuid>, location_id: i64) -> Result<Session> {
    let row = sqlx::query(&format!(
        r#"
        insert into audit_sessions (plan_id, location_id)
        values ($1, $2)
        returning {SESSION_COLUMNS}
        "#
    ))
    .bind(plan_id)
    .bind(location_id)
    .fetch_one(pool)
    .await
    .context("create_session failed")?;

    row_to_session(row)
}

/// Commits the `draft -> in_progress` transition with a fresh snapshot
/// version, as one statement in the snapshot's single transaction.
pub async fn start_session<'e>(
    tx: &mut sqlx::Transaction<'e, Postgres>,
    session_id: Uuid,
    started_by: i64,
    started_at: DateTime<Utc>,
    snapshot_version: Uuid,
) -> Result<Session> {
    let row = sqlx::query(&format!(
        r#"
        update audit_sessions set
          status = 'in_progress', started_by = $2, started_at = $3,
          expected_snapshot_version = $4, updated_at = now()
        where id = $1
        returning {SESSION_COLUMNS}
        "#
    ))
    .bind(session_id)
    .bind(started_by)
    .bind(started_at)
    .bind(snapshot_version)
    .fetch_one(&mut **tx)
    .await
    .context("start_session failed")?;

    row_to_session(row)
}

pub async fn mark_reconciling<'e>(
    tx: &mut sqlx::Transaction<'e, Postgres>,
    session_id: Uuid,
    closed_by: i64,
    closed_at: DateTime<Utc>,
) -> Result<Session> {
    let row = sqlx::query(&format!(
        r#"
        update audit_sessions set
          status = 'reconciling', closed_by = $2, closed_at = $3, updated_at = now()
        where id = $1
        returning {SESSION_COLUMNS}
        "#
    ))
    .bind(session_id)
    .bind(closed_by)
    .bind(closed_at)
    .fetch_one(&mut **tx)
    .await
    .context("mark_reconciling failed")?;

    row_to_session(row)
}

pub async fn mark_awaiting_approval(pool: &PgPool, session_id: Uuid) -> Result<Session> {
    let row = sqlx::query(&format!(
        r#"
        update audit_sessions set status = 'awaiting_approval', updated_at = now()
        where id = $1
        returning {SESSION_COLUMNS}
        "#
    ))
    .bind(session_id)
    .fetch_one(pool)
    .await
    .context("mark_awaiting_approval failed")?;

    row_to_session(row)
}

pub async fn approve_session(
    pool: &PgPool,
    session_id: Uuid,
    approved_by: i64,
    approved_at: DateTime<Utc>,
) -> Result<Session> {
    let row = sqlx::query(&format!(
        r#"
        update audit_sessions set
          status = 'approved', approved_by = $2, approved_at = $3, updated_at = now()
        where id = $1
        returning {SESSION_COLUMNS}
        "#
    ))
    .bind(session_id)
    .bind(approved_by)
    .bind(approved_at)
    .fetch_one(pool)
    .await
    .context("approve_session failed")?;

    row_to_session(row)
}

pub async fn mark_applied(pool: &PgPool, session_id: Uuid, applied_at: DateTime<Utc>) -> Result<Session> {
    let row = sqlx::query(&format!(
        r#"
        update audit_sessions set status = 'applied', applied_at = $2, updated_at = now()
        where id = $1
        returning {SESSION_COLUMNS}
        "#
    ))
    .bind(session_id)
    .bind(applied_at)
    .fetch_one(pool)
    .await
    .context("mark_applied failed")?;

    row_to_session(row)
}
