use anyhow::{Context, Result};
use aud_schemas::{Plan, PlanStatus, ScopeType};
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};
use uuid::Uuid;

fn row_to_plan(row: sqlx::postgres::PgRow) -> Result<Plan> {
    let status_str: String = row.try_get("status")?;
    let scope_type_str: String = row.try_get("scope_type")?;
    Ok(Plan {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        scope_type: ScopeType::parse(&scope_type_str).context("unknown scope_type in db")?,
        scope_payload: row.try_get("scope_payload")?,
        start_date: row.try_get("start_date")?,
        end_date: row.try_get("end_date")?,
        status: PlanStatus::parse(&status_str).context("unknown plan status in db")?,
        created_by: row.try_get("created_by")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

pub async fn list_plans(pool: &PgPool, limit: i64, offset: i64) -> Result<Vec<Plan>> {
    let limit = limit.clamp(1, 500);
    let rows = sqlx::query(
        r#"
        select id, title, scope_type::text as scope_type, scope_payload, start_date, end_date,
               status::text as status, created_by, created_at, updated_at
        from audit_plans
        order by created_at desc
        limit $1 offset $2
        "#,
    )
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await
    .context("list_plans failed")?;

    rows.into_iter().map(row_to_plan).collect()
}

pub async fn get_plan(pool: &PgPool, plan_id: Uuid) -> Result<Option<Plan>> {
    let row = sqlx::query(
        r#"
        select id, title, scope_type::text as scope_type, scope_payload, start_date, end_date,
               status::text as status, created_by, created_at, updated_at
        from audit_plans
        where id = $1
        "#,
    )
    .bind(plan_id)
    .fetch_optional(pool)
    .await
    .context("get_plan failed")?;

    row.map(row_to_plan).transpose()
}

pub struct NewPlan {
    pub title: String,
    pub scope_type: ScopeType,
    pub scope_payload: serde_json::Value,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub created_by: i64,
}

pub async fn create_plan(pool: &PgPool, new: &NewPlan) -> Result<Plan> {
    let row = sqlx::query(
        r#"
        insert into audit_plans (title, scope_type, scope_payload, start_date, end_date, created_by)
        values ($1, $2::audit_scope_type, $3, $4, $5, $6)
        returning id, title, scope_type::text as scope_type, scope_payload, start_date, end_date,
                  status::text as status, created_by, created_at, updated_at
        "#,
    )
    .bind(&new.title)
    .bind(new.scope_type.as_str())
    .bind(&new.scope_payload)
    .bind(new.start_date)
    .bind(new.end_date)
    .bind(new.created_by)
    .fetch_one(pool)
    .await
    .context("create_plan failed")?;

    row_to_plan(row)
}

/// Partial-patch update. Only `Some` fields are applied; `None` leaves the
/// existing column untouched (`exclude_unset` semantics).
#[derive(Default)]
pub struct PlanPatch {
    pub title: Option<String>,
    pub scope_type: Option<ScopeType>,
    pub scope_payload: Option<serde_json::Value>,
    pub start_date: Option<Option<DateTime<Utc>>>,
    pub end_date: Option<Option<DateTime<Utc>>>,
    pub status: Option<PlanStatus>,
}

pub async fn update_plan(pool: &PgPool, plan_id: Uuid, patch: &PlanPatch) -> Result<Option<Plan>> {
    let row = sqlx::query(
        r#"
        update audit_plans set
          title = coalesce($2, title),
          scope_type = coalesce($3::audit_scope_type, scope_type),
          scope_payload = coalesce($4, scope_payload),
          start_date = case when $5 then $6 else start_date end,
          end_date = case when $7 then $8 else end_date end,
          status = coalesce($9::audit_plan_status, status),
          updated_at = now()
        where id = $1
        returning id, title, scope_type::text as scope_type, scope_payload, start_date, end_date,
                  status::text as status, created_by, created_at, updated_at
        "#,
    )
    .bind(plan_id)
    .bind(&patch.title)
    .bind(patch.scope_type.map(|s| s.as_str()))
    .bind(&patch.scope_payload)
    .bind(patch.start_date.is_some())
    .bind(patch.start_date.flatten())
    .bind(patch.end_date.is_some())
    .bind(patch.end_date.flatten())
    .bind(patch.status.map(|s| s.as_str()))
    .fetch_optional(pool)
    .await
    .context("update_plan failed")?;

    row.map(row_to_plan).transpose()
}
