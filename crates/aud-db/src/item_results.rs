use anyhow::{Context, Result};
use aud_schemas::{ItemResult, ItemResultStatus};
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Row};
use uuid::Uuid;

fn row_to_item_result(row: sqlx::postgres::PgRow) -> Result<ItemResult> {
    let status_str: String = row.try_get("status")?;
    Ok(ItemResult {
        id: row.try_get("id")?,
        session_id: row.try_get("session_id")?,
        item_id: row.try_get("item_id")?,
        status: ItemResultStatus::parse(&status_str).context("unknown item_result status in db")?,
        expected_location_id: row.try_get("expected_location_id")?,
        found_location_id: row.try_get("found_location_id")?,
        first_found_at: row.try_get("first_found_at")?,
        last_scan_at: row.try_get("last_scan_at")?,
    })
}

pub async fn delete_for_session<'e, E>(exec: E, session_id: Uuid) -> Result<()>
where
    E: sqlx::Executor<'e, Database = Postgres>,
{
    sqlx::query("delete from audit_item_results where session_id = $1")
        .bind(session_id)
        .execute(exec)
        .await
        .context("delete item_results failed")?;
    Ok(())
}

/// Seed on start: one row per expected item, status=missing.
pub async fn seed_missing<'e, E>(exec: E, session_id: Uuid, item_id: i64, expected_location_id: Option<i64>) -> Result<()>
where
    E: sqlx::Executor<'e, Database = Postgres>,
{
    sqlx::query(
        r#"
        insert into audit_item_results (session_id, item_id, status, expected_location_id)
        values ($1, $2, 'missing', $3)
        "#,
    )
    .bind(session_id)
    .bind(item_id)
    .bind(expected_location_id)
    .execute(exec)
    .await
    .context("seed item_result failed")?;
    Ok(())
}

pub async fn get(pool: &PgPool, session_id: Uuid, item_id: i64) -> Result<Option<ItemResult>> {
    let row = sqlx::query(
        r#"
        select id, session_id, item_id, status::text as status, expected_location_id,
               found_location_id, first_found_at, last_scan_at
        from audit_item_results
        where session_id = $1 and item_id = $2
        "#,
    )
    .bind(session_id)
    .bind(item_id)
    .fetch_optional(pool)
    .await
    .context("get item_result failed")?;

    row.map(row_to_item_result).transpose()
}

/// Apply the incremental classifier's decision: bump `last_scan_at`, set
/// `first_found_at` if unset, update `found_location_id`, and set status.
pub async fn apply_scan_result(
    pool: &PgPool,
    session_id: Uuid,
    item_id: i64,
    found_location_id: i64,
    status: ItemResultStatus,
    scan_time: DateTime<Utc>,
) -> Result<()> {
    sqlx::query(
        r#"
        update audit_item_results set
          status = $4::audit_item_result_status,
          found_location_id = $3,
          first_found_at = coalesce(first_found_at, $5),
          last_scan_at = $5
        where session_id = $1 and item_id = $2
        "#,
    )
    .bind(session_id)
    .bind(item_id)
    .bind(found_location_id)
    .bind(status.as_str())
    .bind(scan_time)
    .execute(pool)
    .await
    .context("apply_scan_result failed")?;
    Ok(())
}

pub async fn list_for_session(pool: &PgPool, session_id: Uuid) -> Result<Vec<ItemResult>> {
    let rows = sqlx::query(
        r#"
        select id, session_id, item_id, status::text as status, expected_location_id,
               found_location_id, first_found_at, last_scan_at
        from audit_item_results
        where session_id = $1
        order by item_id asc
        "#,
    )
    .bind(session_id)
    .fetch_all(pool)
    .await
    .context("list item_results failed")?;

    rows.into_iter().map(row_to_item_result).collect()
}

/// Grouped counts by status, used by the reporting aggregator.
pub async fn counts_by_status(pool: &PgPool, session_id: Uuid) -> Result<(i64, i64, i64)> {
    let rows = sqlx::query(
        r#"
        select status::text as status, count(*)::bigint as n
        from audit_item_results
        where session_id = $1
        group by status
        "#,
    )
    .bind(session_id)
    .fetch_all(pool)
    .await
    .context("counts_by_status failed")?;

    let (mut missing, mut found, mut found_in_place) = (0i64, 0i64, 0i64);
    for row in rows {
        let status: String = row.try_get("status")?;
        let n: i64 = row.try_get("n")?;
        match status.as_str() {
            "missing" => missing = n,
            "found" => found = n,
            "found_in_place" => found_in_place = n,
            _ => {}
        }
    }
    Ok((missing, found, found_in_place))
}
