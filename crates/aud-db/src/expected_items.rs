use anyhow::{Context, Result};
use aud_schemas::ExpectedItem;
use sqlx::{PgPool, Postgres, Row};
use uuid::Uuid;

fn row_to_expected_item(row: sqlx::postgres::PgRow) -> Result<ExpectedItem> {
    Ok(ExpectedItem {
        id: row.try_get("id")?,
        session_id: row.try_get("session_id")?,
        item_id: row.try_get("item_id")?,
        expected_location_id: row.try_get("expected_location_id")?,
        expected_responsible_id: row.try_get("expected_responsible_id")?,
        barcode_id: row.try_get("barcode_id")?,
        captured_at: row.try_get("captured_at")?,
    })
}

/// Delete all ExpectedItem rows for a session (drain-before-seed).
pub async fn delete_for_session<'e, E>(exec: E, session_id: Uuid) -> Result<()>
where
    E: sqlx::Executor<'e, Database = Postgres>,
{
    sqlx::query("delete from audit_expected_items where session_id = $1")
        .bind(session_id)
        .execute(exec)
        .await
        .context("delete expected_items failed")?;
    Ok(())
}

pub struct NewExpectedItem {
    pub item_id: i64,
    pub expected_location_id: Option<i64>,
    pub expected_responsible_id: Option<i64>,
    pub barcode_id: Option<i64>,
}

pub async fn insert<'e, E>(exec: E, session_id: Uuid, new: &NewExpectedItem) -> Result<ExpectedItem>
where
    E: sqlx::Executor<'e, Database = Postgres>,
{
    let row = sqlx::query(
        r#"
        insert into audit_expected_items (session_id, item_id, expected_location_id, expected_responsible_id, barcode_id)
        values ($1, $2, $3, $4, $5)
        returning id, session_id, item_id, expected_location_id, expected_responsible_id, barcode_id, captured_at
        "#,
    )
    .bind(session_id)
    .bind(new.item_id)
    .bind(new.expected_location_id)
    .bind(new.expected_responsible_id)
    .bind(new.barcode_id)
    .fetch_one(exec)
    .await
    .context("insert expected_item failed")?;

    row_to_expected_item(row)
}

pub async fn list_for_session(pool: &PgPool, session_id: Uuid) -> Result<Vec<ExpectedItem>> {
    let rows = sqlx::query(
        r#"
        select id, session_id, item_id, expected_location_id, expected_responsible_id, barcode_id, captured_at
        from audit_expected_items
        where session_id = $1
        order by captured_at asc
        "#,
    )
    .bind(session_id)
    .fetch_all(pool)
    .await
    .context("list expected_items failed")?;

    rows.into_iter().map(row_to_expected_item).collect()
}
