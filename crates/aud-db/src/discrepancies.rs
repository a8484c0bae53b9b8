use anyhow::{Context, Result};
use aud_schemas::{Discrepancy, DiscrepancyType, ResolutionStatus};
use sqlx::{PgPool, Postgres, Row};
use uuid::Uuid;

fn row_to_discrepancy(row: sqlx::postgres::PgRow) -> Result<Discrepancy> {
    let dtype_str: String = row.try_get("discrepancy_type")?;
    let resolution_str: String = row.try_get("resolution_status")?;
    Ok(Discrepancy {
        id: row.try_get("id")?,
        session_id: row.try_get("session_id")?,
        discrepancy_type: DiscrepancyType::parse(&dtype_str).context("unknown discrepancy_type in db")?,
        item_id: row.try_get("item_id")?,
        barcode_value: row.try_get("barcode_value")?,
        expected_location_id: row.try_get("expected_location_id")?,
        found_location_id: row.try_get("found_location_id")?,
        resolution_status: ResolutionStatus::parse(&resolution_str).context("unknown resolution_status in db")?,
        resolution_payload: row.try_get("resolution_payload")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

const DISCREPANCY_COLUMNS: &str = r#"
    id, session_id, discrepancy_type::text as discrepancy_type, item_id, barcode_value,
    expected_location_id, found_location_id, resolution_status::text as resolution_status,
    resolution_payload, created_at, updated_at
"#;

pub async fn list_for_session(pool: &PgPool, session_id: Uuid) -> Result<Vec<Discrepancy>> {
    let rows = sqlx::query(&format!(
        "select {DISCREPANCY_COLUMNS} from audit_discrepancies where session_id = $1 order by created_at asc"
    ))
    .bind(session_id)
    .fetch_all(pool)
    .await
    .context("list discrepancies for session failed")?;

    rows.into_iter().map(row_to_discrepancy).collect()
}

pub async fn get(pool: &PgPool, discrepancy_id: Uuid) -> Result<Option<Discrepancy>> {
    let row = sqlx::query(&format!("select {DISCREPANCY_COLUMNS} from audit_discrepancies where id = $1"))
        .bind(discrepancy_id)
        .fetch_optional(pool)
        .await
        .context("get discrepancy failed")?;
    row.map(row_to_discrepancy).transpose()
}

pub async fn count_open(pool: &PgPool, session_id: Uuid) -> Result<i64> {
    let row = sqlx::query(
        "select count(*)::bigint as n from audit_discrepancies where session_id = $1 and resolution_status = 'open'",
    )
    .bind(session_id)
    .fetch_one(pool)
    .await
    .context("count_open discrepancies failed")?;
    row.try_get("n").context("read open discrepancy count")
}

/// Grouped counts by (type, resolution_status), for the reporting
/// aggregator. Keyed as `(discrepancy_type, resolution_status)`.
pub async fn counts_by_type_and_resolution(
    pool: &PgPool,
    session_ids: &[Uuid],
) -> Result<std::collections::HashMap<Uuid, Vec<(DiscrepancyType, ResolutionStatus, i64)>>> {
    let rows = sqlx::query(
        r#"
        select session_id, discrepancy_type::text as discrepancy_type,
               resolution_status::text as resolution_status, count(*)::bigint as n
        from audit_discrepancies
        where session_id = any($1)
        group by session_id, discrepancy_type, resolution_status
        "#,
    )
    .bind(session_ids)
    .fetch_all(pool)
    .await
    .context("counts_by_type_and_resolution failed")?;

    let mut out: std::collections::HashMap<Uuid, Vec<(DiscrepancyType, ResolutionStatus, i64)>> =
        std::collections::HashMap::new();
    for row in rows {
        let session_id: Uuid = row.try_get("session_id")?;
        let dtype_str: String = row.try_get("discrepancy_type")?;
        let resolution_str: String = row.try_get("resolution_status")?;
        let n: i64 = row.try_get("n")?;
        let dtype = DiscrepancyType::parse(&dtype_str).context("unknown discrepancy_type in db")?;
        let resolution = ResolutionStatus::parse(&resolution_str).context("unknown resolution_status in db")?;
        out.entry(session_id).or_default().push((dtype, resolution, n));
    }
    Ok(out)
}

/// Incremental upsert keyed by `(session_id, discrepancy_type, item_id,
/// barcode_value, resolution_status=open)`. Updates the open row's location
/// fields in place if one already exists, else inserts.
pub async fn upsert_open<'e, E>(
    exec: E,
    session_id: Uuid,
    discrepancy_type: DiscrepancyType,
    item_id: Option<i64>,
    barcode_value: Option<&str>,
    expected_location_id: Option<i64>,
    found_location_id: Option<i64>,
) -> Result<()>
where
    E: sqlx::Executor<'e, Database = Postgres>,
{
    sqlx::query(
        r#"
        insert into audit_discrepancies
          (session_id, discrepancy_type, item_id, barcode_value, expected_location_id, found_location_id, resolution_status)
        values ($1, $2::audit_discrepancy_type, $3, $4, $5, $6, 'open')
        on conflict (session_id, discrepancy_type, coalesce(item_id, -1), coalesce(barcode_value, ''))
          where resolution_status = 'open'
        do update set
          expected_location_id = excluded.expected_location_id,
          found_location_id = excluded.found_location_id,
          updated_at = now()
        "#,
    )
    .bind(session_id)
    .bind(discrepancy_type.as_str())
    .bind(item_id)
    .bind(barcode_value)
    .bind(expected_location_id)
    .bind(found_location_id)
    .execute(exec)
    .await
    .context("upsert_open discrepancy failed")?;
    Ok(())
}

/// Canonical rebuild: delete all rows for the session. Called before
/// re-inserting the authoritative set on close.
pub async fn delete_for_session<'e, E>(exec: E, session_id: Uuid) -> Result<()>
where
    E: sqlx::Executor<'e, Database = Postgres>,
{
    sqlx::query("delete from audit_discrepancies where session_id = $1")
        .bind(session_id)
        .execute(exec)
        .await
        .context("delete discrepancies failed")?;
    Ok(())
}

pub struct NewDiscrepancy {
    pub discrepancy_type: DiscrepancyType,
    pub item_id: Option<i64>,
    pub barcode_value: Option<String>,
    pub expected_location_id: Option<i64>,
    pub found_location_id: Option<i64>,
    pub resolution_payload: Option<serde_json::Value>,
}

pub async fn insert<'e, E>(exec: E, session_id: Uuid, new: &NewDiscrepancy) -> Result<()>
where
    E: sqlx::Executor<'e, Database = Postgres>,
{
    sqlx::query(
        r#"
        insert into audit_discrepancies
          (session_id, discrepancy_type, item_id, barcode_value, expected_location_id,
           found_location_id, resolution_status, resolution_payload)
        values ($1, $2::audit_discrepancy_type, $3, $4, $5, $6, 'open', $7)
        "#,
    )
    .bind(session_id)
    .bind(new.discrepancy_type.as_str())
    .bind(new.item_id)
    .bind(&new.barcode_value)
    .bind(new.expected_location_id)
    .bind(new.found_location_id)
    .bind(&new.resolution_payload)
    .execute(exec)
    .await
    .context("insert discrepancy failed")?;
    Ok(())
}

pub async fn resolve(
    pool: &PgPool,
    discrepancy_id: Uuid,
    resolution_status: ResolutionStatus,
    resolution_payload: Option<serde_json::Value>,
) -> Result<Option<Discrepancy>> {
    let row = sqlx::query(&format!(
        r#"
        update audit_discrepancies set
          resolution_status = $2::audit_resolution_status, resolution_payload = $3, updated_at = now()
        where id = $1
        returning {DISCREPANCY_COLUMNS}
        "#
    ))
    .bind(discrepancy_id)
    .bind(resolution_status.as_str())
    .bind(&resolution_payload)
    .fetch_optional(pool)
    .await
    .context("resolve discrepancy failed")?;

    row.map(row_to_discrepancy).transpose()
}

pub async fn list_resolved_for_session(pool: &PgPool, session_id: Uuid) -> Result<Vec<Discrepancy>> {
    let rows = sqlx::query(&format!(
        r#"
        select {DISCREPANCY_COLUMNS} from audit_discrepancies
        where session_id = $1 and resolution_status = 'resolved'
        order by created_at asc
        "#
    ))
    .bind(session_id)
    .fetch_all(pool)
    .await
    .context("list_resolved_for_session failed")?;

    rows.into_iter().map(row_to_discrepancy).collect()
}
