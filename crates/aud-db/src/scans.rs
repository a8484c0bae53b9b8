use anyhow::{Context, Result};
use aud_schemas::Scan;
use sqlx::{PgPool, Postgres, Row};
use uuid::Uuid;

fn row_to_scan(row: sqlx::postgres::PgRow) -> Result<Scan> {
    Ok(Scan {
        id: row.try_get("id")?,
        session_id: row.try_get("session_id")?,
        scanner_user_id: row.try_get("scanner_user_id")?,
        scan_time: row.try_get("scan_time")?,
        barcode_value: row.try_get("barcode_value")?,
        item_id: row.try_get("item_id")?,
        found_location_id: row.try_get("found_location_id")?,
        notes: row.try_get("notes")?,
        photo_url: row.try_get("photo_url")?,
        client_scan_id: row.try_get("client_scan_id")?,
        extra: row.try_get("extra")?,
    })
}

const SCAN_COLUMNS: &str = r#"
    id, session_id, scanner_user_id, scan_time, barcode_value, item_id,
    found_location_id, notes, photo_url, client_scan_id, extra
"#;

pub struct NewScan {
    pub scanner_user_id: i64,
    pub barcode_value: Option<String>,
    pub item_id: Option<i64>,
    pub found_location_id: i64,
    pub notes: Option<String>,
    pub photo_url: Option<String>,
    pub client_scan_id: String,
    pub extra: Option<serde_json::Value>,
}

/// Attempts the insert; `None` means the `(session_id, client_scan_id)`
/// UNIQUE constraint was hit — the caller re-reads via [`find_by_client_id`].
pub async fn try_insert(pool: &PgPool, session_id: Uuid, new: &NewScan) -> Result<Option<Scan>> {
    let result = sqlx::query(&format!(
        r#"
        insert into audit_scans (session_id, scanner_user_id, barcode_value, item_id,
                                  found_location_id, notes, photo_url, client_scan_id, extra)
        values ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        returning {SCAN_COLUMNS}
        "#
    ))
    .bind(session_id)
    .bind(new.scanner_user_id)
    .bind(&new.barcode_value)
    .bind(new.item_id)
    .bind(new.found_location_id)
    .bind(&new.notes)
    .bind(&new.photo_url)
    .bind(&new.client_scan_id)
    .bind(&new.extra)
    .fetch_one(pool)
    .await;

    match result {
        Ok(row) => Ok(Some(row_to_scan(row)?)),
        Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => Ok(None),
        Err(err) => Err(err).context("insert scan failed"),
    }
}

pub async fn find_by_client_id(pool: &PgPool, session_id: Uuid, client_scan_id: &str) -> Result<Option<Scan>> {
    let row = sqlx::query(&format!(
        "select {SCAN_COLUMNS} from audit_scans where session_id = $1 and client_scan_id = $2"
    ))
    .bind(session_id)
    .bind(client_scan_id)
    .fetch_optional(pool)
    .await
    .context("find_by_client_id failed")?;

    row.map(row_to_scan).transpose()
}

pub async fn list_for_session(pool: &PgPool, session_id: Uuid) -> Result<Vec<Scan>> {
    let rows = sqlx::query(&format!(
        "select {SCAN_COLUMNS} from audit_scans where session_id = $1 order by scan_time asc"
    ))
    .bind(session_id)
    .fetch_all(pool)
    .await
    .context("list scans for session failed")?;

    rows.into_iter().map(row_to_scan).collect()
}

pub async fn count_for_session<'e, E>(exec: E, session_id: Uuid) -> Result<i64>
where
    E: sqlx::Executor<'e, Database = Postgres>,
{
    let row = sqlx::query("select count(*)::bigint as n from audit_scans where session_id = $1")
        .bind(session_id)
        .fetch_one(exec)
        .await
        .context("count scans for session failed")?;
    row.try_get("n").context("read scan count")
}

pub async fn counts_by_session<'e, E>(exec: E, session_ids: &[Uuid]) -> Result<std::collections::HashMap<Uuid, i64>>
where
    E: sqlx::Executor<'e, Database = Postgres>,
{
    let rows = sqlx::query(
        r#"
        select session_id, count(*)::bigint as n
        from audit_scans
        where session_id = any($1)
        group by session_id
        "#,
    )
    .bind(session_ids)
    .fetch_all(exec)
    .await
    .context("counts_by_session failed")?;

    let mut out = std::collections::HashMap::new();
    for row in rows {
        let id: Uuid = row.try_get("session_id")?;
        let n: i64 = row.try_get("n")?;
        out.insert(id, n);
    }
    Ok(out)
}
