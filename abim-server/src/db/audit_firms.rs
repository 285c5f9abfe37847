//! Audit firm database operations.

use abim_common::slug::slugify;
use abim_common::Result;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

/// Audit firm record.
#[derive(Debug, Clone)]
pub struct AuditFirm {
    pub guid: Uuid,
    pub title: String,
    pub slug: String,
    pub status: String,
}

/// Look up a firm by slug, reuse-first: the oldest matching record wins.
pub async fn find_by_slug(pool: &SqlitePool, slug: &str) -> Result<Option<Uuid>> {
    let row: Option<(String,)> = sqlx::query_as(
        "SELECT guid FROM audit_firms WHERE slug = ? ORDER BY created_at LIMIT 1",
    )
    .bind(slug)
    .fetch_optional(pool)
    .await?;

    match row {
        Some((guid,)) => Ok(Uuid::parse_str(&guid).ok()),
        None => Ok(None),
    }
}

/// Create a firm, deriving its slug from the title.
pub async fn create(pool: &SqlitePool, title: &str) -> Result<Uuid> {
    let guid = Uuid::new_v4();
    sqlx::query(
        r#"
        INSERT INTO audit_firms (guid, title, slug, status, created_at, updated_at)
        VALUES (?, ?, ?, 'publish', CURRENT_TIMESTAMP, CURRENT_TIMESTAMP)
        "#,
    )
    .bind(guid.to_string())
    .bind(title)
    .bind(slugify(title))
    .execute(pool)
    .await?;
    Ok(guid)
}

/// Load a firm by guid.
pub async fn load_by_guid(pool: &SqlitePool, guid: Uuid) -> Result<Option<AuditFirm>> {
    let row = sqlx::query(
        r#"
        SELECT guid, title, slug, status
        FROM audit_firms
        WHERE guid = ?
        "#,
    )
    .bind(guid.to_string())
    .fetch_optional(pool)
    .await?;

    match row {
        Some(row) => {
            let guid_str: String = row.get("guid");
            Ok(Some(AuditFirm {
                guid: Uuid::parse_str(&guid_str).map_err(|e| {
                    abim_common::Error::Internal(format!("Malformed firm guid: {}", e))
                })?,
                title: row.get("title"),
                slug: row.get("slug"),
                status: row.get("status"),
            }))
        }
        None => Ok(None),
    }
}

/// Count firms.
pub async fn count(pool: &SqlitePool) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM audit_firms")
        .fetch_one(pool)
        .await?;
    Ok(count)
}
