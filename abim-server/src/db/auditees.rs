//! Auditee database operations.

use abim_common::Result;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

/// Audited body record.
#[derive(Debug, Clone)]
pub struct Auditee {
    pub guid: Uuid,
    pub title: String,
    pub kind: String,
    pub status: String,
    pub opted_in: bool,
    pub opted_in_year: Option<String>,
}

/// Resolve an auditee identity through the metadata index.
///
/// Identity is reused only when the lookup returns exactly one row whose
/// stored id is a well-formed guid; zero matches, duplicates, or a
/// malformed id all mean "treat as new".
pub async fn find_by_meta(pool: &SqlitePool, key: &str, value: &str) -> Result<Option<Uuid>> {
    let rows: Vec<(String,)> =
        sqlx::query_as("SELECT auditee_id FROM auditee_meta WHERE key = ? AND value = ?")
            .bind(key)
            .bind(value)
            .fetch_all(pool)
            .await?;

    if rows.len() == 1 {
        Ok(Uuid::parse_str(&rows[0].0).ok())
    } else {
        Ok(None)
    }
}

/// Create a new auditee or update the title of an existing one in place.
/// Opt-in fields are never touched here; they have their own conditional
/// write path.
pub async fn upsert(pool: &SqlitePool, id: Option<Uuid>, title: &str) -> Result<Uuid> {
    match id {
        Some(guid) => {
            sqlx::query(
                r#"
                UPDATE auditees
                SET title = ?, kind = 'auditedbody', status = 'publish',
                    updated_at = CURRENT_TIMESTAMP
                WHERE guid = ?
                "#,
            )
            .bind(title)
            .bind(guid.to_string())
            .execute(pool)
            .await?;
            Ok(guid)
        }
        None => {
            let guid = Uuid::new_v4();
            sqlx::query(
                r#"
                INSERT INTO auditees (guid, title, kind, status, created_at, updated_at)
                VALUES (?, ?, 'auditedbody', 'publish', CURRENT_TIMESTAMP, CURRENT_TIMESTAMP)
                "#,
            )
            .bind(guid.to_string())
            .bind(title)
            .execute(pool)
            .await?;
            Ok(guid)
        }
    }
}

/// Write one metadata key on an auditee, replacing any prior value.
pub async fn set_meta(pool: &SqlitePool, auditee_id: Uuid, key: &str, value: &str) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO auditee_meta (auditee_id, key, value)
        VALUES (?, ?, ?)
        ON CONFLICT(auditee_id, key) DO UPDATE SET value = excluded.value
        "#,
    )
    .bind(auditee_id.to_string())
    .bind(key)
    .bind(value)
    .execute(pool)
    .await?;
    Ok(())
}

/// Set the opt-in flag and year. Only ever called for an exact "Yes" row;
/// there is no corresponding clear path.
pub async fn set_opt_in(pool: &SqlitePool, auditee_id: Uuid, year: &str) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE auditees
        SET opted_in = 1, opted_in_year = ?, updated_at = CURRENT_TIMESTAMP
        WHERE guid = ?
        "#,
    )
    .bind(year)
    .bind(auditee_id.to_string())
    .execute(pool)
    .await?;
    Ok(())
}

/// Load an auditee by guid.
pub async fn load_by_guid(pool: &SqlitePool, guid: Uuid) -> Result<Option<Auditee>> {
    let row = sqlx::query(
        r#"
        SELECT guid, title, kind, status, opted_in, opted_in_year
        FROM auditees
        WHERE guid = ?
        "#,
    )
    .bind(guid.to_string())
    .fetch_optional(pool)
    .await?;

    match row {
        Some(row) => {
            let guid_str: String = row.get("guid");
            let opted_in: i64 = row.get("opted_in");

            Ok(Some(Auditee {
                guid: Uuid::parse_str(&guid_str).map_err(|e| {
                    abim_common::Error::Internal(format!("Malformed auditee guid: {}", e))
                })?,
                title: row.get("title"),
                kind: row.get("kind"),
                status: row.get("status"),
                opted_in: opted_in != 0,
                opted_in_year: row.get("opted_in_year"),
            }))
        }
        None => Ok(None),
    }
}

/// Count auditees.
pub async fn count(pool: &SqlitePool) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM auditees")
        .fetch_one(pool)
        .await?;
    Ok(count)
}
