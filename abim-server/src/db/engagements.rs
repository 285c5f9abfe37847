//! Engagement entry database operations.
//!
//! Engagements are the auditee's repeating group: one entry per imported
//! year, appended and never replaced. Re-importing the same year adds a
//! duplicate entry.

use abim_common::Result;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

/// Insert payload for one engagement entry.
#[derive(Debug, Clone)]
pub struct EngagementEntry {
    pub year: String,
    pub fee: String,
    pub audit_firm_id: Uuid,
    pub lead_name: String,
    pub lead_email: String,
}

/// Stored engagement entry.
#[derive(Debug, Clone)]
pub struct Engagement {
    pub id: i64,
    pub auditee_id: Uuid,
    pub year: String,
    pub fee: String,
    pub audit_firm_id: Uuid,
    pub lead_name: String,
    pub lead_email: String,
}

/// Append one entry to an auditee's engagement collection.
pub async fn append(pool: &SqlitePool, auditee_id: Uuid, entry: &EngagementEntry) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO engagements (auditee_id, year, fee, audit_firm_id, lead_name, lead_email, created_at)
        VALUES (?, ?, ?, ?, ?, ?, CURRENT_TIMESTAMP)
        "#,
    )
    .bind(auditee_id.to_string())
    .bind(&entry.year)
    .bind(&entry.fee)
    .bind(entry.audit_firm_id.to_string())
    .bind(&entry.lead_name)
    .bind(&entry.lead_email)
    .execute(pool)
    .await?;
    Ok(())
}

/// List an auditee's engagements in append order.
pub async fn list_for_auditee(pool: &SqlitePool, auditee_id: Uuid) -> Result<Vec<Engagement>> {
    let rows = sqlx::query(
        r#"
        SELECT id, auditee_id, year, fee, audit_firm_id, lead_name, lead_email
        FROM engagements
        WHERE auditee_id = ?
        ORDER BY id
        "#,
    )
    .bind(auditee_id.to_string())
    .fetch_all(pool)
    .await?;

    let mut engagements = Vec::with_capacity(rows.len());
    for row in rows {
        let auditee_str: String = row.get("auditee_id");
        let firm_str: String = row.get("audit_firm_id");
        engagements.push(Engagement {
            id: row.get("id"),
            auditee_id: Uuid::parse_str(&auditee_str).map_err(|e| {
                abim_common::Error::Internal(format!("Malformed auditee guid: {}", e))
            })?,
            year: row.get("year"),
            fee: row.get("fee"),
            audit_firm_id: Uuid::parse_str(&firm_str).map_err(|e| {
                abim_common::Error::Internal(format!("Malformed firm guid: {}", e))
            })?,
            lead_name: row.get("lead_name"),
            lead_email: row.get("lead_email"),
        });
    }
    Ok(engagements)
}
