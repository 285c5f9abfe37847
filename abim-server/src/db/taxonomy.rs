//! Taxonomy term database operations.
//!
//! Terms are find-or-create by (taxonomy, slug). Assignment to an auditee
//! is single-valued per taxonomy: setting a term replaces whatever was
//! assigned before, and setting an empty name clears the assignment.

use abim_common::slug::slugify;
use abim_common::Result;
use sqlx::SqlitePool;
use uuid::Uuid;

/// Find a term by (taxonomy, slug of name), creating it if missing.
pub async fn find_or_create_term(pool: &SqlitePool, taxonomy: &str, name: &str) -> Result<i64> {
    let slug = slugify(name);

    let existing: Option<(i64,)> =
        sqlx::query_as("SELECT id FROM taxonomy_terms WHERE taxonomy = ? AND slug = ?")
            .bind(taxonomy)
            .bind(&slug)
            .fetch_optional(pool)
            .await?;

    if let Some((id,)) = existing {
        return Ok(id);
    }

    let result = sqlx::query("INSERT INTO taxonomy_terms (taxonomy, name, slug) VALUES (?, ?, ?)")
        .bind(taxonomy)
        .bind(name)
        .bind(&slug)
        .execute(pool)
        .await?;

    Ok(result.last_insert_rowid())
}

/// Assign `name` under `taxonomy` to an auditee, replacing prior terms for
/// that taxonomy. An empty name clears the assignment.
pub async fn set_object_term(
    pool: &SqlitePool,
    auditee_id: Uuid,
    taxonomy: &str,
    name: &str,
) -> Result<()> {
    sqlx::query("DELETE FROM auditee_terms WHERE auditee_id = ? AND taxonomy = ?")
        .bind(auditee_id.to_string())
        .bind(taxonomy)
        .execute(pool)
        .await?;

    if name.trim().is_empty() {
        return Ok(());
    }

    let term_id = find_or_create_term(pool, taxonomy, name).await?;
    sqlx::query("INSERT INTO auditee_terms (auditee_id, taxonomy, term_id) VALUES (?, ?, ?)")
        .bind(auditee_id.to_string())
        .bind(taxonomy)
        .bind(term_id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Term names assigned to an auditee under one taxonomy.
pub async fn terms_for(pool: &SqlitePool, auditee_id: Uuid, taxonomy: &str) -> Result<Vec<String>> {
    let rows: Vec<(String,)> = sqlx::query_as(
        r#"
        SELECT t.name
        FROM auditee_terms a
        JOIN taxonomy_terms t ON t.id = a.term_id
        WHERE a.auditee_id = ? AND a.taxonomy = ?
        ORDER BY t.name
        "#,
    )
    .bind(auditee_id.to_string())
    .bind(taxonomy)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(|(name,)| name).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::auditees;
    use abim_common::db::create_all_tables;

    async fn test_pool() -> SqlitePool {
        let pool = SqlitePool::connect("sqlite::memory:")
            .await
            .expect("in-memory database");
        sqlx::query("PRAGMA foreign_keys = ON")
            .execute(&pool)
            .await
            .expect("enable foreign keys");
        create_all_tables(&pool).await.expect("create schema");
        pool
    }

    #[tokio::test]
    async fn term_creation_is_reuse_first() {
        let pool = test_pool().await;

        let first = find_or_create_term(&pool, "bodytype", "Council")
            .await
            .expect("create");
        let second = find_or_create_term(&pool, "bodytype", "Council")
            .await
            .expect("reuse");
        assert_eq!(first, second);

        // Same name under a different taxonomy is a different term
        let other = find_or_create_term(&pool, "region", "Council")
            .await
            .expect("other taxonomy");
        assert_ne!(first, other);
    }

    #[tokio::test]
    async fn assignment_is_single_valued() {
        let pool = test_pool().await;
        let auditee = auditees::upsert(&pool, None, "Test Council")
            .await
            .expect("auditee");

        set_object_term(&pool, auditee, "bodytype", "Council")
            .await
            .expect("assign");
        set_object_term(&pool, auditee, "bodytype", "District")
            .await
            .expect("replace");

        let terms = terms_for(&pool, auditee, "bodytype").await.expect("terms");
        assert_eq!(terms, vec!["District"]);
    }

    #[tokio::test]
    async fn empty_name_clears_assignment() {
        let pool = test_pool().await;
        let auditee = auditees::upsert(&pool, None, "Test Council")
            .await
            .expect("auditee");

        set_object_term(&pool, auditee, "bodytype", "Council")
            .await
            .expect("assign");
        set_object_term(&pool, auditee, "bodytype", "")
            .await
            .expect("clear");

        let terms = terms_for(&pool, auditee, "bodytype").await.expect("terms");
        assert!(terms.is_empty());
    }
}
