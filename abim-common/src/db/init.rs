//! Database initialization.
//!
//! Creates the SQLite database and schema on first run. Every statement is
//! idempotent (`CREATE TABLE IF NOT EXISTS`), so re-running init against an
//! existing database is safe.

use std::path::Path;

use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use tracing::info;

use crate::Result;

/// Open (or create) the database at `db_path` and ensure the schema exists.
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    // Enable foreign keys (engagements cascade with their auditee)
    sqlx::query("PRAGMA foreign_keys = ON").execute(&pool).await?;

    // WAL allows concurrent readers while an import is writing
    sqlx::query("PRAGMA journal_mode = WAL").execute(&pool).await?;

    sqlx::query("PRAGMA busy_timeout = 5000").execute(&pool).await?;

    create_all_tables(&pool).await?;

    Ok(pool)
}

/// Create the full schema. Also used by tests against in-memory databases.
pub async fn create_all_tables(pool: &SqlitePool) -> Result<()> {
    create_settings_table(pool).await?;
    create_auditees_table(pool).await?;
    create_auditee_meta_table(pool).await?;
    create_audit_firms_table(pool).await?;
    create_engagements_table(pool).await?;
    create_taxonomy_tables(pool).await?;
    Ok(())
}

/// Key-value settings, holds the import token among others.
pub async fn create_settings_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS settings (
            key TEXT PRIMARY KEY NOT NULL,
            value TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;
    Ok(())
}

/// Audited bodies, the primary imported record.
pub async fn create_auditees_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS auditees (
            guid TEXT PRIMARY KEY NOT NULL,
            title TEXT NOT NULL,
            kind TEXT NOT NULL DEFAULT 'auditedbody',
            status TEXT NOT NULL DEFAULT 'publish',
            opted_in INTEGER NOT NULL DEFAULT 0,
            opted_in_year TEXT,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;
    Ok(())
}

/// Key-value metadata attached to auditees. The external BodyID lives here
/// under `new_body_id`; uniqueness of a (key, value) pair is by convention
/// only, so the lookup side has to cope with duplicates.
pub async fn create_auditee_meta_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS auditee_meta (
            auditee_id TEXT NOT NULL REFERENCES auditees(guid) ON DELETE CASCADE,
            key TEXT NOT NULL,
            value TEXT NOT NULL,
            UNIQUE(auditee_id, key)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_auditee_meta_lookup ON auditee_meta(key, value)",
    )
    .execute(pool)
    .await?;
    Ok(())
}

/// Audit firms, looked up by slug. The slug is deliberately not unique at
/// the storage layer; concurrent imports of the same new firm can race and
/// leave duplicates.
pub async fn create_audit_firms_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS audit_firms (
            guid TEXT PRIMARY KEY NOT NULL,
            title TEXT NOT NULL,
            slug TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'publish',
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_audit_firms_slug ON audit_firms(slug)")
        .execute(pool)
        .await?;
    Ok(())
}

/// Yearly engagement entries, the auditee's repeating group. Append-only:
/// re-importing a year adds a second entry rather than replacing the first.
pub async fn create_engagements_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS engagements (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            auditee_id TEXT NOT NULL REFERENCES auditees(guid) ON DELETE CASCADE,
            year TEXT NOT NULL,
            fee TEXT NOT NULL,
            audit_firm_id TEXT NOT NULL,
            lead_name TEXT NOT NULL,
            lead_email TEXT NOT NULL,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_engagements_auditee ON engagements(auditee_id)",
    )
    .execute(pool)
    .await?;
    Ok(())
}

/// Taxonomy terms plus the auditee assignment table. Assignment is
/// single-valued per (auditee, taxonomy): setting a term replaces whatever
/// was assigned before.
pub async fn create_taxonomy_tables(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS taxonomy_terms (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            taxonomy TEXT NOT NULL,
            name TEXT NOT NULL,
            slug TEXT NOT NULL,
            UNIQUE(taxonomy, slug)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS auditee_terms (
            auditee_id TEXT NOT NULL REFERENCES auditees(guid) ON DELETE CASCADE,
            taxonomy TEXT NOT NULL,
            term_id INTEGER NOT NULL REFERENCES taxonomy_terms(id),
            UNIQUE(auditee_id, taxonomy, term_id)
        )
        "#,
    )
    .execute(pool)
    .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn schema_creation_is_idempotent() {
        let pool = SqlitePool::connect("sqlite::memory:")
            .await
            .expect("in-memory database");

        create_all_tables(&pool).await.expect("first pass");
        create_all_tables(&pool).await.expect("second pass");
    }

    #[tokio::test]
    async fn init_creates_database_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let db_path = dir.path().join("abim.db");

        let pool = init_database(&db_path).await.expect("init database");
        assert!(db_path.exists());

        // Schema must be usable straight away
        sqlx::query("INSERT INTO settings (key, value) VALUES ('k', 'v')")
            .execute(&pool)
            .await
            .expect("insert into settings");
    }
}
