//! Record store seam between the import pipeline and SQLite.
//!
//! The pipeline only ever talks to [`RecordStore`], so tests can substitute
//! a double and the storage backend stays swappable.

use abim_common::Result;
use async_trait::async_trait;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::db;
pub use crate::db::engagements::EngagementEntry;

/// Storage operations the row import pipeline depends on.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Resolve an auditee through the metadata index; `Some` only for
    /// exactly one well-formed match.
    async fn find_auditee_by_external_id(&self, key: &str, value: &str) -> Result<Option<Uuid>>;

    /// Create an auditee or update an existing one's title in place,
    /// returning its identity.
    async fn upsert_auditee(&self, id: Option<Uuid>, title: &str) -> Result<Uuid>;

    /// Write one metadata key, replacing any prior value.
    async fn set_auditee_meta(&self, auditee_id: Uuid, key: &str, value: &str) -> Result<()>;

    /// Set the opt-in flag and year.
    async fn set_opt_in(&self, auditee_id: Uuid, year: &str) -> Result<()>;

    /// Look up a firm by slug, reuse-first.
    async fn find_firm_by_slug(&self, slug: &str) -> Result<Option<Uuid>>;

    /// Create a firm from its display title.
    async fn create_firm(&self, title: &str) -> Result<Uuid>;

    /// Append one entry to the auditee's repeating engagement group.
    async fn append_engagement(&self, auditee_id: Uuid, entry: &EngagementEntry) -> Result<()>;

    /// Assign a taxonomy term, replacing prior terms for that taxonomy.
    async fn set_taxonomy_term(&self, auditee_id: Uuid, taxonomy: &str, name: &str) -> Result<()>;
}

/// Production [`RecordStore`] over the SQLite pool.
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl RecordStore for SqliteStore {
    async fn find_auditee_by_external_id(&self, key: &str, value: &str) -> Result<Option<Uuid>> {
        db::auditees::find_by_meta(&self.pool, key, value).await
    }

    async fn upsert_auditee(&self, id: Option<Uuid>, title: &str) -> Result<Uuid> {
        db::auditees::upsert(&self.pool, id, title).await
    }

    async fn set_auditee_meta(&self, auditee_id: Uuid, key: &str, value: &str) -> Result<()> {
        db::auditees::set_meta(&self.pool, auditee_id, key, value).await
    }

    async fn set_opt_in(&self, auditee_id: Uuid, year: &str) -> Result<()> {
        db::auditees::set_opt_in(&self.pool, auditee_id, year).await
    }

    async fn find_firm_by_slug(&self, slug: &str) -> Result<Option<Uuid>> {
        db::audit_firms::find_by_slug(&self.pool, slug).await
    }

    async fn create_firm(&self, title: &str) -> Result<Uuid> {
        db::audit_firms::create(&self.pool, title).await
    }

    async fn append_engagement(&self, auditee_id: Uuid, entry: &EngagementEntry) -> Result<()> {
        db::engagements::append(&self.pool, auditee_id, entry).await
    }

    async fn set_taxonomy_term(&self, auditee_id: Uuid, taxonomy: &str, name: &str) -> Result<()> {
        db::taxonomy::set_object_term(&self.pool, auditee_id, taxonomy, name).await
    }
}
