//! Row import pipeline.
//!
//! One row in, one outcome out: resolve the auditee by its external BodyID,
//! upsert it, conditionally write the opt-in fields, find-or-create the
//! audit firm and append the year's engagement entry, then assign the body
//! type term. No transaction spans the steps; a failure partway leaves the
//! auditee partially updated and there is no compensating action.

use abim_common::api::ImportOutcome;
use abim_common::slug::slugify;
use abim_common::{CsvRow, Result};
use tracing::debug;

use crate::store::{EngagementEntry, RecordStore};

/// Metadata key the external body identifier is stored under.
pub const BODY_ID_META_KEY: &str = "new_body_id";

/// Taxonomy the body type term is assigned under.
pub const BODY_TYPE_TAXONOMY: &str = "bodytype";

/// Import one row.
///
/// A row with an empty Name is a skip, not an error: nothing is written
/// and the outcome still echoes the raw Name field so client logs stay
/// aligned with the source file.
pub async fn import_row<S: RecordStore>(store: &S, row: &CsvRow) -> Result<ImportOutcome> {
    let label = row.name_raw().to_string();

    if row.name().is_empty() {
        debug!("Skipping row with empty name");
        return Ok(ImportOutcome::processed(label));
    }

    let existing = store
        .find_auditee_by_external_id(BODY_ID_META_KEY, row.body_id())
        .await?;
    let auditee_id = store.upsert_auditee(existing, row.name()).await?;
    store
        .set_auditee_meta(auditee_id, BODY_ID_META_KEY, row.body_id())
        .await?;

    if row.opted_in() {
        store.set_opt_in(auditee_id, row.year()).await?;
    }

    if row.has_engagement_data() {
        let firm_id = match store.find_firm_by_slug(&slugify(row.audit_firm())).await? {
            Some(id) => id,
            None => store.create_firm(row.audit_firm()).await?,
        };

        store
            .append_engagement(
                auditee_id,
                &EngagementEntry {
                    year: row.year().to_string(),
                    fee: row.fee().to_string(),
                    audit_firm_id: firm_id,
                    lead_name: row.lead_name().to_string(),
                    lead_email: row.lead_email().to_string(),
                },
            )
            .await?;
    }

    store
        .set_taxonomy_term(auditee_id, BODY_TYPE_TAXONOMY, row.body_type())
        .await?;

    Ok(ImportOutcome::processed(label))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{audit_firms, auditees, engagements, taxonomy};
    use crate::store::SqliteStore;
    use abim_common::db::create_all_tables;
    use sqlx::SqlitePool;

    async fn test_store() -> SqliteStore {
        let pool = SqlitePool::connect("sqlite::memory:")
            .await
            .expect("in-memory database");
        sqlx::query("PRAGMA foreign_keys = ON")
            .execute(&pool)
            .await
            .expect("enable foreign keys");
        create_all_tables(&pool).await.expect("create schema");
        SqliteStore::new(pool)
    }

    fn sample_row() -> CsvRow {
        CsvRow::new(
            [
                "101",
                "Test Council",
                "Council",
                "Yes",
                "Acme Audit",
                "Jane Doe",
                "jane@example.com",
                "5000",
                "2024",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        )
    }

    #[tokio::test]
    async fn full_row_creates_everything() {
        let store = test_store().await;
        let outcome = import_row(&store, &sample_row()).await.expect("import");
        assert!(outcome.ok);
        assert_eq!(outcome.label, "Test Council");

        let pool = store.pool();
        assert_eq!(auditees::count(pool).await.expect("count"), 1);
        assert_eq!(audit_firms::count(pool).await.expect("count"), 1);

        let auditee_id = auditees::find_by_meta(pool, BODY_ID_META_KEY, "101")
            .await
            .expect("find")
            .expect("resolved");
        let auditee = auditees::load_by_guid(pool, auditee_id)
            .await
            .expect("load")
            .expect("exists");
        assert_eq!(auditee.title, "Test Council");
        assert!(auditee.opted_in);
        assert_eq!(auditee.opted_in_year.as_deref(), Some("2024"));

        let listed = engagements::list_for_auditee(pool, auditee_id)
            .await
            .expect("engagements");
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].year, "2024");
        assert_eq!(listed[0].fee, "5000");
        assert_eq!(listed[0].lead_name, "Jane Doe");
        assert_eq!(listed[0].lead_email, "jane@example.com");

        let terms = taxonomy::terms_for(pool, auditee_id, BODY_TYPE_TAXONOMY)
            .await
            .expect("terms");
        assert_eq!(terms, vec!["Council"]);
    }

    #[tokio::test]
    async fn reimport_updates_in_place() {
        let store = test_store().await;
        import_row(&store, &sample_row()).await.expect("first");

        let first_id = auditees::find_by_meta(store.pool(), BODY_ID_META_KEY, "101")
            .await
            .expect("find")
            .expect("resolved");

        let renamed = CsvRow::new(
            ["101", "Renamed Council", "Council", "Yes", "", "", "", "", "2024"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        );
        import_row(&store, &renamed).await.expect("second");

        let pool = store.pool();
        assert_eq!(auditees::count(pool).await.expect("count"), 1);
        let auditee = auditees::load_by_guid(pool, first_id)
            .await
            .expect("load")
            .expect("exists");
        assert_eq!(auditee.title, "Renamed Council");
    }

    #[tokio::test]
    async fn opt_in_reimport_is_idempotent() {
        let store = test_store().await;
        import_row(&store, &sample_row()).await.expect("first");
        import_row(&store, &sample_row()).await.expect("second");

        let pool = store.pool();
        let auditee_id = auditees::find_by_meta(pool, BODY_ID_META_KEY, "101")
            .await
            .expect("find")
            .expect("resolved");
        let auditee = auditees::load_by_guid(pool, auditee_id)
            .await
            .expect("load")
            .expect("exists");
        assert!(auditee.opted_in);
        assert_eq!(auditee.opted_in_year.as_deref(), Some("2024"));
    }

    #[tokio::test]
    async fn opt_in_untouched_without_exact_yes() {
        let store = test_store().await;
        import_row(&store, &sample_row()).await.expect("opt in");

        // A later year's row without the exact "Yes" must not clear the flag
        let row = CsvRow::new(
            ["101", "Test Council", "Council", "no", "", "", "", "", "2025"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        );
        import_row(&store, &row).await.expect("reimport");

        let pool = store.pool();
        let auditee_id = auditees::find_by_meta(pool, BODY_ID_META_KEY, "101")
            .await
            .expect("find")
            .expect("resolved");
        let auditee = auditees::load_by_guid(pool, auditee_id)
            .await
            .expect("load")
            .expect("exists");
        assert!(auditee.opted_in);
        assert_eq!(auditee.opted_in_year.as_deref(), Some("2024"));
    }

    #[tokio::test]
    async fn engagement_reimport_appends_duplicate() {
        let store = test_store().await;
        import_row(&store, &sample_row()).await.expect("first");
        import_row(&store, &sample_row()).await.expect("second");

        let pool = store.pool();
        let auditee_id = auditees::find_by_meta(pool, BODY_ID_META_KEY, "101")
            .await
            .expect("find")
            .expect("resolved");
        let listed = engagements::list_for_auditee(pool, auditee_id)
            .await
            .expect("engagements");
        assert_eq!(listed.len(), 2);
    }

    #[tokio::test]
    async fn firm_lookup_is_reuse_first() {
        let store = test_store().await;
        let existing = audit_firms::create(store.pool(), "Acme Audit")
            .await
            .expect("pre-existing firm");

        import_row(&store, &sample_row()).await.expect("import");

        let pool = store.pool();
        assert_eq!(audit_firms::count(pool).await.expect("count"), 1);

        let auditee_id = auditees::find_by_meta(pool, BODY_ID_META_KEY, "101")
            .await
            .expect("find")
            .expect("resolved");
        let listed = engagements::list_for_auditee(pool, auditee_id)
            .await
            .expect("engagements");
        assert_eq!(listed[0].audit_firm_id, existing);
    }

    #[tokio::test]
    async fn partial_engagement_fields_append_nothing() {
        let store = test_store().await;
        let row = CsvRow::new(
            ["101", "Test Council", "Council", "", "Acme Audit", "Jane Doe", "", "5000", "2024"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        );
        import_row(&store, &row).await.expect("import");

        let pool = store.pool();
        // Firm is only created on the engagement path
        assert_eq!(audit_firms::count(pool).await.expect("count"), 0);

        let auditee_id = auditees::find_by_meta(pool, BODY_ID_META_KEY, "101")
            .await
            .expect("find")
            .expect("resolved");
        let listed = engagements::list_for_auditee(pool, auditee_id)
            .await
            .expect("engagements");
        assert!(listed.is_empty());
    }

    #[tokio::test]
    async fn empty_name_skips_row() {
        let store = test_store().await;
        let row = CsvRow::new(
            ["101", "   ", "Council", "Yes", "", "", "", "", "2024"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        );
        let outcome = import_row(&store, &row).await.expect("import");
        assert!(outcome.ok);
        assert_eq!(outcome.label, "   ");
        assert_eq!(auditees::count(store.pool()).await.expect("count"), 0);
    }

    #[tokio::test]
    async fn bodytype_reassignment_is_single_valued() {
        let store = test_store().await;
        import_row(&store, &sample_row()).await.expect("first");

        let row = CsvRow::new(
            ["101", "Test Council", "District", "", "", "", "", "", "2025"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        );
        import_row(&store, &row).await.expect("second");

        let pool = store.pool();
        let auditee_id = auditees::find_by_meta(pool, BODY_ID_META_KEY, "101")
            .await
            .expect("find")
            .expect("resolved");
        let terms = taxonomy::terms_for(pool, auditee_id, BODY_TYPE_TAXONOMY)
            .await
            .expect("terms");
        assert_eq!(terms, vec!["District"]);
    }
}
