//! Positional row model for auditee import CSVs.
//!
//! Column layout (no header row):
//!
//! | idx | field      | use                                              |
//! |-----|------------|--------------------------------------------------|
//! | 0   | BodyID     | external identifier, the upsert key              |
//! | 1   | Name       | display title; empty means the row is skipped    |
//! | 2   | BodyType   | taxonomy term name                               |
//! | 3   | OptedIn    | "Yes" (exact) writes the opt-in fields           |
//! | 4   | AuditFirm  | firm name, find-or-create by slug                |
//! | 5   | LeadName   | engagement lead name                             |
//! | 6   | LeadEmail  | engagement lead email                            |
//! | 7   | Fee        | fee as text                                      |
//! | 8   | Year       | engagement year                                  |

use serde::{Deserialize, Serialize};

/// One CSV row of auditee data. Wraps the raw ordered fields; accessors
/// return trimmed values and tolerate missing trailing fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CsvRow(Vec<String>);

impl CsvRow {
    pub fn new(fields: Vec<String>) -> Self {
        Self(fields)
    }

    /// Raw field at `idx`, empty string when the row is short.
    fn field(&self, idx: usize) -> &str {
        self.0.get(idx).map(String::as_str).unwrap_or("")
    }

    /// External body identifier, the auditee upsert key.
    pub fn body_id(&self) -> &str {
        self.field(0).trim()
    }

    /// Display title. Empty means the row is a no-op.
    pub fn name(&self) -> &str {
        self.field(1).trim()
    }

    /// Untrimmed Name field, echoed back as the outcome label.
    pub fn name_raw(&self) -> &str {
        self.field(1)
    }

    /// Body type taxonomy term name.
    pub fn body_type(&self) -> &str {
        self.field(2).trim()
    }

    /// Opt-in gate: the literal "Yes", exact match, nothing else.
    pub fn opted_in(&self) -> bool {
        self.field(3).trim() == "Yes"
    }

    /// Audit firm name, looked up by slug before creation.
    pub fn audit_firm(&self) -> &str {
        self.field(4).trim()
    }

    pub fn lead_name(&self) -> &str {
        self.field(5).trim()
    }

    pub fn lead_email(&self) -> &str {
        self.field(6).trim()
    }

    pub fn fee(&self) -> &str {
        self.field(7).trim()
    }

    /// Year this engagement row applies to; doubles as the opt-in year.
    pub fn year(&self) -> &str {
        self.field(8).trim()
    }

    /// An engagement entry is appended only when the firm, both lead
    /// fields, and the fee are all present.
    pub fn has_engagement_data(&self) -> bool {
        !self.audit_firm().is_empty()
            && !self.lead_name().is_empty()
            && !self.lead_email().is_empty()
            && !self.fee().is_empty()
    }
}

impl From<Vec<String>> for CsvRow {
    fn from(fields: Vec<String>) -> Self {
        Self::new(fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(fields: &[&str]) -> CsvRow {
        CsvRow::new(fields.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn accessors_trim_fields() {
        let r = row(&[" 101 ", " Test Council ", "Council", " Yes "]);
        assert_eq!(r.body_id(), "101");
        assert_eq!(r.name(), "Test Council");
        assert_eq!(r.name_raw(), " Test Council ");
        assert!(r.opted_in());
    }

    #[test]
    fn short_rows_read_as_empty_fields() {
        let r = row(&["101", "Name"]);
        assert_eq!(r.year(), "");
        assert!(!r.opted_in());
        assert!(!r.has_engagement_data());
    }

    #[test]
    fn opt_in_requires_exact_yes() {
        for value in ["yes", "YES", "No", "", "Yes please"] {
            let r = row(&["1", "n", "t", value]);
            assert!(!r.opted_in(), "{value:?} must not opt in");
        }
        assert!(row(&["1", "n", "t", "Yes"]).opted_in());
    }

    #[test]
    fn engagement_needs_all_four_fields() {
        let full = row(&["1", "n", "t", "", "Firm", "Lead", "lead@x.com", "100", "2024"]);
        assert!(full.has_engagement_data());
        for missing in 4..=7 {
            let mut fields: Vec<String> = full.clone().0;
            fields[missing] = "  ".to_string();
            assert!(!CsvRow::new(fields).has_engagement_data());
        }
    }
}
