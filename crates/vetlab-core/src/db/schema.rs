//! SQLite schema definition.

/// Key under which the patient list is stored.
pub const PATIENTS_KEY: &str = "vetdiag_patients";
/// Key under which the report list is stored.
pub const REPORTS_KEY: &str = "vetdiag_reports";
/// Key under which the in-progress report builder is stored.
pub const DRAFT_KEY: &str = "vetdiag_multi_test_form";
/// Key under which the in-progress registration form is stored.
pub const PATIENT_FORM_KEY: &str = "vetdiag_new_patient_form";

/// Complete database schema.
///
/// Every record is a whole JSON document under a fixed key; writes replace
/// the full document.
pub const SCHEMA: &str = r#"
-- ============================================================================
-- Key-value documents
-- ============================================================================

CREATE TABLE IF NOT EXISTS kv_store (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,                         -- JSON document
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);
"#;
