//! Diagnostic report models.

use serde::{Deserialize, Serialize};

use super::panel::{ParameterResult, StatusCategory};

/// Prefix of every report ID.
pub const REPORT_ID_PREFIX: &str = "REP";

/// A finalized lab report.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticReport {
    /// `REP-<n>`
    pub id: String,
    pub patient_id: String,
    /// Calendar date, `YYYY-MM-DD`
    pub date: String,
    /// Panel short names joined with " + "
    pub test_type: String,
    pub parameters: Vec<ParameterResult>,
    /// Narrative summary, filled in after creation if at all
    pub summary: String,
    pub clinician: String,
}

impl DiagnosticReport {
    /// Numeric suffix of the report ID, if it has one.
    pub fn number(&self) -> Option<u64> {
        report_number(&self.id)
    }

    /// True when any parameter is anything but Normal (Pending included).
    pub fn has_abnormal(&self) -> bool {
        self.parameters
            .iter()
            .any(|p| p.status != StatusCategory::Normal)
    }

    /// Parameters whose status is not Normal.
    pub fn flagged(&self) -> impl Iterator<Item = &ParameterResult> {
        self.parameters.iter().filter(|p| !p.is_normal())
    }
}

/// Parse the integer after the first `-` in a report ID.
pub fn report_number(id: &str) -> Option<u64> {
    id.split('-').nth(1)?.trim().parse().ok()
}

pub fn format_report_id(number: u64) -> String {
    format!("{}-{}", REPORT_ID_PREFIX, number)
}
