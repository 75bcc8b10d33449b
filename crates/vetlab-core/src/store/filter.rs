//! Report search and date filtering.

use chrono::NaiveDate;

use crate::models::{DiagnosticReport, Patient};

/// Search criteria for the report archive. Empty criteria match everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportFilter {
    /// Case-insensitive substring of the patient name or test type
    pub query: String,
    /// Inclusive lower date bound
    pub from: Option<NaiveDate>,
    /// Inclusive upper date bound
    pub to: Option<NaiveDate>,
}

impl ReportFilter {
    pub fn query(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    pub fn between(mut self, from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        self.from = from;
        self.to = to;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.query.is_empty() && self.from.is_none() && self.to.is_none()
    }

    /// Whether `report` matches; `patients` resolves the patient name.
    pub fn matches(&self, report: &DiagnosticReport, patients: &[Patient]) -> bool {
        self.matches_query(report, patients) && self.matches_date(report)
    }

    fn matches_query(&self, report: &DiagnosticReport, patients: &[Patient]) -> bool {
        let query = self.query.to_lowercase();
        let patient_name = patients
            .iter()
            .find(|p| p.id == report.patient_id)
            .map(|p| p.name.to_lowercase())
            .unwrap_or_default();
        patient_name.contains(&query) || report.test_type.to_lowercase().contains(&query)
    }

    fn matches_date(&self, report: &DiagnosticReport) -> bool {
        if self.from.is_none() && self.to.is_none() {
            return true;
        }
        // An unparseable date cannot be placed in any range
        let Ok(date) = NaiveDate::parse_from_str(&report.date, "%Y-%m-%d") else {
            return false;
        };
        self.from.map_or(true, |from| date >= from) && self.to.map_or(true, |to| date <= to)
    }
}
