//! Panel assembler: merges working panels into one diagnostic report.
//!
//! Pipeline: catalog template → [`PanelBuilder`] (value entry) → [`Assembler`] → report store

mod builder;

pub use builder::*;

use chrono::NaiveDate;
use thiserror::Error;

use crate::config::LabConfig;
use crate::models::{format_report_id, DiagnosticReport, Panel, ParameterResult};

/// Assembly and builder errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AssemblyError {
    #[error("Please select a patient.")]
    NoPatientSelected,

    #[error("Please add at least one test panel.")]
    NoPanels,

    #[error("No panel at index {0}")]
    PanelOutOfRange(usize),

    #[error("Panel {panel} has no parameter at index {parameter}")]
    ParameterOutOfRange { panel: usize, parameter: usize },

    #[error("Report numbers exhausted after {0}")]
    ReportNumberExhausted(u64),

    #[error(transparent)]
    Catalog(#[from] crate::catalog::CatalogError),
}

pub type AssemblyResult<T> = Result<T, AssemblyError>;

/// Builds reports from panels.
#[derive(Debug, Clone)]
pub struct Assembler {
    clinician: String,
    first_report_number: u64,
    date: Option<NaiveDate>,
}

impl Default for Assembler {
    fn default() -> Self {
        Self::new(&LabConfig::default())
    }
}

impl Assembler {
    pub fn new(config: &LabConfig) -> Self {
        Self {
            clinician: config.clinician.clone(),
            first_report_number: config.first_report_number,
            date: None,
        }
    }

    /// Stamp reports with a fixed date instead of today's.
    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    /// Next report number given the full, unfiltered report history.
    pub fn next_report_number(&self, history: &[DiagnosticReport]) -> AssemblyResult<u64> {
        next_report_number(history, self.first_report_number)
    }

    /// Assemble a report from `panels` for `patient_id`.
    ///
    /// Every value is re-classified; nothing is mutated on failure.
    pub fn assemble(
        &self,
        patient_id: &str,
        panels: &[Panel],
        history: &[DiagnosticReport],
    ) -> AssemblyResult<DiagnosticReport> {
        if patient_id.trim().is_empty() {
            return Err(AssemblyError::NoPatientSelected);
        }
        if panels.is_empty() {
            return Err(AssemblyError::NoPanels);
        }

        let parameters = panels
            .iter()
            .flat_map(|panel| {
                let short = panel.short_name();
                panel.parameters.iter().map(move |p| {
                    let mut result = ParameterResult {
                        name: format!("{}: {}", short, p.name),
                        ..p.clone()
                    };
                    result.reclassify();
                    result
                })
            })
            .collect();

        let test_type = panels
            .iter()
            .map(Panel::short_name)
            .collect::<Vec<_>>()
            .join(" + ");

        let date = self
            .date
            .unwrap_or_else(|| chrono::Utc::now().date_naive());

        Ok(DiagnosticReport {
            id: format_report_id(self.next_report_number(history)?),
            patient_id: patient_id.to_string(),
            date: date.format("%Y-%m-%d").to_string(),
            test_type,
            parameters,
            summary: String::new(),
            clinician: self.clinician.clone(),
        })
    }
}

/// Max numeric suffix across `history` plus one, or `first` for an empty history.
///
/// IDs without a numeric suffix are skipped. Fails when the highest
/// number has no successor.
pub fn next_report_number(history: &[DiagnosticReport], first: u64) -> AssemblyResult<u64> {
    let max = history
        .iter()
        .filter_map(|r| {
            let number = r.number();
            if number.is_none() {
                tracing::warn!(report_id = %r.id, "skipping report ID without numeric suffix");
            }
            number
        })
        .max();
    match max {
        Some(n) => n
            .checked_add(1)
            .ok_or(AssemblyError::ReportNumberExhausted(n)),
        None => Ok(first),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::models::StatusCategory;

    fn stub_report(id: &str) -> DiagnosticReport {
        DiagnosticReport {
            id: id.into(),
            patient_id: "P001".into(),
            date: "2024-03-01".into(),
            test_type: "KFT".into(),
            parameters: vec![],
            summary: String::new(),
            clinician: "Dr. Lab Specialist".into(),
        }
    }

    fn assembler() -> Assembler {
        Assembler::default().with_date(NaiveDate::from_ymd_opt(2024, 5, 17).unwrap())
    }

    #[test]
    fn test_next_report_number() {
        assert_eq!(next_report_number(&[], 1001), Ok(1001));
        let history = vec![stub_report("REP-1001"), stub_report("REP-1005")];
        assert_eq!(next_report_number(&history, 1001), Ok(1006));
        // Order does not matter
        let history = vec![stub_report("REP-1005"), stub_report("REP-1001")];
        assert_eq!(next_report_number(&history, 1001), Ok(1006));
    }

    #[test]
    fn test_next_report_number_skips_malformed_ids() {
        let history = vec![stub_report("legacy"), stub_report("REP-1010")];
        assert_eq!(next_report_number(&history, 1001), Ok(1011));
        assert_eq!(next_report_number(&[stub_report("legacy")], 1001), Ok(1001));
    }

    #[test]
    fn test_next_report_number_at_maximum() {
        let last = format!("REP-{}", u64::MAX);
        let history = vec![stub_report(&last), stub_report("REP-1001")];
        assert_eq!(
            next_report_number(&history, 1001),
            Err(AssemblyError::ReportNumberExhausted(u64::MAX))
        );

        let catalog = Catalog::builtin();
        let panel = catalog.instantiate("Lipid Profile").unwrap();
        assert_eq!(
            assembler().assemble("P001", &[panel], &history),
            Err(AssemblyError::ReportNumberExhausted(u64::MAX))
        );
    }

    #[test]
    fn test_assemble_prefixes_names_and_classifies() {
        let catalog = Catalog::builtin();
        let mut cbp = catalog.instantiate("CBP – Complete Blood Picture").unwrap();
        cbp.parameters[5].value = "120".into(); // MCV, status left stale on purpose
        let lft = catalog.instantiate("Liver Function Test (LFT)").unwrap();

        let report = assembler().assemble("P001", &[cbp, lft], &[]).unwrap();

        assert_eq!(report.id, "REP-1001");
        assert_eq!(report.date, "2024-05-17");
        assert_eq!(report.clinician, "Dr. Lab Specialist");
        assert_eq!(report.summary, "");
        assert_eq!(report.test_type, "CBP + Liver Function Test (LFT)");
        assert_eq!(report.parameters.len(), 23 + 5);

        let mcv = &report.parameters[5];
        assert_eq!(mcv.name, "CBP: MCV");
        assert_eq!(mcv.status, StatusCategory::High);

        assert_eq!(report.parameters[23].name, "Liver Function Test (LFT): Total Bilirubin");
        assert_eq!(report.parameters[25].name, "Liver Function Test (LFT): SGOT (AST)");
        assert_eq!(report.parameters[25].status, StatusCategory::Pending);
    }

    #[test]
    fn test_duplicate_panels_are_kept() {
        let catalog = Catalog::builtin();
        let kft = catalog.instantiate("Kidney Function Test (KFT)").unwrap();
        let report = assembler()
            .assemble("P002", &[kft.clone(), kft], &[stub_report("REP-1001")])
            .unwrap();
        assert_eq!(report.id, "REP-1002");
        assert_eq!(
            report.test_type,
            "Kidney Function Test (KFT) + Kidney Function Test (KFT)"
        );
        assert_eq!(report.parameters.len(), 6);
    }

    #[test]
    fn test_validation_failures() {
        let catalog = Catalog::builtin();
        let panel = catalog.instantiate("Thyroid Profile").unwrap();

        assert_eq!(
            assembler().assemble("", &[panel], &[]),
            Err(AssemblyError::NoPatientSelected)
        );
        assert_eq!(
            assembler().assemble("P001", &[], &[]),
            Err(AssemblyError::NoPanels)
        );
    }
}
