//! JSON export of single reports and full-store backups.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::models::{DiagnosticReport, Patient};

/// Export/import errors.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid backup file format.")]
    InvalidFormat,
}

pub type ExportResult<T> = Result<T, ExportError>;

/// Full-store backup document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StoreBackup {
    pub patients: Vec<Patient>,
    pub reports: Vec<DiagnosticReport>,
    /// RFC 3339 export timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub export_date: Option<String>,
    /// Exporting system identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl StoreBackup {
    /// Snapshot the given lists, stamped with the current time.
    pub fn new(patients: Vec<Patient>, reports: Vec<DiagnosticReport>, source: &str) -> Self {
        Self {
            patients,
            reports,
            export_date: Some(chrono::Utc::now().to_rfc3339()),
            source: Some(source.to_string()),
        }
    }

    /// Export to pretty-printed JSON.
    pub fn to_json(&self) -> ExportResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a backup document.
    ///
    /// The document must be an object carrying both a `patients` array and a
    /// `reports` array whose entries are well-formed; anything else is
    /// rejected as a whole.
    pub fn from_json(json: &str) -> ExportResult<Self> {
        let value: Value = serde_json::from_str(json).map_err(|_| ExportError::InvalidFormat)?;
        let has_arrays = value.get("patients").is_some_and(Value::is_array)
            && value.get("reports").is_some_and(Value::is_array);
        if !has_arrays {
            return Err(ExportError::InvalidFormat);
        }
        serde_json::from_value(value).map_err(|_| ExportError::InvalidFormat)
    }
}

/// A single report as pretty-printed JSON.
pub fn report_to_json(report: &DiagnosticReport) -> ExportResult<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

/// Suggested download file name for a report.
pub fn report_file_name(report: &DiagnosticReport) -> String {
    format!("{}_{}.json", report.id, report.patient_id)
}

/// Suggested download file name for a backup taken on `date` (`YYYY-MM-DD`).
pub fn backup_file_name(date: &str) -> String {
    format!("vetlab_backup_{}.json", date)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::seed_patients;

    fn sample_report() -> DiagnosticReport {
        DiagnosticReport {
            id: "REP-1001".into(),
            patient_id: "P001".into(),
            date: "2024-05-17".into(),
            test_type: "Lipid Profile".into(),
            parameters: vec![],
            summary: String::new(),
            clinician: "Dr. Lab Specialist".into(),
        }
    }

    #[test]
    fn test_backup_envelope_fields() {
        let backup = StoreBackup::new(seed_patients(), vec![sample_report()], "VetLab Diagnostics");
        let json: Value = serde_json::from_str(&backup.to_json().unwrap()).unwrap();
        assert!(json["exportDate"].is_string());
        assert_eq!(json["source"], "VetLab Diagnostics");
        assert_eq!(json["patients"].as_array().unwrap().len(), 2);
        assert_eq!(json["reports"][0]["testType"], "Lipid Profile");
    }

    #[test]
    fn test_bare_backup_without_envelope() {
        let json = r#"{"patients": [], "reports": []}"#;
        let backup = StoreBackup::from_json(json).unwrap();
        assert!(backup.patients.is_empty());
        assert!(backup.export_date.is_none());
    }

    #[test]
    fn test_rejects_missing_arrays() {
        for json in [
            r#"{"patients": []}"#,
            r#"{"reports": []}"#,
            r#"{"patients": {}, "reports": []}"#,
            r#"[1, 2, 3]"#,
            "not json at all",
        ] {
            assert!(
                matches!(StoreBackup::from_json(json), Err(ExportError::InvalidFormat)),
                "accepted {}",
                json
            );
        }
    }

    #[test]
    fn test_rejects_malformed_entries() {
        let json = r#"{"patients": [{"id": "P001"}], "reports": []}"#;
        assert!(matches!(
            StoreBackup::from_json(json),
            Err(ExportError::InvalidFormat)
        ));
    }

    #[test]
    fn test_report_export() {
        let report = sample_report();
        let json = report_to_json(&report).unwrap();
        assert!(json.contains("\n"));
        assert!(json.contains("\"patientId\": \"P001\""));
        assert_eq!(report_file_name(&report), "REP-1001_P001.json");
        assert_eq!(backup_file_name("2024-05-17"), "vetlab_backup_2024-05-17.json");
    }
}
