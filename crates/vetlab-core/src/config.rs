//! Workstation configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable overriding the signing clinician.
pub const CLINICIAN_ENV: &str = "VETLAB_CLINICIAN";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Lab-wide settings. Missing fields take their defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LabConfig {
    /// Clinician stamped on every report
    pub clinician: String,
    /// Lab name shown on exported reports
    pub lab_name: String,
    /// `source` field of full-store backups
    pub backup_source: String,
    /// Seed an empty registry with demo patients
    pub seed_patients: bool,
    /// Number of the first report when none exist
    pub first_report_number: u64,
}

impl Default for LabConfig {
    fn default() -> Self {
        Self {
            clinician: "Dr. Lab Specialist".into(),
            lab_name: "CADDL Lab".into(),
            backup_source: "VetLab Diagnostics".into(),
            seed_patients: true,
            first_report_number: 1001,
        }
    }
}

impl LabConfig {
    /// Defaults with environment overrides applied.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    /// Parse JSON as-is. Environment overrides are not applied; see [`LabConfig::load`].
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load from a JSON file, then apply environment overrides.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config = Self::from_json(&contents)?;
        config.apply_env();
        Ok(config)
    }

    /// `VETLAB_CLINICIAN`, when set and non-blank, replaces the clinician.
    pub fn apply_env(&mut self) {
        if let Ok(clinician) = std::env::var(CLINICIAN_ENV) {
            if !clinician.trim().is_empty() {
                self.clinician = clinician;
            }
        }
    }
}
