//! Report store: patients and reports mirrored to persistent storage.
//!
//! Each [`ReportStore`] is one working instance (a window, a tab, a process)
//! over shared storage. Every write replaces the full patient or report list,
//! then signals the other instances on the [`SyncBus`]; they reload on their
//! next [`ReportStore::sync`]. There is no merging: the last writer wins.

mod filter;
mod sync;

pub use filter::*;
pub use sync::*;

use std::sync::mpsc::Receiver;

use thiserror::Error;
use uuid::Uuid;

use crate::assembler::{Assembler, AssemblyError, PanelBuilder};
use crate::catalog::Catalog;
use crate::config::LabConfig;
use crate::db::{Database, DbError, DRAFT_KEY, PATIENTS_KEY, PATIENT_FORM_KEY, REPORTS_KEY};
use crate::export::{ExportError, StoreBackup};
use crate::models::{seed_patients, DiagnosticReport, NewPatient, Patient};

/// Store errors.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] DbError),

    #[error(transparent)]
    Assembly(#[from] AssemblyError),

    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Export(#[from] ExportError),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Counts from a successful backup import.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    pub patients: usize,
    pub reports: usize,
}

/// One store instance over shared storage.
pub struct ReportStore {
    instance_id: Uuid,
    db: Database,
    config: LabConfig,
    catalog: Catalog,
    assembler: Assembler,
    patients: Vec<Patient>,
    /// Most recent first
    reports: Vec<DiagnosticReport>,
    bus: SyncBus,
    inbox: Receiver<SyncSignal>,
}

impl ReportStore {
    /// Open a store instance and load the current lists.
    pub fn open(db: Database, bus: SyncBus, config: LabConfig) -> StoreResult<Self> {
        let inbox = bus.subscribe();
        let mut store = Self {
            instance_id: Uuid::new_v4(),
            db,
            assembler: Assembler::new(&config),
            config,
            catalog: Catalog::builtin(),
            patients: Vec::new(),
            reports: Vec::new(),
            bus,
            inbox,
        };
        store.load()?;
        Ok(store)
    }

    /// Replace the built-in catalog.
    pub fn with_catalog(mut self, catalog: Catalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// Replace the assembler (e.g. to pin the report date).
    pub fn with_assembler(mut self, assembler: Assembler) -> Self {
        self.assembler = assembler;
        self
    }

    /// Reload both lists from storage, discarding in-memory state.
    ///
    /// A registry that was never written is seeded with the demo patients
    /// when the config asks for it.
    pub fn load(&mut self) -> StoreResult<()> {
        self.patients = match self.db.load_json(PATIENTS_KEY)? {
            Some(patients) => patients,
            None if self.config.seed_patients => {
                let seeded = seed_patients();
                self.db.save_json(PATIENTS_KEY, &seeded)?;
                seeded
            }
            None => Vec::new(),
        };
        self.reports = self.db.load_json(REPORTS_KEY)?.unwrap_or_default();
        Ok(())
    }

    pub fn instance_id(&self) -> Uuid {
        self.instance_id
    }

    pub fn config(&self) -> &LabConfig {
        &self.config
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn patients(&self) -> &[Patient] {
        &self.patients
    }

    /// All reports, most recent first.
    pub fn reports(&self) -> &[DiagnosticReport] {
        &self.reports
    }

    pub fn find_patient(&self, id: &str) -> Option<&Patient> {
        self.patients.iter().find(|p| p.id == id)
    }

    pub fn find_report(&self, id: &str) -> Option<&DiagnosticReport> {
        self.reports.iter().find(|r| r.id == id)
    }

    /// Reports matching `filter`, in history order.
    pub fn filter_reports(&self, filter: &ReportFilter) -> Vec<&DiagnosticReport> {
        self.reports
            .iter()
            .filter(|r| filter.matches(r, &self.patients))
            .collect()
    }

    /// Register a patient under the next sequential ID.
    pub fn register_patient(&mut self, form: NewPatient) -> StoreResult<Patient> {
        let missing = form.missing_fields();
        if !missing.is_empty() {
            return Err(StoreError::MissingFields(missing));
        }

        let patient = form.into_patient(self.patients.len());
        let mut patients = self.patients.clone();
        patients.push(patient.clone());
        self.db.save_json(PATIENTS_KEY, &patients)?;
        self.patients = patients;
        self.clear_patient_form()?;

        tracing::info!(patient_id = %patient.id, name = %patient.name, "registered patient");
        self.notify();
        Ok(patient)
    }

    /// Assemble the builder's panels into a new report and prepend it.
    ///
    /// On success the builder and its persisted draft are cleared. On failure
    /// nothing changes and no report number is consumed.
    pub fn submit(&mut self, builder: &mut PanelBuilder) -> StoreResult<DiagnosticReport> {
        let report = self
            .assembler
            .assemble(&builder.patient_id, &builder.panels, &self.reports)?;
        self.save_report(report.clone())?;

        builder.clear();
        self.clear_draft()?;

        tracing::info!(
            report_id = %report.id,
            patient_id = %report.patient_id,
            test_type = %report.test_type,
            "submitted report"
        );
        Ok(report)
    }

    /// Prepend an already-built report and persist the full list.
    pub fn save_report(&mut self, report: DiagnosticReport) -> StoreResult<()> {
        let mut reports = Vec::with_capacity(self.reports.len() + 1);
        reports.push(report);
        reports.extend(self.reports.iter().cloned());
        self.db.save_json(REPORTS_KEY, &reports)?;
        self.reports = reports;
        self.notify();
        Ok(())
    }

    /// Attach an externally supplied narrative summary to a report.
    pub fn set_summary(&mut self, report_id: &str, summary: impl Into<String>) -> StoreResult<()> {
        let index = self
            .reports
            .iter()
            .position(|r| r.id == report_id)
            .ok_or_else(|| StoreError::NotFound(report_id.to_string()))?;

        let mut reports = self.reports.clone();
        reports[index].summary = summary.into();
        self.db.save_json(REPORTS_KEY, &reports)?;
        self.reports = reports;
        self.notify();
        Ok(())
    }

    /// Persist the in-progress builder so a later session can resume it.
    pub fn save_draft(&self, builder: &PanelBuilder) -> StoreResult<()> {
        self.db.save_json(DRAFT_KEY, builder)?;
        Ok(())
    }

    /// The persisted builder, if any. A corrupt draft is discarded.
    pub fn load_draft(&self) -> StoreResult<Option<PanelBuilder>> {
        match self.db.load_json(DRAFT_KEY) {
            Ok(draft) => Ok(draft),
            Err(DbError::Json(e)) => {
                tracing::warn!(error = %e, "discarding unreadable report draft");
                self.clear_draft()?;
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn clear_draft(&self) -> StoreResult<()> {
        self.db.remove(DRAFT_KEY)?;
        Ok(())
    }

    /// Persist a half-filled registration form.
    pub fn save_patient_form(&self, form: &NewPatient) -> StoreResult<()> {
        self.db.save_json(PATIENT_FORM_KEY, form)?;
        Ok(())
    }

    /// The persisted registration form, if any. A corrupt form is discarded.
    pub fn load_patient_form(&self) -> StoreResult<Option<NewPatient>> {
        match self.db.load_json(PATIENT_FORM_KEY) {
            Ok(form) => Ok(form),
            Err(DbError::Json(e)) => {
                tracing::warn!(error = %e, "discarding unreadable registration form");
                self.clear_patient_form()?;
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn clear_patient_form(&self) -> StoreResult<()> {
        self.db.remove(PATIENT_FORM_KEY)?;
        Ok(())
    }

    /// Snapshot of the full store.
    pub fn export_backup(&self) -> StoreBackup {
        StoreBackup::new(
            self.patients.clone(),
            self.reports.clone(),
            &self.config.backup_source,
        )
    }

    /// Replace both lists with a backup's contents. All or nothing.
    pub fn import_backup(&mut self, json: &str) -> StoreResult<ImportSummary> {
        let backup = StoreBackup::from_json(json).map_err(|e| {
            tracing::warn!(error = %e, "rejected backup import");
            e
        })?;

        let tx = self.db.conn().unchecked_transaction().map_err(DbError::from)?;
        self.db.save_json(PATIENTS_KEY, &backup.patients)?;
        self.db.save_json(REPORTS_KEY, &backup.reports)?;
        tx.commit().map_err(DbError::from)?;

        let summary = ImportSummary {
            patients: backup.patients.len(),
            reports: backup.reports.len(),
        };
        self.patients = backup.patients;
        self.reports = backup.reports;

        tracing::info!(
            patients = summary.patients,
            reports = summary.reports,
            "imported backup"
        );
        self.notify();
        Ok(summary)
    }

    /// A fresh listener for this store's bus, for observers outside the store.
    pub fn subscribe(&self) -> Receiver<SyncSignal> {
        self.bus.subscribe()
    }

    /// Drain pending signals and reload if another instance wrote.
    ///
    /// Returns whether a reload happened.
    pub fn sync(&mut self) -> StoreResult<bool> {
        let foreign = self
            .inbox
            .try_iter()
            .filter(|signal| signal.origin != self.instance_id)
            .count();
        if foreign == 0 {
            return Ok(false);
        }
        tracing::info!(instance = %self.instance_id, signals = foreign, "reloading after external write");
        self.load()?;
        Ok(true)
    }

    fn notify(&self) {
        self.bus.broadcast(self.instance_id);
    }
}
