//! VetLab Core Library
//!
//! Veterinary diagnostic-lab workstation core: reference-range classification,
//! multi-panel report assembly, and a persistent report store.
//!
//! # Architecture
//!
//! ```text
//!   Catalog (panel templates)
//!          │  deep copy on select
//!          ▼
//!   PanelBuilder ── value entry ──► Classifier (value, range) → status
//!          │
//!          ▼
//!   Assembler ── REP-<n>, "<short>: <name>", "A + B" ──┐
//!                                                      ▼
//!                                  ┌──────────── ReportStore ────────────┐
//!                                  │  patients[]  reports[] (newest 1st) │
//!                                  └───────┬──────────────────┬──────────┘
//!                                          │                  │
//!                                          ▼                  ▼
//!                                  SQLite documents      SyncBus → other
//!                                  (full-list writes)    instances reload
//! ```
//!
//! # Modules
//!
//! - [`models`]: Domain types (Patient, Panel, ParameterResult, DiagnosticReport)
//! - [`classifier`]: Status classification against reference ranges
//! - [`catalog`]: Built-in panel templates
//! - [`assembler`]: Panel builder and report assembly
//! - [`db`]: SQLite document storage
//! - [`store`]: Report store with cross-instance sync
//! - [`export`]: JSON report export and full-store backup
//! - [`config`]: Lab configuration

pub mod assembler;
pub mod catalog;
pub mod classifier;
pub mod config;
pub mod db;
pub mod export;
pub mod models;
pub mod store;

// Re-export commonly used types
pub use assembler::{Assembler, AssemblyError, PanelBuilder};
pub use catalog::{Catalog, CatalogError, PanelTemplate};
pub use classifier::{classify, ReferenceRange};
pub use config::LabConfig;
pub use db::Database;
pub use export::StoreBackup;
pub use models::{
    DiagnosticReport, NewPatient, Panel, ParameterDefinition, ParameterResult, Patient, Species,
    StatusCategory,
};
pub use store::{ReportFilter, ReportStore, StoreError, SyncBus};

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::sync::{Arc, Mutex};

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum VetLabError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid backup file format: {0}")]
    InvalidBackup(String),
}

impl From<db::DbError> for VetLabError {
    fn from(e: db::DbError) -> Self {
        VetLabError::DatabaseError(e.to_string())
    }
}

impl From<AssemblyError> for VetLabError {
    fn from(e: AssemblyError) -> Self {
        VetLabError::InvalidInput(e.to_string())
    }
}

impl From<StoreError> for VetLabError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Database(e) => e.into(),
            StoreError::Assembly(e) => e.into(),
            StoreError::MissingFields(_) => VetLabError::InvalidInput(e.to_string()),
            StoreError::NotFound(id) => VetLabError::NotFound(id),
            StoreError::Export(e) => VetLabError::InvalidBackup(e.to_string()),
        }
    }
}

impl From<config::ConfigError> for VetLabError {
    fn from(e: config::ConfigError) -> Self {
        VetLabError::InvalidInput(e.to_string())
    }
}

impl From<export::ExportError> for VetLabError {
    fn from(e: export::ExportError) -> Self {
        VetLabError::InvalidBackup(e.to_string())
    }
}

impl<T> From<std::sync::PoisonError<T>> for VetLabError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        VetLabError::DatabaseError(format!("Lock poisoned: {}", e))
    }
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Open or create a lab store at the given path.
///
/// Uses default settings plus environment overrides.
#[uniffi::export]
pub fn open_lab(path: String) -> Result<Arc<VetLabCore>, VetLabError> {
    let db = Database::open(&path)?;
    VetLabCore::new(db, SyncBus::new(), LabConfig::from_env())
}

/// Open a lab store with settings from a JSON config file.
#[uniffi::export]
pub fn open_lab_with_config(path: String, config_path: String) -> Result<Arc<VetLabCore>, VetLabError> {
    let config = LabConfig::load(&config_path)?;
    let db = Database::open(&path)?;
    VetLabCore::new(db, SyncBus::new(), config)
}

/// Open a second instance over the same storage, sharing `peer`'s sync bus.
#[uniffi::export]
pub fn open_lab_instance(path: String, peer: Arc<VetLabCore>) -> Result<Arc<VetLabCore>, VetLabError> {
    let db = Database::open(&path)?;
    let (bus, config) = {
        let store = peer.store.lock()?;
        (peer.bus.clone(), store.config().clone())
    };
    VetLabCore::new(db, bus, config)
}

/// Create an in-memory lab store (for testing).
#[uniffi::export]
pub fn open_lab_in_memory() -> Result<Arc<VetLabCore>, VetLabError> {
    let db = Database::open_in_memory()?;
    VetLabCore::new(db, SyncBus::new(), LabConfig::from_env())
}

/// Classify a single value against a reference range.
#[uniffi::export]
pub fn classify_value(value: String, reference_range: String) -> FfiStatus {
    classify(&value, &reference_range).into()
}

// =========================================================================
// Main API Object
// =========================================================================

/// Thread-safe store and report-builder wrapper for FFI.
#[derive(uniffi::Object)]
pub struct VetLabCore {
    store: Arc<Mutex<ReportStore>>,
    builder: Arc<Mutex<PanelBuilder>>,
    bus: SyncBus,
}

impl VetLabCore {
    fn new(db: Database, bus: SyncBus, config: LabConfig) -> Result<Arc<Self>, VetLabError> {
        let store = ReportStore::open(db, bus.clone(), config)?;
        let builder = store.load_draft()?.unwrap_or_default();
        Ok(Arc::new(Self {
            store: Arc::new(Mutex::new(store)),
            builder: Arc::new(Mutex::new(builder)),
            bus,
        }))
    }

    /// Persist the builder after an edit.
    fn save_builder(&self, builder: &PanelBuilder) -> Result<(), VetLabError> {
        let store = self.store.lock()?;
        store.save_draft(builder)?;
        Ok(())
    }
}

#[uniffi::export]
impl VetLabCore {
    /// Lab name for report headers.
    pub fn lab_name(&self) -> Result<String, VetLabError> {
        let store = self.store.lock()?;
        Ok(store.config().lab_name.clone())
    }

    // =========================================================================
    // Patient Operations
    // =========================================================================

    /// Register a new patient.
    pub fn register_patient(&self, patient: FfiNewPatient) -> Result<FfiPatient, VetLabError> {
        let mut store = self.store.lock()?;
        let form = NewPatient::try_from(patient)?;
        Ok(store.register_patient(form)?.into())
    }

    /// Persist the half-filled registration form.
    pub fn save_patient_form(&self, form: FfiNewPatient) -> Result<(), VetLabError> {
        let store = self.store.lock()?;
        store.save_patient_form(&NewPatient::try_from(form)?)?;
        Ok(())
    }

    /// The registration form saved by an earlier session, if any.
    pub fn load_patient_form(&self) -> Result<Option<FfiNewPatient>, VetLabError> {
        let store = self.store.lock()?;
        Ok(store.load_patient_form()?.map(Into::into))
    }

    /// List all patients in registration order.
    pub fn list_patients(&self) -> Result<Vec<FfiPatient>, VetLabError> {
        let store = self.store.lock()?;
        Ok(store.patients().iter().cloned().map(Into::into).collect())
    }

    // =========================================================================
    // Report Builder Operations
    // =========================================================================

    /// Names of the available panel templates.
    pub fn template_names(&self) -> Result<Vec<String>, VetLabError> {
        let store = self.store.lock()?;
        Ok(store.catalog().template_names().map(String::from).collect())
    }

    /// Select the patient the next report is for.
    pub fn select_patient(&self, patient_id: String) -> Result<(), VetLabError> {
        let mut builder = self.builder.lock()?;
        builder.select_patient(patient_id);
        self.save_builder(&builder)
    }

    /// Add a panel from a template; returns the number of panels.
    pub fn add_panel(&self, template_name: String) -> Result<u32, VetLabError> {
        let mut builder = self.builder.lock()?;
        {
            let store = self.store.lock()?;
            builder.add_panel(store.catalog(), &template_name)?;
        }
        self.save_builder(&builder)?;
        Ok(builder.panels.len() as u32)
    }

    /// Remove the panel at `index`.
    pub fn remove_panel(&self, index: u32) -> Result<(), VetLabError> {
        let mut builder = self.builder.lock()?;
        builder.remove_panel(index as usize)?;
        self.save_builder(&builder)
    }

    /// Drop every panel from the builder.
    pub fn clear_panels(&self) -> Result<(), VetLabError> {
        let mut builder = self.builder.lock()?;
        builder.clear_panels();
        self.save_builder(&builder)
    }

    /// Enter a value; returns the recomputed parameter.
    pub fn set_value(
        &self,
        panel: u32,
        parameter: u32,
        value: String,
    ) -> Result<FfiParameter, VetLabError> {
        let mut builder = self.builder.lock()?;
        let result = builder
            .set_value(panel as usize, parameter as usize, value)?
            .clone();
        self.save_builder(&builder)?;
        Ok(result.into())
    }

    /// Current builder panels.
    pub fn builder_panels(&self) -> Result<Vec<FfiPanel>, VetLabError> {
        let builder = self.builder.lock()?;
        Ok(builder.panels.iter().cloned().map(Into::into).collect())
    }

    /// Assemble the builder into a report and store it.
    pub fn submit_report(&self) -> Result<FfiReport, VetLabError> {
        let mut builder = self.builder.lock()?;
        let mut store = self.store.lock()?;
        Ok(store.submit(&mut builder)?.into())
    }

    // =========================================================================
    // Report Operations
    // =========================================================================

    /// Reports matching the query and optional inclusive date bounds (`YYYY-MM-DD`).
    pub fn search_reports(
        &self,
        query: String,
        from: Option<String>,
        to: Option<String>,
    ) -> Result<Vec<FfiReport>, VetLabError> {
        let filter = ReportFilter::query(query).between(parse_date(from)?, parse_date(to)?);
        let store = self.store.lock()?;
        Ok(store
            .filter_reports(&filter)
            .into_iter()
            .cloned()
            .map(Into::into)
            .collect())
    }

    /// Get a report by ID.
    pub fn get_report(&self, report_id: String) -> Result<Option<FfiReport>, VetLabError> {
        let store = self.store.lock()?;
        Ok(store.find_report(&report_id).cloned().map(Into::into))
    }

    /// Attach a narrative summary to a report.
    pub fn set_summary(&self, report_id: String, summary: String) -> Result<(), VetLabError> {
        let mut store = self.store.lock()?;
        store.set_summary(&report_id, summary)?;
        Ok(())
    }

    // =========================================================================
    // Sync & Export Operations
    // =========================================================================

    /// Reload if another instance wrote since the last call.
    pub fn sync(&self) -> Result<bool, VetLabError> {
        let mut store = self.store.lock()?;
        Ok(store.sync()?)
    }

    /// Export one report as pretty JSON.
    pub fn export_report_json(&self, report_id: String) -> Result<String, VetLabError> {
        let store = self.store.lock()?;
        let report = store
            .find_report(&report_id)
            .ok_or_else(|| VetLabError::NotFound(report_id.clone()))?;
        Ok(export::report_to_json(report)?)
    }

    /// Suggested file name for `export_report_json`.
    pub fn report_file_name(&self, report_id: String) -> Result<String, VetLabError> {
        let store = self.store.lock()?;
        let report = store
            .find_report(&report_id)
            .ok_or(VetLabError::NotFound(report_id.clone()))?;
        Ok(export::report_file_name(report))
    }

    /// Suggested file name for a backup taken today (UTC).
    pub fn backup_file_name(&self) -> String {
        let today = chrono::Utc::now().date_naive();
        export::backup_file_name(&today.format("%Y-%m-%d").to_string())
    }

    /// Export the full store as pretty JSON.
    pub fn export_backup_json(&self) -> Result<String, VetLabError> {
        let store = self.store.lock()?;
        Ok(store.export_backup().to_json()?)
    }

    /// Replace the store with a backup. Returns the imported report count.
    pub fn import_backup_json(&self, json: String) -> Result<u32, VetLabError> {
        let mut store = self.store.lock()?;
        Ok(store.import_backup(&json)?.reports as u32)
    }
}

fn parse_date(date: Option<String>) -> Result<Option<chrono::NaiveDate>, VetLabError> {
    date.filter(|d| !d.trim().is_empty())
        .map(|d| {
            chrono::NaiveDate::parse_from_str(d.trim(), "%Y-%m-%d")
                .map_err(|e| VetLabError::InvalidInput(format!("date {:?}: {}", d, e)))
        })
        .transpose()
}

// =========================================================================
// FFI Types
// =========================================================================

/// FFI-safe status category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum FfiStatus {
    Normal,
    High,
    Low,
    Abnormal,
    Pending,
}

impl From<StatusCategory> for FfiStatus {
    fn from(status: StatusCategory) -> Self {
        match status {
            StatusCategory::Normal => FfiStatus::Normal,
            StatusCategory::High => FfiStatus::High,
            StatusCategory::Low => FfiStatus::Low,
            StatusCategory::Abnormal => FfiStatus::Abnormal,
            StatusCategory::Pending => FfiStatus::Pending,
        }
    }
}

/// FFI-safe registration form.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiNewPatient {
    pub name: String,
    pub species: String,
    pub breed: String,
    pub age: u32,
    pub owner: String,
}

impl TryFrom<FfiNewPatient> for NewPatient {
    type Error = VetLabError;

    fn try_from(form: FfiNewPatient) -> Result<Self, Self::Error> {
        let species = Species::parse(&form.species)
            .ok_or_else(|| VetLabError::InvalidInput(format!("unknown species {:?}", form.species)))?;
        Ok(NewPatient {
            name: form.name,
            species,
            breed: form.breed,
            age: form.age,
            owner: form.owner,
        })
    }
}

impl From<NewPatient> for FfiNewPatient {
    fn from(form: NewPatient) -> Self {
        Self {
            name: form.name,
            species: form.species.to_string(),
            breed: form.breed,
            age: form.age,
            owner: form.owner,
        }
    }
}

/// FFI-safe patient.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPatient {
    pub id: String,
    pub name: String,
    pub species: String,
    pub breed: String,
    pub age: u32,
    pub owner: String,
}

impl From<Patient> for FfiPatient {
    fn from(patient: Patient) -> Self {
        Self {
            id: patient.id,
            name: patient.name,
            species: patient.species.to_string(),
            breed: patient.breed,
            age: patient.age,
            owner: patient.owner,
        }
    }
}

/// FFI-safe parameter result.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiParameter {
    pub name: String,
    pub value: String,
    pub unit: String,
    pub reference_range: String,
    pub status: FfiStatus,
}

impl From<ParameterResult> for FfiParameter {
    fn from(p: ParameterResult) -> Self {
        Self {
            name: p.name,
            value: p.value,
            unit: p.unit,
            reference_range: p.reference_range,
            status: p.status.into(),
        }
    }
}

/// FFI-safe working panel.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPanel {
    pub template_name: String,
    pub parameters: Vec<FfiParameter>,
}

impl From<Panel> for FfiPanel {
    fn from(panel: Panel) -> Self {
        Self {
            template_name: panel.template_name,
            parameters: panel.parameters.into_iter().map(Into::into).collect(),
        }
    }
}

/// FFI-safe diagnostic report.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiReport {
    pub id: String,
    pub patient_id: String,
    pub date: String,
    pub test_type: String,
    pub parameters: Vec<FfiParameter>,
    pub summary: String,
    pub clinician: String,
    pub has_abnormal: bool,
}

impl From<DiagnosticReport> for FfiReport {
    fn from(report: DiagnosticReport) -> Self {
        let has_abnormal = report.has_abnormal();
        Self {
            id: report.id,
            patient_id: report.patient_id,
            date: report.date,
            test_type: report.test_type,
            parameters: report.parameters.into_iter().map(Into::into).collect(),
            summary: report.summary,
            clinician: report.clinician,
            has_abnormal,
        }
    }
}
