//! Report store integration tests: shared storage across instances.

use chrono::NaiveDate;
use tempfile::TempDir;
use vetlab_core::assembler::{Assembler, AssemblyError, PanelBuilder};
use vetlab_core::config::LabConfig;
use vetlab_core::db::Database;
use vetlab_core::models::{DiagnosticReport, NewPatient, Species, StatusCategory};
use vetlab_core::store::{ReportFilter, ReportStore, StoreError, SyncBus};

fn open_instance(dir: &TempDir, bus: &SyncBus) -> ReportStore {
    let db = Database::open(dir.path().join("vetlab.db")).unwrap();
    ReportStore::open(db, bus.clone(), LabConfig::default())
        .unwrap()
        .with_assembler(
            Assembler::default().with_date(NaiveDate::from_ymd_opt(2024, 5, 17).unwrap()),
        )
}

fn bare_report(id: &str) -> DiagnosticReport {
    DiagnosticReport {
        id: id.to_string(),
        patient_id: "P001".to_string(),
        date: "2024-05-01".to_string(),
        test_type: "KFT".to_string(),
        parameters: vec![],
        summary: String::new(),
        clinician: "Dr. Lab Specialist".to_string(),
    }
}

#[test]
fn test_write_reaches_other_instance_after_sync() {
    let dir = TempDir::new().unwrap();
    let bus = SyncBus::new();
    let mut front = open_instance(&dir, &bus);
    let mut back = open_instance(&dir, &bus);
    assert_eq!(back.patients().len(), 2);

    let mut form = NewPatient::new("Rocky", Species::Dog, "Sam Lee");
    form.breed = "Beagle".into();
    let rocky = front.register_patient(form).unwrap();
    assert_eq!(rocky.id, "P003");

    // Not visible until the other instance syncs
    assert_eq!(back.patients().len(), 2);
    assert!(back.sync().unwrap());
    assert_eq!(back.find_patient("P003").map(|p| p.name.as_str()), Some("Rocky"));

    // Nothing further pending
    assert!(!back.sync().unwrap());
}

#[test]
fn test_own_writes_do_not_trigger_reload() {
    let dir = TempDir::new().unwrap();
    let bus = SyncBus::new();
    let mut store = open_instance(&dir, &bus);

    store
        .register_patient(NewPatient::new("Kiwi", Species::Bird, "Ana Ruiz"))
        .unwrap();
    assert!(!store.sync().unwrap());
    assert_eq!(store.patients().len(), 3);
}

#[test]
fn test_submitted_report_syncs_with_classification() {
    let dir = TempDir::new().unwrap();
    let bus = SyncBus::new();
    let mut front = open_instance(&dir, &bus);
    let mut back = open_instance(&dir, &bus);

    let mut builder = PanelBuilder::new();
    builder.select_patient("P002");
    builder.add_panel(front.catalog(), "Thyroid Profile").unwrap();
    builder.set_value(0, 0, "0.2").unwrap();
    let report = front.submit(&mut builder).unwrap();

    assert_eq!(report.id, "REP-1001");
    assert_eq!(report.date, "2024-05-17");
    assert_eq!(report.test_type, "Thyroid Profile");
    assert_eq!(report.parameters[0].name, "Thyroid Profile: TSH");
    assert_eq!(report.parameters[0].status, StatusCategory::Low);
    assert!(builder.is_empty());

    assert!(back.sync().unwrap());
    assert_eq!(back.reports(), front.reports());
    let hits = back.filter_reports(&ReportFilter::query("misty"));
    assert_eq!(hits.len(), 1);
}

#[test]
fn test_report_numbering_continues_from_highest() {
    let dir = TempDir::new().unwrap();
    let bus = SyncBus::new();
    let mut store = open_instance(&dir, &bus);
    store.save_report(bare_report("REP-1001")).unwrap();
    store.save_report(bare_report("REP-1005")).unwrap();

    let mut builder = PanelBuilder::new();
    builder.select_patient("P001");
    builder.add_panel(store.catalog(), "Lipid Profile").unwrap();
    let report = store.submit(&mut builder).unwrap();

    assert_eq!(report.id, "REP-1006");
    assert_eq!(store.reports()[0].id, "REP-1006");
}

#[test]
fn test_empty_submit_allocates_nothing() {
    let dir = TempDir::new().unwrap();
    let bus = SyncBus::new();
    let mut store = open_instance(&dir, &bus);
    let mut other = open_instance(&dir, &bus);

    let mut builder = PanelBuilder::new();
    builder.select_patient("P001");
    let err = store.submit(&mut builder).unwrap_err();
    assert!(matches!(err, StoreError::Assembly(AssemblyError::NoPanels)));
    assert!(store.reports().is_empty());
    assert!(!other.sync().unwrap());

    builder.add_panel(store.catalog(), "Milk Analysis").unwrap();
    let report = store.submit(&mut builder).unwrap();
    assert_eq!(report.id, "REP-1001");
}

#[test]
fn test_last_writer_wins() {
    let dir = TempDir::new().unwrap();
    let bus = SyncBus::new();
    let mut first = open_instance(&dir, &bus);
    let mut stale = open_instance(&dir, &bus);

    first.save_report(bare_report("REP-1001")).unwrap();
    // `stale` writes without syncing and replaces the whole list
    stale.save_report(bare_report("REP-2001")).unwrap();

    assert!(first.sync().unwrap());
    let ids: Vec<_> = first.reports().iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["REP-2001"]);
}

#[test]
fn test_backup_restores_into_fresh_storage() {
    let source_dir = TempDir::new().unwrap();
    let target_dir = TempDir::new().unwrap();
    let mut source = open_instance(&source_dir, &SyncBus::new());
    source.save_report(bare_report("REP-1001")).unwrap();
    source.set_summary("REP-1001", "Mild azotemia.").unwrap();

    let json = source.export_backup().to_json().unwrap();

    let target_bus = SyncBus::new();
    let mut target = open_instance(&target_dir, &target_bus);
    let mut watcher = open_instance(&target_dir, &target_bus);
    let summary = target.import_backup(&json).unwrap();

    assert_eq!(summary.patients, 2);
    assert_eq!(summary.reports, 1);
    assert_eq!(target.reports()[0].summary, "Mild azotemia.");
    assert!(watcher.sync().unwrap());
    assert_eq!(watcher.reports(), source.reports());
}

#[test]
fn test_draft_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let bus = SyncBus::new();
    let store = open_instance(&dir, &bus);

    let mut builder = PanelBuilder::new();
    builder.select_patient("P001");
    builder.add_panel(store.catalog(), "Fecal Analysis").unwrap();
    builder.set_value(0, 1, "Positive").unwrap();
    store.save_draft(&builder).unwrap();
    drop(store);

    let reopened = open_instance(&dir, &bus);
    let draft = reopened.load_draft().unwrap().unwrap();
    assert_eq!(draft, builder);
    assert_eq!(draft.panels[0].parameters[1].status, StatusCategory::Abnormal);
}
