use enrollflow::shared::ids::CaseId;
use enrollflow::shared::logging::engine_log_path;
use enrollflow::workflow::persist::WorkflowSnapshotStore;
use enrollflow::workflow::readiness::ReadinessResult;
use enrollflow::workflow::registry::{onboarding_catalog, FIELD_BILLING_MODEL};
use enrollflow::workflow::store::WorkflowStateStore;
use serde_json::json;
use std::fs;
use tempfile::tempdir;

fn sample_instance(case: &str) -> enrollflow::workflow::store::WorkflowInstance {
    let mut store = WorkflowStateStore::start(
        onboarding_catalog(),
        CaseId::parse(case).expect("case id"),
        &ReadinessResult::ready(),
    )
    .expect("store starts");
    let billing = store.steps()[0].step_id.clone();
    store
        .set_step_data(
            &billing,
            [(FIELD_BILLING_MODEL.to_string(), json!("list_bill"))]
                .into_iter()
                .collect(),
        )
        .expect("edit");
    store.snapshot()
}

#[test]
fn save_then_load_round_trips_the_instance() {
    let dir = tempdir().expect("tempdir");
    let snapshot_store = WorkflowSnapshotStore::new(dir.path());
    let instance = sample_instance("case-200");
    snapshot_store.save(&instance).expect("save");

    let loaded = snapshot_store
        .load(&CaseId::parse("case-200").expect("case id"))
        .expect("load")
        .expect("instance exists");
    assert_eq!(loaded, instance);
}

#[test]
fn loading_a_never_saved_case_returns_none() {
    let dir = tempdir().expect("tempdir");
    let snapshot_store = WorkflowSnapshotStore::new(dir.path());
    let missing = snapshot_store
        .load(&CaseId::parse("case-404").expect("case id"))
        .expect("load");
    assert!(missing.is_none());
}

#[test]
fn saving_appends_an_engine_log_line() {
    let dir = tempdir().expect("tempdir");
    let snapshot_store = WorkflowSnapshotStore::new(dir.path());
    snapshot_store
        .save(&sample_instance("case-201"))
        .expect("save");

    let log = fs::read_to_string(engine_log_path(dir.path())).expect("log file");
    assert!(log.contains("case_id=case-201"));
    assert!(log.contains("event=snapshot_saved"));
}

#[test]
fn saving_twice_keeps_the_latest_snapshot() {
    let dir = tempdir().expect("tempdir");
    let snapshot_store = WorkflowSnapshotStore::new(dir.path());
    let case_id = CaseId::parse("case-202").expect("case id");

    let mut first = sample_instance("case-202");
    snapshot_store.save(&first).expect("save first");
    first.enabled = false;
    snapshot_store.save(&first).expect("save second");

    let loaded = snapshot_store
        .load(&case_id)
        .expect("load")
        .expect("instance exists");
    assert!(!loaded.enabled);
}

#[test]
fn corrupt_snapshot_surfaces_a_json_error_with_path_context() {
    let dir = tempdir().expect("tempdir");
    let snapshot_store = WorkflowSnapshotStore::new(dir.path());
    let path = dir.path().join("workflows/cases/case-203.json");
    fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
    fs::write(&path, b"{ not json").expect("write");

    let err = snapshot_store
        .load(&CaseId::parse("case-203").expect("case id"))
        .unwrap_err();
    assert!(err.to_string().contains("case-203.json"));
}
