use enrollflow::shared::ids::StepId;
use enrollflow::workflow::error::EngineError;
use enrollflow::workflow::sequencer::{
    apply_enabled, can_go_to, mark_entered, recompute_accessibility, transition_status, StepRecord,
    StepStatus,
};

fn steps(count: u32) -> Vec<StepRecord> {
    (0..count)
        .map(|order| {
            StepRecord::fresh(
                StepId::parse(&format!("step-{order}")).expect("step id"),
                order,
            )
        })
        .collect()
}

#[test]
fn accessibility_tracks_predecessor_settlement_exactly() {
    for settled in [StepStatus::Completed, StepStatus::Skipped] {
        let mut records = steps(3);
        records[0].status = settled;
        recompute_accessibility(&mut records);
        assert!(records[0].is_accessible, "step 0 is always accessible");
        assert!(records[1].is_accessible);
        assert!(!records[2].is_accessible);
    }
    for unsettled in [StepStatus::NotStarted, StepStatus::InProgress] {
        let mut records = steps(3);
        records[0].status = unsettled;
        recompute_accessibility(&mut records);
        assert!(records[0].is_accessible);
        assert!(!records[1].is_accessible);
    }
}

#[test]
fn status_machine_allows_reopening_completed_steps_only() {
    assert!(StepStatus::NotStarted.can_transition_to(StepStatus::InProgress));
    assert!(StepStatus::InProgress.can_transition_to(StepStatus::Completed));
    assert!(StepStatus::Completed.can_transition_to(StepStatus::InProgress));
    assert!(!StepStatus::Skipped.can_transition_to(StepStatus::InProgress));
    assert!(!StepStatus::NotStarted.can_transition_to(StepStatus::Completed));
    assert!(!StepStatus::Completed.can_transition_to(StepStatus::Skipped));
}

#[test]
fn invalid_transition_reports_both_endpoints() {
    let mut record = steps(1).remove(0);
    record.status = StepStatus::Skipped;
    match transition_status(&mut record, StepStatus::Completed) {
        Err(EngineError::InvalidStatusTransition { from, to }) => {
            assert_eq!(from, StepStatus::Skipped);
            assert_eq!(to, StepStatus::Completed);
        }
        other => panic!("unexpected transition result: {other:?}"),
    }
}

#[test]
fn entering_flips_fresh_and_completed_steps_in_progress() {
    let mut record = steps(1).remove(0);
    mark_entered(&mut record);
    assert_eq!(record.status, StepStatus::InProgress);
    record.status = StepStatus::Completed;
    mark_entered(&mut record);
    assert_eq!(record.status, StepStatus::InProgress);
}

#[test]
fn disabled_steps_cannot_be_navigated_to_even_when_accessible() {
    let mut records = steps(2);
    recompute_accessibility(&mut records);
    let first = records[0].step_id.clone();
    assert!(can_go_to(&records, &first));
    apply_enabled(&mut records, false);
    assert!(!can_go_to(&records, &first));
}

#[test]
fn navigation_guard_rejects_locked_and_unknown_steps() {
    let mut records = steps(2);
    recompute_accessibility(&mut records);
    let locked = records[1].step_id.clone();
    assert!(!can_go_to(&records, &locked));
    let unknown = StepId::parse("elsewhere").expect("step id");
    assert!(!can_go_to(&records, &unknown));
}

#[test]
fn serialized_status_uses_snake_case() {
    let raw = serde_json::to_string(&StepStatus::NotStarted).expect("serialize");
    assert_eq!(raw, "\"not_started\"");
    let parsed: StepStatus = serde_json::from_str("\"in_progress\"").expect("parse");
    assert_eq!(parsed, StepStatus::InProgress);
}
