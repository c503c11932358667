use enrollflow::workflow::readiness::{ReadinessBlocker, ReadinessResult};

#[test]
fn wire_shape_parses_snake_case_payloads() {
    let parsed: ReadinessResult = serde_json::from_str(
        r#"{"is_ready": false, "blockers": [{"message": "group has no billing contact"}]}"#,
    )
    .expect("readiness payload");
    assert!(!parsed.is_ready);
    assert_eq!(
        parsed.blocker_messages(),
        vec!["group has no billing contact".to_string()]
    );
}

#[test]
fn missing_fields_default_to_not_ready() {
    let parsed: ReadinessResult = serde_json::from_str("{}").expect("empty payload");
    assert!(!parsed.is_ready);
    assert!(parsed.blockers.is_empty());
}

#[test]
fn constructors_cover_both_verdicts() {
    assert!(ReadinessResult::ready().is_ready);
    let blocked = ReadinessResult::blocked(["first", "second"]);
    assert!(!blocked.is_ready);
    assert_eq!(
        blocked.blockers,
        vec![
            ReadinessBlocker {
                message: "first".to_string()
            },
            ReadinessBlocker {
                message: "second".to_string()
            },
        ]
    );
}
