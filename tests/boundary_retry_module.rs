use enrollflow::boundary::retry::{
    classify_status, ApiErrorKind, Idempotency, RetryDecision, RetryPolicy,
};

#[test]
fn status_classification_covers_the_taxonomy() {
    assert_eq!(classify_status(0, None), ApiErrorKind::Transport);
    assert_eq!(classify_status(401, None), ApiErrorKind::Unauthorized);
    assert_eq!(
        classify_status(403, Some("ask an administrator".to_string())),
        ApiErrorKind::Forbidden {
            hint: Some("ask an administrator".to_string())
        }
    );
    assert_eq!(classify_status(404, None), ApiErrorKind::Client { status: 404 });
    assert_eq!(classify_status(503, None), ApiErrorKind::Server { status: 503 });
}

#[test]
fn transport_failure_on_idempotent_call_retries_twice_with_backoff() {
    let policy = RetryPolicy::default();
    let error = ApiErrorKind::Transport;
    assert_eq!(
        policy.decide(&error, Idempotency::Idempotent, 1),
        RetryDecision::Retry { delay_ms: 1000 }
    );
    assert_eq!(
        policy.decide(&error, Idempotency::Idempotent, 2),
        RetryDecision::Retry { delay_ms: 2000 }
    );
    match policy.decide(&error, Idempotency::Idempotent, 3) {
        RetryDecision::Surface { message, hint } => {
            assert!(message.contains("could not reach the server"));
            assert_eq!(hint, None);
        }
        other => panic!("unexpected decision: {other:?}"),
    }
}

#[test]
fn non_idempotent_submissions_are_never_retried() {
    let policy = RetryPolicy::default();
    for error in [ApiErrorKind::Transport, ApiErrorKind::Server { status: 500 }] {
        match policy.decide(&error, Idempotency::NonIdempotent, 1) {
            RetryDecision::Surface { .. } => {}
            other => panic!("unexpected decision for {error:?}: {other:?}"),
        }
    }
}

#[test]
fn not_found_on_an_idempotent_update_is_surfaced_immediately() {
    let policy = RetryPolicy::default();
    let error = classify_status(404, None);
    match policy.decide(&error, Idempotency::Idempotent, 1) {
        RetryDecision::Surface { message, .. } => assert!(message.contains("404")),
        other => panic!("unexpected decision: {other:?}"),
    }
}

#[test]
fn session_expiry_forces_logout_instead_of_retrying() {
    let policy = RetryPolicy::default();
    assert_eq!(
        policy.decide(&ApiErrorKind::Unauthorized, Idempotency::Idempotent, 1),
        RetryDecision::ForceLogout
    );
}

#[test]
fn permission_errors_carry_the_server_hint_through() {
    let policy = RetryPolicy::default();
    let error = ApiErrorKind::Forbidden {
        hint: Some("request elevated access".to_string()),
    };
    match policy.decide(&error, Idempotency::Idempotent, 1) {
        RetryDecision::Surface { hint, .. } => {
            assert_eq!(hint, Some("request elevated access".to_string()));
        }
        other => panic!("unexpected decision: {other:?}"),
    }
}

#[test]
fn server_errors_retry_then_surface_with_status() {
    let policy = RetryPolicy::default();
    let error = ApiErrorKind::Server { status: 502 };
    assert_eq!(
        policy.decide(&error, Idempotency::Idempotent, 2),
        RetryDecision::Retry { delay_ms: 2000 }
    );
    match policy.decide(&error, Idempotency::Idempotent, 3) {
        RetryDecision::Surface { message, .. } => assert!(message.contains("502")),
        other => panic!("unexpected decision: {other:?}"),
    }
}
