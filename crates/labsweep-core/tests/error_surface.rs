use labsweep_core::errors::{ErrorInfo, SweepError};

fn sample_info(code: &str, message: &str) -> ErrorInfo {
    ErrorInfo::new(code, message)
        .with_context("column", "I")
        .with_context("reason", "example")
}

#[test]
fn config_error_surface() {
    let err = SweepError::Config(sample_info("station-missing", "no station"));
    assert_eq!(err.code(), "station-missing");
    assert!(err.info().context.contains_key("column"));
}

#[test]
fn contract_error_surface() {
    let err = SweepError::contract("contract-arity", "short row");
    assert_eq!(err.info().code, "contract-arity");
    assert!(err.info().context.is_empty());
}

#[test]
fn backend_error_display_includes_context_and_hint() {
    let err = SweepError::Backend(
        sample_info("spyview-open", "failed to open data file").with_hint("check permissions"),
    );
    let text = err.to_string();
    assert!(text.starts_with("backend error: failed to open data file (code: spyview-open)"));
    assert!(text.contains("column=I"));
    assert!(text.ends_with("| hint: check permissions"));
}

#[test]
fn errors_round_trip_json() {
    let err = SweepError::Callable(sample_info("instrument-timeout", "lock-in did not answer"));
    let json = serde_json::to_string(&err).expect("serialize");
    assert!(json.contains("\"family\":\"Callable\""));
    let decoded: SweepError = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(decoded, err);
}

#[test]
fn context_can_be_added_without_changing_family() {
    let err = SweepError::backend("close-failed", "disk full").with_context("failed_children", "0,2");
    assert!(matches!(err, SweepError::Backend(_)));
    assert_eq!(
        err.info().context.get("failed_children").map(String::as_str),
        Some("0,2")
    );
}
