use rwgt_core::errors::{ErrorInfo, RwgtError};

fn sample_info(code: &str, message: &str) -> ErrorInfo {
    ErrorInfo::new(code, message)
        .with_context("row", 3)
        .with_context("reason", "fixture")
}

#[test]
fn config_error_surface() {
    let err = RwgtError::Config(sample_info("no-parameters", "empty set"));
    assert_eq!(err.code(), "no-parameters");
    assert!(err.info().context.contains_key("row"));
}

#[test]
fn evaluation_error_carries_row_context() {
    let err = RwgtError::Evaluation(sample_info("evaluator-exit", "exit status 2"));
    assert_eq!(err.info().context.get("row").map(String::as_str), Some("3"));
    let rendered = err.to_string();
    assert!(rendered.starts_with("evaluation error: [evaluator-exit] exit status 2"));
    assert!(rendered.contains("row=3"));
}

#[test]
fn hint_is_rendered_last() {
    let err = RwgtError::Matrix(
        ErrorInfo::new("singular-design", "design matrix is singular").with_hint("check scales"),
    );
    assert!(err.to_string().ends_with("; hint: check scales"));
}

#[test]
fn errors_round_trip_through_json() {
    let err = RwgtError::Substitution(sample_info("unresolved-parameters", "missing"));
    let json = serde_json::to_string(&err).expect("encode");
    assert!(json.contains("\"family\":\"Substitution\""));
    let back: RwgtError = serde_json::from_str(&json).expect("decode");
    assert_eq!(back, err);
}

#[test]
fn context_added_later_keeps_existing_entries() {
    let err = RwgtError::Evaluation(sample_info("evaluator-exit", "exit status 2"))
        .with_context("row", 9)
        .with_context("program", "toy");
    let context = &err.info().context;
    assert_eq!(context.get("row").map(String::as_str), Some("3"));
    assert_eq!(context.get("program").map(String::as_str), Some("toy"));
}
