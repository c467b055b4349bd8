use super::*;

fn test_client(base_url: &str) -> AgentClient {
    AgentClient::new(base_url, 30, "leadgen-test").expect("client construction should not fail")
}

#[test]
fn endpoint_url_appends_operation_path() {
    let client = test_client("http://localhost:8000/api");
    assert_eq!(
        client.endpoint_url(Operation::Analyze).as_str(),
        "http://localhost:8000/api/analyze"
    );
    assert_eq!(
        client.endpoint_url(Operation::GenerateLeads).as_str(),
        "http://localhost:8000/api/generate-leads"
    );
}

#[test]
fn endpoint_url_strips_trailing_slash() {
    let client = test_client("http://localhost:8000/api///");
    assert_eq!(
        client.endpoint_url(Operation::DiscoverKeywords).as_str(),
        "http://localhost:8000/api/keywords"
    );
}

#[test]
fn endpoint_url_without_path_prefix() {
    let client = test_client("http://localhost:8000");
    assert_eq!(
        client.endpoint_url(Operation::BuildStrategy).as_str(),
        "http://localhost:8000/strategy"
    );
}

#[test]
fn new_rejects_invalid_base_url() {
    let err = AgentClient::new("not a url", 30, "leadgen-test").unwrap_err();
    assert!(matches!(err, AgentError::InvalidBaseUrl { .. }));
}

#[test]
fn error_detail_prefers_json_detail_string() {
    assert_eq!(
        error_detail(r#"{"detail": "OpenAI quota exceeded"}"#),
        "OpenAI quota exceeded"
    );
}

#[test]
fn error_detail_renders_structured_detail() {
    let detail = error_detail(r#"{"detail": [{"loc": ["body", "website"]}]}"#);
    assert!(detail.contains("website"), "got: {detail}");
}

#[test]
fn error_detail_truncates_raw_body() {
    let body = "x".repeat(500);
    assert_eq!(error_detail(&body).len(), MAX_ERROR_DETAIL_CHARS);
}

#[test]
fn error_detail_handles_empty_body() {
    assert_eq!(error_detail("  "), "empty response body");
}

#[test]
fn operation_names_are_stable() {
    assert_eq!(Operation::Analyze.to_string(), "analyze");
    assert_eq!(Operation::DiscoverKeywords.to_string(), "discover_keywords");
    assert_eq!(Operation::BuildStrategy.to_string(), "build_strategy");
    assert_eq!(Operation::GenerateLeads.to_string(), "generate_leads");
}
