//! Integration tests for `AgentClient` using wiremock HTTP mocks.

use leadgen_agent::{AgentClient, AgentError, Operation};
use leadgen_core::{AnalysisResult, CampaignInput, EnrichmentStatus, LeadRequest, StrategyRequest};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(base_url: &str) -> AgentClient {
    AgentClient::new(&format!("{base_url}/api"), 30, "leadgen-test")
        .expect("client construction should not fail")
}

fn acme_input() -> CampaignInput {
    CampaignInput {
        company_name: "Acme".to_string(),
        website: "https://acme.io".to_string(),
        industry: "SaaS".to_string(),
        ..CampaignInput::default()
    }
}

#[tokio::test]
async fn analyze_posts_company_profile_and_parses_analysis() {
    let server = MockServer::start().await;

    let body = serde_json::json!({
        "company_name": "Acme",
        "company_summary": "Acme builds developer tooling.",
        "usp": "Fastest CI on the market",
        "icp_profile": ["Platform teams"],
        "target_industries": ["Fintech", "Healthcare"],
        "target_companies": ["Stripe"],
        "pain_points": ["Slow builds"],
        "sources": ["https://acme.io/about"],
        "confidence_score": 0.82,
        "main_address": null,
        "linkedin_url": "https://linkedin.com/company/acme",
        "twitter_url": null
    });

    Mock::given(method("POST"))
        .and(path("/api/analyze"))
        .and(body_partial_json(serde_json::json!({
            "company_name": "Acme",
            "website": "https://acme.io",
            "industry": "SaaS"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let analysis = client
        .analyze(&acme_input())
        .await
        .expect("should parse analysis");

    assert_eq!(analysis.company_summary, "Acme builds developer tooling.");
    assert_eq!(analysis.target_industries, vec!["Fintech", "Healthcare"]);
    assert!((analysis.confidence_score - 0.82).abs() < f64::EPSILON);
    assert!(analysis.main_address.is_none());
    assert!(analysis.phone_numbers.is_empty());
    assert_eq!(
        analysis.social_urls(),
        vec!["https://linkedin.com/company/acme"]
    );
}

#[tokio::test]
async fn discover_keywords_unwraps_grouped_keywords() {
    let server = MockServer::start().await;

    let body = serde_json::json!({
        "grouped_keywords": [
            { "category_name": "Product", "keywords": ["ci", "build cache", "runners", "caching"] },
            { "category_name": "Industry", "keywords": ["fintech"] }
        ]
    });

    Mock::given(method("POST"))
        .and(path("/api/keywords"))
        .and(body_partial_json(serde_json::json!({
            "company_summary": "Acme builds developer tooling."
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let analysis = AnalysisResult {
        company_summary: "Acme builds developer tooling.".to_string(),
        ..AnalysisResult::default()
    };

    let client = test_client(&server.uri());
    let categories = client
        .discover_keywords(&analysis)
        .await
        .expect("should parse keyword proposal");

    assert_eq!(categories.len(), 2);
    assert_eq!(categories[0].category_name, "Product");
    assert_eq!(categories[0].keywords.len(), 4);
    assert_eq!(categories[1].keywords, vec!["fintech"]);
}

#[tokio::test]
async fn build_strategy_sends_selection_and_clamps_scores() {
    let server = MockServer::start().await;

    let body = serde_json::json!({
        "channels": [
            { "name": "LinkedIn", "relevance_score": 95 },
            { "name": "Reddit", "relevance_score": 140 }
        ],
        "strategy_summary": "Lead with LinkedIn."
    });

    Mock::given(method("POST"))
        .and(path("/api/strategy"))
        .and(body_partial_json(serde_json::json!({
            "selected_keywords": ["ci", "build cache"],
            "target_industries": ["Fintech"]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let request = StrategyRequest {
        selected_keywords: vec!["ci".to_string(), "build cache".to_string()],
        company_summary: "Acme builds developer tooling.".to_string(),
        target_industries: vec!["Fintech".to_string()],
    };

    let client = test_client(&server.uri());
    let strategy = client
        .build_strategy(&request)
        .await
        .expect("should parse strategy");

    assert_eq!(strategy.channel_names(), vec!["LinkedIn", "Reddit"]);
    assert_eq!(strategy.channels[1].relevance_score, 100);
    assert_eq!(strategy.strategy_summary, "Lead with LinkedIn.");
}

#[tokio::test]
async fn generate_leads_normalizes_enrichment_status() {
    let server = MockServer::start().await;

    let body = serde_json::json!({
        "companies": [
            {
                "company_name": "Beta Corp",
                "website": "https://beta.example",
                "email_addresses": ["sales@beta.example"],
                "phone_numbers": [{ "number": "+1 555 0100", "has_whatsapp": true }],
                "channel_source": "LinkedIn",
                "keywords_matched": ["ci"],
                "confidence_score": 0.9,
                "enrichment_status": "pending"
            },
            {
                "company_name": "Gamma LLC",
                "channel_source": "Reddit",
                "confidence_score": 0.4,
                "enrichment_status": "enriched"
            }
        ],
        "total_leads": 2,
        "leads_by_channel": { "LinkedIn": 1, "Reddit": 1 },
        "generation_summary": "Found 2 companies."
    });

    Mock::given(method("POST"))
        .and(path("/api/generate-leads"))
        .and(body_partial_json(serde_json::json!({
            "selected_channels": ["LinkedIn", "Reddit"],
            "max_leads_per_channel": 10
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let request = LeadRequest {
        selected_channels: vec!["LinkedIn".to_string(), "Reddit".to_string()],
        selected_keywords: vec!["ci".to_string()],
        target_industries: vec!["Fintech".to_string()],
        company_summary: "Acme builds developer tooling.".to_string(),
        max_leads_per_channel: 10,
    };

    let client = test_client(&server.uri());
    let batch = client
        .generate_leads(&request)
        .await
        .expect("should parse lead batch");

    assert_eq!(batch.total_leads, 2);
    assert_eq!(batch.companies[0].enrichment_status, EnrichmentStatus::Enriched);
    assert!(batch.companies[0].phone_numbers[0].has_whatsapp);
    assert_eq!(batch.companies[1].enrichment_status, EnrichmentStatus::Pending);
    assert_eq!(batch.leads_by_channel.get("Reddit"), Some(&1));
}

#[tokio::test]
async fn error_status_surfaces_detail_message() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/analyze"))
        .respond_with(
            ResponseTemplate::new(500)
                .set_body_json(serde_json::json!({ "detail": "Analysis failed: upstream timeout" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client
        .analyze(&acme_input())
        .await
        .expect_err("500 should be an error");

    match err {
        AgentError::Status {
            operation,
            status,
            detail,
        } => {
            assert_eq!(operation, Operation::Analyze);
            assert_eq!(status, 500);
            assert_eq!(detail, "Analysis failed: upstream timeout");
        }
        other => panic!("expected Status error, got {other:?}"),
    }
}

#[tokio::test]
async fn malformed_body_is_deserialize_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/strategy"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client
        .build_strategy(&StrategyRequest::default())
        .await
        .expect_err("garbage body should fail to decode");

    assert!(
        matches!(
            err,
            AgentError::Deserialize {
                operation: Operation::BuildStrategy,
                ..
            }
        ),
        "got: {err:?}"
    );
}

#[tokio::test]
async fn failed_call_is_not_retried() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/generate-leads"))
        .respond_with(ResponseTemplate::new(503).set_body_string("Service Unavailable"))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client
        .generate_leads(&LeadRequest::default())
        .await
        .expect_err("503 should be an error");

    assert!(err.to_string().contains("Service Unavailable"), "got: {err}");
}
