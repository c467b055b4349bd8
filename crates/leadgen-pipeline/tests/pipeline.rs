//! End-to-end campaign run against a wiremock agent service.

use leadgen_agent::{AgentClient, Operation};
use leadgen_core::StrategySnapshot;
use leadgen_pipeline::{
    flatten, to_csv, Action, CampaignState, FileSessionStore, Sequencer, SequencerOptions,
    SessionKey, SessionStoreExt, Stage,
};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn campaign() -> leadgen_core::CampaignInput {
    leadgen_core::CampaignInput {
        company_name: "Sentinel".to_string(),
        website: "https://sentinel.example".to_string(),
        industry: "Cybersecurity".to_string(),
        ..Default::default()
    }
}

async fn mount_happy_path(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/api/analyze"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "company_name": "Sentinel",
            "company_summary": "Sentinel runs a managed SOC.",
            "usp": "24/7 detection",
            "icp_profile": ["CISOs"],
            "target_industries": ["Fintech"],
            "target_companies": [],
            "confidence_score": 0.7
        })))
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/keywords"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "grouped_keywords": [
                { "category_name": "Security", "keywords": ["cloud security", "SIEM", "SOC 2"] }
            ]
        })))
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/strategy"))
        .and(body_partial_json(serde_json::json!({
            "selected_keywords": ["cloud security", "SIEM"]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "channels": [
                { "name": "LinkedIn", "relevance_score": 95 },
                { "name": "Reddit", "relevance_score": 70 }
            ],
            "strategy_summary": "LinkedIn first, Reddit for reach."
        })))
        .mount(server)
        .await;
}

fn leads_body() -> serde_json::Value {
    serde_json::json!({
        "companies": [
            {
                "company_name": "Beta Corp",
                "email_addresses": ["a@x.com", "b@x.com"],
                "channel_source": "LinkedIn",
                "confidence_score": 0.9,
                "key_contacts": [
                    { "full_name": "Dana Reyes", "designation": "CISO", "role_category": "Decision Maker" },
                    { "full_name": "Lee Park", "designation": "SOC Lead", "role_category": "Technical Lead" }
                ]
            },
            {
                "company_name": "Gamma LLC",
                "channel_source": "Reddit",
                "confidence_score": 0.5
            }
        ],
        "total_leads": 2,
        "leads_by_channel": { "LinkedIn": 1, "Reddit": 1 },
        "generation_summary": "2 companies found."
    })
}

#[tokio::test]
async fn full_campaign_exports_leads() {
    let server = MockServer::start().await;
    mount_happy_path(&server).await;

    Mock::given(method("POST"))
        .and(path("/api/generate-leads"))
        .and(body_partial_json(serde_json::json!({
            "selected_channels": ["LinkedIn", "Reddit"],
            "selected_keywords": ["cloud security", "SIEM"],
            "max_leads_per_channel": 10
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(leads_body()))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let client = AgentClient::new(&format!("{}/api", server.uri()), 30, "leadgen-test").unwrap();
    let mut seq = Sequencer::new(
        FileSessionStore::new(dir.path()),
        client,
        SequencerOptions::default(),
    );

    seq.dispatch(Action::Submit(campaign())).await.unwrap();
    assert_eq!(seq.stage(), Stage::AnalysisReview);

    seq.dispatch(Action::Advance).await.unwrap();
    assert_eq!(seq.stage(), Stage::KeywordReview);

    seq.dispatch(Action::ToggleKeyword("SOC 2".to_string()))
        .await
        .unwrap();
    seq.dispatch(Action::BuildStrategy).await.unwrap();
    assert_eq!(seq.stage(), Stage::StrategyReview);

    seq.dispatch(Action::Advance).await.unwrap();
    let CampaignState::LeadReview { batch, .. } = seq.state() else {
        panic!("expected LeadReview, got {:?}", seq.stage());
    };

    let rows = flatten(&batch.companies);
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[2].get("Contact Name"), Some(""));

    let csv = to_csv(&rows);
    assert!(csv.contains("\"a@x.com; b@x.com\""));
    assert!(csv.contains("\"enriched\""));

    let snapshot: StrategySnapshot = seq.store().get_json(SessionKey::Strategy).unwrap();
    assert_eq!(snapshot.keywords, vec!["cloud security", "SIEM"]);
    assert_eq!(snapshot.company_summary, "Sentinel runs a managed SOC.");
}

#[tokio::test]
async fn lead_generation_failure_is_recorded_and_retried() {
    let server = MockServer::start().await;
    mount_happy_path(&server).await;

    Mock::given(method("POST"))
        .and(path("/api/generate-leads"))
        .respond_with(
            ResponseTemplate::new(500)
                .set_body_json(serde_json::json!({ "detail": "Lead generation failed" })),
        )
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/generate-leads"))
        .respond_with(ResponseTemplate::new(200).set_body_json(leads_body()))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let client = AgentClient::new(&format!("{}/api", server.uri()), 30, "leadgen-test").unwrap();
    let mut seq = Sequencer::new(
        FileSessionStore::new(dir.path()),
        client,
        SequencerOptions::default(),
    );

    seq.dispatch(Action::Submit(campaign())).await.unwrap();
    seq.dispatch(Action::Advance).await.unwrap();
    seq.dispatch(Action::RemoveKeyword("SOC 2".to_string()))
        .await
        .unwrap();
    seq.dispatch(Action::BuildStrategy).await.unwrap();
    seq.dispatch(Action::Advance).await.unwrap();

    let failure = seq.state().failure().cloned().expect("failure recorded");
    assert_eq!(seq.stage(), Stage::LeadGenerating);
    assert_eq!(failure.operation, Operation::GenerateLeads);
    assert!(failure.message.contains("Lead generation failed"));
    assert!(seq.store().contains(SessionKey::Strategy));

    seq.dispatch(Action::Retry).await.unwrap();
    assert_eq!(seq.stage(), Stage::LeadReview);
}

#[tokio::test]
async fn reopened_session_resumes_at_lead_generation() {
    let server = MockServer::start().await;
    mount_happy_path(&server).await;
    Mock::given(method("POST"))
        .and(path("/api/generate-leads"))
        .respond_with(ResponseTemplate::new(200).set_body_json(leads_body()))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let base_url = format!("{}/api", server.uri());

    {
        let client = AgentClient::new(&base_url, 30, "leadgen-test").unwrap();
        let mut seq = Sequencer::new(
            FileSessionStore::new(dir.path()),
            client,
            SequencerOptions::default(),
        );
        seq.dispatch(Action::Submit(campaign())).await.unwrap();
        seq.dispatch(Action::Advance).await.unwrap();
        seq.dispatch(Action::RemoveKeyword("SOC 2".to_string()))
            .await
            .unwrap();
        seq.dispatch(Action::BuildStrategy).await.unwrap();
        seq.dispatch(Action::Advance).await.unwrap();
    }

    let client = AgentClient::new(&base_url, 30, "leadgen-test").unwrap();
    let mut resumed = Sequencer::new(
        FileSessionStore::new(dir.path()),
        client,
        SequencerOptions::default(),
    );
    assert_eq!(resumed.enter(Stage::LeadReview).await, Stage::LeadGenerating);

    resumed.dispatch(Action::GenerateLeads).await.unwrap();
    assert_eq!(resumed.stage(), Stage::LeadReview);
}
