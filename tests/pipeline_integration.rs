//! End-to-end runs over HTTP against a live server.

mod common;

use std::sync::Arc;

use common::harness::{TestServerConfig, spawn_test_server};
use common::http_client::TestClient;
use common::{FIXTURE_CONTROLS, POLICY};
use gapcheck::{ComplianceStatus, JobStatus, ModelTier, Priority, ScoreLabel, ScriptedCompletion};
use reqwest::StatusCode;

#[tokio::test]
async fn test_health_reports_mock_mode() {
    let server = spawn_test_server(TestServerConfig::default())
        .await
        .expect("server should start");
    let client = TestClient::new(server.base_url());

    let (status, body) = client.get_json("/healthz").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["evaluator"], "mock");
    assert_eq!(body["frameworks"], 2);

    let (status, body) = client.get_json("/api/frameworks").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["evaluator_available"], false);
    assert_eq!(body["frameworks"].as_array().map(Vec::len), Some(2));

    server.stop().await;
}

#[tokio::test]
async fn test_mock_run_covers_every_framework() {
    let server = spawn_test_server(TestServerConfig::default())
        .await
        .expect("server should start");
    let client = TestClient::new(server.base_url());

    let upload = client.upload("policy.md", POLICY).await;
    assert_eq!(upload.status, JobStatus::Uploaded);

    let started = client.start(&upload.job_id, &[]).await;
    assert_eq!(started.status, JobStatus::Processing);
    assert_eq!(started.frameworks, vec!["nca_en", "nist_en"]);

    let view = client.wait_for(&upload.job_id, JobStatus::Completed).await;
    let progress = view.progress.expect("progress should be kept");
    assert_eq!(progress.framework, "nist_en");
    assert_eq!(progress.percentage, 100.0);

    let results = client.results(&upload.job_id).await;
    assert_eq!(results.document_info.filename, "policy.md");
    assert_eq!(results.document_info.total_chars, POLICY.chars().count());
    assert_eq!(results.frameworks.len(), 2);
    assert!(
        results
            .frameworks
            .iter()
            .flat_map(|f| &f.controls)
            .all(|c| c.mock && c.compliance_status == ComplianceStatus::NotEvaluated)
    );

    let nca = results.framework("nca_en").expect("nca_en result");
    assert_eq!(nca.total_controls, 3);
    assert_eq!(nca.statistics.risk_breakdown.get("unknown"), Some(&3));
    let domains: Vec<&str> = nca.structure.groups.iter().map(|g| g.id.as_str()).collect();
    assert_eq!(domains, vec!["2", "1"]);

    let summary = client.summary(&upload.job_id).await.summary;
    assert_eq!(summary.total_controls_evaluated, FIXTURE_CONTROLS);
    assert_eq!(summary.overall_score, 0.0);
    assert_eq!(summary.overall_status, ScoreLabel::Critical);
    assert_eq!(summary.score_distribution.critical, FIXTURE_CONTROLS);
    assert_eq!(summary.critical_gaps.len(), FIXTURE_CONTROLS);
    assert!(summary.top_recommendations.is_empty());

    server.stop().await;
}

#[tokio::test]
async fn test_staged_run_scores_and_summarizes() {
    let llm = Arc::new(
        ScriptedCompletion::new()
            .reply(
                ModelTier::Fast,
                r#"{"is_relevant": false, "relevance_score": 0.1}"#,
            )
            .always(
                ModelTier::Fast,
                r#"{"is_relevant": true, "relevance_score": 0.9}"#,
            )
            .always(
                ModelTier::Balanced,
                r#"{"addresses_control": true, "coverage_level": "partial", "preliminary_score": 60}"#,
            )
            .reply(
                ModelTier::Precise,
                r#"Here you go: {"final_score": 80, "confidence": 0.8, "risk_level": "low",
                   "recommendations": [{"priority": "high", "recommendation": "Name an inventory owner"}]}"#,
            )
            .always(ModelTier::Precise, "scoring unavailable"),
    );
    let server = spawn_test_server(TestServerConfig {
        completion: Some(Arc::clone(&llm)),
        ..Default::default()
    })
    .await
    .expect("server should start");
    let client = TestClient::new(server.base_url());

    let (_, health) = client.get_json("/healthz").await;
    assert_eq!(health["evaluator"], "llm");

    let upload = client.upload("policy.txt", POLICY).await;
    client.start(&upload.job_id, &["nca_en"]).await;
    client.wait_for(&upload.job_id, JobStatus::Completed).await;

    let results = client.results(&upload.job_id).await;
    let nca = results.framework("nca_en").expect("nca_en result");
    let scores: Vec<(f64, ComplianceStatus)> = nca
        .controls
        .iter()
        .map(|c| (c.final_score, c.compliance_status))
        .collect();
    assert_eq!(
        scores,
        vec![
            (0.0, ComplianceStatus::NonCompliant),
            (80.0, ComplianceStatus::MostlyCompliant),
            (60.0, ComplianceStatus::PartiallyCompliant),
        ]
    );
    assert!(nca.controls[0].skipped_deeper_analysis);
    assert_eq!(nca.statistics.average_score, 46.7);
    assert_eq!(nca.statistics.overall_compliance, ScoreLabel::Poor);
    assert_eq!(nca.statistics.needs_attention, 1);

    // The gate short-circuit skips the two later stages.
    assert_eq!(llm.calls(ModelTier::Fast), 3);
    assert_eq!(llm.calls(ModelTier::Balanced), 2);
    assert_eq!(llm.calls(ModelTier::Precise), 2);

    let summary = client.summary(&upload.job_id).await.summary;
    assert_eq!(summary.frameworks_analyzed, vec!["nca_en"]);
    assert_eq!(summary.critical_gaps.len(), 1);
    assert_eq!(summary.critical_gaps[0].control_id, "2-2-1");
    let priorities: Vec<Priority> = summary
        .top_recommendations
        .iter()
        .map(|r| r.recommendation.priority)
        .collect();
    assert_eq!(priorities, vec![Priority::Critical, Priority::High]);
    assert_eq!(summary.score_distribution.good, 1);
    assert_eq!(summary.score_distribution.fair, 1);

    let (status, control) = client
        .get_json(&format!(
            "/api/results/{}/control/nca_en/2-1-1",
            upload.job_id
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(control["risk_level"], "low");

    server.stop().await;
}

#[tokio::test]
async fn test_unknown_framework_rejected_before_processing() {
    let server = spawn_test_server(TestServerConfig::default())
        .await
        .expect("server should start");
    let client = TestClient::new(server.base_url());

    let upload = client.upload("policy.txt", POLICY).await;
    let (status, body) = client.evaluate(&upload.job_id, &["iso_27001"]).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().is_some_and(|e| e.contains("iso_27001")));

    let view = client.job(&upload.job_id).await;
    assert_eq!(view.status, JobStatus::Uploaded);

    let (status, _) = client
        .get_json(&format!("/api/results/{}", upload.job_id))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    server.stop().await;
}
