use super::*;
use crate::controls::ControlMeta;
use crate::evaluator::{
    ComplianceStatus, ControlEvaluation, Priority, Recommendation, RiskLevel, StageTrace,
};

fn evaluation(id: &str, score: f64, domain: Option<(&str, &str)>, sub: Option<(&str, &str)>) -> ControlEvaluation {
    ControlEvaluation {
        control_id: id.to_string(),
        control_text: format!("Control {id}"),
        control_meta: ControlMeta {
            control_id: Some(id.to_string()),
            kind: Some("control".to_string()),
            domain_id: domain.map(|d| d.0.to_string()),
            domain_name: domain.map(|d| d.1.to_string()),
            subdomain_id: sub.map(|s| s.0.to_string()),
            subdomain_name: sub.map(|s| s.1.to_string()),
            ..Default::default()
        },
        final_score: score,
        compliance_status: ComplianceStatus::band(score),
        confidence: 0.9,
        score_justification: String::new(),
        key_findings: Vec::new(),
        recommendations: Vec::new(),
        evidence_summary: String::new(),
        risk_level: Some(RiskLevel::Medium),
        skipped_deeper_analysis: false,
        mock: false,
        stages: StageTrace::default(),
    }
}

fn scored(id: &str, score: f64) -> ControlEvaluation {
    evaluation(id, score, Some(("1", "Governance")), Some(("1-1", "Strategy")))
}

fn with_recs(mut eval: ControlEvaluation, priorities: &[(Priority, &str)]) -> ControlEvaluation {
    eval.recommendations = priorities
        .iter()
        .map(|(priority, text)| Recommendation {
            priority: *priority,
            recommendation: text.to_string(),
            expected_impact: None,
        })
        .collect();
    eval
}

#[test]
fn test_statistics_average_and_needs_attention() {
    let controls = vec![
        scored("a", 100.0),
        scored("b", 0.0),
        scored("c", 50.0),
        scored("d", 80.0),
    ];

    let stats = compute_statistics(&controls);

    assert_eq!(stats.total_controls, 4);
    assert_eq!(stats.average_score, 57.5);
    assert_eq!(stats.overall_compliance, ScoreLabel::Fair);
    assert_eq!(stats.needs_attention, 1);
    assert_eq!(stats.fully_compliant_count, 1);
    assert_eq!(stats.non_compliant_count, 1);
    assert_eq!(stats.status_breakdown["partially_compliant"], 1);
    assert_eq!(stats.risk_breakdown["medium"], 4);
    assert!(stats.error.is_none());
}

#[test]
fn test_statistics_empty_is_error_state() {
    let stats = compute_statistics(&[]);
    assert_eq!(stats.average_score, 0.0);
    assert!(!stats.average_score.is_nan());
    assert_eq!(stats.error.as_deref(), Some(NO_CONTROLS_EVALUATED));
}

#[test]
fn test_statistics_counts_missing_risk_as_unknown() {
    let mut placeholder = scored("a", 0.0);
    placeholder.risk_level = None;
    placeholder.compliance_status = ComplianceStatus::NotEvaluated;

    let stats = compute_statistics(&[placeholder]);

    assert_eq!(stats.risk_breakdown[UNKNOWN_RISK], 1);
    assert_eq!(stats.status_breakdown["not_evaluated"], 1);
}

#[test]
fn test_structure_rollups() {
    let controls = vec![
        evaluation("2-1-1", 40.0, Some(("2", "Defense")), Some(("2-1", "Assets"))),
        evaluation("1-1-1", 90.0, Some(("1", "Governance")), Some(("1-1", "Strategy"))),
        evaluation("2-2-1", 61.0, Some(("2", "Defense")), Some(("2-2", "Identity"))),
        evaluation("2-1-2", 60.0, Some(("2", "Defense")), Some(("2-1", "Assets"))),
        evaluation("x", 10.0, None, None),
    ];

    let structure = build_structure("nca_en", &controls);

    assert_eq!(structure.shape, crate::controls::HierarchyShape::DomainSubdomain);
    let ids: Vec<&str> = structure.groups.iter().map(|g| g.id.as_str()).collect();
    assert_eq!(ids, vec!["2", "1", "0"]);

    let defense = &structure.groups[0];
    assert_eq!(defense.control_count, 3);
    assert_eq!(defense.avg_score, 53.7);
    assert_eq!(defense.children[0].avg_score, 50.0);
    assert_eq!(defense.children[0].controls.len(), 2);

    let unknown = &structure.groups[2];
    assert_eq!(unknown.name, "Unknown");
    assert_eq!(unknown.children[0].id, "0-0");
}

#[test]
fn test_structure_rebuild_is_idempotent() {
    let controls = vec![
        scored("a", 10.0),
        evaluation("b", 70.0, Some(("3", "Third")), None),
        scored("c", 55.5),
    ];

    let first = serde_json::to_vec(&build_structure("nca_en", &controls)).unwrap();
    let second = serde_json::to_vec(&build_structure("nca_en", &controls)).unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_nist_structure_uses_functions() {
    let mut control = scored("ID.AM-1", 75.0);
    control.control_meta.function_id = Some("ID".to_string());
    control.control_meta.function_name = Some("Identify".to_string());

    let structure = build_structure("nist_en", &[control]);

    assert_eq!(structure.groups[0].id, "ID");
    assert_eq!(structure.groups[0].children[0].id, "0-0");
}

#[test]
fn test_score_labels() {
    assert_eq!(ScoreLabel::for_score(90.0), ScoreLabel::Excellent);
    assert_eq!(ScoreLabel::for_score(89.9), ScoreLabel::Good);
    assert_eq!(ScoreLabel::for_score(50.0), ScoreLabel::Fair);
    assert_eq!(ScoreLabel::for_score(25.0), ScoreLabel::Poor);
    assert_eq!(ScoreLabel::for_score(24.9), ScoreLabel::Critical);
}

#[test]
fn test_summary_rollup() {
    let nca = FrameworkResult::build(
        "nca_en",
        vec![scored("a", 95.0), scored("b", 80.0), scored("c", 10.0)],
    );
    let nist = FrameworkResult::build("nist_en", vec![scored("d", 55.0), scored("e", 30.0)]);

    let summary = summarize(&[nca, nist]);

    assert_eq!(summary.total_controls_evaluated, 5);
    assert_eq!(summary.overall_score, 54.0);
    assert_eq!(summary.overall_status, ScoreLabel::Fair);
    assert_eq!(summary.frameworks_analyzed, vec!["nca_en", "nist_en"]);
    assert_eq!(summary.critical_gaps.len(), 1);
    assert_eq!(summary.critical_gaps[0].control_id, "c");
    assert_eq!(
        summary.score_distribution,
        ScoreDistribution {
            excellent: 1,
            good: 1,
            fair: 1,
            poor: 1,
            critical: 1,
        }
    );
}

#[test]
fn test_critical_gaps_capped_in_encounter_order() {
    let controls: Vec<ControlEvaluation> = (0..14).map(|i| scored(&format!("c{i}"), 5.0)).collect();
    let summary = summarize(&[FrameworkResult::build("nca_en", controls)]);

    assert_eq!(summary.critical_gaps.len(), 10);
    assert_eq!(summary.critical_gaps[0].control_id, "c0");
    assert_eq!(summary.critical_gaps[9].control_id, "c9");
}

#[test]
fn test_top_recommendations_sorted_stably_and_capped() {
    let first = with_recs(
        scored("a", 40.0),
        &[
            (Priority::High, "a-high-1"),
            (Priority::Low, "a-low"),
            (Priority::Critical, "a-critical"),
            (Priority::Medium, "a-medium"),
        ],
    );
    let second = with_recs(
        scored("b", 40.0),
        &[(Priority::High, "b-high"), (Priority::Critical, "b-critical")],
    );

    let summary = summarize(&[FrameworkResult::build("nca_en", vec![first, second])]);
    let order: Vec<&str> = summary
        .top_recommendations
        .iter()
        .map(|r| r.recommendation.recommendation.as_str())
        .collect();

    assert_eq!(order, vec!["a-critical", "b-critical", "a-high-1", "b-high"]);
    assert_eq!(summary.top_recommendations[1].control_id, "b");
    assert_eq!(summary.top_recommendations[1].framework, "nca_en");

    let many: Vec<(Priority, &str)> = (0..20).map(|_| (Priority::High, "x")).collect();
    let busy = with_recs(scored("c", 40.0), &many);
    let summary = summarize(&[FrameworkResult::build("nca_en", vec![busy])]);
    assert_eq!(summary.top_recommendations.len(), 15);
}

#[test]
fn test_analysis_results_lookups() {
    let results = AnalysisResults::new(
        DocumentInfo {
            filename: "policy.txt".to_string(),
            total_chars: 100,
            total_chunks: 1,
        },
        vec![FrameworkResult::build("nca_en", vec![scored("1-1-1", 70.0)])],
    );

    assert!(results.framework("nca_en").is_some());
    assert!(results.framework("nist_en").is_none());
    assert_eq!(
        results
            .framework("nca_en")
            .and_then(|f| f.control("1-1-1"))
            .map(|c| c.final_score),
        Some(70.0)
    );
    assert_eq!(results.summary.overall_score, 70.0);
}

#[test]
fn test_flattened_recommendation_serialization() {
    let rec = PrioritizedRecommendation {
        control_id: "1-1-1".to_string(),
        framework: "nca_en".to_string(),
        recommendation: Recommendation {
            priority: Priority::Critical,
            recommendation: "Do it".to_string(),
            expected_impact: None,
        },
    };
    let value = serde_json::to_value(&rec).unwrap();
    assert_eq!(value["priority"], "critical");
    assert_eq!(value["control_id"], "1-1-1");
}

fn results_of(frameworks: Vec<FrameworkResult>) -> AnalysisResults {
    AnalysisResults::new(
        DocumentInfo {
            filename: "policy.txt".to_string(),
            total_chars: 100,
            total_chunks: 1,
        },
        frameworks,
    )
}

#[test]
fn test_digest_lists_weakest_first_with_hierarchy_names() {
    let nca = FrameworkResult::build(
        "nca_en",
        vec![
            evaluation("2-1-1", 40.0, Some(("2", "Defense")), Some(("2-1", "Assets"))),
            evaluation("1-1-1", 90.0, Some(("1", "Governance")), Some(("1-1", "Strategy"))),
            evaluation("2-1-2", 10.0, Some(("2", "Defense")), Some(("2-1", "Assets"))),
        ],
    );
    let arabic = FrameworkResult::build("nca_ar", vec![scored("e", 40.0)]);

    let digest = digest(&results_of(vec![nca, arabic]));

    let order: Vec<&str> = digest
        .controls
        .all
        .iter()
        .map(|e| e.control_id.as_str())
        .collect();
    assert_eq!(order, vec!["2-1-2", "2-1-1", "e", "1-1-1"]);

    let weakest = &digest.controls.all[0];
    assert_eq!(weakest.framework, "nca_en");
    assert_eq!(weakest.domain, "Defense");
    assert_eq!(weakest.subdomain, "Assets");
    assert_eq!(digest.controls.all[2].framework, "nca_ar");

    assert_eq!(digest.summary.total_controls, 4);
    assert_eq!(digest.summary.overall_score, 45.0);
    assert_eq!(digest.summary.score_distribution.poor, 2);
}

#[test]
fn test_digest_band_edges() {
    let controls = [24.9, 25.0, 49.9, 50.0, 74.9, 75.0, 100.0]
        .iter()
        .enumerate()
        .map(|(i, score)| scored(&format!("c{i}"), *score))
        .collect();

    let digest = digest(&results_of(vec![FrameworkResult::build("nca_en", controls)]));

    assert_eq!(digest.summary.critical_count, 1);
    assert_eq!(digest.summary.poor_count, 2);
    assert_eq!(digest.summary.fair_count, 2);
    assert_eq!(digest.summary.good_count, 2);
    assert_eq!(digest.controls.critical[0].final_score, 24.9);
    let poor: Vec<f64> = digest.controls.poor.iter().map(|e| e.final_score).collect();
    assert_eq!(poor, vec![25.0, 49.9]);
}

#[test]
fn test_digest_caps_critical_and_poor_lists() {
    let mut controls: Vec<ControlEvaluation> =
        (0..14).map(|i| scored(&format!("c{i}"), 5.0)).collect();
    controls.extend((0..12).map(|i| scored(&format!("p{i}"), 30.0)));
    let mut long = scored("long", 80.0);
    long.control_text = "x".repeat(300);
    controls.push(long);

    let digest = digest(&results_of(vec![FrameworkResult::build("nca_en", controls)]));

    assert_eq!(digest.summary.critical_count, 14);
    assert_eq!(digest.summary.poor_count, 12);
    assert_eq!(digest.controls.critical.len(), 10);
    assert_eq!(digest.controls.poor.len(), 10);
    assert_eq!(digest.controls.critical[0].control_id, "c0");
    assert_eq!(digest.controls.poor[9].control_id, "p9");
    assert_eq!(digest.controls.all.len(), 27);
    assert_eq!(digest.controls.all[26].control_text.chars().count(), 200);
}
