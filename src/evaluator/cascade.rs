use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, instrument, warn};

use super::Evaluator;
use super::prompts::{Prompt, PromptBuilder};
use super::stages::{FinalAssessment, GapAnalysis, RelevanceCheck};
use super::types::{
    ComplianceStatus, ControlEvaluation, Priority, Recommendation, RiskLevel, StageTrace,
    clamp_confidence, clamp_score,
};
use crate::constants::{
    CHUNK_SEPARATOR, DEFAULT_RELEVANCE_TOP_K, RELEVANCE_EXCERPT_CHARS, RELEVANCE_GATE_THRESHOLD,
    SCORING_EXCERPT_CHARS, truncate_chars,
};
use crate::controls::Control;
use crate::llm::{CompletionResult, CompletionService, ModelTier, RetryPolicy};

/// Confidence reported when the relevance gate short-circuits.
pub const GATE_CONFIDENCE: f64 = 0.8;
/// Confidence reported when final scoring fell back to the preliminary score.
pub const DEGRADED_CONFIDENCE: f64 = 0.5;

/// Three-stage evaluator: relevance gate, gap analysis, final scoring.
///
/// Each stage is one completion call wrapped in the retry policy. Failures never
/// escape: stage 1 and 2 failures become sentinel payloads, and a stage 3 failure
/// falls back to the banded preliminary score.
pub struct CascadeEvaluator {
    llm: Arc<dyn CompletionService>,
    retry: RetryPolicy,
    prompts: PromptBuilder,
}

impl CascadeEvaluator {
    pub fn new(
        llm: Arc<dyn CompletionService>,
        retry: RetryPolicy,
        response_language: Option<String>,
    ) -> Self {
        Self {
            llm,
            retry,
            prompts: PromptBuilder::new(response_language),
        }
    }

    async fn call(&self, tier: ModelTier, prompt: &Prompt) -> CompletionResult<String> {
        self.retry
            .run(tier.as_str(), || {
                self.llm.complete(tier, &prompt.system, &prompt.user)
            })
            .await
    }

    async fn relevance_gate(&self, control: &Control, excerpt: &str) -> RelevanceCheck {
        let prompt = self.prompts.relevance(control, excerpt);
        match self.call(ModelTier::Fast, &prompt).await {
            Ok(response) => RelevanceCheck::parse(&response),
            Err(e) => {
                warn!(control_id = %control.id, error = %e, "Relevance gate call failed");
                RelevanceCheck::failed(e.to_string())
            }
        }
    }

    async fn gap_analysis(&self, control: &Control, combined: &str) -> GapAnalysis {
        let prompt = self.prompts.gap_analysis(control, combined);
        match self.call(ModelTier::Balanced, &prompt).await {
            Ok(response) => GapAnalysis::parse(&response),
            Err(e) => {
                warn!(control_id = %control.id, error = %e, "Gap analysis call failed");
                GapAnalysis::failed(e.to_string())
            }
        }
    }

    async fn final_scoring(
        &self,
        control: &Control,
        gap: &GapAnalysis,
        excerpt: &str,
    ) -> Result<FinalAssessment, FinalAssessment> {
        let prompt = self.prompts.final_scoring(control, gap, excerpt);
        match self.call(ModelTier::Precise, &prompt).await {
            Ok(response) => FinalAssessment::parse(&response).map_err(|unparsable| {
                warn!(control_id = %control.id, "Final scoring response was not parsable");
                FinalAssessment::degraded(
                    Some("unparsable final scoring response".to_string()),
                    Some(unparsable.raw),
                )
            }),
            Err(e) => {
                warn!(control_id = %control.id, error = %e, "Final scoring call failed");
                Err(FinalAssessment::degraded(Some(e.to_string()), None))
            }
        }
    }
}

fn base_evaluation(control: &Control) -> ControlEvaluation {
    ControlEvaluation {
        control_id: control.id.clone(),
        control_text: control.text.clone(),
        control_meta: control.meta.clone(),
        final_score: 0.0,
        compliance_status: ComplianceStatus::NonCompliant,
        confidence: 0.0,
        score_justification: String::new(),
        key_findings: Vec::new(),
        recommendations: Vec::new(),
        evidence_summary: String::new(),
        risk_level: None,
        skipped_deeper_analysis: false,
        mock: false,
        stages: StageTrace::default(),
    }
}

fn short_circuit(control: &Control, relevance: RelevanceCheck) -> ControlEvaluation {
    ControlEvaluation {
        final_score: 0.0,
        compliance_status: ComplianceStatus::NonCompliant,
        confidence: GATE_CONFIDENCE,
        score_justification: "Document does not appear to address this control requirement."
            .to_string(),
        recommendations: vec![Recommendation {
            priority: Priority::Critical,
            recommendation: format!(
                "Add policies and procedures to address control {}",
                control.id
            ),
            expected_impact: Some("Establishes baseline compliance for this control".to_string()),
        }],
        risk_level: Some(RiskLevel::High),
        skipped_deeper_analysis: true,
        stages: StageTrace {
            relevance: Some(relevance),
            ..StageTrace::default()
        },
        ..base_evaluation(control)
    }
}

#[async_trait]
impl Evaluator for CascadeEvaluator {
    #[instrument(skip_all, fields(control_id = %control.id, framework = %control.framework))]
    async fn evaluate_control(
        &self,
        document_text: &str,
        control: &Control,
        relevant_chunks: &[String],
    ) -> ControlEvaluation {
        let combined = relevant_chunks
            .iter()
            .take(DEFAULT_RELEVANCE_TOP_K)
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(CHUNK_SEPARATOR);

        let relevance = self
            .relevance_gate(control, truncate_chars(&combined, RELEVANCE_EXCERPT_CHARS))
            .await;
        if relevance.is_clearly_irrelevant(RELEVANCE_GATE_THRESHOLD) {
            debug!(score = relevance.relevance_score, "Relevance gate short-circuited");
            return short_circuit(control, relevance);
        }

        let gap = self.gap_analysis(control, &combined).await;
        let excerpt = truncate_chars(document_text, SCORING_EXCERPT_CHARS);

        let evaluation = match self.final_scoring(control, &gap, excerpt).await {
            Ok(assessment) => {
                let final_score = clamp_score(assessment.final_score);
                ControlEvaluation {
                    final_score,
                    compliance_status: ComplianceStatus::band(final_score),
                    confidence: clamp_confidence(assessment.confidence.unwrap_or(0.5)),
                    score_justification: assessment.score_justification.clone(),
                    key_findings: assessment.key_findings.clone(),
                    recommendations: assessment.recommendations.clone(),
                    evidence_summary: assessment.evidence_summary.clone(),
                    risk_level: Some(assessment.risk_level.unwrap_or(RiskLevel::Medium)),
                    stages: StageTrace {
                        relevance: Some(relevance),
                        gap_analysis: Some(gap),
                        final_scoring: Some(assessment),
                    },
                    ..base_evaluation(control)
                }
            }
            Err(degraded) => {
                let final_score = clamp_score(gap.preliminary_score);
                ControlEvaluation {
                    final_score,
                    compliance_status: ComplianceStatus::band(final_score),
                    confidence: DEGRADED_CONFIDENCE,
                    score_justification:
                        "Score based on preliminary gap analysis (final scoring unavailable)."
                            .to_string(),
                    risk_level: Some(RiskLevel::Medium),
                    stages: StageTrace {
                        relevance: Some(relevance),
                        gap_analysis: Some(gap),
                        final_scoring: Some(degraded),
                    },
                    ..base_evaluation(control)
                }
            }
        };

        debug!(
            score = evaluation.final_score,
            status = evaluation.compliance_status.as_str(),
            "Control evaluated"
        );
        evaluation
    }

    fn is_available(&self) -> bool {
        true
    }
}
