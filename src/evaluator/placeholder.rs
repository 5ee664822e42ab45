use async_trait::async_trait;

use super::Evaluator;
use super::types::{ComplianceStatus, ControlEvaluation, StageTrace};
use crate::controls::Control;

/// Justification attached to every placeholder evaluation.
pub const PLACEHOLDER_JUSTIFICATION: &str =
    "LLM evaluation not available. Set GROQ_API_KEY to enable.";

/// Deterministic evaluator used when no model provider is configured.
///
/// Every control gets score 0, confidence 0 and [`ComplianceStatus::NotEvaluated`],
/// so a run still completes.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderEvaluator;

#[async_trait]
impl Evaluator for PlaceholderEvaluator {
    async fn evaluate_control(
        &self,
        _document_text: &str,
        control: &Control,
        _relevant_chunks: &[String],
    ) -> ControlEvaluation {
        ControlEvaluation {
            control_id: control.id.clone(),
            control_text: control.text.clone(),
            control_meta: control.meta.clone(),
            final_score: 0.0,
            compliance_status: ComplianceStatus::NotEvaluated,
            confidence: 0.0,
            score_justification: PLACEHOLDER_JUSTIFICATION.to_string(),
            key_findings: Vec::new(),
            recommendations: Vec::new(),
            evidence_summary: String::new(),
            risk_level: None,
            skipped_deeper_analysis: false,
            mock: true,
            stages: StageTrace::default(),
        }
    }

    fn is_available(&self) -> bool {
        false
    }
}
