//! Per-control compliance evaluation.
//!
//! Two implementations of [`Evaluator`] exist: the three-stage [`CascadeEvaluator`]
//! backed by a language model, and the [`PlaceholderEvaluator`] used when no model
//! provider is configured. [`build_evaluator`] picks one from configuration.

pub mod cascade;
pub mod factory;
pub mod payload;
pub mod placeholder;
pub mod prompts;
pub mod stages;
pub mod types;


use async_trait::async_trait;

use crate::controls::Control;

pub use cascade::{CascadeEvaluator, DEGRADED_CONFIDENCE, GATE_CONFIDENCE};
pub use factory::build_evaluator;
pub use payload::{UnparsablePayload, extract_object};
pub use placeholder::{PLACEHOLDER_JUSTIFICATION, PlaceholderEvaluator};
pub use prompts::{Prompt, PromptBuilder, framework_family};
pub use stages::{AddressedAspect, CoverageLevel, FinalAssessment, GapAnalysis, MissingAspect, RelevanceCheck};
pub use types::{
    ComplianceStatus, ControlEvaluation, KeyFinding, Priority, Recommendation, RiskLevel,
    StageTrace, clamp_confidence, clamp_score,
};

#[async_trait]
/// Scores one control against a document.
pub trait Evaluator: Send + Sync {
    /// Evaluates `control` using the document text and its most relevant chunks.
    ///
    /// Never fails: external errors are absorbed into the returned evaluation.
    async fn evaluate_control(
        &self,
        document_text: &str,
        control: &Control,
        relevant_chunks: &[String],
    ) -> ControlEvaluation;

    /// Returns `false` for the placeholder implementation.
    fn is_available(&self) -> bool;
}
