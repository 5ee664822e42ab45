use std::sync::Arc;

use tracing::{info, warn};

use super::Evaluator;
use super::cascade::CascadeEvaluator;
use super::placeholder::PlaceholderEvaluator;
use crate::config::Config;
use crate::llm::{GenaiCompletion, RetryPolicy};

/// Selects the evaluator implementation from configuration.
pub fn build_evaluator(config: &Config) -> Arc<dyn Evaluator> {
    if config.evaluator_available() {
        info!(
            fast = %config.fast_model,
            balanced = %config.balanced_model,
            precise = %config.precise_model,
            "Using staged model evaluator"
        );
        Arc::new(CascadeEvaluator::new(
            Arc::new(GenaiCompletion::from_config(config)),
            RetryPolicy::default(),
            config.response_language.clone(),
        ))
    } else {
        if config.force_mock_evaluator {
            warn!("Mock evaluator forced by configuration; controls will not be scored");
        } else {
            warn!("GROQ_API_KEY not set; running in mock mode, controls will not be scored");
        }
        Arc::new(PlaceholderEvaluator)
    }
}
