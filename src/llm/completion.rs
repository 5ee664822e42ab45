use async_trait::async_trait;
use genai::Client;
use genai::chat::{ChatMessage, ChatOptions, ChatRequest};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::error::{CompletionError, CompletionResult};
use crate::config::Config;
use crate::constants::DEFAULT_MAX_TOKENS;

/// Model tier used by an evaluation stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelTier {
    /// Relevance gate.
    Fast,
    /// Gap analysis.
    Balanced,
    /// Final scoring.
    Precise,
}

impl ModelTier {
    /// Sampling temperature for the tier.
    pub fn temperature(&self) -> f64 {
        match self {
            ModelTier::Fast | ModelTier::Balanced => 0.3,
            ModelTier::Precise => 0.1,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ModelTier::Fast => "fast",
            ModelTier::Balanced => "balanced",
            ModelTier::Precise => "precise",
        }
    }
}

/// Text-in/text-out access to a language model.
#[async_trait]
pub trait CompletionService: Send + Sync {
    /// Sends one system + user exchange and returns the reply text.
    async fn complete(&self, tier: ModelTier, system: &str, user: &str)
    -> CompletionResult<String>;
}

/// Model name per tier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierModels {
    pub fast: String,
    pub balanced: String,
    pub precise: String,
}

impl TierModels {
    pub fn from_config(config: &Config) -> Self {
        Self {
            fast: config.fast_model.clone(),
            balanced: config.balanced_model.clone(),
            precise: config.precise_model.clone(),
        }
    }

    pub fn model_for(&self, tier: ModelTier) -> &str {
        match tier {
            ModelTier::Fast => &self.fast,
            ModelTier::Balanced => &self.balanced,
            ModelTier::Precise => &self.precise,
        }
    }
}

/// [`CompletionService`] backed by a `genai` client.
///
/// Provider credentials are resolved by `genai` from the environment (`GROQ_API_KEY`
/// for Groq-hosted models).
#[derive(Clone)]
pub struct GenaiCompletion {
    client: Client,
    models: TierModels,
    max_tokens: u32,
}

impl GenaiCompletion {
    pub fn new(models: TierModels) -> Self {
        Self {
            client: Client::default(),
            models,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(TierModels::from_config(config))
    }

    pub fn models(&self) -> &TierModels {
        &self.models
    }
}

#[async_trait]
impl CompletionService for GenaiCompletion {
    async fn complete(
        &self,
        tier: ModelTier,
        system: &str,
        user: &str,
    ) -> CompletionResult<String> {
        let model = self.models.model_for(tier);
        let request = ChatRequest::new(vec![ChatMessage::system(system), ChatMessage::user(user)]);
        let options = ChatOptions::default()
            .with_temperature(tier.temperature())
            .with_max_tokens(self.max_tokens);

        debug!(tier = tier.as_str(), model, "Sending completion request");
        let response = self
            .client
            .exec_chat(model, request, Some(&options))
            .await?;

        response
            .first_text()
            .map(str::to_string)
            .filter(|text| !text.trim().is_empty())
            .ok_or(CompletionError::EmptyResponse)
    }
}
