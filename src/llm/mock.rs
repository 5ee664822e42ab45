use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;
use parking_lot::Mutex;

use super::completion::{CompletionService, ModelTier};
use super::error::{CompletionError, CompletionResult};

#[derive(Default)]
struct Script {
    queued: HashMap<ModelTier, VecDeque<CompletionResult<String>>>,
    fallback: HashMap<ModelTier, String>,
    calls: HashMap<ModelTier, usize>,
    prompts: Vec<(ModelTier, String)>,
}

/// Scripted [`CompletionService`] for tests.
///
/// Each tier answers from its queue first, then from its fallback reply. A tier with
/// neither returns [`CompletionError::Provider`].
#[derive(Default)]
pub struct ScriptedCompletion {
    script: Mutex<Script>,
}

impl ScriptedCompletion {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a reply for the next call on `tier`.
    pub fn reply(self, tier: ModelTier, text: impl Into<String>) -> Self {
        self.push(tier, Ok(text.into()));
        self
    }

    /// Queues an error for the next call on `tier`.
    pub fn fail(self, tier: ModelTier, err: CompletionError) -> Self {
        self.push(tier, Err(err));
        self
    }

    /// Reply used for `tier` once its queue is empty.
    pub fn always(self, tier: ModelTier, text: impl Into<String>) -> Self {
        self.script.lock().fallback.insert(tier, text.into());
        self
    }

    pub fn push(&self, tier: ModelTier, result: CompletionResult<String>) {
        self.script
            .lock()
            .queued
            .entry(tier)
            .or_default()
            .push_back(result);
    }

    /// Number of calls made on `tier`.
    pub fn calls(&self, tier: ModelTier) -> usize {
        self.script.lock().calls.get(&tier).copied().unwrap_or(0)
    }

    /// Total number of calls across tiers.
    pub fn total_calls(&self) -> usize {
        self.script.lock().calls.values().sum()
    }

    /// User prompts received so far, in call order.
    pub fn prompts(&self) -> Vec<(ModelTier, String)> {
        self.script.lock().prompts.clone()
    }
}

#[async_trait]
impl CompletionService for ScriptedCompletion {
    async fn complete(
        &self,
        tier: ModelTier,
        _system: &str,
        user: &str,
    ) -> CompletionResult<String> {
        let mut script = self.script.lock();
        *script.calls.entry(tier).or_default() += 1;
        script.prompts.push((tier, user.to_string()));

        if let Some(result) = script.queued.get_mut(&tier).and_then(VecDeque::pop_front) {
            return result;
        }
        script
            .fallback
            .get(&tier)
            .cloned()
            .ok_or_else(|| CompletionError::Provider(format!("no scripted reply for {tier:?}")))
    }
}
