//! Language-model access: tiered completion calls and the retry policy around them.

pub mod completion;
pub mod error;
pub mod retry;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

#[cfg(test)]
mod tests;

pub use completion::{CompletionService, GenaiCompletion, ModelTier, TierModels};
pub use error::{CompletionError, CompletionResult, Transient};
#[cfg(any(test, feature = "mock"))]
pub use mock::ScriptedCompletion;
pub use retry::{DEFAULT_INITIAL_BACKOFF, DEFAULT_MAX_ATTEMPTS, DEFAULT_MAX_BACKOFF, RetryPolicy};
