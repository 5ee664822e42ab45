use thiserror::Error;

/// Errors from a language-model completion call.
#[derive(Debug, Error)]
pub enum CompletionError {
    /// Provider throttled the request.
    #[error("rate limited by provider: {0}")]
    RateLimited(String),

    /// Network failure or timeout talking to the provider.
    #[error("transport error: {0}")]
    Transport(String),

    /// Provider returned a response without text.
    #[error("provider returned an empty completion")]
    EmptyResponse,

    /// Credentials were rejected.
    #[error("provider rejected credentials: {0}")]
    Unauthorized(String),

    /// Any other provider-side failure.
    #[error("provider error: {0}")]
    Provider(String),
}

impl CompletionError {
    /// Classifies a provider error message.
    pub fn from_provider_message(message: impl Into<String>) -> Self {
        let message = message.into();
        let lower = message.to_ascii_lowercase();

        if lower.contains("429") || lower.contains("rate limit") || lower.contains("too many") {
            CompletionError::RateLimited(message)
        } else if lower.contains("401")
            || lower.contains("403")
            || lower.contains("unauthorized")
            || lower.contains("api key")
        {
            CompletionError::Unauthorized(message)
        } else if lower.contains("timeout")
            || lower.contains("timed out")
            || lower.contains("connection")
            || lower.contains("502")
            || lower.contains("503")
            || lower.contains("504")
        {
            CompletionError::Transport(message)
        } else {
            CompletionError::Provider(message)
        }
    }
}

impl From<genai::Error> for CompletionError {
    fn from(err: genai::Error) -> Self {
        Self::from_provider_message(err.to_string())
    }
}

/// Errors a [`RetryPolicy`](super::RetryPolicy) may retry.
pub trait Transient {
    /// Returns `true` if repeating the call may succeed.
    fn is_transient(&self) -> bool;
}

impl Transient for CompletionError {
    fn is_transient(&self) -> bool {
        matches!(
            self,
            CompletionError::RateLimited(_)
                | CompletionError::Transport(_)
                | CompletionError::EmptyResponse
        )
    }
}

/// Result alias for completion calls.
pub type CompletionResult<T> = Result<T, CompletionError>;
