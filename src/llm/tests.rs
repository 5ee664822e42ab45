use super::*;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

#[test]
fn test_backoff_doubles_and_caps() {
    let policy = RetryPolicy::default();
    assert_eq!(policy.backoff_for(1), Duration::from_secs(2));
    assert_eq!(policy.backoff_for(2), Duration::from_secs(4));
    assert_eq!(policy.backoff_for(3), Duration::from_secs(8));
    assert_eq!(policy.backoff_for(4), Duration::from_secs(10));
    assert_eq!(policy.backoff_for(40), Duration::from_secs(10));
}

#[test]
fn test_error_classification() {
    assert!(CompletionError::from_provider_message("HTTP 429 Too Many Requests").is_transient());
    assert!(CompletionError::from_provider_message("request timed out").is_transient());
    assert!(CompletionError::EmptyResponse.is_transient());
    assert!(!CompletionError::from_provider_message("401 Unauthorized").is_transient());
    assert!(!CompletionError::from_provider_message("model not found").is_transient());
}

#[test]
fn test_tier_temperatures() {
    assert_eq!(ModelTier::Fast.temperature(), 0.3);
    assert_eq!(ModelTier::Balanced.temperature(), 0.3);
    assert_eq!(ModelTier::Precise.temperature(), 0.1);
}

#[tokio::test(start_paused = true)]
async fn test_retry_recovers_from_transient_errors() {
    let attempts = Arc::new(AtomicU32::new(0));
    let counter = attempts.clone();

    let result: Result<&str, CompletionError> = RetryPolicy::default()
        .run("test", || {
            let counter = counter.clone();
            async move {
                if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(CompletionError::RateLimited("slow down".into()))
                } else {
                    Ok("done")
                }
            }
        })
        .await;

    assert_eq!(result.unwrap(), "done");
    assert_eq!(attempts.load(Ordering::SeqCst), 3);
}

#[tokio::test(start_paused = true)]
async fn test_retry_gives_up_after_max_attempts() {
    let attempts = Arc::new(AtomicU32::new(0));
    let counter = attempts.clone();

    let result: Result<(), CompletionError> = RetryPolicy::default()
        .run("test", || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(CompletionError::Transport("connection reset".into()))
            }
        })
        .await;

    assert!(matches!(result, Err(CompletionError::Transport(_))));
    assert_eq!(attempts.load(Ordering::SeqCst), DEFAULT_MAX_ATTEMPTS);
}

#[tokio::test]
async fn test_retry_skips_permanent_errors() {
    let attempts = Arc::new(AtomicU32::new(0));
    let counter = attempts.clone();

    let result: Result<(), CompletionError> = RetryPolicy::default()
        .run("test", || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(CompletionError::Unauthorized("bad key".into()))
            }
        })
        .await;

    assert!(result.is_err());
    assert_eq!(attempts.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_scripted_completion_queue_then_fallback() {
    let llm = ScriptedCompletion::new()
        .reply(ModelTier::Fast, "first")
        .always(ModelTier::Fast, "again");

    assert_eq!(llm.complete(ModelTier::Fast, "s", "u1").await.unwrap(), "first");
    assert_eq!(llm.complete(ModelTier::Fast, "s", "u2").await.unwrap(), "again");
    assert!(llm.complete(ModelTier::Precise, "s", "u3").await.is_err());

    assert_eq!(llm.calls(ModelTier::Fast), 2);
    assert_eq!(llm.total_calls(), 3);
    assert_eq!(llm.prompts()[1].1, "u2");
}
