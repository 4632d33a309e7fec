//! Bounded retry around a single provider fetch.
//!
//! Errors are retried up to `max_attempts` with a fixed pause in between. A
//! "no transcript" answer ends the loop immediately and is never retried.

use std::time::Duration;

use super::FetchOutcome;
use crate::config::BatchConfig;
use crate::providers::TranscriptProvider;

/// Attempt cap and pause between failed attempts
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_millis(3500),
        }
    }
}

impl RetryPolicy {
    pub fn from_config(batch: &BatchConfig) -> Self {
        Self {
            max_attempts: batch.max_retries.max(1),
            delay: batch.delay(),
        }
    }
}

/// Fetch `id` from `provider`, folding every attempt into a single outcome
pub async fn fetch_with_retry(
    provider: &dyn TranscriptProvider,
    id: &str,
    policy: &RetryPolicy,
) -> FetchOutcome {
    let label = provider.kind().label();
    let mut last_error = None;

    for attempt in 1..=policy.max_attempts {
        match provider.fetch(id).await {
            Ok(Some(segments)) => {
                if attempt > 1 {
                    tracing::info!("[{}] Fetched {} after {} attempts", label, id, attempt);
                }
                return FetchOutcome::Data(segments);
            }
            Ok(None) => {
                tracing::info!("[{}] No subtitle found for {}", label, id);
                return FetchOutcome::NoSubtitle;
            }
            Err(e) => {
                tracing::warn!(
                    "[{}] Attempt {}/{} failed for {}: {}",
                    label,
                    attempt,
                    policy.max_attempts,
                    id,
                    e
                );
                last_error = Some(e);

                if attempt < policy.max_attempts {
                    tokio::time::sleep(policy.delay).await;
                }
            }
        }
    }

    match last_error {
        Some(e) => tracing::error!("[{}] All retries failed for {}. Last error: {}", label, id, e),
        None => tracing::error!("[{}] All retries failed for {}", label, id),
    }
    FetchOutcome::Failed
}
