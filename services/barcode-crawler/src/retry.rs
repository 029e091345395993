//!
//! src/retry.rs  Andrew Belles  Oct 16th, 2026
//!
//! Bounded retry with a fixed delay between attempts, shared by
//! both catalog calls
//!

use std::{future::Future, time::Duration};

use tokio::time::sleep;
use tracing::warn;

use crate::config::RetryConfig;
use crate::errors::CrawlerError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RetryConfig::default())
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(cfg: &RetryConfig) -> Self {
        Self { max_attempts: cfg.max_attempts, delay: cfg.delay }
    }
}

///
/// Runs `op` until it succeeds, fails with an error `is_retryable` rejects,
/// or `policy.max_attempts` attempts are spent. `op` receives the 1-based
/// attempt number. No sleep follows the final attempt.
///
pub async fn retry_with<T, F, Fut, C>(
    policy: &RetryPolicy,
    what: &str,
    mut op: F,
    is_retryable: C
) -> Result<T, CrawlerError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, CrawlerError>>,
    C: Fn(&CrawlerError) -> bool,
{
    let mut last = String::from("no attempt made");
    for attempt in 1..=policy.max_attempts {
        match op(attempt).await {
            Ok(v) => return Ok(v),
            Err(e) if !is_retryable(&e) => return Err(e),
            Err(e) => {
                warn!(
                    call = what, attempt, max = policy.max_attempts,
                    error = %e, delay_ms = ?policy.delay.as_millis(),
                    "lookup.retry"
                );
                last = e.to_string();
                if attempt < policy.max_attempts {
                    sleep(policy.delay).await;
                }
            }
        }
    }
    Err(CrawlerError::Exhausted {
        what: what.to_string(),
        attempts: policy.max_attempts,
        last
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use tokio::time::Instant;

    fn policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy { max_attempts, delay: Duration::from_secs(10) }
    }

    #[tokio::test(start_paused = true)]
    async fn succeeds_on_third_attempt() {
        let calls = Cell::new(0_u32);
        let started = Instant::now();

        let out = retry_with(&policy(5), "search", |attempt| {
            calls.set(calls.get() + 1);
            async move {
                if attempt < 3 {
                    Err(CrawlerError::Status(502))
                } else {
                    Ok(attempt)
                }
            }
        }, CrawlerError::is_transient).await;

        assert_eq!(out.unwrap(), 3);
        assert_eq!(calls.get(), 3);
        // two failed attempts, two waits
        let waited = started.elapsed();
        assert!(waited >= Duration::from_secs(20) && waited < Duration::from_secs(21));
    }

    #[tokio::test(start_paused = true)]
    async fn exhausts_after_budget() {
        let calls = Cell::new(0_u32);
        let started = Instant::now();

        let out: Result<(), _> = retry_with(&policy(5), "release 42", |_| {
            calls.set(calls.get() + 1);
            async { Err(CrawlerError::Http("connection refused".into())) }
        }, CrawlerError::is_transient).await;

        assert_eq!(calls.get(), 5);
        // no wait after the last attempt
        let waited = started.elapsed();
        assert!(waited >= Duration::from_secs(40) && waited < Duration::from_secs(41));
        match out {
            Err(CrawlerError::Exhausted { what, attempts, last }) => {
                assert_eq!(what, "release 42");
                assert_eq!(attempts, 5);
                assert!(last.contains("connection refused"));
            }
            other => panic!("expected exhaustion, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn non_retryable_error_returns_at_once() {
        let calls = Cell::new(0_u32);

        let out: Result<(), _> = retry_with(&policy(5), "search", |_| {
            calls.set(calls.get() + 1);
            async { Err(CrawlerError::Config("bad url".into())) }
        }, CrawlerError::is_transient).await;

        assert_eq!(calls.get(), 1);
        assert!(matches!(out, Err(CrawlerError::Config(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn custom_classifier_is_honored() {
        let calls = Cell::new(0_u32);

        let out: Result<(), _> = retry_with(&policy(5), "search", |_| {
            calls.set(calls.get() + 1);
            async { Err(CrawlerError::Status(404)) }
        }, |e| !matches!(e, CrawlerError::Status(404))).await;

        assert_eq!(calls.get(), 1);
        assert!(matches!(out, Err(CrawlerError::Status(404))));
    }

    #[tokio::test(start_paused = true)]
    async fn zero_attempts_makes_no_call() {
        let calls = Cell::new(0_u32);

        let out: Result<(), _> = retry_with(&policy(0), "search", |_| {
            calls.set(calls.get() + 1);
            async { Ok(()) }
        }, CrawlerError::is_transient).await;

        assert_eq!(calls.get(), 0);
        assert!(matches!(out, Err(CrawlerError::Exhausted { attempts: 0, .. })));
    }
}
