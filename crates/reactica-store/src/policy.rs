//! Timeout and retry policy for store calls.
//!
//! The pipeline itself never retries a failed write. Any retrying happens
//! here, inside the gateway, bounded by [`CallPolicy::max_retries`].

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::error::StoreError;

/// Per-call deadline and bounded retry settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallPolicy {
    /// Deadline for a single attempt, in milliseconds.
    pub timeout_ms: u64,
    /// Extra attempts after the first failure (0 = fail fast).
    pub max_retries: u32,
    /// Pause between attempts, in milliseconds.
    pub retry_backoff_ms: u64,
}

impl Default for CallPolicy {
    fn default() -> Self {
        Self {
            timeout_ms: 5000,
            max_retries: 0,
            retry_backoff_ms: 200,
        }
    }
}

impl CallPolicy {
    /// Run `attempt` under this policy.
    ///
    /// Each attempt is bounded by `timeout_ms`. A failed or timed-out
    /// attempt is retried up to `max_retries` times; the last error is
    /// returned when every attempt fails.
    ///
    /// # Errors
    ///
    /// Returns the error of the final attempt, or [`StoreError::Timeout`]
    /// if it exceeded its deadline.
    pub async fn run<T, F, Fut>(
        &self,
        operation: &'static str,
        mut attempt: F,
    ) -> Result<T, StoreError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, StoreError>>,
    {
        let mut tries: u32 = 0;
        loop {
            let deadline = Duration::from_millis(self.timeout_ms);
            let error = match tokio::time::timeout(deadline, attempt()).await {
                Ok(Ok(value)) => return Ok(value),
                Ok(Err(e)) => e,
                Err(_elapsed) => StoreError::Timeout {
                    operation,
                    timeout_ms: self.timeout_ms,
                },
            };

            if tries >= self.max_retries {
                return Err(error);
            }
            tries = tries.saturating_add(1);
            warn!(
                operation,
                attempt = tries,
                max_retries = self.max_retries,
                error = %error,
                "store call failed, retrying"
            );
            tokio::time::sleep(Duration::from_millis(self.retry_backoff_ms)).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn success_returns_immediately() {
        let policy = CallPolicy::default();
        let result = policy.run("put", || async { Ok::<_, StoreError>(7) }).await;
        assert_eq!(result.ok(), Some(7));
    }

    #[tokio::test(start_paused = true)]
    async fn slow_call_times_out() {
        let policy = CallPolicy {
            timeout_ms: 100,
            max_retries: 0,
            retry_backoff_ms: 0,
        };
        let result = policy
            .run("put", || async {
                tokio::time::sleep(Duration::from_secs(10)).await;
                Ok::<_, StoreError>(())
            })
            .await;
        assert!(matches!(
            result,
            Err(StoreError::Timeout {
                operation: "put",
                timeout_ms: 100
            })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn retries_until_success() {
        let calls = Arc::new(AtomicU32::new(0));
        let policy = CallPolicy {
            timeout_ms: 100,
            max_retries: 3,
            retry_backoff_ms: 10,
        };
        let counter = Arc::clone(&calls);
        let result = policy
            .run("put", move || {
                let counter = Arc::clone(&counter);
                async move {
                    let n = counter.fetch_add(1, Ordering::SeqCst);
                    if n < 2 {
                        Err(StoreError::Unavailable(String::from("flaky")))
                    } else {
                        Ok(n)
                    }
                }
            })
            .await;
        assert_eq!(result.ok(), Some(2));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn gives_up_after_max_retries() {
        let calls = Arc::new(AtomicU32::new(0));
        let policy = CallPolicy {
            timeout_ms: 100,
            max_retries: 2,
            retry_backoff_ms: 10,
        };
        let counter = Arc::clone(&calls);
        let result: Result<(), StoreError> = policy
            .run("clear", move || {
                counter.fetch_add(1, Ordering::SeqCst);
                async { Err(StoreError::Unavailable(String::from("down"))) }
            })
            .await;
        assert!(matches!(result, Err(StoreError::Unavailable(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }
}
