// Copyright (c) 2025 Open Cluster Management GRC Squad
// SPDX-License-Identifier: MIT

//! Hub API retries.
//!
//! Rate limiting (429), server errors (5xx) and connection failures are retried with
//! jittered exponential backoff; any other error is returned on the first attempt. Waits
//! are `tokio::time::sleep`, so dropping the future stops the retries.

use anyhow::Result;
use rand::Rng;
use std::future::Future;
use std::time::{Duration, Instant};
use tracing::{debug, error, warn};

/// Backoff shape of a retried hub call.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RetryPolicy {
    /// First wait
    pub initial_interval: Duration,
    /// Upper bound on a single wait
    pub max_interval: Duration,
    /// Give up once this much time has passed since the first attempt
    pub max_elapsed: Duration,
    /// Growth factor between waits
    pub multiplier: f64,
    /// Relative jitter applied to every wait, `0.1` meaning +/-10%
    pub jitter: f64,
}

impl Default for RetryPolicy {
    /// 100ms doubling up to 10s, at most 2 minutes overall, +/-10% jitter.
    ///
    /// The budget is short: a failed permission grant leaves the registration `Approved`
    /// and the next reconciliation tries again.
    fn default() -> Self {
        Self {
            initial_interval: Duration::from_millis(100),
            max_interval: Duration::from_secs(10),
            max_elapsed: Duration::from_secs(120),
            multiplier: 2.0,
            jitter: 0.1,
        }
    }
}

impl RetryPolicy {
    /// Start a fresh schedule of waits.
    #[must_use]
    pub fn backoff(&self) -> Backoff {
        Backoff {
            policy: *self,
            next: self.initial_interval,
            started: Instant::now(),
        }
    }
}

/// Schedule of waits produced by a [`RetryPolicy`].
///
/// Yields `None` once the elapsed-time budget is spent.
#[derive(Clone, Debug)]
pub struct Backoff {
    policy: RetryPolicy,
    next: Duration,
    started: Instant,
}

impl Backoff {
    /// Un-jittered wait the next call will be based on.
    #[must_use]
    pub fn peek(&self) -> Duration {
        self.next
    }

    fn jittered(&self, interval: Duration) -> Duration {
        if self.policy.jitter <= 0.0 {
            return interval;
        }
        let secs = interval.as_secs_f64();
        let spread = secs * self.policy.jitter;
        let secs = rand::rng().random_range((secs - spread)..=(secs + spread));
        Duration::from_secs_f64(secs.max(0.0))
    }
}

impl Iterator for Backoff {
    type Item = Duration;

    fn next(&mut self) -> Option<Duration> {
        if self.started.elapsed() >= self.policy.max_elapsed {
            return None;
        }

        let wait = self.jittered(self.next);
        self.next = self
            .next
            .mul_f64(self.policy.multiplier)
            .min(self.policy.max_interval);
        Some(wait)
    }
}

/// Retry a hub API call with the default [`RetryPolicy`].
///
/// # Errors
///
/// Returns the first non-transient error, or the last transient one once the backoff
/// budget is spent.
///
/// # Example
///
/// ```no_run
/// use grc_addon::crd::ManagedClusterAddOn;
/// use grc_addon::retry::retry_api_call;
/// use kube::{Api, Client};
///
/// # async fn example() -> anyhow::Result<()> {
/// let client = Client::try_default().await?;
/// let addons: Api<ManagedClusterAddOn> = Api::namespaced(client, "cluster1");
///
/// let addon = retry_api_call(
///     || addons.get("policy-controller"),
///     "get ManagedClusterAddOn cluster1/policy-controller",
/// )
/// .await?;
/// # Ok(())
/// # }
/// ```
pub async fn retry_api_call<T, F, Fut>(operation: F, operation_name: &str) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, kube::Error>>,
{
    retry_with(RetryPolicy::default(), operation, operation_name).await
}

/// Retry a hub API call with an explicit policy.
///
/// # Errors
///
/// Same as [`retry_api_call`].
pub async fn retry_with<T, F, Fut>(
    policy: RetryPolicy,
    mut operation: F,
    operation_name: &str,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, kube::Error>>,
{
    let mut backoff = policy.backoff();
    let mut attempt: u32 = 0;

    loop {
        attempt += 1;
        let err = match operation().await {
            Ok(value) => {
                if attempt > 1 {
                    debug!(operation = operation_name, attempt, "Hub API call recovered");
                }
                return Ok(value);
            }
            Err(err) => err,
        };

        if !is_retryable_error(&err) {
            debug!(operation = operation_name, error = %err, "Hub API call failed permanently");
            return Err(err.into());
        }

        let Some(wait) = backoff.next() else {
            error!(
                operation = operation_name,
                attempt,
                error = %err,
                "Giving up on hub API call"
            );
            return Err(anyhow::Error::new(err)
                .context(format!("{operation_name}: gave up after {attempt} attempts")));
        };

        warn!(
            operation = operation_name,
            attempt,
            retry_after = ?wait,
            error = %err,
            "Transient hub API error"
        );
        tokio::time::sleep(wait).await;
    }
}

/// Whether a hub API error is transient.
pub(crate) fn is_retryable_error(err: &kube::Error) -> bool {
    match err {
        kube::Error::Api(response) => response.code == 429 || (500..600).contains(&response.code),
        kube::Error::Service(_) => true,
        _ => false,
    }
}

/// Whether an error chain carries a `409` from the API server.
pub(crate) fn is_conflict(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        matches!(
            cause.downcast_ref::<kube::Error>(),
            Some(kube::Error::Api(response)) if response.code == 409
        )
    })
}

#[cfg(test)]
#[path = "retry_tests.rs"]
mod retry_tests;
