//! Multi-attempt execution of one logical operation.
//!
//! [`RetryOrchestrator::execute`] is the only engine. The completion style
//! ([`spawn_with_callback`], [`RetryOrchestrator::execute_with_callback`]) is
//! an adapter that spawns the deferred future and reports its outcome once.

use crate::error::{ApiError, ErrorCategory, StatusCode};
use rand_core::{OsRng, RngCore};
use std::collections::BTreeSet;
use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;

#[derive(Clone, Debug, PartialEq)]
pub struct RetryPolicy {
    pub enabled: bool,
    /// Retries after the first attempt; total attempts never exceed `max_retries + 1`.
    pub max_retries: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
    pub backoff_multiplier: f64,
    /// Delay is perturbed by up to this fraction of the uncapped backoff, in [0, 1].
    pub jitter_fraction: f64,
    pub retryable_status_codes: BTreeSet<StatusCode>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            enabled: true,
            max_retries: 3,
            initial_backoff: Duration::from_millis(200),
            max_backoff: Duration::from_millis(5000),
            backoff_multiplier: 1.5,
            jitter_fraction: 0.1,
            retryable_status_codes: [StatusCode::Unavailable, StatusCode::ResourceExhausted]
                .into_iter()
                .collect(),
        }
    }
}

impl RetryPolicy {
    pub fn disabled() -> Self {
        Self { enabled: false, ..Self::default() }
    }

    pub fn validate(&self) -> Result<(), ApiError> {
        if !self.backoff_multiplier.is_finite() || self.backoff_multiplier < 1.0 {
            return Err(ApiError::config(format!(
                "backoff_multiplier must be a finite number >= 1, got {}",
                self.backoff_multiplier
            )));
        }
        if !(0.0..=1.0).contains(&self.jitter_fraction) {
            return Err(ApiError::config(format!(
                "retry_jitter_fraction must be within [0, 1], got {}",
                self.jitter_fraction
            )));
        }
        if self.retryable_status_codes.contains(&StatusCode::Ok) {
            return Err(ApiError::config("OK cannot be a retryable status code"));
        }
        Ok(())
    }

    /// Whether a failure seen after `attempts` physical attempts may be retried.
    /// Client timeouts and a closed client are terminal whatever their status.
    pub fn should_retry(&self, error: &ApiError, attempts: u32) -> bool {
        self.enabled
            && !error.is_client_timeout()
            && error.category() != ErrorCategory::Connection
            && attempts <= self.max_retries
            && self.retryable_status_codes.contains(&error.status_code())
    }
}

/// Exponential backoff with symmetric jitter.
pub(crate) struct Backoff<R> {
    current_ms: f64,
    max_ms: f64,
    multiplier: f64,
    jitter_fraction: f64,
    rng: R,
}

impl<R: RngCore> Backoff<R> {
    pub(crate) fn new(policy: &RetryPolicy, rng: R) -> Self {
        Self {
            current_ms: policy.initial_backoff.as_secs_f64() * 1000.0,
            max_ms: policy.max_backoff.as_secs_f64() * 1000.0,
            multiplier: policy.backoff_multiplier,
            jitter_fraction: policy.jitter_fraction,
            rng,
        }
    }

    /// Delay before the next attempt. Jitter scales with the uncapped backoff.
    pub(crate) fn next_delay(&mut self) -> Duration {
        let current = self.current_ms;
        let spread = (unit_interval(&mut self.rng) * 2.0 - 1.0) * self.jitter_fraction * current;
        let delay_ms = (current.min(self.max_ms) + spread).max(0.0);
        self.current_ms = (current * self.multiplier).min(self.max_ms);
        Duration::from_nanos((delay_ms * 1_000_000.0).round() as u64)
    }
}

/// Uniform sample in [0, 1) from the top 53 bits of one `u64`.
fn unit_interval<R: RngCore>(rng: &mut R) -> f64 {
    (rng.next_u64() >> 11) as f64 / (1u64 << 53) as f64
}

#[derive(Clone, Debug, Default)]
pub struct RetryOrchestrator {
    policy: RetryPolicy,
}

impl RetryOrchestrator {
    pub fn new(policy: RetryPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Runs `attempt(index)` for index 1, 2, ... until it succeeds or the
    /// policy gives up. A failure surfaces wrapped with the attempt count.
    pub async fn execute<T, F, Fut>(&self, operation: &str, attempt: F) -> Result<T, ApiError>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, ApiError>>,
    {
        self.execute_with_rng(operation, attempt, OsRng).await
    }

    pub(crate) async fn execute_with_rng<T, F, Fut, R>(
        &self,
        operation: &str,
        mut attempt: F,
        rng: R,
    ) -> Result<T, ApiError>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, ApiError>>,
        R: RngCore,
    {
        let mut backoff = Backoff::new(&self.policy, rng);
        let mut attempts = 0u32;
        loop {
            let failure = match attempt(attempts + 1).await {
                Ok(value) => return Ok(value),
                Err(failure) => failure,
            };
            attempts += 1;

            if !self.policy.should_retry(&failure, attempts) {
                if attempts > 1 {
                    log::warn!(
                        "retry({operation}): giving up after {attempts} attempt(s): {failure}"
                    );
                }
                return Err(ApiError::after_attempts(operation, attempts, failure));
            }

            let delay = backoff.next_delay();
            log::debug!(
                "retry({operation}): attempt {attempts} failed with {}, retrying in {}ms",
                failure.status_code(),
                delay.as_millis()
            );
            tokio::time::sleep(delay).await;
        }
    }

    /// Completion-style form of [`RetryOrchestrator::execute`].
    pub fn execute_with_callback<T, F, Fut, C>(
        &self,
        operation: impl Into<String>,
        attempt: F,
        callback: C,
    ) -> JoinHandle<()>
    where
        T: Send + 'static,
        F: FnMut(u32) -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, ApiError>> + Send + 'static,
        C: FnOnce(Option<ApiError>, Option<T>) + Send + 'static,
    {
        let orchestrator = self.clone();
        let operation = operation.into();
        spawn_with_callback(
            async move { orchestrator.execute(&operation, attempt).await },
            callback,
        )
    }
}

/// Spawns `future` and hands its outcome to `callback` exactly once, as
/// `(Some(error), None)` or `(None, Some(value))`.
pub fn spawn_with_callback<T, Fut, C>(future: Fut, callback: C) -> JoinHandle<()>
where
    T: Send + 'static,
    Fut: Future<Output = Result<T, ApiError>> + Send + 'static,
    C: FnOnce(Option<ApiError>, Option<T>) + Send + 'static,
{
    tokio::spawn(async move {
        match future.await {
            Ok(value) => callback(None, Some(value)),
            Err(error) => callback(Some(error), None),
        }
    })
}
