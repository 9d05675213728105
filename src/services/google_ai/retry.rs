use backoff::backoff::Backoff;
use rand::Rng;
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use super::errors::{GenerationError, RetryError, Retryable};

#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    /// Base delay before the first retry; doubled (by `multiplier`) each attempt.
    pub base_delay: Duration,
    pub multiplier: f64,
    /// Upper bound (exclusive) of the uniform jitter added to every delay.
    pub max_jitter: Duration,
    /// Cap on the exponential part of the delay.
    pub max_delay: Duration,
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_millis(1000),
            multiplier: 2.0,
            max_jitter: Duration::from_millis(1000),
            max_delay: Duration::from_secs(60),
            jitter: true,
        }
    }
}

impl RetryConfig {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            ..Default::default()
        }
    }

    pub fn with_base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }

    pub fn with_max_jitter(mut self, jitter: Duration) -> Self {
        self.max_jitter = jitter;
        self
    }

    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    pub fn without_jitter(mut self) -> Self {
        self.jitter = false;
        self
    }

    pub fn validate(&self) -> Result<(), GenerationError> {
        if self.max_attempts == 0 {
            return Err(GenerationError::ConfigurationError {
                message: "max_attempts must be at least 1".to_string(),
            });
        }

        if !self.multiplier.is_finite() || self.multiplier < 1.0 {
            return Err(GenerationError::ConfigurationError {
                message: format!("Invalid backoff multiplier: {}", self.multiplier),
            });
        }

        Ok(())
    }
}

/// Exponential backoff with additive full jitter:
/// `base * multiplier^n + uniform(0..max_jitter)`.
///
/// Unlike `backoff::ExponentialBackoff`, whose randomization scales the
/// interval, the jitter here is a fixed-width window on top of the base.
/// Yields one delay per retry, `max_attempts - 1` in total, then `None`.
#[derive(Debug, Clone)]
pub struct JitteredBackoff {
    max_retries: u32,
    base_delay: Duration,
    multiplier: f64,
    max_jitter: Duration,
    max_delay: Duration,
    jitter: bool,
    attempt: u32,
}

impl JitteredBackoff {
    pub fn new(config: &RetryConfig) -> Self {
        Self {
            max_retries: config.max_attempts.saturating_sub(1),
            base_delay: config.base_delay,
            multiplier: config.multiplier,
            max_jitter: config.max_jitter,
            max_delay: config.max_delay,
            jitter: config.jitter,
            attempt: 0,
        }
    }

    /// Delay without jitter for the given zero-based attempt index.
    pub fn base_delay_for(&self, attempt: u32) -> Duration {
        let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
        let secs = self.base_delay.as_secs_f64() * self.multiplier.powi(exponent);
        let capped = secs.min(self.max_delay.as_secs_f64());
        if capped.is_finite() && capped >= 0.0 {
            Duration::from_secs_f64(capped)
        } else {
            self.max_delay
        }
    }

    fn sample_jitter(&self) -> Duration {
        let window_ms = self.max_jitter.as_millis() as u64;
        if !self.jitter || window_ms == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(rand::thread_rng().gen_range(0..window_ms))
    }
}

impl Backoff for JitteredBackoff {
    fn reset(&mut self) {
        self.attempt = 0;
    }

    fn next_backoff(&mut self) -> Option<Duration> {
        if self.attempt >= self.max_retries {
            return None;
        }
        let delay = self.base_delay_for(self.attempt) + self.sample_jitter();
        self.attempt = self.attempt.saturating_add(1);
        Some(delay)
    }
}

/// Per-call attempt bookkeeping. Never shared between calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryState {
    pub attempt_index: u32,
    pub max_attempts: u32,
}

impl RetryState {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            attempt_index: 0,
            max_attempts,
        }
    }

    fn advance(&mut self) {
        self.attempt_index += 1;
    }
}

pub struct RetryHandler {
    backoff: JitteredBackoff,
    state: RetryState,
    waits: Vec<Duration>,
}

impl RetryHandler {
    pub fn new(config: RetryConfig) -> Self {
        let backoff = JitteredBackoff::new(&config);
        let state = RetryState::new(config.max_attempts.max(1));

        Self {
            backoff,
            state,
            waits: Vec::new(),
        }
    }

    /// Runs `operation` until it succeeds, fails with a non-retryable error,
    /// runs out of attempts, or `cancel` fires.
    ///
    /// Waits between attempts use `tokio::time::sleep`, so only the calling
    /// task is suspended.
    pub async fn retry<F, Fut, T, E>(
        &mut self,
        mut operation: F,
        cancel: Option<&CancellationToken>,
    ) -> Result<T, RetryError<E>>
    where
        F: FnMut(RetryState) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Retryable + std::error::Error + 'static,
    {
        loop {
            let state = self.state;

            let outcome = match cancel {
                Some(token) => tokio::select! {
                    biased;
                    _ = token.cancelled() => return Err(RetryError::Cancelled),
                    outcome = operation(state) => outcome,
                },
                None => operation(state).await,
            };

            let error = match outcome {
                Ok(value) => return Ok(value),
                Err(error) => error,
            };

            if !error.is_retryable() {
                return Err(RetryError::NonRetryable { source: error });
            }

            let Some(delay) = self.backoff.next_backoff() else {
                return Err(RetryError::Exhausted {
                    attempts: state.attempt_index + 1,
                    last: error,
                });
            };

            tracing::warn!(
                attempt = state.attempt_index,
                max_attempts = state.max_attempts,
                delay_ms = delay.as_millis() as u64,
                error = %error,
                "Attempt failed with retryable error, backing off"
            );

            self.waits.push(delay);
            match cancel {
                Some(token) => tokio::select! {
                    biased;
                    _ = token.cancelled() => return Err(RetryError::Cancelled),
                    _ = tokio::time::sleep(delay) => {}
                },
                None => tokio::time::sleep(delay).await,
            }

            self.state.advance();
        }
    }

    /// Number of attempts started so far.
    pub fn attempts(&self) -> u32 {
        self.state.attempt_index + 1
    }

    /// Delays slept between attempts, in order.
    pub fn waits(&self) -> &[Duration] {
        &self.waits
    }
}
