//! Resilient retrieval of trades from the external trading system.
//!
//! Every failure of the trade source is treated as retryable. Retries back off
//! exponentially and stop after a bounded number of attempts, at which point
//! the last error is surfaced. Cancellation is observed before every attempt,
//! during the call itself, and during every backoff sleep.

use pps_core::{models::Trade, ports::TradeSource};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use time::Date;
use tokio_util::sync::CancellationToken;
use tracing::{Level, event};

/// Bounds on retrying a failed trade fetch.
///
/// `max_retries` counts the retries made *after* the initial attempt, so an
/// exhausted fetch has called the source `max_retries + 1` times. The delay
/// before retry `n` (1-based) is `initial_delay * multiplier^(n - 1)`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// How long to wait before the first retry
    #[serde(with = "humantime_serde", default = "default_initial_delay")]
    pub initial_delay: Duration,

    /// How many times to retry after the initial attempt
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// The factor each successive delay grows by
    #[serde(default = "default_multiplier")]
    pub multiplier: u32,
}

fn default_initial_delay() -> Duration {
    Duration::from_millis(100)
}

fn default_max_retries() -> u32 {
    5
}

fn default_multiplier() -> u32 {
    2
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            initial_delay: default_initial_delay(),
            max_retries: default_max_retries(),
            multiplier: default_multiplier(),
        }
    }
}

/// Progress through a single fetch: which attempt is being made and how long
/// to wait if it fails.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryState {
    attempt: u32,
    next_delay: Duration,
}

impl RetryState {
    /// The state before the initial attempt.
    pub fn new(policy: &RetryPolicy) -> Self {
        Self {
            attempt: 1,
            next_delay: policy.initial_delay,
        }
    }

    /// The 1-based number of the attempt being made.
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Record a failure of the current attempt.
    ///
    /// Returns the delay to wait before retrying, or `None` once the policy
    /// allows no further retries.
    pub fn fail(&mut self, policy: &RetryPolicy) -> Option<Duration> {
        if self.attempt > policy.max_retries {
            return None;
        }
        let delay = self.next_delay;
        self.attempt += 1;
        self.next_delay = delay.saturating_mul(policy.multiplier);
        Some(delay)
    }
}

/// The ways a resilient fetch can end without trades.
#[derive(Debug, thiserror::Error)]
pub enum FetchError<E> {
    /// Cancellation was observed before the fetch could complete.
    #[error("trade fetch cancelled")]
    Cancelled,

    /// Every allowed attempt failed; carries the last failure.
    #[error("failed to fetch trades after {attempts} attempts")]
    Exhausted {
        /// How many times the source was called
        attempts: u32,
        /// The failure of the final attempt
        #[source]
        source: E,
    },
}

/// Wraps a [`TradeSource`] with bounded exponential-backoff retry.
#[derive(Debug, Clone)]
pub struct ResilientFetcher<S> {
    source: S,
    policy: RetryPolicy,
}

impl<S: TradeSource + Sync> ResilientFetcher<S> {
    /// Wrap `source` with the given retry policy.
    pub fn new(source: S, policy: RetryPolicy) -> Self {
        Self { source, policy }
    }

    /// Fetch the trades for `date`, retrying failures until the policy is
    /// exhausted or `cancel` fires.
    ///
    /// Cancellation takes precedence over everything else: a token that is
    /// already cancelled yields [`FetchError::Cancelled`] without calling the
    /// source, and a cancellation racing a completed call wins.
    pub async fn fetch(
        &self,
        date: Date,
        cancel: &CancellationToken,
    ) -> Result<Vec<Trade>, FetchError<S::Error>> {
        let mut state = RetryState::new(&self.policy);

        loop {
            if cancel.is_cancelled() {
                return Err(FetchError::Cancelled);
            }

            let result = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(FetchError::Cancelled),
                result = self.source.get_trades(date) => result,
            };

            let error = match result {
                Ok(trades) => {
                    event!(Level::DEBUG, %date, trades = trades.len(), attempt = state.attempt(), "fetched trades");
                    return Ok(trades);
                }
                Err(error) => error,
            };

            if cancel.is_cancelled() {
                return Err(FetchError::Cancelled);
            }

            let attempt = state.attempt();
            let Some(delay) = state.fail(&self.policy) else {
                event!(
                    Level::ERROR,
                    %date,
                    attempts = attempt,
                    error = %error,
                    "failed to fetch trades after {attempt} attempts",
                );
                return Err(FetchError::Exhausted {
                    attempts: attempt,
                    source: error,
                });
            };

            event!(
                Level::WARN,
                attempt,
                max_retries = self.policy.max_retries,
                delay_ms = delay.as_millis() as u64,
                error = %error,
                "retry attempt {attempt}/{}",
                self.policy.max_retries,
            );

            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(FetchError::Cancelled),
                _ = tokio::time::sleep(delay) => {}
            }
        }
    }
}
