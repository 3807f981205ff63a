//! A simulated trading system.
//!
//! The real trading system is an external service. This module provides a
//! stand-in with the same contract: for any date it returns a handful of
//! 24-period trades, and now and then it fails.

use pps_core::{
    models::{PERIODS_PER_DAY, Trade},
    ports::TradeSource,
};
use rand::{Rng as _, SeedableRng as _, rngs::StdRng};
use serde::{Deserialize, Serialize};
use std::{sync::Mutex, time::Duration};
use time::Date;

/// Configuration for the simulated trade source.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SimulatorConfig {
    /// The probability that a call fails
    #[serde(default = "default_failure_rate")]
    pub failure_rate: f64,

    /// The largest number of trades returned by one call
    #[serde(default = "default_max_trades")]
    pub max_trades: usize,

    /// How long each call takes
    #[serde(with = "humantime_serde", default)]
    pub latency: Duration,

    /// A fixed seed for reproducible output (random if omitted)
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_failure_rate() -> f64 {
    0.1
}

fn default_max_trades() -> usize {
    5
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            failure_rate: default_failure_rate(),
            max_trades: default_max_trades(),
            latency: Duration::ZERO,
            seed: None,
        }
    }
}

/// The failure reported by the simulated trading system.
#[derive(Debug, thiserror::Error)]
#[error("trading system unavailable for {date}")]
pub struct SourceError {
    date: Date,
}

/// A [`TradeSource`] producing random trades and random failures.
pub struct SimulatedTradeSource {
    config: SimulatorConfig,
    rng: Mutex<StdRng>,
}

impl SimulatedTradeSource {
    /// Create a simulated source from its configuration.
    pub fn new(config: SimulatorConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            config,
            rng: Mutex::new(rng),
        }
    }

    fn generate(&self, date: Date) -> Result<Vec<Trade>, SourceError> {
        // a poisoned lock only means another call panicked mid-draw
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());

        if rng.random_bool(self.config.failure_rate.clamp(0.0, 1.0)) {
            return Err(SourceError { date });
        }

        let count = rng.random_range(1..=self.config.max_trades.max(1));
        let trades = (0..count)
            .map(|_| {
                let volumes: Vec<f64> = (0..PERIODS_PER_DAY)
                    .map(|_| (rng.random_range(-100.0..200.0_f64) * 100.0).round() / 100.0)
                    .collect();
                Trade::from_volumes(date, volumes)
            })
            .collect();
        Ok(trades)
    }
}

impl TradeSource for SimulatedTradeSource {
    type Error = SourceError;

    fn get_trades(&self, date: Date) -> impl Future<Output = Result<Vec<Trade>, Self::Error>> + Send {
        let result = self.generate(date);
        let latency = self.config.latency;
        async move {
            if !latency.is_zero() {
                tokio::time::sleep(latency).await;
            }
            result
        }
    }
}
