#![allow(dead_code)]

use pps_core::{models::Trade, ports::TradeSource};
use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::Duration,
};
use time::Date;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::{
    Layer,
    layer::{Context, SubscriberExt as _},
};

/// The distinct failures a trade source can report.
#[derive(Debug, Clone, thiserror::Error)]
pub enum FakeError {
    #[error("io failure")]
    Io,
    #[error("network failure")]
    Network,
    #[error("service failure")]
    Service,
}

/// A trade source that fails a fixed number of times, then succeeds.
pub struct ScriptedSource {
    failures: usize,
    trades: Vec<Trade>,
    calls: Mutex<Vec<(Date, Instant)>>,
}

impl ScriptedSource {
    pub fn new(failures: usize, trades: Vec<Trade>) -> Self {
        Self {
            failures,
            trades,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn always_failing() -> Self {
        Self::new(usize::MAX, Vec::new())
    }

    pub fn calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn dates(&self) -> Vec<Date> {
        self.calls.lock().unwrap().iter().map(|(d, _)| *d).collect()
    }

    /// The time between consecutive calls.
    pub fn gaps(&self) -> Vec<Duration> {
        let calls = self.calls.lock().unwrap();
        calls.windows(2).map(|w| w[1].1 - w[0].1).collect()
    }
}

impl TradeSource for ScriptedSource {
    type Error = FakeError;

    fn get_trades(&self, date: Date) -> impl Future<Output = Result<Vec<Trade>, Self::Error>> + Send {
        let result = {
            let mut calls = self.calls.lock().unwrap();
            let n = calls.len();
            calls.push((date, Instant::now()));
            if n < self.failures {
                Err([FakeError::Io, FakeError::Network, FakeError::Service][n % 3].clone())
            } else {
                Ok(self.trades.clone())
            }
        };
        async move { result }
    }
}

/// A trade source whose calls never complete.
pub struct HangingSource;

impl TradeSource for HangingSource {
    type Error = FakeError;

    fn get_trades(&self, _date: Date) -> impl Future<Output = Result<Vec<Trade>, Self::Error>> + Send {
        std::future::pending()
    }
}

/// Counts tracing events by level.
#[derive(Clone, Default)]
pub struct EventCounts(Arc<Mutex<HashMap<Level, usize>>>);

impl EventCounts {
    /// Install as the subscriber for the current thread.
    pub fn install(&self) -> tracing::subscriber::DefaultGuard {
        tracing::subscriber::set_default(tracing_subscriber::registry().with(self.clone()))
    }

    pub fn count(&self, level: Level) -> usize {
        self.0.lock().unwrap().get(&level).copied().unwrap_or(0)
    }
}

impl<S: Subscriber> Layer<S> for EventCounts {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        *self
            .0
            .lock()
            .unwrap()
            .entry(*event.metadata().level())
            .or_default() += 1;
    }
}

/// A trade source that fires a cancellation token during its call, then
/// returns its trades anyway.
pub struct CancellingSource {
    pub cancel: CancellationToken,
    pub trades: Vec<Trade>,
}

impl TradeSource for CancellingSource {
    type Error = FakeError;

    fn get_trades(&self, _date: Date) -> impl Future<Output = Result<Vec<Trade>, Self::Error>> + Send {
        let cancel = self.cancel.clone();
        let trades = self.trades.clone();
        async move {
            cancel.cancel();
            Ok(trades)
        }
    }
}
