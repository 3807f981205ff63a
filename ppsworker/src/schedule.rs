//! Scheduler for running periodic report generation.
//!
//! This module drives the report cadence: one run immediately on start, then one
//! run per configured interval until cancelled. Runs never overlap; the next
//! tick is only awaited once the previous run has returned.

use serde::{Deserialize, Serialize};
use std::{fmt::Display, time::Duration};
use time::{OffsetDateTime, format_description::well_known::Rfc3339};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument as _, Level, event, span};

/// Configuration for scheduling periodic report runs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Scheduler {
    /// How often to generate a report
    #[serde(with = "humantime_serde", default = "default_every")]
    pub every: Duration,
}

fn default_every() -> Duration {
    Duration::from_secs(60)
}

impl Default for Scheduler {
    fn default() -> Self {
        Self {
            every: default_every(),
        }
    }
}

/// Errors that prevent the schedule from starting.
#[derive(Debug, thiserror::Error)]
pub enum ScheduleError {
    /// A zero interval would spin without waiting.
    #[error("schedule interval must be greater than zero")]
    ZeroInterval,
}

impl Scheduler {
    /// Execute a function now and then at every interval until `cancel` fires.
    ///
    /// Each call receives the UTC time it was started at. A call returning an
    /// error is logged and the schedule carries on with the next tick. If
    /// `cancel` fires during a call, the schedule ends once that call returns
    /// and its outcome is not reported as an error.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use std::time::Duration;
    /// use tokio_util::sync::CancellationToken;
    /// use ppsworker::Scheduler;
    ///
    /// # tokio_test::block_on(async {
    /// let scheduler = Scheduler {
    ///     every: Duration::from_secs(60),
    /// };
    /// let cancel = CancellationToken::new();
    ///
    /// scheduler
    ///     .schedule(&cancel, async |timestamp| {
    ///         println!("Generating report at {}", timestamp);
    ///         Ok::<(), String>(())
    ///     })
    ///     .await
    ///     .unwrap();
    /// # })
    /// ```
    pub async fn schedule<T, E: Display>(
        &self,
        cancel: &CancellationToken,
        f: impl AsyncFn(OffsetDateTime) -> Result<T, E>,
    ) -> Result<(), ScheduleError> {
        if self.every.is_zero() {
            return Err(ScheduleError::ZeroInterval);
        }

        // the first tick completes immediately
        let mut interval = tokio::time::interval(self.every);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = interval.tick() => {}
            }

            let now = OffsetDateTime::now_utc();
            let run_time = now.format(&Rfc3339).unwrap_or_else(|_| now.to_string());
            let span = span!(Level::INFO, "scheduled report run", %run_time);
            let outcome = f(now).instrument(span).await;

            if cancel.is_cancelled() {
                break;
            }
            if let Err(error) = outcome {
                event!(Level::ERROR, %error, %run_time, "unexpected error during report run");
            }
        }

        event!(Level::INFO, "scheduler stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{
        fmt::Write as _,
        sync::{
            Arc, Mutex,
            atomic::{AtomicBool, AtomicUsize, Ordering},
        },
    };
    use tokio::time::Instant;
    use tracing::{Event, Subscriber, field::Field};
    use tracing_subscriber::{
        Layer,
        layer::{Context, SubscriberExt as _},
    };

    /// Collects the messages of ERROR events.
    #[derive(Clone, Default)]
    struct Errors(Arc<Mutex<Vec<String>>>);

    struct Message(String);

    impl tracing::field::Visit for Message {
        fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
            if field.name() == "message" {
                let _ = write!(self.0, "{value:?}");
            }
        }
    }

    impl<S: Subscriber> Layer<S> for Errors {
        fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
            if *event.metadata().level() == Level::ERROR {
                let mut message = Message(String::new());
                event.record(&mut message);
                self.0.lock().unwrap().push(message.0);
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn runs_immediately_then_every_interval() {
        let scheduler = Scheduler {
            every: Duration::from_secs(60),
        };
        let cancel = CancellationToken::new();
        let started = Instant::now();
        let runs = Mutex::new(Vec::new());

        scheduler
            .schedule(&cancel, async |_| {
                let mut runs = runs.lock().unwrap();
                runs.push(started.elapsed());
                if runs.len() == 3 {
                    cancel.cancel();
                }
                Ok::<_, String>(())
            })
            .await
            .unwrap();

        assert_eq!(
            *runs.lock().unwrap(),
            vec![
                Duration::ZERO,
                Duration::from_secs(60),
                Duration::from_secs(120)
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn runs_never_overlap_and_errors_do_not_stop_the_schedule() {
        let scheduler = Scheduler {
            every: Duration::from_secs(10),
        };
        let cancel = CancellationToken::new();
        let busy = AtomicBool::new(false);
        let runs = Mutex::new(0);
        let errors = Errors::default();
        let _guard =
            tracing::subscriber::set_default(tracing_subscriber::registry().with(errors.clone()));

        scheduler
            .schedule(&cancel, async |_| {
                assert!(!busy.swap(true, Ordering::SeqCst), "runs overlapped");
                // a run slower than the interval
                tokio::time::sleep(Duration::from_secs(25)).await;
                busy.store(false, Ordering::SeqCst);

                let count = {
                    let mut runs = runs.lock().unwrap();
                    *runs += 1;
                    *runs
                };
                if count == 4 {
                    cancel.cancel();
                }
                Err::<(), _>(format!("run {count} failed"))
            })
            .await
            .unwrap();

        assert_eq!(*runs.lock().unwrap(), 4);
        // the run that observed cancellation is not reported
        assert_eq!(
            *errors.0.lock().unwrap(),
            vec!["unexpected error during report run"; 3]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_interrupts_the_wait_for_the_next_tick() {
        let scheduler = Scheduler {
            every: Duration::from_secs(60),
        };
        let cancel = CancellationToken::new();
        let started = Instant::now();
        let runs = AtomicUsize::new(0);

        let canceller = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(30)).await;
            canceller.cancel();
        });

        scheduler
            .schedule(&cancel, async |_| {
                runs.fetch_add(1, Ordering::SeqCst);
                Ok::<_, String>(())
            })
            .await
            .unwrap();

        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert_eq!(started.elapsed(), Duration::from_secs(30));
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_before_start_runs_nothing() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let called = AtomicBool::new(false);

        Scheduler::default()
            .schedule(&cancel, async |_| {
                called.store(true, Ordering::SeqCst);
                Ok::<_, String>(())
            })
            .await
            .unwrap();

        assert!(!called.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn zero_interval_is_rejected() {
        let scheduler = Scheduler {
            every: Duration::ZERO,
        };
        let result = scheduler
            .schedule(&CancellationToken::new(), async |_| Ok::<_, String>(()))
            .await;
        assert!(matches!(result, Err(ScheduleError::ZeroInterval)));
    }
}
