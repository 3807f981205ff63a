//! A single report generation: fetch, aggregate, render, write.

use crate::fetch::{FetchError, ResilientFetcher};
use pps_core::ports::{TradeSource, ZoneRules};
use pps_report::{Renderer, ReportWriter, WriteError, aggregate};
use std::path::PathBuf;
use time::{OffsetDateTime, PrimitiveDateTime};
use tokio_util::sync::CancellationToken;
use tracing::{Level, event};

/// The ways a report run can end without a report file.
#[derive(Debug, thiserror::Error)]
pub enum JobError<E> {
    /// Cancellation was observed; nothing was written.
    #[error("report run cancelled")]
    Cancelled,

    /// The trades could not be fetched.
    #[error(transparent)]
    Fetch(FetchError<E>),

    /// The report could not be written.
    #[error(transparent)]
    Write(#[from] WriteError),
}

impl<E> JobError<E> {
    /// Whether the run ended because of cancellation.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled | Self::Fetch(FetchError::Cancelled))
    }
}

impl<E> From<FetchError<E>> for JobError<E> {
    fn from(value: FetchError<E>) -> Self {
        match value {
            FetchError::Cancelled => Self::Cancelled,
            other => Self::Fetch(other),
        }
    }
}

/// The report pipeline for one configured zone and output directory.
pub struct ReportJob<S, Z> {
    fetcher: ResilientFetcher<S>,
    renderer: Renderer<Z>,
    writer: ReportWriter,
}

impl<S: TradeSource + Sync, Z: ZoneRules> ReportJob<S, Z> {
    /// Assemble a job from its stages.
    pub fn new(fetcher: ResilientFetcher<S>, renderer: Renderer<Z>, writer: ReportWriter) -> Self {
        Self {
            fetcher,
            renderer,
            writer,
        }
    }

    /// Generate the report for the local calendar day containing `now`.
    ///
    /// The report date and file name both derive from `now` converted into
    /// the configured zone. Returns the path of the written report.
    ///
    /// Cancellation is checked once more before writing. Once the write has
    /// started it runs to completion, so a run either produces a whole report
    /// or no file at all.
    pub async fn run(
        &self,
        now: OffsetDateTime,
        cancel: &CancellationToken,
    ) -> Result<PathBuf, JobError<S::Error>> {
        let local = self.renderer.zone().to_local(now);
        let date = local.date();
        event!(Level::INFO, %date, zone = self.renderer.zone().name(), "generating report");

        let trades = self.fetcher.fetch(date, cancel).await?;
        let volumes = aggregate(&trades);
        let report = self.renderer.render(date, &volumes);

        let local_now = PrimitiveDateTime::new(local.date(), local.time());
        if cancel.is_cancelled() {
            return Err(JobError::Cancelled);
        }
        Ok(self.writer.write(local_now, &report).await?)
    }
}
