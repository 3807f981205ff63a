use pps_core::ports::ZoneRules as _;
use ppsworker::{AppConfig, Cli, ReportJob, ResilientFetcher, impls::SimulatedTradeSource};
use pps_report::{Renderer, ReportWriter};
use time::{OffsetDateTime, format_description::well_known::Rfc3339};
use tokio_util::sync::CancellationToken;
use tracing::{Level, event};
use tracing_subscriber::{layer::SubscriberExt as _, util::SubscriberInitExt as _};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // By convention, we leverage `tracing` to instrument and log various
    // operations throughout this project.
    // Accordingly, we subscribe to these events so we can write them to stdio.
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Parse CLI args and load the layered configuration
    let cli = Cli::import()?;
    let config = AppConfig::load(&cli)?;

    // Configuration problems are fatal before any report is attempted
    let zone = config.validate()?;

    let utc_now = OffsetDateTime::now_utc();
    event!(
        Level::INFO,
        interval = ?config.schedule.every,
        utc = %utc_now.format(&Rfc3339)?,
        zone = zone.name(),
        local = %zone.to_local(utc_now).format(&Rfc3339)?,
        output_dir = %config.report.output_dir.display(),
        "starting power position worker",
    );

    let AppConfig {
        report,
        schedule,
        retry,
        source,
    } = config;

    let job = ReportJob::new(
        ResilientFetcher::new(SimulatedTradeSource::new(source), retry),
        Renderer::new(zone),
        ReportWriter::new(report.output_dir.clone(), report.layout()),
    );

    // A single token threads through every wait, retry, and fetch
    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    event!(Level::INFO, "shutdown requested");
                    cancel.cancel();
                }
                Err(error) => event!(Level::WARN, %error, "unable to listen for shutdown signal"),
            }
        });
    }

    if cli.once {
        return match job.run(OffsetDateTime::now_utc(), &cancel).await {
            Ok(_) => Ok(()),
            Err(e) if e.is_cancelled() => {
                event!(Level::INFO, "report run cancelled");
                Ok(())
            }
            Err(e) => Err(e.into()),
        };
    }

    schedule
        .schedule(&cancel, async |now| job.run(now, &cancel).await)
        .await?;

    Ok(())
}
