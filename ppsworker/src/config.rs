//! Application configuration management.
//!
//! This module handles loading and merging configuration from multiple sources
//! with a clear precedence order. Configuration can come from default values,
//! configuration files, and environment variables.

use crate::{Cli, RetryPolicy, Scheduler, impls::SimulatorConfig};
use pps_report::{CsvLayout, IanaZone};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where and how reports are written.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ReportConfig {
    /// The directory report files are written into (created if absent)
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// The IANA identifier of the zone that defines the local day
    #[serde(default = "default_time_zone")]
    pub time_zone: String,

    /// The column separator of the report files
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("reports")
}

fn default_time_zone() -> String {
    "Europe/London".to_owned()
}

fn default_delimiter() -> char {
    ','
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            time_zone: default_time_zone(),
            delimiter: default_delimiter(),
        }
    }
}

impl ReportConfig {
    /// The CSV layout these settings describe.
    pub fn layout(&self) -> CsvLayout {
        CsvLayout {
            delimiter: self.delimiter,
        }
    }
}

/// The main application configuration that composes all component configs
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct AppConfig {
    /// Report output configuration (directory, zone, delimiter)
    #[serde(default)]
    pub report: ReportConfig,

    /// Report scheduling configuration
    #[serde(default)]
    pub schedule: Scheduler,

    /// Trade fetch retry configuration
    #[serde(default)]
    pub retry: RetryPolicy,

    /// Simulated trade source configuration
    #[serde(default)]
    pub source: SimulatorConfig,
}

impl AppConfig {
    /// Load configuration from multiple sources with precedence:
    /// 1. Environment variables (highest priority)
    /// 2. Config file given by the CLI
    /// 3. Default values (lowest priority)
    ///
    /// Environment variables are mapped using the pattern:
    /// `APP_<SECTION>__<KEY>` maps to `<section>.<key>`
    ///
    /// # Examples
    ///
    /// ```bash
    /// # Write reports somewhere else
    /// export APP_REPORT__OUTPUT_DIR="/var/reports"
    ///
    /// # Report against a different local day
    /// export APP_REPORT__TIME_ZONE="America/New_York"
    ///
    /// # Set scheduling interval
    /// export APP_SCHEDULE__EVERY="5m"
    /// ```
    pub fn load(cli: &Cli) -> anyhow::Result<Self> {
        let mut config = config::Config::builder();

        // Start with default values
        config = config.add_source(config::Config::try_from(&Self::default())?);

        // Layer on config file if it is specified and exists
        if let Some(path) = &cli.config {
            if path.exists() {
                config = config.add_source(config::File::from(path.as_path()))
            } else {
                return Err(anyhow::anyhow!(
                    "Config file {} does not exist",
                    path.display()
                ));
            }
        }

        // Override with environment variables
        // This maps APP_REPORT__OUTPUT_DIR to report.output_dir
        config = config.add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let built_config = config.build()?;
        built_config.try_deserialize().map_err(Into::into)
    }

    /// Check the configuration before any report runs, resolving the zone.
    ///
    /// Every failure here is fatal: an unknown zone, a zero interval, a
    /// backoff multiplier that does not grow, an out-of-range failure rate, or
    /// an output directory that cannot be created.
    pub fn validate(&self) -> anyhow::Result<IanaZone> {
        let zone = IanaZone::from_name(&self.report.time_zone)?;

        if self.schedule.every.is_zero() {
            anyhow::bail!("schedule.every must be greater than zero");
        }
        if self.retry.multiplier < 2 {
            anyhow::bail!(
                "retry.multiplier must be at least 2, got {}",
                self.retry.multiplier
            );
        }
        if !(0.0..=1.0).contains(&self.source.failure_rate) {
            anyhow::bail!(
                "source.failure_rate must be within [0, 1], got {}",
                self.source.failure_rate
            );
        }
        if self.source.max_trades == 0 {
            anyhow::bail!("source.max_trades must be at least 1");
        }

        // create the directory and prove we can write into it
        let dir = &self.report.output_dir;
        let probe = dir.join(".ppsworker-probe");
        std::fs::create_dir_all(dir)
            .and_then(|_| std::fs::write(&probe, b""))
            .and_then(|_| std::fs::remove_file(&probe))
            .map_err(|e| anyhow::anyhow!("output directory {} is not usable: {e}", dir.display()))?;

        Ok(zone)
    }
}
