#![warn(missing_docs)]
#![doc = include_str!("../README.md")]

pub mod impls;

mod fetch;
pub use fetch::{FetchError, ResilientFetcher, RetryPolicy, RetryState};

mod job;
pub use job::{JobError, ReportJob};

mod schedule;
pub use schedule::{ScheduleError, Scheduler};

mod cli;
pub use cli::Cli;

mod config;
pub use config::{AppConfig, ReportConfig};
