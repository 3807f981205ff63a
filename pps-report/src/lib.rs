#![warn(missing_docs)]
#![doc = include_str!("../README.md")]

/**
 * Reduction of trades into per-period volume totals.
 */
mod aggregate;
pub use aggregate::aggregate;

/**
 * Mapping of settlement periods onto local clock hours.
 */
mod render;
pub use render::{Renderer, round_volume};

/**
 * Serialization of rendered reports and report file output.
 */
mod csv;
pub use csv::{CsvLayout, ReportWriter, WriteError, report_file_name};

/**
 * IANA time zone rules.
 */
mod zone;
pub use zone::{IanaZone, ZoneError};
