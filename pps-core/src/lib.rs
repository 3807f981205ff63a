#![warn(missing_docs)]
#![doc = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/README.md"))]

/// Core domain models for power position reporting.
///
/// This module contains the data structures that flow through a single report
/// generation: the settlement periods and trades returned by a trade source,
/// the aggregated per-period volumes, and the rendered report rows.
///
/// The models are plain data with minimal behavior, keeping the domain
/// separate from the adapters that fetch trades or write files.
pub mod models;

/// Interface traits for power position reporting.
///
/// This module contains the "ports" of the system: narrow capabilities for
/// fetching trades and classifying local clock times against a time zone.
/// Keeping these as traits allows the pipeline to be exercised against fakes
/// without any real external call.
pub mod ports;
