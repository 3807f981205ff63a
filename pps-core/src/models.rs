mod period;
mod report;
mod trade;
mod volumes;

pub use period::{FIRST_PERIOD, LAST_PERIOD, PERIODS_PER_DAY, SettlementPeriod};
pub use report::{Annotation, RenderedRow, ReportDocument};
pub use trade::Trade;
pub use volumes::AggregatedVolumes;
