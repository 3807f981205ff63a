use super::{PERIODS_PER_DAY, SettlementPeriod};
use time::Date;

/// A single trade: an ordered collection of settlement periods for one
/// reporting date.
///
/// Trades are produced by a [`TradeSource`](crate::ports::TradeSource) and
/// consumed once by aggregation.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Trade {
    /// The reporting date the trade applies to.
    pub date: Date,
    /// The settlement periods of the trade, normally 24 of them.
    pub periods: Vec<SettlementPeriod>,
}

impl Trade {
    /// Create a trade with a full day of zero-volume periods.
    pub fn new(date: Date) -> Self {
        Self::from_volumes(date, [0.0; PERIODS_PER_DAY])
    }

    /// Create a trade whose period `i + 1` carries `volumes[i]`.
    pub fn from_volumes(date: Date, volumes: impl IntoIterator<Item = f64>) -> Self {
        let periods = volumes
            .into_iter()
            .zip(1..)
            .map(|(volume, index)| SettlementPeriod::new(index, volume))
            .collect();
        Self { date, periods }
    }

    /// The sum of all period volumes, including any out-of-range periods.
    pub fn total_volume(&self) -> f64 {
        self.periods.iter().map(|p| p.volume).sum()
    }
}
