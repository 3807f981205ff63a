use pps_core::models::{AggregatedVolumes, Trade};

/// Reduce a set of trades into the 24 per-period volume totals.
///
/// Periods whose index falls outside `1..=24` are skipped. The result does
/// not depend on the order of the trades or of their periods beyond the usual
/// floating point summation order.
pub fn aggregate<'a>(trades: impl IntoIterator<Item = &'a Trade>) -> AggregatedVolumes {
    let mut volumes = AggregatedVolumes::default();
    for trade in trades {
        for period in &trade.periods {
            if !volumes.add(period) {
                tracing::trace!(index = period.index, "dropping out-of-range period");
            }
        }
    }
    volumes
}
