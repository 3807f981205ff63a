use super::{PERIODS_PER_DAY, SettlementPeriod};

/// Per-period volume totals for a trading day.
///
/// Slot `i` holds the total for settlement period `i + 1`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AggregatedVolumes([f64; PERIODS_PER_DAY]);

impl Default for AggregatedVolumes {
    fn default() -> Self {
        Self([0.0; PERIODS_PER_DAY])
    }
}

impl AggregatedVolumes {
    /// Add a period's volume into its slot. Periods outside `1..=24` are
    /// skipped and `false` is returned.
    pub fn add(&mut self, period: &SettlementPeriod) -> bool {
        match period.slot() {
            Some(slot) => {
                self.0[slot] += period.volume;
                true
            }
            None => false,
        }
    }

    /// The total for a 1-based period index, or `None` when out of range.
    pub fn period(&self, index: i32) -> Option<f64> {
        SettlementPeriod::new(index, 0.0)
            .slot()
            .map(|slot| self.0[slot])
    }

    /// The sum across all periods.
    pub fn total(&self) -> f64 {
        self.0.iter().sum()
    }

    /// Iterate over `(period index, volume)` pairs in period order.
    pub fn iter(&self) -> impl Iterator<Item = (i32, f64)> + '_ {
        self.0.iter().copied().zip(1..).map(|(v, p)| (p, v))
    }
}

impl From<[f64; PERIODS_PER_DAY]> for AggregatedVolumes {
    fn from(value: [f64; PERIODS_PER_DAY]) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_respects_bounds() {
        let mut volumes = AggregatedVolumes::default();
        assert!(volumes.add(&SettlementPeriod::new(3, 2.0)));
        assert!(!volumes.add(&SettlementPeriod::new(25, 7.0)));
        assert_eq!(volumes.period(3), Some(2.0));
        assert_eq!(volumes.period(25), None);
        assert_eq!(volumes.total(), 2.0);
    }
}
