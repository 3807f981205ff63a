/// The number of fixed settlement periods in a trading day.
pub const PERIODS_PER_DAY: usize = 24;

/// The index of the first settlement period (23:00 of the previous day).
pub const FIRST_PERIOD: i32 = 1;

/// The index of the last settlement period (22:00 of the reporting day).
pub const LAST_PERIOD: i32 = PERIODS_PER_DAY as i32;

/// One of the 24 fixed market settlement slots of a trading day.
///
/// Period 1 always stands for local clock hour 23:00 of the *previous*
/// calendar day, and period `p >= 2` for local clock hour `p - 2`. The
/// mapping does not depend on the date; only its rendering does.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SettlementPeriod {
    /// The 1-based period index. Values outside `1..=24` are tolerated here
    /// and dropped during aggregation.
    pub index: i32,
    /// The traded volume for this period.
    pub volume: f64,
}

impl SettlementPeriod {
    /// Create a settlement period.
    pub fn new(index: i32, volume: f64) -> Self {
        Self { index, volume }
    }

    /// The zero-based slot this period occupies, if it is in range.
    pub fn slot(&self) -> Option<usize> {
        if (FIRST_PERIOD..=LAST_PERIOD).contains(&self.index) {
            Some((self.index - FIRST_PERIOD) as usize)
        } else {
            None
        }
    }

    /// The nominal local clock hour for a period index, together with a flag
    /// that is true when the hour belongs to the previous calendar day.
    ///
    /// Returns `None` for an index outside `1..=24`.
    pub fn nominal_hour(index: i32) -> Option<(u8, bool)> {
        match index {
            FIRST_PERIOD => Some((23, true)),
            2..=LAST_PERIOD => Some(((index - 2) as u8, false)),
            _ => None,
        }
    }
}
