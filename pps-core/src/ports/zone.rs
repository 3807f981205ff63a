use time::{OffsetDateTime, PrimitiveDateTime, UtcOffset};

/// How a wall-clock time resolves in a time zone on a particular date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocalTime {
    /// The time occurs exactly once, at the given offset.
    Valid(UtcOffset),
    /// The time does not occur: clocks jump over it (spring-forward).
    Skipped,
    /// The time occurs more than once (fall-back). The offsets are distinct
    /// and sorted from smallest to largest.
    Ambiguous(Vec<UtcOffset>),
}

/// Capability for classifying local clock times against a time zone's
/// transition rules.
pub trait ZoneRules {
    /// The zone identifier, such as `Europe/London`.
    fn name(&self) -> &str;

    /// Classify a local wall-clock time.
    fn classify(&self, local: PrimitiveDateTime) -> LocalTime;

    /// The offset in force at the given instant.
    fn offset_at(&self, instant: OffsetDateTime) -> UtcOffset;

    /// Convert an instant into local wall-clock time.
    fn to_local(&self, instant: OffsetDateTime) -> OffsetDateTime {
        instant.to_offset(self.offset_at(instant))
    }
}

impl<T: ZoneRules + ?Sized> ZoneRules for &T {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn classify(&self, local: PrimitiveDateTime) -> LocalTime {
        (**self).classify(local)
    }

    fn offset_at(&self, instant: OffsetDateTime) -> UtcOffset {
        (**self).offset_at(instant)
    }
}
