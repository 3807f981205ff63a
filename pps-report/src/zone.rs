use pps_core::ports::{LocalTime, ZoneRules};
use time::{OffsetDateTime, PrimitiveDateTime, UtcOffset};
use time_tz::{Offset as _, OffsetResult, PrimitiveDateTimeExt as _, TimeZone as _, Tz, timezones};

/// Zone rules taken from the bundled IANA time zone database.
///
/// # Examples
///
/// ```
/// use pps_report::IanaZone;
///
/// let london = IanaZone::from_name("Europe/London").unwrap();
/// assert!(IanaZone::from_name("Mars/Olympus_Mons").is_err());
/// ```
#[derive(Clone, Copy)]
pub struct IanaZone {
    tz: &'static Tz,
}

/// Errors resolving a zone identifier.
#[derive(Debug, thiserror::Error)]
pub enum ZoneError {
    /// The identifier is not in the IANA database.
    #[error("unknown time zone identifier: {0}")]
    Unknown(String),
}

impl IanaZone {
    /// Resolve an IANA zone identifier such as `Europe/London`.
    pub fn from_name(name: &str) -> Result<Self, ZoneError> {
        timezones::get_by_name(name)
            .map(|tz| Self { tz })
            .ok_or_else(|| ZoneError::Unknown(name.to_owned()))
    }
}

impl std::fmt::Debug for IanaZone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("IanaZone").field(&self.tz.name()).finish()
    }
}

impl std::str::FromStr for IanaZone {
    type Err = ZoneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s)
    }
}

impl ZoneRules for IanaZone {
    fn name(&self) -> &str {
        self.tz.name()
    }

    fn classify(&self, local: PrimitiveDateTime) -> LocalTime {
        match local.assume_timezone(self.tz) {
            OffsetResult::Some(resolved) => LocalTime::Valid(resolved.offset()),
            OffsetResult::Ambiguous(first, second) => {
                let mut offsets = vec![first.offset(), second.offset()];
                offsets.sort();
                offsets.dedup();
                if offsets.len() == 1 {
                    LocalTime::Valid(offsets[0])
                } else {
                    LocalTime::Ambiguous(offsets)
                }
            }
            OffsetResult::None => LocalTime::Skipped,
        }
    }

    fn offset_at(&self, instant: OffsetDateTime) -> UtcOffset {
        self.tz.get_offset_utc(&instant).to_utc()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::{datetime, offset};

    #[test]
    fn classifies_london_transitions() {
        let london = IanaZone::from_name("Europe/London").unwrap();

        assert_eq!(
            london.classify(datetime!(2025-01-15 01:00)),
            LocalTime::Valid(offset!(UTC))
        );
        assert_eq!(
            london.classify(datetime!(2025-06-15 01:00)),
            LocalTime::Valid(offset!(+1))
        );
        assert_eq!(
            london.classify(datetime!(2025-03-30 01:00)),
            LocalTime::Skipped
        );
        assert_eq!(
            london.classify(datetime!(2025-10-26 01:00)),
            LocalTime::Ambiguous(vec![offset!(UTC), offset!(+1)])
        );
        assert_eq!(
            london.classify(datetime!(2025-10-26 02:00)),
            LocalTime::Valid(offset!(UTC))
        );
    }

    #[test]
    fn converts_instants_to_local_time() {
        let london = IanaZone::from_name("Europe/London").unwrap();
        let local = london.to_local(datetime!(2025-06-15 09:30 UTC));
        assert_eq!(local.offset(), offset!(+1));
        assert_eq!(local.hour(), 10);
    }

    #[test]
    fn rejects_unknown_identifiers() {
        assert!(matches!(
            "Not/AZone".parse::<IanaZone>(),
            Err(ZoneError::Unknown(name)) if name == "Not/AZone"
        ));
    }
}
