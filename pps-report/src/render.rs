use pps_core::{
    models::{
        AggregatedVolumes, Annotation, PERIODS_PER_DAY, RenderedRow, ReportDocument,
        SettlementPeriod,
    },
    ports::{LocalTime, ZoneRules},
};
use time::{Date, Duration, PrimitiveDateTime, Time};
use tracing::{Level, event};

/// Label of the synthetic row holding volume no later hour absorbed.
const CARRIED_FORWARD_LABEL: &str = "23:59";

/// Round a volume to 2 decimal places, ties to even.
pub fn round_volume(volume: f64) -> f64 {
    (volume * 100.0).round_ties_even() / 100.0
}

/// Renders aggregated settlement volumes onto the local clock hours of a
/// specific calendar date.
///
/// The fixed 24 settlement periods map onto 23, 24, or 25 local clock hours
/// depending on the daylight saving transitions of the date:
///
/// * a period whose hour is skipped by a spring-forward transition emits no
///   row; its volume is carried into the next normal hour, or into a trailing
///   `23:59 (Carried forward)` row if no such hour follows;
/// * a period whose hour is repeated by a fall-back transition is split evenly
///   across the repeating offsets in chronological order: the daylight-time
///   row first, labelled `(DST)`, then the standard-time row;
/// * any other period emits one row with its own volume plus anything carried.
///
/// Volumes are rounded once, when a row is emitted.
#[derive(Debug, Clone)]
pub struct Renderer<Z> {
    zone: Z,
}

impl<Z: ZoneRules> Renderer<Z> {
    /// Create a renderer for the given zone rules.
    pub fn new(zone: Z) -> Self {
        Self { zone }
    }

    /// The zone rules this renderer classifies against.
    pub fn zone(&self) -> &Z {
        &self.zone
    }

    /// Render the report for `date`.
    pub fn render(&self, date: Date, volumes: &AggregatedVolumes) -> ReportDocument {
        let mut rows = Vec::with_capacity(PERIODS_PER_DAY + 2);
        let mut carried = 0.0;

        for (index, volume) in volumes.iter() {
            let Some(timestamp) = nominal_timestamp(date, index) else {
                continue;
            };
            let label = hour_label(timestamp.time());

            match self.zone.classify(timestamp) {
                LocalTime::Skipped => {
                    event!(Level::DEBUG, period = index, %label, "carrying volume of skipped hour");
                    carried += volume;
                }
                LocalTime::Ambiguous(offsets) if !offsets.is_empty() => {
                    event!(Level::DEBUG, period = index, %label, offsets = offsets.len(), "splitting volume of repeated hour");
                    let share = round_volume(volume / offsets.len() as f64);
                    // offsets are ascending; the largest occurs first on the clock
                    for _ in 1..offsets.len() {
                        rows.push(RenderedRow::annotated(
                            label.clone(),
                            share,
                            Annotation::Daylight,
                        ));
                    }
                    rows.push(RenderedRow::plain(label.clone(), share));
                }
                LocalTime::Valid(_) | LocalTime::Ambiguous(_) => {
                    rows.push(RenderedRow::plain(label, round_volume(volume + carried)));
                    carried = 0.0;
                }
            }
        }

        if carried != 0.0 {
            event!(Level::DEBUG, volume = carried, "no hour absorbed carried volume");
            rows.push(RenderedRow::annotated(
                CARRIED_FORWARD_LABEL,
                round_volume(carried),
                Annotation::CarriedForward,
            ));
        }

        ReportDocument { date, rows }
    }
}

/// The local wall-clock time a settlement period nominally starts at on the
/// given reporting date. Period 1 falls on the previous day.
fn nominal_timestamp(date: Date, index: i32) -> Option<PrimitiveDateTime> {
    let (hour, previous_day) = SettlementPeriod::nominal_hour(index)?;
    let day = if previous_day {
        date.previous_day().unwrap_or(date)
    } else {
        date
    };
    let time = Time::MIDNIGHT + Duration::hours(hour.into());
    Some(PrimitiveDateTime::new(day, time))
}

fn hour_label(time: Time) -> String {
    format!("{:02}:{:02}", time.hour(), time.minute())
}
