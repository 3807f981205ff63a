use time::Date;

/// Extra marking attached to a rendered row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Annotation {
    /// The daylight-time occurrence of a clock hour repeated by a fall-back
    /// transition.
    Daylight,
    /// A synthetic row holding volume from skipped hours that no later hour
    /// of the day absorbed.
    CarriedForward,
}

impl Annotation {
    /// The text printed alongside the row.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Daylight => "(DST)",
            Self::CarriedForward => "(Carried forward)",
        }
    }
}

impl std::fmt::Display for Annotation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of a power position report.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RenderedRow {
    /// The local clock label, formatted `HH:mm`.
    pub label: String,
    /// The volume, already rounded to 2 decimal places.
    pub volume: f64,
    /// Set for the daylight occurrence of a repeated hour, or for the
    /// carried-forward row.
    pub annotation: Option<Annotation>,
}

impl RenderedRow {
    /// A row without annotation.
    pub fn plain(label: impl Into<String>, volume: f64) -> Self {
        Self {
            label: label.into(),
            volume,
            annotation: None,
        }
    }

    /// A row with the given annotation.
    pub fn annotated(label: impl Into<String>, volume: f64, annotation: Annotation) -> Self {
        Self {
            label: label.into(),
            volume,
            annotation: Some(annotation),
        }
    }
}

/// The rendered report for one local calendar date.
///
/// Holds 23, 24, or 25 hour rows depending on whether the date is a
/// spring-forward, normal, or fall-back day, plus at most one trailing
/// carried-forward row.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReportDocument {
    /// The local calendar date the report describes.
    pub date: Date,
    /// The rows, in chronological local order starting at 23:00 of the
    /// previous day.
    pub rows: Vec<RenderedRow>,
}

impl ReportDocument {
    /// The sum of every emitted row volume.
    pub fn total_volume(&self) -> f64 {
        self.rows.iter().map(|row| row.volume).sum()
    }

    /// The rows whose label equals `label`.
    pub fn rows_labelled<'a>(&'a self, label: &'a str) -> impl Iterator<Item = &'a RenderedRow> {
        self.rows.iter().filter(move |row| row.label == label)
    }

    /// The number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the report has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
