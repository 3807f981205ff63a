use pps_core::models::{Annotation, RenderedRow, ReportDocument};
use std::{
    fmt::Write as _,
    path::{Path, PathBuf},
};
use time::PrimitiveDateTime;
use tracing::{Level, event};

/// The column header of every report.
const HEADER: [&str; 2] = ["Local Time", "Volume"];

/// How report rows are laid out as delimited text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CsvLayout {
    /// The column separator.
    pub delimiter: char,
}

impl Default for CsvLayout {
    fn default() -> Self {
        Self { delimiter: ',' }
    }
}

impl CsvLayout {
    /// Serialize a report: the header line, then one line per row.
    ///
    /// The daylight occurrence of a repeated hour carries its marker in the
    /// time column (`01:00 (DST),1.5`), while the carried-forward row carries
    /// it after the volume (`23:59,100 (Carried forward)`).
    pub fn format(&self, report: &ReportDocument) -> String {
        let d = self.delimiter;
        let mut out = format!("{}{d}{}\n", HEADER[0], HEADER[1]);
        for row in &report.rows {
            self.format_row(&mut out, row);
        }
        out
    }

    fn format_row(&self, out: &mut String, row: &RenderedRow) {
        let d = self.delimiter;
        let RenderedRow {
            label,
            volume,
            annotation,
        } = row;
        // writing into a String cannot fail
        let _ = match annotation {
            None => writeln!(out, "{label}{d}{volume}"),
            Some(a @ Annotation::Daylight) => writeln!(out, "{label} {a}{d}{volume}"),
            Some(a @ Annotation::CarriedForward) => writeln!(out, "{label}{d}{volume} {a}"),
        };
    }
}

/// The report file name for a run at the given local time, at minute
/// resolution: `PowerPosition_YYYYMMDD_HHmm.csv`.
pub fn report_file_name(local: PrimitiveDateTime) -> String {
    format!(
        "PowerPosition_{:04}{:02}{:02}_{:02}{:02}.csv",
        local.year(),
        u8::from(local.month()),
        local.day(),
        local.hour(),
        local.minute(),
    )
}

/// Errors writing a report file.
#[derive(Debug, thiserror::Error)]
pub enum WriteError {
    /// An I/O failure on the given path.
    #[error("failed to write report to {}", path.display())]
    Io {
        /// The path being written
        path: PathBuf,
        /// The underlying failure
        #[source]
        source: std::io::Error,
    },
}

/// Writes rendered reports into an output directory, one file per run.
#[derive(Debug, Clone)]
pub struct ReportWriter {
    output_dir: PathBuf,
    layout: CsvLayout,
}

impl ReportWriter {
    /// Create a writer targeting `output_dir`. The directory is created on
    /// first write if it does not exist.
    pub fn new(output_dir: impl Into<PathBuf>, layout: CsvLayout) -> Self {
        Self {
            output_dir: output_dir.into(),
            layout,
        }
    }

    /// Write `report` under the name derived from `local_now`, returning the
    /// path of the file.
    ///
    /// The content is written to a temporary sibling first and renamed into
    /// place. If either step fails the temporary file is removed, so a failed
    /// write leaves no partial report behind. Callers must let the returned
    /// future run to completion for that to hold.
    pub async fn write(
        &self,
        local_now: PrimitiveDateTime,
        report: &ReportDocument,
    ) -> Result<PathBuf, WriteError> {
        let path = self.output_dir.join(report_file_name(local_now));
        let staging = path.with_extension("csv.partial");
        let contents = self.layout.format(report);

        let io = |path: &Path| {
            let path = path.to_owned();
            move |source| WriteError::Io { path, source }
        };

        tokio::fs::create_dir_all(&self.output_dir)
            .await
            .map_err(io(&self.output_dir))?;

        let staged = async {
            tokio::fs::write(&staging, contents)
                .await
                .map_err(io(&staging))?;
            tokio::fs::rename(&staging, &path).await.map_err(io(&path))
        }
        .await;
        if let Err(error) = staged {
            discard(&staging).await;
            return Err(error);
        }

        event!(Level::INFO, path = %path.display(), rows = report.len(), "report written");
        Ok(path)
    }
}

async fn discard(staging: &Path) {
    match tokio::fs::remove_file(staging).await {
        Ok(()) => {}
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => {}
        Err(error) => {
            event!(Level::WARN, path = %staging.display(), %error, "failed to remove staged report");
        }
    }
}
