//! CSV and JSON export of normalized activities

use crate::render::render_notifications;
use crate::state::FeedState;
use lms_core::{Error, Result};
use lms_types::NormalizedActivity;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::info;

/// Export file format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum ExportFormat {
    /// Comma-separated values with a header row
    #[default]
    Csv,
    /// Pretty-printed JSON array
    Json,
}

/// Column names of the CSV export, in [`CsvRow`] field order
pub const CSV_HEADER: [&str; 10] = [
    "id",
    "source",
    "occurred_at",
    "actor",
    "action_kind",
    "severity",
    "subject",
    "description",
    "relative_time",
    "date_bucket",
];

/// Flat CSV row
#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    id: &'a str,
    source: &'a str,
    occurred_at: String,
    actor: &'a str,
    action_kind: &'a str,
    severity: &'a str,
    subject: &'a str,
    description: &'a str,
    relative_time: &'a str,
    date_bucket: &'a str,
}

impl<'a> From<&'a NormalizedActivity> for CsvRow<'a> {
    fn from(activity: &'a NormalizedActivity) -> Self {
        Self {
            id: &activity.id,
            source: activity.source.as_str(),
            occurred_at: activity.occurred_at.to_rfc3339(),
            actor: &activity.actor,
            action_kind: activity.action_kind.as_str(),
            severity: activity.severity.as_str(),
            subject: &activity.subject_label,
            description: &activity.description,
            relative_time: &activity.relative_time,
            date_bucket: &activity.date_bucket,
        }
    }
}

/// Write activities as CSV with a header row
///
/// The header is written even when `activities` is empty.
///
/// # Errors
///
/// Returns [`Error::Export`] if a row cannot be written.
pub fn write_csv<W: Write>(writer: W, activities: &[NormalizedActivity]) -> Result<()> {
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    csv_writer
        .write_record(CSV_HEADER)
        .map_err(|e| Error::Export(format!("Failed to write CSV header: {e}")))?;
    for activity in activities {
        csv_writer
            .serialize(CsvRow::from(activity))
            .map_err(|e| Error::Export(format!("Failed to write CSV row: {e}")))?;
    }
    csv_writer
        .flush()
        .map_err(|e| Error::Export(format!("Failed to flush CSV output: {e}")))?;
    Ok(())
}

/// Write activities as a pretty-printed JSON array
///
/// # Errors
///
/// Returns [`Error::Serialization`] if serialization fails.
pub fn write_json<W: Write>(writer: W, activities: &[NormalizedActivity]) -> Result<()> {
    serde_json::to_writer_pretty(writer, activities)?;
    Ok(())
}

/// Write activities in `format` to `writer`
///
/// # Errors
///
/// See [`write_csv`] and [`write_json`].
pub fn write_activities<W: Write>(
    writer: W,
    format: ExportFormat,
    activities: &[NormalizedActivity],
) -> Result<()> {
    match format {
        ExportFormat::Csv => write_csv(writer, activities),
        ExportFormat::Json => write_json(writer, activities),
    }
}

/// Export the visible part of a page
///
/// Activities go to `out`; pending notifications go to `notices` so a
/// partial load never corrupts the exported data.
///
/// # Errors
///
/// Returns [`Error::Io`] if the notices cannot be written, otherwise as
/// [`write_activities`].
pub fn export_page<W: Write, N: Write>(
    state: &FeedState,
    format: ExportFormat,
    out: W,
    notices: N,
) -> Result<()> {
    write_notices(notices, state)?;
    write_activities(out, format, &state.visible())
}

/// Write the page's pending notifications, if any
///
/// # Errors
///
/// Returns [`Error::Io`] if writing fails.
pub fn write_notices<N: Write>(mut notices: N, state: &FeedState) -> Result<()> {
    if state.notifications().is_empty() {
        return Ok(());
    }
    notices.write_all(render_notifications(state.notifications()).as_bytes())?;
    notices.flush()?;
    Ok(())
}

/// Write activities to a new file at `path`
///
/// # Errors
///
/// Returns [`Error::Io`] if the file cannot be created, otherwise as
/// [`write_activities`].
pub fn export_to_path(
    path: &Path,
    format: ExportFormat,
    activities: &[NormalizedActivity],
) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_activities(&mut writer, format, activities)?;
    writer.flush()?;

    info!(path = %path.display(), records = activities.len(), "Exported activities");
    Ok(())
}
