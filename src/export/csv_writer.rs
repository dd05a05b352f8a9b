// src/export/csv_writer.rs
//! RFC 4180 CSV encoding of uniform records and the download flow around it

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use csv::{QuoteStyle, Terminator, WriterBuilder};
use tracing::info;

use super::sink::{ArtifactSink, HandleGuard};
use crate::types::record::{field_names, field_to_string};
use crate::types::Record;

pub const CSV_MEDIA_TYPE: &str = "text/csv;charset=utf-8";

/// Encode records as CSV text.
///
/// The header comes from the first record only; later rows are written against it,
/// so missing fields render empty and extra fields are dropped.
/// Returns `None` for an empty input, there is nothing meaningful to export.
pub fn to_csv(records: &[Record]) -> Result<Option<String>> {
    let Some(first) = records.first() else {
        return Ok(None);
    };

    let headers = field_names(first);

    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Necessary)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer
        .write_record(&headers)
        .context("Failed to write CSV header")?;

    for (index, record) in records.iter().enumerate() {
        let row: Vec<String> = headers
            .iter()
            .map(|header| field_to_string(record.get(header)))
            .collect();
        writer
            .write_record(&row)
            .with_context(|| format!("Failed to write CSV row {}", index + 1))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Failed to flush CSV writer: {}", e.error()))?;
    let mut text = String::from_utf8(bytes).context("CSV output is not valid UTF-8")?;

    // rows are joined, not terminated
    if text.ends_with('\n') {
        text.pop();
    }

    Ok(Some(text))
}

/// `{base}_{YYYY-MM-DDTHH-MM-SS}.csv` for the given instant
pub fn csv_filename_at(base_filename: &str, at: DateTime<Utc>) -> String {
    format!("{}_{}.csv", base_filename, at.format("%Y-%m-%dT%H-%M-%S"))
}

/// Filename stamped with the current time; never cached between exports
pub fn csv_filename(base_filename: &str) -> String {
    csv_filename_at(base_filename, Utc::now())
}

/// Hand CSV text to the sink under a timestamped filename.
///
/// A temporary handle is held for the duration of the save and released on
/// every exit path. Returns the filename used.
pub fn trigger_download<S: ArtifactSink + ?Sized>(
    sink: &S,
    csv_text: &str,
    base_filename: &str,
) -> Result<String> {
    let filename = csv_filename(base_filename);
    let bytes = csv_text.as_bytes();

    let handle = sink
        .create_temporary_handle(bytes, CSV_MEDIA_TYPE)
        .context("Failed to create temporary download handle")?;
    let _guard = HandleGuard::new(sink, handle);

    let saved = sink
        .save(bytes, &filename)
        .with_context(|| format!("Failed to save {}", filename))?;

    info!("CSV export saved to {}", saved.display());
    Ok(filename)
}

/// Encode and download in one step. `Ok(None)` when there are no records.
pub fn export_csv<S: ArtifactSink + ?Sized>(
    sink: &S,
    records: &[Record],
    base_filename: &str,
) -> Result<Option<String>> {
    match to_csv(records)? {
        Some(text) => trigger_download(sink, &text, base_filename).map(Some),
        None => {
            info!("No records to export for {}, skipping download", base_filename);
            Ok(None)
        }
    }
}
