use crate::error::ExportError;
use crate::github::issues::RawIssue;
use crate::transform::NormalizedIssue;
use chrono::{DateTime, TimeZone};
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// Invocation timestamp used in output file names, e.g. `20240301093000`
pub fn timestamp<Tz: TimeZone>(now: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    now.format("%Y%m%d%H%M%S").to_string()
}

/// Paths of the three report files of one run
#[derive(Debug, Clone, PartialEq)]
pub struct OutputFiles {
    pub csv: PathBuf,
    pub json: PathBuf,
    pub raw_json: PathBuf,
}

impl OutputFiles {
    pub fn new(dir: &Path, timestamp: &str) -> Self {
        OutputFiles {
            csv: dir.join(format!("data_{timestamp}.csv")),
            json: dir.join(format!("data_{timestamp}.json")),
            raw_json: dir.join(format!("issues-full_{timestamp}.json")),
        }
    }
}

/// Writes the normalized records as CSV and JSON and the raw filtered records as
/// JSON, creating `dir` if needed
pub fn write_outputs(
    dir: &Path,
    timestamp: &str,
    issues: &[NormalizedIssue],
    raw: &[RawIssue],
) -> Result<OutputFiles, ExportError> {
    fs::create_dir_all(dir).map_err(|source| ExportError::OutputFailed {
        path: dir.to_path_buf(),
        source,
    })?;

    let files = OutputFiles::new(dir, timestamp);
    write_file(&files.csv, |w| write_csv(w, issues))?;
    info!(path = %files.csv.display(), count = issues.len(), "Saved issues");
    write_file(&files.json, |w| write_json(w, issues))?;
    info!(path = %files.json.display(), count = issues.len(), "Saved issues");
    write_file(&files.raw_json, |w| write_json(w, raw))?;
    info!(path = %files.raw_json.display(), count = raw.len(), "Saved issues");

    Ok(files)
}

fn write_file<F>(path: &Path, write: F) -> Result<(), ExportError>
where
    F: FnOnce(&mut BufWriter<File>) -> std::io::Result<()>,
{
    let failed = |source| ExportError::OutputFailed {
        path: path.to_path_buf(),
        source,
    };
    let mut writer = BufWriter::new(File::create(path).map_err(failed)?);
    write(&mut writer).map_err(failed)?;
    writer.flush().map_err(failed)
}

/// Header row plus one row per issue, every field quoted.
///
/// Nothing is written for an empty slice.
pub fn write_csv<W: Write>(writer: &mut W, issues: &[NormalizedIssue]) -> std::io::Result<()> {
    if issues.is_empty() {
        return Ok(());
    }
    write_csv_row(writer, NormalizedIssue::FIELD_NAMES.iter().copied())?;
    for issue in issues {
        let values = issue.values();
        write_csv_row(writer, values.iter().map(String::as_str))?;
    }
    Ok(())
}

fn write_csv_row<'a, W, I>(writer: &mut W, fields: I) -> std::io::Result<()>
where
    W: Write,
    I: Iterator<Item = &'a str>,
{
    let row = fields.map(quote_field).collect::<Vec<_>>().join(",");
    write!(writer, "{row}\r\n")
}

fn quote_field(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

/// Compact JSON array
pub fn write_json<W: Write, T: Serialize>(writer: &mut W, records: &[T]) -> std::io::Result<()> {
    serde_json::to_writer(writer, records).map_err(std::io::Error::from)
}
