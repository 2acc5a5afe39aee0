use std::path::{Path, PathBuf};

use caption_core::Snapshot;
use serde::Serialize;

use crate::persist::{AtomicFileWriter, PersistError};

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("report path {0:?} has no file name")]
    InvalidPath(PathBuf),
    #[error("could not serialize report: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("persist error: {0}")]
    Persist(#[from] PersistError),
}

#[derive(Debug, Serialize)]
struct RunReport<'a> {
    finished_utc: &'a str,
    percent: f64,
    #[serde(flatten)]
    snapshot: &'a Snapshot,
}

/// Writes the final snapshot as pretty JSON to `path`, atomically.
pub fn write_run_report(
    path: &Path,
    snapshot: &Snapshot,
    finished_utc: &str,
) -> Result<PathBuf, ReportError> {
    let filename = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| ReportError::InvalidPath(path.to_path_buf()))?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };

    let report = RunReport {
        finished_utc,
        percent: snapshot.percent(),
        snapshot,
    };
    let content = serde_json::to_string_pretty(&report)?;
    Ok(AtomicFileWriter::new(dir).write(filename, &content)?)
}
