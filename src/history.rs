// Run history: one CSV row per run, appended under the destination folder.

use anyhow::{Context, Result};
use chrono::{Local, NaiveDateTime};
use serde::{Serialize, Serializer};
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use tracing::debug;

pub const LOG_DIR_NAME: &str = "icloud_year_selector_logs";
pub const LOG_FILE_NAME: &str = "run_history.csv";

/// One line of `run_history.csv`. Field order is column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunRecord {
    pub timestamp: String,
    pub range: String,
    pub command: String,
    #[serde(serialize_with = "title_case_bool")]
    pub dry_run: bool,
}

impl RunRecord {
    pub fn new(
        at: NaiveDateTime,
        range: impl ToString,
        command: impl ToString,
        dry_run: bool,
    ) -> Self {
        RunRecord {
            timestamp: format_timestamp(at),
            range: range.to_string(),
            command: command.to_string(),
            dry_run,
        }
    }
}

/// Local wall-clock time, the moment a run starts.
pub fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

/// ISO-8601 without offset, microsecond precision.
pub fn format_timestamp(at: NaiveDateTime) -> String {
    at.format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
}

// Older logs spell booleans `True`/`False`; keep new rows consistent.
fn title_case_bool<S: Serializer>(value: &bool, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(if *value { "True" } else { "False" })
}

/// `<dest>/icloud_year_selector_logs/run_history.csv`
pub fn log_path(dest: &Path) -> PathBuf {
    dest.join(LOG_DIR_NAME).join(LOG_FILE_NAME)
}

/// Append `record` to the run log under `dest`, writing the header first
/// when the file is new. Returns the log path.
pub fn append(dest: &Path, record: &RunRecord) -> Result<PathBuf> {
    let path = log_path(dest);
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
    }

    let is_new = !path.exists();
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open run log {}", path.display()))?;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(is_new)
        .from_writer(file);
    writer
        .serialize(record)
        .with_context(|| format!("Failed to write run log {}", path.display()))?;
    writer.flush().context("Failed to flush run log")?;

    debug!(path = %path.display(), new_file = is_new, "run recorded");
    Ok(path)
}
