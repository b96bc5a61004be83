//! Append-only history of stored snapshots.

use crate::ResultsResult;
use chrono::NaiveDateTime;
use hv_sim::{OperatingSnapshot, Value};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// `<prefix>_yymmdd_HHMM.txt`, stamped with the process start time.
pub fn history_file_name(prefix: &str, started: NaiveDateTime) -> String {
    format!("{}{}.txt", prefix, started.format("_%y%m%d_%H%M"))
}

/// `YYYY.MM.DD HH:MM;key=value;...` with floats to three decimals.
pub fn format_history_line(at: NaiveDateTime, snap: &OperatingSnapshot) -> String {
    let mut line = at.format("%Y.%m.%d %H:%M").to_string();
    for (key, value) in snap.entries() {
        match value {
            Value::Bool(_) => line.push_str(&format!(";{key}={value}")),
            Value::Float(v) => line.push_str(&format!(";{key}={v:.3}")),
        }
    }
    line.push('\n');
    line
}

#[derive(Debug, Clone)]
pub struct HistoryLog {
    path: PathBuf,
}

impl HistoryLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Log file in `dir` named after `prefix` and the start stamp.
    pub fn stamped(dir: &Path, prefix: &str, started: NaiveDateTime) -> Self {
        Self::new(dir.join(history_file_name(prefix, started)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, at: NaiveDateTime, snap: &OperatingSnapshot) -> ResultsResult<()> {
        if let Some(dir) = self.path.parent()
            && !dir.as_os_str().is_empty()
        {
            fs::create_dir_all(dir)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(format_history_line(at, snap).as_bytes())?;
        Ok(())
    }
}
