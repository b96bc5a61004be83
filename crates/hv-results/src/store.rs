//! Snapshot file storage.
//!
//! One `key=value` pair per line. Booleans are written as `True`/`False`,
//! everything else as a float.

use crate::{ResultsError, ResultsResult};
use hv_sim::{OperatingSnapshot, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Key written by older tooling; never loaded.
const IGNORED_KEY: &str = "error";

/// Outcome of reading a snapshot file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub applied: usize,
    pub unknown: Vec<String>,
    pub malformed: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recovery {
    /// An existing file was merged into the snapshot.
    Loaded(LoadReport),
    /// No file existed; the given snapshot was written as the new baseline.
    Bootstrapped,
}

/// Merge `content` into `snap`. Never fails; bad lines are reported.
pub fn parse_snapshot(content: &str, snap: &mut OperatingSnapshot) -> LoadReport {
    let mut report = LoadReport::default();
    for line in content.lines() {
        let line = line.trim_end();
        if line.is_empty() {
            continue;
        }
        let Some((key, raw)) = line.split_once('=') else {
            warn!(line, "snapshot line without '=', skipped");
            report.malformed.push(line.to_string());
            continue;
        };
        if key == IGNORED_KEY {
            continue;
        }
        let value = match raw {
            "True" => Value::Bool(true),
            "False" => Value::Bool(false),
            _ => match raw.trim().parse::<f64>() {
                Ok(v) => Value::Float(v),
                Err(_) => {
                    warn!(key, value = raw, "unparsable snapshot value, skipped");
                    report.malformed.push(key.to_string());
                    continue;
                }
            },
        };
        match snap.set(key, value) {
            Ok(()) => report.applied += 1,
            Err(_) => {
                debug!(key, "unknown snapshot key ignored");
                report.unknown.push(key.to_string());
            }
        }
    }
    report
}

pub fn format_snapshot(snap: &OperatingSnapshot) -> String {
    let mut out = String::new();
    for (key, value) in snap.entries() {
        out.push_str(key);
        out.push('=');
        out.push_str(&value.to_string());
        out.push('\n');
    }
    out
}

#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Merge the stored snapshot into `snap`.
    pub fn load_into(&self, snap: &mut OperatingSnapshot) -> ResultsResult<LoadReport> {
        let content = fs::read_to_string(&self.path)?;
        Ok(parse_snapshot(&content, snap))
    }

    /// Load into `snap` if the file exists, otherwise write `snap` as the
    /// initial file.
    pub fn recover(&self, snap: &mut OperatingSnapshot) -> ResultsResult<Recovery> {
        if self.exists() {
            let report = self.load_into(snap)?;
            info!(
                path = %self.path.display(),
                applied = report.applied,
                "snapshot recovered"
            );
            return Ok(Recovery::Loaded(report));
        }
        self.save(snap)?;
        info!(path = %self.path.display(), "no snapshot found, bootstrapped defaults");
        Ok(Recovery::Bootstrapped)
    }

    /// Overwrite the file. Written to a sibling temp file first and renamed
    /// so a crash never leaves a truncated snapshot.
    pub fn save(&self, snap: &OperatingSnapshot) -> ResultsResult<()> {
        let file_name = self
            .path
            .file_name()
            .ok_or_else(|| ResultsError::InvalidPath {
                message: format!("{} has no file name", self.path.display()),
            })?;
        if let Some(dir) = self.path.parent()
            && !dir.as_os_str().is_empty()
        {
            fs::create_dir_all(dir)?;
        }
        let mut tmp_name = file_name.to_os_string();
        tmp_name.push(".tmp");
        let tmp = self.path.with_file_name(tmp_name);
        fs::write(&tmp, format_snapshot(snap))?;
        fs::rename(&tmp, &self.path)?;
        debug!(path = %self.path.display(), "snapshot stored");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_booleans_floats_and_skips_noise() {
        let content = "temp=-3.5\ndamp_cmd=False\nerror=0\nbogus=1\nair_q=abc\nnot a pair\n\nflow_su=1600\n";
        let mut snap = OperatingSnapshot::default();
        let report = parse_snapshot(content, &mut snap);
        assert_eq!(report.applied, 3);
        assert_eq!(report.unknown, vec!["bogus".to_string()]);
        assert_eq!(report.malformed.len(), 2);
        assert_eq!(snap.temp, -3.5);
        assert!(!snap.damp_cmd);
        assert_eq!(snap.flow_su, 1600.0);
        assert_eq!(snap.air_q, 456.0);
    }

    #[test]
    fn formats_every_key() {
        let text = format_snapshot(&OperatingSnapshot::default());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), OperatingSnapshot::KEYS.len());
        assert_eq!(lines[0], "temp=10");
        assert!(lines.contains(&"damp_cmd=True"));
        assert!(lines.contains(&"temp_eh=5.5"));
    }

    #[test]
    fn text_round_trip() {
        let mut stored = OperatingSnapshot::default();
        stored.temp_rm = 21.123456789;
        stored.pump_cmd = false;
        stored.dust_depo = 1e-7;
        let mut loaded = OperatingSnapshot::default();
        parse_snapshot(&format_snapshot(&stored), &mut loaded);
        assert_eq!(loaded, stored);
    }
}
