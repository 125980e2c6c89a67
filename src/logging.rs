//! Run log for super-hooks
//!
//! Appends one JSON Lines record per run to a log file, for later analysis of
//! how often each rule fires and how much fix mode corrects.

use crate::models::FileReport;
use crate::Mode;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// A single log entry representing one run
#[derive(Debug, Serialize, Deserialize)]
pub struct RunLogEntry {
    /// Unix timestamp of the run
    pub timestamp: i64,
    /// ISO 8601 formatted date string
    pub datetime: String,
    /// `check` or `fix`
    pub mode: String,
    pub files_scanned: usize,
    /// Violations still present after the run
    pub total_violations: usize,
    pub fixed_count: usize,
    /// Files that failed to read, parse, fix or write
    pub error_count: usize,
    pub violations: Vec<ViolationLogEntry>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ErrorLogEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ViolationLogEntry {
    pub rule_id: String,
    pub file_path: String,
    pub line: usize,
    pub column: usize,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub symbol: String,
    pub message: String,
    /// True when fix mode corrected it
    pub fixed: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorLogEntry {
    pub file_path: String,
    pub kind: String,
    pub message: String,
}

impl RunLogEntry {
    pub fn from_reports(reports: &[FileReport], mode: Mode) -> Self {
        Self::at(Utc::now(), reports, mode)
    }

    fn at(now: DateTime<Utc>, reports: &[FileReport], mode: Mode) -> Self {
        let mut violations = Vec::new();
        let mut errors = Vec::new();

        for report in reports {
            let remaining = report.violations.iter().map(|v| (v, false));
            let fixed = report.fixed.iter().map(|v| (v, true));
            for (v, fixed) in remaining.chain(fixed) {
                violations.push(ViolationLogEntry {
                    rule_id: v.rule_id().to_string(),
                    file_path: v.file_path.clone(),
                    line: v.line,
                    column: v.column,
                    symbol: v.symbol.clone(),
                    message: v.message.clone(),
                    fixed,
                });
            }
            if let Some(error) = &report.error {
                errors.push(ErrorLogEntry {
                    file_path: report.file_path.clone(),
                    kind: error.kind().to_string(),
                    message: error.to_string(),
                });
            }
        }

        let fixed_count = violations.iter().filter(|v| v.fixed).count();

        Self {
            timestamp: now.timestamp(),
            datetime: now.to_rfc3339_opts(SecondsFormat::Secs, true),
            mode: match mode {
                Mode::Check => "check",
                Mode::Fix => "fix",
            }
            .to_string(),
            files_scanned: reports.len(),
            total_violations: violations.len() - fixed_count,
            fixed_count,
            error_count: errors.len(),
            violations,
            errors,
        }
    }
}

/// Appends run entries to a JSON Lines file
pub struct RunLogger {
    writer: BufWriter<File>,
    log_path: PathBuf,
}

impl RunLogger {
    /// Open `log_path` for appending, creating it and its parent directories
    pub fn new(log_path: &Path) -> std::io::Result<Self> {
        if let Some(parent) = log_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_path)?;

        Ok(Self {
            writer: BufWriter::new(file),
            log_path: log_path.to_path_buf(),
        })
    }

    pub fn log(&mut self, entry: &RunLogEntry) -> std::io::Result<()> {
        let json = serde_json::to_string(entry)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        writeln!(self.writer, "{}", json)?;
        self.writer.flush()
    }

    pub fn log_path(&self) -> &Path {
        &self.log_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CheckError;
    use crate::models::{Violation, ViolationKind};
    use crate::source::SourceFile;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn violation(kind: ViolationKind) -> Violation {
        let source = SourceFile::new("class T(TestCase):\n    def setup(self):\n        pass\n");
        Violation::new(kind, "message".to_string(), 23, "test_a.py", &source)
    }

    #[test]
    fn test_entry_counts() {
        let reports = vec![
            FileReport {
                violations: vec![violation(ViolationKind::WrongCasing)],
                fixed: vec![violation(ViolationKind::MissingSuperCall)],
                written: true,
                ..FileReport::new("test_a.py".to_string())
            },
            FileReport::with_error(
                "test_b.py".to_string(),
                CheckError::Internal("overlapping patches".to_string()),
            ),
        ];

        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap();
        let entry = RunLogEntry::at(now, &reports, Mode::Fix);

        assert_eq!(entry.datetime, "2024-05-01T12:30:00Z");
        assert_eq!(entry.timestamp, now.timestamp());
        assert_eq!(entry.mode, "fix");
        assert_eq!(entry.files_scanned, 2);
        assert_eq!(entry.total_violations, 1);
        assert_eq!(entry.fixed_count, 1);
        assert_eq!(entry.error_count, 1);
        assert_eq!(entry.errors[0].kind, "internal");
        assert_eq!(entry.violations[0].rule_id, "SUP003");
        assert_eq!(entry.violations[0].line, 2);
    }

    #[test]
    fn test_logger_appends_lines() {
        let dir = TempDir::new().unwrap();
        let log_path = dir.path().join("logs").join("runs.jsonl");

        let mut logger = RunLogger::new(&log_path).unwrap();
        logger
            .log(&RunLogEntry::from_reports(&[], Mode::Check))
            .unwrap();
        logger
            .log(&RunLogEntry::from_reports(&[], Mode::Fix))
            .unwrap();
        assert_eq!(logger.log_path(), log_path.as_path());

        let content = std::fs::read_to_string(&log_path).unwrap();
        let modes: Vec<String> = content
            .lines()
            .map(|line| serde_json::from_str::<RunLogEntry>(line).unwrap().mode)
            .collect();
        assert_eq!(modes, vec!["check", "fix"]);
    }
}
