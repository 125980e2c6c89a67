//! Output of a batch run
//!
//! Diagnostics go to stdout, one per line, in path/line/column/rule order.
//! The summary goes to stderr.

use crate::models::FileReport;
use colored::*;
use serde::Serialize;
use std::io::{self, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!("unknown output format '{}' (expected text or json)", other)),
        }
    }
}

/// One diagnostic as emitted in JSON output
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct JsonDiagnostic<'a> {
    pub file: &'a str,
    pub line: usize,
    pub column: usize,
    /// Rule code, or `error` for a file that could not be processed
    pub code: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Qualified method name; absent for file errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol: Option<&'a str>,
    pub message: String,
}

/// JSON entries for one report, sorted by position
fn diagnostics(report: &FileReport) -> Vec<JsonDiagnostic<'_>> {
    let mut out: Vec<JsonDiagnostic<'_>> = report
        .violations
        .iter()
        .map(|v| JsonDiagnostic {
            file: &report.file_path,
            line: v.line,
            column: v.column,
            code: v.rule_id(),
            kind: serde_json::to_value(v.kind)
                .ok()
                .and_then(|value| value.as_str().map(String::from)),
            symbol: Some(v.symbol.as_str()).filter(|symbol| !symbol.is_empty()),
            message: v.message.clone(),
        })
        .collect();

    if let Some(error) = &report.error {
        let (line, column) = error.position();
        out.push(JsonDiagnostic {
            file: &report.file_path,
            line,
            column,
            code: "error",
            kind: Some(error.kind().to_string()),
            symbol: None,
            message: error.to_string(),
        });
    }

    out.sort_by(|a, b| (a.line, a.column, a.code).cmp(&(b.line, b.column, b.code)));
    out
}

/// Text lines for one report; a file error sorts with its own position
fn text_lines(report: &FileReport) -> Vec<String> {
    let mut lines: Vec<((usize, usize, &str), String)> = report
        .violations
        .iter()
        .map(|v| ((v.line, v.column, v.rule_id()), v.to_string()))
        .collect();

    if let Some(error) = &report.error {
        let (line, column) = error.position();
        lines.push((
            (line, column, "error"),
            format!("{}:{}:{}: error: {}", report.file_path, line, column, error),
        ));
    }

    lines.sort_by(|a, b| a.0.cmp(&b.0));
    lines.into_iter().map(|(_, text)| text).collect()
}

/// Write every diagnostic in `format`. Reports are expected sorted by path.
pub fn write_diagnostics<W: Write>(
    out: &mut W,
    reports: &[FileReport],
    format: OutputFormat,
) -> io::Result<()> {
    match format {
        OutputFormat::Text => {
            for report in reports {
                for line in text_lines(report) {
                    writeln!(out, "{}", line)?;
                }
            }
        }
        OutputFormat::Json => {
            let all: Vec<JsonDiagnostic<'_>> = reports.iter().flat_map(diagnostics).collect();
            let json = serde_json::to_string_pretty(&all)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
            writeln!(out, "{}", json)?;
        }
    }
    Ok(())
}

/// Totals over a batch
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub files: usize,
    pub violations: usize,
    pub fixed: usize,
    pub files_written: usize,
    pub errors: usize,
}

impl Summary {
    pub fn from_reports(reports: &[FileReport]) -> Self {
        reports.iter().fold(Summary::default(), |mut acc, report| {
            acc.files += 1;
            acc.violations += report.violations.len();
            acc.fixed += report.fixed.len();
            acc.files_written += usize::from(report.written);
            acc.errors += usize::from(report.error.is_some());
            acc
        })
    }

    /// Exit status 0 requires no remaining violations and no failed file
    pub fn is_success(&self) -> bool {
        self.violations == 0 && self.errors == 0
    }
}

pub fn is_success(reports: &[FileReport]) -> bool {
    Summary::from_reports(reports).is_success()
}

/// Human summary for stderr
pub fn print_summary(summary: &Summary, fix_mode: bool, verbose: bool) {
    if fix_mode && summary.fixed > 0 {
        eprintln!(
            "{} {} violation(s) in {} file(s)",
            "Fixed".green().bold(),
            summary.fixed,
            summary.files_written
        );
    }

    if summary.violations > 0 {
        eprintln!(
            "\nFound {} violation(s) in {} file(s) checked",
            summary.violations.to_string().red().bold(),
            summary.files
        );
    }
    if summary.errors > 0 {
        eprintln!(
            "{} {} file(s) could not be processed",
            "error:".red().bold(),
            summary.errors
        );
    }
    if summary.is_success() && verbose {
        eprintln!("\nNo issues found in {} file(s).", summary.files);
    }
}
