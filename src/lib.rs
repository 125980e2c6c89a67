//! super-hooks: keeps unittest `setUp`/`tearDown` overrides honest
//!
//! Every override of a lifecycle hook in a test class must:
//! - be spelled exactly `setUp` / `tearDown`
//! - call `super().setUp()` / `super().tearDown()`
//! - make that call its last statement
//!
//! [`analyze`] reports violations; [`fix::fix`] rewrites the fixable ones.

pub mod config;
pub mod error;
pub mod fix;
pub mod locator;
pub mod logging;
pub mod models;
pub mod noqa;
pub mod parser;
pub mod report;
pub mod rules;
pub mod source;
pub mod writer;

use error::CheckError;
use locator::{locate, BaseClasses, ClassRecord, MethodRecord};
use models::{FileReport, MethodContext, Violation};
use noqa::NoqaDirectives;
use rayon::prelude::*;
use rules::base::LintRule;
use source::SourceFile;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub use fix::{fix, FixOutcome};

/// What the checker looks for
pub struct Settings {
    pub base_classes: BaseClasses,
    pub rules: Vec<Box<dyn LintRule>>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_classes: BaseClasses::default(),
            rules: rules::get_all_rules(),
        }
    }
}

impl Settings {
    pub fn with_base_classes(base_classes: BaseClasses) -> Self {
        Self {
            base_classes,
            ..Default::default()
        }
    }
}

/// Whether a batch run only reports or also rewrites
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Check,
    Fix,
}

/// Analyze source code, returning violations ordered by position
pub fn analyze(
    file_path: &str,
    source: &str,
    settings: &Settings,
) -> Result<Vec<Violation>, CheckError> {
    let source = SourceFile::new(source);
    let tree = parser::parse(&source, file_path)?;
    let records = locate(&tree, &settings.base_classes);
    let noqa = NoqaDirectives::parse(source.text());

    let mut violations: Vec<Violation> = evaluate(&records, file_path, &source, settings, &noqa)
        .into_iter()
        .flat_map(|(_, found)| found)
        .collect();
    sort_violations(&mut violations);
    Ok(violations)
}

/// Run every enabled rule on every lifecycle method, dropping noqa-suppressed hits.
/// Violations stay grouped by the method they belong to.
pub(crate) fn evaluate<'r>(
    records: &'r [ClassRecord<'r>],
    file_path: &str,
    source: &SourceFile,
    settings: &Settings,
    noqa: &NoqaDirectives,
) -> Vec<(&'r MethodRecord<'r>, Vec<Violation>)> {
    let mut results = Vec::new();

    for class in records {
        for method in &class.methods {
            let context = MethodContext {
                method,
                class,
                file_path,
                source,
            };
            let violations: Vec<Violation> = settings
                .rules
                .iter()
                .flat_map(|rule| rule.check(&context))
                .filter(|v| !noqa.is_suppressed(v.line, v.rule_id()))
                .collect();
            if !violations.is_empty() {
                results.push((method, violations));
            }
        }
    }

    results
}

pub fn sort_violations(violations: &mut [Violation]) {
    violations.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
}

/// Check a single file on disk
pub fn check_file(file_path: &Path, settings: &Settings) -> FileReport {
    let path_str = file_path.to_string_lossy().to_string();

    let source = match std::fs::read_to_string(file_path) {
        Ok(s) => s,
        Err(e) => return FileReport::with_error(path_str, CheckError::Read(e)),
    };

    match analyze(&path_str, &source, settings) {
        Ok(violations) => FileReport {
            violations,
            ..FileReport::new(path_str)
        },
        Err(e) => {
            log::debug!("{}: {}", path_str, e);
            FileReport::with_error(path_str, e)
        }
    }
}

/// Fix a single file on disk, writing it back atomically if anything changed
pub fn fix_file(file_path: &Path, settings: &Settings) -> FileReport {
    let path_str = file_path.to_string_lossy().to_string();

    let source = match std::fs::read_to_string(file_path) {
        Ok(s) => s,
        Err(e) => return FileReport::with_error(path_str, CheckError::Read(e)),
    };

    let outcome = match fix(&path_str, &source, settings) {
        Ok(outcome) => outcome,
        Err(e) => {
            log::warn!("{}: {}", path_str, e);
            // Nothing was written; report what check mode would have found
            let violations = analyze(&path_str, &source, settings).unwrap_or_default();
            return FileReport {
                violations,
                error: Some(e),
                ..FileReport::new(path_str)
            };
        }
    };

    let mut report = FileReport {
        violations: outcome.unresolved,
        ..FileReport::new(path_str)
    };

    if outcome.fixed.is_empty() {
        return report;
    }

    match writer::write_atomic(file_path, &outcome.text) {
        Ok(()) => {
            log::debug!("{}: applied {} fix(es)", report.file_path, outcome.fixed.len());
            report.fixed = outcome.fixed;
            report.written = true;
        }
        Err(e) => {
            // The original file is untouched, so its fixable violations still stand
            report.violations.extend(outcome.fixed.into_iter().map(|mut v| {
                v.fix.clear();
                v
            }));
            sort_violations(&mut report.violations);
            report.error = Some(CheckError::Write(e));
        }
    }

    report
}

/// Process files in parallel. Reports come back sorted by path so output does not
/// depend on scheduling.
pub fn process_files_parallel(files: &[PathBuf], settings: &Settings, mode: Mode) -> Vec<FileReport> {
    let mut reports: Vec<FileReport> = files
        .par_iter()
        .map(|file| match mode {
            Mode::Check => check_file(file, settings),
            Mode::Fix => fix_file(file, settings),
        })
        .collect();
    reports.sort_by(|a, b| a.file_path.cmp(&b.file_path));
    reports
}

/// Collect Python files from paths
pub fn collect_python_files(paths: &[String], exclude_patterns: &[String]) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for path in paths {
        let p = Path::new(path);
        if p.is_file() {
            if p.extension().is_some_and(|e| e == "py") {
                files.push(p.to_path_buf());
            }
        } else if p.is_dir() {
            for entry in WalkDir::new(p)
                .into_iter()
                .filter_entry(|e| e.depth() == 0 || !should_exclude(e.path(), exclude_patterns))
                .filter_map(|e| e.ok())
            {
                let path = entry.path();
                if path.is_file() && path.extension().is_some_and(|e| e == "py") {
                    files.push(path.to_path_buf());
                }
            }
        } else if p.extension().is_some_and(|e| e == "py") {
            // Kept so the read failure shows up in the report
            files.push(p.to_path_buf());
        } else {
            log::warn!("skipping {}: no such file or directory", path);
        }
    }

    files.sort();
    files.dedup();
    files
}

fn should_exclude(path: &Path, patterns: &[String]) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    patterns.iter().any(|pattern| name == pattern)
}
