//! Core data models for super-hooks

use crate::error::CheckError;
use crate::locator::{ClassRecord, MethodRecord};
use crate::source::SourceFile;
use serde::Serialize;
use std::fmt;

/// The three lifecycle-method violations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    MissingSuperCall,
    SuperCallNotLast,
    WrongCasing,
}

impl ViolationKind {
    pub fn code(self) -> &'static str {
        match self {
            ViolationKind::MissingSuperCall => "SUP001",
            ViolationKind::SuperCallNotLast => "SUP002",
            ViolationKind::WrongCasing => "SUP003",
        }
    }

    /// Whether the rewriter knows how to correct this kind
    pub fn is_fixable(self) -> bool {
        !matches!(self, ViolationKind::WrongCasing)
    }
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A violation detected by a lint rule
#[derive(Debug, Clone, Serialize)]
pub struct Violation {
    pub kind: ViolationKind,
    pub file_path: String,
    /// Byte offset of the method header
    pub offset: usize,
    pub line: usize,
    pub column: usize,
    /// Qualified method name, `Outer.Inner.setUp`
    #[serde(skip_serializing_if = "String::is_empty")]
    pub symbol: String,
    pub message: String,
    /// Patches that corrected it in fix mode; a move takes two
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fix: Vec<FixPatch>,
}

impl Violation {
    pub fn new(
        kind: ViolationKind,
        message: String,
        offset: usize,
        file_path: &str,
        source: &SourceFile,
    ) -> Self {
        let (line, column) = source.line_col(offset);
        Self {
            kind,
            file_path: file_path.to_string(),
            offset,
            line,
            column,
            symbol: String::new(),
            message,
            fix: Vec::new(),
        }
    }

    pub fn with_symbol(mut self, symbol: String) -> Self {
        self.symbol = symbol;
        self
    }

    pub fn rule_id(&self) -> &'static str {
        self.kind.code()
    }

    /// Sort key giving the reporting order: path, line, column, rule
    pub fn sort_key(&self) -> (&str, usize, usize, ViolationKind) {
        (&self.file_path, self.line, self.column, self.kind)
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}: {} {}",
            self.file_path, self.line, self.column, self.kind, self.message
        )
    }
}

/// A single replacement addressed by offsets into the original text
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FixPatch {
    pub file_path: String,
    pub start: usize,
    pub end: usize,
    pub replacement: String,
    /// Header offset of the method the patch belongs to. A nested method starts
    /// later than the method enclosing it.
    pub anchor: usize,
}

impl FixPatch {
    pub fn is_insertion(&self) -> bool {
        self.start == self.end
    }

    /// Two patches conflict when their ranges intersect. Insertions at one offset
    /// conflict only when they come from the same method; otherwise the inner
    /// method's text goes first.
    pub fn overlaps(&self, other: &FixPatch) -> bool {
        match (self.is_insertion(), other.is_insertion()) {
            (true, true) => self.start == other.start && self.anchor == other.anchor,
            (true, false) => other.start <= self.start && self.start < other.end,
            (false, true) => self.start <= other.start && other.start < self.end,
            (false, false) => self.start < other.end && other.start < self.end,
        }
    }
}

/// Context passed to each rule for checking one lifecycle method
pub struct MethodContext<'a> {
    pub method: &'a MethodRecord<'a>,
    pub class: &'a ClassRecord<'a>,
    pub file_path: &'a str,
    pub source: &'a SourceFile<'a>,
}

impl MethodContext<'_> {
    /// `Outer.Inner.setUp`
    pub fn symbol(&self) -> String {
        format!("{}.{}", self.class.qualified_name, self.method.name())
    }
}

/// Result of processing a single file
#[derive(Debug, Default)]
pub struct FileReport {
    pub file_path: String,
    /// Violations still present after processing
    pub violations: Vec<Violation>,
    /// Violations corrected in fix mode
    pub fixed: Vec<Violation>,
    pub error: Option<CheckError>,
    /// True when the file on disk was rewritten
    pub written: bool,
}

impl FileReport {
    pub fn new(file_path: String) -> Self {
        Self {
            file_path,
            ..Default::default()
        }
    }

    pub fn with_error(file_path: String, error: CheckError) -> Self {
        Self {
            file_path,
            error: Some(error),
            ..Default::default()
        }
    }

    pub fn is_clean(&self) -> bool {
        self.error.is_none() && self.violations.is_empty()
    }
}
