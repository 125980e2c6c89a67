//! Per-file failures
//!
//! None of these abort a batch run. The aggregator stores them on the file's
//! report and keeps going.

use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CheckError {
    #[error("parse error: {message}")]
    Parse {
        offset: usize,
        line: usize,
        column: usize,
        message: String,
    },
    /// An invariant of the rewriter was broken; no patch from this file was applied
    #[error("internal error: {0}")]
    Internal(String),
    #[error("failed to read file: {0}")]
    Read(#[source] io::Error),
    #[error("failed to write file: {0}")]
    Write(#[source] io::Error),
}

impl CheckError {
    /// Best-known (line, column) for the failure
    pub fn position(&self) -> (usize, usize) {
        match self {
            CheckError::Parse { line, column, .. } => (*line, *column),
            _ => (1, 1),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            CheckError::Parse { .. } => "parse",
            CheckError::Internal(_) => "internal",
            CheckError::Read(_) => "read",
            CheckError::Write(_) => "write",
        }
    }
}
