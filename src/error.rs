//! Error types for the V1 to V2 migration.
//!
//! Unrecognised lines are never errors; they pass through untouched. The only
//! failures are file access and a rule whose underlying computation cannot
//! complete (a date that is not on the calendar).

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failure raised by a single rewrite rule.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RuleError {
    /// A `YYYY-MM-DD` token that does not name a real calendar day.
    #[error("invalid calendar date '{date}'")]
    InvalidDate { date: String },
}

/// Fatal error for a whole migration run.
#[derive(Debug, Error)]
pub enum MigrateError {
    #[error("line {line_number}: rule '{rule}' failed on {line:?}: {source}")]
    Rule {
        line_number: usize,
        rule: &'static str,
        line: String,
        #[source]
        source: RuleError,
    },

    #[error("cannot read '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot write '{}': {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl MigrateError {
    /// 1-based number of the offending input line, if the error has one.
    pub fn line_number(&self) -> Option<usize> {
        match self {
            MigrateError::Rule { line_number, .. } => Some(*line_number),
            _ => None,
        }
    }
}
