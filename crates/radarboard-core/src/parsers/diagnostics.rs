//! Side channel for candidates the tolerant parsers dropped
//!
//! Parsing never fails. When a candidate record lacks its required fields it is
//! left out of the result and, for the `*_with_report` entry points, recorded
//! here with the 1-based line it started on.

use serde::Serialize;
use std::fmt;

/// Why a candidate record was not emitted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DropReason {
    MissingTitle,
    MissingSource,
    MissingLink,
    EmptyContent,
    InvalidDate,
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::MissingTitle => "missing title",
            Self::MissingSource => "missing source",
            Self::MissingLink => "missing link",
            Self::EmptyContent => "empty content",
            Self::InvalidDate => "invalid date",
        };
        f.write_str(text)
    }
}

/// One dropped candidate
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// 1-based line number in the parsed body
    pub line: usize,
    pub reason: DropReason,
}

/// Dropped candidates collected during one parse
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParseReport {
    pub dropped: Vec<Diagnostic>,
}

impl ParseReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn drop_candidate(&mut self, line: usize, reason: DropReason) {
        self.dropped.push(Diagnostic { line, reason });
    }

    /// Keep the record or log why it was dropped
    pub(crate) fn keep<T>(&mut self, line: usize, candidate: Result<T, DropReason>) -> Option<T> {
        match candidate {
            Ok(record) => Some(record),
            Err(reason) => {
                tracing::debug!(line, %reason, "Dropped candidate record");
                self.drop_candidate(line, reason);
                None
            }
        }
    }

    pub fn is_clean(&self) -> bool {
        self.dropped.is_empty()
    }

    pub fn count(&self, reason: DropReason) -> usize {
        self.dropped.iter().filter(|d| d.reason == reason).count()
    }

    /// Merge another report into this one
    pub fn merge(&mut self, other: ParseReport) {
        self.dropped.extend(other.dropped);
    }
}
