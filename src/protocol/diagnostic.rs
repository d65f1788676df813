//! Diagnostics produced by macro implementations
//!
//! A diagnostic is attached verbatim to the expansion reply. Positions are
//! UTF-8 byte offsets into the file named by `file_name`.

use serde::{Deserialize, Serialize};

use super::syntax::Syntax;

/// Diagnostic severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Warning,
    Note,
}

/// A single point in a file
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub file_name: String,
    pub offset: usize,
}

impl Position {
    pub fn new(file_name: impl Into<String>, offset: usize) -> Self {
        Self {
            file_name: file_name.into(),
            offset,
        }
    }

    /// Position of the start of a syntax fragment
    pub fn of(syntax: &Syntax) -> Self {
        Self::new(syntax.location.file_name.clone(), syntax.location.offset)
    }

    /// Placeholder the host treats as "no location"
    pub fn invalid() -> Self {
        Self::new("", 0)
    }
}

/// A byte range in a file
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionRange {
    pub file_name: String,
    pub start_offset: usize,
    pub end_offset: usize,
}

impl PositionRange {
    pub fn new(file_name: impl Into<String>, start_offset: usize, end_offset: usize) -> Self {
        Self {
            file_name: file_name.into(),
            start_offset,
            end_offset,
        }
    }

    /// Range covering the whole of a syntax fragment
    pub fn of(syntax: &Syntax) -> Self {
        let start = syntax.location.offset;
        Self::new(
            syntax.location.file_name.clone(),
            start,
            start + syntax.source.len(),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Note {
    pub position: Position,
    pub message: String,
}

/// One textual replacement within a fix-it
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Change {
    pub range: PositionRange,
    pub new_text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FixIt {
    pub message: String,
    pub changes: Vec<Change>,
}

/// A message reported back to the host alongside an expansion
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    pub message: String,
    pub severity: Severity,
    pub position: Position,
    #[serde(default)]
    pub highlights: Vec<PositionRange>,
    #[serde(default)]
    pub notes: Vec<Note>,
    #[serde(default)]
    pub fix_its: Vec<FixIt>,
}

impl Diagnostic {
    pub fn new(severity: Severity, message: impl Into<String>, position: Position) -> Self {
        Self {
            message: message.into(),
            severity,
            position,
            highlights: Vec::new(),
            notes: Vec::new(),
            fix_its: Vec::new(),
        }
    }

    /// Error anchored at the start of `syntax`
    pub fn error(syntax: &Syntax, message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message, Position::of(syntax))
    }

    pub fn warning(syntax: &Syntax, message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message, Position::of(syntax))
    }

    pub fn with_highlight(mut self, range: PositionRange) -> Self {
        self.highlights.push(range);
        self
    }

    pub fn with_note(mut self, position: Position, message: impl Into<String>) -> Self {
        self.notes.push(Note {
            position,
            message: message.into(),
        });
        self
    }

    pub fn with_fix_it(mut self, message: impl Into<String>, changes: Vec<Change>) -> Self {
        self.fix_its.push(FixIt {
            message: message.into(),
            changes,
        });
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}
