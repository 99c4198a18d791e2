//! Language-server diagnostics as seen by a buffer.
//!
//! Diagnostics are derived state: a language server publishes the complete set for a document
//! and the buffer replaces its copy wholesale. Edit operations never touch them.

/// Diagnostic severity levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DiagnosticSeverity {
    /// Error diagnostics.
    Error,
    /// Warning diagnostics.
    Warning,
    /// Informational diagnostics.
    Information,
    /// Hint diagnostics.
    Hint,
}

impl DiagnosticSeverity {
    /// Convert the numeric protocol severity (1..=4) into an enum.
    pub fn from_u64(value: u64) -> Option<Self> {
        match value {
            1 => Some(Self::Error),
            2 => Some(Self::Warning),
            3 => Some(Self::Information),
            4 => Some(Self::Hint),
            _ => None,
        }
    }
}

/// A row/column range. Columns are as reported by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DiagnosticRange {
    /// Start row.
    pub start_row: usize,
    /// Start column.
    pub start_col: usize,
    /// End row.
    pub end_row: usize,
    /// End column (exclusive).
    pub end_col: usize,
}

/// A single issue reported for a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Anchored range.
    pub range: DiagnosticRange,
    /// Optional severity.
    pub severity: Option<DiagnosticSeverity>,
    /// Human readable message.
    pub message: String,
}

impl Diagnostic {
    /// Returns `true` if the diagnostic starts on `row`.
    pub fn starts_on(&self, row: usize) -> bool {
        self.range.start_row == row
    }
}
