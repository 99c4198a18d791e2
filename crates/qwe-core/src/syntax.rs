//! Edit notifications for an incremental syntax highlighter.
//!
//! The core does not parse anything itself. After each primitive mutation it describes the
//! change as a [`SyntaxEdit`] (the shape an incremental parser such as tree-sitter expects), and
//! after a batch of edits it asks the highlighter to reparse the whole document text.

/// A structural edit descriptor.
///
/// Rows are zero-based line indices. `start_col` is a character column; every other column
/// and length is measured in UTF-8 bytes, because highlighters index the encoded text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SyntaxEdit {
    /// Row where the edit starts.
    pub start_row: usize,
    /// Character column where the edit starts.
    pub start_col: usize,
    /// Number of bytes removed.
    pub bytes_removed: usize,
    /// Number of bytes inserted.
    pub bytes_added: usize,
    /// Row of the end of the removed range (pre-edit document).
    pub old_end_row: usize,
    /// Byte column of the end of the removed range (pre-edit document).
    pub old_end_col_bytes: usize,
    /// Row of the end of the inserted range (post-edit document).
    pub new_end_row: usize,
    /// Byte column of the end of the inserted range (post-edit document).
    pub new_end_col_bytes: usize,
}

/// Receiver of buffer edits, implemented by a syntax highlighting engine.
pub trait SyntaxListener: Send {
    /// Called once per primitive mutation, in application order.
    fn handle_edit(&mut self, edit: &SyntaxEdit);

    /// Called after a batch of edits (or a wholesale replacement) with the full document text.
    fn reparse(&mut self, text: &str);
}
