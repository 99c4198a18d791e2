//! The in-memory representation of an open file.
//!
//! A [`TextBuffer`] stores its content as an ordered array of lines, each a sequence of Unicode
//! scalar values. The array is never empty: an empty document is one empty line. All columns in
//! the public API are character columns; byte offsets are only computed for the syntax
//! highlighter.
//!
//! Every text mutation goes through [`TextBuffer::replace_range`], which splices the line array,
//! reports a [`SyntaxEdit`], and maps every cursor through the change so that cursors stay
//! inside the document.

use crate::cursor::{Cursor, Position, transform_position};
use crate::diagnostics::Diagnostic;
use crate::history::{HistoryState, UndoHistory};
use crate::sync::DocumentSync;
use crate::syntax::{SyntaxEdit, SyntaxListener};
use crate::text::byte_len;
use qwe_lang::FileType;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;
use tracing::warn;

/// An open document: lines, cursors, history and file metadata.
pub struct TextBuffer {
    lines: Vec<Vec<char>>,
    cursors: Vec<Cursor>,
    history: UndoHistory,
    modified: bool,
    read_only: bool,
    filename: Option<PathBuf>,
    last_mod_time: Option<SystemTime>,
    file_type: Arc<FileType>,
    diagnostics: Vec<Diagnostic>,
    syntax: Option<Box<dyn SyntaxListener>>,
    sync: Option<Arc<dyn DocumentSync>>,
}

impl fmt::Debug for TextBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextBuffer")
            .field("lines", &self.lines.len())
            .field("cursors", &self.cursors)
            .field("modified", &self.modified)
            .field("read_only", &self.read_only)
            .field("filename", &self.filename)
            .field("file_type", &self.file_type.name)
            .finish_non_exhaustive()
    }
}

impl Default for TextBuffer {
    fn default() -> Self {
        Self::new(Arc::new(FileType::default()))
    }
}

impl TextBuffer {
    /// Create an empty buffer (one empty line, one cursor at the origin).
    pub fn new(file_type: Arc<FileType>) -> Self {
        Self::from_lines(vec![Vec::new()], file_type)
    }

    /// Create a buffer by splitting `text` on `\n`.
    ///
    /// This is the exact inverse of the [`fmt::Display`] rendering: `"a\n"` yields the lines
    /// `["a", ""]`.
    pub fn from_text(text: &str, file_type: Arc<FileType>) -> Self {
        let lines = text.split('\n').map(|l| l.chars().collect()).collect();
        Self::from_lines(lines, file_type)
    }

    /// Create a buffer from pre-split lines. An empty vector becomes one empty line.
    pub fn from_lines(mut lines: Vec<Vec<char>>, file_type: Arc<FileType>) -> Self {
        if lines.is_empty() {
            lines.push(Vec::new());
        }
        Self {
            lines,
            cursors: vec![Cursor::default()],
            history: UndoHistory::default(),
            modified: false,
            read_only: false,
            filename: None,
            last_mod_time: None,
            file_type,
            diagnostics: Vec::new(),
            syntax: None,
            sync: None,
        }
    }

    /// Limit the undo history of this buffer to `depth` entries.
    pub fn with_history_depth(mut self, depth: usize) -> Self {
        self.history = UndoHistory::new(depth);
        self
    }

    // ---------------------------------------------------------------------
    // Content access
    // ---------------------------------------------------------------------

    /// All lines.
    pub fn lines(&self) -> &[Vec<char>] {
        &self.lines
    }

    /// A single line, if `row` exists.
    pub fn line(&self, row: usize) -> Option<&[char]> {
        self.lines.get(row).map(Vec::as_slice)
    }

    /// A single line as a `String` (empty if `row` does not exist).
    pub fn line_string(&self, row: usize) -> String {
        self.line(row).map(|l| l.iter().collect()).unwrap_or_default()
    }

    /// Number of lines (always at least 1).
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Length of `row` in characters (0 if the row does not exist).
    pub fn line_len(&self, row: usize) -> usize {
        self.lines.get(row).map_or(0, Vec::len)
    }

    /// UTF-8 byte length of `row` up to character column `col`.
    pub fn line_byte_offset(&self, row: usize, col: usize) -> usize {
        self.lines.get(row).map_or(0, |line| byte_len(line, col))
    }

    /// UTF-8 byte offset of `(row, col)` from the start of the document (`\n` counts as one).
    pub fn byte_offset(&self, row: usize, col: usize) -> usize {
        let preceding: usize = self
            .lines
            .iter()
            .take(row)
            .map(|l| byte_len(l, l.len()) + 1)
            .sum();
        preceding + self.line_byte_offset(row, col)
    }

    /// The text between two positions (`start` inclusive, `end` exclusive).
    pub fn text_in_range(&self, start: Position, end: Position) -> String {
        let start = self.clamp_position(start);
        let end = self.clamp_position(end).max(start);
        if start.row == end.row {
            return self.lines[start.row][start.col..end.col].iter().collect();
        }
        let mut out: String = self.lines[start.row][start.col..].iter().collect();
        for line in &self.lines[start.row + 1..end.row] {
            out.push('\n');
            out.extend(line.iter());
        }
        out.push('\n');
        out.extend(self.lines[end.row][..end.col].iter());
        out
    }

    // ---------------------------------------------------------------------
    // Flags and metadata
    // ---------------------------------------------------------------------

    /// Whether the buffer has unsaved changes.
    pub fn is_modified(&self) -> bool {
        self.modified
    }

    /// Set or clear the unsaved-changes flag.
    pub fn set_modified(&mut self, modified: bool) {
        self.modified = modified;
    }

    /// Whether mutation is rejected.
    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Mark the buffer read-only (or writable).
    pub fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
    }

    /// Path of the file backing this buffer.
    pub fn filename(&self) -> Option<&Path> {
        self.filename.as_deref()
    }

    /// Associate the buffer with a path.
    pub fn set_filename(&mut self, filename: impl Into<PathBuf>) {
        self.filename = Some(filename.into());
    }

    /// Modification time of the file when it was last loaded or saved.
    pub fn last_mod_time(&self) -> Option<SystemTime> {
        self.last_mod_time
    }

    pub(crate) fn set_last_mod_time(&mut self, time: Option<SystemTime>) {
        self.last_mod_time = time;
    }

    /// Language configuration of this buffer.
    pub fn file_type(&self) -> &FileType {
        &self.file_type
    }

    /// Shared handle to the language configuration.
    pub fn file_type_arc(&self) -> Arc<FileType> {
        Arc::clone(&self.file_type)
    }

    pub(crate) fn set_file_type(&mut self, file_type: Arc<FileType>) {
        self.file_type = file_type;
    }

    /// Returns `true` if the buffer has no file and only one empty line.
    pub fn is_blank_scratch(&self) -> bool {
        self.filename.is_none() && self.lines.len() == 1 && self.lines[0].is_empty()
    }

    // ---------------------------------------------------------------------
    // Diagnostics and collaborators
    // ---------------------------------------------------------------------

    /// Last known diagnostics for the document.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Replace the diagnostics wholesale.
    pub fn set_diagnostics(&mut self, diagnostics: Vec<Diagnostic>) {
        self.diagnostics = diagnostics;
    }

    /// Attach a syntax highlighter and let it parse the current text.
    pub fn attach_syntax(&mut self, mut syntax: Box<dyn SyntaxListener>) {
        syntax.reparse(&self.to_string());
        self.syntax = Some(syntax);
    }

    /// Attach a document synchronizer (e.g. a language server session).
    pub fn attach_sync(&mut self, sync: Arc<dyn DocumentSync>) {
        self.sync = Some(sync);
    }

    /// Detach and return the document synchronizer.
    pub fn detach_sync(&mut self) -> Option<Arc<dyn DocumentSync>> {
        self.sync.take()
    }

    /// Returns `true` if a document synchronizer is attached.
    pub fn has_sync(&self) -> bool {
        self.sync.is_some()
    }

    /// Forward the full text to the synchronizer and copy its diagnostics onto the buffer.
    pub fn refresh_diagnostics(&mut self) -> bool {
        let Some(sync) = self.sync.clone() else {
            return false;
        };
        if let Err(err) = sync.did_change(&self.to_string()) {
            warn!(error = %err, "didChange failed");
            return false;
        }
        self.diagnostics = sync.diagnostics();
        true
    }

    // ---------------------------------------------------------------------
    // Cursors
    // ---------------------------------------------------------------------

    /// All cursors; index 0 is the primary cursor.
    pub fn cursors(&self) -> &[Cursor] {
        &self.cursors
    }

    /// The primary cursor.
    pub fn primary_cursor(&self) -> &Cursor {
        &self.cursors[0]
    }

    /// Mutable access to the primary cursor.
    ///
    /// Callers that move it are expected to keep it inside the document (see
    /// [`TextBuffer::clamp_cursors`]).
    pub fn primary_cursor_mut(&mut self) -> &mut Cursor {
        &mut self.cursors[0]
    }

    pub(crate) fn cursor_mut(&mut self, index: usize) -> &mut Cursor {
        &mut self.cursors[index]
    }

    pub(crate) fn cursors_mut(&mut self) -> &mut [Cursor] {
        &mut self.cursors
    }

    /// Move the primary cursor to `pos` (clamped) and remember its column.
    pub fn set_primary_position(&mut self, pos: Position) {
        let pos = self.clamp_position(pos);
        let cursor = &mut self.cursors[0];
        cursor.set_position(pos);
        cursor.preferred_col = pos.col;
    }

    /// Add a secondary cursor at `(x, y)` (clamped into the document).
    pub fn add_cursor(&mut self, x: usize, y: usize) {
        let pos = self.clamp_position(Position::new(y, x));
        self.cursors.push(Cursor {
            x: pos.col,
            y: pos.row,
            preferred_col: x,
        });
    }

    /// Replace all cursors. An empty list leaves a single cursor at the origin.
    pub fn set_cursors(&mut self, cursors: Vec<Cursor>) {
        self.cursors = if cursors.is_empty() {
            vec![Cursor::default()]
        } else {
            cursors
        };
        self.clamp_cursors();
    }

    /// Remove every cursor except the primary one.
    pub fn clear_secondary_cursors(&mut self) {
        self.cursors.truncate(1);
    }

    /// Cursor indices ordered bottom-right first (row descending, then column descending).
    ///
    /// Multi-cursor edits must walk cursors in this order so that an edit never shifts text
    /// under a cursor that has not been processed yet. Re-derive it before every such edit.
    pub(crate) fn cursor_indices_desc(&self) -> Vec<usize> {
        let mut indices: Vec<usize> = (0..self.cursors.len()).collect();
        indices.sort_by(|&a, &b| self.cursors[b].position().cmp(&self.cursors[a].position()));
        indices
    }

    /// Copies of all cursors ordered bottom-right first.
    pub fn sorted_cursors_desc(&self) -> Vec<Cursor> {
        self.cursor_indices_desc()
            .into_iter()
            .map(|i| self.cursors[i])
            .collect()
    }

    /// Sort cursors by position and drop exact duplicates.
    pub fn merge_cursors(&mut self) {
        if self.cursors.len() <= 1 {
            return;
        }
        self.cursors.sort_by_key(Cursor::position);
        self.cursors.dedup_by_key(|c| c.position());
    }

    /// Clamp `pos` into the document: row into `[0, line_count)`, column into `[0, len]`.
    pub fn clamp_position(&self, pos: Position) -> Position {
        let row = pos.row.min(self.lines.len() - 1);
        let col = pos.col.min(self.lines[row].len());
        Position::new(row, col)
    }

    /// Clamp every cursor into the document.
    pub fn clamp_cursors(&mut self) {
        let max_row = self.lines.len() - 1;
        for cursor in &mut self.cursors {
            cursor.y = cursor.y.min(max_row);
            cursor.x = cursor.x.min(self.lines[cursor.y].len());
        }
    }

    // ---------------------------------------------------------------------
    // Mutation primitives
    // ---------------------------------------------------------------------

    /// Replace the text between `start` and `end` with `text` (which may contain `\n`).
    ///
    /// Both positions are clamped first. Every cursor is mapped through the edit, the syntax
    /// highlighter receives a [`SyntaxEdit`], and the removed text plus the end position of the
    /// inserted text are returned.
    ///
    /// This does not mark the buffer modified nor notify the synchronizer; operations call
    /// [`TextBuffer::finish_edit`] once after a batch.
    pub fn replace_range(&mut self, start: Position, end: Position, text: &str) -> (String, Position) {
        let start = self.clamp_position(start);
        let end = self.clamp_position(end).max(start);

        let removed = self.text_in_range(start, end);
        let old_end_col_bytes = byte_len(&self.lines[end.row], end.col);

        let mut parts = text.split('\n').map(|p| p.chars().collect::<Vec<char>>());
        let mut first = self.lines[start.row][..start.col].to_vec();
        first.extend(parts.next().unwrap_or_default());
        let suffix = self.lines[end.row][end.col..].to_vec();

        let mut replacement = vec![first];
        replacement.extend(parts);
        let inserted_rows = replacement.len() - 1;
        let new_end = {
            let last = &replacement[inserted_rows];
            Position::new(start.row + inserted_rows, last.len())
        };
        if let Some(last) = replacement.last_mut() {
            last.extend(suffix);
        }
        self.lines.splice(start.row..=end.row, replacement);

        for cursor in &mut self.cursors {
            let moved = transform_position(cursor.position(), start, end, new_end);
            if moved != cursor.position() {
                cursor.set_position(moved);
                cursor.preferred_col = moved.col;
            }
        }

        if let Some(syntax) = self.syntax.as_mut() {
            syntax.handle_edit(&SyntaxEdit {
                start_row: start.row,
                start_col: start.col,
                bytes_removed: removed.len(),
                bytes_added: text.len(),
                old_end_row: end.row,
                old_end_col_bytes,
                new_end_row: new_end.row,
                new_end_col_bytes: byte_len(&self.lines[new_end.row], new_end.col),
            });
        }

        (removed, new_end)
    }

    /// Insert `text` at `pos`.
    pub fn insert_text(&mut self, pos: Position, text: &str) -> Position {
        self.replace_range(pos, pos, text).1
    }

    /// Replace the whole line array (reload, reflow of many lines, etc.).
    pub(crate) fn replace_lines(&mut self, mut lines: Vec<Vec<char>>) {
        if lines.is_empty() {
            lines.push(Vec::new());
        }
        self.lines = lines;
        self.clamp_cursors();
    }

    /// Finish a mutating operation: clamp cursors, mark modified, reparse syntax and forward the
    /// document to the synchronizer.
    pub fn finish_edit(&mut self) {
        self.clamp_cursors();
        self.modified = true;
        self.publish_text();
    }

    fn publish_text(&mut self) {
        if self.syntax.is_none() && self.sync.is_none() {
            return;
        }
        let text = self.to_string();
        if let Some(syntax) = self.syntax.as_mut() {
            syntax.reparse(&text);
        }
        if let Some(sync) = &self.sync
            && let Err(err) = sync.did_change(&text)
        {
            warn!(error = %err, "didChange failed");
        }
    }

    /// Reparse and resynchronize after the content was replaced from outside an edit
    /// operation (e.g. a reload from disk).
    pub(crate) fn content_replaced(&mut self) {
        self.clamp_cursors();
        self.publish_text();
    }

    // ---------------------------------------------------------------------
    // History
    // ---------------------------------------------------------------------

    fn snapshot(&self) -> HistoryState {
        HistoryState {
            lines: self.lines.clone(),
            cursors: self.cursors.clone(),
        }
    }

    fn install(&mut self, state: HistoryState) {
        self.lines = state.lines;
        self.cursors = state.cursors;
        self.modified = true;
        self.publish_text();
    }

    /// Record the current lines and cursors as one undo step and clear the redo stack.
    pub fn save_state(&mut self) {
        let state = self.snapshot();
        self.history.push(state);
    }

    /// Restore the most recent undo snapshot. Returns `false` if there was none.
    pub fn undo(&mut self) -> bool {
        let current = self.snapshot();
        match self.history.undo(current) {
            Some(state) => {
                self.install(state);
                true
            }
            None => false,
        }
    }

    /// Re-apply the most recently undone snapshot. Returns `false` if there was none.
    pub fn redo(&mut self) -> bool {
        let current = self.snapshot();
        match self.history.redo(current) {
            Some(state) => {
                self.install(state);
                true
            }
            None => false,
        }
    }

    /// Number of undo entries.
    pub fn undo_depth(&self) -> usize {
        self.history.undo_depth()
    }

    /// Number of redo entries.
    pub fn redo_depth(&self) -> usize {
        self.history.redo_depth()
    }

    /// Shut down the attached synchronizer, if any.
    pub fn close(&mut self) {
        if let Some(sync) = self.sync.take() {
            sync.shutdown();
        }
    }
}

impl fmt::Display for TextBuffer {
    /// Lines joined by `\n`; no trailing newline is added.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, line) in self.lines.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            let s: String = line.iter().collect();
            f.write_str(&s)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn buffer(text: &str) -> TextBuffer {
        TextBuffer::from_text(text, Arc::new(FileType::default()))
    }

    struct Recorder(Arc<Mutex<Vec<SyntaxEdit>>>);

    impl SyntaxListener for Recorder {
        fn handle_edit(&mut self, edit: &SyntaxEdit) {
            self.0.lock().unwrap().push(*edit);
        }

        fn reparse(&mut self, _text: &str) {}
    }

    #[test]
    fn test_round_trip_through_display() {
        for text in ["", "a", "a\nb", "a\n", "\n\n", "héllo\nwörld"] {
            assert_eq!(buffer(text).to_string(), text);
        }
    }

    #[test]
    fn test_byte_offsets_use_utf8_lengths() {
        let b = buffer("aé\n👋x");
        assert_eq!(b.line_byte_offset(0, 2), 3);
        assert_eq!(b.byte_offset(1, 0), 4);
        assert_eq!(b.byte_offset(1, 1), 8);
    }

    #[test]
    fn test_replace_range_multiline_reports_syntax_edit() {
        let edits = Arc::new(Mutex::new(Vec::new()));
        let mut b = buffer("héllo\nworld");
        b.attach_syntax(Box::new(Recorder(edits.clone())));

        let (removed, end) = b.replace_range(Position::new(0, 2), Position::new(1, 1), "X\nY");
        assert_eq!(removed, "llo\nw");
        assert_eq!(end, Position::new(1, 1));
        assert_eq!(b.to_string(), "héX\nYorld");

        let edits = edits.lock().unwrap();
        assert_eq!(
            edits[0],
            SyntaxEdit {
                start_row: 0,
                start_col: 2,
                bytes_removed: 5,
                bytes_added: 3,
                old_end_row: 1,
                old_end_col_bytes: 1,
                new_end_row: 1,
                new_end_col_bytes: 1,
            }
        );
    }

    #[test]
    fn test_merge_cursors_drops_exact_duplicates_only() {
        let mut b = buffer("abc\ndef");
        b.add_cursor(1, 0);
        b.add_cursor(0, 0);
        b.add_cursor(2, 0);
        b.add_cursor(1, 0);
        b.merge_cursors();
        let positions: Vec<_> = b.cursors().iter().map(|c| (c.y, c.x)).collect();
        assert_eq!(positions, vec![(0, 0), (0, 1), (0, 2)]);
    }

    #[test]
    fn test_sorted_cursors_desc() {
        let mut b = buffer("abc\ndef\nghi");
        b.add_cursor(1, 2);
        b.add_cursor(2, 1);
        b.add_cursor(0, 2);
        let order: Vec<_> = b.sorted_cursors_desc().iter().map(|c| (c.y, c.x)).collect();
        assert_eq!(order, vec![(2, 1), (2, 0), (1, 2), (0, 0)]);
    }
}
