//! Visual (selection) mode operations.
//!
//! A selection is the span between the visual anchor and the primary cursor. Its column range
//! is interpreted per mode:
//!
//! - characterwise: from the start position through the end position (inclusive);
//! - linewise: whole lines;
//! - blockwise: the same inclusive column range on every row, clipped to each row's length.

use crate::buffer::TextBuffer;
use crate::cursor::Position;
use crate::edit::{remove_rows, toggle_comment_row};
use crate::editor::{Editor, Mode};
use crate::text::toggle_char_case;

/// How a selection's columns are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionKind {
    /// Characterwise ([`Mode::Visual`]).
    Char,
    /// Linewise ([`Mode::VisualLine`]).
    Line,
    /// Blockwise ([`Mode::VisualBlock`]).
    Block,
}

impl SelectionKind {
    /// The selection kind for a visual mode.
    pub fn from_mode(mode: Mode) -> Option<Self> {
        match mode {
            Mode::Visual => Some(Self::Char),
            Mode::VisualLine => Some(Self::Line),
            Mode::VisualBlock => Some(Self::Block),
            _ => None,
        }
    }
}

/// Normalized selection bounds; `start` never comes after `end` in the document.
///
/// `end.col` is inclusive. For [`SelectionKind::Block`], `start.col <= end.col` holds as well.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionBounds {
    /// Column interpretation.
    pub kind: SelectionKind,
    /// First selected position.
    pub start: Position,
    /// Last selected position (inclusive column).
    pub end: Position,
}

impl SelectionBounds {
    /// Normalize an anchor and a cursor position against `buffer`.
    pub fn new(kind: SelectionKind, anchor: Position, cursor: Position, buffer: &TextBuffer) -> Self {
        let (mut start, mut end) = if anchor <= cursor {
            (anchor, cursor)
        } else {
            (cursor, anchor)
        };
        let last_row = buffer.line_count() - 1;
        start.row = start.row.min(last_row);
        end.row = end.row.min(last_row);
        match kind {
            SelectionKind::Line => {
                start.col = 0;
                end.col = buffer.line_len(end.row).saturating_sub(1);
            }
            SelectionKind::Block if start.col > end.col => {
                std::mem::swap(&mut start.col, &mut end.col);
            }
            _ => {}
        }
        Self { kind, start, end }
    }

    /// Rows covered by the selection.
    pub fn rows(&self) -> std::ops::RangeInclusive<usize> {
        self.start.row..=self.end.row
    }

    /// Selected character range `[start, end)` on `row`, clipped to `line_len`.
    pub fn span(&self, row: usize, line_len: usize) -> (usize, usize) {
        let (start, end) = match self.kind {
            SelectionKind::Line => (0, line_len),
            SelectionKind::Block => (self.start.col, self.end.col + 1),
            SelectionKind::Char => {
                let start = if row == self.start.row { self.start.col } else { 0 };
                let end = if row == self.end.row {
                    self.end.col + 1
                } else {
                    line_len
                };
                (start, end)
            }
        };
        (start.min(line_len), end.min(line_len))
    }
}

impl Editor {
    /// Bounds of the current selection, or `None` outside the visual modes.
    pub fn selection_bounds(&self) -> Option<SelectionBounds> {
        let kind = SelectionKind::from_mode(self.mode)?;
        let buffer = self.active_buffer()?;
        Some(SelectionBounds::new(
            kind,
            self.visual_anchor,
            buffer.primary_cursor().position(),
            buffer,
        ))
    }

    /// The selected text. Rows are separated by `\n`; linewise selections end with `\n`.
    pub fn selection_text(&self) -> Option<String> {
        let bounds = self.selection_bounds()?;
        let buffer = self.active_buffer()?;
        let mut out = String::new();
        for row in bounds.rows() {
            let line = buffer.line(row).unwrap_or_default();
            let (start, end) = bounds.span(row, line.len());
            out.extend(&line[start..end]);
            if row < bounds.end.row || bounds.kind == SelectionKind::Line {
                out.push('\n');
            }
        }
        Some(out)
    }

    /// Delete the selection into the clipboard and return to normal mode.
    pub fn delete_selection(&mut self) {
        let Some(bounds) = self.selection_bounds() else {
            return;
        };
        let Some(idx) = self.begin_edit() else {
            return;
        };
        if let Some(text) = self.selection_text() {
            self.clipboard.set(text);
        }
        let buffer = &mut self.buffers[idx];
        match bounds.kind {
            SelectionKind::Line => {
                remove_rows(buffer, bounds.start.row, bounds.end.row);
                let row = bounds.start.row.min(buffer.line_count() - 1);
                buffer.set_primary_position(Position::new(row, 0));
            }
            SelectionKind::Block => {
                for row in bounds.rows().rev() {
                    let (start, end) = bounds.span(row, buffer.line_len(row));
                    if start < end {
                        buffer.replace_range(Position::new(row, start), Position::new(row, end), "");
                    }
                }
                buffer.set_primary_position(bounds.start);
            }
            SelectionKind::Char => {
                let (start, _) = bounds.span(bounds.start.row, buffer.line_len(bounds.start.row));
                let (_, end) = bounds.span(bounds.end.row, buffer.line_len(bounds.end.row));
                buffer.replace_range(
                    Position::new(bounds.start.row, start),
                    Position::new(bounds.end.row, end),
                    "",
                );
                buffer.set_primary_position(Position::new(bounds.start.row, start));
            }
        }
        buffer.finish_edit();
        self.mode = Mode::Normal;
    }

    /// Copy the selection into the clipboard and return to normal mode.
    pub fn yank_selection(&mut self) {
        if let Some(text) = self.selection_text() {
            self.clipboard.set(text);
        }
        self.mode = Mode::Normal;
    }

    /// Delete the selection and enter insert mode.
    pub fn change_selection(&mut self) {
        if self.begin_edit().is_none() || self.selection_bounds().is_none() {
            return;
        }
        self.delete_selection();
        self.mode = Mode::Insert;
    }

    /// Replace the selection with the clipboard; the clipboard keeps its content.
    pub fn paste_over_selection(&mut self) {
        if self.clipboard.is_empty() || self.selection_bounds().is_none() {
            return;
        }
        if self.begin_edit().is_none() {
            return;
        }
        let saved = self.clipboard.clone();
        self.delete_selection();
        self.clipboard = saved;
        self.paste_above();
    }

    /// Flip the case of every selected character and return to normal mode.
    pub fn toggle_case_selection(&mut self) {
        let Some(bounds) = self.selection_bounds() else {
            return;
        };
        let Some(idx) = self.begin_edit() else {
            return;
        };
        let buffer = &mut self.buffers[idx];
        let mut changed = false;
        for row in bounds.rows() {
            let line = buffer.line(row).unwrap_or_default();
            let (start, end) = bounds.span(row, line.len());
            let toggled: String = line[start..end].iter().map(|&c| toggle_char_case(c)).collect();
            if !line[start..end].iter().copied().eq(toggled.chars()) {
                buffer.replace_range(Position::new(row, start), Position::new(row, end), &toggled);
                changed = true;
            }
        }
        if changed {
            buffer.finish_edit();
        }
        self.mode = Mode::Normal;
    }

    /// Toggle the line comment on every selected row and return to normal mode.
    pub fn comment_selection(&mut self) {
        let Some(bounds) = self.selection_bounds() else {
            return;
        };
        let Some(idx) = self.begin_edit() else {
            return;
        };
        let buffer = &mut self.buffers[idx];
        let mut changed = false;
        for row in bounds.rows() {
            changed |= toggle_comment_row(buffer, row);
        }
        if changed {
            buffer.finish_edit();
        }
        self.mode = Mode::Normal;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn select(editor: &mut Editor, mode: Mode, anchor: Position, cursor: Position) {
        editor
            .active_buffer_mut()
            .unwrap()
            .set_primary_position(anchor);
        editor.set_mode(mode);
        editor
            .active_buffer_mut()
            .unwrap()
            .set_primary_position(cursor);
    }

    fn text(editor: &Editor) -> String {
        editor.active_buffer().map(TextBuffer::to_string).unwrap_or_default()
    }

    #[test]
    fn test_bounds_normalize_backwards_selection() {
        let mut editor = Editor::with_text("hello\nworld");
        select(&mut editor, Mode::Visual, Position::new(1, 2), Position::new(0, 3));
        let bounds = editor.selection_bounds().unwrap();
        assert_eq!(bounds.start, Position::new(0, 3));
        assert_eq!(bounds.end, Position::new(1, 2));
        assert_eq!(editor.selection_text().unwrap(), "lo\nwor");
    }

    #[test]
    fn test_line_selection_text_is_linewise() {
        let mut editor = Editor::with_text("a\nbb\nc");
        select(&mut editor, Mode::VisualLine, Position::new(1, 1), Position::new(0, 0));
        assert_eq!(editor.selection_text().unwrap(), "a\nbb\n");
    }

    #[test]
    fn test_block_delete_skips_short_rows() {
        let mut editor = Editor::with_text("abcdef\nab\nabcdef");
        select(&mut editor, Mode::VisualBlock, Position::new(0, 4), Position::new(2, 2));
        assert_eq!(editor.selection_text().unwrap(), "cde\n\ncde");
        editor.delete_selection();
        assert_eq!(text(&editor), "abf\nab\nabf");
        assert_eq!(editor.mode(), Mode::Normal);
    }

    #[test]
    fn test_char_delete_joins_rows() {
        let mut editor = Editor::with_text("hello\nworld");
        select(&mut editor, Mode::Visual, Position::new(0, 3), Position::new(1, 1));
        editor.delete_selection();
        assert_eq!(text(&editor), "helrld");
        assert_eq!(editor.clipboard().text(), "lo\nwo");
        assert_eq!(
            editor.active_buffer().unwrap().primary_cursor().position(),
            Position::new(0, 3)
        );
    }

    #[test]
    fn test_line_delete_of_whole_document() {
        let mut editor = Editor::with_text("a\nb");
        select(&mut editor, Mode::VisualLine, Position::new(0, 0), Position::new(1, 0));
        editor.delete_selection();
        assert_eq!(text(&editor), "");
        assert!(editor.clipboard().is_linewise());
    }

    #[test]
    fn test_toggle_case_block_only_touches_columns() {
        let mut editor = Editor::with_text("abcd\nefgh");
        select(&mut editor, Mode::VisualBlock, Position::new(0, 1), Position::new(1, 2));
        editor.toggle_case_selection();
        assert_eq!(text(&editor), "aBCd\neFGh");
    }
}
