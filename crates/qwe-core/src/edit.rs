//! Character and line level edit operations.
//!
//! Operations that apply to every cursor walk the cursors bottom-right first (see
//! [`TextBuffer::sorted_cursors_desc`]) and rely on [`TextBuffer::replace_range`] to move
//! the cursors that have not been processed yet. Operations that only make sense for a single
//! caret act on the primary cursor.
//!
//! None of these record undo history; hosts call [`Editor::save_state`] once before each
//! logical command.

use crate::buffer::TextBuffer;
use crate::cursor::Position;
use crate::editor::{Editor, Mode};
use crate::text::{indentation, is_word_char, toggle_char_case};

impl Editor {
    /// Insert `ch` at every cursor.
    pub fn insert_rune(&mut self, ch: char) {
        let mut utf8 = [0u8; 4];
        let text: &str = ch.encode_utf8(&mut utf8);
        self.insert_at_cursors(text);
    }

    /// Insert one indentation unit (a tab or spaces, per the file type) at every cursor.
    pub fn insert_tab(&mut self) {
        let Some(buffer) = self.active_buffer() else {
            return;
        };
        let unit = buffer.file_type().indent_unit();
        self.insert_at_cursors(&unit);
    }

    fn insert_at_cursors(&mut self, text: &str) {
        let Some(idx) = self.begin_edit() else {
            return;
        };
        let buffer = &mut self.buffers[idx];
        for i in buffer.cursor_indices_desc() {
            let pos = buffer.cursors()[i].position();
            buffer.insert_text(pos, text);
        }
        buffer.finish_edit();
    }

    /// Delete the character under every cursor.
    ///
    /// The primary cursor's character goes to the clipboard. A cursor left past the end of its
    /// shortened line moves back onto the new last character.
    pub fn delete_char_under_cursor(&mut self) {
        let Some(idx) = self.begin_edit() else {
            return;
        };
        let buffer = &mut self.buffers[idx];
        let mut changed = false;
        for i in buffer.cursor_indices_desc() {
            let pos = buffer.cursors()[i].position();
            if pos.col >= buffer.line_len(pos.row) {
                continue;
            }
            let (removed, _) =
                buffer.replace_range(pos, Position::new(pos.row, pos.col + 1), "");
            if i == 0 {
                self.clipboard.set(removed);
            }
            let len = buffer.line_len(pos.row);
            let cursor = buffer.cursor_mut(i);
            if cursor.x > 0 && cursor.x >= len {
                cursor.x = len.saturating_sub(1);
            }
            changed = true;
        }
        if changed {
            buffer.finish_edit();
        }
    }

    /// Delete the character before every cursor, joining with the previous line at column 0.
    ///
    /// When lines are joined, cursors on the removed line keep their place relative to its
    /// text and cursors further down move up one row.
    pub fn backspace(&mut self) {
        let Some(idx) = self.begin_edit() else {
            return;
        };
        let buffer = &mut self.buffers[idx];
        let mut changed = false;
        for i in buffer.cursor_indices_desc() {
            let pos = buffer.cursors()[i].position();
            if pos.col > 0 {
                buffer.replace_range(Position::new(pos.row, pos.col - 1), pos, "");
            } else if pos.row > 0 {
                let prev_len = buffer.line_len(pos.row - 1);
                buffer.replace_range(Position::new(pos.row - 1, prev_len), pos, "");
            } else {
                continue;
            }
            changed = true;
        }
        if changed {
            buffer.finish_edit();
        }
    }

    /// Split the line at every cursor, carrying the indentation over to the new line.
    ///
    /// A split right after `{` adds one more indentation unit.
    pub fn insert_newline(&mut self) {
        let Some(idx) = self.begin_edit() else {
            return;
        };
        let buffer = &mut self.buffers[idx];
        let unit = buffer.file_type().indent_unit();
        for i in buffer.cursor_indices_desc() {
            let pos = buffer.cursors()[i].position();
            let line = buffer.line(pos.row).unwrap_or_default();
            let mut text = String::from("\n");
            text.extend(indentation(&line[..pos.col]));
            if pos.col > 0 && line[pos.col - 1] == '{' {
                text.push_str(&unit);
            }
            buffer.insert_text(pos, &text);
        }
        buffer.finish_edit();
    }

    /// Open a new line below the primary cursor and enter insert mode.
    pub fn insert_line_below(&mut self) {
        let Some(idx) = self.begin_edit() else {
            return;
        };
        let buffer = &mut self.buffers[idx];
        let row = buffer.primary_cursor().y;
        let line = buffer.line(row).unwrap_or_default();
        let mut indent: String = indentation(line).into_iter().collect();
        let trimmed_end = line.iter().rposition(|&c| c != ' ');
        if trimmed_end.is_some_and(|i| line[i] == '{') {
            indent.push_str(&buffer.file_type().indent_unit());
        }
        let end = Position::new(row, line.len());
        let new_end = buffer.insert_text(end, &format!("\n{indent}"));
        buffer.set_primary_position(new_end);
        buffer.finish_edit();
        self.mode = Mode::Insert;
    }

    /// Open a new line above the primary cursor and enter insert mode.
    pub fn insert_line_above(&mut self) {
        let Some(idx) = self.begin_edit() else {
            return;
        };
        let buffer = &mut self.buffers[idx];
        let row = buffer.primary_cursor().y;
        let indent: String = indentation(buffer.line(row).unwrap_or_default())
            .into_iter()
            .collect();
        buffer.insert_text(Position::new(row, 0), &format!("{indent}\n"));
        buffer.set_primary_position(Position::new(row, indent.chars().count()));
        buffer.finish_edit();
        self.mode = Mode::Insert;
    }

    /// Delete from every cursor to the end of its line. The primary cursor's text goes to the
    /// clipboard.
    pub fn delete_to_end_of_line(&mut self) {
        let Some(idx) = self.begin_edit() else {
            return;
        };
        let buffer = &mut self.buffers[idx];
        let mut changed = false;
        for i in buffer.cursor_indices_desc() {
            let pos = buffer.cursors()[i].position();
            let len = buffer.line_len(pos.row);
            if pos.col >= len {
                continue;
            }
            let (removed, _) = buffer.replace_range(pos, Position::new(pos.row, len), "");
            if i == 0 {
                self.clipboard.set(removed);
            }
            changed = true;
        }
        if changed {
            buffer.finish_edit();
        }
    }

    /// Delete the primary cursor's line into the clipboard (linewise).
    pub fn delete_line(&mut self) {
        let Some(idx) = self.begin_edit() else {
            return;
        };
        let buffer = &mut self.buffers[idx];
        let row = buffer.primary_cursor().y;
        self.clipboard.set(format!("{}\n", buffer.line_string(row)));
        remove_rows(buffer, row, row);
        let row = row.min(buffer.line_count() - 1);
        buffer.set_primary_position(Position::new(row, 0));
        buffer.finish_edit();
    }

    /// Copy the primary cursor's line into the clipboard (linewise).
    pub fn yank_line(&mut self) {
        let Some(buffer) = self.active_buffer() else {
            return;
        };
        let line = buffer.line_string(buffer.primary_cursor().y);
        self.clipboard.set(format!("{line}\n"));
    }

    /// Insert a copy of the primary cursor's line below it and move onto the copy.
    pub fn duplicate_line(&mut self) {
        let Some(idx) = self.begin_edit() else {
            return;
        };
        let buffer = &mut self.buffers[idx];
        let cursor = *buffer.primary_cursor();
        let line = buffer.line_string(cursor.y);
        let end = Position::new(cursor.y, buffer.line_len(cursor.y));
        buffer.insert_text(end, &format!("\n{line}"));
        buffer.set_primary_position(Position::new(cursor.y + 1, cursor.x));
        buffer.finish_edit();
    }

    /// Join the next line onto the primary cursor's line.
    ///
    /// The next line's indentation is dropped. A single space separates the two unless the
    /// current line is empty or ends in a space, or the next line has no text.
    pub fn join_lines(&mut self) {
        let Some(idx) = self.begin_edit() else {
            return;
        };
        let buffer = &mut self.buffers[idx];
        let row = buffer.primary_cursor().y;
        if row + 1 >= buffer.line_count() {
            return;
        }
        let current_len = buffer.line_len(row);
        let ends_with_space = buffer.line(row).and_then(|l| l.last()) == Some(&' ');
        let next = buffer.line(row + 1).unwrap_or_default();
        let trim = indentation(next).len();
        let needs_space = current_len > 0 && !ends_with_space && trim < next.len();

        let separator = if needs_space { " " } else { "" };
        buffer.replace_range(
            Position::new(row, current_len),
            Position::new(row + 1, trim),
            separator,
        );

        let new_len = buffer.line_len(row);
        let mut col = current_len;
        if !needs_space && col >= new_len && new_len > 0 {
            col = new_len - 1;
        }
        buffer.set_primary_position(Position::new(row, col));
        buffer.finish_edit();
    }

    /// Flip the case of the character under the primary cursor and step right.
    pub fn toggle_case_under_cursor(&mut self) {
        let Some(idx) = self.begin_edit() else {
            return;
        };
        let buffer = &mut self.buffers[idx];
        let pos = buffer.primary_cursor().position();
        let Some(&ch) = buffer.line(pos.row).and_then(|l| l.get(pos.col)) else {
            return;
        };
        let toggled = toggle_char_case(ch);
        if toggled != ch {
            buffer.replace_range(pos, Position::new(pos.row, pos.col + 1), &toggled.to_string());
        }
        let last = buffer.line_len(pos.row).saturating_sub(1);
        buffer.set_primary_position(Position::new(pos.row, (pos.col + 1).min(last)));
        if toggled != ch {
            buffer.finish_edit();
        }
    }

    /// Comment or uncomment the primary cursor's line with the file type's marker.
    pub fn toggle_comment_line(&mut self) {
        let Some(idx) = self.begin_edit() else {
            return;
        };
        let row = self.buffers[idx].primary_cursor().y;
        if toggle_comment_row(&mut self.buffers[idx], row) {
            self.buffers[idx].finish_edit();
        }
    }

    /// Delete to the end of the current word and enter insert mode.
    pub fn change_word(&mut self) {
        if self.begin_edit().is_none() {
            return;
        }
        self.delete_word(false);
        self.mode = Mode::Insert;
    }

    /// Delete the character under the cursor and enter insert mode.
    pub fn change_character(&mut self) {
        if self.begin_edit().is_none() {
            return;
        }
        self.delete_char_under_cursor();
        self.mode = Mode::Insert;
    }

    /// Delete to the end of the line and enter insert mode.
    pub fn change_to_end_of_line(&mut self) {
        if self.begin_edit().is_none() {
            return;
        }
        self.delete_to_end_of_line();
        self.mode = Mode::Insert;
    }

    /// Replace the identifier before the primary cursor with a completion.
    ///
    /// For functions, `()` is appended (unless a `(` already follows the cursor) and the cursor
    /// is placed between the parentheses.
    pub fn insert_completion(&mut self, text: &str, is_function: bool) {
        let Some(idx) = self.begin_edit() else {
            return;
        };
        let buffer = &mut self.buffers[idx];
        let pos = buffer.primary_cursor().position();
        let line = buffer.line(pos.row).unwrap_or_default();
        let start = line[..pos.col]
            .iter()
            .rposition(|&c| !is_word_char(c))
            .map_or(0, |i| i + 1);
        let add_parens = is_function && line.get(pos.col) != Some(&'(');

        let mut insert = text.to_string();
        let mut cursor_col = start + text.chars().count();
        if add_parens {
            insert.push_str("()");
            cursor_col += 1;
        }
        buffer.replace_range(Position::new(pos.row, start), pos, &insert);
        buffer.set_primary_position(Position::new(pos.row, cursor_col));
        buffer.finish_edit();
    }
}

/// Remove rows `first..=last`, leaving one empty line if the document would become empty.
pub(crate) fn remove_rows(buffer: &mut TextBuffer, first: usize, last: usize) {
    let last = last.min(buffer.line_count() - 1);
    if last + 1 < buffer.line_count() {
        buffer.replace_range(Position::new(first, 0), Position::new(last + 1, 0), "");
    } else if first > 0 {
        let start = Position::new(first - 1, buffer.line_len(first - 1));
        buffer.replace_range(start, Position::new(last, buffer.line_len(last)), "");
    } else {
        buffer.replace_range(
            Position::new(0, 0),
            Position::new(last, buffer.line_len(last)),
            "",
        );
    }
}

/// Toggle the line comment on `row`. Returns `true` if the line changed.
///
/// Commenting prefixes the marker and a space; uncommenting removes the marker and one
/// optional following space. Empty lines are left alone.
pub(crate) fn toggle_comment_row(buffer: &mut TextBuffer, row: usize) -> bool {
    let marker: Vec<char> = buffer.file_type().comment.chars().collect();
    if marker.is_empty() {
        return false;
    }
    let Some(line) = buffer.line(row) else {
        return false;
    };
    if line.is_empty() {
        return false;
    }
    if line.starts_with(&marker) {
        let mut end = marker.len();
        if line.get(end) == Some(&' ') {
            end += 1;
        }
        buffer.replace_range(Position::new(row, 0), Position::new(row, end), "");
    } else {
        let prefix: String = marker.iter().chain(std::iter::once(&' ')).collect();
        buffer.insert_text(Position::new(row, 0), &prefix);
    }
    true
}
