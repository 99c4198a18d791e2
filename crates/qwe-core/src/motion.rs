//! Cursor motions and multi-cursor management.

use crate::buffer::TextBuffer;
use crate::cursor::{Cursor, Position};
use crate::editor::Editor;
use crate::text::{CharClass, char_class, is_blank, is_path_char, is_word_char};

fn move_cursor(buffer: &TextBuffer, cursor: &mut Cursor, dx: isize, dy: isize) {
    if dy != 0 {
        let row = cursor.y as isize + dy;
        if row >= 0 && (row as usize) < buffer.line_count() {
            cursor.y = row as usize;
            cursor.x = cursor.preferred_col.min(buffer.line_len(cursor.y));
        }
    }
    if dx != 0 {
        let col = cursor.x as isize + dx;
        let len = buffer.line_len(cursor.y);
        if col < 0 {
            if cursor.y > 0 {
                cursor.y -= 1;
                cursor.x = buffer.line_len(cursor.y);
            }
        } else if col as usize > len {
            if cursor.y + 1 < buffer.line_count() {
                cursor.y += 1;
                cursor.x = 0;
            }
        } else {
            cursor.x = col as usize;
        }
        cursor.preferred_col = cursor.x;
    }
}

/// Start of the next word (word or punctuation run), crossing lines.
fn next_word_start(buffer: &TextBuffer, mut pos: Position) -> Position {
    let line = buffer.line(pos.row).unwrap_or_default();
    if pos.col < line.len() {
        let class = char_class(line[pos.col]);
        if class != CharClass::Whitespace {
            while pos.col < line.len() && char_class(line[pos.col]) == class {
                pos.col += 1;
            }
        }
    }
    loop {
        if pos.col >= buffer.line_len(pos.row) {
            if pos.row + 1 < buffer.line_count() {
                pos = Position::new(pos.row + 1, 0);
                continue;
            }
            break;
        }
        match buffer.line(pos.row).and_then(|l| l.get(pos.col)) {
            Some(&ch) if is_blank(ch) => pos.col += 1,
            _ => break,
        }
    }
    pos
}

/// Start of the previous word, crossing lines.
fn prev_word_start(buffer: &TextBuffer, mut pos: Position) -> Position {
    let step_back = |pos: &mut Position| -> bool {
        if pos.col > 0 {
            pos.col -= 1;
            true
        } else if pos.row > 0 {
            pos.row -= 1;
            pos.col = buffer.line_len(pos.row).saturating_sub(1);
            true
        } else {
            false
        }
    };

    if !step_back(&mut pos) {
        return pos;
    }
    loop {
        let line = buffer.line(pos.row).unwrap_or_default();
        let on_blank = line.get(pos.col).is_none_or(|&ch| is_blank(ch));
        if !on_blank || !step_back(&mut pos) {
            break;
        }
    }

    let line = buffer.line(pos.row).unwrap_or_default();
    if let Some(&ch) = line.get(pos.col) {
        let class = char_class(ch);
        while pos.col > 0 && char_class(line[pos.col - 1]) == class {
            pos.col -= 1;
        }
    }
    pos
}

impl Editor {
    /// Move every cursor by `dx` columns and `dy` rows.
    ///
    /// Vertical moves restore the preferred column (clamped to the line); horizontal moves
    /// wrap to the neighbouring line and reset the preferred column.
    pub fn move_cursors(&mut self, dx: isize, dy: isize) {
        let Some(buffer) = self.active_buffer_mut() else {
            return;
        };
        let mut cursors = buffer.cursors().to_vec();
        for cursor in &mut cursors {
            move_cursor(buffer, cursor, dx, dy);
        }
        buffer.cursors_mut().copy_from_slice(&cursors);
    }

    /// Move every cursor to the start of the next word, then merge colliding cursors.
    pub fn move_word_forward(&mut self) {
        self.move_words(next_word_start);
    }

    /// Move every cursor to the start of the previous word, then merge colliding cursors.
    pub fn move_word_backward(&mut self) {
        self.move_words(prev_word_start);
    }

    fn move_words(&mut self, step: fn(&TextBuffer, Position) -> Position) {
        let Some(buffer) = self.active_buffer_mut() else {
            return;
        };
        let targets: Vec<Position> = buffer
            .cursors()
            .iter()
            .map(|c| step(buffer, c.position()))
            .collect();
        for (cursor, target) in buffer.cursors_mut().iter_mut().zip(targets) {
            cursor.set_position(target);
            cursor.preferred_col = target.col;
        }
        buffer.merge_cursors();
    }

    fn move_primary(&mut self, target: impl FnOnce(&TextBuffer, Position) -> Position) {
        if let Some(buffer) = self.active_buffer_mut() {
            let pos = target(buffer, buffer.primary_cursor().position());
            buffer.set_primary_position(pos);
        }
    }

    /// Jump to the first line.
    pub fn jump_to_top(&mut self) {
        self.push_jump();
        self.move_primary(|_, _| Position::new(0, 0));
    }

    /// Jump to the last line.
    pub fn jump_to_bottom(&mut self) {
        self.push_jump();
        self.move_primary(|b, _| Position::new(b.line_count() - 1, 0));
    }

    /// Jump to 1-based line `line` (clamped).
    pub fn go_to_line(&mut self, line: usize) {
        self.push_jump();
        self.move_primary(|b, _| Position::new(line.saturating_sub(1).min(b.line_count() - 1), 0));
    }

    /// Move the primary cursor to column 0.
    pub fn jump_to_line_start(&mut self) {
        self.move_primary(|_, p| Position::new(p.row, 0));
    }

    /// Move the primary cursor past the last character of its line.
    pub fn jump_to_line_end(&mut self) {
        self.move_primary(|b, p| Position::new(p.row, b.line_len(p.row)));
    }

    /// Move the primary cursor to the first non-blank character (column 0 on blank lines).
    pub fn jump_to_first_non_blank(&mut self) {
        self.move_primary(|b, p| {
            let col = b
                .line(p.row)
                .and_then(|l| l.iter().position(|&c| !is_blank(c)))
                .unwrap_or(0);
            Position::new(p.row, col)
        });
    }

    /// Jump to the closest empty line above, or the top of the document.
    pub fn jump_to_prev_empty_line(&mut self) {
        self.push_jump();
        self.move_primary(|b, p| {
            let row = (0..p.row).rev().find(|&r| b.line_len(r) == 0).unwrap_or(0);
            Position::new(row, 0)
        });
    }

    /// Jump to the closest empty line below, or the bottom of the document.
    pub fn jump_to_next_empty_line(&mut self) {
        self.push_jump();
        self.move_primary(|b, p| {
            let last = b.line_count() - 1;
            let row = (p.row + 1..b.line_count())
                .find(|&r| b.line_len(r) == 0)
                .unwrap_or(last);
            Position::new(row, 0)
        });
    }

    /// Add a cursor on the line above the primary cursor.
    pub fn add_cursor_above(&mut self) {
        if let Some(buffer) = self.active_buffer_mut() {
            let primary = *buffer.primary_cursor();
            if primary.y > 0 {
                buffer.add_cursor(primary.x, primary.y - 1);
            }
        }
    }

    /// Add a cursor on the line below the lowest cursor, at the larger of its column and
    /// preferred column.
    pub fn add_cursor_below(&mut self) {
        if let Some(buffer) = self.active_buffer_mut() {
            let Some(lowest) = buffer.cursors().iter().copied().reduce(|low, c| {
                if c.y > low.y { c } else { low }
            }) else {
                return;
            };
            if lowest.y + 1 < buffer.line_count() {
                buffer.add_cursor(lowest.x.max(lowest.preferred_col), lowest.y + 1);
            }
        }
    }

    /// Drop every cursor except the primary one.
    pub fn clear_secondary_cursors(&mut self) {
        if let Some(buffer) = self.active_buffer_mut() {
            buffer.clear_secondary_cursors();
        }
    }

    /// The identifier under the primary cursor (empty if the cursor is not on one).
    pub fn word_under_cursor(&self) -> String {
        self.run_under_cursor(is_word_char)
    }

    /// The path-like text under the primary cursor (empty if none).
    pub fn path_under_cursor(&self) -> String {
        self.run_under_cursor(is_path_char)
    }

    fn run_under_cursor(&self, accept: fn(char) -> bool) -> String {
        let Some(buffer) = self.active_buffer() else {
            return String::new();
        };
        let pos = buffer.primary_cursor().position();
        let line = buffer.line(pos.row).unwrap_or_default();
        if !line.get(pos.col).is_some_and(|&c| accept(c)) {
            return String::new();
        }
        let start = line[..pos.col]
            .iter()
            .rposition(|&c| !accept(c))
            .map_or(0, |i| i + 1);
        let end = line[pos.col..]
            .iter()
            .position(|&c| !accept(c))
            .map_or(line.len(), |i| pos.col + i);
        line[start..end].iter().collect()
    }
}
