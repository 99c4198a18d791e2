//! Word and delimiter based deletions.

use crate::cursor::Position;
use crate::editor::{Editor, Mode};
use crate::text::{CharClass, char_class, is_blank};

/// End (exclusive) of the word-clump starting at `start`.
///
/// Consumes the maximal run of `start`'s character class, then, for word and punctuation runs,
/// any following blanks when `include_spaces` is set.
pub(crate) fn word_end(line: &[char], start: usize, include_spaces: bool) -> usize {
    let class = char_class(line[start]);
    let mut end = start;
    while end < line.len() && char_class(line[end]) == class {
        end += 1;
    }
    if include_spaces && class != CharClass::Whitespace {
        while end < line.len() && is_blank(line[end]) {
            end += 1;
        }
    }
    end
}

/// Start of the word-clump ending at `end`: trailing blanks first, then one class run.
pub(crate) fn word_start_backward(line: &[char], end: usize) -> usize {
    let mut start = end;
    while start > 0 && is_blank(line[start - 1]) {
        start -= 1;
    }
    if start > 0 {
        let class = char_class(line[start - 1]);
        while start > 0 && char_class(line[start - 1]) == class {
            start -= 1;
        }
    }
    start
}

/// Interior (exclusive of the delimiters) of the delimiter pair to operate on.
///
/// Symmetric delimiters pair up in order of appearance; asymmetric ones are matched with a
/// stack. The innermost pair containing `col` wins, otherwise the nearest pair starting at or
/// after it. Pairs with an empty interior yield `None`.
pub(crate) fn find_inside(
    line: &[char],
    col: usize,
    open: char,
    close: char,
) -> Option<(usize, usize)> {
    let mut pairs = Vec::new();
    if open == close {
        let hits: Vec<usize> = line
            .iter()
            .enumerate()
            .filter(|&(_, &c)| c == open)
            .map(|(i, _)| i)
            .collect();
        pairs.extend(hits.chunks_exact(2).map(|p| (p[0], p[1])));
    } else {
        let mut stack = Vec::new();
        for (i, &c) in line.iter().enumerate() {
            if c == open {
                stack.push(i);
            } else if c == close
                && let Some(start) = stack.pop()
            {
                pairs.push((start, i));
            }
        }
    }

    let containing = pairs
        .iter()
        .filter(|&&(s, e)| s <= col && col <= e)
        .max_by_key(|&&(s, _)| s);
    let chosen = containing.or_else(|| {
        pairs
            .iter()
            .filter(|&&(s, _)| s >= col)
            .min_by_key(|&&(s, _)| s)
    })?;

    let (start, end) = *chosen;
    (end > start + 1).then_some((start + 1, end))
}

impl Editor {
    /// Delete the word-clump at every cursor; the primary cursor's text goes to the clipboard.
    ///
    /// With `include_spaces`, blanks following a word or punctuation run are deleted too.
    pub fn delete_word(&mut self, include_spaces: bool) {
        let Some(idx) = self.begin_edit() else {
            return;
        };
        let buffer = &mut self.buffers[idx];
        let mut changed = false;
        for i in buffer.cursor_indices_desc() {
            let pos = buffer.cursors()[i].position();
            let Some(line) = buffer.line(pos.row) else {
                continue;
            };
            if pos.col >= line.len() {
                continue;
            }
            let end = word_end(line, pos.col, include_spaces);
            let (removed, _) = buffer.replace_range(pos, Position::new(pos.row, end), "");
            if i == 0 {
                self.clipboard.set(removed);
            }
            changed = true;
        }
        if changed {
            buffer.finish_edit();
        }
    }

    /// Delete the word-clump before the primary cursor (blanks first, then one class run).
    pub fn delete_word_backward(&mut self) {
        let Some(idx) = self.begin_edit() else {
            return;
        };
        let buffer = &mut self.buffers[idx];
        let pos = buffer.primary_cursor().position();
        let line = buffer.line(pos.row).unwrap_or_default();
        if pos.col == 0 || line.is_empty() {
            return;
        }
        let start = word_start_backward(line, pos.col);
        buffer.replace_range(Position::new(pos.row, start), pos, "");
        buffer.set_primary_position(Position::new(pos.row, start));
        buffer.finish_edit();
    }

    /// Delete the text between `open` and `close` on the primary cursor's line.
    ///
    /// Returns `false` (and changes nothing) when no eligible pair exists.
    pub fn delete_inside(&mut self, open: char, close: char) -> bool {
        let Some(idx) = self.begin_edit() else {
            return false;
        };
        let buffer = &mut self.buffers[idx];
        let pos = buffer.primary_cursor().position();
        let line = buffer.line(pos.row).unwrap_or_default();
        let Some((start, end)) = find_inside(line, pos.col, open, close) else {
            return false;
        };
        buffer.replace_range(Position::new(pos.row, start), Position::new(pos.row, end), "");
        buffer.set_primary_position(Position::new(pos.row, start));
        buffer.finish_edit();
        true
    }

    /// [`Editor::delete_inside`], then insert mode if something was deleted.
    pub fn change_inside(&mut self, open: char, close: char) {
        if self.delete_inside(open, close) {
            self.mode = Mode::Insert;
        }
    }
}
