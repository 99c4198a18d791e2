//! Case-insensitive literal search.

use crate::cursor::Position;
use crate::editor::Editor;

fn fold(ch: char) -> char {
    ch.to_lowercase().next().unwrap_or(ch)
}

/// Every column where `needle` starts in `line` (overlapping, case-insensitive).
fn match_columns(line: &[char], needle: &[char]) -> Vec<usize> {
    if needle.is_empty() || needle.len() > line.len() {
        return Vec::new();
    }
    (0..=line.len() - needle.len())
        .filter(|&start| {
            line[start..start + needle.len()]
                .iter()
                .zip(needle)
                .all(|(&a, &b)| fold(a) == b)
        })
        .collect()
}

impl Editor {
    /// Move the primary cursor to the next (or previous) occurrence of `query`.
    ///
    /// The search starts at the primary cursor, skips the match under it, and wraps around
    /// the document once. The query is remembered for [`Editor::find_next`] and
    /// [`Editor::find_prev`], and the starting point is pushed onto the jump list. Returns
    /// `false` if nothing was found.
    pub fn search(&mut self, query: &str, forward: bool) -> bool {
        if query.is_empty() {
            return false;
        }
        self.last_search = query.to_string();
        self.push_jump();

        let Some(buffer) = self.active_buffer() else {
            return false;
        };
        let needle: Vec<char> = query.chars().map(fold).collect();
        let start = buffer.primary_cursor().position();
        let count = buffer.line_count();

        let mut row = start.row;
        let mut found = None;
        for step in 0..=count {
            let columns = match_columns(buffer.line(row).unwrap_or_default(), &needle);
            let first_line = step == 0;
            let hit = if forward {
                columns
                    .into_iter()
                    .find(|&col| !first_line || col > start.col)
            } else {
                columns
                    .into_iter()
                    .rev()
                    .find(|&col| !first_line || col < start.col)
            };
            if let Some(col) = hit {
                found = Some(Position::new(row, col));
                break;
            }
            row = if forward {
                (row + 1) % count
            } else {
                (row + count - 1) % count
            };
        }

        match found {
            Some(pos) => {
                if let Some(buffer) = self.active_buffer_mut() {
                    buffer.set_primary_position(pos);
                }
                true
            }
            None => {
                self.message = format!("Pattern not found: {query}");
                false
            }
        }
    }

    /// Repeat the last search forward.
    pub fn find_next(&mut self) -> bool {
        let query = self.last_search.clone();
        self.search(&query, true)
    }

    /// Repeat the last search backward.
    pub fn find_prev(&mut self) -> bool {
        let query = self.last_search.clone();
        self.search(&query, false)
    }

    /// The last search query.
    pub fn last_search(&self) -> &str {
        &self.last_search
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn primary(editor: &Editor) -> Position {
        editor.active_buffer().unwrap().primary_cursor().position()
    }

    #[test]
    fn test_search_skips_match_under_cursor_and_wraps() {
        let mut editor = Editor::with_text("foo bar\nbaz FOO");
        assert!(editor.search("foo", true));
        assert_eq!(primary(&editor), Position::new(1, 4));
        assert!(editor.find_next());
        assert_eq!(primary(&editor), Position::new(0, 0));
    }

    #[test]
    fn test_search_backward() {
        let mut editor = Editor::with_text("ab ab ab");
        editor
            .active_buffer_mut()
            .unwrap()
            .set_primary_position(Position::new(0, 5));
        assert!(editor.search("AB", false));
        assert_eq!(primary(&editor), Position::new(0, 3));
    }

    #[test]
    fn test_search_miss_sets_message() {
        let mut editor = Editor::with_text("abc");
        assert!(!editor.search("zzz", true));
        assert_eq!(editor.message(), "Pattern not found: zzz");
    }
}
