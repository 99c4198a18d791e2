//! Pasting the clipboard register.
//!
//! Linewise content (ending in `\n`) becomes whole new lines; characterwise content is spliced
//! into the current line, splitting it when the content spans several lines.

use crate::cursor::Position;
use crate::editor::Editor;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Placement {
    After,
    Before,
}

impl Editor {
    /// Paste below the cursor line (linewise) or after the cursor character (characterwise).
    pub fn paste_after(&mut self) {
        self.paste(Placement::After);
    }

    /// Paste above the cursor line (linewise) or at the cursor (characterwise).
    pub fn paste_above(&mut self) {
        self.paste(Placement::Before);
    }

    fn paste(&mut self, placement: Placement) {
        if self.clipboard.is_empty() {
            return;
        }
        let Some(idx) = self.begin_edit() else {
            return;
        };
        let buffer = &mut self.buffers[idx];
        let cursor = buffer.primary_cursor().position();

        if let Some(lines) = self.clipboard.lines() {
            let body = lines.join("\n");
            let target = match placement {
                Placement::After => {
                    let at = Position::new(cursor.row, buffer.line_len(cursor.row));
                    buffer.insert_text(at, &format!("\n{body}"));
                    Position::new(cursor.row + lines.len(), 0)
                }
                Placement::Before => {
                    buffer.insert_text(Position::new(cursor.row, 0), &format!("{body}\n"));
                    Position::new(cursor.row, 0)
                }
            };
            buffer.set_primary_position(target);
        } else {
            let text = self.clipboard.text();
            let len = buffer.line_len(cursor.row);
            let at = match placement {
                Placement::After if len > 0 => (cursor.col + 1).min(len),
                _ => cursor.col.min(len),
            };
            let new_end = buffer.insert_text(Position::new(cursor.row, at), text);
            let target = if text.contains('\n') {
                new_end
            } else {
                // Land on the last pasted character.
                Position::new(cursor.row, (at + text.chars().count()).saturating_sub(1))
            };
            buffer.set_primary_position(target);
        }
        buffer.finish_edit();
    }
}
