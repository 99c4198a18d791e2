//! Cursor and position types.

use std::cmp::Ordering;

/// A document position (row and column, both zero-based).
///
/// Columns count Unicode scalar values (`char`), not bytes or display cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Position {
    /// Zero-based row.
    pub row: usize,
    /// Zero-based column in characters.
    pub col: usize,
}

impl Position {
    /// Create a new position.
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl Ord for Position {
    fn cmp(&self, other: &Self) -> Ordering {
        self.row
            .cmp(&other.row)
            .then_with(|| self.col.cmp(&other.col))
    }
}

impl PartialOrd for Position {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A caret inside a [`crate::TextBuffer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cursor {
    /// Column (characters, 0-based). May equal the line length (end of line).
    pub x: usize,
    /// Row (0-based).
    pub y: usize,
    /// Column remembered across vertical motion over lines of varying length.
    pub preferred_col: usize,
}

impl Cursor {
    /// Create a cursor at `(x, y)` that also prefers column `x`.
    pub fn new(x: usize, y: usize) -> Self {
        Self {
            x,
            y,
            preferred_col: x,
        }
    }

    /// The cursor location as a [`Position`].
    pub fn position(&self) -> Position {
        Position::new(self.y, self.x)
    }

    /// Move the cursor to `pos` without touching the preferred column.
    pub fn set_position(&mut self, pos: Position) {
        self.y = pos.row;
        self.x = pos.col;
    }
}

/// Map a position through an edit that replaced `start..old_end` and now ends at `new_end`.
///
/// Positions before the edit are untouched, positions inside the removed range collapse to
/// `start`, and positions at or after `old_end` move with the text that followed the edit.
pub(crate) fn transform_position(
    pos: Position,
    start: Position,
    old_end: Position,
    new_end: Position,
) -> Position {
    if pos < start {
        return pos;
    }
    if pos < old_end {
        return start;
    }
    if pos.row == old_end.row {
        Position::new(new_end.row, new_end.col + (pos.col - old_end.col))
    } else {
        // Rows strictly below the edit keep their column.
        Position::new(pos.row + new_end.row - old_end.row, pos.col)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_ordering() {
        assert!(Position::new(0, 5) < Position::new(1, 0));
        assert!(Position::new(2, 1) < Position::new(2, 3));
    }

    #[test]
    fn test_transform_insertion_on_same_row() {
        let start = Position::new(0, 2);
        let new_end = Position::new(0, 3);
        assert_eq!(
            transform_position(Position::new(0, 5), start, start, new_end),
            Position::new(0, 6)
        );
        assert_eq!(
            transform_position(Position::new(0, 1), start, start, new_end),
            Position::new(0, 1)
        );
    }

    #[test]
    fn test_transform_line_merge() {
        // Joining row 1 onto the end of row 0 (length 3).
        let start = Position::new(0, 3);
        let old_end = Position::new(1, 0);
        assert_eq!(
            transform_position(Position::new(1, 2), start, old_end, start),
            Position::new(0, 5)
        );
        assert_eq!(
            transform_position(Position::new(4, 1), start, old_end, start),
            Position::new(3, 1)
        );
    }
}
