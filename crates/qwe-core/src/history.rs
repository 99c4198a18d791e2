//! Snapshot-based undo/redo history.
//!
//! Each [`HistoryState`] is a fully independent copy of a buffer's lines and cursors; nothing
//! is shared between snapshots or with the live buffer. Callers decide where undo boundaries go
//! by calling [`crate::TextBuffer::save_state`] once per logical command.

use crate::cursor::Cursor;
use std::collections::VecDeque;

/// Default maximum number of undo entries kept per buffer.
pub const DEFAULT_HISTORY_DEPTH: usize = 100;

/// An immutable copy of a buffer's lines and cursors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryState {
    /// Document lines at the time of the snapshot.
    pub lines: Vec<Vec<char>>,
    /// Cursors at the time of the snapshot.
    pub cursors: Vec<Cursor>,
}

/// Bounded undo and redo stacks.
#[derive(Debug, Clone)]
pub struct UndoHistory {
    undo: VecDeque<HistoryState>,
    redo: Vec<HistoryState>,
    max_depth: usize,
}

impl Default for UndoHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_DEPTH)
    }
}

impl UndoHistory {
    /// Create an empty history that keeps at most `max_depth` undo entries.
    pub fn new(max_depth: usize) -> Self {
        Self {
            undo: VecDeque::new(),
            redo: Vec::new(),
            max_depth: max_depth.max(1),
        }
    }

    /// Record `state` as the newest undo entry and drop all redo entries.
    pub fn push(&mut self, state: HistoryState) {
        self.undo.push_back(state);
        while self.undo.len() > self.max_depth {
            self.undo.pop_front();
        }
        self.redo.clear();
    }

    /// Exchange `current` for the newest undo entry; `current` goes onto the redo stack.
    pub fn undo(&mut self, current: HistoryState) -> Option<HistoryState> {
        let state = self.undo.pop_back()?;
        self.redo.push(current);
        Some(state)
    }

    /// Exchange `current` for the newest redo entry; `current` goes onto the undo stack.
    pub fn redo(&mut self, current: HistoryState) -> Option<HistoryState> {
        let state = self.redo.pop()?;
        self.undo.push_back(current);
        while self.undo.len() > self.max_depth {
            self.undo.pop_front();
        }
        Some(state)
    }

    /// Drop all history.
    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }

    /// Number of undo entries.
    pub fn undo_depth(&self) -> usize {
        self.undo.len()
    }

    /// Number of redo entries.
    pub fn redo_depth(&self) -> usize {
        self.redo.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(text: &str) -> HistoryState {
        HistoryState {
            lines: vec![text.chars().collect()],
            cursors: vec![Cursor::default()],
        }
    }

    #[test]
    fn test_push_truncates_from_the_front() {
        let mut history = UndoHistory::new(3);
        for t in ["a", "b", "c", "d"] {
            history.push(state(t));
        }
        assert_eq!(history.undo_depth(), 3);

        let mut current = state("e");
        let mut seen = Vec::new();
        while let Some(prev) = history.undo(current.clone()) {
            seen.push(prev.lines[0].iter().collect::<String>());
            current = prev;
        }
        assert_eq!(seen, vec!["d", "c", "b"]);
    }

    #[test]
    fn test_push_clears_redo() {
        let mut history = UndoHistory::default();
        history.push(state("a"));
        assert!(history.undo(state("b")).is_some());
        assert_eq!(history.redo_depth(), 1);

        history.push(state("c"));
        assert_eq!(history.redo_depth(), 0);
    }
}
