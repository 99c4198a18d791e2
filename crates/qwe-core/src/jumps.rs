//! Jump list for returning to earlier cursor locations.

use std::path::PathBuf;

/// A remembered location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Jump {
    /// File of the buffer the jump was recorded in (`None` for an unnamed buffer).
    pub filename: Option<PathBuf>,
    /// Row of the primary cursor.
    pub row: usize,
    /// Column of the primary cursor.
    pub col: usize,
}

/// Bounded jump history with a movable position.
#[derive(Debug, Clone)]
pub struct JumpList {
    entries: Vec<Jump>,
    /// Index of the current entry; `None` before the first entry.
    index: Option<usize>,
    max_depth: usize,
}

impl JumpList {
    /// Create an empty list that keeps at most `max_depth` entries.
    pub fn new(max_depth: usize) -> Self {
        Self {
            entries: Vec::new(),
            index: None,
            max_depth: max_depth.max(1),
        }
    }

    /// All entries, oldest first.
    pub fn entries(&self) -> &[Jump] {
        &self.entries
    }

    /// Index of the current entry.
    pub fn index(&self) -> Option<usize> {
        self.index
    }

    /// Record `jump`.
    ///
    /// Entries after the current position are discarded, and a jump equal to the newest entry is
    /// not recorded twice.
    pub fn push(&mut self, jump: Jump) {
        if let Some(index) = self.index {
            self.entries.truncate(index + 1);
        } else {
            self.entries.clear();
        }
        if self.entries.last() == Some(&jump) {
            self.index = Some(self.entries.len() - 1);
            return;
        }
        self.entries.push(jump);
        if self.entries.len() > self.max_depth {
            self.entries.remove(0);
        }
        self.index = Some(self.entries.len() - 1);
    }

    /// Step back. `current` is recorded first when leaving the newest entry so that
    /// [`JumpList::forward`] can return to it.
    pub fn back(&mut self, current: Jump) -> Option<Jump> {
        let index = self.index?;
        if index + 1 == self.entries.len() && self.entries[index] != current {
            self.entries.push(current);
            return Some(self.entries[index].clone());
        }
        let prev = index.checked_sub(1);
        self.index = prev;
        prev.map(|i| self.entries[i].clone())
    }

    /// Step forward again after [`JumpList::back`].
    pub fn forward(&mut self) -> Option<Jump> {
        let next = self.index.map_or(0, |i| i + 1);
        let jump = self.entries.get(next)?.clone();
        self.index = Some(next);
        Some(jump)
    }
}

impl Default for JumpList {
    fn default() -> Self {
        Self::new(100)
    }
}
