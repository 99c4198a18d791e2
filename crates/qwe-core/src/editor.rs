//! Editor context: the buffer collection and the per-session editing state.
//!
//! Everything an edit operation needs lives on [`Editor`]; there is no process-wide state.
//! The edit operations themselves are implemented as further `impl Editor` blocks in the
//! sibling modules (`edit`, `paste`, `visual`, `replace`, ...).

use crate::buffer::TextBuffer;
use crate::config::EditorConfig;
use crate::confirm::PendingConfirm;
use crate::cursor::Position;
use crate::jumps::{Jump, JumpList};
use crate::register::Register;
use crate::replace::ReplaceScope;
use qwe_lang::FileType;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Message shown when an operation is attempted on a read-only buffer.
pub const READ_ONLY_MESSAGE: &str = "File is read-only";

/// Editing mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Commands and motions.
    #[default]
    Normal,
    /// Text entry.
    Insert,
    /// Characterwise selection.
    Visual,
    /// Linewise selection.
    VisualLine,
    /// Rectangular selection.
    VisualBlock,
    /// Entering a `/pattern/replacement/flags` command for a captured selection.
    Replace,
    /// Waiting for a yes/no answer to a [`PendingConfirm`].
    Confirm,
}

impl Mode {
    /// Returns `true` for the three visual modes.
    pub fn is_visual(self) -> bool {
        matches!(self, Mode::Visual | Mode::VisualLine | Mode::VisualBlock)
    }
}

/// The editing session: open buffers plus mode, clipboard and status state.
#[derive(Debug)]
pub struct Editor {
    pub(crate) buffers: Vec<TextBuffer>,
    pub(crate) active: usize,
    pub(crate) mode: Mode,
    pub(crate) clipboard: Register,
    pub(crate) visual_anchor: Position,
    pub(crate) message: String,
    pub(crate) config: EditorConfig,
    pub(crate) file_types: Vec<FileType>,
    pub(crate) pending_confirm: Option<PendingConfirm>,
    pub(crate) jumps: JumpList,
    pub(crate) last_search: String,
    pub(crate) replace_scope: Option<ReplaceScope>,
    pub(crate) quit_requested: bool,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl Editor {
    /// Create an editor with one empty, unnamed plain-text buffer.
    pub fn new(config: EditorConfig) -> Self {
        let file_types = FileType::with_tab_width(config.default_tab_width);
        let scratch = TextBuffer::new(Arc::new(FileType::plain_text(config.default_tab_width)))
            .with_history_depth(config.history_depth);
        Self {
            buffers: vec![scratch],
            active: 0,
            mode: Mode::Normal,
            clipboard: Register::default(),
            visual_anchor: Position::default(),
            message: String::new(),
            jumps: JumpList::new(config.jumplist_depth),
            config,
            file_types,
            pending_confirm: None,
            last_search: String::new(),
            replace_scope: None,
            quit_requested: false,
        }
    }

    /// Create an editor whose only buffer holds `text` (handy for embedding and tests).
    pub fn with_text(text: &str) -> Self {
        let mut editor = Self::default();
        let file_type = editor.buffers[0].file_type_arc();
        editor.buffers[0] = TextBuffer::from_text(text, file_type)
            .with_history_depth(editor.config.history_depth);
        editor
    }

    // ---------------------------------------------------------------------
    // Buffers
    // ---------------------------------------------------------------------

    /// All open buffers.
    pub fn buffers(&self) -> &[TextBuffer] {
        &self.buffers
    }

    /// Index of the active buffer.
    pub fn active_index(&self) -> usize {
        self.active
    }

    /// The active buffer, if any.
    pub fn active_buffer(&self) -> Option<&TextBuffer> {
        self.buffers.get(self.active)
    }

    /// Mutable access to the active buffer.
    pub fn active_buffer_mut(&mut self) -> Option<&mut TextBuffer> {
        self.buffers.get_mut(self.active)
    }

    /// Mutable access to any buffer.
    pub fn buffer_mut(&mut self, index: usize) -> Option<&mut TextBuffer> {
        self.buffers.get_mut(index)
    }

    /// Append a buffer and make it active. Returns its index.
    pub fn add_buffer(&mut self, buffer: TextBuffer) -> usize {
        self.buffers.push(buffer);
        self.active = self.buffers.len() - 1;
        self.active
    }

    /// Activate buffer `index` (ignored if out of range).
    pub fn set_active(&mut self, index: usize) {
        if index < self.buffers.len() {
            self.active = index;
        }
    }

    /// Cycle to the next buffer.
    pub fn next_buffer(&mut self) {
        if !self.buffers.is_empty() {
            self.active = (self.active + 1) % self.buffers.len();
        }
    }

    /// Cycle to the previous buffer.
    pub fn prev_buffer(&mut self) {
        if !self.buffers.is_empty() {
            self.active = (self.active + self.buffers.len() - 1) % self.buffers.len();
        }
    }

    /// Close the active buffer, shutting down its document sync.
    ///
    /// Closing the last buffer leaves a fresh empty plain-text buffer behind.
    pub fn close_active_buffer(&mut self) {
        if self.active >= self.buffers.len() {
            return;
        }
        let mut closed = self.buffers.remove(self.active);
        debug!(filename = ?closed.filename(), "closing buffer");
        closed.close();

        if self.buffers.is_empty() {
            let scratch =
                TextBuffer::new(Arc::new(FileType::plain_text(self.config.default_tab_width)))
                    .with_history_depth(self.config.history_depth);
            self.buffers.push(scratch);
            self.active = 0;
        } else if self.active >= self.buffers.len() {
            self.active = self.buffers.len() - 1;
        }
    }

    /// Index of the buffer backed by `path`, comparing absolute paths.
    pub fn find_buffer(&self, path: &Path) -> Option<usize> {
        let target = std::path::absolute(path).ok()?;
        self.buffers.iter().position(|b| {
            b.filename()
                .and_then(|f| std::path::absolute(f).ok())
                .is_some_and(|f| f == target)
        })
    }

    /// The file type configured for `path`.
    pub fn file_type_for(&self, path: &Path) -> FileType {
        FileType::detect_in(&self.file_types, path)
    }

    // ---------------------------------------------------------------------
    // Session state
    // ---------------------------------------------------------------------

    /// Editor settings.
    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Current mode.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Switch mode. Entering a visual mode anchors the selection at the primary cursor.
    pub fn set_mode(&mut self, mode: Mode) {
        if mode.is_visual()
            && !self.mode.is_visual()
            && let Some(buffer) = self.active_buffer()
        {
            self.visual_anchor = buffer.primary_cursor().position();
        }
        self.mode = mode;
    }

    /// The fixed end of the visual selection.
    pub fn visual_anchor(&self) -> Position {
        self.visual_anchor
    }

    /// Move the fixed end of the visual selection.
    pub fn set_visual_anchor(&mut self, anchor: Position) {
        self.visual_anchor = anchor;
    }

    /// Transient status message (last one wins).
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Set the status message.
    pub fn set_message(&mut self, message: impl Into<String>) {
        self.message = message.into();
    }

    /// Clear the status message.
    pub fn clear_message(&mut self) {
        self.message.clear();
    }

    /// The clipboard register.
    pub fn clipboard(&self) -> &Register {
        &self.clipboard
    }

    /// Overwrite the clipboard register.
    pub fn set_clipboard(&mut self, text: impl Into<String>) {
        self.clipboard.set(text);
    }

    /// Whether a quit was requested and allowed.
    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    /// Request to quit. Without `force`, refuses while any buffer has unsaved changes.
    pub fn request_quit(&mut self, force: bool) -> bool {
        if !force && self.buffers.iter().any(TextBuffer::is_modified) {
            self.message = "No write since last change (use :q! to override)".to_string();
            return false;
        }
        self.quit_requested = true;
        true
    }

    /// The active buffer's index if it may be edited.
    ///
    /// Sets the read-only message and returns `None` otherwise.
    pub(crate) fn begin_edit(&mut self) -> Option<usize> {
        let buffer = self.buffers.get(self.active)?;
        if buffer.is_read_only() {
            self.message = READ_ONLY_MESSAGE.to_string();
            return None;
        }
        Some(self.active)
    }

    // ---------------------------------------------------------------------
    // History and diagnostics
    // ---------------------------------------------------------------------

    /// Record an undo step for the active buffer.
    pub fn save_state(&mut self) {
        if let Some(buffer) = self.active_buffer_mut() {
            buffer.save_state();
        }
    }

    /// Undo the last step of the active buffer.
    pub fn undo(&mut self) -> bool {
        self.active_buffer_mut().is_some_and(TextBuffer::undo)
    }

    /// Redo the last undone step of the active buffer.
    pub fn redo(&mut self) -> bool {
        self.active_buffer_mut().is_some_and(TextBuffer::redo)
    }

    /// Push the active document to its synchronizer and copy back the latest diagnostics.
    pub fn refresh_diagnostics(&mut self) {
        if let Some(buffer) = self.active_buffer_mut() {
            buffer.refresh_diagnostics();
        }
    }

    // ---------------------------------------------------------------------
    // Jump list
    // ---------------------------------------------------------------------

    fn current_jump(&self) -> Option<Jump> {
        let buffer = self.active_buffer()?;
        let cursor = buffer.primary_cursor();
        Some(Jump {
            filename: buffer.filename().map(Path::to_path_buf),
            row: cursor.y,
            col: cursor.x,
        })
    }

    /// Record the primary cursor location in the jump list.
    pub fn push_jump(&mut self) {
        if let Some(jump) = self.current_jump() {
            self.jumps.push(jump);
        }
    }

    /// Go back in the jump list.
    pub fn jump_back(&mut self) {
        let Some(current) = self.current_jump() else {
            return;
        };
        if let Some(jump) = self.jumps.back(current) {
            self.perform_jump(&jump);
        }
    }

    /// Go forward in the jump list.
    pub fn jump_forward(&mut self) {
        if let Some(jump) = self.jumps.forward() {
            self.perform_jump(&jump);
        }
    }

    /// The jump list.
    pub fn jumps(&self) -> &JumpList {
        &self.jumps
    }

    fn perform_jump(&mut self, jump: &Jump) {
        if let Some(path) = &jump.filename {
            match self.find_buffer(path) {
                Some(index) => self.active = index,
                None => {
                    if let Err(err) = self.open_file(path) {
                        debug!(path = %path.display(), error = %err, "jump target could not be opened");
                        self.message = format!("Failed to open {}: {err}", path.display());
                        return;
                    }
                }
            }
        }
        if let Some(buffer) = self.active_buffer_mut() {
            buffer.clear_secondary_cursors();
            buffer.set_primary_position(Position::new(jump.row, jump.col));
        }
    }
}
