#![warn(missing_docs)]
//! `qwe-core` - headless buffer and edit engine for a modal terminal editor.
//!
//! # Overview
//!
//! The core owns documents as arrays of lines (each line a `Vec<char>`), any number of cursors
//! per document, snapshot-based undo/redo and the editing operations a modal editor binds to
//! keys. It does not render, read input or talk to language servers; those collaborators plug in
//! through the [`SyntaxListener`] and [`DocumentSync`] traits.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  Editor (buffers, mode, clipboard, jumps)   │  ← Public API
//! ├─────────────────────────────────────────────┤
//! │  Operations (edit, paste, visual, replace,  │
//! │  reflow, search, motion, file)              │  ← Commands
//! ├─────────────────────────────────────────────┤
//! │  TextBuffer (lines, cursors, history)       │  ← Document state
//! ├─────────────────────────────────────────────┤
//! │  SyntaxListener / DocumentSync              │  ← Collaborators
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use qwe_core::{Editor, Mode};
//!
//! let mut editor = Editor::with_text("alpha\nbeta");
//! editor.add_cursor_below();
//!
//! editor.save_state();
//! editor.set_mode(Mode::Insert);
//! for ch in "> ".chars() {
//!     editor.insert_rune(ch);
//! }
//!
//! assert_eq!(editor.active_buffer().unwrap().to_string(), "> alpha\n> beta");
//! editor.undo();
//! assert_eq!(editor.active_buffer().unwrap().to_string(), "alpha\nbeta");
//! ```
//!
//! # Multi-cursor edits
//!
//! Every mutating operation applies to cursors bottom-right first, so an edit never shifts text
//! under a cursor that has not been processed yet. All cursors are mapped through every
//! primitive edit, which keeps same-row cursors and merged lines consistent.
//!
//! # Undo
//!
//! Operations do not record undo steps themselves. Hosts call [`Editor::save_state`] before each
//! command that should undo as one unit.

pub mod buffer;
pub mod config;
pub mod confirm;
pub mod cursor;
pub mod diagnostics;
mod edit;
pub mod editor;
pub mod file;
pub mod format;
pub mod history;
pub mod jumps;
mod motion;
mod paste;
pub mod register;
pub mod replace;
mod search;
pub mod sync;
pub mod syntax;
pub mod text;
mod text_object;
pub mod visual;

pub use buffer::TextBuffer;
pub use config::EditorConfig;
pub use confirm::{ConfirmAnswer, PendingConfirm};
pub use cursor::{Cursor, Position};
pub use diagnostics::{Diagnostic, DiagnosticRange, DiagnosticSeverity};
pub use editor::{Editor, Mode, READ_ONLY_MESSAGE};
pub use file::{FileChangePoller, FileError, read_lines};
pub use format::{ReflowOptions, detect_comment_prefix, reflow_lines};
pub use history::{DEFAULT_HISTORY_DEPTH, HistoryState, UndoHistory};
pub use jumps::{Jump, JumpList};
pub use register::Register;
pub use replace::{MatchRange, ReplaceCommand, ReplaceError, ReplaceScope, parse_replace_command};
pub use sync::{DocumentSync, SyncError};
pub use syntax::{SyntaxEdit, SyntaxListener};
pub use text::{CharClass, byte_len, char_class, is_word_char, visual_column};
pub use visual::{SelectionBounds, SelectionKind};

pub use qwe_lang::FileType;
