//! Wiring sessions into `qwe_core::Editor`.
//!
//! A session is attached to its buffer as the buffer's [`qwe_core::DocumentSync`], so every edit
//! forwards `didChange` without the core knowing about LSP. The host keeps the returned
//! `Arc<LspSession>` to issue requests through [`LspEditorExt`].

use crate::error::LspError;
use crate::lsp_completion::CompletionItem;
use crate::lsp_session::{LspDocument, LspSession, LspSessionOptions, RedrawHook};
use crate::lsp_uri::file_uri_to_path;
use qwe_core::{DocumentSync, Editor, Position, TextBuffer};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Start a session for `buffer` and attach it as the buffer's document sync.
///
/// On failure the buffer is left untouched and keeps working without LSP features.
pub fn start_for_buffer(
    buffer: &mut TextBuffer,
    options: LspSessionOptions,
) -> Result<Arc<LspSession>, LspError> {
    let path = buffer.filename().ok_or(LspError::NoFilename)?.to_path_buf();
    let document = LspDocument::new(&path, buffer.file_type().language_id());
    info!(path = %path.display(), command = %options.command, "starting LSP");

    let session = match LspSession::spawn(document, &buffer.to_string(), options) {
        Ok(session) => Arc::new(session),
        Err(err) => {
            warn!(path = %path.display(), error = %err, "LSP start failed");
            return Err(err);
        }
    };
    buffer.attach_sync(Arc::clone(&session) as Arc<dyn DocumentSync>);
    Ok(session)
}

/// LSP-backed editor commands.
pub trait LspEditorExt {
    /// Start the file type's language server for the active buffer, if one is configured.
    ///
    /// Start failures are logged and yield `None`.
    fn start_lsp(&mut self, redraw: Option<RedrawHook>) -> Option<Arc<LspSession>>;

    /// Jump to the first definition of the symbol under the primary cursor.
    ///
    /// Records a jump first, switches to (or opens) the target file and clamps the cursor.
    /// Returns `Ok(false)` when there is no definition or the target cannot be opened.
    fn goto_definition(&mut self, session: &LspSession) -> Result<bool, LspError>;

    /// Hover text at the primary cursor. Errors are reported in the status message.
    fn hover(&mut self, session: &LspSession) -> Option<String>;

    /// Completion candidates at the primary cursor. Errors and empty results are reported in
    /// the status message.
    fn complete(&mut self, session: &LspSession) -> Vec<CompletionItem>;

    /// Replace the identifier before the primary cursor with `item`.
    fn apply_completion(&mut self, item: &CompletionItem);
}

impl LspEditorExt for Editor {
    fn start_lsp(&mut self, redraw: Option<RedrawHook>) -> Option<Arc<LspSession>> {
        let buffer = self.active_buffer_mut()?;
        let mut options = LspSessionOptions::for_file_type(buffer.file_type())?;
        options.redraw = redraw;
        start_for_buffer(buffer, options).ok()
    }

    fn goto_definition(&mut self, session: &LspSession) -> Result<bool, LspError> {
        let Some(pos) = self.active_buffer().map(|b| b.primary_cursor().position()) else {
            return Ok(false);
        };
        self.push_jump();

        let locations = session.definition(pos.row, pos.col)?;
        let Some(target) = locations.into_iter().next() else {
            debug!("no definition found");
            self.set_message("No definition found");
            return Ok(false);
        };

        let path = file_uri_to_path(&target.uri)
            .unwrap_or_else(|| PathBuf::from(target.uri.trim_start_matches("file://")));
        match self.find_buffer(&path) {
            Some(index) => self.set_active(index),
            None => {
                if let Err(err) = self.open_file(&path) {
                    warn!(path = %path.display(), error = %err, "cannot open definition target");
                    self.set_message(format!("Failed to load {}: {err}", path.display()));
                    return Ok(false);
                }
            }
        }

        let start = target.range.start;
        if let Some(buffer) = self.active_buffer_mut() {
            buffer.set_primary_position(Position::new(
                start.line as usize,
                start.character as usize,
            ));
        }
        Ok(true)
    }

    fn hover(&mut self, session: &LspSession) -> Option<String> {
        let pos = self.active_buffer()?.primary_cursor().position();
        match session.hover(pos.row, pos.col) {
            Ok(text) => {
                self.clear_message();
                Some(text)
            }
            Err(err) => {
                self.set_message(format!("LSP Hover error: {err}"));
                None
            }
        }
    }

    fn complete(&mut self, session: &LspSession) -> Vec<CompletionItem> {
        let Some(pos) = self.active_buffer().map(|b| b.primary_cursor().position()) else {
            return Vec::new();
        };
        match session.completion(pos.row, pos.col) {
            Ok(items) if items.is_empty() => {
                self.set_message("No completions available");
                items
            }
            Ok(items) => {
                self.clear_message();
                items
            }
            Err(err) => {
                self.set_message(format!("LSP Completion error: {err}"));
                Vec::new()
            }
        }
    }

    fn apply_completion(&mut self, item: &CompletionItem) {
        self.insert_completion(item.text_to_insert(), item.is_function());
    }
}
