//! Yes/no confirmation prompts.
//!
//! A prompt stores which action to run as data; answering it runs that action or cancels.

use crate::editor::{Editor, Mode};
use crate::file::FileError;
use tracing::debug;

/// An action waiting for the user's confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingConfirm {
    /// Overwrite a file that changed on disk.
    Overwrite,
    /// Overwrite a file that changed on disk, then quit.
    OverwriteAndQuit,
}

impl PendingConfirm {
    /// The prompt shown while waiting for an answer.
    pub fn prompt(self) -> &'static str {
        "File changed on disk. Overwrite? (y/n) "
    }
}

/// The user's answer to a prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmAnswer {
    /// Run the pending action.
    Yes,
    /// Cancel it.
    No,
}

impl ConfirmAnswer {
    /// `y`/`Y` means yes; anything else (`n`, Esc, Enter) means no.
    pub fn from_char(ch: char) -> Self {
        if ch.eq_ignore_ascii_case(&'y') {
            Self::Yes
        } else {
            Self::No
        }
    }
}

impl Editor {
    /// Ask for confirmation before running `action`.
    pub fn request_confirm(&mut self, action: PendingConfirm) {
        self.message = action.prompt().to_string();
        self.pending_confirm = Some(action);
        self.mode = Mode::Confirm;
    }

    /// The action waiting for an answer.
    pub fn pending_confirm(&self) -> Option<PendingConfirm> {
        self.pending_confirm
    }

    /// Answer the pending prompt and return to normal mode.
    pub fn answer_confirm(&mut self, answer: ConfirmAnswer) {
        let Some(action) = self.pending_confirm.take() else {
            return;
        };
        self.mode = Mode::Normal;
        debug!(?action, ?answer, "confirmation answered");
        if answer == ConfirmAnswer::No {
            self.message = "Cancelled".to_string();
            return;
        }
        let saved = self.write_with_message(true);
        if saved && action == PendingConfirm::OverwriteAndQuit {
            self.quit_requested = true;
        }
    }

    /// `:w`: save the active buffer, asking first if the file changed on disk.
    pub fn write_active(&mut self) -> bool {
        self.write_or_confirm(PendingConfirm::Overwrite)
    }

    /// `:wq`: save the active buffer and quit, asking first if the file changed on disk.
    pub fn write_and_quit(&mut self) -> bool {
        let saved = self.write_or_confirm(PendingConfirm::OverwriteAndQuit);
        if saved {
            self.quit_requested = true;
        }
        saved
    }

    fn write_or_confirm(&mut self, on_conflict: PendingConfirm) -> bool {
        match self.save_active(false) {
            Ok(()) => {
                self.message = self.written_message();
                true
            }
            Err(FileError::ChangedOnDisk) => {
                self.request_confirm(on_conflict);
                false
            }
            Err(err) => {
                self.message = format!("Error saving file: {err}");
                false
            }
        }
    }

    fn write_with_message(&mut self, force: bool) -> bool {
        match self.save_active(force) {
            Ok(()) => {
                self.message = self.written_message();
                true
            }
            Err(err) => {
                self.message = format!("Error saving file: {err}");
                false
            }
        }
    }

    fn written_message(&self) -> String {
        let name = self
            .active_buffer()
            .and_then(|b| b.filename())
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "[No Name]".to_string());
        format!("\"{name}\" written")
    }
}
