//! Loading, saving and on-disk change detection.

use crate::buffer::TextBuffer;
use crate::editor::Editor;
use qwe_lang::FileType;
use std::fs;
use std::io::{self, BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, SystemTime};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
/// Errors produced by file operations.
pub enum FileError {
    #[error("no file name")]
    /// The buffer has no file name to save to.
    NoFilename,

    #[error("file changed on disk")]
    /// The file was modified on disk after it was loaded or last saved.
    ChangedOnDisk,

    #[error("failed to create directory {path}: {source}")]
    /// A missing parent directory could not be created.
    CreateDir {
        /// The directory that could not be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    /// Any other I/O failure.
    Io(#[from] io::Error),
}

/// Split `reader` into editor lines.
///
/// A trailing `\r` is stripped from every line, tabs are expanded when the file type does not
/// use them, and a final newline does not produce an extra empty line.
pub fn read_lines<R: Read>(reader: R, file_type: &FileType) -> io::Result<Vec<Vec<char>>> {
    let tab: Vec<char> = vec![' '; file_type.tab_width];
    let mut lines = Vec::new();
    for line in BufReader::new(reader).lines() {
        let line = line?;
        let line = line.strip_suffix('\r').unwrap_or(line.as_str());
        let chars = if file_type.use_tabs {
            line.chars().collect()
        } else {
            line.chars().fold(Vec::new(), |mut acc, ch| {
                if ch == '\t' {
                    acc.extend_from_slice(&tab);
                } else {
                    acc.push(ch);
                }
                acc
            })
        };
        lines.push(chars);
    }
    if lines.is_empty() {
        lines.push(Vec::new());
    }
    Ok(lines)
}

fn modified_time(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).and_then(|m| m.modified()).ok()
}

fn document_bytes(buffer: &TextBuffer) -> String {
    let mut text = buffer.to_string();
    if !(buffer.line_count() == 1 && buffer.line_len(0) == 0) {
        text.push('\n');
    }
    text
}

impl TextBuffer {
    /// Build a buffer for `path` from `reader`.
    pub fn from_reader<R: Read>(
        path: impl Into<PathBuf>,
        reader: R,
        file_type: Arc<FileType>,
    ) -> io::Result<Self> {
        let lines = read_lines(reader, &file_type)?;
        let mut buffer = Self::from_lines(lines, file_type);
        buffer.set_filename(path);
        Ok(buffer)
    }

    /// Whether the file on disk is newer than what this buffer last loaded or saved.
    pub fn changed_on_disk(&self) -> bool {
        let (Some(path), Some(known)) = (self.filename(), self.last_mod_time()) else {
            return false;
        };
        modified_time(path).is_some_and(|on_disk| on_disk > known)
    }
}

impl Editor {
    /// Open `path` and make it the active buffer; returns its index.
    ///
    /// An already open file is just activated. A missing file is created along with its parent
    /// directories. The initial unnamed empty buffer is replaced instead of kept around.
    pub fn open_file(&mut self, path: impl AsRef<Path>) -> Result<usize, FileError> {
        let path = path.as_ref();
        if let Some(index) = self.find_buffer(path) {
            self.active = index;
            return Ok(index);
        }

        if !path.exists() {
            if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
                fs::create_dir_all(dir).map_err(|source| FileError::CreateDir {
                    path: dir.to_path_buf(),
                    source,
                })?;
            }
            fs::File::create(path)?;
            debug!(path = %path.display(), "created missing file");
        }

        let file_type = Arc::new(self.file_type_for(path));
        let file = fs::File::open(path)?;
        let mut buffer = TextBuffer::from_reader(path, file, file_type)?
            .with_history_depth(self.config.history_depth);
        buffer.set_last_mod_time(modified_time(path));
        info!(path = %path.display(), lines = buffer.line_count(), language = %buffer.file_type().name, "opened file");

        let index = if self.buffers.len() == 1 && self.buffers[0].is_blank_scratch() {
            self.buffers[0] = buffer;
            0
        } else {
            self.buffers.push(buffer);
            self.buffers.len() - 1
        };
        self.active = index;
        Ok(index)
    }

    /// Save the active buffer to its file name.
    ///
    /// Without `force`, refuses with [`FileError::ChangedOnDisk`] if the file changed on disk
    /// since it was loaded or last saved.
    pub fn save_active(&mut self, force: bool) -> Result<(), FileError> {
        let buffer = self.active_buffer_mut().ok_or(FileError::NoFilename)?;
        let path = buffer.filename().ok_or(FileError::NoFilename)?.to_path_buf();
        if !force && buffer.changed_on_disk() {
            return Err(FileError::ChangedOnDisk);
        }
        fs::write(&path, document_bytes(buffer))?;
        buffer.set_modified(false);
        buffer.set_last_mod_time(modified_time(&path));
        debug!(path = %path.display(), "saved buffer");
        Ok(())
    }

    /// Give the active buffer a new file name (and file type), then save it.
    pub fn save_active_as(&mut self, path: impl Into<PathBuf>, force: bool) -> Result<(), FileError> {
        let path = path.into();
        let file_type = Arc::new(self.file_type_for(&path));
        if let Some(buffer) = self.active_buffer_mut() {
            buffer.set_filename(path);
            buffer.set_file_type(file_type);
            buffer.set_last_mod_time(None);
        }
        self.save_active(force)
    }

    /// Re-read buffer `index` from disk, discarding its unsaved changes.
    pub fn reload_buffer(&mut self, index: usize) -> Result<(), FileError> {
        let buffer = self.buffers.get_mut(index).ok_or(FileError::NoFilename)?;
        let path = buffer.filename().ok_or(FileError::NoFilename)?.to_path_buf();
        let lines = read_lines(fs::File::open(&path)?, buffer.file_type())?;
        buffer.replace_lines(lines);
        buffer.content_replaced();
        buffer.set_modified(false);
        buffer.set_last_mod_time(modified_time(&path));
        info!(path = %path.display(), "reloaded buffer from disk");
        Ok(())
    }

    /// `:reload`: re-read the active buffer.
    pub fn reload_active(&mut self) {
        let index = self.active;
        match self.reload_buffer(index) {
            Ok(()) => {
                let name = self.buffers[index]
                    .filename()
                    .map(|p| p.display().to_string())
                    .unwrap_or_default();
                self.message = format!("\"{name}\" reloaded from disk");
            }
            Err(err) => self.message = format!("Error reloading file: {err}"),
        }
    }

    /// Reload every unmodified buffer whose file changed on disk.
    ///
    /// A modified active buffer whose file changed gets a warning message instead. Returns
    /// `true` if anything was reloaded or a warning was set.
    pub fn check_files_on_disk(&mut self) -> bool {
        let stale: Vec<usize> = (0..self.buffers.len())
            .filter(|&i| self.buffers[i].changed_on_disk())
            .collect();
        let mut changed = false;
        for index in stale {
            if !self.buffers[index].is_modified() {
                if let Err(err) = self.reload_buffer(index) {
                    warn!(error = %err, "automatic reload failed");
                    continue;
                }
                changed = true;
            } else if index == self.active {
                let base = self.buffers[index]
                    .filename()
                    .and_then(Path::file_name)
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                self.message =
                    format!("WARNING: \"{base}\" changed on disk. Use :reload to update.");
                changed = true;
            }
        }
        changed
    }
}

/// Calls a wake-up hook at a fixed interval on a background thread until dropped.
///
/// The hook only signals the host's main loop, which then calls
/// [`Editor::check_files_on_disk`]; the poller never touches editor state itself.
pub struct FileChangePoller {
    stop: Option<mpsc::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl FileChangePoller {
    /// Start polling.
    pub fn spawn(interval: Duration, wake: impl Fn() + Send + 'static) -> io::Result<Self> {
        let (stop, stopped) = mpsc::channel::<()>();
        let handle = thread::Builder::new()
            .name("qwe-file-poller".to_string())
            .spawn(move || {
                loop {
                    match stopped.recv_timeout(interval) {
                        Err(RecvTimeoutError::Timeout) => wake(),
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
            })?;
        Ok(Self {
            stop: Some(stop),
            handle: Some(handle),
        })
    }
}

impl Drop for FileChangePoller {
    fn drop(&mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_lines_strips_cr_and_expands_tabs() {
        let mut file_type = FileType::plain_text(2);
        file_type.use_tabs = false;
        let lines = read_lines("a\r\n\tb\n".as_bytes(), &file_type).unwrap();
        assert_eq!(lines, vec![vec!['a'], vec![' ', ' ', 'b']]);
    }

    #[test]
    fn test_read_lines_keeps_tabs_when_file_type_uses_them() {
        let mut file_type = FileType::plain_text(4);
        file_type.use_tabs = true;
        let lines = read_lines("\tx".as_bytes(), &file_type).unwrap();
        assert_eq!(lines, vec![vec!['\t', 'x']]);
    }

    #[test]
    fn test_empty_input_is_one_empty_line() {
        let lines = read_lines("".as_bytes(), &FileType::plain_text(4)).unwrap();
        assert_eq!(lines, vec![Vec::<char>::new()]);
    }

    #[test]
    fn test_document_bytes_trailing_newline() {
        let ft = Arc::new(FileType::plain_text(4));
        assert_eq!(document_bytes(&TextBuffer::from_text("a\nb", ft.clone())), "a\nb\n");
        assert_eq!(document_bytes(&TextBuffer::from_text("", ft)), "");
    }
}
