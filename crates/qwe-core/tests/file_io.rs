use qwe_core::{ConfirmAnswer, Editor, FileChangePoller, FileError, Mode, PendingConfirm};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::{Duration, SystemTime};

fn touch_future(path: &Path) {
    let file = fs::File::options().write(true).open(path).unwrap();
    file.set_modified(SystemTime::now() + Duration::from_secs(120))
        .unwrap();
}

#[test]
fn test_open_missing_file_creates_it_and_replaces_scratch() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested/deeper/new.txt");

    let mut editor = Editor::default();
    let index = editor.open_file(&path).unwrap();
    assert_eq!(index, 0);
    assert_eq!(editor.buffers().len(), 1);
    assert!(path.exists());

    let buffer = editor.active_buffer().unwrap();
    assert_eq!(buffer.filename(), Some(path.as_path()));
    assert_eq!(buffer.line_count(), 1);
    assert!(buffer.last_mod_time().is_some());
}

#[test]
fn test_open_expands_tabs_and_strips_carriage_returns() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("script.py");
    fs::write(&path, "if x:\r\n\treturn 1\r\n").unwrap();

    let mut editor = Editor::default();
    editor.open_file(&path).unwrap();
    let buffer = editor.active_buffer().unwrap();
    assert_eq!(buffer.to_string(), "if x:\n    return 1");
    assert_eq!(buffer.file_type().name, "Python");
    assert!(!buffer.is_modified());
}

#[test]
fn test_open_same_file_twice_reuses_buffer() {
    let dir = tempfile::tempdir().unwrap();
    let a = dir.path().join("a.txt");
    let b = dir.path().join("b.txt");
    fs::write(&a, "a").unwrap();
    fs::write(&b, "b").unwrap();

    let mut editor = Editor::default();
    assert_eq!(editor.open_file(&a).unwrap(), 0);
    assert_eq!(editor.open_file(&b).unwrap(), 1);
    assert_eq!(editor.open_file(&a).unwrap(), 0);
    assert_eq!(editor.active_index(), 0);
    assert_eq!(editor.buffers().len(), 2);
}

#[test]
fn test_save_writes_trailing_newline_and_clears_modified() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.txt");

    let mut editor = Editor::default();
    editor.open_file(&path).unwrap();
    for ch in "hello".chars() {
        editor.insert_rune(ch);
    }
    assert!(editor.active_buffer().unwrap().is_modified());

    assert!(editor.write_active());
    assert_eq!(fs::read_to_string(&path).unwrap(), "hello\n");
    assert!(!editor.active_buffer().unwrap().is_modified());
    assert_eq!(editor.message(), format!("\"{}\" written", path.display()));
}

#[test]
fn test_saving_empty_document_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty.txt");
    fs::write(&path, "x\n").unwrap();

    let mut editor = Editor::default();
    editor.open_file(&path).unwrap();
    editor.delete_line();
    editor.save_active(false).unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap(), "");
}

#[test]
fn test_save_without_filename_fails() {
    let mut editor = Editor::with_text("x");
    assert!(matches!(editor.save_active(false), Err(FileError::NoFilename)));
}

#[test]
fn test_save_as_sets_filename_and_file_type() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("main.go");

    let mut editor = Editor::with_text("package main");
    editor.save_active_as(&path, false).unwrap();
    let buffer = editor.active_buffer().unwrap();
    assert_eq!(buffer.file_type().name, "Go");
    assert_eq!(fs::read_to_string(&path).unwrap(), "package main\n");
}

#[test]
fn test_changed_on_disk_requires_confirmation() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("shared.txt");
    fs::write(&path, "old\n").unwrap();

    let mut editor = Editor::default();
    editor.open_file(&path).unwrap();
    editor.insert_rune('!');
    touch_future(&path);

    assert!(matches!(editor.save_active(false), Err(FileError::ChangedOnDisk)));
    assert!(!editor.write_active());
    assert_eq!(editor.mode(), Mode::Confirm);
    assert_eq!(editor.pending_confirm(), Some(PendingConfirm::Overwrite));

    editor.answer_confirm(ConfirmAnswer::Yes);
    assert_eq!(editor.mode(), Mode::Normal);
    assert_eq!(fs::read_to_string(&path).unwrap(), "!old\n");
    assert!(!editor.quit_requested());
}

#[test]
fn test_write_and_quit_after_confirmation() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("quit.txt");
    fs::write(&path, "q\n").unwrap();

    let mut editor = Editor::default();
    editor.open_file(&path).unwrap();
    touch_future(&path);

    assert!(!editor.write_and_quit());
    assert_eq!(editor.pending_confirm(), Some(PendingConfirm::OverwriteAndQuit));
    editor.answer_confirm(ConfirmAnswer::from_char('y'));
    assert!(editor.quit_requested());
}

#[test]
fn test_unmodified_buffer_reloads_when_file_changes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("watched.txt");
    fs::write(&path, "before\n").unwrap();

    let mut editor = Editor::default();
    editor.open_file(&path).unwrap();
    fs::write(&path, "after\nmore\n").unwrap();
    touch_future(&path);

    assert!(editor.check_files_on_disk());
    let buffer = editor.active_buffer().unwrap();
    assert_eq!(buffer.to_string(), "after\nmore");
    assert!(!buffer.is_modified());
    assert!(!editor.check_files_on_disk());
}

#[test]
fn test_modified_buffer_gets_warning_instead_of_reload() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dirty.txt");
    fs::write(&path, "mine\n").unwrap();

    let mut editor = Editor::default();
    editor.open_file(&path).unwrap();
    editor.insert_rune('x');
    fs::write(&path, "theirs\n").unwrap();
    touch_future(&path);

    assert!(editor.check_files_on_disk());
    assert_eq!(editor.active_buffer().unwrap().to_string(), "xmine");
    assert_eq!(
        editor.message(),
        "WARNING: \"dirty.txt\" changed on disk. Use :reload to update."
    );

    editor.reload_active();
    assert_eq!(editor.active_buffer().unwrap().to_string(), "theirs");
    assert_eq!(
        editor.message(),
        format!("\"{}\" reloaded from disk", path.display())
    );
}

#[test]
fn test_jump_back_reopens_other_file() {
    let dir = tempfile::tempdir().unwrap();
    let a = dir.path().join("a.txt");
    let b = dir.path().join("b.txt");
    fs::write(&a, "one\ntwo\nthree\n").unwrap();
    fs::write(&b, "other\n").unwrap();

    let mut editor = Editor::default();
    editor.open_file(&a).unwrap();
    editor.go_to_line(3);
    editor.push_jump();
    editor.open_file(&b).unwrap();

    editor.jump_back();
    assert_eq!(editor.active_index(), 0);
    assert_eq!(
        editor.active_buffer().unwrap().primary_cursor().y,
        2
    );
}

#[test]
fn test_poller_fires_until_dropped() {
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&hits);
    let poller = FileChangePoller::spawn(Duration::from_millis(5), move || {
        counter.fetch_add(1, Ordering::SeqCst);
    })
    .unwrap();

    thread::sleep(Duration::from_millis(100));
    drop(poller);
    let seen = hits.load(Ordering::SeqCst);
    assert!(seen > 0);

    thread::sleep(Duration::from_millis(30));
    assert_eq!(hits.load(Ordering::SeqCst), seen);
}

#[test]
fn test_reload_keeps_undo_history() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("history.txt");
    fs::write(&path, "one\n").unwrap();

    let mut editor = Editor::default();
    editor.open_file(&path).unwrap();
    editor.save_state();
    editor.insert_rune('x');
    fs::write(&path, "two\n").unwrap();

    editor.reload_active();
    assert_eq!(editor.active_buffer().unwrap().to_string(), "two");
    assert_eq!(editor.active_buffer().unwrap().undo_depth(), 1);

    editor.undo();
    assert_eq!(editor.active_buffer().unwrap().to_string(), "one");
}
