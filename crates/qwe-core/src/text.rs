//! Character-level helpers shared by the edit operations.

use unicode_width::UnicodeWidthChar;

/// Coarse character classes used by word motions and word deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharClass {
    /// Space or tab.
    Whitespace,
    /// ASCII letters, digits and `_`.
    Word,
    /// Anything else.
    Punctuation,
}

/// Returns `true` for ASCII letters, digits and `_`.
pub fn is_word_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}

pub(crate) fn is_blank(ch: char) -> bool {
    ch == ' ' || ch == '\t'
}

pub(crate) fn is_path_char(ch: char) -> bool {
    is_word_char(ch) || matches!(ch, '/' | '.' | '-' | '~' | '\\' | ':')
}

/// Classify a character for word-based operations.
pub fn char_class(ch: char) -> CharClass {
    if is_blank(ch) {
        CharClass::Whitespace
    } else if is_word_char(ch) {
        CharClass::Word
    } else {
        CharClass::Punctuation
    }
}

/// UTF-8 byte length of `line[..col]` (col is clamped to the line length).
pub fn byte_len(line: &[char], col: usize) -> usize {
    line[..col.min(line.len())].iter().map(|c| c.len_utf8()).sum()
}

/// Leading spaces and tabs of `line`.
pub(crate) fn indentation(line: &[char]) -> Vec<char> {
    line.iter().take_while(|c| is_blank(**c)).copied().collect()
}

/// Display column of character column `col`, expanding tabs to `tab_width` stops and
/// counting wide characters as two cells.
pub fn visual_column(line: &[char], col: usize, tab_width: usize) -> usize {
    let tab_width = tab_width.max(1);
    let mut x = 0;
    for &ch in line.iter().take(col) {
        if ch == '\t' {
            x += tab_width - (x % tab_width);
        } else {
            x += ch.width().unwrap_or(0);
        }
    }
    x
}

pub(crate) fn toggle_char_case(ch: char) -> char {
    if ch.is_lowercase() {
        ch.to_uppercase().next().unwrap_or(ch)
    } else if ch.is_uppercase() {
        ch.to_lowercase().next().unwrap_or(ch)
    } else {
        ch
    }
}
