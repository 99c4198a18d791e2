//! Regex replace inside a captured selection (`/pattern/replacement/flags`).
//!
//! Matching is always case-insensitive. Without the `g` flag only one match is replaced for
//! the whole operation: lines are processed from the last selected line upward, so that match
//! is the first one on the bottom-most matching line.

use crate::cursor::Position;
use crate::editor::{Editor, Mode};
use regex::Regex;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
/// Errors produced while parsing or compiling a replace command.
pub enum ReplaceError {
    #[error("expected /pattern/replacement/flags")]
    /// The input is not of the form `/pattern/replacement[/flags]`.
    Malformed,

    #[error("no pattern specified")]
    /// The pattern part is empty.
    EmptyPattern,

    #[error("invalid regex pattern: {0}")]
    /// The pattern failed to compile.
    InvalidRegex(#[from] regex::Error),
}

/// A parsed replace command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplaceCommand {
    /// Regex pattern; escapes are kept as typed.
    pub pattern: String,
    /// Replacement text (`$1`-style group references allowed).
    pub replacement: String,
    /// `g`: replace every match instead of only the first.
    pub global: bool,
    /// `i`: accepted for familiarity; matching is case-insensitive regardless.
    pub ignore_case: bool,
}

impl ReplaceCommand {
    /// Parse `/pattern/replacement/flags`. A backslash escapes the next character, so `\/`
    /// can appear in the pattern or replacement.
    pub fn parse(input: &str) -> Result<Self, ReplaceError> {
        let body = input.strip_prefix('/').ok_or(ReplaceError::Malformed)?;

        let mut parts = Vec::new();
        let mut current = String::new();
        let mut escaped = false;
        let mut separators = 1;
        for ch in body.chars() {
            if escaped {
                current.push(ch);
                escaped = false;
            } else if ch == '\\' {
                current.push(ch);
                escaped = true;
            } else if ch == '/' {
                separators += 1;
                parts.push(std::mem::take(&mut current));
            } else {
                current.push(ch);
            }
        }
        if !current.is_empty() || separators >= 2 {
            parts.push(current);
        }
        if parts.len() < 2 {
            return Err(ReplaceError::Malformed);
        }

        let flags = parts.get(2).map(String::as_str).unwrap_or_default();
        let command = Self {
            pattern: parts[0].clone(),
            replacement: parts[1].replace("\\/", "/"),
            global: flags.contains('g'),
            ignore_case: flags.contains('i'),
        };
        if command.pattern.is_empty() {
            return Err(ReplaceError::EmptyPattern);
        }
        Ok(command)
    }

    /// Compile the pattern with the case-insensitive flag prepended.
    pub fn regex(&self) -> Result<Regex, ReplaceError> {
        Ok(Regex::new(&format!("(?i){}", self.pattern))?)
    }
}

/// Parse and compile in one step.
pub fn parse_replace_command(input: &str) -> Result<(ReplaceCommand, Regex), ReplaceError> {
    let command = ReplaceCommand::parse(input)?;
    let regex = command.regex()?;
    Ok((command, regex))
}

/// The region a replace operates on; `end.col` is exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplaceScope {
    /// First position searched.
    pub start: Position,
    /// Position just past the last character searched.
    pub end: Position,
}

/// A match found by [`Editor::replace_preview`] (character columns, end exclusive).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchRange {
    /// Row of the match.
    pub row: usize,
    /// First matched column.
    pub start_col: usize,
    /// Column just past the match.
    pub end_col: usize,
}

fn char_col(s: &str, byte: usize) -> usize {
    s[..byte].chars().count()
}

impl Editor {
    /// Capture the current selection as the replace scope and enter [`Mode::Replace`].
    ///
    /// Linewise selections cover whole lines; characterwise ones include the character under
    /// the end position. Outside visual mode the whole document is used.
    pub fn start_replace(&mut self) {
        let Some(buffer) = self.active_buffer() else {
            return;
        };
        let cursor = buffer.primary_cursor().position();
        let scope = if self.mode.is_visual() {
            let anchor = buffer.clamp_position(self.visual_anchor);
            let (mut start, mut end) = if anchor < cursor {
                (anchor, cursor)
            } else {
                (cursor, anchor)
            };
            if self.mode == Mode::VisualLine {
                start.col = 0;
                end.col = buffer.line_len(end.row);
            } else if end.col < buffer.line_len(end.row) {
                end.col += 1;
            }
            ReplaceScope { start, end }
        } else {
            let last = buffer.line_count() - 1;
            ReplaceScope {
                start: Position::new(0, 0),
                end: Position::new(last, buffer.line_len(last)),
            }
        };
        debug!(?scope, "replace scope captured");
        self.replace_scope = Some(scope);
        self.mode = Mode::Replace;
    }

    /// The captured replace scope.
    pub fn replace_scope(&self) -> Option<ReplaceScope> {
        self.replace_scope
    }

    /// Leave replace mode without changing anything.
    pub fn cancel_replace(&mut self) {
        self.replace_scope = None;
        self.mode = Mode::Normal;
    }

    fn scope_rows(&self) -> Option<(ReplaceScope, usize)> {
        let buffer = self.active_buffer()?;
        let scope = self.replace_scope.unwrap_or_else(|| {
            let last = buffer.line_count() - 1;
            ReplaceScope {
                start: Position::new(0, 0),
                end: Position::new(last, buffer.line_len(last)),
            }
        });
        let last = scope.end.row.min(buffer.line_count() - 1);
        Some((scope, last))
    }

    /// The searchable `[start, end)` columns of `row` within `scope`, if any.
    fn scope_span(scope: &ReplaceScope, row: usize, len: usize) -> Option<(usize, usize)> {
        let start = if row == scope.start.row { scope.start.col } else { 0 };
        let end = if row == scope.end.row {
            scope.end.col.min(len)
        } else {
            len
        };
        (start < len && start < end).then_some((start, end))
    }

    /// Matches that [`Editor::execute_replace`] would touch for `input` (all matches with `g`,
    /// the first match per line otherwise). Unparseable input yields no matches.
    pub fn replace_preview(&self, input: &str) -> Vec<MatchRange> {
        let Ok((command, regex)) = parse_replace_command(input) else {
            return Vec::new();
        };
        let Some((scope, last)) = self.scope_rows() else {
            return Vec::new();
        };
        let Some(buffer) = self.active_buffer() else {
            return Vec::new();
        };

        let mut matches = Vec::new();
        for row in scope.start.row..=last {
            let line = buffer.line(row).unwrap_or_default();
            let Some((start, end)) = Self::scope_span(&scope, row, line.len()) else {
                continue;
            };
            let haystack: String = line[start..end].iter().collect();
            let found = regex.find_iter(&haystack).take(if command.global {
                usize::MAX
            } else {
                1
            });
            matches.extend(found.map(|m| MatchRange {
                row,
                start_col: start + char_col(&haystack, m.start()),
                end_col: start + char_col(&haystack, m.end()),
            }));
        }
        matches
    }

    /// Run a replace command over the captured scope and return the number of replacements.
    ///
    /// Errors leave the buffer untouched; the error text also becomes the status message.
    /// Either way the editor returns to normal mode.
    pub fn execute_replace(&mut self, input: &str) -> Result<usize, ReplaceError> {
        let parsed = parse_replace_command(input);
        let scope_rows = self.scope_rows();
        self.mode = Mode::Normal;
        self.replace_scope = None;

        let (command, regex) = match parsed {
            Ok(parsed) => parsed,
            Err(err) => {
                self.message = match err {
                    ReplaceError::InvalidRegex(_) => "Invalid regex pattern".to_string(),
                    ReplaceError::EmptyPattern => "No pattern specified".to_string(),
                    ReplaceError::Malformed => err.to_string(),
                };
                return Err(err);
            }
        };
        let Some((scope, last)) = scope_rows else {
            return Ok(0);
        };
        let Some(idx) = self.begin_edit() else {
            return Ok(0);
        };
        debug!(pattern = %command.pattern, global = command.global, "executing replace");

        let buffer = &mut self.buffers[idx];
        let mut count = 0;
        for row in (scope.start.row..=last).rev() {
            let line = buffer.line(row).unwrap_or_default();
            let Some((start, end)) = Self::scope_span(&scope, row, line.len()) else {
                continue;
            };
            let haystack: String = line[start..end].iter().collect();
            let (replaced, n) = if command.global {
                let n = regex.find_iter(&haystack).count();
                (regex.replace_all(&haystack, command.replacement.as_str()), n)
            } else if count == 0 && regex.is_match(&haystack) {
                (regex.replacen(&haystack, 1, command.replacement.as_str()), 1)
            } else {
                continue;
            };
            if n == 0 {
                continue;
            }
            let replaced = replaced.into_owned();
            buffer.replace_range(Position::new(row, start), Position::new(row, end), &replaced);
            count += n;
        }

        if count > 0 {
            buffer.finish_edit();
            self.message = format!("{count} replacements made");
        } else {
            self.message = "Pattern not found".to_string();
        }
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flags_and_escapes() {
        let cmd = ReplaceCommand::parse(r"/a\/b/c\/d/gi").unwrap();
        assert_eq!(cmd.pattern, r"a\/b");
        assert_eq!(cmd.replacement, "c/d");
        assert!(cmd.global);
        assert!(cmd.ignore_case);

        let cmd = ReplaceCommand::parse("/foo/").unwrap();
        assert_eq!(cmd.replacement, "");
        assert!(!cmd.global);
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(ReplaceCommand::parse("foo/bar"), Err(ReplaceError::Malformed)));
        assert!(matches!(ReplaceCommand::parse("/foo"), Err(ReplaceError::Malformed)));
        assert!(matches!(ReplaceCommand::parse("//x/"), Err(ReplaceError::EmptyPattern)));
        assert!(matches!(
            parse_replace_command("/(/x/"),
            Err(ReplaceError::InvalidRegex(_))
        ));
    }

    #[test]
    fn test_preview_reports_char_columns() {
        let mut editor = Editor::with_text("é foo foo");
        editor.start_replace();
        let matches = editor.replace_preview("/foo/bar/g");
        assert_eq!(
            matches,
            vec![
                MatchRange { row: 0, start_col: 2, end_col: 5 },
                MatchRange { row: 0, start_col: 6, end_col: 9 },
            ]
        );
        assert_eq!(editor.replace_preview("/foo/bar/").len(), 1);
    }
}
