//! Paragraph reflow.
//!
//! Consecutive non-blank lines with the same indentation and the same comment marker form a
//! paragraph. Its words are joined and greedily re-wrapped; every emitted line gets the
//! paragraph's indentation and marker back. Blank lines end a paragraph and are kept as is.

use crate::cursor::Position;
use crate::editor::{Editor, Mode};

/// Reflow settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReflowOptions {
    /// Maximum line width including indentation and comment marker.
    pub width: usize,
    /// Lower bound for the text width left after indentation and marker.
    pub min_width: usize,
    /// Comment markers, checked in order.
    pub markers: Vec<String>,
}

/// The comment prefix `content` starts with: a marker followed by a space if present, else a
/// bare marker, else the empty string.
pub fn detect_comment_prefix(content: &str, markers: &[String]) -> String {
    for marker in markers {
        let spaced = format!("{marker} ");
        if content.starts_with(&spaced) {
            return spaced;
        }
        if content.starts_with(marker.as_str()) {
            return marker.clone();
        }
    }
    String::new()
}

fn is_blank_line(line: &[char]) -> bool {
    line.iter().all(|c| c.is_whitespace())
}

/// Split `line` into its indentation width and the rest as a string.
fn split_indent(line: &[char]) -> (usize, String) {
    let indent = line.iter().take_while(|c| c.is_whitespace()).count();
    (indent, line[indent..].iter().collect())
}

/// Reflow `lines` and return the replacement lines.
pub fn reflow_lines(lines: &[Vec<char>], options: &ReflowOptions) -> Vec<Vec<char>> {
    let mut out = Vec::new();
    let mut i = 0;
    while i < lines.len() {
        if is_blank_line(&lines[i]) {
            out.push(lines[i].clone());
            i += 1;
            continue;
        }

        let (indent, content) = split_indent(&lines[i]);
        let indent_chars = &lines[i][..indent];
        let prefix = detect_comment_prefix(&content, &options.markers);

        let first = i;
        let mut words: Vec<String> = Vec::new();
        while i < lines.len() && !is_blank_line(&lines[i]) {
            let (line_indent, line_content) = split_indent(&lines[i]);
            if line_indent != indent
                || detect_comment_prefix(&line_content, &options.markers) != prefix
            {
                break;
            }
            words.extend(
                line_content[prefix.len()..]
                    .split_whitespace()
                    .map(str::to_string),
            );
            i += 1;
        }

        if words.is_empty() {
            out.extend(lines[first..i].iter().cloned());
            continue;
        }

        let prefix_len = prefix.chars().count();
        let wrap_width = options
            .width
            .saturating_sub(indent + prefix_len)
            .max(options.min_width);

        let start_line = |first_word: &str| -> (Vec<char>, usize) {
            let mut line: Vec<char> = indent_chars.to_vec();
            line.extend(prefix.chars());
            line.extend(first_word.chars());
            (line, first_word.chars().count())
        };

        let (mut current, mut current_len) = start_line(&words[0]);
        for word in &words[1..] {
            let word_len = word.chars().count();
            if current_len + 1 + word_len > wrap_width {
                out.push(current);
                (current, current_len) = start_line(word);
            } else {
                current.push(' ');
                current.extend(word.chars());
                current_len += 1 + word_len;
            }
        }
        out.push(current);
    }
    out
}

impl Editor {
    /// Reflow the primary cursor's line (normal mode) or the selected lines (visual modes).
    pub fn format_text(&mut self) {
        let rows = match self.mode {
            Mode::Normal => self.active_buffer().map(|b| {
                let row = b.primary_cursor().y;
                (row, row)
            }),
            Mode::Visual | Mode::VisualLine => self.active_buffer().map(|b| {
                let a = self.visual_anchor.row;
                let c = b.primary_cursor().y;
                (a.min(c), a.max(c))
            }),
            _ => None,
        };
        let Some((first, last)) = rows else {
            return;
        };
        let Some(idx) = self.begin_edit() else {
            return;
        };
        let options = ReflowOptions {
            width: self.config.format_width,
            min_width: self.config.min_format_width,
            markers: self.config.formatter_markers.clone(),
        };

        let buffer = &mut self.buffers[idx];
        let last = last.min(buffer.line_count() - 1);
        let first = first.min(last);
        let reflowed = reflow_lines(&buffer.lines()[first..=last], &options);
        let text = reflowed
            .iter()
            .map(|l| l.iter().collect::<String>())
            .collect::<Vec<_>>()
            .join("\n");

        let saved = buffer.primary_cursor().position();
        buffer.replace_range(
            Position::new(first, 0),
            Position::new(last, buffer.line_len(last)),
            &text,
        );
        buffer.set_primary_position(saved);
        buffer.finish_edit();

        self.mode = Mode::Normal;
        self.message = "Text formatted".to_string();
    }
}
