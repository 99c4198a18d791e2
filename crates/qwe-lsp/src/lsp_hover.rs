//! Hover normalization and Markdown stripping.
//!
//! `Hover.contents` may be a plain string, a `MarkupContent`/`MarkedString` object with a
//! `value`, or an array mixing both. Everything is reduced to one printable string.

use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
/// A string that may carry Markdown, in either of its wire shapes.
pub enum MarkedText {
    /// A bare string.
    Plain(String),
    /// An object with a `value` (`MarkupContent` or `{ language, value }`).
    Markup {
        /// The text.
        value: String,
    },
}

impl MarkedText {
    /// The raw text regardless of shape.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Plain(text) => text,
            Self::Markup { value } => value,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum HoverContents {
    Many(Vec<Value>),
    One(MarkedText),
}

#[derive(Debug, Deserialize)]
struct Hover {
    contents: Option<HoverContents>,
}

/// Normalize a `textDocument/hover` result into plain text.
///
/// `null`, missing contents and unknown shapes yield an empty string. Array entries are stripped
/// individually and joined with newlines; entries of unknown shape are skipped.
pub fn hover_text_from_value(value: &Value) -> String {
    let Ok(hover) = Hover::deserialize(value) else {
        return String::new();
    };
    match hover.contents {
        None => String::new(),
        Some(HoverContents::One(text)) => strip_markdown(text.as_str()),
        Some(HoverContents::Many(items)) => {
            let parts: Vec<String> = items
                .iter()
                .filter_map(|item| MarkedText::deserialize(item).ok())
                .map(|text| strip_markdown(text.as_str()))
                .collect();
            parts.join("\n").trim().to_string()
        }
    }
}

/// Best-effort Markdown to plain text.
///
/// Fence lines (starting with three backticks) are dropped and the lines between them are kept
/// verbatim. Elsewhere `**`/`__` markers, paired single `*` emphasis, backticks and link syntax
/// (`[text](url)` becomes `text`) are removed. The result is trimmed.
pub fn strip_markdown(text: &str) -> String {
    let mut out: Vec<String> = Vec::new();
    let mut in_code = false;

    for line in text.split('\n') {
        if line.starts_with("```") {
            in_code = !in_code;
            continue;
        }
        if in_code {
            out.push(line.to_string());
            continue;
        }

        let line = line.replace("**", "").replace("__", "");
        let line = strip_links(&line);
        let line = strip_single_emphasis(&line);
        out.push(line.replace('`', ""));
    }

    out.join("\n").trim().to_string()
}

fn strip_links(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut rest = line;
    loop {
        let Some(open) = rest.find('[') else { break };
        let Some(mid) = rest[open..].find("](").map(|i| open + i) else {
            break;
        };
        let Some(close) = rest[mid..].find(')').map(|i| mid + i) else {
            break;
        };
        out.push_str(&rest[..open]);
        out.push_str(&rest[open + 1..mid]);
        rest = &rest[close + 1..];
    }
    out.push_str(rest);
    out
}

/// Remove `*text*` markers. A lone `*` (pointers, varargs, multiplication) is kept.
fn strip_single_emphasis(line: &str) -> String {
    let chars: Vec<char> = line.chars().collect();
    let mut drop = vec![false; chars.len()];
    let mut i = 0;
    while i < chars.len() {
        let opens = chars[i] == '*' && chars.get(i + 1).is_some_and(|c| !c.is_whitespace());
        if !opens {
            i += 1;
            continue;
        }
        let close = (i + 2..chars.len())
            .find(|&j| chars[j] == '*' && !chars[j - 1].is_whitespace());
        match close {
            Some(j) => {
                drop[i] = true;
                drop[j] = true;
                i = j + 1;
            }
            None => break,
        }
    }
    chars
        .iter()
        .zip(drop)
        .filter_map(|(&c, dropped)| (!dropped).then_some(c))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_strip_markdown_inline_markers() {
        assert_eq!(
            strip_markdown("**bold** and __strong__ with `code` and *soft*"),
            "bold and strong with code and soft"
        );
        assert_eq!(strip_markdown("see [docs](https://x.dev/a) now"), "see docs now");
        assert_eq!(strip_markdown("[a](u) [b](v)"), "a b");
    }

    #[test]
    fn test_strip_markdown_keeps_fenced_code() {
        let input = "```go\nfunc **Foo**(`x` int)\n```\n**Foo** does things";
        assert_eq!(strip_markdown(input), "func **Foo**(`x` int)\nFoo does things");
    }

    #[test]
    fn test_lone_asterisk_and_identifiers_survive() {
        assert_eq!(strip_markdown("func f(p *int)"), "func f(p *int)");
        assert_eq!(strip_markdown("a * b"), "a * b");
        assert_eq!(strip_markdown("snake_case_name"), "snake_case_name");
    }

    #[test]
    fn test_hover_shapes() {
        assert_eq!(hover_text_from_value(&json!({ "contents": "**x**" })), "x");
        assert_eq!(
            hover_text_from_value(&json!({ "contents": { "kind": "markdown", "value": "`y`" } })),
            "y"
        );
        assert_eq!(
            hover_text_from_value(&json!({
                "contents": [{ "language": "go", "value": "var z int" }, "doc *text*", 42]
            })),
            "var z int\ndoc text"
        );
        assert_eq!(hover_text_from_value(&json!(null)), "");
        assert_eq!(hover_text_from_value(&json!({ "range": {} })), "");
    }
}
