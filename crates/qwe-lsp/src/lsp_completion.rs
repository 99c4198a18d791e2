//! Completion items and result-shape normalization.

use crate::lsp_hover::MarkedText;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

/// `CompletionItemKind::Method`.
pub const KIND_METHOD: u32 = 2;
/// `CompletionItemKind::Function`.
pub const KIND_FUNCTION: u32 = 3;

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
/// A single completion candidate.
pub struct CompletionItem {
    /// Text shown in the completion menu.
    pub label: String,
    /// Numeric `CompletionItemKind`.
    #[serde(default)]
    pub kind: Option<u32>,
    /// Extra detail (often a signature).
    #[serde(default)]
    pub detail: Option<String>,
    /// Documentation, plain or Markdown.
    #[serde(default)]
    pub documentation: Option<MarkedText>,
    /// Text to insert instead of the label.
    #[serde(default)]
    pub insert_text: Option<String>,
}

impl CompletionItem {
    /// The text that replaces the identifier prefix: `insertText`, falling back to the label.
    pub fn text_to_insert(&self) -> &str {
        match self.insert_text.as_deref() {
            Some(text) if !text.is_empty() => text,
            _ => &self.label,
        }
    }

    /// Methods, functions and items whose detail mentions `func` get call parentheses.
    pub fn is_function(&self) -> bool {
        matches!(self.kind, Some(KIND_METHOD | KIND_FUNCTION))
            || self.detail.as_deref().is_some_and(|d| d.contains("func"))
    }

    /// Documentation text with Markdown markers stripped.
    pub fn documentation_text(&self) -> String {
        self.documentation
            .as_ref()
            .map(|doc| crate::lsp_hover::strip_markdown(doc.as_str()))
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
/// The object form of a completion result.
pub struct CompletionList {
    /// Further typing should re-request completions.
    pub is_incomplete: bool,
    /// The candidates.
    pub items: Vec<CompletionItem>,
}

impl CompletionList {
    /// Decode `{ isIncomplete, items }`. Items that do not decode are skipped.
    pub fn from_value(value: &Value) -> Option<Self> {
        let items = value.get("items")?.as_array()?;
        Some(Self {
            is_incomplete: value
                .get("isIncomplete")
                .and_then(Value::as_bool)
                .unwrap_or(false),
            items: decode_items(items),
        })
    }
}

fn decode_items(values: &[Value]) -> Vec<CompletionItem> {
    values
        .iter()
        .filter_map(|value| match CompletionItem::deserialize(value) {
            Ok(item) => Some(item),
            Err(err) => {
                debug!(error = %err, "skipping undecodable completion item");
                None
            }
        })
        .collect()
}

/// Normalize a `textDocument/completion` result.
///
/// A `CompletionList` is tried first, then a bare item array. `null` and unrecognized shapes
/// yield an empty list.
pub fn completion_items_from_value(value: &Value) -> Vec<CompletionItem> {
    if let Some(list) = CompletionList::from_value(value) {
        return list.items;
    }
    value.as_array().map(|items| decode_items(items)).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_completion_list_and_array_shapes() {
        let list = completion_items_from_value(&json!({
            "isIncomplete": true,
            "items": [{ "label": "Println", "kind": 3, "insertText": "Println" }]
        }));
        assert_eq!(list.len(), 1);
        assert!(list[0].is_function());

        let array = completion_items_from_value(&json!([
            { "label": "len" },
            { "label": "cap", "detail": "func(v Type) int" }
        ]));
        assert_eq!(array.len(), 2);
        assert!(!array[0].is_function());
        assert!(array[1].is_function());
    }

    #[test]
    fn test_unknown_shapes_are_empty() {
        assert!(completion_items_from_value(&json!(null)).is_empty());
        assert!(completion_items_from_value(&json!({ "label": "lonely" })).is_empty());
        assert!(completion_items_from_value(&json!(7)).is_empty());
    }

    #[test]
    fn test_insert_text_falls_back_to_label() {
        let item = CompletionItem {
            label: "value".into(),
            insert_text: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(item.text_to_insert(), "value");
    }

    #[test]
    fn test_documentation_in_both_shapes() {
        let items = completion_items_from_value(&json!([
            { "label": "a", "documentation": "**plain**" },
            { "label": "b", "documentation": { "kind": "markdown", "value": "`md`" } }
        ]));
        assert_eq!(items[0].documentation_text(), "plain");
        assert_eq!(items[1].documentation_text(), "md");
    }

    #[test]
    fn test_bad_items_are_skipped_not_fatal() {
        let items = completion_items_from_value(&json!({
            "isIncomplete": false,
            "items": [
                { "label": "Printf", "documentation": 42 },
                { "label": "Println", "kind": 3 },
                { "kind": 3 }
            ]
        }));
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].label, "Println");

        let array = completion_items_from_value(&json!([
            { "label": "len" },
            { "label": "cap", "kind": "function" }
        ]));
        assert_eq!(array.len(), 1);
        assert_eq!(array[0].label, "len");

        let list = CompletionList::from_value(&json!({ "isIncomplete": true, "items": [] }));
        assert_eq!(list.map(|l| l.is_incomplete), Some(true));
    }
}
