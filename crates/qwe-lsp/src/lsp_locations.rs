//! Positions, ranges and "go to definition" targets.
//!
//! Servers may answer `textDocument/definition` with a single `Location`, an array of
//! `Location`s, or `LocationLink`s. [`locations_from_value`] tries each typed shape in turn and
//! treats a result matching none of them as "no definition".

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
/// A zero-based line/character position.
///
/// Characters are counted in the editor's unit (Unicode scalar values).
pub struct LspPosition {
    /// Zero-based line.
    pub line: u32,
    /// Zero-based character offset within the line.
    pub character: u32,
}

impl LspPosition {
    /// Build a position from editor row/column coordinates.
    pub fn from_row_col(row: usize, col: usize) -> Self {
        Self {
            line: u32::try_from(row).unwrap_or(u32::MAX),
            character: u32::try_from(col).unwrap_or(u32::MAX),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
/// A half-open range between two positions.
pub struct LspRange {
    /// Inclusive start.
    pub start: LspPosition,
    /// Exclusive end.
    pub end: LspPosition,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
/// A normalized definition target (URI + range).
pub struct LspLocation {
    /// Target document URI (e.g. `file:///...`).
    pub uri: String,
    /// Target range within the document.
    pub range: LspRange,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LspLocationLink {
    target_uri: String,
    target_range: LspRange,
    #[serde(default)]
    target_selection_range: Option<LspRange>,
}

impl From<LspLocationLink> for LspLocation {
    fn from(link: LspLocationLink) -> Self {
        Self {
            uri: link.target_uri,
            range: link.target_selection_range.unwrap_or(link.target_range),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum LocationShape {
    Location(LspLocation),
    Link(LspLocationLink),
}

impl From<LocationShape> for LspLocation {
    fn from(shape: LocationShape) -> Self {
        match shape {
            LocationShape::Location(location) => location,
            LocationShape::Link(link) => link.into(),
        }
    }
}

/// Normalize a definition result.
///
/// Order of attempts: a single location with a non-empty URI, then an array of locations or
/// links. `null` and unrecognized shapes both yield an empty list.
pub fn locations_from_value(value: &Value) -> Vec<LspLocation> {
    if value.is_null() {
        return Vec::new();
    }

    if let Ok(single) = LocationShape::deserialize(value) {
        let location = LspLocation::from(single);
        if !location.uri.is_empty() {
            return vec![location];
        }
    }

    match Vec::<LocationShape>::deserialize(value) {
        Ok(many) => many.into_iter().map(LspLocation::from).collect(),
        Err(_) => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn range(line: u32, start: u32, end: u32) -> Value {
        json!({
            "start": { "line": line, "character": start },
            "end": { "line": line, "character": end }
        })
    }

    #[test]
    fn test_single_location() {
        let locs = locations_from_value(&json!({ "uri": "file:///a.go", "range": range(3, 5, 9) }));
        assert_eq!(locs.len(), 1);
        assert_eq!(locs[0].uri, "file:///a.go");
        assert_eq!(locs[0].range.start, LspPosition { line: 3, character: 5 });
    }

    #[test]
    fn test_location_array_keeps_order() {
        let locs = locations_from_value(&json!([
            { "uri": "file:///b.go", "range": range(1, 0, 1) },
            { "uri": "file:///c.go", "range": range(2, 0, 1) },
        ]));
        let uris: Vec<_> = locs.iter().map(|l| l.uri.as_str()).collect();
        assert_eq!(uris, ["file:///b.go", "file:///c.go"]);
    }

    #[test]
    fn test_location_link_prefers_selection_range() {
        let locs = locations_from_value(&json!([{
            "targetUri": "file:///a.rs",
            "targetRange": range(1, 0, 40),
            "targetSelectionRange": range(2, 4, 8),
        }]));
        assert_eq!(locs[0].range.start.line, 2);
        assert_eq!(locs[0].range.end.character, 8);
    }

    #[test]
    fn test_empty_uri_and_garbage_mean_no_result() {
        assert!(locations_from_value(&json!({ "uri": "", "range": range(0, 0, 0) })).is_empty());
        assert!(locations_from_value(&json!(null)).is_empty());
        assert!(locations_from_value(&json!("nope")).is_empty());
        assert!(locations_from_value(&json!([])).is_empty());
    }
}
