//! Server-initiated notifications.
//!
//! Only `textDocument/publishDiagnostics` changes editor state. Other notifications
//! (`window/logMessage`, `$/progress`, ...) are logged and dropped.

use crate::lsp_locations::LspRange;
use qwe_core::{Diagnostic, DiagnosticRange, DiagnosticSeverity};
use serde::Deserialize;
use serde_json::Value;

/// Method name of the diagnostics notification.
pub const PUBLISH_DIAGNOSTICS: &str = "textDocument/publishDiagnostics";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
/// A diagnostic as sent on the wire.
pub struct LspDiagnostic {
    /// Affected range.
    pub range: LspRange,
    /// Numeric severity (1 = error .. 4 = hint).
    #[serde(default)]
    pub severity: Option<u64>,
    /// Message text.
    #[serde(default)]
    pub message: String,
}

impl From<LspDiagnostic> for Diagnostic {
    fn from(diag: LspDiagnostic) -> Self {
        let LspRange { start, end } = diag.range;
        Diagnostic {
            range: DiagnosticRange {
                start_row: start.line as usize,
                start_col: start.character as usize,
                end_row: end.line as usize,
                end_col: end.character as usize,
            },
            severity: diag.severity.and_then(DiagnosticSeverity::from_u64),
            message: diag.message,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
/// Parameters of `textDocument/publishDiagnostics`.
pub struct LspPublishDiagnosticsParams {
    /// Document the diagnostics belong to.
    pub uri: String,
    /// Diagnostics that could be decoded; malformed entries are skipped.
    #[serde(deserialize_with = "lenient_diagnostics")]
    pub diagnostics: Vec<LspDiagnostic>,
}

fn lenient_diagnostics<'de, D>(deserializer: D) -> Result<Vec<LspDiagnostic>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = Vec::<Value>::deserialize(deserializer)?;
    Ok(raw
        .iter()
        .filter_map(|item| LspDiagnostic::deserialize(item).ok())
        .collect())
}

impl LspPublishDiagnosticsParams {
    /// Decode notification params; `None` when they are not a diagnostics payload.
    pub fn from_value(params: &Value) -> Option<Self> {
        Self::deserialize(params).ok()
    }

    /// Convert into editor diagnostics.
    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics.into_iter().map(Diagnostic::from).collect()
    }
}
