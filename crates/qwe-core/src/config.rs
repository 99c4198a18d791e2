//! Editor-wide settings.

use crate::history::DEFAULT_HISTORY_DEPTH;
use qwe_lang::DEFAULT_TAB_WIDTH;
use std::time::Duration;

/// Settings shared by every buffer of an [`crate::Editor`].
///
/// Hosts typically build this from command-line flags; parsing is not part of the core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorConfig {
    /// Tab width applied to every built-in file type.
    pub default_tab_width: usize,
    /// Target line width for paragraph reflow.
    pub format_width: usize,
    /// Lower bound for the usable reflow width after indentation and comment markers.
    pub min_format_width: usize,
    /// Comment prefixes recognized by paragraph reflow, checked in order.
    pub formatter_markers: Vec<String>,
    /// Maximum number of undo entries per buffer.
    pub history_depth: usize,
    /// Maximum number of jump list entries.
    pub jumplist_depth: usize,
    /// Interval between on-disk change checks.
    pub file_check_interval: Duration,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            default_tab_width: DEFAULT_TAB_WIDTH,
            format_width: 80,
            min_format_width: 20,
            formatter_markers: ["//", "--", "#", ";;", "%", ">"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            history_depth: DEFAULT_HISTORY_DEPTH,
            jumplist_depth: 100,
            file_check_interval: Duration::from_secs(2),
        }
    }
}
