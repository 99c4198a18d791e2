#![warn(missing_docs)]
//! `qwe-lang` - data-driven language configuration for the qwe editing core.
//!
//! This crate intentionally stays lightweight and does **not** know about buffers, syntax trees
//! or language servers. It provides a small [`FileType`] table that hosts and the editing core
//! use to decide:
//! - whether indentation uses tabs or spaces (and how wide a tab is)
//! - which line comment marker to toggle
//! - which language server (if any) to spawn for a document

use std::path::Path;

/// Tab width used when nothing else is configured.
pub const DEFAULT_TAB_WIDTH: usize = 4;

/// Language-specific settings for a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileType {
    /// Display name (e.g. `"Go"`).
    pub name: String,
    /// File extensions (e.g. `".go"`) or exact base names (e.g. `"Makefile"`).
    pub extensions: Vec<String>,
    /// Whether indentation uses a literal tab character.
    pub use_tabs: bool,
    /// Line comment marker (e.g. `//`, `#`). Empty if the language has none.
    pub comment: String,
    /// Number of columns a tab represents, and the width of a space indent unit.
    pub tab_width: usize,
    /// Whether a language server should be started for this file type.
    pub enable_lsp: bool,
    /// Language server executable.
    pub lsp_command: Option<String>,
    /// Arguments passed to [`FileType::lsp_command`].
    pub lsp_args: Vec<String>,
}

struct Builtin {
    name: &'static str,
    extensions: &'static [&'static str],
    use_tabs: bool,
    comment: &'static str,
    lsp: Option<(&'static str, &'static [&'static str])>,
    enable_lsp: bool,
}

const BUILTINS: &[Builtin] = &[
    Builtin {
        name: "Go",
        extensions: &[".go"],
        use_tabs: true,
        comment: "//",
        lsp: Some(("gopls", &[])),
        enable_lsp: true,
    },
    Builtin {
        name: "C",
        extensions: &[".c", ".h"],
        use_tabs: true,
        comment: "//",
        lsp: Some(("clangd", &[])),
        enable_lsp: true,
    },
    Builtin {
        name: "C++",
        extensions: &[".cpp", ".hpp", ".cc", ".hh", ".cxx", ".hxx"],
        use_tabs: true,
        comment: "//",
        lsp: Some(("clangd", &[])),
        enable_lsp: true,
    },
    Builtin {
        name: "JavaScript",
        extensions: &[".js"],
        use_tabs: true,
        comment: "//",
        lsp: Some(("typescript-language-server", &["--stdio"])),
        enable_lsp: true,
    },
    Builtin {
        name: "TypeScript",
        extensions: &[".ts"],
        use_tabs: true,
        comment: "//",
        lsp: Some(("typescript-language-server", &["--stdio"])),
        enable_lsp: true,
    },
    Builtin {
        name: "TSX",
        extensions: &[".tsx"],
        use_tabs: true,
        comment: "//",
        lsp: Some(("typescript-language-server", &["--stdio"])),
        enable_lsp: true,
    },
    // pyright is configured but opt-in.
    Builtin {
        name: "Python",
        extensions: &[".py"],
        use_tabs: false,
        comment: "#",
        lsp: Some(("pyright-langserver", &["--stdio"])),
        enable_lsp: false,
    },
    Builtin {
        name: "Bash",
        extensions: &[".sh"],
        use_tabs: true,
        comment: "#",
        lsp: None,
        enable_lsp: false,
    },
    Builtin {
        name: "CSS",
        extensions: &[".css"],
        use_tabs: false,
        comment: "//",
        lsp: None,
        enable_lsp: false,
    },
    Builtin {
        name: "Dockerfile",
        extensions: &[".dockerfile", "Dockerfile"],
        use_tabs: false,
        comment: "#",
        lsp: None,
        enable_lsp: false,
    },
    Builtin {
        name: "HTML",
        extensions: &[".html", ".htm"],
        use_tabs: false,
        comment: "",
        lsp: None,
        enable_lsp: false,
    },
    Builtin {
        name: "Lua",
        extensions: &[".lua"],
        use_tabs: true,
        comment: "--",
        lsp: None,
        enable_lsp: false,
    },
    Builtin {
        name: "Markdown",
        extensions: &[".md", ".markdown"],
        use_tabs: false,
        comment: "",
        lsp: None,
        enable_lsp: false,
    },
    Builtin {
        name: "PHP",
        extensions: &[".php"],
        use_tabs: true,
        comment: "//",
        lsp: None,
        enable_lsp: false,
    },
    Builtin {
        name: "SQL",
        extensions: &[".sql"],
        use_tabs: true,
        comment: "--",
        lsp: None,
        enable_lsp: false,
    },
    Builtin {
        name: "Makefile",
        extensions: &[".make", "Makefile", "makefile"],
        use_tabs: true,
        comment: "#",
        lsp: None,
        enable_lsp: false,
    },
    Builtin {
        name: "Text",
        extensions: &[],
        use_tabs: false,
        comment: "",
        lsp: None,
        enable_lsp: false,
    },
];

impl Builtin {
    fn to_file_type(&self, tab_width: usize) -> FileType {
        FileType {
            name: self.name.to_string(),
            extensions: self.extensions.iter().map(|s| s.to_string()).collect(),
            use_tabs: self.use_tabs,
            comment: self.comment.to_string(),
            tab_width,
            enable_lsp: self.enable_lsp,
            lsp_command: self.lsp.map(|(cmd, _)| cmd.to_string()),
            lsp_args: self
                .lsp
                .map(|(_, args)| args.iter().map(|s| s.to_string()).collect())
                .unwrap_or_default(),
        }
    }
}

impl FileType {
    /// The full built-in file type table using [`DEFAULT_TAB_WIDTH`].
    ///
    /// The last entry is always the plain-text fallback.
    pub fn builtin() -> Vec<FileType> {
        Self::with_tab_width(DEFAULT_TAB_WIDTH)
    }

    /// The built-in table with every entry using `tab_width`.
    pub fn with_tab_width(tab_width: usize) -> Vec<FileType> {
        let tab_width = tab_width.max(1);
        BUILTINS.iter().map(|b| b.to_file_type(tab_width)).collect()
    }

    /// The plain-text fallback file type.
    pub fn plain_text(tab_width: usize) -> FileType {
        BUILTINS[BUILTINS.len() - 1].to_file_type(tab_width.max(1))
    }

    /// Detect the file type for `path` from the built-in table.
    pub fn detect(path: &Path) -> FileType {
        Self::detect_in(&Self::builtin(), path)
    }

    /// Detect the file type for `path` from a caller-provided table.
    ///
    /// An entry matches when one of its extensions equals the path's extension (with the
    /// leading dot) or its exact base name. Falls back to plain text.
    pub fn detect_in(table: &[FileType], path: &Path) -> FileType {
        let ext = path
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default();
        let base = path
            .file_name()
            .map(|b| b.to_string_lossy().to_string())
            .unwrap_or_default();

        table
            .iter()
            .find(|ft| {
                ft.extensions
                    .iter()
                    .any(|e| (!ext.is_empty() && *e == ext) || *e == base)
            })
            .cloned()
            .unwrap_or_else(|| {
                let tab_width = table.first().map_or(DEFAULT_TAB_WIDTH, |ft| ft.tab_width);
                FileType::plain_text(tab_width)
            })
    }

    /// LSP `languageId` for this file type (lower-cased name).
    pub fn language_id(&self) -> String {
        self.name.to_lowercase()
    }

    /// One indentation unit: a tab, or `tab_width` spaces.
    pub fn indent_unit(&self) -> String {
        if self.use_tabs {
            "\t".to_string()
        } else {
            " ".repeat(self.tab_width.max(1))
        }
    }

    /// Returns `true` if a line comment marker is configured.
    pub fn has_comment(&self) -> bool {
        !self.comment.is_empty()
    }

    /// Returns the language server command if LSP is enabled and a command is configured.
    pub fn lsp_server(&self) -> Option<(&str, &[String])> {
        if !self.enable_lsp {
            return None;
        }
        self.lsp_command
            .as_deref()
            .filter(|cmd| !cmd.is_empty())
            .map(|cmd| (cmd, self.lsp_args.as_slice()))
    }
}

impl Default for FileType {
    fn default() -> Self {
        FileType::plain_text(DEFAULT_TAB_WIDTH)
    }
}
