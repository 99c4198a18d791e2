#![warn(missing_docs)]
//! `qwe-lsp` - language server client for `qwe-core`.
//!
//! The crate speaks JSON-RPC over stdio with `Content-Length` framing, correlates requests and
//! responses by id across a background reader thread, and wires one [`LspSession`] per
//! document into a [`qwe_core::TextBuffer`] through the core's `DocumentSync` seam.
//!
//! ```text
//!  Editor ──edit──▶ TextBuffer ──did_change──▶ LspSession ──write──▶ server stdin
//!    ▲                  ▲                         │
//!    │ redraw hook      └── diagnostics ◀── reader thread ◀── server stdout
//!    └──────────────────────────────────────────────┘
//! ```
//!
//! Requests (`definition`, `hover`, `completion`) block the caller until the response arrives
//! or the per-method timeout in [`LspSessionOptions`] expires. A timeout is an ordinary error
//! value, not a panic, and leaves no pending entry behind.

pub mod editor;
pub mod error;
pub mod lsp_client;
pub mod lsp_completion;
pub mod lsp_events;
pub mod lsp_hover;
pub mod lsp_locations;
pub mod lsp_session;
pub mod lsp_transport;
pub mod lsp_uri;

pub use editor::{LspEditorExt, start_for_buffer};
pub use error::LspError;
pub use lsp_client::{LspClient, NotificationHandler};
pub use lsp_completion::{CompletionItem, CompletionList, completion_items_from_value};
pub use lsp_events::{LspDiagnostic, LspPublishDiagnosticsParams, PUBLISH_DIAGNOSTICS};
pub use lsp_hover::{MarkedText, hover_text_from_value, strip_markdown};
pub use lsp_locations::{LspLocation, LspPosition, LspRange, locations_from_value};
pub use lsp_session::{LspDocument, LspSession, LspSessionOptions, RedrawHook, SessionState};
pub use lsp_transport::{read_lsp_frame, read_lsp_message, write_lsp_message};
pub use lsp_uri::{
    file_uri_to_path, path_to_file_uri, percent_decode_path, percent_encode_path, root_uri_for,
};
