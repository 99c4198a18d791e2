//! Document synchronization seam.
//!
//! A buffer with an attached [`DocumentSync`] forwards its full text after every mutating
//! operation and can pull the latest diagnostics. The LSP integration crate implements this
//! trait for its session type; the core stays protocol-agnostic.

use crate::diagnostics::Diagnostic;
use std::error::Error;

/// Error returned by a [`DocumentSync`] implementation.
pub type SyncError = Box<dyn Error + Send + Sync>;

/// An external consumer of document text (typically a language server session).
pub trait DocumentSync: Send + Sync {
    /// Replace the consumer's copy of the document with `text`.
    ///
    /// Failures are logged by the buffer and never abort the edit.
    fn did_change(&self, text: &str) -> Result<(), SyncError>;

    /// The last diagnostics published for the document.
    fn diagnostics(&self) -> Vec<Diagnostic>;

    /// Stop the consumer. Must be idempotent.
    fn shutdown(&self);
}
