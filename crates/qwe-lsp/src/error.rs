//! Error type for language server sessions.

use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
/// Failures of the LSP transport, handshake or a single request.
pub enum LspError {
    #[error("failed to start language server `{command}`: {source}")]
    /// The server process could not be spawned.
    Spawn {
        /// Program that was executed.
        command: String,
        /// Underlying spawn error.
        #[source]
        source: io::Error,
    },

    #[error("language server {0} is not piped")]
    /// The child process has no stdin/stdout handle.
    MissingPipe(&'static str),

    #[error("document has no filename")]
    /// A session needs a file-backed document.
    NoFilename,

    #[error("LSP session is shut down")]
    /// A write was attempted after shutdown began.
    ShutDown,

    #[error("timed out waiting for `{method}` response (id {id})")]
    /// No response arrived within the request timeout.
    Timeout {
        /// Request method.
        method: String,
        /// Request id.
        id: u64,
    },

    #[error("LSP error: {message}")]
    /// The server answered with a JSON-RPC error object.
    Server {
        /// JSON-RPC error code.
        code: i64,
        /// Error message reported by the server.
        message: String,
    },

    #[error("language server disconnected")]
    /// The reader saw end of stream while a request was waiting.
    Disconnected,

    #[error(transparent)]
    /// Framing or pipe I/O failure.
    Io(#[from] io::Error),
}
