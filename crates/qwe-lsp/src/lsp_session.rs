//! One language server session per document.
//!
//! A session owns the server process (when spawned), the correlated client and the last
//! published diagnostics. Life cycle:
//!
//! ```text
//! Starting ──initialize/initialized──▶ Initialized ──didOpen──▶ Running
//! Running ──shutdown/exit/close/wait (once)──▶ ShuttingDown ──▶ Closed
//! ```
//!
//! Request methods block the caller until the correlated response arrives or the per-method
//! timeout expires. Diagnostics arrive on the reader thread and replace the previous set.

use crate::error::LspError;
use crate::lsp_client::{LspClient, NotificationHandler};
use crate::lsp_completion::{CompletionItem, completion_items_from_value};
use crate::lsp_events::{LspPublishDiagnosticsParams, PUBLISH_DIAGNOSTICS};
use crate::lsp_hover::hover_text_from_value;
use crate::lsp_locations::{LspLocation, LspPosition, locations_from_value};
use crate::lsp_uri::{path_to_file_uri, root_uri_for};
use qwe_core::{Diagnostic, DocumentSync, SyncError};
use qwe_lang::FileType;
use serde_json::{Value, json};
use std::fmt;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::sync::{Arc, Mutex, MutexGuard, Once, PoisonError, RwLock};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Wake-up hook invoked after diagnostics change. Runs on the reader thread.
pub type RedrawHook = Arc<dyn Fn() + Send + Sync>;

/// Options for starting a session.
#[derive(Clone)]
pub struct LspSessionOptions {
    /// Server program.
    pub command: String,
    /// Server arguments.
    pub args: Vec<String>,
    /// Timeout for the `initialize` response.
    pub initialize_timeout: Duration,
    /// Timeout for `textDocument/definition`.
    pub definition_timeout: Duration,
    /// Timeout for `textDocument/hover`.
    pub hover_timeout: Duration,
    /// Timeout for `textDocument/completion`.
    pub completion_timeout: Duration,
    /// Time allowed for the `shutdown` response and for the process to exit.
    pub shutdown_timeout: Duration,
    /// Called after each diagnostics replacement.
    pub redraw: Option<RedrawHook>,
}

impl LspSessionOptions {
    /// Options for `command` with default timeouts.
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            args: Vec::new(),
            initialize_timeout: Duration::from_secs(10),
            definition_timeout: Duration::from_secs(5),
            hover_timeout: Duration::from_secs(5),
            completion_timeout: Duration::from_secs(10),
            shutdown_timeout: Duration::from_secs(2),
            redraw: None,
        }
    }

    /// Options for the server configured on `file_type`, if LSP is enabled for it.
    pub fn for_file_type(file_type: &FileType) -> Option<Self> {
        let (command, args) = file_type.lsp_server()?;
        Some(Self::new(command).with_args(args.to_vec()))
    }

    /// Set the server arguments.
    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    /// Install a redraw hook.
    pub fn with_redraw(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.redraw = Some(Arc::new(hook));
        self
    }
}

impl fmt::Debug for LspSessionOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LspSessionOptions")
            .field("command", &self.command)
            .field("args", &self.args)
            .field("initialize_timeout", &self.initialize_timeout)
            .field("definition_timeout", &self.definition_timeout)
            .field("hover_timeout", &self.hover_timeout)
            .field("completion_timeout", &self.completion_timeout)
            .field("shutdown_timeout", &self.shutdown_timeout)
            .field("redraw", &self.redraw.is_some())
            .finish()
    }
}

/// The document a session is bound to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LspDocument {
    /// Filesystem path.
    pub path: PathBuf,
    /// `file://` URI of the document.
    pub uri: String,
    /// `file://` URI of the containing directory.
    pub root_uri: String,
    /// LSP `languageId`.
    pub language_id: String,
}

impl LspDocument {
    /// Describe the document at `path`.
    pub fn new(path: &Path, language_id: impl Into<String>) -> Self {
        Self {
            path: path.to_path_buf(),
            uri: path_to_file_uri(path),
            root_uri: root_uri_for(path),
            language_id: language_id.into(),
        }
    }
}

/// Session life-cycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Process started, handshake in progress.
    Starting,
    /// `initialize` answered and `initialized` sent.
    Initialized,
    /// Document opened; requests are available.
    Running,
    /// Shutdown sequence in progress.
    ShuttingDown,
    /// Writes are refused and the process has exited.
    Closed,
}

#[derive(Debug, Clone, Copy)]
struct Timeouts {
    definition: Duration,
    hover: Duration,
    completion: Duration,
    shutdown: Duration,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A language server session for a single document.
pub struct LspSession {
    client: LspClient,
    document: LspDocument,
    diagnostics: Arc<RwLock<Vec<Diagnostic>>>,
    child: Mutex<Option<Child>>,
    state: Mutex<SessionState>,
    timeouts: Timeouts,
    shutdown: Once,
}

impl LspSession {
    /// Spawn the configured server and run the handshake for `document`.
    ///
    /// Any failure shuts the process down again and leaves the caller without a session.
    pub fn spawn(
        document: LspDocument,
        text: &str,
        options: LspSessionOptions,
    ) -> Result<Self, LspError> {
        let mut cmd = Command::new(&options.command);
        cmd.args(&options.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null());
        let mut child = cmd.spawn().map_err(|source| LspError::Spawn {
            command: options.command.clone(),
            source,
        })?;

        let (Some(stdin), Some(stdout)) = (child.stdin.take(), child.stdout.take()) else {
            kill(child);
            return Err(LspError::MissingPipe("stdio"));
        };
        info!(command = %options.command, uri = %document.uri, "spawned language server");
        Self::connect(stdout, stdin, Some(child), document, text, options)
    }

    /// Run a session over already-connected streams (no child process).
    pub fn from_streams<R, W>(
        reader: R,
        writer: W,
        document: LspDocument,
        text: &str,
        options: LspSessionOptions,
    ) -> Result<Self, LspError>
    where
        R: Read + Send + 'static,
        W: Write + Send + 'static,
    {
        Self::connect(reader, writer, None, document, text, options)
    }

    fn connect<R, W>(
        reader: R,
        writer: W,
        child: Option<Child>,
        document: LspDocument,
        text: &str,
        options: LspSessionOptions,
    ) -> Result<Self, LspError>
    where
        R: Read + Send + 'static,
        W: Write + Send + 'static,
    {
        let diagnostics = Arc::new(RwLock::new(Vec::new()));
        let handler =
            diagnostics_handler(document.uri.clone(), Arc::clone(&diagnostics), options.redraw);
        let client = match LspClient::new(reader, writer, handler) {
            Ok(client) => client,
            Err(err) => {
                if let Some(child) = child {
                    kill(child);
                }
                return Err(err.into());
            }
        };

        let session = Self {
            client,
            document,
            diagnostics,
            child: Mutex::new(child),
            state: Mutex::new(SessionState::Starting),
            timeouts: Timeouts {
                definition: options.definition_timeout,
                hover: options.hover_timeout,
                completion: options.completion_timeout,
                shutdown: options.shutdown_timeout,
            },
            shutdown: Once::new(),
        };

        if let Err(err) = session.handshake(text, options.initialize_timeout) {
            warn!(error = %err, uri = %session.document.uri, "LSP init failed");
            session.abort();
            return Err(err);
        }
        Ok(session)
    }

    fn handshake(&self, text: &str, timeout: Duration) -> Result<(), LspError> {
        self.client
            .request("initialize", initialize_params(&self.document), timeout)?;
        self.client.notify("initialized", json!({}))?;
        self.set_state(SessionState::Initialized);

        self.client.notify(
            "textDocument/didOpen",
            json!({
                "textDocument": {
                    "uri": self.document.uri,
                    "languageId": self.document.language_id,
                    "version": 1,
                    "text": text,
                }
            }),
        )?;
        self.set_state(SessionState::Running);
        info!(uri = %self.document.uri, "LSP session initialized");
        Ok(())
    }

    /// The bound document.
    pub fn document(&self) -> &LspDocument {
        &self.document
    }

    /// Current life-cycle state.
    pub fn state(&self) -> SessionState {
        *lock(&self.state)
    }

    fn set_state(&self, state: SessionState) {
        *lock(&self.state) = state;
    }

    /// Number of requests waiting for a response.
    pub fn pending_requests(&self) -> usize {
        self.client.pending_count()
    }

    /// Send the full document text. The version comes from the request id counter.
    pub fn did_change(&self, text: &str) -> Result<(), LspError> {
        let version = self.client.next_id();
        self.client.notify(
            "textDocument/didChange",
            json!({
                "textDocument": { "uri": self.document.uri, "version": version },
                "contentChanges": [{ "text": text }],
            }),
        )
    }

    /// Snapshot of the last published diagnostics.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn position_params(&self, row: usize, col: usize) -> Value {
        json!({
            "textDocument": { "uri": self.document.uri },
            "position": LspPosition::from_row_col(row, col),
        })
    }

    /// Definition targets for the symbol at `(row, col)`. No result is an empty list.
    pub fn definition(&self, row: usize, col: usize) -> Result<Vec<LspLocation>, LspError> {
        let result = self.client.request(
            "textDocument/definition",
            self.position_params(row, col),
            self.timeouts.definition,
        )?;
        Ok(locations_from_value(&result))
    }

    /// Hover text for `(row, col)` with Markdown stripped. No result is an empty string.
    pub fn hover(&self, row: usize, col: usize) -> Result<String, LspError> {
        let result = self.client.request(
            "textDocument/hover",
            self.position_params(row, col),
            self.timeouts.hover,
        )?;
        Ok(hover_text_from_value(&result))
    }

    /// Completion candidates at `(row, col)`.
    pub fn completion(&self, row: usize, col: usize) -> Result<Vec<CompletionItem>, LspError> {
        let result = self.client.request(
            "textDocument/completion",
            self.position_params(row, col),
            self.timeouts.completion,
        )?;
        let items = completion_items_from_value(&result);
        debug!(count = items.len(), "completion items received");
        Ok(items)
    }

    /// Run the shutdown sequence. Later and concurrent calls wait for the first and return.
    pub fn shutdown(&self) {
        self.shutdown.call_once(|| {
            self.set_state(SessionState::ShuttingDown);
            if let Err(err) = self
                .client
                .request("shutdown", Value::Null, self.timeouts.shutdown)
            {
                debug!(error = %err, "shutdown request failed");
            }
            if let Err(err) = self.client.notify("exit", Value::Null) {
                debug!(error = %err, "exit notification failed");
            }
            self.client.close();
            if let Some(child) = lock(&self.child).take() {
                wait_for_exit(child, self.timeouts.shutdown);
            }
            self.set_state(SessionState::Closed);
            info!(uri = %self.document.uri, "LSP session shut down");
        });
    }

    fn abort(&self) {
        self.shutdown.call_once(|| {
            self.client.close();
            if let Some(child) = lock(&self.child).take() {
                kill(child);
            }
            self.set_state(SessionState::Closed);
        });
    }
}

impl Drop for LspSession {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl DocumentSync for LspSession {
    fn did_change(&self, text: &str) -> Result<(), SyncError> {
        LspSession::did_change(self, text).map_err(Into::into)
    }

    fn diagnostics(&self) -> Vec<Diagnostic> {
        LspSession::diagnostics(self)
    }

    fn shutdown(&self) {
        LspSession::shutdown(self);
    }
}

fn initialize_params(document: &LspDocument) -> Value {
    json!({
        "processId": std::process::id(),
        "rootUri": document.root_uri,
        "capabilities": {
            "textDocument": {
                "publishDiagnostics": {},
                "hover": { "contentFormat": ["plaintext"] },
                "completion": { "completionItem": { "snippetSupport": false } },
            }
        }
    })
}

fn diagnostics_handler(
    uri: String,
    diagnostics: Arc<RwLock<Vec<Diagnostic>>>,
    redraw: Option<RedrawHook>,
) -> NotificationHandler {
    Box::new(move |method, params| {
        if method != PUBLISH_DIAGNOSTICS {
            debug!(method, "ignoring LSP notification");
            return;
        }
        let Some(published) = LspPublishDiagnosticsParams::from_value(params) else {
            warn!("malformed publishDiagnostics params");
            return;
        };
        if published.uri != uri {
            debug!(uri = %published.uri, "diagnostics for another document");
            return;
        }

        let next = published.into_diagnostics();
        debug!(count = next.len(), "diagnostics replaced");
        *diagnostics.write().unwrap_or_else(PoisonError::into_inner) = next;
        if let Some(redraw) = &redraw {
            redraw();
        }
    })
}

fn wait_for_exit(mut child: Child, timeout: Duration) {
    let deadline = Instant::now() + timeout;
    loop {
        match child.try_wait() {
            Ok(Some(status)) => {
                debug!(%status, "language server exited");
                return;
            }
            Ok(None) if Instant::now() < deadline => thread::sleep(Duration::from_millis(10)),
            Ok(None) => break,
            Err(err) => {
                warn!(error = %err, "waiting for language server failed");
                break;
            }
        }
    }
    warn!("language server did not exit in time; killing it");
    kill(child);
}

fn kill(mut child: Child) {
    let _ = child.kill();
    let _ = child.wait();
}
