//! JSON-RPC client with correlated requests over a pair of byte streams.
//!
//! A dedicated reader thread owns the input stream. Callers register a single-slot reply
//! channel under a fresh request id *before* writing the request, then block on it with a
//! timeout. The reader removes the entry and delivers the response exactly once; responses
//! with no registered entry (late or unknown ids) are dropped.

use crate::error::LspError;
use crate::lsp_transport::{read_lsp_frame, write_lsp_message};
use serde_json::Value;
use std::collections::HashMap;
use std::io::{self, BufReader, Read, Write};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError, SyncSender};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::Duration;
use tracing::{debug, warn};

/// Callback for server notifications: `(method, params)`. Runs on the reader thread.
pub type NotificationHandler = Box<dyn Fn(&str, &Value) + Send + 'static>;

type Pending = HashMap<u64, SyncSender<Value>>;

struct Shared {
    writer: Mutex<Option<Box<dyn Write + Send>>>,
    pending: Mutex<Pending>,
    shut_down: AtomicBool,
    reader_done: AtomicBool,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Shared {
    fn send(&self, message: &Value) -> Result<(), LspError> {
        if self.shut_down.load(Ordering::Acquire) {
            return Err(LspError::ShutDown);
        }
        let mut writer = lock(&self.writer);
        let writer = writer.as_mut().ok_or(LspError::ShutDown)?;
        write_lsp_message(writer, message)?;
        Ok(())
    }

    fn take_pending(&self, id: u64) -> Option<SyncSender<Value>> {
        lock(&self.pending).remove(&id)
    }
}

/// A JSON-RPC/LSP client over arbitrary streams (child stdio or in-process pipes).
pub struct LspClient {
    shared: Arc<Shared>,
    next_id: AtomicU64,
}

impl LspClient {
    /// Start the reader thread on `reader` and write requests to `writer`.
    pub fn new<R, W>(reader: R, writer: W, on_notification: NotificationHandler) -> io::Result<Self>
    where
        R: Read + Send + 'static,
        W: Write + Send + 'static,
    {
        let shared = Arc::new(Shared {
            writer: Mutex::new(Some(Box::new(writer))),
            pending: Mutex::new(HashMap::new()),
            shut_down: AtomicBool::new(false),
            reader_done: AtomicBool::new(false),
        });

        let reader_shared = Arc::clone(&shared);
        thread::Builder::new()
            .name("qwe-lsp-reader".to_string())
            .spawn(move || read_loop(reader, &reader_shared, on_notification))?;

        Ok(Self {
            shared,
            next_id: AtomicU64::new(1),
        })
    }

    /// Allocate the next id. Ids are unique and increasing for the client's lifetime.
    pub fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Send a notification.
    pub fn notify(&self, method: &str, params: Value) -> Result<(), LspError> {
        debug!(method, "LSP notification");
        self.shared.send(&json_rpc_notification(method, params))
    }

    /// Send a request and wait up to `timeout` for its response.
    ///
    /// Returns the `result` member (`Value::Null` when absent). A JSON-RPC error response
    /// becomes [`LspError::Server`]. On timeout the pending entry is removed before returning.
    pub fn request(&self, method: &str, params: Value, timeout: Duration) -> Result<Value, LspError> {
        let id = self.next_id();
        let (tx, rx) = mpsc::sync_channel(1);
        {
            let mut pending = lock(&self.shared.pending);
            if self.shared.reader_done.load(Ordering::Acquire) {
                return Err(LspError::Disconnected);
            }
            pending.insert(id, tx);
        }

        debug!(id, method, "LSP request");
        if let Err(err) = self.shared.send(&json_rpc_request(id, method, params)) {
            self.shared.take_pending(id);
            return Err(err);
        }

        let response = match rx.recv_timeout(timeout) {
            Ok(response) => response,
            Err(RecvTimeoutError::Timeout) => {
                self.shared.take_pending(id);
                debug!(id, method, "LSP request timed out");
                return Err(LspError::Timeout {
                    method: method.to_string(),
                    id,
                });
            }
            Err(RecvTimeoutError::Disconnected) => return Err(LspError::Disconnected),
        };

        if let Some(error) = response.get("error") {
            return Err(LspError::Server {
                code: error.get("code").and_then(Value::as_i64).unwrap_or(0),
                message: error
                    .get("message")
                    .and_then(Value::as_str)
                    .map_or_else(|| error.to_string(), str::to_string),
            });
        }
        Ok(response.get("result").cloned().unwrap_or(Value::Null))
    }

    /// Number of requests still waiting for a response.
    pub fn pending_count(&self) -> usize {
        lock(&self.shared.pending).len()
    }

    /// Returns `true` once [`Self::close`] has run.
    pub fn is_closed(&self) -> bool {
        self.shared.shut_down.load(Ordering::Acquire)
    }

    /// Refuse further writes and close the output stream.
    pub fn close(&self) {
        self.shared.shut_down.store(true, Ordering::Release);
        lock(&self.shared.writer).take();
    }
}

fn read_loop<R: Read>(reader: R, shared: &Shared, on_notification: NotificationHandler) {
    let mut reader = BufReader::new(reader);
    loop {
        let body = match read_lsp_frame(&mut reader) {
            Ok(Some(body)) => body,
            Ok(None) => break,
            Err(err) if err.kind() == io::ErrorKind::InvalidData => {
                warn!(error = %err, "skipping malformed LSP frame");
                continue;
            }
            Err(err) => {
                if !shared.shut_down.load(Ordering::Acquire) {
                    warn!(error = %err, "LSP reader stopped");
                }
                break;
            }
        };

        let message: Value = match serde_json::from_slice(&body) {
            Ok(message) => message,
            Err(err) => {
                warn!(error = %err, "skipping undecodable LSP message");
                continue;
            }
        };

        let method = message.get("method").and_then(Value::as_str);
        let id = message.get("id");
        match (method, id) {
            (Some(method), Some(id)) => answer_server_request(shared, method, id),
            (None, Some(id)) => route_response(shared, id, message.clone()),
            (Some(method), None) => {
                let params = message.get("params").unwrap_or(&Value::Null);
                on_notification(method, params);
            }
            (None, None) => debug!("ignoring LSP message without id or method"),
        }
    }

    // Dropping every sender wakes blocked callers with `Disconnected`.
    let mut pending = lock(&shared.pending);
    shared.reader_done.store(true, Ordering::Release);
    pending.clear();
    drop(pending);
    debug!("LSP reader finished");
}

fn route_response(shared: &Shared, id: &Value, message: Value) {
    let Some(id) = id.as_u64() else {
        debug!(%id, "dropping response with non-numeric id");
        return;
    };
    match shared.take_pending(id) {
        Some(tx) => {
            debug!(id, "routing LSP response");
            // The receiver may have just timed out; the entry is gone either way.
            let _ = tx.try_send(message);
        }
        None => debug!(id, "dropping late LSP response"),
    }
}

/// Server-to-client requests get a `null` result so the server never waits on the editor.
fn answer_server_request(shared: &Shared, method: &str, id: &Value) {
    debug!(method, %id, "answering server request with null");
    if let Err(err) = shared.send(&json_rpc_response(id.clone(), Value::Null)) {
        debug!(error = %err, method, "could not answer server request");
    }
}

fn json_rpc_notification(method: &str, params: Value) -> Value {
    let mut obj = serde_json::Map::new();
    obj.insert("jsonrpc".to_string(), Value::String("2.0".to_string()));
    obj.insert("method".to_string(), Value::String(method.to_string()));
    obj.insert("params".to_string(), params);
    Value::Object(obj)
}

fn json_rpc_request(id: u64, method: &str, params: Value) -> Value {
    let mut obj = serde_json::Map::new();
    obj.insert("jsonrpc".to_string(), Value::String("2.0".to_string()));
    obj.insert("id".to_string(), Value::Number(id.into()));
    obj.insert("method".to_string(), Value::String(method.to_string()));
    obj.insert("params".to_string(), params);
    Value::Object(obj)
}

fn json_rpc_response(id: Value, result: Value) -> Value {
    let mut obj = serde_json::Map::new();
    obj.insert("jsonrpc".to_string(), Value::String("2.0".to_string()));
    obj.insert("id".to_string(), id);
    obj.insert("result".to_string(), result);
    Value::Object(obj)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lsp_transport::read_lsp_message;
    use serde_json::json;
    use std::io::BufReader;

    fn client_with_pipes() -> (LspClient, io::PipeWriter, BufReader<io::PipeReader>) {
        let (client_in, server_out) = io::pipe().unwrap();
        let (server_in, client_out) = io::pipe().unwrap();
        let client = LspClient::new(client_in, client_out, Box::new(|_, _| {})).unwrap();
        (client, server_out, BufReader::new(server_in))
    }

    #[test]
    fn test_error_response_becomes_server_error() {
        let (client, mut server_out, mut server_in) = client_with_pipes();
        let server = thread::spawn(move || {
            let req = read_lsp_message(&mut server_in).unwrap().unwrap();
            let resp = json!({
                "jsonrpc": "2.0",
                "id": req["id"],
                "error": { "code": -32601, "message": "method not found" }
            });
            write_lsp_message(&mut server_out, &resp).unwrap();
            server_in
        });

        let err = client
            .request("textDocument/hover", json!({}), Duration::from_secs(5))
            .unwrap_err();
        assert!(matches!(err, LspError::Server { code: -32601, .. }));
        assert_eq!(err.to_string(), "LSP error: method not found");
        assert_eq!(client.pending_count(), 0);
        drop(server.join().unwrap());
    }

    #[test]
    fn test_write_after_close_fails_without_io() {
        let (client, _server_out, _server_in) = client_with_pipes();
        client.close();
        assert!(client.is_closed());
        assert!(matches!(client.notify("exit", Value::Null), Err(LspError::ShutDown)));
        assert!(matches!(
            client.request("shutdown", Value::Null, Duration::from_millis(10)),
            Err(LspError::ShutDown)
        ));
        assert_eq!(client.pending_count(), 0);
    }

    #[test]
    fn test_reader_eof_wakes_waiting_request() {
        let (client, server_out, server_in) = client_with_pipes();
        let server = thread::spawn(move || {
            let mut server_in = server_in;
            read_lsp_message(&mut server_in).unwrap();
            drop(server_out);
            server_in
        });
        let err = client
            .request("initialize", json!({}), Duration::from_secs(5))
            .unwrap_err();
        assert!(matches!(err, LspError::Disconnected));
        drop(server.join().unwrap());
    }

    #[test]
    fn test_ids_increase() {
        let (client, _out, _in) = client_with_pipes();
        let a = client.next_id();
        let b = client.next_id();
        assert!(b > a);
    }
}
