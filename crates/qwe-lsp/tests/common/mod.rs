//! Scripted in-process language server speaking real LSP framing over `std::io::pipe`.

#![allow(dead_code)]

use qwe_lsp::{
    LspDocument, LspError, LspSession, LspSessionOptions, read_lsp_message, write_lsp_message,
};
use serde_json::{Value, json};
use std::io::{self, BufReader, PipeReader, PipeWriter, Write};
use std::path::Path;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

pub const DOC_PATH: &str = "/tmp/qwe-fake/main.go";
pub const DOC_URI: &str = "file:///tmp/qwe-fake/main.go";

pub struct FakeServer {
    input: BufReader<PipeReader>,
    output: PipeWriter,
}

impl FakeServer {
    /// Next message from the client, or `None` once the client closed its side.
    pub fn try_recv(&mut self) -> Option<Value> {
        read_lsp_message(&mut self.input).ok().flatten()
    }

    pub fn recv(&mut self) -> Value {
        self.try_recv().expect("client closed the stream")
    }

    /// Skip messages until one with `method` arrives.
    pub fn recv_method(&mut self, method: &str) -> Value {
        loop {
            let msg = self.recv();
            if msg["method"] == method {
                return msg;
            }
        }
    }

    pub fn send(&mut self, value: &Value) {
        write_lsp_message(&mut self.output, value).unwrap();
    }

    pub fn send_raw(&mut self, bytes: &[u8]) {
        self.output.write_all(bytes).unwrap();
        self.output.flush().unwrap();
    }

    pub fn respond(&mut self, request: &Value, result: Value) {
        self.send(&json!({ "jsonrpc": "2.0", "id": request["id"], "result": result }));
    }

    pub fn respond_error(&mut self, request: &Value, code: i64, message: &str) {
        self.send(&json!({
            "jsonrpc": "2.0",
            "id": request["id"],
            "error": { "code": code, "message": message }
        }));
    }

    pub fn publish_diagnostics(&mut self, uri: &str, diagnostics: Value) {
        self.send(&json!({
            "jsonrpc": "2.0",
            "method": "textDocument/publishDiagnostics",
            "params": { "uri": uri, "diagnostics": diagnostics }
        }));
    }

    /// Answer `initialize` and consume `initialized` and `didOpen`; returns the three messages.
    pub fn handshake(&mut self) -> (Value, Value, Value) {
        let init = self.recv();
        assert_eq!(init["method"], "initialize");
        self.respond(&init, json!({ "capabilities": {} }));
        let initialized = self.recv();
        let open = self.recv();
        (init, initialized, open)
    }

    /// Answer `shutdown` until `exit` or end of stream. Returns how many `shutdown` requests
    /// were seen.
    pub fn serve_until_exit(&mut self) -> usize {
        let mut shutdowns = 0;
        while let Some(msg) = self.try_recv() {
            match msg["method"].as_str() {
                Some("shutdown") => {
                    shutdowns += 1;
                    self.respond(&msg, Value::Null);
                }
                Some("exit") => break,
                _ => {}
            }
        }
        shutdowns
    }
}

pub fn test_options() -> LspSessionOptions {
    let mut options = LspSessionOptions::new("fake-server");
    options.shutdown_timeout = Duration::from_millis(500);
    options
}

/// Run `script` as the server side and connect a session to it.
pub fn start_with<T, F>(
    path: &Path,
    text: &str,
    options: LspSessionOptions,
    script: F,
) -> (Result<LspSession, LspError>, JoinHandle<T>)
where
    T: Send + 'static,
    F: FnOnce(&mut FakeServer) -> T + Send + 'static,
{
    let (client_in, server_out) = io::pipe().unwrap();
    let (server_in, client_out) = io::pipe().unwrap();
    let server = thread::spawn(move || {
        let mut server = FakeServer {
            input: BufReader::new(server_in),
            output: server_out,
        };
        script(&mut server)
    });
    let document = LspDocument::new(path, "go");
    let session = LspSession::from_streams(client_in, client_out, document, text, options);
    (session, server)
}

pub fn start<T, F>(text: &str, options: LspSessionOptions, script: F) -> (LspSession, JoinHandle<T>)
where
    T: Send + 'static,
    F: FnOnce(&mut FakeServer) -> T + Send + 'static,
{
    let (session, server) = start_with(Path::new(DOC_PATH), text, options, script);
    (session.unwrap(), server)
}

/// Poll `cond` for up to two seconds.
pub fn wait_until(mut cond: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(2);
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }
    cond()
}

pub fn range(line: u32, start: u32, end: u32) -> Value {
    json!({
        "start": { "line": line, "character": start },
        "end": { "line": line, "character": end }
    })
}
