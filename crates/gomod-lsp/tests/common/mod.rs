//! Common test utilities for integration tests.
//!
//! Provides `LspClient`, which spawns the server binary and speaks JSON-RPC
//! over its stdio.

use serde_json::{Value, json};
use std::io::{BufRead, BufReader, Read, Write};
use std::process::{Child, Command, Stdio};

/// LSP test client for communicating with the server binary.
pub(crate) struct LspClient {
    process: Child,
    /// Methods of notifications and server requests, in arrival order.
    received: Vec<String>,
    reader: BufReader<std::process::ChildStdout>,
}

impl LspClient {
    /// Spawn the gomod-lsp binary.
    pub(crate) fn spawn() -> Self {
        let mut process = Command::new(env!("CARGO_BIN_EXE_gomod-lsp"))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .expect("Failed to spawn gomod-lsp binary");

        let stdout = process.stdout.take().expect("Failed to capture stdout");

        Self {
            process,
            received: Vec::new(),
            reader: BufReader::new(stdout),
        }
    }

    /// Methods the server sent on its own initiative so far.
    #[allow(dead_code)] // Not used in all tests
    pub(crate) fn received(&self) -> &[String] {
        &self.received
    }

    /// Send a JSON-RPC message to the server.
    pub(crate) fn send(&mut self, message: &Value) {
        let body = serde_json::to_string(message).unwrap();
        let header = format!("Content-Length: {}\r\n\r\n", body.len());

        let stdin = self.process.stdin.as_mut().expect("stdin not captured");
        stdin.write_all(header.as_bytes()).unwrap();
        stdin.write_all(body.as_bytes()).unwrap();
        stdin.flush().unwrap();
    }

    fn read_message(&mut self) -> Value {
        let mut content_length = 0;
        loop {
            let mut line = String::new();
            let bytes_read = self
                .reader
                .read_line(&mut line)
                .expect("Failed to read header");

            assert!(bytes_read != 0, "Server closed connection unexpectedly");

            if line == "\r\n" || line == "\n" {
                break;
            }

            if line.to_lowercase().starts_with("content-length:") {
                content_length = line
                    .split(':')
                    .nth(1)
                    .unwrap()
                    .trim()
                    .parse()
                    .expect("Invalid content length");
            }
        }

        let mut body = vec![0u8; content_length];
        self.reader
            .read_exact(&mut body)
            .expect("Failed to read body");

        serde_json::from_slice(&body).unwrap_or_else(|e| {
            panic!("Invalid JSON: {e} in: {:?}", String::from_utf8_lossy(&body))
        })
    }

    /// Read the response to request `expected_id`.
    ///
    /// Notifications are recorded. Server-to-client requests (such as
    /// `workspace/inlayHint/refresh`) are recorded and answered with `null`.
    pub(crate) fn read_response(&mut self, expected_id: i64) -> Value {
        loop {
            let message = self.read_message();

            if let Some(method) = message.get("method").and_then(Value::as_str) {
                self.received.push(method.to_string());
                if let Some(id) = message.get("id").cloned() {
                    self.send(&json!({ "jsonrpc": "2.0", "id": id, "result": null }));
                }
                continue;
            }

            if message.get("id") == Some(&json!(expected_id)) {
                return message;
            }
        }
    }

    /// Initialize the LSP session with the given initialization options.
    pub(crate) fn initialize(&mut self, options: Value) -> Value {
        self.send(&json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "initialize",
            "params": {
                "processId": null,
                "capabilities": {
                    "workspace": {
                        "inlayHint": {
                            "refreshSupport": true
                        }
                    },
                    "textDocument": {
                        "inlayHint": {}
                    }
                },
                "rootUri": null,
                "initializationOptions": options
            }
        }));

        let response = self.read_response(1);

        self.send(&json!({
            "jsonrpc": "2.0",
            "method": "initialized",
            "params": {}
        }));

        response
    }

    /// Open a text document.
    pub(crate) fn did_open(&mut self, uri: &str, text: &str) {
        self.send(&json!({
            "jsonrpc": "2.0",
            "method": "textDocument/didOpen",
            "params": {
                "textDocument": {
                    "uri": uri,
                    "languageId": "go.mod",
                    "version": 1,
                    "text": text
                }
            }
        }));
    }

    /// Replace the full text of an open document.
    #[allow(dead_code)] // Not used in all tests
    pub(crate) fn did_change(&mut self, uri: &str, version: i32, text: &str) {
        self.send(&json!({
            "jsonrpc": "2.0",
            "method": "textDocument/didChange",
            "params": {
                "textDocument": { "uri": uri, "version": version },
                "contentChanges": [{ "text": text }]
            }
        }));
    }

    /// Notify the server that a document was saved.
    #[allow(dead_code)] // Not used in all tests
    pub(crate) fn did_save(&mut self, uri: &str) {
        self.send(&json!({
            "jsonrpc": "2.0",
            "method": "textDocument/didSave",
            "params": {
                "textDocument": { "uri": uri }
            }
        }));
    }

    /// Request inlay hints.
    pub(crate) fn inlay_hints(&mut self, id: i64, uri: &str) -> Value {
        self.send(&json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": "textDocument/inlayHint",
            "params": {
                "textDocument": {"uri": uri},
                "range": {
                    "start": {"line": 0, "character": 0},
                    "end": {"line": 100, "character": 0}
                }
            }
        }));
        self.read_response(id)
    }

    /// Shutdown the server.
    pub(crate) fn shutdown(&mut self) -> Value {
        self.send(&json!({
            "jsonrpc": "2.0",
            "id": 999,
            "method": "shutdown"
        }));
        self.read_response(999)
    }
}

impl Drop for LspClient {
    fn drop(&mut self) {
        let _ = self.process.kill();
    }
}
