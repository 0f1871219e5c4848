//! Integration tests for the `groovy-lsp` binary: spawn it as a child
//! process and drive it over its stdio JSON-RPC transport, the way a real
//! editor would.

use serde_json::{Value, json};
use std::io::{BufRead, BufReader, Read, Write};
use std::process::{Child, Command, Stdio};

/// LSP test client for communicating with the server binary.
struct LspClient {
    process: Child,
}

impl LspClient {
    fn spawn() -> Self {
        let process = Command::new(env!("CARGO_BIN_EXE_groovy-lsp"))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .expect("failed to spawn groovy-lsp binary");

        Self { process }
    }

    fn send(&mut self, message: &Value) {
        let body = serde_json::to_string(message).unwrap();
        let header = format!("Content-Length: {}\r\n\r\n", body.len());

        let stdin = self.process.stdin.as_mut().expect("stdin not captured");
        stdin.write_all(header.as_bytes()).unwrap();
        stdin.write_all(body.as_bytes()).unwrap();
        stdin.flush().unwrap();
    }

    /// Skips notifications and returns the first response with a matching
    /// id, or any response if no id filter is given.
    fn read_response(&mut self, expected_id: Option<i64>) -> Value {
        let stdout = self.process.stdout.as_mut().expect("stdout not captured");
        let mut reader = BufReader::new(stdout);

        loop {
            let mut content_length = 0;
            loop {
                let mut line = String::new();
                let bytes_read = reader.read_line(&mut line).expect("failed to read header");
                if bytes_read == 0 {
                    panic!("server closed connection unexpectedly");
                }
                if line == "\r\n" || line == "\n" {
                    break;
                }
                if line.to_lowercase().starts_with("content-length:") {
                    content_length = line.split(':').nth(1).unwrap().trim().parse().expect("invalid content length");
                }
            }

            if content_length == 0 {
                continue;
            }

            let mut body = vec![0u8; content_length];
            reader.read_exact(&mut body).expect("failed to read body");

            let message: Value = serde_json::from_slice(&body).unwrap_or_else(|e| panic!("invalid JSON: {e} in: {:?}", String::from_utf8_lossy(&body)));

            if message.get("id").is_none() {
                continue;
            }

            if let Some(id) = expected_id {
                if message.get("id") == Some(&json!(id)) {
                    return message;
                }
                continue;
            }

            return message;
        }
    }

    fn initialize(&mut self) -> Value {
        self.send(&json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "initialize",
            "params": {
                "processId": null,
                "capabilities": {},
                "rootUri": "file:///tmp",
                "workspaceFolders": null
            }
        }));

        let response = self.read_response(Some(1));

        self.send(&json!({
            "jsonrpc": "2.0",
            "method": "initialized",
            "params": {}
        }));

        response
    }

    fn did_open(&mut self, uri: &str, text: &str) {
        self.send(&json!({
            "jsonrpc": "2.0",
            "method": "textDocument/didOpen",
            "params": {
                "textDocument": {
                    "uri": uri,
                    "languageId": "groovy",
                    "version": 1,
                    "text": text
                }
            }
        }));
    }

    fn hover(&mut self, id: i64, uri: &str, line: u32, character: u32) -> Value {
        self.send(&json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": "textDocument/hover",
            "params": {
                "textDocument": {"uri": uri},
                "position": {"line": line, "character": character}
            }
        }));
        self.read_response(Some(id))
    }

    fn completion(&mut self, id: i64, uri: &str, line: u32, character: u32) -> Value {
        self.send(&json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": "textDocument/completion",
            "params": {
                "textDocument": {"uri": uri},
                "position": {"line": line, "character": character}
            }
        }));
        self.read_response(Some(id))
    }

    fn definition(&mut self, id: i64, uri: &str, line: u32, character: u32) -> Value {
        self.send(&json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": "textDocument/definition",
            "params": {
                "textDocument": {"uri": uri},
                "position": {"line": line, "character": character}
            }
        }));
        self.read_response(Some(id))
    }

    fn shutdown(&mut self) -> Value {
        self.send(&json!({"jsonrpc": "2.0", "id": 999, "method": "shutdown"}));
        self.read_response(Some(999))
    }
}

impl Drop for LspClient {
    fn drop(&mut self) {
        let _ = self.process.kill();
    }
}

#[test]
fn test_initialize_response() {
    let mut client = LspClient::spawn();
    let response = client.initialize();

    assert!(response.get("result").is_some(), "expected a result in the response");

    let result = &response["result"];
    assert_eq!(result["serverInfo"]["name"], "groovy-lsp");
    assert!(result["serverInfo"]["version"].is_string());

    let capabilities = &result["capabilities"];
    assert!(capabilities["hoverProvider"].as_bool().unwrap_or(false) || capabilities["hoverProvider"].is_object());
    assert!(capabilities["completionProvider"].is_object());
    assert!(capabilities["definitionProvider"].as_bool().unwrap_or(false));
    assert!(capabilities["semanticTokensProvider"].is_object());
}

#[test]
fn test_shutdown_response() {
    let mut client = LspClient::spawn();
    client.initialize();

    let response = client.shutdown();
    assert!(response.get("result").is_some() || response["result"].is_null());
}

#[test]
fn test_hover_on_a_class_declaration() {
    let mut client = LspClient::spawn();
    client.initialize();
    client.did_open("file:///tmp/Greeter.groovy", "class Greeter {}\n");

    let response = client.hover(2, "file:///tmp/Greeter.groovy", 0, 7);
    assert!(response.get("result").is_some());
}

#[test]
fn test_completion_includes_keywords() {
    let mut client = LspClient::spawn();
    client.initialize();
    client.did_open("file:///tmp/Greeter.groovy", "class Greeter {}\n");

    let response = client.completion(3, "file:///tmp/Greeter.groovy", 0, 0);
    let result = &response["result"];
    let items = result.as_array().or_else(|| result["items"].as_array()).expect("expected a completion list");
    assert!(items.iter().any(|item| item["label"] == "class"));
}

#[test]
fn test_definition_resolves_a_local_variable() {
    let mut client = LspClient::spawn();
    client.initialize();
    client.did_open("file:///tmp/Vars.groovy", "def total = 1\nprintln total\n");

    let response = client.definition(4, "file:///tmp/Vars.groovy", 1, 8);
    assert!(response.get("result").is_some());
}
