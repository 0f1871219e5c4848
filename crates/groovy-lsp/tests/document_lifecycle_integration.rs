//! Integration tests for the document lifecycle notifications, driven
//! through a real `tower::Service` around `Backend` rather than by
//! calling its handler functions directly — this is what actually
//! exercises `did_open`/`did_change`/`did_close`'s interaction with
//! `publish_diagnostics` over the `Client`/`ClientSocket` pair.

use std::time::Duration;

use futures::{SinkExt, StreamExt};
use serde_json::json;
use tempfile::tempdir;
use tower::Service;
use tower::ServiceExt;
use tower_lsp_server::jsonrpc::{Request, Response};
use tower_lsp_server::lsp_types::{
    DidChangeTextDocumentParams, DidCloseTextDocumentParams, DidOpenTextDocumentParams,
    InitializedParams, PublishDiagnosticsParams, TextDocumentContentChangeEvent,
    TextDocumentIdentifier, TextDocumentItem, Uri, VersionedTextDocumentIdentifier,
};
use tower_lsp_server::{ClientSocket, LspService};

use groovy_lsp::Backend;

async fn initialize_service(root: std::path::PathBuf) -> (LspService<Backend>, ClientSocket) {
    let (mut service, socket) = LspService::new(move |client| Backend::new(client, root.clone()));

    let initialize = Request::build("initialize").params(json!({ "capabilities": {} })).id(1).finish();
    let response = service.ready().await.expect("service ready").call(initialize).await.expect("initialize call");
    assert!(response.is_some(), "initialize should return a response");

    let initialized = Request::build("initialized")
        .params(serde_json::to_value(InitializedParams {}).expect("serialize initialized params"))
        .finish();
    let response = service.ready().await.expect("service ready").call(initialized).await.expect("initialized call");
    assert!(response.is_none(), "initialized notification should not return a response");

    (service, socket)
}

async fn send_notification<P: serde::Serialize>(service: &mut LspService<Backend>, socket: &mut ClientSocket, pending: &mut Vec<Request>, method: &'static str, params: P) {
    let request = Request::build(method).params(serde_json::to_value(params).expect("serialize notification params")).finish();
    let mut call_fut = Box::pin(async { service.ready().await.expect("service ready").call(request).await.expect("notification call") });

    loop {
        tokio::select! {
            response = &mut call_fut => {
                assert!(response.is_none(), "{method} should be handled as a notification");
                break;
            }
            maybe_req = socket.next() => {
                let req = maybe_req.expect("client socket closed unexpectedly");
                if let Some(id) = req.id().cloned() {
                    socket.send(Response::from_ok(id, json!(null))).await.expect("failed to send synthetic client response");
                } else {
                    pending.push(req);
                }
            }
        }
    }
}

fn parse_publish_for_uri(req: &Request, uri: &Uri) -> Option<PublishDiagnosticsParams> {
    if req.method() != "textDocument/publishDiagnostics" {
        return None;
    }
    let params: PublishDiagnosticsParams = serde_json::from_value(req.params().cloned()?).ok()?;
    (params.uri == *uri).then_some(params)
}

async fn next_publish_for_uri(socket: &mut ClientSocket, pending: &mut Vec<Request>, uri: &Uri) -> PublishDiagnosticsParams {
    if let Some(idx) = pending.iter().position(|req| parse_publish_for_uri(req, uri).is_some()) {
        let req = pending.remove(idx);
        return parse_publish_for_uri(&req, uri).expect("publish request should parse");
    }

    loop {
        let maybe_req = tokio::time::timeout(Duration::from_secs(10), socket.next()).await.expect("timed out waiting for a publishDiagnostics notification");
        let req = maybe_req.expect("client socket closed unexpectedly");
        if let Some(id) = req.id().cloned() {
            socket.send(Response::from_ok(id, json!(null))).await.expect("failed to send synthetic client response");
            continue;
        }
        if let Some(params) = parse_publish_for_uri(&req, uri) {
            return params;
        }
    }
}

#[tokio::test]
async fn did_open_publishes_no_diagnostics_for_well_formed_source() {
    let dir = tempdir().unwrap();
    let (mut service, mut socket) = initialize_service(dir.path().to_path_buf()).await;
    let mut pending = Vec::new();

    let uri = Uri::from_file_path(dir.path().join("Greeter.groovy")).unwrap();
    send_notification(
        &mut service,
        &mut socket,
        &mut pending,
        "textDocument/didOpen",
        DidOpenTextDocumentParams {
            text_document: TextDocumentItem { uri: uri.clone(), language_id: "groovy".to_string(), version: 1, text: "class Greeter {\n  def greet() { println 'hi' }\n}\n".to_string() },
        },
    )
    .await;

    let diagnostics = next_publish_for_uri(&mut socket, &mut pending, &uri).await;
    assert!(diagnostics.diagnostics.is_empty());
}

#[tokio::test]
async fn a_change_supersedes_the_previous_recompile_for_the_same_uri() {
    let dir = tempdir().unwrap();
    let (mut service, mut socket) = initialize_service(dir.path().to_path_buf()).await;
    let mut pending = Vec::new();

    let uri = Uri::from_file_path(dir.path().join("Greeter.groovy")).unwrap();
    send_notification(
        &mut service,
        &mut socket,
        &mut pending,
        "textDocument/didOpen",
        DidOpenTextDocumentParams { text_document: TextDocumentItem { uri: uri.clone(), language_id: "groovy".to_string(), version: 1, text: "class Greeter {}\n".to_string() } },
    )
    .await;
    next_publish_for_uri(&mut socket, &mut pending, &uri).await;

    send_notification(
        &mut service,
        &mut socket,
        &mut pending,
        "textDocument/didChange",
        DidChangeTextDocumentParams {
            text_document: VersionedTextDocumentIdentifier { uri: uri.clone(), version: 2 },
            content_changes: vec![TextDocumentContentChangeEvent { range: None, range_length: None, text: "class Greeter {\n  def bar() {}\n}\n".to_string() }],
        },
    )
    .await;

    let diagnostics = next_publish_for_uri(&mut socket, &mut pending, &uri).await;
    assert!(diagnostics.diagnostics.is_empty());
}

#[tokio::test]
async fn did_close_drops_the_recompile_guard_without_panicking() {
    let dir = tempdir().unwrap();
    let (mut service, mut socket) = initialize_service(dir.path().to_path_buf()).await;
    let mut pending = Vec::new();

    let uri = Uri::from_file_path(dir.path().join("Greeter.groovy")).unwrap();
    send_notification(
        &mut service,
        &mut socket,
        &mut pending,
        "textDocument/didOpen",
        DidOpenTextDocumentParams { text_document: TextDocumentItem { uri: uri.clone(), language_id: "groovy".to_string(), version: 1, text: "class Greeter {}\n".to_string() } },
    )
    .await;
    next_publish_for_uri(&mut socket, &mut pending, &uri).await;

    send_notification(&mut service, &mut socket, &mut pending, "textDocument/didClose", DidCloseTextDocumentParams { text_document: TextDocumentIdentifier { uri } }).await;
}
