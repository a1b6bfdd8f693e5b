//! Cross-crate end-to-end scenarios exercised over the framed JSON-RPC
//! transport, rather than calling [`gsx_providers::Router`] directly —
//! these are the checks specific to this crate's wiring (§6 lifecycle,
//! §8 end-to-end scenarios 1 and 6).

use std::io::{self, Cursor, Write};
use std::sync::Arc;

use gsx_lsp::{LspServer, ServerOptions};
use gsx_test_support::{must, must_some};
use parking_lot::Mutex;
use serde_json::Value;

#[derive(Clone, Default)]
struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn framed(messages: &[Value]) -> Vec<u8> {
    let mut bytes = Vec::new();
    for message in messages {
        let body = must(serde_json::to_vec(message));
        bytes.extend_from_slice(format!("Content-Length: {}\r\n\r\n", body.len()).as_bytes());
        bytes.extend_from_slice(&body);
    }
    bytes
}

fn responses_from(bytes: &[u8]) -> Vec<Value> {
    let mut reader = Cursor::new(bytes);
    let mut responses = Vec::new();
    while let Some(body) = must(gsx_lsp_transport::read_frame(&mut reader)) {
        responses.push(must(serde_json::from_slice(&body)));
    }
    responses
}

fn initialize_request() -> Value {
    serde_json::json!({
        "jsonrpc": "2.0",
        "id": 1,
        "method": "initialize",
        "params": { "processId": null, "rootUri": "file:///workspace", "capabilities": {} },
    })
}

fn initialized_notification() -> Value {
    serde_json::json!({ "jsonrpc": "2.0", "method": "initialized", "params": {} })
}

/// `initialize` advertises exactly the capabilities §6 requires, and
/// `shutdown`/`exit` terminate the transport loop cleanly.
#[test]
fn lifecycle_handshake_advertises_capabilities_and_exits_cleanly() {
    let shutdown = serde_json::json!({ "jsonrpc": "2.0", "id": 5, "method": "shutdown" });
    let exit = serde_json::json!({ "jsonrpc": "2.0", "method": "exit" });
    let input = framed(&[initialize_request(), initialized_notification(), shutdown, exit]);

    let buffer = SharedBuffer::default();
    let mut server = LspServer::with_output(ServerOptions::default(), Box::new(buffer.clone()));
    let mut reader = Cursor::new(input);
    must(server.serve(&mut reader));
    assert!(server.shutdown_received());

    let written = buffer.0.lock().clone();
    let responses = responses_from(&written);
    assert_eq!(responses.len(), 2, "initialize and shutdown each get exactly one response");

    let capabilities = &responses[0]["result"]["capabilities"];
    assert_eq!(capabilities["hoverProvider"], Value::Bool(true));
    assert_eq!(capabilities["definitionProvider"], Value::Bool(true));
    assert!(capabilities["completionProvider"]["triggerCharacters"].as_array().is_some());
    assert!(responses[1]["error"].is_null());
}

/// Scenario 1: a hover and a definition request on a component parameter
/// both answer from the DSL alone, with no host-language proxy connected.
#[test]
fn hover_and_definition_on_a_parameter() {
    let source = "package p\n\ntempl Hello(name string) { <span>{name}</span> }\n";

    let did_open = serde_json::json!({
        "jsonrpc": "2.0",
        "method": "textDocument/didOpen",
        "params": { "textDocument": { "uri": "file:///src.gsx", "languageId": "gsx", "version": 1, "text": source } },
    });

    let byte = must_some(source.find("{name}")) + 1;
    let position = gsx_position::WirePosition::from_byte_offset(source, byte);
    let hover = serde_json::json!({
        "jsonrpc": "2.0",
        "id": 2,
        "method": "textDocument/hover",
        "params": {
            "textDocument": { "uri": "file:///src.gsx" },
            "position": { "line": position.line, "character": position.character },
        },
    });
    let definition = serde_json::json!({
        "jsonrpc": "2.0",
        "id": 3,
        "method": "textDocument/definition",
        "params": {
            "textDocument": { "uri": "file:///src.gsx" },
            "position": { "line": position.line, "character": position.character },
        },
    });
    let exit = serde_json::json!({ "jsonrpc": "2.0", "method": "exit" });

    let input = framed(&[initialize_request(), initialized_notification(), did_open, hover, definition, exit]);
    let buffer = SharedBuffer::default();
    let mut server = LspServer::with_output(ServerOptions::default(), Box::new(buffer.clone()));
    let mut reader = Cursor::new(input);
    must(server.serve(&mut reader));

    let written = buffer.0.lock().clone();
    let responses = responses_from(&written);
    let hover_response = must_some(responses.iter().find(|r| r["id"] == 2));
    assert!(hover_response["result"].is_object());

    let definition_response = must_some(responses.iter().find(|r| r["id"] == 3));
    assert!(!definition_response["result"].is_null());
}

/// Scenario 6: references span two open documents, workspace-symbol finds
/// the component by substring, and closing the defining document does not
/// remove it from subsequent reference answers.
#[test]
fn references_workspace_symbol_and_close_retain_component() {
    let header = "package p\n\ntempl Header() { <h1>hi</h1> }\n";
    let caller = "package p\n\ntempl Page() { @Header() }\n";

    let open_header = serde_json::json!({
        "jsonrpc": "2.0",
        "method": "textDocument/didOpen",
        "params": { "textDocument": { "uri": "file:///header.gsx", "languageId": "gsx", "version": 1, "text": header } },
    });
    let open_caller = serde_json::json!({
        "jsonrpc": "2.0",
        "method": "textDocument/didOpen",
        "params": { "textDocument": { "uri": "file:///page.gsx", "languageId": "gsx", "version": 1, "text": caller } },
    });

    let byte = must_some(caller.find("Header"));
    let position = gsx_position::WirePosition::from_byte_offset(caller, byte);
    let references_params = serde_json::json!({
        "textDocument": { "uri": "file:///page.gsx" },
        "position": { "line": position.line, "character": position.character },
        "context": { "includeDeclaration": true },
    });
    let references = serde_json::json!({
        "jsonrpc": "2.0", "id": 2, "method": "textDocument/references", "params": references_params,
    });
    let workspace_symbol = serde_json::json!({
        "jsonrpc": "2.0", "id": 3, "method": "workspace/symbol", "params": { "query": "head" },
    });
    let close_header = serde_json::json!({
        "jsonrpc": "2.0",
        "method": "textDocument/didClose",
        "params": { "textDocument": { "uri": "file:///header.gsx" } },
    });
    let references_params_after_close = serde_json::json!({
        "textDocument": { "uri": "file:///page.gsx" },
        "position": { "line": position.line, "character": position.character },
        "context": { "includeDeclaration": true },
    });
    let references_after_close = serde_json::json!({
        "jsonrpc": "2.0", "id": 4, "method": "textDocument/references", "params": references_params_after_close,
    });
    let exit = serde_json::json!({ "jsonrpc": "2.0", "method": "exit" });

    let input = framed(&[
        initialize_request(),
        initialized_notification(),
        open_header,
        open_caller,
        references,
        workspace_symbol,
        close_header,
        references_after_close,
        exit,
    ]);

    let buffer = SharedBuffer::default();
    let mut server = LspServer::with_output(ServerOptions::default(), Box::new(buffer.clone()));
    let mut reader = Cursor::new(input);
    must(server.serve(&mut reader));

    let written = buffer.0.lock().clone();
    let responses = responses_from(&written);

    let references_result = must_some(responses.iter().find(|r| r["id"] == 2))["result"].as_array().cloned();
    let locations = must_some(references_result);
    assert!(locations.iter().any(|l| l["uri"] == "file:///header.gsx"));

    let workspace_symbol_result = must_some(responses.iter().find(|r| r["id"] == 3))["result"].as_array().cloned();
    let symbols = must_some(workspace_symbol_result);
    assert!(symbols.iter().any(|s| s["name"] == "Header"));

    let references_after_close_result = must_some(responses.iter().find(|r| r["id"] == 4))["result"].as_array().cloned();
    let locations_after_close = must_some(references_after_close_result);
    assert!(locations_after_close.iter().any(|l| l["uri"] == "file:///header.gsx"));
}
