//! The LSP server: owns the transport loop and dispatches JSON-RPC
//! requests and notifications to a [`gsx_providers::Router`] (§4.I, §6).
//!
//! [`LspServer::handle_request`] mirrors the teacher's
//! `handle_request(&mut self, request) -> Option<JsonRpcResponse>` shape: a
//! single `match` over the method name, answered directly for every method
//! §6 requires, `MethodNotFound` for everything else. There is no
//! `$/cancelRequest` handling — the core's only long-running external
//! dependency is the host-proxy, and shutting it down already cancels its
//! pending calls (§5 "Cancellation").

use std::io::{self, BufRead, BufReader, Write};
use std::sync::Arc;

use gsx_lsp_protocol::{
    methods, JsonRpcError, JsonRpcRequest, JsonRpcResponse, INTERNAL_ERROR, INVALID_PARAMS, METHOD_NOT_FOUND,
    SERVER_NOT_INITIALIZED,
};
use gsx_lsp_transport::{log_response, read_message, write_message, write_notification};
use gsx_position::WirePosition;
use gsx_providers::Router;
use lsp_types::{
    CompletionParams, CompletionResponse, Diagnostic, DidChangeTextDocumentParams, DidCloseTextDocumentParams,
    DidOpenTextDocumentParams, DidSaveTextDocumentParams, DocumentFormattingParams, DocumentSymbol,
    DocumentSymbolParams, GotoDefinitionParams, GotoDefinitionResponse, Hover, HoverParams, InitializeParams,
    InitializeResult, Location, ReferenceParams, SemanticTokensParams, SemanticTokensResult, ServerInfo,
    SymbolInformation, TextEdit, WorkspaceSymbolParams,
};
use parking_lot::Mutex;
use serde::Serialize;
use serde_json::Value;

/// Host-language server executable located on `PATH` when `--host-server`
/// (§6.2) is not given. GSX embeds Go host code, so the proxy speaks to a
/// `gopls` instance by default.
pub const DEFAULT_HOST_SERVER: &str = "gopls";

/// Startup options threaded from the CLI into [`LspServer`] (§6.2).
#[derive(Debug, Clone, Default)]
pub struct ServerOptions {
    /// Overrides `PATH` lookup for the host-language server executable.
    pub host_server: Option<String>,
}

/// The GSX language server: one [`Router`] holding all shared state, plus
/// the output writer diagnostics and responses are written through.
pub struct LspServer {
    router: Router,
    output: Arc<Mutex<Box<dyn Write + Send>>>,
    host_server: String,
    workspace_root: Option<String>,
    initialized: bool,
    shutdown_received: bool,
}

impl LspServer {
    /// Builds a server that writes responses and notifications to stdout.
    pub fn new(options: ServerOptions) -> Self {
        Self::with_output(options, Box::new(io::stdout()))
    }

    /// Builds a server over an arbitrary writer — used by tests that want
    /// to inspect what the server sends without a real stdio pipe.
    pub fn with_output(options: ServerOptions, output: Box<dyn Write + Send>) -> Self {
        let output = Arc::new(Mutex::new(output));
        let publisher_output = Arc::clone(&output);
        let router = Router::new(move |uri: &str, diagnostics: Vec<Diagnostic>| {
            let params = serde_json::json!({ "uri": uri, "diagnostics": diagnostics });
            let mut output = publisher_output.lock();
            let _ = write_notification(&mut *output, methods::TEXT_DOCUMENT_PUBLISH_DIAGNOSTICS, params);
        });
        Self {
            router,
            output,
            host_server: options.host_server.unwrap_or_else(|| DEFAULT_HOST_SERVER.to_string()),
            workspace_root: None,
            initialized: false,
            shutdown_received: false,
        }
    }

    /// Whether the client sent `shutdown` before the last `exit`/EOF. A
    /// client that exits without shutting down first should make the
    /// process exit non-zero, per the LSP lifecycle contract.
    pub fn shutdown_received(&self) -> bool {
        self.shutdown_received
    }

    /// Runs the transport loop over stdin until EOF or `exit`.
    pub fn run(&mut self) -> io::Result<()> {
        let stdin = io::stdin();
        let mut reader = BufReader::new(stdin.lock());
        self.serve(&mut reader)
    }

    /// Serves framed JSON-RPC messages read from `reader` until a clean
    /// EOF, writing every answered request's response back to the
    /// server's output writer.
    pub fn serve(&mut self, reader: &mut dyn BufRead) -> io::Result<()> {
        loop {
            match read_message(reader)? {
                Some(request) => {
                    let is_exit = request.method.as_str() == methods::EXIT;
                    if let Some(response) = self.handle_request(request) {
                        log_response(&response);
                        let mut output = self.output.lock();
                        write_message(&mut *output, &response)?;
                    }
                    if is_exit {
                        break;
                    }
                }
                None => break,
            }
        }
        self.router.disconnect_host_proxy();
        Ok(())
    }

    /// Dispatches one request or notification. Returns `None` for
    /// notifications (no response frame is written) and for `exit`.
    pub fn handle_request(&mut self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        let JsonRpcRequest { id, method, params, .. } = request;
        let params = params.unwrap_or(Value::Null);

        if !self.initialized && method != methods::INITIALIZE && method != methods::EXIT {
            return id.map(|id| {
                JsonRpcResponse::error(Some(id), JsonRpcError::new(SERVER_NOT_INITIALIZED, "server not initialized"))
            });
        }

        match method.as_str() {
            methods::INITIALIZE => Some(self.handle_initialize(id, params)),
            methods::INITIALIZED => {
                self.connect_host_proxy();
                None
            }
            methods::SHUTDOWN => {
                self.shutdown_received = true;
                Some(JsonRpcResponse::null(id))
            }
            methods::EXIT => {
                self.router.disconnect_host_proxy();
                None
            }

            methods::TEXT_DOCUMENT_DID_OPEN => {
                self.handle_did_open(params);
                None
            }
            methods::TEXT_DOCUMENT_DID_CHANGE => {
                self.handle_did_change(params);
                None
            }
            methods::TEXT_DOCUMENT_DID_CLOSE => {
                self.handle_did_close(params);
                None
            }
            methods::TEXT_DOCUMENT_DID_SAVE => {
                self.handle_did_save(params);
                None
            }

            methods::TEXT_DOCUMENT_HOVER => Some(ok_response(id, self.handle_hover(params))),
            methods::TEXT_DOCUMENT_COMPLETION => Some(ok_response(id, self.handle_completion(params))),
            methods::TEXT_DOCUMENT_DEFINITION => Some(ok_response(id, self.handle_definition(params))),
            methods::TEXT_DOCUMENT_REFERENCES => Some(ok_response(id, self.handle_references(params))),
            methods::TEXT_DOCUMENT_DOCUMENT_SYMBOL => Some(ok_response(id, self.handle_document_symbol(params))),
            methods::TEXT_DOCUMENT_FORMATTING => Some(ok_response(id, self.handle_formatting(params))),
            methods::TEXT_DOCUMENT_SEMANTIC_TOKENS_FULL => {
                Some(ok_response(id, self.handle_semantic_tokens_full(params)))
            }
            methods::WORKSPACE_SYMBOL => Some(ok_response(id, self.handle_workspace_symbol(params))),

            methods::WORKSPACE_DID_CHANGE_CONFIGURATION | methods::WORKSPACE_DID_CHANGE_WATCHED_FILES => None,

            other => {
                log::debug!(target: "gsx_lsp", "unhandled method: {other}");
                id.map(|id| {
                    JsonRpcResponse::error(
                        Some(id),
                        JsonRpcError::new(METHOD_NOT_FOUND, format!("method not found: {other}")),
                    )
                })
            }
        }
    }

    fn handle_initialize(&mut self, id: Option<Value>, params: Value) -> JsonRpcResponse {
        match serde_json::from_value::<InitializeParams>(params) {
            Ok(params) => {
                self.workspace_root = workspace_root_of(&params);
                self.initialized = true;
                ok_response(
                    id,
                    InitializeResult {
                        capabilities: gsx_lsp_protocol::capabilities::server_capabilities(),
                        server_info: Some(ServerInfo {
                            name: "gsx-lsp".to_string(),
                            version: Some(env!("CARGO_PKG_VERSION").to_string()),
                        }),
                    },
                )
            }
            Err(e) => JsonRpcResponse::error(id, JsonRpcError::new(INVALID_PARAMS, format!("malformed initialize params: {e}"))),
        }
    }

    /// Spawns the host-language proxy once the client confirms
    /// `initialized`. A spawn failure (e.g. the executable missing from
    /// `PATH`) is logged and every provider already falls back to a
    /// DSL-only answer (§7).
    fn connect_host_proxy(&mut self) {
        let root = self.workspace_root.clone().unwrap_or_else(|| "file:///".to_string());
        if let Err(e) = self.router.connect_host_proxy(&self.host_server, &root) {
            log::warn!(target: "gsx_lsp", "host-language server unavailable: {e}");
        }
    }

    fn handle_did_open(&self, params: Value) {
        let Ok(params) = serde_json::from_value::<DidOpenTextDocumentParams>(params) else {
            log::warn!(target: "gsx_lsp", "malformed didOpen params");
            return;
        };
        let uri = params.text_document.uri.to_string();
        self.router.open_document(&uri, params.text_document.version, params.text_document.text);
    }

    fn handle_did_change(&self, params: Value) {
        let Ok(params) = serde_json::from_value::<DidChangeTextDocumentParams>(params) else {
            log::warn!(target: "gsx_lsp", "malformed didChange params");
            return;
        };
        let uri = params.text_document.uri.to_string();
        let version = params.text_document.version;
        if let Some(change) = params.content_changes.into_iter().next_back() {
            self.router.update_document(&uri, version, change.text);
        }
    }

    fn handle_did_close(&self, params: Value) {
        let Ok(params) = serde_json::from_value::<DidCloseTextDocumentParams>(params) else {
            log::warn!(target: "gsx_lsp", "malformed didClose params");
            return;
        };
        self.router.close_document(&params.text_document.uri.to_string());
    }

    fn handle_did_save(&self, params: Value) {
        let Ok(params) = serde_json::from_value::<DidSaveTextDocumentParams>(params) else {
            log::warn!(target: "gsx_lsp", "malformed didSave params");
            return;
        };
        self.router.save_document(&params.text_document.uri.to_string());
    }

    fn handle_hover(&self, params: Value) -> Option<Hover> {
        let params: HoverParams = serde_json::from_value(params).ok()?;
        let text_document_position = params.text_document_position_params;
        let uri = text_document_position.text_document.uri.to_string();
        let position = WirePosition::from(text_document_position.position);
        self.router.hover(&uri, position)
    }

    fn handle_completion(&self, params: Value) -> Option<CompletionResponse> {
        let params: CompletionParams = serde_json::from_value(params).ok()?;
        let uri = params.text_document_position.text_document.uri.to_string();
        let position = WirePosition::from(params.text_document_position.position);
        let trigger = params.context.as_ref().and_then(|c| c.trigger_character.as_deref()).and_then(|s| s.chars().next());
        self.router.completion(&uri, position, trigger)
    }

    fn handle_definition(&self, params: Value) -> Option<GotoDefinitionResponse> {
        let params: GotoDefinitionParams = serde_json::from_value(params).ok()?;
        let text_document_position = params.text_document_position_params;
        let uri = text_document_position.text_document.uri.to_string();
        let position = WirePosition::from(text_document_position.position);
        self.router.definition(&uri, position)
    }

    fn handle_references(&self, params: Value) -> Vec<Location> {
        let Ok(params) = serde_json::from_value::<ReferenceParams>(params) else { return Vec::new() };
        let uri = params.text_document_position.text_document.uri.to_string();
        let position = WirePosition::from(params.text_document_position.position);
        self.router.references(&uri, position, params.context.include_declaration)
    }

    fn handle_document_symbol(&self, params: Value) -> Vec<DocumentSymbol> {
        let Ok(params) = serde_json::from_value::<DocumentSymbolParams>(params) else { return Vec::new() };
        self.router.document_symbols(&params.text_document.uri.to_string())
    }

    fn handle_formatting(&self, params: Value) -> Vec<TextEdit> {
        let Ok(params) = serde_json::from_value::<DocumentFormattingParams>(params) else { return Vec::new() };
        self.router.formatting(&params.text_document.uri.to_string(), &params.options)
    }

    fn handle_semantic_tokens_full(&self, params: Value) -> Option<SemanticTokensResult> {
        let params: SemanticTokensParams = serde_json::from_value(params).ok()?;
        let tokens = self.router.semantic_tokens(&params.text_document.uri.to_string())?;
        Some(SemanticTokensResult::Tokens(tokens))
    }

    fn handle_workspace_symbol(&self, params: Value) -> Vec<SymbolInformation> {
        let Ok(params) = serde_json::from_value::<WorkspaceSymbolParams>(params) else { return Vec::new() };
        self.router.workspace_symbols(&params.query)
    }
}

fn workspace_root_of(params: &InitializeParams) -> Option<String> {
    if let Some(uri) = &params.root_uri {
        return Some(uri.to_string());
    }
    params.workspace_folders.as_ref()?.first().map(|folder| folder.uri.to_string())
}

fn ok_response(id: Option<Value>, result: impl Serialize) -> JsonRpcResponse {
    match serde_json::to_value(result) {
        Ok(value) => JsonRpcResponse::success(id, value),
        Err(e) => JsonRpcResponse::error(id, JsonRpcError::new(INTERNAL_ERROR, format!("failed to serialize result: {e}"))),
    }
}
