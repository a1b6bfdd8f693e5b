//! The request router: owned server state plus one dispatch method per
//! LSP feature (§2 "Control flow", §4.H).
//!
//! [`Router`] is the only thing in the workspace that touches the
//! document store, the symbol index, the workspace AST cache, the
//! virtual-file cache, and the host-language proxy together. Every
//! provider module stays a free function of a [`gsx_cursor::CursorContext`]
//! or a document snapshot; this module is the glue that resolves a
//! request into those arguments and holds the locks while it does.

use std::sync::Arc;

use gsx_host_proxy::{generate_virtual_file, HostProxy, VirtualFile};
use gsx_position::WirePosition;
use gsx_symbol_index::SymbolIndex;
use gsx_workspace::{AstCache, DocumentStore};
use lsp_types::{
    CompletionResponse, Diagnostic, DocumentSymbol, FormattingOptions, GotoDefinitionResponse, Hover, Location,
    SemanticTokens, SymbolInformation, TextEdit,
};
use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::diagnostics::diagnostics_for_parse_errors;

/// Receives diagnostics (parse errors merged with any translated
/// host-proxy diagnostics) the router has computed for one document, to
/// be sent onward as a `textDocument/publishDiagnostics` notification.
/// Implemented by the binary crate, which owns the actual transport.
pub trait DiagnosticsPublisher: Send + Sync {
    /// Called with the full, current diagnostics list for `uri`.
    fn publish(&self, uri: &str, diagnostics: Vec<Diagnostic>);
}

impl<F: Fn(&str, Vec<Diagnostic>) + Send + Sync> DiagnosticsPublisher for F {
    fn publish(&self, uri: &str, diagnostics: Vec<Diagnostic>) {
        self(uri, diagnostics)
    }
}

struct State {
    documents: DocumentStore,
    symbols: RwLock<SymbolIndex>,
    ast_cache: AstCache,
    virtual_files: RwLock<FxHashMap<String, VirtualFile>>,
    host: RwLock<Option<HostProxy>>,
    host_diagnostics: RwLock<FxHashMap<String, Vec<Diagnostic>>>,
    publisher: Box<dyn DiagnosticsPublisher>,
}

/// Owns every piece of shared server state and dispatches one method per
/// LSP request/notification the server answers. Cheap to clone — the
/// underlying state lives behind an `Arc`, so every provider thread and
/// the host-proxy's callbacks can hold their own handle.
#[derive(Clone)]
pub struct Router(Arc<State>);

impl Router {
    /// Creates an empty router. `publisher` receives every
    /// `textDocument/publishDiagnostics` payload the router computes,
    /// whether triggered by a document mutation or by a delayed
    /// host-proxy diagnostic arriving asynchronously.
    pub fn new(publisher: impl DiagnosticsPublisher + 'static) -> Self {
        Router(Arc::new(State {
            documents: DocumentStore::new(),
            symbols: RwLock::new(SymbolIndex::new()),
            ast_cache: AstCache::new(),
            virtual_files: RwLock::new(FxHashMap::default()),
            host: RwLock::new(None),
            host_diagnostics: RwLock::new(FxHashMap::default()),
            publisher: Box::new(publisher),
        }))
    }

    /// Spawns the host-language server and wires its source-map lookup
    /// and diagnostics callbacks back into this router. A failure here
    /// (the executable is missing from `PATH`, or the handshake fails) is
    /// the caller's to log; every provider already falls back to a
    /// DSL-only answer when `self.host` is empty (§7).
    pub fn connect_host_proxy(&self, command: &str, workspace_root: &str) -> Result<(), gsx_error::HostProxyError> {
        let lookup_router = self.clone();
        let diagnostics_router = self.clone();

        let proxy = HostProxy::spawn(
            command,
            workspace_root,
            move |dsl_uri: &str| lookup_router.0.virtual_files.read().get(dsl_uri).map(|vf| vf.source_map.clone()),
            move |dsl_uri: &str, diagnostics: Vec<Diagnostic>| {
                diagnostics_router.0.host_diagnostics.write().insert(dsl_uri.to_string(), diagnostics);
                diagnostics_router.publish_diagnostics(dsl_uri);
            },
        )?;

        *self.0.host.write() = Some(proxy);
        Ok(())
    }

    /// Shuts the host-language proxy down, if one is connected. Idempotent.
    pub fn disconnect_host_proxy(&self) {
        if let Some(mut proxy) = self.0.host.write().take() {
            proxy.shutdown();
        }
    }

    // ---- document lifecycle (§4.D, §5 "Ordering guarantees") ----------

    /// Handles `textDocument/didOpen`: parses, re-indexes, regenerates the
    /// virtual host file, opens it with the host proxy, and publishes
    /// diagnostics — all before returning, so the next notification for
    /// this URI always sees a fully settled state.
    pub fn open_document(&self, uri: &str, version: i32, text: String) {
        self.0.ast_cache.remove(uri);
        self.0.documents.open(uri.to_string(), version, text);
        self.reindex(uri);
        self.regenerate_virtual_file(uri, true);
        self.publish_diagnostics(uri);
    }

    /// Handles `textDocument/didChange` (full-text sync only).
    pub fn update_document(&self, uri: &str, version: i32, text: String) {
        if !self.0.documents.update(uri, version, text) {
            return;
        }
        self.reindex(uri);
        self.regenerate_virtual_file(uri, false);
        self.publish_diagnostics(uri);
    }

    /// Handles `textDocument/didClose`: the document's last AST moves into
    /// the workspace AST cache (so definition/references/workspace-symbol
    /// still resolve it), its virtual file is dropped, and the
    /// host-language server is told to close its copy. The symbol index
    /// is left untouched — closing a document doesn't un-declare its
    /// components and functions (§6 end-to-end scenario 6).
    pub fn close_document(&self, uri: &str) {
        if let Some(closed) = self.0.documents.close(uri) {
            self.0.ast_cache.insert(uri, closed.ast);
        }
        if let Some(virtual_file) = self.0.virtual_files.write().remove(uri) {
            if let Some(host) = self.0.host.read().as_ref() {
                let _ = host.close_virtual_file(&virtual_file.uri);
            }
        }
    }

    /// Handles `textDocument/didSave`. Full-text sync already keeps the
    /// store current, so there's nothing to re-read; this exists only to
    /// invalidate any on-disk source-map cache for `uri` (§3 "Lifecycle
    /// summary"), which this server doesn't currently maintain one of.
    pub fn save_document(&self, _uri: &str) {}

    fn reindex(&self, uri: &str) {
        self.0.documents.with_document(uri, |doc| {
            self.0.symbols.write().index_document(uri, &doc.ast);
        });
    }

    fn regenerate_virtual_file(&self, uri: &str, newly_opened: bool) {
        let Some(virtual_file) = self.0.documents.with_document(uri, |doc| generate_virtual_file(uri, &doc.ast, &doc.text)) else {
            return;
        };

        if let Some(host) = self.0.host.read().as_ref() {
            let version = self.0.documents.generation(uri).unwrap_or(0) as i32;
            let result = if newly_opened {
                host.open_virtual_file(&virtual_file.uri, &virtual_file.content, version)
            } else {
                host.update_virtual_file(&virtual_file.uri, &virtual_file.content, version)
            };
            if let Err(e) = result {
                log::warn!(target: "gsx_providers", "host-proxy push for {uri} failed: {e}");
            }
        }

        self.0.virtual_files.write().insert(uri.to_string(), virtual_file);
    }

    fn publish_diagnostics(&self, uri: &str) {
        let Some(mut diagnostics) = self.0.documents.with_document(uri, |doc| diagnostics_for_parse_errors(&doc.parse_errors)) else {
            return;
        };
        if let Some(host_diagnostics) = self.0.host_diagnostics.read().get(uri) {
            diagnostics.extend(host_diagnostics.iter().cloned());
        }
        self.0.publisher.publish(uri, diagnostics);
    }

    // ---- per-feature providers (§4.H) ----------------------------------

    /// Answers `textDocument/hover`.
    pub fn hover(&self, uri: &str, position: WirePosition) -> Option<Hover> {
        self.with_cursor(uri, position, |ctx, doc| {
            let symbols = self.0.symbols.read();
            let virtual_files = self.0.virtual_files.read();
            let host = self.0.host.read();
            crate::hover::hover(ctx, &doc.text, &symbols, host.as_ref(), virtual_files.get(uri))
        })
        .flatten()
    }

    /// Answers `textDocument/completion`.
    pub fn completion(&self, uri: &str, position: WirePosition, trigger: Option<char>) -> Option<CompletionResponse> {
        self.with_cursor(uri, position, |ctx, doc| {
            let symbols = self.0.symbols.read();
            let virtual_files = self.0.virtual_files.read();
            let host = self.0.host.read();
            crate::completion::completion(ctx, &doc.text, trigger, &symbols, host.as_ref(), virtual_files.get(uri))
        })
        .flatten()
    }

    /// Answers `textDocument/definition`.
    pub fn definition(&self, uri: &str, position: WirePosition) -> Option<GotoDefinitionResponse> {
        self.with_cursor(uri, position, |ctx, doc| {
            let symbols = self.0.symbols.read();
            let virtual_files = self.0.virtual_files.read();
            let host = self.0.host.read();
            crate::definition::definition(ctx, &doc.text, &doc.ast, &self.0.documents, &symbols, host.as_ref(), virtual_files.get(uri))
        })
        .flatten()
    }

    /// Answers `textDocument/references`.
    pub fn references(&self, uri: &str, position: WirePosition, include_declaration: bool) -> Vec<Location> {
        self.with_cursor(uri, position, |ctx, doc| {
            crate::references::references(ctx, &doc.text, &doc.ast, &self.0.documents, &self.0.ast_cache, include_declaration)
        })
        .unwrap_or_default()
    }

    /// Answers `textDocument/documentSymbol`.
    pub fn document_symbols(&self, uri: &str) -> Vec<DocumentSymbol> {
        self.0
            .documents
            .with_document(uri, |doc| crate::document_symbol::document_symbols(&doc.ast, &doc.text))
            .unwrap_or_default()
    }

    /// Answers `workspace/symbol`.
    pub fn workspace_symbols(&self, query: &str) -> Vec<SymbolInformation> {
        crate::workspace_symbol::workspace_symbols(query, &self.0.symbols.read())
    }

    /// Answers `textDocument/formatting`.
    pub fn formatting(&self, uri: &str, options: &FormattingOptions) -> Vec<TextEdit> {
        self.0
            .documents
            .with_document(uri, |doc| crate::formatting::format_document(&doc.ast, &doc.text, options))
            .unwrap_or_default()
    }

    /// Answers `textDocument/semanticTokens/full`.
    pub fn semantic_tokens(&self, uri: &str) -> Option<SemanticTokens> {
        self.0.documents.with_document(uri, |doc| crate::semantic_tokens::semantic_tokens(&doc.ast, &doc.text))
    }

    /// Returns the current diagnostics for `uri` (parse errors plus any
    /// translated host-proxy diagnostics already on file), without
    /// publishing — used for pull-model clients or tests that want the
    /// computed list directly rather than observing the publisher.
    pub fn diagnostics(&self, uri: &str) -> Vec<Diagnostic> {
        let mut diagnostics =
            self.0.documents.with_document(uri, |doc| diagnostics_for_parse_errors(&doc.parse_errors)).unwrap_or_default();
        if let Some(host_diagnostics) = self.0.host_diagnostics.read().get(uri) {
            diagnostics.extend(host_diagnostics.iter().cloned());
        }
        diagnostics
    }

    /// Whether `uri` is currently open (exposed for the binary crate's
    /// request validation).
    pub fn is_open(&self, uri: &str) -> bool {
        self.0.documents.is_open(uri)
    }

    fn with_cursor<R>(&self, uri: &str, position: WirePosition, f: impl FnOnce(&gsx_cursor::CursorContext, &gsx_workspace::DocumentEntry) -> R) -> Option<R> {
        self.0.documents.with_document(uri, |doc| {
            let ctx = gsx_cursor::resolve(&doc.ast, &doc.text, uri, position);
            f(&ctx, doc)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingPublisher(Mutex<Vec<(String, usize)>>);

    impl DiagnosticsPublisher for RecordingPublisher {
        fn publish(&self, uri: &str, diagnostics: Vec<Diagnostic>) {
            self.0.lock().unwrap_or_else(|e| e.into_inner()).push((uri.to_string(), diagnostics.len()));
        }
    }

    #[test]
    fn opening_a_well_formed_document_publishes_no_diagnostics() {
        let publisher = Arc::new(RecordingPublisher::default());
        let router = {
            let publisher = Arc::clone(&publisher);
            Router::new(move |uri: &str, diags: Vec<Diagnostic>| publisher.publish(uri, diags))
        };

        router.open_document("file:///a.gsx", 1, "package p\n\ntempl Hi() { <span/> }\n".to_string());

        let calls = publisher.0.lock().unwrap();
        assert_eq!(calls.last(), Some(&("file:///a.gsx".to_string(), 0)));
    }

    #[test]
    fn broken_document_publishes_at_least_one_diagnostic() {
        let publisher = Arc::new(RecordingPublisher::default());
        let router = {
            let publisher = Arc::clone(&publisher);
            Router::new(move |uri: &str, diags: Vec<Diagnostic>| publisher.publish(uri, diags))
        };

        router.open_document("file:///broken.gsx", 1, "package p\n\ntempl Hi() { <span>\n".to_string());

        let calls = publisher.0.lock().unwrap();
        let (_, count) = calls.last().expect("a publish call happened");
        assert!(*count >= 1);
    }

    #[test]
    fn hover_on_a_parameter_answers_without_a_host_proxy() {
        let router = Router::new(|_: &str, _: Vec<Diagnostic>| {});
        let source = "package p\n\ntempl Hello(name string) { <span>{name}</span> }\n";
        router.open_document("file:///a.gsx", 1, source.to_string());

        let byte = source.find("{name}").unwrap() + 1;
        let pos = gsx_position::WirePosition::from_byte_offset(source, byte);
        let hover = router.hover("file:///a.gsx", pos);
        assert!(hover.is_some());
    }

    #[test]
    fn closing_a_document_keeps_it_resolvable_for_references() {
        let router = Router::new(|_: &str, _: Vec<Diagnostic>| {});
        let a = "package p\n\ntempl Inner() { <span/> }\n";
        let b = "package p\n\ntempl Outer() { @Inner() }\n";
        router.open_document("file:///a.gsx", 1, a.to_string());
        router.open_document("file:///b.gsx", 1, b.to_string());

        router.close_document("file:///a.gsx");
        assert!(!router.is_open("file:///a.gsx"));

        let byte = b.find("Inner").unwrap();
        let pos = gsx_position::WirePosition::from_byte_offset(b, byte);
        let locations = router.references("file:///b.gsx", pos, true);
        assert!(locations.iter().any(|l| l.uri.as_str() == "file:///a.gsx"));
    }

    #[test]
    fn workspace_symbol_search_finds_indexed_components() {
        let router = Router::new(|_: &str, _: Vec<Diagnostic>| {});
        router.open_document("file:///a.gsx", 1, "package p\n\ntempl GreeterBox() { <span/> }\n".to_string());
        let results = router.workspace_symbols("greeter");
        assert!(results.iter().any(|s| s.name == "GreeterBox"));
    }
}
