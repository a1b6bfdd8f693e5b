//! In-memory store of open documents (§4.D).
//!
//! Full-text synchronization only: every `update` replaces a document's
//! entire content and re-runs the parser. The store never touches disk —
//! "open"/"update"/"close" mirror the LSP `textDocument/did*` notifications
//! exactly, one call each.

use std::sync::Arc;

use gsx_ast::File;
use gsx_error::ParseError;
use gsx_position::LineStartsCache;
use parking_lot::RwLock;
use ropey::Rope;
use rustc_hash::FxHashMap;

/// One open document: its authoritative content, the AST and diagnostics
/// from the most recent parse, and the bookkeeping providers need to
/// translate positions and detect stale captures.
pub struct DocumentEntry {
    /// The document's URI, as supplied by the client.
    pub uri: String,
    /// LSP version number of the most recent `didOpen`/`didChange`.
    pub version: i32,
    /// The authoritative content buffer.
    pub rope: Rope,
    /// `rope` materialized as a `String`, since the parser takes `&str`.
    /// Rebuilt alongside `rope` on every open/update.
    pub text: String,
    /// Line-start offsets for `text`, rebuilt alongside the AST so
    /// position translation never walks the text twice.
    pub line_starts: LineStartsCache,
    /// The most recent parse's AST.
    pub ast: File,
    /// The most recent parse's recovered diagnostics.
    pub parse_errors: Vec<ParseError>,
    /// Monotonically increasing per-document counter, bumped on every
    /// open/update. Providers capture this alongside a `(document,
    /// position)` pair before delegating to the host proxy, and check it
    /// again before publishing the proxy's answer — a mismatch means the
    /// document changed out from under the in-flight request.
    pub generation: u64,
}

impl DocumentEntry {
    fn new(uri: String, version: i32, text: String) -> Self {
        let rope = Rope::from_str(&text);
        let line_starts = LineStartsCache::new_rope(&rope);
        let parsed = gsx_parser::parse(&text);
        Self {
            uri,
            version,
            rope,
            text,
            line_starts,
            ast: parsed.file,
            parse_errors: parsed.diagnostics,
            generation: 0,
        }
    }

    fn apply_update(&mut self, version: i32, text: String) {
        self.version = version;
        self.rope = Rope::from_str(&text);
        self.line_starts = LineStartsCache::new_rope(&self.rope);
        let parsed = gsx_parser::parse(&text);
        self.text = text;
        self.ast = parsed.file;
        self.parse_errors = parsed.diagnostics;
        self.generation += 1;
    }
}

/// A document that was just closed, handed back so the caller can push its
/// AST into a workspace AST cache before it is otherwise forgotten.
pub struct ClosedDocument {
    /// The closed document's URI.
    pub uri: String,
    /// The AST from its last parse, as of closing.
    pub ast: File,
}

/// Thread-safe store of currently open documents.
///
/// Guarded by a single `parking_lot::RwLock`: readers (providers answering
/// a request) take a read lock, writers (`open`/`update`/`close`) take a
/// write lock. `parking_lot` locks are never poisoned by a panicking
/// holder, so a panic inside one provider's read-locked section cannot
/// wedge the lock for the rest of the session.
#[derive(Clone, Default)]
pub struct DocumentStore {
    documents: Arc<RwLock<FxHashMap<String, DocumentEntry>>>,
}

impl DocumentStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a document, parsing it for the first time. Overwrites any
    /// existing entry for the same URI.
    pub fn open(&self, uri: String, version: i32, text: String) {
        let key = gsx_uri::uri_key(&uri);
        let entry = DocumentEntry::new(uri, version, text);
        self.documents.write().insert(key, entry);
    }

    /// Replaces a document's full content and re-parses it. Returns
    /// `false` if the document was not open.
    pub fn update(&self, uri: &str, version: i32, text: String) -> bool {
        let key = gsx_uri::uri_key(uri);
        let mut docs = self.documents.write();
        let Some(entry) = docs.get_mut(&key) else {
            return false;
        };
        entry.apply_update(version, text);
        true
    }

    /// Closes a document, returning its last-known AST for hand-off to a
    /// workspace AST cache. Returns `None` if the document was not open.
    pub fn close(&self, uri: &str) -> Option<ClosedDocument> {
        let key = gsx_uri::uri_key(uri);
        let entry = self.documents.write().remove(&key)?;
        Some(ClosedDocument { uri: entry.uri, ast: entry.ast })
    }

    /// Runs `f` against the entry for `uri` under a read lock, returning
    /// `None` if the document is not open. Accepting a closure rather than
    /// handing back a guard or a clone keeps `DocumentEntry` (which holds
    /// an AST and a rope) out of caller-held locks.
    pub fn with_document<R>(&self, uri: &str, f: impl FnOnce(&DocumentEntry) -> R) -> Option<R> {
        let key = gsx_uri::uri_key(uri);
        let docs = self.documents.read();
        docs.get(&key).map(f)
    }

    /// The current generation counter for `uri`, or `None` if not open.
    pub fn generation(&self, uri: &str) -> Option<u64> {
        self.with_document(uri, |doc| doc.generation)
    }

    /// Whether `uri` is currently open.
    pub fn is_open(&self, uri: &str) -> bool {
        let key = gsx_uri::uri_key(uri);
        self.documents.read().contains_key(&key)
    }

    /// The number of currently open documents.
    pub fn count(&self) -> usize {
        self.documents.read().len()
    }

    /// Every currently open document's URI, in no particular order.
    pub fn all_uris(&self) -> Vec<String> {
        self.documents.read().values().map(|doc| doc.uri.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_then_get_returns_the_parsed_ast() {
        let store = DocumentStore::new();
        store.open("file:///a.gsx".to_string(), 1, "package p\n\ntempl Hi() { <span/> }\n".to_string());

        let name = store
            .with_document("file:///a.gsx", |doc| doc.ast.components().next().map(|c| c.name.clone()))
            .flatten();
        assert_eq!(name, Some("Hi".to_string()));
    }

    #[test]
    fn update_reparses_and_bumps_generation() {
        let store = DocumentStore::new();
        store.open("file:///a.gsx".to_string(), 1, "package p\n\ntempl Hi() { <span/> }\n".to_string());
        assert_eq!(store.generation("file:///a.gsx"), Some(0));

        let updated = store.update("file:///a.gsx", 2, "package p\n\ntempl Bye() { <span/> }\n".to_string());
        assert!(updated);
        assert_eq!(store.generation("file:///a.gsx"), Some(1));

        let name = store
            .with_document("file:///a.gsx", |doc| doc.ast.components().next().unwrap().name.clone())
            .unwrap();
        assert_eq!(name, "Bye");
    }

    #[test]
    fn updating_an_unopened_document_returns_false() {
        let store = DocumentStore::new();
        assert!(!store.update("file:///missing.gsx", 1, "package p\n".to_string()));
    }

    #[test]
    fn close_returns_the_last_ast_and_forgets_the_document() {
        let store = DocumentStore::new();
        store.open("file:///a.gsx".to_string(), 1, "package p\n\ntempl Hi() { <span/> }\n".to_string());

        let closed = store.close("file:///a.gsx").expect("was open");
        assert_eq!(closed.uri, "file:///a.gsx");
        assert_eq!(closed.ast.components().next().map(|c| c.name.as_str()), Some("Hi"));
        assert!(!store.is_open("file:///a.gsx"));
    }

    #[test]
    fn closing_an_unopened_document_returns_none() {
        let store = DocumentStore::new();
        assert!(store.close("file:///missing.gsx").is_none());
    }

    #[test]
    fn uri_normalization_makes_open_and_lookup_agree() {
        let store = DocumentStore::new();
        store.open("FILE:///A.gsx".to_string(), 1, "package p\n".to_string());
        assert!(store.is_open("file:///A.gsx"));
    }
}
