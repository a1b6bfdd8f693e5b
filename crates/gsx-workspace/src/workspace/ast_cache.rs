//! Workspace AST cache for documents the client has closed (§4.D, §6
//! "Ordering guarantees").
//!
//! The [`crate::document_store::DocumentStore`] only knows about open
//! documents. Definition, references, and workspace-symbol requests need to
//! resolve targets in files that were indexed once (e.g. at startup, or
//! before the user closed them) but are not currently open in the editor.
//! The router owns one `AstCache` and populates it from
//! [`crate::document_store::ClosedDocument`] on every `didClose`.

use std::sync::Arc;

use gsx_ast::File;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;

/// Thread-safe cache of ASTs for documents not currently open, keyed by
/// normalized URI.
#[derive(Clone, Default)]
pub struct AstCache {
    entries: Arc<RwLock<FxHashMap<String, Arc<File>>>>,
}

impl AstCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the cached AST for `uri`.
    pub fn insert(&self, uri: &str, ast: File) {
        let key = gsx_uri::uri_key(uri);
        self.entries.write().insert(key, Arc::new(ast));
    }

    /// Returns the cached AST for `uri`, if any.
    pub fn get(&self, uri: &str) -> Option<Arc<File>> {
        let key = gsx_uri::uri_key(uri);
        self.entries.read().get(&key).cloned()
    }

    /// Drops the cached entry for `uri`, e.g. when the document is
    /// reopened and the document store becomes authoritative again.
    pub fn remove(&self, uri: &str) -> bool {
        let key = gsx_uri::uri_key(uri);
        self.entries.write().remove(&key).is_some()
    }

    /// Every cached URI, in no particular order.
    pub fn all_uris(&self) -> Vec<String> {
        self.entries.read().keys().cloned().collect()
    }
}
