//! Document storage and the workspace AST cache.

pub mod ast_cache;
pub mod document_store;

pub use ast_cache::AstCache;
pub use document_store::{ClosedDocument, DocumentEntry, DocumentStore};
