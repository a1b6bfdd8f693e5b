//! Document store and workspace AST cache for the GSX language server.
//!
//! This crate holds all mutable document state the router and providers
//! share: the [`DocumentStore`] of currently open documents (re-parsed on
//! every `didOpen`/`didChange`) and the [`AstCache`] of ASTs for documents
//! that were indexed once but are not currently open.

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![cfg_attr(test, allow(clippy::panic, clippy::unwrap_used, clippy::expect_used))]

pub mod workspace;

pub use workspace::{AstCache, ClosedDocument, DocumentEntry, DocumentStore};
