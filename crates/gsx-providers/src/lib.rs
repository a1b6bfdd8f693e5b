//! Request router and feature providers for the GSX language server.
//!
//! [`router::Router`] owns every piece of shared server state (the open
//! document store, the symbol index, the closed-document AST cache, the
//! virtual host-file cache, and the optional host-language proxy) and
//! dispatches incoming JSON-RPC requests to the provider module that
//! answers them. Each provider module is a thin, mostly-pure function of
//! a [`gsx_cursor::CursorContext`] or a document snapshot — the router is
//! the only place that touches locks.

#![deny(unsafe_code)]
#![cfg_attr(test, allow(clippy::panic, clippy::unwrap_used, clippy::expect_used))]
#![warn(rust_2018_idioms)]
#![warn(missing_docs)]
#![warn(clippy::all)]

/// Converts parse errors (and, once merged, host-proxy diagnostics) to LSP
/// diagnostics.
pub mod diagnostics;
/// Jump-to-definition.
pub mod definition;
/// Document symbol outline.
pub mod document_symbol;
/// Full-document formatting.
pub mod formatting;
/// Hover information.
pub mod hover;
/// Code completion.
pub mod completion;
/// Find references.
pub mod references;
/// The request router: dispatch table plus owned server state.
pub mod router;
/// Resolves a document's text for cross-file position translation.
pub mod text_source;
/// Semantic tokens for syntax highlighting.
pub mod semantic_tokens;
/// Workspace-wide symbol search.
pub mod workspace_symbol;

pub use router::Router;
