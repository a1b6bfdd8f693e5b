//! Virtual host-file generation and the host-language server proxy.
//!
//! A GSX document has no compiler or language server of its own for the
//! Go code embedded in host expressions, component bodies, and top-level
//! declarations. This crate bridges that gap: [`generator`] synthesizes a
//! valid Go file from a parsed document and records a [`source_map`]
//! between the two buffers, and [`proxy`] drives a real Go language
//! server against that synthesized file, translating its answers back to
//! DSL coordinates.
//!
//! ## Usage
//!
//! ```no_run
//! use gsx_host_proxy::generator::generate_virtual_file;
//! use gsx_parser::parse;
//!
//! let source = "package p\n\ntempl Hello() { <span>hi</span> }\n";
//! let output = parse(source);
//! let virtual_file = generate_virtual_file("file:///hello.gsx", &output.file, source);
//! assert!(virtual_file.content.contains("package p"));
//! ```

#![deny(unsafe_code)]
#![cfg_attr(test, allow(clippy::panic, clippy::unwrap_used, clippy::expect_used))]
#![warn(rust_2018_idioms)]
#![warn(missing_docs)]
#![warn(clippy::all)]

/// Synthesizes a virtual host-language file from a parsed GSX document.
pub mod generator;
/// Bidirectional DSL ↔ generated-file position mapping.
pub mod source_map;

/// The host-language server proxy: subprocess lifecycle, JSON-RPC
/// request/response correlation, and diagnostic translation.
pub mod proxy;

pub use generator::{dsl_position_at, generate_virtual_file, VirtualFile};
pub use proxy::{DiagnosticsSink, HostProxy, SourceMapLookup, DISK_IMPORT_LINE_OFFSET};
pub use source_map::{GenPosition, SourceMap};
