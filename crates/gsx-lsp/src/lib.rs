//! GSX Language Server runtime crate.
//!
//! This crate wires the workspace's library crates into a running LSP
//! server: [`gsx_lsp_transport`] frames JSON-RPC messages over stdio,
//! [`server::LspServer`] dispatches them, and every piece of actual
//! language intelligence lives in [`gsx_providers::Router`] and the crates
//! behind it. The binary (`src/main.rs`) only parses CLI flags and calls
//! [`run_stdio`].
//!
//! # Usage
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! gsx_lsp::run_stdio(gsx_lsp::ServerOptions::default())?;
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all)]
#![cfg_attr(test, allow(clippy::panic, clippy::unwrap_used, clippy::expect_used))]

pub mod server;
pub mod util;

pub use server::{LspServer, ServerOptions};

/// Runs the LSP server over stdio until the client disconnects or sends
/// `exit`.
pub fn run_stdio(options: ServerOptions) -> std::io::Result<()> {
    LspServer::new(options).run()
}
