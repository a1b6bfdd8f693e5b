//! LSP transport layer for the GSX language server.
//!
//! This crate provides the transport layer implementation for the GSX
//! language server, handling message framing according to the LSP Base
//! Protocol specification.
//!
//! # Overview
//!
//! The LSP Base Protocol uses Content-Length based message framing over stdio (or other
//! transports). This crate provides:
//!
//! - [`read_message`] - Read and parse an LSP message with Content-Length framing
//! - [`read_frame`] - Read a raw framed message body, for callers (the
//!   host-language proxy) whose messages aren't shaped like a request
//! - [`write_message`] - Write an LSP response with proper framing
//! - [`write_notification`] - Write an LSP notification with proper framing
//! - [`log_response`] - Debug logging for outgoing responses
//!
//! # Example
//!
//! ```no_run
//! use std::io::{BufReader, stdin, stdout};
//! use gsx_lsp_transport::{read_message, write_message};
//! use gsx_lsp_protocol::JsonRpcResponse;
//!
//! let mut reader = BufReader::new(stdin());
//! let mut writer = stdout();
//!
//! // Read an incoming message
//! if let Ok(Some(request)) = read_message(&mut reader) {
//!     // Process request and create response
//!     let response = JsonRpcResponse::null(request.id);
//!
//!     // Write the response
//!     write_message(&mut writer, &response).unwrap();
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod framing;

pub use framing::{log_response, read_frame, read_message, write_message, write_notification};
