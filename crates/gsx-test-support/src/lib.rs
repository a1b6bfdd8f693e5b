//! Panic-on-failure helpers shared by tests across the workspace.

#![deny(unsafe_code)]
#![deny(unreachable_pub)]
#![warn(rust_2018_idioms)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]

mod must;

pub use must::{must, must_err, must_some};
