//! Small binary-local utilities that don't belong in any library crate.

pub mod debug_log;
