//! Process-wide debug logging, gated by `GSX_LSP_DEBUG_LOG` (§6.1/§6.2).
//!
//! When no path is configured, logging is entirely inert: no logger is
//! installed, so every `log::*!` call anywhere in the workspace costs a
//! single disabled-level check. When a path is configured, every record
//! from any crate is appended to that file as one bracket-prefixed line —
//! the file is reopened for each write rather than held open for the
//! process lifetime, matching the teacher's `eprintln!`-per-call logging
//! rather than a buffered structured subscriber. stderr stays reserved for
//! the fatal/startup messages `main` prints directly.

use std::fs::OpenOptions;
use std::io::Write as _;
use std::path::PathBuf;

use log::{Level, Log, Metadata, Record};

struct FileLogger {
    path: PathBuf,
}

impl Log for FileLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= Level::Trace
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let Ok(mut file) = OpenOptions::new().create(true).append(true).open(&self.path) else {
            return;
        };
        let _ = writeln!(file, "[gsx-lsp:{}] {} {}", record.target(), record.level(), record.args());
    }

    fn flush(&self) {}
}

/// Installs the file logger from `GSX_LSP_DEBUG_LOG`, or does nothing if
/// the variable is unset.
pub fn init() {
    init_at(std::env::var_os("GSX_LSP_DEBUG_LOG").map(PathBuf::from));
}

/// Installs the file logger at `path`, or does nothing if `path` is
/// `None`. Exposed separately from [`init`] so `--log <path>` (§6.2) can
/// override the environment variable. A logger can only be installed once
/// per process; a second call is silently ignored.
pub fn init_at(path: Option<PathBuf>) {
    let Some(path) = path else { return };
    if log::set_boxed_logger(Box::new(FileLogger { path })).is_ok() {
        log::set_max_level(log::LevelFilter::Trace);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_path_is_a_no_op() {
        init_at(None);
    }
}
