//! Error taxonomy for the GSX language server core.
//!
//! Four kinds of failure recur across the core's subsystems:
//!
//! - **Parse errors** ([`ParseError`]) — recoverable, produced by the parser,
//!   surfaced as diagnostics. The parser never aborts; it records these and
//!   keeps going.
//! - **Source-map misses** — not an error type at all. `dsl_to_gen`/`gen_to_dsl`
//!   return `found = false` and the caller falls back; see `gsx_host_proxy`.
//! - **Host-proxy errors** ([`HostProxyError`]) — transport and protocol
//!   failures talking to the host-language server subprocess.
//! - **I/O errors** ([`WorkspaceIoError`]) — workspace file-walking failures,
//!   logged and skipped rather than aborting indexing.
//!
//! Scope errors are deliberately absent from this taxonomy: a missing scope
//! member produces no result and no error.

use gsx_position::DslPosition;
use thiserror::Error;

/// Budget limits for parser operations, preventing runaway recovery on
/// adversarial or deeply malformed input.
///
/// Every recovery attempt must consume at least one token or exit; these
/// limits bound how many attempts, how much skipping, and how much nesting
/// the parser will tolerate before giving up on a region and moving on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseBudget {
    /// Maximum number of errors to collect before the parser stops
    /// recording new ones. Existing partial AST is still returned.
    pub max_errors: usize,
    /// Maximum nesting depth for recursive constructs (element/body nesting).
    pub max_depth: usize,
    /// Maximum tokens to skip across all recovery attempts in one parse.
    pub max_tokens_skipped: usize,
    /// Maximum number of recovery attempts per parse.
    pub max_recoveries: usize,
}

impl Default for ParseBudget {
    fn default() -> Self {
        Self { max_errors: 200, max_depth: 256, max_tokens_skipped: 4000, max_recoveries: 1000 }
    }
}

impl ParseBudget {
    /// Generous limits suitable for interactive IDE use against
    /// attacker-controlled or merely half-written source.
    pub fn for_ide() -> Self {
        Self::default()
    }

    /// Tighter limits for batch or offline parsing of untrusted input.
    pub fn strict() -> Self {
        Self { max_errors: 20, max_depth: 64, max_tokens_skipped: 200, max_recoveries: 100 }
    }

    /// No limits. Use only for trusted, bounded input such as unit tests.
    pub fn unlimited() -> Self {
        Self {
            max_errors: usize::MAX,
            max_depth: usize::MAX,
            max_tokens_skipped: usize::MAX,
            max_recoveries: usize::MAX,
        }
    }
}

/// Tracks budget consumption during one parse.
#[derive(Debug, Clone, Default)]
pub struct BudgetTracker {
    /// Number of errors emitted so far.
    pub errors_emitted: usize,
    /// Current nesting depth.
    pub current_depth: usize,
    /// Maximum depth reached during the parse.
    pub max_depth_reached: usize,
    /// Total tokens skipped across all recovery attempts.
    pub tokens_skipped: usize,
    /// Number of recovery attempts made.
    pub recoveries_attempted: usize,
}

impl BudgetTracker {
    /// Create a fresh tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// True once the error budget is exhausted; callers should stop
    /// recording new `ParseError`s (parsing itself continues).
    pub fn errors_exhausted(&self, budget: &ParseBudget) -> bool {
        self.errors_emitted >= budget.max_errors
    }

    /// True if entering one more nesting level would exceed the budget.
    pub fn depth_would_exceed(&self, budget: &ParseBudget) -> bool {
        self.current_depth >= budget.max_depth
    }

    /// True if skipping `count` more tokens would exceed the budget.
    pub fn skip_would_exceed(&self, budget: &ParseBudget, count: usize) -> bool {
        self.tokens_skipped.saturating_add(count) > budget.max_tokens_skipped
    }

    /// True if another recovery attempt would exceed the budget.
    pub fn recoveries_exhausted(&self, budget: &ParseBudget) -> bool {
        self.recoveries_attempted >= budget.max_recoveries
    }

    /// Begin a recovery attempt, checking budget first.
    ///
    /// Returns `false` if another attempt would exceed the budget; otherwise
    /// records the attempt and returns `true`.
    pub fn begin_recovery(&mut self, budget: &ParseBudget) -> bool {
        if self.recoveries_attempted >= budget.max_recoveries {
            return false;
        }
        self.recoveries_attempted = self.recoveries_attempted.saturating_add(1);
        true
    }

    /// True if skipping `additional` more tokens would stay within budget.
    pub fn can_skip_more(&self, budget: &ParseBudget, additional: usize) -> bool {
        self.tokens_skipped.saturating_add(additional) <= budget.max_tokens_skipped
    }

    /// Record an error emission.
    pub fn record_error(&mut self) {
        self.errors_emitted = self.errors_emitted.saturating_add(1);
    }

    /// Enter a deeper nesting level.
    pub fn enter_depth(&mut self) {
        self.current_depth = self.current_depth.saturating_add(1);
        if self.current_depth > self.max_depth_reached {
            self.max_depth_reached = self.current_depth;
        }
    }

    /// Exit a nesting level.
    pub fn exit_depth(&mut self) {
        self.current_depth = self.current_depth.saturating_sub(1);
    }

    /// Record tokens skipped during a recovery attempt.
    pub fn record_skip(&mut self, count: usize) {
        self.tokens_skipped = self.tokens_skipped.saturating_add(count);
    }

    /// Record a recovery attempt.
    pub fn record_recovery(&mut self) {
        self.recoveries_attempted = self.recoveries_attempted.saturating_add(1);
    }
}

/// A recoverable parse error with a source range.
///
/// The parser emits one of these per unexpected token or unresolvable
/// construct, then resynchronizes and continues; it never aborts, so a
/// file with a non-empty diagnostics list is a normal, expected outcome.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ParseError {
    /// Where the error starts.
    pub position: DslPosition,
    /// Where the error ends, if the parser could determine a meaningful
    /// end (e.g. the extent of an unexpected token). `None` means callers
    /// must estimate a width from `message`.
    pub end_position: Option<DslPosition>,
    /// Human-readable description of what went wrong.
    pub message: String,
    /// An optional suggestion for fixing the error (e.g. "insert `}`").
    pub hint: Option<String>,
}

impl ParseError {
    /// Create a bare error with no end position or hint.
    pub fn new(position: DslPosition, message: impl Into<String>) -> Self {
        Self { position, end_position: None, message: message.into(), hint: None }
    }

    /// Attach an end position.
    pub fn with_end(mut self, end_position: DslPosition) -> Self {
        self.end_position = Some(end_position);
        self
    }

    /// Attach a recovery hint.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    /// Estimate the width, in UTF-8 characters, of the offending span when
    /// no end position was recorded. Prefers a quoted substring
    /// (`` `foo` `` or `"foo"`) in the message; falls back to the
    /// message's last word; never returns less than 1.
    pub fn estimated_width(&self) -> usize {
        if let Some(end) = self.end_position {
            let width = end.column.saturating_sub(self.position.column);
            if width > 0 {
                return width as usize;
            }
        }
        for (open, close) in [('`', '`'), ('"', '"')] {
            if let Some(start) = self.message.find(open) {
                let rest = &self.message[start + open.len_utf8()..];
                if let Some(end) = rest.find(close) {
                    let len = rest[..end].chars().count();
                    if len > 0 {
                        return len;
                    }
                }
            }
        }
        self.message
            .split_whitespace()
            .last()
            .map(|w| w.chars().count())
            .filter(|n| *n > 0)
            .unwrap_or(1)
    }
}

/// Result type for parser operations.
pub type ParseResult<T> = Result<T, ParseError>;

/// Errors raised while talking to the host-language server subprocess.
///
/// Providers treat every variant identically: log it, and fall back to a
/// DSL-only answer (or an empty result if none is available). The core
/// never panics or surfaces these to the LSP client directly.
#[derive(Debug, Error)]
pub enum HostProxyError {
    /// The host-language server executable could not be located on `PATH`.
    #[error("host-language server executable not found on PATH: {0}")]
    ServerNotFound(String),

    /// Spawning or communicating with the subprocess failed at the OS level.
    #[error("host-language server I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The subprocess's reply could not be parsed as JSON-RPC.
    #[error("malformed message from host-language server: {0}")]
    MalformedMessage(String),

    /// The host-language server returned a JSON-RPC error object.
    #[error("host-language server returned an error ({code}): {message}")]
    ServerError {
        /// JSON-RPC error code.
        code: i64,
        /// JSON-RPC error message.
        message: String,
    },

    /// The request's completion channel was dropped because the proxy was
    /// shut down before a response arrived.
    #[error("request cancelled: host-language proxy is shutting down")]
    Cancelled,
}

/// Errors encountered while walking the workspace for file discovery or
/// indexing. Always logged and skipped; never abort indexing of the rest
/// of the workspace.
#[derive(Debug, Error)]
#[error("workspace I/O error at {path}: {source}")]
pub struct WorkspaceIoError {
    /// The path that could not be read.
    pub path: String,
    /// The underlying I/O failure.
    #[source]
    pub source: std::io::Error,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_budget_defaults() {
        let budget = ParseBudget::default();
        assert_eq!(budget.max_errors, 200);
        assert_eq!(budget.max_depth, 256);
    }

    #[test]
    fn parse_budget_strict_is_tighter_than_default() {
        let strict = ParseBudget::strict();
        let default = ParseBudget::default();
        assert!(strict.max_errors < default.max_errors);
        assert!(strict.max_depth < default.max_depth);
    }

    #[test]
    fn budget_tracker_errors_exhausted() {
        let budget = ParseBudget { max_errors: 3, ..Default::default() };
        let mut tracker = BudgetTracker::new();

        assert!(!tracker.errors_exhausted(&budget));
        tracker.record_error();
        tracker.record_error();
        assert!(!tracker.errors_exhausted(&budget));
        tracker.record_error();
        assert!(tracker.errors_exhausted(&budget));
    }

    #[test]
    fn budget_tracker_depth_tracking() {
        let budget = ParseBudget { max_depth: 2, ..Default::default() };
        let mut tracker = BudgetTracker::new();

        tracker.enter_depth();
        assert!(!tracker.depth_would_exceed(&budget));
        tracker.enter_depth();
        assert!(tracker.depth_would_exceed(&budget));
        tracker.exit_depth();
        assert!(!tracker.depth_would_exceed(&budget));
        assert_eq!(tracker.max_depth_reached, 2);
    }

    #[test]
    fn begin_recovery_checks_budget_first() {
        let budget = ParseBudget { max_recoveries: 0, ..Default::default() };
        let mut tracker = BudgetTracker::new();

        assert!(!tracker.begin_recovery(&budget));
        assert_eq!(tracker.recoveries_attempted, 0);
    }

    #[test]
    fn estimated_width_prefers_end_position() {
        let err = ParseError::new(DslPosition::new(1, 5), "unexpected token")
            .with_end(DslPosition::new(1, 8));
        assert_eq!(err.estimated_width(), 3);
    }

    #[test]
    fn estimated_width_prefers_quoted_substring() {
        let err = ParseError::new(DslPosition::new(1, 1), "expected `}`, found `<`");
        assert_eq!(err.estimated_width(), 1);
    }

    #[test]
    fn estimated_width_falls_back_to_last_word() {
        let err = ParseError::new(DslPosition::new(1, 1), "unexpected end of input");
        assert_eq!(err.estimated_width(), "input".len());
    }

    #[test]
    fn estimated_width_never_zero() {
        let err = ParseError::new(DslPosition::new(1, 1), "");
        assert_eq!(err.estimated_width(), 1);
    }

    #[test]
    fn parse_error_with_hint_roundtrips() {
        let err = ParseError::new(DslPosition::new(2, 1), "unclosed element")
            .with_hint("insert `</div>`");
        assert_eq!(err.hint.as_deref(), Some("insert `</div>`"));
    }
}
