//! LSP method name constants used by the GSX language server.
//!
//! The server's capability surface is intentionally small and fixed: it
//! speaks full-document sync (no incremental edits) plus the handful of
//! language features the request router implements. Constants are grouped
//! by functional area and centralize every method string used by dispatch,
//! capability registration, and logging.

// ============================================================================
// Lifecycle
// ============================================================================

/// Initialize request - first request from client to server.
pub const INITIALIZE: &str = "initialize";

/// Initialized notification - sent after the initialize response.
pub const INITIALIZED: &str = "initialized";

/// Shutdown request - graceful server shutdown.
pub const SHUTDOWN: &str = "shutdown";

/// Exit notification - terminate server process.
pub const EXIT: &str = "exit";

// ============================================================================
// Text Document Synchronization
// ============================================================================

/// Document opened notification.
pub const TEXT_DOCUMENT_DID_OPEN: &str = "textDocument/didOpen";

/// Document changed notification. The server advertises full-document sync,
/// so every change carries the complete new text.
pub const TEXT_DOCUMENT_DID_CHANGE: &str = "textDocument/didChange";

/// Document closed notification.
pub const TEXT_DOCUMENT_DID_CLOSE: &str = "textDocument/didClose";

/// Document saved notification.
pub const TEXT_DOCUMENT_DID_SAVE: &str = "textDocument/didSave";

/// Publish diagnostics notification (server to client).
pub const TEXT_DOCUMENT_PUBLISH_DIAGNOSTICS: &str = "textDocument/publishDiagnostics";

// ============================================================================
// Language Features
// ============================================================================

/// Code completion request.
pub const TEXT_DOCUMENT_COMPLETION: &str = "textDocument/completion";

/// Hover information request.
pub const TEXT_DOCUMENT_HOVER: &str = "textDocument/hover";

/// Go to definition request.
pub const TEXT_DOCUMENT_DEFINITION: &str = "textDocument/definition";

/// Find references request.
pub const TEXT_DOCUMENT_REFERENCES: &str = "textDocument/references";

/// Document symbols request.
pub const TEXT_DOCUMENT_DOCUMENT_SYMBOL: &str = "textDocument/documentSymbol";

/// Document formatting request.
pub const TEXT_DOCUMENT_FORMATTING: &str = "textDocument/formatting";

/// Semantic tokens full document request.
pub const TEXT_DOCUMENT_SEMANTIC_TOKENS_FULL: &str = "textDocument/semanticTokens/full";

// ============================================================================
// Workspace Features
// ============================================================================

/// Workspace symbols request.
pub const WORKSPACE_SYMBOL: &str = "workspace/symbol";

/// Configuration changed notification.
pub const WORKSPACE_DID_CHANGE_CONFIGURATION: &str = "workspace/didChangeConfiguration";

/// Watched files changed notification.
pub const WORKSPACE_DID_CHANGE_WATCHED_FILES: &str = "workspace/didChangeWatchedFiles";

// ============================================================================
// Window Features
// ============================================================================

/// Show message notification (server to client).
pub const WINDOW_SHOW_MESSAGE: &str = "window/showMessage";

/// Log message notification (server to client).
pub const WINDOW_LOG_MESSAGE: &str = "window/logMessage";

// ============================================================================
// Special Methods
// ============================================================================

/// Cancel request notification.
pub const CANCEL_REQUEST: &str = "$/cancelRequest";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifecycle_methods() {
        assert_eq!(INITIALIZE, "initialize");
        assert_eq!(INITIALIZED, "initialized");
        assert_eq!(SHUTDOWN, "shutdown");
        assert_eq!(EXIT, "exit");
    }

    #[test]
    fn text_document_methods() {
        assert_eq!(TEXT_DOCUMENT_HOVER, "textDocument/hover");
        assert_eq!(TEXT_DOCUMENT_COMPLETION, "textDocument/completion");
        assert_eq!(TEXT_DOCUMENT_DEFINITION, "textDocument/definition");
        assert_eq!(TEXT_DOCUMENT_REFERENCES, "textDocument/references");
        assert_eq!(TEXT_DOCUMENT_SEMANTIC_TOKENS_FULL, "textDocument/semanticTokens/full");
    }

    #[test]
    fn workspace_methods() {
        assert_eq!(WORKSPACE_SYMBOL, "workspace/symbol");
        assert_eq!(WORKSPACE_DID_CHANGE_CONFIGURATION, "workspace/didChangeConfiguration");
    }

    #[test]
    fn special_methods() {
        assert_eq!(CANCEL_REQUEST, "$/cancelRequest");
    }

    #[test]
    fn constants_are_unique() {
        let all_methods = [
            INITIALIZE,
            INITIALIZED,
            SHUTDOWN,
            EXIT,
            TEXT_DOCUMENT_DID_OPEN,
            TEXT_DOCUMENT_DID_CHANGE,
            TEXT_DOCUMENT_DID_CLOSE,
            TEXT_DOCUMENT_DID_SAVE,
            TEXT_DOCUMENT_PUBLISH_DIAGNOSTICS,
            TEXT_DOCUMENT_COMPLETION,
            TEXT_DOCUMENT_HOVER,
            TEXT_DOCUMENT_DEFINITION,
            TEXT_DOCUMENT_REFERENCES,
            TEXT_DOCUMENT_DOCUMENT_SYMBOL,
            TEXT_DOCUMENT_FORMATTING,
            TEXT_DOCUMENT_SEMANTIC_TOKENS_FULL,
            WORKSPACE_SYMBOL,
            WORKSPACE_DID_CHANGE_CONFIGURATION,
            WORKSPACE_DID_CHANGE_WATCHED_FILES,
            WINDOW_SHOW_MESSAGE,
            WINDOW_LOG_MESSAGE,
            CANCEL_REQUEST,
        ];
        for (i, a) in all_methods.iter().enumerate() {
            for (j, b) in all_methods.iter().enumerate() {
                if i != j {
                    assert_ne!(a, b, "duplicate method constant: {a}");
                }
            }
        }
    }
}
