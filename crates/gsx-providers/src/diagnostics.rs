//! Parse-error-to-diagnostic conversion (§4.H "Diagnostics").
//!
//! The router pushes `textDocument/publishDiagnostics` after every
//! document mutation; this module supplies the pure conversion from a
//! [`gsx_error::ParseError`] to an [`lsp_types::Diagnostic`]. Host-proxy
//! diagnostics arrive already translated to DSL coordinates (see
//! `gsx_host_proxy::proxy`) and are merged in by the router, which simply
//! appends them to what this module produces.

use gsx_error::ParseError;
use lsp_types::{Diagnostic, DiagnosticSeverity, Position, Range};

/// The `source` field GSX attaches to every diagnostic it originates
/// itself, distinguishing them from ones forwarded from the host-language
/// server.
pub const DIAGNOSTIC_SOURCE: &str = "gsx";

/// Converts one parse error to a diagnostic.
///
/// The range starts at `(line - 1, col - 1)` (LSP positions are
/// 0-indexed; DSL positions are 1-indexed) and ends at the error's
/// estimated width when the parser didn't record an explicit end.
pub fn parse_error_to_diagnostic(error: &ParseError) -> Diagnostic {
    let start = Position { line: error.position.line.saturating_sub(1), character: error.position.column.saturating_sub(1) };
    let end = match error.end_position {
        Some(end) => Position { line: end.line.saturating_sub(1), character: end.column.saturating_sub(1) },
        None => Position { line: start.line, character: start.character + error.estimated_width() as u32 },
    };

    Diagnostic {
        range: Range { start, end },
        severity: Some(DiagnosticSeverity::ERROR),
        code: None,
        code_description: None,
        source: Some(DIAGNOSTIC_SOURCE.to_string()),
        message: match &error.hint {
            Some(hint) => format!("{} ({hint})", error.message),
            None => error.message.clone(),
        },
        related_information: None,
        tags: None,
        data: None,
    }
}

/// Converts every parse error in `errors` to a diagnostic, in order.
pub fn diagnostics_for_parse_errors(errors: &[ParseError]) -> Vec<Diagnostic> {
    errors.iter().map(parse_error_to_diagnostic).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use gsx_position::DslPosition;

    #[test]
    fn explicit_end_position_translates_to_zero_indexed_range() {
        let error = ParseError::new(DslPosition::new(3, 5), "unexpected token").with_end(DslPosition::new(3, 9));
        let diagnostic = parse_error_to_diagnostic(&error);

        assert_eq!(diagnostic.range.start, Position { line: 2, character: 4 });
        assert_eq!(diagnostic.range.end, Position { line: 2, character: 8 });
        assert_eq!(diagnostic.source.as_deref(), Some("gsx"));
        assert_eq!(diagnostic.severity, Some(DiagnosticSeverity::ERROR));
    }

    #[test]
    fn missing_end_position_falls_back_to_estimated_width() {
        let error = ParseError::new(DslPosition::new(1, 1), "unexpected `}`");
        let diagnostic = parse_error_to_diagnostic(&error);

        assert_eq!(diagnostic.range.start, Position { line: 0, character: 0 });
        assert_eq!(diagnostic.range.end.character, 1);
    }

    #[test]
    fn hint_is_appended_to_the_message() {
        let error = ParseError::new(DslPosition::new(1, 1), "missing closing brace").with_hint("insert `}`");
        let diagnostic = parse_error_to_diagnostic(&error);
        assert!(diagnostic.message.contains("insert `}`"));
    }
}
