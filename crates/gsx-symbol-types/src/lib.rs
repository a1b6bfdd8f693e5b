//! Unified GSX symbol taxonomy for LSP tooling.
//!
//! This crate provides a single, authoritative definition of the symbol
//! kinds the symbol index (§4.C) tracks, shared by the parser, the symbol
//! index, and the providers that answer definition/references/document-symbol
//! requests.

use serde::{Deserialize, Serialize};

/// Classification of a symbol-index entry (§3 "Symbol index entry").
///
/// GSX has exactly four kinds of indexable declarations: components and
/// host functions at the top level, and the parameters each declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SymbolKind {
    /// A `templ Name(...) { ... }` component definition.
    Component,
    /// A plain host function declared at the top level of a file.
    Function,
    /// A parameter of a component, keyed as `componentName.paramName`.
    ComponentParameter,
    /// A parameter of a host function, keyed as `funcName.paramName`.
    FunctionParameter,
}

impl SymbolKind {
    /// Convert to an LSP `SymbolKind` number for `textDocument/documentSymbol`
    /// and `workspace/symbol` responses.
    ///
    /// Components map to `Function` (12) since they are invoked like
    /// functions (`@Name(...)`) even though they render markup; host
    /// functions map to `Function` as well; parameters map to `Variable`
    /// (13), the closest LSP concept to a named binding.
    #[inline]
    pub const fn to_lsp_kind(self) -> u32 {
        match self {
            SymbolKind::Component => 12,
            SymbolKind::Function => 12,
            SymbolKind::ComponentParameter => 13,
            SymbolKind::FunctionParameter => 13,
        }
    }

    /// True for the two top-level declaration kinds (as opposed to their
    /// parameters).
    #[inline]
    pub const fn is_top_level(self) -> bool {
        matches!(self, SymbolKind::Component | SymbolKind::Function)
    }

    /// True for the two parameter kinds.
    #[inline]
    pub const fn is_parameter(self) -> bool {
        matches!(self, SymbolKind::ComponentParameter | SymbolKind::FunctionParameter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lsp_kind_mapping() {
        assert_eq!(SymbolKind::Component.to_lsp_kind(), 12);
        assert_eq!(SymbolKind::Function.to_lsp_kind(), 12);
        assert_eq!(SymbolKind::ComponentParameter.to_lsp_kind(), 13);
        assert_eq!(SymbolKind::FunctionParameter.to_lsp_kind(), 13);
    }

    #[test]
    fn category_predicates() {
        assert!(SymbolKind::Component.is_top_level());
        assert!(SymbolKind::Function.is_top_level());
        assert!(!SymbolKind::ComponentParameter.is_top_level());

        assert!(SymbolKind::ComponentParameter.is_parameter());
        assert!(SymbolKind::FunctionParameter.is_parameter());
        assert!(!SymbolKind::Component.is_parameter());
    }
}
