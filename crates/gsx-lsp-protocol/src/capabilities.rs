//! Server capability construction for the GSX language server.
//!
//! Unlike a general-purpose language server, the GSX server's capability
//! surface is small and fixed rather than build-flag-gated: every feature
//! named here is implemented, and nothing else is advertised.

use lsp_types::*;

/// The semantic token types emitted by the semantic tokens provider, in the
/// exact order their indices are encoded in the delta-encoded token stream.
/// The legend advertised in [`server_capabilities`] MUST list these in the
/// same order.
pub const SEMANTIC_TOKEN_TYPES: &[SemanticTokenType] = &[
    SemanticTokenType::KEYWORD,
    SemanticTokenType::NAMESPACE,
    SemanticTokenType::CLASS,
    SemanticTokenType::FUNCTION,
    SemanticTokenType::DECORATOR,
    SemanticTokenType::PARAMETER,
    SemanticTokenType::VARIABLE,
    SemanticTokenType::STRING,
    SemanticTokenType::REGEXP,
    SemanticTokenType::NUMBER,
    SemanticTokenType::COMMENT,
];

/// The semantic token modifiers emitted by the provider. Only `readonly` is
/// used, for the declaration of a state variable matched by the state regex.
pub const SEMANTIC_TOKEN_MODIFIERS: &[SemanticTokenModifier] =
    &[SemanticTokenModifier::READONLY];

/// Characters that trigger `textDocument/completion` without an explicit
/// invocation: `@` (component calls and directives), `<` (element tags),
/// `{` (host expressions), `.` (member access within a host expression).
pub const COMPLETION_TRIGGER_CHARACTERS: &[&str] = &["@", "<", "{", "."];

fn semantic_tokens_legend() -> SemanticTokensLegend {
    SemanticTokensLegend {
        token_types: SEMANTIC_TOKEN_TYPES.to_vec(),
        token_modifiers: SEMANTIC_TOKEN_MODIFIERS.to_vec(),
    }
}

/// Build the fixed `ServerCapabilities` the GSX language server advertises
/// on `initialize`.
pub fn server_capabilities() -> ServerCapabilities {
    ServerCapabilities {
        text_document_sync: Some(TextDocumentSyncCapability::Options(TextDocumentSyncOptions {
            open_close: Some(true),
            change: Some(TextDocumentSyncKind::FULL),
            will_save: None,
            will_save_wait_until: None,
            save: Some(TextDocumentSyncSaveOptions::SaveOptions(SaveOptions {
                include_text: Some(true),
            })),
        })),
        completion_provider: Some(CompletionOptions {
            resolve_provider: Some(false),
            trigger_characters: Some(
                COMPLETION_TRIGGER_CHARACTERS.iter().map(|c| c.to_string()).collect(),
            ),
            all_commit_characters: None,
            work_done_progress_options: WorkDoneProgressOptions::default(),
            completion_item: None,
        }),
        hover_provider: Some(HoverProviderCapability::Simple(true)),
        definition_provider: Some(OneOf::Left(true)),
        references_provider: Some(OneOf::Left(true)),
        document_symbol_provider: Some(OneOf::Left(true)),
        workspace_symbol_provider: Some(OneOf::Left(true)),
        document_formatting_provider: Some(OneOf::Left(true)),
        semantic_tokens_provider: Some(
            SemanticTokensServerCapabilities::SemanticTokensOptions(SemanticTokensOptions {
                work_done_progress_options: WorkDoneProgressOptions::default(),
                legend: semantic_tokens_legend(),
                range: Some(false),
                full: Some(SemanticTokensFullOptions::Bool(true)),
            }),
        ),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advertises_exactly_the_required_features() {
        let caps = server_capabilities();
        assert!(caps.hover_provider.is_some());
        assert!(caps.definition_provider.is_some());
        assert!(caps.references_provider.is_some());
        assert!(caps.document_symbol_provider.is_some());
        assert!(caps.workspace_symbol_provider.is_some());
        assert!(caps.document_formatting_provider.is_some());
        assert!(caps.semantic_tokens_provider.is_some());
        assert!(caps.completion_provider.is_some());

        assert!(caps.rename_provider.is_none());
        assert!(caps.code_action_provider.is_none());
        assert!(caps.code_lens_provider.is_none());
        assert!(caps.call_hierarchy_provider.is_none());
        assert!(caps.folding_range_provider.is_none());
    }

    #[test]
    fn completion_triggers_match_the_four_entry_points() {
        let caps = server_capabilities();
        let triggers = caps.completion_provider.unwrap().trigger_characters.unwrap();
        assert_eq!(triggers, vec!["@", "<", "{", "."]);
    }

    #[test]
    fn full_text_sync_with_save_text() {
        let caps = server_capabilities();
        match caps.text_document_sync.unwrap() {
            TextDocumentSyncCapability::Options(opts) => {
                assert_eq!(opts.change, Some(TextDocumentSyncKind::FULL));
                assert!(matches!(
                    opts.save,
                    Some(TextDocumentSyncSaveOptions::SaveOptions(_))
                ));
            }
            _ => panic!("expected detailed sync options"),
        }
    }
}
