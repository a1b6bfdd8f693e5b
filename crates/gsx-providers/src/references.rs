//! Find-references provider (§4.H "References").
//!
//! Components and host functions are workspace-wide: every open document
//! plus every closed one the [`AstCache`] remembers gets a word-boundary
//! text scan. Everything else a cursor can land on — parameters, `@let`
//! bindings, loop variables, refs, state variables — is scoped to the
//! enclosing component's own subtree, since none of those names can be
//! referenced from anywhere else.

use gsx_ast::{ChildNode, File};
use gsx_cursor::{CursorContext, NodeKind};
use gsx_position::WireLocation;
use gsx_workspace::{AstCache, DocumentStore};
use lsp_types::Location;

use crate::text_source::resolve_text;

/// Answers a `textDocument/references` request.
pub fn references(
    ctx: &CursorContext,
    source: &str,
    file: &File,
    documents: &DocumentStore,
    ast_cache: &AstCache,
    include_declaration: bool,
) -> Vec<Location> {
    if ctx.word.is_empty() {
        return Vec::new();
    }

    let locations = match ctx.kind {
        NodeKind::Component | NodeKind::ComponentCall | NodeKind::HostFunction => {
            workspace_references(&ctx.word, documents, ast_cache)
        }
        NodeKind::Parameter | NodeKind::LetBinding | NodeKind::RefAttr | NodeKind::StateDecl | NodeKind::StateAccess => {
            local_references(ctx, source, file)
        }
        _ if ctx.scope.binds(&ctx.word) => local_references(ctx, source, file),
        _ => Vec::new(),
    };

    if include_declaration {
        locations
    } else {
        let cursor: lsp_types::Position = ctx.position.into();
        locations.into_iter().filter(|loc| loc.range.start != cursor).collect()
    }
}

fn workspace_references(word: &str, documents: &DocumentStore, ast_cache: &AstCache) -> Vec<Location> {
    let mut uris = documents.all_uris();
    for uri in ast_cache.all_uris() {
        if !uris.contains(&uri) {
            uris.push(uri);
        }
    }

    let mut locations = Vec::new();
    for uri in uris {
        let Some(text) = resolve_text(documents, &uri) else { continue };
        locations.extend(occurrences_as_locations(&uri, &text, word));
    }
    locations
}

fn local_references(ctx: &CursorContext, source: &str, file: &File) -> Vec<Location> {
    let Some(component_name) = &ctx.scope.component else {
        return occurrences_as_locations(&ctx.uri, source, &ctx.word);
    };
    let Some(component) = file.find_component(component_name) else {
        return Vec::new();
    };
    let span = component.span;
    let Some(body) = span.try_slice(source) else {
        return Vec::new();
    };

    find_word_occurrences(body, &ctx.word)
        .into_iter()
        .map(|relative_start| {
            let start = span.start + relative_start;
            let end = start + ctx.word.len();
            WireLocation::new(ctx.uri.clone(), gsx_position::WireRange::from_byte_offsets(source, start, end)).into()
        })
        .collect()
}

fn occurrences_as_locations(uri: &str, text: &str, word: &str) -> Vec<Location> {
    find_word_occurrences(text, word)
        .into_iter()
        .map(|start| {
            let end = start + word.len();
            WireLocation::new(uri.to_string(), gsx_position::WireRange::from_byte_offsets(text, start, end)).into()
        })
        .collect()
}

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Byte offsets of every whole-word occurrence of `word` in `text`. A
/// match only counts if neither the byte before nor the byte after is
/// itself a word character, so `count` in `"recount"` is not a hit for
/// `count`.
fn find_word_occurrences(text: &str, word: &str) -> Vec<usize> {
    if word.is_empty() {
        return Vec::new();
    }
    let bytes = text.as_bytes();
    let mut matches = Vec::new();
    let mut search_from = 0;
    while let Some(relative) = text[search_from..].find(word) {
        let start = search_from + relative;
        let end = start + word.len();
        let before_is_word = start > 0 && is_word_byte(bytes[start - 1]);
        let after_is_word = end < bytes.len() && is_word_byte(bytes[end]);
        if !before_is_word && !after_is_word {
            matches.push(start);
        }
        search_from = start + 1;
    }
    matches
}

#[cfg(test)]
mod tests {
    use super::*;
    use gsx_position::WirePosition;

    #[test]
    fn word_boundary_scan_skips_substring_matches() {
        let text = "count := tui.NewState(0)\nrecount := count\n";
        let hits = find_word_occurrences(text, "count");
        assert_eq!(hits.len(), 2);
        for hit in hits {
            assert_eq!(&text[hit..hit + 5], "count");
        }
    }

    #[test]
    fn component_references_scan_every_open_document() {
        let a = "package p\n\ntempl Inner() { <span/> }\n";
        let b = "package p\n\ntempl Outer() { @Inner() }\n";

        let documents = DocumentStore::new();
        documents.open("file:///a.gsx".to_string(), 1, a.to_string());
        documents.open("file:///b.gsx".to_string(), 1, b.to_string());

        let file = gsx_parser::parse(a).file;
        let byte = a.find("Inner").unwrap();
        let pos = WirePosition::from_byte_offset(a, byte);
        let ctx = gsx_cursor::resolve(&file, a, "file:///a.gsx", pos);

        let ast_cache = AstCache::new();
        let locations = references(&ctx, a, &file, &documents, &ast_cache, true);
        assert!(locations.iter().any(|l| l.uri.as_str() == "file:///b.gsx"));
    }

    use proptest::prelude::*;

    proptest! {
        /// Property 4: for any identifier `v` and any source containing
        /// `vv` or a non-empty-prefixed `xv`, neither occurrence's start
        /// offset is reported as a match for `v`.
        #[test]
        fn word_boundary_scan_never_matches_a_strict_substring(
            v in "[a-zA-Z_][a-zA-Z0-9_]{0,8}",
            prefix in "[a-zA-Z0-9_]{1,4}",
        ) {
            let doubled = format!("{v}{v}");
            let prefixed = format!("{prefix}{v}");
            let text = format!("{doubled} {prefixed}\n");

            let hits = find_word_occurrences(&text, &v);

            // Every reported hit must be a genuine word-boundary match.
            for hit in &hits {
                let before_is_word = *hit > 0 && is_word_byte(text.as_bytes()[*hit - 1]);
                let after = hit + v.len();
                let after_is_word = after < text.len() && is_word_byte(text.as_bytes()[after]);
                prop_assert!(!before_is_word && !after_is_word);
            }

            // `vv`'s second half and `xv`'s suffix are not whole-word hits.
            prop_assert!(!hits.contains(&v.len()));
            prop_assert!(!hits.contains(&(doubled.len() + 1 + prefix.len())));
        }
    }

    #[test]
    fn state_variable_references_are_scoped_to_its_component() {
        let source = "package p\n\ntempl A() {\n\tcount := tui.NewState(0)\n\t<span>{count.Get()}</span>\n}\n\ntempl B() {\n\tcount := tui.NewState(1)\n}\n";
        let file = gsx_parser::parse(source).file;
        let byte = source.find("count.Get").unwrap();
        let pos = WirePosition::from_byte_offset(source, byte);
        let ctx = gsx_cursor::resolve(&file, source, "file:///a.gsx", pos);

        let documents = DocumentStore::new();
        documents.open("file:///a.gsx".to_string(), 1, source.to_string());
        let ast_cache = AstCache::new();
        let locations = references(&ctx, source, &file, &documents, &ast_cache, true);

        assert_eq!(locations.len(), 2);
    }
}
