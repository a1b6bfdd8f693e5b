//! Completion provider (§4.H "Completion").
//!
//! Precedence, highest first: an attribute's class list (utility-class
//! completions), a state-variable method call (the fixed `tui.NewState`
//! accessor set), any other host expression (delegated to the host
//! proxy), then the trigger character that brought up completion at all.

use gsx_cursor::{CursorContext, StateVar};
use gsx_host_proxy::{dsl_position_at, HostProxy, VirtualFile};
use lsp_types::{CompletionItem, CompletionItemKind, CompletionResponse};

/// The fixed method set exposed by every `tui.NewState`-declared variable.
const STATE_METHODS: &[(&str, &str)] =
    &[("Get", "Get()"), ("Set", "Set(value)"), ("Update", "Update(fn)"), ("Bind", "Bind(fn)"), ("Batch", "Batch(fn)")];

/// Answers a `textDocument/completion` request.
///
/// `trigger` is the character the client reports as having invoked
/// completion (`context.triggerCharacter` in the request), used only for
/// the final default-dispatch branch — the earlier branches are
/// determined purely from the resolved cursor context.
pub fn completion(
    ctx: &CursorContext,
    source: &str,
    trigger: Option<char>,
    symbols: &gsx_symbol_index::SymbolIndex,
    host: Option<&HostProxy>,
    virtual_file: Option<&VirtualFile>,
) -> Option<CompletionResponse> {
    if ctx.in_class_attr {
        let items = gsx_schema::utility_classes::classes_with_prefix(&ctx.word)
            .into_iter()
            .map(|(name, def)| class_item(name, def.description))
            .collect();
        return Some(CompletionResponse::Array(items));
    }

    if ctx.in_host_expr {
        if let Some(receiver) = state_method_receiver(source, ctx.byte_offset, &ctx.scope.state_vars) {
            let items = STATE_METHODS.iter().map(|(name, snippet)| state_method_item(name, snippet, receiver)).collect();
            return Some(CompletionResponse::Array(items));
        }
        return delegate_to_host(ctx, source, host, virtual_file);
    }

    match trigger {
        Some('@') => Some(CompletionResponse::Array(component_and_keyword_items(symbols))),
        Some('<') => Some(CompletionResponse::Array(element_items())),
        Some('{') => delegate_to_host(ctx, source, host, virtual_file),
        _ => Some(CompletionResponse::Array(attribute_items(ctx.attr_tag.as_deref()))),
    }
}

fn state_method_receiver<'a>(source: &str, byte_offset: usize, state_vars: &'a [StateVar]) -> Option<&'a str> {
    let line_start = source[..byte_offset].rfind('\n').map(|i| i + 1).unwrap_or(0);
    let prefix = &source[line_start..byte_offset];
    let before_dot = prefix.strip_suffix('.')?;
    let ident_start = before_dot.rfind(|c: char| !(c.is_alphanumeric() || c == '_')).map(|i| i + 1).unwrap_or(0);
    let ident = &before_dot[ident_start..];
    state_vars.iter().find(|s| s.name == ident).map(|s| s.name.as_str())
}

fn class_item(name: &str, description: &str) -> CompletionItem {
    CompletionItem { label: name.to_string(), kind: Some(CompletionItemKind::VALUE), detail: Some(description.to_string()), ..Default::default() }
}

fn state_method_item(name: &str, snippet: &str, receiver: &str) -> CompletionItem {
    CompletionItem {
        label: snippet.to_string(),
        kind: Some(CompletionItemKind::METHOD),
        detail: Some(format!("{receiver}.{snippet}")),
        insert_text: Some(name.to_string()),
        ..Default::default()
    }
}

fn component_and_keyword_items(symbols: &gsx_symbol_index::SymbolIndex) -> Vec<CompletionItem> {
    let mut items: Vec<CompletionItem> = symbols
        .all_components()
        .map(|info| CompletionItem { label: info.name.clone(), kind: Some(CompletionItemKind::FUNCTION), detail: Some(info.signature.clone()), ..Default::default() })
        .collect();
    for (name, def) in gsx_schema::keywords::keywords() {
        items.push(CompletionItem { label: (*name).to_string(), kind: Some(CompletionItemKind::KEYWORD), detail: Some(def.description.to_string()), ..Default::default() });
    }
    items
}

fn element_items() -> Vec<CompletionItem> {
    gsx_schema::elements::elements()
        .iter()
        .map(|(name, def)| CompletionItem { label: (*name).to_string(), kind: Some(CompletionItemKind::CLASS), detail: Some(def.description.to_string()), ..Default::default() })
        .collect()
}

fn attribute_items(tag: Option<&str>) -> Vec<CompletionItem> {
    let attribute_table = gsx_schema::attributes::attributes();
    let mut names: Vec<&str> = gsx_schema::elements::GLOBAL_ATTRIBUTES.to_vec();
    if let Some(def) = tag.and_then(gsx_schema::elements::lookup) {
        names.extend(def.attributes.iter().copied());
    }
    names.sort_unstable();
    names.dedup();

    names
        .into_iter()
        .map(|name| CompletionItem {
            label: name.to_string(),
            kind: Some(CompletionItemKind::PROPERTY),
            detail: attribute_table.get(name).map(|def| def.description.to_string()),
            ..Default::default()
        })
        .collect()
}

fn delegate_to_host(ctx: &CursorContext, source: &str, host: Option<&HostProxy>, virtual_file: Option<&VirtualFile>) -> Option<CompletionResponse> {
    let host = host?;
    let virtual_file = virtual_file?;
    let dsl_pos = dsl_position_at(source, ctx.byte_offset);
    let (gen_line, gen_col, found) = virtual_file.source_map.dsl_to_gen(dsl_pos.line, dsl_pos.column);
    if !found {
        return None;
    }
    host.completion(&virtual_file.uri, gen_line.saturating_sub(1), gen_col.saturating_sub(1)).ok().flatten()
}

#[cfg(test)]
mod tests {
    use super::*;
    use gsx_position::WirePosition;
    use gsx_symbol_index::SymbolIndex;

    #[test]
    fn class_attribute_prefix_filters_utility_classes() {
        let source = "package p\n\ntempl Hi() { <div class=\"fle\"></div> }\n";
        let file = gsx_parser::parse(source).file;
        let byte = source.find("fle").unwrap() + 2;
        let pos = WirePosition::from_byte_offset(source, byte);
        let ctx = gsx_cursor::resolve(&file, source, "file:///a.gsx", pos);

        let symbols = SymbolIndex::new();
        let response = completion(&ctx, source, None, &symbols, None, None).expect("response");
        let CompletionResponse::Array(items) = response else { panic!("expected array") };
        assert!(items.iter().any(|item| item.label.starts_with("flex")));
    }

    #[test]
    fn state_variable_dot_offers_fixed_method_set() {
        let source = "package p\n\ntempl Counter() {\n\tcount := tui.NewState(0)\n\t<span>{count.}</span>\n}\n";
        let file = gsx_parser::parse(source).file;
        let byte = source.find("count.}").unwrap() + "count.".len();
        let pos = WirePosition::from_byte_offset(source, byte);
        let ctx = gsx_cursor::resolve(&file, source, "file:///a.gsx", pos);

        let symbols = SymbolIndex::new();
        let response = completion(&ctx, source, None, &symbols, None, None).expect("response");
        let CompletionResponse::Array(items) = response else { panic!("expected array") };
        assert!(items.iter().any(|item| item.insert_text.as_deref() == Some("Get")));
    }

    #[test]
    fn at_trigger_offers_components_and_keywords() {
        let source = "package p\n\ntempl Hi() { <span/> }\n\ntempl Other() { @ }\n";
        let file = gsx_parser::parse(source).file;
        let mut symbols = SymbolIndex::new();
        symbols.index_document("file:///a.gsx", &file);

        let byte = source.rfind('@').unwrap() + 1;
        let pos = WirePosition::from_byte_offset(source, byte);
        let ctx = gsx_cursor::resolve(&file, source, "file:///a.gsx", pos);

        let response = completion(&ctx, source, Some('@'), &symbols, None, None).expect("response");
        let CompletionResponse::Array(items) = response else { panic!("expected array") };
        assert!(items.iter().any(|item| item.label == "Hi"));
        assert!(items.iter().any(|item| item.label == "templ"));
    }
}
