//! Hover provider (§4.H "Hover").
//!
//! Dispatches on [`NodeKind`]: schema-backed constructs (elements,
//! attributes, keywords, utility classes, event handlers) render from the
//! static tables in `gsx-schema`; DSL-level constructs (components,
//! functions, parameters, refs, state declarations) render from the
//! symbol index or the resolved scope; everything that is really
//! host-language code is delegated to the host proxy, with its markdown
//! passed through unchanged.

use gsx_cursor::{CursorContext, NodeKind, RefKind};
use gsx_host_proxy::{dsl_position_at, HostProxy, VirtualFile};
use gsx_position::WireRange;
use gsx_symbol_index::SymbolIndex;
use lsp_types::{Hover, HoverContents, MarkupContent, MarkupKind};

/// Answers a `textDocument/hover` request at the already-resolved cursor
/// context.
pub fn hover(ctx: &CursorContext, source: &str, symbols: &SymbolIndex, host: Option<&HostProxy>, virtual_file: Option<&VirtualFile>) -> Option<Hover> {
    let markdown = match ctx.kind {
        NodeKind::Element => gsx_schema::elements::lookup(&ctx.word).map(|def| format!("**`<{}>`**\n\n{}", ctx.word, def.description)),
        NodeKind::EventHandler => Some(format!("**`{}`** — event handler", ctx.attr_name.as_deref().unwrap_or(&ctx.word))),
        NodeKind::Attribute => gsx_schema::attributes::lookup(ctx.attr_name.as_deref().unwrap_or(&ctx.word))
            .map(|def| format!("**`{}`**\n\n{}", ctx.attr_name.as_deref().unwrap_or(&ctx.word), def.description)),
        NodeKind::Keyword => gsx_schema::keywords::lookup(&ctx.word).map(|def| format!("**`{}`**\n\n{}\n\n```\n{}\n```", ctx.word, def.description, def.example)),
        NodeKind::UtilityClass => gsx_schema::utility_classes::lookup(&ctx.word).map(|def| format!("**`{}`** ({})\n\n{}", ctx.word, def.family, def.description)),
        NodeKind::Component => symbols.lookup_component(&ctx.word).map(|info| format!("```go\n{}\n```", info.signature)),
        NodeKind::HostFunction => symbols.lookup_function(&ctx.word).map(|info| format!("```go\n{}\n```", info.signature)),
        NodeKind::Parameter => hover_for_parameter(ctx, symbols),
        NodeKind::RefAttr => hover_for_ref(ctx),
        NodeKind::StateDecl => hover_for_state_decl(ctx),
        NodeKind::HostExpression | NodeKind::StateAccess => return hover_from_host(ctx, source, host, virtual_file),
        _ => None,
    }?;

    Some(Hover {
        contents: HoverContents::Markup(MarkupContent { kind: MarkupKind::Markdown, value: markdown }),
        range: ctx.node_span.map(|span| WireRange::from_byte_offsets(source, span.start, span.end).into()),
    })
}

fn hover_for_parameter(ctx: &CursorContext, symbols: &SymbolIndex) -> Option<String> {
    if let Some(component) = &ctx.scope.component {
        if let Some(info) = symbols.lookup_component_param(component, &ctx.word) {
            return Some(format!("**`{}`** parameter of `{component}`\n\n```go\n{}\n```", ctx.word, info.signature));
        }
    }
    if let Some(function) = &ctx.scope.function {
        if let Some((info, _owner)) = symbols.lookup_function_param(function, &ctx.word) {
            return Some(format!("**`{}`** parameter of `{function}`\n\n```go\n{}\n```", ctx.word, info.signature));
        }
    }
    ctx.scope.params.iter().find(|p| p.name == ctx.word).map(|p| format!("**`{}`** `{}`", p.name, p.type_text))
}

fn hover_for_ref(ctx: &CursorContext) -> Option<String> {
    let ref_info = ctx
        .scope
        .refs
        .iter()
        .find(|r| ctx.node_span == Some(r.span))
        .or_else(|| ctx.scope.refs.iter().find(|r| r.name == ctx.word))?;
    let kind = match ref_info.kind {
        RefKind::Single => "single-element ref",
        RefKind::List => "list ref (one handle per loop iteration)",
        RefKind::Map => "keyed ref (`ref_key`)",
    };
    Some(format!("**`{}`** — {kind}", ref_info.name))
}

fn hover_for_state_decl(ctx: &CursorContext) -> Option<String> {
    let state_var = ctx.scope.state_vars.iter().find(|s| ctx.node_span == Some(s.span)).or_else(|| ctx.scope.state_vars.first())?;
    Some(format!("**`{}`** — state variable, initialized to `{}`", state_var.name, state_var.init_expr))
}

fn hover_from_host(ctx: &CursorContext, source: &str, host: Option<&HostProxy>, virtual_file: Option<&VirtualFile>) -> Option<Hover> {
    let host = host?;
    let virtual_file = virtual_file?;
    let dsl_pos = dsl_position_at(source, ctx.byte_offset);
    let (gen_line, gen_col, found) = virtual_file.source_map.dsl_to_gen(dsl_pos.line, dsl_pos.column);
    if !found {
        return None;
    }
    host.hover(&virtual_file.uri, gen_line.saturating_sub(1), gen_col.saturating_sub(1)).ok().flatten()
}

#[cfg(test)]
mod tests {
    use super::*;
    use gsx_position::WirePosition;

    fn resolve(source: &str, line: u32, col: u32) -> (gsx_ast::File, CursorContext) {
        let file = gsx_parser::parse(source).file;
        let ctx = gsx_cursor::resolve(&file, source, "file:///a.gsx", WirePosition::new(line, col));
        (file, ctx)
    }

    #[test]
    fn element_hover_renders_schema_description() {
        let source = "package p\n\ntempl Hi() { <div>hi</div> }\n";
        let (_file, ctx) = resolve(source, 2, 15);
        let symbols = SymbolIndex::new();
        let hover = hover(&ctx, source, &symbols, None, None).expect("hover");
        let HoverContents::Markup(markup) = hover.contents else { panic!("expected markup") };
        assert!(markup.value.contains("div"));
    }

    #[test]
    fn component_hover_uses_indexed_signature() {
        let source = "package p\n\ntempl Greeter(name string) { <span>{name}</span> }\n";
        let file = gsx_parser::parse(source).file;
        let mut symbols = SymbolIndex::new();
        symbols.index_document("file:///a.gsx", &file);

        let ctx = gsx_cursor::resolve(&file, source, "file:///a.gsx", WirePosition::new(2, 8));
        let hover = hover(&ctx, source, &symbols, None, None).expect("hover");
        let HoverContents::Markup(markup) = hover.contents else { panic!("expected markup") };
        assert!(markup.value.contains("Greeter"));
    }
}
