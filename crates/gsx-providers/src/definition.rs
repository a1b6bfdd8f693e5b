//! Definition provider (§4.H "Definition").
//!
//! DSL facts always win over the host proxy: a handful of short-circuits
//! answer from the symbol index, the resolved scope, or a text scan of
//! the enclosing component before ever asking the host-language server,
//! so jumping to a GSX-native declaration never routes through Go.

use gsx_ast::{ChildNode, File};
use gsx_cursor::{CursorContext, NodeKind};
use gsx_host_proxy::{dsl_position_at, HostProxy, VirtualFile};
use gsx_position::{WireLocation, WirePosition};
use gsx_symbol_index::SymbolIndex;
use gsx_workspace::DocumentStore;
use lsp_types::GotoDefinitionResponse;

use crate::text_source::location_for;

/// Answers a `textDocument/definition` request.
pub fn definition(
    ctx: &CursorContext,
    source: &str,
    file: &File,
    documents: &DocumentStore,
    symbols: &SymbolIndex,
    host: Option<&HostProxy>,
    virtual_file: Option<&VirtualFile>,
) -> Option<GotoDefinitionResponse> {
    if !ctx.word.is_empty() {
        if let Some(info) = symbols.lookup_function(&ctx.word) {
            return location_for(documents, &info.uri, info.name_span).map(scalar);
        }
    }

    match ctx.kind {
        NodeKind::ComponentCall => {
            let info = symbols.lookup_component(&ctx.word)?;
            return location_for(documents, &info.uri, info.name_span).map(scalar);
        }
        NodeKind::RefAttr => {
            if let Some(component) = &ctx.scope.component {
                if let Some(span) = find_ref_declaration(file, component, &ctx.word) {
                    return Some(scalar(WireLocation::new(ctx.uri.clone(), gsx_position::WireRange::from_byte_offsets(source, span.start, span.end))));
                }
            }
        }
        NodeKind::StateDecl | NodeKind::StateAccess => {
            if let Some(state_var) = ctx.scope.state_vars.iter().find(|s| s.name == ctx.word) {
                return Some(scalar(WireLocation::new(
                    ctx.uri.clone(),
                    gsx_position::WireRange::from_byte_offsets(source, state_var.span.start, state_var.span.end),
                )));
            }
        }
        NodeKind::Parameter => {
            if let Some(component) = &ctx.scope.component {
                if let Some(info) = symbols.lookup_component_param(component, &ctx.word) {
                    return location_for(documents, &info.uri, info.name_span).map(scalar);
                }
            }
            if let Some(function) = &ctx.scope.function {
                if let Some((info, owner)) = symbols.lookup_function_param(function, &ctx.word) {
                    return location_for(documents, owner, info.name_span).map(scalar);
                }
            }
        }
        NodeKind::ImportPath => return delegate_to_host(ctx, source, host, virtual_file),
        _ => {}
    }

    if ctx.in_host_expr {
        if let Some(ref_info) = ctx.scope.refs.iter().find(|r| r.name == ctx.word) {
            let line = WirePosition::from_byte_offset(source, ref_info.span.start).line;
            return Some(scalar(WireLocation::new(ctx.uri.clone(), gsx_position::WireRange::new(WirePosition::new(line, 0), WirePosition::new(line, 0)))));
        }
    }

    delegate_to_host(ctx, source, host, virtual_file)
}

fn scalar(location: WireLocation) -> GotoDefinitionResponse {
    GotoDefinitionResponse::Scalar(location.into())
}

/// Finds a `name := tui.NewRef()`/`tui.NewRefList()` declaration's span in
/// `component`'s body.
fn find_ref_declaration(file: &File, component: &str, name: &str) -> Option<gsx_ast::Span> {
    let component = file.find_component(component)?;
    find_ref_declaration_in(&component.body, name)
}

fn find_ref_declaration_in(body: &[ChildNode], name: &str) -> Option<gsx_ast::Span> {
    for node in body {
        match node {
            ChildNode::HostCode(hc) => {
                if let Some((decl_name, _)) = hc.code.split_once(":=") {
                    if decl_name.trim() == name && hc.code.contains("tui.NewRef") {
                        return Some(hc.span);
                    }
                }
            }
            ChildNode::Element(e) => {
                if let Some(span) = find_ref_declaration_in(&e.children, name) {
                    return Some(span);
                }
            }
            ChildNode::For(f) => {
                if let Some(span) = find_ref_declaration_in(&f.body, name) {
                    return Some(span);
                }
            }
            ChildNode::If(i) => {
                if let Some(span) = find_ref_declaration_in_if(i, name) {
                    return Some(span);
                }
            }
            ChildNode::Let(l) => {
                if let Some(span) = find_ref_declaration_in(&l.element.children, name) {
                    return Some(span);
                }
            }
            ChildNode::Call(c) => {
                if let Some(span) = find_ref_declaration_in(&c.body, name) {
                    return Some(span);
                }
            }
            ChildNode::HostExpr(_) | ChildNode::Text(_) | ChildNode::ChildrenSlot(_) => {}
        }
    }
    None
}

fn find_ref_declaration_in_if(stmt: &gsx_ast::IfStmt, name: &str) -> Option<gsx_ast::Span> {
    if let Some(span) = find_ref_declaration_in(&stmt.then_body, name) {
        return Some(span);
    }
    match &stmt.else_branch {
        Some(gsx_ast::IfBranch::Else(body)) => find_ref_declaration_in(body, name),
        Some(gsx_ast::IfBranch::ElseIf(nested)) => find_ref_declaration_in_if(nested, name),
        None => None,
    }
}

fn delegate_to_host(ctx: &CursorContext, source: &str, host: Option<&HostProxy>, virtual_file: Option<&VirtualFile>) -> Option<GotoDefinitionResponse> {
    let host = host?;
    let virtual_file = virtual_file?;
    let dsl_pos = dsl_position_at(source, ctx.byte_offset);
    let (gen_line, gen_col, found) = virtual_file.source_map.dsl_to_gen(dsl_pos.line, dsl_pos.column);
    if !found {
        return None;
    }
    let response = host.definition(&virtual_file.uri, gen_line.saturating_sub(1), gen_col.saturating_sub(1)).ok()??;
    Some(translate_response(response, virtual_file))
}

/// Translates any returned location whose URI is the virtual host file
/// back to the DSL document; external URIs (e.g. a jump into the Go
/// standard library) pass through unchanged.
fn translate_response(response: GotoDefinitionResponse, virtual_file: &VirtualFile) -> GotoDefinitionResponse {
    match response {
        GotoDefinitionResponse::Scalar(location) => GotoDefinitionResponse::Scalar(translate_location(location, virtual_file)),
        GotoDefinitionResponse::Array(locations) => {
            GotoDefinitionResponse::Array(locations.into_iter().map(|l| translate_location(l, virtual_file)).collect())
        }
        GotoDefinitionResponse::Link(links) => GotoDefinitionResponse::Link(links),
    }
}

fn translate_location(location: lsp_types::Location, virtual_file: &VirtualFile) -> lsp_types::Location {
    if location.uri.as_str() != virtual_file.uri {
        return location;
    }
    let dsl_uri = gsx_uri::host_uri_to_dsl_uri(&virtual_file.uri).unwrap_or_else(|| virtual_file.uri.clone());
    let (dsl_line, dsl_col, found) = virtual_file.source_map.gen_to_dsl(location.range.start.line + 1, location.range.start.character + 1);
    if !found {
        return location;
    }
    let Ok(uri) = dsl_uri.parse() else { return location };
    let pos = lsp_types::Position { line: dsl_line.saturating_sub(1), character: dsl_col.saturating_sub(1) };
    lsp_types::Location { uri, range: lsp_types::Range { start: pos, end: pos } }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gsx_position::WirePosition;

    #[test]
    fn ref_attr_jumps_to_its_tui_new_ref_declaration() {
        let source = "package p\n\ntempl Box() {\n\tcontent := tui.NewRef()\n\t<div ref={content}></div>\n}\n";
        let file = gsx_parser::parse(source).file;
        let byte = source.find("ref={content}").unwrap() + "ref={".len() + 1;
        let pos = WirePosition::from_byte_offset(source, byte);
        let ctx = gsx_cursor::resolve(&file, source, "file:///a.gsx", pos);

        let documents = DocumentStore::new();
        let symbols = SymbolIndex::new();
        let response = definition(&ctx, source, &file, &documents, &symbols, None, None).expect("response");
        let GotoDefinitionResponse::Scalar(location) = response else { panic!("expected scalar") };
        assert!(location.range.start.line == 3);
    }

    #[test]
    fn component_call_jumps_to_the_indexed_component() {
        let source = "package p\n\ntempl Inner() { <span/> }\n\ntempl Outer() { @Inner() }\n";
        let file = gsx_parser::parse(source).file;
        let mut symbols = SymbolIndex::new();
        symbols.index_document("file:///a.gsx", &file);

        let byte = source.find("@Inner").unwrap() + 2;
        let pos = WirePosition::from_byte_offset(source, byte);
        let ctx = gsx_cursor::resolve(&file, source, "file:///a.gsx", pos);

        let documents = DocumentStore::new();
        documents.open("file:///a.gsx".to_string(), 1, source.to_string());
        let response = definition(&ctx, source, &file, &documents, &symbols, None, None).expect("response");
        assert!(matches!(response, GotoDefinitionResponse::Scalar(_)));
    }
}
