//! Document symbol outline provider (§4.H "Document symbols").
//!
//! Components and host functions are the only top-level symbols; each
//! component's `@let` bindings and `id`-bearing elements are flattened
//! into its children regardless of how deeply nested they are in the
//! body, since an outline view has no use for every intermediate
//! `<div>` on the path to them.

use gsx_ast::{ChildNode, Element, File, IfBranch, IfStmt};
use gsx_position::WireRange;
use lsp_types::{DocumentSymbol, SymbolKind};

/// Builds the outline for `file`'s components and host functions.
pub fn document_symbols(file: &File, source: &str) -> Vec<DocumentSymbol> {
    let mut symbols: Vec<DocumentSymbol> = file.components().map(|c| component_symbol(c, source)).collect();
    symbols.extend(file.functions().map(|f| function_symbol(f, source)));
    symbols
}

#[allow(deprecated)]
fn component_symbol(component: &gsx_ast::Component, source: &str) -> DocumentSymbol {
    let mut children = Vec::new();
    collect_body_symbols(&component.body, &mut children, source);
    DocumentSymbol {
        name: component.name.clone(),
        detail: None,
        kind: SymbolKind::FUNCTION,
        tags: None,
        deprecated: None,
        range: range_of(source, component.span),
        selection_range: range_of(source, component.name_span),
        children: if children.is_empty() { None } else { Some(children) },
    }
}

#[allow(deprecated)]
fn function_symbol(function: &gsx_ast::HostFunction, source: &str) -> DocumentSymbol {
    DocumentSymbol {
        name: function.name.clone(),
        detail: None,
        kind: SymbolKind::FUNCTION,
        tags: None,
        deprecated: None,
        range: range_of(source, function.span),
        selection_range: range_of(source, function.name_span),
        children: None,
    }
}

fn collect_body_symbols(body: &[ChildNode], out: &mut Vec<DocumentSymbol>, source: &str) {
    for node in body {
        match node {
            ChildNode::Let(binding) => {
                out.push(let_binding_symbol(&binding.name, binding.span, source));
                collect_body_symbols(&binding.element.children, out, source);
            }
            ChildNode::Element(element) => {
                if let Some(id) = literal_id_attribute(element) {
                    out.push(element_id_symbol(&id, element, source));
                }
                collect_body_symbols(&element.children, out, source);
            }
            ChildNode::For(for_stmt) => collect_body_symbols(&for_stmt.body, out, source),
            ChildNode::If(if_stmt) => collect_if_symbols(if_stmt, out, source),
            ChildNode::Call(call) => collect_body_symbols(&call.body, out, source),
            ChildNode::HostCode(_) | ChildNode::HostExpr(_) | ChildNode::Text(_) | ChildNode::ChildrenSlot(_) => {}
        }
    }
}

fn collect_if_symbols(stmt: &IfStmt, out: &mut Vec<DocumentSymbol>, source: &str) {
    collect_body_symbols(&stmt.then_body, out, source);
    match &stmt.else_branch {
        Some(IfBranch::Else(body)) => collect_body_symbols(body, out, source),
        Some(IfBranch::ElseIf(nested)) => collect_if_symbols(nested, out, source),
        None => {}
    }
}

fn literal_id_attribute(element: &Element) -> Option<String> {
    element.attributes.iter().find(|attr| attr.name == "id").and_then(|attr| match &attr.value {
        Some(gsx_ast::AttrValue::Str(value)) => Some(value.clone()),
        _ => None,
    })
}

#[allow(deprecated)]
fn let_binding_symbol(name: &str, span: gsx_ast::Span, source: &str) -> DocumentSymbol {
    DocumentSymbol {
        name: name.to_string(),
        detail: Some("@let".to_string()),
        kind: SymbolKind::VARIABLE,
        tags: None,
        deprecated: None,
        range: range_of(source, span),
        selection_range: range_of(source, span),
        children: None,
    }
}

#[allow(deprecated)]
fn element_id_symbol(id: &str, element: &Element, source: &str) -> DocumentSymbol {
    DocumentSymbol {
        name: id.to_string(),
        detail: Some(format!("<{}>", element.tag)),
        kind: SymbolKind::FIELD,
        tags: None,
        deprecated: None,
        range: range_of(source, element.span),
        selection_range: range_of(source, element.tag_span),
        children: None,
    }
}

fn range_of(source: &str, span: gsx_ast::Span) -> lsp_types::Range {
    WireRange::from_byte_offsets(source, span.start, span.end).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn component_outline_includes_let_bindings_and_id_elements() {
        let source = "package p\n\ntempl Page() {\n\t@let header = <div id=\"top\"></div>\n\t<span id=\"label\">hi</span>\n}\n";
        let file = gsx_parser::parse(source).file;
        let symbols = document_symbols(&file, source);

        assert_eq!(symbols.len(), 1);
        let page = &symbols[0];
        assert_eq!(page.name, "Page");
        let children = page.children.as_ref().expect("children");
        assert!(children.iter().any(|c| c.name == "header"));
        assert!(children.iter().any(|c| c.name == "top"));
        assert!(children.iter().any(|c| c.name == "label"));
    }

    #[test]
    fn elements_without_a_literal_id_are_not_symbols() {
        let source = "package p\n\ntempl Page() {\n\t<div id={dynamicId}></div>\n}\n";
        let file = gsx_parser::parse(source).file;
        let symbols = document_symbols(&file, source);
        assert!(symbols[0].children.is_none());
    }

    #[test]
    fn host_functions_are_symbols_with_no_children() {
        let source = "package p\n\nfunc double(x int) int {\n\treturn x * 2\n}\n";
        let file = gsx_parser::parse(source).file;
        let symbols = document_symbols(&file, source);
        assert_eq!(symbols.len(), 1);
        assert_eq!(symbols[0].name, "double");
        assert!(symbols[0].children.is_none());
    }
}
