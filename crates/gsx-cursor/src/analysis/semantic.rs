//! Text-level heuristics used when no AST node covers the cursor, or to
//! classify a host expression's code without parsing it.
//!
//! These are intentionally approximate. GSX host code is opaque
//! host-language text to this crate — classifying it as a state access or
//! declaration is pattern matching on the `tui.NewState`/`.Get`/`.Set`
//! convention, not a type-checked analysis. A host expression that merely
//! happens to contain the substring `.Set(` will misclassify; providers
//! that need precision fall back to the host-language proxy instead.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::node_kind::NodeKind;

/// Matches a `name := tui.NewState(expr)` state declaration, capturing the
/// variable name and the initializer text.
static STATE_DECL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(?P<name>[A-Za-z_][A-Za-z0-9_]*)\s*:=\s*tui\.NewState\((?P<expr>.*)\)\s*;?\s*$").expect("static regex is valid"));

/// Substrings that mark a host expression as reading or writing a state
/// variable rather than a plain expression.
const STATE_ACCESS_METHODS: &[&str] = &[".Get(", ".Set(", ".Update(", ".Bind(", ".Batch("];

/// Returns the captured `(name, init_expr)` if `code` matches the
/// `tui.NewState` declaration pattern.
pub fn match_state_decl(code: &str) -> Option<(String, String)> {
    let caps = STATE_DECL.captures(code)?;
    Some((caps["name"].to_string(), caps["expr"].trim().to_string()))
}

/// Classifies a `{...}` host expression's code as a state declaration,
/// state access, or a plain host expression.
pub fn classify_host_code(code: &str) -> NodeKind {
    if match_state_decl(code).is_some() {
        return NodeKind::StateDecl;
    }
    if STATE_ACCESS_METHODS.iter().any(|m| code.contains(m)) {
        return NodeKind::StateAccess;
    }
    NodeKind::HostExpression
}

/// Scans `nodes` and every nested body for `tui.NewState` declarations,
/// recording each as a [`crate::scope::StateVar`].
pub fn collect_state_vars(nodes: &[gsx_ast::ChildNode], out: &mut Vec<crate::scope::StateVar>) {
    use gsx_ast::ChildNode;

    for node in nodes {
        match node {
            ChildNode::HostCode(hc) => {
                if let Some((name, init_expr)) = match_state_decl(&hc.code) {
                    out.push(crate::scope::StateVar { name, init_expr, span: hc.span });
                }
            }
            ChildNode::Element(e) => collect_state_vars(&e.children, out),
            ChildNode::For(f) => collect_state_vars(&f.body, out),
            ChildNode::If(i) => {
                collect_state_vars(&i.then_body, out);
                collect_else_branch_state_vars(&i.else_branch, out);
            }
            ChildNode::Let(l) => collect_state_vars(&l.element.children, out),
            ChildNode::Call(c) => collect_state_vars(&c.body, out),
            ChildNode::HostExpr(_) | ChildNode::Text(_) | ChildNode::ChildrenSlot(_) => {}
        }
    }
}

fn collect_else_branch_state_vars(branch: &Option<gsx_ast::IfBranch>, out: &mut Vec<crate::scope::StateVar>) {
    use gsx_ast::IfBranch;

    match branch {
        Some(IfBranch::Else(body)) => collect_state_vars(body, out),
        Some(IfBranch::ElseIf(inner)) => {
            collect_state_vars(&inner.then_body, out);
            collect_else_branch_state_vars(&inner.else_branch, out);
        }
        None => {}
    }
}

/// Scans `nodes` and every nested body for `ref`/`ref_key` bindings,
/// tagging each with whether it sits inside a loop and/or conditional.
pub fn collect_refs(nodes: &[gsx_ast::ChildNode], in_loop: bool, in_conditional: bool, out: &mut Vec<crate::scope::RefInfo>) {
    use crate::scope::{RefInfo, RefKind};
    use gsx_ast::ChildNode;

    for node in nodes {
        match node {
            ChildNode::Element(e) => collect_refs_element(e, in_loop, in_conditional, out),
            ChildNode::For(f) => collect_refs(&f.body, true, in_conditional, out),
            ChildNode::If(i) => {
                collect_refs(&i.then_body, in_loop, true, out);
                collect_else_branch_refs(&i.else_branch, in_loop, out);
            }
            ChildNode::Let(l) => collect_refs_element(&l.element, in_loop, in_conditional, out),
            ChildNode::Call(c) => collect_refs(&c.body, in_loop, in_conditional, out),
            ChildNode::HostExpr(_) | ChildNode::HostCode(_) | ChildNode::Text(_) | ChildNode::ChildrenSlot(_) => {}
        }
    }
}

fn collect_refs_element(e: &gsx_ast::Element, in_loop: bool, in_conditional: bool, out: &mut Vec<crate::scope::RefInfo>) {
    use crate::scope::{RefInfo, RefKind};

    if let Some(ref_key) = &e.ref_key {
        out.push(RefInfo { name: ref_key.code.trim().to_string(), span: ref_key.span, in_loop, in_conditional, kind: RefKind::Map });
    } else if let Some(ref_expr) = &e.ref_expr {
        out.push(RefInfo {
            name: ref_expr.code.trim().to_string(),
            span: ref_expr.span,
            in_loop,
            in_conditional,
            kind: if in_loop { RefKind::List } else { RefKind::Single },
        });
    }
    collect_refs(&e.children, in_loop, in_conditional, out);
}

fn collect_else_branch_refs(branch: &Option<gsx_ast::IfBranch>, in_loop: bool, out: &mut Vec<crate::scope::RefInfo>) {
    use gsx_ast::IfBranch;

    match branch {
        Some(IfBranch::Else(body)) => collect_refs(body, in_loop, true, out),
        Some(IfBranch::ElseIf(inner)) => {
            collect_refs(&inner.then_body, in_loop, true, out);
            collect_else_branch_refs(&inner.else_branch, in_loop, out);
        }
        None => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_decl_captures_name_and_init() {
        let (name, init) = match_state_decl("count := tui.NewState(0)").expect("matches");
        assert_eq!(name, "count");
        assert_eq!(init, "0");
    }

    #[test]
    fn state_access_methods_are_recognized() {
        assert_eq!(classify_host_code("count.Get()"), NodeKind::StateAccess);
        assert_eq!(classify_host_code("count.Set(5)"), NodeKind::StateAccess);
        assert_eq!(classify_host_code("count := tui.NewState(0)"), NodeKind::StateDecl);
        assert_eq!(classify_host_code("count + 1"), NodeKind::HostExpression);
    }
}
