//! The cursor-context resolution algorithm.
//!
//! Resolution runs top-down: file-level constructs (imports, host
//! declarations, functions) are checked first since they never nest, then
//! each component is checked in turn, and once the enclosing component is
//! found its body is walked depth-first toward the cursor, accumulating
//! scope as it descends. Nothing here is cached — every call re-walks the
//! AST, which is cheap relative to a single keystroke's round trip and
//! avoids ever answering against a stale tree.

use gsx_ast::{ChildNode, Element, File, IfBranch};
use gsx_position::WirePosition;

use crate::analysis::declaration::{DeclarationKind, DeclarationTable};
use crate::analysis::semantic::{classify_host_code, collect_refs, collect_state_vars};
use crate::context::CursorContext;
use crate::heuristics;
use crate::node_kind::NodeKind;
use crate::scope::{LetBind, Scope, ScopeParam};

/// Resolves the cursor context at `position` in `source`, whose parsed form
/// is `file`.
///
/// `uri` is carried through unchanged for providers that need to attribute
/// the result to a document without threading a separate parameter.
pub fn resolve(file: &File, source: &str, uri: &str, position: WirePosition) -> CursorContext {
    let byte_offset = position.to_byte_offset(source);
    let word = heuristics::extract_word(source, byte_offset);
    let line_text = heuristics::extract_line(source, byte_offset);
    let in_host_expr = heuristics::in_host_expr(source, byte_offset);
    let in_class_attr = heuristics::in_class_attr(source, byte_offset);
    let in_element_tag = heuristics::in_element_tag(source, byte_offset);

    let mut ctx = CursorContext {
        uri: uri.to_string(),
        position,
        byte_offset,
        kind: NodeKind::Unknown,
        scope: Scope::default(),
        local_declarations: DeclarationTable::new(),
        parent_chain: Vec::new(),
        node_span: None,
        word: word.clone(),
        line_text,
        in_host_expr,
        in_class_attr,
        in_element_tag,
        attr_tag: if in_element_tag || in_class_attr { heuristics::nearest_tag_name(source, byte_offset) } else { None },
        attr_name: if in_class_attr { Some("class".to_string()) } else { heuristics::enclosing_attr_name(source, byte_offset) },
        import_path: None,
    };

    for import in &file.imports {
        if import.span.contains(byte_offset) {
            ctx.kind = NodeKind::ImportPath;
            ctx.node_span = Some(import.span);
            ctx.import_path = Some(import.path.clone());
            return ctx;
        }
    }

    for decl in file.host_decls() {
        if decl.span.contains(byte_offset) {
            ctx.kind = NodeKind::HostDeclaration;
            ctx.node_span = Some(decl.span);
            return ctx;
        }
    }

    for func in file.functions() {
        if func.name_span.contains(byte_offset) {
            ctx.kind = NodeKind::HostFunction;
            ctx.scope.function = Some(func.name.clone());
            ctx.node_span = Some(func.name_span);
            return ctx;
        }
        for param in &func.params {
            if param.span.contains(byte_offset) {
                ctx.kind = NodeKind::Parameter;
                ctx.scope.function = Some(func.name.clone());
                ctx.scope.params.push(ScopeParam { name: param.name.clone(), type_text: param.type_text.clone(), span: param.span });
                ctx.local_declarations.insert(&param.name, DeclarationKind::Param, param.span);
                ctx.node_span = Some(param.span);
                return ctx;
            }
        }
        if func.span.contains(byte_offset) {
            ctx.kind = NodeKind::HostFunction;
            ctx.scope.function = Some(func.name.clone());
            ctx.node_span = Some(func.span);
            return ctx;
        }
    }

    for component in file.components() {
        if !component.span.contains(byte_offset) {
            continue;
        }

        ctx.scope.component = Some(component.name.clone());
        for param in &component.params {
            ctx.scope.params.push(ScopeParam { name: param.name.clone(), type_text: param.type_text.clone(), span: param.span });
            ctx.local_declarations.insert(&param.name, DeclarationKind::Param, param.span);
        }

        if component.name_span.contains(byte_offset) {
            ctx.kind = NodeKind::Component;
            ctx.node_span = Some(component.name_span);
            return ctx;
        }
        for param in &component.params {
            if param.span.contains(byte_offset) {
                ctx.kind = NodeKind::Parameter;
                ctx.node_span = Some(param.span);
                return ctx;
            }
        }

        collect_refs(&component.body, false, false, &mut ctx.scope.refs);
        collect_state_vars(&component.body, &mut ctx.scope.state_vars);
        for state_var in &ctx.scope.state_vars {
            ctx.local_declarations.insert(&state_var.name, DeclarationKind::StateVar, state_var.span);
        }

        let mut walker =
            Walker { byte_offset, scope: &mut ctx.scope, parent_chain: &mut ctx.parent_chain, declarations: &mut ctx.local_declarations };
        ctx.parent_chain.push(NodeKind::Component);
        if let Some((kind, span)) = walker.walk(&component.body) {
            ctx.kind = kind;
            ctx.node_span = Some(span);
            return ctx;
        }

        ctx.kind = NodeKind::Component;
        ctx.node_span = Some(component.span);
        return ctx;
    }

    ctx.kind = heuristics::fallback_classify(&word, in_host_expr, in_class_attr, in_element_tag);
    ctx
}

/// Carries the mutable state threaded through a single body walk.
struct Walker<'a> {
    byte_offset: usize,
    scope: &'a mut Scope,
    parent_chain: &'a mut Vec<NodeKind>,
    declarations: &'a mut DeclarationTable,
}

impl Walker<'_> {
    fn walk(&mut self, nodes: &[ChildNode]) -> Option<(NodeKind, gsx_ast::Span)> {
        for node in nodes {
            if !node.span().contains(self.byte_offset) {
                continue;
            }
            return self.walk_node(node);
        }
        None
    }

    fn walk_node(&mut self, node: &ChildNode) -> Option<(NodeKind, gsx_ast::Span)> {
        match node {
            ChildNode::Element(e) => self.walk_element(e),
            ChildNode::HostExpr(he) => Some((classify_host_code(&he.code), he.span)),
            ChildNode::HostCode(hc) => Some((classify_host_code(&hc.code), hc.span)),
            ChildNode::For(f) => {
                self.scope.in_for_loop = true;
                self.scope.for_index = f.index_name.clone();
                self.scope.for_value = Some(f.value_name.clone());
                if let Some(index_name) = &f.index_name {
                    self.declarations.insert(index_name, DeclarationKind::LoopVar, f.span);
                }
                self.declarations.insert(&f.value_name, DeclarationKind::LoopVar, f.span);

                self.parent_chain.push(NodeKind::ForLoop);
                if let Some(result) = self.walk(&f.body) {
                    return Some(result);
                }
                Some((NodeKind::ForLoop, f.span))
            }
            ChildNode::If(i) => {
                self.scope.in_if_stmt = true;
                self.parent_chain.push(NodeKind::IfStmt);

                if i.then_body.iter().any(|c| c.span().contains(self.byte_offset)) {
                    if let Some(result) = self.walk(&i.then_body) {
                        return Some(result);
                    }
                } else if let Some(result) = self.walk_else_branch(&i.else_branch) {
                    return Some(result);
                }
                Some((NodeKind::IfStmt, i.span))
            }
            ChildNode::Let(l) => {
                self.scope.let_binds.push(LetBind { name: l.name.clone(), span: l.span });
                self.declarations.insert(&l.name, DeclarationKind::LetBind, l.span);

                if l.element.span.contains(self.byte_offset) {
                    return self.walk_element(&l.element);
                }
                Some((NodeKind::LetBinding, l.span))
            }
            ChildNode::Call(c) => {
                if c.callee_span.contains(self.byte_offset) {
                    return Some((NodeKind::ComponentCall, c.callee_span));
                }
                self.parent_chain.push(NodeKind::ComponentCall);
                if let Some(result) = self.walk(&c.body) {
                    return Some(result);
                }
                Some((NodeKind::ComponentCall, c.span))
            }
            ChildNode::Text(t) => Some((NodeKind::Text, t.span)),
            ChildNode::ChildrenSlot(s) => Some((NodeKind::Unknown, s.span)),
        }
    }

    fn walk_else_branch(&mut self, branch: &Option<IfBranch>) -> Option<(NodeKind, gsx_ast::Span)> {
        match branch {
            Some(IfBranch::Else(body)) => self.walk(body),
            Some(IfBranch::ElseIf(inner)) => {
                if !inner.span.contains(self.byte_offset) {
                    return None;
                }
                if inner.then_body.iter().any(|c| c.span().contains(self.byte_offset)) {
                    self.walk(&inner.then_body).or(Some((NodeKind::IfStmt, inner.span)))
                } else {
                    self.walk_else_branch(&inner.else_branch).or(Some((NodeKind::IfStmt, inner.span)))
                }
            }
            None => None,
        }
    }

    fn walk_element(&mut self, e: &Element) -> Option<(NodeKind, gsx_ast::Span)> {
        if e.tag_span.contains(self.byte_offset) {
            return Some((NodeKind::Element, e.tag_span));
        }
        for attr in &e.attributes {
            if attr.span.contains(self.byte_offset) {
                let kind = if gsx_schema::attributes::is_event_handler(&attr.name) { NodeKind::EventHandler } else { NodeKind::Attribute };
                return Some((kind, attr.span));
            }
        }
        if let Some(ref_expr) = &e.ref_expr {
            if ref_expr.span.contains(self.byte_offset) {
                return Some((NodeKind::RefAttr, ref_expr.span));
            }
        }
        if let Some(ref_key) = &e.ref_key {
            if ref_key.span.contains(self.byte_offset) {
                return Some((NodeKind::RefAttr, ref_key.span));
            }
        }
        if let Some(result) = self.walk(&e.children) {
            return Some(result);
        }
        Some((NodeKind::Element, e.span))
    }
}
