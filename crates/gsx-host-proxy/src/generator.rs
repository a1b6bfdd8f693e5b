//! Synthesizes a compilable host-language (Go) file from a parsed GSX
//! [`File`], recording a [`SourceMap`] as it goes.
//!
//! Every embedded host expression, iterable, condition, call-argument, or
//! let-name is forced to appear at a known, unique position in the
//! generated buffer, so the host-language server can answer hover,
//! completion, and definition queries against real Go positions that we
//! then translate back to DSL coordinates.

use gsx_ast::{ChildNode, Component, Element, File, ForStmt, IfBranch, IfStmt, TopLevelItem};
use gsx_position::{ByteSpan, DslPosition};

use crate::source_map::{GenPosition, SourceMap};

/// The generated buffer plus the span mapping back to its DSL source.
///
/// Produced as a single immutable value per generation pass; callers swap
/// it into their virtual-file cache atomically rather than mutating one in
/// place.
#[derive(Debug, Clone)]
pub struct VirtualFile {
    /// The virtual host-file URI (`name_gsx_generated.go`), never written
    /// to disk.
    pub uri: String,
    /// The synthesized Go source text.
    pub content: String,
    /// DSL ↔ generated position mapping.
    pub source_map: SourceMap,
}

/// Generates the virtual host file for `file`, whose DSL source is
/// `source` and whose DSL URI is `dsl_uri`.
pub fn generate_virtual_file(dsl_uri: &str, file: &File, source: &str) -> VirtualFile {
    let uri = gsx_uri::dsl_to_virtual_uri(dsl_uri).unwrap_or_else(|| format!("{dsl_uri}.generated.go"));

    let mut emitter = Emitter::new();
    let mut map = SourceMap::new();

    emitter.push_line(&format!("package {}", file.package.as_deref().unwrap_or("main")));
    emitter.push_line("");

    for import in &file.imports {
        match &import.alias {
            Some(alias) => emitter.push_line(&format!("import {alias} \"{}\"", import.path)),
            None => emitter.push_line(&format!("import \"{}\"", import.path)),
        }
    }
    if !file.imports.is_empty() {
        emitter.push_line("");
    }

    for item in &file.top_level {
        match item {
            TopLevelItem::HostDecl(decl) => {
                emit_verbatim_with_span(&mut emitter, &mut map, source, decl.span, &decl.code);
                emitter.push_line("");
            }
            TopLevelItem::Component(component) => {
                generate_component(&mut emitter, &mut map, source, component);
                emitter.push_line("");
            }
            TopLevelItem::Function(func) => {
                let name_offset_in_sig = func.signature_text.find(func.name.as_str()).unwrap_or(0);
                emitter.push(&func.signature_text[..name_offset_in_sig]);
                let gen_pos = emitter.pos();
                emitter.push(&func.signature_text[name_offset_in_sig..]);
                let dsl_pos = dsl_position_at(source, func.name_span.start);
                map.add_span(dsl_pos.line, dsl_pos.column, gen_pos.line, gen_pos.column, func.name.chars().count() as u32);
                emitter.push_line(" {}");
                emitter.push_line("");
            }
        }
    }

    VirtualFile { uri, content: emitter.buf, source_map: map }
}

/// Accumulates generated text while tracking the writer's current
/// 1-indexed line/column, so every emitted token's generated position is
/// known without a second pass over the buffer.
struct Emitter {
    buf: String,
    line: u32,
    column: u32,
}

impl Emitter {
    fn new() -> Self {
        Self { buf: String::new(), line: 1, column: 1 }
    }

    fn pos(&self) -> GenPosition {
        GenPosition::new(self.line, self.column)
    }

    fn push(&mut self, text: &str) {
        for ch in text.chars() {
            if ch == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
        self.buf.push_str(text);
    }

    fn push_line(&mut self, text: &str) {
        self.push(text);
        self.push("\n");
    }

    fn indent(&mut self, depth: usize) {
        for _ in 0..depth {
            self.push("\t");
        }
    }
}

/// Converts a byte offset in `source` to a 1-indexed DSL position, using a
/// UTF-8 character count for the column (matching [`DslPosition`]'s
/// convention, distinct from the UTF-16 wire columns used at the LSP
/// boundary).
///
/// Exposed beyond this module so providers can translate a cursor's byte
/// offset into the same coordinate system [`SourceMap`] keys its DSL side
/// on, without duplicating the conversion.
pub fn dsl_position_at(source: &str, offset: usize) -> DslPosition {
    let offset = offset.min(source.len());
    let prefix = &source[..offset];
    let line = prefix.bytes().filter(|&b| b == b'\n').count() as u32 + 1;
    let line_start = prefix.rfind('\n').map(|i| i + 1).unwrap_or(0);
    let column = source[line_start..offset].chars().count() as u32 + 1;
    DslPosition::new(line, column)
}

/// Finds `needle`'s byte offset within `span`'s source text, returning an
/// absolute offset into `source`. Used for the handful of AST nodes that
/// store a verbatim text fragment (an iterable, a condition, a call's
/// argument list) without a span of their own: the fragment is searched
/// for inside its enclosing node's span, which is a reasonable proxy since
/// the parser only stores substrings it actually consumed from that range.
fn locate_in_span(source: &str, span: ByteSpan, needle: &str) -> usize {
    span.try_slice(source).and_then(|text| text.find(needle)).map(|rel| span.start + rel).unwrap_or(span.start)
}

/// Emits `text` verbatim (it may span multiple lines), recording one
/// mapped span per non-blank line, anchored at `dsl_span.start` plus the
/// text's own internal line offsets.
fn emit_verbatim_with_span(emitter: &mut Emitter, map: &mut SourceMap, source: &str, dsl_span: ByteSpan, text: &str) {
    let mut consumed = 0usize;
    for line in text.split_inclusive('\n') {
        let trimmed = line.trim_end_matches(['\n', '\r']);
        if !trimmed.is_empty() {
            let dsl_pos = dsl_position_at(source, dsl_span.start + consumed);
            let gen_pos = emitter.pos();
            map.add_span(dsl_pos.line, dsl_pos.column, gen_pos.line, gen_pos.column, trimmed.chars().count() as u32);
        }
        emitter.push(line);
        consumed += line.len();
    }
    if !text.ends_with('\n') {
        emitter.push("\n");
    }
}

/// Emits one component as `func Name(params) error { ... return nil }`.
///
/// The DSL has no explicit return-type clause on a component (`templ` only
/// ever renders); `error` is the simplest real Go type that makes the
/// required trailing `return nil` well-formed without fabricating a
/// `templ.Component`-shaped construction the generator has no AST data to
/// build.
fn generate_component(emitter: &mut Emitter, map: &mut SourceMap, source: &str, component: &Component) {
    let header_prefix = format!("func {}(", component.name);
    emitter.push(&header_prefix);

    let gen_line = emitter.pos().line;
    for (i, param) in component.params.iter().enumerate() {
        if i > 0 {
            emitter.push(", ");
        }
        let dsl_pos = dsl_position_at(source, param.span.start);
        let gen_pos = emitter.pos();
        let text = format!("{} {}", param.name, param.type_text);
        map.add_span(dsl_pos.line, dsl_pos.column, gen_line, gen_pos.column, text.chars().count() as u32);
        emitter.push(&text);
    }
    emitter.push_line(") error {");

    let mut state_decls = Vec::new();
    let mut refs = Vec::new();
    collect_state_decls(&component.body, &mut state_decls);
    collect_refs(&component.body, &mut refs);

    for hc in state_decls {
        let name = match_state_decl(&hc.code).unwrap_or_default();
        emitter.indent(1);
        let gen_pos = emitter.pos();
        emitter.push_line(&hc.code);
        let dsl_pos = dsl_position_at(source, hc.span.start);
        map.add_span(dsl_pos.line, dsl_pos.column, gen_pos.line, gen_pos.column, name.chars().count().max(1) as u32);
    }
    for ref_expr in refs {
        emitter.indent(1);
        emitter.push("_ = ");
        let gen_pos = emitter.pos();
        emitter.push_line(&ref_expr.code);
        let dsl_pos = dsl_position_at(source, ref_expr.open_brace_span.end);
        map.add_span(dsl_pos.line, dsl_pos.column, gen_pos.line, gen_pos.column, ref_expr.code.chars().count() as u32);
    }

    emit_body(emitter, map, source, &component.body, 1);

    emitter.indent(1);
    emitter.push_line("return nil");
    emitter.push_line("}");
}

/// True if `code` matches the state-declaration shape `name :=
/// tui.NewState(...)`; returns the declared name.
///
/// A plain substring/split check rather than the regex gsx-cursor uses for
/// the same shape: the generator only needs the bound name to size its
/// mapped span, not the richer classification gsx-cursor performs, and
/// this crate doesn't otherwise need a regex dependency.
fn match_state_decl(code: &str) -> Option<&str> {
    let trimmed = code.trim();
    let (name, rest) = trimmed.split_once(":=")?;
    let name = name.trim();
    if name.is_empty() || !name.chars().all(|c| c.is_alphanumeric() || c == '_') {
        return None;
    }
    rest.trim().starts_with("tui.NewState(").then_some(name)
}

fn collect_state_decls<'a>(body: &'a [ChildNode], out: &mut Vec<&'a gsx_ast::HostCode>) {
    for node in body {
        match node {
            ChildNode::HostCode(hc) if match_state_decl(&hc.code).is_some() => out.push(hc),
            ChildNode::Element(e) => collect_state_decls(&e.children, out),
            ChildNode::For(f) => collect_state_decls(&f.body, out),
            ChildNode::If(i) => collect_if_state_decls(i, out),
            ChildNode::Let(l) => collect_state_decls(&l.element.children, out),
            ChildNode::Call(c) => collect_state_decls(&c.body, out),
            _ => {}
        }
    }
}

fn collect_if_state_decls<'a>(stmt: &'a IfStmt, out: &mut Vec<&'a gsx_ast::HostCode>) {
    collect_state_decls(&stmt.then_body, out);
    match &stmt.else_branch {
        Some(IfBranch::Else(body)) => collect_state_decls(body, out),
        Some(IfBranch::ElseIf(inner)) => collect_if_state_decls(inner, out),
        None => {}
    }
}

fn collect_refs<'a>(body: &'a [ChildNode], out: &mut Vec<&'a gsx_ast::HostExpr>) {
    for node in body {
        match node {
            ChildNode::Element(e) => collect_refs_element(e, out),
            ChildNode::For(f) => collect_refs(&f.body, out),
            ChildNode::If(i) => collect_if_refs(i, out),
            ChildNode::Let(l) => collect_refs_element(&l.element, out),
            ChildNode::Call(c) => collect_refs(&c.body, out),
            _ => {}
        }
    }
}

fn collect_refs_element<'a>(element: &'a Element, out: &mut Vec<&'a gsx_ast::HostExpr>) {
    if let Some(ref_expr) = &element.ref_expr {
        out.push(ref_expr);
    }
    collect_refs(&element.children, out);
}

fn collect_if_refs<'a>(stmt: &'a IfStmt, out: &mut Vec<&'a gsx_ast::HostExpr>) {
    collect_refs(&stmt.then_body, out);
    match &stmt.else_branch {
        Some(IfBranch::Else(body)) => collect_refs(body, out),
        Some(IfBranch::ElseIf(inner)) => collect_if_refs(inner, out),
        None => {}
    }
}

/// Emits the regular, in-order body statements. State-variable declarations
/// were already hoisted to the top of the function by [`generate_component`]
/// (mirroring the "hooks run unconditionally" convention of the
/// `tui.NewState` API this mirrors), so a `HostCode` node matching that
/// shape is skipped here rather than emitted a second time.
fn emit_body(emitter: &mut Emitter, map: &mut SourceMap, source: &str, body: &[ChildNode], depth: usize) {
    for node in body {
        emit_node(emitter, map, source, node, depth);
    }
}

fn emit_node(emitter: &mut Emitter, map: &mut SourceMap, source: &str, node: &ChildNode, depth: usize) {
    match node {
        ChildNode::Element(e) => emit_body(emitter, map, source, &e.children, depth),
        ChildNode::Text(_) | ChildNode::ChildrenSlot(_) => {}
        ChildNode::HostExpr(he) => {
            emitter.indent(depth);
            emitter.push("_ = ");
            let gen_pos = emitter.pos();
            emitter.push_line(&he.code);
            let dsl_pos = dsl_position_at(source, he.open_brace_span.end);
            map.add_span(dsl_pos.line, dsl_pos.column, gen_pos.line, gen_pos.column, he.code.chars().count() as u32);
        }
        ChildNode::HostCode(hc) => {
            if match_state_decl(&hc.code).is_some() {
                return;
            }
            emitter.indent(depth);
            let gen_pos = emitter.pos();
            emitter.push_line(&hc.code);
            let dsl_pos = dsl_position_at(source, hc.span.start);
            map.add_span(dsl_pos.line, dsl_pos.column, gen_pos.line, gen_pos.column, hc.code.chars().count() as u32);
        }
        ChildNode::For(f) => emit_for(emitter, map, source, f, depth),
        ChildNode::If(i) => emit_if(emitter, map, source, i, depth),
        ChildNode::Let(l) => {
            emitter.indent(depth);
            emitter.push("var ");
            let gen_pos = emitter.pos();
            emitter.push(&l.name);
            let name_offset = locate_in_span(source, l.span, &l.name);
            let dsl_pos = dsl_position_at(source, name_offset);
            map.add_span(dsl_pos.line, dsl_pos.column, gen_pos.line, gen_pos.column, l.name.chars().count() as u32);
            emitter.push_line(" interface{}");
            emit_body(emitter, map, source, &l.element.children, depth);
        }
        ChildNode::Call(c) => {
            emitter.indent(depth);
            emitter.push(&format!("_ = {}(", c.callee));
            let gen_pos = emitter.pos();
            emitter.push(&c.arg_text);
            let args_offset = locate_in_span(source, c.span, &c.arg_text);
            let dsl_pos = dsl_position_at(source, args_offset);
            if !c.arg_text.is_empty() {
                map.add_span(dsl_pos.line, dsl_pos.column, gen_pos.line, gen_pos.column, c.arg_text.chars().count() as u32);
            }
            emitter.push_line(")");
            emit_body(emitter, map, source, &c.body, depth);
        }
    }
}

fn emit_for(emitter: &mut Emitter, map: &mut SourceMap, source: &str, stmt: &ForStmt, depth: usize) {
    emitter.indent(depth);
    emitter.push("for ");
    if let Some(index) = &stmt.index_name {
        emitter.push(index);
        emitter.push(", ");
    }
    emitter.push(&stmt.value_name);
    emitter.push(" := range ");
    let gen_pos = emitter.pos();
    emitter.push(&stmt.iterable_text);
    let iter_offset = locate_in_span(source, stmt.span, &stmt.iterable_text);
    let dsl_pos = dsl_position_at(source, iter_offset);
    if !stmt.iterable_text.is_empty() {
        map.add_span(dsl_pos.line, dsl_pos.column, gen_pos.line, gen_pos.column, stmt.iterable_text.chars().count() as u32);
    }
    emitter.push_line(" {");
    emit_body(emitter, map, source, &stmt.body, depth + 1);
    emitter.indent(depth);
    emitter.push_line("}");
}

fn emit_if(emitter: &mut Emitter, map: &mut SourceMap, source: &str, stmt: &IfStmt, depth: usize) {
    emitter.indent(depth);
    emitter.push("if ");
    let gen_pos = emitter.pos();
    emitter.push(&stmt.condition_text);
    let cond_offset = locate_in_span(source, stmt.span, &stmt.condition_text);
    let dsl_pos = dsl_position_at(source, cond_offset);
    if !stmt.condition_text.is_empty() {
        map.add_span(dsl_pos.line, dsl_pos.column, gen_pos.line, gen_pos.column, stmt.condition_text.chars().count() as u32);
    }
    emitter.push_line(" {");
    emit_body(emitter, map, source, &stmt.then_body, depth + 1);
    emitter.indent(depth);
    match &stmt.else_branch {
        Some(IfBranch::Else(body)) => {
            emitter.push_line("} else {");
            emit_body(emitter, map, source, body, depth + 1);
            emitter.indent(depth);
            emitter.push_line("}");
        }
        Some(IfBranch::ElseIf(inner)) => {
            emitter.push("} else ");
            emit_if(emitter, map, source, inner, depth);
        }
        None => {
            emitter.push_line("}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> File {
        gsx_parser::parse(source).file
    }

    #[test]
    fn emits_package_and_imports() {
        let source = "package shop\n\nimport \"fmt\"\n";
        let file = parse(source);
        let vf = generate_virtual_file("file:///shop.gsx", &file, source);

        assert!(vf.content.starts_with("package shop\n"));
        assert!(vf.content.contains("import \"fmt\"\n"));
        assert_eq!(vf.uri, "file:///shop_gsx_generated.go");
    }

    #[test]
    fn component_with_params_maps_param_span() {
        let source = "package p\n\ntempl Greet(name string) {\n\t<span>{name}</span>\n}\n";
        let file = parse(source);
        let vf = generate_virtual_file("file:///a.gsx", &file, source);

        assert!(vf.content.contains("func Greet(name string) error {"));
        let param_dsl_line = 3u32;
        let param_dsl_col = (source.lines().nth(2).unwrap().find("name string").unwrap() + 1) as u32;
        let (gen_line, _, found) = vf.source_map.dsl_to_gen(param_dsl_line, param_dsl_col);
        assert!(found);
        assert_eq!(gen_line, 4);
    }

    #[test]
    fn host_expression_maps_back_to_the_character_after_the_brace() {
        let source = "package p\n\ntempl Greet(name string) {\n\t<span>{name}</span>\n}\n";
        let file = parse(source);
        let vf = generate_virtual_file("file:///a.gsx", &file, source);

        let brace_col = (source.lines().nth(3).unwrap().find('{').unwrap() + 2) as u32;
        let (_, _, found) = vf.source_map.dsl_to_gen(4, brace_col);
        assert!(found);
    }

    #[test]
    fn state_declaration_is_hoisted_once_and_not_duplicated() {
        let source = "package p\n\ntempl Counter() {\n\tcount := tui.NewState(0)\n\t<span>{count.Get()}</span>\n}\n";
        let file = parse(source);
        let vf = generate_virtual_file("file:///a.gsx", &file, source);

        let occurrences = vf.content.matches("tui.NewState(0)").count();
        assert_eq!(occurrences, 1);
    }

    #[test]
    fn for_loop_emits_a_go_range_clause() {
        let source = "package p\n\ntempl List(items []string) {\n\t@for i, v := range items {\n\t\t<span>{v}</span>\n\t}\n}\n";
        let file = parse(source);
        let vf = generate_virtual_file("file:///a.gsx", &file, source);

        assert!(vf.content.contains("for i, v := range items {"));
    }

    #[test]
    fn ref_attribute_emits_a_blank_assignment() {
        let source = "package p\n\ntempl List(items []string) {\n\t<li ref={r}>x</li>\n}\n";
        let file = parse(source);
        let vf = generate_virtual_file("file:///a.gsx", &file, source);

        assert!(vf.content.contains("_ = r"));
    }
}
