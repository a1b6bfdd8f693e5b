//! Semantic tokens provider (§4.H "Semantic tokens").
//!
//! Tokens are gathered from two sources: the parsed AST directly
//! (component/function declarations and calls, parameters, `@let` and
//! loop-variable bindings, attribute names) for everything the grammar
//! tracks structurally, and a light text scan of the fixed keyword set
//! plus host-code regions for identifiers, string literals (with `%`
//! format specifiers split into their own token), numbers, and
//! booleans/`nil` — the things no AST node carries a dedicated span for.
//! Collected tokens are sorted by `(line, start_char)` and delta-encoded
//! into the LSP wire format.

use std::collections::HashMap;

use gsx_ast::{ChildNode, Component, File, HostFunction, IfBranch, IfStmt};
use gsx_position::ByteSpan;
use lsp_types::{SemanticToken, SemanticTokens};

// Index into `gsx_lsp_protocol::capabilities::SEMANTIC_TOKEN_TYPES` — the
// legend the server advertises at `initialize`. These must stay in lockstep
// with that array's order.
const KEYWORD: u32 = 0;
const NAMESPACE: u32 = 1;
const CLASS: u32 = 2;
const FUNCTION: u32 = 3;
const DECORATOR: u32 = 4;
const PARAMETER: u32 = 5;
const VARIABLE: u32 = 6;
const STRING: u32 = 7;
const REGEXP: u32 = 8;
const NUMBER: u32 = 9;
const COMMENT: u32 = 10;

// Bit 0 of `SEMANTIC_TOKEN_MODIFIERS` (`readonly`), the only modifier used.
const READONLY: u32 = 1;

const FIXED_KEYWORDS: &[&str] = &["package", "import", "templ", "@for", "@if", "@else", "@let", "func"];

struct RawToken {
    span: ByteSpan,
    token_type: u32,
    modifiers: u32,
}

/// Answers a `textDocument/semanticTokens/full` request.
pub fn semantic_tokens(file: &File, source: &str) -> SemanticTokens {
    let mut tokens = Vec::new();

    if let Some(span) = file.package_span {
        tokens.push(RawToken { span, token_type: NAMESPACE, modifiers: 0 });
    }
    for import in &file.imports {
        collect_import_tokens(import, &mut tokens);
    }
    for comment in &file.leading_comments.comments {
        tokens.push(RawToken { span: comment.span, token_type: COMMENT, modifiers: 0 });
    }

    for component in file.components() {
        collect_component_tokens(component, source, &mut tokens);
    }
    for function in file.functions() {
        tokens.push(RawToken { span: function.name_span, token_type: FUNCTION, modifiers: 0 });
        for param in &function.params {
            tokens.push(RawToken { span: param.span, token_type: PARAMETER, modifiers: 0 });
        }
    }

    collect_keyword_tokens(source, &mut tokens);

    encode(tokens, source)
}

fn collect_import_tokens(import: &gsx_ast::Import, tokens: &mut Vec<RawToken>) {
    let Some(text) = import_text(import) else { return };
    if let Some(alias) = &import.alias {
        if let Some(offset) = text.find(alias.as_str()) {
            tokens.push(RawToken { span: ByteSpan::new(import.span.start + offset, import.span.start + offset + alias.len()), token_type: NAMESPACE, modifiers: 0 });
        }
    }
    if let Some(quote_start) = text.find('"') {
        if let Some(quote_end) = text[quote_start + 1..].find('"') {
            let start = import.span.start + quote_start;
            let end = import.span.start + quote_start + 1 + quote_end + 1;
            tokens.push(RawToken { span: ByteSpan::new(start, end), token_type: NAMESPACE, modifiers: 0 });
        }
    }
}

fn import_text(import: &gsx_ast::Import) -> Option<String> {
    let mut text = String::from("import ");
    if let Some(alias) = &import.alias {
        text.push_str(alias);
        text.push(' ');
    }
    text.push('"');
    text.push_str(&import.path);
    text.push('"');
    Some(text)
}

fn collect_component_tokens(component: &Component, source: &str, tokens: &mut Vec<RawToken>) {
    tokens.push(RawToken { span: component.name_span, token_type: CLASS, modifiers: 0 });

    let mut declared: HashMap<&str, (u32, u32)> = HashMap::new();
    for param in &component.params {
        tokens.push(RawToken { span: param.span, token_type: PARAMETER, modifiers: 0 });
        declared.insert(param.name.as_str(), (PARAMETER, 0));
    }

    collect_body_tokens(&component.body, source, &mut declared, tokens);
}

fn collect_body_tokens(body: &[ChildNode], source: &str, declared: &mut HashMap<&str, (u32, u32)>, tokens: &mut Vec<RawToken>) {
    for node in body {
        match node {
            ChildNode::Element(element) => collect_element_tokens(element, source, declared, tokens),
            ChildNode::HostExpr(expr) => collect_host_code_tokens(&expr.code, expr.span.start + 1, declared, tokens),
            ChildNode::HostCode(code) => {
                if let Some((name, _)) = code.code.split_once(":=") {
                    let name = name.trim();
                    if !name.is_empty() {
                        if let Some(offset) = code.code.find(name) {
                            let is_state = code.code.contains("tui.NewState");
                            let modifiers = if is_state { READONLY } else { 0 };
                            tokens.push(RawToken {
                                span: ByteSpan::new(code.span.start + offset, code.span.start + offset + name.len()),
                                token_type: VARIABLE,
                                modifiers,
                            });
                            declared.insert(Box::leak(name.to_string().into_boxed_str()), (VARIABLE, 0));
                        }
                    }
                }
                collect_host_code_tokens(&code.code, code.span.start, declared, tokens);
            }
            ChildNode::For(for_stmt) => {
                let mut scope = declared.clone();
                if let Some(index) = &for_stmt.index_name {
                    scope.insert(Box::leak(index.clone().into_boxed_str()), (VARIABLE, 0));
                }
                scope.insert(Box::leak(for_stmt.value_name.clone().into_boxed_str()), (VARIABLE, 0));
                collect_body_tokens(&for_stmt.body, source, &mut scope, tokens);
            }
            ChildNode::If(if_stmt) => collect_if_tokens(if_stmt, source, declared, tokens),
            ChildNode::Let(binding) => {
                if let Some(name_span) = find_word_after(source, &binding.name, "@let", binding.span) {
                    tokens.push(RawToken { span: name_span, token_type: VARIABLE, modifiers: 0 });
                }
                let mut scope = declared.clone();
                scope.insert(Box::leak(binding.name.clone().into_boxed_str()), (VARIABLE, 0));
                collect_element_tokens(&binding.element, source, &mut scope, tokens);
            }
            ChildNode::Call(call) => {
                tokens.push(RawToken { span: ByteSpan::new(call.callee_span.start.saturating_sub(1), call.callee_span.start), token_type: DECORATOR, modifiers: 0 });
                tokens.push(RawToken { span: call.callee_span, token_type: CLASS, modifiers: 0 });
                collect_body_tokens(&call.body, source, declared, tokens);
            }
            ChildNode::Text(_) | ChildNode::ChildrenSlot(_) => {}
        }
    }
}

/// Finds `name`'s occurrence inside `span`'s source text, just past the
/// directive keyword that introduces it (used for `@let name = ...`,
/// where the binding's own span starts at `@let`, not at the name).
fn find_word_after(source: &str, name: &str, keyword: &str, span: ByteSpan) -> Option<ByteSpan> {
    let search_start = span.start + keyword.len();
    let search_end = span.end.min(source.len());
    if search_start >= search_end {
        return None;
    }
    let haystack = &source[search_start..search_end];
    let bytes = haystack.as_bytes();
    let mut from = 0;
    while let Some(relative) = haystack[from..].find(name) {
        let start = from + relative;
        let end = start + name.len();
        let before_is_word = start > 0 && is_word_byte(bytes[start - 1]);
        let after_is_word = end < bytes.len() && is_word_byte(bytes[end]);
        if !before_is_word && !after_is_word {
            return Some(ByteSpan::new(search_start + start, search_start + end));
        }
        from = start + 1;
    }
    None
}

fn collect_if_tokens(stmt: &IfStmt, source: &str, declared: &mut HashMap<&str, (u32, u32)>, tokens: &mut Vec<RawToken>) {
    collect_body_tokens(&stmt.then_body, source, declared, tokens);
    match &stmt.else_branch {
        Some(IfBranch::Else(body)) => collect_body_tokens(body, source, declared, tokens),
        Some(IfBranch::ElseIf(nested)) => collect_if_tokens(nested, source, declared, tokens),
        None => {}
    }
}

fn collect_element_tokens(element: &gsx_ast::Element, source: &str, declared: &mut HashMap<&str, (u32, u32)>, tokens: &mut Vec<RawToken>) {
    for attr in &element.attributes {
        let is_event_handler = attr.name.starts_with("on") && attr.name[2..].starts_with(|c: char| c.is_ascii_uppercase());
        let token_type = if is_event_handler { DECORATOR } else { FUNCTION };
        let name_len = attr.name.len();
        tokens.push(RawToken { span: ByteSpan::new(attr.span.start, attr.span.start + name_len), token_type, modifiers: 0 });

        if let Some(gsx_ast::AttrValue::Host(expr)) = &attr.value {
            collect_host_code_tokens(&expr.code, expr.span.start + 1, declared, tokens);
        }
    }
    if let Some(ref_expr) = &element.ref_expr {
        collect_host_code_tokens(&ref_expr.code, ref_expr.span.start + 1, declared, tokens);
    }
    if let Some(ref_key) = &element.ref_key {
        collect_host_code_tokens(&ref_key.code, ref_key.span.start + 1, declared, tokens);
    }
    collect_body_tokens(&element.children, source, declared, tokens);
}

/// Scans one region of raw host-language text (a `{...}` expression or a
/// bare host statement), emitting tokens for declared-name references,
/// string literals (format specifiers split out as `regexp`), numbers,
/// and `true`/`false`/`nil`.
fn collect_host_code_tokens(code: &str, base_offset: usize, declared: &HashMap<&str, (u32, u32)>, tokens: &mut Vec<RawToken>) {
    let bytes = code.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        if b == b'"' {
            let start = i;
            i += 1;
            while i < bytes.len() && bytes[i] != b'"' {
                if bytes[i] == b'\\' {
                    i += 1;
                }
                i += 1;
            }
            i = (i + 1).min(bytes.len());
            collect_string_tokens(&code[start..i], base_offset + start, tokens);
        } else if b.is_ascii_digit() {
            let start = i;
            while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'.' || bytes[i] == b'x') {
                i += 1;
            }
            tokens.push(RawToken { span: ByteSpan::new(base_offset + start, base_offset + i), token_type: NUMBER, modifiers: 0 });
        } else if b.is_ascii_alphabetic() || b == b'_' {
            let start = i;
            while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_') {
                i += 1;
            }
            let word = &code[start..i];
            match word {
                "true" | "false" | "nil" => tokens.push(RawToken { span: ByteSpan::new(base_offset + start, base_offset + i), token_type: NUMBER, modifiers: 0 }),
                _ => {
                    if let Some((token_type, modifiers)) = declared.get(word) {
                        tokens.push(RawToken { span: ByteSpan::new(base_offset + start, base_offset + i), token_type: *token_type, modifiers: *modifiers });
                    }
                }
            }
        } else {
            i += 1;
        }
    }
}

fn collect_string_tokens(literal: &str, base_offset: usize, tokens: &mut Vec<RawToken>) {
    let bytes = literal.as_bytes();
    let mut cursor = 0;
    let mut segment_start = 0;
    while cursor < bytes.len() {
        if bytes[cursor] == b'%' && cursor + 1 < bytes.len() {
            if segment_start < cursor {
                tokens.push(RawToken { span: ByteSpan::new(base_offset + segment_start, base_offset + cursor), token_type: STRING, modifiers: 0 });
            }
            let spec_end = (cursor + 2).min(bytes.len());
            tokens.push(RawToken { span: ByteSpan::new(base_offset + cursor, base_offset + spec_end), token_type: REGEXP, modifiers: 0 });
            cursor = spec_end;
            segment_start = cursor;
        } else {
            cursor += 1;
        }
    }
    if segment_start < bytes.len() {
        tokens.push(RawToken { span: ByteSpan::new(base_offset + segment_start, base_offset + bytes.len()), token_type: STRING, modifiers: 0 });
    }
}

fn collect_keyword_tokens(source: &str, tokens: &mut Vec<RawToken>) {
    let exclude: Vec<ByteSpan> = tokens.iter().map(|t| t.span).collect();
    let mut found = Vec::new();
    for keyword in FIXED_KEYWORDS {
        for start in find_word_occurrences(source, keyword) {
            let span = ByteSpan::new(start, start + keyword.len());
            if !exclude.iter().any(|other| spans_overlap(*other, span)) {
                found.push(span);
            }
        }
    }
    tokens.extend(found.into_iter().map(|span| RawToken { span, token_type: KEYWORD, modifiers: 0 }));
}

fn spans_overlap(a: ByteSpan, b: ByteSpan) -> bool {
    a.start < b.end && b.start < a.end
}

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

fn find_word_occurrences(text: &str, word: &str) -> Vec<usize> {
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

fn encode(mut tokens: Vec<RawToken>, source: &str) -> SemanticTokens {
    tokens.sort_by_key(|t| {
        let pos = gsx_position::WirePosition::from_byte_offset(source, t.span.start);
        (pos.line, pos.character)
    });

    let mut data = Vec::with_capacity(tokens.len());
    let mut prev_line = 0u32;
    let mut prev_char = 0u32;
    for token in &tokens {
        let start = gsx_position::WirePosition::from_byte_offset(source, token.span.start);
        let length = (token.span.end - token.span.start) as u32;

        let delta_line = start.line - prev_line;
        let delta_start = if delta_line == 0 { start.character - prev_char } else { start.character };

        data.push(SemanticToken { delta_line, delta_start, length, token_type: token.token_type, token_modifiers_bitset: token.modifiers });
        prev_line = start.line;
        prev_char = start.character;
    }

    SemanticTokens { result_id: None, data }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn component_and_parameter_declarations_are_tokenized() {
        let source = "package p\n\ntempl Greeter(name string) {\n\t<span>{name}</span>\n}\n";
        let file = gsx_parser::parse(source).file;
        let tokens = semantic_tokens(&file, source);
        assert!(!tokens.data.is_empty());
    }

    #[test]
    fn format_specifier_is_split_from_its_surrounding_string() {
        let source = "package p\n\nfunc label(n int) string {\n\treturn \"\"\n}\n\ntempl Hi() {\n\tcount := tui.NewState(0)\n\t{fmt.Sprintf(\"got %d\", count.Get())}\n}\n";
        let file = gsx_parser::parse(source).file;
        let tokens = semantic_tokens(&file, source);
        assert!(tokens.data.iter().any(|t| t.token_type == REGEXP));
    }

    #[test]
    fn state_variable_declaration_carries_the_readonly_modifier() {
        let source = "package p\n\ntempl Counter() {\n\tcount := tui.NewState(0)\n\t<span>{count.Get()}</span>\n}\n";
        let file = gsx_parser::parse(source).file;
        let tokens = semantic_tokens(&file, source);
        assert!(tokens.data.iter().any(|t| t.token_type == VARIABLE && t.token_modifiers_bitset & READONLY != 0));
    }

    #[test]
    fn keywords_are_tokenized() {
        let source = "package p\n\nimport \"fmt\"\n\ntempl Greeter(name string) {\n\t@if name != \"\" {\n\t\t<span>{name}</span>\n\t}\n}\n";
        let file = gsx_parser::parse(source).file;
        let tokens = semantic_tokens(&file, source);
        let keyword_count = tokens.data.iter().filter(|t| t.token_type == KEYWORD).count();
        assert!(keyword_count >= 3, "expected package/import/templ/@if keyword tokens, got {keyword_count}");
    }

    #[test]
    fn let_binding_name_is_tokenized_past_the_directive_keyword() {
        let source = "package p\n\ntempl Greeter() {\n\t@let item = <span>hi</span>\n}\n";
        let file = gsx_parser::parse(source).file;
        let tokens = semantic_tokens(&file, source);
        let let_pos = source.find("@let").expect("source contains @let");
        let item_pos = source.find("item").expect("source contains item");
        let item_line = gsx_position::WirePosition::from_byte_offset(source, item_pos);

        let mut line = 0u32;
        let mut character = 0u32;
        let mut found = false;
        for token in &tokens.data {
            line += token.delta_line;
            if token.delta_line == 0 {
                character += token.delta_start;
            } else {
                character = token.delta_start;
            }
            if token.token_type == VARIABLE && line == item_line.line && character == item_line.character {
                found = true;
                break;
            }
        }
        assert!(found, "expected a VARIABLE token anchored at {item_pos} (past {let_pos}), not at @let itself");
    }
}
