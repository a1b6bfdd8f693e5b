//! Recursive-descent parser for the GSX hybrid templating DSL.
//!
//! The parser consumes [`gsx_lexer::Lexer`] tokens and produces a
//! [`gsx_ast::ast::ParseOutput`]: a best-effort [`gsx_ast::ast::File`] plus
//! every diagnostic collected along the way. It never aborts on malformed
//! input — unexpected tokens are recorded as [`gsx_error::ParseError`]s and
//! the parser resynchronizes at the nearest recognizable boundary (a `}`,
//! `</`, `@`, or top-level keyword) and keeps going, bounded by a
//! [`gsx_error::ParseBudget`] so adversarial input can't make it loop or
//! recurse forever.
//!
//! Host-language code (Go expressions, statements, types, and whole function
//! bodies) is never tokenized as DSL syntax. Wherever the grammar expects a
//! run of host text the parser calls one of the lexer's balanced-region
//! readers and stores the result verbatim; only the DSL's own structure
//! (components, elements, directives) is actually parsed.

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![cfg_attr(test, allow(clippy::panic, clippy::unwrap_used, clippy::expect_used))]

mod support;

use gsx_ast::ast::{
    AttrValue, Attribute, ChildNode, ChildrenSlot, Comment, CommentGroup, Component, Element,
    ElementLayout, File, ForStmt, HostCode, HostDecl, HostDeclKind, HostExpr, HostFunction,
    IfBranch, IfStmt, Import, LetBinding, Param, ParseOutput, Receiver, TopLevelItem,
};
use gsx_error::{BudgetTracker, ParseBudget, ParseError};
use gsx_lexer::{Keyword, Lexer, Token, TokenKind};
use gsx_position::ByteSpan;

use support::{children_on_one_line, looks_like_host_statement, split_comments, Leading, PositionConverter};

/// Parses `source` with generous, IDE-appropriate budget limits.
///
/// Convenience wrapper around [`Parser::new`] / [`Parser::parse_file`] for
/// callers that don't need to customize the recovery budget.
pub fn parse(source: &str) -> ParseOutput {
    Parser::new(source, ParseBudget::for_ide()).parse_file()
}

/// A recursive-descent parser over one GSX source file.
pub struct Parser<'a> {
    source: &'a str,
    lexer: Lexer<'a>,
    errors: Vec<ParseError>,
    budget: ParseBudget,
    tracker: BudgetTracker,
    pos_conv: PositionConverter,
    terminated_early: bool,
}

impl<'a> Parser<'a> {
    /// Creates a parser over `source`, bounded by `budget`.
    pub fn new(source: &'a str, budget: ParseBudget) -> Self {
        Self {
            source,
            lexer: Lexer::new(source),
            errors: Vec::new(),
            budget,
            tracker: BudgetTracker::new(),
            pos_conv: PositionConverter::new(source),
            terminated_early: false,
        }
    }

    /// Parses the whole file.
    pub fn parse_file(mut self) -> ParseOutput {
        let file = self.parse_file_inner();
        ParseOutput {
            file,
            diagnostics: self.errors,
            budget_usage: self.tracker,
            terminated_early: self.terminated_early,
        }
    }

    // ---- token-stream primitives -----------------------------------------

    /// Consumes and returns the next structural token (comments dropped).
    /// Call sites always `seek` to a known trivia-free position first, so no
    /// comment is ever silently lost through `bump`.
    fn bump(&mut self) -> Token {
        self.lexer.next_token()
    }

    fn error_at(&mut self, span: ByteSpan, message: impl Into<String>) {
        if self.tracker.errors_exhausted(&self.budget) {
            return;
        }
        self.tracker.record_error();
        let start = self.pos_conv.to_dsl(self.source, span.start);
        let err = if span.end > span.start {
            let end = self.pos_conv.to_dsl(self.source, span.end);
            ParseError::new(start, message).with_end(end)
        } else {
            ParseError::new(start, message)
        };
        self.errors.push(err);
    }

    /// Skips tokens until a likely synchronization point (a closing brace,
    /// closing tag, directive, or top-level keyword), without consuming the
    /// sync token itself. Bounded by the recovery and skip budgets.
    fn synchronize(&mut self) {
        if !self.tracker.begin_recovery(&self.budget) {
            self.terminated_early = true;
            return;
        }
        loop {
            if !self.tracker.can_skip_more(&self.budget, 1) {
                self.terminated_early = true;
                break;
            }
            let mut probe = self.lexer;
            let tok = probe.next_token();
            match tok.kind {
                TokenKind::Eof
                | TokenKind::RBrace
                | TokenKind::LtSlash
                | TokenKind::At
                | TokenKind::Keyword(Keyword::Templ)
                | TokenKind::Keyword(Keyword::Func)
                | TokenKind::Keyword(Keyword::Type)
                | TokenKind::Keyword(Keyword::Const)
                | TokenKind::Keyword(Keyword::Var) => break,
                _ => {
                    self.lexer = probe;
                    self.tracker.record_skip(1);
                }
            }
        }
    }

    // ---- file level --------------------------------------------------------

    fn parse_file_inner(&mut self) -> File {
        let mut probe = self.lexer;
        let (raw, tok) = probe.next_token_with_comments();
        let (_, file_leading_comments) = split_comments(raw);
        let Token { kind, span, .. } = tok;

        let (package, package_span) = if matches!(kind, TokenKind::Keyword(Keyword::Package)) {
            self.lexer.seek(span.start);
            self.bump();
            let name_tok = self.bump();
            match name_tok.kind {
                TokenKind::Ident(s) => (Some(s.to_string()), Some(name_tok.span)),
                _ => {
                    self.error_at(name_tok.span, "expected a package name after `package`");
                    (None, None)
                }
            }
        } else {
            self.lexer.seek(span.start);
            (None, None)
        };

        let mut imports: Vec<Import> = Vec::new();
        let mut top_level: Vec<TopLevelItem> = Vec::new();
        let mut orphan_comments: Vec<CommentGroup> = Vec::new();

        enum Last {
            None,
            Import,
            TopLevel,
        }
        let mut last = Last::None;

        loop {
            let mut probe = self.lexer;
            let (raw, tok) = probe.next_token_with_comments();
            let (trailing, leading) = split_comments(raw);
            if let Some(comment) = trailing {
                match last {
                    Last::Import => {
                        if let Some(import) = imports.last_mut() {
                            import.trailing_comments.push(comment);
                        }
                    }
                    _ => orphan_comments.push(CommentGroup { comments: vec![comment], blank_line_before: false }),
                }
            }

            let Token { kind, span, .. } = tok;
            match kind {
                TokenKind::Eof => {
                    if !leading.is_empty() {
                        orphan_comments.push(leading);
                    }
                    break;
                }
                TokenKind::Keyword(Keyword::Import) => {
                    self.lexer.seek(span.start);
                    self.bump();
                    self.parse_import_group(&mut imports);
                    last = Last::Import;
                    if !leading.is_empty() {
                        orphan_comments.push(leading);
                    }
                }
                TokenKind::Keyword(Keyword::Templ) => {
                    self.lexer.seek(span.start);
                    let component = self.parse_component(leading);
                    top_level.push(TopLevelItem::Component(component));
                    last = Last::TopLevel;
                }
                TokenKind::Keyword(Keyword::Func) => {
                    self.lexer.seek(span.start);
                    let function = self.parse_host_function(leading);
                    top_level.push(TopLevelItem::Function(function));
                    last = Last::TopLevel;
                }
                TokenKind::Keyword(Keyword::Type) | TokenKind::Keyword(Keyword::Const) | TokenKind::Keyword(Keyword::Var) => {
                    self.lexer.seek(span.start);
                    let decl = self.parse_host_decl(leading);
                    top_level.push(TopLevelItem::HostDecl(decl));
                    last = Last::TopLevel;
                }
                _ => {
                    self.lexer.seek(span.start);
                    self.error_at(span, "expected `import`, `templ`, `func`, `type`, `const`, or `var` at top level");
                    if !leading.is_empty() {
                        orphan_comments.push(leading);
                    }
                    self.bump();
                    self.synchronize();
                }
            }
        }

        File {
            package,
            package_span,
            imports,
            top_level,
            leading_comments: file_leading_comments,
            orphan_comments,
            span: ByteSpan::new(0, self.source.len()),
        }
    }

    fn parse_import_group(&mut self, imports: &mut Vec<Import>) {
        let mut probe = self.lexer;
        let tok = probe.next_token();
        if !matches!(tok.kind, TokenKind::LParen) {
            self.lexer.seek(tok.span.start);
            let import = self.parse_import_spec();
            imports.push(import);
            return;
        }

        self.lexer.seek(tok.span.start);
        self.bump(); // '('
        loop {
            let mut probe = self.lexer;
            let (raw, tok) = probe.next_token_with_comments();
            let (trailing, _leading) = split_comments(raw);
            if let Some(comment) = trailing {
                if let Some(import) = imports.last_mut() {
                    import.trailing_comments.push(comment);
                }
            }
            match tok.kind {
                TokenKind::RParen => {
                    self.lexer.seek(tok.span.start);
                    self.bump();
                    break;
                }
                TokenKind::Eof => {
                    self.error_at(tok.span, "unterminated import group, expected `)`");
                    break;
                }
                _ => {
                    self.lexer.seek(tok.span.start);
                    let import = self.parse_import_spec();
                    imports.push(import);
                }
            }
        }
    }

    fn parse_import_spec(&mut self) -> Import {
        let start = self.lexer.offset();
        let mut probe = self.lexer;
        let tok = probe.next_token();
        let alias = if let TokenKind::Ident(name) = &tok.kind {
            let name = name.to_string();
            self.lexer.seek(tok.span.start);
            self.bump();
            Some(name)
        } else {
            None
        };
        let path_tok = self.bump();
        let path = match path_tok.kind {
            TokenKind::Str(s) => s.to_string(),
            _ => {
                self.error_at(path_tok.span, "expected an import path string");
                String::new()
            }
        };
        let end = self.lexer.offset();
        Import { path, alias, span: ByteSpan::new(start, end), trailing_comments: Vec::new() }
    }

    // ---- top-level items ----------------------------------------------------

    fn parse_component(&mut self, leading: CommentGroup) -> Component {
        let templ_tok = self.bump(); // 'templ'
        let start = templ_tok.span.start;

        let mut probe = self.lexer;
        let next = probe.next_token();
        let receiver = if matches!(next.kind, TokenKind::LParen) {
            self.lexer.seek(next.span.start);
            Some(self.parse_receiver())
        } else {
            None
        };

        let name_tok = self.bump();
        let (name, name_span) = match name_tok.kind {
            TokenKind::Ident(s) => (s.to_string(), name_tok.span),
            _ => {
                self.error_at(name_tok.span, "expected a component name");
                (String::new(), name_tok.span)
            }
        };

        let params = self.parse_param_list();

        let mut probe = self.lexer;
        let lbrace = probe.next_token();
        let (body, orphan_comments) = if matches!(lbrace.kind, TokenKind::LBrace) {
            self.lexer.seek(lbrace.span.start);
            self.bump();
            self.parse_children(false)
        } else {
            self.error_at(lbrace.span, "expected `{` to start the component body");
            (Vec::new(), Vec::new())
        };

        let end = self.lexer.offset();
        Component { name, name_span, receiver, params, body, span: ByteSpan::new(start, end), leading_comments: leading, orphan_comments }
    }

    fn parse_receiver(&mut self) -> Receiver {
        self.bump(); // '('
        let name_tok = self.bump();
        let name = match name_tok.kind {
            TokenKind::Ident(s) => s.to_string(),
            _ => {
                self.error_at(name_tok.span, "expected a receiver variable name");
                String::new()
            }
        };
        let (type_text, _) = self.lexer.read_until_rparen();
        let rparen = self.bump();
        if !matches!(rparen.kind, TokenKind::RParen) {
            self.error_at(rparen.span, "expected `)` after the receiver type");
        }
        Receiver { name, type_text }
    }

    fn parse_param_list(&mut self) -> Vec<Param> {
        let lparen = self.bump();
        if !matches!(lparen.kind, TokenKind::LParen) {
            self.error_at(lparen.span, "expected `(` to start a parameter list");
            return Vec::new();
        }

        let mut params = Vec::new();
        let mut probe = self.lexer;
        let first = probe.next_token();
        if matches!(first.kind, TokenKind::RParen) {
            self.lexer.seek(first.span.start);
            self.bump();
            return params;
        }

        loop {
            params.push(self.parse_param());
            let mut probe = self.lexer;
            let tok = probe.next_token();
            match tok.kind {
                TokenKind::Comma => {
                    self.lexer.seek(tok.span.start);
                    self.bump();
                    let mut probe = self.lexer;
                    let after_comma = probe.next_token();
                    if matches!(after_comma.kind, TokenKind::RParen) {
                        self.lexer.seek(after_comma.span.start);
                        self.bump();
                        break;
                    }
                }
                TokenKind::RParen => {
                    self.lexer.seek(tok.span.start);
                    self.bump();
                    break;
                }
                TokenKind::Eof => {
                    self.error_at(tok.span, "unterminated parameter list, expected `)`");
                    break;
                }
                _ => {
                    self.error_at(tok.span, "expected `,` or `)` in parameter list");
                    self.lexer.seek(tok.span.start);
                    self.bump();
                    break;
                }
            }
        }
        params
    }

    fn parse_param(&mut self) -> Param {
        let name_tok = self.bump();
        let (name, start) = match name_tok.kind {
            TokenKind::Ident(s) => (s.to_string(), name_tok.span.start),
            _ => {
                self.error_at(name_tok.span, "expected a parameter name");
                (String::new(), name_tok.span.start)
            }
        };
        let (type_text, type_span) = self.lexer.read_until_comma_or_rparen();
        let end = type_span.end.max(start);
        Param { name, type_text, span: ByteSpan::new(start, end) }
    }

    fn parse_host_function(&mut self, leading: CommentGroup) -> HostFunction {
        let func_tok = self.bump(); // 'func'
        let start = func_tok.span.start;

        let name_tok = self.bump();
        let (name, name_span) = match name_tok.kind {
            TokenKind::Ident(s) => (s.to_string(), name_tok.span),
            _ => {
                self.error_at(name_tok.span, "expected a function name");
                (String::new(), name_tok.span)
            }
        };

        let params = self.parse_param_list();

        let mut probe = self.lexer;
        let after_params = probe.next_token();
        let return_type = if matches!(after_params.kind, TokenKind::LBrace) {
            None
        } else {
            let (text, _) = self.lexer.read_until_brace();
            if text.is_empty() { None } else { Some(text) }
        };

        let mut probe = self.lexer;
        let lbrace = probe.next_token();
        let sig_end = lbrace.span.start;
        let signature_text = self.source[start..sig_end].trim_end().to_string();

        let end = if matches!(lbrace.kind, TokenKind::LBrace) {
            self.lexer.seek(lbrace.span.start);
            let (_, _, whole) = self.lexer.read_host_expr();
            whole.end
        } else {
            self.error_at(lbrace.span, "expected `{` to start the function body");
            sig_end
        };

        HostFunction { name, name_span, params, return_type, signature_text, span: ByteSpan::new(start, end), leading_comments: leading }
    }

    fn parse_host_decl(&mut self, leading: CommentGroup) -> HostDecl {
        let mut probe = self.lexer;
        let kw = probe.next_token();
        let kind = match kw.kind {
            TokenKind::Keyword(Keyword::Type) => HostDeclKind::Type,
            TokenKind::Keyword(Keyword::Const) => HostDeclKind::Const,
            _ => HostDeclKind::Var,
        };
        self.lexer.seek(kw.span.start);
        let (code, span) = self.lexer.read_top_level_decl();
        HostDecl { kind, code, span, leading_comments: leading }
    }

    // ---- component / element bodies ----------------------------------------

    /// Parses a sequence of child nodes, stopping at (but not consuming, for
    /// `in_element`) the block's terminator. `in_element` selects whether a
    /// `</` ends the block (element children) or is itself an error
    /// (component/loop/conditional bodies, which always end at `}`).
    fn parse_children(&mut self, in_element: bool) -> (Vec<ChildNode>, Vec<CommentGroup>) {
        if self.tracker.depth_would_exceed(&self.budget) {
            let offset = self.lexer.offset();
            self.error_at(ByteSpan::empty(offset), "maximum nesting depth exceeded");
            self.terminated_early = true;
            return (Vec::new(), Vec::new());
        }
        self.tracker.enter_depth();
        let result = self.parse_children_inner(in_element);
        self.tracker.exit_depth();
        result
    }

    fn parse_children_inner(&mut self, in_element: bool) -> (Vec<ChildNode>, Vec<CommentGroup>) {
        let mut children: Vec<ChildNode> = Vec::new();
        let mut orphans: Vec<CommentGroup> = Vec::new();

        loop {
            let mut probe = self.lexer;
            let (raw, tok) = probe.next_token_with_comments();
            let original_newlines = tok.leading_newlines;
            let (trailing, leading_group) = split_comments(raw);
            if let Some(comment) = trailing {
                attach_trailing(children.last_mut(), comment);
            }

            let Token { kind, span, .. } = tok;
            match kind {
                TokenKind::Eof => {
                    if !leading_group.is_empty() {
                        orphans.push(leading_group);
                    }
                    self.error_at(span, "unexpected end of input inside a block, expected `}`");
                    break;
                }
                TokenKind::RBrace => {
                    if !leading_group.is_empty() {
                        orphans.push(leading_group);
                    }
                    self.lexer.seek(span.start);
                    self.bump();
                    break;
                }
                TokenKind::LtSlash if in_element => {
                    if !leading_group.is_empty() {
                        orphans.push(leading_group);
                    }
                    self.lexer.seek(span.start);
                    break;
                }
                TokenKind::LtSlash => {
                    self.lexer.seek(span.start);
                    self.error_at(span, "unexpected closing tag");
                    self.bump();
                    self.synchronize();
                }
                TokenKind::Lt => {
                    self.lexer.seek(span.start);
                    let leading = Leading { comments: leading_group, newlines: original_newlines };
                    children.push(ChildNode::Element(self.parse_element(leading)));
                }
                TokenKind::LBrace => {
                    self.lexer.seek(span.start);
                    children.push(self.parse_host_expr_or_slot(leading_group.comments));
                }
                TokenKind::At => {
                    self.lexer.seek(span.start);
                    let leading = Leading { comments: leading_group, newlines: original_newlines };
                    children.push(self.parse_directive(leading));
                }
                _ => {
                    self.lexer.seek(span.start);
                    if let Some(node) = self.parse_text_or_hostcode() {
                        children.push(node);
                    }
                }
            }
        }

        (children, orphans)
    }

    fn parse_host_expr_or_slot(&mut self, leading_comments: Vec<Comment>) -> ChildNode {
        let (code, open_brace_span, whole_span) = self.lexer.read_host_expr();
        if code.trim() == "children..." {
            ChildNode::ChildrenSlot(ChildrenSlot { span: whole_span })
        } else {
            ChildNode::HostExpr(HostExpr { code, open_brace_span, span: whole_span, leading_comments, trailing_comments: Vec::new() })
        }
    }

    fn parse_text_or_hostcode(&mut self) -> Option<ChildNode> {
        let (code, span) = self.lexer.read_host_code();
        if code.is_empty() {
            return None;
        }
        if looks_like_host_statement(&code) {
            Some(ChildNode::HostCode(HostCode { code, span }))
        } else {
            Some(ChildNode::Text(gsx_ast::ast::Text { content: code, span }))
        }
    }

    // ---- elements ------------------------------------------------------------

    fn parse_attribute(&mut self) -> Attribute {
        let name_tok = self.bump();
        let (name, start) = match name_tok.kind {
            TokenKind::Ident(s) => (s.to_string(), name_tok.span.start),
            _ => {
                self.error_at(name_tok.span, "expected an attribute name");
                (String::new(), name_tok.span.start)
            }
        };

        let mut probe = self.lexer;
        let eq = probe.next_token();
        let (value, end) = if matches!(eq.kind, TokenKind::Eq) {
            self.lexer.seek(eq.span.start);
            self.bump();
            let mut probe = self.lexer;
            let value_tok = probe.next_token();
            match value_tok.kind {
                TokenKind::Str(s) => {
                    self.lexer.seek(value_tok.span.start);
                    self.bump();
                    (Some(AttrValue::Str(s.to_string())), value_tok.span.end)
                }
                TokenKind::Number(n) => {
                    self.lexer.seek(value_tok.span.start);
                    self.bump();
                    let value = if n.contains('.') {
                        AttrValue::Float(n.parse().unwrap_or(0.0))
                    } else {
                        AttrValue::Int(n.parse().unwrap_or(0))
                    };
                    (Some(value), value_tok.span.end)
                }
                TokenKind::Keyword(Keyword::True) => {
                    self.lexer.seek(value_tok.span.start);
                    self.bump();
                    (Some(AttrValue::Bool(true)), value_tok.span.end)
                }
                TokenKind::Keyword(Keyword::False) => {
                    self.lexer.seek(value_tok.span.start);
                    self.bump();
                    (Some(AttrValue::Bool(false)), value_tok.span.end)
                }
                TokenKind::LBrace => {
                    self.lexer.seek(value_tok.span.start);
                    let (code, open_brace_span, whole_span) = self.lexer.read_host_expr();
                    let host = HostExpr { code, open_brace_span, span: whole_span, leading_comments: Vec::new(), trailing_comments: Vec::new() };
                    (Some(AttrValue::Host(host)), whole_span.end)
                }
                _ => {
                    self.error_at(value_tok.span, "expected an attribute value");
                    (None, value_tok.span.start)
                }
            }
        } else {
            (None, name_tok.span.end)
        };

        Attribute { name, value, span: ByteSpan::new(start, end.max(start)) }
    }

    fn parse_element(&mut self, leading: Leading) -> Element {
        let lt_tok = self.bump(); // '<'
        let start = lt_tok.span.start;

        let tag_tok = self.bump();
        let (tag, tag_span) = match tag_tok.kind {
            TokenKind::Ident(s) => (s.to_string(), tag_tok.span),
            _ => {
                self.error_at(tag_tok.span, "expected an element tag name");
                (String::new(), tag_tok.span)
            }
        };

        let mut attributes = Vec::new();
        let mut attrs_multiline = false;
        let self_closing;
        let closing_bracket_own_line;

        loop {
            let mut probe = self.lexer;
            let tok = probe.next_token();
            match tok.kind {
                TokenKind::SlashGt => {
                    self.lexer.seek(tok.span.start);
                    closing_bracket_own_line = tok.starts_new_line();
                    self.bump();
                    self_closing = true;
                    break;
                }
                TokenKind::Gt => {
                    self.lexer.seek(tok.span.start);
                    closing_bracket_own_line = tok.starts_new_line();
                    self.bump();
                    self_closing = false;
                    break;
                }
                TokenKind::Ident(_) => {
                    if tok.starts_new_line() {
                        attrs_multiline = true;
                    }
                    self.lexer.seek(tok.span.start);
                    attributes.push(self.parse_attribute());
                }
                TokenKind::Eof => {
                    self.error_at(tok.span, "unterminated element tag, expected `>` or `/>`");
                    closing_bracket_own_line = false;
                    self_closing = true;
                    break;
                }
                _ => {
                    self.error_at(tok.span, "unexpected token in element attributes");
                    self.lexer.seek(tok.span.start);
                    self.bump();
                }
            }
        }

        let mut children = Vec::new();
        let mut children_inline = true;
        if !self_closing {
            let (body, _orphans) = self.parse_children(true);
            children_inline = children_on_one_line(&body, self.source);
            children = body;

            let lt_slash = self.bump();
            if !matches!(lt_slash.kind, TokenKind::LtSlash) {
                self.error_at(lt_slash.span, "expected a closing tag");
            }
            let close_name_tok = self.bump();
            match &close_name_tok.kind {
                TokenKind::Ident(s) if **s == tag => {}
                TokenKind::Ident(s) => {
                    self.error_at(close_name_tok.span, format!("mismatched closing tag: expected `</{tag}>`, found `</{s}>`"));
                }
                _ => self.error_at(close_name_tok.span, "expected a closing tag name"),
            }
            let gt_tok = self.bump();
            if !matches!(gt_tok.kind, TokenKind::Gt) {
                self.error_at(gt_tok.span, "expected `>` to close the tag");
            }
        }

        let mut ref_expr = None;
        let mut ref_key = None;
        let mut filtered = Vec::with_capacity(attributes.len());
        for attr in attributes {
            let is_host = matches!(attr.value, Some(AttrValue::Host(_)));
            if attr.name == "ref" && is_host {
                if let Some(AttrValue::Host(h)) = attr.value {
                    ref_expr = Some(h);
                }
                continue;
            }
            if attr.name == "ref_key" && is_host {
                if let Some(AttrValue::Host(h)) = attr.value {
                    ref_key = Some(h);
                }
                continue;
            }
            filtered.push(attr);
        }

        let end = self.lexer.offset();
        Element {
            tag,
            tag_span,
            attributes: filtered,
            ref_expr,
            ref_key,
            children,
            self_closing,
            layout: ElementLayout {
                attrs_multiline,
                closing_bracket_own_line,
                children_inline,
                blank_line_before: leading.blank_before(),
            },
            span: ByteSpan::new(start, end),
            leading_comments: leading.comments,
            trailing_comments: Vec::new(),
        }
    }

    // ---- directives: @for / @if / @let / @Call --------------------------------

    fn parse_directive(&mut self, leading: Leading) -> ChildNode {
        let at_start = self.lexer.offset();
        self.bump(); // '@'
        let mut probe = self.lexer;
        let tok = probe.next_token();
        match tok.kind {
            TokenKind::Keyword(Keyword::For) => ChildNode::For(self.parse_for_stmt(at_start, leading)),
            TokenKind::Keyword(Keyword::If) => ChildNode::If(self.parse_if_stmt(at_start, leading)),
            TokenKind::Keyword(Keyword::Let) => ChildNode::Let(self.parse_let_binding(at_start, leading)),
            TokenKind::Ident(_) => ChildNode::Call(self.parse_comp_call(at_start, leading)),
            _ => {
                self.error_at(tok.span, "expected `for`, `if`, `let`, or a component name after `@`");
                ChildNode::Text(gsx_ast::ast::Text { content: String::new(), span: ByteSpan::new(at_start, self.lexer.offset()) })
            }
        }
    }

    fn parse_for_stmt(&mut self, at_start: usize, leading: Leading) -> ForStmt {
        self.bump(); // 'for'

        let mut probe = self.lexer;
        let first = probe.next_token();
        let (index_name, value_name) = if let TokenKind::Ident(name1) = &first.kind {
            let name1 = name1.to_string();
            self.lexer.seek(first.span.start);
            self.bump();
            let mut probe = self.lexer;
            let after = probe.next_token();
            if matches!(after.kind, TokenKind::Comma) {
                self.lexer.seek(after.span.start);
                self.bump();
                let value_tok = self.bump();
                let value_name = match value_tok.kind {
                    TokenKind::Ident(s) => s.to_string(),
                    _ => {
                        self.error_at(value_tok.span, "expected a loop value name after `,`");
                        String::new()
                    }
                };
                (Some(name1), value_name)
            } else {
                (None, name1)
            }
        } else {
            self.error_at(first.span, "expected a loop variable name after `@for`");
            (None, String::new())
        };

        let colon_eq = self.bump();
        if !matches!(colon_eq.kind, TokenKind::ColonEq) {
            self.error_at(colon_eq.span, "expected `:=` in `@for`");
        }
        let range_kw = self.bump();
        if !matches!(range_kw.kind, TokenKind::Keyword(Keyword::Range)) {
            self.error_at(range_kw.span, "expected `range` in `@for`");
        }

        let (iterable_text, _) = self.lexer.read_until_brace();

        let mut probe = self.lexer;
        let lbrace = probe.next_token();
        let body = if matches!(lbrace.kind, TokenKind::LBrace) {
            self.lexer.seek(lbrace.span.start);
            self.bump();
            self.parse_children(false).0
        } else {
            self.error_at(lbrace.span, "expected `{` to start the loop body");
            Vec::new()
        };

        let end = self.lexer.offset();
        ForStmt {
            index_name,
            value_name,
            iterable_text,
            body,
            span: ByteSpan::new(at_start, end),
            blank_line_before: leading.blank_before(),
            leading_comments: leading.comments,
        }
    }

    fn parse_if_stmt(&mut self, at_start: usize, leading: Leading) -> IfStmt {
        self.bump(); // 'if'
        let (condition_text, _) = self.lexer.read_until_brace();

        let mut probe = self.lexer;
        let lbrace = probe.next_token();
        let then_body = if matches!(lbrace.kind, TokenKind::LBrace) {
            self.lexer.seek(lbrace.span.start);
            self.bump();
            self.parse_children(false).0
        } else {
            self.error_at(lbrace.span, "expected `{` to start the `@if` body");
            Vec::new()
        };

        let else_branch = self.try_parse_else();

        let end = self.lexer.offset();
        IfStmt {
            condition_text,
            then_body,
            else_branch,
            span: ByteSpan::new(at_start, end),
            blank_line_before: leading.blank_before(),
            leading_comments: leading.comments,
        }
    }

    fn try_parse_else(&mut self) -> Option<IfBranch> {
        // `self.lexer` is left untouched by the probing below (only clones
        // are advanced), so returning `None` from either check below leaves
        // it exactly where it was — right after the `then`-branch's closing
        // `}` — letting the caller's next `next_token_with_comments` pick up
        // any intervening comments fresh rather than skipping past them.
        let mut probe = self.lexer;
        let (_raw, at_tok) = probe.next_token_with_comments();
        if !matches!(at_tok.kind, TokenKind::At) {
            return None;
        }

        let mut probe2 = probe;
        probe2.seek(at_tok.span.start);
        probe2.next_token(); // consume '@' on the probe only
        let else_tok = probe2.next_token();
        if !matches!(else_tok.kind, TokenKind::Keyword(Keyword::Else)) {
            // Not an `@else` — this `@` belongs to the next sibling node.
            return None;
        }

        self.lexer.seek(at_tok.span.start);
        self.bump(); // '@'
        self.bump(); // 'else'

        let mut probe = self.lexer;
        let after_else = probe.next_token();
        match after_else.kind {
            TokenKind::At => {
                self.lexer.seek(after_else.span.start);
                let nested_at_start = self.lexer.offset();
                self.bump(); // '@'
                let mut probe = self.lexer;
                let if_tok = probe.next_token();
                if matches!(if_tok.kind, TokenKind::Keyword(Keyword::If)) {
                    let empty_leading = Leading { comments: CommentGroup::default(), newlines: 0 };
                    Some(IfBranch::ElseIf(Box::new(self.parse_if_stmt(nested_at_start, empty_leading))))
                } else {
                    self.error_at(if_tok.span, "expected `if` after `@else @`");
                    None
                }
            }
            TokenKind::LBrace => {
                self.lexer.seek(after_else.span.start);
                self.bump();
                Some(IfBranch::Else(self.parse_children(false).0))
            }
            _ => {
                self.error_at(after_else.span, "expected `{` or `@if` after `@else`");
                None
            }
        }
    }

    fn parse_let_binding(&mut self, at_start: usize, leading: Leading) -> LetBinding {
        self.bump(); // 'let'
        let name_tok = self.bump();
        let name = match name_tok.kind {
            TokenKind::Ident(s) => s.to_string(),
            _ => {
                self.error_at(name_tok.span, "expected a binding name after `@let`");
                String::new()
            }
        };
        let eq_tok = self.bump();
        if !matches!(eq_tok.kind, TokenKind::Eq) {
            self.error_at(eq_tok.span, "expected `=` in `@let`");
        }

        let mut probe = self.lexer;
        let lt = probe.next_token();
        let element = if matches!(lt.kind, TokenKind::Lt) {
            self.lexer.seek(lt.span.start);
            let empty_leading = Leading { comments: CommentGroup::default(), newlines: 0 };
            Box::new(self.parse_element(empty_leading))
        } else {
            self.error_at(lt.span, "expected an element after `@let … =`");
            Box::new(placeholder_element(lt.span.start))
        };

        let end = self.lexer.offset();
        LetBinding { name, element, span: ByteSpan::new(at_start, end), blank_line_before: leading.blank_before() }
    }

    fn parse_comp_call(&mut self, at_start: usize, leading: Leading) -> gsx_ast::ast::CompCall {
        let callee_tok = self.bump();
        let (callee, callee_span) = match callee_tok.kind {
            TokenKind::Ident(s) => (s.to_string(), callee_tok.span),
            _ => {
                self.error_at(callee_tok.span, "expected a component name");
                (String::new(), callee_tok.span)
            }
        };

        let mut probe = self.lexer;
        let lparen = probe.next_token();
        let arg_text = if matches!(lparen.kind, TokenKind::LParen) {
            self.lexer.seek(lparen.span.start);
            self.lexer.read_paren_balanced().0
        } else {
            self.error_at(lparen.span, "expected `(` after the component call name");
            String::new()
        };

        let mut probe = self.lexer;
        let lbrace = probe.next_token();
        let body = if matches!(lbrace.kind, TokenKind::LBrace) {
            self.lexer.seek(lbrace.span.start);
            self.bump();
            self.parse_children(false).0
        } else {
            self.lexer.seek(lbrace.span.start);
            Vec::new()
        };

        let end = self.lexer.offset();
        gsx_ast::ast::CompCall {
            callee,
            callee_span,
            arg_text,
            body,
            span: ByteSpan::new(at_start, end),
            blank_line_before: leading.blank_before(),
            leading_comments: leading.comments,
        }
    }
}

fn attach_trailing(last_child: Option<&mut ChildNode>, comment: Comment) {
    match last_child {
        Some(ChildNode::Element(e)) => e.trailing_comments.push(comment),
        Some(ChildNode::HostExpr(e)) => e.trailing_comments.push(comment),
        _ => {}
    }
}

fn placeholder_element(at: usize) -> Element {
    Element {
        tag: String::new(),
        tag_span: ByteSpan::empty(at),
        attributes: Vec::new(),
        ref_expr: None,
        ref_key: None,
        children: Vec::new(),
        self_closing: true,
        layout: ElementLayout::default(),
        span: ByteSpan::empty(at),
        leading_comments: CommentGroup::default(),
        trailing_comments: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gsx_ast::ast::{AttrValue, ChildNode, HostDeclKind};

    #[test]
    fn parses_package_and_imports() {
        let src = r#"
package main

import "fmt"
import (
    tui "acme/tui"
    "acme/state"
)

templ Hello() {
    <div>hi</div>
}
"#;
        let out = parse(src);
        assert!(out.diagnostics.is_empty(), "unexpected diagnostics: {:?}", out.diagnostics);
        assert_eq!(out.file.package.as_deref(), Some("main"));
        assert_eq!(out.file.imports.len(), 3);
        assert_eq!(out.file.imports[0].path, "fmt");
        assert_eq!(out.file.imports[1].alias.as_deref(), Some("tui"));
        assert_eq!(out.file.imports[2].path, "acme/state");
    }

    #[test]
    fn parses_component_with_params_and_element_children() {
        let src = r#"
templ Greeting(name string, count int) {
    <div class="card" disabled>
        <span>Hello, {name}!</span>
    </div>
}
"#;
        let out = parse(src);
        assert!(out.diagnostics.is_empty(), "unexpected diagnostics: {:?}", out.diagnostics);
        let comp = out.file.find_component("Greeting").expect("component");
        assert_eq!(comp.params.len(), 2);
        assert_eq!(comp.params[0].name, "name");
        assert_eq!(comp.params[0].type_text, "string");
        assert_eq!(comp.body.len(), 1);
        let ChildNode::Element(div) = &comp.body[0] else { panic!("expected element") };
        assert_eq!(div.tag, "div");
        assert_eq!(div.attributes.len(), 1);
        assert_eq!(div.attributes[0].name, "class");
        assert!(matches!(div.attributes[0].value, Some(AttrValue::Str(ref s)) if s == "card"));
        assert_eq!(div.children.len(), 1);
    }

    #[test]
    fn extracts_ref_and_ref_key_attributes() {
        let src = r#"
templ Item() {
    <li ref={r} ref_key={k} class="row" />
}
"#;
        let out = parse(src);
        assert!(out.diagnostics.is_empty());
        let comp = out.file.find_component("Item").unwrap();
        let ChildNode::Element(li) = &comp.body[0] else { panic!("expected element") };
        assert!(li.ref_expr.is_some());
        assert!(li.ref_key.is_some());
        assert_eq!(li.attributes.len(), 1);
        assert_eq!(li.attributes[0].name, "class");
    }

    #[test]
    fn parses_for_if_let_and_call_directives() {
        let src = r#"
templ List(items []Item) {
    @for i, item := range items {
        @if item.Active {
            <span>{item.Name}</span>
        } @else {
            <span>inactive</span>
        }
    }
    @let row = <div class="row" />
    @Badge(count)
}
"#;
        let out = parse(src);
        assert!(out.diagnostics.is_empty(), "unexpected diagnostics: {:?}", out.diagnostics);
        let comp = out.file.find_component("List").unwrap();
        assert_eq!(comp.body.len(), 3);

        let ChildNode::For(for_stmt) = &comp.body[0] else { panic!("expected for") };
        assert_eq!(for_stmt.index_name.as_deref(), Some("i"));
        assert_eq!(for_stmt.value_name, "item");
        assert_eq!(for_stmt.iterable_text, "items");
        assert_eq!(for_stmt.body.len(), 1);

        let ChildNode::If(if_stmt) = &for_stmt.body[0] else { panic!("expected if") };
        assert_eq!(if_stmt.condition_text, "item.Active");
        assert!(matches!(if_stmt.else_branch, Some(IfBranch::Else(_))));

        let ChildNode::Let(let_binding) = &comp.body[1] else { panic!("expected let") };
        assert_eq!(let_binding.name, "row");
        assert_eq!(let_binding.element.tag, "div");

        let ChildNode::Call(call) = &comp.body[2] else { panic!("expected call") };
        assert_eq!(call.callee, "Badge");
        assert_eq!(call.arg_text, "count");
    }

    #[test]
    fn parses_chained_else_if() {
        let src = r#"
templ Status(n int) {
    @if n == 0 {
        <span>zero</span>
    } @else @if n == 1 {
        <span>one</span>
    } @else {
        <span>many</span>
    }
}
"#;
        let out = parse(src);
        assert!(out.diagnostics.is_empty(), "unexpected diagnostics: {:?}", out.diagnostics);
        let comp = out.file.find_component("Status").unwrap();
        let ChildNode::If(outer) = &comp.body[0] else { panic!("expected if") };
        let Some(IfBranch::ElseIf(inner)) = &outer.else_branch else { panic!("expected chained else-if") };
        assert_eq!(inner.condition_text, "n == 1");
        assert!(matches!(inner.else_branch, Some(IfBranch::Else(_))));
    }

    #[test]
    fn distinguishes_host_code_from_text() {
        let src = r#"
templ Counter() {
    count := tui.NewState(0)
    Hello there
    <span>{count}</span>
}
"#;
        let out = parse(src);
        assert!(out.diagnostics.is_empty(), "unexpected diagnostics: {:?}", out.diagnostics);
        let comp = out.file.find_component("Counter").unwrap();
        let ChildNode::HostCode(code) = &comp.body[0] else { panic!("expected host code, got {:?}", comp.body[0]) };
        assert_eq!(code.code, "count := tui.NewState(0)");
        let ChildNode::Text(text) = &comp.body[1] else { panic!("expected text, got {:?}", comp.body[1]) };
        assert_eq!(text.content, "Hello there");
    }

    #[test]
    fn recognizes_children_slot_sentinel() {
        let src = r#"
templ Card() {
    <div>{children...}</div>
}
"#;
        let out = parse(src);
        assert!(out.diagnostics.is_empty());
        let comp = out.file.find_component("Card").unwrap();
        let ChildNode::Element(div) = &comp.body[0] else { panic!("expected element") };
        assert!(matches!(div.children[0], ChildNode::ChildrenSlot(_)));
    }

    #[test]
    fn parses_receiver_style_component() {
        let src = r#"
templ (p *Page) Render() {
    <div>{p.Title}</div>
}
"#;
        let out = parse(src);
        assert!(out.diagnostics.is_empty(), "unexpected diagnostics: {:?}", out.diagnostics);
        let comp = out.file.find_component("Render").unwrap();
        let receiver = comp.receiver.as_ref().expect("receiver");
        assert_eq!(receiver.name, "p");
        assert_eq!(receiver.type_text, "*Page");
    }

    #[test]
    fn skips_host_function_body_but_keeps_signature() {
        let src = r#"
func helper(x int) string {
    if x > 0 {
        return "positive"
    }
    return "non-positive"
}
"#;
        let out = parse(src);
        assert!(out.diagnostics.is_empty(), "unexpected diagnostics: {:?}", out.diagnostics);
        let function = out.file.find_function("helper").unwrap();
        assert_eq!(function.return_type.as_deref(), Some("string"));
        assert_eq!(function.signature_text, "func helper(x int) string");
    }

    #[test]
    fn parses_top_level_host_decls() {
        let src = r#"
type Item struct {
    Name string
}

const MaxItems = 10

var globalCounter int
"#;
        let out = parse(src);
        assert!(out.diagnostics.is_empty(), "unexpected diagnostics: {:?}", out.diagnostics);
        let decls: Vec<_> = out.file.host_decls().collect();
        assert_eq!(decls.len(), 3);
        assert_eq!(decls[0].kind, HostDeclKind::Type);
        assert_eq!(decls[1].kind, HostDeclKind::Const);
        assert_eq!(decls[2].kind, HostDeclKind::Var);
        assert!(decls[0].code.starts_with("type Item struct"));
    }

    #[test]
    fn attaches_leading_and_trailing_comments() {
        let src = r#"
// Leading doc comment
templ Hello() {
    <div>hi</div> // trailing note

    // orphaned before close
}
"#;
        let out = parse(src);
        assert!(out.diagnostics.is_empty(), "unexpected diagnostics: {:?}", out.diagnostics);
        let comp = out.file.find_component("Hello").unwrap();
        assert_eq!(comp.leading_comments.comments.len(), 1);
        let ChildNode::Element(div) = &comp.body[0] else { panic!("expected element") };
        assert_eq!(div.trailing_comments.len(), 1);
        assert_eq!(comp.orphan_comments.len(), 1);
        assert!(comp.orphan_comments[0].blank_line_before);
    }

    #[test]
    fn mismatched_closing_tag_is_recorded_as_an_error() {
        let src = r#"
templ Broken() {
    <div>oops</span>
}
"#;
        let out = parse(src);
        assert!(!out.diagnostics.is_empty());
    }

    #[test]
    fn budget_limits_bound_pathological_nesting() {
        let mut src = String::from("templ Deep() {\n");
        for _ in 0..10 {
            src.push_str("<a>");
        }
        for _ in 0..10 {
            src.push_str("</a>");
        }
        src.push_str("\n}\n");
        let budget = ParseBudget { max_depth: 3, ..ParseBudget::default() };
        let out = Parser::new(&src, budget).parse_file();
        assert!(out.has_errors());
    }

    #[test]
    fn recovers_from_stray_token_at_top_level() {
        let src = r#"
$$$
templ Ok() {
    <div>fine</div>
}
"#;
        let out = parse(src);
        assert!(out.has_errors());
        assert!(out.file.find_component("Ok").is_some());
    }
}
