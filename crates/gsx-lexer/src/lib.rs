//! Single-pass lexer for the GSX hybrid templating DSL.
//!
//! GSX embeds host-language (Go) expressions and statements inside an
//! HTML-like component syntax. The lexer handles the DSL's own punctuation,
//! `@`-directives, identifiers, literals, and comments; it deliberately does
//! **not** lex embedded host-language code as DSL tokens. Instead the parser
//! calls one of the balanced-region readers ([`Lexer::read_host_expr`],
//! [`Lexer::read_paren_balanced`], [`Lexer::read_until_brace`],
//! [`Lexer::read_host_code`]) exactly when the grammar expects a run of raw
//! host-language text, and the lexer hands back that text verbatim along
//! with its span.
//!
//! Every byte of the source ends up in exactly one of: a token's text, a
//! token's interior (string/comment body), or interstitial whitespace. The
//! lexer never fails — unrecognized bytes become [`TokenKind::Unknown`] so
//! the parser can report a precise diagnostic and resynchronize.

pub mod token;

pub use token::{Keyword, Token, TokenKind};

use gsx_position::ByteSpan;

/// A single-pass, position-preserving lexer over GSX source text.
///
/// Cheap to clone (it's just a source reference and a cursor), which lets
/// callers speculatively peek ahead — clone, advance the clone, inspect,
/// then discard it — without disturbing the real cursor.
#[derive(Clone, Copy)]
pub struct Lexer<'a> {
    source: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Lexer<'a> {
    /// Creates a lexer over `source`.
    pub fn new(source: &'a str) -> Self {
        Self { source, bytes: source.as_bytes(), pos: 0 }
    }

    /// The current byte offset.
    pub fn offset(&self) -> usize {
        self.pos
    }

    /// Resets the lexer to read from `offset`. Used by the parser to
    /// re-enter structural tokenization after a raw-text capture.
    pub fn seek(&mut self, offset: usize) {
        self.pos = offset.min(self.bytes.len());
    }

    fn at_eof(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    fn byte_at(&self, offset: usize) -> Option<u8> {
        self.bytes.get(offset).copied()
    }

    fn cur(&self) -> Option<u8> {
        self.byte_at(self.pos)
    }

    fn peek_at(&self, ahead: usize) -> Option<u8> {
        self.byte_at(self.pos + ahead)
    }

    fn advance(&mut self) {
        self.pos += 1;
    }

    /// Skips whitespace and comments, returning the number of newlines
    /// consumed and any comments seen, in source order.
    fn skip_trivia(&mut self) -> (u32, Vec<Token>) {
        let mut newlines = 0u32;
        let mut comments = Vec::new();
        loop {
            match self.cur() {
                Some(b' ') | Some(b'\t') | Some(b'\r') => self.advance(),
                Some(b'\n') => {
                    newlines += 1;
                    self.advance();
                }
                Some(b'/') if self.peek_at(1) == Some(b'/') => {
                    let start = self.pos;
                    while !self.at_eof() && self.cur() != Some(b'\n') {
                        self.advance();
                    }
                    let text = &self.source[start..self.pos];
                    comments.push(Token {
                        kind: TokenKind::LineComment(text.into()),
                        span: ByteSpan::new(start, self.pos),
                        leading_newlines: newlines,
                    });
                    newlines = 0;
                }
                Some(b'/') if self.peek_at(1) == Some(b'*') => {
                    let start = self.pos;
                    self.advance();
                    self.advance();
                    while !self.at_eof()
                        && !(self.cur() == Some(b'*') && self.peek_at(1) == Some(b'/'))
                    {
                        if self.cur() == Some(b'\n') {
                            newlines += 1;
                        }
                        self.advance();
                    }
                    if !self.at_eof() {
                        self.advance();
                        self.advance();
                    }
                    let text = &self.source[start..self.pos];
                    comments.push(Token {
                        kind: TokenKind::BlockComment(text.into()),
                        span: ByteSpan::new(start, self.pos),
                        leading_newlines: 0,
                    });
                }
                _ => break,
            }
        }
        (newlines, comments)
    }

    /// Returns every comment encountered while skipping trivia before the
    /// next structural token, along with that token. Callers that need
    /// comment attachment should prefer this over [`Lexer::next_token`].
    pub fn next_token_with_comments(&mut self) -> (Vec<Token>, Token) {
        let (newlines, comments) = self.skip_trivia();
        let mut tok = self.lex_one();
        tok.leading_newlines = newlines;
        (comments, tok)
    }

    /// Produces the next structural DSL token, skipping whitespace and
    /// comments (comments are dropped; use
    /// [`Lexer::next_token_with_comments`] to keep them).
    pub fn next_token(&mut self) -> Token {
        self.next_token_with_comments().1
    }

    fn lex_one(&mut self) -> Token {
        let start = self.pos;
        let Some(c) = self.cur() else {
            return Token { kind: TokenKind::Eof, span: ByteSpan::new(start, start), leading_newlines: 0 };
        };

        macro_rules! single {
            ($kind:expr) => {{
                self.advance();
                Token { kind: $kind, span: ByteSpan::new(start, self.pos), leading_newlines: 0 }
            }};
        }

        match c {
            b'<' => {
                if self.peek_at(1) == Some(b'/') {
                    self.advance();
                    self.advance();
                    Token { kind: TokenKind::LtSlash, span: ByteSpan::new(start, self.pos), leading_newlines: 0 }
                } else {
                    single!(TokenKind::Lt)
                }
            }
            b'>' => single!(TokenKind::Gt),
            b'/' if self.peek_at(1) == Some(b'>') => {
                self.advance();
                self.advance();
                Token { kind: TokenKind::SlashGt, span: ByteSpan::new(start, self.pos), leading_newlines: 0 }
            }
            b'{' => single!(TokenKind::LBrace),
            b'}' => single!(TokenKind::RBrace),
            b'(' => single!(TokenKind::LParen),
            b')' => single!(TokenKind::RParen),
            b',' => single!(TokenKind::Comma),
            b'@' => single!(TokenKind::At),
            b':' if self.peek_at(1) == Some(b'=') => {
                self.advance();
                self.advance();
                Token { kind: TokenKind::ColonEq, span: ByteSpan::new(start, self.pos), leading_newlines: 0 }
            }
            b'=' => single!(TokenKind::Eq),
            b'.' if !self.peek_at(1).is_some_and(|b| b.is_ascii_digit()) => single!(TokenKind::Dot),
            b'"' => self.lex_string(start),
            b'0'..=b'9' => self.lex_number(start),
            b'.' => self.lex_number(start),
            _ if is_ident_start(c) => self.lex_ident_or_keyword(start),
            _ => {
                // Consume one UTF-8 scalar value so multi-byte garbage
                // does not get sliced mid-codepoint.
                let rest = &self.source[self.pos..];
                let ch_len = rest.chars().next().map(char::len_utf8).unwrap_or(1);
                self.pos += ch_len;
                let text = &self.source[start..self.pos];
                Token {
                    kind: TokenKind::Unknown(text.into()),
                    span: ByteSpan::new(start, self.pos),
                    leading_newlines: 0,
                }
            }
        }
    }

    fn lex_string(&mut self, start: usize) -> Token {
        self.advance(); // opening quote
        let mut value = String::new();
        loop {
            match self.cur() {
                None => break,
                Some(b'"') => {
                    self.advance();
                    break;
                }
                Some(b'\\') => {
                    self.advance();
                    match self.cur() {
                        Some(b'n') => value.push('\n'),
                        Some(b't') => value.push('\t'),
                        Some(b'r') => value.push('\r'),
                        Some(b'"') => value.push('"'),
                        Some(b'\\') => value.push('\\'),
                        Some(_) => {
                            let rest = &self.source[self.pos..];
                            if let Some(ch) = rest.chars().next() {
                                value.push(ch);
                            }
                        }
                        None => {}
                    }
                    if !self.at_eof() {
                        let rest = &self.source[self.pos..];
                        let ch_len = rest.chars().next().map(char::len_utf8).unwrap_or(1);
                        self.pos += ch_len;
                    }
                }
                Some(_) => {
                    let rest = &self.source[self.pos..];
                    let ch = rest.chars().next().unwrap_or('\u{FFFD}');
                    value.push(ch);
                    self.pos += ch.len_utf8();
                }
            }
        }
        Token {
            kind: TokenKind::Str(value.into()),
            span: ByteSpan::new(start, self.pos),
            leading_newlines: 0,
        }
    }

    fn lex_number(&mut self, start: usize) -> Token {
        while self.cur().is_some_and(|b| b.is_ascii_digit()) {
            self.advance();
        }
        if self.cur() == Some(b'.') && self.peek_at(1).is_some_and(|b| b.is_ascii_digit()) {
            self.advance();
            while self.cur().is_some_and(|b| b.is_ascii_digit()) {
                self.advance();
            }
        }
        let text = &self.source[start..self.pos];
        Token {
            kind: TokenKind::Number(text.into()),
            span: ByteSpan::new(start, self.pos),
            leading_newlines: 0,
        }
    }

    fn lex_ident_or_keyword(&mut self, start: usize) -> Token {
        while self.cur().is_some_and(is_ident_continue) {
            self.advance();
        }
        let text = &self.source[start..self.pos];
        let kind = match text {
            "true" => TokenKind::Keyword(Keyword::True),
            "false" => TokenKind::Keyword(Keyword::False),
            _ => match Keyword::lookup(text) {
                Some(kw) => TokenKind::Keyword(kw),
                None => TokenKind::Ident(text.into()),
            },
        };
        Token { kind, span: ByteSpan::new(start, self.pos), leading_newlines: 0 }
    }

    /// Scans literal text content (an element's children, between tags)
    /// until the next `<`, `{`, or `@`, or end of input. Returns the raw
    /// text (not trimmed — callers decide how to treat surrounding
    /// whitespace) and its span. Leaves the lexer positioned at the
    /// stopping character.
    pub fn read_text(&mut self) -> (String, ByteSpan) {
        let start = self.pos;
        self.pos = memchr::memchr3(b'<', b'{', b'@', &self.bytes[start..])
            .map(|rel| start + rel)
            .unwrap_or(self.bytes.len());
        (self.source[start..self.pos].to_string(), ByteSpan::new(start, self.pos))
    }

    /// Reads a brace-balanced host-expression region. Must be called with
    /// the lexer positioned exactly at the opening `{`. Returns the code
    /// between the braces (exclusive), the span of just the opening `{`,
    /// and the span of the whole `{...}` region. Braces inside double- or
    /// back-quoted strings and rune literals are ignored when balancing.
    pub fn read_host_expr(&mut self) -> (String, ByteSpan, ByteSpan) {
        let region_start = self.pos;
        let open_brace_span = ByteSpan::new(self.pos, self.pos + 1);
        self.advance(); // consume '{'
        let code_start = self.pos;
        let mut depth = 1i32;
        while !self.at_eof() && depth > 0 {
            match self.cur() {
                Some(b'{') => {
                    depth += 1;
                    self.advance();
                }
                Some(b'}') => {
                    depth -= 1;
                    self.advance();
                }
                Some(b'"') | Some(b'`') => self.skip_host_string(self.cur().unwrap()),
                Some(b'\'') => self.skip_host_rune(),
                Some(b'/') if self.peek_at(1) == Some(b'/') => {
                    while !self.at_eof() && self.cur() != Some(b'\n') {
                        self.advance();
                    }
                }
                Some(b'/') if self.peek_at(1) == Some(b'*') => {
                    self.advance();
                    self.advance();
                    while !self.at_eof()
                        && !(self.cur() == Some(b'*') && self.peek_at(1) == Some(b'/'))
                    {
                        self.advance();
                    }
                    if !self.at_eof() {
                        self.advance();
                        self.advance();
                    }
                }
                _ => self.advance_utf8(),
            }
        }
        let code_end = if depth == 0 { self.pos - 1 } else { self.pos };
        let code = self.source[code_start..code_end].to_string();
        (code, open_brace_span, ByteSpan::new(region_start, self.pos))
    }

    /// Reads a paren-balanced argument list. Must be called with the
    /// lexer positioned exactly at the opening `(`. Returns the text
    /// between the parens (exclusive) and the span of the whole
    /// `(...)` region.
    pub fn read_paren_balanced(&mut self) -> (String, ByteSpan) {
        let region_start = self.pos;
        self.advance(); // consume '('
        let text_start = self.pos;
        let mut depth = 1i32;
        while !self.at_eof() && depth > 0 {
            match self.cur() {
                Some(b'(') => {
                    depth += 1;
                    self.advance();
                }
                Some(b')') => {
                    depth -= 1;
                    self.advance();
                }
                Some(b'"') | Some(b'`') => self.skip_host_string(self.cur().unwrap()),
                Some(b'\'') => self.skip_host_rune(),
                _ => self.advance_utf8(),
            }
        }
        let text_end = if depth == 0 { self.pos - 1 } else { self.pos };
        (self.source[text_start..text_end].to_string(), ByteSpan::new(region_start, self.pos))
    }

    /// Scans raw host-language expression text (a `@for` iterable or
    /// `@if` condition) up to, but not including, the next top-level `{`.
    /// Parens/brackets/braces encountered along the way are balanced so a
    /// composite literal or nested call doesn't trigger an early stop;
    /// string and rune literals are skipped outright. Leaves the lexer
    /// positioned just before the terminating `{`.
    pub fn read_until_brace(&mut self) -> (String, ByteSpan) {
        let (raw, span) = self.read_balanced_raw(b'{');
        Self::trim_span(&raw, span)
    }

    /// Scans raw host-language text up to, but not including, the next
    /// top-level `)` — used to capture a receiver's or parameter's type
    /// text once its name has already been consumed. Parens/brackets/
    /// braces nested inside the type (e.g. a function-typed parameter)
    /// are balanced so they don't trigger an early stop.
    pub fn read_until_rparen(&mut self) -> (String, ByteSpan) {
        let (raw, span) = self.read_balanced_raw(b')');
        Self::trim_span(&raw, span)
    }

    fn read_balanced_raw(&mut self, terminator: u8) -> (String, ByteSpan) {
        self.read_balanced_raw_any(&[terminator])
    }

    fn read_balanced_raw_any(&mut self, terminators: &[u8]) -> (String, ByteSpan) {
        let start = self.pos;
        let mut depth = 0i32;
        loop {
            match self.cur() {
                None => break,
                Some(c) if depth == 0 && terminators.contains(&c) => break,
                Some(b'{') | Some(b'(') | Some(b'[') => {
                    depth += 1;
                    self.advance();
                }
                Some(b'}') | Some(b')') | Some(b']') => {
                    depth -= 1;
                    self.advance();
                }
                Some(c @ b'"') | Some(c @ b'`') => self.skip_host_string(c),
                Some(b'\'') => self.skip_host_rune(),
                _ => self.advance_utf8(),
            }
        }
        (self.source[start..self.pos].to_string(), ByteSpan::new(start, self.pos))
    }

    /// Scans raw host-language text up to, but not including, the next
    /// top-level `,` or `)`, whichever comes first — used to capture one
    /// parameter's type text in a parameter list, where the type itself may
    /// contain nested parens/brackets/braces (e.g. a function-typed
    /// parameter) that must not trigger an early stop.
    pub fn read_until_comma_or_rparen(&mut self) -> (String, ByteSpan) {
        let (raw, span) = self.read_balanced_raw_any(&[b',', b')']);
        Self::trim_span(&raw, span)
    }

    fn trim_span(raw: &str, span: ByteSpan) -> (String, ByteSpan) {
        let trimmed = raw.trim();
        let lead = raw.len() - raw.trim_start().len();
        let new_start = span.start + lead;
        (trimmed.to_string(), ByteSpan::new(new_start, new_start + trimmed.len()))
    }

    /// Scans a run of verbatim host-code statement text at a body
    /// position, stopping before the next DSL construct (`<tag`, `@`
    /// directive, or the enclosing block's closing `}`). Brace/paren/
    /// bracket nesting from the host code itself is balanced so a
    /// multi-line `if`/`for` in the host language doesn't trigger an
    /// early stop; string and rune literals are skipped outright.
    pub fn read_host_code(&mut self) -> (String, ByteSpan) {
        let raw_start = self.pos;
        let mut depth = 0i32;
        loop {
            match self.cur() {
                None => break,
                Some(b'}') if depth == 0 => break,
                Some(b'@') if depth == 0 => break,
                Some(b'<') if depth == 0 && self.looks_like_tag_start() => break,
                Some(b'{') => {
                    depth += 1;
                    self.advance();
                }
                Some(b'}') | Some(b')') | Some(b']') => {
                    depth -= 1;
                    self.advance();
                }
                Some(b'(') | Some(b'[') => {
                    depth += 1;
                    self.advance();
                }
                Some(b'"') | Some(b'`') => self.skip_host_string(self.cur().unwrap()),
                Some(b'\'') => self.skip_host_rune(),
                Some(b'/') if self.peek_at(1) == Some(b'/') => {
                    while !self.at_eof() && self.cur() != Some(b'\n') {
                        self.advance();
                    }
                }
                _ => self.advance_utf8(),
            }
        }
        let raw = &self.source[raw_start..self.pos];
        let trimmed_start_offset = raw.len() - raw.trim_start().len();
        let code_start = raw_start + trimmed_start_offset;
        let code = raw.trim();
        (code.to_string(), ByteSpan::new(code_start, code_start + code.len()))
    }

    /// Scans a top-level `type`/`const`/`var` declaration verbatim,
    /// stopping at the first newline encountered while brace/paren/bracket
    /// depth is back at zero — this naturally spans a multi-line
    /// `type Foo struct { ... }` or grouped `const ( ... )` block while
    /// still stopping a single-line declaration at its own line.
    pub fn read_top_level_decl(&mut self) -> (String, ByteSpan) {
        let start = self.pos;
        let mut depth = 0i32;
        loop {
            match self.cur() {
                None => break,
                Some(b'\n') if depth == 0 => break,
                Some(b'{') | Some(b'(') | Some(b'[') => {
                    depth += 1;
                    self.advance();
                }
                Some(b'}') | Some(b')') | Some(b']') => {
                    depth -= 1;
                    self.advance();
                }
                Some(b'"') | Some(b'`') => self.skip_host_string(self.cur().unwrap()),
                Some(b'\'') => self.skip_host_rune(),
                _ => self.advance_utf8(),
            }
        }
        let text = self.source[start..self.pos].trim_end();
        (text.to_string(), ByteSpan::new(start, start + text.len()))
    }

    fn looks_like_tag_start(&self) -> bool {
        match self.peek_at(1) {
            Some(b) => is_ident_start(b) || b == b'/',
            None => false,
        }
    }

    fn advance_utf8(&mut self) {
        let rest = &self.source[self.pos..];
        let ch_len = rest.chars().next().map(char::len_utf8).unwrap_or(1);
        self.pos += ch_len;
    }

    fn skip_host_string(&mut self, quote: u8) {
        self.advance(); // opening quote
        while let Some(c) = self.cur() {
            if c == b'\\' && quote != b'`' {
                self.advance();
                if !self.at_eof() {
                    self.advance_utf8();
                }
                continue;
            }
            if c == quote {
                self.advance();
                break;
            }
            self.advance_utf8();
        }
    }

    fn skip_host_rune(&mut self) {
        self.advance(); // opening quote
        while let Some(c) = self.cur() {
            if c == b'\\' {
                self.advance();
                if !self.at_eof() {
                    self.advance_utf8();
                }
                continue;
            }
            if c == b'\'' {
                self.advance();
                break;
            }
            self.advance_utf8();
        }
    }
}

fn is_ident_start(b: u8) -> bool {
    b == b'_' || (b.is_ascii() && unicode_ident::is_xid_start(b as char))
}

fn is_ident_continue(b: u8) -> bool {
    b == b'-' || (b.is_ascii() && unicode_ident::is_xid_continue(b as char))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lexes_structural_punctuation() {
        let mut lex = Lexer::new("<a></a/>={},:=.@");
        let kinds: Vec<TokenKind> = std::iter::from_fn(|| {
            let t = lex.next_token();
            if matches!(t.kind, TokenKind::Eof) { None } else { Some(t.kind) }
        })
        .collect();
        assert!(matches!(kinds[0], TokenKind::Lt));
        assert!(matches!(kinds[2], TokenKind::LtSlash));
    }

    #[test]
    fn lexes_keywords_and_identifiers() {
        let mut lex = Lexer::new("templ Hello @for @if @else @let range true false");
        let mut kinds = Vec::new();
        loop {
            let t = lex.next_token();
            if matches!(t.kind, TokenKind::Eof) {
                break;
            }
            kinds.push(t.kind);
        }
        assert!(matches!(&kinds[0], TokenKind::Keyword(Keyword::Templ)));
        assert!(matches!(&kinds[1], TokenKind::Ident(s) if &**s == "Hello"));
    }

    #[test]
    fn lexes_string_with_escapes() {
        let mut lex = Lexer::new(r#""hi\n\"there\"""#);
        let t = lex.next_token();
        match t.kind {
            TokenKind::Str(s) => assert_eq!(&*s, "hi\n\"there\""),
            other => panic!("expected string token, got {other:?}"),
        }
    }

    #[test]
    fn tracks_leading_newlines_for_layout_hints() {
        let mut lex = Lexer::new("a\n\nb");
        let (_, first) = lex.next_token_with_comments();
        assert_eq!(first.leading_newlines, 0);
        let (_, second) = lex.next_token_with_comments();
        assert_eq!(second.leading_newlines, 2);
    }

    #[test]
    fn read_host_expr_balances_nested_braces_and_strings() {
        let src = r#"{ fmt.Sprintf("{%d}", x) }"#;
        let mut lex = Lexer::new(src);
        assert_eq!(lex.cur(), Some(b'{'));
        let (code, open, whole) = lex.read_host_expr();
        assert_eq!(code.trim(), r#"fmt.Sprintf("{%d}", x)"#);
        assert_eq!(open, ByteSpan::new(0, 1));
        assert_eq!(whole, ByteSpan::new(0, src.len()));
    }

    #[test]
    fn read_until_brace_balances_composite_literal() {
        let src = "items.Filter(Item{Active: true}) { }";
        let mut lex = Lexer::new(src);
        let (text, _) = lex.read_until_brace();
        assert_eq!(text, "items.Filter(Item{Active: true})");
        assert_eq!(lex.cur(), Some(b'{'));
    }

    #[test]
    fn read_paren_balanced_handles_nested_calls() {
        let src = "(Render(a, b), 2)";
        let mut lex = Lexer::new(src);
        let (text, span) = lex.read_paren_balanced();
        assert_eq!(text, "Render(a, b), 2");
        assert_eq!(span, ByteSpan::new(0, src.len()));
    }

    #[test]
    fn read_host_code_stops_before_element() {
        let src = "count := 1\n<span>{count}</span>";
        let mut lex = Lexer::new(src);
        let (code, _) = lex.read_host_code();
        assert_eq!(code, "count := 1");
        assert_eq!(lex.cur(), Some(b'<'));
    }

    #[test]
    fn read_host_code_balances_inline_braces() {
        let src = "if x { y := 1; _ = y }\n<div/>";
        let mut lex = Lexer::new(src);
        let (code, _) = lex.read_host_code();
        assert_eq!(code, "if x { y := 1; _ = y }");
    }

    #[test]
    fn read_text_stops_at_host_expr_and_tag() {
        let src = "Hello, {name}!</span>";
        let mut lex = Lexer::new(src);
        let (text, _) = lex.read_text();
        assert_eq!(text, "Hello, ");
        assert_eq!(lex.cur(), Some(b'{'));
    }
}
