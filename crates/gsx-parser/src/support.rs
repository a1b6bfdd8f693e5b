//! Small helpers shared across the parser's grammar rules: DSL position
//! conversion, comment-run splitting, and the leading-comment/newline
//! bundle threaded through body-level dispatch.

use gsx_ast::ast::{ChildNode, Comment, CommentGroup};
use gsx_lexer::{Token, TokenKind};
use gsx_position::DslPosition;

/// Converts byte offsets into this source into 1-indexed [`DslPosition`]s.
///
/// Line starts are precomputed once per parse; column is a UTF-8 character
/// count from the start of the line, matching `DslPosition`'s contract (the
/// UTF-16 column used on the LSP wire is a distinct, separately-computed
/// representation — see `gsx_position::wire`).
pub(crate) struct PositionConverter {
    line_starts: Vec<usize>,
}

impl PositionConverter {
    pub(crate) fn new(source: &str) -> Self {
        let mut line_starts = vec![0usize];
        for (i, b) in source.bytes().enumerate() {
            if b == b'\n' {
                line_starts.push(i + 1);
            }
        }
        Self { line_starts }
    }

    pub(crate) fn to_dsl(&self, source: &str, offset: usize) -> DslPosition {
        let offset = offset.min(source.len());
        let line_idx = match self.line_starts.binary_search(&offset) {
            Ok(i) => i,
            Err(i) => i.saturating_sub(1),
        };
        let line_start = self.line_starts[line_idx];
        let column = source[line_start..offset].chars().count() + 1;
        DslPosition::new(line_idx as u32 + 1, column as u32)
    }
}

/// Converts a raw comment token into an AST [`Comment`].
fn token_to_comment(t: Token) -> Comment {
    let block = matches!(t.kind, TokenKind::BlockComment(_));
    let text = match t.kind {
        TokenKind::LineComment(s) | TokenKind::BlockComment(s) => s.to_string(),
        _ => String::new(),
    };
    Comment { text, block, span: t.span }
}

/// Splits a run of comment tokens gathered before some upcoming structural
/// token into the trailing comment for whatever preceded them (at most one —
/// only the first comment in a run can share its predecessor's line) and the
/// leading [`CommentGroup`] for whatever follows.
pub(crate) fn split_comments(raw: Vec<Token>) -> (Option<Comment>, CommentGroup) {
    let mut iter = raw.into_iter().peekable();
    let mut trailing = None;
    if let Some(first) = iter.peek() {
        if first.leading_newlines == 0 {
            let t = iter.next().expect("peeked");
            trailing = Some(token_to_comment(t));
        }
    }
    let rest: Vec<Token> = iter.collect();
    let blank_line_before = rest.first().map(|t| t.leading_newlines >= 2).unwrap_or(false);
    let comments = rest.into_iter().map(token_to_comment).collect();
    (trailing, CommentGroup { comments, blank_line_before })
}

/// The leading comments and raw newline count captured for a body-level
/// node before it was known which node kind would follow. Node kinds that
/// carry a `blank_line_before` layout/statement flag derive it from this.
pub(crate) struct Leading {
    pub comments: CommentGroup,
    pub newlines: u32,
}

impl Leading {
    pub(crate) fn blank_before(&self) -> bool {
        if !self.comments.is_empty() {
            self.comments.blank_line_before
        } else {
            self.newlines >= 2
        }
    }
}

/// Heuristically classifies a run of raw body text as a host-language
/// statement (`count := tui.NewState(0)`, `return x`, ...) rather than
/// literal text content. Only the first source line is consulted — a
/// multi-line run is either a balanced host statement captured in full by
/// `read_host_code`, or prose that happens to span lines, and in both cases
/// the first line is representative.
pub(crate) fn looks_like_host_statement(text: &str) -> bool {
    let first_line = text.lines().next().unwrap_or("").trim();
    if first_line.is_empty() {
        return false;
    }
    if let Some(idx) = first_line.find(":=") {
        let lhs = first_line[..idx].trim();
        if !lhs.is_empty() && lhs.split(',').all(|part| is_go_ident(part.trim())) {
            return true;
        }
    }
    const STATEMENT_PREFIXES: &[&str] = &["return ", "return(", "var ", "const ", "go ", "defer "];
    STATEMENT_PREFIXES.iter().any(|prefix| first_line.starts_with(prefix)) || first_line == "return"
}

fn is_go_ident(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c == '_' || c.is_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c == '_' || c.is_alphanumeric())
}

/// Whether a sequence of child nodes renders on a single source line, used
/// only for the `children_inline` formatting hint.
pub(crate) fn children_on_one_line(children: &[ChildNode], source: &str) -> bool {
    let (Some(first), Some(last)) = (children.first(), children.last()) else {
        return true;
    };
    let start = first.span().start;
    let end = last.span().end;
    !source.get(start..end).is_some_and(|s| s.contains('\n'))
}
