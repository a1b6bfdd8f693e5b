//! The resolved value object handed to every feature provider.

use gsx_ast::Span;
use gsx_position::WirePosition;

use crate::analysis::declaration::DeclarationTable;
use crate::node_kind::NodeKind;
use crate::scope::Scope;

/// Everything a feature provider needs to answer a request at one cursor
/// position.
///
/// Built fresh by [`crate::resolve`] on every request and never cached —
/// recomputing from the current AST is cheaper than tracking when a cached
/// context would go stale, and it keeps providers from ever answering
/// against a document state that no longer matches what the editor shows.
#[derive(Debug, Clone)]
pub struct CursorContext {
    /// The document URI this context was resolved against.
    pub uri: String,
    /// The cursor position, in LSP wire coordinates.
    pub position: WirePosition,
    /// The cursor position, as a byte offset into the document text.
    pub byte_offset: usize,
    /// What kind of construct the cursor landed on.
    pub kind: NodeKind,
    /// The enclosing component/function/loop/conditional scope.
    pub scope: Scope,
    /// Name-keyed lookup of every parameter, `@let` binding, loop variable,
    /// and state variable visible from the cursor, for providers that need
    /// to resolve an arbitrary identifier rather than just the word under
    /// the cursor.
    pub local_declarations: DeclarationTable,
    /// The chain of container kinds from the file root down to the
    /// innermost one enclosing the cursor, outermost first (e.g.
    /// `[Component, ForLoop, IfStmt]`).
    pub parent_chain: Vec<NodeKind>,
    /// The span of the most specific AST node the cursor landed on, if any.
    pub node_span: Option<Span>,
    /// The identifier-like word touching the cursor, with any leading `@`
    /// or `#` included.
    pub word: String,
    /// The full text of the line the cursor is on, without its trailing
    /// newline.
    pub line_text: String,
    /// Whether the byte offset sits inside an unclosed `{...}` host
    /// expression, determined by a brace-balance scan of the preceding
    /// text. Best-effort: a brace inside a host string literal can throw
    /// this off, same as the providers that rely on it.
    pub in_host_expr: bool,
    /// Whether the byte offset sits inside a `class="..."` attribute
    /// value.
    pub in_class_attr: bool,
    /// Whether the byte offset sits inside an element's opening tag
    /// (after `<tag` and before the closing `>`).
    pub in_element_tag: bool,
    /// The enclosing element's tag name, when `in_element_tag` or
    /// `in_class_attr` is set.
    pub attr_tag: Option<String>,
    /// The attribute name the cursor is inside the value of, if any.
    pub attr_name: Option<String>,
    /// The import path string literal's text, when `kind` is
    /// [`NodeKind::ImportPath`].
    pub import_path: Option<String>,
}
