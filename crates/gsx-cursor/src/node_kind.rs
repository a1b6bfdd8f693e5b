//! The universe of things a cursor position can land on.

/// What kind of DSL construct the cursor is currently positioned on.
///
/// Produced by [`crate::resolve`] and consumed by every feature provider to
/// decide what, if anything, it has an answer for. A provider that doesn't
/// recognize the kind it's handed should simply return an empty result
/// rather than guess.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Nothing classifiable: whitespace, a stray token, or past the end of
    /// the file.
    Unknown,
    /// A component's declared name, in `templ Name(...)`.
    Component,
    /// An element's tag name, `<tag ...>`.
    Element,
    /// A plain attribute name or `name=value` pair.
    Attribute,
    /// A `ref={...}`/`ref_key={...}` attribute's host expression.
    RefAttr,
    /// A `{...}` host expression that isn't a state access or declaration.
    HostExpression,
    /// A `@for` loop, anywhere within its span that isn't more specifically
    /// classified by something nested inside it.
    ForLoop,
    /// A `@if`/`@else` conditional, same caveat as `ForLoop`.
    IfStmt,
    /// A `@let name = <element>` binding's name.
    LetBinding,
    /// A host expression matching the `name := tui.NewState(...)` pattern.
    StateDecl,
    /// A host expression calling `.Get(`/`.Set(`/`.Update(`/`.Bind(`/
    /// `.Batch(` on a state variable.
    StateAccess,
    /// A component or function parameter.
    Parameter,
    /// A plain host function's name.
    HostFunction,
    /// A top-level `type`/`const`/`var` declaration.
    HostDeclaration,
    /// A `@ComponentName(...)` call's callee name.
    ComponentCall,
    /// An `on*` event-handler attribute.
    EventHandler,
    /// Literal text content.
    Text,
    /// A reserved keyword or `@`-directive, recognized only by the
    /// text-based fallback classifier (no enclosing AST node matched).
    Keyword,
    /// A utility class name inside a `class="..."` attribute value.
    UtilityClass,
    /// An import path string.
    ImportPath,
}

impl NodeKind {
    /// True for the kinds the text-based fallback classifier can produce
    /// without any AST node having matched.
    pub fn is_heuristic(self) -> bool {
        matches!(self, NodeKind::Keyword | NodeKind::UtilityClass | NodeKind::Unknown)
    }
}
