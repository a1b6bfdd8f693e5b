//! The enclosing scope at a cursor position.

use gsx_ast::Span;

/// How a `ref`/`ref_key` attribute's variable is used, inferred from where
/// the attribute sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefKind {
    /// A plain `ref={r}` outside any loop.
    Single,
    /// A `ref={r}` inside a `@for` loop body, with no `ref_key`.
    List,
    /// A `ref_key={...}` attribute, keying the ref by loop element.
    Map,
}

/// One `ref`/`ref_key` binding found while building scope.
#[derive(Debug, Clone)]
pub struct RefInfo {
    /// The host-expression text bound to the ref, e.g. `r` in `ref={r}`.
    pub name: String,
    /// The ref attribute's host-expression span.
    pub span: Span,
    /// Whether the element carrying this ref sits inside a `@for` loop.
    pub in_loop: bool,
    /// Whether the element carrying this ref sits inside a `@if`/`@else`.
    pub in_conditional: bool,
    /// Which of the three ref shapes this is.
    pub kind: RefKind,
}

/// One `name := tui.NewState(...)` declaration found in a component body.
#[derive(Debug, Clone)]
pub struct StateVar {
    /// The declared variable's name.
    pub name: String,
    /// The verbatim initializer expression text passed to `tui.NewState`.
    pub init_expr: String,
    /// The declaring host-code statement's span.
    pub span: Span,
}

/// A `@let name = <element>` binding visible at the cursor.
#[derive(Debug, Clone)]
pub struct LetBind {
    /// The bound name.
    pub name: String,
    /// The binding's span.
    pub span: Span,
}

/// A component or function parameter visible at the cursor.
#[derive(Debug, Clone)]
pub struct ScopeParam {
    /// The parameter's name.
    pub name: String,
    /// The parameter's type, as written.
    pub type_text: String,
    /// The `name Type` pair's span.
    pub span: Span,
}

/// Everything a provider needs to know about what's visible from a cursor
/// position, without re-walking the AST itself.
///
/// `refs` and `state_vars` are collected for the whole enclosing component
/// regardless of where in the body the cursor sits — a `ref={r}` declared
/// near the top is visible (and relevant to completion/hover) anywhere
/// below it, so there is no benefit to scoping them more tightly. `params`
/// and `let_binds` are scoped to the path from the component/function down
/// to the cursor, since a `@let` binding genuinely isn't visible until
/// after it's declared in the surrounding block structure.
#[derive(Debug, Clone, Default)]
pub struct Scope {
    /// The enclosing component's name, if the cursor is inside one.
    pub component: Option<String>,
    /// The enclosing plain host function's name, if the cursor is inside
    /// one (functions have no DSL body, so this is only set when the
    /// cursor is on the function's own name or parameter list).
    pub function: Option<String>,
    /// Whether the cursor sits inside a `@for` loop's body.
    pub in_for_loop: bool,
    /// The innermost enclosing loop's index-variable name, if bound.
    pub for_index: Option<String>,
    /// The innermost enclosing loop's value-variable name.
    pub for_value: Option<String>,
    /// Whether the cursor sits inside a `@if`/`@else` branch.
    pub in_if_stmt: bool,
    /// Every `ref`/`ref_key` binding in the enclosing component.
    pub refs: Vec<RefInfo>,
    /// Every `tui.NewState(...)` declaration in the enclosing component.
    pub state_vars: Vec<StateVar>,
    /// `@let` bindings enclosing the cursor, outermost first.
    pub let_binds: Vec<LetBind>,
    /// Parameters of the enclosing component or function.
    pub params: Vec<ScopeParam>,
}

impl Scope {
    /// True if `name` is bound by a parameter, `@let`, state declaration,
    /// or loop variable visible from this scope. Used by the completion
    /// and hover providers to decide whether an identifier is local.
    pub fn binds(&self, name: &str) -> bool {
        self.params.iter().any(|p| p.name == name)
            || self.let_binds.iter().any(|l| l.name == name)
            || self.state_vars.iter().any(|s| s.name == name)
            || self.for_index.as_deref() == Some(name)
            || self.for_value.as_deref() == Some(name)
    }
}
