//! The GSX abstract syntax tree.
//!
//! Every node carries a [`Span`] (a byte-offset [`gsx_position::ByteSpan`]),
//! the canonical in-process position representation used by the lexer,
//! parser, and source map (line/column positions are derived on demand via
//! a `LineStartsCache` when a diagnostic or hover result needs one).

use gsx_error::{BudgetTracker, ParseError};
use gsx_position::ByteSpan;

/// The canonical span type for AST nodes: a half-open byte range into the
/// originating DSL source text.
pub type Span = ByteSpan;

/// A single `//` or `/* */` comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    /// The comment's text, including its `//` or `/*`/`*/` delimiters.
    pub text: String,
    /// True for a block comment (`/* ... */`), false for a line comment.
    pub block: bool,
    /// The comment's span in the source.
    pub span: Span,
}

/// A run of comments attached to one node, with whether a blank line
/// separated the group from whatever preceded it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommentGroup {
    /// Comments in source order.
    pub comments: Vec<Comment>,
    /// Whether a blank line preceded this group.
    pub blank_line_before: bool,
}

impl CommentGroup {
    /// True if this group carries no comments.
    pub fn is_empty(&self) -> bool {
        self.comments.is_empty()
    }
}

/// A single `import` spec: `import "path"` or `import alias "path"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Import {
    /// The imported package path.
    pub path: String,
    /// An explicit alias, if the import renames the package.
    pub alias: Option<String>,
    /// The span of the whole import spec.
    pub span: Span,
    /// Comments trailing the import on the same line.
    pub trailing_comments: Vec<Comment>,
}

/// The kind of a top-level host declaration that isn't a component or a
/// plain function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostDeclKind {
    /// `type Foo struct { ... }`
    Type,
    /// `const Foo = ...`
    Const,
    /// `var foo Type`
    Var,
}

/// A top-level `type`/`const`/`var` declaration, stored verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostDecl {
    /// Which of `type`/`const`/`var` this is.
    pub kind: HostDeclKind,
    /// The declaration's source text, verbatim.
    pub code: String,
    /// The declaration's span.
    pub span: Span,
    /// Comments immediately preceding the declaration.
    pub leading_comments: CommentGroup,
}

/// A single parameter in a component's or function's parameter list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    /// The parameter's name.
    pub name: String,
    /// The parameter's type, as written (verbatim host-language type text).
    pub type_text: String,
    /// The span of the whole `name Type` pair.
    pub span: Span,
}

/// A method-style component's receiver: `(r *Type)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receiver {
    /// The receiver variable's name.
    pub name: String,
    /// The receiver's type, as written.
    pub type_text: String,
}

/// A `templ Name(...) { ... }` component definition.
#[derive(Debug, Clone, PartialEq)]
pub struct Component {
    /// The component's name.
    pub name: String,
    /// The span of just the name token.
    pub name_span: Span,
    /// The method-style receiver, if any. Only set for `templ (r *T) Name()`.
    pub receiver: Option<Receiver>,
    /// The component's parameters, in declaration order.
    pub params: Vec<Param>,
    /// The component body's child nodes, in source order.
    pub body: Vec<ChildNode>,
    /// The span of the whole component, from `templ` through the closing
    /// `}`.
    pub span: Span,
    /// Comments immediately preceding the component.
    pub leading_comments: CommentGroup,
    /// Comments inside the body that could not attach to any child node.
    pub orphan_comments: Vec<CommentGroup>,
}

/// A plain host function declared at the top level of a file. Its body is
/// not parsed as DSL content — components are the only body the parser
/// descends into — so the signature is the only structured part.
#[derive(Debug, Clone, PartialEq)]
pub struct HostFunction {
    /// The function's name.
    pub name: String,
    /// The span of just the name token.
    pub name_span: Span,
    /// The function's parameters, in declaration order.
    pub params: Vec<Param>,
    /// The declared return type, as written, if any.
    pub return_type: Option<String>,
    /// The verbatim `func Name(...) ReturnType { ... }` signature text,
    /// without the body, as stored for the symbol index.
    pub signature_text: String,
    /// The span of the whole function, from `func` through the closing
    /// `}`.
    pub span: Span,
    /// Comments immediately preceding the function.
    pub leading_comments: CommentGroup,
}

/// The value an [`Attribute`] is bound to.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    /// A double-quoted string literal, already unescaped.
    Str(String),
    /// An integer literal.
    Int(i64),
    /// A floating-point literal.
    Float(f64),
    /// A boolean literal.
    Bool(bool),
    /// A `{…}` host expression.
    Host(HostExpr),
}

/// A single element attribute, `name` or `name=value`.
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    /// The attribute's name.
    pub name: String,
    /// The attribute's value. `None` for a bare boolean-shorthand attribute
    /// (`<input disabled>`).
    pub value: Option<AttrValue>,
    /// The span of the whole `name` or `name=value` pair.
    pub span: Span,
}

/// A `{…}` host-expression region: raw host-language code the lexer
/// captured as a single brace-balanced token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostExpr {
    /// The host-language code between the braces, exclusive of `{`/`}`.
    pub code: String,
    /// The span of just the opening `{`.
    pub open_brace_span: Span,
    /// The span of the whole `{…}` region.
    pub span: Span,
    /// Comments immediately preceding the expression.
    pub leading_comments: Vec<Comment>,
    /// Comments trailing the expression on the same line.
    pub trailing_comments: Vec<Comment>,
}

/// A bare host statement appearing at a body position, e.g. `name := expr`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostCode {
    /// The statement's source text, verbatim.
    pub code: String,
    /// The span of the statement, starting at its first non-whitespace
    /// character.
    pub span: Span,
}

/// Layout hints recorded on an [`Element`], consumed only by the formatter
/// collaborator — providers never read these.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ElementLayout {
    /// Whether the attribute list was split across multiple lines.
    pub attrs_multiline: bool,
    /// Whether the closing `>` sat on its own line.
    pub closing_bracket_own_line: bool,
    /// Whether all children rendered on one line.
    pub children_inline: bool,
    /// Whether a blank line preceded this element.
    pub blank_line_before: bool,
}

/// An HTML-like element: `<tag attr=.. >children</tag>` or `<tag />`.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    /// The element's tag name.
    pub tag: String,
    /// The span of just the tag name in the opening tag.
    pub tag_span: Span,
    /// Attributes, in source order, with any `ref`/`ref_key` attribute
    /// already removed (see [`Element::ref_expr`]).
    pub attributes: Vec<Attribute>,
    /// The host expression bound by a `ref={…}` attribute, extracted from
    /// `attributes` after parsing. Never both `Some` and present in
    /// `attributes`.
    pub ref_expr: Option<HostExpr>,
    /// The host expression bound by a `ref_key={…}` attribute (a keyed ref
    /// inside a loop), extracted the same way.
    pub ref_key: Option<HostExpr>,
    /// The element's children, in source order. Empty for a self-closing
    /// element.
    pub children: Vec<ChildNode>,
    /// True for `<tag />`.
    pub self_closing: bool,
    /// Formatting layout hints.
    pub layout: ElementLayout,
    /// The span of the whole element, opening tag through closing tag (or
    /// through `/>` if self-closing).
    pub span: Span,
    /// Comments immediately preceding the element.
    pub leading_comments: CommentGroup,
    /// Comments trailing the element on its last line.
    pub trailing_comments: Vec<Comment>,
}

/// A `@for [index,] value := range <expr> { ... }` loop.
#[derive(Debug, Clone, PartialEq)]
pub struct ForStmt {
    /// The optional index-variable name (`i` in `@for i, v := range xs`).
    pub index_name: Option<String>,
    /// The loop variable's name.
    pub value_name: String,
    /// The verbatim text of the iterable expression after `range`.
    pub iterable_text: String,
    /// The loop body, in source order.
    pub body: Vec<ChildNode>,
    /// The span of the whole loop, from `@for` through the closing `}`.
    pub span: Span,
    /// Whether a blank line preceded this loop.
    pub blank_line_before: bool,
    /// Comments immediately preceding the loop.
    pub leading_comments: CommentGroup,
}

/// The `@else` arm of an [`IfStmt`]: either a chained `@else @if ...` or a
/// plain `@else { ... }`.
#[derive(Debug, Clone, PartialEq)]
pub enum IfBranch {
    /// `@else @if <cond> { ... }`, possibly itself chained further.
    ElseIf(Box<IfStmt>),
    /// `@else { ... }`.
    Else(Vec<ChildNode>),
}

/// A `@if <expr> { ... } [@else ...]` conditional.
#[derive(Debug, Clone, PartialEq)]
pub struct IfStmt {
    /// The verbatim text of the condition expression.
    pub condition_text: String,
    /// The `then` branch's body, in source order.
    pub then_body: Vec<ChildNode>,
    /// The `@else` branch, if present.
    pub else_branch: Option<IfBranch>,
    /// The span of the whole conditional, from `@if` through the closing
    /// `}` of the last branch.
    pub span: Span,
    /// Whether a blank line preceded this conditional.
    pub blank_line_before: bool,
    /// Comments immediately preceding the conditional.
    pub leading_comments: CommentGroup,
}

/// A `@let name = <element>` binding. The DSL grammar restricts let-bindings
/// to elements.
#[derive(Debug, Clone, PartialEq)]
pub struct LetBinding {
    /// The bound variable's name.
    pub name: String,
    /// The element the binding evaluates to.
    pub element: Box<Element>,
    /// The span of the whole binding, from `@let` through the bound
    /// element's closing tag.
    pub span: Span,
    /// Whether a blank line preceded this binding.
    pub blank_line_before: bool,
}

/// A `@ComponentName(args) { ... }` component call. The trailing `{ ... }`
/// is present only when the callee renders a children slot.
#[derive(Debug, Clone, PartialEq)]
pub struct CompCall {
    /// The callee component's name.
    pub callee: String,
    /// The span of just the callee name.
    pub callee_span: Span,
    /// The verbatim text of the argument list between the parens.
    pub arg_text: String,
    /// The call's body, supplied to the callee's children slot. Non-empty
    /// iff children-slot semantics apply at this call site.
    pub body: Vec<ChildNode>,
    /// The span of the whole call, including the trailing body block if
    /// present.
    pub span: Span,
    /// Whether a blank line preceded this call.
    pub blank_line_before: bool,
    /// Comments immediately preceding the call.
    pub leading_comments: CommentGroup,
}

/// Literal text content between tags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Text {
    /// The text content, verbatim.
    pub content: String,
    /// The text's span.
    pub span: Span,
}

/// The `{children...}` sentinel marking where a caller's body renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChildrenSlot {
    /// The sentinel's span.
    pub span: Span,
}

/// A single node inside a component body or any nested block.
#[derive(Debug, Clone, PartialEq)]
pub enum ChildNode {
    /// An HTML-like element.
    Element(Element),
    /// A `{…}` host expression.
    HostExpr(HostExpr),
    /// A bare host statement.
    HostCode(HostCode),
    /// A `@for` loop.
    For(ForStmt),
    /// A `@if`/`@else` conditional.
    If(IfStmt),
    /// A `@let` binding.
    Let(LetBinding),
    /// A `@ComponentName(...)` call.
    Call(CompCall),
    /// Literal text.
    Text(Text),
    /// A `{children...}` sentinel.
    ChildrenSlot(ChildrenSlot),
}

impl ChildNode {
    /// The span of this node, regardless of variant.
    pub fn span(&self) -> Span {
        match self {
            ChildNode::Element(e) => e.span,
            ChildNode::HostExpr(e) => e.span,
            ChildNode::HostCode(c) => c.span,
            ChildNode::For(f) => f.span,
            ChildNode::If(i) => i.span,
            ChildNode::Let(l) => l.span,
            ChildNode::Call(c) => c.span,
            ChildNode::Text(t) => t.span,
            ChildNode::ChildrenSlot(s) => s.span,
        }
    }

    /// A short, stable name for the node's variant, used in diagnostics and
    /// logging.
    pub fn kind_name(&self) -> &'static str {
        match self {
            ChildNode::Element(_) => "element",
            ChildNode::HostExpr(_) => "host-expr",
            ChildNode::HostCode(_) => "host-code",
            ChildNode::For(_) => "for",
            ChildNode::If(_) => "if",
            ChildNode::Let(_) => "let",
            ChildNode::Call(_) => "call",
            ChildNode::Text(_) => "text",
            ChildNode::ChildrenSlot(_) => "children-slot",
        }
    }
}

/// One top-level item in a [`File`], preserving declaration order across
/// the three kinds of top-level entity.
#[derive(Debug, Clone, PartialEq)]
pub enum TopLevelItem {
    /// A component definition.
    Component(Component),
    /// A plain host function.
    Function(HostFunction),
    /// A `type`/`const`/`var` declaration.
    HostDecl(HostDecl),
}

impl TopLevelItem {
    /// The span of this item, regardless of variant.
    pub fn span(&self) -> Span {
        match self {
            TopLevelItem::Component(c) => c.span,
            TopLevelItem::Function(f) => f.span,
            TopLevelItem::HostDecl(d) => d.span,
        }
    }
}

/// A parsed GSX source file.
#[derive(Debug, Clone, PartialEq)]
pub struct File {
    /// The declared package name, if a `package` clause was present.
    pub package: Option<String>,
    /// The span of just the package name, if present.
    pub package_span: Option<Span>,
    /// Imports, in source order.
    pub imports: Vec<Import>,
    /// Components, functions, and host declarations, in a single list that
    /// preserves their original source order across all three kinds.
    pub top_level: Vec<TopLevelItem>,
    /// Comments at the very top of the file, before `package`.
    pub leading_comments: CommentGroup,
    /// Comments that could not attach to any top-level item.
    pub orphan_comments: Vec<CommentGroup>,
    /// The span of the whole file.
    pub span: Span,
}

impl File {
    /// Iterate over this file's components, in source order.
    pub fn components(&self) -> impl Iterator<Item = &Component> {
        self.top_level.iter().filter_map(|item| match item {
            TopLevelItem::Component(c) => Some(c),
            _ => None,
        })
    }

    /// Iterate over this file's host functions, in source order.
    pub fn functions(&self) -> impl Iterator<Item = &HostFunction> {
        self.top_level.iter().filter_map(|item| match item {
            TopLevelItem::Function(f) => Some(f),
            _ => None,
        })
    }

    /// Iterate over this file's top-level host declarations, in source
    /// order.
    pub fn host_decls(&self) -> impl Iterator<Item = &HostDecl> {
        self.top_level.iter().filter_map(|item| match item {
            TopLevelItem::HostDecl(d) => Some(d),
            _ => None,
        })
    }

    /// Find a component by name.
    pub fn find_component(&self, name: &str) -> Option<&Component> {
        self.components().find(|c| c.name == name)
    }

    /// Find a host function by name.
    pub fn find_function(&self, name: &str) -> Option<&HostFunction> {
        self.functions().find(|f| f.name == name)
    }
}

/// Structured output from parsing: the AST plus every diagnostic collected
/// along the way. The parser never aborts, so a non-empty `diagnostics` is
/// a normal outcome, not a failure signal — callers should always use
/// `file` even when `diagnostics` is non-empty.
#[derive(Debug, Clone)]
pub struct ParseOutput {
    /// The parsed file. Always present, though it may be missing top-level
    /// items the parser could not recover from.
    pub file: File,
    /// Diagnostics collected during parsing, ordered by source position.
    pub diagnostics: Vec<ParseError>,
    /// Budget consumption during this parse, useful for diagnosing
    /// pathological input.
    pub budget_usage: BudgetTracker,
    /// Whether parsing completed normally or was cut short by budget
    /// exhaustion.
    pub terminated_early: bool,
}

impl ParseOutput {
    /// True if parsing produced no diagnostics.
    pub fn is_ok(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// True if parsing produced at least one diagnostic.
    pub fn has_errors(&self) -> bool {
        !self.diagnostics.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(start: usize, end: usize) -> Span {
        Span::new(start, end)
    }

    #[test]
    fn file_iterators_preserve_kind_filtering() {
        let file = File {
            package: Some("main".to_string()),
            package_span: Some(span(0, 4)),
            imports: vec![],
            top_level: vec![
                TopLevelItem::Component(Component {
                    name: "Header".to_string(),
                    name_span: span(10, 16),
                    receiver: None,
                    params: vec![],
                    body: vec![],
                    span: span(0, 20),
                    leading_comments: CommentGroup::default(),
                    orphan_comments: vec![],
                }),
                TopLevelItem::Function(HostFunction {
                    name: "helper".to_string(),
                    name_span: span(30, 36),
                    params: vec![],
                    return_type: None,
                    signature_text: "func helper()".to_string(),
                    span: span(25, 45),
                    leading_comments: CommentGroup::default(),
                }),
                TopLevelItem::HostDecl(HostDecl {
                    kind: HostDeclKind::Const,
                    code: "const X = 1".to_string(),
                    span: span(50, 61),
                    leading_comments: CommentGroup::default(),
                }),
            ],
            leading_comments: CommentGroup::default(),
            orphan_comments: vec![],
            span: span(0, 61),
        };

        assert_eq!(file.components().count(), 1);
        assert_eq!(file.functions().count(), 1);
        assert_eq!(file.host_decls().count(), 1);
        assert!(file.find_component("Header").is_some());
        assert!(file.find_component("Missing").is_none());
        assert!(file.find_function("helper").is_some());
    }

    #[test]
    fn child_node_span_dispatches_by_variant() {
        let text = ChildNode::Text(Text { content: "hi".to_string(), span: span(5, 7) });
        assert_eq!(text.span(), span(5, 7));
        assert_eq!(text.kind_name(), "text");
    }

    #[test]
    fn ref_expr_is_removed_from_attribute_list_invariant() {
        let element = Element {
            tag: "div".to_string(),
            tag_span: span(0, 3),
            attributes: vec![Attribute {
                name: "class".to_string(),
                value: Some(AttrValue::Str("card".to_string())),
                span: span(4, 17),
            }],
            ref_expr: Some(HostExpr {
                code: "r".to_string(),
                open_brace_span: span(18, 19),
                span: span(18, 21),
                leading_comments: vec![],
                trailing_comments: vec![],
            }),
            ref_key: None,
            children: vec![],
            self_closing: true,
            layout: ElementLayout::default(),
            span: span(0, 25),
            leading_comments: CommentGroup::default(),
            trailing_comments: vec![],
        };

        assert!(!element.attributes.iter().any(|a| a.name == "ref"));
        assert!(element.ref_expr.is_some());
    }

    #[test]
    fn parse_output_reports_error_state() {
        let file = File {
            package: None,
            package_span: None,
            imports: vec![],
            top_level: vec![],
            leading_comments: CommentGroup::default(),
            orphan_comments: vec![],
            span: span(0, 0),
        };
        let ok = ParseOutput {
            file: file.clone(),
            diagnostics: vec![],
            budget_usage: BudgetTracker::new(),
            terminated_early: false,
        };
        assert!(ok.is_ok());
        assert!(!ok.has_errors());

        let err = ParseOutput {
            file,
            diagnostics: vec![ParseError::new(
                gsx_position::DslPosition::new(1, 1),
                "unexpected token",
            )],
            budget_usage: BudgetTracker::new(),
            terminated_early: false,
        };
        assert!(!err.is_ok());
        assert!(err.has_errors());
    }
}
