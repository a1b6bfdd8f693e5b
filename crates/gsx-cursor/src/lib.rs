//! Cursor-context resolution for the GSX language server.
//!
//! Given a parsed [`gsx_ast::File`] and a wire position, [`resolve`]
//! classifies what the cursor is on ([`NodeKind`]) and builds the
//! [`Scope`] visible from there — the enclosing component, its
//! parameters, `ref`/state bindings, and any `@for`/`@if`/`@let`
//! nesting. Every feature provider (hover, completion, definition,
//! references) starts from this single resolution instead of re-walking
//! the AST itself.

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![cfg_attr(test, allow(clippy::panic, clippy::unwrap_used, clippy::expect_used))]

mod analysis;
mod context;
mod heuristics;
mod node_kind;
mod resolver;
mod scope;

pub use analysis::declaration::{Declaration, DeclarationKind, DeclarationTable};
pub use context::CursorContext;
pub use heuristics::{fallback_classify, in_class_attr, in_element_tag, in_host_expr};
pub use node_kind::NodeKind;
pub use resolver::resolve;
pub use scope::{LetBind, RefInfo, RefKind, Scope, ScopeParam, StateVar};

#[cfg(test)]
mod tests {
    use super::*;
    use gsx_position::WirePosition;

    fn parse(source: &str) -> gsx_ast::File {
        gsx_parser::parse(source).file
    }

    #[test]
    fn cursor_on_component_name_resolves_to_component() {
        let source = "package p\n\ntempl Hello(name string) { <span>{name}</span> }\n";
        let file = parse(source);
        let ctx = resolve(&file, source, "file:///a.gsx", WirePosition::new(2, 8));

        assert_eq!(ctx.kind, NodeKind::Component);
        assert_eq!(ctx.scope.component.as_deref(), Some("Hello"));
    }

    #[test]
    fn cursor_inside_for_loop_body_sees_loop_variables() {
        let source = "package p\n\ntempl List(items []string) {\n\t@for i, v := range items {\n\t\t<span>{v}</span>\n\t}\n}\n";
        let file = parse(source);
        let line = source.lines().nth(4).expect("line exists");
        let char_offset = line.find('v').expect("v present") as u32;
        let ctx = resolve(&file, source, "file:///a.gsx", WirePosition::new(4, char_offset));

        assert!(ctx.scope.in_for_loop);
        assert_eq!(ctx.scope.for_index.as_deref(), Some("i"));
        assert_eq!(ctx.scope.for_value.as_deref(), Some("v"));
        assert!(ctx.scope.binds("v"));
    }

    #[test]
    fn cursor_outside_for_loop_does_not_see_loop_variables() {
        let source = "package p\n\ntempl List(items []string) {\n\t@for i, v := range items {\n\t\t<span>{v}</span>\n\t}\n\t<p>done</p>\n}\n";
        let file = parse(source);
        let line = source.lines().nth(6).expect("line exists");
        let char_offset = line.find('d').expect("'d' present") as u32;
        let ctx = resolve(&file, source, "file:///a.gsx", WirePosition::new(6, char_offset));

        assert!(!ctx.scope.in_for_loop);
        assert!(!ctx.scope.binds("v"));
    }

    #[test]
    fn state_declaration_is_classified_and_collected() {
        let source = "package p\n\ntempl Counter() {\n\tcount := tui.NewState(0)\n\t<span>{count.Get()}</span>\n}\n";
        let file = parse(source);
        assert_eq!(file.components().count(), 1);

        let line = source.lines().nth(3).expect("line exists");
        let char_offset = (line.find("tui.NewState").expect("present") + 1) as u32;
        let ctx = resolve(&file, source, "file:///a.gsx", WirePosition::new(3, char_offset));

        assert_eq!(ctx.kind, NodeKind::StateDecl);
        assert!(ctx.scope.state_vars.iter().any(|s| s.name == "count"));
    }

    #[test]
    fn ref_on_element_inside_loop_is_tagged_as_list() {
        let source = "package p\n\ntempl List(items []string) {\n\t@for _, v := range items {\n\t\t<li ref={r}>{v}</li>\n\t}\n}\n";
        let file = parse(source);
        let ctx = resolve(&file, source, "file:///a.gsx", WirePosition::new(4, 3));

        let ref_info = ctx.scope.refs.first().expect("ref collected");
        assert_eq!(ref_info.name, "r");
        assert!(ref_info.in_loop);
        assert_eq!(ref_info.kind, RefKind::List);
    }

    #[test]
    fn cursor_past_end_of_file_falls_back_gracefully() {
        let source = "package p\n";
        let file = parse(source);
        let ctx = resolve(&file, source, "file:///a.gsx", WirePosition::new(50, 50));

        assert_eq!(ctx.kind, NodeKind::Unknown);
    }

    #[test]
    fn unknown_word_in_a_class_attribute_is_a_utility_class() {
        let source = "<div class=\"p-4 fle";
        let ctx = fallback_classify("fle", false, in_class_attr(source, source.len()), in_element_tag(source, source.len()));
        assert_eq!(ctx, NodeKind::UtilityClass);
    }
}
