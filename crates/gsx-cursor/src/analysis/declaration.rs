//! A scratch table of name bindings accumulated while walking toward the
//! cursor, used to answer "what does this identifier refer to" without a
//! second walk.

use rustc_hash::FxHashMap;

use gsx_ast::Span;

/// What introduced a binding, for hover/definition to describe it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeclarationKind {
    /// A component or function parameter.
    Param,
    /// A `@let name = <element>` binding.
    LetBind,
    /// A `@for` loop's index or value variable.
    LoopVar,
    /// A `name := tui.NewState(...)` declaration.
    StateVar,
}

/// One accumulated binding.
#[derive(Debug, Clone, Copy)]
pub struct Declaration {
    /// What kind of binding this is.
    pub kind: DeclarationKind,
    /// Where it was declared.
    pub span: Span,
}

/// Name-keyed table of bindings seen so far on the path from the enclosing
/// component down to the cursor.
///
/// Re-declaring the same name (a `@let x` shadowing an outer parameter
/// named `x`, say) overwrites the earlier entry — the resolver walks
/// outside-in, so the last write before the cursor is reached is always
/// the innermost, and therefore correct, binding.
#[derive(Debug, Clone, Default)]
pub struct DeclarationTable {
    bindings: FxHashMap<String, Declaration>,
}

impl DeclarationTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a binding, replacing any earlier one for the same name.
    pub fn insert(&mut self, name: &str, kind: DeclarationKind, span: Span) {
        self.bindings.insert(name.to_string(), Declaration { kind, span });
    }

    /// Looks up the innermost binding recorded so far for `name`.
    pub fn get(&self, name: &str) -> Option<Declaration> {
        self.bindings.get(name).copied()
    }

    /// True if any binding has been recorded for `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(start: usize, end: usize) -> Span {
        Span::new(start, end)
    }

    #[test]
    fn later_insert_shadows_earlier_one() {
        let mut table = DeclarationTable::new();
        table.insert("x", DeclarationKind::Param, span(0, 1));
        table.insert("x", DeclarationKind::LetBind, span(10, 11));

        let decl = table.get("x").expect("binding present");
        assert_eq!(decl.kind, DeclarationKind::LetBind);
        assert_eq!(decl.span, span(10, 11));
    }

    #[test]
    fn missing_name_returns_none() {
        let table = DeclarationTable::new();
        assert!(table.get("missing").is_none());
        assert!(!table.contains("missing"));
    }
}
