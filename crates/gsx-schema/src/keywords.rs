//! Static documentation for the DSL's reserved keywords and directives.

use std::collections::HashMap;
use std::sync::OnceLock;

/// Documentation for one keyword or `@`-directive.
pub struct KeywordDef {
    /// Short description shown in hover and completion detail text.
    pub description: &'static str,
    /// A minimal usage example.
    pub example: &'static str,
}

static KEYWORDS: OnceLock<HashMap<&'static str, KeywordDef>> = OnceLock::new();

/// Returns the static keyword table, building it on first use.
pub fn keywords() -> &'static HashMap<&'static str, KeywordDef> {
    KEYWORDS.get_or_init(|| {
        let mut m = HashMap::new();

        m.insert(
            "package",
            KeywordDef { description: "Declares the package a file belongs to. Must be the first declaration.", example: "package p" },
        );
        m.insert(
            "import",
            KeywordDef { description: "Brings a host-language package into scope, singly or as a group.", example: "import \"fmt\"" },
        );
        m.insert(
            "templ",
            KeywordDef {
                description: "Declares a component: a named, parameterized template body.",
                example: "templ Hello(name string) { <span>{name}</span> }",
            },
        );
        m.insert(
            "func",
            KeywordDef { description: "Declares a plain host-language function, captured verbatim.", example: "func helper() int { return 1 }" },
        );
        m.insert(
            "@for",
            KeywordDef {
                description: "Repeats its body once per element of a range expression, with an optional index binding.",
                example: "@for i, item := range items { <span>{item}</span> }",
            },
        );
        m.insert(
            "@if",
            KeywordDef { description: "Conditionally includes its body, with optional `@else`/`@else @if` chains.", example: "@if ok { <span>yes</span> }" },
        );
        m.insert(
            "@else",
            KeywordDef { description: "The alternative branch of an `@if`, or the start of an `@else @if` chain.", example: "@else { <span>no</span> }" },
        );
        m.insert(
            "@let",
            KeywordDef { description: "Binds a name to an element for reuse later in the same body.", example: "@let greeting = <span>hi</span>" },
        );

        m
    })
}

/// Looks up keyword documentation. Accepts both bare keywords (`templ`)
/// and `@`-prefixed directives (`@for`).
pub fn lookup(word: &str) -> Option<&'static KeywordDef> {
    keywords().get(word)
}

/// Whether `word` names a recognized DSL keyword or directive.
pub fn is_keyword(word: &str) -> bool {
    keywords().contains_key(word)
}
