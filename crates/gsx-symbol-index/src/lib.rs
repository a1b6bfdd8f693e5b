//! Workspace-wide symbol index over GSX components and host functions.
//!
//! The index tracks exactly four kinds of indexable declaration (see
//! [`gsx_symbol_types::SymbolKind`]): components, host functions, and the
//! parameters of each, keyed as `componentName.paramName` /
//! `funcName.paramName`. It is the data source for go-to-definition on a
//! component or function call, for `workspace/symbol`, and for completion
//! of component names after `@`.
//!
//! Each document's entries are owned by its URI: re-indexing a document
//! first drops everything it previously contributed, so repeated calls to
//! [`SymbolIndex::index_document`] for the same URI are idempotent.

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![cfg_attr(test, allow(clippy::panic, clippy::unwrap_used, clippy::expect_used))]

use gsx_ast::{Component, File};
use gsx_position::ByteSpan;
pub use gsx_symbol_types::SymbolKind;
use rustc_hash::FxHashMap;

/// One indexed declaration or parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Info {
    /// The declaration's bare name (or, for a parameter entry, the
    /// parameter's own name — not the `owner.param` index key).
    pub name: String,
    /// The verbatim declaration or parameter text, as written.
    pub signature: String,
    /// The span of the name token, used for go-to-definition.
    pub name_span: ByteSpan,
    /// What kind of declaration this is.
    pub kind: SymbolKind,
    /// The URI of the document that owns this entry.
    pub uri: String,
}

fn param_key(owner: &str, param: &str) -> String {
    let mut key = String::with_capacity(owner.len() + 1 + param.len());
    key.push_str(owner);
    key.push('.');
    key.push_str(param);
    key
}

fn component_signature(component: &Component) -> String {
    let mut sig = String::from("templ ");
    if let Some(receiver) = &component.receiver {
        sig.push('(');
        sig.push_str(&receiver.name);
        sig.push(' ');
        sig.push_str(&receiver.type_text);
        sig.push_str(") ");
    }
    sig.push_str(&component.name);
    sig.push('(');
    for (i, param) in component.params.iter().enumerate() {
        if i > 0 {
            sig.push_str(", ");
        }
        sig.push_str(&param.name);
        sig.push(' ');
        sig.push_str(&param.type_text);
    }
    sig.push(')');
    sig
}

/// Which of a document's previously-indexed keys to remove when it is
/// re-indexed or closed, so `index_document`/`remove` never leak stale
/// entries from an earlier version of the same file.
#[derive(Debug, Default)]
struct OwnedKeys {
    components: Vec<String>,
    functions: Vec<String>,
    component_params: Vec<String>,
    function_params: Vec<String>,
}

/// The workspace-wide symbol index (§4.C).
#[derive(Debug, Default)]
pub struct SymbolIndex {
    components: FxHashMap<String, Info>,
    functions: FxHashMap<String, Info>,
    component_params: FxHashMap<String, Info>,
    function_params: FxHashMap<String, Info>,
    owned_by_uri: FxHashMap<String, OwnedKeys>,
}

impl SymbolIndex {
    /// Creates an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Indexes every component, host function, and parameter declared in
    /// `file`, first removing any entries already owned by `uri`.
    pub fn index_document(&mut self, uri: &str, file: &File) {
        self.remove(uri);
        let mut owned = OwnedKeys::default();

        for component in file.components() {
            let name = component.name.clone();
            self.components.insert(
                name.clone(),
                Info {
                    name: name.clone(),
                    signature: component_signature(component),
                    name_span: component.name_span,
                    kind: SymbolKind::Component,
                    uri: uri.to_string(),
                },
            );
            owned.components.push(name.clone());

            for param in &component.params {
                let key = param_key(&name, &param.name);
                self.component_params.insert(
                    key.clone(),
                    Info {
                        name: param.name.clone(),
                        signature: format!("{} {}", param.name, param.type_text),
                        name_span: param.span,
                        kind: SymbolKind::ComponentParameter,
                        uri: uri.to_string(),
                    },
                );
                owned.component_params.push(key);
            }
        }

        for function in file.functions() {
            let name = function.name.clone();
            self.functions.insert(
                name.clone(),
                Info {
                    name: name.clone(),
                    signature: function.signature_text.clone(),
                    name_span: function.name_span,
                    kind: SymbolKind::Function,
                    uri: uri.to_string(),
                },
            );
            owned.functions.push(name.clone());

            for param in &function.params {
                let key = param_key(&name, &param.name);
                self.function_params.insert(
                    key.clone(),
                    Info {
                        name: param.name.clone(),
                        signature: format!("{} {}", param.name, param.type_text),
                        name_span: param.span,
                        kind: SymbolKind::FunctionParameter,
                        uri: uri.to_string(),
                    },
                );
                owned.function_params.push(key);
            }
        }

        self.owned_by_uri.insert(uri.to_string(), owned);
    }

    /// Drops all entries previously contributed by `uri`.
    pub fn remove(&mut self, uri: &str) {
        let Some(owned) = self.owned_by_uri.remove(uri) else {
            return;
        };
        for key in &owned.components {
            self.components.remove(key);
        }
        for key in &owned.functions {
            self.functions.remove(key);
        }
        for key in &owned.component_params {
            self.component_params.remove(key);
        }
        for key in &owned.function_params {
            self.function_params.remove(key);
        }
    }

    /// Looks up a component by bare name.
    pub fn lookup_component(&self, name: &str) -> Option<&Info> {
        self.components.get(name)
    }

    /// Looks up a host function by bare name.
    pub fn lookup_function(&self, name: &str) -> Option<&Info> {
        self.functions.get(name)
    }

    /// Looks up one parameter of a component by component and parameter
    /// name.
    pub fn lookup_component_param(&self, component: &str, param: &str) -> Option<&Info> {
        self.component_params.get(&param_key(component, param))
    }

    /// Looks up one parameter of a host function by function and
    /// parameter name, also returning the URI of the document that owns
    /// it.
    pub fn lookup_function_param(&self, function: &str, param: &str) -> Option<(&Info, &str)> {
        self.function_params.get(&param_key(function, param)).map(|info| (info, info.uri.as_str()))
    }

    /// Iterates over every indexed component, for workspace symbol search.
    pub fn all_components(&self) -> impl Iterator<Item = &Info> {
        self.components.values()
    }

    /// Iterates over every indexed host function, for workspace symbol
    /// search.
    pub fn all_functions(&self) -> impl Iterator<Item = &Info> {
        self.functions.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gsx_parser::parse;

    #[test]
    fn indexes_components_functions_and_their_parameters() {
        let source = r#"
package p

templ Greeter(name string, times int) {
    <span>{name}</span>
}

func double(x int) int {
    return x * 2
}
"#;
        let parsed = parse(source);
        let mut index = SymbolIndex::new();
        index.index_document("file:///a.gsx", &parsed.file);

        let comp = index.lookup_component("Greeter").expect("component indexed");
        assert_eq!(comp.kind, SymbolKind::Component);
        assert_eq!(comp.uri, "file:///a.gsx");

        let param = index.lookup_component_param("Greeter", "times").expect("param indexed");
        assert_eq!(param.name, "times");

        let func = index.lookup_function("double").expect("function indexed");
        assert_eq!(func.signature, "func double(x int) int");

        let (fn_param, owner) = index.lookup_function_param("double", "x").expect("fn param indexed");
        assert_eq!(fn_param.name, "x");
        assert_eq!(owner, "file:///a.gsx");
    }

    #[test]
    fn reindexing_the_same_uri_is_idempotent() {
        let source = "package p\n\ntempl Hello() { <span>hi</span> }\n";
        let parsed = parse(source);
        let mut index = SymbolIndex::new();

        index.index_document("file:///a.gsx", &parsed.file);
        index.index_document("file:///a.gsx", &parsed.file);

        assert_eq!(index.all_components().count(), 1);
    }

    #[test]
    fn removing_a_uri_drops_only_its_own_entries() {
        let a = parse("package p\n\ntempl FromA() { <span/> }\n");
        let b = parse("package p\n\ntempl FromB() { <span/> }\n");
        let mut index = SymbolIndex::new();
        index.index_document("file:///a.gsx", &a.file);
        index.index_document("file:///b.gsx", &b.file);

        index.remove("file:///a.gsx");

        assert!(index.lookup_component("FromA").is_none());
        assert!(index.lookup_component("FromB").is_some());
    }

    #[test]
    fn reindexing_drops_parameters_removed_in_a_later_edit() {
        let before = parse("package p\n\ntempl C(a string, b string) { <span/> }\n");
        let after = parse("package p\n\ntempl C(a string) { <span/> }\n");
        let mut index = SymbolIndex::new();

        index.index_document("file:///a.gsx", &before.file);
        assert!(index.lookup_component_param("C", "b").is_some());

        index.index_document("file:///a.gsx", &after.file);
        assert!(index.lookup_component_param("C", "b").is_none());
        assert!(index.lookup_component_param("C", "a").is_some());
    }
}
