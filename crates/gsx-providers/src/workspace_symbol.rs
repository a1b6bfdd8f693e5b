//! Workspace symbol search provider (§4.H "Workspace symbols").

use gsx_symbol_index::SymbolIndex;
use lsp_types::{Location, Range, SymbolInformation, SymbolKind};

/// Case-insensitive substring search over every indexed component and
/// host function.
pub fn workspace_symbols(query: &str, symbols: &SymbolIndex) -> Vec<SymbolInformation> {
    let needle = query.to_lowercase();
    let components = symbols.all_components().filter(|info| info.name.to_lowercase().contains(&needle)).filter_map(to_symbol_information);
    let functions = symbols.all_functions().filter(|info| info.name.to_lowercase().contains(&needle)).filter_map(to_symbol_information);
    components.chain(functions).collect()
}

#[allow(deprecated)]
fn to_symbol_information(info: &gsx_symbol_index::Info) -> Option<SymbolInformation> {
    let uri = info.uri.parse().ok()?;
    Some(SymbolInformation {
        name: info.name.clone(),
        kind: SymbolKind::FUNCTION,
        tags: None,
        deprecated: None,
        location: Location { uri, range: Range::default() },
        container_name: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substring_match_is_case_insensitive() {
        let source = "package p\n\ntempl GreeterBox() { <span/> }\n";
        let file = gsx_parser::parse(source).file;
        let mut index = SymbolIndex::new();
        index.index_document("file:///a.gsx", &file);

        let results = workspace_symbols("reeterb", &index);
        assert!(results.iter().any(|s| s.name == "GreeterBox"));
    }

    #[test]
    fn non_matching_query_returns_nothing() {
        let source = "package p\n\ntempl GreeterBox() { <span/> }\n";
        let file = gsx_parser::parse(source).file;
        let mut index = SymbolIndex::new();
        index.index_document("file:///a.gsx", &file);

        assert!(workspace_symbols("zzz", &index).is_empty());
    }
}
