//! Resolves a document's text for cross-file position translation.
//!
//! The symbol index and workspace AST cache key everything by [`gsx_ast`]
//! byte offsets, which can only be turned into a line/column position
//! given that document's full text. Open documents keep their text in the
//! [`DocumentStore`]; closed ones don't (§4.D), so a definition or
//! references answer that points into a file the editor isn't currently
//! showing falls back to reading it straight off disk — the same file
//! the client would open if it followed the location anyway.

use gsx_ast::Span;
use gsx_position::WireLocation;
use gsx_workspace::DocumentStore;

/// Returns `uri`'s current text: the open buffer if the document store has
/// one, otherwise the file's on-disk contents. `None` if neither is
/// available (the document was never opened and isn't a readable file).
pub fn resolve_text(documents: &DocumentStore, uri: &str) -> Option<String> {
    if let Some(text) = documents.with_document(uri, |entry| entry.text.clone()) {
        return Some(text);
    }
    let path = gsx_uri::uri_to_fs_path(uri)?;
    std::fs::read_to_string(path).ok()
}

/// Converts a byte span in `uri` to a wire location, resolving the
/// document's text via [`resolve_text`].
pub fn location_for(documents: &DocumentStore, uri: &str, span: Span) -> Option<WireLocation> {
    let text = resolve_text(documents, uri)?;
    Some(WireLocation::new(uri.to_string(), gsx_position::WireRange::from_byte_offsets(&text, span.start, span.end)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_document_resolves_without_touching_disk() {
        let documents = DocumentStore::new();
        documents.open("file:///a.gsx".to_string(), 1, "package p\n".to_string());
        assert_eq!(resolve_text(&documents, "file:///a.gsx").as_deref(), Some("package p\n"));
    }

    #[test]
    fn unknown_uri_with_no_file_backing_resolves_to_none() {
        let documents = DocumentStore::new();
        assert!(resolve_text(&documents, "file:///definitely/missing/a.gsx").is_none());
    }
}
