//! Plain-text scans over the source buffer, used both to compute
//! cursor-local facts (the word under the cursor, whether it's inside a
//! host expression) and to classify positions no AST node covers.

use crate::node_kind::NodeKind;

/// How far back a bounded backward scan is willing to look before giving
/// up, in bytes. Long enough for any realistic attribute value or tag, short
/// enough that a scan never degrades into walking the whole document.
const SCAN_WINDOW: usize = 2048;

/// Characters that continue an identifier-like word, beyond alphanumerics.
fn is_word_continuation(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '-'
}

/// Extracts the identifier-like word touching `offset`, including a
/// leading `@` (directive/call) or `#` (id-selector-style reference) if one
/// immediately precedes it.
pub fn extract_word(source: &str, offset: usize) -> String {
    let offset = offset.min(source.len());
    let bytes = source.as_bytes();

    let mut start = offset;
    while start > 0 {
        let prev = source[..start].chars().next_back().unwrap_or(' ');
        if is_word_continuation(prev) {
            start -= prev.len_utf8();
        } else {
            break;
        }
    }
    let mut end = offset;
    while end < bytes.len() {
        let next = source[end..].chars().next().unwrap_or(' ');
        if is_word_continuation(next) {
            end += next.len_utf8();
        } else {
            break;
        }
    }
    if start > 0 {
        let lead = source[..start].chars().next_back();
        if lead == Some('@') || lead == Some('#') {
            start -= 1;
        }
    }
    source[start..end].to_string()
}

/// Extracts the full line of text containing `offset`, without its
/// trailing line terminator.
pub fn extract_line(source: &str, offset: usize) -> String {
    let offset = offset.min(source.len());
    let start = source[..offset].rfind('\n').map(|i| i + 1).unwrap_or(0);
    let end = source[offset..].find('\n').map(|i| offset + i).unwrap_or(source.len());
    source[start..end].trim_end_matches('\r').to_string()
}

/// Best-effort brace-balance scan: true if `offset` sits inside an
/// unclosed `{...}` region.
///
/// Walks backward from `offset` counting closed `}`/`{` pairs; the first
/// unmatched `{` means the cursor is inside that expression. This can
/// misfire on a `{`/`}` appearing inside a host string literal, same
/// tradeoff the providers that call this accept elsewhere.
pub fn in_host_expr(source: &str, offset: usize) -> bool {
    let offset = offset.min(source.len());
    let window_start = offset.saturating_sub(SCAN_WINDOW);
    let slice = &source[window_start..offset];

    let mut depth: u32 = 0;
    for c in slice.chars().rev() {
        match c {
            '}' => depth += 1,
            '{' => {
                if depth == 0 {
                    return true;
                }
                depth -= 1;
            }
            _ => {}
        }
    }
    false
}

/// True if `offset` sits inside a `class="..."` attribute value.
pub fn in_class_attr(source: &str, offset: usize) -> bool {
    let offset = offset.min(source.len());
    let window_start = offset.saturating_sub(SCAN_WINDOW);
    let slice = &source[window_start..offset];

    let Some(quote_start) = slice.rfind("class=\"") else { return false };
    let after_attr = &slice[quote_start + "class=\"".len()..];
    !after_attr.contains('"')
}

/// True if `offset` sits inside an element's opening tag, after the tag
/// name and before the closing `>`.
pub fn in_element_tag(source: &str, offset: usize) -> bool {
    let offset = offset.min(source.len());
    let window_start = offset.saturating_sub(SCAN_WINDOW);
    let slice = &source[window_start..offset];

    let last_open = slice.rfind('<');
    let last_close = slice.rfind('>');
    match (last_open, last_close) {
        (Some(open), Some(close)) => open > close,
        (Some(_), None) => true,
        _ => false,
    }
}

/// The nearest unclosed `<tag` before `offset`, if any, used to populate
/// [`crate::context::CursorContext::attr_tag`] when the AST couldn't be
/// consulted directly (the cursor sits on text that doesn't parse yet).
pub fn nearest_tag_name(source: &str, offset: usize) -> Option<String> {
    let offset = offset.min(source.len());
    let window_start = offset.saturating_sub(SCAN_WINDOW);
    let slice = &source[window_start..offset];

    let open = slice.rfind('<')?;
    let after = &slice[open + 1..];
    let name: String = after.chars().take_while(|c| c.is_alphanumeric() || *c == '-' || *c == '_').collect();
    if name.is_empty() { None } else { Some(name) }
}

/// The attribute name whose value `offset` sits inside, if any, found by
/// locating the nearest unterminated `name="` or `name={` before `offset`.
pub fn enclosing_attr_name(source: &str, offset: usize) -> Option<String> {
    let offset = offset.min(source.len());
    let window_start = offset.saturating_sub(SCAN_WINDOW);
    let slice = &source[window_start..offset];

    let quote_open = slice.rfind("=\"").filter(|&i| !slice[i + 2..].contains('"'));
    let brace_open = slice.rfind("={").filter(|&i| !slice[i + 2..].contains('}'));
    let eq_pos = match (quote_open, brace_open) {
        (Some(a), Some(b)) => Some(a.max(b)),
        (Some(a), None) => Some(a),
        (None, Some(b)) => Some(b),
        (None, None) => None,
    }?;

    let before = &slice[..eq_pos];
    let name: String = before.chars().rev().take_while(|c| c.is_alphanumeric() || *c == '-' || *c == '_').collect::<Vec<_>>().into_iter().rev().collect();
    if name.is_empty() { None } else { Some(name) }
}

/// Classifies a position no AST node covers, using only nearby text.
pub fn fallback_classify(word: &str, in_host_expr: bool, in_class_attr: bool, in_element_tag: bool) -> NodeKind {
    if in_class_attr {
        return NodeKind::UtilityClass;
    }
    let bare = word.trim_start_matches('@').trim_start_matches('#');
    if gsx_schema::keywords::is_keyword(word) || gsx_schema::keywords::is_keyword(bare) {
        return NodeKind::Keyword;
    }
    if in_element_tag && gsx_schema::elements::is_known_element(bare) {
        return NodeKind::Element;
    }
    if word.starts_with('@') && !word.is_empty() {
        return NodeKind::ComponentCall;
    }
    if in_host_expr {
        return NodeKind::HostExpression;
    }
    NodeKind::Unknown
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_word_includes_leading_directive_sigil() {
        let source = "@for i, v := range xs { <span/> }";
        assert_eq!(extract_word(source, 3), "@for");
    }

    #[test]
    fn extract_word_finds_plain_identifiers() {
        let source = "count.Get()";
        assert_eq!(extract_word(source, 2), "count");
    }

    #[test]
    fn in_host_expr_detects_unclosed_brace() {
        let source = "<span>{coun</span>";
        assert!(in_host_expr(source, 11));
    }

    #[test]
    fn in_host_expr_false_outside_braces() {
        let source = "<span>hello</span>";
        assert!(!in_host_expr(source, 8));
    }

    #[test]
    fn in_class_attr_detects_unterminated_string_after_class_equals() {
        let source = r#"<div class="flex p-"#;
        assert!(in_class_attr(source, source.len()));
    }

    #[test]
    fn in_element_tag_detects_position_before_closing_bracket() {
        let source = "<div class=\"flex\"";
        assert!(in_element_tag(source, source.len()));

        let closed = "<div class=\"flex\">text";
        assert!(!in_element_tag(closed, closed.len()));
    }

    #[test]
    fn nearest_tag_name_finds_the_open_tag() {
        let source = "<button class=\"p-2\"";
        assert_eq!(nearest_tag_name(source, source.len()), Some("button".to_string()));
    }

    #[test]
    fn enclosing_attr_name_finds_a_host_expr_value() {
        let source = "<button onClick={handle";
        assert_eq!(enclosing_attr_name(source, source.len()), Some("onClick".to_string()));
    }
}
