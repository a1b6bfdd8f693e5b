//! Static definitions for the element tags GSX templates may use.
//!
//! GSX elements lower to plain HTML tags in the host-generated output, so
//! the vocabulary here is the familiar HTML element set rather than
//! anything DSL-specific. Hover and completion both key off the tag name.

use std::collections::HashMap;
use std::sync::OnceLock;

/// Documentation and attribute vocabulary for one element tag.
pub struct ElementDef {
    /// Short description shown in hover and completion detail text.
    pub description: &'static str,
    /// Attribute names this element commonly accepts, beyond the global
    /// attributes every element accepts (`class`, `id`, `style`, `ref`).
    pub attributes: &'static [&'static str],
}

static ELEMENTS: OnceLock<HashMap<&'static str, ElementDef>> = OnceLock::new();

/// Global attributes valid on every element regardless of tag.
pub const GLOBAL_ATTRIBUTES: &[&str] = &["class", "id", "style", "ref", "ref_key", "title"];

/// Returns the static element table, building it on first use.
pub fn elements() -> &'static HashMap<&'static str, ElementDef> {
    ELEMENTS.get_or_init(|| {
        let mut m = HashMap::new();

        m.insert(
            "div",
            ElementDef { description: "Generic block-level container with no implied semantics.", attributes: &[] },
        );
        m.insert(
            "span",
            ElementDef { description: "Generic inline container with no implied semantics.", attributes: &[] },
        );
        m.insert(
            "p",
            ElementDef { description: "A paragraph of text.", attributes: &[] },
        );
        m.insert(
            "a",
            ElementDef {
                description: "A hyperlink to another resource or document location.",
                attributes: &["href", "target", "rel"],
            },
        );
        m.insert(
            "button",
            ElementDef {
                description: "A clickable control, typically wired to an `onClick` handler.",
                attributes: &["disabled", "type", "onClick"],
            },
        );
        m.insert(
            "input",
            ElementDef {
                description: "A single-line form control; behavior depends on `type`.",
                attributes: &["type", "value", "placeholder", "disabled", "checked", "name", "onChange", "onInput"],
            },
        );
        m.insert(
            "textarea",
            ElementDef {
                description: "A multi-line form control.",
                attributes: &["value", "placeholder", "disabled", "name", "onChange", "onInput"],
            },
        );
        m.insert(
            "select",
            ElementDef {
                description: "A drop-down form control; children are `option` elements.",
                attributes: &["value", "disabled", "name", "onChange"],
            },
        );
        m.insert(
            "option",
            ElementDef { description: "A single choice within a `select`.", attributes: &["value", "disabled"] },
        );
        m.insert(
            "form",
            ElementDef { description: "A group of form controls submitted as a unit.", attributes: &["onSubmit"] },
        );
        m.insert(
            "label",
            ElementDef { description: "A caption bound to a form control.", attributes: &["for"] },
        );
        m.insert(
            "img",
            ElementDef {
                description: "An embedded image.",
                attributes: &["src", "alt", "width", "height"],
            },
        );
        m.insert(
            "ul",
            ElementDef { description: "An unordered list; children are `li` elements.", attributes: &[] },
        );
        m.insert(
            "ol",
            ElementDef { description: "An ordered list; children are `li` elements.", attributes: &[] },
        );
        m.insert("li", ElementDef { description: "One item within a `ul` or `ol`.", attributes: &[] });
        m.insert(
            "table",
            ElementDef { description: "Tabular data; children are `thead`/`tbody`/`tr`.", attributes: &[] },
        );
        m.insert("thead", ElementDef { description: "The header row group of a table.", attributes: &[] });
        m.insert("tbody", ElementDef { description: "The body row group of a table.", attributes: &[] });
        m.insert("tr", ElementDef { description: "A table row.", attributes: &[] });
        m.insert("th", ElementDef { description: "A table header cell.", attributes: &[] });
        m.insert("td", ElementDef { description: "A table data cell.", attributes: &[] });
        m.insert("nav", ElementDef { description: "A section containing primary navigation links.", attributes: &[] });
        m.insert("header", ElementDef { description: "Introductory content for its nearest ancestor section.", attributes: &[] });
        m.insert("footer", ElementDef { description: "Closing content for its nearest ancestor section.", attributes: &[] });
        m.insert("section", ElementDef { description: "A thematic grouping of content.", attributes: &[] });
        m.insert("article", ElementDef { description: "Self-contained composable content.", attributes: &[] });
        m.insert("main", ElementDef { description: "The dominant content of the document body.", attributes: &[] });
        for level in 1..=6 {
            let tag: &'static str = match level {
                1 => "h1",
                2 => "h2",
                3 => "h3",
                4 => "h4",
                5 => "h5",
                _ => "h6",
            };
            m.insert(tag, ElementDef { description: "A section heading.", attributes: &[] });
        }
        m.insert("strong", ElementDef { description: "Text of strong importance.", attributes: &[] });
        m.insert("em", ElementDef { description: "Text with stressed emphasis.", attributes: &[] });
        m.insert("code", ElementDef { description: "A fragment of computer code.", attributes: &[] });
        m.insert("pre", ElementDef { description: "Preformatted text; whitespace is preserved.", attributes: &[] });
        m.insert("br", ElementDef { description: "A line break. Always self-closing.", attributes: &[] });
        m.insert("hr", ElementDef { description: "A thematic break between paragraph-level content. Always self-closing.", attributes: &[] });
        m.insert(
            "svg",
            ElementDef { description: "A scalable vector graphic container.", attributes: &["width", "height", "viewBox"] },
        );
        m.insert("path", ElementDef { description: "A vector path within an `svg`.", attributes: &["d", "fill", "stroke"] });
        m.insert(
            "video",
            ElementDef { description: "An embedded video player.", attributes: &["src", "controls", "autoplay", "loop", "width", "height"] },
        );
        m.insert(
            "audio",
            ElementDef { description: "An embedded audio player.", attributes: &["src", "controls", "autoplay", "loop"] },
        );
        m.insert("canvas", ElementDef { description: "A bitmap drawing surface manipulated via host code.", attributes: &["width", "height"] });
        m.insert("iframe", ElementDef { description: "An embedded nested browsing context.", attributes: &["src", "width", "height"] });

        m
    })
}

/// Looks up an element definition by tag name.
pub fn lookup(tag: &str) -> Option<&'static ElementDef> {
    elements().get(tag)
}

/// Whether `tag` names a known element (used to classify `node_kind` as
/// `element` rather than falling through to `unknown`).
pub fn is_known_element(tag: &str) -> bool {
    elements().contains_key(tag)
}
