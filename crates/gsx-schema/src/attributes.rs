//! Static definitions for attribute names, including the event-handler
//! subset treated specially by semantic tokens and hover.

use std::collections::HashMap;
use std::sync::OnceLock;

/// The shape of value an attribute expects, used for completion snippets
/// and hover detail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeValueKind {
    /// A plain string literal, e.g. `placeholder="Search"`.
    Str,
    /// A boolean-ish attribute, present or absent, e.g. `disabled`.
    Bool,
    /// A numeric literal, e.g. `width=320`.
    Number,
    /// A braced host expression, e.g. `onClick={handleClick}`.
    HostExpr,
}

/// Documentation for one attribute name.
pub struct AttributeDef {
    /// Short description shown in hover and completion detail text.
    pub description: &'static str,
    /// The expected value shape.
    pub value_kind: AttributeValueKind,
}

static ATTRIBUTES: OnceLock<HashMap<&'static str, AttributeDef>> = OnceLock::new();

/// Returns the static attribute table, building it on first use.
pub fn attributes() -> &'static HashMap<&'static str, AttributeDef> {
    ATTRIBUTES.get_or_init(|| {
        let mut m = HashMap::new();
        use AttributeValueKind::{Bool, HostExpr, Number, Str};

        m.insert("class", AttributeDef { description: "Space-separated utility class names.", value_kind: Str });
        m.insert("id", AttributeDef { description: "A unique element identifier within the document.", value_kind: Str });
        m.insert("style", AttributeDef { description: "Inline CSS declarations.", value_kind: Str });
        m.insert("title", AttributeDef { description: "Advisory tooltip text.", value_kind: Str });
        m.insert(
            "ref",
            AttributeDef {
                description: "Binds the element to a host-language variable; extracted into the element's `ref_expr` slot after parsing.",
                value_kind: HostExpr,
            },
        );
        m.insert(
            "ref_key",
            AttributeDef {
                description: "A keyed variant of `ref` for use inside loops, binding one entry of a ref map.",
                value_kind: HostExpr,
            },
        );
        m.insert("href", AttributeDef { description: "The link target URL.", value_kind: Str });
        m.insert("target", AttributeDef { description: "Where to open the linked document (`_blank`, `_self`, ...).", value_kind: Str });
        m.insert("rel", AttributeDef { description: "The relationship between the current document and the linked one.", value_kind: Str });
        m.insert("src", AttributeDef { description: "The URL of an embedded resource.", value_kind: Str });
        m.insert("alt", AttributeDef { description: "Alternative text for an image.", value_kind: Str });
        m.insert("type", AttributeDef { description: "The control's input type or variant.", value_kind: Str });
        m.insert("value", AttributeDef { description: "The control's current value.", value_kind: Str });
        m.insert("placeholder", AttributeDef { description: "Hint text shown when the control is empty.", value_kind: Str });
        m.insert("disabled", AttributeDef { description: "Whether the control is disabled.", value_kind: Bool });
        m.insert("checked", AttributeDef { description: "Whether a checkbox or radio control is checked.", value_kind: Bool });
        m.insert("name", AttributeDef { description: "The control's form-submission name.", value_kind: Str });
        m.insert("for", AttributeDef { description: "The `id` of the form control this label describes.", value_kind: Str });
        m.insert("width", AttributeDef { description: "The element's intrinsic width.", value_kind: Number });
        m.insert("height", AttributeDef { description: "The element's intrinsic height.", value_kind: Number });
        m.insert("viewBox", AttributeDef { description: "The SVG coordinate system for its contents.", value_kind: Str });
        m.insert("d", AttributeDef { description: "The path data of an SVG `path` element.", value_kind: Str });
        m.insert("fill", AttributeDef { description: "The fill color of an SVG shape.", value_kind: Str });
        m.insert("stroke", AttributeDef { description: "The outline color of an SVG shape.", value_kind: Str });
        m.insert("controls", AttributeDef { description: "Whether the browser's playback controls are shown.", value_kind: Bool });
        m.insert("autoplay", AttributeDef { description: "Whether playback starts automatically.", value_kind: Bool });
        m.insert("loop", AttributeDef { description: "Whether playback restarts automatically at the end.", value_kind: Bool });

        for event in EVENT_HANDLER_NAMES {
            m.insert(
                event,
                AttributeDef {
                    description: "Event handler; binds a host-language function value to this DOM event.",
                    value_kind: HostExpr,
                },
            );
        }

        m
    })
}

/// Event-handler attribute names recognized as decorators for semantic
/// tokens and hover, independent of element tag.
pub const EVENT_HANDLER_NAMES: &[&str] = &[
    "onClick",
    "onInput",
    "onChange",
    "onSubmit",
    "onMouseEnter",
    "onMouseLeave",
    "onKeyDown",
    "onKeyUp",
    "onFocus",
    "onBlur",
];

/// Whether `name` is an event-handler attribute per the `on` + uppercase
/// convention (covers both the fixed [`EVENT_HANDLER_NAMES`] list and any
/// attribute following the same shape, since host components may expose
/// additional event props beyond the built-in DOM set).
pub fn is_event_handler(name: &str) -> bool {
    let mut chars = name.strip_prefix("on").map(str::chars);
    match chars.as_mut().and_then(Iterator::next) {
        Some(c) => c.is_ascii_uppercase(),
        None => false,
    }
}

/// Looks up an attribute definition by name.
pub fn lookup(name: &str) -> Option<&'static AttributeDef> {
    attributes().get(name)
}
