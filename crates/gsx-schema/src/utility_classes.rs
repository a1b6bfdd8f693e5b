//! Static documentation for hyphenated utility class names valid inside a
//! `class="…"` attribute, grouped by family for completion filtering.

use std::collections::HashMap;
use std::sync::OnceLock;

/// Documentation for one utility class.
pub struct UtilityClassDef {
    /// Short description shown in hover and completion detail text.
    pub description: &'static str,
    /// The family this class belongs to (`layout`, `spacing`, `sizing`,
    /// `typography`, `color`, `border`), used to group completion results.
    pub family: &'static str,
}

static UTILITY_CLASSES: OnceLock<HashMap<&'static str, UtilityClassDef>> = OnceLock::new();

macro_rules! family {
    ($m:ident, $family:literal, [$($name:literal => $desc:literal),+ $(,)?]) => {
        $( $m.insert($name, UtilityClassDef { description: $desc, family: $family }); )+
    };
}

/// Returns the static utility-class table, building it on first use.
pub fn utility_classes() -> &'static HashMap<&'static str, UtilityClassDef> {
    UTILITY_CLASSES.get_or_init(|| {
        let mut m = HashMap::new();

        family!(m, "layout", [
            "flex" => "Establishes a flex formatting context.",
            "flex-row" => "Lays out flex children in a row.",
            "flex-col" => "Lays out flex children in a column.",
            "flex-wrap" => "Allows flex children to wrap onto multiple lines.",
            "grid" => "Establishes a grid formatting context.",
            "block" => "Displays the element as a block.",
            "inline" => "Displays the element inline.",
            "hidden" => "Removes the element from layout entirely.",
            "items-center" => "Centers flex/grid children along the cross axis.",
            "justify-center" => "Centers flex/grid children along the main axis.",
            "justify-between" => "Distributes flex/grid children with space between them.",
        ]);

        macro_rules! spacing_scale {
            ($($n:literal),+ $(,)?) => {
                $(
                    m.insert(concat!("p-", $n), UtilityClassDef { description: "Padding on all sides.", family: "spacing" });
                    m.insert(concat!("m-", $n), UtilityClassDef { description: "Margin on all sides.", family: "spacing" });
                    m.insert(concat!("px-", $n), UtilityClassDef { description: "Horizontal padding.", family: "spacing" });
                    m.insert(concat!("py-", $n), UtilityClassDef { description: "Vertical padding.", family: "spacing" });
                    m.insert(concat!("mx-", $n), UtilityClassDef { description: "Horizontal margin.", family: "spacing" });
                    m.insert(concat!("my-", $n), UtilityClassDef { description: "Vertical margin.", family: "spacing" });
                )+
            };
        }
        spacing_scale!(0, 1, 2, 3, 4, 6, 8);

        family!(m, "sizing", [
            "w-full" => "Sets width to 100% of the containing block.",
            "h-full" => "Sets height to 100% of the containing block.",
            "w-screen" => "Sets width to 100% of the viewport.",
            "h-screen" => "Sets height to 100% of the viewport.",
        ]);

        family!(m, "typography", [
            "text-sm" => "Small font size.",
            "text-base" => "Default font size.",
            "text-lg" => "Large font size.",
            "text-xl" => "Extra-large font size.",
            "text-center" => "Centers text horizontally.",
            "text-left" => "Left-aligns text.",
            "text-right" => "Right-aligns text.",
            "font-bold" => "Bold font weight.",
            "font-normal" => "Normal font weight.",
            "italic" => "Italic font style.",
        ]);

        family!(m, "color", [
            "bg-white" => "White background color.",
            "bg-black" => "Black background color.",
            "bg-gray-100" => "Light gray background color.",
            "bg-gray-900" => "Near-black background color.",
            "text-white" => "White text color.",
            "text-black" => "Black text color.",
            "text-gray-500" => "Medium gray text color.",
        ]);

        family!(m, "border", [
            "border" => "Applies a 1px border on all sides.",
            "rounded" => "Applies a small border radius.",
            "rounded-full" => "Applies a fully rounded (pill/circle) border radius.",
            "shadow" => "Applies a default drop shadow.",
        ]);

        m
    })
}

/// Returns every utility class whose name starts with `prefix`, for
/// prefix-filtered completion inside a `class` attribute.
pub fn classes_with_prefix(prefix: &str) -> Vec<(&'static str, &'static UtilityClassDef)> {
    utility_classes()
        .iter()
        .filter(|(name, _)| name.starts_with(prefix))
        .map(|(name, def)| (*name, def))
        .collect()
}

/// Looks up a utility class definition by exact name.
pub fn lookup(name: &str) -> Option<&'static UtilityClassDef> {
    utility_classes().get(name)
}
