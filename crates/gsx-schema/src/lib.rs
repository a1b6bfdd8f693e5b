//! Static schema tables for the GSX templating DSL.
//!
//! This crate has no behavior: it provides data consulted by the
//! hover, completion, and semantic-tokens providers, and by the
//! cursor-context resolver's text-based fallback classifier. Adding an
//! element, attribute, keyword, or utility class never requires touching
//! provider code — only a table here.
//!
//! Each table is built once behind a [`std::sync::OnceLock`] and indexed
//! by a `HashMap<&'static str, _>`.

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod attributes;
pub mod elements;
pub mod keywords;
pub mod utility_classes;

pub use attributes::{AttributeDef, AttributeValueKind};
pub use elements::ElementDef;
pub use keywords::KeywordDef;
pub use utility_classes::UtilityClassDef;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_elements_round_trip_through_lookup() {
        assert!(elements::is_known_element("div"));
        assert!(elements::lookup("div").is_some());
        assert!(!elements::is_known_element("not-a-tag"));
    }

    #[test]
    fn event_handlers_follow_the_on_plus_uppercase_convention() {
        assert!(attributes::is_event_handler("onClick"));
        assert!(attributes::is_event_handler("onCustomWidgetReady"));
        assert!(!attributes::is_event_handler("online"));
        assert!(!attributes::is_event_handler("on"));
        assert!(!attributes::is_event_handler("class"));
    }

    #[test]
    fn every_fixed_event_handler_name_is_recognized() {
        for name in attributes::EVENT_HANDLER_NAMES {
            assert!(attributes::is_event_handler(name));
            assert!(attributes::lookup(name).is_some());
        }
    }

    #[test]
    fn keyword_lookup_covers_both_bare_keywords_and_directives() {
        assert!(keywords::is_keyword("templ"));
        assert!(keywords::is_keyword("@for"));
        assert!(keywords::is_keyword("@else"));
        assert!(!keywords::is_keyword("whatever"));
    }

    #[test]
    fn utility_class_prefix_filtering_matches_only_the_requested_family() {
        let padding = utility_classes::classes_with_prefix("p-");
        assert!(!padding.is_empty());
        assert!(padding.iter().all(|(name, _)| name.starts_with("p-")));
        assert!(padding.iter().all(|(name, _)| *name != "px-0" && *name != "py-0"));
    }

    #[test]
    fn unknown_utility_class_lookup_returns_none() {
        assert!(utility_classes::lookup("not-a-real-class").is_none());
    }
}
