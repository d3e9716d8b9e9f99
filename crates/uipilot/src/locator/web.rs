//! Web locator synthesis.
//!
//! Builds a single combined CSS selector that stacks every stable attribute
//! the candidate carries, then appends a visibility pseudo-class and, when
//! the element text is short enough to be stable, an exact-text qualifier.

use std::sync::OnceLock;

use regex::Regex;

use crate::errors::AutomationError;
use crate::types::UiCandidate;

/// Text above this length is considered too volatile to match on exactly.
const TEXT_QUALIFIER_MAX_LEN: usize = 80;

/// Input types that carry no selector value of their own.
const GENERIC_INPUT_TYPES: &[&str] = &["text", "submit", "button", ""];

fn generated_class_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // Build-tool class names: leading underscore, or a trailing hash token
    // mixing letters and digits (css-19fj2, sc-bdVaJa1x, jsx-4038283).
    RE.get_or_init(|| Regex::new(r"^(_.*|(.*-)?[A-Za-z]*\d[A-Za-z0-9]{3,})$").unwrap())
}

fn first_stable_class(css_class: &str) -> Option<&str> {
    css_class
        .split_whitespace()
        .find(|class| !generated_class_pattern().is_match(class))
}

fn css_escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

fn text_escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Collapse runs of whitespace the way the DOM renders them.
fn normalize_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Build the combined selector for a single web candidate.
pub fn build_combined(candidate: &UiCandidate) -> Result<String, AutomationError> {
    let tag = candidate.class_name.to_lowercase();
    let mut selector = tag.clone();

    if let Some(class) = first_stable_class(&candidate.css_class) {
        selector.push('.');
        selector.push_str(class);
    }

    // The `type` attribute only discriminates for concrete widget types.
    let input_type = candidate.element_type.to_lowercase();
    if !GENERIC_INPUT_TYPES.contains(&input_type.as_str()) {
        selector.push_str(&format!("[type=\"{}\"]", css_escape(&input_type)));
    }

    if !candidate.name.is_empty() {
        selector.push_str(&format!("[name=\"{}\"]", css_escape(&candidate.name)));
    }

    if !candidate.resource_id.is_empty() {
        let id = &candidate.resource_id;
        if id.to_lowercase().contains("testid") || id.to_lowercase().contains("test-id") {
            selector.push_str(&format!("[data-testid=\"{}\"]", css_escape(id)));
        } else {
            selector.push_str(&format!("[id=\"{}\"]", css_escape(id)));
        }
    }

    if !candidate.accessibility_label.is_empty() {
        selector.push_str(&format!(
            "[aria-label=\"{}\"]",
            css_escape(&candidate.accessibility_label)
        ));
    }

    if !candidate.placeholder.is_empty() {
        selector.push_str(&format!(
            "[placeholder=\"{}\"]",
            css_escape(&candidate.placeholder)
        ));
    }

    if !candidate.role.is_empty() {
        selector.push_str(&format!("[role=\"{}\"]", css_escape(&candidate.role)));
    }

    if tag == "a" {
        if let Some(qualifier) = href_qualifier(&candidate.href) {
            selector.push_str(&qualifier);
        }
    }

    let mut qualified = selector != tag;

    selector.push_str(":visible");

    let text = normalize_text(&candidate.text);
    if !text.is_empty() && text.chars().count() < TEXT_QUALIFIER_MAX_LEN {
        selector.push_str(&format!(":text-is(\"{}\")", text_escape(&text)));
        qualified = true;
    }

    if !qualified {
        return Err(AutomationError::NoUsableAttributes(format!(
            "web candidate <{tag}> has no stable attributes and no short text ({})",
            candidate.summary()
        )));
    }

    Ok(selector)
}

/// Anchors match best on their fragment; full URLs churn too much, so fall
/// back to the trailing path segment.
fn href_qualifier(href: &str) -> Option<String> {
    if href.is_empty() || href == "#" {
        return None;
    }
    if let Some((_, fragment)) = href.split_once('#') {
        if !fragment.is_empty() {
            return Some(format!("[href*=\"#{}\"]", css_escape(fragment)));
        }
    }
    let path = href.split(['?', '#']).next().unwrap_or(href);
    let segment = path.trim_end_matches('/').rsplit('/').next().unwrap_or("");
    if segment.is_empty() || segment.contains("://") {
        return None;
    }
    Some(format!("[href*=\"{}\"]", css_escape(segment)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_and_text_stack_into_one_selector() {
        let c = UiCandidate {
            class_name: "button".into(),
            resource_id: "submit-btn".into(),
            text: "Envoyer".into(),
            ..Default::default()
        };
        assert_eq!(
            build_combined(&c).unwrap(),
            "button[id=\"submit-btn\"]:visible:text-is(\"Envoyer\")"
        );
    }

    #[test]
    fn testid_attribute_chosen_over_plain_id() {
        let c = UiCandidate {
            class_name: "div".into(),
            resource_id: "login-testid-cta".into(),
            ..Default::default()
        };
        assert_eq!(
            build_combined(&c).unwrap(),
            "div[data-testid=\"login-testid-cta\"]:visible"
        );
    }

    #[test]
    fn generated_classes_are_skipped() {
        let c = UiCandidate {
            class_name: "span".into(),
            css_class: "_hashed css-19fj2 nav-link".into(),
            ..Default::default()
        };
        assert_eq!(build_combined(&c).unwrap(), "span.nav-link:visible");
    }

    #[test]
    fn concrete_input_type_is_qualified() {
        let c = UiCandidate {
            class_name: "input".into(),
            element_type: "email".into(),
            name: "user_email".into(),
            ..Default::default()
        };
        assert_eq!(
            build_combined(&c).unwrap(),
            "input[type=\"email\"][name=\"user_email\"]:visible"
        );
    }

    #[test]
    fn type_qualifier_applies_beyond_input_tags() {
        let c = UiCandidate {
            class_name: "button".into(),
            element_type: "reset".into(),
            ..Default::default()
        };
        assert_eq!(build_combined(&c).unwrap(), "button[type=\"reset\"]:visible");
    }

    #[test]
    fn generic_input_type_is_not_qualified() {
        let c = UiCandidate {
            class_name: "input".into(),
            element_type: "text".into(),
            placeholder: "Rechercher".into(),
            ..Default::default()
        };
        assert_eq!(
            build_combined(&c).unwrap(),
            "input[placeholder=\"Rechercher\"]:visible"
        );
    }

    #[test]
    fn role_attribute_is_qualified() {
        let c = UiCandidate {
            class_name: "div".into(),
            role: "tab".into(),
            text: "Profil".into(),
            ..Default::default()
        };
        assert_eq!(
            build_combined(&c).unwrap(),
            "div[role=\"tab\"]:visible:text-is(\"Profil\")"
        );
    }

    #[test]
    fn anchor_fragment_preferred_over_path() {
        let c = UiCandidate {
            class_name: "a".into(),
            href: "https://example.com/docs#install".into(),
            text: "Install".into(),
            ..Default::default()
        };
        assert_eq!(
            build_combined(&c).unwrap(),
            "a[href*=\"#install\"]:visible:text-is(\"Install\")"
        );
    }

    #[test]
    fn anchor_without_fragment_uses_last_path_segment() {
        let c = UiCandidate {
            class_name: "a".into(),
            href: "/account/settings?tab=privacy".into(),
            text: "Settings".into(),
            ..Default::default()
        };
        assert_eq!(
            build_combined(&c).unwrap(),
            "a[href*=\"settings\"]:visible:text-is(\"Settings\")"
        );
    }

    #[test]
    fn long_text_is_not_used_as_qualifier() {
        let c = UiCandidate {
            class_name: "p".into(),
            text: "x".repeat(120),
            ..Default::default()
        };
        assert!(matches!(
            build_combined(&c),
            Err(AutomationError::NoUsableAttributes(_))
        ));
    }

    #[test]
    fn text_is_whitespace_normalized_and_quote_escaped() {
        let c = UiCandidate {
            class_name: "button".into(),
            text: "  Say \"hi\"\n  now ".into(),
            ..Default::default()
        };
        assert_eq!(
            build_combined(&c).unwrap(),
            "button:visible:text-is(\"Say \\\"hi\\\" now\")"
        );
    }
}
