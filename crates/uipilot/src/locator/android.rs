//! Android locator synthesis.
//!
//! The fast priority chain tries the strongest single attribute first;
//! robust mode conjuncts every available attribute into one XPath predicate
//! to guarantee uniqueness when the fast chain would be ambiguous.

use crate::errors::AutomationError;
use crate::types::UiCandidate;

/// First match wins: resource-id, accessibility label, text XPath, class.
pub fn build_priority(candidate: &UiCandidate) -> Result<String, AutomationError> {
    if !candidate.resource_id.is_empty() {
        return Ok(format!("id={}", candidate.resource_id));
    }
    if !candidate.accessibility_label.is_empty() {
        return Ok(format!("accessibility_id={}", candidate.accessibility_label));
    }
    if !candidate.text.is_empty() {
        return Ok(format!("//*[@text={}]", escape_xpath_literal(&candidate.text)));
    }
    if !candidate.class_name.is_empty() {
        return Ok(format!("class={}", candidate.class_name));
    }
    Err(AutomationError::NoUsableAttributes(format!(
        "android candidate has no resource id, accessibility label, text or class ({})",
        candidate.summary()
    )))
}

/// Conjunct every non-empty attribute into a single predicate rooted at the
/// element's class, including the raw bounds when the box is known.
pub fn build_robust(candidate: &UiCandidate) -> Result<String, AutomationError> {
    let mut conditions = Vec::new();

    if !candidate.resource_id.is_empty() {
        conditions.push(format!(
            "@resource-id={}",
            escape_xpath_literal(&candidate.resource_id)
        ));
    }
    if !candidate.accessibility_label.is_empty() {
        conditions.push(format!(
            "@content-desc={}",
            escape_xpath_literal(&candidate.accessibility_label)
        ));
    }
    if !candidate.text.is_empty() {
        conditions.push(format!("@text={}", escape_xpath_literal(&candidate.text)));
    }
    if candidate.bbox.is_valid() {
        conditions.push(format!("@bounds='{}'", candidate.bbox.to_bounds_string()));
    }

    let base = if candidate.class_name.is_empty() {
        "//*".to_string()
    } else {
        format!("//{}", candidate.class_name)
    };

    if conditions.is_empty() {
        if candidate.class_name.is_empty() {
            return Err(AutomationError::NoUsableAttributes(
                "android candidate has no class name and no attributes".to_string(),
            ));
        }
        return Ok(base);
    }

    Ok(format!("{base}[{}]", conditions.join(" and ")))
}

/// Quote a value for an XPath predicate.
///
/// XPath 1.0 string literals have no escape character, so a value containing
/// both quote kinds must be rebuilt as a `concat(...)` expression alternating
/// single-quoted segments with a double-quoted single-quote literal.
pub fn escape_xpath_literal(value: &str) -> String {
    if !value.contains('\'') {
        return format!("'{value}'");
    }
    if !value.contains('"') {
        return format!("\"{value}\"");
    }

    let mut parts = Vec::new();
    let mut current = String::new();
    for ch in value.chars() {
        if ch == '\'' {
            if !current.is_empty() {
                parts.push(format!("'{current}'"));
                current.clear();
            }
            parts.push("\"'\"".to_string());
        } else {
            current.push(ch);
        }
    }
    if !current.is_empty() {
        parts.push(format!("'{current}'"));
    }
    format!("concat({})", parts.join(", "))
}
