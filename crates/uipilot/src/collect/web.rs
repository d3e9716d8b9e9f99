//! Web candidate collection.
//!
//! The interactive-element query runs inside the page via the external
//! driver; this module owns the script source and turns the raw result into
//! a deduplicated, priority-ordered candidate list.

use crate::types::{BoundingBox, CandidateSource, UiCandidate};
use serde::Deserialize;
use tracing::debug;

/// Default cap on the web candidate list; pages are denser than mobile
/// screens.
pub const DEFAULT_WEB_CAP: usize = 300;

/// JavaScript evaluated in the live document by the driver.
///
/// Selects interactive-role tags and attributes, computes visibility from
/// geometry and computed style, skips disabled elements, and captures the
/// identifying metadata consumed by [`collect_candidates`].
pub const INTERACTIVE_ELEMENTS_SCRIPT: &str = r#"(function() {
    const selectors = 'button, a, input, select, textarea, label, [type="submit"], [type="button"], [type="reset"], [type="image"], [type="checkbox"], [type="radio"], [type="file"], [type="color"], [type="date"], [type="datetime-local"], [type="email"], [type="month"], [type="number"], [type="range"], [type="search"], [type="tel"], [type="time"], [type="url"], [type="week"], [role="button"], [role="link"], [role="textbox"], [role="checkbox"], [role="radio"], [role="menuitem"], [role="tab"], [role="switch"], [role="slider"], [role="combobox"], [role="listbox"], [role="option"], [role="searchbox"], [role="spinbutton"], [role="menuitemcheckbox"], [role="menuitemradio"], [role="treeitem"], [role="gridcell"], [role="row"], [onclick], [tabindex]:not([tabindex="-1"]), [contenteditable="true"], [contenteditable=""], svg[onclick]';
    const elements = document.querySelectorAll(selectors);
    const results = [];
    elements.forEach(el => {
        try {
            const rect = el.getBoundingClientRect();
            const style = window.getComputedStyle(el);
            const isVisible = rect.width > 0 && rect.height > 0 && style.visibility !== 'hidden' && style.display !== 'none' && style.opacity !== '0';
            if (isVisible && !el.disabled && !el.hasAttribute('disabled')) {
                let labelText = '';
                const label = el.closest('label') || document.querySelector('label[for="' + el.id + '"]');
                if (label) {
                    labelText = label.textContent.replace(el.textContent || '', '').trim().substring(0, 50);
                }
                results.push({
                    text: (el.textContent || el.value || '').trim().substring(0, 100),
                    id: el.id || '',
                    name: el.name || el.getAttribute('name') || '',
                    role: el.role || el.getAttribute('role') || '',
                    ariaLabel: el.ariaLabel || el.getAttribute('aria-label') || '',
                    placeholder: el.placeholder || el.getAttribute('placeholder') || '',
                    label: labelText,
                    tag: el.tagName.toLowerCase(),
                    cssClass: (typeof el.className === 'string' ? el.className : '') || '',
                    testId: el.getAttribute('data-testid') || '',
                    type: el.getAttribute('type') || el.type || '',
                    href: el.href || el.getAttribute('href') || '',
                    bbox: {
                        x: Math.round(rect.left),
                        y: Math.round(rect.top),
                        width: Math.round(rect.width),
                        height: Math.round(rect.height)
                    }
                });
            }
        } catch (e) {}
    });
    return results;
})()"#;

/// One raw element as returned by [`INTERACTIVE_ELEMENTS_SCRIPT`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawDomElement {
    pub text: String,
    pub id: String,
    pub name: String,
    pub role: String,
    #[serde(rename = "ariaLabel")]
    pub aria_label: String,
    pub placeholder: String,
    pub label: String,
    pub tag: String,
    #[serde(rename = "cssClass")]
    pub css_class: String,
    #[serde(rename = "testId")]
    pub test_id: String,
    #[serde(rename = "type")]
    pub element_type: String,
    pub href: String,
    pub bbox: BoundingBox,
}

impl RawDomElement {
    fn into_candidate(self) -> UiCandidate {
        // The test-id wins over the regular id as the stable identifier.
        let resource_id = if !self.test_id.is_empty() {
            self.test_id
        } else {
            self.id
        };
        UiCandidate {
            text: self.text,
            resource_id,
            class_name: self.tag,
            accessibility_label: self.aria_label,
            placeholder: self.placeholder,
            css_class: self.css_class,
            role: self.role,
            name: self.name,
            element_type: self.element_type,
            href: self.href,
            label: self.label,
            clickable: true,
            enabled: true,
            bbox: self.bbox,
            source: CandidateSource::Tree,
        }
    }
}

fn dedup_key(c: &UiCandidate) -> (String, String, String, String, String) {
    let desc = if !c.accessibility_label.is_empty() {
        c.accessibility_label.clone()
    } else {
        c.placeholder.clone()
    };
    (
        c.text.clone(),
        c.resource_id.clone(),
        desc,
        c.name.clone(),
        c.class_name.clone(),
    )
}

/// Remove duplicates by composite key, keeping first occurrences.
/// Idempotent: applying it to its own output is a no-op.
pub fn deduplicate(candidates: Vec<UiCandidate>) -> Vec<UiCandidate> {
    let mut seen = std::collections::HashSet::new();
    candidates
        .into_iter()
        .filter(|c| seen.insert(dedup_key(c)))
        .collect()
}

/// Input types that rarely make sense as a priority target.
const SPECIAL_INPUT_TYPES: &[&str] = &[
    "date",
    "file",
    "color",
    "range",
    "datetime-local",
    "month",
    "week",
    "time",
];

fn priority(c: &UiCandidate) -> (bool, bool, bool, bool, bool) {
    (
        // Input fields first: the usual target of form instructions.
        c.class_name == "input" || c.class_name == "textarea",
        !c.placeholder.is_empty() || !c.accessibility_label.is_empty(),
        !c.text.trim().is_empty(),
        !c.resource_id.is_empty() || !c.name.is_empty(),
        !SPECIAL_INPUT_TYPES.contains(&c.element_type.as_str()),
    )
}

/// Turn the raw script output into the final candidate list:
/// map, deduplicate, sort by descending priority tuple, cap.
pub fn collect_candidates(raw: Vec<RawDomElement>, cap: usize) -> Vec<UiCandidate> {
    let total = raw.len();
    let mut candidates = deduplicate(
        raw.into_iter()
            .map(RawDomElement::into_candidate)
            .collect(),
    );
    candidates.sort_by_key(|c| std::cmp::Reverse(priority(c)));
    candidates.truncate(cap);
    debug!(total, kept = candidates.len(), "collected web candidates");
    candidates
}

/// Deserialize the script's JSON result and collect from it.
pub fn collect_from_script_result(
    result: serde_json::Value,
    cap: usize,
) -> Result<Vec<UiCandidate>, crate::errors::AutomationError> {
    let raw: Vec<RawDomElement> = serde_json::from_value(result).map_err(|e| {
        crate::errors::AutomationError::PlatformError(format!(
            "interactive-elements script returned unexpected shape: {e}"
        ))
    })?;
    Ok(collect_candidates(raw, cap))
}
