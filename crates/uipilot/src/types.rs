//! Common types flowing through the candidate pipeline.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Pixel-space bounding box. The default box is empty and therefore invalid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl BoundingBox {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// A box is usable only with strictly positive extent.
    pub fn is_valid(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    /// Center point of the box.
    pub fn center(&self) -> (i32, i32) {
        (self.x + self.width / 2, self.y + self.height / 2)
    }

    /// The platform's compact `"[x1,y1][x2,y2]"` encoding of this box.
    pub fn to_bounds_string(&self) -> String {
        format!(
            "[{},{}][{},{}]",
            self.x,
            self.y,
            self.x + self.width,
            self.y + self.height
        )
    }
}

/// Current screen/viewport dimensions in pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenSize {
    pub width: i32,
    pub height: i32,
}

/// Where a candidate came from: the accessibility/DOM tree or a vision model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CandidateSource {
    #[default]
    Tree,
    Vision,
}

/// One addressable UI element with normalized attributes.
///
/// Candidates are created fresh per instruction; the 1-based index of a
/// candidate in its list is positional and only valid for the instruction
/// cycle that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiCandidate {
    /// Visible text content.
    pub text: String,
    /// Resource id (Android) or id/test-id attribute (web).
    pub resource_id: String,
    /// Widget class (Android) or lowercase tag name (web).
    pub class_name: String,
    /// Content description (Android) or aria-label (web).
    pub accessibility_label: String,
    pub placeholder: String,
    /// Raw CSS class attribute (web only).
    pub css_class: String,
    pub role: String,
    pub name: String,
    /// The `type` attribute for inputs.
    pub element_type: String,
    pub href: String,
    /// Text of the nearest associated `<label>` (web only).
    pub label: String,
    pub clickable: bool,
    pub enabled: bool,
    pub bbox: BoundingBox,
    pub source: CandidateSource,
}

impl Default for UiCandidate {
    fn default() -> Self {
        Self {
            text: String::new(),
            resource_id: String::new(),
            class_name: String::new(),
            accessibility_label: String::new(),
            placeholder: String::new(),
            css_class: String::new(),
            role: String::new(),
            name: String::new(),
            element_type: String::new(),
            href: String::new(),
            label: String::new(),
            clickable: true,
            enabled: true,
            bbox: BoundingBox::default(),
            source: CandidateSource::Tree,
        }
    }
}

impl UiCandidate {
    /// True when no identifying attribute at all is present, in which case
    /// no locator can ever be derived from this candidate.
    pub fn has_no_attributes(&self) -> bool {
        self.text.is_empty()
            && self.resource_id.is_empty()
            && self.class_name.is_empty()
            && self.accessibility_label.is_empty()
            && self.placeholder.is_empty()
            && self.name.is_empty()
            && self.role.is_empty()
    }

    /// Short human-readable summary used in error messages.
    pub fn summary(&self) -> String {
        let ident = if !self.text.is_empty() {
            format!("text={:?}", self.text)
        } else if !self.resource_id.is_empty() {
            format!("id={:?}", self.resource_id)
        } else if !self.accessibility_label.is_empty() {
            format!("label={:?}", self.accessibility_label)
        } else {
            "no identifying attributes".to_string()
        };
        format!("[{}] {}", self.class_name, ident)
    }
}

fn default_true() -> bool {
    true
}

/// One node of an accessibility-tree snapshot, as delivered by the driver.
///
/// The Android collector walks this tree depth-first. Attribute names mirror
/// the platform's hierarchy dump (`resource-id`, `content-desc`, compact
/// bounds string).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UiNode {
    pub text: String,
    #[serde(rename = "resource-id")]
    pub resource_id: String,
    pub class: String,
    #[serde(rename = "content-desc")]
    pub content_desc: String,
    #[serde(default = "default_true")]
    pub clickable: bool,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_true")]
    pub displayed: bool,
    /// Compact bounds encoding `"[x1,y1][x2,y2]"`; may be empty.
    pub bounds: String,
    /// Any further raw attributes the snapshot carries.
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<UiNode>,
}
