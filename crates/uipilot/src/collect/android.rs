//! Android candidate collection: depth-first walk over an accessibility-tree
//! snapshot, bounds parsing, filter pipeline and priority ordering.

use crate::collect::filters::FilterPipeline;
use crate::types::{BoundingBox, CandidateSource, ScreenSize, UiCandidate, UiNode};
use tracing::debug;

/// Default cap on the Android candidate list.
pub const DEFAULT_ANDROID_CAP: usize = 50;

/// Raw attributes extracted from one tree node, before filtering.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AndroidElement {
    pub text: String,
    pub resource_id: String,
    pub class_name: String,
    pub content_desc: String,
    pub clickable: bool,
    pub enabled: bool,
    pub displayed: bool,
    pub bbox: BoundingBox,
}

impl AndroidElement {
    pub fn into_candidate(self) -> UiCandidate {
        UiCandidate {
            text: self.text,
            resource_id: self.resource_id,
            class_name: self.class_name,
            accessibility_label: self.content_desc,
            clickable: self.clickable,
            enabled: self.enabled,
            bbox: self.bbox,
            source: CandidateSource::Tree,
            ..Default::default()
        }
    }
}

/// Parse the platform's compact bounds encoding `"[x1,y1][x2,y2]"`.
///
/// An empty or malformed string yields the empty (invalid) box, which the
/// bounds filter rejects downstream.
pub fn parse_bounds(bounds: &str) -> BoundingBox {
    fn parse_pair(s: &str) -> Option<(i32, i32)> {
        let (a, b) = s.split_once(',')?;
        Some((a.trim().parse().ok()?, b.trim().parse().ok()?))
    }

    let trimmed = bounds.trim();
    if trimmed.is_empty() {
        return BoundingBox::default();
    }
    let inner = trimmed.strip_prefix('[').and_then(|s| s.strip_suffix(']'));
    let Some(inner) = inner else {
        return BoundingBox::default();
    };
    let Some((first, second)) = inner.split_once("][") else {
        return BoundingBox::default();
    };
    match (parse_pair(first), parse_pair(second)) {
        (Some((x1, y1)), Some((x2, y2))) => BoundingBox::new(x1, y1, x2 - x1, y2 - y1),
        _ => BoundingBox::default(),
    }
}

fn extract(node: &UiNode) -> AndroidElement {
    AndroidElement {
        text: node.text.trim().to_string(),
        resource_id: node.resource_id.trim().to_string(),
        class_name: node.class.trim().to_string(),
        content_desc: node.content_desc.trim().to_string(),
        clickable: node.clickable,
        enabled: node.enabled,
        displayed: node.displayed,
        bbox: parse_bounds(&node.bounds),
    }
}

/// Walk the snapshot depth-first, extracting every node's attributes with no
/// filtering applied.
pub fn collect_all_elements(root: &UiNode) -> Vec<AndroidElement> {
    let mut out = Vec::new();
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        out.push(extract(node));
        // Reverse so children are visited in document order.
        for child in node.children.iter().rev() {
            stack.push(child);
        }
    }
    out
}

/// Collect the filtered, priority-ordered, capped Android candidate list.
///
/// Survivors of the displayed/bounds/interactive pipeline are sorted by a
/// descending `(has_text, has_content_desc, has_resource_id)` tuple so the
/// richest-attribute elements come first, then truncated to `cap`.
pub fn collect_candidates(root: &UiNode, screen: ScreenSize, cap: usize) -> Vec<UiCandidate> {
    let elements = collect_all_elements(root);
    let total = elements.len();

    let mut filtered = FilterPipeline::android(screen).apply(elements);
    filtered.sort_by_key(|e| {
        std::cmp::Reverse((
            !e.text.is_empty(),
            !e.content_desc.is_empty(),
            !e.resource_id.is_empty(),
        ))
    });
    filtered.truncate(cap);

    debug!(
        total,
        kept = filtered.len(),
        "collected android candidates"
    );
    filtered.into_iter().map(AndroidElement::into_candidate).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn snapshot() -> UiNode {
        serde_json::from_value(json!({
            "class": "android.widget.FrameLayout",
            "bounds": "[0,0][1080,1920]",
            "clickable": false,
            "children": [
                {
                    "class": "android.widget.EditText",
                    "resource-id": "com.app:id/username",
                    "content-desc": "Nom d'utilisateur",
                    "bounds": "[40,300][1040,420]"
                },
                {
                    "class": "android.widget.Button",
                    "text": "Se connecter",
                    "resource-id": "com.app:id/login",
                    "bounds": "[40,500][1040,620]"
                },
                {
                    "class": "android.view.View",
                    "bounds": "[0,0][0,0]"
                },
                {
                    "class": "android.widget.TextView",
                    "text": "Hidden",
                    "displayed": false,
                    "bounds": "[40,700][1040,760]"
                }
            ]
        }))
        .unwrap()
    }

    #[test]
    fn parse_bounds_computes_width_and_height() {
        let b = parse_bounds("[100,200][300,250]");
        assert_eq!(b, BoundingBox::new(100, 200, 200, 50));
    }

    #[test]
    fn parse_bounds_rejects_empty_and_malformed() {
        assert_eq!(parse_bounds(""), BoundingBox::default());
        assert_eq!(parse_bounds("invalid"), BoundingBox::default());
        assert_eq!(parse_bounds("[1,2][3"), BoundingBox::default());
        assert_eq!(parse_bounds("[a,b][c,d]"), BoundingBox::default());
    }

    #[test]
    fn collect_all_elements_walks_every_node() {
        let all = collect_all_elements(&snapshot());
        assert_eq!(all.len(), 5);
        // Document order: root first, then children in order.
        assert_eq!(all[1].resource_id, "com.app:id/username");
        assert_eq!(all[2].text, "Se connecter");
    }

    #[test]
    fn collect_candidates_filters_and_prioritizes() {
        let screen = ScreenSize {
            width: 1080,
            height: 1920,
        };
        let candidates = collect_candidates(&snapshot(), screen, DEFAULT_ANDROID_CAP);
        // Root (not clickable), degenerate view and hidden text are dropped.
        assert_eq!(candidates.len(), 2);
        // The element with text sorts ahead of the one with only an id.
        assert_eq!(candidates[0].text, "Se connecter");
        assert_eq!(candidates[1].accessibility_label, "Nom d'utilisateur");
        assert!(candidates.iter().all(|c| c.source == CandidateSource::Tree));
    }

    #[test]
    fn cap_truncates_candidate_list() {
        let screen = ScreenSize {
            width: 1080,
            height: 1920,
        };
        let candidates = collect_candidates(&snapshot(), screen, 1);
        assert_eq!(candidates.len(), 1);
    }
}
