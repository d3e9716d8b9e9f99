//! Ordered, composable filters applied to raw Android elements before they
//! become candidates.

use crate::collect::android::AndroidElement;
use crate::types::ScreenSize;
use tracing::debug;

/// One stage of the candidate filter pipeline.
pub trait ElementFilter: Send + Sync {
    fn name(&self) -> &'static str;

    /// Return `true` to keep the element.
    fn keep(&self, element: &AndroidElement) -> bool;
}

/// Drops nodes the platform reports as not currently rendered.
pub struct DisplayedFilter;

impl ElementFilter for DisplayedFilter {
    fn name(&self) -> &'static str {
        "displayed"
    }

    fn keep(&self, element: &AndroidElement) -> bool {
        element.displayed
    }
}

/// Drops degenerate or off-screen boxes given the current screen size.
///
/// A zero screen size skips the on-screen check (size unknown) but still
/// rejects boxes without positive extent.
pub struct BoundsFilter {
    screen: ScreenSize,
}

impl BoundsFilter {
    pub fn new(screen: ScreenSize) -> Self {
        Self { screen }
    }
}

impl ElementFilter for BoundsFilter {
    fn name(&self) -> &'static str {
        "bounds"
    }

    fn keep(&self, element: &AndroidElement) -> bool {
        let b = &element.bbox;
        if !b.is_valid() {
            return false;
        }
        if self.screen.width > 0 && self.screen.height > 0 {
            if b.x + b.width <= 0 || b.y + b.height <= 0 {
                return false;
            }
            if b.x >= self.screen.width || b.y >= self.screen.height {
                return false;
            }
        }
        true
    }
}

/// Keeps only nodes that are both clickable and enabled.
pub struct InteractiveFilter;

impl ElementFilter for InteractiveFilter {
    fn name(&self) -> &'static str {
        "interactive"
    }

    fn keep(&self, element: &AndroidElement) -> bool {
        element.clickable && element.enabled
    }
}

/// Applies its filters in order, logging how many elements each stage drops.
pub struct FilterPipeline {
    filters: Vec<Box<dyn ElementFilter>>,
}

impl FilterPipeline {
    pub fn new(filters: Vec<Box<dyn ElementFilter>>) -> Self {
        Self { filters }
    }

    /// The standard Android pipeline: displayed, in-bounds, interactive.
    pub fn android(screen: ScreenSize) -> Self {
        Self::new(vec![
            Box::new(DisplayedFilter),
            Box::new(BoundsFilter::new(screen)),
            Box::new(InteractiveFilter),
        ])
    }

    pub fn apply(&self, mut elements: Vec<AndroidElement>) -> Vec<AndroidElement> {
        for filter in &self.filters {
            let before = elements.len();
            elements.retain(|e| filter.keep(e));
            if elements.len() != before {
                debug!(
                    filter = filter.name(),
                    dropped = before - elements.len(),
                    kept = elements.len(),
                    "filter stage applied"
                );
            }
        }
        elements
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BoundingBox;

    fn element(clickable: bool, enabled: bool, displayed: bool, bbox: BoundingBox) -> AndroidElement {
        AndroidElement {
            clickable,
            enabled,
            displayed,
            bbox,
            ..Default::default()
        }
    }

    #[test]
    fn displayed_filter_drops_hidden_nodes() {
        let visible = BoundingBox::new(0, 0, 10, 10);
        let out = FilterPipeline::android(ScreenSize {
            width: 100,
            height: 100,
        })
        .apply(vec![
            element(true, true, false, visible),
            element(true, true, true, visible),
        ]);
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn bounds_filter_drops_degenerate_and_offscreen_boxes() {
        let screen = ScreenSize {
            width: 100,
            height: 100,
        };
        let pipeline = FilterPipeline::android(screen);
        let out = pipeline.apply(vec![
            element(true, true, true, BoundingBox::default()),
            element(true, true, true, BoundingBox::new(200, 0, 10, 10)),
            element(true, true, true, BoundingBox::new(-20, -20, 10, 10)),
            element(true, true, true, BoundingBox::new(5, 5, 10, 10)),
        ]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].bbox.x, 5);
    }

    #[test]
    fn interactive_filter_requires_clickable_and_enabled() {
        let visible = BoundingBox::new(0, 0, 10, 10);
        let pipeline = FilterPipeline::android(ScreenSize::default());
        let out = pipeline.apply(vec![
            element(true, false, true, visible),
            element(false, true, true, visible),
            element(true, true, true, visible),
        ]);
        assert_eq!(out.len(), 1);
    }
}
