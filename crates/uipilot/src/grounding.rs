//! Visual grounding: locate an element on a raw screenshot when the
//! accessibility tree has nothing usable.
//!
//! A [`VisionBackend`] detects candidate regions on the screenshot and an
//! [`ElementArbiter`] picks the one matching a natural-language description.
//! The service validates the arbiter's answer against the detected set, so a
//! hallucinated key can never reach the action layer.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::errors::AutomationError;
use crate::types::{BoundingBox, CandidateSource, UiCandidate};

/// One region detected on the screenshot, keyed by the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectedElement {
    #[serde(rename = "type")]
    pub element_type: String,
    /// Normalized [x1, y1, x2, y2], each in `0.0..=1.0`.
    pub bbox: [f64; 4],
    pub interactivity: bool,
    pub content: String,
}

/// Detects interactive regions on a screenshot.
#[async_trait]
pub trait VisionBackend: Send + Sync {
    async fn detect(
        &self,
        screenshot_png: &[u8],
    ) -> Result<HashMap<String, DetectedElement>, AutomationError>;
}

/// The arbiter's verdict for one grounding request.
#[derive(Debug, Clone, Deserialize)]
pub struct ArbiterChoice {
    /// Key of the chosen element, or `None` when nothing matches.
    pub element_key: Option<String>,
    #[serde(default)]
    pub confidence: f64,
    #[serde(default)]
    pub reason: String,
}

/// Chooses the detected element matching a description.
#[async_trait]
pub trait ElementArbiter: Send + Sync {
    async fn select(
        &self,
        description: &str,
        detected: &HashMap<String, DetectedElement>,
        screenshot_png: &[u8],
    ) -> Result<ArbiterChoice, AutomationError>;
}

/// A validated grounding verdict: the chosen key is guaranteed to come from
/// the detected set.
#[derive(Debug, Clone)]
pub struct GroundingResult {
    pub element_key: String,
    pub element: DetectedElement,
    pub confidence: f64,
    pub reason: String,
}

/// Detection plus arbitration behind one call.
pub struct VisualGrounder {
    backend: Box<dyn VisionBackend>,
    arbiter: Box<dyn ElementArbiter>,
}

impl VisualGrounder {
    pub fn new(backend: Box<dyn VisionBackend>, arbiter: Box<dyn ElementArbiter>) -> Self {
        Self { backend, arbiter }
    }

    /// Detect regions on the screenshot without arbitration.
    pub async fn detect(
        &self,
        screenshot_png: &[u8],
    ) -> Result<HashMap<String, DetectedElement>, AutomationError> {
        let detected = self.backend.detect(screenshot_png).await?;
        info!("vision backend detected {} elements", detected.len());
        Ok(detected)
    }

    /// Find the detected element matching `description`.
    #[instrument(skip(self, screenshot_png), fields(description = %description))]
    pub async fn find_element(
        &self,
        description: &str,
        screenshot_png: &[u8],
    ) -> Result<GroundingResult, AutomationError> {
        let detected = self.detect(screenshot_png).await?;
        if detected.is_empty() {
            return Err(AutomationError::ElementNotFound(
                "vision backend detected no elements on the screenshot".to_string(),
            ));
        }

        let choice = self
            .arbiter
            .select(description, &detected, screenshot_png)
            .await?;
        debug!(
            confidence = choice.confidence,
            reason = %choice.reason,
            "arbiter verdict: {:?}",
            choice.element_key
        );

        let key = choice.element_key.ok_or_else(|| {
            AutomationError::ElementNotFound(format!(
                "no detected element matches '{description}' ({})",
                choice.reason
            ))
        })?;

        // The arbiter answers free-form; only keys from the detected set count.
        let element = detected.get(&key).cloned().ok_or_else(|| {
            warn!("arbiter returned unknown key '{key}'");
            AutomationError::ElementNotFound(format!(
                "arbiter chose '{key}', which is not among the {} detected elements",
                detected.len()
            ))
        })?;

        Ok(GroundingResult {
            element_key: key,
            element,
            confidence: choice.confidence,
            reason: choice.reason,
        })
    }

    /// Ground `description` on the screenshot and return the chosen element
    /// as a candidate with pixel coordinates.
    pub async fn ground(
        &self,
        description: &str,
        screenshot_png: &[u8],
    ) -> Result<UiCandidate, AutomationError> {
        let result = self.find_element(description, screenshot_png).await?;
        let (width, height) = image_dimensions(screenshot_png)?;
        let bbox = bbox_to_pixels(result.element.bbox, width, height);
        Ok(UiCandidate {
            text: result.element.content,
            element_type: result.element.element_type,
            clickable: result.element.interactivity,
            enabled: true,
            bbox,
            source: CandidateSource::Vision,
            ..Default::default()
        })
    }
}

fn image_dimensions(screenshot_png: &[u8]) -> Result<(u32, u32), AutomationError> {
    let img = image::load_from_memory(screenshot_png)?;
    Ok((img.width(), img.height()))
}

/// Convert a normalized box to pixel coordinates on an image of the given size.
pub fn bbox_to_pixels(bbox: [f64; 4], width: u32, height: u32) -> BoundingBox {
    let [x1, y1, x2, y2] = bbox;
    let px1 = (x1 * width as f64).round() as i32;
    let py1 = (y1 * height as f64).round() as i32;
    let px2 = (x2 * width as f64).round() as i32;
    let py2 = (y2 * height as f64).round() as i32;
    BoundingBox::new(px1, py1, px2 - px1, py2 - py1)
}
