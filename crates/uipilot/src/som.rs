//! Set-of-Mark screenshot annotation.
//!
//! Draws a numbered bounding box over every candidate so a vision model can
//! refer to elements by index instead of raw coordinates. Tree candidates and
//! vision candidates get different colors so the two sources stay visually
//! distinct on the same frame.

use std::io::Cursor;
use std::sync::OnceLock;

use ab_glyph::{FontRef, PxScale};
use base64::Engine;
use image::{DynamicImage, Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut, draw_text_mut};
use imageproc::rect::Rect as ImageRect;
use tracing::{debug, warn};

use crate::errors::AutomationError;
use crate::types::{CandidateSource, UiCandidate};

const TREE_COLOR: Rgba<u8> = Rgba([34, 197, 94, 255]);
const VISION_COLOR: Rgba<u8> = Rgba([249, 115, 22, 255]);
const LABEL_TEXT_COLOR: Rgba<u8> = Rgba([255, 255, 255, 255]);

const LABEL_SCALE: f32 = 18.0;
const LABEL_HEIGHT: u32 = 22;
const BADGE_ALPHA: u8 = 230;

static FONT: OnceLock<Option<FontRef<'static>>> = OnceLock::new();

fn get_font() -> Option<&'static FontRef<'static>> {
    FONT.get_or_init(|| {
        // Candidate system fonts, first readable one wins. Without a font the
        // overlay degrades to numbered-less boxes, which is still usable.
        const CANDIDATES: &[&str] = &[
            "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
            "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
            "/usr/share/fonts/TTF/DejaVuSans.ttf",
            "/System/Library/Fonts/Helvetica.ttc",
            "C:\\Windows\\Fonts\\arialbd.ttf",
        ];
        for path in CANDIDATES {
            if let Ok(bytes) = std::fs::read(path) {
                let leaked: &'static [u8] = Box::leak(bytes.into_boxed_slice());
                if let Ok(font) = FontRef::try_from_slice(leaked) {
                    debug!("set-of-mark labels use font {path}");
                    return Some(font);
                }
            }
        }
        warn!("no usable system font found, set-of-mark overlay will draw boxes only");
        None
    })
    .as_ref()
}

/// Annotate `screenshot_png` with one numbered box per candidate, numbering
/// from 1 in list order. Candidates without a valid box are skipped but keep
/// their index, so the numbers on the image always match list positions.
pub fn annotate(
    screenshot_png: &[u8],
    candidates: &[UiCandidate],
) -> Result<Vec<u8>, AutomationError> {
    let mut img = image::load_from_memory(screenshot_png)?.to_rgba8();
    let font = get_font();
    let scale = PxScale::from(LABEL_SCALE);

    // Marks go on a transparent layer so semi-opaque badge fills blend with
    // the frame instead of overwriting it.
    let mut overlay = RgbaImage::new(img.width(), img.height());
    let mut drawn = 0usize;
    for (i, candidate) in candidates.iter().enumerate() {
        if !candidate.bbox.is_valid() {
            continue;
        }
        let color = match candidate.source {
            CandidateSource::Tree => TREE_COLOR,
            CandidateSource::Vision => VISION_COLOR,
        };
        if draw_mark(&mut overlay, candidate, i + 1, color, font, scale) {
            drawn += 1;
        }
    }
    image::imageops::overlay(&mut img, &overlay, 0, 0);
    debug!("set-of-mark overlay drew {drawn}/{} marks", candidates.len());

    let mut buf = Cursor::new(Vec::new());
    DynamicImage::ImageRgba8(img).write_to(&mut buf, image::ImageFormat::Png)?;
    Ok(buf.into_inner())
}

/// Same as [`annotate`], wrapped for transport as base64 PNG.
pub fn annotate_base64(
    screenshot_base64: &str,
    candidates: &[UiCandidate],
) -> Result<String, AutomationError> {
    let engine = base64::engine::general_purpose::STANDARD;
    let png = engine
        .decode(screenshot_base64)
        .map_err(|e| AutomationError::InvalidArgument(format!("invalid base64 screenshot: {e}")))?;
    let annotated = annotate(&png, candidates)?;
    Ok(engine.encode(annotated))
}

fn draw_mark(
    img: &mut RgbaImage,
    candidate: &UiCandidate,
    index: usize,
    color: Rgba<u8>,
    font: Option<&FontRef<'static>>,
    scale: PxScale,
) -> bool {
    let bbox = candidate.bbox;
    let (img_w, img_h) = (img.width() as i32, img.height() as i32);

    // Clamp to the frame; drop boxes entirely outside it.
    let x1 = bbox.x.max(0);
    let y1 = bbox.y.max(0);
    let x2 = (bbox.x + bbox.width).min(img_w);
    let y2 = (bbox.y + bbox.height).min(img_h);
    if x2 - x1 < 2 || y2 - y1 < 2 {
        return false;
    }
    let w = (x2 - x1) as u32;
    let h = (y2 - y1) as u32;

    draw_hollow_rect_mut(img, ImageRect::at(x1, y1).of_size(w, h), color);
    // 2px stroke via an inner rectangle.
    if w > 2 && h > 2 {
        draw_hollow_rect_mut(
            img,
            ImageRect::at(x1 + 1, y1 + 1).of_size(w - 2, h - 2),
            color,
        );
    }

    if let Some(f) = font {
        let label = index.to_string();
        let label_w = label.len() as u32 * 12 + 6;

        // Badge sits above the top edge, or just inside when that would clip.
        let tag_x = x1.min(img_w - label_w as i32).max(0);
        let mut tag_y = y1 - LABEL_HEIGHT as i32;
        if tag_y < 0 {
            tag_y = y1;
        }

        let badge = Rgba([color.0[0], color.0[1], color.0[2], BADGE_ALPHA]);
        draw_filled_rect_mut(
            img,
            ImageRect::at(tag_x, tag_y).of_size(label_w, LABEL_HEIGHT),
            badge,
        );
        draw_text_mut(img, LABEL_TEXT_COLOR, tag_x + 3, tag_y + 2, scale, f, &label);
    }
    true
}
