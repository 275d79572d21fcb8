//! Geometry and identity helpers shared by both pipelines.
//!
//! OCR detections arrive as pixel-space polygons; the labeling tool stores
//! coordinates as percentages of the image dimensions; the downstream layout
//! model wants integers on a fixed 0-1000 scale. The conversions between
//! those representations live here, next to the region-id generator that
//! ties one region's box, transcript, and label entries together.

use anyhow::{anyhow, Result};
use labelprep_ocr::Point;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Axis-aligned box in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Box in percentages of the image dimensions.
///
/// Values sit in [0, 100) but may spill slightly past the top end on noisy
/// detections; nothing clamps them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PercentBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Returns an opaque id correlating the box, transcript, and label entries
/// that describe the same region within a task document.
pub fn region_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Converts two opposite polygon corners into an `(x, y, width, height)` box.
///
/// The arguments are the fixed polygon indices 0 and 2 of the engine's
/// documented corner order (top-left and bottom-right), so width and height
/// are plain differences; nothing re-sorts the corners here.
pub fn corners_to_xywh(top_left: Point, bottom_right: Point) -> PixelBox {
    PixelBox {
        x: top_left.x,
        y: top_left.y,
        width: bottom_right.x - top_left.x,
        height: bottom_right.y - top_left.y,
    }
}

/// Scales a pixel box to percentages of the image dimensions: x and width
/// against the width, y and height against the height.
pub fn normalize_to_percent(bbox: PixelBox, width: u32, height: u32) -> Result<PercentBox> {
    if width == 0 || height == 0 {
        return Err(anyhow!("degenerate image dimensions {width}x{height}"));
    }

    let w = f64::from(width);
    let h = f64::from(height);

    Ok(PercentBox {
        x: f64::from(bbox.x) / w * 100.0,
        y: f64::from(bbox.y) / h * 100.0,
        width: f64::from(bbox.width) / w * 100.0,
        height: f64::from(bbox.height) / h * 100.0,
    })
}

/// Rescales a percentage box to the layout model's fixed integer range:
/// every component is multiplied by 10 and truncated toward zero, yielding
/// values in [0, 1000]. Truncation (not rounding) is part of the model's
/// input contract.
pub fn denormalize_to_scale(bbox: PercentBox) -> [i32; 4] {
    [
        (bbox.x * 10.0) as i32,
        (bbox.y * 10.0) as i32,
        (bbox.width * 10.0) as i32,
        (bbox.height * 10.0) as i32,
    ]
}
