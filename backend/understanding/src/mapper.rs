//! Normalized (0–1000) to pixel coordinate mapping.

use serde::Serialize;

use crate::boxes::{BoundingBox, NORMALIZED_MAX};

/// Pixels added on every side of a mapped box.
pub const DEFAULT_PADDING: u32 = 5;

/// A box in the pixel frame of a concrete image.
///
/// Always satisfies `x1 <= x2 <= width` and `y1 <= y2 <= height` for the
/// image it was mapped against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PixelRect {
    pub label: String,
    pub x1: u32,
    pub y1: u32,
    pub x2: u32,
    pub y2: u32,
}

impl PixelRect {
    pub fn width(&self) -> u32 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> u32 {
        self.y2 - self.y1
    }

    pub fn is_degenerate(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }
}

/// Rescales normalized boxes and grows them by a fixed margin, clamped to the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoordinateMapper {
    padding: u32,
}

impl Default for CoordinateMapper {
    fn default() -> Self {
        Self { padding: DEFAULT_PADDING }
    }
}

impl CoordinateMapper {
    pub fn new(padding: u32) -> Self {
        Self { padding }
    }

    pub fn padding(&self) -> u32 {
        self.padding
    }

    /// Map one box onto a `width` x `height` image.
    pub fn map(&self, bbox: &BoundingBox, width: u32, height: u32) -> PixelRect {
        let (x1, x2) = self.axis(bbox.xmin, bbox.xmax, width);
        let (y1, y2) = self.axis(bbox.ymin, bbox.ymax, height);
        PixelRect { label: bbox.label.clone(), x1, y1, x2, y2 }
    }

    pub fn map_all(&self, boxes: &[BoundingBox], width: u32, height: u32) -> Vec<PixelRect> {
        boxes.iter().map(|b| self.map(b, width, height)).collect()
    }

    fn axis(&self, a: u32, b: u32, extent: u32) -> (u32, u32) {
        // Order first so hand-built boxes cannot produce start > end.
        let (lo, hi) = (a.min(b), a.max(b));
        let pad = i64::from(self.padding);
        let limit = i64::from(extent);
        let start = (to_pixels(lo, extent) - pad).clamp(0, limit);
        let end = (to_pixels(hi, extent) + pad).clamp(0, limit);
        (start as u32, end as u32)
    }
}

fn to_pixels(coord: u32, extent: u32) -> i64 {
    (f64::from(coord) / f64::from(NORMALIZED_MAX) * f64::from(extent)).round() as i64
}
