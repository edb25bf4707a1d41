//! Draw labelled detection boxes onto an image.

use std::path::Path;

use ab_glyph::{FontArc, PxScale};
use anyhow::{Context, Result, anyhow};
use image::{DynamicImage, Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut, draw_text_mut, text_size};
use imageproc::rect::Rect;

use crate::mapper::PixelRect;
use crate::palette::LabelColorMap;

pub const DEFAULT_THICKNESS: u32 = 3;
pub const DEFAULT_FONT_SIZE: f32 = 24.0;

/// Largest accepted outline thickness, in pixels.
pub const MAX_THICKNESS: u32 = 64;
/// Largest accepted label text height, in pixels.
pub const MAX_FONT_SIZE: f32 = 512.0;

/// Label text color, readable on any tag background.
pub const TEXT_COLOR: Rgb<u8> = Rgb([255, 255, 255]);

/// Gap between the tag border and its text.
const TAG_INSET: u32 = 5;

/// Renders box outlines plus a filled label tag per box.
///
/// Glyphs need a TrueType font; without one the tag is still drawn, sized
/// from an estimated text width, so boxes stay identifiable by color.
#[derive(Clone)]
pub struct BoxRenderer {
    thickness: u32,
    font: Option<FontArc>,
    font_size: f32,
}

impl Default for BoxRenderer {
    fn default() -> Self {
        Self { thickness: DEFAULT_THICKNESS, font: None, font_size: DEFAULT_FONT_SIZE }
    }
}

impl BoxRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clamped to `1..=MAX_THICKNESS`.
    pub fn with_thickness(mut self, thickness: u32) -> Self {
        self.thickness = thickness.clamp(1, MAX_THICKNESS);
        self
    }

    pub fn with_font(mut self, font: FontArc) -> Self {
        self.font = Some(font);
        self
    }

    /// Clamped to `1.0..=MAX_FONT_SIZE`; a non-finite size keeps the default.
    pub fn with_font_size(mut self, font_size: f32) -> Self {
        self.font_size = if font_size.is_finite() {
            font_size.clamp(1.0, MAX_FONT_SIZE)
        } else {
            DEFAULT_FONT_SIZE
        };
        self
    }

    /// Read a `.ttf`/`.otf` file for label text.
    pub fn load_font(path: &Path) -> Result<FontArc> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read font file: {}", path.display()))?;
        FontArc::try_from_vec(bytes).map_err(|e| anyhow!("Invalid font {}: {e}", path.display()))
    }

    /// Paint `rects` onto a copy of `image`. The input is left untouched.
    ///
    /// Extends `colors` with any label it has not seen before.
    pub fn render(
        &self,
        image: &DynamicImage,
        rects: &[PixelRect],
        colors: &mut LabelColorMap,
    ) -> RgbImage {
        let mut canvas = image.to_rgb8();
        for rect in rects {
            let color = colors.color_for(&rect.label);
            self.draw_outline(&mut canvas, rect, color);
            self.draw_tag(&mut canvas, rect, color);
        }
        canvas
    }

    fn draw_outline(&self, canvas: &mut RgbImage, rect: &PixelRect, color: Rgb<u8>) {
        // The stroke straddles the box edge.
        let half = (self.thickness / 2) as i32;
        for step in 0..self.thickness as i32 {
            let inset = step - half;
            let width = rect.width() as i32 - 2 * inset;
            let height = rect.height() as i32 - 2 * inset;
            if width <= 0 || height <= 0 {
                continue;
            }
            let outline = Rect::at(rect.x1 as i32 + inset, rect.y1 as i32 + inset)
                .of_size(width as u32, height as u32);
            draw_hollow_rect_mut(canvas, outline, color);
        }
    }

    fn draw_tag(&self, canvas: &mut RgbImage, rect: &PixelRect, color: Rgb<u8>) {
        let (canvas_width, canvas_height) = canvas.dimensions();
        if canvas_width == 0 || canvas_height == 0 {
            return;
        }
        let (text_width, text_height) = self.measure(&rect.label);
        // Never larger than the canvas, whatever the label length.
        let tag_width = text_width.saturating_add(2 * TAG_INSET).min(canvas_width);
        let tag_height = text_height.saturating_add(2 * TAG_INSET).min(canvas_height);
        // Sits on the top edge; slides down into the box when there's no room above.
        let top = rect.y1.saturating_sub(tag_height) as i32;
        let left = rect.x1 as i32;

        draw_filled_rect_mut(canvas, Rect::at(left, top).of_size(tag_width, tag_height), color);
        if let Some(font) = &self.font {
            let inset = TAG_INSET as i32;
            draw_text_mut(
                canvas,
                TEXT_COLOR,
                left + inset,
                top + inset,
                self.scale(),
                font,
                &rect.label,
            );
        }
    }

    fn measure(&self, label: &str) -> (u32, u32) {
        match &self.font {
            Some(font) => text_size(self.scale(), font, label),
            None => {
                let glyphs = label.chars().count() as f32;
                ((glyphs * self.font_size * 0.5).ceil() as u32, self.font_size.ceil() as u32)
            }
        }
    }

    fn scale(&self) -> PxScale {
        PxScale::from(self.font_size)
    }
}
