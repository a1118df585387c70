use glam::Vec2;
use image::{DynamicImage, GrayImage, Luma, Rgb, imageops};
use imageproc::{
    contrast::{ThresholdType, threshold},
    map::map_colors,
};
use rayon::prelude::*;

use crate::{analysis::bbox::Bbox, consts::INK_THRESHOLD};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShrinkConfig {
    /// Pixels at or below this intensity are ink.
    pub ink_threshold: u8,
}

impl Default for ShrinkConfig {
    fn default() -> Self {
        Self {
            ink_threshold: INK_THRESHOLD,
        }
    }
}

/// Tightens boxes to the inked content inside them.
///
/// Holds a grayscale copy of the page; every call only reads a crop of it, so
/// one wrapper can serve many boxes in parallel.
pub struct ShrinkWrapper {
    page: GrayImage,
    config: ShrinkConfig,
}

impl ShrinkWrapper {
    pub fn new(page: GrayImage, config: ShrinkConfig) -> Self {
        Self { page, config }
    }

    pub fn from_image(image: &DynamicImage, config: ShrinkConfig) -> Self {
        Self::new(bt601_gray(image), config)
    }

    /// Bounding box of the ink inside `bbox`, in page coordinates.
    ///
    /// The box is truncated to whole pixels and clipped to the page first.
    /// Falls back to the truncated box when the region holds no ink or lies
    /// outside the page. The result never extends past the truncated box.
    pub fn shrink(&self, bbox: &Bbox) -> Bbox {
        let bbox = bbox.trunc();
        let (width, height) = self.page.dimensions();
        let clipped = bbox.clamp(Vec2::ZERO, Vec2::new(width as f32, height as f32));

        let x = clipped.min.x as u32;
        let y = clipped.min.y as u32;
        let w = clipped.max.x as u32 - x;
        let h = clipped.max.y as u32 - y;
        if w == 0 || h == 0 {
            return bbox;
        }

        let region = imageops::crop_imm(&self.page, x, y, w, h).to_image();
        match ink_bounds(&region, self.config.ink_threshold) {
            Some(ink) => ink.translate(Vec2::new(x as f32, y as f32)),
            None => bbox,
        }
    }

    /// Shrinks every box, preserving order.
    pub fn shrink_all(&self, boxes: &[Bbox]) -> Vec<Bbox> {
        boxes.par_iter().map(|bbox| self.shrink(bbox)).collect()
    }
}

/// Grayscale conversion with BT.601 weights (0.299, 0.587, 0.114).
///
/// Uses 14-bit fixed point with rounding so values near the ink threshold
/// land on the same side as common scan-processing tools. `to_luma8` uses
/// Rec.709 weights and reads warm paper tones brighter.
pub fn bt601_gray(image: &DynamicImage) -> GrayImage {
    map_colors(&image.to_rgb8(), |Rgb([r, g, b])| {
        let luma = (r as u32 * 4899 + g as u32 * 9617 + b as u32 * 1868 + (1 << 13)) >> 14;
        Luma([luma.min(255) as u8])
    })
}

/// Tight pixel-aligned box around all pixels at or below `ink_threshold`.
///
/// The max corner is exclusive: a single ink pixel at (3, 4) yields
/// `[3, 4, 4, 5]`.
pub fn ink_bounds(region: &GrayImage, ink_threshold: u8) -> Option<Bbox> {
    let mask = threshold(region, ink_threshold, ThresholdType::BinaryInverted);

    let mut bounds: Option<(u32, u32, u32, u32)> = None;
    for (x, y, pixel) in mask.enumerate_pixels() {
        if pixel.0[0] == 0 {
            continue;
        }
        bounds = Some(match bounds {
            None => (x, y, x, y),
            Some((x1, y1, x2, y2)) => (x1.min(x), y1.min(y), x2.max(x), y2.max(y)),
        });
    }

    bounds.map(|(x1, y1, x2, y2)| {
        Bbox::new(
            Vec2::new(x1 as f32, y1 as f32),
            Vec2::new((x2 + 1) as f32, (y2 + 1) as f32),
        )
    })
}
