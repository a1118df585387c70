use std::path::Path;

use image::{DynamicImage, Rgb, RgbImage};
use imageproc::{drawing::draw_hollow_rect_mut, rect::Rect};
use snafu::ResultExt;

use crate::{
    analysis::bbox::Bbox,
    error::{FerrpanelError, ImageWriteSnafu},
};

/// Stroke width of drawn boxes, in pixels.
const STROKE: i32 = 3;

/// Color of the `idx`-th of `count` boxes, fading from red (first) to blue
/// (last) so the reading order stays visible without text.
fn order_color(idx: usize, count: usize) -> Rgb<u8> {
    let t = if count > 1 {
        idx as f32 / (count - 1) as f32
    } else {
        0.0
    };
    Rgb([((1.0 - t) * 255.0) as u8, 0, (t * 255.0) as u8])
}

/// Draws `boxes` over a copy of `image`, in the given order.
pub fn draw_boxes(image: &DynamicImage, boxes: &[Bbox]) -> RgbImage {
    let mut output_img = image.to_rgb8();

    for (idx, bbox) in boxes.iter().enumerate() {
        let [x1, y1, x2, y2] = bbox.to_xyxy();
        let width = (x2 - x1).max(0) as u32;
        let height = (y2 - y1).max(0) as u32;
        if width == 0 || height == 0 {
            continue;
        }

        let color = order_color(idx, boxes.len());
        for offset in 0..STROKE {
            let thick_rect = Rect::at(x1 + offset, y1 + offset).of_size(
                width.saturating_sub(2 * offset as u32).max(1),
                height.saturating_sub(2 * offset as u32).max(1),
            );
            draw_hollow_rect_mut(&mut output_img, thick_rect, color);
        }
    }

    output_img
}

/// Renders `boxes` onto `image` and saves the result to `output`.
pub fn save_boxes<P: AsRef<Path>>(
    image: &DynamicImage,
    boxes: &[Bbox],
    output: P,
) -> Result<(), FerrpanelError> {
    let output = output.as_ref();
    draw_boxes(image, boxes)
        .save(output)
        .context(ImageWriteSnafu {
            path: output.to_string_lossy().to_string(),
        })
}
