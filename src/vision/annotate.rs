// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Detection overlay drawing: hollow rectangles marking detected regions.

use image::{Rgb, RgbImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;

use super::detector::PixelBox;

const BOX_COLOR: Rgb<u8> = Rgb([0, 255, 0]);

const BOX_THICKNESS: u32 = 2;

/// Draw a rectangle outline on the image for each box.
///
/// Boxes must already be clamped to the image bounds (see
/// [`crate::vision::Detection::to_pixel_box`]); the stroke is inset so the
/// overlay never extends past the box itself. Output dimensions always equal
/// input dimensions.
pub fn draw_boxes(img: &mut RgbImage, boxes: &[PixelBox]) {
    for bbox in boxes {
        draw_box(img, bbox);
    }
}

fn draw_box(img: &mut RgbImage, bbox: &PixelBox) {
    let width = bbox.width();
    let height = bbox.height();

    for t in 0..BOX_THICKNESS {
        // Stroke rings shrink inward; stop once the box is too small
        if width <= 2 * t || height <= 2 * t {
            break;
        }

        let rect = Rect::at((bbox.x1 + t) as i32, (bbox.y1 + t) as i32)
            .of_size(width - 2 * t, height - 2 * t);
        draw_hollow_rect_mut(img, rect, BOX_COLOR);
    }
}
