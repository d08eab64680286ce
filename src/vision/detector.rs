// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Detection capability abstraction
//!
//! The detection model is an external collaborator: anything that maps a
//! pixel buffer to a set of scored bounding boxes. Handlers receive it as an
//! injected `Arc<dyn Detector>` so tests can substitute a static stub.

use anyhow::Result;
use image::DynamicImage;

/// A detected region in source-image pixel coordinates.
///
/// Coordinates are raw model output (f32, possibly slightly outside the
/// image); use [`Detection::to_pixel_box`] to get clamped integer corners.
#[derive(Debug, Clone, Copy)]
pub struct Detection {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
    /// Detection confidence score (0.0-1.0)
    pub score: f32,
    /// Model class index (COCO index for the YOLO backend)
    pub class_id: usize,
}

impl Detection {
    pub fn width(&self) -> f32 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> f32 {
        self.y2 - self.y1
    }

    pub fn area(&self) -> f32 {
        self.width() * self.height()
    }

    /// IoU (intersection over union) with another detection.
    pub fn iou(&self, other: &Detection) -> f32 {
        let ix1 = self.x1.max(other.x1);
        let iy1 = self.y1.max(other.y1);
        let ix2 = self.x2.min(other.x2);
        let iy2 = self.y2.min(other.y2);
        let inter = (ix2 - ix1).max(0.0) * (iy2 - iy1).max(0.0);
        if inter == 0.0 {
            return 0.0;
        }
        let union = self.area() + other.area() - inter;
        inter / union
    }

    /// Clamp to integer pixel corners within a `width` x `height` image.
    ///
    /// Returns `None` when the clamped box is degenerate (zero width or
    /// height), e.g. a detection entirely outside the image.
    pub fn to_pixel_box(&self, width: u32, height: u32) -> Option<PixelBox> {
        if width == 0 || height == 0 {
            return None;
        }

        let x1 = (self.x1.round() as i64).clamp(0, width as i64) as u32;
        let y1 = (self.y1.round() as i64).clamp(0, height as i64) as u32;
        let x2 = (self.x2.round() as i64).clamp(0, width as i64) as u32;
        let y2 = (self.y2.round() as i64).clamp(0, height as i64) as u32;

        (x1 < x2 && y1 < y2).then_some(PixelBox { x1, y1, x2, y2 })
    }
}

/// Axis-aligned box in integer pixel coordinates.
///
/// Invariant: x1 < x2, y1 < y2, all corners within the source image bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelBox {
    pub x1: u32,
    pub y1: u32,
    pub x2: u32,
    pub y2: u32,
}

impl PixelBox {
    pub fn width(&self) -> u32 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> u32 {
        self.y2 - self.y1
    }
}

/// Trait for object detection inference backends.
///
/// Implementations must be shareable across concurrent requests; inference
/// is stateless per call.
pub trait Detector: Send + Sync {
    /// Run inference on a decoded image and return detections in source
    /// pixel coordinates, in model output order. Zero detections is a
    /// success, not an error.
    fn detect(&self, image: &DynamicImage) -> Result<Vec<Detection>>;

    /// Backend name, for logging.
    fn name(&self) -> &str;
}

/// Greedy NMS: sort by confidence descending, suppress overlapping boxes.
pub fn non_maximum_suppression(mut boxes: Vec<Detection>, iou_threshold: f32) -> Vec<Detection> {
    boxes.sort_unstable_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut kept: Vec<Detection> = Vec::new();
    let mut suppressed = vec![false; boxes.len()];

    for i in 0..boxes.len() {
        if suppressed[i] {
            continue;
        }
        kept.push(boxes[i]);
        for j in (i + 1)..boxes.len() {
            if boxes[i].iou(&boxes[j]) > iou_threshold {
                suppressed[j] = true;
            }
        }
    }

    kept
}

/// Detector returning a fixed set of detections, for tests and handler
/// wiring without a model file.
#[derive(Debug, Clone, Default)]
pub struct StaticDetector {
    detections: Vec<Detection>,
}

impl StaticDetector {
    /// A detector that never finds anything.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_detections(detections: Vec<Detection>) -> Self {
        Self { detections }
    }
}

impl Detector for StaticDetector {
    fn detect(&self, _image: &DynamicImage) -> Result<Vec<Detection>> {
        Ok(self.detections.clone())
    }

    fn name(&self) -> &str {
        "static"
    }
}
