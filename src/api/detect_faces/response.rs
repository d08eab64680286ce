// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Detect-faces response types

use serde::{Deserialize, Serialize};

use crate::vision::PixelBox;

/// Bounding box for a detected region, in pixel coordinates of the input
/// image. Invariant: x1 < x2, y1 < y2, all corners within image bounds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct FaceBox {
    pub x1: u32,
    pub y1: u32,
    pub x2: u32,
    pub y2: u32,
}

impl From<PixelBox> for FaceBox {
    fn from(b: PixelBox) -> Self {
        Self {
            x1: b.x1,
            y1: b.y1,
            x2: b.x2,
            y2: b.y2,
        }
    }
}

/// Response from face detection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectFacesResponse {
    /// Base64-encoded annotated image (JPEG)
    pub detected_image: String,
    /// Detected regions, in model output order
    pub faces: Vec<FaceBox>,
}

impl DetectFacesResponse {
    pub fn new(detected_image: String, faces: Vec<FaceBox>) -> Self {
        Self {
            detected_image,
            faces,
        }
    }
}
