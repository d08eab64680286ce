// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Vision pipeline: image transcoding, detection backends and annotation.
//!
//! This module provides:
//! - base64 + raster decode/encode for transport
//! - the [`Detector`] abstraction and its YOLOv8 ONNX backend
//! - bounding-box overlay drawing
//!
//! Inference runs on CPU only.

pub mod annotate;
pub mod detector;
pub mod image_utils;
pub mod yolo;

pub use annotate::draw_boxes;
pub use detector::{non_maximum_suppression, Detection, Detector, PixelBox, StaticDetector};
pub use image_utils::{
    decode_base64_image, detect_format, encode_jpeg_base64, ImageError, ImageInfo,
};
pub use yolo::{YoloConfig, YoloDetector};
