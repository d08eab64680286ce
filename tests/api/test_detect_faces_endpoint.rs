// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Detect-faces endpoint tests for POST /detect-faces
//!
//! These tests verify that detect_faces_handler correctly:
//! - Validates requests and returns appropriate errors
//! - Decodes, annotates and re-encodes images
//! - Reports clamped integer bounding boxes in model output order
//! - Handles all error cases gracefully
//!
//! The detector is injected through AppState, so the handler runs against a
//! StaticDetector stub and no model file is required.

use std::io::Cursor;
use std::sync::Arc;

use axum::{extract::State, Json};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};

use face_detect_node::{
    api::{detect_faces_handler, ApiError, AppState, DetectFacesRequest},
    vision::{Detection, Detector, StaticDetector},
};

/// Detector whose inference always fails, for the 500 path.
struct FailingDetector;

impl Detector for FailingDetector {
    fn detect(&self, _image: &DynamicImage) -> anyhow::Result<Vec<Detection>> {
        anyhow::bail!("model exploded")
    }

    fn name(&self) -> &str {
        "failing"
    }
}

fn detection(x1: f32, y1: f32, x2: f32, y2: f32) -> Detection {
    Detection {
        x1,
        y1,
        x2,
        y2,
        score: 0.9,
        class_id: 0,
    }
}

/// Encode an RGB image as base64 PNG, the request wire format.
fn png_base64(img: &RgbImage) -> String {
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .expect("PNG encode failed");
    STANDARD.encode(&bytes)
}

fn request_for(img: &RgbImage) -> DetectFacesRequest {
    DetectFacesRequest {
        image: Some(png_base64(img)),
    }
}

fn state_with(detections: Vec<Detection>) -> AppState {
    AppState::new(Arc::new(StaticDetector::with_detections(detections)))
}

/// Decode a response's detected_image back into pixels.
fn decode_detected(detected_image: &str) -> RgbImage {
    let bytes = STANDARD.decode(detected_image).expect("invalid base64");
    image::load_from_memory(&bytes)
        .expect("detected_image is not a decodable image")
        .to_rgb8()
}

fn is_green(pixel: &Rgb<u8>) -> bool {
    pixel[1] > 150 && pixel[0] < 120 && pixel[2] < 120
}

#[cfg(test)]
mod detect_faces_handler_tests {
    use super::*;

    // =========================================================================
    // Request validation (400 class)
    // =========================================================================

    #[tokio::test]
    async fn test_missing_image_returns_400() {
        let state = AppState::new_for_test();
        let request = DetectFacesRequest { image: None };

        let result = detect_faces_handler(State(state), Json(request)).await;

        let err = result.err().expect("should fail when image is missing");
        assert!(matches!(err, ApiError::MissingField(_)));
        assert_eq!(err.status_code(), 400);
        assert!(err.to_string().contains("image"));
    }

    #[tokio::test]
    async fn test_empty_image_returns_400() {
        let state = AppState::new_for_test();
        let request = DetectFacesRequest {
            image: Some("".to_string()),
        };

        let result = detect_faces_handler(State(state), Json(request)).await;

        let err = result.err().expect("should fail when image is empty");
        assert_eq!(err.status_code(), 400);
    }

    // =========================================================================
    // Decode failures (500, documented current behavior)
    // =========================================================================

    #[tokio::test]
    async fn test_invalid_base64_returns_500() {
        let state = AppState::new_for_test();
        let request = DetectFacesRequest {
            image: Some("not-valid-base64!!!".to_string()),
        };

        let result = detect_faces_handler(State(state), Json(request)).await;

        let err = result.err().expect("should fail with invalid base64");
        assert!(matches!(err, ApiError::Decode(_)));
        assert_eq!(err.status_code(), 500);
    }

    #[tokio::test]
    async fn test_non_image_data_returns_500() {
        let state = AppState::new_for_test();
        // Valid base64, but random bytes (not an image)
        let request = DetectFacesRequest {
            image: Some(STANDARD.encode([0x00, 0x01, 0x02, 0x03, 0x04, 0x05])),
        };

        let result = detect_faces_handler(State(state), Json(request)).await;

        let err = result.err().expect("should fail when data is not an image");
        assert!(matches!(err, ApiError::Decode(_)));
        assert_eq!(err.status_code(), 500);
    }

    // =========================================================================
    // Inference failures (500)
    // =========================================================================

    #[tokio::test]
    async fn test_detector_failure_returns_500() {
        let state = AppState::new(Arc::new(FailingDetector));
        let img = RgbImage::from_pixel(32, 32, Rgb([60, 60, 60]));

        let result = detect_faces_handler(State(state), Json(request_for(&img))).await;

        let err = result.err().expect("should surface detector failure");
        assert!(matches!(err, ApiError::Inference(_)));
        assert_eq!(err.status_code(), 500);
        assert!(err.to_string().contains("model exploded"));
    }

    // =========================================================================
    // Success paths
    // =========================================================================

    #[tokio::test]
    async fn test_no_detections_returns_empty_faces_and_unmarked_image() {
        let state = state_with(vec![]);
        let img = RgbImage::from_pixel(48, 32, Rgb([60, 60, 60]));

        let result = detect_faces_handler(State(state), Json(request_for(&img))).await;

        let response = result.expect("should succeed with zero detections").0;
        assert!(response.faces.is_empty());

        // Annotated image decodes to the same dimensions, with no rectangles
        let annotated = decode_detected(&response.detected_image);
        assert_eq!(annotated.width(), 48);
        assert_eq!(annotated.height(), 32);
        assert!(annotated.pixels().all(|p| !is_green(p)));
    }

    #[tokio::test]
    async fn test_detections_reported_and_drawn() {
        let state = state_with(vec![
            detection(10.0, 10.0, 30.0, 30.0),
            detection(40.0, 5.0, 60.0, 25.0),
        ]);
        let img = RgbImage::from_pixel(64, 64, Rgb([60, 60, 60]));

        let result = detect_faces_handler(State(state), Json(request_for(&img))).await;

        let response = result.expect("should succeed").0;

        // Model output order is preserved
        assert_eq!(response.faces.len(), 2);
        assert_eq!(
            (response.faces[0].x1, response.faces[0].y1),
            (10, 10)
        );
        assert_eq!(
            (response.faces[1].x1, response.faces[1].y1),
            (40, 5)
        );

        // Every reported box satisfies the coordinate invariants
        for face in &response.faces {
            assert!(face.x1 < face.x2);
            assert!(face.y1 < face.y2);
            assert!(face.x2 <= 64);
            assert!(face.y2 <= 64);
        }

        // Rectangles are drawn on the annotated image
        let annotated = decode_detected(&response.detected_image);
        assert_eq!(annotated.width(), 64);
        assert_eq!(annotated.height(), 64);
        assert!(is_green(annotated.get_pixel(10, 20)), "box edge not drawn");
        assert!(annotated.pixels().any(is_green));
    }

    #[tokio::test]
    async fn test_dimensions_preserved_for_non_square_input() {
        let state = state_with(vec![detection(5.0, 5.0, 20.0, 15.0)]);
        let img = RgbImage::from_pixel(120, 46, Rgb([200, 200, 200]));

        let result = detect_faces_handler(State(state), Json(request_for(&img))).await;

        let response = result.expect("should succeed").0;
        let annotated = decode_detected(&response.detected_image);
        assert_eq!(annotated.width(), 120);
        assert_eq!(annotated.height(), 46);
    }

    #[tokio::test]
    async fn test_out_of_bounds_detection_is_clamped() {
        let state = state_with(vec![detection(-10.0, -10.0, 80.0, 90.0)]);
        let img = RgbImage::from_pixel(32, 32, Rgb([60, 60, 60]));

        let result = detect_faces_handler(State(state), Json(request_for(&img))).await;

        let response = result.expect("should succeed").0;
        assert_eq!(response.faces.len(), 1);
        let face = &response.faces[0];
        assert_eq!((face.x1, face.y1, face.x2, face.y2), (0, 0, 32, 32));
    }

    #[tokio::test]
    async fn test_fully_outside_detection_is_filtered() {
        let state = state_with(vec![detection(-30.0, -30.0, -5.0, -5.0)]);
        let img = RgbImage::from_pixel(32, 32, Rgb([60, 60, 60]));

        let result = detect_faces_handler(State(state), Json(request_for(&img))).await;

        let response = result.expect("should succeed").0;
        assert!(response.faces.is_empty());
    }

    #[tokio::test]
    async fn test_jpeg_input_accepted() {
        let state = state_with(vec![]);
        let img = RgbImage::from_pixel(24, 24, Rgb([128, 128, 128]));

        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Jpeg)
            .expect("JPEG encode failed");
        let request = DetectFacesRequest {
            image: Some(STANDARD.encode(&bytes)),
        };

        let result = detect_faces_handler(State(state), Json(request)).await;
        assert!(result.is_ok(), "JPEG input should decode: {:?}", result.err());
    }

    #[tokio::test]
    async fn test_response_round_trips_through_decoder() {
        let state = state_with(vec![detection(2.0, 2.0, 10.0, 10.0)]);
        let img = RgbImage::from_pixel(16, 16, Rgb([60, 60, 60]));

        let result = detect_faces_handler(State(state), Json(request_for(&img))).await;
        let response = result.expect("should succeed").0;

        // Encoding then decoding the returned image must not fail
        let annotated = decode_detected(&response.detected_image);
        let re_encoded = png_base64(&annotated);
        assert!(!re_encoded.is_empty());
    }
}
