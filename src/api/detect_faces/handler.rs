// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Detect-faces endpoint handler

use axum::{extract::State, Json};
use tracing::{debug, info, warn};

use super::request::DetectFacesRequest;
use super::response::{DetectFacesResponse, FaceBox};
use crate::api::errors::ApiError;
use crate::api::http_server::AppState;
use crate::vision::{decode_base64_image, draw_boxes, encode_jpeg_base64, PixelBox};

/// POST /detect-faces - Detect regions in an image and annotate them
///
/// Accepts a base64-encoded image, runs the configured detection model and
/// returns the annotated image (base64 JPEG) plus bounding box coordinates.
///
/// # Request
/// - `image`: Base64-encoded image data (required)
///
/// # Response
/// - `detected_image`: Base64-encoded annotated JPEG
/// - `faces`: Bounding boxes in model output order
///
/// # Errors
/// - 400 Bad Request: `image` field missing or payload oversized
/// - 500 Internal Server Error: decode, inference or encode failure
pub async fn detect_faces_handler(
    State(state): State<AppState>,
    Json(request): Json<DetectFacesRequest>,
) -> Result<Json<DetectFacesResponse>, ApiError> {
    debug!("detect-faces request received");

    // 1. Validate request
    if let Err(e) = request.validate() {
        warn!("detect-faces validation failed: {}", e);
        return Err(e);
    }

    let image_data = request
        .image
        .as_deref()
        .ok_or_else(|| ApiError::MissingField("image".to_string()))?;

    // 2. Decode base64 image
    let (image, image_info) = decode_base64_image(image_data).map_err(|e| {
        warn!("Failed to decode image: {}", e);
        ApiError::Decode(e)
    })?;

    debug!(
        "Decoded image: {}x{}, {} bytes",
        image_info.width, image_info.height, image_info.size_bytes
    );

    // 3. Run detection
    let detections = state.detector.detect(&image).map_err(|e| {
        warn!("Detection failed: {}", e);
        ApiError::Inference(e.to_string())
    })?;

    info!(
        "Detection complete: {} regions (model: {})",
        detections.len(),
        state.detector.name()
    );

    // 4. Annotate: clamp to integer pixel boxes, drop degenerates, draw
    let boxes: Vec<PixelBox> = detections
        .iter()
        .filter_map(|d| d.to_pixel_box(image_info.width, image_info.height))
        .collect();

    let mut annotated = image.to_rgb8();
    draw_boxes(&mut annotated, &boxes);

    // 5. Re-encode for transport
    let detected_image = encode_jpeg_base64(&annotated).map_err(|e| {
        warn!("Failed to encode annotated image: {}", e);
        ApiError::Encode(e)
    })?;

    // 6. Build response; faces are the same boxes that were drawn
    let faces: Vec<FaceBox> = boxes.into_iter().map(FaceBox::from).collect();

    Ok(Json(DetectFacesResponse::new(detected_image, faces)))
}
