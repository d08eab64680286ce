// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod api;
pub mod version;
pub mod vision;

// Re-export main types
pub use api::{
    create_app, detect_faces_handler, start_server, ApiError, AppState, DetectFacesRequest,
    DetectFacesResponse, ErrorResponse, FaceBox,
};
pub use vision::{
    decode_base64_image, encode_jpeg_base64, Detection, Detector, ImageError, ImageInfo, PixelBox,
    StaticDetector, YoloConfig, YoloDetector,
};
