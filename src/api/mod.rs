// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod detect_faces;
pub mod errors;
pub mod http_server;

pub use detect_faces::{
    detect_faces_handler, DetectFacesRequest, DetectFacesResponse, FaceBox,
};
pub use errors::{ApiError, ErrorResponse};
pub use http_server::{create_app, start_server, AppState};
