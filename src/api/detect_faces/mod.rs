// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Detect-faces API endpoint module
//!
//! Provides POST /detect-faces for detecting and annotating regions in
//! images.

pub mod handler;
pub mod request;
pub mod response;

pub use handler::detect_faces_handler;
pub use request::DetectFacesRequest;
pub use response::{DetectFacesResponse, FaceBox};
