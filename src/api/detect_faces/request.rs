// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Detect-faces request type and validation

use serde::{Deserialize, Serialize};

use crate::api::errors::ApiError;

/// Maximum image payload (10MB base64 encoded)
const MAX_IMAGE_SIZE: usize = 10 * 1024 * 1024;

/// Request for face detection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectFacesRequest {
    /// Base64-encoded image data
    #[serde(default)]
    pub image: Option<String>,
}

impl DetectFacesRequest {
    /// Validate the detection request
    pub fn validate(&self) -> Result<(), ApiError> {
        let image = match self.image.as_deref() {
            None | Some("") => return Err(ApiError::MissingField("image".to_string())),
            Some(image) => image,
        };

        if image.len() > MAX_IMAGE_SIZE {
            return Err(ApiError::InvalidRequest(format!(
                "image exceeds maximum size of {} bytes",
                MAX_IMAGE_SIZE
            )));
        }

        Ok(())
    }
}
