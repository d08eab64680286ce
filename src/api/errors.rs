// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::vision::ImageError;

/// Error wire shape: every failed request carries `{"error": "<message>"}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorResponse {
    pub error: String,
}

/// Typed request-pipeline error taxonomy.
///
/// Client input errors (a missing or oversized `image` field) map to 400;
/// everything downstream of validation - decode, inference, encode - maps to
/// 500, matching the deployed behavior this service preserves.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("missing field: {0}")]
    MissingField(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("failed to decode image: {0}")]
    Decode(ImageError),

    #[error("inference failed: {0}")]
    Inference(String),

    #[error("failed to encode image: {0}")]
    Encode(ImageError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::MissingField(_) | ApiError::InvalidRequest(_) => 400,
            ApiError::Decode(_)
            | ApiError::Inference(_)
            | ApiError::Encode(_)
            | ApiError::Internal(_) => 500,
        }
    }

    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            error: self.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        (status, Json(self.to_response())).into_response()
    }
}
