// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{
    routing::{get, post},
    Router,
};
use std::{net::SocketAddr, sync::Arc};
use tower_http::cors::{Any, CorsLayer};

use crate::api::detect_faces::detect_faces_handler;
use crate::version;
use crate::vision::{Detector, StaticDetector};

/// Shared request-handler state: the process-wide detector instance,
/// constructed at startup and injected rather than held as a global.
#[derive(Clone)]
pub struct AppState {
    pub detector: Arc<dyn Detector>,
}

impl AppState {
    pub fn new(detector: Arc<dyn Detector>) -> Self {
        Self { detector }
    }

    /// State backed by a detector that never finds anything, so tests and
    /// router checks need no model file.
    pub fn new_for_test() -> Self {
        Self::new(Arc::new(StaticDetector::empty()))
    }
}

/// Build the application router. Factored out of [`start_server`] so tests
/// can drive it with `tower::ServiceExt::oneshot`.
pub fn create_app(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/", get(health_handler))
        // Detection endpoint
        .route("/detect-faces", post(detect_faces_handler))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

pub async fn start_server(state: AppState, port: u16) -> anyhow::Result<()> {
    let app = create_app(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("API server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("Shutdown signal received");
}

// Plain-text health string; String's IntoResponse serves it as text/plain
async fn health_handler() -> String {
    format!("✅ {} running", version::get_version_string())
}
