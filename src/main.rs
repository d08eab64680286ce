// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{Context, Result};
use face_detect_node::{
    api::{start_server, AppState},
    vision::{YoloConfig, YoloDetector},
};
use std::{env, sync::Arc};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    // Initialize tracing subscriber for logging
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt::init();

    println!("🚀 Starting Face Detect Node...\n");
    println!("📦 {}", face_detect_node::version::get_version_string());
    println!();

    // Parse environment variables for configuration
    let api_port = env::var("API_PORT")
        .unwrap_or_else(|_| "8080".to_string())
        .parse::<u16>()
        .unwrap_or(8080);
    let model_path =
        env::var("MODEL_PATH").unwrap_or_else(|_| "./models/yolov8n.onnx".to_string());
    let confidence_threshold = env::var("CONFIDENCE_THRESHOLD")
        .ok()
        .and_then(|v| v.parse::<f32>().ok())
        .unwrap_or(0.25);
    let iou_threshold = env::var("IOU_THRESHOLD")
        .ok()
        .and_then(|v| v.parse::<f32>().ok())
        .unwrap_or(0.45);

    // Load the detection model once; it is held for the process lifetime
    println!("🧠 Loading detection model from {}...", model_path);
    let config = YoloConfig {
        model_path,
        confidence_threshold,
        iou_threshold,
        ..Default::default()
    };
    let detector = YoloDetector::new(config)
        .await
        .context("failed to load detection model")?;
    println!("✅ Detection model loaded");

    let state = AppState::new(Arc::new(detector));

    println!("\nAPI Endpoints:");
    println!("  Health:       http://localhost:{}/", api_port);
    println!(
        "  Detect:       POST http://localhost:{}/detect-faces",
        api_port
    );
    println!("\nTest with curl:");
    println!(
        "  curl -X POST http://localhost:{}/detect-faces \\",
        api_port
    );
    println!("    -H 'Content-Type: application/json' \\");
    println!("    -d '{{\"image\": \"<base64>\"}}'");
    println!("\nPress Ctrl+C to shutdown...\n");

    start_server(state, api_port).await?;

    println!("👋 Goodbye!");
    Ok(())
}
