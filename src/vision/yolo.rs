// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! YOLOv8 detection backend
//!
//! Loads a YOLOv8 ONNX export and implements [`Detector`] over it. Runs on
//! the CPU execution provider; the session is created once at startup and
//! held for the process lifetime.

use anyhow::{Context, Result};
use image::imageops::FilterType;
use image::DynamicImage;
use ndarray::{Array4, ArrayViewD, IxDyn};
use ort::execution_providers::CPUExecutionProvider;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Value;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

use super::detector::{non_maximum_suppression, Detection, Detector};

/// Configuration for loading the YOLO detection model
#[derive(Debug, Clone)]
pub struct YoloConfig {
    /// Path to the ONNX model file
    pub model_path: String,
    /// Model input size (square), 640 for the standard YOLOv8 exports
    pub input_size: u32,
    /// Confidence threshold for detections
    pub confidence_threshold: f32,
    /// IoU threshold for NMS
    pub iou_threshold: f32,
    /// Cap on detections returned per image
    pub max_detections: usize,
}

impl Default for YoloConfig {
    fn default() -> Self {
        Self {
            model_path: "./models/yolov8n.onnx".to_string(),
            input_size: 640,
            confidence_threshold: 0.25,
            iou_threshold: 0.45,
            max_detections: 100,
        }
    }
}

/// YOLOv8 object detection model
pub struct YoloDetector {
    /// ONNX Runtime session (thread-safe)
    session: Arc<Mutex<Session>>,
    /// Model input name
    input_name: String,
    config: YoloConfig,
}

impl std::fmt::Debug for YoloDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YoloDetector")
            .field("input_name", &self.input_name)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl YoloDetector {
    /// Load the detection model from `config.model_path`.
    ///
    /// # Errors
    /// Returns error if:
    /// - Model file not found
    /// - ONNX Runtime initialization fails
    pub async fn new(config: YoloConfig) -> Result<Self> {
        let model_path = Path::new(&config.model_path);

        // Validate path exists
        if !model_path.exists() {
            anyhow::bail!("Detection model not found: {}", model_path.display());
        }

        info!("Loading detection model from {}", model_path.display());

        // Load ONNX model with CPU-only execution
        let session = Session::builder()
            .context("Failed to create session builder")?
            .with_execution_providers([CPUExecutionProvider::default().build()])
            .context("Failed to set CPU execution provider")?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .context("Failed to set optimization level")?
            .with_intra_threads(4)
            .context("Failed to set intra threads")?
            .commit_from_file(model_path)
            .context(format!(
                "Failed to load detection model from {}",
                model_path.display()
            ))?;

        // Get input name
        let input_name = session
            .inputs
            .first()
            .map(|input| input.name.clone())
            .unwrap_or_else(|| "images".to_string());

        debug!("Detection model loaded - input: {}", input_name);

        info!("✅ Detection model loaded successfully (CPU-only)");

        Ok(Self {
            session: Arc::new(Mutex::new(session)),
            input_name,
            config,
        })
    }
}

impl Detector for YoloDetector {
    fn detect(&self, image: &DynamicImage) -> Result<Vec<Detection>> {
        let input = preprocess(image, self.config.input_size);

        // Run inference
        let mut session = self.session.lock().unwrap();

        let input_value = Value::from_array(input).context("Failed to create input tensor")?;

        let outputs = session
            .run(ort::inputs![&self.input_name => input_value])
            .context("Detection inference failed")?;

        let output_tensor = outputs[0]
            .try_extract_array::<f32>()
            .context("Failed to extract output tensor")?;

        let detections = parse_detections(
            &self.config,
            output_tensor.view(),
            image.width(),
            image.height(),
        )?;

        debug!("Detected {} regions", detections.len());

        Ok(detections)
    }

    fn name(&self) -> &str {
        "yolov8"
    }
}

/// Resize to the model input square and convert to an NCHW float tensor
/// normalised to [0, 1].
fn preprocess(image: &DynamicImage, input_size: u32) -> Array4<f32> {
    let resized = image
        .resize_exact(input_size, input_size, FilterType::Triangle)
        .to_rgb8();

    let size = input_size as usize;
    let mut input = Array4::<f32>::zeros((1, 3, size, size));
    for (x, y, pixel) in resized.enumerate_pixels() {
        input[[0, 0, y as usize, x as usize]] = pixel[0] as f32 / 255.0;
        input[[0, 1, y as usize, x as usize]] = pixel[1] as f32 / 255.0;
        input[[0, 2, y as usize, x as usize]] = pixel[2] as f32 / 255.0;
    }

    input
}

/// Parse model output into detections in source pixel space.
///
/// The YOLOv8 output is `[1, 4 + num_classes, num_proposals]`: four
/// center-size box rows followed by per-class score rows, one column per
/// proposal. Proposals below the confidence threshold are dropped, boxes are
/// converted to corners and scaled back to the source image, then greedy NMS
/// is applied and the result capped at `max_detections`.
fn parse_detections(
    config: &YoloConfig,
    output: ArrayViewD<f32>,
    src_width: u32,
    src_height: u32,
) -> Result<Vec<Detection>> {
    let shape = output.shape();

    if shape.len() != 3 || shape[0] != 1 || shape[1] <= 4 {
        anyhow::bail!("Unexpected detection output shape: {:?}", shape);
    }

    let num_classes = shape[1] - 4;
    let num_proposals = shape[2];

    let scale_x = src_width as f32 / config.input_size as f32;
    let scale_y = src_height as f32 / config.input_size as f32;

    let mut candidates: Vec<Detection> = Vec::new();

    for i in 0..num_proposals {
        // Rows: [cx, cy, w, h, cls0_score, cls1_score, ...]
        let cx = output[IxDyn(&[0, 0, i])];
        let cy = output[IxDyn(&[0, 1, i])];
        let w = output[IxDyn(&[0, 2, i])];
        let h = output[IxDyn(&[0, 3, i])];

        // Best class for this proposal
        let mut best_class = 0usize;
        let mut best_score = 0f32;
        for c in 0..num_classes {
            let score = output[IxDyn(&[0, 4 + c, i])];
            if score > best_score {
                best_score = score;
                best_class = c;
            }
        }

        if best_score < config.confidence_threshold {
            continue;
        }

        // Center-size in input space -> corners in source pixel space
        let x1 = (cx - w / 2.0) * scale_x;
        let y1 = (cy - h / 2.0) * scale_y;
        let x2 = (cx + w / 2.0) * scale_x;
        let y2 = (cy + h / 2.0) * scale_y;

        candidates.push(Detection {
            x1: x1.max(0.0),
            y1: y1.max(0.0),
            x2: x2.min(src_width as f32),
            y2: y2.min(src_height as f32),
            score: best_score,
            class_id: best_class,
        });
    }

    let mut kept = non_maximum_suppression(candidates, config.iou_threshold);
    kept.truncate(config.max_detections);

    Ok(kept)
}
