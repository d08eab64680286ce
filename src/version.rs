// Version information for the Face Detect Node

/// Full version string with feature description
pub const VERSION: &str = "v0.1.0-detect-annotate-2026-08-07";

/// Semantic version number
pub const VERSION_NUMBER: &str = "0.1.0";

/// Build date
pub const BUILD_DATE: &str = "2026-08-07";

/// Supported features in this version
pub const FEATURES: &[&str] = &[
    "detect-faces",
    "yolov8-onnx",
    "cpu-inference",
    "box-annotation",
    "base64-transport",
];

/// Get formatted version string for logging
pub fn get_version_string() -> String {
    format!("Face Detect Node {} ({})", VERSION_NUMBER, BUILD_DATE)
}
