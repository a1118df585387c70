use snafu::prelude::*;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum FerrpanelError {
    #[snafu(display(
        "Association ({}, {}) out of range: {} panels, {} contents",
        panel_idx,
        content_idx,
        panels,
        contents
    ))]
    InvalidAssociation {
        panel_idx: usize,
        content_idx: usize,
        panels: usize,
        contents: usize,
    },
    #[snafu(display("Invalid bbox [{}, {}, {}, {}]: {}", x1, y1, x2, y2, reason))]
    InvalidBbox {
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        reason: String,
    },
    #[snafu(display("Ort Session init stage `{}` error: {}", stage, source))]
    OrtInit {
        source: ort::error::Error,
        stage: String,
    },
    #[snafu(display("Build Tensor for `{}` error: {}", stage, source))]
    Tensor {
        source: ort::error::Error,
        stage: String,
    },
    #[snafu(display("Onnx Inference error: {}", source))]
    Inference { source: ort::error::Error },
    #[snafu(display("Onnx Output can not found {}", output_name))]
    NotFoundOutput { output_name: String },
    #[snafu(display("Ndarray Shape error at stage `{}`: {}", stage, source))]
    Shape {
        source: ndarray::ShapeError,
        stage: String,
    },
    #[snafu(display("Open image `{}` error: {}", path, source))]
    ImageOpen {
        source: image::ImageError,
        path: String,
    },
    #[snafu(display("Image Write error: {}", source))]
    ImageWrite {
        source: image::ImageError,
        path: String,
    },
    #[snafu(display("Read `{}` error: {}", path, source))]
    IoRead {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Write `{}` error: {}", path, source))]
    IoWrite {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Json `{}` error: {}", path, source))]
    Json {
        source: serde_json::Error,
        path: String,
    },
    #[snafu(display("Environment `{}` Not Found, error {}", name, source))]
    EnvNotFound {
        source: std::env::VarError,
        name: String,
    },
    #[snafu(display("Processing timed out after {} seconds", seconds))]
    Timeout { seconds: u64 },
    #[snafu(display("Blocking task failed: {}", source))]
    Join { source: tokio::task::JoinError },
}
