use std::path::{Path, PathBuf};

use ndarray::{ArrayBase, Dim, OwnedRepr};

use crate::{
    analysis::labels::Label,
    consts::*,
    inference::model::Model,
};

/// YOLO panel detector trained on manga109 (body, face, frame, text).
pub struct PanelYolo {
    path: PathBuf,
    config: YoloConfig,
}

pub type YoloInput = ArrayBase<OwnedRepr<f32>, Dim<[usize; 4]>>;
pub type YoloOutput = ArrayBase<OwnedRepr<f32>, Dim<[usize; 3]>>;

#[derive(Debug, Clone)]
pub struct YoloConfig {
    pub required_width: usize,
    pub required_height: usize,
    pub batch_size: usize,
    pub input_channels: usize,
    pub background_fill_value: f32,
    pub cxywh_size: usize,
    pub label_size: usize,
    pub proba_threshold: f32,
    pub iou_threshold: f32,
    /// Classes kept after decoding. All classes by default.
    pub labels: Vec<Label>,
}

impl Default for YoloConfig {
    fn default() -> Self {
        Self {
            required_width: REQUIRED_WIDTH as usize,
            required_height: REQUIRED_HEIGHT as usize,
            batch_size: BATCH_SIZE,
            input_channels: INPUT_CHANNELS,
            background_fill_value: BACKGROUND_FILL_VALUE,
            cxywh_size: CXYWH_OFFSET,
            label_size: LABEL_SIZE,
            proba_threshold: PROBA_THRESHOLD,
            iou_threshold: NMS_IOU_THRESHOLD,
            labels: Label::ALL.to_vec(),
        }
    }
}

impl PanelYolo {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self::with_config(path, YoloConfig::default())
    }

    pub fn with_config<P: Into<PathBuf>>(path: P, config: YoloConfig) -> Self {
        Self {
            path: path.into(),
            config,
        }
    }
}

impl Model for PanelYolo {
    type Input = YoloInput;

    type Output = YoloOutput;
    type Config = YoloConfig;

    const INPUT_NAME: &'static str = "images";

    const OUTPUT_NAME: &'static str = "output0";

    const MODEL_NAME: &'static str = "manga109-yolo";

    fn model_path(&self) -> &Path {
        &self.path
    }

    fn config(&self) -> &Self::Config {
        &self.config
    }
}
