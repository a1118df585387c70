use crate::analysis::labels::Label;

/// Gap in pixels within which a content box still counts as touching a panel.
///
/// Speech bubbles frequently sit just outside the detected panel border, so the
/// inclusion test tolerates a few pixels of white gutter between the two.
pub const INCLUSION_GAP: f32 = 5.0;

/// Minimum overlap ratio (intersection / smaller area) for two same-row boxes to merge.
///
/// - Lower values (0.1-0.2): Merge aggressively, may fuse neighbouring panels
/// - Higher values (0.5+): Merge only near-duplicates
pub const MERGE_OVERLAP_THRESHOLD: f32 = 0.3;

/// Fraction of the shorter box's height that must overlap vertically for two
/// boxes to be considered on the same row.
pub const SAME_ROW_RATIO: f32 = 0.5;

/// A box starts a new row once its top edge exceeds this fraction of the
/// previous box's bottom edge.
pub const ROW_BREAK_RATIO: f32 = 0.95;

/// Grayscale intensity at or below which a pixel counts as ink.
///
/// Anything brighter is treated as near-white paper background.
pub const INK_THRESHOLD: u8 = 245;

/// The number of values representing bounding box coordinates in YOLO format.
///
/// YOLO format uses 4 values: [center_x, center_y, width, height]
/// This constant defines the offset where class probability data begins
/// in the model output tensor.
pub const CXYWH_OFFSET: usize = 4;

/// The number of classes the panel detector was trained on.
pub const LABEL_SIZE: usize = Label::label_size();

/// Minimum confidence threshold for accepting a detection.
pub const PROBA_THRESHOLD: f32 = 0.25;

/// IoU threshold for Non-Maximum Suppression (NMS).
///
/// When two same-class detections have an IoU above this value, the one with
/// the lower confidence is suppressed.
pub const NMS_IOU_THRESHOLD: f32 = 0.6;

/// Required input width for the panel detector.
pub const REQUIRED_WIDTH: u32 = 640;

/// Required input height for the panel detector.
pub const REQUIRED_HEIGHT: u32 = 640;

/// Number of color channels in the input image.
pub const INPUT_CHANNELS: usize = 3;

/// Batch size for model inference.
pub const BATCH_SIZE: usize = 1;

/// Background fill value for letterbox padding (114/255, the usual YOLO gray).
pub const BACKGROUND_FILL_VALUE: f32 = 114.0 / 255.0;

/// Wall-clock budget for one reading-order run.
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Environment variable holding the panel detector ONNX path.
pub const MODEL_PATH_ENV_NAME: &str = "FERRPANEL_MODEL_PATH";
