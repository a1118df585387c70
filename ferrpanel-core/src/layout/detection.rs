use std::path::Path;

use serde::Deserialize;
use snafu::ResultExt;

use crate::{
    analysis::bbox::Bbox,
    error::{FerrpanelError, IoReadSnafu, JsonSnafu},
    layout::element::Detection,
};

/// Panels, content boxes (speech bubbles) and the panel↔content links a
/// panel/bubble association model asserts. Association pairs index into
/// `panels` and `contents` respectively.
#[derive(Clone, Debug, Default)]
pub struct AssociatedDetections {
    pub panels: Vec<Bbox>,
    pub contents: Vec<Bbox>,
    pub associations: Vec<(usize, usize)>,
}

/// Unordered panel-like boxes with no metadata beyond the rectangle.
#[derive(Clone, Debug, Default)]
pub struct RawDetections {
    pub boxes: Vec<Bbox>,
}

/// Detector output at the pipeline boundary.
#[derive(Clone, Debug)]
pub enum Detections {
    Associated(AssociatedDetections),
    Raw(RawDetections),
}

#[derive(Deserialize)]
struct AssociatedFile {
    panels: Vec<[f32; 4]>,
    #[serde(default, alias = "contents")]
    texts: Vec<[f32; 4]>,
    #[serde(default)]
    associations: Vec<(usize, usize)>,
}

#[derive(Deserialize)]
struct RawFile {
    boxes: Vec<[f32; 4]>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DetectionsFile {
    Raw(RawFile),
    Associated(AssociatedFile),
}

fn to_bboxes(raw: &[[f32; 4]]) -> Result<Vec<Bbox>, FerrpanelError> {
    raw.iter()
        .map(|&[x1, y1, x2, y2]| Bbox::from_xyxy(x1, y1, x2, y2))
        .collect()
}

impl AssociatedDetections {
    /// Checks that every association points at an existing panel and content box.
    pub fn validate(&self) -> Result<(), FerrpanelError> {
        for &(panel_idx, content_idx) in &self.associations {
            if panel_idx >= self.panels.len() || content_idx >= self.contents.len() {
                return Err(FerrpanelError::InvalidAssociation {
                    panel_idx,
                    content_idx,
                    panels: self.panels.len(),
                    contents: self.contents.len(),
                });
            }
        }
        Ok(())
    }
}

impl From<Vec<Detection>> for RawDetections {
    fn from(detections: Vec<Detection>) -> Self {
        Self {
            boxes: detections.into_iter().map(|d| d.bbox).collect(),
        }
    }
}

impl Detections {
    /// Parses either `{"panels", "texts", "associations"}` or `{"boxes"}`.
    ///
    /// Boxes are validated on the way in; association indices are validated
    /// as well so malformed input fails before any geometry runs.
    pub fn from_json_str(json: &str, path: &str) -> Result<Self, FerrpanelError> {
        let file: DetectionsFile = serde_json::from_str(json).context(JsonSnafu { path })?;

        let detections = match file {
            DetectionsFile::Raw(raw) => Detections::Raw(RawDetections {
                boxes: to_bboxes(&raw.boxes)?,
            }),
            DetectionsFile::Associated(file) => {
                let associated = AssociatedDetections {
                    panels: to_bboxes(&file.panels)?,
                    contents: to_bboxes(&file.texts)?,
                    associations: file.associations,
                };
                associated.validate()?;
                Detections::Associated(associated)
            }
        };

        Ok(detections)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, FerrpanelError> {
        let path = path.as_ref().to_string_lossy().to_string();
        let json = std::fs::read_to_string(&path).context(IoReadSnafu { path: &path })?;
        Self::from_json_str(&json, &path)
    }

    pub fn len(&self) -> usize {
        match self {
            Detections::Associated(associated) => associated.panels.len(),
            Detections::Raw(raw) => raw.boxes.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
