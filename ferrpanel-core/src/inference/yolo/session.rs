use glam::Vec2;
use image::{DynamicImage, GenericImageView, imageops::FilterType};
use ndarray::prelude::*;
use ort::{
    session::{Session, builder::SessionBuilder},
    value::TensorRef,
};
use snafu::{OptionExt, ResultExt};
use tracing::*;

use crate::{
    analysis::{bbox::Bbox, labels::Label},
    error::*,
    inference::model::{Model, OnnxSession},
    layout::element::Detection,
};

use super::model::{PanelYolo, YoloConfig};

pub struct YoloSession<M: Model> {
    session: Session,
    model: M,
}

/// Page geometry needed to map detections back onto the source image.
#[derive(Debug, Clone, Copy)]
pub struct PageMeta {
    /// Source image size.
    pub image_size: Vec2,
    /// Factor applied to the source image when letterboxing it.
    pub scale: f32,
}

impl PageMeta {
    pub fn new(image: &DynamicImage, config: &YoloConfig) -> Self {
        let (w0, h0) = image.dimensions();
        let scale = f32::min(
            config.required_width as f32 / w0 as f32,
            config.required_height as f32 / h0 as f32,
        );

        Self {
            image_size: Vec2::new(w0 as f32, h0 as f32),
            scale,
        }
    }

    fn resized_size(&self) -> Vec2 {
        (self.image_size * self.scale).round()
    }
}

impl YoloSession<PanelYolo> {
    pub fn new(session: SessionBuilder, model: PanelYolo) -> Result<Self, FerrpanelError> {
        let session = session
            .commit_from_file(model.model_path())
            .context(OrtInitSnafu { stage: "commit" })?;
        info!(
            "Loaded {} from {}",
            PanelYolo::MODEL_NAME,
            model.model_path().display()
        );

        Ok(Self { session, model })
    }

    /// Detects panel-like boxes on a page, in source image coordinates.
    pub fn detect(&mut self, image: &DynamicImage) -> Result<Vec<Detection>, FerrpanelError> {
        let meta = PageMeta::new(image, self.model.config());
        self.run(image, meta)
    }
}

impl OnnxSession<PanelYolo> for YoloSession<PanelYolo> {
    type Output = Vec<Detection>;
    type Extra = PageMeta;

    fn preprocess(
        &self,
        image: &DynamicImage,
    ) -> Result<<PanelYolo as Model>::Input, FerrpanelError> {
        let model_config = self.model.config();
        let resized = PageMeta::new(image, model_config).resized_size();

        // Resize into the top-left corner of the model canvas
        let resized_img =
            image.resize_exact(resized.x as u32, resized.y as u32, FilterType::Triangle);

        let mut input_tensor = Array4::zeros([
            model_config.batch_size,
            model_config.input_channels,
            model_config.required_height,
            model_config.required_width,
        ]);
        input_tensor.fill(model_config.background_fill_value);

        for (x, y, pixel) in resized_img.pixels() {
            let x = x as usize;
            let y = y as usize;
            if x >= model_config.required_width || y >= model_config.required_height {
                continue;
            }
            let [r, g, b, _] = pixel.0;
            input_tensor[[0, 0, y, x]] = r as f32 / 255.0;
            input_tensor[[0, 1, y, x]] = g as f32 / 255.0;
            input_tensor[[0, 2, y, x]] = b as f32 / 255.0;
        }

        Ok(input_tensor)
    }

    fn postprocess(
        &self,
        output: <PanelYolo as Model>::Output,
        extra: Self::Extra,
    ) -> Result<Self::Output, FerrpanelError> {
        let config = self.model.config();

        let mut detections = decode_predictions(config, &output, &extra);
        let raw_count = detections.len();

        nms(config, &mut detections);
        info!(
            "Decoded {} detections, kept {} after NMS",
            raw_count,
            detections.len()
        );

        Ok(detections)
    }

    fn infer(
        &mut self,
        input: <PanelYolo as Model>::Input,
        input_name: &str,
        output_name: &str,
    ) -> Result<<PanelYolo as Model>::Output, FerrpanelError> {
        let output = self
            .session
            .run(ort::inputs![
                input_name => TensorRef::from_array_view(&input).context(TensorSnafu{stage: "input"})?
            ])
            .context(InferenceSnafu {})?;

        let tensor = output
            .get(output_name)
            .context(NotFoundOutputSnafu { output_name })?
            .try_extract_array::<f32>()
            .context(TensorSnafu { stage: "extract" })?;

        // [batch, 4 + labels, anchors]; the anchor count depends on input size
        let output = tensor
            .into_dimensionality::<Ix3>()
            .context(ShapeSnafu { stage: "output" })?
            .to_owned();

        Ok(output)
    }
}

/// Turns raw `[1, 4 + labels, anchors]` predictions into detections above the
/// probability threshold, mapped back to source image coordinates.
pub(crate) fn decode_predictions(
    config: &YoloConfig,
    output: &Array3<f32>,
    meta: &PageMeta,
) -> Vec<Detection> {
    let mut detections = Vec::new();

    // Get the first batch slice (assuming batch size = 1)
    let output = output.slice(s![0, .., ..]);
    let label_end = config.cxywh_size + config.label_size;

    for prediction in output.axis_iter(Axis(1)) {
        if prediction.len() < label_end {
            break;
        }
        let cxywh: ArrayView1<f32> = prediction.slice(s![0..config.cxywh_size]);
        let probas = prediction.slice(s![config.cxywh_size..label_end]);

        let Some((label_idx, &proba)) = probas
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.total_cmp(b))
        else {
            continue;
        };

        if proba < config.proba_threshold {
            continue;
        }

        let Some(label) = Label::from_idx(label_idx) else {
            continue;
        };
        if !config.labels.contains(&label) {
            continue;
        }

        // Clamp on the letterboxed canvas, then undo the letterbox scale
        let bbox = Bbox::from_center_size(
            Vec2::new(cxywh[0], cxywh[1]),
            Vec2::new(cxywh[2], cxywh[3]),
        )
        .clamp(Vec2::ZERO, meta.resized_size())
        .scale(1. / meta.scale)
        .clamp(Vec2::ZERO, meta.image_size);

        detections.push(Detection { bbox, label, proba });
    }

    detections
}

/// Class-wise non-maximum suppression: among same-label detections whose IoU
/// exceeds the threshold only the most confident survives.
pub(crate) fn nms(config: &YoloConfig, detections: &mut Vec<Detection>) {
    if detections.len() <= 1 {
        return;
    }

    // Higher confidence detections will be processed first and have priority
    detections.sort_by(|a, b| b.proba.total_cmp(&a.proba));

    let mut keep_flags = vec![true; detections.len()];

    for current_index in 0..detections.len() {
        let current = detections[current_index];

        let suppressed = (0..current_index).any(|kept_index| {
            keep_flags[kept_index]
                && detections[kept_index].label == current.label
                && detections[kept_index].bbox.iou(&current.bbox) > config.iou_threshold
        });
        if suppressed {
            keep_flags[current_index] = false;
        }
    }

    let mut flags = keep_flags.into_iter();
    detections.retain(|_| flags.next().unwrap_or(false));
}
