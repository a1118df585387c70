use std::{path::Path, time::Instant};

use derive_builder::Builder;
use serde::Serialize;
use snafu::ResultExt;
use tracing::*;

use crate::{
    analysis::bbox::Bbox,
    consts::INCLUSION_GAP,
    error::{FerrpanelError, IoWriteSnafu, JsonSnafu},
    layout::{
        detection::{AssociatedDetections, Detections, RawDetections},
        element::{InclusivePanels, ReadingOrder},
        inclusion::expand_panels,
        merge::{MergeConfig, merge_overlapping_boxes},
        order::{OrderConfig, sort_by_reading_order},
        shrink::{ShrinkConfig, ShrinkWrapper},
    },
};

/// Every tunable of layout reconstruction.
#[derive(Debug, Clone, Builder)]
#[builder(default)]
pub struct LayoutConfig {
    /// Pixel gap within which a content box still touches a panel.
    pub inclusion_gap: f32,
    pub merge: MergeConfig,
    pub order: OrderConfig,
    pub shrink: ShrinkConfig,
    /// Tighten ordered boxes to their ink when a page image is available.
    pub shrink_wrap: bool,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            inclusion_gap: INCLUSION_GAP,
            merge: MergeConfig::default(),
            order: OrderConfig::default(),
            shrink: ShrinkConfig::default(),
            shrink_wrap: true,
        }
    }
}

/// Result of either reconstruction flow.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum LayoutOutput {
    Inclusive(InclusivePanels),
    ReadingOrder(ReadingOrder),
}

impl LayoutOutput {
    pub fn len(&self) -> usize {
        match self {
            LayoutOutput::Inclusive(panels) => panels.panels.len(),
            LayoutOutput::ReadingOrder(order) => order.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn write_json<P: AsRef<Path>>(&self, path: P) -> Result<(), FerrpanelError> {
        let path = path.as_ref().to_string_lossy().to_string();
        let json = serde_json::to_string_pretty(self).context(JsonSnafu { path: &path })?;
        std::fs::write(&path, json).context(IoWriteSnafu { path })
    }
}

/// Grows each associated panel over its speech bubbles.
pub fn inclusive_panels(
    detections: &AssociatedDetections,
    config: &LayoutConfig,
) -> Result<InclusivePanels, FerrpanelError> {
    let panels = expand_panels(detections, config.inclusion_gap)?;
    info!(
        "Expanded {} panels over {} content boxes",
        panels.len(),
        detections.contents.len()
    );

    Ok(InclusivePanels { panels })
}

/// Merge, order and optionally shrink-wrap raw boxes.
///
/// Shrink-wrapping runs only when `config.shrink_wrap` is set and a wrapper
/// over the page image is supplied.
pub fn reading_order(
    detections: &RawDetections,
    wrapper: Option<&ShrinkWrapper>,
    config: &LayoutConfig,
) -> ReadingOrder {
    let start_time = Instant::now();
    let merged = merge_overlapping_boxes(&detections.boxes, &config.merge);
    info!(
        "Merged boxes in {:.2?}: {} -> {} boxes",
        start_time.elapsed(),
        detections.boxes.len(),
        merged.len()
    );

    let start_time = Instant::now();
    let ordered = sort_by_reading_order(&merged, &config.order);
    info!(
        "Sorted boxes in {:.2?} ({})",
        start_time.elapsed(),
        if config.order.rtl { "right-to-left" } else { "left-to-right" }
    );

    let final_boxes: Vec<Bbox> = match wrapper {
        Some(wrapper) if config.shrink_wrap => {
            let start_time = Instant::now();
            let shrunk = wrapper.shrink_all(&ordered);
            info!(
                "Shrink-wrapped {} panels in {:.2?}",
                shrunk.len(),
                start_time.elapsed()
            );
            shrunk
        }
        _ => {
            debug!("Skipping shrink-wrap");
            ordered
        }
    };

    ReadingOrder::from_ordered(final_boxes)
}

/// Runs whichever flow matches the detector output.
pub fn reconstruct(
    detections: &Detections,
    wrapper: Option<&ShrinkWrapper>,
    config: &LayoutConfig,
) -> Result<LayoutOutput, FerrpanelError> {
    match detections {
        Detections::Associated(associated) => {
            inclusive_panels(associated, config).map(LayoutOutput::Inclusive)
        }
        Detections::Raw(raw) => Ok(LayoutOutput::ReadingOrder(reading_order(
            raw, wrapper, config,
        ))),
    }
}
