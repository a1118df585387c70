use tracing::*;

use crate::{analysis::bbox::Bbox, error::FerrpanelError, layout::detection::AssociatedDetections};

/// Grows every panel to cover its content boxes.
///
/// A content box is absorbed by panel `i` when the detector linked the two, or
/// when it lies within `gap` pixels of the panel as detected. The overlap test
/// always uses the panel's original box, so absorption order does not matter.
///
/// Returns one truncated box per input panel, in input order. Fails on the
/// first association that points outside `panels` or `contents`.
pub fn expand_panels(
    detections: &AssociatedDetections,
    gap: f32,
) -> Result<Vec<Bbox>, FerrpanelError> {
    detections.validate()?;

    let AssociatedDetections {
        panels,
        contents,
        associations,
    } = detections;

    let mut linked = vec![vec![false; contents.len()]; panels.len()];
    for &(panel_idx, content_idx) in associations {
        linked[panel_idx][content_idx] = true;
    }

    let expanded = panels
        .iter()
        .zip(&linked)
        .enumerate()
        .map(|(panel_idx, (panel, links))| {
            let mut absorbed = 0;
            let grown = contents
                .iter()
                .zip(links)
                .filter(|&(content, &is_linked)| is_linked || panel.overlaps(content, gap))
                .fold(*panel, |acc, (content, _)| {
                    absorbed += 1;
                    acc.union(content)
                });

            if absorbed > 0 {
                debug!(panel_idx, absorbed, "expanded panel");
            }
            grown.trunc()
        })
        .collect();

    Ok(expanded)
}
