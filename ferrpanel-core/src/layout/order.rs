use crate::{analysis::bbox::Bbox, consts::ROW_BREAK_RATIO};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrderConfig {
    /// A box opens a new row when its top exceeds this fraction of the
    /// previous box's bottom.
    pub row_break_ratio: f32,
    /// Right-to-left rows (manga); left-to-right otherwise.
    pub rtl: bool,
}

impl Default for OrderConfig {
    fn default() -> Self {
        Self {
            row_break_ratio: ROW_BREAK_RATIO,
            rtl: true,
        }
    }
}

/// Partitions boxes into horizontal rows, top to bottom.
///
/// Boxes are stably sorted by top edge, then scanned once: a box joins the
/// current row unless its top lies below `row_break_ratio` times the bottom of
/// the box appended just before it.
pub fn group_rows(boxes: &[Bbox], row_break_ratio: f32) -> Vec<Vec<Bbox>> {
    let mut sorted = boxes.to_vec();
    sorted.sort_by(|a, b| a.min.y.total_cmp(&b.min.y));

    let mut rows = Vec::new();
    let mut current: Vec<Bbox> = Vec::new();
    for bbox in sorted {
        let breaks = current
            .last()
            .is_some_and(|last| bbox.min.y > last.max.y * row_break_ratio);
        if breaks {
            rows.push(std::mem::take(&mut current));
        }
        current.push(bbox);
    }
    if !current.is_empty() {
        rows.push(current);
    }

    rows
}

/// Orders boxes for reading: rows top to bottom, then right-to-left within a
/// row when `rtl` is set, left-to-right otherwise.
///
/// Single-level only: columns nested inside a row are not segmented further.
pub fn sort_by_reading_order(boxes: &[Bbox], config: &OrderConfig) -> Vec<Bbox> {
    group_rows(boxes, config.row_break_ratio)
        .into_iter()
        .flat_map(|mut row| {
            if config.rtl {
                row.sort_by(|a, b| b.min.x.total_cmp(&a.min.x));
            } else {
                row.sort_by(|a, b| a.min.x.total_cmp(&b.min.x));
            }
            row
        })
        .collect()
}
