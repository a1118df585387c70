use tracing::*;

use crate::{
    analysis::bbox::Bbox,
    consts::{MERGE_OVERLAP_THRESHOLD, SAME_ROW_RATIO},
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MergeConfig {
    /// Minimum intersection / smaller-area ratio for a merge.
    pub overlap_threshold: f32,
    /// Fraction of the shorter height two boxes must share to be on one row.
    pub same_row_ratio: f32,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            overlap_threshold: MERGE_OVERLAP_THRESHOLD,
            same_row_ratio: SAME_ROW_RATIO,
        }
    }
}

impl MergeConfig {
    fn mergeable(&self, a: &Bbox, b: &Bbox) -> bool {
        // same_row implies a positive vertical overlap, so the intersection
        // is exactly horizontal_overlap * vertical_overlap here
        a.same_row(b, self.same_row_ratio) && a.overlap_ratio(b) > self.overlap_threshold
    }

    fn first_mergeable(&self, boxes: &[Bbox]) -> Option<(usize, usize)> {
        (0..boxes.len()).find_map(|i| {
            (i + 1..boxes.len())
                .find(|&j| self.mergeable(&boxes[i], &boxes[j]))
                .map(|j| (i, j))
        })
    }
}

/// Collapses same-row boxes that overlap beyond the configured ratio.
///
/// Runs to a fixpoint: the first mergeable pair `(i, j)` in collection order
/// is replaced by its union at position `i`, `j` is removed, and the scan
/// restarts from the front. A merged box may therefore absorb further boxes.
/// Which pair merges first depends on input order, so the exact shape of a
/// three-way merge does too.
pub fn merge_overlapping_boxes(boxes: &[Bbox], config: &MergeConfig) -> Vec<Bbox> {
    let mut boxes = boxes.to_vec();
    if boxes.len() <= 1 {
        return boxes;
    }

    while let Some((i, j)) = config.first_mergeable(&boxes) {
        debug!(i, j, "merging boxes {:?} and {:?}", boxes[i], boxes[j]);
        boxes[i] = boxes[i].union(&boxes[j]);
        boxes.remove(j);
    }

    boxes
}

#[cfg(test)]
mod tests {
    use glam::Vec2;

    use super::*;

    fn bbox(x1: f32, y1: f32, x2: f32, y2: f32) -> Bbox {
        Bbox::new(Vec2::new(x1, y1), Vec2::new(x2, y2))
    }

    #[test]
    fn test_merge_half_overlap() {
        let boxes = [bbox(0.0, 0.0, 10.0, 10.0), bbox(5.0, 5.0, 15.0, 15.0)];
        let merged = merge_overlapping_boxes(&boxes, &MergeConfig::default());
        assert_eq!(merged, vec![bbox(0.0, 0.0, 15.0, 15.0)]);
    }

    #[test]
    fn test_merge_requires_same_row() {
        // Large horizontal overlap but only 3 of 10 pixels shared vertically
        let boxes = [bbox(0.0, 0.0, 10.0, 10.0), bbox(0.0, 7.0, 10.0, 17.0)];
        let merged = merge_overlapping_boxes(&boxes, &MergeConfig::default());
        assert_eq!(merged, boxes.to_vec());
    }

    #[test]
    fn test_merge_requires_overlap_ratio() {
        // Same row, 2x10 = 20 shared of min area 100
        let boxes = [bbox(0.0, 0.0, 10.0, 10.0), bbox(8.0, 0.0, 18.0, 10.0)];
        let merged = merge_overlapping_boxes(&boxes, &MergeConfig::default());
        assert_eq!(merged.len(), 2);

        let loose = MergeConfig {
            overlap_threshold: 0.1,
            ..MergeConfig::default()
        };
        let merged = merge_overlapping_boxes(&boxes, &loose);
        assert_eq!(merged, vec![bbox(0.0, 0.0, 18.0, 10.0)]);
    }

    #[test]
    fn test_merge_cascades() {
        // c qualifies with neither a nor b, but a ∪ b swallows it
        let a = bbox(0.0, 0.0, 10.0, 10.0);
        let b = bbox(6.0, 2.0, 16.0, 12.0);
        let c = bbox(10.0, 0.0, 20.0, 4.0);
        let config = MergeConfig::default();
        assert!(config.mergeable(&a, &b));
        assert!(!config.mergeable(&a, &c));
        assert!(!config.mergeable(&b, &c));

        let merged = merge_overlapping_boxes(&[a, b, c], &config);
        assert_eq!(merged, vec![bbox(0.0, 0.0, 20.0, 12.0)]);
    }

    #[test]
    fn test_merge_keeps_position_of_first() {
        let far = bbox(100.0, 100.0, 120.0, 120.0);
        let a = bbox(0.0, 0.0, 10.0, 10.0);
        let b = bbox(2.0, 0.0, 12.0, 10.0);
        let merged = merge_overlapping_boxes(&[far, a, b], &MergeConfig::default());
        assert_eq!(merged, vec![far, bbox(0.0, 0.0, 12.0, 10.0)]);
    }

    #[test]
    fn test_merge_idempotent() {
        let boxes = [
            bbox(0.0, 0.0, 100.0, 50.0),
            bbox(40.0, 5.0, 140.0, 55.0),
            bbox(130.0, 0.0, 200.0, 50.0),
            bbox(0.0, 100.0, 60.0, 200.0),
            bbox(70.0, 100.0, 200.0, 200.0),
            bbox(65.0, 90.0, 75.0, 210.0),
        ];
        let config = MergeConfig::default();
        let once = merge_overlapping_boxes(&boxes, &config);
        let twice = merge_overlapping_boxes(&once, &config);
        assert_eq!(once, twice);
        assert!(once.len() < boxes.len());
    }

    #[test]
    fn test_merge_count_unchanged_without_merges() {
        let boxes = [
            bbox(0.0, 0.0, 10.0, 10.0),
            bbox(20.0, 0.0, 30.0, 10.0),
            bbox(0.0, 20.0, 10.0, 30.0),
        ];
        let merged = merge_overlapping_boxes(&boxes, &MergeConfig::default());
        assert_eq!(merged, boxes.to_vec());
    }

    #[test]
    fn test_merge_degenerate_boxes() {
        // Zero-area boxes never divide by zero and never merge
        let boxes = [
            bbox(0.0, 0.0, 10.0, 0.0),
            bbox(0.0, 0.0, 10.0, 10.0),
            bbox(5.0, 5.0, 5.0, 5.0),
        ];
        let merged = merge_overlapping_boxes(&boxes, &MergeConfig::default());
        assert_eq!(merged, boxes.to_vec());
    }

    #[test]
    fn test_merge_small_inputs() {
        let config = MergeConfig::default();
        assert!(merge_overlapping_boxes(&[], &config).is_empty());

        let single = [bbox(1.0, 2.0, 3.0, 4.0)];
        assert_eq!(merge_overlapping_boxes(&single, &config), single.to_vec());
    }
}
