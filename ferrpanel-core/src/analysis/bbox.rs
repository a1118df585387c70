use glam::Vec2;

use crate::error::FerrpanelError;

/// A 2D axis-aligned bounding box represented by minimum and maximum points.
///
/// Coordinates are image pixels with the origin at the top-left corner, so
/// `min` is the top-left corner and `max` the bottom-right one.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bbox {
    /// The minimum point of the bounding box (top-left corner).
    pub min: Vec2,
    /// The maximum point of the bounding box (bottom-right corner).
    pub max: Vec2,
}

impl Bbox {
    /// Creates a new bounding box from minimum and maximum points.
    ///
    /// No validation is performed; use [`Bbox::from_xyxy`] for untrusted input.
    ///
    /// # Example
    /// ```
    /// use glam::Vec2;
    /// use ferrpanel_core::analysis::bbox::Bbox;
    /// let bbox = Bbox::new(Vec2::new(0.0, 0.0), Vec2::new(10.0, 5.0));
    /// ```
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Creates a bounding box from `[x1, y1, x2, y2]` detector coordinates.
    ///
    /// Fails when a coordinate is not finite, is negative, or when the corners
    /// are inverted (`x1 > x2` or `y1 > y2`). Zero-width or zero-height boxes
    /// are accepted.
    ///
    /// # Example
    /// ```
    /// use ferrpanel_core::analysis::bbox::Bbox;
    /// assert!(Bbox::from_xyxy(0.0, 0.0, 10.0, 10.0).is_ok());
    /// assert!(Bbox::from_xyxy(10.0, 0.0, 0.0, 10.0).is_err());
    /// ```
    pub fn from_xyxy(x1: f32, y1: f32, x2: f32, y2: f32) -> Result<Self, FerrpanelError> {
        let reason = if ![x1, y1, x2, y2].iter().all(|v| v.is_finite()) {
            Some("coordinates must be finite")
        } else if x1 < 0.0 || y1 < 0.0 || x2 < 0.0 || y2 < 0.0 {
            Some("coordinates must not be negative")
        } else if x1 > x2 || y1 > y2 {
            Some("corners are inverted")
        } else {
            None
        };

        match reason {
            Some(reason) => Err(FerrpanelError::InvalidBbox {
                x1,
                y1,
                x2,
                y2,
                reason: reason.to_string(),
            }),
            None => Ok(Self::new(Vec2::new(x1, y1), Vec2::new(x2, y2))),
        }
    }

    /// Creates a new bounding box from a center point and size vector.
    ///
    /// YOLO-style detection outputs represent boxes as
    /// (center_x, center_y, width, height).
    ///
    /// # Example
    /// ```
    /// use glam::Vec2;
    /// use ferrpanel_core::analysis::bbox::Bbox;
    /// let bbox = Bbox::from_center_size(Vec2::new(100.0, 200.0), Vec2::new(50.0, 80.0));
    /// assert_eq!(bbox.min, Vec2::new(75.0, 160.0));
    /// assert_eq!(bbox.max, Vec2::new(125.0, 240.0));
    /// ```
    pub fn from_center_size(center: Vec2, size: Vec2) -> Self {
        let half_size = size / 2.0;
        Self {
            min: center - half_size,
            max: center + half_size,
        }
    }

    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    /// Calculates the area of the bounding box.
    ///
    /// Degenerate boxes (zero width or height) have area 0; callers that divide
    /// by an area must guard against it.
    ///
    /// # Example
    /// ```
    /// use glam::Vec2;
    /// use ferrpanel_core::analysis::bbox::Bbox;
    /// let bbox = Bbox::new(Vec2::ZERO, Vec2::new(4.0, 3.0));
    /// assert_eq!(bbox.area(), 12.0);
    /// ```
    pub fn area(&self) -> f32 {
        let length = self.max - self.min;

        length.x * length.y
    }

    /// Tests whether two boxes touch or overlap, tolerating a gap of up to
    /// `threshold` pixels along either axis.
    ///
    /// With `threshold = 0` boxes sharing only an edge still count as
    /// overlapping. The test is symmetric.
    ///
    /// # Example
    /// ```
    /// use glam::Vec2;
    /// use ferrpanel_core::analysis::bbox::Bbox;
    /// let panel = Bbox::new(Vec2::new(0.0, 0.0), Vec2::new(100.0, 100.0));
    /// let bubble = Bbox::new(Vec2::new(104.0, 10.0), Vec2::new(150.0, 40.0));
    /// assert!(!panel.overlaps(&bubble, 0.0));
    /// assert!(panel.overlaps(&bubble, 5.0));
    /// ```
    pub fn overlaps(&self, other: &Self, threshold: f32) -> bool {
        !(self.max.x < other.min.x - threshold
            || self.min.x > other.max.x + threshold
            || self.max.y < other.min.y - threshold
            || self.min.y > other.max.y + threshold)
    }

    /// Signed length of the shared vertical span. Negative when the boxes are
    /// vertically apart.
    pub fn vertical_overlap(&self, other: &Self) -> f32 {
        self.max.y.min(other.max.y) - self.min.y.max(other.min.y)
    }

    /// Length of the shared horizontal span, clamped at zero.
    pub fn horizontal_overlap(&self, other: &Self) -> f32 {
        (self.max.x.min(other.max.x) - self.min.x.max(other.min.x)).max(0.0)
    }

    /// Whether two boxes sit on the same visual row: their vertical overlap
    /// exceeds `ratio` times the shorter box's height.
    pub fn same_row(&self, other: &Self, ratio: f32) -> bool {
        let min_height = self.height().min(other.height());
        self.vertical_overlap(other) > min_height * ratio
    }

    /// Calculates the area of intersection between this bounding box and another.
    ///
    /// Returns 0.0 when the boxes don't overlap or only share an edge.
    ///
    /// # Example
    /// ```
    /// use glam::Vec2;
    /// use ferrpanel_core::analysis::bbox::Bbox;
    /// let bbox1 = Bbox::new(Vec2::new(0.0, 0.0), Vec2::new(4.0, 4.0));
    /// let bbox2 = Bbox::new(Vec2::new(2.0, 2.0), Vec2::new(6.0, 6.0));
    /// assert_eq!(bbox1.intersection(&bbox2), 4.0);
    /// ```
    pub fn intersection(&self, other: &Self) -> f32 {
        let min = self.min.max(other.min);
        let max = self.max.min(other.max);

        if max.x > min.x && max.y > min.y {
            (max.x - min.x) * (max.y - min.y)
        } else {
            0.
        }
    }

    /// Calculates the Intersection over Union (IoU) between this bounding box and another.
    ///
    /// IoU = Intersection Area / (Area1 + Area2 - Intersection Area), 0.0 for
    /// two degenerate boxes.
    pub fn iou(&self, other: &Self) -> f32 {
        let intersection_area = self.intersection(other);
        let union_area = self.area() + other.area() - intersection_area;

        if union_area > 0.0 {
            intersection_area / union_area
        } else {
            0.0
        }
    }

    /// Overlap ratio using the smaller area as denominator.
    ///
    /// 1.0 means the smaller box lies completely inside the larger one. Returns
    /// 0.0 when either box is degenerate instead of dividing by zero.
    ///
    /// # Example
    /// ```
    /// use glam::Vec2;
    /// use ferrpanel_core::analysis::bbox::Bbox;
    /// let large = Bbox::new(Vec2::new(0.0, 0.0), Vec2::new(100.0, 100.0));
    /// let small = Bbox::new(Vec2::new(10.0, 10.0), Vec2::new(30.0, 30.0));
    /// assert_eq!(large.overlap_ratio(&small), 1.0);
    /// ```
    pub fn overlap_ratio(&self, other: &Self) -> f32 {
        let intersection_area = self.intersection(other);
        let min_area = self.area().min(other.area());

        if min_area > 0.0 {
            intersection_area / min_area
        } else {
            0.0
        }
    }

    /// Clamps the bounding box coordinates to stay within the specified bounds.
    pub fn clamp(&self, min_bounds: Vec2, max_bounds: Vec2) -> Self {
        Self {
            min: self.min.max(min_bounds).min(max_bounds),
            max: self.max.min(max_bounds).max(min_bounds),
        }
    }

    /// Checks if this bounding box completely contains another bounding box.
    /// Shared edges count as contained.
    pub fn contains(&self, other: &Self) -> bool {
        self.min.x <= other.min.x
            && self.min.y <= other.min.y
            && self.max.x >= other.max.x
            && self.max.y >= other.max.y
    }

    /// Smallest box enclosing both this bounding box and another.
    ///
    /// # Example
    /// ```
    /// use glam::Vec2;
    /// use ferrpanel_core::analysis::bbox::Bbox;
    /// let bbox1 = Bbox::new(Vec2::new(0.0, 0.0), Vec2::new(5.0, 5.0));
    /// let bbox2 = Bbox::new(Vec2::new(3.0, 3.0), Vec2::new(8.0, 8.0));
    /// let union = bbox1.union(&bbox2);
    /// assert_eq!(union.min, Vec2::new(0.0, 0.0));
    /// assert_eq!(union.max, Vec2::new(8.0, 8.0));
    /// ```
    pub fn union(&self, other: &Self) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Moves the box by `offset`.
    pub fn translate(&self, offset: Vec2) -> Self {
        Self {
            min: self.min + offset,
            max: self.max + offset,
        }
    }

    /// Multiplies both corners by `factor`.
    pub fn scale(&self, factor: f32) -> Self {
        Self {
            min: self.min * factor,
            max: self.max * factor,
        }
    }

    /// Truncates every coordinate toward zero.
    pub fn trunc(&self) -> Self {
        Self {
            min: self.min.trunc(),
            max: self.max.trunc(),
        }
    }

    /// Integer `[x1, y1, x2, y2]`, truncating toward zero.
    ///
    /// # Example
    /// ```
    /// use glam::Vec2;
    /// use ferrpanel_core::analysis::bbox::Bbox;
    /// let bbox = Bbox::new(Vec2::new(1.9, 2.2), Vec2::new(10.5, 20.99));
    /// assert_eq!(bbox.to_xyxy(), [1, 2, 10, 20]);
    /// ```
    pub fn to_xyxy(&self) -> [i32; 4] {
        [
            self.min.x as i32,
            self.min.y as i32,
            self.max.x as i32,
            self.max.y as i32,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bbox(x1: f32, y1: f32, x2: f32, y2: f32) -> Bbox {
        Bbox::new(Vec2::new(x1, y1), Vec2::new(x2, y2))
    }

    #[test]
    fn test_bbox_area() {
        assert_eq!(bbox(0.0, 0.0, 2.0, 3.0).area(), 6.0);
        assert_eq!(bbox(1.0, 1.0, 6.0, 6.0).area(), 25.0);

        // Zero area (degenerate case)
        assert_eq!(bbox(0.0, 0.0, 5.0, 0.0).area(), 0.0);
        assert_eq!(bbox(3.0, 3.0, 3.0, 9.0).area(), 0.0);
    }

    #[test]
    fn test_bbox_from_xyxy() {
        let valid = Bbox::from_xyxy(1.0, 2.0, 3.0, 4.0).unwrap();
        assert_eq!(valid, bbox(1.0, 2.0, 3.0, 4.0));

        // Degenerate but valid
        assert!(Bbox::from_xyxy(5.0, 5.0, 5.0, 5.0).is_ok());

        assert!(matches!(
            Bbox::from_xyxy(4.0, 0.0, 2.0, 1.0),
            Err(FerrpanelError::InvalidBbox { .. })
        ));
        assert!(matches!(
            Bbox::from_xyxy(0.0, 4.0, 2.0, 1.0),
            Err(FerrpanelError::InvalidBbox { .. })
        ));
        assert!(matches!(
            Bbox::from_xyxy(-1.0, 0.0, 2.0, 1.0),
            Err(FerrpanelError::InvalidBbox { .. })
        ));
        assert!(matches!(
            Bbox::from_xyxy(0.0, 0.0, f32::NAN, 1.0),
            Err(FerrpanelError::InvalidBbox { .. })
        ));
    }

    #[test]
    fn test_bbox_overlaps() {
        let a = bbox(0.0, 0.0, 10.0, 10.0);

        // Plain overlap
        assert!(a.overlaps(&bbox(5.0, 5.0, 15.0, 15.0), 0.0));

        // Edge touching counts with zero threshold
        assert!(a.overlaps(&bbox(10.0, 0.0, 20.0, 10.0), 0.0));

        // Gap of 3 pixels: only tolerated with a threshold
        let right = bbox(13.0, 0.0, 20.0, 10.0);
        assert!(!a.overlaps(&right, 0.0));
        assert!(a.overlaps(&right, 3.0));
        assert!(a.overlaps(&right, 5.0));

        // Separated on the vertical axis only
        let below = bbox(0.0, 20.0, 10.0, 30.0);
        assert!(!a.overlaps(&below, 5.0));
        assert!(a.overlaps(&below, 10.0));

        // Containment
        assert!(a.overlaps(&bbox(2.0, 2.0, 3.0, 3.0), 0.0));
    }

    #[test]
    fn test_bbox_overlaps_symmetry() {
        let boxes = [
            bbox(0.0, 0.0, 10.0, 10.0),
            bbox(5.0, 5.0, 15.0, 15.0),
            bbox(13.0, 0.0, 20.0, 10.0),
            bbox(0.0, 14.0, 4.0, 30.0),
            bbox(100.0, 100.0, 100.0, 100.0),
        ];
        for a in &boxes {
            for b in &boxes {
                for t in [0.0, 3.0, 5.0, 50.0] {
                    assert_eq!(a.overlaps(b, t), b.overlaps(a, t));
                }
            }
        }
    }

    #[test]
    fn test_bbox_union() {
        let bbox1 = bbox(0.0, 0.0, 5.0, 5.0);
        let bbox2 = bbox(3.0, 3.0, 8.0, 8.0);
        let union = bbox1.union(&bbox2);
        assert_eq!(union, bbox(0.0, 0.0, 8.0, 8.0));
        assert_eq!(union.area(), 64.0);

        // Non-overlapping boxes
        let union2 = bbox(0.0, 0.0, 2.0, 2.0).union(&bbox(5.0, 5.0, 7.0, 7.0));
        assert_eq!(union2, bbox(0.0, 0.0, 7.0, 7.0));

        // Symmetry
        let bbox7 = bbox(1.0, 2.0, 4.0, 6.0);
        let bbox8 = bbox(3.0, 1.0, 7.0, 5.0);
        assert_eq!(bbox7.union(&bbox8), bbox8.union(&bbox7));
    }

    #[test]
    fn test_bbox_union_monotonicity() {
        let boxes = [
            bbox(0.0, 0.0, 10.0, 10.0),
            bbox(5.0, 5.0, 15.0, 15.0),
            bbox(90.0, 40.0, 120.0, 60.0),
            bbox(3.0, 3.0, 3.0, 3.0),
        ];
        for a in &boxes {
            for b in &boxes {
                let union = a.union(b);
                assert!(union.contains(a));
                assert!(union.contains(b));
                assert!(union.area() >= a.area().max(b.area()));
            }
        }
    }

    #[test]
    fn test_bbox_intersection_area() {
        assert_eq!(bbox(0.0, 0.0, 4.0, 4.0).intersection(&bbox(2.0, 2.0, 6.0, 6.0)), 4.0);
        assert_eq!(bbox(0.0, 0.0, 2.0, 2.0).intersection(&bbox(3.0, 3.0, 5.0, 5.0)), 0.0);

        // Edge touching (no area intersection)
        assert_eq!(bbox(0.0, 0.0, 2.0, 2.0).intersection(&bbox(2.0, 0.0, 4.0, 2.0)), 0.0);

        let outer = bbox(0.0, 0.0, 10.0, 10.0);
        let inner = bbox(2.0, 3.0, 5.0, 7.0);
        assert_eq!(outer.intersection(&inner), 12.0);
        assert_eq!(inner.intersection(&outer), 12.0);
    }

    #[test]
    fn test_bbox_iou() {
        let a = bbox(0.0, 0.0, 4.0, 4.0);
        assert_eq!(a.iou(&a), 1.0);
        assert_eq!(a.iou(&bbox(5.0, 5.0, 6.0, 6.0)), 0.0);
        assert!((a.iou(&bbox(2.0, 2.0, 6.0, 6.0)) - 4.0 / 28.0).abs() < 1e-6);

        // Zero area boxes
        let line1 = bbox(0.0, 0.0, 5.0, 0.0);
        let line2 = bbox(2.0, 0.0, 7.0, 0.0);
        assert_eq!(line1.iou(&line2), 0.0);
    }

    #[test]
    fn test_bbox_overlap_ratio() {
        let large = bbox(0.0, 0.0, 100.0, 100.0);
        let small = bbox(10.0, 10.0, 30.0, 30.0);
        assert_eq!(large.overlap_ratio(&small), 1.0);
        assert_eq!(small.overlap_ratio(&large), 1.0);

        // 400 / 1600
        let partial = bbox(0.0, 0.0, 60.0, 60.0).overlap_ratio(&bbox(40.0, 40.0, 80.0, 80.0));
        assert!((partial - 0.25).abs() < 0.001);

        // Degenerate box never divides by zero
        let zero_area = bbox(5.0, 5.0, 5.0, 5.0);
        assert_eq!(zero_area.overlap_ratio(&large), 0.0);
    }

    #[test]
    fn test_bbox_same_row() {
        let a = bbox(0.0, 0.0, 10.0, 10.0);

        // 5 of 10 pixels shared: not more than half
        assert!(!a.same_row(&bbox(20.0, 5.0, 30.0, 15.0), 0.5));
        // 6 of 10 pixels shared
        assert!(a.same_row(&bbox(20.0, 4.0, 30.0, 14.0), 0.5));
        // Shorter box fully inside the taller one's span
        assert!(a.same_row(&bbox(20.0, 2.0, 30.0, 4.0), 0.5));
        // Vertically apart
        assert!(!a.same_row(&bbox(0.0, 20.0, 10.0, 30.0), 0.5));
        assert_eq!(a.vertical_overlap(&bbox(0.0, 20.0, 10.0, 30.0)), -10.0);
    }

    #[test]
    fn test_bbox_horizontal_overlap() {
        let a = bbox(0.0, 0.0, 10.0, 10.0);
        assert_eq!(a.horizontal_overlap(&bbox(5.0, 0.0, 15.0, 10.0)), 5.0);
        assert_eq!(a.horizontal_overlap(&bbox(20.0, 0.0, 30.0, 10.0)), 0.0);
    }

    #[test]
    fn test_bbox_clamp() {
        let oversized = bbox(-10.0, -5.0, 1030.0, 1030.0);
        let clamped = oversized.clamp(Vec2::ZERO, Vec2::new(1023.0, 1023.0));
        assert_eq!(clamped, bbox(0.0, 0.0, 1023.0, 1023.0));

        let within = bbox(100.0, 200.0, 500.0, 600.0);
        assert_eq!(within.clamp(Vec2::ZERO, Vec2::new(1023.0, 1023.0)), within);

        // Entirely outside collapses onto the border
        let outside = bbox(2000.0, 2000.0, 2100.0, 2100.0);
        let collapsed = outside.clamp(Vec2::ZERO, Vec2::new(100.0, 100.0));
        assert_eq!(collapsed.area(), 0.0);
    }

    #[test]
    fn test_bbox_contains() {
        let outer = bbox(0.0, 0.0, 10.0, 10.0);
        let inner = bbox(2.0, 3.0, 7.0, 8.0);
        assert!(outer.contains(&inner));
        assert!(!inner.contains(&outer));
        assert!(outer.contains(&outer));
        assert!(!bbox(0.0, 0.0, 5.0, 5.0).contains(&bbox(3.0, 3.0, 8.0, 8.0)));
    }

    #[test]
    fn test_bbox_translate_scale() {
        let a = bbox(1.0, 2.0, 3.0, 4.0);
        assert_eq!(a.translate(Vec2::new(10.0, 20.0)), bbox(11.0, 22.0, 13.0, 24.0));
        assert_eq!(a.scale(2.0), bbox(2.0, 4.0, 6.0, 8.0));
    }

    #[test]
    fn test_bbox_to_xyxy() {
        assert_eq!(bbox(0.0, 0.0, 10.0, 10.0).to_xyxy(), [0, 0, 10, 10]);
        assert_eq!(bbox(12.7, 3.2, 99.99, 100.5).to_xyxy(), [12, 3, 99, 100]);
        assert_eq!(bbox(12.7, 3.2, 99.99, 100.5).trunc(), bbox(12.0, 3.0, 99.0, 100.0));
    }
}
