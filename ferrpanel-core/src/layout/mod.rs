pub mod detection;
pub mod element;
pub mod inclusion;
pub mod merge;
pub mod order;
pub mod pipeline;
pub mod render;
pub mod shrink;

pub use detection::{AssociatedDetections, Detections, RawDetections};
pub use element::{Detection, InclusivePanels, OrderedPanel, ReadingOrder};
pub use pipeline::{LayoutConfig, LayoutConfigBuilder, LayoutOutput, reconstruct};
