pub mod analysis;
pub mod consts;
pub mod error;
pub mod inference;
pub mod layout;

// Re-export commonly used types
pub use analysis::{bbox::Bbox, labels::Label};
pub use error::FerrpanelError;
pub use layout::{
    AssociatedDetections, Detections, LayoutConfig, LayoutConfigBuilder, LayoutOutput,
    RawDetections, ReadingOrder, reconstruct,
};
