mod model;
mod session;

pub use model::{PanelYolo, YoloConfig, YoloInput, YoloOutput};
pub use session::{PageMeta, YoloSession};
