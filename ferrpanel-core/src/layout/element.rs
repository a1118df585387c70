use serde::{Serialize, Serializer};

use crate::analysis::{bbox::Bbox, labels::Label};

/// One box produced by the raw panel detector.
#[derive(Clone, Copy, Debug)]
pub struct Detection {
    pub bbox: Bbox,
    pub label: Label,
    pub proba: f32,
}

/// A panel with its 1-based position in reading order.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct OrderedPanel {
    pub index: usize,
    #[serde(serialize_with = "serialize_xyxy")]
    pub bbox: Bbox,
}

/// Output of the merge/order/shrink pipeline.
#[derive(Clone, Debug, Default, Serialize)]
pub struct ReadingOrder {
    pub reading_order: Vec<OrderedPanel>,
}

/// Output of the inclusion pipeline, one box per input panel.
#[derive(Clone, Debug, Default, Serialize)]
pub struct InclusivePanels {
    #[serde(serialize_with = "serialize_xyxy_seq")]
    pub panels: Vec<Bbox>,
}

impl ReadingOrder {
    /// Numbers already-ordered boxes from 1.
    pub fn from_ordered(boxes: impl IntoIterator<Item = Bbox>) -> Self {
        let reading_order = boxes
            .into_iter()
            .enumerate()
            .map(|(idx, bbox)| OrderedPanel {
                index: idx + 1,
                bbox,
            })
            .collect();

        Self { reading_order }
    }

    pub fn len(&self) -> usize {
        self.reading_order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reading_order.is_empty()
    }
}

fn serialize_xyxy<S: Serializer>(bbox: &Bbox, serializer: S) -> Result<S::Ok, S::Error> {
    bbox.to_xyxy().serialize(serializer)
}

fn serialize_xyxy_seq<S: Serializer>(boxes: &[Bbox], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(boxes.iter().map(Bbox::to_xyxy))
}
