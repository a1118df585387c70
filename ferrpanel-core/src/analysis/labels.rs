use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Classes emitted by the manga109 panel detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Label {
    Body,
    Face,
    Frame,
    Text,
}

impl Label {
    pub const ALL: [Label; 4] = [Label::Body, Label::Face, Label::Frame, Label::Text];

    pub const fn name(&self) -> &str {
        match self {
            Label::Body => "Body",
            Label::Face => "Face",
            Label::Frame => "Frame",
            Label::Text => "Text",
        }
    }

    pub const fn idx(&self) -> usize {
        match self {
            Label::Body => 0,
            Label::Face => 1,
            Label::Frame => 2,
            Label::Text => 3,
        }
    }

    pub const fn from_idx(idx: usize) -> Option<Self> {
        match idx {
            0 => Some(Label::Body),
            1 => Some(Label::Face),
            2 => Some(Label::Frame),
            3 => Some(Label::Text),
            _ => None,
        }
    }

    pub const fn label_size() -> usize {
        4
    }
}

impl std::fmt::Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
