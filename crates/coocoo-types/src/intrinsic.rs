//! The fixed intrinsic catalogue.
//!
//! [`Intrinsic::ALL`] order is the import order of every compiled module and
//! therefore part of the module ABI.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Import namespace for all intrinsics.
pub const IMPORT_MODULE: &str = "env";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    Image,
    Number,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueKind::Image => write!(f, "image"),
            ValueKind::Number => write!(f, "number"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intrinsic {
    Resize,
    Darken,
    BlankImage,
    Grayscale,
    InvertColor,
    FlipHorizontal,
    FlipVertical,
    MaskChannelR,
    MaskChannelG,
    MaskChannelB,
}

const IMAGE: (&str, ValueKind) = ("image", ValueKind::Image);

impl Intrinsic {
    pub const ALL: [Intrinsic; 10] = [
        Intrinsic::Resize,
        Intrinsic::Darken,
        Intrinsic::BlankImage,
        Intrinsic::Grayscale,
        Intrinsic::InvertColor,
        Intrinsic::FlipHorizontal,
        Intrinsic::FlipVertical,
        Intrinsic::MaskChannelR,
        Intrinsic::MaskChannelG,
        Intrinsic::MaskChannelB,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Intrinsic::Resize => "resize",
            Intrinsic::Darken => "darken",
            Intrinsic::BlankImage => "blank_image",
            Intrinsic::Grayscale => "grayscale",
            Intrinsic::InvertColor => "invert_color",
            Intrinsic::FlipHorizontal => "flip_horizontal",
            Intrinsic::FlipVertical => "flip_vertical",
            Intrinsic::MaskChannelR => "mask_channel_r",
            Intrinsic::MaskChannelG => "mask_channel_g",
            Intrinsic::MaskChannelB => "mask_channel_b",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|i| i.name() == name)
    }

    /// Named parameters with their value kinds.
    pub fn params(self) -> &'static [(&'static str, ValueKind)] {
        match self {
            Intrinsic::Resize => &[
                IMAGE,
                ("new_width", ValueKind::Number),
                ("new_height", ValueKind::Number),
            ],
            Intrinsic::Darken => &[IMAGE, ("value", ValueKind::Number)],
            Intrinsic::BlankImage => &[
                ("r", ValueKind::Number),
                ("g", ValueKind::Number),
                ("b", ValueKind::Number),
                ("a", ValueKind::Number),
                ("width", ValueKind::Number),
                ("height", ValueKind::Number),
            ],
            _ => &[IMAGE],
        }
    }

    pub fn arity(self) -> usize {
        self.params().len()
    }

    /// Position in the import section, which is also the function index.
    pub fn import_index(self) -> u32 {
        self as u32
    }
}

impl fmt::Display for Intrinsic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
