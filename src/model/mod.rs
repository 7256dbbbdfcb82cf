//! # Content Model
//!
//! Geometry, colors, alignment enums, and the block elements a column
//! accepts in composite mode. Elements own their content outright; a
//! fitter that needs to keep working on one takes it out of its queue,
//! so no element is ever aliased between two fitters.

mod element;

pub use element::{
    DrawMarker, Element, List, ListEntry, ListItem, ListItemSlot, ListStyle, Paragraph, Phrase,
};

use serde::{Deserialize, Serialize};

use crate::error::{LayoutError, Result};

/// An axis-aligned rectangle in PDF user space (origin bottom-left).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub llx: f64,
    pub lly: f64,
    pub urx: f64,
    pub ury: f64,
}

impl Rect {
    /// Build a rectangle from any two opposite corners.
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self {
            llx: x1.min(x2),
            lly: y1.min(y2),
            urx: x1.max(x2),
            ury: y1.max(y2),
        }
    }

    pub fn width(&self) -> f64 {
        self.urx - self.llx
    }

    pub fn height(&self) -> f64 {
        self.ury - self.lly
    }
}

/// Edge values (padding).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Edges {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Edges {
    pub fn uniform(v: f64) -> Self {
        Self {
            top: v,
            right: v,
            bottom: v,
            left: v,
        }
    }

    pub fn horizontal(&self) -> f64 {
        self.left + self.right
    }

    pub fn vertical(&self) -> f64 {
        self.top + self.bottom
    }
}

/// An RGB color with components in 0.0..=1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Color {
    pub const BLACK: Color = Color {
        r: 0.0,
        g: 0.0,
        b: 0.0,
    };
    pub const WHITE: Color = Color {
        r: 1.0,
        g: 1.0,
        b: 1.0,
    };

    pub fn rgb(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }

    pub fn gray(level: f64) -> Self {
        Self::rgb(level, level, level)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
    /// Justify every line except the last of a paragraph.
    Justified,
    /// Justify every line, including the last.
    JustifiedAll,
}

impl Alignment {
    pub fn is_justified(self) -> bool {
        matches!(self, Self::Justified | Self::JustifiedAll)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VerticalAlignment {
    #[default]
    Top,
    Middle,
    Bottom,
}

/// How a run of text is ordered on the line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RunDirection {
    /// Inherit from the enclosing column (no reordering at the top level).
    #[default]
    Default,
    /// Keep logical order; no bidi processing.
    NoBidi,
    /// Bidi processing with a left-to-right paragraph level.
    Ltr,
    /// Bidi processing with a right-to-left paragraph level.
    Rtl,
}

impl RunDirection {
    pub fn code(self) -> i32 {
        match self {
            Self::Default => 0,
            Self::NoBidi => 1,
            Self::Ltr => 2,
            Self::Rtl => 3,
        }
    }

    pub fn is_rtl(self) -> bool {
        self == Self::Rtl
    }

    /// Resolve `Default` against an inherited direction.
    pub fn or(self, inherited: RunDirection) -> RunDirection {
        if self == Self::Default {
            inherited
        } else {
            self
        }
    }
}

impl TryFrom<i32> for RunDirection {
    type Error = LayoutError;

    fn try_from(code: i32) -> Result<Self> {
        match code {
            0 => Ok(Self::Default),
            1 => Ok(Self::NoBidi),
            2 => Ok(Self::Ltr),
            3 => Ok(Self::Rtl),
            other => Err(LayoutError::InvalidRunDirection(other)),
        }
    }
}

/// A placed image, referenced by resource name.
///
/// Used both inline (inside a chunk) and as a block element. The layout
/// engine only needs its size; pixels are a concern of the sink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    pub name: String,
    pub width: f64,
    pub height: f64,
    /// Width as a percentage of the column when used as a block. Zero
    /// keeps the absolute width.
    #[serde(default)]
    pub width_percentage: f64,
    #[serde(default)]
    pub alignment: Alignment,
    #[serde(default)]
    pub spacing_before: f64,
    #[serde(default)]
    pub spacing_after: f64,
}

impl Image {
    pub fn new(name: impl Into<String>, width: f64, height: f64) -> Self {
        Self {
            name: name.into(),
            width,
            height,
            width_percentage: 0.0,
            alignment: Alignment::Left,
            spacing_before: 0.0,
            spacing_after: 0.0,
        }
    }

    pub fn with_width_percentage(mut self, pct: f64) -> Self {
        self.width_percentage = pct;
        self
    }

    pub fn with_alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }

    /// The same image scaled by `factor` in both directions.
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            width: self.width * factor,
            height: self.height * factor,
            ..self.clone()
        }
    }
}
