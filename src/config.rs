//! Per-build layout configuration.
//!
//! A [`LayoutConfig`] is created once per document build and shared by
//! every fitter of that build through an `Arc`. Nothing in the engine
//! keeps process-wide state; dropping the fitters drops the config.

use serde::{Deserialize, Serialize};

use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LayoutConfig {
    /// Ratio between word spacing and character spacing when a line is
    /// justified. Large values put all extra space between words.
    pub space_char_ratio: f64,
    /// Leading of a fresh column before any line has been measured.
    pub default_leading: f64,
    /// Maximum leading steps taken while probing an irregular column for
    /// usable width.
    pub irregular_probe_limit: u32,
    /// Leadings at or below this value stop the irregular probe after the
    /// first attempt.
    pub min_leading_step: f64,
    /// Upper bound for [`crate::layout::paginate`].
    pub max_pages: usize,
    /// Padding applied to freshly created table cells.
    pub default_cell_padding: f64,
}

/// Use only character spacing when justifying.
pub const NO_SPACE_CHAR_RATIO: f64 = 10_000_000.0;

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            space_char_ratio: 2.5,
            default_leading: 16.0,
            irregular_probe_limit: 1000,
            min_leading_step: 0.001,
            max_pages: 10_000,
            default_cell_padding: 2.0,
        }
    }
}

impl LayoutConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// The justification ratio, clamped away from zero.
    pub fn effective_space_char_ratio(&self, requested: Option<f64>) -> f64 {
        requested.unwrap_or(self.space_char_ratio).max(0.001)
    }
}
