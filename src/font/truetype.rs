//! TrueType/OpenType metrics parsed with ttf-parser.
//!
//! Text is encoded as two-byte glyph ids (Identity-H), so the bytes a
//! content stream shows are independent of any code page.

use std::collections::HashMap;

use super::FontMetrics;
use crate::error::{LayoutError, Result};

#[derive(Debug, Clone)]
pub struct TrueTypeMetrics {
    name: String,
    units_per_em: u16,
    advance_widths: HashMap<char, u16>,
    glyph_ids: HashMap<char, u16>,
    default_advance: u16,
    ascender: i16,
    descender: i16,
}

impl TrueTypeMetrics {
    /// Parse metrics from font data.
    pub fn from_font_data(name: impl Into<String>, data: &[u8]) -> Result<Self> {
        let face = ttf_parser::Face::parse(data, 0)
            .map_err(|e| LayoutError::InvalidFont(e.to_string()))?;
        let units_per_em = face.units_per_em();

        let mut advance_widths = HashMap::new();
        let mut glyph_ids = HashMap::new();
        let mut default_advance = 0u16;

        for code in 32u32..=0xFFFF {
            let Some(ch) = char::from_u32(code) else {
                continue;
            };
            if let Some(glyph_id) = face.glyph_index(ch) {
                let advance = face.glyph_hor_advance(glyph_id).unwrap_or(0);
                advance_widths.insert(ch, advance);
                glyph_ids.insert(ch, glyph_id.0);
                if ch == ' ' {
                    default_advance = advance;
                }
            }
        }

        if default_advance == 0 {
            default_advance = units_per_em / 2;
        }

        Ok(Self {
            name: name.into(),
            units_per_em,
            advance_widths,
            glyph_ids,
            default_advance,
            ascender: face.ascender(),
            descender: face.descender(),
        })
    }

    fn scale(&self, units: f64, size: f64) -> f64 {
        units / self.units_per_em as f64 * size
    }

    pub fn glyph_id(&self, ch: char) -> u16 {
        self.glyph_ids.get(&ch).copied().unwrap_or(0)
    }
}

impl FontMetrics for TrueTypeMetrics {
    fn name(&self) -> &str {
        &self.name
    }

    fn width(&self, ch: char) -> i32 {
        let advance = self
            .advance_widths
            .get(&ch)
            .copied()
            .unwrap_or(self.default_advance);
        (advance as f64 * 1000.0 / self.units_per_em as f64).round() as i32
    }

    fn ascent(&self, size: f64) -> f64 {
        self.scale(self.ascender as f64, size)
    }

    fn descent(&self, size: f64) -> f64 {
        self.scale(self.descender as f64, size)
    }

    fn encode(&self, text: &str) -> Vec<u8> {
        text.chars()
            .flat_map(|ch| self.glyph_id(ch).to_be_bytes())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_garbage_is_font_error() {
        let err = TrueTypeMetrics::from_font_data("Broken", b"not a font").unwrap_err();
        assert!(matches!(err, LayoutError::InvalidFont(_)));
    }
}
