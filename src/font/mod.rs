//! # Font Metrics
//!
//! The layout engine treats fonts as a black-box measuring service:
//! a glyph advance in 1000-unit space, ascent and descent at a size,
//! and an opaque byte encoding used when text reaches the content
//! stream. Whether a font is one of the standard PDF fonts or an
//! embedded TrueType program is invisible to line breaking.

pub mod truetype;

use std::fmt;
use std::sync::Arc;

pub use truetype::TrueTypeMetrics;

/// Measuring and encoding service for one font program.
pub trait FontMetrics: fmt::Debug + Send + Sync {
    /// Name used for resource naming and diagnostics.
    fn name(&self) -> &str;

    /// Advance width of `ch` in 1000-unit glyph space.
    fn width(&self, ch: char) -> i32;

    /// Ascent above the baseline at `size`.
    fn ascent(&self, size: f64) -> f64;

    /// Descent below the baseline at `size`. Negative.
    fn descent(&self, size: f64) -> f64;

    /// Encode text into the bytes a content stream shows.
    fn encode(&self, text: &str) -> Vec<u8>;
}

/// A font program at a particular size.
#[derive(Clone)]
pub struct Font {
    metrics: Arc<dyn FontMetrics>,
    size: f64,
}

impl fmt::Debug for Font {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Font({} {})", self.metrics.name(), self.size)
    }
}

impl Font {
    pub fn new(metrics: Arc<dyn FontMetrics>, size: f64) -> Self {
        Self { metrics, size }
    }

    /// Helvetica at `size`.
    pub fn helvetica(size: f64) -> Self {
        Self::new(Arc::new(StandardFont::Helvetica), size)
    }

    pub fn size(&self) -> f64 {
        self.size
    }

    pub fn name(&self) -> &str {
        self.metrics.name()
    }

    pub fn metrics(&self) -> &Arc<dyn FontMetrics> {
        &self.metrics
    }

    /// The same font program at another size.
    pub fn with_size(&self, size: f64) -> Self {
        Self {
            metrics: Arc::clone(&self.metrics),
            size,
        }
    }

    /// Advance of one character in points.
    pub fn char_width(&self, ch: char) -> f64 {
        self.metrics.width(ch) as f64 * self.size / 1000.0
    }

    /// Advance of a whole string in points, without any spacing.
    pub fn width_of(&self, text: &str) -> f64 {
        text.chars().map(|ch| self.char_width(ch)).sum()
    }

    pub fn ascent(&self) -> f64 {
        self.metrics.ascent(self.size)
    }

    pub fn descent(&self) -> f64 {
        self.metrics.descent(self.size)
    }

    pub fn encode(&self, text: &str) -> Vec<u8> {
        self.metrics.encode(text)
    }

    /// Two fonts share a program when their metrics are the same object.
    pub fn same_program(&self, other: &Font) -> bool {
        Arc::ptr_eq(&self.metrics, &other.metrics) || self.name() == other.name()
    }
}

// ── Standard fonts ──────────────────────────────────────────────

/// Standard PDF fonts that need no embedding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StandardFont {
    Helvetica,
    Courier,
}

/// Helvetica advances for U+0020..=U+007E.
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // digits
    278, 278, 584, 584, 584, 556, 1015, // ':'..'@'
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, 667, 778, 722,
    667, 611, 722, 667, 944, 667, 667, 611, // A..Z
    278, 278, 278, 469, 556, 333, // '['..'`'
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, 556, 556, 333,
    500, 278, 556, 500, 722, 500, 500, 500, // a..z
    334, 260, 334, 584, // '{'..'~'
];

impl StandardFont {
    /// The PDF base font name.
    pub fn pdf_name(&self) -> &'static str {
        match self {
            Self::Helvetica => "Helvetica",
            Self::Courier => "Courier",
        }
    }
}

impl FontMetrics for StandardFont {
    fn name(&self) -> &str {
        self.pdf_name()
    }

    fn width(&self, ch: char) -> i32 {
        match self {
            Self::Courier => 600,
            Self::Helvetica => {
                let cp = ch as u32;
                if (0x20..=0x7E).contains(&cp) {
                    HELVETICA_WIDTHS[(cp - 0x20) as usize] as i32
                } else {
                    556
                }
            }
        }
    }

    fn ascent(&self, size: f64) -> f64 {
        let units = match self {
            Self::Helvetica => 718.0,
            Self::Courier => 629.0,
        };
        units * size / 1000.0
    }

    fn descent(&self, size: f64) -> f64 {
        let units = match self {
            Self::Helvetica => -207.0,
            Self::Courier => -157.0,
        };
        units * size / 1000.0
    }

    fn encode(&self, text: &str) -> Vec<u8> {
        text.chars()
            .map(|ch| unicode_to_winansi(ch).unwrap_or(b'?'))
            .collect()
    }
}

/// Map a character onto the WinAnsi code page.
pub fn unicode_to_winansi(ch: char) -> Option<u8> {
    let cp = ch as u32;
    if (0x20..=0x7E).contains(&cp) || (0xA0..=0xFF).contains(&cp) {
        return Some(cp as u8);
    }
    match cp {
        0x20AC => Some(0x80),
        0x201A => Some(0x82),
        0x0192 => Some(0x83),
        0x201E => Some(0x84),
        0x2026 => Some(0x85),
        0x2020 => Some(0x86),
        0x2021 => Some(0x87),
        0x2030 => Some(0x89),
        0x0160 => Some(0x8A),
        0x0152 => Some(0x8C),
        0x2018 => Some(0x91),
        0x2019 => Some(0x92),
        0x201C => Some(0x93),
        0x201D => Some(0x94),
        0x2022 => Some(0x95),
        0x2013 => Some(0x96),
        0x2014 => Some(0x97),
        0x2122 => Some(0x99),
        0x0161 => Some(0x9A),
        0x0153 => Some(0x9C),
        0x0178 => Some(0x9F),
        _ => None,
    }
}

// ── Fixed-width fonts ───────────────────────────────────────────

/// Every glyph has the same advance. Handy for deterministic layouts.
#[derive(Debug, Clone)]
pub struct FixedWidthFont {
    name: String,
    advance: i32,
    ascent: i32,
    descent: i32,
}

impl FixedWidthFont {
    pub fn new(name: impl Into<String>, advance: i32) -> Self {
        Self {
            name: name.into(),
            advance,
            ascent: 800,
            descent: -200,
        }
    }

    pub fn with_extents(mut self, ascent: i32, descent: i32) -> Self {
        self.ascent = ascent;
        self.descent = descent;
        self
    }

    /// Wrap into a [`Font`] at `size`.
    pub fn at(self, size: f64) -> Font {
        Font::new(Arc::new(self), size)
    }
}

impl FontMetrics for FixedWidthFont {
    fn name(&self) -> &str {
        &self.name
    }

    fn width(&self, _ch: char) -> i32 {
        self.advance
    }

    fn ascent(&self, size: f64) -> f64 {
        self.ascent as f64 * size / 1000.0
    }

    fn descent(&self, size: f64) -> f64 {
        self.descent as f64 * size / 1000.0
    }

    fn encode(&self, text: &str) -> Vec<u8> {
        text.chars()
            .map(|ch| unicode_to_winansi(ch).unwrap_or(b'?'))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_helvetica_space_width() {
        let font = Font::helvetica(12.0);
        assert!((font.char_width(' ') - 3.336).abs() < 0.001);
    }

    #[test]
    fn test_helvetica_narrow_and_wide() {
        let font = Font::helvetica(10.0);
        assert!(font.char_width('W') > font.char_width('i'));
        assert!((font.width_of("ii") - 4.44).abs() < 0.001);
    }

    #[test]
    fn test_courier_is_monospaced() {
        let font = Font::new(Arc::new(StandardFont::Courier), 10.0);
        assert_eq!(font.char_width('i'), font.char_width('W'));
        assert!((font.char_width('x') - 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_fixed_width_metrics() {
        let font = FixedWidthFont::new("Mono", 1000).at(20.0);
        assert_eq!(font.char_width('a'), 20.0);
        assert_eq!(font.ascent(), 16.0);
        assert_eq!(font.descent(), -4.0);
    }

    #[test]
    fn test_winansi_encoding() {
        let font = Font::helvetica(12.0);
        assert_eq!(font.encode("A\u{20AC}\u{4E00}"), vec![b'A', 0x80, b'?']);
    }

    #[test]
    fn test_with_size_shares_program() {
        let font = Font::helvetica(12.0);
        let bigger = font.with_size(24.0);
        assert!(font.same_program(&bigger));
        assert_eq!(bigger.char_width(' '), 2.0 * font.char_width(' '));
    }
}
