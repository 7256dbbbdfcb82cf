//! A single line under construction.
//!
//! [`PdfLine::add`] accepts chunks until the width runs out and hands
//! back whatever did not fit. The line always satisfies
//! `sum(chunk widths) + width_left == original_width`.

use crate::model::Alignment;

use super::chunk::{Chunk, ChunkKind};

#[derive(Debug, Clone)]
pub struct PdfLine {
    chunks: Vec<Chunk>,
    left: f64,
    /// Width still free.
    width: f64,
    original_width: f64,
    alignment: Alignment,
    height: f64,
    newline_split: bool,
    /// Set when the line ended on an explicit newline character.
    explicit_break: bool,
    list_symbol: Option<Chunk>,
    symbol_indent: f64,
    rtl: bool,
}

impl PdfLine {
    pub fn new(left: f64, right: f64, alignment: Alignment, height: f64) -> Self {
        Self {
            chunks: Vec::new(),
            left,
            width: right - left,
            original_width: right - left,
            alignment,
            height,
            newline_split: false,
            explicit_break: false,
            list_symbol: None,
            symbol_indent: 0.0,
            rtl: false,
        }
    }

    /// Place as much of `chunk` as fits; return the rest.
    pub fn add(&mut self, mut chunk: Chunk) -> Option<Chunk> {
        if chunk.is_blank() {
            return None;
        }

        let mut overflow = chunk.split(self.width);
        self.newline_split = chunk.is_newline_split() || overflow.is_none();
        self.explicit_break = chunk.is_newline_split();

        if let Some(stop) = chunk.tab_stop() {
            let consumed = self.original_width - self.width;
            if stop.new_line && stop.position < consumed {
                return Some(chunk);
            }
            let position = stop.position;
            chunk.set_tab_advance(position - consumed);
            self.width = self.original_width - position;
            self.push(chunk);
            return overflow;
        }

        if chunk.len() > 0 || chunk.is_image() || matches!(chunk.kind(), ChunkKind::Separator(_))
        {
            if overflow.is_some() {
                chunk.trim_last_space();
            }
            self.width -= chunk.width();
            self.push(chunk);
            return overflow;
        }

        if self.chunks.is_empty() {
            // Nothing could be split off and the line is empty: force
            // progress by truncating, or by placing the overflow verbatim.
            let Some(mut forced) = overflow.take() else {
                return None;
            };
            let rest = forced.truncate(self.width);
            if forced.len() > 0 {
                self.width -= forced.width();
                self.push(forced);
                return rest;
            }
            if let Some(rest) = rest {
                self.width -= rest.width();
                self.push(rest);
            }
            return None;
        }

        if let Some(last) = self.chunks.last_mut() {
            self.width += last.trim_last_space();
        }
        overflow
    }

    fn push(&mut self, chunk: Chunk) {
        if let Some(image) = chunk.inline_image() {
            if image.change_leading {
                let needed = image.image.height + image.offset_y;
                if needed > self.height {
                    self.height = needed;
                }
            }
        }
        self.chunks.push(chunk);
    }

    // ── Layout queries ──────────────────────────────────────────

    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    pub(crate) fn chunks_mut(&mut self) -> &mut Vec<Chunk> {
        &mut self.chunks
    }

    pub fn size(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn left(&self) -> f64 {
        self.left
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn alignment(&self) -> Alignment {
        self.alignment
    }

    pub fn width_left(&self) -> f64 {
        self.width
    }

    pub fn original_width(&self) -> f64 {
        self.original_width
    }

    pub fn is_rtl(&self) -> bool {
        self.rtl
    }

    pub(crate) fn set_rtl(&mut self, rtl: bool) {
        self.rtl = rtl;
    }

    pub(crate) fn ended_on_newline(&self) -> bool {
        self.explicit_break
    }

    /// Offset of the first chunk from the line's left edge.
    pub fn indent_left(&self) -> f64 {
        if self.rtl {
            return match self.alignment {
                Alignment::Left => self.width,
                Alignment::Center => self.width / 2.0,
                _ => 0.0,
            };
        }
        if self.separator_count() == 0 {
            match self.alignment {
                Alignment::Right => return self.width,
                Alignment::Center => return self.width / 2.0,
                _ => {}
            }
        }
        0.0
    }

    pub fn has_to_be_justified(&self) -> bool {
        self.alignment.is_justified() && self.width != 0.0
    }

    /// Revert a justified line to its natural alignment.
    pub fn reset_alignment(&mut self) {
        if self.alignment == Alignment::Justified {
            self.alignment = Alignment::Left;
        }
    }

    /// Whether the line closes a paragraph. `JustifiedAll` never does,
    /// so its last line is justified too.
    pub fn is_newline_split(&self) -> bool {
        self.newline_split && self.alignment != Alignment::JustifiedAll
    }

    /// Number of characters, ignoring a trailing space.
    pub fn line_len(&self) -> usize {
        let mut total: usize = self.chunks.iter().map(|c| c.len()).sum();
        if let Some(last) = self.chunks.last() {
            if last.text().ends_with(' ') {
                total = total.saturating_sub(1);
            }
        }
        total
    }

    /// Number of spaces, ignoring a trailing space.
    pub fn number_of_spaces(&self) -> usize {
        let mut spaces: usize = self.chunks.iter().map(|c| c.space_count()).sum();
        if let Some(last) = self.chunks.last() {
            if last.text().ends_with(' ') {
                spaces = spaces.saturating_sub(1);
            }
        }
        spaces
    }

    /// Number of horizontal separators, or zero when the line has a tab.
    pub fn separator_count(&self) -> usize {
        let mut count = 0;
        for chunk in &self.chunks {
            match chunk.kind() {
                ChunkKind::Tab(_) => return 0,
                ChunkKind::Separator(sep) if !sep.vertical => count += 1,
                _ => {}
            }
        }
        count
    }

    /// Largest font size of text chunks and largest image requirement.
    pub fn max_size(&self) -> (f64, f64) {
        let mut normal: f64 = 0.0;
        let mut image: f64 = -10000.0;
        for chunk in &self.chunks {
            match chunk.inline_image() {
                Some(inline) if inline.change_leading => {
                    image = image.max(inline.image.height + inline.offset_y);
                }
                Some(_) => {}
                None => normal = normal.max(chunk.font().size()),
            }
        }
        (normal, image)
    }

    pub fn ascender(&self) -> f64 {
        self.chunks.iter().fold(0.0, |acc: f64, chunk| match chunk.inline_image() {
            Some(inline) => acc.max(inline.image.height + inline.offset_y),
            None => acc.max(chunk.font().ascent() + chunk.text_rise()),
        })
    }

    pub fn descender(&self) -> f64 {
        self.chunks.iter().fold(0.0, |acc: f64, chunk| match chunk.inline_image() {
            Some(inline) => acc.min(inline.offset_y),
            None => acc.min(chunk.font().descent() + chunk.text_rise()),
        })
    }

    /// Width of the line once justification spacing is applied.
    pub fn width_corrected(&self, char_spacing: f64, word_spacing: f64) -> f64 {
        self.chunks
            .iter()
            .map(|c| c.width_corrected(char_spacing, word_spacing))
            .sum()
    }

    // ── List symbols ────────────────────────────────────────────

    pub fn set_list_item(&mut self, symbol: Chunk, indent: f64) {
        self.list_symbol = Some(symbol);
        self.symbol_indent = indent;
    }

    pub fn list_symbol(&self) -> Option<&Chunk> {
        self.list_symbol.as_ref()
    }

    pub fn list_indent(&self) -> f64 {
        self.symbol_indent
    }

    /// The text of the line in visual order.
    pub fn text(&self) -> String {
        self.chunks.iter().map(|c| c.text()).collect()
    }
}
