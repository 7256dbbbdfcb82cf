//! # Content Sinks
//!
//! Layout never writes PDF objects. Every committed line, image, cell
//! background and border goes through a [`ContentSink`], an append-only
//! command stream the engine never reads back from. Simulation passes
//! are given no sink at all.
//!
//! Two sinks ship with the crate:
//!
//! ```text
//! ContentStream   raw PDF page-content operators (BT/TJ/ET, re f, cm Do, BMC/EMC),
//!                 optionally Flate-compressed for embedding
//! RecordingSink   a Vec of DrawOps, for tests and for callers that
//!                 post-process layout output
//! ```

use std::fmt::Write as FmtWrite;

use miniz_oxide::deflate::compress_to_vec_zlib;

use crate::font::Font;
use crate::model::{Color, Image, Rect};

/// A PDF transformation matrix `[a b c d e f]`.
pub type Transform = [f64; 6];

/// One run of text in a single font, with the extra advance to add after
/// each character (character spacing, word spacing and justification).
#[derive(Debug, Clone)]
pub struct TextRun {
    pub font: Font,
    pub text: String,
    /// One entry per char of `text`.
    pub spacing: Vec<f64>,
    pub rise: f64,
    pub color: Option<Color>,
}

impl TextRun {
    /// A run with no extra spacing.
    pub fn plain(font: Font, text: impl Into<String>) -> Self {
        let text = text.into();
        let spacing = vec![0.0; text.chars().count()];
        Self {
            font,
            text,
            spacing,
            rise: 0.0,
            color: None,
        }
    }

    /// Advance of the run including spacing.
    pub fn width(&self) -> f64 {
        self.font.width_of(&self.text) + self.spacing.iter().sum::<f64>()
    }
}

/// Output capability handed to committing layout calls.
pub trait ContentSink {
    fn save_state(&mut self);
    fn restore_state(&mut self);
    fn concat_matrix(&mut self, matrix: Transform);

    /// Position the next text run.
    fn move_to(&mut self, x: f64, y: f64);
    fn show_text(&mut self, run: &TextRun);

    /// Paint an image into the unit square mapped by `transform`.
    fn draw_image(&mut self, image: &Image, transform: Transform);
    fn fill_rect(&mut self, rect: Rect, color: Color);
    fn stroke_line(&mut self, from: (f64, f64), to: (f64, f64), width: f64, color: Color);

    fn begin_marked_content(&mut self, tag: &str);
    fn end_marked_content(&mut self);
}

/// Borrow an optional sink for one nested call without giving it up.
pub(crate) fn reborrow<'r>(
    sink: &'r mut Option<&mut dyn ContentSink>,
) -> Option<&'r mut dyn ContentSink> {
    match sink {
        Some(s) => Some(&mut **s),
        None => None,
    }
}

// ── PDF content stream ──────────────────────────────────────────

/// Writes page-content operators into a string buffer.
#[derive(Debug, Clone, Default)]
pub struct ContentStream {
    buf: String,
    cursor: (f64, f64),
    fonts: Vec<String>,
    images: Vec<String>,
}

impl ContentStream {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_str(&self) -> &str {
        &self.buf
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Fonts used so far; `/F{i}` refers to `fonts()[i]`.
    pub fn fonts(&self) -> &[String] {
        &self.fonts
    }

    /// Images used so far, referenced as `/{name}`.
    pub fn images(&self) -> &[String] {
        &self.images
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf.into_bytes()
    }

    /// Flate-compressed bytes for a `/FlateDecode` stream.
    pub fn compressed(&self) -> Vec<u8> {
        compress_to_vec_zlib(self.buf.as_bytes(), 6)
    }

    fn font_index(&mut self, name: &str) -> usize {
        if let Some(idx) = self.fonts.iter().position(|f| f == name) {
            return idx;
        }
        self.fonts.push(name.to_string());
        self.fonts.len() - 1
    }

    fn write_color(&mut self, color: Color, op: &str) {
        let _ = writeln!(
            self.buf,
            "{:.3} {:.3} {:.3} {}",
            color.r, color.g, color.b, op
        );
    }
}

impl ContentSink for ContentStream {
    fn save_state(&mut self) {
        self.buf.push_str("q\n");
    }

    fn restore_state(&mut self) {
        self.buf.push_str("Q\n");
    }

    fn concat_matrix(&mut self, m: Transform) {
        let _ = writeln!(
            self.buf,
            "{:.4} {:.4} {:.4} {:.4} {:.2} {:.2} cm",
            m[0], m[1], m[2], m[3], m[4], m[5]
        );
    }

    fn move_to(&mut self, x: f64, y: f64) {
        self.cursor = (x, y);
    }

    fn show_text(&mut self, run: &TextRun) {
        if run.text.is_empty() {
            return;
        }
        let idx = self.font_index(run.font.name());
        let size = run.font.size();
        self.buf.push_str("BT\n");
        let _ = writeln!(self.buf, "/F{} {:.2} Tf", idx, size);
        if let Some(color) = run.color {
            self.write_color(color, "rg");
        }
        if run.rise != 0.0 {
            let _ = writeln!(self.buf, "{:.2} Ts", run.rise);
        }
        let _ = writeln!(self.buf, "1 0 0 1 {:.2} {:.2} Tm", self.cursor.0, self.cursor.1);

        // TJ adjustments are in thousandths of text space, negative moves right.
        self.buf.push('[');
        let mut hex = String::new();
        for (i, ch) in run.text.chars().enumerate() {
            let mut utf8 = [0u8; 4];
            for byte in run.font.encode(ch.encode_utf8(&mut utf8)) {
                let _ = write!(hex, "{:02X}", byte);
            }
            let extra = run.spacing.get(i).copied().unwrap_or(0.0);
            if extra != 0.0 && size > 0.0 {
                let _ = write!(self.buf, "<{}> {:.2} ", hex, -extra * 1000.0 / size);
                hex.clear();
            }
        }
        if !hex.is_empty() {
            let _ = write!(self.buf, "<{}>", hex);
        }
        self.buf.push_str("] TJ\nET\n");
    }

    fn draw_image(&mut self, image: &Image, m: Transform) {
        if !self.images.contains(&image.name) {
            self.images.push(image.name.clone());
        }
        self.save_state();
        self.concat_matrix(m);
        let _ = writeln!(self.buf, "/{} Do", image.name);
        self.restore_state();
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.save_state();
        self.write_color(color, "rg");
        let _ = writeln!(
            self.buf,
            "{:.2} {:.2} {:.2} {:.2} re",
            rect.llx,
            rect.lly,
            rect.width(),
            rect.height()
        );
        self.buf.push_str("f\n");
        self.restore_state();
    }

    fn stroke_line(&mut self, from: (f64, f64), to: (f64, f64), width: f64, color: Color) {
        self.save_state();
        self.write_color(color, "RG");
        let _ = writeln!(self.buf, "{:.2} w", width);
        let _ = writeln!(self.buf, "{:.2} {:.2} m", from.0, from.1);
        let _ = writeln!(self.buf, "{:.2} {:.2} l", to.0, to.1);
        self.buf.push_str("S\n");
        self.restore_state();
    }

    fn begin_marked_content(&mut self, tag: &str) {
        let _ = writeln!(self.buf, "/{} BMC", tag);
    }

    fn end_marked_content(&mut self) {
        self.buf.push_str("EMC\n");
    }
}

// ── Recording sink ──────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    SaveState,
    RestoreState,
    ConcatMatrix(Transform),
    Text {
        text: String,
        font: String,
        size: f64,
        x: f64,
        y: f64,
        spacing: Vec<f64>,
    },
    Image {
        name: String,
        transform: Transform,
    },
    FillRect {
        rect: Rect,
        color: Color,
    },
    Line {
        from: (f64, f64),
        to: (f64, f64),
        width: f64,
    },
    BeginMarked(String),
    EndMarked,
}

/// Keeps every command in memory.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    ops: Vec<DrawOp>,
    cursor: (f64, f64),
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// `(text, x, y)` of every text run, in drawing order.
    pub fn text_runs(&self) -> Vec<(&str, f64, f64)> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { text, x, y, .. } => Some((text.as_str(), *x, *y)),
                _ => None,
            })
            .collect()
    }

    /// Text runs joined into lines by baseline, in drawing order.
    pub fn lines(&self) -> Vec<String> {
        let mut lines: Vec<(f64, String)> = Vec::new();
        for (text, _, y) in self.text_runs() {
            match lines.last_mut() {
                Some((last_y, line)) if (*last_y - y).abs() < 1e-6 => line.push_str(text),
                _ => lines.push((y, text.to_string())),
            }
        }
        lines.into_iter().map(|(_, line)| line).collect()
    }
}

impl ContentSink for RecordingSink {
    fn save_state(&mut self) {
        self.ops.push(DrawOp::SaveState);
    }

    fn restore_state(&mut self) {
        self.ops.push(DrawOp::RestoreState);
    }

    fn concat_matrix(&mut self, matrix: Transform) {
        self.ops.push(DrawOp::ConcatMatrix(matrix));
    }

    fn move_to(&mut self, x: f64, y: f64) {
        self.cursor = (x, y);
    }

    fn show_text(&mut self, run: &TextRun) {
        self.ops.push(DrawOp::Text {
            text: run.text.clone(),
            font: run.font.name().to_string(),
            size: run.font.size(),
            x: self.cursor.0,
            y: self.cursor.1,
            spacing: run.spacing.clone(),
        });
    }

    fn draw_image(&mut self, image: &Image, transform: Transform) {
        self.ops.push(DrawOp::Image {
            name: image.name.clone(),
            transform,
        });
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.ops.push(DrawOp::FillRect { rect, color });
    }

    fn stroke_line(&mut self, from: (f64, f64), to: (f64, f64), width: f64, _color: Color) {
        self.ops.push(DrawOp::Line { from, to, width });
    }

    fn begin_marked_content(&mut self, tag: &str) {
        self.ops.push(DrawOp::BeginMarked(tag.to_string()));
    }

    fn end_marked_content(&mut self) {
        self.ops.push(DrawOp::EndMarked);
    }
}
