//! # Column Fitter
//!
//! [`ColumnText`] flows content into one column at a time. A call to
//! [`ColumnText::go`] places lines until either the text or the column
//! runs out and reports which through a [`Status`]. The caller re-primes
//! the column (usually with the next page's rectangle) and calls `go`
//! again; unconsumed content is kept.
//!
//! ```text
//!               add_text / add_element
//!                        │
//!                        ▼
//!   ┌──── go ──▶ pack a line ──▶ fits vertically? ── no ──▶ restore ──▶ NO_MORE_COLUMN
//!   │                │                  │
//!   │           nothing left           yes
//!   │                │                  │
//!   │                ▼                  ▼
//!   │          NO_MORE_TEXT        commit line (unless simulating)
//!   │                                   │
//!   └───────────────────────────────────┘
//! ```
//!
//! Rectangular columns measure a line after packing it. Irregular columns
//! (two polyline walls) probe the walls at the current baseline and one
//! leading below, and skip down a leading at a time while the walls are
//! too close together.

use std::collections::VecDeque;
use std::sync::Arc;

use crate::config::LayoutConfig;
use crate::error::{LayoutError, Result};
use crate::model::{Alignment, Element, Phrase, Rect, RunDirection};
use crate::pdf::{reborrow, ContentSink};
use crate::text::{Chunk, LineFeeder};

use super::boundary::{ColumnSpec, Wall, WallHit};
use super::render::{aligned_bounds, write_line, Justification};
use super::Status;

/// Horizontal extent of the column.
#[derive(Debug, Clone)]
pub(super) enum Boundary {
    Unset,
    Rect { left_x: f64, right_x: f64 },
    Walls { left: Wall, right: Wall },
}

/// Intersection of both walls with one horizontal line.
enum Limits {
    OffLimits,
    NoLine,
    At(f64, f64),
}

#[derive(Debug, Clone)]
pub struct ColumnText {
    pub(super) config: Arc<LayoutConfig>,

    // ── Geometry ────────────────────────────────────────────────
    pub(super) boundary: Boundary,
    pub(super) min_y: f64,
    pub(super) max_y: f64,
    pub(super) y_line: f64,

    // ── Paragraph settings ──────────────────────────────────────
    pub(super) alignment: Alignment,
    pub(super) indent: f64,
    pub(super) following_indent: f64,
    pub(super) right_indent: f64,
    pub(super) extra_paragraph_space: f64,
    pub(super) fixed_leading: f64,
    pub(super) multiplied_leading: f64,
    pub(super) current_leading: f64,
    pub(super) run_direction: RunDirection,
    pub(super) space_char_ratio: Option<f64>,
    pub(super) use_ascender: bool,
    pub(super) adjust_first_line: bool,

    // ── Progress ────────────────────────────────────────────────
    pub(super) feeder: LineFeeder,
    pub(super) last_was_newline: bool,
    pub(super) descender: f64,
    pub(super) lines_written: usize,
    pub(super) filled_width: f64,
    pub(super) first_line_y: Option<f64>,
    /// List symbol waiting for the first committed line, with its offset
    /// left of the line start.
    pub(super) list_symbol: Option<(Chunk, f64)>,

    // ── Composite mode ──────────────────────────────────────────
    pub(super) composite: bool,
    pub(super) elements: VecDeque<Element>,
    pub(super) composite_column: Option<Box<ColumnText>>,
    /// Item index inside the current list, or row index inside the
    /// current table.
    pub(super) list_idx: usize,
    /// A table row that did not fit on a fresh column once already.
    pub(super) refused_row: Option<usize>,
}

impl Default for ColumnText {
    fn default() -> Self {
        Self::new()
    }
}

impl ColumnText {
    pub fn new() -> Self {
        Self::with_config(Arc::new(LayoutConfig::default()))
    }

    pub fn with_config(config: Arc<LayoutConfig>) -> Self {
        let leading = config.default_leading;
        Self {
            config,
            boundary: Boundary::Unset,
            min_y: 0.0,
            max_y: 0.0,
            y_line: 0.0,
            alignment: Alignment::Left,
            indent: 0.0,
            following_indent: 0.0,
            right_indent: 0.0,
            extra_paragraph_space: 0.0,
            fixed_leading: leading,
            multiplied_leading: 0.0,
            current_leading: leading,
            run_direction: RunDirection::Default,
            space_char_ratio: None,
            use_ascender: false,
            adjust_first_line: true,
            feeder: LineFeeder::new(),
            last_was_newline: true,
            descender: 0.0,
            lines_written: 0,
            filled_width: 0.0,
            first_line_y: None,
            list_symbol: None,
            composite: false,
            elements: VecDeque::new(),
            composite_column: None,
            list_idx: 0,
            refused_row: None,
        }
    }

    pub fn config(&self) -> &Arc<LayoutConfig> {
        &self.config
    }

    pub fn set_config(&mut self, config: Arc<LayoutConfig>) {
        self.config = config;
    }

    // ── Boundaries ──────────────────────────────────────────────

    /// Use a rectangle given by any two opposite corners. The write
    /// cursor moves to the top.
    pub fn set_simple_column(&mut self, llx: f64, lly: f64, urx: f64, ury: f64) {
        let rect = Rect::new(llx, lly, urx, ury);
        self.boundary = Boundary::Rect {
            left_x: rect.llx,
            right_x: rect.urx,
        };
        self.min_y = rect.lly;
        self.max_y = rect.ury;
        self.y_line = rect.ury;
    }

    /// Like [`set_simple_column`](Self::set_simple_column), also setting a
    /// fixed leading and the alignment.
    pub fn set_simple_column_with(
        &mut self,
        llx: f64,
        lly: f64,
        urx: f64,
        ury: f64,
        leading: f64,
        alignment: Alignment,
    ) {
        self.set_simple_column(llx, lly, urx, ury);
        self.set_leading(leading, 0.0);
        self.alignment = alignment;
    }

    /// Use two polylines `[x1, y1, x2, y2, ...]` as the left and right
    /// walls. The cursor starts at the higher end of the left wall.
    pub fn set_columns(&mut self, left: &[f64], right: &[f64]) -> Result<()> {
        let left_wall = Wall::from_points(left)?;
        let right_wall = Wall::from_points(right)?;
        self.min_y = left_wall.min_y().min(right_wall.min_y());
        self.max_y = left_wall.max_y().max(right_wall.max_y());
        self.y_line = left[1].max(left[left.len() / 2 * 2 - 1]);
        self.boundary = Boundary::Walls {
            left: left_wall,
            right: right_wall,
        };
        Ok(())
    }

    pub fn apply_spec(&mut self, spec: &ColumnSpec) -> Result<()> {
        match spec {
            ColumnSpec::Rect(rect) => {
                self.set_simple_column(rect.llx, rect.lly, rect.urx, rect.ury);
                Ok(())
            }
            ColumnSpec::Walls { left, right } => self.set_columns(left, right),
        }
    }

    pub fn is_rectangular(&self) -> bool {
        matches!(self.boundary, Boundary::Rect { .. })
    }

    // ── Content ─────────────────────────────────────────────────

    /// Append text. Ignored once the column is in composite mode.
    pub fn add_text(&mut self, phrase: impl Into<Phrase>) {
        if self.composite {
            log::debug!("add_text ignored on a composite column");
            return;
        }
        self.feeder.extend(phrase.into().chunks);
    }

    /// Replace all content with `phrase` and leave composite mode.
    pub fn set_text(&mut self, phrase: impl Into<Phrase>) {
        self.feeder.clear();
        self.composite = false;
        self.elements.clear();
        self.composite_column = None;
        self.list_idx = 0;
        self.refused_row = None;
        self.last_was_newline = true;
        self.feeder.extend(phrase.into().chunks);
    }

    /// Queue a block element. The first element switches the column to
    /// composite mode and discards any plain text.
    pub fn add_element(&mut self, element: impl Into<Element>) {
        if !self.composite {
            self.composite = true;
            self.feeder.clear();
            self.elements.clear();
        }
        self.elements.push_back(element.into());
    }

    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.elements.iter()
    }

    pub fn is_composite(&self) -> bool {
        self.composite
    }

    /// No content is left to place.
    pub fn is_empty(&self) -> bool {
        if self.composite {
            self.elements.is_empty()
        } else {
            self.feeder.is_empty()
        }
    }

    /// The next element draws something without taking height.
    pub fn zero_height_element(&self) -> bool {
        self.composite && matches!(self.elements.front(), Some(Element::Marker(_)))
    }

    // ── Settings ────────────────────────────────────────────────

    /// Leading as `fixed + multiplied * largest font size`.
    pub fn set_leading(&mut self, fixed: f64, multiplied: f64) {
        self.fixed_leading = fixed;
        self.multiplied_leading = multiplied;
    }

    pub fn fixed_leading(&self) -> f64 {
        self.fixed_leading
    }

    pub fn multiplied_leading(&self) -> f64 {
        self.multiplied_leading
    }

    pub fn set_alignment(&mut self, alignment: Alignment) {
        self.alignment = alignment;
    }

    pub fn alignment(&self) -> Alignment {
        self.alignment
    }

    /// Indentation of the first line of each paragraph.
    pub fn set_indent(&mut self, indent: f64) {
        self.indent = indent;
        self.last_was_newline = true;
    }

    /// Indentation of every other line.
    pub fn set_following_indent(&mut self, indent: f64) {
        self.following_indent = indent;
    }

    pub fn set_right_indent(&mut self, indent: f64) {
        self.right_indent = indent;
    }

    pub fn set_extra_paragraph_space(&mut self, space: f64) {
        self.extra_paragraph_space = space;
    }

    pub fn set_run_direction(&mut self, direction: RunDirection) {
        self.run_direction = direction;
    }

    /// Set the run direction from its numeric code.
    pub fn set_run_direction_code(&mut self, code: i32) -> Result<()> {
        self.run_direction = RunDirection::try_from(code)?;
        Ok(())
    }

    pub fn run_direction(&self) -> RunDirection {
        self.run_direction
    }

    /// Override the justification ratio of the configuration.
    pub fn set_space_char_ratio(&mut self, ratio: f64) {
        self.space_char_ratio = Some(ratio);
    }

    /// Use the ascender of the first line instead of its leading.
    pub fn set_use_ascender(&mut self, use_ascender: bool) {
        self.use_ascender = use_ascender;
    }

    /// Suppress spacing-before on the first element of a column.
    pub fn set_adjust_first_line(&mut self, adjust: bool) {
        self.adjust_first_line = adjust;
    }

    // ── Progress ────────────────────────────────────────────────

    pub fn y_line(&self) -> f64 {
        self.y_line
    }

    pub fn set_y_line(&mut self, y: f64) {
        self.y_line = y;
    }

    pub fn lines_written(&self) -> usize {
        self.lines_written
    }

    /// Descender of the last line placed.
    pub fn descender(&self) -> f64 {
        self.descender
    }

    /// Widest line placed so far.
    pub fn filled_width(&self) -> f64 {
        self.filled_width
    }

    pub fn set_filled_width(&mut self, width: f64) {
        self.filled_width = width;
    }

    pub fn current_leading(&self) -> f64 {
        self.current_leading
    }

    pub(super) fn update_filled_width(&mut self, width: f64) {
        if width > self.filled_width {
            self.filled_width = width;
        }
    }

    // ── Fitting ─────────────────────────────────────────────────

    /// Place content into the column, committing lines to `sink`.
    pub fn go(&mut self, sink: &mut dyn ContentSink) -> Result<Status> {
        self.go_with(Some(sink), false)
    }

    /// Place content without drawing anything.
    ///
    /// Consumption still happens; run it on a clone to measure without
    /// losing content.
    pub fn simulate(&mut self) -> Result<Status> {
        self.go_with(None, true)
    }

    pub fn go_with(&mut self, sink: Option<&mut dyn ContentSink>, simulate: bool) -> Result<Status> {
        if !simulate && sink.is_none() {
            return Err(LayoutError::MissingSink);
        }
        if matches!(self.boundary, Boundary::Unset) {
            if !simulate {
                return Err(LayoutError::NoColumn);
            }
            let mut status = Status::NO_MORE_COLUMN;
            if self.is_empty() {
                status |= Status::NO_MORE_TEXT;
            }
            return Ok(status);
        }

        let status = if self.composite {
            self.go_composite(sink, simulate)?
        } else {
            self.go_simple(sink, simulate)
        };
        log::debug!(
            "column go: {:?} after {} lines, y = {:.2}",
            status,
            self.lines_written,
            self.y_line
        );
        Ok(status)
    }

    fn go_simple(&mut self, mut sink: Option<&mut dyn ContentSink>, simulate: bool) -> Status {
        self.descender = 0.0;
        self.lines_written = 0;
        self.first_line_y = None;
        let ratio = self.config.effective_space_char_ratio(self.space_char_ratio);
        let direction = self.run_direction.or(RunDirection::NoBidi);
        let mut justification = Justification::new();
        let mut probes = 0u32;

        let rect = match self.boundary {
            Boundary::Rect { left_x, right_x } => Some((left_x, (right_x - left_x).max(0.0))),
            _ => None,
        };
        if rect.is_none() {
            let computed =
                self.fixed_leading + self.feeder.max_font_size() * self.multiplied_leading;
            if computed > 0.0 {
                self.current_leading = computed;
            }
        }

        loop {
            let first_indent = if self.last_was_newline {
                self.indent
            } else {
                self.following_indent
            };

            let (x1, mut line) = if let Some((left_x, width)) = rect {
                if width <= first_indent + self.right_indent {
                    return self.exhausted_status();
                }
                if self.feeder.is_empty() {
                    return Status::NO_MORE_TEXT;
                }
                let Some(line) = self.feeder.process_line(
                    left_x,
                    width - first_indent - self.right_indent,
                    self.alignment,
                    direction,
                ) else {
                    return Status::NO_MORE_TEXT;
                };

                let (font_size, image) = line.max_size();
                self.current_leading = if self.use_ascender && self.first_line_y.is_none() {
                    line.ascender()
                } else {
                    self.line_leading(font_size).max(image)
                };
                if self.y_line > self.max_y || self.y_line - self.current_leading < self.min_y {
                    self.feeder.restore();
                    return Status::NO_MORE_COLUMN;
                }
                self.y_line -= self.current_leading;
                self.update_filled_width(width - line.width_left());
                (left_x, line)
            } else {
                let y_temp = self.y_line;
                let Some(limits) = self.find_limits_two_lines(&mut probes) else {
                    self.y_line = y_temp;
                    return self.exhausted_status();
                };
                if self.feeder.is_empty() {
                    self.y_line = y_temp;
                    return Status::NO_MORE_TEXT;
                }
                let x1 = limits[0].max(limits[2]);
                let x2 = limits[1].min(limits[3]);
                if x2 - x1 <= first_indent + self.right_indent {
                    log::trace!("column too narrow at y = {:.2}, moving down", self.y_line);
                    continue;
                }
                let Some(line) = self.feeder.process_line(
                    x1,
                    x2 - x1 - first_indent - self.right_indent,
                    self.alignment,
                    direction,
                ) else {
                    self.y_line = y_temp;
                    return Status::NO_MORE_TEXT;
                };
                (x1, line)
            };

            if self.first_line_y.is_none() {
                self.first_line_y = Some(self.y_line);
            }
            if !simulate {
                if let Some((symbol, offset)) = self.list_symbol.take() {
                    line.set_list_item(symbol, offset);
                }
                let x = x1
                    + if line.is_rtl() {
                        self.right_indent
                    } else {
                        first_indent
                    };
                if let Some(s) = reborrow(&mut sink) {
                    write_line(s, &line, x, self.y_line, ratio, &mut justification);
                }
            }
            self.last_was_newline = line.is_newline_split();
            if line.is_newline_split() {
                self.y_line -= self.extra_paragraph_space;
            }
            self.lines_written += 1;
            self.descender = line.descender();
            probes = 0;
        }
    }

    fn exhausted_status(&self) -> Status {
        let mut status = Status::NO_MORE_COLUMN;
        if self.feeder.is_empty() {
            status |= Status::NO_MORE_TEXT;
        }
        status
    }

    /// `fixed + multiplied * size`, falling back to the fixed part.
    fn line_leading(&self, font_size: f64) -> f64 {
        let normal = if font_size > 0.0 {
            self.fixed_leading + self.multiplied_leading * font_size
        } else {
            0.0
        };
        if normal > 0.0 {
            normal
        } else {
            self.fixed_leading
        }
    }

    fn limits_at(&self, left: &Wall, right: &Wall) -> Limits {
        let x1 = match left.hit(self.y_line, self.min_y, self.max_y) {
            WallHit::OffLimits => return Limits::OffLimits,
            WallHit::NoLine => return Limits::NoLine,
            WallHit::At(x) => x,
        };
        match right.hit(self.y_line, self.min_y, self.max_y) {
            WallHit::At(x2) => Limits::At(x1, x2),
            WallHit::OffLimits => Limits::OffLimits,
            WallHit::NoLine => Limits::NoLine,
        }
    }

    /// Probe the walls at the cursor and one leading below, moving the
    /// cursor down until both probes overlap. Returns
    /// `[left_top, right_top, left_bottom, right_bottom]`.
    fn find_limits_two_lines(&mut self, probes: &mut u32) -> Option<[f64; 4]> {
        let (left, right) = match &self.boundary {
            Boundary::Walls { left, right } => (left.clone(), right.clone()),
            _ => return None,
        };
        let mut repeat = false;
        loop {
            if repeat && self.current_leading <= self.config.min_leading_step {
                return None;
            }
            if *probes >= self.config.irregular_probe_limit {
                log::warn!(
                    "no usable column width found after {} probes, giving up at y = {:.2}",
                    probes,
                    self.y_line
                );
                return None;
            }
            *probes += 1;
            repeat = true;

            let top = self.limits_at(&left, &right);
            if matches!(top, Limits::OffLimits) {
                return None;
            }
            self.y_line -= self.current_leading;
            let Limits::At(top_left, top_right) = top else {
                continue;
            };

            let (bottom_left, bottom_right) = match self.limits_at(&left, &right) {
                Limits::OffLimits => return None,
                Limits::NoLine => {
                    self.y_line -= self.current_leading;
                    continue;
                }
                Limits::At(a, b) => (a, b),
            };
            if top_left >= bottom_right || bottom_left >= top_right {
                continue;
            }
            log::trace!(
                "column limits at y = {:.2}: {:.2}..{:.2}",
                self.y_line,
                top_left.max(bottom_left),
                top_right.min(bottom_right)
            );
            return Some([top_left, top_right, bottom_left, bottom_right]);
        }
    }

    // ── One-line helpers ────────────────────────────────────────

    /// Draw `phrase` as a single line anchored at `(x, y)`, rotated by
    /// `rotation` degrees around the anchor.
    pub fn show_text_aligned(
        sink: &mut dyn ContentSink,
        alignment: Alignment,
        phrase: impl Into<Phrase>,
        x: f64,
        y: f64,
        rotation: f64,
        run_direction: RunDirection,
    ) -> Result<()> {
        let mut alignment = match alignment {
            Alignment::Center | Alignment::Right => alignment,
            _ => Alignment::Left,
        };
        sink.save_state();
        let (mut llx, mut urx) = aligned_bounds(alignment, 0.0);
        let (mut lly, mut ury) = (-1.0, 2.0);
        if rotation == 0.0 {
            llx += x;
            urx += x;
            lly += y;
            ury += y;
        } else {
            let (sin, cos) = rotation.to_radians().sin_cos();
            sink.concat_matrix([cos, sin, -sin, cos, x, y]);
        }

        let mut column = ColumnText::new();
        column.set_simple_column_with(llx, lly, urx, ury, 2.0, alignment);
        if run_direction == RunDirection::Rtl {
            alignment = match alignment {
                Alignment::Left => Alignment::Right,
                Alignment::Right => Alignment::Left,
                other => other,
            };
        }
        column.alignment = alignment;
        column.run_direction = run_direction;
        column.add_text(phrase);
        let result = column.go(sink);
        sink.restore_state();
        result.map(|_| ())
    }

    /// Natural width of `phrase` on one line.
    pub fn width_of(phrase: &Phrase) -> f64 {
        const REACH: f64 = 20_000.0;
        let mut feeder = LineFeeder::new();
        feeder.extend(phrase.chunks.iter().cloned());
        match feeder.process_line(0.0, REACH, Alignment::Left, RunDirection::NoBidi) {
            Some(line) => REACH - line.width_left(),
            None => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::{FixedWidthFont, Font};
    use crate::model::Image;
    use crate::pdf::{DrawOp, RecordingSink};
    use crate::text::InlineImage;

    const FOX: &str = "The quick brown fox jumps over the lazy dog";

    fn mono(size: f64) -> Font {
        FixedWidthFont::new("Mono", 1000).at(size)
    }

    fn fox_column(height: f64) -> ColumnText {
        let mut column = ColumnText::new();
        column.set_simple_column(0.0, 0.0, 200.0, height);
        column.add_text(Phrase::new(FOX, mono(20.0)));
        column
    }

    #[test]
    fn test_fox_fills_five_lines() {
        let mut column = fox_column(100.0);
        let mut sink = RecordingSink::new();
        let status = column.go(&mut sink).unwrap();
        assert_eq!(status, Status::NO_MORE_TEXT);
        assert_eq!(
            sink.lines(),
            vec!["The quick", "brown fox", "jumps over", "the lazy", "dog"]
        );
        assert_eq!(column.lines_written(), 5);
        assert_eq!(column.y_line(), 20.0);
    }

    #[test]
    fn test_short_column_continues_on_the_next() {
        let mut column = fox_column(60.0);
        let mut sink = RecordingSink::new();
        assert_eq!(column.go(&mut sink).unwrap(), Status::NO_MORE_COLUMN);
        assert_eq!(sink.lines(), vec!["The quick", "brown fox", "jumps over"]);

        column.set_simple_column(0.0, 0.0, 200.0, 60.0);
        let mut next = RecordingSink::new();
        assert_eq!(column.go(&mut next).unwrap(), Status::NO_MORE_TEXT);
        assert_eq!(next.lines(), vec!["the lazy", "dog"]);
    }

    #[test]
    fn test_simulate_draws_nothing_and_matches_go() {
        let column = fox_column(60.0);
        let mut dry = column.clone();
        let dry_status = dry.simulate().unwrap();

        let mut real = column.clone();
        let mut sink = RecordingSink::new();
        let status = real.go(&mut sink).unwrap();
        assert_eq!(dry_status, status);
        assert_eq!(dry.y_line(), real.y_line());
        assert_eq!(dry.lines_written(), real.lines_written());
    }

    #[test]
    fn test_column_narrower_than_indent() {
        let mut column = fox_column(100.0);
        column.set_indent(150.0);
        column.set_right_indent(60.0);
        let mut sink = RecordingSink::new();
        assert_eq!(column.go(&mut sink).unwrap(), Status::NO_MORE_COLUMN);
        assert!(sink.is_empty());
    }

    #[test]
    fn test_empty_column_reports_both() {
        let mut column = ColumnText::new();
        column.set_simple_column(0.0, 0.0, 0.0, 100.0);
        assert_eq!(
            column.simulate().unwrap(),
            Status::NO_MORE_TEXT | Status::NO_MORE_COLUMN
        );
    }

    #[test]
    fn test_use_ascender_on_first_line() {
        let mut column = fox_column(100.0);
        column.set_leading(30.0, 0.0);
        column.set_use_ascender(true);
        let mut sink = RecordingSink::new();
        column.go(&mut sink).unwrap();
        let ys: Vec<f64> = sink.text_runs().iter().map(|r| r.2).collect();
        assert_eq!(ys[0], 84.0);
        assert_eq!(ys[1], 54.0);
    }

    #[test]
    fn test_first_line_indent_and_paragraph_space() {
        let mut column = ColumnText::new();
        column.set_simple_column(0.0, 0.0, 200.0, 200.0);
        column.set_indent(20.0);
        column.set_extra_paragraph_space(4.0);
        column.add_text(Phrase::new("aaaa bbbb cccc\ndddd", mono(20.0)));
        let mut sink = RecordingSink::new();
        column.go(&mut sink).unwrap();
        let runs = sink.text_runs();
        assert_eq!(runs[0], ("aaaa bbbb", 20.0, 184.0));
        assert_eq!(runs[1], ("cccc", 0.0, 168.0));
        // The explicit newline adds paragraph space and re-indents.
        assert_eq!(runs[2], ("dddd", 20.0, 148.0));
    }

    #[test]
    fn test_leading_grows_with_font_size() {
        let mut column = ColumnText::new();
        column.set_simple_column(0.0, 0.0, 500.0, 100.0);
        column.set_leading(0.0, 1.5);
        column.add_text(Phrase::new("x", mono(20.0)));
        column.simulate().unwrap();
        assert_eq!(column.y_line(), 70.0);
    }

    #[test]
    fn test_irregular_column_skips_narrow_band() {
        let mut column = ColumnText::new();
        column
            .set_columns(
                &[0.0, 200.0, 0.0, 0.0],
                &[
                    100.0, 200.0, 100.0, 120.0, 0.0, 115.0, 0.0, 95.0, 100.0, 90.0, 100.0, 0.0,
                ],
            )
            .unwrap();
        column.set_leading(10.0, 0.0);
        column.add_text(Phrase::new("aaaa ".repeat(30), mono(10.0)));

        let mut sink = RecordingSink::new();
        let status = column.go(&mut sink).unwrap();
        assert_eq!(status, Status::NO_MORE_TEXT);
        let ys: Vec<f64> = sink.text_runs().iter().map(|r| r.2).collect();
        assert_eq!(ys.len(), 15);
        assert!(ys.contains(&120.0));
        assert!(ys.contains(&80.0));
        assert!(ys.iter().all(|&y| y <= 80.0 || y >= 120.0));
    }

    #[test]
    fn test_irregular_probe_is_capped() {
        let config = LayoutConfig {
            irregular_probe_limit: 3,
            ..LayoutConfig::default()
        };
        let mut column = ColumnText::with_config(Arc::new(config));
        column
            .set_columns(&[0.0, 1000.0, 0.0, 0.0], &[0.0, 1000.0, 0.0, 0.0])
            .unwrap();
        column.set_leading(1.0, 0.0);
        column.add_text(Phrase::new("word", mono(10.0)));
        assert_eq!(column.simulate().unwrap(), Status::NO_MORE_COLUMN);
        assert!(column.y_line() > 990.0);
    }

    #[test]
    fn test_irregular_cursor_rests_on_last_baseline() {
        let mut column = ColumnText::new();
        column
            .set_columns(&[0.0, 100.0, 0.0, 0.0], &[200.0, 100.0, 200.0, 0.0])
            .unwrap();
        column.set_leading(10.0, 0.0);
        column.add_text(Phrase::new("ab", mono(10.0)));

        let mut sink = RecordingSink::new();
        assert_eq!(column.go(&mut sink).unwrap(), Status::NO_MORE_TEXT);
        assert_eq!(sink.text_runs()[0].2, 90.0);
        assert_eq!(column.y_line(), 90.0);

        column.add_text(Phrase::new("cd", mono(10.0)));
        let mut next = RecordingSink::new();
        assert_eq!(column.go(&mut next).unwrap(), Status::NO_MORE_TEXT);
        assert_eq!(next.text_runs()[0].2, 80.0);
        assert_eq!(column.y_line(), 80.0);
    }

    #[test]
    fn test_tall_inline_image_sets_leading() {
        let mut column = ColumnText::new();
        column.set_simple_column(0.0, 0.0, 500.0, 100.0);
        column.set_leading(10.0, 0.0);
        let inline = InlineImage {
            image: Image::new("logo", 20.0, 30.0),
            offset_x: 0.0,
            offset_y: 0.0,
            change_leading: true,
        };
        column.add_text(Phrase::new("x\n", mono(10.0)));
        column.add_text(Phrase::from(Chunk::image(inline, mono(10.0))));
        column.simulate().unwrap();
        // 10 for the text line, then exactly the image height.
        assert_eq!(column.y_line(), 60.0);
    }

    #[test]
    fn test_go_without_sink_fails() {
        let mut column = fox_column(100.0);
        assert!(matches!(
            column.go_with(None, false),
            Err(LayoutError::MissingSink)
        ));
    }

    #[test]
    fn test_go_without_boundary() {
        let mut column = ColumnText::new();
        column.add_text(Phrase::new("x", mono(10.0)));
        let mut sink = RecordingSink::new();
        assert!(matches!(column.go(&mut sink), Err(LayoutError::NoColumn)));
        assert_eq!(column.simulate().unwrap(), Status::NO_MORE_COLUMN);
    }

    #[test]
    fn test_bad_run_direction_code() {
        let mut column = ColumnText::new();
        assert!(column.set_run_direction_code(3).is_ok());
        assert_eq!(column.run_direction(), RunDirection::Rtl);
        assert!(matches!(
            column.set_run_direction_code(9),
            Err(LayoutError::InvalidRunDirection(9))
        ));
    }

    #[test]
    fn test_degenerate_walls_fail_fast() {
        let mut column = ColumnText::new();
        assert!(column.set_columns(&[0.0, 10.0, 0.0, 0.0], &[5.0]).is_err());
        assert!(column
            .set_columns(&[0.0, 10.0, 50.0, 10.0], &[5.0, 0.0, 5.0, 10.0])
            .is_err());
    }

    #[test]
    fn test_apply_spec() {
        let mut column = ColumnText::new();
        let spec: ColumnSpec =
            serde_json::from_str(r#"{"rect": {"llx": 10, "lly": 20, "urx": 110, "ury": 220}}"#)
                .unwrap();
        column.apply_spec(&spec).unwrap();
        assert!(column.is_rectangular());
        assert_eq!(column.y_line(), 220.0);
    }

    #[test]
    fn test_set_text_leaves_composite_mode() {
        let mut column = ColumnText::new();
        column.add_element(Phrase::new("block", mono(10.0)));
        assert!(column.is_composite());
        column.add_text(Phrase::new("ignored", mono(10.0)));
        column.set_text(Phrase::new("plain", mono(10.0)));
        assert!(!column.is_composite());
        assert!(!column.is_empty());
    }

    #[test]
    fn test_show_text_aligned_right() {
        let mut sink = RecordingSink::new();
        ColumnText::show_text_aligned(
            &mut sink,
            Alignment::Right,
            Phrase::new("abc", mono(10.0)),
            300.0,
            500.0,
            0.0,
            RunDirection::NoBidi,
        )
        .unwrap();
        assert_eq!(sink.ops().first(), Some(&DrawOp::SaveState));
        assert_eq!(sink.text_runs(), vec![("abc", 270.0, 500.0)]);
        assert_eq!(sink.ops().last(), Some(&DrawOp::RestoreState));
    }

    #[test]
    fn test_show_text_aligned_rotated() {
        let mut sink = RecordingSink::new();
        ColumnText::show_text_aligned(
            &mut sink,
            Alignment::Left,
            Phrase::new("up", mono(10.0)),
            50.0,
            60.0,
            90.0,
            RunDirection::NoBidi,
        )
        .unwrap();
        assert!(matches!(sink.ops()[1], DrawOp::ConcatMatrix(m) if m[4] == 50.0 && m[5] == 60.0));
        assert_eq!(sink.text_runs(), vec![("up", 0.0, 0.0)]);
    }

    #[test]
    fn test_width_of() {
        let phrase = Phrase::new("abcd", mono(10.0)).with_chunk(Chunk::new("ef", mono(20.0)));
        assert_eq!(ColumnText::width_of(&phrase), 80.0);
        assert_eq!(ColumnText::width_of(&Phrase::default()), 0.0);
    }
}
