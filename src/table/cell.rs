//! # Table Cells
//!
//! A [`PdfPCell`] owns a [`ColumnText`] with its content, or a block image
//! scaled to the cell width. Its horizontal extent (`left`, `right`) is
//! relative to the table's left edge and is assigned by the row; its
//! vertical extent is only known when the row is written.
//!
//! Measuring and drawing both work on clones of the cell column, so a
//! cell can be measured and written any number of times. Only
//! [`consume_height`](PdfPCell::consume_height) and row splitting eat
//! content for real.

use std::sync::Arc;

use bitflags::bitflags;

use crate::config::LayoutConfig;
use crate::error::Result;
use crate::font::Font;
use crate::layout::{ColumnText, Status};
use crate::model::{
    Alignment, Color, Edges, Element, Image, Phrase, Rect, RunDirection, VerticalAlignment,
};
use crate::pdf::ContentSink;
use crate::text::{Chunk, InlineImage};

use super::row::Layer;
use super::{PdfPTable, BOTTOM_LIMIT, RIGHT_LIMIT};

bitflags! {
    /// Which sides of a cell get a border line.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Borders: u8 {
        const TOP = 1;
        const BOTTOM = 2;
        const LEFT = 4;
        const RIGHT = 8;
        const BOX = Self::TOP.bits() | Self::BOTTOM.bits() | Self::LEFT.bits() | Self::RIGHT.bits();
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Border {
    pub sides: Borders,
    pub width: f64,
    pub color: Color,
}

impl Default for Border {
    fn default() -> Self {
        Self {
            sides: Borders::BOX,
            width: 0.5,
            color: Color::BLACK,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PdfPCell {
    pub(crate) column: ColumnText,
    /// Block image scaled to fit the cell.
    pub(crate) image: Option<Image>,
    pub(crate) left: f64,
    pub(crate) right: f64,
    padding: Edges,
    use_border_padding: bool,
    pub(crate) colspan: usize,
    pub(crate) rowspan: usize,
    pub(crate) fixed_height: f64,
    min_height: f64,
    /// Natural height from the last measurement.
    pub(crate) calculated_height: Option<f64>,
    vertical_alignment: VerticalAlignment,
    no_wrap: bool,
    use_descender: bool,
    background: Option<Color>,
    border: Border,
    pub(crate) run_direction: RunDirection,
}

impl Default for PdfPCell {
    fn default() -> Self {
        Self::empty()
    }
}

impl PdfPCell {
    /// A cell without content.
    pub fn empty() -> Self {
        let mut column = ColumnText::new();
        column.set_leading(0.0, 1.0);
        let padding = column.config().default_cell_padding;
        Self {
            column,
            image: None,
            left: 0.0,
            right: 0.0,
            padding: Edges::uniform(padding),
            use_border_padding: false,
            colspan: 1,
            rowspan: 1,
            fixed_height: 0.0,
            min_height: 0.0,
            calculated_height: None,
            vertical_alignment: VerticalAlignment::Top,
            no_wrap: false,
            use_descender: false,
            background: None,
            border: Border::default(),
            run_direction: RunDirection::Default,
        }
    }

    /// A text cell. Its leading follows the largest font of each line.
    pub fn new(phrase: impl Into<Phrase>) -> Self {
        let mut cell = Self::empty();
        cell.column.add_text(phrase);
        cell
    }

    /// An image cell. A fitted image is scaled to the cell width;
    /// otherwise the image sits inline at its natural size.
    pub fn from_image(image: Image, fit: bool) -> Self {
        let mut cell = Self::empty();
        if fit {
            cell.image = Some(image);
            cell.padding = Edges::uniform(cell.border.width / 2.0);
        } else {
            let inline = InlineImage {
                image,
                offset_x: 0.0,
                offset_y: 0.0,
                change_leading: true,
            };
            cell.column.add_text(Chunk::image(inline, Font::helvetica(0.0)));
            cell.padding = Edges::uniform(0.0);
        }
        cell
    }

    /// A cell holding a nested table that spans the whole cell.
    pub fn from_table(mut table: PdfPTable) -> Self {
        let mut cell = Self::empty();
        table.set_width_percentage(100.0);
        table.set_extend_last_row(true, true);
        cell.column.add_element(table);
        cell.padding = Edges::uniform(0.0);
        cell
    }

    /// Append a block element. Nested tables stop splitting late so they
    /// can share the cell height.
    pub fn add_element(&mut self, element: impl Into<Element>) {
        let mut element = element.into();
        if let Element::Table(table) = &mut element {
            table.set_split_late(false);
        }
        self.image = None;
        self.column.add_element(element);
    }

    // ── Builders ────────────────────────────────────────────────

    pub fn with_colspan(mut self, colspan: usize) -> Self {
        self.colspan = colspan;
        self
    }

    pub fn with_rowspan(mut self, rowspan: usize) -> Self {
        self.rowspan = rowspan.max(1);
        self
    }

    pub fn with_padding(mut self, padding: f64) -> Self {
        self.padding = Edges::uniform(padding);
        self
    }

    pub fn with_paddings(mut self, padding: Edges) -> Self {
        self.padding = padding;
        self
    }

    pub fn with_fixed_height(mut self, height: f64) -> Self {
        self.fixed_height = height;
        self
    }

    pub fn with_min_height(mut self, height: f64) -> Self {
        self.min_height = height;
        self
    }

    pub fn with_horizontal_alignment(mut self, alignment: Alignment) -> Self {
        self.column.set_alignment(alignment);
        self
    }

    pub fn with_vertical_alignment(mut self, alignment: VerticalAlignment) -> Self {
        self.vertical_alignment = alignment;
        self
    }

    pub fn with_background(mut self, color: Color) -> Self {
        self.background = Some(color);
        self
    }

    pub fn with_border(mut self, border: Border) -> Self {
        self.border = border;
        self
    }

    pub fn with_no_wrap(mut self, no_wrap: bool) -> Self {
        self.no_wrap = no_wrap;
        self
    }

    pub fn with_use_descender(mut self, use_descender: bool) -> Self {
        self.use_descender = use_descender;
        self
    }

    /// Add half the border width to each padding.
    pub fn with_border_padding(mut self, use_border_padding: bool) -> Self {
        self.use_border_padding = use_border_padding;
        self
    }

    pub fn with_use_ascender(mut self, use_ascender: bool) -> Self {
        self.column.set_use_ascender(use_ascender);
        self
    }

    pub fn with_leading(mut self, fixed: f64, multiplied: f64) -> Self {
        self.column.set_leading(fixed, multiplied);
        self
    }

    pub fn with_run_direction(mut self, direction: RunDirection) -> Self {
        self.run_direction = direction;
        self
    }

    // ── Accessors ───────────────────────────────────────────────

    pub fn colspan(&self) -> usize {
        self.colspan
    }

    pub fn rowspan(&self) -> usize {
        self.rowspan
    }

    pub fn left(&self) -> f64 {
        self.left
    }

    pub fn right(&self) -> f64 {
        self.right
    }

    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    pub fn padding(&self) -> Edges {
        self.padding
    }

    pub fn fixed_height(&self) -> f64 {
        self.fixed_height
    }

    pub fn min_height(&self) -> f64 {
        self.min_height
    }

    pub fn horizontal_alignment(&self) -> Alignment {
        self.column.alignment()
    }

    pub fn vertical_alignment(&self) -> VerticalAlignment {
        self.vertical_alignment
    }

    pub fn run_direction(&self) -> RunDirection {
        self.run_direction
    }

    pub fn column(&self) -> &ColumnText {
        &self.column
    }

    pub fn image(&self) -> Option<&Image> {
        self.image.as_ref()
    }

    /// The cell has neither text, elements nor an image left.
    pub fn is_empty(&self) -> bool {
        self.image.is_none() && self.column.is_empty()
    }

    /// Padding including half the border width when requested.
    pub fn effective_padding(&self) -> Edges {
        if !self.use_border_padding {
            return self.padding;
        }
        let half = self.border.width / 2.0;
        let side = |set: Borders, value: f64| {
            if self.border.sides.contains(set) {
                value + half
            } else {
                value
            }
        };
        Edges {
            top: side(Borders::TOP, self.padding.top),
            right: side(Borders::RIGHT, self.padding.right),
            bottom: side(Borders::BOTTOM, self.padding.bottom),
            left: side(Borders::LEFT, self.padding.left),
        }
    }

    pub(crate) fn set_config(&mut self, config: Arc<LayoutConfig>) {
        self.column.set_config(config);
    }

    // ── Measuring ───────────────────────────────────────────────

    /// Height the content needs at the current width, honoring fixed and
    /// minimum heights. The result is cached for alignment.
    pub fn max_height(&mut self) -> f64 {
        let pad = self.effective_padding();
        let mut height = if let Some(image) = &self.image {
            let available = self.right - self.left - pad.horizontal();
            let scale = if image.width > 0.0 {
                available / image.width
            } else {
                0.0
            };
            image.height * scale + pad.vertical()
        } else {
            let top = 0.0;
            let bottom = if self.fixed_height > 0.0 {
                top + pad.bottom - self.fixed_height
            } else {
                BOTTOM_LIMIT
            };
            let right = if self.no_wrap {
                RIGHT_LIMIT
            } else {
                self.right - pad.right
            };
            let mut column = self.column.clone();
            set_column(&mut column, self.left + pad.left, bottom, right, top - pad.top);
            if let Err(err) = column.simulate() {
                log::warn!("could not measure cell content: {}", err);
            }
            let mut y = column.y_line();
            if self.use_descender {
                y += column.descender();
            }
            top - (y - pad.bottom)
        };

        if height == pad.vertical() {
            height = 0.0;
        }
        self.calculated_height = Some(height);
        if self.fixed_height > 0.0 {
            height = self.fixed_height;
        } else if self.min_height > height {
            height = self.min_height;
        }
        height
    }

    /// Drop the content that fits in `height`, so the cell continues
    /// below it.
    pub fn consume_height(&mut self, height: f64) {
        let pad = self.effective_padding();
        let usable = height - pad.vertical();
        self.column.set_simple_column(
            self.left + pad.left,
            usable + 0.001,
            self.right - pad.right,
            0.0,
        );
        if let Err(err) = self.column.simulate() {
            log::warn!("could not consume cell content: {}", err);
        }
        self.calculated_height = None;
    }

    /// What is left of the cell once `shown` of its height was written.
    /// Fixed and minimum heights shrink by the part already used; an
    /// image is never shown twice.
    pub(crate) fn continuation(&self, shown: f64) -> PdfPCell {
        let mut rest = if self.image.is_some() {
            self.emptied()
        } else {
            let mut rest = self.clone();
            rest.consume_height(shown);
            rest
        };
        rest.fixed_height = (self.fixed_height - shown).max(0.0);
        rest.min_height = (self.min_height - shown).max(0.0);
        rest
    }

    /// Simulate the content into `height`. Returns the part left over for
    /// the next row, or `None` when nothing was placed in `height`.
    pub(crate) fn split(&self, height: f64) -> SplitCell {
        let pad = self.effective_padding();
        if let Some(image) = &self.image {
            let scale = if image.width > 0.0 {
                (self.right - self.left - pad.horizontal()) / image.width
            } else {
                0.0
            };
            if height > pad.vertical() + image.height * scale {
                return SplitCell::Finished;
            }
            return SplitCell::Untouched;
        }

        let top = 0.0;
        let mut column = self.column.clone();
        let right = if self.no_wrap {
            RIGHT_LIMIT
        } else {
            self.right - pad.right
        };
        let start = set_column(
            &mut column,
            self.left + pad.left,
            top + pad.bottom - height + 0.00001,
            right,
            top - pad.top,
        );
        let status = match column.simulate() {
            Ok(status) => status,
            Err(err) => {
                log::warn!("could not split cell content: {}", err);
                return SplitCell::Untouched;
            }
        };
        if column.y_line() == start {
            SplitCell::Untouched
        } else if !status.contains(Status::NO_MORE_TEXT) {
            column.set_filled_width(0.0);
            SplitCell::Rest(Box::new(column))
        } else {
            SplitCell::Finished
        }
    }

    /// A copy continuing with `column` as its content.
    pub(crate) fn with_column(&self, column: ColumnText) -> Self {
        Self {
            column,
            calculated_height: None,
            ..self.clone()
        }
    }

    /// A copy with no content left.
    pub(crate) fn emptied(&self) -> Self {
        let mut column = self.column.clone();
        column.set_text(Phrase::default());
        Self {
            column,
            image: None,
            calculated_height: None,
            ..self.clone()
        }
    }

    // ── Writing ─────────────────────────────────────────────────

    /// Paint one layer of the cell. `x` is the table's left edge, `y` the
    /// top of the row and `height` the height the cell covers.
    pub(crate) fn paint(
        &self,
        layer: Layer,
        sink: &mut dyn ContentSink,
        x: f64,
        y: f64,
        height: f64,
    ) -> Result<()> {
        match layer {
            Layer::Background => {
                if let Some(color) = self.background {
                    sink.fill_rect(
                        Rect::new(x + self.left, y - height, x + self.right, y),
                        color,
                    );
                }
                Ok(())
            }
            Layer::Borders => {
                self.paint_borders(sink, x, y, height);
                Ok(())
            }
            Layer::Content => match &self.image {
                Some(image) => {
                    self.paint_image(image, sink, x, y, height);
                    Ok(())
                }
                None => self.paint_text(sink, x, y, height),
            },
        }
    }

    fn paint_borders(&self, sink: &mut dyn ContentSink, x: f64, y: f64, height: f64) {
        let Border {
            sides,
            width,
            color,
        } = self.border;
        if width <= 0.0 {
            return;
        }
        let (l, r, t, b) = (x + self.left, x + self.right, y, y - height);
        if sides.contains(Borders::TOP) {
            sink.stroke_line((l, t), (r, t), width, color);
        }
        if sides.contains(Borders::BOTTOM) {
            sink.stroke_line((l, b), (r, b), width, color);
        }
        if sides.contains(Borders::LEFT) {
            sink.stroke_line((l, b), (l, t), width, color);
        }
        if sides.contains(Borders::RIGHT) {
            sink.stroke_line((r, b), (r, t), width, color);
        }
    }

    fn paint_image(&self, image: &Image, sink: &mut dyn ContentSink, x: f64, y: f64, height: f64) {
        let pad = self.effective_padding();
        let available_w = (self.width() - pad.horizontal()).max(0.0);
        let available_h = (height - pad.vertical()).max(0.0);
        if image.width <= 0.0 || image.height <= 0.0 {
            return;
        }
        let mut scale = available_w / image.width;
        if image.height * scale > available_h {
            scale = scale.min(available_h / image.height);
        }
        let (w, h) = (image.width * scale, image.height * scale);

        let mut left = x + self.left + pad.left;
        match self.horizontal_alignment() {
            Alignment::Center => left += (available_w - w) / 2.0,
            Alignment::Right => left += available_w - w,
            _ => {}
        }
        let mut top = y - pad.top;
        match self.vertical_alignment {
            VerticalAlignment::Middle => top -= (available_h - h) / 2.0,
            VerticalAlignment::Bottom => top -= available_h - h,
            VerticalAlignment::Top => {}
        }
        sink.draw_image(image, [w, 0.0, 0.0, h, left, top - h]);
    }

    fn paint_text(&self, sink: &mut dyn ContentSink, x: f64, y: f64, height: f64) -> Result<()> {
        let pad = self.effective_padding();
        let content = self.calculated_height.unwrap_or(height);
        let mut tly = y - pad.top;
        if content <= height {
            match self.vertical_alignment {
                VerticalAlignment::Bottom => tly = y - height + content - pad.top,
                VerticalAlignment::Middle => tly = y + (content - height) / 2.0 - pad.top,
                VerticalAlignment::Top => {}
            }
        }
        let mut bry = tly - (height - pad.vertical());
        if self.fixed_height > 0.0 && content > height {
            tly = y;
            bry = y - height;
        }

        let mut left_limit = x + self.left + pad.left;
        let mut right_limit = x + self.right - pad.right;
        if self.no_wrap {
            match self.horizontal_alignment() {
                Alignment::Center => {
                    left_limit -= 10_000.0;
                    right_limit += 10_000.0;
                }
                Alignment::Right => left_limit -= RIGHT_LIMIT,
                _ => right_limit += RIGHT_LIMIT,
            }
        }

        if (tly > bry || self.column.zero_height_element()) && left_limit < right_limit {
            let mut column = self.column.clone();
            column.set_run_direction(self.run_direction);
            column.set_simple_column(left_limit, bry - 0.001, right_limit, tly);
            column.go(sink)?;
        }
        Ok(())
    }
}

/// Outcome of simulating a cell into the head of a split row.
#[derive(Debug)]
pub(crate) enum SplitCell {
    /// Nothing fit; the whole content moves on.
    Untouched,
    /// Part fit; the boxed column holds what is left.
    Rest(Box<ColumnText>),
    /// Everything fit.
    Finished,
}

/// Apply a cell rectangle to `column` with inverted edges clamped, and
/// return the starting write position.
fn set_column(column: &mut ColumnText, left: f64, bottom: f64, right: f64, top: f64) -> f64 {
    let right = right.max(left);
    let top = top.max(bottom);
    column.set_simple_column(left, bottom, right, top);
    top
}
