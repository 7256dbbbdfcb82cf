//! # Table Engine
//!
//! [`PdfPTable`] collects cells into rows, distributes its total width
//! over its columns and measures every row at that width. The composite
//! fitter in [`crate::layout`] asks it for row heights, splits rows that
//! straddle a column bottom, and writes the rows it placed.
//!
//! ```text
//!   add_cell ──▶ current row ──▶ rows ──▶ heights (per row, then rowspan
//!                    ▲   │                  redistribution)
//!       skip rowspan ┘   └─ RTL reversal          │
//!                                                 ▼
//!                         get_rows(start, end) ──▶ write_rows
//! ```
//!
//! Rows keep one slot per column. Colspan and rowspan leave empty slots
//! behind; a rowspan cell lives in the row where it starts and its
//! content is continued, not repeated, when a page break falls inside
//! its span.

mod cell;
mod row;

pub use cell::{Border, Borders, PdfPCell};
pub use row::PdfPRow;
pub(crate) use row::write_rows;

use std::ops::Range;
use std::sync::Arc;

use crate::config::LayoutConfig;
use crate::error::{LayoutError, Result};
use crate::model::{Alignment, Image, Phrase, RunDirection};
use crate::pdf::ContentSink;

use cell::SplitCell;

/// Bottom of a column that never runs out of height.
pub const BOTTOM_LIMIT: f64 = -((1u64 << 30) as f64);
/// Right edge of a cell that never wraps.
pub const RIGHT_LIMIT: f64 = 20_000.0;

/// Rowspan shortfalls below this are left alone.
const HEIGHT_DELTA: f64 = 0.001;

#[derive(Debug, Clone)]
pub struct PdfPTable {
    config: Arc<LayoutConfig>,
    rows: Vec<PdfPRow>,
    current_row: Vec<Option<PdfPCell>>,
    current_col: usize,
    default_cell: PdfPCell,

    // ── Widths ──────────────────────────────────────────────────
    relative_widths: Vec<f64>,
    absolute_widths: Vec<f64>,
    total_width: f64,
    width_percentage: f64,
    locked_width: bool,
    heights_valid: bool,

    // ── Pagination ──────────────────────────────────────────────
    header_rows: usize,
    footer_rows: usize,
    skip_first_header: bool,
    skip_last_footer: bool,
    complete: bool,
    split_rows: bool,
    split_late: bool,
    keep_together: bool,
    /// `[when a page follows, for the final row]`
    extend_last_row: [bool; 2],

    horizontal_alignment: Alignment,
    spacing_before: f64,
    spacing_after: f64,
    run_direction: RunDirection,
}

/// The rows a column places in one go: the repeated header, a body range
/// and the footer.
#[derive(Debug, Clone)]
pub(crate) struct PageSlice {
    pub header: bool,
    pub body: Range<usize>,
    pub footer: bool,
    /// Height added to the last body row.
    pub extend_by: Option<f64>,
    /// Mark the header rows as artifacts.
    pub artifact_headers: bool,
}

impl PdfPTable {
    /// A table with `columns` columns of equal relative width.
    pub fn new(columns: usize) -> Result<Self> {
        if columns == 0 {
            return Err(LayoutError::InvalidColumnCount);
        }
        Ok(Self::build(vec![1.0; columns]))
    }

    /// A table with one column per entry of `relative_widths`.
    pub fn from_widths(relative_widths: &[f64]) -> Result<Self> {
        if relative_widths.is_empty() {
            return Err(LayoutError::EmptyWidths);
        }
        Ok(Self::build(relative_widths.to_vec()))
    }

    fn build(relative_widths: Vec<f64>) -> Self {
        let columns = relative_widths.len();
        let config = Arc::new(LayoutConfig::default());
        Self {
            config,
            rows: Vec::new(),
            current_row: vec![None; columns],
            current_col: 0,
            default_cell: PdfPCell::empty(),
            absolute_widths: vec![0.0; columns],
            relative_widths,
            total_width: 0.0,
            width_percentage: 80.0,
            locked_width: false,
            heights_valid: false,
            header_rows: 0,
            footer_rows: 0,
            skip_first_header: false,
            skip_last_footer: false,
            complete: true,
            split_rows: true,
            split_late: true,
            keep_together: false,
            extend_last_row: [false, false],
            horizontal_alignment: Alignment::Center,
            spacing_before: 0.0,
            spacing_after: 0.0,
            run_direction: RunDirection::Default,
        }
    }

    /// Share a build configuration with every cell of the table.
    pub fn with_config(mut self, config: Arc<LayoutConfig>) -> Self {
        self.default_cell =
            std::mem::take(&mut self.default_cell).with_padding(config.default_cell_padding);
        self.default_cell.set_config(Arc::clone(&config));
        for cell in self
            .rows
            .iter_mut()
            .flat_map(|row| row.cells.iter_mut())
            .chain(self.current_row.iter_mut())
            .flatten()
        {
            cell.set_config(Arc::clone(&config));
        }
        self.config = config;
        self.heights_valid = false;
        self
    }

    pub fn number_of_columns(&self) -> usize {
        self.relative_widths.len()
    }

    pub fn size(&self) -> usize {
        self.rows.len()
    }

    pub fn rows(&self) -> &[PdfPRow] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&PdfPRow> {
        self.rows.get(index)
    }

    /// Template for cells added through [`add_phrase`](Self::add_phrase).
    pub fn default_cell_mut(&mut self) -> &mut PdfPCell {
        &mut self.default_cell
    }

    // ── Widths ──────────────────────────────────────────────────

    /// Set the relative column widths.
    pub fn set_widths(&mut self, relative_widths: &[f64]) -> Result<()> {
        self.check_column_count(relative_widths.len())?;
        self.relative_widths = relative_widths.to_vec();
        self.calculate_widths();
        Ok(())
    }

    /// Set absolute column widths; the total width becomes their sum.
    pub fn set_total_widths(&mut self, widths: &[f64]) -> Result<()> {
        self.check_column_count(widths.len())?;
        self.relative_widths = widths.to_vec();
        self.total_width = widths.iter().sum();
        self.calculate_widths();
        Ok(())
    }

    pub fn set_total_width(&mut self, width: f64) {
        if self.total_width == width {
            return;
        }
        self.total_width = width;
        self.calculate_widths();
    }

    pub fn total_width(&self) -> f64 {
        self.total_width
    }

    pub fn absolute_widths(&self) -> &[f64] {
        &self.absolute_widths
    }

    /// Keep `total_width` instead of deriving it from the column width.
    pub fn set_locked_width(&mut self, locked: bool) {
        self.locked_width = locked;
    }

    pub fn is_locked_width(&self) -> bool {
        self.locked_width
    }

    pub fn set_width_percentage(&mut self, percentage: f64) {
        self.width_percentage = percentage;
    }

    pub fn width_percentage(&self) -> f64 {
        self.width_percentage
    }

    fn check_column_count(&self, found: usize) -> Result<()> {
        let expected = self.number_of_columns();
        if found != expected {
            return Err(LayoutError::WrongNumberOfColumns { expected, found });
        }
        Ok(())
    }

    fn calculate_widths(&mut self) {
        if self.total_width <= 0.0 {
            return;
        }
        let sum: f64 = self.relative_widths.iter().sum();
        self.absolute_widths = self
            .relative_widths
            .iter()
            .map(|w| if sum > 0.0 { self.total_width * w / sum } else { 0.0 })
            .collect();
        self.heights_valid = false;
    }

    // ── Adding cells ────────────────────────────────────────────

    /// Add a cell at the next free slot, completing the row when it is
    /// full. Slots covered by a rowspan from above are skipped.
    pub fn add_cell(&mut self, cell: PdfPCell) {
        self.place_cell(cell);
    }

    /// Add a cell styled like the default cell.
    pub fn add_phrase(&mut self, phrase: impl Into<Phrase>) {
        let mut cell = self.default_cell.emptied();
        cell.column.add_text(phrase);
        self.place_cell(cell);
    }

    /// Add a nested table as a cell of its own. The table is moved in,
    /// so a table can only ever hold copies of itself:
    ///
    /// ```compile_fail
    /// let mut table = pageflow::PdfPTable::new(1).unwrap();
    /// table.add_table(table);
    /// ```
    pub fn add_table(&mut self, table: PdfPTable) {
        self.place_cell(PdfPCell::from_table(table));
    }

    pub fn add_image(&mut self, image: Image) {
        self.place_cell(PdfPCell::from_image(image, true));
    }

    /// Fill the open row with empty default cells.
    pub fn complete_row(&mut self) {
        while self.current_row.iter().any(Option::is_some) {
            let filler = self.default_cell.emptied();
            self.place_cell(filler);
        }
    }

    fn place_cell(&mut self, mut cell: PdfPCell) {
        let columns = self.number_of_columns();
        cell.set_config(Arc::clone(&self.config));
        cell.run_direction = cell.run_direction.or(self.run_direction);

        self.skip_cols_with_rowspan_above();
        if self.current_col >= columns {
            self.push_current_row();
            self.skip_cols_with_rowspan_above();
        }
        cell.colspan = cell.colspan.clamp(1, columns - self.current_col.min(columns - 1));
        let colspan = cell.colspan;
        self.current_row[self.current_col] = Some(cell);
        self.current_col += colspan;

        self.skip_cols_with_rowspan_above();
        while self.current_col >= columns {
            self.push_current_row();
            self.skip_cols_with_rowspan_above();
        }
    }

    fn skip_cols_with_rowspan_above(&mut self) {
        let row = self.rows.len();
        while self.current_col < self.number_of_columns()
            && self.span_origin(row, self.current_col).is_some()
        {
            self.current_col += 1;
        }
    }

    fn push_current_row(&mut self) {
        let columns = self.number_of_columns();
        let mut cells = std::mem::replace(&mut self.current_row, vec![None; columns]);
        if self.run_direction == RunDirection::Rtl {
            cells = reverse_row(cells);
        }
        let mut row = PdfPRow::new(cells);
        if self.total_width > 0.0 {
            row.set_widths(&self.absolute_widths);
        }
        self.rows.push(row);
        self.current_col = 0;
        self.heights_valid = false;
    }

    /// Row and column of the rowspan cell from an earlier row covering
    /// `(row, column)`.
    fn span_origin(&self, row: usize, column: usize) -> Option<(usize, usize)> {
        for r in (0..row.min(self.rows.len())).rev() {
            if let Some((c, cell)) = covering_cell(&self.rows[r].cells, column) {
                return (r + cell.rowspan > row).then_some((r, c));
            }
        }
        None
    }

    /// The slot is covered by a cell that starts in a row above.
    pub fn row_span_above(&self, row: usize, column: usize) -> bool {
        column < self.number_of_columns() && self.span_origin(row, column).is_some()
    }

    /// The cell covering `(row, column)`, wherever it starts.
    pub fn cell_at(&self, row: usize, column: usize) -> Option<&PdfPCell> {
        let cells = &self.rows.get(row)?.cells;
        if let Some((_, cell)) = covering_cell(cells, column) {
            return Some(cell);
        }
        let (r, c) = self.span_origin(row, column)?;
        self.rows[r].cell(c)
    }

    // ── Removing rows ───────────────────────────────────────────

    pub fn delete_row(&mut self, index: usize) -> bool {
        if index >= self.rows.len() {
            return false;
        }
        self.rows.remove(index);
        if index < self.header_rows {
            self.header_rows -= 1;
            if index >= self.header_rows.saturating_sub(self.footer_rows) {
                self.footer_rows = self.footer_rows.saturating_sub(1);
            }
        }
        true
    }

    pub fn delete_last_row(&mut self) -> bool {
        match self.rows.len() {
            0 => false,
            n => self.delete_row(n - 1),
        }
    }

    /// Remove every row except the headers.
    pub fn delete_body_rows(&mut self) {
        self.rows.truncate(self.header_rows);
    }

    /// Drop the rows written so far; the next page starts with the header
    /// but the very first header is not repeated.
    pub fn flush_content(&mut self) {
        self.delete_body_rows();
        self.skip_first_header = true;
    }

    // ── Heights ─────────────────────────────────────────────────

    fn ensure_heights(&mut self) {
        if self.heights_valid || self.total_width <= 0.0 {
            return;
        }
        for row in &mut self.rows {
            row.set_widths(&self.absolute_widths);
            row.calculate_height();
        }
        self.redistribute_rowspan_heights();
        self.heights_valid = true;
        log::trace!(
            "measured {} rows at width {:.2}",
            self.rows.len(),
            self.total_width
        );
    }

    fn redistribute_rowspan_heights(&mut self) {
        for i in 0..self.rows.len() {
            for k in 0..self.rows[i].cells.len() {
                if matches!(&self.rows[i].cells[k], Some(cell) if cell.rowspan > 1) {
                    self.fit_span(i, k);
                }
            }
        }
    }

    /// Grow the rows under the cell starting at `(row, column)` until the
    /// cell fits, raising the shortest rows first.
    fn fit_span(&mut self, row: usize, column: usize) {
        let (rowspan, needed) = match self.rows[row].cells.get_mut(column) {
            Some(Some(cell)) => (cell.rowspan.max(1), cell.max_height()),
            _ => return,
        };
        let end = (row + rowspan).min(self.rows.len());
        let current: f64 = self.rows[row..end].iter().map(|r| r.max_height).sum();
        let mut shortfall = needed - current;
        if shortfall <= HEIGHT_DELTA {
            return;
        }

        let mut order: Vec<usize> = (row..end).collect();
        order.sort_by(|a, b| self.rows[*a].max_height.total_cmp(&self.rows[*b].max_height));
        for n in 0..order.len() {
            let level = self.rows[order[n]].max_height;
            let next = order
                .get(n + 1)
                .map_or(f64::INFINITY, |&r| self.rows[r].max_height);
            let add = (shortfall / (n + 1) as f64).min(next - level);
            for &r in &order[..=n] {
                self.rows[r].max_height += add;
            }
            shortfall -= add * (n + 1) as f64;
            if shortfall <= HEIGHT_DELTA {
                break;
            }
        }
        log::trace!(
            "rows {}..{} grown to fit the cell at column {}",
            row,
            end,
            column
        );
    }

    /// Cut every body rowspan that crosses the top of row `start`. The
    /// upper part keeps the rows it already covered and the content shown
    /// in them; the rest of the content moves into row `start`, whose
    /// rows grow until it fits. Calling it twice for the same row changes
    /// nothing.
    pub(crate) fn break_spans_at(&mut self, start: usize) {
        self.ensure_heights();
        if start >= self.rows.len() {
            return;
        }
        for column in 0..self.number_of_columns() {
            if !matches!(self.rows[start].cells.get(column), Some(None)) {
                continue;
            }
            let Some((origin, origin_col)) = self.span_origin(start, column) else {
                continue;
            };
            if origin_col != column || origin < self.header_rows {
                continue;
            }
            let shown: f64 = self.rows[origin..start].iter().map(|r| r.max_height).sum();
            let Some(cell) = self.rows[origin].cells[column].as_mut() else {
                continue;
            };
            let mut rest = cell.continuation(shown);
            rest.rowspan = cell.rowspan - (start - origin);
            cell.rowspan = start - origin;
            cell.fixed_height = shown;
            cell.calculated_height = Some(shown);
            self.rows[start].cells[column] = Some(rest);
            self.fit_span(start, column);
            log::debug!(
                "rowspan from row {} continues in row {}, column {}",
                origin,
                start,
                column
            );
        }
    }

    /// Sum of all row heights. Zero until a total width is set.
    pub fn total_height(&mut self) -> f64 {
        self.ensure_heights();
        self.rows.iter().map(|r| r.max_height).sum()
    }

    pub fn row_height(&mut self, index: usize) -> f64 {
        self.ensure_heights();
        self.rows.get(index).map_or(0.0, |r| r.max_height)
    }

    /// Height of all header rows, footer rows included.
    pub fn header_height(&mut self) -> f64 {
        self.ensure_heights();
        let end = self.header_rows.min(self.rows.len());
        self.rows[..end].iter().map(|r| r.max_height).sum()
    }

    /// Height of the footer, the last `footer_rows` of the header rows.
    pub fn footer_height(&mut self) -> f64 {
        self.ensure_heights();
        let end = self.header_rows.min(self.rows.len());
        let start = end.saturating_sub(self.footer_rows.min(self.header_rows));
        self.rows[start..end].iter().map(|r| r.max_height).sum()
    }

    // ── Row ranges ──────────────────────────────────────────────

    /// Copies of rows `start..end`, ready to be written on their own.
    ///
    /// Rowspan cells only cover rows inside the range, and a cell that
    /// spans into `start` from above continues in the first row with the
    /// content it already showed consumed.
    pub fn get_rows(&mut self, start: usize, end: usize) -> Vec<PdfPRow> {
        self.ensure_heights();
        let end = end.min(self.rows.len());
        if start >= end {
            return Vec::new();
        }
        let mut rows: Vec<PdfPRow> = (start..end).map(|i| self.adjusted_row(i, end)).collect();

        for column in 0..self.number_of_columns() {
            if !matches!(rows[0].cells.get(column), Some(None)) {
                continue;
            }
            let Some((origin, origin_col)) = self.span_origin(start, column) else {
                continue;
            };
            if origin_col != column {
                continue;
            }
            let Some(cell) = self.rows[origin].cell(column) else {
                continue;
            };
            let shown: f64 = self.rows[origin..start].iter().map(|r| r.max_height).sum();
            let mut carried = cell.continuation(shown);
            carried.rowspan = cell.rowspan - (start - origin);
            let stop = (start + carried.rowspan).min(end);
            let extra: f64 = self.rows[start + 1..stop].iter().map(|r| r.max_height).sum();
            rows[0].cells[column] = Some(carried);
            rows[0].set_extra_height(column, extra);
        }
        rows
    }

    fn adjusted_row(&self, index: usize, end: usize) -> PdfPRow {
        let mut row = self.rows[index].clone();
        row.reset_extra_heights();
        for (k, slot) in self.rows[index].cells.iter().enumerate() {
            if let Some(cell) = slot {
                if cell.rowspan > 1 {
                    let stop = (index + cell.rowspan).min(end);
                    let extra = self.rows[index + 1..stop].iter().map(|r| r.max_height).sum();
                    row.set_extra_height(k, extra);
                }
            }
        }
        row
    }

    /// Rows placed on one column by the composite fitter, with the number
    /// of leading rows to mark as artifacts.
    pub(crate) fn compose_page(&mut self, slice: &PageSlice) -> (Vec<PdfPRow>, usize) {
        let footer_rows = self.footer_rows.min(self.header_rows);
        let real_header = self.header_rows - footer_rows;
        let mut rows = Vec::new();
        if slice.header && real_header > 0 {
            rows.extend(self.get_rows(0, real_header));
        }
        let header_count = rows.len();

        let mut body = self.get_rows(slice.body.start, slice.body.end);
        if let (Some(extra), Some(last)) = (slice.extend_by, body.last_mut()) {
            last.max_height += extra;
        }
        rows.extend(body);

        if slice.footer && footer_rows > 0 {
            rows.extend(self.get_rows(real_header, self.header_rows));
        }
        let artifacts = if slice.artifact_headers { header_count } else { 0 };
        (rows, artifacts)
    }

    /// Split row `index` so that its head is `height` high, inserting the
    /// rest as a new row right after it. Returns `false`, leaving the
    /// table untouched, when no cell has anything to show in `height`.
    pub fn split_row(&mut self, index: usize, height: f64) -> bool {
        self.ensure_heights();
        let Some(row) = self.rows.get(index) else {
            return false;
        };
        let mut rest_cells: Vec<Option<PdfPCell>> = vec![None; row.cells.len()];
        let mut truncated: Vec<(usize, usize, usize)> = Vec::new();
        let mut all_empty = true;

        for (k, slot) in row.cells.iter().enumerate() {
            match slot {
                None => {
                    let Some((origin, origin_col)) = self.span_origin(index, k) else {
                        continue;
                    };
                    if origin_col != k {
                        continue;
                    }
                    let Some(cell) = self.rows[origin].cell(k) else {
                        continue;
                    };
                    let above: f64 = self.rows[origin..index].iter().map(|r| r.max_height).sum();
                    let mut rest = cell.continuation(height + above);
                    rest.rowspan = cell.rowspan - (index - origin);
                    rest_cells[k] = Some(rest);
                    truncated.push((origin, k, index - origin + 1));
                    all_empty = false;
                }
                Some(cell) => {
                    let rest = match cell.split(height) {
                        SplitCell::Untouched => cell.with_column(cell.column.clone()),
                        SplitCell::Rest(column) => {
                            all_empty = false;
                            cell.with_column(*column)
                        }
                        SplitCell::Finished => {
                            all_empty = false;
                            cell.emptied()
                        }
                    };
                    rest_cells[k] = Some(rest);
                }
            }
        }

        if all_empty {
            log::debug!("row {} has nothing to show in {:.2}", index, height);
            return false;
        }

        for (origin, k, span) in truncated {
            if let Some(cell) = self.rows[origin].cells[k].as_mut() {
                cell.rowspan = span;
            }
        }
        let head = &mut self.rows[index];
        for cell in head.cells.iter_mut().flatten() {
            cell.fixed_height = height;
            cell.calculated_height = Some(height);
            cell.rowspan = 1;
        }
        head.set_max_height(height);

        let mut rest = PdfPRow::new(rest_cells);
        rest.set_widths(&self.absolute_widths);
        rest.calculate_height();
        self.rows.insert(index + 1, rest);
        for k in 0..self.number_of_columns() {
            if matches!(&self.rows[index + 1].cells[k], Some(cell) if cell.rowspan > 1) {
                self.fit_span(index + 1, k);
            }
        }
        log::debug!("split row {} at {:.2}", index, height);
        true
    }

    // ── Writing ─────────────────────────────────────────────────

    /// Write rows `row_start..row_end` with the table's top-left corner at
    /// `(x, y)`. Returns the y below the last row written.
    pub fn write_selected_rows(
        &mut self,
        row_start: usize,
        row_end: Option<usize>,
        x: f64,
        y: f64,
        sink: &mut dyn ContentSink,
    ) -> Result<f64> {
        if self.total_width <= 0.0 {
            return Err(LayoutError::ZeroTableWidth);
        }
        let end = row_end.unwrap_or(self.rows.len()).min(self.rows.len());
        let rows = self.get_rows(row_start, end);
        write_rows(&rows, 0, x, y, sink)
    }

    // ── Settings ────────────────────────────────────────────────

    pub fn header_rows(&self) -> usize {
        self.header_rows
    }

    /// The first `rows` rows repeat at the top of every column.
    pub fn set_header_rows(&mut self, rows: usize) {
        self.header_rows = rows;
    }

    pub fn footer_rows(&self) -> usize {
        self.footer_rows
    }

    /// The last `rows` header rows are written at the bottom instead.
    pub fn set_footer_rows(&mut self, rows: usize) {
        self.footer_rows = rows;
    }

    pub fn skip_first_header(&self) -> bool {
        self.skip_first_header
    }

    pub fn set_skip_first_header(&mut self, skip: bool) {
        self.skip_first_header = skip;
    }

    pub fn skip_last_footer(&self) -> bool {
        self.skip_last_footer
    }

    pub fn set_skip_last_footer(&mut self, skip: bool) {
        self.skip_last_footer = skip;
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// An incomplete table is still being filled and keeps its footer
    /// space reserved.
    pub fn set_complete(&mut self, complete: bool) {
        self.complete = complete;
    }

    pub fn split_rows(&self) -> bool {
        self.split_rows
    }

    pub fn set_split_rows(&mut self, split: bool) {
        self.split_rows = split;
    }

    pub fn split_late(&self) -> bool {
        self.split_late
    }

    pub fn set_split_late(&mut self, late: bool) {
        self.split_late = late;
    }

    pub fn keep_together(&self) -> bool {
        self.keep_together
    }

    pub fn set_keep_together(&mut self, keep: bool) {
        self.keep_together = keep;
    }

    pub fn is_extend_last_row(&self, new_page_follows: bool) -> bool {
        if new_page_follows {
            self.extend_last_row[0]
        } else {
            self.extend_last_row[1]
        }
    }

    /// Stretch the last row on a column to the column bottom, separately
    /// for columns the table continues from and for its final row.
    pub fn set_extend_last_row(&mut self, when_continued: bool, final_row: bool) {
        self.extend_last_row = [when_continued, final_row];
    }

    pub fn horizontal_alignment(&self) -> Alignment {
        self.horizontal_alignment
    }

    pub fn set_horizontal_alignment(&mut self, alignment: Alignment) {
        self.horizontal_alignment = alignment;
    }

    pub fn spacing_before(&self) -> f64 {
        self.spacing_before
    }

    pub fn set_spacing_before(&mut self, spacing: f64) {
        self.spacing_before = spacing;
    }

    pub fn spacing_after(&self) -> f64 {
        self.spacing_after
    }

    pub fn set_spacing_after(&mut self, spacing: f64) {
        self.spacing_after = spacing;
    }

    pub fn run_direction(&self) -> RunDirection {
        self.run_direction
    }

    pub fn set_run_direction(&mut self, direction: RunDirection) {
        self.run_direction = direction;
    }
}

/// A block image as a one-cell table at the image's own width, or at a
/// percentage of the column.
impl From<Image> for PdfPTable {
    fn from(image: Image) -> Self {
        let mut table = Self::build(vec![1.0]);
        if image.width_percentage > 0.0 {
            table.width_percentage = image.width_percentage;
        } else {
            table.locked_width = true;
            table.set_total_width(image.width);
        }
        table.horizontal_alignment = image.alignment;
        table.spacing_before = image.spacing_before;
        table.spacing_after = image.spacing_after;
        let cell = PdfPCell::from_image(image, true)
            .with_padding(0.0)
            .with_border(Border {
                sides: Borders::empty(),
                width: 0.0,
                ..Border::default()
            });
        table.place_cell(cell);
        table
    }
}

/// The cell in `cells` that starts at or left of `column` and spans it.
fn covering_cell(cells: &[Option<PdfPCell>], column: usize) -> Option<(usize, &PdfPCell)> {
    let last = column.min(cells.len().checked_sub(1)?);
    for c in (0..=last).rev() {
        if let Some(cell) = &cells[c] {
            return (c + cell.colspan.max(1) > column).then_some((c, cell));
        }
    }
    None
}

/// Mirror a row for right-to-left tables, keeping colspans intact.
fn reverse_row(mut cells: Vec<Option<PdfPCell>>) -> Vec<Option<PdfPCell>> {
    let len = cells.len();
    let mut reversed = vec![None; len];
    let mut rev = len;
    let mut k = 0;
    while k < len && rev > 0 {
        let span = cells[k].as_ref().map_or(1, |c| c.colspan.max(1)).min(rev);
        rev -= span;
        reversed[rev] = cells[k].take();
        k += span;
    }
    reversed
}
