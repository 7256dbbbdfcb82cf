//! # Composite Mode
//!
//! A composite column holds a queue of block elements and places the
//! front one until it is exhausted or the column is:
//!
//! ```text
//!   Paragraph / list item ──▶ nested ColumnText sharing the rectangle
//!   Table                 ──▶ row heights from the table engine, rows
//!                             split or moved by the row-break policy
//!   Marker                ──▶ drawn at the cursor, takes no height
//! ```
//!
//! The nested column of a paragraph survives a column break, so the next
//! `go` continues where the last one stopped. Tables keep their progress
//! as the index of the next body row.

use std::sync::Arc;

use crate::error::{LayoutError, Result};
use crate::model::{Alignment, Element, ListItemSlot, Paragraph};
use crate::pdf::{reborrow, ContentSink};
use crate::table::{write_rows, PageSlice, PdfPTable, BOTTOM_LIMIT};

use super::column::{Boundary, ColumnText};
use super::page_break::{decide_row_break, RowBreakDecision, RowBreakInput};
use super::Status;

/// Marks a table whose header and footer did not fit on a fresh column.
const HEADER_REFUSED: usize = usize::MAX;

/// Vertical settings of the paragraph-like block at the queue front.
#[derive(Debug, Clone, Copy)]
struct Block {
    list_item: bool,
    keep_together: bool,
    spacing_before: f64,
    spacing_after: f64,
}

impl Block {
    fn of(paragraph: &Paragraph, list_item: bool) -> Self {
        Self {
            list_item,
            keep_together: paragraph.keep_together,
            spacing_before: paragraph.spacing_before,
            spacing_after: paragraph.spacing_after,
        }
    }
}

enum Front {
    Empty,
    /// With a fresh nested column when none is in progress.
    Block(Block, Option<ColumnText>),
    ListDone,
    Table,
    Marker,
}

enum TablePlacement {
    Finished,
    Dropped,
    /// A row was dropped; try the table again on the same column.
    Retry,
    ColumnFull,
}

impl ColumnText {
    pub(super) fn go_composite(
        &mut self,
        mut sink: Option<&mut dyn ContentSink>,
        simulate: bool,
    ) -> Result<Status> {
        let (left_x, right_x) = match self.boundary {
            Boundary::Rect { left_x, right_x } => (left_x, right_x),
            _ => return Err(LayoutError::IrregularComposite),
        };
        self.lines_written = 0;
        self.descender = 0.0;
        let mut first_pass = true;

        loop {
            let front = match self.elements.front() {
                None => Front::Empty,
                Some(Element::Paragraph(para)) => Front::Block(
                    Block::of(para, false),
                    self.composite_column.is_none().then(|| self.nested_for(para)),
                ),
                Some(Element::List(list)) => match list.item_at(self.list_idx) {
                    None => Front::ListDone,
                    Some(slot) => Front::Block(
                        Block::of(&slot.item.paragraph, true),
                        self.composite_column
                            .is_none()
                            .then(|| self.nested_for_item(&slot)),
                    ),
                },
                Some(Element::Table(_)) => Front::Table,
                Some(Element::Marker(_)) => Front::Marker,
            };

            match front {
                Front::Empty => return Ok(Status::NO_MORE_TEXT),
                Front::Block(block, fresh) => {
                    if let Some(status) = self.go_block(
                        block,
                        fresh,
                        reborrow(&mut sink),
                        simulate,
                        (left_x, right_x),
                        &mut first_pass,
                    )? {
                        return Ok(status);
                    }
                }
                Front::ListDone => {
                    self.list_idx = 0;
                    self.elements.pop_front();
                }
                Front::Table => {
                    let Some(Element::Table(mut table)) = self.elements.pop_front()
                    else {
                        continue;
                    };
                    let placed = self.place_table(
                        &mut table,
                        reborrow(&mut sink),
                        simulate,
                        (left_x, right_x),
                        first_pass,
                    );
                    match placed {
                        Ok(TablePlacement::Finished) | Ok(TablePlacement::Dropped) => {
                            first_pass = false;
                        }
                        Ok(TablePlacement::Retry) => {
                            self.elements.push_front(Element::Table(table));
                        }
                        Ok(TablePlacement::ColumnFull) => {
                            self.elements.push_front(Element::Table(table));
                            return Ok(Status::NO_MORE_COLUMN);
                        }
                        Err(err) => {
                            self.elements.push_front(Element::Table(table));
                            return Err(err);
                        }
                    }
                }
                Front::Marker => {
                    if let Some(Element::Marker(marker)) = self.elements.pop_front() {
                        if !simulate {
                            if let Some(s) = reborrow(&mut sink) {
                                marker.draw(s, left_x, self.min_y, right_x, self.max_y, self.y_line);
                            }
                        }
                    }
                }
            }
        }
    }

    /// A nested column for `para`, inheriting what the paragraph leaves
    /// open from this column.
    fn nested_for(&self, para: &Paragraph) -> ColumnText {
        let mut column = ColumnText::with_config(Arc::clone(&self.config));
        column.alignment = para.alignment;
        column.indent = para.indentation_left + para.first_line_indent;
        column.following_indent = para.indentation_left;
        column.right_indent = para.indentation_right;
        column.extra_paragraph_space = para.extra_paragraph_space;
        column.set_leading(
            para.fixed_leading(self.config.default_leading),
            para.multiplied_leading,
        );
        column.run_direction = para.run_direction.or(self.run_direction);
        column.space_char_ratio = self.space_char_ratio;
        column.add_text(para.phrase.clone());
        column
    }

    fn nested_for_item(&self, slot: &ListItemSlot<'_>) -> ColumnText {
        let para = &slot.item.paragraph;
        let mut column = self.nested_for(para);
        column.indent = para.indentation_left + slot.indentation_left + para.first_line_indent;
        column.following_indent = column.indent;
        column.right_indent = para.indentation_right + slot.indentation_right;
        column.list_symbol = slot
            .item
            .symbol
            .clone()
            .map(|symbol| (symbol, para.indentation_left + para.first_line_indent));
        column
    }

    /// Place the paragraph or list item at the front. Returns the status
    /// to hand back when the column is full.
    #[allow(clippy::too_many_arguments)]
    fn go_block(
        &mut self,
        block: Block,
        fresh: Option<ColumnText>,
        mut sink: Option<&mut dyn ContentSink>,
        simulate: bool,
        (left_x, right_x): (f64, f64),
        first_pass: &mut bool,
    ) -> Result<Option<Status>> {
        let adjust = *first_pass && self.adjust_first_line;
        let keep_candidate = block.keep_together && fresh.is_some() && !adjust;
        let mut status = Status::empty();

        for keep in 0..2 {
            let last_y = self.y_line;
            if self.composite_column.is_none() {
                let Some(column) = fresh.clone() else {
                    break;
                };
                self.composite_column = Some(Box::new(column));
                if !adjust {
                    self.y_line -= block.spacing_before;
                }
            }
            let dry_run = simulate || (keep_candidate && keep == 0);
            let use_ascender = adjust && self.use_ascender;
            let (min_y, max_y, y_line) = (self.min_y, self.max_y, self.y_line);
            let Some(column) = self.composite_column.as_mut() else {
                break;
            };
            column.use_ascender = use_ascender;
            column.boundary = Boundary::Rect { left_x, right_x };
            column.min_y = min_y;
            column.max_y = max_y;
            column.y_line = y_line;
            status = if dry_run {
                column.simulate()?
            } else {
                column.go_with(reborrow(&mut sink), false)?
            };
            let filled = column.filled_width;
            self.update_filled_width(filled);

            if !status.contains(Status::NO_MORE_TEXT) && keep_candidate {
                log::debug!("keep-together block moves to the next column");
                self.composite_column = None;
                self.y_line = last_y;
                return Ok(Some(Status::NO_MORE_COLUMN));
            }
            if simulate || !keep_candidate {
                break;
            }
            if keep == 0 {
                self.composite_column = None;
                self.y_line = last_y;
            }
        }

        *first_pass = false;
        let Some(column) = self.composite_column.as_ref() else {
            return Ok(None);
        };
        if column.lines_written > 0 {
            self.y_line = column.y_line;
            self.lines_written += column.lines_written;
            self.descender = column.descender;
        }
        self.current_leading = column.current_leading;

        if status.contains(Status::NO_MORE_TEXT) {
            self.composite_column = None;
            if block.list_item {
                self.list_idx += 1;
            } else {
                self.elements.pop_front();
            }
            self.y_line -= block.spacing_after;
        }
        if status.contains(Status::NO_MORE_COLUMN) {
            return Ok(Some(Status::NO_MORE_COLUMN));
        }
        Ok(None)
    }

    // ── Tables ──────────────────────────────────────────────────

    /// Place as many rows of `table` as fit, starting at the row kept in
    /// `list_idx`.
    fn place_table(
        &mut self,
        table: &mut PdfPTable,
        mut sink: Option<&mut dyn ContentSink>,
        simulate: bool,
        (left_x, right_x): (f64, f64),
        first_pass: bool,
    ) -> Result<TablePlacement> {
        let header_rows = table.header_rows();
        if table.size() <= header_rows {
            log::debug!("dropping a table without body rows");
            self.list_idx = 0;
            return Ok(TablePlacement::Dropped);
        }

        let mut y_temp = self.y_line;
        if self.list_idx == 0 && !(first_pass && self.adjust_first_line) {
            y_temp -= table.spacing_before();
        }
        if y_temp < self.min_y || y_temp > self.max_y {
            return Ok(TablePlacement::ColumnFull);
        }
        let fresh = first_pass && (self.max_y - self.y_line).abs() < 0.001;

        let column_width = right_x - left_x;
        let table_width = if table.is_locked_width() {
            table.total_width()
        } else {
            let width = column_width * table.width_percentage() / 100.0;
            table.set_total_width(width);
            width
        };
        self.update_filled_width(table_width);
        self.current_leading = 0.0;

        let footer_rows = table.footer_rows().min(header_rows);
        let skip_header = table.skip_first_header() && self.list_idx <= header_rows;
        if self.list_idx < header_rows {
            self.list_idx = header_rows;
        }
        let start = self.list_idx;
        if start > header_rows {
            table.break_spans_at(start);
        }
        let footer_height = table.footer_height();
        let header_height = table.header_height() - footer_height;

        let mut y_rows = y_temp;
        if !skip_header {
            y_rows -= header_height;
        }
        let body_height: f64 = (start..table.size()).map(|k| table.row_height(k)).sum();
        let rest_fits = y_rows - body_height >= self.min_y;
        let reserve_footer = footer_rows > 0
            && !(table.is_complete() && table.skip_last_footer() && rest_fits);
        if reserve_footer {
            y_rows -= footer_height;
        }
        if y_rows < self.min_y {
            return Ok(self.refuse_headers(fresh));
        }

        let mut k = start;
        while k < table.size() {
            let height = table.row_height(k);
            if y_rows - height < self.min_y {
                break;
            }
            y_rows -= height;
            k += 1;
        }

        if k < table.size() {
            let decision = decide_row_break(RowBreakInput {
                split_rows: table.split_rows(),
                split_late: table.split_late(),
                first_row: k == start,
                fresh_column: fresh,
                keep_together: table.keep_together() && start == header_rows,
            });
            log::trace!("row {} overflows the column: {:?}", k, decision);
            match decision {
                RowBreakDecision::SplitRow => {
                    if table.split_row(k, y_rows - self.min_y) {
                        y_rows = self.min_y;
                        k += 1;
                    } else if k == start {
                        return Ok(self.refuse_row(table, k, fresh));
                    }
                }
                RowBreakDecision::Refuse => return Ok(self.refuse_row(table, k, fresh)),
                RowBreakDecision::ExhaustColumn => return Ok(TablePlacement::ColumnFull),
                RowBreakDecision::PlaceFitting => {}
            }
        }

        let finished = k >= table.size();
        let footer_written = footer_rows > 0
            && (!finished || (table.is_complete() && !table.skip_last_footer()));
        let footer_back = if reserve_footer && !footer_written {
            footer_height
        } else {
            0.0
        };
        let extend = table.is_extend_last_row(!finished) && self.min_y > BOTTOM_LIMIT;

        if !simulate {
            let x = match table.horizontal_alignment() {
                Alignment::Left => left_x,
                Alignment::Right => right_x - table_width,
                _ => left_x + (column_width - table_width) / 2.0,
            };
            let slice = PageSlice {
                header: !skip_header,
                body: start..k,
                footer: footer_written,
                extend_by: extend.then_some(y_rows - self.min_y + footer_back),
                artifact_headers: start > header_rows,
            };
            let (rows, artifacts) = table.compose_page(&slice);
            if let Some(s) = reborrow(&mut sink) {
                write_rows(&rows, artifacts, x, y_temp, s)?;
            }
        }

        self.y_line = if extend {
            self.min_y
        } else {
            y_rows + footer_back
        };
        self.descender = 0.0;
        self.refused_row = None;
        log::debug!(
            "table rows {}..{} placed, y = {:.2}",
            start,
            k,
            self.y_line
        );

        if finished {
            self.y_line -= table.spacing_after();
            self.list_idx = 0;
            Ok(TablePlacement::Finished)
        } else {
            self.list_idx = k;
            Ok(TablePlacement::ColumnFull)
        }
    }

    /// A row that fits nowhere gets one more chance on the next fresh
    /// column, then it is dropped.
    fn refuse_row(&mut self, table: &mut PdfPTable, row: usize, fresh: bool) -> TablePlacement {
        if !fresh {
            return TablePlacement::ColumnFull;
        }
        if self.refused_row == Some(row) {
            log::warn!(
                "table row {} does not fit on an empty column, dropping it",
                row
            );
            table.delete_row(row);
            self.refused_row = None;
            return TablePlacement::Retry;
        }
        self.refused_row = Some(row);
        TablePlacement::ColumnFull
    }

    fn refuse_headers(&mut self, fresh: bool) -> TablePlacement {
        if !fresh {
            return TablePlacement::ColumnFull;
        }
        if self.refused_row == Some(HEADER_REFUSED) {
            log::warn!("table header and footer do not fit on an empty column, dropping the table");
            self.refused_row = None;
            self.list_idx = 0;
            return TablePlacement::Dropped;
        }
        self.refused_row = Some(HEADER_REFUSED);
        TablePlacement::ColumnFull
    }
}
