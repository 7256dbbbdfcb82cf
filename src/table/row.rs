//! Table rows.
//!
//! A row has one slot per table column. A slot is empty when it is
//! covered by a cell to its left (colspan) or by a cell from a row above
//! (rowspan). Rowspan cells live in the row where they start; the extra
//! height they cover below that row is kept per slot.

use crate::error::Result;
use crate::pdf::ContentSink;

use super::cell::PdfPCell;

/// Rows are painted in three passes so that no background covers a
/// border or text of a neighboring row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Layer {
    Background,
    Borders,
    Content,
}

const LAYERS: [Layer; 3] = [Layer::Background, Layer::Borders, Layer::Content];

#[derive(Debug, Clone)]
pub struct PdfPRow {
    pub(crate) cells: Vec<Option<PdfPCell>>,
    pub(crate) extra_heights: Vec<f64>,
    pub(crate) max_height: f64,
    pub(crate) calculated: bool,
}

impl PdfPRow {
    pub fn new(cells: Vec<Option<PdfPCell>>) -> Self {
        let extra_heights = vec![0.0; cells.len()];
        Self {
            cells,
            extra_heights,
            max_height: 0.0,
            calculated: false,
        }
    }

    pub fn cells(&self) -> &[Option<PdfPCell>] {
        &self.cells
    }

    pub fn cell(&self, column: usize) -> Option<&PdfPCell> {
        self.cells.get(column).and_then(Option::as_ref)
    }

    /// Height of the row, valid once the table has measured it.
    pub fn max_height(&self) -> f64 {
        self.max_height
    }

    pub fn set_max_height(&mut self, height: f64) {
        self.max_height = height;
        self.calculated = true;
    }

    pub fn is_calculated(&self) -> bool {
        self.calculated
    }

    /// Assign each cell its horizontal extent from absolute column widths.
    pub(crate) fn set_widths(&mut self, widths: &[f64]) {
        let mut total = 0.0;
        let mut k = 0;
        while k < widths.len() {
            let Some(cell) = self.cells.get_mut(k).and_then(Option::as_mut) else {
                total += widths[k];
                k += 1;
                continue;
            };
            cell.left = total;
            let last = (k + cell.colspan.max(1)).min(widths.len());
            while k < last {
                total += widths[k];
                k += 1;
            }
            cell.right = total;
        }
        self.calculated = false;
    }

    /// Tallest cell that starts and ends in this row.
    pub(crate) fn calculate_height(&mut self) -> f64 {
        let mut max_height: f64 = 0.0;
        for cell in self.cells.iter_mut().flatten() {
            let height = cell.max_height();
            if cell.rowspan == 1 {
                max_height = max_height.max(height);
            }
        }
        self.max_height = max_height;
        self.calculated = true;
        max_height
    }

    pub(crate) fn reset_extra_heights(&mut self) {
        self.extra_heights = vec![0.0; self.cells.len()];
    }

    pub(crate) fn set_extra_height(&mut self, column: usize, height: f64) {
        if let Some(extra) = self.extra_heights.get_mut(column) {
            *extra = height;
        }
    }

    /// Paint one layer of every cell with the row top at `y`.
    pub(crate) fn write(&self, layer: Layer, sink: &mut dyn ContentSink, x: f64, y: f64) -> Result<()> {
        for (k, slot) in self.cells.iter().enumerate() {
            if let Some(cell) = slot {
                let extra = self.extra_heights.get(k).copied().unwrap_or(0.0);
                cell.paint(layer, sink, x, y, self.max_height + extra)?;
            }
        }
        Ok(())
    }
}

/// Paint `rows` from the top at `y`. The first `artifact_rows` rows are
/// marked as artifacts. Returns the y below the last row.
pub(crate) fn write_rows(
    rows: &[PdfPRow],
    artifact_rows: usize,
    x: f64,
    y: f64,
    sink: &mut dyn ContentSink,
) -> Result<f64> {
    let mut bottom = y;
    for layer in LAYERS {
        let mut y_pos = y;
        for (k, row) in rows.iter().enumerate() {
            let artifact = k < artifact_rows;
            if artifact {
                sink.begin_marked_content("Artifact");
            }
            row.write(layer, sink, x, y_pos)?;
            if artifact {
                sink.end_marked_content();
            }
            y_pos -= row.max_height;
        }
        bottom = y_pos;
    }
    log::trace!("wrote {} rows from y = {:.2} to {:.2}", rows.len(), y, bottom);
    Ok(bottom)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::FixedWidthFont;
    use crate::model::Phrase;
    use crate::pdf::{DrawOp, RecordingSink};

    fn cell(text: &str) -> PdfPCell {
        PdfPCell::new(Phrase::new(text, FixedWidthFont::new("Mono", 1000).at(10.0)))
    }

    #[test]
    fn test_widths_follow_colspan() {
        let mut row = PdfPRow::new(vec![
            Some(cell("a").with_colspan(2)),
            None,
            Some(cell("b")),
        ]);
        row.set_widths(&[10.0, 20.0, 30.0]);
        let first = row.cell(0).unwrap();
        assert_eq!((first.left(), first.right()), (0.0, 30.0));
        let last = row.cell(2).unwrap();
        assert_eq!((last.left(), last.right()), (30.0, 60.0));
    }

    #[test]
    fn test_rowspan_cells_do_not_set_height() {
        let mut row = PdfPRow::new(vec![
            Some(cell("a")),
            Some(cell("b\nc\nd").with_rowspan(2)),
        ]);
        row.set_widths(&[50.0, 50.0]);
        assert_eq!(row.calculate_height(), 14.0);
        assert!(row.is_calculated());
    }

    #[test]
    fn test_artifact_rows_are_marked() {
        let mut header = PdfPRow::new(vec![Some(cell("h"))]);
        let mut body = PdfPRow::new(vec![Some(cell("b"))]);
        for row in [&mut header, &mut body] {
            row.set_widths(&[50.0]);
            row.calculate_height();
        }
        let mut sink = RecordingSink::new();
        let bottom = write_rows(&[header, body], 1, 0.0, 100.0, &mut sink).unwrap();
        assert_eq!(bottom, 72.0);
        let marked = sink
            .ops()
            .iter()
            .filter(|op| matches!(op, DrawOp::BeginMarked(tag) if tag == "Artifact"))
            .count();
        assert_eq!(marked, 3);
        assert_eq!(sink.lines(), vec!["h", "b"]);
    }
}
