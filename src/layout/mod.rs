//! # Column Layout
//!
//! Content flows into one column at a time. A column is a rectangle or
//! the space between two polyline walls; nothing is laid out on an
//! infinite canvas and sliced afterwards.
//!
//! ## The Loop
//!
//! 1. Prime a [`ColumnText`] with a boundary
//! 2. Call `go`; lines (or block elements) are placed until the text or
//!    the column runs out, and the [`Status`] says which
//! 3. On `NO_MORE_COLUMN`, prime the next boundary and call `go` again;
//!    unconsumed content is kept inside the fitter
//!
//! Every placement decision can be made without drawing: `simulate` runs
//! the same fitting code with no sink. Measuring without consuming is
//! done on a clone, which is a full copy of the fitter and everything it
//! still has to place.
//!
//! [`paginate`] is that loop for a fixed page rectangle.

pub mod boundary;
pub mod column;
mod composite;
pub mod page_break;
pub(crate) mod render;

pub use boundary::{ColumnSpec, Wall, WallHit, WallSegment};
pub use column::ColumnText;
pub use page_break::{decide_row_break, RowBreakDecision, RowBreakInput};

use bitflags::bitflags;

use crate::config::LayoutConfig;
use crate::error::{LayoutError, Result};
use crate::model::Rect;
use crate::pdf::ContentStream;

bitflags! {
    /// Why a call to [`ColumnText::go`] returned. Both flags can be set
    /// at once when the last line used the last of the column.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Status: u8 {
        /// All content has been placed.
        const NO_MORE_TEXT = 1;
        /// The column is full; re-prime it and call `go` again.
        const NO_MORE_COLUMN = 2;
    }
}

/// Flow `column` through as many copies of `page` as it needs, one
/// content stream per page.
pub fn paginate(
    column: &mut ColumnText,
    page: Rect,
    config: &LayoutConfig,
) -> Result<Vec<ContentStream>> {
    let mut pages = Vec::new();
    loop {
        if pages.len() >= config.max_pages {
            log::warn!("giving up after {} pages", config.max_pages);
            return Err(LayoutError::PageLimitExceeded(config.max_pages));
        }
        column.set_simple_column(page.llx, page.lly, page.urx, page.ury);
        let mut stream = ContentStream::new();
        let status = column.go(&mut stream)?;
        pages.push(stream);
        if status.contains(Status::NO_MORE_TEXT) {
            break;
        }
    }
    log::debug!("paginated into {} pages", pages.len());
    Ok(pages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::FixedWidthFont;
    use crate::model::{Paragraph, Phrase};

    fn page() -> Rect {
        Rect::new(0.0, 0.0, 100.0, 40.0)
    }

    #[test]
    fn test_paginate_until_text_runs_out() {
        let font = FixedWidthFont::new("Mono", 1000).at(10.0);
        let mut column = ColumnText::new();
        column.set_leading(10.0, 0.0);
        column.add_text(Phrase::new("aaaaaa bbbbbb cccccc dddddd eeeeee", font));
        let pages = paginate(&mut column, page(), &LayoutConfig::default()).unwrap();
        // Four lines of 10 per 40-high page, five lines in total.
        assert_eq!(pages.len(), 2);
        assert!(pages.iter().all(|p| !p.is_empty()));
    }

    #[test]
    fn test_paginate_composite() {
        let font = FixedWidthFont::new("Mono", 1000).at(10.0);
        let mut column = ColumnText::new();
        for _ in 0..3 {
            column.add_element(Paragraph::new("aaaaaa", font.clone()));
        }
        let pages = paginate(&mut column, page(), &LayoutConfig::default()).unwrap();
        // Leading 15: two paragraphs per page.
        assert_eq!(pages.len(), 2);
    }

    #[test]
    fn test_page_limit() {
        let font = FixedWidthFont::new("Mono", 1000).at(10.0);
        let mut column = ColumnText::new();
        column.set_leading(50.0, 0.0);
        column.add_text(Phrase::new("never fits", font));
        let config = LayoutConfig {
            max_pages: 3,
            ..LayoutConfig::default()
        };
        assert!(matches!(
            paginate(&mut column, page(), &config),
            Err(LayoutError::PageLimitExceeded(3))
        ));
    }

    #[test]
    fn test_status_flags_combine() {
        let both = Status::NO_MORE_TEXT | Status::NO_MORE_COLUMN;
        assert!(both.contains(Status::NO_MORE_TEXT));
        assert_ne!(both, Status::NO_MORE_COLUMN);
    }
}
