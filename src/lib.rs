//! # Pageflow
//!
//! A column and table layout engine for PDF page content.
//!
//! Content is never laid out on an infinite canvas and cut into pages
//! afterwards. It flows *into* columns: every line break and every table
//! row placement is decided against the column it has to fit in, and
//! whatever does not fit stays with the fitter for the next column.
//!
//! ## Architecture
//!
//! ```text
//! Chunks / block elements
//!       ↓
//!   [text]    — chunks, line building, bidi reordering
//!       ↓
//!   [layout]  — ColumnText: simple and composite fitting into columns
//!       ↓        ↘
//!       ↓      [table] — row heights, rowspan, row splitting, headers
//!       ↓        ↙
//!   [pdf]     — ContentSink: content-stream operators or recorded ops
//! ```
//!
//! Fonts are a metrics service behind [`font::FontMetrics`]; layout only
//! asks for advances, extents and encoded bytes. Per-build settings live
//! in a shared [`config::LayoutConfig`].

pub mod config;
pub mod error;
pub mod font;
pub mod layout;
pub mod model;
pub mod pdf;
pub mod table;
pub mod text;

pub use config::LayoutConfig;
pub use error::{LayoutError, Result};
pub use layout::{paginate, ColumnText, Status};
pub use model::{Element, Paragraph, Phrase, Rect};
pub use table::{PdfPCell, PdfPRow, PdfPTable};
pub use text::{Chunk, PdfLine};
