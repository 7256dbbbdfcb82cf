//! Integration tests for the pageflow layout pipeline.
//!
//! These tests drive the public API the way a document builder would:
//! prime a column, call `go`, re-prime on `NO_MORE_COLUMN`. They verify:
//! - Line building conserves width and always makes progress
//! - Text flows through simple and irregular columns without loss
//! - Measuring on a clone never disturbs the original
//! - Tables repeat headers and footers, split rows, and share rowspans

use pageflow::font::{FixedWidthFont, Font};
use pageflow::model::{Alignment, Paragraph, Phrase, Rect};
use pageflow::pdf::{ContentStream, RecordingSink};
use pageflow::text::{Chunk, PdfLine};
use pageflow::{paginate, ColumnText, LayoutConfig, LayoutError, PdfPCell, PdfPTable, Status};

// ─── Helpers ────────────────────────────────────────────────────

fn mono() -> Font {
    FixedWidthFont::new("Mono", 1000).at(10.0)
}

fn text_column(text: &str, width: f64, height: f64) -> ColumnText {
    let mut column = ColumnText::new();
    column.set_leading(10.0, 0.0);
    column.add_text(Phrase::new(text, mono()));
    column.set_simple_column(0.0, 0.0, width, height);
    column
}

/// Run `column` through identical rectangles until its content runs out.
/// Returns one recording per column used.
fn flow(column: &mut ColumnText, width: f64, height: f64) -> Vec<RecordingSink> {
    let mut pages = Vec::new();
    for _ in 0..50 {
        column.set_simple_column(0.0, 0.0, width, height);
        let mut sink = RecordingSink::new();
        let status = column.go(&mut sink).unwrap();
        pages.push(sink);
        if status.contains(Status::NO_MORE_TEXT) {
            return pages;
        }
    }
    panic!("content never ran out");
}

fn words_of(pages: &[RecordingSink]) -> Vec<String> {
    pages
        .iter()
        .flat_map(|p| p.lines())
        .flat_map(|line| {
            line.split_whitespace()
                .map(str::to_string)
                .collect::<Vec<_>>()
        })
        .collect()
}

/// The text runs of each page, in drawing order.
fn runs_of(pages: &[RecordingSink]) -> Vec<Vec<String>> {
    pages
        .iter()
        .map(|p| p.text_runs().iter().map(|run| run.0.to_string()).collect())
        .collect()
}

fn cell(text: &str) -> PdfPCell {
    PdfPCell::new(Phrase::new(text, mono()))
}

fn one_column_table(rows: &[&str]) -> PdfPTable {
    let mut table = PdfPTable::new(1).unwrap();
    table.set_width_percentage(100.0);
    for text in rows {
        table.add_cell(cell(text));
    }
    table
}

fn table_column(table: PdfPTable) -> ColumnText {
    let mut column = ColumnText::new();
    column.add_element(table);
    column
}

// ─── Line Building ──────────────────────────────────────────────

#[test]
fn test_line_width_is_conserved() {
    let mut line = PdfLine::new(0.0, 100.0, Alignment::Left, 12.0);
    let overflow = line.add(Chunk::new("abc defg hi", mono())).unwrap();
    let placed: f64 = line.chunks().iter().map(Chunk::width).sum();
    assert!((placed + line.width_left() - line.original_width()).abs() < 1e-6);
    assert_eq!(line.text(), "abc defg");
    assert_eq!(line.width_left(), 20.0);
    assert_eq!(overflow.text(), "hi");
}

#[test]
fn test_oversized_word_is_forced_onto_empty_line() {
    // No break opportunity and wider than the line: the line still takes
    // something, and a second line finishes the word.
    let mut first = PdfLine::new(0.0, 30.0, Alignment::Left, 12.0);
    let rest = first.add(Chunk::new("abcdefgh", mono())).unwrap();
    assert!(!first.is_empty());
    assert!(rest.len() < 8);

    let mut lines = 1;
    let mut pending = Some(rest);
    while let Some(chunk) = pending {
        let mut line = PdfLine::new(0.0, 30.0, Alignment::Left, 12.0);
        pending = line.add(chunk);
        lines += 1;
        assert!(lines <= 3, "no progress after {} lines", lines);
    }
    assert_eq!(lines, 3);
}

// ─── Simple Columns ─────────────────────────────────────────────

#[test]
fn test_fox_fills_lines_left_to_right() {
    let mut column = text_column("The quick brown fox jumps over the lazy dog", 100.0, 100.0);
    let mut sink = RecordingSink::new();
    let status = column.go(&mut sink).unwrap();
    assert_eq!(status, Status::NO_MORE_TEXT);
    assert_eq!(
        sink.lines(),
        vec!["The quick", "brown fox", "jumps over", "the lazy", "dog"]
    );
    assert_eq!(column.lines_written(), 5);
    assert_eq!(column.y_line(), 50.0);
}

#[test]
fn test_every_word_lands_on_some_page() {
    let source = "alpha beta gamma delta epsilon zeta eta theta iota kappa lambda mu ".repeat(6);
    let mut column = text_column(&source, 100.0, 45.0);
    let pages = flow(&mut column, 100.0, 45.0);
    assert!(pages.len() > 1);
    let expected: Vec<String> = source.split_whitespace().map(str::to_string).collect();
    assert_eq!(words_of(&pages), expected);
}

#[test]
fn test_irregular_column_keeps_all_text() {
    // A column that narrows from 100 at the top to 60 at the bottom.
    let mut column = ColumnText::new();
    column
        .set_columns(&[0.0, 100.0, 0.0, 0.0], &[100.0, 100.0, 60.0, 0.0])
        .unwrap();
    column.set_leading(10.0, 0.0);
    let source = "abcd efgh ijkl mnop qrst uvwx";
    column.add_text(Phrase::new(source, mono()));

    let mut sink = RecordingSink::new();
    assert_eq!(column.go(&mut sink).unwrap(), Status::NO_MORE_TEXT);
    assert!(sink.text_runs().iter().all(|run| run.1 == 0.0));
    let expected: Vec<String> = source.split_whitespace().map(str::to_string).collect();
    assert_eq!(words_of(&[sink]), expected);
}

#[test]
fn test_irregular_column_resumes_below_last_line() {
    let mut column = ColumnText::new();
    column
        .set_columns(&[0.0, 100.0, 0.0, 0.0], &[200.0, 100.0, 200.0, 0.0])
        .unwrap();
    column.set_leading(10.0, 0.0);
    column.add_text(Phrase::new("ab", mono()));
    let mut sink = RecordingSink::new();
    column.go(&mut sink).unwrap();
    assert_eq!(column.y_line(), 90.0);

    column.add_text(Phrase::new("cd", mono()));
    column.go(&mut sink).unwrap();
    let ys: Vec<f64> = sink.text_runs().iter().map(|run| run.2).collect();
    assert_eq!(ys, vec![90.0, 80.0]);
}

#[test]
fn test_measuring_a_clone_leaves_the_original_alone() {
    let mut column = text_column("The quick brown fox jumps over the lazy dog", 100.0, 30.0);
    let mut dry = column.clone();
    let measured = dry.simulate().unwrap();

    let mut sink = RecordingSink::new();
    let status = column.go(&mut sink).unwrap();
    assert_eq!(status, measured);
    assert_eq!(column.y_line(), dry.y_line());
    assert_eq!(column.lines_written(), dry.lines_written());
    assert_eq!(sink.lines().len(), 3);
}

#[test]
fn test_paginate_writes_content_streams() {
    let mut column = ColumnText::new();
    for text in ["first block", "second block", "third block"] {
        column.add_element(Paragraph::new(text, mono()));
    }
    let pages = paginate(
        &mut column,
        Rect::new(0.0, 0.0, 200.0, 40.0),
        &LayoutConfig::default(),
    )
    .unwrap();
    assert_eq!(pages.len(), 2);
    assert!(pages[0].as_str().contains("BT"));
    assert_eq!(pages[0].fonts(), &["Mono".to_string()]);
    assert!(!pages[1].compressed().is_empty());
}

#[test]
fn test_go_without_column_fails() {
    let mut column = ColumnText::new();
    column.add_text(Phrase::new("nowhere", mono()));
    let mut sink = ContentStream::new();
    assert!(matches!(column.go(&mut sink), Err(LayoutError::NoColumn)));
}

#[test]
fn test_short_wall_is_rejected() {
    let mut column = ColumnText::new();
    assert!(matches!(
        column.set_columns(&[0.0, 100.0, 0.0], &[100.0, 100.0, 100.0, 0.0]),
        Err(LayoutError::InvalidColumnLine(_))
    ));
}

// ─── Tables ─────────────────────────────────────────────────────

#[test]
fn test_rowspan_height_spreads_evenly() {
    let mut table = PdfPTable::new(2).unwrap();
    table.set_total_width(100.0);
    table.add_cell(cell("tall").with_rowspan(3).with_fixed_height(90.0));
    for text in ["a", "b", "c"] {
        table.add_cell(cell(text).with_fixed_height(10.0));
    }
    assert_eq!(table.size(), 3);
    for row in 0..3 {
        assert_eq!(table.row_height(row), 30.0);
    }
    assert_eq!(table.total_height(), 90.0);
}

#[test]
fn test_header_and_footer_repeat() {
    let mut table = one_column_table(&["head", "foot", "r1", "r2", "r3", "r4"]);
    table.set_header_rows(2);
    table.set_footer_rows(1);
    table.set_skip_last_footer(true);
    let mut column = table_column(table);

    let pages = flow(&mut column, 100.0, 50.0);
    let lines: Vec<Vec<String>> = pages.iter().map(|p| p.lines()).collect();
    assert_eq!(
        lines,
        vec![
            vec!["head", "r1", "foot"],
            vec!["head", "r2", "foot"],
            vec!["head", "r3", "r4"],
        ]
    );
}

#[test]
fn test_split_row_continues_in_next_column() {
    let table = one_column_table(&["x", "1\n2\n3\n4\n5"]);
    let mut column = table_column(table);
    // The 54-high row waits for a fresh column, then splits there.
    let pages = flow(&mut column, 100.0, 50.0);
    assert_eq!(words_of(&pages), vec!["x", "1", "2", "3", "4", "5"]);
    assert_eq!(pages.len(), 3);
    assert_eq!(pages[1].lines(), vec!["1", "2", "3", "4"]);
}

#[test]
fn test_rowspan_continues_on_next_page() {
    let mut table = PdfPTable::new(2).unwrap();
    table.set_width_percentage(100.0);
    table.add_cell(cell("a\nb\nc\nd\ne\nf").with_rowspan(3));
    for text in ["x", "y", "z"] {
        table.add_cell(cell(text));
    }
    let mut column = table_column(table);

    let pages = flow(&mut column, 200.0, 50.0);
    assert_eq!(
        runs_of(&pages),
        vec![vec!["a", "b", "c", "x", "y"], vec!["d", "e", "f", "z"]]
    );
}

#[test]
fn test_row_split_inside_rowspan_loses_nothing() {
    let mut table = PdfPTable::new(2).unwrap();
    table.set_width_percentage(100.0);
    table.add_cell(cell("a\nb\nc\nd\ne\nf").with_rowspan(2));
    table.add_cell(cell("x"));
    table.add_cell(cell("1\n2\n3\n4\n5"));
    let mut column = table_column(table);

    // The tall row waits for a fresh page, then splits there together
    // with the rest of the spanning cell.
    let pages = flow(&mut column, 200.0, 50.0);
    assert_eq!(
        runs_of(&pages),
        vec![
            vec!["a", "x"],
            vec!["b", "c", "d", "e", "1", "2", "3", "4"],
            vec!["f", "5"],
        ]
    );
}

#[test]
fn test_keep_together_table_moves_to_fresh_column() {
    let mut table = one_column_table(&["a", "b", "c"]);
    table.set_keep_together(true);
    let mut column = ColumnText::new();
    column.add_element(Paragraph::new("intro", mono()));
    column.add_element(table);

    // 15 for the paragraph leaves 35; the table needs 42.
    let pages = flow(&mut column, 100.0, 50.0);
    let lines: Vec<Vec<String>> = pages.iter().map(|p| p.lines()).collect();
    assert_eq!(lines, vec![vec!["intro"], vec!["a", "b", "c"]]);
}

#[test]
fn test_table_writes_directly_to_a_sink() {
    let mut table = one_column_table(&["a", "b"]);
    let mut sink = RecordingSink::new();
    assert!(matches!(
        table.write_selected_rows(0, None, 0.0, 100.0, &mut sink),
        Err(LayoutError::ZeroTableWidth)
    ));

    table.set_total_width(80.0);
    let bottom = table
        .write_selected_rows(0, None, 10.0, 100.0, &mut sink)
        .unwrap();
    assert_eq!(bottom, 72.0);
    assert_eq!(sink.lines(), vec!["a", "b"]);
}

#[test]
fn test_table_nests_a_copy_of_itself() {
    let mut outer = one_column_table(&["a"]);
    let inner = outer.clone();
    outer.add_table(inner);
    assert_eq!(outer.size(), 2);

    let pages = flow(&mut table_column(outer), 100.0, 100.0);
    assert_eq!(words_of(&pages), vec!["a", "a"]);
}

#[test]
fn test_config_from_json() {
    let config = LayoutConfig::from_json(r#"{"maxPages": 2, "defaultLeading": 12.0}"#).unwrap();
    assert_eq!(config.max_pages, 2);
    assert_eq!(config.default_leading, 12.0);
    assert!(matches!(
        LayoutConfig::from_json("{"),
        Err(LayoutError::Config(_))
    ));
}
