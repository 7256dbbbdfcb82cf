//! # Line Rendering
//!
//! Turns a committed [`PdfLine`] into sink commands. Justification is
//! decided here, not in the line builder: the unused width of a line is
//! spread over its gaps using the column's space/char ratio, so word
//! gaps grow `ratio` times faster than letter gaps.
//!
//! The last line of a justified paragraph keeps the spacing of the line
//! before it when that spacing still fits, so the paragraph ends with
//! the same texture it had, instead of a stretched or a ragged line.

use crate::model::{Alignment, Color};
use crate::pdf::{ContentSink, TextRun};
use crate::text::{ChunkKind, PdfLine};

/// Trailing punctuation allowed to hang partly past the right edge.
const HANGING_PUNCTUATION: &str = ".,;:'";

/// Spacing carried from one line of a column to the next.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Justification {
    last_base_factor: f64,
}

#[derive(Debug, Clone, Copy, Default)]
struct LineSpacing {
    word: f64,
    char: f64,
    glue: f64,
    shift: f64,
}

impl Justification {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn spacing(&mut self, line: &PdfLine, ratio: f64) -> LineSpacing {
        let spaces = line.number_of_spaces() as f64;
        let len = line.line_len();
        let justified = line.has_to_be_justified() && (spaces > 0.0 || len > 1);
        let separators = line.separator_count();
        let gaps = ratio * spaces + len as f64 - 1.0;
        let mut spacing = LineSpacing::default();

        if separators > 0 {
            spacing.glue = line.width_left() / separators as f64;
        } else if justified {
            let reuse = self.last_base_factor * gaps;
            if line.is_newline_split() && line.width_left() >= reuse {
                if line.is_rtl() {
                    spacing.shift = line.width_left() - reuse;
                }
                spacing.word = ratio * self.last_base_factor;
                spacing.char = self.last_base_factor;
            } else {
                let mut width = line.width_left();
                if let Some(last) = line.chunks().last() {
                    if let Some(c) = last.text().chars().last() {
                        if HANGING_PUNCTUATION.contains(c) {
                            width += last.font().char_width(c) * 0.4;
                        }
                    }
                }
                let base = width / gaps;
                spacing.word = ratio * base;
                spacing.char = base;
                self.last_base_factor = base;
            }
        }
        spacing
    }
}

/// Draw `line` with its baseline at `y`. `x` is the line's left edge
/// after indentation; alignment offsets are applied here.
pub(crate) fn write_line(
    sink: &mut dyn ContentSink,
    line: &PdfLine,
    x: f64,
    y: f64,
    ratio: f64,
    justification: &mut Justification,
) {
    if let Some(symbol) = line.list_symbol() {
        let symbol_x = if line.is_rtl() {
            x + line.original_width() + line.list_indent() - symbol.width()
        } else {
            x - line.list_indent()
        };
        sink.begin_marked_content("Lbl");
        sink.move_to(symbol_x, y);
        sink.show_text(&text_run(symbol, 0.0, 0.0));
        sink.end_marked_content();
    }

    let spacing = justification.spacing(line, ratio);
    let mut x_marker = x + line.indent_left() + spacing.shift;

    for chunk in line.chunks() {
        match chunk.kind() {
            ChunkKind::Text => {
                if !chunk.is_empty() {
                    sink.move_to(x_marker, y);
                    sink.show_text(&text_run(chunk, spacing.char, spacing.word));
                }
                x_marker += chunk.width_corrected(spacing.char, spacing.word);
            }
            ChunkKind::Image(inline) => {
                let image = &inline.image;
                sink.draw_image(
                    image,
                    [
                        image.width,
                        0.0,
                        0.0,
                        image.height,
                        x_marker + inline.offset_x,
                        y + inline.offset_y,
                    ],
                );
                x_marker += chunk.width_corrected(spacing.char, spacing.word);
            }
            ChunkKind::Tab(stop) => {
                let advance = chunk.width();
                if let Some(leader) = &stop.leader {
                    if leader.line_width > 0.0 {
                        let ly = y + leader.offset;
                        sink.stroke_line(
                            (x_marker, ly),
                            (x_marker + advance, ly),
                            leader.line_width,
                            leader.color.unwrap_or(Color::BLACK),
                        );
                    }
                }
                x_marker += advance;
            }
            ChunkKind::Separator(sep) => {
                let color = sep.color.unwrap_or(Color::BLACK);
                if sep.vertical {
                    if sep.line_width > 0.0 {
                        sink.stroke_line(
                            (x_marker, y + line.descender()),
                            (x_marker, y + line.ascender()),
                            sep.line_width,
                            color,
                        );
                    }
                } else {
                    if sep.line_width > 0.0 {
                        let ly = y + sep.offset;
                        sink.stroke_line(
                            (x_marker, ly),
                            (x_marker + spacing.glue, ly),
                            sep.line_width,
                            color,
                        );
                    }
                    x_marker += spacing.glue;
                }
            }
        }
    }
}

fn text_run(chunk: &crate::text::Chunk, char_spacing: f64, word_spacing: f64) -> TextRun {
    let spacing = chunk
        .text()
        .chars()
        .map(|c| {
            let mut extra = chunk.char_spacing() + char_spacing;
            if c == ' ' {
                extra += chunk.word_spacing() + word_spacing;
            }
            extra
        })
        .collect();
    TextRun {
        font: chunk.font().clone(),
        text: chunk.text().to_string(),
        spacing,
        rise: chunk.text_rise(),
        color: chunk.color(),
    }
}

/// Horizontal extent of a one-line column anchored at `x`.
pub(crate) fn aligned_bounds(alignment: Alignment, x: f64) -> (f64, f64) {
    const REACH: f64 = 20_000.0;
    match alignment {
        Alignment::Right => (x - REACH, x),
        Alignment::Center => (x - REACH, x + REACH),
        _ => (x, x + REACH),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::{FixedWidthFont, Font};
    use crate::pdf::{DrawOp, RecordingSink};
    use crate::text::{Chunk, Separator};

    fn mono() -> Font {
        FixedWidthFont::new("Mono", 1000).at(10.0)
    }

    fn line_of(text: &str, width: f64, alignment: Alignment) -> PdfLine {
        let mut line = PdfLine::new(0.0, width, alignment, 0.0);
        assert!(line.add(Chunk::new(text, mono())).is_none());
        line
    }

    fn spacing_of(sink: &RecordingSink) -> Vec<f64> {
        match &sink.ops()[0] {
            DrawOp::Text { spacing, .. } => spacing.clone(),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_left_line_is_drawn_plainly() {
        let mut sink = RecordingSink::new();
        let line = line_of("ab cd", 100.0, Alignment::Left);
        write_line(&mut sink, &line, 10.0, 50.0, 2.5, &mut Justification::new());
        assert_eq!(sink.text_runs(), vec![("ab cd", 10.0, 50.0)]);
        assert!(spacing_of(&sink).iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_right_alignment_offsets_line() {
        let mut sink = RecordingSink::new();
        let line = line_of("ab", 100.0, Alignment::Right);
        write_line(&mut sink, &line, 0.0, 0.0, 2.5, &mut Justification::new());
        assert_eq!(sink.text_runs()[0].1, 80.0);
    }

    #[test]
    fn test_justified_line_fills_width() {
        // Not newline-split: a justified line in the middle of a paragraph.
        let mut line = PdfLine::new(0.0, 100.0, Alignment::Justified, 0.0);
        let overflow = line.add(Chunk::new("ab cd efghijk", mono()));
        assert!(overflow.is_some());
        let mut sink = RecordingSink::new();
        let mut just = Justification::new();
        write_line(&mut sink, &line, 0.0, 0.0, 2.5, &mut just);

        let spacing = spacing_of(&sink);
        // 5 chars + 1 space: gaps = 2.5 * 1 + 5 - 1 = 6.5 over 50 left.
        let base = 50.0 / 6.5;
        let drawn: f64 = line.width_corrected(base, 2.5 * base);
        assert!((drawn - 100.0 - base).abs() < 1e-9);
        assert!((spacing[2] - (base + 2.5 * base)).abs() < 1e-9);
        assert!((just.last_base_factor - base).abs() < 1e-12);
    }

    #[test]
    fn test_last_line_reuses_previous_factor() {
        let mut just = Justification {
            last_base_factor: 1.0,
        };
        let line = line_of("ab cd", 100.0, Alignment::Justified);
        let mut sink = RecordingSink::new();
        write_line(&mut sink, &line, 0.0, 0.0, 2.5, &mut just);
        let spacing = spacing_of(&sink);
        assert_eq!(spacing[0], 1.0);
        assert_eq!(spacing[2], 3.5);
        assert_eq!(just.last_base_factor, 1.0);
    }

    #[test]
    fn test_separator_takes_the_glue() {
        let mut line = PdfLine::new(0.0, 100.0, Alignment::Left, 0.0);
        line.add(Chunk::new("ab", mono()));
        line.add(Chunk::separator(
            Separator {
                line_width: 0.5,
                ..Separator::default()
            },
            mono(),
        ));
        line.add(Chunk::new("cd", mono()));
        let mut sink = RecordingSink::new();
        write_line(&mut sink, &line, 0.0, 0.0, 2.5, &mut Justification::new());
        let runs = sink.text_runs();
        assert_eq!(runs[1], ("cd", 80.0, 0.0));
        assert!(sink
            .ops()
            .iter()
            .any(|op| matches!(op, DrawOp::Line { from, to, .. } if from.0 == 20.0 && to.0 == 80.0)));
    }

    #[test]
    fn test_list_symbol_is_a_label() {
        let mut line = line_of("item", 100.0, Alignment::Left);
        line.set_list_item(Chunk::new("1. ", mono()), 20.0);
        let mut sink = RecordingSink::new();
        write_line(&mut sink, &line, 40.0, 0.0, 2.5, &mut Justification::new());
        assert_eq!(sink.ops()[0], DrawOp::BeginMarked("Lbl".to_string()));
        assert_eq!(sink.text_runs()[0], ("1. ", 20.0, 0.0));
    }

    #[test]
    fn test_aligned_bounds() {
        assert_eq!(aligned_bounds(Alignment::Left, 5.0).0, 5.0);
        assert_eq!(aligned_bounds(Alignment::Right, 5.0).1, 5.0);
    }
}
