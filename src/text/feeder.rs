//! The queue of chunks still waiting to be placed.
//!
//! A [`LineFeeder`] hands out one [`PdfLine`] at a time. Before packing a
//! line it snapshots its queue so a fitter that decides the line does not
//! fit vertically can put every chunk back with [`LineFeeder::restore`].

use std::collections::VecDeque;

use crate::model::{Alignment, RunDirection};

use super::bidi::reorder_chunks;
use super::chunk::Chunk;
use super::line::PdfLine;

#[derive(Debug, Clone, Default)]
pub struct LineFeeder {
    pending: VecDeque<Chunk>,
    /// The previous line ended because it ran out of width, so the next
    /// line drops a leading space.
    continuation: bool,
    saved: Option<(VecDeque<Chunk>, bool)>,
}

impl LineFeeder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, chunk: Chunk) {
        self.pending.push_back(chunk);
    }

    pub fn extend(&mut self, chunks: impl IntoIterator<Item = Chunk>) {
        self.pending.extend(chunks);
    }

    pub fn clear(&mut self) {
        self.pending.clear();
        self.continuation = false;
        self.saved = None;
    }

    /// No chunk with placeable content remains.
    pub fn is_empty(&self) -> bool {
        self.pending.iter().all(|c| c.is_blank())
    }

    /// Text still waiting, in logical order.
    pub fn remaining_text(&self) -> String {
        self.pending.iter().map(|c| c.text()).collect()
    }

    /// Largest font size among the waiting text chunks.
    pub fn max_font_size(&self) -> f64 {
        self.pending
            .iter()
            .filter(|c| c.is_text())
            .fold(0.0, |acc: f64, c| acc.max(c.font().size()))
    }

    pub fn save(&mut self) {
        self.saved = Some((self.pending.clone(), self.continuation));
    }

    /// Undo everything consumed since the last [`save`](Self::save).
    pub fn restore(&mut self) {
        if let Some((pending, continuation)) = self.saved.take() {
            self.pending = pending;
            self.continuation = continuation;
        }
    }

    /// Pack the next line into `width` starting at `left`.
    ///
    /// Returns `None` when nothing is left. The queue is saved first, so a
    /// caller can roll the line back.
    pub fn process_line(
        &mut self,
        left: f64,
        width: f64,
        alignment: Alignment,
        direction: RunDirection,
    ) -> Option<PdfLine> {
        self.save();
        while self.pending.front().is_some_and(|c| c.is_blank()) {
            self.pending.pop_front();
        }
        if self.pending.is_empty() {
            return None;
        }

        let rtl = direction == RunDirection::Rtl;
        let mut line = PdfLine::new(left, left + width, alignment, 0.0);
        line.set_rtl(rtl);

        while let Some(mut chunk) = self.pending.pop_front() {
            if line.is_empty() && self.continuation {
                chunk.trim_first_space();
            }
            if let Some(overflow) = line.add(chunk) {
                self.continuation = !line.ended_on_newline();
                if !overflow.is_blank() {
                    self.pending.push_front(overflow);
                }
                break;
            }
            if !line.is_empty() {
                self.continuation = false;
            }
        }

        if matches!(direction, RunDirection::Ltr | RunDirection::Rtl) {
            let chunks = std::mem::take(line.chunks_mut());
            *line.chunks_mut() = reorder_chunks(chunks, rtl);
        }

        Some(line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::{FixedWidthFont, Font};

    fn mono() -> Font {
        FixedWidthFont::new("Mono", 1000).at(20.0)
    }

    fn drain(feeder: &mut LineFeeder, width: f64) -> Vec<String> {
        let mut lines = Vec::new();
        while let Some(line) = feeder.process_line(0.0, width, Alignment::Left, RunDirection::NoBidi)
        {
            lines.push(line.text());
        }
        lines
    }

    #[test]
    fn test_quick_brown_fox_in_five_lines() {
        let mut feeder = LineFeeder::new();
        feeder.push(Chunk::new(
            "The quick brown fox jumps over the lazy dog",
            mono(),
        ));
        let lines = drain(&mut feeder, 200.0);
        assert_eq!(
            lines,
            vec!["The quick", "brown fox", "jumps over", "the lazy", "dog"]
        );
    }

    #[test]
    fn test_restore_puts_line_back() {
        let mut feeder = LineFeeder::new();
        feeder.push(Chunk::new("alpha beta gamma", mono()));
        let first = feeder.process_line(0.0, 120.0, Alignment::Left, RunDirection::NoBidi);
        assert_eq!(first.unwrap().text(), "alpha");
        feeder.restore();
        assert_eq!(feeder.remaining_text(), "alpha beta gamma");
    }

    #[test]
    fn test_newlines_make_lines() {
        let mut feeder = LineFeeder::new();
        feeder.push(Chunk::new("a\n\nb", mono()));
        assert_eq!(drain(&mut feeder, 200.0), vec!["a", " ", "b"]);
    }

    #[test]
    fn test_multiple_chunks_share_a_line() {
        let mut feeder = LineFeeder::new();
        feeder.push(Chunk::new("ab ", mono()));
        feeder.push(Chunk::new("cd ", mono()));
        feeder.push(Chunk::new("ef", mono()));
        assert_eq!(drain(&mut feeder, 200.0), vec!["ab cd ef"]);
    }

    #[test]
    fn test_continuation_drops_leading_space() {
        let mut feeder = LineFeeder::new();
        feeder.push(Chunk::new("abcd", mono()));
        feeder.push(Chunk::new(" efgh", mono()));
        assert_eq!(drain(&mut feeder, 80.0), vec!["abcd", "efgh"]);
    }

    #[test]
    fn test_empty_feeder() {
        let mut feeder = LineFeeder::new();
        assert!(feeder.is_empty());
        feeder.push(Chunk::new("", mono()));
        assert!(feeder.is_empty());
        assert!(drain(&mut feeder, 100.0).is_empty());
    }

    #[test]
    fn test_rtl_direction_marks_line() {
        let mut feeder = LineFeeder::new();
        feeder.push(Chunk::new("אב", mono()));
        let line = feeder
            .process_line(0.0, 100.0, Alignment::Left, RunDirection::Rtl)
            .unwrap();
        assert!(line.is_rtl());
        assert_eq!(line.text(), "בא");
    }
}
