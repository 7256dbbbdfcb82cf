//! Block elements: paragraphs, lists, tables and draw markers.

use std::fmt;
use std::sync::Arc;

use crate::font::Font;
use crate::pdf::ContentSink;
use crate::table::PdfPTable;
use crate::text::Chunk;

use super::{Alignment, Image, RunDirection};

/// An ordered run of chunks with an optional fixed leading.
#[derive(Debug, Clone, Default)]
pub struct Phrase {
    pub chunks: Vec<Chunk>,
    /// `None` derives the leading from the largest font (1.5x its size).
    pub leading: Option<f64>,
}

impl Phrase {
    pub fn new(text: impl Into<String>, font: Font) -> Self {
        Self::from_chunks(vec![Chunk::new(text, font)])
    }

    pub fn from_chunks(chunks: Vec<Chunk>) -> Self {
        Self {
            chunks,
            leading: None,
        }
    }

    pub fn push(&mut self, chunk: Chunk) {
        self.chunks.push(chunk);
    }

    pub fn with_chunk(mut self, chunk: Chunk) -> Self {
        self.chunks.push(chunk);
        self
    }

    pub fn with_leading(mut self, leading: f64) -> Self {
        self.leading = Some(leading);
        self
    }

    pub fn text(&self) -> String {
        self.chunks.iter().map(|c| c.text()).collect()
    }

    /// Largest font size among text chunks, zero for none.
    pub fn max_font_size(&self) -> f64 {
        self.chunks
            .iter()
            .filter(|c| c.is_text())
            .fold(0.0, |acc: f64, c| acc.max(c.font().size()))
    }

    pub fn effective_leading(&self, fallback: f64) -> f64 {
        match self.leading {
            Some(leading) => leading,
            None => {
                let size = self.max_font_size();
                if size > 0.0 {
                    1.5 * size
                } else {
                    fallback
                }
            }
        }
    }
}

impl From<Chunk> for Phrase {
    fn from(chunk: Chunk) -> Self {
        Self::from_chunks(vec![chunk])
    }
}

// ── Paragraph ───────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct Paragraph {
    pub phrase: Phrase,
    pub alignment: Alignment,
    pub indentation_left: f64,
    pub indentation_right: f64,
    /// Added to `indentation_left` on the first line only.
    pub first_line_indent: f64,
    pub spacing_before: f64,
    pub spacing_after: f64,
    /// Vertical gap added after every explicit newline.
    pub extra_paragraph_space: f64,
    pub multiplied_leading: f64,
    /// Move the whole paragraph to the next column rather than split it.
    pub keep_together: bool,
    pub run_direction: RunDirection,
}

impl Paragraph {
    pub fn new(text: impl Into<String>, font: Font) -> Self {
        Self::from(Phrase::new(text, font))
    }

    pub fn with_alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }

    pub fn with_indentation(mut self, left: f64, right: f64) -> Self {
        self.indentation_left = left;
        self.indentation_right = right;
        self
    }

    pub fn with_first_line_indent(mut self, indent: f64) -> Self {
        self.first_line_indent = indent;
        self
    }

    pub fn with_spacing(mut self, before: f64, after: f64) -> Self {
        self.spacing_before = before;
        self.spacing_after = after;
        self
    }

    pub fn with_extra_paragraph_space(mut self, space: f64) -> Self {
        self.extra_paragraph_space = space;
        self
    }

    /// Leading as `fixed + multiplied * font size`.
    pub fn with_leading(mut self, fixed: f64, multiplied: f64) -> Self {
        self.phrase.leading = Some(fixed);
        self.multiplied_leading = multiplied;
        self
    }

    pub fn with_keep_together(mut self, keep: bool) -> Self {
        self.keep_together = keep;
        self
    }

    pub fn with_run_direction(mut self, direction: RunDirection) -> Self {
        self.run_direction = direction;
        self
    }

    /// Fixed part of the leading. With a multiplied leading and no
    /// explicit fixed one, the fixed part is zero.
    pub fn fixed_leading(&self, fallback: f64) -> f64 {
        if self.phrase.leading.is_none() && self.multiplied_leading > 0.0 {
            return 0.0;
        }
        self.phrase.effective_leading(fallback)
    }

    pub fn text(&self) -> String {
        self.phrase.text()
    }
}

impl From<Phrase> for Paragraph {
    fn from(phrase: Phrase) -> Self {
        Self {
            phrase,
            ..Self::default()
        }
    }
}

// ── Lists ───────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct ListItem {
    pub paragraph: Paragraph,
    /// Assigned by [`List::add`] when left empty.
    pub symbol: Option<Chunk>,
}

impl ListItem {
    pub fn new(text: impl Into<String>, font: Font) -> Self {
        Self::from(Paragraph::new(text, font))
    }
}

impl From<Paragraph> for ListItem {
    fn from(paragraph: Paragraph) -> Self {
        Self {
            paragraph,
            symbol: None,
        }
    }
}

#[derive(Debug, Clone)]
pub enum ListEntry {
    Item(ListItem),
    Sublist(List),
}

impl From<ListItem> for ListEntry {
    fn from(item: ListItem) -> Self {
        Self::Item(item)
    }
}

impl From<List> for ListEntry {
    fn from(list: List) -> Self {
        Self::Sublist(list)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListStyle {
    /// Every item gets the list's symbol chunk.
    Symbol,
    Numbered { first: u32 },
    Lettered { first: u32, lowercase: bool },
}

#[derive(Debug, Clone)]
pub struct List {
    entries: Vec<ListEntry>,
    style: ListStyle,
    symbol: Chunk,
    items: u32,
    /// Room reserved left of every item for its symbol.
    pub symbol_indent: f64,
    pub indentation_left: f64,
    pub indentation_right: f64,
}

/// An item located by its flattened index, with the indentation of
/// every list enclosing it.
#[derive(Debug, Clone, Copy)]
pub struct ListItemSlot<'a> {
    pub item: &'a ListItem,
    pub indentation_left: f64,
    pub indentation_right: f64,
}

impl List {
    /// A list drawing `symbol` (or numbers/letters in its font) in a
    /// gutter of `symbol_indent`.
    pub fn new(style: ListStyle, symbol_indent: f64, symbol: Chunk) -> Self {
        Self {
            entries: Vec::new(),
            style,
            symbol,
            items: 0,
            symbol_indent,
            indentation_left: 0.0,
            indentation_right: 0.0,
        }
    }

    /// A bulleted list using `"- "`.
    pub fn bulleted(symbol_indent: f64, font: Font) -> Self {
        Self::new(ListStyle::Symbol, symbol_indent, Chunk::new("- ", font))
    }

    pub fn numbered(symbol_indent: f64, font: Font) -> Self {
        Self::new(ListStyle::Numbered { first: 1 }, symbol_indent, Chunk::new("", font))
    }

    pub fn style(&self) -> ListStyle {
        self.style
    }

    pub fn entries(&self) -> &[ListEntry] {
        &self.entries
    }

    /// Append an item or a nested list.
    ///
    /// Items are indented by the symbol gutter and get an automatic
    /// symbol when they have none. Nested lists are shifted right by the
    /// gutter and do not advance the numbering.
    pub fn add(&mut self, entry: impl Into<ListEntry>) {
        match entry.into() {
            ListEntry::Item(mut item) => {
                if item.symbol.is_none() {
                    item.symbol = Some(self.symbol_for(self.items));
                }
                item.paragraph.indentation_left = self.symbol_indent;
                item.paragraph.indentation_right = 0.0;
                self.items += 1;
                self.entries.push(ListEntry::Item(item));
            }
            ListEntry::Sublist(mut list) => {
                list.indentation_left += self.symbol_indent;
                self.entries.push(ListEntry::Sublist(list));
            }
        }
    }

    fn symbol_for(&self, index: u32) -> Chunk {
        match self.style {
            ListStyle::Symbol => self.symbol.clone(),
            ListStyle::Numbered { first } => self
                .symbol
                .with_text(format!("{}. ", first.saturating_add(index))),
            ListStyle::Lettered { first, lowercase } => {
                let mut letters = alphabetic(first.saturating_add(index).max(1));
                if lowercase {
                    letters = letters.to_lowercase();
                }
                self.symbol.with_text(format!("{}. ", letters))
            }
        }
    }

    /// Number of items, nested ones included.
    pub fn item_count(&self) -> usize {
        self.entries
            .iter()
            .map(|e| match e {
                ListEntry::Item(_) => 1,
                ListEntry::Sublist(list) => list.item_count(),
            })
            .sum()
    }

    /// The `index`-th item in reading order, descending into sublists.
    pub fn item_at(&self, index: usize) -> Option<ListItemSlot<'_>> {
        let mut remaining = index;
        self.find(&mut remaining, 0.0, 0.0)
    }

    fn find(&self, remaining: &mut usize, left: f64, right: f64) -> Option<ListItemSlot<'_>> {
        let left = left + self.indentation_left;
        let right = right + self.indentation_right;
        for entry in &self.entries {
            match entry {
                ListEntry::Item(item) => {
                    if *remaining == 0 {
                        return Some(ListItemSlot {
                            item,
                            indentation_left: left,
                            indentation_right: right,
                        });
                    }
                    *remaining -= 1;
                }
                ListEntry::Sublist(list) => {
                    if let Some(slot) = list.find(remaining, left, right) {
                        return Some(slot);
                    }
                }
            }
        }
        None
    }
}

/// Bijective base-26: 1 -> A, 26 -> Z, 27 -> AA.
fn alphabetic(mut n: u32) -> String {
    let mut out = Vec::new();
    while n > 0 {
        n -= 1;
        out.push((b'A' + (n % 26) as u8) as char);
        n /= 26;
    }
    out.iter().rev().collect()
}

// ── Elements ────────────────────────────────────────────────────

/// Something drawn at the current position without taking up height,
/// such as a rule or a bookmark anchor.
pub trait DrawMarker: fmt::Debug + Send + Sync {
    /// `llx..urx` and `lly..ury` are the column; `y` is the write cursor.
    fn draw(&self, sink: &mut dyn ContentSink, llx: f64, lly: f64, urx: f64, ury: f64, y: f64);
}

#[derive(Debug, Clone)]
pub enum Element {
    Paragraph(Paragraph),
    List(List),
    Table(Box<PdfPTable>),
    Marker(Arc<dyn DrawMarker>),
}

impl From<Paragraph> for Element {
    fn from(paragraph: Paragraph) -> Self {
        Self::Paragraph(paragraph)
    }
}

impl From<Phrase> for Element {
    fn from(phrase: Phrase) -> Self {
        Self::Paragraph(Paragraph::from(phrase))
    }
}

impl From<Chunk> for Element {
    fn from(chunk: Chunk) -> Self {
        Self::Paragraph(Paragraph::from(Phrase::from(chunk)))
    }
}

impl From<List> for Element {
    fn from(list: List) -> Self {
        Self::List(list)
    }
}

impl From<PdfPTable> for Element {
    fn from(table: PdfPTable) -> Self {
        Self::Table(Box::new(table))
    }
}

/// A block image becomes a single-cell table sized to the image.
impl From<Image> for Element {
    fn from(image: Image) -> Self {
        Self::Table(Box::new(PdfPTable::from(image)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::FixedWidthFont;

    fn font() -> Font {
        FixedWidthFont::new("Mono", 500).at(10.0)
    }

    #[test]
    fn test_default_leading_is_one_and_a_half_sizes() {
        let phrase = Phrase::new("x", FixedWidthFont::new("Mono", 500).at(12.0));
        assert_eq!(phrase.effective_leading(16.0), 18.0);
        assert_eq!(Phrase::default().effective_leading(16.0), 16.0);
        assert_eq!(phrase.clone().with_leading(9.0).effective_leading(16.0), 9.0);
    }

    #[test]
    fn test_multiplied_leading_drops_fixed_part() {
        let mut para = Paragraph::new("x", font());
        para.multiplied_leading = 1.2;
        assert_eq!(para.fixed_leading(16.0), 0.0);
        let para = para.with_leading(4.0, 1.2);
        assert_eq!(para.fixed_leading(16.0), 4.0);
    }

    #[test]
    fn test_numbered_symbols() {
        let mut list = List::numbered(20.0, font());
        list.add(ListItem::new("one", font()));
        list.add(ListItem::new("two", font()));
        let second = list.item_at(1).unwrap();
        assert_eq!(second.item.symbol.as_ref().unwrap().text(), "2. ");
        assert_eq!(second.item.paragraph.indentation_left, 20.0);
    }

    #[test]
    fn test_lettered_symbols() {
        let mut list = List::new(
            ListStyle::Lettered {
                first: 26,
                lowercase: true,
            },
            15.0,
            Chunk::new("", font()),
        );
        list.add(ListItem::new("z", font()));
        list.add(ListItem::new("aa", font()));
        let symbols: Vec<String> = (0..2)
            .map(|i| list.item_at(i).unwrap().item.symbol.as_ref().unwrap().text().to_string())
            .collect();
        assert_eq!(symbols, vec!["z. ", "aa. "]);
    }

    #[test]
    fn test_nested_lists_accumulate_indentation() {
        let mut inner = List::bulleted(10.0, font());
        inner.add(ListItem::new("inner", font()));
        let mut outer = List::numbered(20.0, font());
        outer.indentation_left = 5.0;
        outer.add(ListItem::new("first", font()));
        outer.add(inner);
        outer.add(ListItem::new("last", font()));

        assert_eq!(outer.item_count(), 3);
        let nested = outer.item_at(1).unwrap();
        assert_eq!(nested.item.paragraph.text(), "inner");
        assert_eq!(nested.indentation_left, 25.0);
        let last = outer.item_at(2).unwrap();
        assert_eq!(last.item.symbol.as_ref().unwrap().text(), "2. ");
        assert_eq!(last.indentation_left, 5.0);
        assert!(outer.item_at(3).is_none());
    }

    #[test]
    fn test_alphabetic() {
        assert_eq!(alphabetic(1), "A");
        assert_eq!(alphabetic(26), "Z");
        assert_eq!(alphabetic(28), "AB");
    }

    #[test]
    fn test_image_becomes_table() {
        let element = Element::from(Image::new("logo", 120.0, 40.0));
        match element {
            Element::Table(table) => {
                assert_eq!(table.size(), 1);
                assert!(table.is_locked_width());
                assert_eq!(table.total_width(), 120.0);
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
