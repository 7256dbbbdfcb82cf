//! Styled runs of text or inline images.
//!
//! A [`Chunk`] measures itself with its font and can be split at a
//! target width. Splitting never hands back a head wider than the target
//! except through [`Chunk::truncate`], which always keeps one character so
//! a line can make progress.

use crate::font::Font;
use crate::model::{Color, Image};

use super::{break_after_positions, hyphenate_to_fit, resolve_hyphenation_lang};

/// An image placed inside a line of text.
#[derive(Debug, Clone, PartialEq)]
pub struct InlineImage {
    pub image: Image,
    pub offset_x: f64,
    pub offset_y: f64,
    /// When set, the image height takes part in the line's leading.
    pub change_leading: bool,
}

/// A separator drawn across unused line width.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Separator {
    /// Vertical separators span the line without taking any width.
    pub vertical: bool,
    /// Stroke width; zero makes the separator invisible glue.
    pub line_width: f64,
    /// Vertical offset of the stroke above the baseline.
    pub offset: f64,
    pub color: Option<Color>,
}

/// A tab stop measured from the left edge of the line.
#[derive(Debug, Clone, PartialEq)]
pub struct TabStop {
    pub position: f64,
    /// Start a fresh line when the stop lies behind the current position.
    pub new_line: bool,
    /// Optional leader drawn from the tab origin to the stop.
    pub leader: Option<Separator>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChunkKind {
    Text,
    Image(InlineImage),
    Tab(TabStop),
    Separator(Separator),
}

#[derive(Debug, Clone)]
pub struct Chunk {
    text: String,
    font: Font,
    kind: ChunkKind,
    char_spacing: f64,
    word_spacing: f64,
    text_rise: f64,
    color: Option<Color>,
    hyphenation: Option<hypher::Lang>,
    newline_split: bool,
    /// Width a placed tab consumes up to its stop.
    tab_advance: f64,
}

impl Chunk {
    pub fn new(text: impl Into<String>, font: Font) -> Self {
        Self {
            text: text.into(),
            font,
            kind: ChunkKind::Text,
            char_spacing: 0.0,
            word_spacing: 0.0,
            text_rise: 0.0,
            color: None,
            hyphenation: None,
            newline_split: false,
            tab_advance: 0.0,
        }
    }

    /// A chunk that forces a line break.
    pub fn newline(font: Font) -> Self {
        Self::new("\n", font)
    }

    pub fn image(image: InlineImage, font: Font) -> Self {
        Self {
            kind: ChunkKind::Image(image),
            ..Self::new("", font)
        }
    }

    pub fn tab(stop: TabStop, font: Font) -> Self {
        Self {
            kind: ChunkKind::Tab(stop),
            ..Self::new("", font)
        }
    }

    pub fn separator(separator: Separator, font: Font) -> Self {
        Self {
            kind: ChunkKind::Separator(separator),
            ..Self::new("", font)
        }
    }

    pub fn with_char_spacing(mut self, spacing: f64) -> Self {
        self.char_spacing = spacing;
        self
    }

    pub fn with_word_spacing(mut self, spacing: f64) -> Self {
        self.word_spacing = spacing;
        self
    }

    pub fn with_text_rise(mut self, rise: f64) -> Self {
        self.text_rise = rise;
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }

    pub fn with_hyphenation(mut self, lang: hypher::Lang) -> Self {
        self.hyphenation = Some(lang);
        self
    }

    /// Hyphenate with the patterns for a BCP 47 tag such as `en-US`.
    /// Tags without patterns turn hyphenation off.
    pub fn with_language(mut self, tag: &str) -> Self {
        self.hyphenation = resolve_hyphenation_lang(tag);
        self
    }

    // ── Accessors ───────────────────────────────────────────────

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn font(&self) -> &Font {
        &self.font
    }

    pub fn kind(&self) -> &ChunkKind {
        &self.kind
    }

    pub fn char_spacing(&self) -> f64 {
        self.char_spacing
    }

    pub fn word_spacing(&self) -> f64 {
        self.word_spacing
    }

    pub fn text_rise(&self) -> f64 {
        self.text_rise
    }

    pub fn color(&self) -> Option<Color> {
        self.color
    }

    pub fn is_text(&self) -> bool {
        matches!(self.kind, ChunkKind::Text)
    }

    pub fn is_image(&self) -> bool {
        matches!(self.kind, ChunkKind::Image(_))
    }

    pub fn inline_image(&self) -> Option<&InlineImage> {
        match &self.kind {
            ChunkKind::Image(image) => Some(image),
            _ => None,
        }
    }

    pub fn tab_stop(&self) -> Option<&TabStop> {
        match &self.kind {
            ChunkKind::Tab(stop) => Some(stop),
            _ => None,
        }
    }

    pub fn separator_style(&self) -> Option<&Separator> {
        match &self.kind {
            ChunkKind::Separator(sep) => Some(sep),
            _ => None,
        }
    }

    /// Number of characters of text. Images, tabs and separators have none.
    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// A text chunk with nothing left to place.
    pub fn is_blank(&self) -> bool {
        self.is_text() && self.text.is_empty()
    }

    /// Whether the last split ended at an explicit newline.
    pub fn is_newline_split(&self) -> bool {
        self.newline_split
    }

    pub fn space_count(&self) -> usize {
        self.text.chars().filter(|&c| c == ' ').count()
    }

    // ── Measurement ─────────────────────────────────────────────

    /// Advance of one character including the chunk's own spacing.
    pub fn char_advance(&self, ch: char) -> f64 {
        let mut w = self.font.char_width(ch) + self.char_spacing;
        if ch == ' ' {
            w += self.word_spacing;
        }
        w
    }

    /// Measured width of the chunk.
    pub fn width(&self) -> f64 {
        match &self.kind {
            ChunkKind::Text => self.text.chars().map(|c| self.char_advance(c)).sum(),
            ChunkKind::Image(inline) => inline.image.width,
            ChunkKind::Tab(_) => self.tab_advance,
            ChunkKind::Separator(_) => 0.0,
        }
    }

    /// Width once justification spacing is added.
    pub fn width_corrected(&self, char_spacing: f64, word_spacing: f64) -> f64 {
        match &self.kind {
            ChunkKind::Image(inline) => inline.image.width + char_spacing,
            _ => {
                self.width()
                    + self.len() as f64 * char_spacing
                    + self.space_count() as f64 * word_spacing
            }
        }
    }

    /// Height above the baseline that an inline image needs.
    pub fn image_height(&self) -> Option<f64> {
        self.inline_image()
            .map(|inline| inline.image.height + inline.offset_y)
    }

    pub(crate) fn set_tab_advance(&mut self, advance: f64) {
        self.tab_advance = advance;
    }

    // ── Splitting ───────────────────────────────────────────────

    /// A text chunk with the same attributes and different text.
    pub(crate) fn with_text(&self, text: String) -> Chunk {
        Chunk {
            text,
            kind: ChunkKind::Text,
            newline_split: false,
            tab_advance: 0.0,
            ..self.clone()
        }
    }

    /// Turn this chunk into an empty text chunk and return what it was.
    fn hand_over(&mut self) -> Chunk {
        let whole = self.clone();
        self.kind = ChunkKind::Text;
        self.text.clear();
        whole
    }

    /// Keep the part of the chunk that fits in `width` and return the rest.
    ///
    /// Breaks at explicit newlines first, then at the last break
    /// opportunity (a space wins over an earlier opportunity). When no
    /// break fits, the chunk becomes empty and the whole text is returned.
    pub fn split(&mut self, width: f64) -> Option<Chunk> {
        self.newline_split = false;
        match &self.kind {
            ChunkKind::Image(inline) => {
                if inline.image.width > width {
                    return Some(self.hand_over());
                }
                return None;
            }
            ChunkKind::Tab(_) | ChunkKind::Separator(_) => return None,
            ChunkKind::Text => {}
        }

        let chars: Vec<char> = self.text.chars().collect();
        let breaks = break_after_positions(&self.text);
        let mut split_position: Option<usize> = None;
        let mut last_space: Option<usize> = None;
        let mut last_space_width = 0.0;
        let mut current_width = 0.0;
        let mut pos = 0;

        while pos < chars.len() {
            let ch = chars[pos];
            if ch == '\r' || ch == '\n' {
                self.newline_split = true;
                let skip = if ch == '\r' && chars.get(pos + 1) == Some(&'\n') {
                    2
                } else {
                    1
                };
                let rest: String = chars[pos + skip..].iter().collect();
                let mut head: String = chars[..pos].iter().collect();
                if head.is_empty() {
                    head.push(' ');
                }
                self.text = head;
                return Some(self.with_text(rest));
            }
            current_width += self.char_advance(ch);
            if ch == ' ' {
                last_space = Some(pos + 1);
                last_space_width = current_width;
            }
            if current_width > width {
                break;
            }
            if breaks[pos] {
                split_position = Some(pos + 1);
            }
            pos += 1;
        }

        if pos == chars.len() {
            return None;
        }

        if let Some(lang) = self.hyphenation {
            if let Some(overflow) = self.split_hyphenated(
                &chars,
                pos,
                last_space,
                width - last_space_width,
                lang,
            ) {
                return Some(overflow);
            }
        }

        let Some(mut split) = split_position else {
            let rest = std::mem::take(&mut self.text);
            return Some(self.with_text(rest));
        };
        if let Some(space) = last_space {
            split = split.max(space);
        }

        let rest: String = chars[split..].iter().collect();
        let head: String = chars[..split].iter().collect();
        self.text = trim_trailing(&head).to_string();
        Some(self.with_text(rest))
    }

    /// Break the word that overflowed at `pos` on a syllable boundary.
    fn split_hyphenated(
        &mut self,
        chars: &[char],
        pos: usize,
        last_space: Option<usize>,
        available: f64,
        lang: hypher::Lang,
    ) -> Option<Chunk> {
        let word_start = last_space.unwrap_or(0);
        if word_start > pos {
            return None;
        }
        let word_end = chars[word_start..]
            .iter()
            .position(|c| !c.is_alphabetic())
            .map_or(chars.len(), |p| word_start + p);
        if word_end <= pos {
            return None;
        }

        let word: String = chars[word_start..word_end].iter().collect();
        let (pre, post) = hyphenate_to_fit(&word, lang, available, |c| self.char_advance(c))?;

        let mut head: String = chars[..word_start].iter().collect();
        head.push_str(&pre);
        let mut rest = post;
        rest.extend(&chars[word_end..]);
        self.text = head;
        Some(self.with_text(rest))
    }

    /// Keep as many characters as fit in `width`, but at least one.
    ///
    /// Used when a line is empty and nothing could be split off, so the
    /// line must take something to make progress.
    pub fn truncate(&mut self, width: f64) -> Option<Chunk> {
        match &self.kind {
            ChunkKind::Image(inline) => {
                if inline.image.width > width {
                    return Some(self.hand_over());
                }
                return None;
            }
            ChunkKind::Tab(_) | ChunkKind::Separator(_) => return None,
            ChunkKind::Text => {}
        }

        let chars: Vec<char> = self.text.chars().collect();
        if chars.is_empty() {
            return None;
        }
        if width < self.font.char_width(' ') {
            let rest: String = chars[1..].iter().collect();
            self.text = chars[0].to_string();
            return Some(self.with_text(rest));
        }

        let mut pos = 0;
        let mut current_width = 0.0;
        while pos < chars.len() {
            current_width += self.char_advance(chars[pos]);
            if current_width > width {
                break;
            }
            pos += 1;
        }
        if pos == chars.len() {
            return None;
        }
        let pos = pos.max(1);
        let rest: String = chars[pos..].iter().collect();
        self.text = chars[..pos].iter().collect();
        Some(self.with_text(rest))
    }

    /// Drop one trailing space and return the width it occupied.
    pub fn trim_last_space(&mut self) -> f64 {
        if self.is_text() && self.len() > 1 && self.text.ends_with(' ') {
            self.text.pop();
            return self.char_advance(' ');
        }
        0.0
    }

    /// Drop one leading space and return the width it occupied.
    pub fn trim_first_space(&mut self) -> f64 {
        if self.is_text() && self.len() > 1 && self.text.starts_with(' ') {
            self.text.remove(0);
            return self.char_advance(' ');
        }
        0.0
    }
}

fn trim_trailing(s: &str) -> &str {
    s.trim_end_matches([' ', '\t'])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::FixedWidthFont;

    fn mono(size: f64) -> Font {
        FixedWidthFont::new("Mono", 1000).at(size)
    }

    #[test]
    fn test_width_counts_spacing() {
        let chunk = Chunk::new("a b", mono(10.0))
            .with_char_spacing(1.0)
            .with_word_spacing(2.0);
        assert!((chunk.width() - 35.0).abs() < 1e-9);
    }

    #[test]
    fn test_split_everything_fits() {
        let mut chunk = Chunk::new("abc", mono(10.0));
        assert!(chunk.split(30.0).is_none());
        assert_eq!(chunk.text(), "abc");
    }

    #[test]
    fn test_split_at_last_space() {
        let mut chunk = Chunk::new("The quick brown", mono(20.0));
        let overflow = chunk.split(200.0).unwrap();
        assert_eq!(chunk.text(), "The quick");
        assert_eq!(overflow.text(), "brown");
        assert!(!chunk.is_newline_split());
    }

    #[test]
    fn test_split_head_never_exceeds_width() {
        let mut chunk = Chunk::new("aa bb cc dd ee", mono(10.0));
        let _ = chunk.split(75.0);
        assert!(chunk.width() <= 75.0);
    }

    #[test]
    fn test_split_space_at_overflow_point() {
        let mut chunk = Chunk::new("jumps over the", mono(20.0));
        let overflow = chunk.split(200.0).unwrap();
        assert_eq!(chunk.text(), "jumps over");
        assert_eq!(overflow.text(), "the");
    }

    #[test]
    fn test_split_on_newline() {
        let mut chunk = Chunk::new("ab\r\ncd", mono(10.0));
        let overflow = chunk.split(1000.0).unwrap();
        assert_eq!(chunk.text(), "ab");
        assert_eq!(overflow.text(), "cd");
        assert!(chunk.is_newline_split());
    }

    #[test]
    fn test_split_leading_newline_keeps_a_space() {
        let mut chunk = Chunk::new("\nnext", mono(10.0));
        let overflow = chunk.split(1000.0).unwrap();
        assert_eq!(chunk.text(), " ");
        assert_eq!(overflow.text(), "next");
    }

    #[test]
    fn test_split_without_break_hands_everything_over() {
        let mut chunk = Chunk::new("unbreakable", mono(10.0));
        let overflow = chunk.split(50.0).unwrap();
        assert!(chunk.is_empty());
        assert_eq!(overflow.text(), "unbreakable");
    }

    #[test]
    fn test_split_hyphenates_long_word() {
        let mut chunk =
            Chunk::new("a hyphenation", mono(10.0)).with_hyphenation(hypher::Lang::English);
        let overflow = chunk.split(60.0).unwrap();
        assert!(chunk.text().ends_with('-'));
        assert!(chunk.width() <= 60.0);
        let rejoined = format!(
            "{}{}",
            chunk.text().trim_end_matches('-'),
            overflow.text()
        );
        assert_eq!(rejoined, "a hyphenation");
    }

    #[test]
    fn test_language_tag_picks_patterns() {
        let mut tagged = Chunk::new("a hyphenation", mono(10.0)).with_language("en-GB");
        let mut direct =
            Chunk::new("a hyphenation", mono(10.0)).with_hyphenation(hypher::Lang::English);
        let tagged_rest = tagged.split(60.0).unwrap();
        let direct_rest = direct.split(60.0).unwrap();
        assert_eq!(tagged.text(), direct.text());
        assert_eq!(tagged_rest.text(), direct_rest.text());
        assert!(tagged.text().ends_with('-'));

        let mut unknown = Chunk::new("a hyphenation", mono(10.0)).with_language("x-klingon");
        let overflow = unknown.split(60.0).unwrap();
        assert!(!unknown.text().ends_with('-'));
        assert_eq!(overflow.text(), "hyphenation");
    }

    #[test]
    fn test_truncate_keeps_at_least_one_char() {
        let mut chunk = Chunk::new("WIDE", mono(20.0));
        let overflow = chunk.truncate(5.0).unwrap();
        assert_eq!(chunk.text(), "W");
        assert_eq!(overflow.text(), "IDE");
    }

    #[test]
    fn test_truncate_takes_what_fits() {
        let mut chunk = Chunk::new("abcdef", mono(10.0));
        let overflow = chunk.truncate(35.0).unwrap();
        assert_eq!(chunk.text(), "abc");
        assert_eq!(overflow.text(), "def");
    }

    #[test]
    fn test_oversized_image_is_handed_over() {
        let inline = InlineImage {
            image: Image::new("logo", 300.0, 50.0),
            offset_x: 0.0,
            offset_y: 0.0,
            change_leading: false,
        };
        let mut chunk = Chunk::image(inline, mono(10.0));
        let overflow = chunk.split(100.0).unwrap();
        assert!(overflow.is_image());
        assert!(chunk.is_blank());
    }

    #[test]
    fn test_trim_spaces() {
        let mut chunk = Chunk::new(" word ", mono(10.0));
        assert_eq!(chunk.trim_last_space(), 10.0);
        assert_eq!(chunk.trim_first_space(), 10.0);
        assert_eq!(chunk.text(), "word");

        let mut single = Chunk::new(" ", mono(10.0));
        assert_eq!(single.trim_last_space(), 0.0);
    }

    #[test]
    fn test_width_corrected() {
        let chunk = Chunk::new("a b", mono(10.0));
        assert!((chunk.width_corrected(1.0, 4.0) - 37.0).abs() < 1e-9);
    }
}
