//! # BiDi Line Reordering
//!
//! Implements UAX#9 reordering for a finished line. The line's chunks are
//! concatenated in logical order, resolved with `unicode-bidi`, cut into
//! same-level pieces, and the pieces are put into visual order with rule
//! L2. Right-to-left pieces have their characters reversed and paired
//! brackets mirrored, so the sink always receives text left to right.
//!
//! Non-text chunks (images, tabs, separators) take part as a single
//! U+FFFC object replacement character.

use unicode_bidi::{BidiInfo, Level};

use super::chunk::Chunk;

const OBJECT_REPLACEMENT: char = '\u{FFFC}';

/// Reorder a line's chunks from logical into visual order.
pub fn reorder_chunks(chunks: Vec<Chunk>, rtl: bool) -> Vec<Chunk> {
    if chunks.is_empty() {
        return chunks;
    }

    let logical: String = chunks
        .iter()
        .map(|c| {
            if c.is_text() {
                c.text().to_string()
            } else {
                OBJECT_REPLACEMENT.to_string()
            }
        })
        .collect();

    if !rtl && is_pure_ltr(&logical) {
        return chunks;
    }

    let levels = char_levels(&logical, rtl);
    if levels.is_empty() {
        return chunks;
    }

    // Cut the chunks into pieces of a single level.
    let mut pieces: Vec<Chunk> = Vec::new();
    let mut piece_levels: Vec<Level> = Vec::new();
    let mut idx = 0;
    for chunk in chunks {
        if !chunk.is_text() {
            piece_levels.push(levels[idx]);
            pieces.push(chunk);
            idx += 1;
            continue;
        }
        let chars: Vec<char> = chunk.text().chars().collect();
        let mut start = 0;
        while start < chars.len() {
            let level = levels[idx + start];
            let mut end = start + 1;
            while end < chars.len() && levels[idx + end] == level {
                end += 1;
            }
            let text: String = if level.is_rtl() {
                chars[start..end].iter().rev().map(|&c| mirror(c)).collect()
            } else {
                chars[start..end].iter().collect()
            };
            pieces.push(chunk.with_text(text));
            piece_levels.push(level);
            start = end;
        }
        idx += chars.len();
    }

    reorder_by_levels(pieces, &piece_levels)
}

/// Resolved embedding level of every char of a single line.
fn char_levels(text: &str, rtl: bool) -> Vec<Level> {
    let para_level = if rtl { Level::rtl() } else { Level::ltr() };
    let bidi_info = BidiInfo::new(text, Some(para_level));

    let byte_levels = match bidi_info.paragraphs.as_slice() {
        [paragraph] => bidi_info.reordered_levels(paragraph, paragraph.range.clone()),
        _ => bidi_info.levels.clone(),
    };

    text.char_indices()
        .map(|(byte_idx, _)| byte_levels.get(byte_idx).copied().unwrap_or(para_level))
        .collect()
}

/// Check if text is purely LTR (no RTL characters at all).
pub fn is_pure_ltr(text: &str) -> bool {
    !text.chars().any(is_rtl_char)
}

/// Check if a character has an RTL BiDi class (R, AL, or AN).
fn is_rtl_char(ch: char) -> bool {
    matches!(ch,
        '\u{0590}'..='\u{05FF}' |  // Hebrew
        '\u{0600}'..='\u{06FF}' |  // Arabic
        '\u{0700}'..='\u{074F}' |  // Syriac
        '\u{0750}'..='\u{077F}' |  // Arabic Supplement
        '\u{0780}'..='\u{07BF}' |  // Thaana
        '\u{07C0}'..='\u{07FF}' |  // NKo
        '\u{08A0}'..='\u{08FF}' |  // Arabic Extended-A
        '\u{FB1D}'..='\u{FB4F}' |  // Hebrew Presentation Forms
        '\u{FB50}'..='\u{FDFF}' |  // Arabic Presentation Forms-A
        '\u{FE70}'..='\u{FEFF}' |  // Arabic Presentation Forms-B
        '\u{10800}'..='\u{10FFF}' |
        '\u{1E800}'..='\u{1EEFF}' |
        '\u{200F}' | '\u{202B}' | '\u{202E}' | '\u{2067}'
    )
}

/// Mirrored glyph for paired punctuation inside right-to-left runs.
fn mirror(ch: char) -> char {
    match ch {
        '(' => ')',
        ')' => '(',
        '[' => ']',
        ']' => '[',
        '{' => '}',
        '}' => '{',
        '<' => '>',
        '>' => '<',
        '\u{AB}' => '\u{BB}',
        '\u{BB}' => '\u{AB}',
        other => other,
    }
}

/// Rule L2: from the highest level down to the lowest odd level, reverse
/// every contiguous run of items at that level or higher.
pub fn reorder_by_levels<T>(mut items: Vec<T>, levels: &[Level]) -> Vec<T> {
    if items.is_empty() || levels.len() != items.len() {
        return items;
    }

    let min_level = levels.iter().copied().min().unwrap_or(Level::ltr());
    let max_level = levels.iter().copied().max().unwrap_or(Level::ltr());
    if !max_level.is_rtl() {
        return items;
    }

    let min_odd = if min_level.is_rtl() {
        min_level
    } else {
        Level::rtl()
    };

    let mut current_level = max_level;
    while current_level >= min_odd {
        let mut i = 0;
        while i < items.len() {
            if levels[i] >= current_level {
                let start = i;
                while i < items.len() && levels[i] >= current_level {
                    i += 1;
                }
                items[start..i].reverse();
            } else {
                i += 1;
            }
        }
        if current_level.number() == 0 {
            break;
        }
        current_level = Level::new(current_level.number() - 1).unwrap_or(Level::ltr());
    }

    items
}
