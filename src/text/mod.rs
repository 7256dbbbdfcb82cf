//! # Text
//!
//! The leaf of the layout pipeline: styled [`Chunk`]s are packed into
//! [`PdfLine`]s by the [`LineFeeder`], which also applies bidi reordering
//! to each finished line.
//!
//! ```text
//!   chunks ──▶ LineFeeder ──▶ PdfLine::add ──▶ Chunk::split / truncate
//!                 │                                 │
//!                 └── save / restore ◀── overflow ──┘
//! ```
//!
//! Break opportunities come from UAX #14 and hyphenation from `hypher`.

pub mod bidi;
pub mod chunk;
pub mod feeder;
pub mod line;

pub use chunk::{Chunk, ChunkKind, InlineImage, Separator, TabStop};
pub use feeder::LineFeeder;
pub use line::PdfLine;

use unicode_linebreak::{linebreaks, BreakOpportunity};

/// For every char of `text`, whether a line may break right after it.
///
/// Mandatory breaks are reported as allowed too; explicit newlines are
/// handled by the chunk splitter before this table is consulted. The
/// break at the very end of the text is not included.
pub(crate) fn break_after_positions(text: &str) -> Vec<bool> {
    let char_count = text.chars().count();
    let mut result = vec![false; char_count];

    // linebreaks() yields the byte offset of the char *after* the break.
    let mut byte_to_char = vec![0usize; text.len() + 1];
    for (char_idx, (byte_idx, _)) in text.char_indices().enumerate() {
        byte_to_char[byte_idx] = char_idx;
    }
    byte_to_char[text.len()] = char_count;

    for (byte_offset, opp) in linebreaks(text) {
        let char_idx = byte_to_char[byte_offset];
        if char_idx > 0 && char_idx < char_count {
            match opp {
                BreakOpportunity::Allowed | BreakOpportunity::Mandatory => {
                    result[char_idx - 1] = true;
                }
            }
        }
    }

    result
}

/// Map a BCP 47 language tag to a `hypher::Lang`.
///
/// Returns `None` for languages without patterns, which disables
/// hyphenation for the chunk.
pub(crate) fn resolve_hyphenation_lang(tag: &str) -> Option<hypher::Lang> {
    let primary = tag.split('-').next().unwrap_or(tag).to_lowercase();
    match primary.as_str() {
        "af" => Some(hypher::Lang::Afrikaans),
        "ca" => Some(hypher::Lang::Catalan),
        "cs" => Some(hypher::Lang::Czech),
        "da" => Some(hypher::Lang::Danish),
        "nl" => Some(hypher::Lang::Dutch),
        "en" => Some(hypher::Lang::English),
        "fi" => Some(hypher::Lang::Finnish),
        "fr" => Some(hypher::Lang::French),
        "de" => Some(hypher::Lang::German),
        "el" => Some(hypher::Lang::Greek),
        "hu" => Some(hypher::Lang::Hungarian),
        "it" => Some(hypher::Lang::Italian),
        "la" => Some(hypher::Lang::Latin),
        "nb" | "nn" | "no" => Some(hypher::Lang::Norwegian),
        "pl" => Some(hypher::Lang::Polish),
        "pt" => Some(hypher::Lang::Portuguese),
        "ru" => Some(hypher::Lang::Russian),
        "es" => Some(hypher::Lang::Spanish),
        "sv" => Some(hypher::Lang::Swedish),
        "tr" => Some(hypher::Lang::Turkish),
        "uk" => Some(hypher::Lang::Ukrainian),
        _ => None,
    }
}

/// Find the longest syllable prefix of `word` that, followed by a hyphen,
/// fits in `available`. Returns `(prefix_with_hyphen, remainder)`.
pub(crate) fn hyphenate_to_fit(
    word: &str,
    lang: hypher::Lang,
    available: f64,
    advance: impl Fn(char) -> f64,
) -> Option<(String, String)> {
    let syllables: Vec<&str> = hypher::hyphenate(word, lang).collect();
    if syllables.len() < 2 {
        return None;
    }

    let hyphen = advance('-');
    let mut best = None;
    let mut prefix_width = 0.0;
    for (i, syllable) in syllables[..syllables.len() - 1].iter().enumerate() {
        prefix_width += syllable.chars().map(&advance).sum::<f64>();
        if prefix_width + hyphen <= available {
            best = Some(i + 1);
        } else {
            break;
        }
    }

    let taken = best?;
    let mut head: String = syllables[..taken].concat();
    head.push('-');
    let tail: String = syllables[taken..].concat();
    Some((head, tail))
}
