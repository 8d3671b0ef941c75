//! Normalization applied to chunk text before sentence splitting.

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

/// Collapse every whitespace run (including line breaks) to a single space
/// and trim the ends.
pub fn collapse_whitespace(input: &str) -> String {
    input.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Standard normalization for reader-assembled chunk text: NFC composition
/// plus whitespace collapsing. NFC rather than NFKC so historical glyph
/// distinctions (long s, ligatures) survive into the corpus.
pub fn normalize_chunk_text(input: &str) -> String {
    collapse_whitespace(&input.nfc().collect::<String>())
}

/// Compiled footnote-label patterns.
///
/// Historical typesetting marks footnotes with tokens like `1)` or `*)` at
/// the start of the note body. Which tokens appear varies by source, so the
/// patterns come from configuration instead of being hardcoded.
#[derive(Debug)]
pub struct FootnoteLabelRules {
    patterns: Vec<Regex>,
}

impl FootnoteLabelRules {
    /// Default pattern set: an arabic-numeral label like `1)`.
    pub const DEFAULT_PATTERNS: &'static [&'static str] = &[r"^\s*\d+\s*\)\s*"];

    /// Compile patterns; every pattern must anchor at the start of the note.
    pub fn compile<S: AsRef<str>>(patterns: &[S]) -> Result<Self, regex::Error> {
        let patterns = patterns
            .iter()
            .map(|p| Regex::new(p.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    /// Remove the first matching label from the start of `text`.
    pub fn strip<'a>(&self, text: &'a str) -> &'a str {
        for pattern in &self.patterns {
            if let Some(found) = pattern.find(text)
                && found.start() == 0
            {
                return &text[found.end()..];
            }
        }
        text
    }
}

impl Default for FootnoteLabelRules {
    fn default() -> Self {
        Self::compile(Self::DEFAULT_PATTERNS).expect("default footnote label patterns compile")
    }
}
