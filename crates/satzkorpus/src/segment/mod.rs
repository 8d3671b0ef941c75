//! Sentence segmentation strategies.
//!
//! Segmentation is a replaceable strategy behind [`SentenceSegmenter`]: the
//! corpus assembler only relies on spans being ordered, non-overlapping,
//! trimmed and deterministic for a fixed backend. Backends trade speed for
//! accuracy; both are pure functions of the input text.

pub mod rules;
pub mod unicode;

pub use rules::RuleSegmenter;
pub use unicode::UnicodeSegmenter;

/// Byte span of one sentence within the text handed to the segmenter.
///
/// Spans never include surrounding whitespace and are never empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SentenceSpan {
    pub start: usize,
    pub end: usize,
}

impl SentenceSpan {
    pub fn slice<'a>(&self, text: &'a str) -> &'a str {
        &text[self.start..self.end]
    }
}

/// Strategy contract for splitting chunk text into sentences.
pub trait SentenceSegmenter {
    /// Split `text` into ordered, non-overlapping sentence spans.
    fn segment(&self, text: &str) -> Vec<SentenceSpan>;
}

/// Closed set of available backends, selected at startup.
#[derive(Debug)]
pub enum Segmenter {
    Rules(RuleSegmenter),
    Unicode(UnicodeSegmenter),
}

impl Segmenter {
    /// Look up a backend by its configuration name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "rules" => Some(Segmenter::Rules(RuleSegmenter)),
            "unicode" => Some(Segmenter::Unicode(UnicodeSegmenter)),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Segmenter::Rules(_) => "rules",
            Segmenter::Unicode(_) => "unicode",
        }
    }
}

impl SentenceSegmenter for Segmenter {
    fn segment(&self, text: &str) -> Vec<SentenceSpan> {
        match self {
            Segmenter::Rules(inner) => inner.segment(text),
            Segmenter::Unicode(inner) => inner.segment(text),
        }
    }
}

/// Shrink a raw span to exclude leading and trailing whitespace.
/// Returns `None` when nothing but whitespace remains.
pub(crate) fn trim_span(text: &str, start: usize, end: usize) -> Option<SentenceSpan> {
    let raw = &text[start..end];
    let trimmed = raw.trim_start();
    let lead = raw.len() - trimmed.len();
    let trimmed = trimmed.trim_end();
    if trimmed.is_empty() {
        return None;
    }
    Some(SentenceSpan {
        start: start + lead,
        end: start + lead + trimmed.len(),
    })
}
