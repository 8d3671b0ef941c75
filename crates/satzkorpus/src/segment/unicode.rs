//! UAX #29 sentence-boundary backend.
//!
//! Faster and language-agnostic, but blind to abbreviations, so it oversplits
//! around `z. B.` and friends. Useful as a baseline and for non-German
//! sources.

use unicode_segmentation::UnicodeSegmentation;

use super::{SentenceSegmenter, SentenceSpan, trim_span};

#[derive(Debug, Default)]
pub struct UnicodeSegmenter;

impl SentenceSegmenter for UnicodeSegmenter {
    fn segment(&self, text: &str) -> Vec<SentenceSpan> {
        text.split_sentence_bound_indices()
            .filter_map(|(offset, sentence)| trim_span(text, offset, offset + sentence.len()))
            .collect()
    }
}
