//! Corpus data model, assembler and output writers.
//!
//! A corpus is the ordered collection of [`SentenceRecord`]s produced for one
//! source document. Records are immutable once created; the assembler is the
//! only component that constructs them.

pub mod builder;
pub mod writer;

use serde::{Serialize, Serializer};

pub use builder::CorpusBuilder;
pub use writer::{OutputError, OutputFormat, write_corpus, write_csv, write_jsonl};

/// Kind of source region a chunk (and its sentences) came from.
///
/// Serialized as `text`, `footnote` and `title` to stay compatible with the
/// corpus CSVs consumed downstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionType {
    Body,
    Footnote,
    Title,
}

impl SectionType {
    pub fn as_str(self) -> &'static str {
        match self {
            SectionType::Body => "text",
            SectionType::Footnote => "footnote",
            SectionType::Title => "title",
        }
    }
}

impl Serialize for SectionType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl std::fmt::Display for SectionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Position of a chunk within its source document.
///
/// Which fields are present depends on the input format: TEI chunks carry page
/// numbers and paragraph ids, ALTO chunks carry page labels and block ids,
/// plain text carries nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Locator {
    /// Page number or label. A string because TEI front matter uses roman
    /// numerals.
    pub page: Option<String>,
    /// 1-based line number of the chunk start, when the source records lines.
    pub line: Option<u32>,
    /// Paragraph or block identifier.
    pub paragraph: Option<String>,
}

/// A contiguous span of source text processed as a unit before sentence
/// splitting: a TEI paragraph, one TEI footnote, an ALTO text block, or a
/// whole plain-text file.
#[derive(Debug, Clone)]
pub struct Chunk {
    /// Normalized text content.
    pub text: String,
    pub section: SectionType,
    pub locator: Locator,
    /// Character offset → line number marks, in increasing offset order.
    /// Lets the assembler resolve a line number per sentence; empty when the
    /// source has no line information.
    pub line_marks: Vec<(usize, u32)>,
}

impl Chunk {
    pub fn new(text: impl Into<String>, section: SectionType, locator: Locator) -> Self {
        Self {
            text: text.into(),
            section,
            locator,
            line_marks: Vec::new(),
        }
    }

    /// Line number in effect at character offset `char_pos`.
    ///
    /// Offsets before the first mark resolve to the first mark's line, the way
    /// the first line of a page owns any text preceding its line-begin tag.
    pub fn line_at(&self, char_pos: usize) -> Option<u32> {
        let (_, first) = self.line_marks.first()?;
        let mut line = *first;
        for &(offset, number) in &self.line_marks {
            if offset > char_pos {
                break;
            }
            line = number;
        }
        Some(line)
    }
}

/// One sentence of the corpus with its provenance.
///
/// `start`/`end` are character offsets into the owning chunk's text, never
/// into the whole document. Field order here is the CSV column order.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SentenceRecord {
    pub sentence_id: u64,
    pub text: String,
    pub start: usize,
    pub end: usize,
    pub section_type: SectionType,
    pub page: Option<String>,
    pub line: Option<u32>,
    pub paragraph: Option<String>,
    pub file: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_at_resolves_marks_in_order() {
        let mut chunk = Chunk::new("abcdef", SectionType::Body, Locator::default());
        chunk.line_marks = vec![(0, 3), (4, 4)];
        assert_eq!(chunk.line_at(0), Some(3));
        assert_eq!(chunk.line_at(3), Some(3));
        assert_eq!(chunk.line_at(4), Some(4));
        assert_eq!(chunk.line_at(100), Some(4));
    }

    #[test]
    fn line_at_before_first_mark_uses_first_line() {
        let mut chunk = Chunk::new("abcdef", SectionType::Body, Locator::default());
        chunk.line_marks = vec![(2, 7)];
        assert_eq!(chunk.line_at(0), Some(7));
    }

    #[test]
    fn line_at_without_marks_is_none() {
        let chunk = Chunk::new("abcdef", SectionType::Body, Locator::default());
        assert_eq!(chunk.line_at(0), None);
    }

    #[test]
    fn section_type_labels() {
        assert_eq!(SectionType::Body.as_str(), "text");
        assert_eq!(SectionType::Footnote.as_str(), "footnote");
        assert_eq!(SectionType::Title.as_str(), "title");
    }
}
