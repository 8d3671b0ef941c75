//! Corpus assembly.
//!
//! The builder drives a reader's chunks through the segmenter and turns every
//! sentence span into a [`SentenceRecord`]. Sentence ids are assigned in
//! iteration order, contiguous and strictly increasing from zero across all
//! chunks of the document, so the output order is the id order.

use tracing::debug;

use crate::input::{DocumentReader, InputError};
use crate::segment::SentenceSegmenter;

use super::{Chunk, SentenceRecord};

#[derive(Debug)]
pub struct CorpusBuilder<S> {
    segmenter: S,
    next_id: u64,
}

impl<S: SentenceSegmenter> CorpusBuilder<S> {
    pub fn new(segmenter: S) -> Self {
        Self {
            segmenter,
            next_id: 0,
        }
    }

    /// Assemble the full corpus for one document.
    ///
    /// Any `Err` from the reader is fatal; recoverable page problems were
    /// already handled inside the reader.
    pub fn build(&mut self, reader: DocumentReader) -> Result<Vec<SentenceRecord>, InputError> {
        let file = reader.file_name().to_string();
        let mut records = Vec::new();
        for chunk in reader.chunks() {
            let chunk = chunk?;
            self.append_chunk(&chunk, &file, &mut records);
        }
        debug!(file = %file, sentences = records.len(), "assembled corpus");
        Ok(records)
    }

    /// Segment one chunk and append its sentence records.
    ///
    /// The segmenter works in byte offsets; records carry character offsets
    /// into the chunk text, so spans are converted in a single forward pass.
    pub fn append_chunk(&mut self, chunk: &Chunk, file: &str, records: &mut Vec<SentenceRecord>) {
        let spans = self.segmenter.segment(&chunk.text);
        let mut cursor = CharCursor::new(&chunk.text);
        for span in spans {
            let start = cursor.char_offset(span.start);
            let end = cursor.char_offset(span.end);
            let line = chunk.line_at(start).or(chunk.locator.line);
            records.push(SentenceRecord {
                sentence_id: self.next_id,
                text: span.slice(&chunk.text).to_string(),
                start,
                end,
                section_type: chunk.section,
                page: chunk.locator.page.clone(),
                line,
                paragraph: chunk.locator.paragraph.clone(),
                file: file.to_string(),
            });
            self.next_id += 1;
        }
    }

    /// Id the next sentence will get.
    pub fn next_id(&self) -> u64 {
        self.next_id
    }
}

/// Forward-only byte-to-character offset translator. Spans arrive ordered,
/// so one pass over the text covers every boundary.
struct CharCursor<'a> {
    chars: std::str::Chars<'a>,
    byte: usize,
    count: usize,
}

impl<'a> CharCursor<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            chars: text.chars(),
            byte: 0,
            count: 0,
        }
    }

    /// Character offset of the char starting at byte offset `target`.
    /// `target` values must be non-decreasing across calls.
    fn char_offset(&mut self, target: usize) -> usize {
        while self.byte < target {
            match self.chars.next() {
                Some(ch) => {
                    self.byte += ch.len_utf8();
                    self.count += 1;
                }
                None => break,
            }
        }
        self.count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::{Locator, SectionType};
    use crate::segment::RuleSegmenter;

    fn builder() -> CorpusBuilder<RuleSegmenter> {
        CorpusBuilder::new(RuleSegmenter)
    }

    #[test]
    fn ids_are_contiguous_across_chunks() {
        let mut b = builder();
        let mut records = Vec::new();
        let first = Chunk::new(
            "Erster Satz. Zweiter Satz.",
            SectionType::Body,
            Locator::default(),
        );
        let second = Chunk::new("Dritter Satz.", SectionType::Footnote, Locator::default());
        b.append_chunk(&first, "doc.txt", &mut records);
        b.append_chunk(&second, "doc.txt", &mut records);

        let ids: Vec<u64> = records.iter().map(|r| r.sentence_id).collect();
        assert_eq!(ids, vec![0, 1, 2]);
        assert_eq!(b.next_id(), 3);
        assert_eq!(records[2].section_type, SectionType::Footnote);
    }

    #[test]
    fn offsets_count_characters_not_bytes() {
        let mut b = builder();
        let mut records = Vec::new();
        let chunk = Chunk::new(
            "Die Größe wächst. Das Maß bleibt.",
            SectionType::Body,
            Locator::default(),
        );
        b.append_chunk(&chunk, "doc.txt", &mut records);

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].start, 0);
        assert_eq!(records[0].end, 17);
        assert_eq!(records[1].start, 18);
        assert_eq!(records[1].end, 33);
        assert_eq!(records[1].text, "Das Maß bleibt.");
    }

    #[test]
    fn line_numbers_follow_line_marks() {
        let mut b = builder();
        let mut records = Vec::new();
        let mut chunk = Chunk::new(
            "Erster Satz. Zweiter Satz.",
            SectionType::Body,
            Locator {
                page: Some("12".into()),
                line: None,
                paragraph: Some("p-1".into()),
            },
        );
        chunk.line_marks = vec![(0, 5), (13, 6)];
        b.append_chunk(&chunk, "doc.xml", &mut records);

        assert_eq!(records[0].line, Some(5));
        assert_eq!(records[1].line, Some(6));
        assert_eq!(records[0].page.as_deref(), Some("12"));
        assert_eq!(records[0].paragraph.as_deref(), Some("p-1"));
    }

    #[test]
    fn locator_line_is_the_fallback_without_marks() {
        let mut b = builder();
        let mut records = Vec::new();
        let chunk = Chunk::new(
            "Eine Anmerkung.",
            SectionType::Footnote,
            Locator {
                page: Some("17".into()),
                line: Some(38),
                paragraph: None,
            },
        );
        b.append_chunk(&chunk, "doc.xml", &mut records);
        assert_eq!(records[0].line, Some(38));
    }

    #[test]
    fn empty_chunk_produces_no_records() {
        let mut b = builder();
        let mut records = Vec::new();
        let chunk = Chunk::new("   ", SectionType::Body, Locator::default());
        b.append_chunk(&chunk, "doc.txt", &mut records);
        assert!(records.is_empty());
        assert_eq!(b.next_id(), 0);
    }
}
