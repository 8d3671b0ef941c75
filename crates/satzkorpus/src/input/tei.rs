//! TEI/XML input.
//!
//! Walks the `<p>` paragraph elements of the document body and yields one
//! body chunk per paragraph, then one footnote chunk per `<note
//! type="footnote">`, in document order within each group. Editorial markup
//! (`<add>`, `<label type="mpb">`), tables and footnote reference markers are
//! stripped; `<lb n>` line-begin tags become line marks so the assembler can
//! attach a line number to every sentence; a `<pb n>` inside a paragraph
//! never splits it, so sentences spanning a page boundary stay whole.

use std::fs;
use std::path::Path;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use unicode_normalization::UnicodeNormalization;

use crate::config::CorpusConfig;
use crate::corpus::{Chunk, Locator, SectionType};
use crate::text::FootnoteLabelRules;

use super::{InputError, source_name};

#[derive(Debug)]
pub struct TeiReader {
    file_name: String,
    chunks: Vec<Chunk>,
}

impl TeiReader {
    pub fn open(path: &Path, config: &CorpusConfig) -> Result<Self, InputError> {
        let content = fs::read_to_string(path).map_err(|source| InputError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let chunks =
            parse_tei(&content, &config.footnote_labels).map_err(|source| InputError::Xml {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Self {
            file_name: source_name(path),
            chunks,
        })
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// All body chunks, then all footnote chunks.
    pub fn into_chunks(self) -> Vec<Chunk> {
        self.chunks
    }
}

/// Accumulates normalized chunk text: NFC composition, whitespace runs
/// collapsed to single spaces, no leading or trailing space. Tracks the
/// character length so line marks can be recorded against final offsets.
#[derive(Debug, Default)]
struct TextAccumulator {
    text: String,
    char_len: usize,
    pending_space: bool,
}

impl TextAccumulator {
    fn push_fragment(&mut self, fragment: &str) {
        for ch in fragment.nfc() {
            if ch.is_whitespace() {
                if !self.text.is_empty() {
                    self.pending_space = true;
                }
            } else {
                if self.pending_space {
                    self.text.push(' ');
                    self.char_len += 1;
                    self.pending_space = false;
                }
                self.text.push(ch);
                self.char_len += 1;
            }
        }
    }

    /// Force a word break, the way a line or page boundary does.
    fn push_break(&mut self) {
        if !self.text.is_empty() {
            self.pending_space = true;
        }
    }

    /// Character offset at which the next non-space character will land.
    fn next_offset(&self) -> usize {
        self.char_len + usize::from(self.pending_space)
    }

    fn finish(self) -> String {
        self.text
    }
}

#[derive(Debug)]
struct ParagraphState {
    acc: TextAccumulator,
    marks: Vec<(usize, u32)>,
    page: Option<String>,
    id: String,
}

#[derive(Debug)]
struct NoteState {
    acc: TextAccumulator,
    first_line: Option<u32>,
    page: Option<String>,
}

pub(crate) fn parse_tei(
    xml: &str,
    labels: &FootnoteLabelRules,
) -> Result<Vec<Chunk>, quick_xml::Error> {
    let mut reader = Reader::from_str(xml);

    let mut body_chunks: Vec<Chunk> = Vec::new();
    let mut footnote_chunks: Vec<Chunk> = Vec::new();

    let mut in_text = false;
    // Nesting count of subtrees whose content is excluded.
    let mut skip = 0usize;
    let mut current_page: Option<String> = None;
    let mut paragraph: Option<ParagraphState> = None;
    let mut note: Option<NoteState> = None;
    let mut paragraph_count = 0usize;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                if skip > 0 {
                    skip += 1;
                    continue;
                }
                match e.local_name().as_ref() {
                    b"teiHeader" | b"front" | b"table" | b"figure" => skip = 1,
                    b"add" => skip = 1,
                    b"label" if has_attr_value(&e, b"type", "mpb")? => skip = 1,
                    b"ref" if has_attr_value(&e, b"type", "footnote")? => skip = 1,
                    b"text" => in_text = true,
                    b"note" if in_text && note.is_none() => {
                        if has_attr_value(&e, b"type", "footnote")? {
                            note = Some(NoteState {
                                acc: TextAccumulator::default(),
                                first_line: None,
                                page: current_page.clone(),
                            });
                        }
                    }
                    b"p" if in_text && note.is_none() && paragraph.is_none() => {
                        paragraph_count += 1;
                        let id = attr_value(&e, b"xml:id")?
                            .unwrap_or_else(|| format!("p-{paragraph_count}"));
                        paragraph = Some(ParagraphState {
                            acc: TextAccumulator::default(),
                            marks: Vec::new(),
                            page: current_page.clone(),
                            id,
                        });
                    }
                    b"pb" => handle_pb(&e, &mut current_page)?,
                    b"lb" => handle_lb(&e, &mut paragraph, &mut note)?,
                    _ => {}
                }
            }
            Event::Empty(e) => {
                if skip > 0 {
                    continue;
                }
                match e.local_name().as_ref() {
                    b"pb" => handle_pb(&e, &mut current_page)?,
                    b"lb" => handle_lb(&e, &mut paragraph, &mut note)?,
                    _ => {}
                }
            }
            Event::Text(t) => {
                if skip > 0 {
                    continue;
                }
                let fragment = t.unescape().map_err(quick_xml::Error::from)?;
                if let Some(state) = note.as_mut() {
                    state.acc.push_fragment(&fragment);
                } else if let Some(state) = paragraph.as_mut() {
                    state.acc.push_fragment(&fragment);
                }
            }
            Event::CData(e) => {
                if skip > 0 {
                    continue;
                }
                let fragment = String::from_utf8_lossy(&e.into_inner()).into_owned();
                if let Some(state) = note.as_mut() {
                    state.acc.push_fragment(&fragment);
                } else if let Some(state) = paragraph.as_mut() {
                    state.acc.push_fragment(&fragment);
                }
            }
            Event::End(e) => {
                if skip > 0 {
                    skip -= 1;
                    continue;
                }
                match e.local_name().as_ref() {
                    b"text" => in_text = false,
                    b"note" => {
                        if let Some(state) = note.take() {
                            let raw = state.acc.finish();
                            let stripped = labels.strip(&raw).trim().to_string();
                            if !stripped.is_empty() {
                                footnote_chunks.push(Chunk {
                                    text: stripped,
                                    section: SectionType::Footnote,
                                    locator: Locator {
                                        page: state.page,
                                        line: state.first_line,
                                        paragraph: None,
                                    },
                                    line_marks: Vec::new(),
                                });
                            }
                        }
                    }
                    b"p" => {
                        if note.is_none()
                            && let Some(state) = paragraph.take()
                        {
                            let ParagraphState {
                                acc,
                                marks,
                                page,
                                id,
                            } = state;
                            let text = acc.finish();
                            if !text.is_empty() {
                                body_chunks.push(Chunk {
                                    text,
                                    section: SectionType::Body,
                                    locator: Locator {
                                        page,
                                        line: None,
                                        paragraph: Some(id),
                                    },
                                    line_marks: marks,
                                });
                            }
                        }
                    }
                    _ => {}
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    body_chunks.extend(footnote_chunks);
    Ok(body_chunks)
}

/// A `<pb>` without an edition attribute advances the standard pagination;
/// edition page breaks (manuscript numbering) are ignored.
fn handle_pb(e: &BytesStart<'_>, current_page: &mut Option<String>) -> Result<(), quick_xml::Error> {
    if attr_value(e, b"ed")?.is_some() {
        return Ok(());
    }
    if let Some(number) = attr_value(e, b"n")? {
        *current_page = Some(number);
    }
    Ok(())
}

/// A `<lb n>` starts a new source line: record a line mark at the current
/// paragraph offset, or the first line number of an open footnote.
fn handle_lb(
    e: &BytesStart<'_>,
    paragraph: &mut Option<ParagraphState>,
    note: &mut Option<NoteState>,
) -> Result<(), quick_xml::Error> {
    let number = attr_value(e, b"n")?.and_then(|n| n.parse::<u32>().ok());
    if let Some(state) = note.as_mut() {
        state.acc.push_break();
        if let Some(number) = number {
            state.first_line.get_or_insert(number);
        }
    } else if let Some(state) = paragraph.as_mut() {
        state.acc.push_break();
        if let Some(number) = number {
            let offset = state.acc.next_offset();
            if state.marks.last().is_none_or(|&(o, _)| o != offset) {
                state.marks.push((offset, number));
            }
        }
    }
    Ok(())
}

fn attr_value(e: &BytesStart<'_>, name: &[u8]) -> Result<Option<String>, quick_xml::Error> {
    for attr in e.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        if attr.key.as_ref() == name {
            let value = attr.unescape_value().map_err(quick_xml::Error::from)?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

fn has_attr_value(
    e: &BytesStart<'_>,
    name: &[u8],
    expected: &str,
) -> Result<bool, quick_xml::Error> {
    Ok(attr_value(e, name)?.as_deref() == Some(expected))
}
