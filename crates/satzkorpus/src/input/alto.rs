//! ALTO/XML input.
//!
//! An ALTO source is either a zip archive with one OCR'd page per XML member
//! or a single bare page file. Pages are processed in natural sort order of
//! their file names (`page_2` before `page_10`) regardless of archive layout,
//! and parsed lazily one page at a time. A page that fails to parse is logged
//! and skipped; only an archive with no readable page at all is an error.
//!
//! Each `TextBlock` becomes one chunk. Block tags (resolved through the
//! `<Tags>` section) decide admission and section type against the configured
//! allow-list; blocks without any tag count as `untagged`.

use std::collections::{HashMap, VecDeque};
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use thiserror::Error;
use zip::ZipArchive;

use crate::config::CorpusConfig;
use crate::corpus::{Chunk, Locator, SectionType};
use crate::text::normalize_chunk_text;

use super::{InputError, source_name};

#[derive(Debug)]
pub struct AltoReader {
    file_name: String,
    path: PathBuf,
    source: AltoSource,
    allowed_tags: Vec<String>,
}

#[derive(Debug)]
enum AltoSource {
    /// Archive handle plus its XML member names in processing order.
    Zip {
        archive: ZipArchive<fs::File>,
        members: Vec<String>,
    },
    /// A single page file outside any archive.
    SinglePage { content: String, page_name: String },
}

impl AltoReader {
    pub fn open(path: &Path, config: &CorpusConfig) -> Result<Self, InputError> {
        let is_archive = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("zip"));

        let source = if is_archive {
            let file = fs::File::open(path).map_err(|source| InputError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            let archive = ZipArchive::new(file).map_err(|source| InputError::Archive {
                path: path.to_path_buf(),
                source,
            })?;
            let members = xml_members(&archive);
            if members.is_empty() {
                return Err(InputError::EmptyArchive {
                    path: path.to_path_buf(),
                });
            }
            AltoSource::Zip { archive, members }
        } else {
            let content = fs::read_to_string(path).map_err(|source| InputError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            AltoSource::SinglePage {
                content,
                page_name: page_name(path.to_string_lossy().as_ref()),
            }
        };

        Ok(Self {
            file_name: source_name(path),
            path: path.to_path_buf(),
            source,
            allowed_tags: config.allowed_tags.clone(),
        })
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn into_chunks(self) -> AltoChunks {
        let (archive, members, single) = match self.source {
            AltoSource::Zip { archive, members } => {
                (Some(archive), members.into_iter(), None)
            }
            AltoSource::SinglePage { content, page_name } => {
                (None, Vec::new().into_iter(), Some((content, page_name)))
            }
        };
        AltoChunks {
            path: self.path,
            archive,
            members,
            single,
            allowed_tags: self.allowed_tags,
            queue: VecDeque::new(),
            pending_footnotes: Vec::new(),
            pages_ok: 0,
            finished: false,
        }
    }
}

/// Lazy page-by-page chunk iterator; body chunks of all pages come first,
/// footnote chunks are held back and yielded after the last page.
#[derive(Debug)]
pub struct AltoChunks {
    path: PathBuf,
    archive: Option<ZipArchive<fs::File>>,
    members: std::vec::IntoIter<String>,
    single: Option<(String, String)>,
    allowed_tags: Vec<String>,
    queue: VecDeque<Chunk>,
    pending_footnotes: Vec<Chunk>,
    pages_ok: usize,
    finished: bool,
}

impl AltoChunks {
    fn ingest_page(&mut self, content: &str, page: &str) {
        match parse_alto_page(content, page, &self.allowed_tags) {
            Ok(parsed) => {
                self.pages_ok += 1;
                self.queue.extend(parsed.body);
                self.pending_footnotes.extend(parsed.footnotes);
            }
            Err(error) => {
                tracing::warn!(page = %page, %error, "skipping unreadable page");
            }
        }
    }

    fn next_member(&mut self) -> Option<()> {
        if let Some((content, page)) = self.single.take() {
            self.ingest_page(&content, &page);
            return Some(());
        }
        let name = self.members.next()?;
        let archive = self.archive.as_mut()?;
        let mut content = String::new();
        match archive.by_name(&name) {
            Ok(mut member) => {
                if let Err(error) = member.read_to_string(&mut content) {
                    tracing::warn!(page = %name, %error, "skipping unreadable page");
                    return Some(());
                }
            }
            Err(error) => {
                tracing::warn!(page = %name, %error, "skipping unreadable page");
                return Some(());
            }
        }
        let page = page_name(&name);
        self.ingest_page(&content, &page);
        Some(())
    }
}

impl Iterator for AltoChunks {
    type Item = Result<Chunk, InputError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(chunk) = self.queue.pop_front() {
                return Some(Ok(chunk));
            }
            if self.finished {
                return None;
            }
            if self.next_member().is_none() {
                self.finished = true;
                if self.pages_ok == 0 {
                    return Some(Err(InputError::NoReadablePages {
                        path: self.path.clone(),
                    }));
                }
                self.queue.extend(self.pending_footnotes.drain(..));
            }
        }
    }
}

/// XML member names of the archive in natural sort order, ignoring
/// directories and resource-fork noise.
fn xml_members(archive: &ZipArchive<fs::File>) -> Vec<String> {
    let mut members: Vec<String> = archive
        .file_names()
        .filter(|name| {
            let base = name.rsplit('/').next().unwrap_or(name);
            !base.is_empty()
                && !base.starts_with('.')
                && !name.starts_with("__MACOSX")
                && base.to_ascii_lowercase().ends_with(".xml")
        })
        .map(|name| name.to_string())
        .collect();
    members.sort_by(|a, b| natord::compare(a, b));
    members
}

/// Page identifier from a member or file name: base name without extension.
fn page_name(name: &str) -> String {
    let base = name.rsplit('/').next().unwrap_or(name);
    base.strip_suffix(".xml")
        .or_else(|| base.strip_suffix(".XML"))
        .unwrap_or(base)
        .to_string()
}

#[derive(Debug, Error)]
enum PageError {
    #[error("{0}")]
    Xml(#[from] quick_xml::Error),
    #[error("root element is not <alto>")]
    NotAlto,
}

#[derive(Debug, Default)]
struct ParsedPage {
    body: Vec<Chunk>,
    footnotes: Vec<Chunk>,
}

#[derive(Debug, Default)]
struct RawBlock {
    id: Option<String>,
    tagrefs: Option<String>,
    words: Vec<String>,
}

fn parse_alto_page(
    xml: &str,
    page: &str,
    allowed_tags: &[String],
) -> Result<ParsedPage, PageError> {
    let mut reader = Reader::from_str(xml);

    let mut root_seen = false;
    let mut tag_labels: HashMap<String, String> = HashMap::new();
    let mut blocks: Vec<RawBlock> = Vec::new();
    let mut current: Option<RawBlock> = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) => {
                if !root_seen {
                    if e.local_name().as_ref() != b"alto" {
                        return Err(PageError::NotAlto);
                    }
                    root_seen = true;
                    continue;
                }
                match e.local_name().as_ref() {
                    name if name.ends_with(b"Tag") => {
                        if let (Some(id), Some(label)) =
                            (attr_value(&e, b"ID")?, attr_value(&e, b"LABEL")?)
                        {
                            tag_labels.insert(id, label);
                        }
                    }
                    b"TextBlock" => {
                        current = Some(RawBlock {
                            id: attr_value(&e, b"ID")?,
                            tagrefs: attr_value(&e, b"TAGREFS")?,
                            words: Vec::new(),
                        });
                    }
                    b"String" => {
                        if let Some(block) = current.as_mut()
                            && let Some(content) = attr_value(&e, b"CONTENT")?
                        {
                            block.words.push(content);
                        }
                    }
                    _ => {}
                }
            }
            Event::End(e) => {
                if e.local_name().as_ref() == b"TextBlock"
                    && let Some(block) = current.take()
                {
                    blocks.push(block);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !root_seen {
        return Err(PageError::NotAlto);
    }

    let mut parsed = ParsedPage::default();
    for block in blocks {
        let Some(section) = classify_block(&block, &tag_labels, allowed_tags) else {
            continue;
        };
        let text = normalize_chunk_text(&block.words.join(" "));
        if text.is_empty() {
            continue;
        }
        let chunk = Chunk::new(
            text,
            section,
            Locator {
                page: Some(page.to_string()),
                line: None,
                paragraph: block.id,
            },
        );
        match section {
            SectionType::Footnote => parsed.footnotes.push(chunk),
            _ => parsed.body.push(chunk),
        }
    }
    Ok(parsed)
}

/// Resolve a block's tag references against the allow-list. Returns `None`
/// for blocks that must not enter the corpus.
fn classify_block(
    block: &RawBlock,
    tag_labels: &HashMap<String, String>,
    allowed_tags: &[String],
) -> Option<SectionType> {
    let allowed = |label: &str| {
        let label = label.to_lowercase();
        allowed_tags.iter().any(|t| *t == label)
    };

    let labels: Vec<&String> = block
        .tagrefs
        .as_deref()
        .unwrap_or("")
        .split_whitespace()
        .filter_map(|id| tag_labels.get(id))
        .collect();

    if labels.is_empty() {
        return allowed("untagged").then_some(SectionType::Body);
    }
    let label = labels.iter().find(|label| allowed(label))?;
    Some(match label.to_lowercase().as_str() {
        "footnote" => SectionType::Footnote,
        "title" => SectionType::Title,
        _ => SectionType::Body,
    })
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
