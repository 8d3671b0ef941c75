//! Format-specific input readers.
//!
//! Every reader satisfies the same contract: an ordered, finite sequence of
//! [`Chunk`]s for one source file, body chunks strictly before footnote
//! chunks. The closed [`DocumentReader`] variant set is produced by a factory
//! keyed on file extension with XML content sniffing, so callers never deal
//! with format-specific types.

pub mod alto;
pub mod tei;
pub mod text;

use std::fmt;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::CorpusConfig;
use crate::corpus::Chunk;

pub use alto::AltoReader;
pub use tei::TeiReader;
pub use text::TextReader;

#[derive(Debug, Error)]
pub enum InputError {
    #[error("{path} is not a supported input type")]
    UnsupportedFormat { path: PathBuf },
    #[error("failed to read input file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path} as XML: {source}")]
    Xml {
        path: PathBuf,
        #[source]
        source: quick_xml::Error,
    },
    #[error("failed to open archive {path}: {source}")]
    Archive {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },
    #[error("archive {path} does not contain any XML page files")]
    EmptyArchive { path: PathBuf },
    #[error("no readable ALTO pages in {path}")]
    NoReadablePages { path: PathBuf },
}

/// Supported input formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    PlainText,
    Tei,
    Alto,
}

impl InputFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            InputFormat::PlainText => "text",
            InputFormat::Tei => "tei",
            InputFormat::Alto => "alto",
        }
    }

    /// Format descriptions for the `formats` subcommand.
    pub fn descriptions() -> &'static [(&'static str, &'static str)] {
        &[
            (".txt", "plain text, whole file as one chunk"),
            (".xml", "TEI/XML document, or a single ALTO page"),
            (".zip", "archive of per-page ALTO XML files"),
        ]
    }
}

impl fmt::Display for InputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Closed set of input readers, one variant per supported format.
#[derive(Debug)]
pub enum DocumentReader {
    PlainText(TextReader),
    Tei(TeiReader),
    Alto(AltoReader),
}

impl DocumentReader {
    /// Open `path` with the format detected from its extension, sniffing XML
    /// content to tell TEI from a bare ALTO page.
    pub fn open(path: &Path, config: &CorpusConfig) -> Result<Self, InputError> {
        let format = detect_format(path)?;
        Self::open_as(path, format, config)
    }

    /// Open `path` as an explicitly chosen format, bypassing detection.
    pub fn open_as(
        path: &Path,
        format: InputFormat,
        config: &CorpusConfig,
    ) -> Result<Self, InputError> {
        match format {
            InputFormat::PlainText => Ok(DocumentReader::PlainText(TextReader::open(path)?)),
            InputFormat::Tei => Ok(DocumentReader::Tei(TeiReader::open(path, config)?)),
            InputFormat::Alto => Ok(DocumentReader::Alto(AltoReader::open(path, config)?)),
        }
    }

    /// Source file name attached to every sentence record.
    pub fn file_name(&self) -> &str {
        match self {
            DocumentReader::PlainText(r) => r.file_name(),
            DocumentReader::Tei(r) => r.file_name(),
            DocumentReader::Alto(r) => r.file_name(),
        }
    }

    pub fn format(&self) -> InputFormat {
        match self {
            DocumentReader::PlainText(_) => InputFormat::PlainText,
            DocumentReader::Tei(_) => InputFormat::Tei,
            DocumentReader::Alto(_) => InputFormat::Alto,
        }
    }

    /// Consume the reader and iterate its chunks in corpus order.
    ///
    /// Recoverable problems (a malformed page inside an archive) are logged
    /// and skipped by the reader itself; any `Err` yielded here is fatal.
    pub fn chunks(self) -> ChunkIter {
        match self {
            DocumentReader::PlainText(r) => ChunkIter::Eager(r.into_chunks().into_iter()),
            DocumentReader::Tei(r) => ChunkIter::Eager(r.into_chunks().into_iter()),
            DocumentReader::Alto(r) => ChunkIter::Alto(r.into_chunks()),
        }
    }
}

/// Iterator over a reader's chunks.
#[derive(Debug)]
pub enum ChunkIter {
    /// Fully parsed at open time (plain text, TEI).
    Eager(std::vec::IntoIter<Chunk>),
    /// Parsed page by page while iterating.
    Alto(alto::AltoChunks),
}

impl Iterator for ChunkIter {
    type Item = Result<Chunk, InputError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            ChunkIter::Eager(inner) => inner.next().map(Ok),
            ChunkIter::Alto(inner) => inner.next(),
        }
    }
}

fn detect_format(path: &Path) -> Result<InputFormat, InputError> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());
    match extension.as_deref() {
        Some("txt") => Ok(InputFormat::PlainText),
        Some("zip") => Ok(InputFormat::Alto),
        Some("xml") => match sniff_xml_root(path)?.as_str() {
            "TEI" | "TEI.2" => Ok(InputFormat::Tei),
            "alto" => Ok(InputFormat::Alto),
            _ => Err(InputError::UnsupportedFormat {
                path: path.to_path_buf(),
            }),
        },
        _ => Err(InputError::UnsupportedFormat {
            path: path.to_path_buf(),
        }),
    }
}

/// Local name of the root element, read from the first few KiB of the file.
fn sniff_xml_root(path: &Path) -> Result<String, InputError> {
    let mut head = Vec::with_capacity(8 * 1024);
    let file = fs::File::open(path).map_err(|source| InputError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    file.take(8 * 1024)
        .read_to_end(&mut head)
        .map_err(|source| InputError::Io {
            path: path.to_path_buf(),
            source,
        })?;

    let text = String::from_utf8_lossy(&head);
    let mut reader = quick_xml::Reader::from_str(&text);
    loop {
        use quick_xml::events::Event;
        match reader.read_event() {
            Ok(Event::Start(e) | Event::Empty(e)) => {
                return Ok(String::from_utf8_lossy(e.local_name().as_ref()).into_owned());
            }
            Ok(Event::Eof) => {
                return Err(InputError::UnsupportedFormat {
                    path: path.to_path_buf(),
                });
            }
            // Truncating mid-token is expected when the root has not been
            // reached; treat parse failures in the head as unsupported.
            Err(_) => {
                return Err(InputError::UnsupportedFormat {
                    path: path.to_path_buf(),
                });
            }
            Ok(_) => {}
        }
    }
}

/// File name (without directories) used as the source identifier.
pub(crate) fn source_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn detects_plain_text_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        fs::write(&path, "some text").unwrap();
        assert_eq!(detect_format(&path).unwrap(), InputFormat::PlainText);
    }

    #[test]
    fn detects_zip_as_alto() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pages.zip");
        fs::write(&path, b"PK").unwrap();
        assert_eq!(detect_format(&path).unwrap(), InputFormat::Alto);
    }

    #[test]
    fn sniffs_tei_root() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.xml");
        let mut f = fs::File::create(&path).unwrap();
        writeln!(f, r#"<?xml version="1.0"?>"#).unwrap();
        writeln!(f, r#"<TEI xmlns="http://www.tei-c.org/ns/1.0"><text/></TEI>"#).unwrap();
        assert_eq!(detect_format(&path).unwrap(), InputFormat::Tei);
    }

    #[test]
    fn sniffs_bare_alto_page() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page.xml");
        fs::write(
            &path,
            r#"<alto xmlns="http://www.loc.gov/standards/alto/ns-v4#"><Layout/></alto>"#,
        )
        .unwrap();
        assert_eq!(detect_format(&path).unwrap(), InputFormat::Alto);
    }

    #[test]
    fn unknown_extension_is_unsupported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.pdf");
        fs::write(&path, "%PDF").unwrap();
        assert!(matches!(
            detect_format(&path),
            Err(InputError::UnsupportedFormat { .. })
        ));
    }

    #[test]
    fn unknown_xml_root_is_unsupported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.xml");
        fs::write(&path, "<root><child/></root>").unwrap();
        assert!(matches!(
            detect_format(&path),
            Err(InputError::UnsupportedFormat { .. })
        ));
    }
}
