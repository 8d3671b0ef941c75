//! Corpus output writers.
//!
//! Two formats over the same record stream: CSV with a header row, and JSON
//! Lines with one object per record. Both write records in id order and are
//! byte-for-byte deterministic for the same input.

use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::SentenceRecord;

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write CSV record: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to write JSON record: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Csv,
    Jsonl,
}

impl OutputFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Jsonl => "jsonl",
        }
    }

    /// Infer the format from an output path's extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .as_deref()
        {
            Some("csv") => Some(OutputFormat::Csv),
            Some("jsonl") | Some("ndjson") => Some(OutputFormat::Jsonl),
            _ => None,
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Write the corpus to `path` in the given format.
pub fn write_corpus(
    path: &Path,
    format: OutputFormat,
    records: &[SentenceRecord],
) -> Result<(), OutputError> {
    let file = fs::File::create(path).map_err(|source| OutputError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut out = BufWriter::new(file);
    match format {
        OutputFormat::Csv => write_csv(&mut out, records)?,
        OutputFormat::Jsonl => write_jsonl(&mut out, records)?,
    }
    out.flush().map_err(|source| OutputError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Column names, matching [`SentenceRecord`]'s field order.
const CSV_HEADER: [&str; 9] = [
    "sentence_id",
    "text",
    "start",
    "end",
    "section_type",
    "page",
    "line",
    "paragraph",
    "file",
];

/// CSV with a header row; record field order is the column order, absent
/// locator fields stay empty. The header is written even when the corpus
/// has no sentences.
pub fn write_csv<W: Write>(writer: W, records: &[SentenceRecord]) -> Result<(), OutputError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    // serialize only emits the header alongside the first record
    if records.is_empty() {
        csv_writer.write_record(CSV_HEADER)?;
    }
    for record in records {
        csv_writer.serialize(record)?;
    }
    csv_writer.flush().map_err(csv::Error::from)?;
    Ok(())
}

/// JSON Lines: one object per record, absent locator fields as `null`.
pub fn write_jsonl<W: Write>(mut writer: W, records: &[SentenceRecord]) -> Result<(), OutputError> {
    for record in records {
        serde_json::to_writer(&mut writer, record)?;
        writer
            .write_all(b"\n")
            .map_err(|source| OutputError::Json(serde_json::Error::io(source)))?;
    }
    Ok(())
}
