//! Plain-text input: the whole file is one body chunk.

use std::fs;
use std::path::Path;

use crate::corpus::{Chunk, Locator, SectionType};

use super::{InputError, source_name};

#[derive(Debug)]
pub struct TextReader {
    file_name: String,
    content: String,
}

impl TextReader {
    pub fn open(path: &Path) -> Result<Self, InputError> {
        let content = fs::read_to_string(path).map_err(|source| InputError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self {
            file_name: source_name(path),
            content,
        })
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// One chunk with the file's content as-is; offsets in the corpus then
    /// match offsets in the file. Blank files produce no chunks.
    pub fn into_chunks(self) -> Vec<Chunk> {
        if self.content.trim().is_empty() {
            return Vec::new();
        }
        vec![Chunk::new(
            self.content,
            SectionType::Body,
            Locator::default(),
        )]
    }
}
