//! Sentence corpus builder for historical text collections.
//!
//! Takes one source document (plain text, TEI/XML, or zipped ALTO/XML
//! pages), splits it into sentences and writes a corpus file where every
//! sentence carries a stable id, its offsets and its source location.

pub mod cli;
pub mod config;
pub mod corpus;
pub mod error;
pub mod input;
pub mod segment;
pub mod text;
