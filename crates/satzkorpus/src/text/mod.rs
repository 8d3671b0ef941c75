//! Pure text utilities shared by the input readers.
//!
//! Everything here is side-effect free so readers and tests can compose these
//! helpers without hidden IO or state.

pub mod cleanup;

pub use cleanup::{FootnoteLabelRules, collapse_whitespace, normalize_chunk_text};
