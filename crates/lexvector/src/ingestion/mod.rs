//! Document ingestion: text normalization and chunking

pub mod chunker;
pub mod extract;

pub use chunker::TextChunker;
pub use extract::{normalize_text, read_source, source_label_for};
