//! Chunk and vector-store types with provenance metadata

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A bounded segment of source text with stable offsets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    /// Sequential id, assigned only to emitted chunks (no gaps)
    pub id: u32,
    /// Trimmed, non-empty text content
    pub text: String,
    /// Byte offset of the chunk start in the normalized source text
    pub start: usize,
    /// Byte offset one past the chunk end
    pub end: usize,
    /// Label identifying the origin document
    pub source_label: String,
}

/// Provenance metadata for a persisted store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreMetadata {
    /// Human-readable source document name
    pub source_name: String,
    /// Number of chunks actually persisted
    pub total_chunks: usize,
    /// Chunks dropped because their embedding request failed
    #[serde(default)]
    pub dropped_chunks: usize,
    /// Embedding model that produced the vectors
    #[serde(default)]
    pub model: String,
    /// SHA-256 hash of the normalized source text
    #[serde(default)]
    pub content_hash: String,
    /// Generation timestamp
    pub generated_at: DateTime<Utc>,
}

/// The persisted pairing of chunks with their embeddings
///
/// Assembled fully in memory once per pipeline run and written in a single
/// atomic operation. Invariant: `chunks.len() == embeddings.len()` and
/// `embeddings[i]` corresponds to `chunks[i]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorStore {
    pub chunks: Vec<Chunk>,
    pub embeddings: Vec<Vec<f32>>,
    pub metadata: StoreMetadata,
}

impl VectorStore {
    /// Number of persisted chunk/embedding pairs
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Returns `true` when the store holds no chunks
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Check the chunk/embedding alignment invariant
    pub fn is_aligned(&self) -> bool {
        self.chunks.len() == self.embeddings.len()
    }
}
