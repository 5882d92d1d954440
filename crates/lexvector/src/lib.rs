//! lexvector: chunking, embedding, and vector-store tooling for legal document corpora
//!
//! The ingestion pipeline splits a normalized document text into overlapping,
//! boundary-aware chunks, requests an embedding per chunk from a remote
//! provider, and persists chunks + embeddings + provenance metadata as a
//! single atomic artifact. The validation tools inspect such artifacts after
//! the fact: sniffing their binary format and scanning chunk text for markup
//! contamination left behind by faulty extraction.

pub mod config;
pub mod error;
pub mod ingestion;
pub mod pipeline;
pub mod providers;
pub mod storage;
pub mod types;
pub mod validation;

pub use config::VectorizerConfig;
pub use error::{Error, Result};
pub use ingestion::TextChunker;
pub use pipeline::IngestPipeline;
pub use providers::{EmbeddingProvider, GeminiEmbedder};
pub use types::{Chunk, StoreMetadata, VectorStore};
pub use validation::{sniff, ArtifactFormat, StoreValidator, ValidationReport};
