//! Embedding provider trait for generating text embeddings

use async_trait::async_trait;

use crate::error::Result;

/// Trait for converting a text unit into a numeric vector
///
/// Implementations:
/// - `GeminiEmbedder`: Google Generative Language API (text-embedding-004)
///
/// The vector dimensionality is determined by the provider and treated as
/// opaque by the pipeline. A failed call returns an embedding error rather
/// than aborting; the orchestrator decides how to react per chunk.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate the embedding for a single text
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Provider name for logging
    fn name(&self) -> &str;

    /// Model identifier recorded in store metadata
    fn model(&self) -> &str;
}
