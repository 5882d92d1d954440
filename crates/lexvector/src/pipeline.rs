//! Ingestion pipeline: chunk, embed, reconcile, persist

use chrono::Utc;
use sha2::{Digest, Sha256};
use std::path::Path;
use std::time::Duration;

use crate::config::VectorizerConfig;
use crate::error::{Error, Result};
use crate::ingestion::TextChunker;
use crate::providers::{EmbeddingProvider, GeminiEmbedder};
use crate::storage;
use crate::types::{StoreMetadata, VectorStore};

/// Drives chunking and embedding for one document and assembles the store
///
/// Execution is sequential: one embedding call at a time, in chunk order,
/// with a fixed cooperative delay after every call to respect provider rate
/// limits. A failed call drops that chunk and the run continues; chunk and
/// embedding sequences are filtered by the same per-chunk success mask, so
/// scattered failures cannot desynchronize the pairing.
pub struct IngestPipeline {
    chunker: TextChunker,
    provider: Box<dyn EmbeddingProvider>,
    request_delay: Duration,
}

impl IngestPipeline {
    /// Build a pipeline with a Gemini embedder from configuration
    pub fn new(config: &VectorizerConfig) -> Result<Self> {
        let provider = GeminiEmbedder::new(&config.embedding)?;
        Ok(Self {
            chunker: TextChunker::from_config(&config.chunking),
            provider: Box::new(provider),
            request_delay: Duration::from_millis(config.embedding.request_delay_ms),
        })
    }

    /// Build a pipeline around an arbitrary embedding provider
    pub fn with_provider(
        chunker: TextChunker,
        provider: Box<dyn EmbeddingProvider>,
        request_delay: Duration,
    ) -> Self {
        Self {
            chunker,
            provider,
            request_delay,
        }
    }

    /// Run the full pipeline over normalized source text
    pub async fn run(&self, text: &str, source_label: &str) -> Result<VectorStore> {
        if text.trim().is_empty() {
            return Err(Error::extraction(source_label, "no text to process"));
        }

        let chunks = self.chunker.chunk(text, source_label);
        tracing::info!(
            source = source_label,
            chunks = chunks.len(),
            "Text fragmented"
        );

        let mut kept = Vec::with_capacity(chunks.len());
        let mut embeddings = Vec::with_capacity(chunks.len());
        let mut dropped = 0usize;

        for chunk in chunks {
            match self.provider.embed(&chunk.text).await {
                Ok(values) => {
                    tracing::debug!(chunk = chunk.id, dims = values.len(), "Chunk embedded");
                    embeddings.push(values);
                    kept.push(chunk);
                }
                Err(err) => {
                    dropped += 1;
                    tracing::warn!(
                        chunk = chunk.id,
                        error = %err,
                        "Embedding failed, dropping chunk"
                    );
                }
            }
            // Cooperative throttle, applied after every call regardless of
            // outcome.
            if !self.request_delay.is_zero() {
                tokio::time::sleep(self.request_delay).await;
            }
        }

        if dropped > 0 {
            tracing::warn!(
                source = source_label,
                dropped,
                kept = kept.len(),
                "Some chunks lost their embeddings and were removed"
            );
        }

        let store = VectorStore {
            metadata: StoreMetadata {
                source_name: source_label.to_string(),
                total_chunks: kept.len(),
                dropped_chunks: dropped,
                model: self.provider.model().to_string(),
                content_hash: hex::encode(Sha256::digest(text.as_bytes())),
                generated_at: Utc::now(),
            },
            chunks: kept,
            embeddings,
        };
        debug_assert!(store.is_aligned());
        Ok(store)
    }

    /// Run the pipeline and persist the resulting store at `path`
    pub async fn run_to_file<P: AsRef<Path>>(
        &self,
        text: &str,
        source_label: &str,
        path: P,
    ) -> Result<VectorStore> {
        let store = self.run(text, source_label).await?;
        storage::save(&store, path)?;
        Ok(store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Deterministic stub that fails for a chosen set of call indices
    struct StubEmbedder {
        fail_on: HashSet<usize>,
        calls: AtomicUsize,
    }

    impl StubEmbedder {
        fn failing_on(indices: &[usize]) -> Self {
            Self {
                fail_on: indices.iter().copied().collect(),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl EmbeddingProvider for StubEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            let index = self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_on.contains(&index) {
                return Err(Error::embedding("503", "stub outage"));
            }
            Ok(vec![text.len() as f32, index as f32])
        }

        fn name(&self) -> &str {
            "stub"
        }

        fn model(&self) -> &str {
            "stub-embedding-001"
        }
    }

    fn legal_text(len: usize) -> String {
        let sentence = "articulo primero de la ley de victimas. ";
        let mut text = sentence.repeat(len / sentence.len() + 1);
        text.truncate(len);
        text
    }

    fn pipeline_with(stub: StubEmbedder) -> IngestPipeline {
        IngestPipeline::with_provider(
            TextChunker::new(800, 100),
            Box::new(stub),
            Duration::ZERO,
        )
    }

    #[tokio::test]
    async fn store_stays_aligned_without_failures() {
        let pipeline = pipeline_with(StubEmbedder::failing_on(&[]));
        let store = pipeline.run(&legal_text(5000), "ley").await.unwrap();
        assert!(store.is_aligned());
        assert!(store.len() > 3);
        assert_eq!(store.metadata.dropped_chunks, 0);
        assert_eq!(store.metadata.total_chunks, store.len());
        assert_eq!(store.metadata.model, "stub-embedding-001");
    }

    #[tokio::test]
    async fn scattered_failures_keep_pairs_aligned() {
        // Failures in the middle, not a contiguous suffix: naive truncation
        // would mispair every chunk after the first loss.
        let pipeline = pipeline_with(StubEmbedder::failing_on(&[1, 3]));
        let full = pipeline_with(StubEmbedder::failing_on(&[]))
            .run(&legal_text(5000), "ley")
            .await
            .unwrap();
        let store = pipeline.run(&legal_text(5000), "ley").await.unwrap();

        assert!(store.is_aligned());
        assert_eq!(store.metadata.dropped_chunks, 2);
        assert_eq!(store.len(), full.len() - 2);
        // Surviving chunks keep their original ids, so the dropped positions
        // appear as id gaps rather than shifted pairings.
        let ids: Vec<u32> = store.chunks.iter().map(|c| c.id).collect();
        assert!(!ids.contains(&1));
        assert!(!ids.contains(&3));
        for (chunk, embedding) in store.chunks.iter().zip(&store.embeddings) {
            // The stub encodes the chunk text length in the vector; a
            // desynchronized pairing would break this.
            assert_eq!(embedding[0], chunk.text.len() as f32);
        }
    }

    #[tokio::test]
    async fn all_failures_yield_an_empty_but_valid_store() {
        let pipeline = pipeline_with(StubEmbedder::failing_on(&(0..64).collect::<Vec<_>>()));
        let store = pipeline.run(&legal_text(3000), "ley").await.unwrap();
        assert!(store.is_empty());
        assert!(store.is_aligned());
        assert!(store.metadata.dropped_chunks > 0);
    }

    #[tokio::test]
    async fn empty_text_is_fatal() {
        let pipeline = pipeline_with(StubEmbedder::failing_on(&[]));
        let err = pipeline.run("   ", "vacio").await.unwrap_err();
        assert!(matches!(err, Error::Extraction { .. }));
    }

    #[tokio::test]
    async fn rerun_produces_identical_chunk_sequence() {
        let text = legal_text(4000);
        let a = pipeline_with(StubEmbedder::failing_on(&[]))
            .run(&text, "ley")
            .await
            .unwrap();
        let b = pipeline_with(StubEmbedder::failing_on(&[]))
            .run(&text, "ley")
            .await
            .unwrap();
        assert_eq!(a.chunks, b.chunks);
        assert_eq!(a.metadata.content_hash, b.metadata.content_hash);
    }
}
