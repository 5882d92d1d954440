//! Configuration for the vectorization pipeline

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Error, Result};

/// Environment variable consulted when the API key is absent from the config file
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Main pipeline configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VectorizerConfig {
    /// Embedding provider configuration
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    /// Chunking configuration
    #[serde(default)]
    pub chunking: ChunkingConfig,
}

impl VectorizerConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            Error::Config(format!(
                "Failed to read config file '{}': {}",
                path.as_ref().display(),
                e
            ))
        })?;
        let mut config: Self =
            toml::from_str(&raw).map_err(|e| Error::Config(format!("Invalid config: {}", e)))?;
        config.resolve_api_key();
        config.validate()?;
        Ok(config)
    }

    /// Build a default configuration, pulling the API key from the environment
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.resolve_api_key();
        config.validate()?;
        Ok(config)
    }

    fn resolve_api_key(&mut self) {
        if self.embedding.api_key.is_empty() {
            if let Ok(key) = std::env::var(API_KEY_ENV) {
                self.embedding.api_key = key;
            }
        }
    }

    fn validate(&self) -> Result<()> {
        if self.chunking.chunk_overlap >= self.chunking.chunk_size {
            return Err(Error::Config(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                self.chunking.chunk_overlap, self.chunking.chunk_size
            )));
        }
        if self.embedding.api_key.is_empty() {
            return Err(Error::Config(format!(
                "No embedding API key configured (set embedding.api_key or {})",
                API_KEY_ENV
            )));
        }
        Ok(())
    }
}

/// Embedding provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Base endpoint of the embedding API
    pub endpoint: String,
    /// API key (falls back to the `GEMINI_API_KEY` environment variable)
    pub api_key: String,
    /// Embedding model identifier
    pub model: String,
    /// Request timeout in seconds
    pub request_timeout_secs: u64,
    /// Number of retries for rate-limited or failed requests
    pub max_retries: u32,
    /// Cooperative delay between successive embedding calls, in milliseconds
    pub request_delay_ms: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            api_key: String::new(),
            model: "text-embedding-004".to_string(),
            request_timeout_secs: 30,
            max_retries: 2,
            request_delay_ms: 500,
        }
    }
}

/// Text chunking configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Target chunk size in bytes of normalized text
    pub chunk_size: usize,
    /// Overlap between consecutive chunks (must be smaller than chunk_size)
    pub chunk_overlap: usize,
    /// Chunks at or below this trimmed length are discarded
    pub min_chunk_size: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 800,
            chunk_overlap: 100,
            min_chunk_size: 50,
        }
    }
}
