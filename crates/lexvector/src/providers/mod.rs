//! Embedding providers

pub mod embedding;
pub mod gemini;

pub use embedding::EmbeddingProvider;
pub use gemini::GeminiEmbedder;
