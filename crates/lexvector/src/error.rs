//! Error types for the vectorization pipeline and store auditing tools

use thiserror::Error;

/// Result type alias for lexvector operations
pub type Result<T> = std::result::Result<T, Error>;

/// Pipeline and auditing errors
///
/// `Embedding` is the only recoverable variant: the pipeline absorbs it per
/// chunk and continues. `Extraction`, `Persist`, and `Load` are fatal to
/// their respective runs.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Source text could not be obtained or was empty
    #[error("Text extraction failed for '{document}': {message}")]
    Extraction { document: String, message: String },

    /// A single remote embedding call failed
    #[error("Embedding request failed ({status}): {body}")]
    Embedding { status: String, body: String },

    /// Final store write failed
    #[error("Failed to persist vector store: {0}")]
    Persist(String),

    /// Persisted artifact unreadable or structurally unrecognized
    #[error("Failed to load vector store: {message}{}", format_keys(.keys))]
    Load {
        message: String,
        /// Top-level keys actually found in the artifact, if any
        keys: Vec<String>,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP request error
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),
}

fn format_keys(keys: &[String]) -> String {
    if keys.is_empty() {
        String::new()
    } else {
        format!(" (keys found: {})", keys.join(", "))
    }
}

impl Error {
    /// Create an extraction error
    pub fn extraction(document: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Extraction {
            document: document.into(),
            message: message.into(),
        }
    }

    /// Create an embedding error
    pub fn embedding(status: impl Into<String>, body: impl Into<String>) -> Self {
        Self::Embedding {
            status: status.into(),
            body: body.into(),
        }
    }

    /// Create a persist error
    pub fn persist(message: impl Into<String>) -> Self {
        Self::Persist(message.into())
    }

    /// Create a load error without structural key information
    pub fn load(message: impl Into<String>) -> Self {
        Self::Load {
            message: message.into(),
            keys: Vec::new(),
        }
    }

    /// Create a load error reporting the top-level keys that were found
    pub fn load_with_keys(message: impl Into<String>, keys: Vec<String>) -> Self {
        Self::Load {
            message: message.into(),
            keys,
        }
    }

    /// Whether the pipeline may continue after this error
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Embedding { .. })
    }
}
