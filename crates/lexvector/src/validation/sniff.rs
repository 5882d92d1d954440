//! Artifact format sniffing by magic bytes
//!
//! Legacy stores were produced by several generations of tooling (Python
//! pickle dumps, zip bundles, gzip streams, custom text). Callers sniff an
//! artifact before deciding whether it can be decoded and validated.

use std::fmt;
use std::path::Path;

use crate::error::{Error, Result};

/// Classified artifact format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactFormat {
    /// Python pickle stream with the given protocol version
    Pickle(u8),
    /// ZIP archive
    Zip,
    /// GZIP compressed stream
    Gzip,
    /// Unknown or custom format (includes this crate's JSON stores)
    Unknown,
}

impl ArtifactFormat {
    /// Whether this format is decodable by the store validator
    pub fn is_validatable(self) -> bool {
        matches!(self, Self::Unknown)
    }
}

impl fmt::Display for ArtifactFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pickle(protocol) => write!(f, "pickle protocol {}", protocol),
            Self::Zip => write!(f, "zip archive"),
            Self::Gzip => write!(f, "gzip stream"),
            Self::Unknown => write!(f, "unknown/custom"),
        }
    }
}

/// Known magic prefixes, evaluated in order
const SIGNATURES: &[(&[u8], ArtifactFormat)] = &[
    (b"\x80\x03", ArtifactFormat::Pickle(3)),
    (b"\x80\x04", ArtifactFormat::Pickle(4)),
    (b"\x80\x05", ArtifactFormat::Pickle(5)),
    (b"PK", ArtifactFormat::Zip),
    (b"\x1f\x8b", ArtifactFormat::Gzip),
];

/// Classify a byte blob by its prefix
pub fn sniff(bytes: &[u8]) -> ArtifactFormat {
    for (prefix, format) in SIGNATURES {
        if bytes.starts_with(prefix) {
            return *format;
        }
    }
    ArtifactFormat::Unknown
}

/// Classify a file on disk by its leading bytes
pub fn sniff_file<P: AsRef<Path>>(path: P) -> Result<ArtifactFormat> {
    let path = path.as_ref();
    let bytes = std::fs::read(path)
        .map_err(|e| Error::load(format!("could not read '{}': {}", path.display(), e)))?;
    Ok(sniff(&bytes))
}
