//! Source text acquisition and normalization
//!
//! Document-format parsing is a collaborator concern; this module only turns
//! an already-extracted text into the single normalized string the chunker
//! operates on.

use std::path::Path;

use crate::error::{Error, Result};

/// Collapse all whitespace runs to single spaces and trim
///
/// Extraction pipelines emit paragraphs with uneven line breaks and padding;
/// the chunker expects one continuous string with uniform spacing.
pub fn normalize_text(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Read a UTF-8 text file and normalize it
///
/// Fails with an extraction error when the file is unreadable, not valid
/// UTF-8, or normalizes to an empty string. Extraction failures are fatal to
/// a pipeline run: without source text there is nothing to chunk.
pub fn read_source<P: AsRef<Path>>(path: P) -> Result<String> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path)
        .map_err(|e| Error::extraction(path.display().to_string(), e.to_string()))?;

    let text = normalize_text(&raw);
    if text.is_empty() {
        return Err(Error::extraction(
            path.display().to_string(),
            "document contains no extractable text",
        ));
    }
    Ok(text)
}

/// Derive a source label from a file path (stem without extension)
pub fn source_label_for<P: AsRef<Path>>(path: P) -> String {
    path.as_ref()
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "documento".to_string())
}
