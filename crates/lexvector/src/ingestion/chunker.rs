//! Boundary-aware text chunking with overlap

use crate::config::ChunkingConfig;
use crate::types::Chunk;

/// Text chunker with configurable size and overlap
///
/// Splits normalized text into overlapping segments, preferring sentence and
/// word boundaries over hard cuts. Offsets are byte offsets into the source
/// text, always snapped to UTF-8 character boundaries.
pub struct TextChunker {
    /// Target chunk size in bytes
    chunk_size: usize,
    /// Overlap between consecutive chunks
    overlap: usize,
    /// Chunks at or below this trimmed length are discarded
    min_size: usize,
}

impl TextChunker {
    /// Create a new chunker
    ///
    /// # Panics
    /// Panics if `overlap >= chunk_size`; callers must not violate this
    /// precondition since it would prevent the cursor from advancing.
    pub fn new(chunk_size: usize, overlap: usize) -> Self {
        assert!(
            overlap < chunk_size,
            "overlap ({}) must be smaller than chunk_size ({})",
            overlap,
            chunk_size
        );
        Self {
            chunk_size,
            overlap,
            min_size: 50,
        }
    }

    /// Create a chunker from a validated configuration section
    pub fn from_config(config: &ChunkingConfig) -> Self {
        let mut chunker = Self::new(config.chunk_size, config.chunk_overlap);
        chunker.min_size = config.min_chunk_size;
        chunker
    }

    /// Split `text` into overlapping chunks labeled with `source_label`
    ///
    /// Ids are sequential and assigned only to emitted chunks; fragments
    /// whose trimmed length does not exceed the minimum significant length
    /// are silently discarded. Empty input yields an empty vector.
    pub fn chunk(&self, text: &str, source_label: &str) -> Vec<Chunk> {
        let mut chunks = Vec::new();
        let len = text.len();
        let mut start = 0usize;

        while start < len {
            // Candidate end is kept unclamped for cursor advancement so the
            // final window cannot re-emit its own overlap as a trailing chunk.
            let mut end = start + self.chunk_size;

            if end < len {
                end = floor_char_boundary(text, end);
                // Prefer the break point closest to the candidate end: the
                // last sentence terminator or the last whitespace within the
                // window, whichever lies further right.
                let window = &text[start..end];
                let last_period = window.rfind('.');
                let last_space = window.rfind(|c: char| c.is_whitespace());
                let break_point = match (last_period, last_space) {
                    (Some(p), Some(s)) => Some(p.max(s)),
                    (p, s) => p.or(s),
                };

                // Snap only when the break point is no earlier than the
                // midpoint; otherwise keep the raw cut to avoid over-short
                // chunks from unlucky break placement.
                if let Some(bp) = break_point {
                    if bp >= self.chunk_size / 2 {
                        let break_len = window[bp..]
                            .chars()
                            .next()
                            .map(char::len_utf8)
                            .unwrap_or(1);
                        end = start + bp + break_len;
                    }
                }
            }

            let slice_end = end.min(len);
            let piece = text[start..slice_end].trim();
            if piece.len() > self.min_size {
                chunks.push(Chunk {
                    id: chunks.len() as u32,
                    text: piece.to_string(),
                    start,
                    end: slice_end,
                    source_label: source_label.to_string(),
                });
            }

            let mut next = floor_char_boundary(text, end.saturating_sub(self.overlap).min(len));
            if next <= start {
                // Degenerate snap position; force progress by one character.
                next = match text[start..].chars().next() {
                    Some(c) => start + c.len_utf8(),
                    None => len,
                };
            }
            start = next;
        }

        chunks
    }
}

impl Default for TextChunker {
    fn default() -> Self {
        Self::from_config(&ChunkingConfig::default())
    }
}

/// Largest byte index `<= at` that falls on a UTF-8 character boundary
fn floor_char_boundary(text: &str, at: usize) -> usize {
    let mut idx = at.min(text.len());
    while idx > 0 && !text.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}
