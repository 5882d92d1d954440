//! Vector store persistence
//!
//! The artifact is a single self-describing JSON blob holding `chunks`,
//! `embeddings`, and `metadata`. It is assembled fully in memory and written
//! through a temporary file renamed into place, so a failed write never
//! leaves a partial artifact behind.

use std::path::Path;

use crate::error::{Error, Result};
use crate::types::VectorStore;

/// Persist a store atomically at `path`
pub fn save<P: AsRef<Path>>(store: &VectorStore, path: P) -> Result<()> {
    let path = path.as_ref();
    if !store.is_aligned() {
        return Err(Error::persist(format!(
            "refusing to write misaligned store: {} chunks vs {} embeddings",
            store.chunks.len(),
            store.embeddings.len()
        )));
    }

    let bytes = serde_json::to_vec(store)?;
    let dir = path.parent().filter(|p| !p.as_os_str().is_empty());

    let mut tmp = match dir {
        Some(dir) => tempfile::NamedTempFile::new_in(dir),
        None => tempfile::NamedTempFile::new(),
    }
    .map_err(|e| Error::persist(format!("could not create temporary file: {}", e)))?;

    use std::io::Write;
    tmp.write_all(&bytes)
        .map_err(|e| Error::persist(format!("write failed: {}", e)))?;
    tmp.persist(path)
        .map_err(|e| Error::persist(format!("atomic rename failed: {}", e)))?;

    tracing::info!(
        path = %path.display(),
        chunks = store.len(),
        bytes = bytes.len(),
        "Vector store persisted"
    );
    Ok(())
}

/// Load a store from `path`, re-checking the alignment invariant
pub fn load<P: AsRef<Path>>(path: P) -> Result<VectorStore> {
    let path = path.as_ref();
    let bytes = std::fs::read(path)
        .map_err(|e| Error::load(format!("could not read '{}': {}", path.display(), e)))?;

    let store: VectorStore = serde_json::from_slice(&bytes)
        .map_err(|e| Error::load(format!("'{}' is not a vector store: {}", path.display(), e)))?;

    if !store.is_aligned() {
        return Err(Error::load(format!(
            "'{}' is misaligned: {} chunks vs {} embeddings",
            path.display(),
            store.chunks.len(),
            store.embeddings.len()
        )));
    }
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Chunk, StoreMetadata};

    fn sample_store() -> VectorStore {
        VectorStore {
            chunks: vec![Chunk {
                id: 0,
                text: "La presente Ley es de orden público e interés social en la Ciudad."
                    .to_string(),
                start: 0,
                end: 70,
                source_label: "ley_victimas".to_string(),
            }],
            embeddings: vec![vec![0.25, -0.5, 0.75]],
            metadata: StoreMetadata {
                source_name: "ley_victimas".to_string(),
                total_chunks: 1,
                dropped_chunks: 0,
                model: "text-embedding-004".to_string(),
                content_hash: "abc123".to_string(),
                generated_at: chrono::Utc::now(),
            },
        }
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ley_victimas.json");

        let store = sample_store();
        save(&store, &path).unwrap();

        let loaded = load(&path).unwrap();
        assert_eq!(loaded.chunks, store.chunks);
        assert_eq!(loaded.embeddings, store.embeddings);
        assert_eq!(loaded.metadata.total_chunks, 1);
    }

    #[test]
    fn misaligned_store_is_never_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("roto.json");

        let mut store = sample_store();
        store.embeddings.push(vec![0.0]);
        let err = save(&store, &path).unwrap_err();
        assert!(matches!(err, Error::Persist(_)));
        assert!(!path.exists());
    }

    #[test]
    fn garbage_bytes_fail_to_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("basura.bin");
        std::fs::write(&path, b"\x80\x04not a store").unwrap();

        let err = load(&path).unwrap_err();
        assert!(matches!(err, Error::Load { .. }));
    }

    #[test]
    fn missing_file_fails_to_load() {
        let err = load("/nonexistent/store.json").unwrap_err();
        assert!(matches!(err, Error::Load { .. }));
    }
}
