//! Knowledge cache loader
//!
//! Reads the precomputed chunk + embedding artifact once at startup. A
//! missing or unreadable artifact never stops the process: the cache comes
//! up empty and chat continues without retrieval.

use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::types::KnowledgeChunk;

/// How the cache came to be in its current state
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "detail", rename_all = "snake_case")]
pub enum CacheStatus {
    /// Populated with at least one chunk
    Loaded,
    /// Artifact file was not found
    Missing,
    /// Artifact parsed but held no usable chunks
    Empty,
    /// Artifact could not be read or parsed
    Corrupt(String),
}

/// Summary numbers for diagnostics
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    pub status: CacheStatus,
    pub chunks: usize,
    pub files: usize,
    pub dimension: Option<usize>,
    pub discarded: usize,
    pub source: Option<PathBuf>,
}

/// In-memory knowledge base, immutable after construction
#[derive(Debug, Clone)]
pub struct KnowledgeCache {
    chunks: Vec<KnowledgeChunk>,
    dimension: Option<usize>,
    status: CacheStatus,
    discarded: usize,
    source: Option<PathBuf>,
}

impl KnowledgeCache {
    /// An empty cache; retrieval against it always yields no context
    pub fn empty() -> Self {
        Self {
            chunks: Vec::new(),
            dimension: None,
            status: CacheStatus::Empty,
            discarded: 0,
            source: None,
        }
    }

    /// Build a cache from chunks already in memory.
    ///
    /// Applies the same validation as [`KnowledgeCache::load`].
    pub fn from_chunks(chunks: Vec<KnowledgeChunk>) -> Self {
        let (chunks, dimension, discarded) = validate(chunks);
        let status = if chunks.is_empty() {
            CacheStatus::Empty
        } else {
            CacheStatus::Loaded
        };

        Self {
            chunks,
            dimension,
            status,
            discarded,
            source: None,
        }
    }

    /// Load the artifact at `path`, degrading to an empty cache on any problem
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();

        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(path = %path.display(), "Knowledge cache not found; chat will run without retrieval");
                return Self::degraded(CacheStatus::Missing, path);
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to read knowledge cache");
                return Self::degraded(CacheStatus::Corrupt(e.to_string()), path);
            }
        };

        if contents.trim().is_empty() {
            warn!(path = %path.display(), "Knowledge cache file is empty");
            return Self::degraded(CacheStatus::Empty, path);
        }

        let chunks: Vec<KnowledgeChunk> = match serde_json::from_str(&contents) {
            Ok(chunks) => chunks,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to parse knowledge cache");
                return Self::degraded(CacheStatus::Corrupt(e.to_string()), path);
            }
        };

        let mut cache = Self::from_chunks(chunks);
        cache.source = Some(path.to_path_buf());

        if cache.discarded > 0 {
            warn!(
                discarded = cache.discarded,
                "Dropped knowledge chunks with blank content, non-finite values or mismatched embedding dimension"
            );
        }

        if cache.is_loaded() {
            info!(
                chunks = cache.chunks.len(),
                dimension = cache.dimension.unwrap_or(0),
                path = %path.display(),
                "Knowledge cache loaded"
            );
        } else {
            warn!(path = %path.display(), "Knowledge cache holds no usable chunks");
        }

        cache
    }

    fn degraded(status: CacheStatus, path: &Path) -> Self {
        Self {
            status,
            source: Some(path.to_path_buf()),
            ..Self::empty()
        }
    }

    pub fn chunks(&self) -> &[KnowledgeChunk] {
        &self.chunks
    }

    /// Embedding length shared by every chunk
    pub fn dimension(&self) -> Option<usize> {
        self.dimension
    }

    pub fn status(&self) -> &CacheStatus {
        &self.status
    }

    pub fn is_loaded(&self) -> bool {
        self.status == CacheStatus::Loaded
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        let files: HashSet<&str> = self.chunks.iter().map(|c| c.file_name.as_str()).collect();

        CacheStats {
            status: self.status.clone(),
            chunks: self.chunks.len(),
            files: files.len(),
            dimension: self.dimension,
            discarded: self.discarded,
            source: self.source.clone(),
        }
    }
}

impl Default for KnowledgeCache {
    fn default() -> Self {
        Self::empty()
    }
}

/// Keep chunks with content and a finite embedding matching the first valid dimension
fn validate(chunks: Vec<KnowledgeChunk>) -> (Vec<KnowledgeChunk>, Option<usize>, usize) {
    let total = chunks.len();
    let mut dimension: Option<usize> = None;

    let kept: Vec<KnowledgeChunk> = chunks
        .into_iter()
        .filter(|chunk| {
            if chunk.content.trim().is_empty()
                || chunk.embedding.is_empty()
                || chunk.embedding.iter().any(|v| !v.is_finite())
            {
                return false;
            }
            match dimension {
                Some(dim) => chunk.embedding.len() == dim,
                None => {
                    dimension = Some(chunk.embedding.len());
                    true
                }
            }
        })
        .collect();

    let discarded = total - kept.len();
    (kept, dimension, discarded)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(file: &str, content: &str, embedding: Vec<f32>) -> KnowledgeChunk {
        KnowledgeChunk {
            file_name: file.to_string(),
            chunk_index: 0,
            content: content.to_string(),
            embedding,
        }
    }

    #[test]
    fn test_empty_cache() {
        let cache = KnowledgeCache::empty();
        assert!(cache.is_empty());
        assert!(!cache.is_loaded());
        assert_eq!(cache.dimension(), None);
    }

    #[test]
    fn test_from_chunks_sets_dimension() {
        let cache = KnowledgeCache::from_chunks(vec![
            chunk("a.md", "alpha", vec![1.0, 0.0, 0.0]),
            chunk("b.md", "beta", vec![0.0, 1.0, 0.0]),
        ]);
        assert!(cache.is_loaded());
        assert_eq!(cache.dimension(), Some(3));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_validation_drops_bad_chunks() {
        let cache = KnowledgeCache::from_chunks(vec![
            chunk("a.md", "alpha", vec![1.0, 0.0]),
            chunk("b.md", "   ", vec![0.0, 1.0]),
            chunk("c.md", "gamma", vec![0.0, 1.0, 0.5]),
            chunk("d.md", "delta", vec![]),
            chunk("e.md", "epsilon", vec![0.5, 0.5]),
        ]);
        assert_eq!(cache.len(), 2);
        let stats = cache.stats();
        assert_eq!(stats.discarded, 3);
        assert_eq!(stats.files, 2);
    }

    #[test]
    fn test_validation_drops_non_finite_embeddings() {
        let cache = KnowledgeCache::from_chunks(vec![
            chunk("a.md", "alpha", vec![f32::INFINITY, 0.0]),
            chunk("b.md", "beta", vec![1.0, f32::NAN]),
            chunk("c.md", "gamma", vec![1e20, 1e20]),
        ]);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.dimension(), Some(2));
        assert_eq!(cache.stats().discarded, 2);
        assert_eq!(cache.chunks()[0].file_name, "c.md");
    }

    #[test]
    fn test_all_invalid_is_empty_status() {
        let cache = KnowledgeCache::from_chunks(vec![chunk("a.md", "", vec![1.0])]);
        assert_eq!(cache.status(), &CacheStatus::Empty);
    }

    #[test]
    fn test_stats_counts_distinct_files() {
        let mut second = chunk("a.md", "more alpha", vec![0.0, 1.0]);
        second.chunk_index = 1;
        let cache = KnowledgeCache::from_chunks(vec![chunk("a.md", "alpha", vec![1.0, 0.0]), second]);
        let stats = cache.stats();
        assert_eq!(stats.chunks, 2);
        assert_eq!(stats.files, 1);
    }
}
