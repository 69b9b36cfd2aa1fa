//! Knowledge base retrieval units

use serde::{Deserialize, Serialize};

/// A segment of source text paired with its precomputed embedding.
///
/// Produced by the offline indexing step and read-only at runtime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KnowledgeChunk {
    pub file_name: String,
    pub chunk_index: usize,
    pub content: String,
    pub embedding: Vec<f32>,
}

/// A candidate chunk scored against a single query
#[derive(Debug, Clone, Copy)]
pub struct ScoredChunk<'a> {
    pub chunk: &'a KnowledgeChunk,
    /// Raw cosine similarity, always in [-1, 1]
    pub similarity: f32,
    /// Ranking score after the filename boost
    pub score: f32,
    pub boosted: bool,
}

/// Owned summary of a chunk that made it into a prompt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedChunk {
    pub file_name: String,
    pub chunk_index: usize,
    pub score: f32,
    pub boosted: bool,
}

impl From<&ScoredChunk<'_>> for RetrievedChunk {
    fn from(scored: &ScoredChunk<'_>) -> Self {
        Self {
            file_name: scored.chunk.file_name.clone(),
            chunk_index: scored.chunk.chunk_index,
            score: scored.score,
            boosted: scored.boosted,
        }
    }
}
