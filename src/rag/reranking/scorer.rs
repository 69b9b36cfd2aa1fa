// Similarity ranker for keyword-filtered candidates
use serde::{Deserialize, Serialize};

use crate::rag::filter::file_name_matches;
use crate::types::{KnowledgeChunk, ScoredChunk};

/// Ranking configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankConfig {
    /// Number of chunks kept after sorting
    pub top_n: usize,
    /// Multiplier for chunks whose file name mentions a query keyword.
    /// Not renormalized, so boosted scores may exceed 1.0.
    pub filename_boost: f32,
}

impl Default for RankConfig {
    fn default() -> Self {
        Self {
            top_n: 5,
            filename_boost: 1.1,
        }
    }
}

/// Cosine similarity in [-1, 1].
///
/// Returns 0.0 for empty or zero-norm vectors, for mismatched lengths and
/// when any component is non-finite. Sums are accumulated in f64 so large
/// f32 components cannot overflow.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.is_empty() || a.len() != b.len() {
        return 0.0;
    }

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (&x, &y) in a.iter().zip(b.iter()) {
        let (x, y) = (f64::from(x), f64::from(y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    let similarity = dot / (norm_a.sqrt() * norm_b.sqrt());
    if !similarity.is_finite() {
        return 0.0;
    }
    similarity.clamp(-1.0, 1.0) as f32
}

/// Ranks candidates by cosine similarity with a file-name boost
pub struct SimilarityRanker {
    config: RankConfig,
}

impl SimilarityRanker {
    pub fn new() -> Self {
        Self {
            config: RankConfig::default(),
        }
    }

    pub fn with_config(config: RankConfig) -> Self {
        Self { config }
    }

    /// Score, boost, sort descending and keep the top N.
    ///
    /// The sort is stable: equal scores keep their candidate order.
    pub fn rank<'a>(
        &self,
        query_embedding: &[f32],
        candidates: &[&'a KnowledgeChunk],
        keywords: &[String],
    ) -> Vec<ScoredChunk<'a>> {
        let mut scored: Vec<ScoredChunk<'a>> = candidates
            .iter()
            .copied()
            .map(|chunk| {
                let similarity = cosine_similarity(query_embedding, &chunk.embedding);
                let boosted = file_name_matches(keywords, &chunk.file_name);
                let score = if boosted {
                    similarity * self.config.filename_boost
                } else {
                    similarity
                };

                ScoredChunk {
                    chunk,
                    similarity,
                    score,
                    boosted,
                }
            })
            .collect();

        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored.truncate(self.config.top_n);
        scored
    }

    pub fn config(&self) -> &RankConfig {
        &self.config
    }

}

impl Default for SimilarityRanker {
    fn default() -> Self {
        Self::new()
    }
}
