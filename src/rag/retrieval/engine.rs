// Knowledge retrieval: keyword filter -> query embedding -> similarity ranking
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::knowledge::KnowledgeCache;
use crate::models::QueryEmbedder;
use crate::rag::filter::{extract_keywords, filter_candidates};
use crate::rag::reranking::{RankConfig, SimilarityRanker};
use crate::types::{RetrievedChunk, ScoredChunk};

/// Why retrieval produced (or did not produce) context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetrievalStatus {
    /// Cache has no chunks
    CacheEmpty,
    /// Keyword filter eliminated every chunk
    NoCandidates,
    /// Embedding service failed or timed out
    EmbeddingUnavailable,
    /// Query embedding length differs from the cache dimension
    DimensionMismatch,
    /// Context built from this many chunks
    Found(usize),
}

/// Outcome of a single retrieval
#[derive(Debug, Clone)]
pub struct Retrieval {
    /// Formatted knowledge snippets, empty when nothing was found
    pub context: String,
    pub status: RetrievalStatus,
    pub chunks: Vec<RetrievedChunk>,
}

impl Retrieval {
    fn empty(status: RetrievalStatus) -> Self {
        Self {
            context: String::new(),
            status,
            chunks: Vec::new(),
        }
    }
}

/// Retrieves knowledge snippets relevant to a user query.
///
/// Holds the shared read-only cache; any number of requests may use one
/// retriever concurrently.
pub struct KnowledgeRetriever {
    cache: Arc<KnowledgeCache>,
    embedder: QueryEmbedder,
    ranker: SimilarityRanker,
}

impl KnowledgeRetriever {
    pub fn new(cache: Arc<KnowledgeCache>, embedder: QueryEmbedder) -> Self {
        Self::with_config(cache, embedder, RankConfig::default())
    }

    pub fn with_config(
        cache: Arc<KnowledgeCache>,
        embedder: QueryEmbedder,
        config: RankConfig,
    ) -> Self {
        Self {
            cache,
            embedder,
            ranker: SimilarityRanker::with_config(config),
        }
    }

    /// Formatted snippets for `query`, or an empty string
    pub async fn find_relevant_knowledge(&self, query: &str) -> String {
        self.retrieve(query).await.context
    }

    pub async fn retrieve(&self, query: &str) -> Retrieval {
        if self.cache.is_empty() {
            debug!("Knowledge cache empty; skipping retrieval");
            return Retrieval::empty(RetrievalStatus::CacheEmpty);
        }

        let keywords = extract_keywords(query);
        let candidates = filter_candidates(&keywords, self.cache.chunks());
        debug!(
            keywords = ?keywords,
            candidates = candidates.len(),
            total = self.cache.len(),
            "Keyword filter applied"
        );

        // No fallback to a full-cache scan when the filter empties the set.
        if candidates.is_empty() {
            info!(keywords = ?keywords, "No knowledge chunks matched query keywords");
            return Retrieval::empty(RetrievalStatus::NoCandidates);
        }

        let query_embedding = self.embedder.embed(query).await;
        if query_embedding.is_empty() {
            warn!("Query embedding unavailable; continuing without knowledge context");
            return Retrieval::empty(RetrievalStatus::EmbeddingUnavailable);
        }

        if let Some(dim) = self.cache.dimension() {
            if dim != query_embedding.len() {
                warn!(
                    expected = dim,
                    actual = query_embedding.len(),
                    "Query embedding dimension does not match knowledge cache"
                );
                return Retrieval::empty(RetrievalStatus::DimensionMismatch);
            }
        }

        let ranked = self.ranker.rank(&query_embedding, &candidates, &keywords);
        for scored in &ranked {
            debug!(
                file = %scored.chunk.file_name,
                chunk = scored.chunk.chunk_index,
                similarity = scored.similarity,
                score = scored.score,
                boosted = scored.boosted,
                "Ranked chunk"
            );
        }

        Retrieval {
            context: format_snippets(&ranked),
            status: RetrievalStatus::Found(ranked.len()),
            chunks: ranked.iter().map(RetrievedChunk::from).collect(),
        }
    }

    pub fn cache(&self) -> &Arc<KnowledgeCache> {
        &self.cache
    }

    pub fn rank_config(&self) -> &RankConfig {
        self.ranker.config()
    }
}

/// One block per chunk, prefixed with its source
pub fn format_snippets(ranked: &[ScoredChunk<'_>]) -> String {
    ranked
        .iter()
        .map(|s| {
            format!(
                "[Source: {}, chunk {}]\n{}",
                s.chunk.file_name,
                s.chunk.chunk_index,
                s.chunk.content.trim()
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}
