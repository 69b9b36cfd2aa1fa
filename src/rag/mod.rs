// Retrieval-augmented chat pipeline
//
// Components:
// - Filter: keyword pre-filter over the knowledge cache
// - Re-ranking: cosine similarity with a file-name boost
// - Retrieval: filter + embed + rank into formatted snippets
// - Context: greeting gate and prompt assembly
// - Pipeline: end-to-end chat turn orchestration

pub mod context;
pub mod filter;
pub mod pipeline;
pub mod reranking;
pub mod retrieval;

// Re-export key types
pub use context::{is_greeting, should_retrieve, should_retrieve_with, PromptAssembler};
pub use pipeline::{ChatOutcome, ChatPipeline, RetrievalPhase};
pub use reranking::{cosine_similarity, RankConfig, SimilarityRanker};
pub use retrieval::{KnowledgeRetriever, Retrieval, RetrievalStatus};
