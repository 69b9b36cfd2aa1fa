// Similarity ranking module
pub mod scorer;

pub use scorer::{cosine_similarity, RankConfig, SimilarityRanker};
