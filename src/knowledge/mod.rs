//! Knowledge base module
//!
//! Holds the precomputed chunk cache shared read-only by every request.

pub mod cache;

pub use cache::{CacheStats, CacheStatus, KnowledgeCache};
