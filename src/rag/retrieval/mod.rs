// Knowledge retrieval module
pub mod engine;

pub use engine::{format_snippets, KnowledgeRetriever, Retrieval, RetrievalStatus};
