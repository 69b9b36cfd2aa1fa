//! Type definitions module
//!
//! Core types for conversations and the knowledge base.

pub mod knowledge;
pub mod messages;

// Re-export commonly used types
pub use knowledge::{KnowledgeChunk, RetrievedChunk, ScoredChunk};
pub use messages::{latest_user_message, Message, Role};
