//! External model services
//!
//! - Embedding and generation service traits
//! - Gemini REST client implementing both
//! - Timeout-bounded wrappers used by the chat pipeline

pub mod client;
pub mod embedder;
pub mod generator;
pub mod types;

// Re-export key types for convenience
pub use client::GeminiClient;
pub use embedder::QueryEmbedder;
pub use generator::{Generation, GenerationState, ResponseGenerator};
pub use types::{EmbeddingService, GenerationError, GenerationService};
