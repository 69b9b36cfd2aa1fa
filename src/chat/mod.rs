//! Chat API module
//!
//! Transport-neutral request handling for the chat endpoint.

pub mod api;

pub use api::{fallback_message, ApiBody, ApiResponse, ChatApi, ChatRequest};
