//! Earthie - knowledge-grounded chat companion for Earth2
//!
//! Answers questions by retrieving relevant chunks from a precomputed
//! knowledge cache and prompting a Gemini model with them.
//!
//! # Architecture
//!
//! - **knowledge**: read-only chunk cache loaded at startup
//! - **rag**: keyword filter, similarity ranking, prompt assembly, chat pipeline
//! - **models**: embedding and generation services (Gemini REST client)
//! - **chat**: transport-neutral chat API
//! - **cli / repl / doctor / telemetry**: command-line surface

pub mod errors;
pub mod types;

pub mod knowledge;
pub mod models;
pub mod rag;

pub mod chat;

pub mod cli;
pub mod doctor;
pub mod repl;
pub mod telemetry;

// Re-export commonly used types
pub use errors::{EarthieError, Result};
