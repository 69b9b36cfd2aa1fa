//! Error types for Earthie
//!
//! Hard failures only. Retrieval and generation problems degrade into
//! fallback outcomes and never surface through this type to a chat caller.

use thiserror::Error;

/// Main error type for the Earthie chat system
#[derive(Error, Debug)]
pub enum EarthieError {
    /// State machine transition errors
    #[error("Invalid state transition from {from} via {event}")]
    InvalidTransition { from: String, event: String },

    /// The conversation has no user turn to answer
    #[error("Could not identify the latest user message")]
    MissingUserMessage,

    /// Embedding service errors
    #[error("Embedding request failed: {0}")]
    EmbeddingError(String),

    /// HTTP client errors
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type alias for Earthie operations
pub type Result<T> = std::result::Result<T, EarthieError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_user_message_display() {
        let err = EarthieError::MissingUserMessage;
        assert_eq!(err.to_string(), "Could not identify the latest user message");
    }

    #[test]
    fn test_invalid_transition_error() {
        let err = EarthieError::InvalidTransition {
            from: "Idle".to_string(),
            event: "Succeed".to_string(),
        };
        assert!(err.to_string().contains("Idle"));
        assert!(err.to_string().contains("Succeed"));
    }
}
