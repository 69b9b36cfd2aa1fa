//! Chat API surface
//!
//! Accepts `{"messages": [{role, content}], "context"?: string}` and answers
//! `{"response": string}` or `{"error": string}` with an HTTP-style status.
//! Generation failures are answered with fixed, user-facing text and a 200.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info_span, warn, Instrument};
use uuid::Uuid;

use crate::errors::EarthieError;
use crate::models::GenerationError;
use crate::rag::ChatPipeline;
use crate::types::Message;

pub const SAFETY_MESSAGE: &str = "I apologize, but my response was blocked due to safety settings.";
pub const QUOTA_MESSAGE: &str =
    "I'm receiving a lot of questions right now and have hit my rate limit. Please try again in a moment.";
pub const TIMEOUT_MESSAGE: &str =
    "Sorry, that took too long to answer. Please try again.";
pub const GENERIC_ERROR_MESSAGE: &str =
    "I apologize, but I encountered an error while generating a response. Please try again later.";

const INVALID_BODY_MESSAGE: &str = "Invalid request body";

/// Chat request body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub messages: Vec<Message>,
    /// Extra caller-supplied context, placed after the knowledge base
    #[serde(default)]
    pub context: Option<String>,
}

/// Response body: exactly one of `response` or `error`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ApiBody {
    Response { response: String },
    Error { error: String },
}

/// Status code plus body, ready for any transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: ApiBody,
}

impl ApiResponse {
    pub fn ok(response: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: ApiBody::Response {
                response: response.into(),
            },
        }
    }

    pub fn error(status: u16, error: impl Into<String>) -> Self {
        Self {
            status,
            body: ApiBody::Error {
                error: error.into(),
            },
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn to_json(&self) -> String {
        // ApiBody holds only strings; serialization cannot fail
        serde_json::to_string(&self.body).unwrap_or_default()
    }
}

/// User-facing text for a failed generation
pub fn fallback_message(err: &GenerationError) -> &'static str {
    match err {
        GenerationError::SafetyBlocked => SAFETY_MESSAGE,
        GenerationError::QuotaExceeded => QUOTA_MESSAGE,
        GenerationError::Timeout { .. } => TIMEOUT_MESSAGE,
        GenerationError::Other(_) => GENERIC_ERROR_MESSAGE,
    }
}

/// Chat endpoint handler, shared by every transport
#[derive(Clone)]
pub struct ChatApi {
    pipeline: Arc<ChatPipeline>,
}

impl ChatApi {
    pub fn new(pipeline: Arc<ChatPipeline>) -> Self {
        Self { pipeline }
    }

    /// Handle a raw JSON request body
    pub async fn handle_json(&self, body: &str) -> ApiResponse {
        match serde_json::from_str::<ChatRequest>(body) {
            Ok(request) => self.handle(request).await,
            Err(e) => {
                warn!(error = %e, "Rejected malformed chat request");
                ApiResponse::error(400, INVALID_BODY_MESSAGE)
            }
        }
    }

    pub async fn handle(&self, request: ChatRequest) -> ApiResponse {
        let span = info_span!(
            "chat_request",
            request_id = %Uuid::new_v4(),
            turns = request.messages.len()
        );

        async move {
            let outcome = match self
                .pipeline
                .respond(&request.messages, request.context.as_deref())
                .await
            {
                Ok(outcome) => outcome,
                Err(e @ EarthieError::MissingUserMessage) => {
                    warn!("Chat request without a user message");
                    return ApiResponse::error(400, e.to_string());
                }
                Err(e) => {
                    warn!(error = %e, "Chat pipeline failed");
                    return ApiResponse::error(500, GENERIC_ERROR_MESSAGE);
                }
            };

            match outcome.reply {
                Ok(text) => ApiResponse::ok(text),
                Err(e) => ApiResponse::ok(fallback_message(&e)),
            }
        }
        .instrument(span)
        .await
    }
}
