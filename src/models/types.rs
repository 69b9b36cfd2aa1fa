//! Service abstractions and Gemini wire types
//!
//! The chat core only sees the two traits below; the Gemini client is one
//! implementation and tests plug in in-process fakes.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::errors::Result;

/// Finish/block reasons the Gemini API uses for content refusals
const SAFETY_REASONS: &[&str] = &["SAFETY", "BLOCKLIST", "PROHIBITED_CONTENT", "SPII"];

/// Turns text into a fixed-length vector
#[async_trait]
pub trait EmbeddingService: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;
}

/// Produces a model response for an assembled prompt
#[async_trait]
pub trait GenerationService: Send + Sync {
    async fn generate(&self, prompt: &str) -> std::result::Result<String, GenerationError>;
}

/// Why a generation request produced no text
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    #[error("response blocked by safety settings")]
    SafetyBlocked,

    #[error("generation quota exceeded")]
    QuotaExceeded,

    #[error("generation timed out after {after_ms}ms")]
    Timeout { after_ms: u64 },

    #[error("generation failed: {0}")]
    Other(String),
}

impl GenerationError {
    /// Classify a raw upstream failure.
    ///
    /// A message mentioning `SAFETY` wins over everything else; HTTP 429,
    /// `RESOURCE_EXHAUSTED` and quota wording count as quota exhaustion.
    pub fn classify(status: Option<u16>, message: &str) -> Self {
        if message.contains("SAFETY") {
            return GenerationError::SafetyBlocked;
        }

        let lower = message.to_lowercase();
        if status == Some(429) || message.contains("RESOURCE_EXHAUSTED") || lower.contains("quota") {
            return GenerationError::QuotaExceeded;
        }

        match status {
            Some(code) => GenerationError::Other(format!("HTTP {}: {}", code, message)),
            None => GenerationError::Other(message.to_string()),
        }
    }

    /// Stable kind label for logs
    pub fn kind(&self) -> &'static str {
        match self {
            GenerationError::SafetyBlocked => "safety",
            GenerationError::QuotaExceeded => "quota",
            GenerationError::Timeout { .. } => "timeout",
            GenerationError::Other(_) => "other",
        }
    }
}

pub(crate) fn is_safety_reason(reason: &str) -> bool {
    SAFETY_REASONS.contains(&reason)
}

/// A `contents`/`content` entry in Gemini requests and responses
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Part {
    #[serde(default)]
    pub text: String,
}

impl Content {
    pub fn text(role: Option<&str>, text: &str) -> Self {
        Self {
            role: role.map(str::to_string),
            parts: vec![Part {
                text: text.to_string(),
            }],
        }
    }

    /// Concatenated text of all parts
    pub fn joined_text(&self) -> String {
        self.parts.iter().map(|p| p.text.as_str()).collect()
    }
}

/// Body of `:embedContent`
#[derive(Debug, Serialize)]
pub struct EmbedContentRequest {
    pub model: String,
    pub content: Content,
}

#[derive(Debug, Deserialize)]
pub struct EmbedContentResponse {
    pub embedding: ContentEmbedding,
}

#[derive(Debug, Deserialize)]
pub struct ContentEmbedding {
    #[serde(default)]
    pub values: Vec<f32>,
}

/// Body of `:generateContent`
#[derive(Debug, Serialize)]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default)]
    pub prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    #[serde(default)]
    pub block_reason: Option<String>,
}

/// Error envelope returned with non-2xx responses
#[derive(Debug, Deserialize)]
pub struct ApiErrorEnvelope {
    pub error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status: Option<String>,
}

impl GenerateContentResponse {
    /// Extract the first candidate's text or the reason there is none
    pub fn into_text(self) -> std::result::Result<String, GenerationError> {
        if let Some(reason) = self.prompt_feedback.and_then(|f| f.block_reason) {
            return Err(if is_safety_reason(&reason) {
                GenerationError::SafetyBlocked
            } else {
                GenerationError::Other(format!("prompt blocked: {}", reason))
            });
        }

        let candidate = self
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| GenerationError::Other("response contained no candidates".to_string()))?;

        let text = candidate
            .content
            .as_ref()
            .map(Content::joined_text)
            .unwrap_or_default();

        if text.is_empty() {
            if let Some(reason) = candidate.finish_reason.as_deref() {
                if is_safety_reason(reason) {
                    return Err(GenerationError::SafetyBlocked);
                }
                return Err(GenerationError::Other(format!(
                    "empty response (finish reason {})",
                    reason
                )));
            }
            return Err(GenerationError::Other("empty response".to_string()));
        }

        Ok(text)
    }
}
