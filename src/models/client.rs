//! Gemini API client
//!
//! Talks to the Google generative-language REST API:
//! - POST {base}/models/{embedding_model}:embedContent
//! - POST {base}/models/{generation_model}:generateContent
//!
//! No request deadline is set on the HTTP client itself; callers wrap each
//! call in their own timeout budget.

use async_trait::async_trait;
use reqwest::{Client, Response};
use std::time::Duration;
use tracing::debug;

use crate::errors::{EarthieError, Result};
use crate::models::types::{
    ApiErrorEnvelope, Content, EmbedContentRequest, EmbedContentResponse, EmbeddingService,
    GenerateContentRequest, GenerateContentResponse, GenerationError, GenerationService,
};

/// Default Gemini API endpoint
pub const DEFAULT_GEMINI_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default generation model
pub const DEFAULT_GENERATION_MODEL: &str = "gemini-1.5-flash";

/// Default embedding model
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-004";

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Gemini REST client implementing both chat services
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    base_url: String,
    api_key: String,
    generation_model: String,
    embedding_model: String,
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("base_url", &self.base_url)
            .field("generation_model", &self.generation_model)
            .field("embedding_model", &self.embedding_model)
            .finish()
    }
}

impl GeminiClient {
    /// Create a client with the default endpoint and models
    pub fn new(api_key: &str) -> Result<Self> {
        Self::with_config(
            DEFAULT_GEMINI_URL,
            api_key,
            DEFAULT_GENERATION_MODEL,
            DEFAULT_EMBEDDING_MODEL,
        )
    }

    pub fn with_config(
        base_url: &str,
        api_key: &str,
        generation_model: &str,
        embedding_model: &str,
    ) -> Result<Self> {
        if api_key.trim().is_empty() {
            return Err(EarthieError::ConfigError(
                "Gemini API key is empty".to_string(),
            ));
        }

        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(EarthieError::HttpError)?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            generation_model: generation_model.to_string(),
            embedding_model: embedding_model.to_string(),
        })
    }

    fn model_url(&self, model: &str, method: &str) -> String {
        format!("{}/models/{}:{}", self.base_url, model, method)
    }

    /// Check that the generation model is reachable with the configured key
    pub async fn health_check(&self) -> Result<bool> {
        let url = format!("{}/models/{}", self.base_url, self.generation_model);

        match self
            .client
            .get(&url)
            .header("x-goog-api-key", &self.api_key)
            .send()
            .await
        {
            Ok(response) => Ok(response.status().is_success()),
            Err(_) => Ok(false),
        }
    }

    pub fn generation_model(&self) -> &str {
        &self.generation_model
    }

    pub fn embedding_model(&self) -> &str {
        &self.embedding_model
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

/// Pull the most useful message out of an error response body
async fn error_message(response: Response) -> (u16, String) {
    let status = response.status().as_u16();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());

    let message = match serde_json::from_str::<ApiErrorEnvelope>(&body) {
        Ok(envelope) => match envelope.error.status {
            Some(kind) => format!("{} {}", kind, envelope.error.message),
            None => envelope.error.message,
        },
        Err(_) => body,
    };

    (status, message)
}

#[async_trait]
impl EmbeddingService for GeminiClient {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let url = self.model_url(&self.embedding_model, "embedContent");
        let request = EmbedContentRequest {
            model: format!("models/{}", self.embedding_model),
            content: Content::text(None, text),
        };

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| EarthieError::EmbeddingError(format!("Failed to send request: {}", e)))?;

        if !response.status().is_success() {
            let (status, message) = error_message(response).await;
            return Err(EarthieError::EmbeddingError(format!(
                "HTTP {}: {}",
                status, message
            )));
        }

        let parsed: EmbedContentResponse = response
            .json()
            .await
            .map_err(|e| EarthieError::EmbeddingError(format!("Malformed response: {}", e)))?;

        debug!(dimension = parsed.embedding.values.len(), "Query embedded");
        Ok(parsed.embedding.values)
    }
}

#[async_trait]
impl GenerationService for GeminiClient {
    async fn generate(&self, prompt: &str) -> std::result::Result<String, GenerationError> {
        let url = self.model_url(&self.generation_model, "generateContent");
        let request = GenerateContentRequest {
            contents: vec![Content::text(Some("user"), prompt)],
        };

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| GenerationError::classify(None, &e.to_string()))?;

        if !response.status().is_success() {
            let (status, message) = error_message(response).await;
            return Err(GenerationError::classify(Some(status), &message));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::Other(format!("Malformed response: {}", e)))?;

        parsed.into_text()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = GeminiClient::new("test-key").unwrap();
        assert_eq!(client.generation_model(), DEFAULT_GENERATION_MODEL);
        assert_eq!(client.embedding_model(), DEFAULT_EMBEDDING_MODEL);
        assert_eq!(client.base_url(), DEFAULT_GEMINI_URL);
    }

    #[test]
    fn test_client_rejects_blank_key() {
        assert!(GeminiClient::new("  ").is_err());
    }

    #[test]
    fn test_model_url() {
        let client = GeminiClient::with_config(
            "http://localhost:8080/v1beta/",
            "key",
            "gemini-pro",
            "embedding-001",
        )
        .unwrap();
        assert_eq!(
            client.model_url("gemini-pro", "generateContent"),
            "http://localhost:8080/v1beta/models/gemini-pro:generateContent"
        );
    }

    #[test]
    fn test_debug_hides_key() {
        let client = GeminiClient::new("super-secret").unwrap();
        assert!(!format!("{:?}", client).contains("super-secret"));
    }
}
