//! Query embedder
//!
//! An empty vector means "embedding unavailable"; callers skip similarity
//! scoring instead of failing the chat turn.

use std::sync::Arc;
use std::time::Duration;
use tracing::error;

use crate::models::types::EmbeddingService;

pub const DEFAULT_EMBEDDING_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Clone)]
pub struct QueryEmbedder {
    service: Arc<dyn EmbeddingService>,
    timeout: Duration,
}

impl QueryEmbedder {
    pub fn new(service: Arc<dyn EmbeddingService>) -> Self {
        Self::with_timeout(service, DEFAULT_EMBEDDING_TIMEOUT)
    }

    pub fn with_timeout(service: Arc<dyn EmbeddingService>, timeout: Duration) -> Self {
        Self { service, timeout }
    }

    /// Embed `text`, returning an empty vector on failure or timeout
    pub async fn embed(&self, text: &str) -> Vec<f32> {
        match tokio::time::timeout(self.timeout, self.service.embed(text)).await {
            Ok(Ok(values)) => values,
            Ok(Err(e)) => {
                error!(error = %e, "Query embedding failed");
                Vec::new()
            }
            Err(_) => {
                error!(
                    timeout_ms = self.timeout.as_millis() as u64,
                    "Query embedding timed out"
                );
                Vec::new()
            }
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{EarthieError, Result};
    use async_trait::async_trait;

    struct Fixed(Vec<f32>);

    #[async_trait]
    impl EmbeddingService for Fixed {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Ok(self.0.clone())
        }
    }

    struct Broken;

    #[async_trait]
    impl EmbeddingService for Broken {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Err(EarthieError::EmbeddingError("connection refused".to_string()))
        }
    }

    struct Hung;

    #[async_trait]
    impl EmbeddingService for Hung {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(vec![1.0])
        }
    }

    #[tokio::test]
    async fn test_embed_success() {
        let embedder = QueryEmbedder::new(Arc::new(Fixed(vec![0.1, 0.2, 0.3])));
        assert_eq!(embedder.embed("jewels").await, vec![0.1, 0.2, 0.3]);
    }

    #[tokio::test]
    async fn test_embed_failure_is_empty() {
        let embedder = QueryEmbedder::new(Arc::new(Broken));
        assert!(embedder.embed("jewels").await.is_empty());
    }

    #[tokio::test]
    async fn test_embed_timeout_is_empty() {
        let embedder = QueryEmbedder::with_timeout(Arc::new(Hung), Duration::from_millis(20));
        assert!(embedder.embed("jewels").await.is_empty());
    }
}
