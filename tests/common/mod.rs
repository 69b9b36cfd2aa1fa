//! Shared fakes for the integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use earthie::errors::{EarthieError, Result};
use earthie::knowledge::KnowledgeCache;
use earthie::models::{EmbeddingService, GenerationError, GenerationService};
use earthie::rag::ChatPipeline;
use earthie::types::KnowledgeChunk;

/// Embedding service returning a fixed vector, or failing on demand
pub struct FakeEmbedder {
    vector: Vec<f32>,
    fail: bool,
    delay: Option<Duration>,
    pub calls: AtomicUsize,
}

impl FakeEmbedder {
    pub fn returning(vector: Vec<f32>) -> Self {
        Self {
            vector,
            fail: false,
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::returning(Vec::new())
        }
    }

    pub fn slow(vector: Vec<f32>, delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::returning(vector)
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EmbeddingService for FakeEmbedder {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail {
            return Err(EarthieError::EmbeddingError(
                "embedding backend unavailable".to_string(),
            ));
        }
        Ok(self.vector.clone())
    }
}

/// Generation service recording prompts and replaying a scripted result
pub struct FakeGenerator {
    result: std::result::Result<String, GenerationError>,
    delay: Option<Duration>,
    pub prompts: Mutex<Vec<String>>,
}

impl FakeGenerator {
    pub fn replying(text: &str) -> Self {
        Self {
            result: Ok(text.to_string()),
            delay: None,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(err: GenerationError) -> Self {
        Self {
            result: Err(err),
            ..Self::replying("")
        }
    }

    pub fn slow(text: &str, delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::replying(text)
        }
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.prompts.lock().unwrap().last().cloned()
    }

    pub fn prompt_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl GenerationService for FakeGenerator {
    async fn generate(&self, prompt: &str) -> std::result::Result<String, GenerationError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.result.clone()
    }
}

pub fn chunk(file: &str, index: usize, content: &str, embedding: Vec<f32>) -> KnowledgeChunk {
    KnowledgeChunk {
        file_name: file.to_string(),
        chunk_index: index,
        content: content.to_string(),
        embedding,
    }
}

/// Three chunks, two of which mention jewels
pub fn jewel_cache() -> KnowledgeCache {
    KnowledgeCache::from_chunks(vec![
        chunk("guide.md", 0, "To make a jewel, combine raw gems at a forge.", vec![1.0, 0.0]),
        chunk("market.md", 3, "Jewel prices on the marketplace change daily.", vec![0.6, 0.8]),
        chunk("tiles.md", 1, "Tiles are parcels of virtual land.", vec![1.0, 0.0]),
    ])
}

pub fn pipeline(
    cache: KnowledgeCache,
    embedder: Arc<FakeEmbedder>,
    generator: Arc<FakeGenerator>,
) -> ChatPipeline {
    ChatPipeline::from_services(Arc::new(cache), embedder, generator)
}
