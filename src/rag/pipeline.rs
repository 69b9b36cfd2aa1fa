// End-to-end chat pipeline: gate -> retrieve -> assemble -> generate
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

use crate::errors::{EarthieError, Result};
use crate::knowledge::KnowledgeCache;
use crate::models::{
    EmbeddingService, GenerationError, GenerationService, GenerationState, QueryEmbedder,
    ResponseGenerator,
};
use crate::rag::context::{should_retrieve_with, PromptAssembler, MIN_RETRIEVAL_WORDS};
use crate::rag::reranking::RankConfig;
use crate::rag::retrieval::{KnowledgeRetriever, RetrievalStatus};
use crate::types::{latest_user_message, Message, RetrievedChunk};

/// Whether retrieval ran for a turn, and how it ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetrievalPhase {
    /// Greeting or short message; retrieval was not invoked
    Skipped,
    Ran(RetrievalStatus),
}

/// Everything one chat turn produced
#[derive(Debug, Clone)]
pub struct ChatOutcome {
    pub reply: std::result::Result<String, GenerationError>,
    pub generation_state: GenerationState,
    pub retrieval: RetrievalPhase,
    pub sources: Vec<RetrievedChunk>,
    pub prompt_chars: usize,
}

/// Wires the retriever, prompt assembler and response generator together.
///
/// Constructed once at startup and shared across requests.
pub struct ChatPipeline {
    retriever: KnowledgeRetriever,
    assembler: PromptAssembler,
    generator: ResponseGenerator,
    min_query_words: usize,
}

impl ChatPipeline {
    pub fn new(
        retriever: KnowledgeRetriever,
        assembler: PromptAssembler,
        generator: ResponseGenerator,
    ) -> Self {
        Self {
            retriever,
            assembler,
            generator,
            min_query_words: MIN_RETRIEVAL_WORDS,
        }
    }

    /// Word count below which a message skips retrieval
    pub fn with_min_query_words(mut self, min_words: usize) -> Self {
        self.min_query_words = min_words;
        self
    }

    /// Default wiring around a cache and a pair of services
    pub fn from_services(
        cache: Arc<KnowledgeCache>,
        embedding: Arc<dyn EmbeddingService>,
        generation: Arc<dyn GenerationService>,
    ) -> Self {
        Self::new(
            KnowledgeRetriever::with_config(cache, QueryEmbedder::new(embedding), RankConfig::default()),
            PromptAssembler::new(),
            ResponseGenerator::new(generation),
        )
    }

    /// Answer the latest user turn in `messages`.
    ///
    /// Only a conversation without a user turn is an error; retrieval and
    /// generation failures are reported inside the outcome.
    pub async fn respond(
        &self,
        messages: &[Message],
        additional_context: Option<&str>,
    ) -> Result<ChatOutcome> {
        let latest = latest_user_message(messages).ok_or(EarthieError::MissingUserMessage)?;

        let (knowledge, retrieval, sources) = if should_retrieve_with(&latest.content, self.min_query_words) {
            let found = self.retriever.retrieve(&latest.content).await;
            (found.context, RetrievalPhase::Ran(found.status), found.chunks)
        } else {
            debug!("Greeting or short message; retrieval skipped");
            (String::new(), RetrievalPhase::Skipped, Vec::new())
        };

        let prompt = self.assembler.assemble(&knowledge, additional_context, messages);
        let prompt_chars = prompt.chars().count();

        let generation = self.generator.generate(&prompt).await;
        info!(
            retrieval = ?retrieval,
            sources = sources.len(),
            state = ?generation.state,
            "Chat turn complete"
        );

        Ok(ChatOutcome {
            reply: generation.result,
            generation_state: generation.state,
            retrieval,
            sources,
            prompt_chars,
        })
    }

    pub fn retriever(&self) -> &KnowledgeRetriever {
        &self.retriever
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct Echo;

    #[async_trait]
    impl EmbeddingService for Echo {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Ok(vec![1.0, 0.0])
        }
    }

    #[derive(Default)]
    struct Recording {
        prompts: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl GenerationService for Recording {
        async fn generate(&self, prompt: &str) -> std::result::Result<String, GenerationError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            Ok("ok".to_string())
        }
    }

    #[tokio::test]
    async fn test_missing_user_message_is_error() {
        let pipeline = ChatPipeline::from_services(
            Arc::new(KnowledgeCache::empty()),
            Arc::new(Echo),
            Arc::new(Recording::default()),
        );
        let result = pipeline.respond(&[Message::assistant("hello")], None).await;
        assert!(matches!(result, Err(EarthieError::MissingUserMessage)));
    }

    #[tokio::test]
    async fn test_greeting_skips_retrieval() {
        let generation = Arc::new(Recording::default());
        let pipeline = ChatPipeline::from_services(
            Arc::new(KnowledgeCache::empty()),
            Arc::new(Echo),
            generation.clone(),
        );
        let outcome = pipeline.respond(&[Message::user("hello!")], None).await.unwrap();
        assert_eq!(outcome.retrieval, RetrievalPhase::Skipped);
        assert_eq!(outcome.reply.unwrap(), "ok");
        assert_eq!(generation.prompts.lock().unwrap().len(), 1);
    }
}
