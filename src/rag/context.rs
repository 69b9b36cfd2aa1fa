// Prompt assembly for knowledge-grounded chat
use regex::Regex;
use std::sync::OnceLock;
use tracing::info;

use crate::types::Message;

/// Messages with fewer whitespace-separated words skip retrieval
pub const MIN_RETRIEVAL_WORDS: usize = 5;

/// Fixed persona placed at the top of every prompt
pub const SYSTEM_PROMPT: &str = "You are Earthie, a friendly and knowledgeable companion for players of Earth2, \
the virtual world built on a map of the real Earth. You help players understand properties, tiles, \
Essence, jewels, civilians, mentars, raiding and the rest of the Earth2 economy.

Guidelines:
- Answer clearly and concisely, using the knowledge base excerpts when they are relevant.
- If the knowledge base does not cover a question, say so instead of guessing.
- Never give financial advice; describe mechanics and data, not what to buy or sell.
- Keep a warm, helpful tone.";

const GREETING_PATTERN: &str = r"(?i)^\s*(hi|hello|hey|hiya|howdy|yo|sup|greetings|good (morning|afternoon|evening)|what'?s up)[\s!.?,]*$";

fn greeting_regex() -> &'static Regex {
    static GREETING: OnceLock<Regex> = OnceLock::new();
    GREETING.get_or_init(|| Regex::new(GREETING_PATTERN).expect("greeting pattern is valid"))
}

/// True for short greetings such as "hi", "Hello!" or "good morning."
pub fn is_greeting(message: &str) -> bool {
    greeting_regex().is_match(message)
}

/// Whether a message is worth the cost of retrieval
pub fn should_retrieve(message: &str) -> bool {
    should_retrieve_with(message, MIN_RETRIEVAL_WORDS)
}

/// [`should_retrieve`] with a custom word threshold
pub fn should_retrieve_with(message: &str, min_words: usize) -> bool {
    !is_greeting(message) && message.split_whitespace().count() >= min_words
}

/// Builds the single prompt sent to the generation model.
///
/// Section order: persona, knowledge base, additional context, transcript.
pub struct PromptAssembler {
    system_prompt: String,
}

impl PromptAssembler {
    pub fn new() -> Self {
        Self::with_system_prompt(SYSTEM_PROMPT)
    }

    pub fn with_system_prompt(system_prompt: impl Into<String>) -> Self {
        Self {
            system_prompt: system_prompt.into(),
        }
    }

    pub fn assemble(
        &self,
        knowledge: &str,
        additional_context: Option<&str>,
        conversation: &[Message],
    ) -> String {
        let mut prompt = String::with_capacity(
            self.system_prompt.len() + knowledge.len() + conversation.len() * 128,
        );
        prompt.push_str(self.system_prompt.trim_end());
        prompt.push_str("\n\n");

        if !knowledge.trim().is_empty() {
            prompt.push_str("--- Relevant Knowledge Base ---\n");
            prompt.push_str(knowledge.trim());
            prompt.push_str("\n--- End Knowledge Base ---\n\n");
        }

        if let Some(extra) = additional_context.map(str::trim).filter(|c| !c.is_empty()) {
            prompt.push_str("--- Additional Context ---\n");
            prompt.push_str(extra);
            prompt.push_str("\n--- End Additional Context ---\n\n");
        }

        prompt.push_str("Conversation:\n");
        for message in conversation {
            prompt.push_str(&message.transcript_line());
            prompt.push('\n');
        }

        // Logged, never capped.
        info!(
            prompt_chars = prompt.chars().count(),
            turns = conversation.len(),
            "Prompt assembled"
        );

        prompt
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }
}

impl Default for PromptAssembler {
    fn default() -> Self {
        Self::new()
    }
}
