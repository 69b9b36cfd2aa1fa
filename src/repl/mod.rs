//! Interactive chat session
//!
//! Reads user turns, keeps the conversation log and sends each turn through
//! the shared chat pipeline.

pub mod commands;
pub mod display;
pub mod input;
pub mod session;

use anyhow::Result;
use std::sync::Arc;

use crate::chat::fallback_message;
use crate::knowledge::CacheStats;
use crate::rag::ChatPipeline;
use crate::repl::commands::is_command;
use crate::repl::input::{InputEvent, InputHandler};
pub use crate::repl::session::{ConversationLog, Turn};
use crate::types::Message;

/// REPL options
#[derive(Debug, Clone)]
pub struct ReplConfig {
    pub model: String,
    pub show_progress: bool,
    pub show_sources: bool,
}

/// REPL session coordinator
pub struct ReplSession {
    input: InputHandler,
    log: ConversationLog,
    pipeline: Arc<ChatPipeline>,
    cache_stats: CacheStats,
    config: ReplConfig,
}

impl ReplSession {
    pub fn new(pipeline: Arc<ChatPipeline>, input: InputHandler, config: ReplConfig) -> Self {
        let cache_stats = pipeline.retriever().cache().stats();
        Self {
            input,
            log: ConversationLog::new(),
            pipeline,
            cache_stats,
            config,
        }
    }

    /// Run until /exit or Ctrl-D
    pub async fn run(&mut self) -> Result<()> {
        display::show_banner(env!("CARGO_PKG_VERSION"), &self.config.model, &self.cache_stats);

        loop {
            let line = match self.input.read_line()? {
                InputEvent::Line(line) => line,
                InputEvent::Interrupted => continue,
                InputEvent::Eof => break,
            };

            if line.is_empty() {
                continue;
            }

            if is_command(&line) {
                let command = commands::parse(&line);
                if !commands::execute(command, &mut self.log, &self.cache_stats) {
                    break;
                }
                continue;
            }

            self.chat_turn(line).await;
        }

        self.input.save_history()?;
        Ok(())
    }

    async fn chat_turn(&mut self, line: String) {
        self.log.push(Message::user(line));
        let messages = self.log.messages();

        let spinner = self.config.show_progress.then(display::thinking_spinner);
        let result = self
            .pipeline
            .respond(&messages, self.log.additional_context())
            .await;
        if let Some(pb) = spinner {
            pb.finish_and_clear();
        }

        match result {
            Ok(outcome) => match outcome.reply {
                Ok(text) => {
                    display::show_reply(&text);
                    if self.config.show_sources {
                        display::show_sources(&outcome.sources);
                    }
                    self.log.push(Message::assistant(text));
                }
                Err(e) => {
                    // Failed turns stay out of the transcript sent next time.
                    display::show_fallback(fallback_message(&e));
                    self.log.pop_unanswered();
                }
            },
            Err(e) => {
                display::show_error(&e.to_string());
                self.log.pop_unanswered();
            }
        }
    }

    pub fn log(&self) -> &ConversationLog {
        &self.log
    }
}
