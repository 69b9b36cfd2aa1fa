//! Conversation log for an interactive chat session
//!
//! Turns are only ever appended; `/reset` starts a new log.

use chrono::{DateTime, Local};

use crate::types::{Message, Role};

/// A message plus when it was added
#[derive(Debug, Clone)]
pub struct Turn {
    pub message: Message,
    pub at: DateTime<Local>,
}

/// Session state for the REPL
pub struct ConversationLog {
    turns: Vec<Turn>,
    started_at: DateTime<Local>,
    additional_context: Option<String>,
}

impl ConversationLog {
    pub fn new() -> Self {
        Self {
            turns: Vec::new(),
            started_at: Local::now(),
            additional_context: None,
        }
    }

    pub fn push(&mut self, message: Message) {
        self.turns.push(Turn {
            message,
            at: Local::now(),
        });
    }

    /// Messages in turn order, as sent to the pipeline
    pub fn messages(&self) -> Vec<Message> {
        self.turns.iter().map(|t| t.message.clone()).collect()
    }

    /// Drop a trailing user turn that never got an answer
    pub fn pop_unanswered(&mut self) -> Option<Message> {
        match self.turns.last() {
            Some(turn) if turn.message.role == Role::User => self.turns.pop().map(|t| t.message),
            _ => None,
        }
    }

    /// Most recent `limit` turns, oldest first
    pub fn recent(&self, limit: usize) -> &[Turn] {
        let start = self.turns.len().saturating_sub(limit);
        &self.turns[start..]
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn started_at(&self) -> DateTime<Local> {
        self.started_at
    }

    pub fn additional_context(&self) -> Option<&str> {
        self.additional_context.as_deref()
    }

    pub fn set_additional_context(&mut self, context: Option<String>) {
        self.additional_context = context.filter(|c| !c.trim().is_empty());
    }

    /// Clear turns and context, restarting the session clock
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for ConversationLog {
    fn default() -> Self {
        Self::new()
    }
}
