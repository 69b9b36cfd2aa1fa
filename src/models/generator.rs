//! Response generator with an explicit request state machine
//!
//! Idle → Generating → {Succeeded, SafetyBlocked, QuotaExceeded, Failed}.
//! Every failure branch is terminal for the request; there is no retry.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::errors::{EarthieError, Result};
use crate::models::types::{GenerationError, GenerationService};

pub const DEFAULT_GENERATION_TIMEOUT: Duration = Duration::from_secs(60);

/// Lifecycle of a single generation request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GenerationState {
    Idle,
    Generating,
    Succeeded,
    SafetyBlocked,
    QuotaExceeded,
    Failed,
}

/// Events that drive [`GenerationState`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationEvent {
    Submit,
    Completed,
    Blocked,
    RateLimited,
    Errored,
}

impl GenerationState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, GenerationState::Idle | GenerationState::Generating)
    }

    /// Valid transitions:
    /// 1. Idle       → Generating    (Submit)
    /// 2. Generating → Succeeded     (Completed)
    /// 3. Generating → SafetyBlocked (Blocked)
    /// 4. Generating → QuotaExceeded (RateLimited)
    /// 5. Generating → Failed        (Errored)
    /// 6. terminal   → self
    pub fn transition(&self, event: GenerationEvent) -> Result<GenerationState> {
        use GenerationEvent::*;
        use GenerationState::*;

        let next = match (self, event) {
            (Idle, Submit) => Generating,
            (Generating, Completed) => Succeeded,
            (Generating, Blocked) => SafetyBlocked,
            (Generating, RateLimited) => QuotaExceeded,
            (Generating, Errored) => Failed,
            (state, _) if state.is_terminal() => *state,
            (from, event) => {
                return Err(EarthieError::InvalidTransition {
                    from: format!("{:?}", from),
                    event: format!("{:?}", event),
                });
            }
        };

        Ok(next)
    }
}

impl From<&GenerationError> for GenerationEvent {
    fn from(err: &GenerationError) -> Self {
        match err {
            GenerationError::SafetyBlocked => GenerationEvent::Blocked,
            GenerationError::QuotaExceeded => GenerationEvent::RateLimited,
            GenerationError::Timeout { .. } | GenerationError::Other(_) => GenerationEvent::Errored,
        }
    }
}

/// Result of one generation request plus where the state machine ended
#[derive(Debug, Clone)]
pub struct Generation {
    pub result: std::result::Result<String, GenerationError>,
    pub state: GenerationState,
    pub elapsed: Duration,
}

#[derive(Clone)]
pub struct ResponseGenerator {
    service: Arc<dyn GenerationService>,
    timeout: Duration,
}

impl ResponseGenerator {
    pub fn new(service: Arc<dyn GenerationService>) -> Self {
        Self::with_timeout(service, DEFAULT_GENERATION_TIMEOUT)
    }

    pub fn with_timeout(service: Arc<dyn GenerationService>, timeout: Duration) -> Self {
        Self { service, timeout }
    }

    /// Submit `prompt` once and classify the outcome
    pub async fn generate(&self, prompt: &str) -> Generation {
        let start = Instant::now();
        let mut state = GenerationState::Idle;
        state = advance(state, GenerationEvent::Submit);

        let result = match tokio::time::timeout(self.timeout, self.service.generate(prompt)).await {
            Ok(result) => result,
            Err(_) => Err(GenerationError::Timeout {
                after_ms: self.timeout.as_millis() as u64,
            }),
        };

        state = match &result {
            Ok(_) => advance(state, GenerationEvent::Completed),
            Err(e) => advance(state, GenerationEvent::from(e)),
        };

        let elapsed = start.elapsed();
        match &result {
            Ok(text) => info!(
                elapsed_ms = elapsed.as_millis() as u64,
                response_chars = text.chars().count(),
                "Generation succeeded"
            ),
            Err(e) => warn!(
                kind = e.kind(),
                error = %e,
                elapsed_ms = elapsed.as_millis() as u64,
                "Generation failed"
            ),
        }

        Generation {
            result,
            state,
            elapsed,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

fn advance(state: GenerationState, event: GenerationEvent) -> GenerationState {
    match state.transition(event) {
        Ok(next) => {
            debug!("[STATE] {:?} -> {:?}", state, next);
            next
        }
        Err(e) => {
            warn!(error = %e, "Ignoring invalid generation transition");
            state
        }
    }
}
