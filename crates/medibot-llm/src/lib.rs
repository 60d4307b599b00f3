//! Language-model boundary for medibot.
//!
//! The dialogue engine talks to an external chat model through four fixed
//! prompts: intent classification, fact extraction, fact revision, and
//! answer generation. This crate owns those prompts, the [`LanguageModel`]
//! trait implemented by transport adapters, and the strict parsing of the
//! two structured responses (extraction and revision).

pub mod extraction;
pub mod prompts;

pub use extraction::*;

use std::collections::VecDeque;
use std::sync::Mutex;

use thiserror::Error;

/// Errors raised by a language-model call.
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("model request failed: {0}")]
    Request(String),

    #[error("scripted model has no response queued")]
    Exhausted,
}

/// A synchronous request/response chat model.
///
/// Implementors wrap whatever transport the deployment uses (HTTP client,
/// in-process inference, ...). The engine never retries and never inspects
/// anything beyond the returned text.
pub trait LanguageModel: Send + Sync {
    /// Send one system prompt plus one user message, returning the raw
    /// completion text.
    fn complete(&self, system: &str, user: &str) -> Result<String, LlmError>;
}

/// Scripted model for testing without a live endpoint.
///
/// Returns queued responses in order; an empty queue yields
/// [`LlmError::Exhausted`].
pub struct ScriptedModel {
    responses: Mutex<VecDeque<String>>,
}

impl ScriptedModel {
    pub fn new<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            responses: Mutex::new(responses.into_iter().map(Into::into).collect()),
        }
    }

    /// Queue one more response after construction.
    pub fn push(&self, response: impl Into<String>) {
        self.responses
            .lock()
            .expect("scripted model lock poisoned")
            .push_back(response.into());
    }
}

impl LanguageModel for ScriptedModel {
    fn complete(&self, _system: &str, _user: &str) -> Result<String, LlmError> {
        self.responses
            .lock()
            .expect("scripted model lock poisoned")
            .pop_front()
            .ok_or(LlmError::Exhausted)
    }
}
