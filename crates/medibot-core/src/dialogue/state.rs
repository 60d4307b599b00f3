//! Per-thread conversation state.

use serde::{Deserialize, Serialize};

use crate::retrieval::Document;
use crate::vocab::{DesiredFacts, ProvidedFacts};

use super::Directive;

/// Markers a suspended turn hands back to the caller, naming the input
/// the thread is waiting for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuspendMarker {
    /// Waiting for free-text clarification (no identifiable fact yet).
    NoFact,
    /// Waiting for the reply to the satisfaction prompt.
    AskRevision,
    /// Waiting for the revision text.
    InputRevision,
}

impl SuspendMarker {
    pub fn as_str(self) -> &'static str {
        match self {
            SuspendMarker::NoFact => "no_fact",
            SuspendMarker::AskRevision => "ask_revision",
            SuspendMarker::InputRevision => "input_revision",
        }
    }
}

/// Verdict recorded when the user reacts to a generated answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Validation {
    Satisfied,
    NotSatisfied,
}

/// One validation-history entry: the question that was answered and the
/// user's verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationEntry {
    pub question: String,
    pub verdict: Validation,
}

/// Everything a thread carries between turns. Mutated only by node
/// handlers; persisted at every suspension; retired at a terminal node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationState {
    pub question: String,
    #[serde(default)]
    pub context: Vec<Document>,
    #[serde(default)]
    pub answer: Option<String>,
    #[serde(default)]
    pub desired: DesiredFacts,
    #[serde(default)]
    pub provided: ProvidedFacts,
    /// Last resume directive written by a handler.
    #[serde(default)]
    pub resume: Option<Directive>,
    /// Diagnostic detail for the error path, tagged with the node that
    /// failed.
    #[serde(default)]
    pub error_log: Option<String>,
    #[serde(default)]
    pub validations: Vec<ValidationEntry>,
}

impl ConversationState {
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            context: Vec::new(),
            answer: None,
            desired: DesiredFacts::new(),
            provided: ProvidedFacts::new(),
            resume: None,
            error_log: None,
            validations: Vec::new(),
        }
    }
}
