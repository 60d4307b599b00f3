//! The process-wide dialogue engine.
//!
//! Constructed once from catalog, embedding provider, language model and
//! checkpoint store; holds no conversation-scoped mutable state, so any
//! number of threads can run through one engine. Suspension is a logical
//! yield: the driver persists a checkpoint and returns a pending turn;
//! the caller decides when, or whether, to resume.

use std::collections::BTreeMap;
use std::sync::Arc;

use medibot_llm::prompts::SATISFACTION_PROMPT;
use medibot_llm::LanguageModel;
use thiserror::Error;
use uuid::Uuid;

use crate::gateway::{FactGateway, GatewayError};
use crate::models::CatalogStore;
use crate::rank::{EmbeddingError, EmbeddingProvider};
use crate::retrieval::{HybridRetriever, RetrievalError, DEFAULT_TOP_K};
use crate::vocab::localize_facts;

use super::{
    messages, route, Checkpoint, CheckpointError, CheckpointStore, ConversationState, Directive,
    Node, SuspendMarker, Validation, ValidationEntry,
};

/// Engine errors. Node failures never land here; they are normalized
/// into the conversation's error path. These are failures of the engine
/// machinery itself.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("unknown thread: {0}")]
    UnknownThread(Uuid),

    #[error("checkpoint store failure: {0}")]
    Checkpoint(#[from] CheckpointError),

    #[error("embedding initialization failed: {0}")]
    Embedding(#[from] EmbeddingError),
}

/// Failures a node handler can produce; caught at the node boundary.
#[derive(Error, Debug)]
enum NodeError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error(transparent)]
    Retrieval(#[from] RetrievalError),
}

/// The result of one `invoke`/`resume` call.
#[derive(Debug)]
pub struct Turn {
    pub thread_id: Uuid,
    pub outcome: Outcome,
}

/// Either a finished conversation or a suspension awaiting input.
#[derive(Debug)]
pub enum Outcome {
    /// The thread reached a terminal node; its checkpoint is retired.
    Final {
        answer: String,
        error_log: Option<String>,
        validations: Vec<ValidationEntry>,
    },
    /// The thread is suspended. `answer` carries the generated answer
    /// when the marker is `ask_revision`; `provided` carries the
    /// localized fact map the caller echoes back for `input_revision`.
    Pending {
        marker: SuspendMarker,
        answer: Option<String>,
        provided: BTreeMap<&'static str, String>,
    },
}

/// Process-wide dialogue engine. Pass it around as an explicit context.
pub struct DialogueEngine<M: LanguageModel, C: CheckpointStore> {
    gateway: FactGateway<M>,
    retriever: HybridRetriever,
    checkpoints: C,
}

impl<M: LanguageModel, C: CheckpointStore> DialogueEngine<M, C> {
    /// Build the engine, precomputing column embeddings from the
    /// catalog.
    pub fn new(
        catalog: Arc<CatalogStore>,
        embedder: Arc<dyn EmbeddingProvider>,
        model: M,
        checkpoints: C,
    ) -> Result<Self, EngineError> {
        Ok(Self {
            gateway: FactGateway::new(model),
            retriever: HybridRetriever::new(catalog, embedder)?,
            checkpoints,
        })
    }

    /// Start a new conversation thread from a user question.
    pub fn invoke(&self, question: &str) -> Result<Turn, EngineError> {
        let thread = Uuid::new_v4();
        tracing::debug!(%thread, "starting conversation");
        self.drive(thread, ConversationState::new(question), Node::Start)
    }

    /// Resume a suspended thread with the user's input.
    pub fn resume(&self, thread: Uuid, input: &str) -> Result<Turn, EngineError> {
        let checkpoint = self
            .checkpoints
            .load(&thread)?
            .ok_or(EngineError::UnknownThread(thread))?;
        let Checkpoint {
            mut state, waiting, ..
        } = checkpoint;
        tracing::debug!(%thread, node = %waiting, "resuming conversation");

        let directive = self.boundary(waiting, &mut state, |engine, state| {
            engine.resume_node(waiting, state, input)
        });
        state.resume = Some(directive);
        let next = next_node(waiting, directive, &mut state);
        self.drive(thread, state, next)
    }

    /// Run nodes until the thread suspends or terminates.
    fn drive(
        &self,
        thread: Uuid,
        mut state: ConversationState,
        mut node: Node,
    ) -> Result<Turn, EngineError> {
        loop {
            if let Some(marker) = node.suspend_marker() {
                // Durability invariant: the checkpoint write completes
                // before the suspended turn is returned.
                let provided = localize_facts(&state.provided);
                let answer = state.answer.clone();
                self.checkpoints
                    .save(&thread, &Checkpoint::new(state, node))?;
                tracing::debug!(%thread, marker = marker.as_str(), "suspended");
                return Ok(Turn {
                    thread_id: thread,
                    outcome: Outcome::Pending {
                        marker,
                        answer,
                        provided,
                    },
                });
            }

            if node.is_terminal() {
                let answer = closing_message(node, &state);
                self.checkpoints.remove(&thread)?;
                tracing::debug!(%thread, node = %node, "conversation finished");
                return Ok(Turn {
                    thread_id: thread,
                    outcome: Outcome::Final {
                        answer,
                        error_log: state.error_log,
                        validations: state.validations,
                    },
                });
            }

            let directive =
                self.boundary(node, &mut state, |engine, state| engine.execute(node, state));
            state.resume = Some(directive);
            tracing::debug!(node = %node, directive = %directive, "transition");
            node = next_node(node, directive, &mut state);
        }
    }

    /// Node boundary: any handler failure becomes the error directive,
    /// tagged with the originating node. Nothing escapes to the driver.
    fn boundary<F>(&self, node: Node, state: &mut ConversationState, handler: F) -> Directive
    where
        F: FnOnce(&Self, &mut ConversationState) -> Result<Directive, NodeError>,
    {
        match handler(self, state) {
            Ok(directive) => directive,
            Err(err) => {
                tracing::warn!(node = %node, error = %err, "node failed");
                state.error_log = Some(format!("{node}: {err}"));
                Directive::Error
            }
        }
    }

    /// Handlers for nodes that run without fresh user input.
    fn execute(&self, node: Node, state: &mut ConversationState) -> Result<Directive, NodeError> {
        match node {
            Node::Start => {
                let medical = self.gateway.classify_intent(&state.question)?;
                Ok(if medical {
                    Directive::IdentifyFacts
                } else {
                    Directive::AnswerNonMedical
                })
            }
            Node::IdentifyFacts => {
                let (desired, provided) = self.gateway.extract_facts(&state.question)?;
                state.desired = desired;
                state.provided = provided;
                Ok(if state.provided.is_empty() {
                    Directive::NoFact
                } else {
                    Directive::Retrieve
                })
            }
            Node::Retrieve => {
                state.context = self.retriever.retrieve(&state.provided, DEFAULT_TOP_K)?;
                Ok(Directive::Generate)
            }
            Node::Generate => {
                let answer = self
                    .gateway
                    .generate_answer(&state.question, &state.context)?;
                state.answer = Some(format!("{answer}\n\n{SATISFACTION_PROMPT}"));
                Ok(Directive::AskValidation)
            }
            // Suspending and terminal nodes never reach here.
            Node::NoFact
            | Node::AskValidation
            | Node::Validate
            | Node::AnswerNonMedical
            | Node::ThankYou
            | Node::Error => unreachable!("node {node} is not an executing node"),
        }
    }

    /// Handlers for the suspended nodes, fed the caller-supplied input.
    fn resume_node(
        &self,
        node: Node,
        state: &mut ConversationState,
        input: &str,
    ) -> Result<Directive, NodeError> {
        match node {
            Node::NoFact => {
                state.question = input.to_string();
                Ok(Directive::IdentifyFacts)
            }
            Node::AskValidation => {
                let medical = self.gateway.classify_intent(input)?;
                if input.trim() == messages::NEGATIVE_ACK {
                    state.validations.push(ValidationEntry {
                        question: state.question.clone(),
                        verdict: Validation::NotSatisfied,
                    });
                    Ok(Directive::Validate)
                } else if medical {
                    state.question = input.to_string();
                    Ok(Directive::IdentifyFacts)
                } else {
                    state.validations.push(ValidationEntry {
                        question: state.question.clone(),
                        verdict: Validation::Satisfied,
                    });
                    Ok(Directive::ThankYou)
                }
            }
            Node::Validate => {
                state.question = input.to_string();
                state.provided = self.gateway.revise_facts(&state.provided, input)?;
                Ok(if state.provided.is_empty() {
                    Directive::NoFact
                } else {
                    Directive::Retrieve
                })
            }
            _ => unreachable!("node {node} is not a suspending node"),
        }
    }
}

/// Perform the routed transition; an unwired directive is normalized
/// into the error path like any other node failure.
fn next_node(node: Node, directive: Directive, state: &mut ConversationState) -> Node {
    match route(node, directive) {
        Some(next) => next,
        None => {
            tracing::warn!(node = %node, directive = %directive, "unwired directive");
            state.error_log = Some(format!("{node}: unwired directive {directive}"));
            Node::Error
        }
    }
}

/// Fixed message for a terminal node. The error path never surfaces a
/// partial answer, only the apology.
fn closing_message(node: Node, state: &ConversationState) -> String {
    match node {
        Node::AnswerNonMedical => messages::NON_MEDICAL.to_string(),
        Node::ThankYou => messages::THANK_YOU.to_string(),
        Node::Error => messages::APOLOGY.to_string(),
        _ => state.answer.clone().unwrap_or_default(),
    }
}
