//! Dialogue state machine.
//!
//! One active node per thread. Handlers never name their successor: each
//! writes a single resume directive into the conversation state and a
//! dedicated routing table performs the transition. Suspending nodes
//! (awaiting human input) checkpoint the full state durably before
//! yielding back to the caller.

mod checkpoint;
mod engine;
mod state;

pub use checkpoint::{Checkpoint, CheckpointError, CheckpointStore, MemoryCheckpoints, SqliteCheckpoints};
pub use engine::{DialogueEngine, EngineError, Outcome, Turn};
pub use state::{ConversationState, SuspendMarker, Validation, ValidationEntry};

use std::fmt;

use serde::{Deserialize, Serialize};

/// Fixed terminal messages, kept verbatim from the deployed bot.
pub mod messages {
    pub const NON_MEDICAL: &str = "🌟 Hai, aku MediBot! 🩺✨ Aku siap membantu menjawab pertanyaan seputar kesehatan: istilah medis, gejala, penyakit, atau pengobatan. Yuk, tanya-tanya aja!";
    pub const THANK_YOU: &str = "🌟 Terima kasih sudah ngobrol bareng MediBot! 🩺💙";
    pub const APOLOGY: &str = "Maaf kami tidak menemukan obat yang kamu maksud";

    /// Literal reply that means "not satisfied" at the validation prompt.
    pub const NEGATIVE_ACK: &str = "tidak";
}

/// A node of the dialogue graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Node {
    Start,
    IdentifyFacts,
    AnswerNonMedical,
    NoFact,
    Retrieve,
    Generate,
    AskValidation,
    Validate,
    ThankYou,
    Error,
}

impl Node {
    pub fn as_str(self) -> &'static str {
        match self {
            Node::Start => "start",
            Node::IdentifyFacts => "identify_facts",
            Node::AnswerNonMedical => "answer_non_medical",
            Node::NoFact => "no_fact",
            Node::Retrieve => "retrieve",
            Node::Generate => "generate",
            Node::AskValidation => "ask_validation",
            Node::Validate => "validate",
            Node::ThankYou => "thank_you",
            Node::Error => "error",
        }
    }

    /// Does this node end the conversation?
    pub fn is_terminal(self) -> bool {
        matches!(self, Node::AnswerNonMedical | Node::ThankYou | Node::Error)
    }

    /// The marker emitted when this node suspends awaiting input.
    pub fn suspend_marker(self) -> Option<SuspendMarker> {
        match self {
            Node::NoFact => Some(SuspendMarker::NoFact),
            Node::AskValidation => Some(SuspendMarker::AskRevision),
            Node::Validate => Some(SuspendMarker::InputRevision),
            _ => None,
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The single resume-directive value a handler writes; consumed by
/// [`route`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Directive {
    IdentifyFacts,
    AnswerNonMedical,
    NoFact,
    Retrieve,
    Generate,
    AskValidation,
    Validate,
    ThankYou,
    Error,
}

impl Directive {
    pub fn as_str(self) -> &'static str {
        match self {
            Directive::IdentifyFacts => "identify_facts",
            Directive::AnswerNonMedical => "answer_non_medical",
            Directive::NoFact => "no_fact",
            Directive::Retrieve => "retrieve",
            Directive::Generate => "generate",
            Directive::AskValidation => "ask_validation",
            Directive::Validate => "validate",
            Directive::ThankYou => "thank_you",
            Directive::Error => "error",
        }
    }
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The wired transitions. `None` means the directive is not wired from
/// that node; the driver normalizes that into the error path.
pub fn route(node: Node, directive: Directive) -> Option<Node> {
    use Directive as D;
    use Node as N;

    match (node, directive) {
        (N::Start, D::IdentifyFacts) => Some(N::IdentifyFacts),
        (N::Start, D::AnswerNonMedical) => Some(N::AnswerNonMedical),
        (N::Start, D::Error) => Some(N::Error),

        (N::IdentifyFacts, D::Retrieve) => Some(N::Retrieve),
        (N::IdentifyFacts, D::NoFact) => Some(N::NoFact),
        (N::IdentifyFacts, D::Error) => Some(N::Error),

        // Fixed edge: clarification text always feeds fact extraction.
        (N::NoFact, D::IdentifyFacts) => Some(N::IdentifyFacts),
        (N::NoFact, D::Error) => Some(N::Error),

        (N::Retrieve, D::Generate) => Some(N::Generate),
        (N::Retrieve, D::Error) => Some(N::Error),

        (N::Generate, D::AskValidation) => Some(N::AskValidation),
        (N::Generate, D::Error) => Some(N::Error),

        (N::AskValidation, D::Validate) => Some(N::Validate),
        (N::AskValidation, D::IdentifyFacts) => Some(N::IdentifyFacts),
        (N::AskValidation, D::ThankYou) => Some(N::ThankYou),
        (N::AskValidation, D::Error) => Some(N::Error),

        (N::Validate, D::Retrieve) => Some(N::Retrieve),
        (N::Validate, D::NoFact) => Some(N::NoFact),
        (N::Validate, D::Error) => Some(N::Error),

        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_DIRECTIVES: [Directive; 9] = [
        Directive::IdentifyFacts,
        Directive::AnswerNonMedical,
        Directive::NoFact,
        Directive::Retrieve,
        Directive::Generate,
        Directive::AskValidation,
        Directive::Validate,
        Directive::ThankYou,
        Directive::Error,
    ];

    fn wired_from(node: Node) -> Vec<Directive> {
        ALL_DIRECTIVES
            .into_iter()
            .filter(|d| route(node, *d).is_some())
            .collect()
    }

    #[test]
    fn identify_facts_reaches_exactly_retrieve_no_fact_error() {
        assert_eq!(
            wired_from(Node::IdentifyFacts),
            vec![Directive::NoFact, Directive::Retrieve, Directive::Error]
        );
    }

    #[test]
    fn ask_validation_reaches_exactly_three_successors_plus_error() {
        assert_eq!(
            wired_from(Node::AskValidation),
            vec![
                Directive::IdentifyFacts,
                Directive::Validate,
                Directive::ThankYou,
                Directive::Error
            ]
        );
    }

    #[test]
    fn terminal_nodes_have_no_outgoing_edges() {
        for node in [Node::AnswerNonMedical, Node::ThankYou, Node::Error] {
            assert!(wired_from(node).is_empty());
            assert!(node.is_terminal());
        }
    }

    #[test]
    fn every_non_terminal_node_wires_the_error_directive() {
        for node in [
            Node::Start,
            Node::IdentifyFacts,
            Node::NoFact,
            Node::Retrieve,
            Node::Generate,
            Node::AskValidation,
            Node::Validate,
        ] {
            assert_eq!(route(node, Directive::Error), Some(Node::Error));
        }
    }

    #[test]
    fn suspend_markers_cover_the_three_waiting_nodes() {
        assert_eq!(Node::NoFact.suspend_marker(), Some(SuspendMarker::NoFact));
        assert_eq!(
            Node::AskValidation.suspend_marker(),
            Some(SuspendMarker::AskRevision)
        );
        assert_eq!(
            Node::Validate.suspend_marker(),
            Some(SuspendMarker::InputRevision)
        );
        assert_eq!(Node::Retrieve.suspend_marker(), None);
    }
}
