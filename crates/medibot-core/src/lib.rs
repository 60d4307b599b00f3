//! MediBot Core Library
//!
//! Retrieval-backed drug question answering with a suspendable dialogue
//! loop.
//!
//! # Architecture
//!
//! ```text
//! Question → Intent Gate → Fact Extraction
//!                               │
//!                  no facts ◄───┤
//!                 (suspend)     │
//!                               ▼
//!                   ┌───────────────────────┐
//!                   │   Hybrid Retrieval    │
//!                   │ lexical + semantic +  │
//!                   │ fuzzy, fused by RRF   │
//!                   └───────────┬───────────┘
//!                               │
//!                               ▼
//!                     Answer Generation
//!                               │
//!                               ▼
//!                  Validation loop (suspend)
//!            satisfied ──► thank you (terminal)
//!        not satisfied ──► fact revision ──► retrieve again
//! ```
//!
//! # Core Principle
//!
//! **The caller owns the pause.** Whenever the bot needs human input it
//! checkpoints the full conversation durably and returns; any process
//! with the checkpoint store can resume the thread later.
//!
//! # Modules
//!
//! - [`db`]: SQLite catalog and checkpoint persistence
//! - [`models`]: Domain types (CandidateRecord, CatalogStore)
//! - [`vocab`]: The closed fact vocabulary
//! - [`rank`]: The three ranking signals and reciprocal rank fusion
//! - [`retrieval`]: Hybrid retriever producing context documents
//! - [`gateway`]: Language-model boundary (extraction, revision, generation)
//! - [`dialogue`]: The node graph, checkpoints, and the engine

pub mod db;
pub mod dialogue;
pub mod gateway;
pub mod models;
pub mod rank;
pub mod retrieval;
pub mod vocab;

// Re-export commonly used types
pub use db::Database;
pub use dialogue::{
    DialogueEngine, MemoryCheckpoints, Outcome, SqliteCheckpoints, SuspendMarker, Turn,
};
pub use gateway::FactGateway;
pub use models::{CandidateRecord, CatalogStore};
pub use rank::{EmbeddingProvider, HashedEmbedder};
pub use retrieval::{Document, HybridRetriever, DEFAULT_TOP_K};
pub use vocab::{DesiredFacts, FactCategory, ProvidedFacts};
