//! Checkpoint persistence across suspensions.
//!
//! One checkpoint per thread id: the full conversation state plus the
//! node awaiting input. Written before every suspended turn returns,
//! overwritten on later suspensions, removed at a terminal node.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::Utc;
use thiserror::Error;
use uuid::Uuid;

use crate::db::{Database, DbError};

use super::{ConversationState, Node};

/// Checkpoint storage errors.
#[derive(Error, Debug)]
pub enum CheckpointError {
    #[error("database error: {0}")]
    Db(#[from] DbError),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("checkpoint for thread {0} references unknown node {1}")]
    UnknownNode(Uuid, String),
}

/// A suspended thread's snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct Checkpoint {
    pub state: ConversationState,
    /// The suspended node awaiting input.
    pub waiting: Node,
    pub updated_at: String,
}

impl Checkpoint {
    pub fn new(state: ConversationState, waiting: Node) -> Self {
        Self {
            state,
            waiting,
            updated_at: Utc::now().to_rfc3339(),
        }
    }
}

/// Keyed store of per-thread checkpoints. Implementations must make
/// `save` durable before returning: the engine returns a suspended turn
/// to the caller only after `save` succeeds.
pub trait CheckpointStore: Send + Sync {
    fn save(&self, thread: &Uuid, checkpoint: &Checkpoint) -> Result<(), CheckpointError>;
    fn load(&self, thread: &Uuid) -> Result<Option<Checkpoint>, CheckpointError>;
    fn remove(&self, thread: &Uuid) -> Result<(), CheckpointError>;
}

/// In-memory checkpoint store for tests and ephemeral deployments.
#[derive(Default)]
pub struct MemoryCheckpoints {
    entries: Mutex<HashMap<Uuid, Checkpoint>>,
}

impl MemoryCheckpoints {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CheckpointStore for MemoryCheckpoints {
    fn save(&self, thread: &Uuid, checkpoint: &Checkpoint) -> Result<(), CheckpointError> {
        self.entries
            .lock()
            .expect("checkpoint lock poisoned")
            .insert(*thread, checkpoint.clone());
        Ok(())
    }

    fn load(&self, thread: &Uuid) -> Result<Option<Checkpoint>, CheckpointError> {
        Ok(self
            .entries
            .lock()
            .expect("checkpoint lock poisoned")
            .get(thread)
            .cloned())
    }

    fn remove(&self, thread: &Uuid) -> Result<(), CheckpointError> {
        self.entries
            .lock()
            .expect("checkpoint lock poisoned")
            .remove(thread);
        Ok(())
    }
}

/// SQLite-backed checkpoint store.
pub struct SqliteCheckpoints {
    db: Mutex<Database>,
}

impl SqliteCheckpoints {
    pub fn new(db: Database) -> Self {
        Self { db: Mutex::new(db) }
    }
}

impl CheckpointStore for SqliteCheckpoints {
    fn save(&self, thread: &Uuid, checkpoint: &Checkpoint) -> Result<(), CheckpointError> {
        let state_json = serde_json::to_string(&checkpoint.state)?;
        let db = self.db.lock().expect("checkpoint db lock poisoned");
        db.save_checkpoint(
            &thread.to_string(),
            &state_json,
            checkpoint.waiting.as_str(),
            &checkpoint.updated_at,
        )?;
        Ok(())
    }

    fn load(&self, thread: &Uuid) -> Result<Option<Checkpoint>, CheckpointError> {
        let row = {
            let db = self.db.lock().expect("checkpoint db lock poisoned");
            db.load_checkpoint(&thread.to_string())?
        };
        let Some((state_json, node_name, updated_at)) = row else {
            return Ok(None);
        };

        let state: ConversationState = serde_json::from_str(&state_json)?;
        let waiting = serde_json::from_value(serde_json::Value::String(node_name.clone()))
            .map_err(|_| CheckpointError::UnknownNode(*thread, node_name))?;

        Ok(Some(Checkpoint {
            state,
            waiting,
            updated_at,
        }))
    }

    fn remove(&self, thread: &Uuid) -> Result<(), CheckpointError> {
        let db = self.db.lock().expect("checkpoint db lock poisoned");
        db.delete_checkpoint(&thread.to_string())?;
        Ok(())
    }
}
