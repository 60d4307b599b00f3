//! Checkpoint table operations.
//!
//! One row per suspended thread. The state column holds the serialized
//! conversation-state JSON; deserialization happens a layer up, in the
//! dialogue checkpoint store.

use rusqlite::{params, OptionalExtension};

use super::{Database, DbResult};

/// Raw checkpoint row: (state JSON, waiting node name, updated-at).
pub type CheckpointRow = (String, String, String);

impl Database {
    /// Write (or overwrite) the checkpoint for a thread.
    pub fn save_checkpoint(
        &self,
        thread_id: &str,
        state_json: &str,
        waiting_node: &str,
        updated_at: &str,
    ) -> DbResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO checkpoints (thread_id, state, waiting_node, updated_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(thread_id) DO UPDATE SET
                state = excluded.state,
                waiting_node = excluded.waiting_node,
                updated_at = excluded.updated_at
            "#,
            params![thread_id, state_json, waiting_node, updated_at],
        )?;
        Ok(())
    }

    /// Read the checkpoint for a thread, if any.
    pub fn load_checkpoint(&self, thread_id: &str) -> DbResult<Option<CheckpointRow>> {
        let row = self
            .conn
            .query_row(
                "SELECT state, waiting_node, updated_at FROM checkpoints WHERE thread_id = ?1",
                [thread_id],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .optional()?;
        Ok(row)
    }

    /// Remove the checkpoint for a thread. Removing an absent row is a
    /// no-op.
    pub fn delete_checkpoint(&self, thread_id: &str) -> DbResult<()> {
        self.conn
            .execute("DELETE FROM checkpoints WHERE thread_id = ?1", [thread_id])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_load_delete_round_trip() {
        let db = Database::open_in_memory().unwrap();

        db.save_checkpoint("t-1", r#"{"question":"q"}"#, "no_fact", "2026-01-01T00:00:00Z")
            .unwrap();
        let (state, node, at) = db.load_checkpoint("t-1").unwrap().unwrap();
        assert_eq!(state, r#"{"question":"q"}"#);
        assert_eq!(node, "no_fact");
        assert_eq!(at, "2026-01-01T00:00:00Z");

        db.delete_checkpoint("t-1").unwrap();
        assert!(db.load_checkpoint("t-1").unwrap().is_none());
    }

    #[test]
    fn save_overwrites_previous_suspension() {
        let db = Database::open_in_memory().unwrap();
        db.save_checkpoint("t-1", "{}", "no_fact", "2026-01-01T00:00:00Z")
            .unwrap();
        db.save_checkpoint("t-1", "{}", "ask_validation", "2026-01-02T00:00:00Z")
            .unwrap();

        let (_, node, at) = db.load_checkpoint("t-1").unwrap().unwrap();
        assert_eq!(node, "ask_validation");
        assert_eq!(at, "2026-01-02T00:00:00Z");
    }

    #[test]
    fn delete_absent_checkpoint_is_a_noop() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.delete_checkpoint("missing").is_ok());
    }
}
