//! SQLite schema definition.

/// Complete database schema for medibot.
pub const SCHEMA: &str = r#"
PRAGMA foreign_keys = ON;

-- ============================================================================
-- Product Catalog
-- ============================================================================
-- One row per scraped product; one TEXT column per fact category plus the
-- bookkeeping columns excluded from rendered documents.

CREATE TABLE IF NOT EXISTS catalog (
    id INTEGER PRIMARY KEY,
    drug_name TEXT,
    instructions TEXT,
    dosage TEXT,
    side_effects TEXT,
    category TEXT,
    indications TEXT,
    packaging TEXT,
    composition TEXT,
    contraindications TEXT,
    manufacturer TEXT,
    warning TEXT,
    description TEXT,
    product_link TEXT,
    image_link TEXT,
    checked INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- ============================================================================
-- Conversation Checkpoints
-- ============================================================================
-- One row per suspended thread: full conversation state snapshot plus the
-- node awaiting input. Overwritten at each suspension, removed at a
-- terminal node.

CREATE TABLE IF NOT EXISTS checkpoints (
    thread_id TEXT PRIMARY KEY,
    state TEXT NOT NULL,
    waiting_node TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
"#;
