//! SQLite schema definition.

/// Key-value slot table backing [`super::SqliteStorage`].
pub const SCHEMA: &str = r#"
-- ============================================================================
-- Key-value slots (one JSON document per key)
-- ============================================================================

CREATE TABLE IF NOT EXISTS kv_store (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,                          -- serialized document
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);
"#;
