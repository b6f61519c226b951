//! SQLite-backed slot storage.

use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension};

use super::{PatientStorage, StorageResult, SCHEMA};

/// Slot storage in a single SQLite table.
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Open storage at path, creating if needed.
    pub fn open<P: AsRef<Path>>(path: P) -> StorageResult<Self> {
        let conn = Connection::open(path)?;
        let storage = Self { conn };
        storage.initialize()?;
        Ok(storage)
    }

    /// Create in-memory storage (for testing).
    pub fn open_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        let storage = Self { conn };
        storage.initialize()?;
        Ok(storage)
    }

    /// Initialize schema.
    fn initialize(&self) -> StorageResult<()> {
        self.conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    /// Get raw connection (for advanced queries).
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Remove a slot. Returns whether it existed.
    pub fn clear_slot(&self, key: &str) -> StorageResult<bool> {
        let rows_affected = self
            .conn
            .execute("DELETE FROM kv_store WHERE key = ?", [key])?;
        Ok(rows_affected > 0)
    }
}

impl PatientStorage for SqliteStorage {
    fn read_slot(&self, key: &str) -> StorageResult<Option<String>> {
        self.conn
            .query_row("SELECT value FROM kv_store WHERE key = ?", [key], |row| {
                row.get(0)
            })
            .optional()
            .map_err(Into::into)
    }

    fn write_slot(&mut self, key: &str, value: &str) -> StorageResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO kv_store (key, value, updated_at)
            VALUES (?1, ?2, datetime('now'))
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
            params![key, value],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Patient;
    use crate::storage::{StorageError, STORAGE_KEY};

    #[test]
    fn test_open_in_memory() {
        let storage = SqliteStorage::open_in_memory();
        assert!(storage.is_ok());
    }

    #[test]
    fn test_schema_initialized() {
        let storage = SqliteStorage::open_in_memory().unwrap();

        let tables: Vec<String> = storage
            .conn()
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .filter_map(|r| r.ok())
            .collect();

        assert!(tables.contains(&"kv_store".to_string()));
    }

    #[test]
    fn test_write_overwrites_slot() {
        let mut storage = SqliteStorage::open_in_memory().unwrap();

        storage.write_slot("k", "first").unwrap();
        storage.write_slot("k", "second").unwrap();

        assert_eq!(storage.read_slot("k").unwrap(), Some("second".into()));
        let count: i64 = storage
            .conn()
            .query_row("SELECT COUNT(*) FROM kv_store", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_save_and_load() {
        let mut storage = SqliteStorage::open_in_memory().unwrap();
        let patients = vec![
            Patient::new("Ana".into(), "Asma".into()),
            Patient::new("Luis".into(), "EPOC".into()),
        ];

        storage.save(&patients).unwrap();
        assert_eq!(storage.load().unwrap(), patients);
    }

    #[test]
    fn test_corrupt_document_is_parse_error() {
        let mut storage = SqliteStorage::open_in_memory().unwrap();
        storage.write_slot(STORAGE_KEY, "[{\"id\": 1").unwrap();

        assert!(matches!(storage.load(), Err(StorageError::Parse(_))));
    }

    #[test]
    fn test_clear_slot() {
        let mut storage = SqliteStorage::open_in_memory().unwrap();
        storage.save(&[]).unwrap();

        assert!(storage.clear_slot(STORAGE_KEY).unwrap());
        assert!(!storage.clear_slot(STORAGE_KEY).unwrap());
        assert!(matches!(storage.load(), Err(StorageError::Absent(_))));
    }
}
