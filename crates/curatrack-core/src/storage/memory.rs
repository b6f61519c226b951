//! In-memory slot storage.

use std::collections::HashMap;

use super::{PatientStorage, StorageError, StorageResult};

/// Slot storage held in a map. Writes can be made to fail, which stands in
/// for a full quota.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    slots: HashMap<String, String>,
    reject_writes: Option<String>,
    write_count: usize,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with a raw value already stored under `key`.
    pub fn with_slot(key: &str, value: impl Into<String>) -> Self {
        let mut storage = Self::new();
        storage.slots.insert(key.to_string(), value.into());
        storage
    }

    /// Make every subsequent write fail with `reason`, or succeed again with `None`.
    pub fn reject_writes(&mut self, reason: Option<String>) {
        self.reject_writes = reason;
    }

    /// Number of successful writes so far.
    pub fn write_count(&self) -> usize {
        self.write_count
    }
}

impl PatientStorage for MemoryStorage {
    fn read_slot(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.slots.get(key).cloned())
    }

    fn write_slot(&mut self, key: &str, value: &str) -> StorageResult<()> {
        if let Some(reason) = &self.reject_writes {
            return Err(StorageError::WriteRejected(reason.clone()));
        }
        self.slots.insert(key.to_string(), value.to_string());
        self.write_count += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_write_keeps_previous_value() {
        let mut storage = MemoryStorage::with_slot("k", "committed");
        storage.reject_writes(Some("quota exceeded".into()));

        let err = storage.write_slot("k", "lost").unwrap_err();
        assert!(matches!(err, StorageError::WriteRejected(ref r) if r == "quota exceeded"));
        assert_eq!(storage.read_slot("k").unwrap(), Some("committed".into()));
        assert_eq!(storage.write_count(), 0);

        storage.reject_writes(None);
        storage.write_slot("k", "next").unwrap();
        assert_eq!(storage.write_count(), 1);
    }
}
