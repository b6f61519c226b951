//! Persistence layer for the patient collection.
//!
//! The whole collection lives as one JSON document in a key-value slot named
//! [`STORAGE_KEY`]. There are no per-patient keys and no schema version.

mod memory;
mod schema;
mod sqlite;

pub use memory::*;
pub use schema::*;
pub use sqlite::*;

use thiserror::Error;

use crate::models::Patient;

/// Fixed slot holding the serialized patient collection.
pub const STORAGE_KEY: &str = "patients";

/// Storage errors.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("No stored document under key '{0}'")]
    Absent(String),

    #[error("Stored document is not a valid patient collection: {0}")]
    Parse(#[source] serde_json::Error),

    #[error("Failed to serialize patient collection: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("Write rejected: {0}")]
    WriteRejected(String),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// A durable key-value slot store holding the patient collection.
///
/// Implementors provide raw slot access; `load` and `save` encode the
/// collection on top of it.
pub trait PatientStorage {
    /// Read the raw value under `key`, `None` if absent.
    fn read_slot(&self, key: &str) -> StorageResult<Option<String>>;

    /// Overwrite the value under `key`.
    fn write_slot(&mut self, key: &str, value: &str) -> StorageResult<()>;

    /// Load the persisted patient collection.
    fn load(&self) -> StorageResult<Vec<Patient>> {
        let raw = self
            .read_slot(STORAGE_KEY)?
            .ok_or_else(|| StorageError::Absent(STORAGE_KEY.to_string()))?;
        decode_patients(&raw)
    }

    /// Persist the entire patient collection.
    fn save(&mut self, patients: &[Patient]) -> StorageResult<()> {
        let raw = encode_patients(patients)?;
        self.write_slot(STORAGE_KEY, &raw)
    }
}

/// Serialize a patient collection to its stored form.
pub fn encode_patients(patients: &[Patient]) -> StorageResult<String> {
    serde_json::to_string(patients).map_err(StorageError::Serialize)
}

/// Parse the stored form of a patient collection.
pub fn decode_patients(raw: &str) -> StorageResult<Vec<Patient>> {
    serde_json::from_str(raw).map_err(StorageError::Parse)
}
