//! Core runtime configuration.
//!
//! Resolved once by the host at startup and passed into the store. Nothing in
//! this crate reads process environment variables; hosts hand raw values to
//! [`CoreConfig::from_values`].

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Configuration errors.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid persist flag '{0}' (expected true/false, yes/no or 1/0)")]
    InvalidPersistFlag(String),
}

/// Core configuration resolved at startup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CoreConfig {
    database_path: Option<PathBuf>,
    persist: bool,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl CoreConfig {
    /// Store in an on-disk SQLite file.
    pub fn with_database(path: impl Into<PathBuf>) -> Self {
        Self {
            database_path: Some(path.into()),
            persist: true,
        }
    }

    /// Store in an in-memory SQLite database.
    pub fn in_memory() -> Self {
        Self {
            database_path: None,
            persist: true,
        }
    }

    /// Enable or disable write-back after each change.
    pub fn with_persist(mut self, persist: bool) -> Self {
        self.persist = persist;
        self
    }

    /// Build from raw string values.
    ///
    /// An empty or missing path means in-memory storage. A missing persist flag
    /// means write-back is on.
    pub fn from_values(
        database_path: Option<String>,
        persist: Option<String>,
    ) -> Result<Self, ConfigError> {
        let database_path = database_path
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);
        let persist = persist
            .map(|v| parse_flag(&v))
            .transpose()?
            .unwrap_or(true);

        Ok(Self {
            database_path,
            persist,
        })
    }

    pub fn database_path(&self) -> Option<&Path> {
        self.database_path.as_deref()
    }

    pub fn persist(&self) -> bool {
        self.persist
    }
}

fn parse_flag(value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" => Ok(false),
        _ => Err(ConfigError::InvalidPersistFlag(value.to_string())),
    }
}
