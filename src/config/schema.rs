//! Configuration schema for the search history cache.
//!
//! This module defines the configuration structure and validation logic for
//! the user-tunable parts of the history cache: how many searches are kept
//! per type, how long they live, and where file-backed history is stored.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Errors raised when a configuration fails validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// `maxHistoryItems` was zero.
    #[error("maxHistoryItems must be greater than 0")]
    ZeroHistoryItems,

    /// `expiryDays` was zero or negative.
    #[error("expiryDays must be greater than 0 (got {0})")]
    NonPositiveExpiry(i64),

    /// The settings file could not be read or parsed.
    #[error("Failed to load configuration from {path}: {reason}")]
    Load { path: String, reason: String },
}

/// Configuration for the search history cache.
///
/// Read from the `"search-history"` section of a JSON settings document.
/// Missing settings fall back to defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryConfig {
    /// Maximum number of searches retained per search type.
    ///
    /// Saving beyond this evicts the oldest search. Defaults to 10.
    ///
    /// Must be > 0.
    #[serde(default = "default_max_history_items")]
    pub max_history_items: usize,

    /// Age in days after which a search is dropped on the next read.
    ///
    /// Defaults to 30.
    ///
    /// Must be > 0.
    #[serde(default = "default_expiry_days")]
    pub expiry_days: i64,

    /// Directory used by the file-backed store.
    ///
    /// When unset, `FileStore::default_dir()` is used.
    #[serde(default)]
    pub storage_dir: Option<PathBuf>,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_history_items: default_max_history_items(),
            expiry_days: default_expiry_days(),
            storage_dir: None,
        }
    }
}

impl HistoryConfig {
    /// Validates the configuration.
    ///
    /// # Returns
    ///
    /// `Ok(())` if all settings are valid, or the first violated rule.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_history_items == 0 {
            return Err(ConfigError::ZeroHistoryItems);
        }

        if self.expiry_days <= 0 {
            return Err(ConfigError::NonPositiveExpiry(self.expiry_days));
        }

        Ok(())
    }

    /// Returns the expiry window as a `chrono::Duration`.
    pub fn expiry(&self) -> chrono::Duration {
        chrono::Duration::days(self.expiry_days)
    }

    /// Merges this configuration with another, using values from `other`
    /// where present.
    ///
    /// `storage_dir` is only replaced when `other` sets one.
    pub fn merge(&self, other: &HistoryConfig) -> Self {
        Self {
            max_history_items: other.max_history_items,
            expiry_days: other.expiry_days,
            storage_dir: other
                .storage_dir
                .clone()
                .or_else(|| self.storage_dir.clone()),
        }
    }
}

// Default value functions for serde

fn default_max_history_items() -> usize {
    10
}

fn default_expiry_days() -> i64 {
    30
}
