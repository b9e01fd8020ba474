//! Configuration management for the search history cache.
//!
//! Configuration is read from the `"search-history"` section of a JSON
//! settings document and merged with defaults. There is no process-wide
//! configuration: the loaded [`HistoryConfig`] is handed to
//! `SearchHistoryService::with_config` by whoever builds the service.

pub mod schema;

pub use schema::{ConfigError, HistoryConfig};

use serde_json::Value;
use std::path::Path;

/// Settings section holding the history configuration.
pub const SETTINGS_KEY: &str = "search-history";

/// Loads configuration from a JSON settings value.
///
/// Reads the `"search-history"` section, merges it with defaults and
/// validates the result. A section that fails to deserialize is logged and
/// ignored.
///
/// # Arguments
///
/// * `settings_json` - Optional JSON value containing user settings under
///   the `"search-history"` key
///
/// # Example
///
/// ```no_run
/// use search_history::config::load_config;
/// use serde_json::json;
///
/// let settings = json!({
///     "search-history": {
///         "maxHistoryItems": 20,
///         "expiryDays": 7
///     }
/// });
///
/// let config = load_config(Some(settings)).unwrap();
/// assert_eq!(config.max_history_items, 20);
/// ```
pub fn load_config(settings_json: Option<Value>) -> Result<HistoryConfig, ConfigError> {
    let mut config = HistoryConfig::default();

    if let Some(settings) = settings_json {
        if let Some(section) = settings.get(SETTINGS_KEY) {
            match serde_json::from_value::<HistoryConfig>(section.clone()) {
                Ok(user_config) => {
                    config = config.merge(&user_config);
                }
                Err(e) => {
                    tracing::warn!(
                        "Failed to parse {} settings: {}. Using defaults.",
                        SETTINGS_KEY,
                        e
                    );
                }
            }
        }
    }

    config.validate()?;
    Ok(config)
}

/// Loads configuration from a JSON settings file.
///
/// A missing file yields the default configuration.
pub fn load_config_file(path: &Path) -> Result<HistoryConfig, ConfigError> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No settings file at {}, using defaults", path.display());
            return load_config(None);
        }
        Err(e) => {
            return Err(ConfigError::Load {
                path: path.display().to_string(),
                reason: e.to_string(),
            })
        }
    };

    let settings: Value = serde_json::from_str(&contents).map_err(|e| ConfigError::Load {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;

    load_config(Some(settings))
}
