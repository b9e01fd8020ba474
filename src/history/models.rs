//! Data models for search history.
//!
//! This module defines the closed registry of search types, the records
//! stored for each of them, and the errors raised by history operations.

use crate::config::ConfigError;
use crate::storage::StoreError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Default maximum number of searches kept per search type.
pub const MAX_HISTORY_ITEMS: usize = 10;

/// Default age in days after which a search expires.
pub const EXPIRY_DAYS: i64 = 30;

/// Keys injected into every record. Caller-supplied values for them are
/// ignored.
pub const RESERVED_FIELDS: &[&str] = &["id", "timestamp"];

/// The search forms whose submissions are remembered.
///
/// The set is closed: every variant owns exactly one storage key, and parsing
/// an identifier outside the set fails with
/// [`HistoryError::InvalidSearchType`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SearchType {
    /// 510(k) premarket notification lookup.
    K510,
    /// FDA device recall lookup.
    Fda,
    /// MAUDE adverse event lookup.
    Maude,
    /// FDA warning letter lookup.
    WarningLetter,
    /// Open historical records lookup.
    OpenHistorical,
    /// California business entity lookup.
    CaEntity,
    /// CDPH device lookup.
    Cdph,
}

impl SearchType {
    /// Every registered search type, in registry order.
    pub const ALL: [SearchType; 7] = [
        SearchType::K510,
        SearchType::Fda,
        SearchType::Maude,
        SearchType::WarningLetter,
        SearchType::OpenHistorical,
        SearchType::CaEntity,
        SearchType::Cdph,
    ];

    /// The identifier callers use for this type (`"K510"`, `"CA_ENTITY"`, ...).
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchType::K510 => "K510",
            SearchType::Fda => "FDA",
            SearchType::Maude => "MAUDE",
            SearchType::WarningLetter => "WARNING_LETTER",
            SearchType::OpenHistorical => "OPEN_HISTORICAL",
            SearchType::CaEntity => "CA_ENTITY",
            SearchType::Cdph => "CDPH",
        }
    }

    /// The storage key holding this type's history.
    pub fn storage_key(&self) -> &'static str {
        match self {
            SearchType::K510 => "@search_history_k510",
            SearchType::Fda => "@search_history_fda",
            SearchType::Maude => "@search_history_maude",
            SearchType::WarningLetter => "@search_history_warning_letter",
            SearchType::OpenHistorical => "@search_history_open_historical",
            SearchType::CaEntity => "@search_history_ca_entity",
            SearchType::Cdph => "@search_history_cdph",
        }
    }

    /// Form fields recognised for this type, in display order.
    pub fn fields(&self) -> &'static [&'static str] {
        match self {
            SearchType::K510 => &["k510Number", "applicantName", "deviceName", "fromDate", "toDate"],
            SearchType::Fda => &[
                "productDescription",
                "recallingFirm",
                "recallNumber",
                "recallClass",
                "fromDate",
                "toDate",
            ],
            SearchType::Maude => &["deviceName", "fromDate", "toDate"],
            SearchType::WarningLetter => &["firmName"],
            SearchType::OpenHistorical => &["keyword", "year"],
            SearchType::CaEntity => &["searchTerm"],
            SearchType::Cdph => &["deviceName", "firmName"],
        }
    }

    /// The field used for input suggestions on this type's form.
    pub fn primary_field(&self) -> &'static str {
        self.fields()[0]
    }
}

impl fmt::Display for SearchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AsRef<str> for SearchType {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl FromStr for SearchType {
    type Err = HistoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SearchType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| HistoryError::InvalidSearchType(s.to_string()))
    }
}

/// Returns `true` if `name` identifies a registered search type.
pub fn is_valid_search_type(name: &str) -> bool {
    name.parse::<SearchType>().is_ok()
}

/// Parameters of a submitted search, as entered on the form.
///
/// Values are JSON values so numeric and boolean inputs keep their type.
///
/// # Example
///
/// ```ignore
/// let params = SearchParams::new()
///     .with("k510Number", "K123456")
///     .with("applicantName", "Acme");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SearchParams(Map<String, Value>);

impl SearchParams {
    /// Creates an empty parameter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a field, builder style.
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(field, value);
        self
    }

    /// Adds or replaces a field.
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(field.into(), value.into());
    }

    /// Returns the raw value of `field`.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Drops `null` values, empty strings and reserved keys.
    ///
    /// Every other value is kept, including `0` and `false`.
    pub fn cleaned(self) -> Map<String, Value> {
        self.0
            .into_iter()
            .filter(|(key, value)| !RESERVED_FIELDS.contains(&key.as_str()) && !is_blank(value))
            .collect()
    }
}

impl From<Map<String, Value>> for SearchParams {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl<K, V> FromIterator<(K, V)> for SearchParams
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

/// A single remembered search.
///
/// Serialized flat: `id` and `timestamp` sit next to the form fields, which
/// is the layout the stored JSON arrays use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRecord {
    /// Unique identifier for this record.
    ///
    /// A UUID v7, so identifiers sort by creation time.
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,

    /// When the search was submitted, in UTC.
    pub timestamp: DateTime<Utc>,

    /// Cleaned form fields.
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl SearchRecord {
    /// Builds a record from submitted parameters, stamped with `timestamp`.
    pub fn new(params: SearchParams, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: uuid::Uuid::now_v7().to_string(),
            timestamp,
            fields: params.cleaned(),
        }
    }

    /// Returns the raw value of `field`.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Returns `field` rendered as text, if present and non-empty.
    ///
    /// Strings are returned as-is; numbers and booleans use their JSON text.
    pub fn text(&self, field: &str) -> Option<String> {
        match self.fields.get(field)? {
            Value::String(s) if s.trim().is_empty() => None,
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    /// Returns `true` if the record is older than `max_age` at `now`.
    pub fn is_expired(&self, now: DateTime<Utc>, max_age: chrono::Duration) -> bool {
        now.signed_duration_since(self.timestamp) > max_age
    }
}

/// Accepts identifiers stored either as strings or as bare numbers.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number id, found {}",
            other
        ))),
    }
}

/// Exported history: search type to its records, newest first.
pub type HistoryExport = BTreeMap<SearchType, Vec<SearchRecord>>;

/// Why a read fell back to an empty history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DegradedReason {
    /// The store failed to return the value.
    Storage(String),
    /// The stored value was not a valid history array.
    Corrupted(String),
}

impl fmt::Display for DegradedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DegradedReason::Storage(reason) => write!(f, "storage failure: {}", reason),
            DegradedReason::Corrupted(reason) => write!(f, "corrupted history: {}", reason),
        }
    }
}

/// Outcome of reading one search type's history.
#[derive(Debug, Clone, PartialEq)]
pub enum HistoryLoad {
    /// History was read. `pruned` counts expired records that were dropped.
    Loaded {
        records: Vec<SearchRecord>,
        pruned: usize,
    },
    /// Nothing has been stored for this type.
    Missing,
    /// The read failed and the history is treated as empty.
    Degraded(DegradedReason),
}

impl HistoryLoad {
    /// The records read, or an empty list for missing/degraded reads.
    pub fn into_records(self) -> Vec<SearchRecord> {
        match self {
            HistoryLoad::Loaded { records, .. } => records,
            HistoryLoad::Missing | HistoryLoad::Degraded(_) => Vec::new(),
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, HistoryLoad::Degraded(_))
    }
}

/// Errors that can occur during history operations.
#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    /// The identifier does not name a registered search type.
    #[error("Invalid search type: {0}")]
    InvalidSearchType(String),

    /// The store failed to write or delete history.
    #[error("History persistence error: {0}")]
    Persistence(#[from] StoreError),

    /// History could not be encoded for storage.
    #[error("History serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The service configuration was rejected.
    #[error("Invalid history configuration: {0}")]
    Config(#[from] ConfigError),

    /// Clearing all history left some types behind.
    #[error("Failed to clear history for: {}", format_types(.failed))]
    ClearAll { failed: Vec<SearchType> },
}

fn format_types(types: &[SearchType]) -> String {
    types
        .iter()
        .map(|t| t.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Result type for history operations.
pub type HistoryResult<T> = std::result::Result<T, HistoryError>;
