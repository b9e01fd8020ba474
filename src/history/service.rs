//! The search history service.
//!
//! [`SearchHistoryService`] keeps, for every [`SearchType`], a newest-first
//! list of recent searches stored as a JSON array under the type's storage
//! key. Lists are capped at `max_history_items`; records older than
//! `expiry_days` are dropped whenever a list is read, and the pruned list is
//! written back.
//!
//! Reads are best effort: a failing store or a corrupted blob reads as an
//! empty history (see [`SearchHistoryService::load_history`] for the detailed
//! outcome). Writes and deletes surface their errors.
//!
//! The service holds no mutable state of its own. Build one at startup with
//! the store it should use and share it by reference.
//!
//! # Example
//!
//! ```ignore
//! use search_history::history::{SearchHistoryService, SearchParams, SearchType};
//! use search_history::storage::MemoryStore;
//!
//! let service = SearchHistoryService::new(MemoryStore::new());
//! service
//!     .save_search(SearchType::K510, SearchParams::new().with("k510Number", "K123456"))
//!     .await?;
//! let history = service.get_history(SearchType::K510).await;
//! ```

use super::models::{
    DegradedReason, HistoryError, HistoryExport, HistoryLoad, HistoryResult, SearchParams,
    SearchRecord, SearchType,
};
use super::search::filter_by_field;
use super::ui::{get_history_display_value, HistoryDisplay};
use crate::config::HistoryConfig;
use crate::storage::KeyValueStore;
use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Source of the current time, used for timestamps and expiry checks.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// The wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Bounded, expiring, per-search-type history over a [`KeyValueStore`].
pub struct SearchHistoryService<S> {
    store: S,
    config: HistoryConfig,
    clock: Arc<dyn Clock>,
}

impl<S> fmt::Debug for SearchHistoryService<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchHistoryService")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<S: KeyValueStore> SearchHistoryService<S> {
    /// Creates a service over `store` with the default configuration.
    pub fn new(store: S) -> Self {
        Self {
            store,
            config: HistoryConfig::default(),
            clock: Arc::new(SystemClock),
        }
    }

    /// Creates a service over `store` with `config`.
    ///
    /// # Errors
    ///
    /// Returns `HistoryError::Config` if `config` has a zero item cap or a
    /// non-positive expiry.
    pub fn with_config(store: S, config: HistoryConfig) -> HistoryResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            ..Self::new(store)
        })
    }

    /// Replaces the clock used for timestamps and expiry.
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn config(&self) -> &HistoryConfig {
        &self.config
    }

    /// The underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Reads a search type's history and reports how the read went.
    ///
    /// Expired records are removed, as are records beyond the item cap (which
    /// only appear after an import or a lowered cap) and single records that
    /// do not have the record layout. If anything was removed, the trimmed
    /// list is written back; a failure of that write is logged and does not
    /// affect the returned records.
    ///
    /// Data that is not a JSON array is reported as corrupted and left in the
    /// store untouched. The next save replaces it.
    pub async fn load_history(&self, search_type: SearchType) -> HistoryLoad {
        let key = search_type.storage_key();

        let raw = match self.store.get_item(key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return HistoryLoad::Missing,
            Err(e) => {
                tracing::warn!("Error loading {} history: {}", search_type, e);
                return HistoryLoad::Degraded(DegradedReason::Storage(e.to_string()));
            }
        };

        let stored: Vec<Value> = match serde_json::from_str(&raw) {
            Ok(stored) => stored,
            Err(e) => {
                tracing::warn!("Ignoring corrupted {} history: {}", search_type, e);
                return HistoryLoad::Degraded(DegradedReason::Corrupted(e.to_string()));
            }
        };

        let now = self.clock.now();
        let max_age = self.config.expiry();
        let total = stored.len();

        let mut records: Vec<SearchRecord> = stored
            .into_iter()
            .enumerate()
            .filter_map(|(index, value)| match serde_json::from_value::<SearchRecord>(value) {
                Ok(record) => Some(record),
                Err(e) => {
                    tracing::warn!(
                        "Dropping unreadable {} history record at index {}: {}",
                        search_type,
                        index,
                        e
                    );
                    None
                }
            })
            .filter(|record| !record.is_expired(now, max_age))
            .collect();
        records.truncate(self.config.max_history_items);

        let pruned = total - records.len();
        if pruned > 0 {
            tracing::debug!("Pruned {} record(s) from {} history", pruned, search_type);
            if let Err(e) = self.persist(search_type, &records).await {
                tracing::warn!("Failed to write back pruned {} history: {}", search_type, e);
            }
        }

        HistoryLoad::Loaded { records, pruned }
    }

    /// Returns a search type's unexpired history, newest first.
    ///
    /// Missing history, store failures and corrupted data all read as an
    /// empty list.
    pub async fn get_history(&self, search_type: SearchType) -> Vec<SearchRecord> {
        self.load_history(search_type).await.into_records()
    }

    /// [`get_history`](Self::get_history) for a search type given by name.
    ///
    /// # Errors
    ///
    /// Returns `HistoryError::InvalidSearchType` if `name` is not registered.
    pub async fn get_history_by_name(&self, name: &str) -> HistoryResult<Vec<SearchRecord>> {
        let search_type: SearchType = name.parse()?;
        Ok(self.get_history(search_type).await)
    }

    /// Records a submitted search.
    ///
    /// Blank fields are dropped, `id` and `timestamp` are injected, and the
    /// record is prepended to the current history, which is then cut to the
    /// item cap and stored. Identical searches are not merged.
    ///
    /// # Returns
    ///
    /// The updated history, newest first.
    ///
    /// # Errors
    ///
    /// Returns `HistoryError::Persistence` if the store rejects the write.
    pub async fn save_search(
        &self,
        search_type: SearchType,
        params: SearchParams,
    ) -> HistoryResult<Vec<SearchRecord>> {
        let existing = self.get_history(search_type).await;
        let record = SearchRecord::new(params, self.clock.now());

        let mut updated = Vec::with_capacity(existing.len() + 1);
        updated.push(record);
        updated.extend(existing);
        updated.truncate(self.config.max_history_items);

        self.persist(search_type, &updated).await?;
        tracing::debug!(
            "Saved {} search ({} record(s) in history)",
            search_type,
            updated.len()
        );

        Ok(updated)
    }

    /// [`save_search`](Self::save_search) for a search type given by name.
    pub async fn save_search_by_name(
        &self,
        name: &str,
        params: SearchParams,
    ) -> HistoryResult<Vec<SearchRecord>> {
        let search_type: SearchType = name.parse()?;
        self.save_search(search_type, params).await
    }

    /// Deletes a search type's history.
    pub async fn clear_history(&self, search_type: SearchType) -> HistoryResult<()> {
        self.store.remove_item(search_type.storage_key()).await?;
        tracing::debug!("Cleared {} history", search_type);
        Ok(())
    }

    /// [`clear_history`](Self::clear_history) for a search type given by name.
    pub async fn clear_history_by_name(&self, name: &str) -> HistoryResult<()> {
        let search_type: SearchType = name.parse()?;
        self.clear_history(search_type).await
    }

    /// Deletes the history of every search type.
    ///
    /// All deletions are issued together and each is attempted regardless of
    /// the others.
    ///
    /// # Errors
    ///
    /// Returns `HistoryError::ClearAll` naming the types whose deletion
    /// failed.
    pub async fn clear_all_history(&self) -> HistoryResult<()> {
        let store = &self.store;
        let results = join_all(SearchType::ALL.iter().map(|&search_type| async move {
            (search_type, store.remove_item(search_type.storage_key()).await)
        }))
        .await;

        let failed: Vec<SearchType> = results
            .into_iter()
            .filter_map(|(search_type, result)| match result {
                Ok(()) => None,
                Err(e) => {
                    tracing::warn!("Error clearing {} history: {}", search_type, e);
                    Some(search_type)
                }
            })
            .collect();

        if failed.is_empty() {
            Ok(())
        } else {
            Err(HistoryError::ClearAll { failed })
        }
    }

    /// Exports history for backup or migration.
    ///
    /// With a search type, the export holds that type alone; without one it
    /// holds every registered type (read concurrently), including those with
    /// no history.
    pub async fn export_history(&self, search_type: Option<SearchType>) -> HistoryExport {
        match search_type {
            Some(search_type) => {
                let mut export = HistoryExport::new();
                export.insert(search_type, self.get_history(search_type).await);
                export
            }
            None => join_all(SearchType::ALL.iter().map(|&search_type| async move {
                (search_type, self.get_history(search_type).await)
            }))
            .await
            .into_iter()
            .collect(),
        }
    }

    /// Imports previously exported history.
    ///
    /// Every entry whose key names a registered search type replaces that
    /// type's stored history as-is; record shapes are not checked. Other keys
    /// are skipped. Accepts a [`HistoryExport`] or any JSON object keyed by
    /// search type name.
    ///
    /// # Returns
    ///
    /// The number of search types written.
    ///
    /// # Errors
    ///
    /// Returns `HistoryError::Serialization` before writing anything if a
    /// value cannot be encoded, or the first `HistoryError::Persistence`
    /// after every write has been attempted.
    pub async fn import_history<I, K, V>(&self, data: I) -> HistoryResult<usize>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Serialize,
    {
        let mut writes = Vec::new();
        for (key, value) in data {
            let key = key.as_ref();
            match key.parse::<SearchType>() {
                Ok(search_type) => writes.push((search_type, serde_json::to_string(&value)?)),
                Err(_) => tracing::debug!("Skipping unknown history type {:?} on import", key),
            }
        }

        let store = &self.store;
        let results = join_all(writes.iter().map(|(search_type, json)| async move {
            store.set_item(search_type.storage_key(), json).await
        }))
        .await;

        let mut imported = 0;
        let mut first_error = None;
        for ((search_type, _), result) in writes.iter().zip(results) {
            match result {
                Ok(()) => imported += 1,
                Err(e) => {
                    tracing::warn!("Error importing {} history: {}", search_type, e);
                    first_error.get_or_insert(e);
                }
            }
        }

        match first_error {
            Some(e) => Err(e.into()),
            None => Ok(imported),
        }
    }

    /// Number of unexpired records for a search type.
    pub async fn get_history_count(&self, search_type: SearchType) -> usize {
        self.get_history(search_type).await.len()
    }

    /// Previous searches whose suggestion field contains `query`.
    ///
    /// The suggestion field is the search type's primary field (for example
    /// `searchTerm` for business entity searches).
    pub async fn suggestions(&self, search_type: SearchType, query: &str) -> Vec<SearchRecord> {
        let records = self.get_history(search_type).await;
        filter_by_field(search_type.primary_field(), query, &records)
    }

    /// Formats a record for the search type's history list.
    pub fn get_history_display_value(
        &self,
        search_type: SearchType,
        record: &SearchRecord,
    ) -> HistoryDisplay {
        get_history_display_value(search_type, record)
    }

    async fn persist(&self, search_type: SearchType, records: &[SearchRecord]) -> HistoryResult<()> {
        let json = serde_json::to_string(records)?;
        self.store.set_item(search_type.storage_key(), &json).await?;
        Ok(())
    }
}
