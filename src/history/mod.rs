//! Search history tracking and persistence.
//!
//! This module remembers the searches users submit on each lookup form so
//! the forms can offer them again as suggestions or one-tap re-runs.
//!
//! # Features
//!
//! - One newest-first history per search type, capped at a fixed length
//! - Time-based expiry, applied whenever a history is read
//! - Blank form fields stripped before storage
//! - Export/import of all histories for backup and migration
//! - Display and suggestion formatting per search type
//!
//! # Example
//!
//! ```ignore
//! use history::{SearchHistoryService, SearchParams, SearchType};
//!
//! let service = SearchHistoryService::new(store);
//! service.save_search(SearchType::CaEntity, SearchParams::new().with("searchTerm", "Acme")).await?;
//! let suggestions = service.suggestions(SearchType::CaEntity, "ac").await;
//! ```

pub mod models;
pub mod search;
pub mod service;
pub mod ui;

// Re-export commonly used types
pub use models::{
    is_valid_search_type, DegradedReason, HistoryError, HistoryExport, HistoryLoad, HistoryResult,
    SearchParams, SearchRecord, SearchType, EXPIRY_DAYS, MAX_HISTORY_ITEMS,
};
pub use search::{
    distinct_values, filter_by_field, filter_since, get_recent_entries, search_history,
    sort_by_timestamp_desc,
};
pub use service::{Clock, SearchHistoryService, SystemClock};
pub use ui::{
    format_date, format_history_list, format_relative_time, format_suggestion,
    get_history_display_value, HistoryDisplay,
};
