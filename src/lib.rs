//! Search history cache for lookup forms.
//!
//! This crate remembers the searches a user submits on a set of lookup forms
//! (510(k) clearances, device recalls, adverse events, warning letters,
//! historical records, business entities) so the forms can suggest and
//! re-run them later.
//!
//! # Architecture
//!
//! The crate is organized into three modules:
//!
//! - **storage**: the asynchronous key-value store the history lives in,
//!   with in-memory and file-backed implementations
//! - **history**: the search history service, its record model, and
//!   search/display helpers
//! - **config**: tunable limits (item cap, expiry) loaded from JSON settings
//!
//! # History semantics
//!
//! Each search type keeps its own list under a fixed storage key:
//! 1. Saving a search strips blank fields, stamps an `id` and a `timestamp`,
//!    and prepends the record
//! 2. The list is cut to the configured maximum (10 by default)
//! 3. Reading drops records older than the expiry window (30 days by
//!    default) and writes the trimmed list back
//! 4. Read failures degrade to an empty history; write failures are returned
//!
//! # Usage
//!
//! ```no_run
//! use search_history::history::{SearchHistoryService, SearchParams, SearchType};
//! use search_history::storage::FileStore;
//!
//! # async fn example() -> Result<(), search_history::history::HistoryError> {
//! let service = SearchHistoryService::new(FileStore::new("/tmp/search-history"));
//!
//! let params = SearchParams::new()
//!     .with("k510Number", "K123456")
//!     .with("applicantName", "Acme");
//! service.save_search(SearchType::K510, params).await?;
//!
//! for record in service.get_history(SearchType::K510).await {
//!     let display = service.get_history_display_value(SearchType::K510, &record);
//!     println!("{}\n{}", display.title, display.details);
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod history;
pub mod storage;

pub use config::HistoryConfig;
pub use history::{
    HistoryError, HistoryLoad, SearchHistoryService, SearchParams, SearchRecord, SearchType,
};
pub use storage::{FileStore, KeyValueStore, MemoryStore, StoreError};
