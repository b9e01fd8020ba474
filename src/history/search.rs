//! Search and suggestion helpers over search history.
//!
//! Forms use these to offer previous searches while the user types and to
//! narrow a long history list down to the records that matter.

use super::models::SearchRecord;
use chrono::{DateTime, Utc};
use serde_json::Value;

/// Searches records using case-insensitive substring matching.
///
/// Every string field of a record is searched. Numeric and boolean fields
/// are matched against their JSON text.
///
/// # Arguments
///
/// * `query` - The search term to match against
/// * `records` - The records to search through
///
/// # Returns
///
/// The matching records, in their original order. An empty query matches
/// everything.
///
/// # Example
///
/// ```ignore
/// use history::search_history;
///
/// let results = search_history("acme", &records);
/// ```
pub fn search_history(query: &str, records: &[SearchRecord]) -> Vec<SearchRecord> {
    if query.is_empty() {
        return records.to_vec();
    }

    let query_lower = query.to_lowercase();

    records
        .iter()
        .filter(|record| matches_query(record, &query_lower))
        .cloned()
        .collect()
}

fn matches_query(record: &SearchRecord, query_lower: &str) -> bool {
    record.fields.values().any(|value| match value {
        Value::String(s) => s.to_lowercase().contains(query_lower),
        Value::Number(n) => n.to_string().contains(query_lower),
        Value::Bool(b) => b.to_string().contains(query_lower),
        _ => false,
    })
}

/// Returns the records whose `field` contains `query`, ignoring case.
///
/// This drives the suggestion list under a form input: nothing is suggested
/// until the user has typed something other than whitespace, and records
/// without the field are never suggested.
pub fn filter_by_field(field: &str, query: &str, records: &[SearchRecord]) -> Vec<SearchRecord> {
    let query = query.trim();
    if query.is_empty() {
        return Vec::new();
    }

    let query_lower = query.to_lowercase();
    records
        .iter()
        .filter(|record| {
            record
                .text(field)
                .map(|text| text.to_lowercase().contains(&query_lower))
                .unwrap_or(false)
        })
        .cloned()
        .collect()
}

/// Returns the records submitted at or after `since`.
pub fn filter_since(since: DateTime<Utc>, records: &[SearchRecord]) -> Vec<SearchRecord> {
    records
        .iter()
        .filter(|record| record.timestamp >= since)
        .cloned()
        .collect()
}

/// Returns the distinct non-empty values of `field`, in first-seen order.
///
/// Useful for autocomplete lists where repeated searches for the same term
/// should appear once.
pub fn distinct_values(field: &str, records: &[SearchRecord]) -> Vec<String> {
    let mut values: Vec<String> = Vec::new();
    for text in records.iter().filter_map(|record| record.text(field)) {
        if !values.contains(&text) {
            values.push(text);
        }
    }
    values
}

/// Sorts records by timestamp, newest first.
pub fn sort_by_timestamp_desc(records: &[SearchRecord]) -> Vec<SearchRecord> {
    let mut sorted = records.to_vec();
    sorted.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    sorted
}

/// Returns the most recent `count` records.
pub fn get_recent_entries(count: usize, records: &[SearchRecord]) -> Vec<SearchRecord> {
    sort_by_timestamp_desc(records)
        .into_iter()
        .take(count)
        .collect()
}
