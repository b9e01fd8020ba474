//! UI formatting utilities for history display.
//!
//! This module turns search records into the strings shown in history
//! lists and suggestion dropdowns. It holds no state; everything here is a
//! pure function of its arguments.

use super::models::{SearchRecord, SearchType};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

/// Title used when a record has none of its type's title fields.
pub const FALLBACK_TITLE: &str = "Search";

/// A record rendered for a history list: one bold line and a few detail
/// lines underneath.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryDisplay {
    pub title: String,
    /// Detail lines joined with `\n`.
    pub details: String,
}

/// Formats a record for display in its search type's history list.
///
/// Each search type picks its own title fields (first populated wins) and
/// detail lines. Dates render as `M/D/YYYY`.
///
/// # Example
///
/// ```ignore
/// let display = get_history_display_value(SearchType::Cdph, &record);
/// // display.title   == "Infusion Pump"
/// // display.details == "Device: Infusion Pump\nFirm: Acme"
/// ```
pub fn get_history_display_value(search_type: SearchType, record: &SearchRecord) -> HistoryDisplay {
    let (title, details) = match search_type {
        SearchType::K510 => (
            first_text(record, &["k510Number", "applicantName", "deviceName"]),
            join_lines(vec![
                labelled(record, "510K", "k510Number"),
                labelled(record, "Applicant", "applicantName"),
                labelled(record, "Device", "deviceName"),
                date_range(record),
            ]),
        ),
        SearchType::Fda => (
            first_text(record, &["productDescription", "recallingFirm", "recallNumber"]),
            join_lines(vec![
                labelled(record, "Product", "productDescription"),
                labelled(record, "Firm", "recallingFirm"),
                labelled(record, "Recall #", "recallNumber"),
                labelled(record, "Class", "recallClass"),
                date_range(record),
            ]),
        ),
        SearchType::Maude => (
            first_text(record, &["deviceName"]),
            join_lines(vec![labelled(record, "Device", "deviceName"), date_range(record)]),
        ),
        SearchType::WarningLetter => (
            first_text(record, &["firmName"]),
            format!("Last Searched: {}", format_timestamp_date(&record.timestamp)),
        ),
        SearchType::OpenHistorical => (
            first_text(record, &["keyword"]),
            join_lines(vec![
                labelled(record, "Keyword", "keyword"),
                labelled(record, "Year", "year"),
            ]),
        ),
        SearchType::CaEntity => (
            first_text(record, &["searchTerm"]),
            format!(
                "Business Search: {}",
                record.text("searchTerm").unwrap_or_default()
            ),
        ),
        SearchType::Cdph => (
            first_text(record, &["deviceName", "firmName"]),
            join_lines(vec![
                labelled(record, "Device", "deviceName"),
                labelled(record, "Firm", "firmName"),
            ]),
        ),
    };

    HistoryDisplay {
        title: title.unwrap_or_else(|| FALLBACK_TITLE.to_string()),
        details,
    }
}

fn first_text(record: &SearchRecord, fields: &[&str]) -> Option<String> {
    fields.iter().find_map(|field| record.text(field))
}

fn labelled(record: &SearchRecord, label: &str, field: &str) -> Option<String> {
    record.text(field).map(|text| format!("{}: {}", label, text))
}

fn date_range(record: &SearchRecord) -> Option<String> {
    let from = record.text("fromDate")?;
    let to = record.text("toDate")?;
    Some(format!("Date: {} to {}", format_date(&from), format_date(&to)))
}

fn join_lines(lines: Vec<Option<String>>) -> String {
    lines.into_iter().flatten().collect::<Vec<_>>().join("\n")
}

/// Formats a stored date string as `M/D/YYYY`.
///
/// Accepts plain `YYYY-MM-DD` dates and RFC 3339 timestamps. Anything else
/// is returned unchanged.
pub fn format_date(value: &str) -> String {
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return date.format("%-m/%-d/%Y").to_string();
    }
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(value) {
        return format_timestamp_date(&timestamp.with_timezone(&Utc));
    }
    value.to_string()
}

/// Formats the UTC calendar date of a timestamp as `M/D/YYYY`.
pub fn format_timestamp_date(timestamp: &DateTime<Utc>) -> String {
    timestamp.format("%-m/%-d/%Y").to_string()
}

/// Formats a relative time description (e.g. "2 hours ago", "yesterday")
/// measured against `now`.
pub fn format_relative_time(timestamp: &DateTime<Utc>, now: DateTime<Utc>) -> String {
    let duration = now.signed_duration_since(*timestamp);

    if duration.num_seconds() < 60 {
        "just now".to_string()
    } else if duration.num_minutes() < 60 {
        let minutes = duration.num_minutes();
        format!("{} minute{} ago", minutes, plural(minutes))
    } else if duration.num_hours() < 24 {
        let hours = duration.num_hours();
        format!("{} hour{} ago", hours, plural(hours))
    } else if duration.num_days() == 1 {
        "yesterday".to_string()
    } else if duration.num_days() < 7 {
        format!("{} days ago", duration.num_days())
    } else {
        let weeks = duration.num_weeks();
        format!("{} week{} ago", weeks, plural(weeks))
    }
}

fn plural(n: i64) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}

/// Formats one line of a suggestion dropdown: the suggested value and when
/// it was last searched.
///
/// Returns `None` if the record has no value for `field`.
pub fn format_suggestion(field: &str, record: &SearchRecord) -> Option<(String, String)> {
    let primary = record.text(field)?;
    let secondary = format!("Last searched: {}", format_timestamp_date(&record.timestamp));
    Some((primary, secondary))
}

/// Formats a history list, one `title (relative time)` line per record.
pub fn format_history_list(
    search_type: SearchType,
    records: &[SearchRecord],
    now: DateTime<Utc>,
) -> Vec<String> {
    records
        .iter()
        .map(|record| {
            let display = get_history_display_value(search_type, record);
            format!(
                "{} ({})",
                display.title,
                format_relative_time(&record.timestamp, now)
            )
        })
        .collect()
}
