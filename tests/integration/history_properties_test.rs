//! Behavioural properties of the search history service
//!
//! These tests drive the public API over an in-memory store and check the
//! guarantees callers rely on: the item cap, newest-first ordering, expiry,
//! blank-field stripping and export/import round trips.

use super::TestClock;
use chrono::{Duration, TimeZone, Utc};
use proptest::prelude::*;
use search_history::history::{
    HistoryError, HistoryLoad, SearchHistoryService, SearchParams, SearchRecord, SearchType,
    MAX_HISTORY_ITEMS,
};
use search_history::storage::{KeyValueStore, MemoryStore};
use serde_json::Value;
use std::sync::Arc;

fn service_at_fixed_time() -> (SearchHistoryService<MemoryStore>, TestClock) {
    let clock = TestClock::starting_at(Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap());
    let service = SearchHistoryService::new(MemoryStore::new()).with_clock(clock.clone());
    (service, clock)
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .expect("Failed to build runtime")
}

#[tokio::test]
async fn test_k510_scenario() {
    let service = SearchHistoryService::new(MemoryStore::new());
    let params = SearchParams::new()
        .with("k510Number", "K123456")
        .with("applicantName", "Acme");

    service.save_search(SearchType::K510, params).await.unwrap();

    let history = service.get_history_by_name("K510").await.unwrap();
    let first = &history[0];
    assert_eq!(first.text("k510Number").as_deref(), Some("K123456"));
    assert_eq!(first.text("applicantName").as_deref(), Some("Acme"));
    assert!(first.get("deviceName").is_none());

    let age = Utc::now().signed_duration_since(first.timestamp);
    assert!(age >= Duration::zero() && age < Duration::seconds(1));
}

#[tokio::test]
async fn test_empty_params_yield_bare_record() {
    let (service, _) = service_at_fixed_time();

    service
        .save_search(SearchType::Fda, SearchParams::new())
        .await
        .unwrap();
    service
        .save_search(
            SearchType::Fda,
            SearchParams::new().with("a", "").with("b", Value::Null),
        )
        .await
        .unwrap();

    let raw = service
        .store()
        .get_item(SearchType::Fda.storage_key())
        .await
        .unwrap()
        .unwrap();
    let stored: Vec<serde_json::Map<String, Value>> = serde_json::from_str(&raw).unwrap();
    assert_eq!(stored.len(), 2);
    for record in stored {
        let mut keys: Vec<_> = record.keys().cloned().collect();
        keys.sort();
        assert_eq!(keys, vec!["id".to_string(), "timestamp".to_string()]);
    }
}

#[tokio::test]
async fn test_zero_and_false_are_retained() {
    let (service, _) = service_at_fixed_time();

    let history = service
        .save_search(
            SearchType::OpenHistorical,
            SearchParams::new().with("year", 0).with("exact", false),
        )
        .await
        .unwrap();

    assert_eq!(history[0].get("year"), Some(&Value::from(0)));
    assert_eq!(history[0].get("exact"), Some(&Value::Bool(false)));
}

#[tokio::test]
async fn test_expiry_is_idempotent() {
    let (service, clock) = service_at_fixed_time();

    service
        .save_search(SearchType::Maude, SearchParams::new().with("deviceName", "Pump"))
        .await
        .unwrap();
    clock.advance(Duration::days(31));

    assert!(service.get_history(SearchType::Maude).await.is_empty());
    assert!(service.get_history(SearchType::Maude).await.is_empty());
    assert!(matches!(
        service.load_history(SearchType::Maude).await,
        HistoryLoad::Loaded { pruned: 0, ref records } if records.is_empty()
    ));
}

#[tokio::test]
async fn test_clear_then_get_is_empty() {
    let (service, _) = service_at_fixed_time();

    for search_type in SearchType::ALL {
        service
            .save_search(search_type, SearchParams::new().with("deviceName", "Stent"))
            .await
            .unwrap();
        service.clear_history(search_type).await.unwrap();
        assert!(service.get_history(search_type).await.is_empty());
    }
}

#[tokio::test]
async fn test_unknown_type_is_rejected() {
    let (service, _) = service_at_fixed_time();

    assert!(matches!(
        service.get_history_by_name("NOT_A_TYPE").await,
        Err(HistoryError::InvalidSearchType(ref name)) if name == "NOT_A_TYPE"
    ));
    assert!(matches!(
        service
            .save_search_by_name("NOT_A_TYPE", SearchParams::new())
            .await,
        Err(HistoryError::InvalidSearchType(_))
    ));
}

#[tokio::test]
async fn test_export_import_round_trip() {
    let (source, _) = service_at_fixed_time();
    source
        .save_search(SearchType::CaEntity, SearchParams::new().with("searchTerm", "Acme"))
        .await
        .unwrap();
    source
        .save_search(SearchType::Cdph, SearchParams::new().with("firmName", "Globex"))
        .await
        .unwrap();
    source
        .save_search(SearchType::Cdph, SearchParams::new().with("deviceName", "Pump"))
        .await
        .unwrap();

    let export = source.export_history(None).await;

    // Re-import into the same service
    let imported = source.import_history(&export).await.unwrap();
    assert_eq!(imported, SearchType::ALL.len());
    for search_type in SearchType::ALL {
        assert_eq!(source.get_history(search_type).await, export[&search_type]);
    }

    // And through JSON into a fresh service
    let json = serde_json::to_string(&export).unwrap();
    let data: serde_json::Map<String, Value> = serde_json::from_str(&json).unwrap();
    let (target, _) = service_at_fixed_time();
    target.import_history(&data).await.unwrap();
    for search_type in SearchType::ALL {
        assert_eq!(target.get_history(search_type).await, export[&search_type]);
    }
}

#[tokio::test]
async fn test_shared_service_across_tasks() {
    let service = Arc::new(SearchHistoryService::new(MemoryStore::new()));

    let writer = {
        let service = Arc::clone(&service);
        async move {
            service
                .save_search(SearchType::WarningLetter, SearchParams::new().with("firmName", "Acme"))
                .await
                .unwrap();
        }
    };
    let reader = {
        let service = Arc::clone(&service);
        async move { service.get_history(SearchType::WarningLetter).await.len() }
    };

    let ((), seen) = futures::join!(writer, reader);
    assert!(seen <= 1);
    assert_eq!(service.get_history_count(SearchType::WarningLetter).await, 1);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_history_keeps_most_recent_newest_first(count in 1usize..30) {
        let rt = runtime();
        let (service, clock) = service_at_fixed_time();

        let history: Vec<SearchRecord> = rt.block_on(async {
            for i in 0..count {
                clock.advance(Duration::seconds(1));
                service
                    .save_search(SearchType::K510, SearchParams::new().with("k510Number", format!("K{:06}", i)))
                    .await
                    .unwrap();
            }
            service.get_history(SearchType::K510).await
        });

        let expected = count.min(MAX_HISTORY_ITEMS);
        prop_assert_eq!(history.len(), expected);
        for (position, record) in history.iter().enumerate() {
            let submitted = count - 1 - position;
            prop_assert_eq!(record.text("k510Number"), Some(format!("K{:06}", submitted)));
        }
        prop_assert!(history.windows(2).all(|pair| pair[0].timestamp >= pair[1].timestamp));
    }
}
