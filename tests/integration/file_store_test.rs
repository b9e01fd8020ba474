//! File-backed history integration tests
//!
//! These tests run the history service over a `FileStore` in a temporary
//! directory and check what ends up on disk.

use search_history::config::load_config;
use search_history::history::{DegradedReason, HistoryLoad, SearchHistoryService, SearchParams, SearchType};
use search_history::storage::{FileStore, KeyValueStore};
use serde_json::json;
use std::fs;
use tempfile::TempDir;

fn file_service(dir: &TempDir) -> SearchHistoryService<FileStore> {
    SearchHistoryService::new(FileStore::new(dir.path()))
}

#[tokio::test]
async fn test_history_survives_service_restart() {
    let temp_dir = TempDir::new().unwrap();

    {
        let service = file_service(&temp_dir);
        service
            .save_search(SearchType::CaEntity, SearchParams::new().with("searchTerm", "Acme"))
            .await
            .unwrap();
    }

    let service = file_service(&temp_dir);
    let history = service.get_history(SearchType::CaEntity).await;
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].text("searchTerm").as_deref(), Some("Acme"));
}

#[tokio::test]
async fn test_one_file_per_search_type() {
    let temp_dir = TempDir::new().unwrap();
    let service = file_service(&temp_dir);

    service
        .save_search(SearchType::K510, SearchParams::new().with("k510Number", "K1"))
        .await
        .unwrap();
    service
        .save_search(SearchType::Cdph, SearchParams::new().with("firmName", "Acme"))
        .await
        .unwrap();

    let mut names: Vec<String> = fs::read_dir(temp_dir.path())
        .unwrap()
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    assert_eq!(
        names,
        vec![
            "%40search_history_cdph.json".to_string(),
            "%40search_history_k510.json".to_string(),
        ]
    );

    // Stored as a JSON array of flat records
    let contents = fs::read_to_string(service.store().path_for_key(SearchType::K510.storage_key())).unwrap();
    let stored: serde_json::Value = serde_json::from_str(&contents).unwrap();
    assert_eq!(stored[0]["k510Number"], json!("K1"));
}

#[tokio::test]
async fn test_corrupted_file_reads_as_degraded() {
    let temp_dir = TempDir::new().unwrap();
    let service = file_service(&temp_dir);

    let path = service.store().path_for_key(SearchType::Fda.storage_key());
    fs::write(&path, "[{\"truncated\": ").unwrap();

    assert!(matches!(
        service.load_history(SearchType::Fda).await,
        HistoryLoad::Degraded(DegradedReason::Corrupted(_))
    ));
    assert!(service.get_history(SearchType::Fda).await.is_empty());

    // Saving replaces the corrupted file
    service
        .save_search(SearchType::Fda, SearchParams::new().with("recallNumber", "Z-1"))
        .await
        .unwrap();
    assert_eq!(service.get_history(SearchType::Fda).await.len(), 1);
}

#[tokio::test]
async fn test_clear_all_removes_files() {
    let temp_dir = TempDir::new().unwrap();
    let service = file_service(&temp_dir);

    for search_type in SearchType::ALL {
        service
            .save_search(search_type, SearchParams::new().with("keyword", "valve"))
            .await
            .unwrap();
    }
    assert_eq!(fs::read_dir(temp_dir.path()).unwrap().count(), SearchType::ALL.len());

    service.clear_all_history().await.unwrap();
    assert_eq!(fs::read_dir(temp_dir.path()).unwrap().count(), 0);

    // Clearing again is fine: nothing left to remove
    service.clear_all_history().await.unwrap();
}

#[tokio::test]
async fn test_configured_service_over_files() {
    let temp_dir = TempDir::new().unwrap();
    let config = load_config(Some(json!({
        "search-history": {
            "maxHistoryItems": 3,
            "storageDir": temp_dir.path()
        }
    })))
    .unwrap();

    let dir = config.storage_dir.clone().unwrap();
    let service = SearchHistoryService::with_config(FileStore::new(dir), config).unwrap();

    for i in 0..5 {
        service
            .save_search(SearchType::WarningLetter, SearchParams::new().with("firmName", format!("Firm {}", i)))
            .await
            .unwrap();
    }

    let history = service.get_history(SearchType::WarningLetter).await;
    assert_eq!(history.len(), 3);
    assert_eq!(history[0].text("firmName").as_deref(), Some("Firm 4"));
}

#[tokio::test]
async fn test_import_into_file_store() {
    let temp_dir = TempDir::new().unwrap();
    let service = file_service(&temp_dir);

    let data = json!({
        "OPEN_HISTORICAL": [{
            "timestamp": chrono::Utc::now().to_rfc3339(),
            "id": 1700000000000u64,
            "keyword": "defibrillator",
            "year": "1998"
        }],
        "SOMETHING_ELSE": []
    });

    let imported = service.import_history(data.as_object().unwrap()).await.unwrap();
    assert_eq!(imported, 1);

    let history = service.get_history(SearchType::OpenHistorical).await;
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].id, "1700000000000");

    assert!(service
        .store()
        .get_item("SOMETHING_ELSE")
        .await
        .unwrap()
        .is_none());
}
