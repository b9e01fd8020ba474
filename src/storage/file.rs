//! File-backed key-value store.
//!
//! Each key is stored as its own file inside a directory. Keys are
//! percent-escaped into file names (`@search_history_k510` becomes
//! `%40search_history_k510.json`), so any key maps to exactly one file and
//! no key can escape the directory.
//!
//! Writes go to a uniquely named `.tmp` sibling first and are then renamed
//! over the target, so a crash mid-write leaves either the old value or the
//! new one, and concurrent writers to one key leave one complete value.

use super::{KeyValueStore, StoreResult};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// File extension used for stored values.
const VALUE_EXTENSION: &str = "json";

/// A [`KeyValueStore`] that keeps one file per key under `root`.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Creates a store rooted at `root`. The directory is created lazily on
    /// the first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the default storage directory.
    ///
    /// `~/.config/search-history` on Unix-like systems, or
    /// `%USERPROFILE%\AppData\Roaming\search-history` on Windows.
    pub fn default_dir() -> Option<PathBuf> {
        if let Some(home) = std::env::var_os("HOME") {
            Some(PathBuf::from(home).join(".config").join("search-history"))
        } else {
            std::env::var_os("USERPROFILE").map(|profile| {
                PathBuf::from(profile)
                    .join("AppData")
                    .join("Roaming")
                    .join("search-history")
            })
        }
    }

    /// The directory holding the value files.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the file holding `key`.
    pub fn path_for_key(&self, key: &str) -> PathBuf {
        self.root
            .join(format!("{}.{}", escape_key(key), VALUE_EXTENSION))
    }
}

/// Escapes every byte outside `[A-Za-z0-9_-]` as `%XX`.
fn escape_key(key: &str) -> String {
    let mut escaped = String::with_capacity(key.len());
    for byte in key.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'_' || byte == b'-' {
            escaped.push(byte as char);
        } else {
            escaped.push_str(&format!("%{:02X}", byte));
        }
    }
    escaped
}

async fn write_file(path: &Path, value: &str) -> std::io::Result<()> {
    let mut file = fs::File::create(path).await?;
    file.write_all(value.as_bytes()).await?;
    file.flush().await?;
    file.sync_all().await
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get_item(&self, key: &str) -> StoreResult<Option<String>> {
        match fs::read_to_string(self.path_for_key(key)).await {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn set_item(&self, key: &str, value: &str) -> StoreResult<()> {
        fs::create_dir_all(&self.root).await?;

        let path = self.path_for_key(key);
        // Unique per write so concurrent writers never share a temp file
        let temp_path = path.with_extension(format!(
            "{}.{}.tmp",
            VALUE_EXTENSION,
            uuid::Uuid::now_v7().simple()
        ));

        if let Err(e) = write_file(&temp_path, value).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        if let Err(e) = fs::rename(&temp_path, &path).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }
        tracing::trace!(key, path = %path.display(), "wrote value file");
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> StoreResult<()> {
        match fs::remove_file(self.path_for_key(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
