//! # JSON Ledger Files
//!
//! Suppliers and expenses live in small JSON files (`suppliers.json`,
//! `expenses.json`), each a single array of records.
//!
//! ## Read-Modify-Write
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  update(|records| ...)                                                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  lock (tokio Mutex) ── other writers wait here                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  load  expenses.json ──► Vec<T>     (missing file = empty list)         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  closure applies the rule ── Err? ──► nothing written                   │
//! │       │ Ok                                                              │
//! │       ▼                                                                 │
//! │  write expenses.json.tmp, rename over expenses.json                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  unlock                                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The rename replaces the file in one step, so a crash mid-write leaves
//! either the old list or the new one, never a torn file.

use std::io::ErrorKind;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use sgventas_core::CoreResult;
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::DbResult;

/// A JSON array file guarded by an async lock.
#[derive(Debug)]
pub struct JsonStore<T> {
    path: PathBuf,
    lock: Mutex<()>,
    _records: PhantomData<fn() -> T>,
}

impl<T> JsonStore<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonStore {
            path: path.into(),
            lock: Mutex::new(()),
            _records: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the current list.
    pub async fn read(&self) -> DbResult<Vec<T>> {
        let _guard = self.lock.lock().await;
        self.load().await
    }

    /// Loads the list, lets `apply` change it, and saves it if `apply`
    /// succeeds. A rule violation leaves the file untouched.
    pub async fn update<R, F>(&self, apply: F) -> DbResult<R>
    where
        F: FnOnce(&mut Vec<T>) -> CoreResult<R>,
    {
        let _guard = self.lock.lock().await;

        let mut records = self.load().await?;
        let result = apply(&mut records)?;
        self.save(&records).await?;

        Ok(result)
    }

    async fn load(&self) -> DbResult<Vec<T>> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "Ledger file missing, starting empty");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn save(&self, records: &[T]) -> DbResult<()> {
        if let Some(dir) = self.path.parent() {
            tokio::fs::create_dir_all(dir).await?;
        }

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        let json = serde_json::to_vec_pretty(records)?;
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;

        debug!(
            path = %self.path.display(),
            count = records.len(),
            "Ledger file saved"
        );
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbError;
    use sgventas_core::CoreError;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_missing_file_reads_empty() {
        let dir = TempDir::new().unwrap();
        let store: JsonStore<String> = JsonStore::new(dir.path().join("names.json"));
        assert!(store.read().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_persists() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("names.json");
        let store: JsonStore<String> = JsonStore::new(&path);

        let len = store
            .update(|names| {
                names.push("Bimbo".to_string());
                names.push("Lala".to_string());
                Ok(names.len())
            })
            .await
            .unwrap();
        assert_eq!(len, 2);

        // A fresh handle sees the same file.
        let reopened: JsonStore<String> = JsonStore::new(&path);
        assert_eq!(reopened.read().await.unwrap(), vec!["Bimbo", "Lala"]);
        assert!(!dir.path().join("nested").join("names.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_failed_update_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let store: JsonStore<String> = JsonStore::new(dir.path().join("names.json"));
        store
            .update(|names| {
                names.push("Bimbo".to_string());
                Ok(())
            })
            .await
            .unwrap();

        let result: DbResult<()> = store
            .update(|names| {
                names.clear();
                Err(CoreError::EmptyCart)
            })
            .await;
        assert!(matches!(result, Err(DbError::Domain(CoreError::EmptyCart))));
        assert_eq!(store.read().await.unwrap(), vec!["Bimbo"]);
    }

    #[tokio::test]
    async fn test_corrupt_file_is_ledger_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("names.json");
        std::fs::write(&path, "{not json").unwrap();

        let store: JsonStore<String> = JsonStore::new(&path);
        assert!(matches!(store.read().await, Err(DbError::Ledger(_))));
    }
}
