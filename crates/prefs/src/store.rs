use std::collections::HashMap;
use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tokio::sync::RwLock;

use crate::{PreferenceFile, PreferenceRecord, Result, StoreError};

/// Borrowing view of the mapping used when flushing.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PreferenceFileRef<'a> {
    zip_codes: &'a HashMap<String, PreferenceRecord>,
}

/// Zip code preferences keyed by client id, persisted to a JSON file.
///
/// The in-memory mapping is authoritative. Every successful [`set`] rewrites
/// the whole file; writers are serialized by the write lock, readers only
/// contend with writers.
///
/// [`set`]: PreferenceStore::set
#[derive(Debug)]
pub struct PreferenceStore {
    path: PathBuf,
    records: RwLock<HashMap<String, PreferenceRecord>>,
}

impl PreferenceStore {
    /// Creates an empty store that will persist to `path`.
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            records: RwLock::new(HashMap::new()),
        }
    }

    /// Loads the store from `path`.
    ///
    /// A missing, unreadable or malformed file yields an empty store.
    pub async fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let records = match load(&path).await {
            Ok(file) => {
                tracing::info!(
                    path = %path.display(),
                    count = file.zip_codes.len(),
                    "loaded preference store"
                );
                file.zip_codes
            }
            Err(StoreError::Io(e)) if e.kind() == ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "no preference file, starting empty");
                HashMap::new()
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "could not read preference file, starting empty"
                );
                HashMap::new()
            }
        };

        Self {
            path,
            records: RwLock::new(records),
        }
    }

    /// Looks up the record for `client_id`.
    pub async fn get(&self, client_id: &str) -> Option<PreferenceRecord> {
        self.records.read().await.get(client_id).cloned()
    }

    /// Replaces the record for `client_id` and flushes to disk.
    ///
    /// Only fails on an empty `client_id` or `zip`; whitespace is stored
    /// as given. A failed flush is logged and the in-memory
    /// write still stands.
    #[tracing::instrument(skip(self, zip))]
    pub async fn set(&self, client_id: &str, zip: &str) -> Result<PreferenceRecord> {
        if client_id.is_empty() || zip.is_empty() {
            return Err(StoreError::Validation(
                "clientId and zip required".to_string(),
            ));
        }

        let record = PreferenceRecord::new(zip);
        let mut records = self.records.write().await;
        records.insert(client_id.to_string(), record.clone());
        metrics::counter!("prefs_writes_total").increment(1);

        if let Err(e) = write_file(&self.path, &records).await {
            metrics::counter!("prefs_flush_failures_total").increment(1);
            tracing::warn!(
                path = %self.path.display(),
                error = %e,
                "could not write preference file"
            );
        }

        Ok(record)
    }

    /// Writes the current mapping to disk.
    pub async fn flush(&self) -> Result<()> {
        let records = self.records.write().await;
        write_file(&self.path, &records).await
    }

    /// Number of stored records.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// Returns true if no records are stored.
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

async fn load(path: &Path) -> Result<PreferenceFile> {
    let bytes = tokio::fs::read(path).await?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Writes to a sibling temp file, then renames over `path`.
///
/// The temp file is removed if the rename fails.
async fn write_file(path: &Path, records: &HashMap<String, PreferenceRecord>) -> Result<()> {
    let json = serde_json::to_vec_pretty(&PreferenceFileRef {
        zip_codes: records,
    })?;

    let mut tmp = OsString::from(path.as_os_str());
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    tokio::fs::write(&tmp, json).await?;
    if let Err(e) = tokio::fs::rename(&tmp, path).await {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(e.into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::Utc;

    use super::*;

    fn temp_path(dir: &tempfile::TempDir) -> PathBuf {
        dir.path().join("data.json")
    }

    #[tokio::test]
    async fn set_then_get_returns_record() {
        let dir = tempfile::tempdir().unwrap();
        let store = PreferenceStore::open(temp_path(&dir)).await;

        let before = Utc::now();
        store.set("client-1", "94110").await.unwrap();

        let record = store.get("client-1").await.unwrap();
        assert_eq!(record.zip, "94110");
        assert!(record.updated_at >= before);
    }

    #[tokio::test]
    async fn get_unknown_returns_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = PreferenceStore::open(temp_path(&dir)).await;
        assert!(store.get("nobody").await.is_none());
    }

    #[tokio::test]
    async fn second_set_replaces_first() {
        let dir = tempfile::tempdir().unwrap();
        let store = PreferenceStore::open(temp_path(&dir)).await;

        store.set("client-1", "10001").await.unwrap();
        store.set("client-1", "60614").await.unwrap();

        assert_eq!(store.len().await, 1);
        assert_eq!(store.get("client-1").await.unwrap().zip, "60614");
    }

    #[tokio::test]
    async fn empty_input_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = PreferenceStore::open(temp_path(&dir)).await;

        assert!(matches!(
            store.set("", "10001").await,
            Err(StoreError::Validation(_))
        ));
        assert!(matches!(
            store.set("client-1", "").await,
            Err(StoreError::Validation(_))
        ));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn whitespace_values_are_stored_as_given() {
        let dir = tempfile::tempdir().unwrap();
        let store = PreferenceStore::open(temp_path(&dir)).await;

        store.set(" ", " ").await.unwrap();
        assert_eq!(store.get(" ").await.unwrap().zip, " ");
    }

    #[tokio::test]
    async fn records_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = temp_path(&dir);

        let store = PreferenceStore::open(&path).await;
        for i in 0..5 {
            store
                .set(&format!("client-{i}"), &format!("0000{i}"))
                .await
                .unwrap();
        }
        let originals: Vec<_> = {
            let mut v = Vec::new();
            for i in 0..5 {
                v.push(store.get(&format!("client-{i}")).await.unwrap());
            }
            v
        };
        drop(store);

        let reopened = PreferenceStore::open(&path).await;
        assert_eq!(reopened.len().await, 5);
        for (i, original) in originals.iter().enumerate() {
            let record = reopened.get(&format!("client-{i}")).await.unwrap();
            assert_eq!(&record, original);
        }
    }

    #[tokio::test]
    async fn file_is_pretty_printed_with_zip_codes_field() {
        let dir = tempfile::tempdir().unwrap();
        let path = temp_path(&dir);
        let store = PreferenceStore::open(&path).await;
        store.set("abc", "02139").await.unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains('\n'));
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(json["zipCodes"]["abc"]["zip"], "02139");
        assert!(json["zipCodes"]["abc"]["updatedAt"].is_string());
    }

    #[tokio::test]
    async fn malformed_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = temp_path(&dir);
        std::fs::write(&path, "{ not json").unwrap();

        let store = PreferenceStore::open(&path).await;
        assert!(store.is_empty().await);

        store.set("abc", "02139").await.unwrap();
        let reopened = PreferenceStore::open(&path).await;
        assert_eq!(reopened.get("abc").await.unwrap().zip, "02139");
    }

    #[tokio::test]
    async fn flush_failure_does_not_fail_set() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing-dir").join("data.json");
        let store = PreferenceStore::open(&path).await;

        let record = store.set("abc", "02139").await.unwrap();
        assert_eq!(store.get("abc").await, Some(record));
        assert!(matches!(store.flush().await, Err(StoreError::Io(_))));
    }

    #[tokio::test]
    async fn failed_rename_removes_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        // A directory at the target path makes the rename fail.
        let path = temp_path(&dir);
        std::fs::create_dir(&path).unwrap();
        let store = PreferenceStore::empty(&path);

        store.set("abc", "02139").await.unwrap();
        assert!(matches!(store.flush().await, Err(StoreError::Io(_))));
        assert!(!dir.path().join("data.json.tmp").exists());
    }

    #[tokio::test]
    async fn concurrent_sets_leave_valid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = temp_path(&dir);
        let store = Arc::new(PreferenceStore::open(&path).await);

        let mut handles = Vec::new();
        for i in 0..20 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store
                    .set(&format!("client-{i}"), &format!("{i:05}"))
                    .await
                    .unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let reopened = PreferenceStore::open(&path).await;
        assert_eq!(reopened.len().await, 20);
        assert_eq!(reopened.get("client-7").await.unwrap().zip, "00007");
    }
}
