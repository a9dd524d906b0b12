//! Versioned JSON document behind the file stores.
//!
//! The whole collection is held in memory. Every change rewrites the file
//! through a temporary sibling and a rename, so a crash leaves either the old
//! or the new contents. Mutations are applied to a copy and only become
//! visible once the write succeeded.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::application::ports::{AccountStoreError, JobStoreError, VaultError};
use crate::domain::order_execution::OrderError;

const FILE_FORMAT_VERSION: u32 = 1;

/// File store failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FileStoreError {
    /// Reading or writing the file failed.
    #[error("{0}")]
    Io(String),

    /// The file contents could not be encoded or decoded.
    #[error("{0}")]
    Serialization(String),
}

#[derive(Debug, Serialize, Deserialize)]
struct Document<T> {
    version: u32,
    entries: Vec<T>,
}

/// Keyed collection persisted as one JSON file.
#[derive(Debug)]
pub struct JsonFileMap<K, V> {
    path: PathBuf,
    entries: Mutex<BTreeMap<K, V>>,
}

impl<K, V> JsonFileMap<K, V>
where
    K: Ord + Clone + Send,
    V: Serialize + DeserializeOwned + Clone + PartialEq + Send,
{
    /// Open the file at `path`, keying each stored entry with `key_of`.
    ///
    /// A missing or blank file is an empty collection; its parent directory
    /// is created.
    pub async fn open(path: impl Into<PathBuf>, key_of: fn(&V) -> K) -> Result<Self, FileStoreError> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| FileStoreError::Io(format!("{}: {e}", parent.display())))?;
        }

        let entries = match tokio::fs::read(&path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => BTreeMap::new(),
            Ok(bytes) => {
                let document: Document<V> = serde_json::from_slice(&bytes)
                    .map_err(|e| FileStoreError::Serialization(format!("{}: {e}", path.display())))?;
                if document.version != FILE_FORMAT_VERSION {
                    return Err(FileStoreError::Serialization(format!(
                        "{}: unsupported file version {}",
                        path.display(),
                        document.version
                    )));
                }
                document
                    .entries
                    .into_iter()
                    .map(|entry| (key_of(&entry), entry))
                    .collect()
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(FileStoreError::Io(format!("{}: {e}", path.display()))),
        };

        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    /// Location of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Run `f` against the current entries.
    pub async fn read<R>(&self, f: impl FnOnce(&BTreeMap<K, V>) -> R) -> R {
        f(&*self.entries.lock().await)
    }

    /// Apply `f` to a copy of the entries and persist the copy.
    ///
    /// Nothing changes when `f` fails or the write fails. An update that
    /// leaves the entries unchanged does not touch the file.
    pub async fn update<R, E>(
        &self,
        f: impl FnOnce(&mut BTreeMap<K, V>) -> Result<R, E>,
    ) -> Result<R, E>
    where
        E: From<FileStoreError>,
    {
        let mut entries = self.entries.lock().await;
        let mut next = entries.clone();
        let out = f(&mut next)?;
        if next != *entries {
            self.persist(&next).await?;
            *entries = next;
        }
        Ok(out)
    }

    async fn persist(&self, entries: &BTreeMap<K, V>) -> Result<(), FileStoreError> {
        let document = Document {
            version: FILE_FORMAT_VERSION,
            entries: entries.values().collect(),
        };
        let bytes = serde_json::to_vec_pretty(&document)
            .map_err(|e| FileStoreError::Serialization(e.to_string()))?;

        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, &bytes)
            .await
            .map_err(|e| FileStoreError::Io(format!("{}: {e}", tmp.display())))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| FileStoreError::Io(format!("{}: {e}", self.path.display())))
    }
}

impl From<FileStoreError> for JobStoreError {
    fn from(err: FileStoreError) -> Self {
        match err {
            FileStoreError::Io(message) => Self::Io(message),
            FileStoreError::Serialization(message) => Self::Serialization(message),
        }
    }
}

impl From<FileStoreError> for OrderError {
    fn from(err: FileStoreError) -> Self {
        Self::Storage(err.to_string())
    }
}

impl From<FileStoreError> for AccountStoreError {
    fn from(err: FileStoreError) -> Self {
        Self(err.to_string())
    }
}

impl From<FileStoreError> for VaultError {
    fn from(err: FileStoreError) -> Self {
        Self::Storage(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Entry {
        name: String,
        count: u32,
    }

    fn entry(name: &str, count: u32) -> Entry {
        Entry {
            name: name.to_string(),
            count,
        }
    }

    async fn open(path: &Path) -> JsonFileMap<String, Entry> {
        JsonFileMap::open(path, |e: &Entry| e.name.clone()).await.unwrap()
    }

    #[tokio::test]
    async fn failed_update_changes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("entries.json");
        let map = open(&path).await;

        map.update(|m| {
            m.insert("a".to_string(), entry("a", 1));
            Ok::<_, FileStoreError>(())
        })
        .await
        .unwrap();

        let result = map
            .update(|m| {
                m.insert("b".to_string(), entry("b", 2));
                Err::<(), _>(FileStoreError::Io("refused".to_string()))
            })
            .await;
        assert!(result.is_err());
        assert_eq!(map.read(BTreeMap::len).await, 1);

        let reopened = open(&path).await;
        assert_eq!(
            reopened.read(|m| m.values().cloned().collect::<Vec<_>>()).await,
            vec![entry("a", 1)]
        );
    }

    #[tokio::test]
    async fn unchanged_update_does_not_create_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("entries.json");
        let map = open(&path).await;

        let removed = map
            .update(|m| Ok::<_, FileStoreError>(m.remove("missing").is_some()))
            .await
            .unwrap();

        assert!(!removed);
        assert!(!path.exists());
        assert_eq!(map.path(), path.as_path());
    }

    #[tokio::test]
    async fn unknown_version_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("entries.json");
        std::fs::write(&path, br#"{"version": 9, "entries": []}"#).unwrap();

        let err = JsonFileMap::<String, Entry>::open(&path, |e| e.name.clone())
            .await
            .unwrap_err();
        assert!(matches!(err, FileStoreError::Serialization(_)));
    }
}
