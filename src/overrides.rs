//! Operator overrides: a tiny durable key-value store, the server-side
//! stand-in for the browser's localStorage.

use crate::errors::SourceError;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Mutex;
use tokio::fs;

#[async_trait]
pub trait OverrideStore: Send + Sync {
    /// `Ok(None)` when the key was never set.
    async fn get(&self, key: &str) -> Result<Option<String>, SourceError>;
    async fn set(&self, key: &str, value: String) -> Result<(), SourceError>;
    async fn remove(&self, key: &str) -> Result<(), SourceError>;
}

#[derive(Default)]
pub struct MemoryOverrideStore {
    entries: Mutex<BTreeMap<String, String>>,
}

#[async_trait]
impl OverrideStore for MemoryOverrideStore {
    async fn get(&self, key: &str) -> Result<Option<String>, SourceError> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| SourceError::unavailable("override store poisoned"))?;
        Ok(entries.get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> Result<(), SourceError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| SourceError::unavailable("override store poisoned"))?;
        entries.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), SourceError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| SourceError::unavailable("override store poisoned"))?;
        entries.remove(key);
        Ok(())
    }
}

/// Keeps all overrides in one pretty-printed JSON object on disk.
pub struct FileOverrideStore {
    path: PathBuf,
}

impl FileOverrideStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    async fn load(&self) -> Result<BTreeMap<String, String>, SourceError> {
        match fs::read(&self.path).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(err) => Err(SourceError::unavailable(err)),
        }
    }

    async fn persist(&self, entries: &BTreeMap<String, String>) -> Result<(), SourceError> {
        let payload = serde_json::to_vec_pretty(entries)?;
        fs::write(&self.path, payload)
            .await
            .map_err(SourceError::unavailable)
    }
}

#[async_trait]
impl OverrideStore for FileOverrideStore {
    async fn get(&self, key: &str) -> Result<Option<String>, SourceError> {
        Ok(self.load().await?.remove(key))
    }

    async fn set(&self, key: &str, value: String) -> Result<(), SourceError> {
        let mut entries = self.load().await?;
        entries.insert(key.to_string(), value);
        self.persist(&entries).await
    }

    async fn remove(&self, key: &str) -> Result<(), SourceError> {
        let mut entries = self.load().await?;
        if entries.remove(key).is_some() {
            self.persist(&entries).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("overrides.json");

        FileOverrideStore::new(&path)
            .set("k", r#"{"enabled":true}"#.to_string())
            .await
            .unwrap();

        let reopened = FileOverrideStore::new(&path);
        assert_eq!(
            reopened.get("k").await.unwrap().as_deref(),
            Some(r#"{"enabled":true}"#)
        );

        reopened.remove("k").await.unwrap();
        assert!(reopened.get("k").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn missing_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileOverrideStore::new(dir.path().join("absent.json"));
        assert!(store.get("anything").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn corrupt_file_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("overrides.json");
        std::fs::write(&path, "{not json").unwrap();

        let err = FileOverrideStore::new(&path).get("k").await.unwrap_err();
        assert!(matches!(err, SourceError::Malformed(_)));
    }
}
