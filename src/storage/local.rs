// src/storage/local.rs

//! Local filesystem store implementation.
//!
//! Keeps the notified keys of one table in a single JSON document for
//! development and local runs. Production deployments use `DynamoStore`.
//!
//! ## Storage Layout
//!
//! ```text
//! {root}/
//! └── {table}.json          # { updated_at, records: [{ EventKey, CreatedAt }] }
//! ```

use std::collections::HashSet;
use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::models::EventKey;
use crate::storage::{DedupStore, NotifiedRecord};

/// Contents of a table file.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TableData {
    /// Timestamp of the last write
    pub updated_at: Option<DateTime<Utc>>,
    /// Records in insertion order
    pub records: Vec<NotifiedRecord>,
}

/// Local filesystem store backend.
#[derive(Debug, Clone)]
pub struct LocalStore {
    root_dir: PathBuf,
    table: String,
}

impl LocalStore {
    /// Create a store for `table` rooted at the given directory.
    pub fn new(root_dir: impl Into<PathBuf>, table: impl Into<String>) -> Self {
        Self {
            root_dir: root_dir.into(),
            table: table.into(),
        }
    }

    /// Path of the table file.
    pub fn path(&self) -> PathBuf {
        self.root_dir.join(format!("{}.json", self.table))
    }

    /// Ensure parent directory exists.
    async fn ensure_dir(&self, path: &PathBuf) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write_bytes(&self, bytes: &[u8]) -> Result<()> {
        let path = self.path();
        self.ensure_dir(&path).await?;

        let tmp = path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }

    /// Read JSON data, returning None if the file doesn't exist.
    async fn read_json<T: DeserializeOwned>(&self) -> Result<Option<T>> {
        match tokio::fs::read(self.path()).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Io(e)),
        }
    }

    /// Load every record of the table.
    pub async fn load(&self) -> Result<TableData> {
        Ok(self.read_json::<TableData>().await?.unwrap_or_default())
    }
}

#[async_trait]
impl DedupStore for LocalStore {
    async fn existing_keys(&self, keys: &[EventKey]) -> Result<HashSet<EventKey>> {
        if keys.is_empty() {
            return Ok(HashSet::new());
        }

        let data = self.load().await?;
        let stored: HashSet<&EventKey> = data.records.iter().map(|r| &r.event_key).collect();

        Ok(keys
            .iter()
            .filter(|k| stored.contains(k))
            .cloned()
            .collect())
    }

    async fn put(&self, key: &EventKey, created_at: DateTime<Utc>) -> Result<()> {
        let mut data = self.load().await?;

        if data.records.iter().any(|r| &r.event_key == key) {
            log::debug!("{} already recorded in {}", key, self.table);
            return Ok(());
        }

        data.records.push(NotifiedRecord {
            event_key: key.clone(),
            created_at,
        });
        data.updated_at = Some(Utc::now());

        let bytes = serde_json::to_vec_pretty(&data)?;
        self.write_bytes(&bytes).await?;

        log::debug!("Recorded {} in {}", key, self.path().display());
        Ok(())
    }
}
