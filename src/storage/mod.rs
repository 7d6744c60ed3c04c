// src/storage/mod.rs

//! Storage abstractions for notified event keys.
//!
//! The store holds one record per event key ever notified. Records are
//! created once and never updated or deleted here; expiry is left to the
//! backing table.

pub mod local;

#[cfg(feature = "aws")]
pub mod dynamo;

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::EventKey;

// Re-export for convenience
pub use local::LocalStore;

#[cfg(feature = "aws")]
pub use dynamo::DynamoStore;

/// Attribute name of the key column.
pub const KEY_ATTRIBUTE: &str = "EventKey";

/// Attribute name of the creation timestamp.
pub const CREATED_AT_ATTRIBUTE: &str = "CreatedAt";

/// One notified event key.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct NotifiedRecord {
    pub event_key: EventKey,
    pub created_at: DateTime<Utc>,
}

/// Trait for dedup store backends.
#[async_trait]
pub trait DedupStore: Send + Sync {
    /// Return the subset of `keys` already recorded.
    ///
    /// Backends with a batch size limit split the lookup themselves.
    async fn existing_keys(&self, keys: &[EventKey]) -> Result<HashSet<EventKey>>;

    /// Record `key` as notified.
    async fn put(&self, key: &EventKey, created_at: DateTime<Utc>) -> Result<()>;
}
