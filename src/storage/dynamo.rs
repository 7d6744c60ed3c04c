// src/storage/dynamo.rs

//! AWS DynamoDB store implementation.
//!
//! The table is keyed by a single string attribute, `EventKey`. Lookups use
//! `BatchGetItem` in chunks of at most 100 keys; writes use `PutItem`.

use std::collections::{BTreeSet, HashMap, HashSet};

use async_trait::async_trait;
use aws_sdk_dynamodb::Client;
use aws_sdk_dynamodb::types::{AttributeValue, KeysAndAttributes};
use chrono::{DateTime, SecondsFormat, Utc};
use tracing::{debug, info};

use crate::error::{AppError, Result};
use crate::models::EventKey;
use crate::storage::{CREATED_AT_ATTRIBUTE, DedupStore, KEY_ATTRIBUTE};

/// `BatchGetItem` key limit.
const BATCH_GET_LIMIT: usize = 100;

/// DynamoDB-backed dedup store.
#[derive(Clone)]
pub struct DynamoStore {
    client: Client,
    table: String,
}

impl DynamoStore {
    /// Create a new DynamoDB store instance.
    pub fn new(client: Client, table: impl Into<String>) -> Self {
        Self {
            client,
            table: table.into(),
        }
    }

    /// Create a store from the ambient AWS configuration.
    pub async fn from_env(table: impl Into<String>) -> Self {
        let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        Self::new(Client::new(&config), table)
    }

    fn key_item(key: &str) -> HashMap<String, AttributeValue> {
        HashMap::from([(KEY_ATTRIBUTE.to_string(), AttributeValue::S(key.to_string()))])
    }

    /// Look up one chunk of distinct keys.
    async fn fetch_chunk(&self, chunk: &[&str]) -> Result<Vec<String>> {
        let keys_and_attributes = KeysAndAttributes::builder()
            .set_keys(Some(chunk.iter().map(|k| Self::key_item(k)).collect()))
            .projection_expression("#k")
            .expression_attribute_names("#k", KEY_ATTRIBUTE)
            .build()
            .map_err(AppError::store)?;

        let output = self
            .client
            .batch_get_item()
            .request_items(&self.table, keys_and_attributes)
            .send()
            .await
            .map_err(|e| AppError::store(e.into_service_error()))?;

        // Unprocessed keys are not retried; treating them as absent would
        // re-notify, so the run fails instead.
        let unprocessed = output
            .unprocessed_keys()
            .and_then(|u| u.get(&self.table))
            .map(|k| k.keys().len())
            .unwrap_or(0);
        if unprocessed > 0 {
            return Err(AppError::store(format!(
                "{} keys left unprocessed by BatchGetItem on {}",
                unprocessed, self.table
            )));
        }

        let found = output
            .responses()
            .and_then(|r| r.get(&self.table))
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| item.get(KEY_ATTRIBUTE))
                    .filter_map(|value| value.as_s().ok())
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        Ok(found)
    }
}

#[async_trait]
impl DedupStore for DynamoStore {
    async fn existing_keys(&self, keys: &[EventKey]) -> Result<HashSet<EventKey>> {
        // BatchGetItem rejects duplicate keys within one request
        let distinct: BTreeSet<&str> = keys.iter().map(EventKey::as_str).collect();
        let distinct: Vec<&str> = distinct.into_iter().collect();

        let mut found = HashSet::new();
        for chunk in distinct.chunks(BATCH_GET_LIMIT) {
            for key in self.fetch_chunk(chunk).await? {
                found.insert(EventKey::from(key));
            }
        }

        debug!(
            "{} of {} keys already in {}",
            found.len(),
            distinct.len(),
            self.table
        );
        Ok(found)
    }

    async fn put(&self, key: &EventKey, created_at: DateTime<Utc>) -> Result<()> {
        self.client
            .put_item()
            .table_name(&self.table)
            .item(KEY_ATTRIBUTE, AttributeValue::S(key.to_string()))
            .item(
                CREATED_AT_ATTRIBUTE,
                AttributeValue::S(created_at.to_rfc3339_opts(SecondsFormat::Micros, false)),
            )
            .send()
            .await
            .map_err(|e| AppError::store(e.into_service_error()))?;

        info!("Recorded {} in {}", key, self.table);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_item_shape() {
        let item = DynamoStore::key_item("GAME#A");
        assert_eq!(item.len(), 1);
        assert_eq!(
            item.get("EventKey").and_then(|v| v.as_s().ok()).map(String::as_str),
            Some("GAME#A")
        );
    }
}
