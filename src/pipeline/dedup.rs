// src/pipeline/dedup.rs

//! Dedup gate.
//!
//! Filters keyed openings down to the ones whose key the store has never
//! seen. The gate only reads the store; persisting new keys is left to the
//! run so that it can happen before notification.

use std::collections::HashSet;

use crate::error::Result;
use crate::models::{EventKey, Opening};
use crate::storage::DedupStore;

/// An opening whose key is not yet recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOpening {
    pub opening: Opening,
    pub key: EventKey,
}

/// Pair each opening with its event key, keeping order.
pub fn key_openings(openings: Vec<Opening>) -> Vec<(Opening, EventKey)> {
    openings
        .into_iter()
        .map(|opening| {
            let key = EventKey::derive(&opening);
            (opening, key)
        })
        .collect()
}

/// Return the candidates whose key is absent from `store`.
///
/// Relative order is preserved. A key repeated within `candidates` is kept
/// once, at its first occurrence.
pub async fn partition_new(
    candidates: &[(Opening, EventKey)],
    store: &dyn DedupStore,
) -> Result<Vec<NewOpening>> {
    if candidates.is_empty() {
        return Ok(Vec::new());
    }

    let keys: Vec<EventKey> = candidates.iter().map(|(_, key)| key.clone()).collect();
    let existing = store.existing_keys(&keys).await?;

    let mut seen: HashSet<&EventKey> = HashSet::new();
    let mut fresh = Vec::new();
    for (opening, key) in candidates {
        if existing.contains(key) || !seen.insert(key) {
            continue;
        }
        fresh.push(NewOpening {
            opening: opening.clone(),
            key: key.clone(),
        });
    }

    log::info!(
        "{} of {} openings are new ({} already notified)",
        fresh.len(),
        candidates.len(),
        existing.len()
    );

    Ok(fresh)
}
