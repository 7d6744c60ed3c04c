// src/pipeline/run.rs

//! Notify run: find, gate, persist, notify.

use std::time::Instant;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::{Config, Opening};
use crate::pipeline::dedup::{key_openings, partition_new};
use crate::services::{Notifier, OpeningFinder};
use crate::storage::DedupStore;

/// Outcome of a notify run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Ok,
    ConfigurationMissing,
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Ok => "ok",
            RunStatus::ConfigurationMissing => "configuration_missing",
        }
    }
}

/// Summary returned to the caller of a notify run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RunSummary {
    pub status: RunStatus,
    pub new_openings: usize,
    pub total_openings: usize,
    pub execution_time_ms: u64,
}

impl RunSummary {
    pub fn configuration_missing(started: Instant) -> Self {
        Self {
            status: RunStatus::ConfigurationMissing,
            new_openings: 0,
            total_openings: 0,
            execution_time_ms: elapsed_ms(started),
        }
    }
}

/// Where a run sends and records things.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotifyTargets {
    /// Notification destination (topic ARN for SNS)
    pub destination: String,
    /// Dedup table name
    pub table: String,
}

impl NotifyTargets {
    /// Both targets, or `None` when either is unset.
    pub fn from_config(config: &Config) -> Option<Self> {
        match (&config.notify.destination, &config.store.table) {
            (Some(destination), Some(table)) => Some(Self {
                destination: destination.clone(),
                table: table.clone(),
            }),
            (destination, table) => {
                log::warn!(
                    "Missing configuration (destination set: {}, table set: {})",
                    destination.is_some(),
                    table.is_some()
                );
                None
            }
        }
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}

/// Run one pass.
///
/// Every new key is recorded before the notification goes out, so a failed
/// send is not retried on the next run.
pub async fn run_notify(
    finder: &OpeningFinder,
    store: &dyn DedupStore,
    notifier: &Notifier,
) -> Result<RunSummary> {
    let started = Instant::now();

    let openings = finder.find_openings().await?;
    let total_openings = openings.len();

    let candidates = key_openings(openings);
    let fresh = partition_new(&candidates, store).await?;

    for new in &fresh {
        store.put(&new.key, Utc::now()).await?;
    }

    if !fresh.is_empty() {
        let batch: Vec<&Opening> = fresh.iter().map(|n| &n.opening).collect();
        notifier.notify(&batch).await?;
    } else {
        log::info!("No new openings; nothing to send");
    }

    Ok(RunSummary {
        status: RunStatus::Ok,
        new_openings: fresh.len(),
        total_openings,
        execution_time_ms: elapsed_ms(started),
    })
}
