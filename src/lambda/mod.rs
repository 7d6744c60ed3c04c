// src/lambda/mod.rs

//! AWS Lambda handlers.
//!
//! - `notify_handler`: scheduled run that finds openings, records new event
//!   keys in DynamoDB and publishes one SNS message when anything is new
//! - `probe_handler`: one diagnostic request against the GraphQL endpoint
//!
//! Both read their settings from the environment only.

use std::sync::Arc;
use std::time::{Duration, Instant};

use lambda_runtime::{Error as LambdaError, LambdaEvent};
use serde_json::Value;
use tracing::{info, instrument, warn};

use crate::error::Result;
use crate::models::{Config, ProbeResult};
use crate::pipeline::{NotifyTargets, RunSummary, run_notify};
use crate::services::{ConnectivityProbe, Notifier, OpeningFinder, SnsChannel};
use crate::storage::DynamoStore;
use crate::utils::http::HttpTransport;

/// Notifier entry point.
///
/// Failures are returned as handler errors so the invocation is marked failed.
#[instrument(skip(event))]
pub async fn notify_handler(
    event: LambdaEvent<Value>,
) -> std::result::Result<RunSummary, LambdaError> {
    let (payload, _context) = event.into_parts();
    info!("Notify run triggered: {}", payload);

    let summary = run_with_config(Config::from_env()).await?;
    Ok(summary)
}

/// Full notify run against AWS services.
///
/// Missing destination or table short-circuits before any network call.
pub async fn run_with_config(config: Config) -> Result<RunSummary> {
    let started = Instant::now();

    let Some(targets) = NotifyTargets::from_config(&config) else {
        warn!("SNS_TOPIC_ARN or DDB_TABLE_NAME not set; skipping run");
        return Ok(RunSummary::configuration_missing(started));
    };

    let timeout = Duration::from_secs(config.finder.timeout_secs);
    let transport = HttpTransport::new(&config.endpoint, timeout)?;
    let finder = OpeningFinder::new(Arc::new(transport), &config);

    let aws = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let store = DynamoStore::new(aws_sdk_dynamodb::Client::new(&aws), targets.table);
    let channel = SnsChannel::new(aws_sdk_sns::Client::new(&aws));
    let notifier = Notifier::new(Arc::new(channel), targets.destination, &config.notify);

    let mut summary = run_notify(&finder, &store, &notifier).await?;
    summary.execution_time_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

    info!(
        "Notify run completed: {} new of {} in {}ms",
        summary.new_openings, summary.total_openings, summary.execution_time_ms
    );
    Ok(summary)
}

/// Probe entry point. Never fails; the trigger payload is echoed back.
#[instrument(skip(event))]
pub async fn probe_handler(
    event: LambdaEvent<Value>,
) -> std::result::Result<ProbeResult, LambdaError> {
    let (payload, _context) = event.into_parts();
    let config = Config::from_env();

    let result = ConnectivityProbe::run_with_config(&config).await;
    info!(
        "Probe result: ok={} status={:?} classification={}",
        result.ok,
        result.outcome.http_status(),
        result.diagnosis.classification
    );

    Ok(result.with_event_echo(payload))
}
