// src/bin/probe_lambda.rs

//! AWS Lambda entry point for the connectivity probe.

use lambda_runtime::{Error as LambdaError, service_fn};
use slotwatch::lambda::probe_handler;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), LambdaError> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    info!("slotwatch probe starting");
    lambda_runtime::run(service_fn(probe_handler)).await
}
