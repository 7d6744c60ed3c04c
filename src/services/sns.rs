// src/services/sns.rs

//! AWS SNS notification channel.

use async_trait::async_trait;
use aws_sdk_sns::Client;
use tracing::info;

use crate::error::{AppError, Result};
use crate::services::notifier::NotificationChannel;

/// Publishes messages to an SNS topic; the destination is the topic ARN.
#[derive(Clone)]
pub struct SnsChannel {
    client: Client,
}

impl SnsChannel {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Create a channel from the ambient AWS configuration.
    pub async fn from_env() -> Self {
        let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        Self::new(Client::new(&config))
    }
}

#[async_trait]
impl NotificationChannel for SnsChannel {
    async fn send(&self, destination: &str, subject: &str, body: &str) -> Result<()> {
        let output = self
            .client
            .publish()
            .topic_arn(destination)
            .subject(subject)
            .message(body)
            .send()
            .await
            .map_err(|e| AppError::notify(e.into_service_error()))?;

        info!(
            "Published to {} (message id {:?})",
            destination,
            output.message_id()
        );
        Ok(())
    }
}
