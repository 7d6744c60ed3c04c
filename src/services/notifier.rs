// src/services/notifier.rs

//! Opening notifications.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{NotifyConfig, Opening};

/// Outbound message channel.
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    async fn send(&self, destination: &str, subject: &str, body: &str) -> Result<()>;
}

/// Render one line per opening under `header`.
pub fn format_message<'a>(
    header: &str,
    openings: impl IntoIterator<Item = &'a Opening>,
) -> String {
    let mut lines = vec![header.to_string()];
    lines.extend(openings.into_iter().map(format_line));
    lines.join("\n")
}

/// `- {program} @ {venue} {when} ({spots} spots)`
pub fn format_line(opening: &Opening) -> String {
    format!(
        "- {} @ {} {} ({} spots)",
        opening.program_label(),
        opening.venue_label(),
        opening.when_local,
        opening.available_spots
    )
}

/// Formats and dispatches opening summaries.
pub struct Notifier {
    channel: Arc<dyn NotificationChannel>,
    destination: String,
    subject: String,
    header: String,
}

impl Notifier {
    pub fn new(
        channel: Arc<dyn NotificationChannel>,
        destination: impl Into<String>,
        config: &NotifyConfig,
    ) -> Self {
        Self {
            channel,
            destination: destination.into(),
            subject: config.subject.clone(),
            header: config.header.clone(),
        }
    }

    /// Send one message covering `openings`. Callers skip empty batches.
    pub async fn notify(&self, openings: &[&Opening]) -> Result<()> {
        let body = format_message(&self.header, openings.iter().copied());
        self.channel
            .send(&self.destination, &self.subject, &body)
            .await?;
        log::info!(
            "Sent notification for {} openings to {}",
            openings.len(),
            self.destination
        );
        Ok(())
    }
}

/// Prints messages to stdout.
#[derive(Debug, Default, Clone)]
pub struct ConsoleChannel;

#[async_trait]
impl NotificationChannel for ConsoleChannel {
    async fn send(&self, destination: &str, subject: &str, body: &str) -> Result<()> {
        println!("To: {}", destination);
        println!("Subject: {}", subject);
        println!();
        println!("{}", body);
        Ok(())
    }
}

/// In-memory channel for tests.
#[cfg(test)]
pub(crate) mod recording {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::NotificationChannel;
    use crate::error::{AppError, Result};

    /// A message captured by [`RecordingChannel`].
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct SentMessage {
        pub destination: String,
        pub subject: String,
        pub body: String,
    }

    /// Keeps every message in memory; optionally fails every send.
    #[derive(Debug, Default)]
    pub struct RecordingChannel {
        sent: Mutex<Vec<SentMessage>>,
        fail: bool,
    }

    impl RecordingChannel {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn failing() -> Self {
            Self {
                sent: Mutex::new(Vec::new()),
                fail: true,
            }
        }

        pub fn sent(&self) -> Vec<SentMessage> {
            self.sent
                .lock()
                .map(|sent| sent.clone())
                .unwrap_or_default()
        }
    }

    #[async_trait]
    impl NotificationChannel for RecordingChannel {
        async fn send(&self, destination: &str, subject: &str, body: &str) -> Result<()> {
            if self.fail {
                return Err(AppError::notify("channel unavailable"));
            }
            let mut sent = self
                .sent
                .lock()
                .map_err(|e| AppError::notify(e.to_string()))?;
            sent.push(SentMessage {
                destination: destination.to_string(),
                subject: subject.to_string(),
                body: body.to_string(),
            });
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::recording::RecordingChannel;
    use super::*;
    use crate::error::AppError;
    use crate::models::{OpeningKind, RawStartTime};

    fn opening(program: Option<&str>, venue: &str, when: &str, spots: i64) -> Opening {
        Opening {
            kind: OpeningKind::DropIn,
            program_name: program.map(str::to_string),
            venue_name: Some(venue.to_string()),
            when_local: when.to_string(),
            raw_start_time: RawStartTime::Instant(None),
            available_spots: spots,
            game_id: Some("g".to_string()),
            league_id: "l".to_string(),
        }
    }

    #[test]
    fn test_format_message() {
        let a = opening(Some("Drop-in Volleyball"), "SoBo", "March 5 7PM", 3);
        let b = opening(None, "DU", "TBD", 1);

        let message = format_message("Header:", [&a, &b]);
        assert_eq!(
            message,
            "Header:\n\
             - Drop-in Volleyball @ SoBo March 5 7PM (3 spots)\n\
             - TBD @ DU TBD (1 spots)"
        );
    }

    #[tokio::test]
    async fn test_notify_sends_one_message() {
        let channel = Arc::new(RecordingChannel::new());
        let notifier = Notifier::new(channel.clone(), "topic", &NotifyConfig::default());
        let a = opening(Some("Open Play"), "Arena", "March 6 8PM", 2);

        notifier.notify(&[&a]).await.unwrap();

        let sent = channel.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].destination, "topic");
        assert_eq!(sent[0].subject, "Volo Volleyball Alert");
        assert!(sent[0].body.starts_with("New Volo volleyball openings"));
        assert!(sent[0].body.ends_with("- Open Play @ Arena March 6 8PM (2 spots)"));
    }

    #[tokio::test]
    async fn test_notify_propagates_send_failure() {
        let notifier = Notifier::new(
            Arc::new(RecordingChannel::failing()),
            "topic",
            &NotifyConfig::default(),
        );
        let a = opening(Some("Open Play"), "Arena", "March 6 8PM", 2);

        assert!(matches!(
            notifier.notify(&[&a]).await,
            Err(AppError::Notify(_))
        ));
    }
}
