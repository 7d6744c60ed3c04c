// src/services/mod.rs

//! Service layer for the watcher.
//!
//! This module contains the business logic for:
//! - Opening discovery (`OpeningFinder`)
//! - Notification formatting and dispatch (`Notifier`)
//! - Endpoint diagnostics (`ConnectivityProbe`)

pub mod finder;
pub mod notifier;
mod probe;
pub mod query;

#[cfg(feature = "aws")]
mod sns;

pub use finder::{OpeningFinder, extract_openings, parse_discover_body};
pub use notifier::{ConsoleChannel, NotificationChannel, Notifier, format_message};
pub use probe::{ConnectivityProbe, diagnose};

#[cfg(feature = "aws")]
pub use sns::SnsChannel;
