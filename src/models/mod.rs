// src/models/mod.rs

//! Domain models for the watcher.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
pub mod discover;
mod opening;
mod probe;

// Re-export all public types
pub use config::{
    Config, DisplayConfig, EndpointConfig, FinderConfig, NotifyConfig, ProbeConfig, StoreConfig,
    Venue,
};
pub use opening::{EventKey, Opening, OpeningKind, RawStartTime, TBD};
pub use probe::{Classification, Diagnosis, ProbeMode, ProbeOutcome, ProbeResult};
