// src/pipeline/mod.rs

//! Pipeline entry points.
//!
//! - `partition_new`: Keep only openings whose event key was never notified
//! - `run_notify`: Find, gate, persist and notify in one pass

pub mod dedup;
pub mod run;

pub use dedup::{NewOpening, key_openings, partition_new};
pub use run::{NotifyTargets, RunStatus, RunSummary, run_notify};
