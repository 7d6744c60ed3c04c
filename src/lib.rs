// src/lib.rs

//! Slotwatch Library
//!
//! Finds open Volo volleyball registrations, remembers which ones were
//! already announced and sends one message per batch of new openings.

pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;

#[cfg(feature = "lambda")]
pub mod lambda;
