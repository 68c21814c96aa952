//! FretCoach Common Utilities
//!
//! Shared infrastructure for all FretCoach crates:
//! - Error types and result aliases
//! - Configuration loading, including injected service credentials
//! - Bounded retry with backoff for outbound calls
//! - Tracing/logging initialization

pub mod config;
pub mod error;
pub mod logging;
pub mod retry;

pub use config::*;
pub use error::*;
pub use retry::{retry_with_backoff, RetryPolicy};
