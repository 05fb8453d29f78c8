//! Core types, traits, and configuration for costgpt
//!
//! This crate provides the foundational types, error handling,
//! tracker configuration, and the interception seam used
//! by all other costgpt crates.

pub mod config;
pub mod error;
pub mod provider;
pub mod types;

#[cfg(test)]
pub mod test_utils;

// Re-export commonly used types
pub use config::TrackerConfig;
pub use error::{CostgptError, Result};
pub use provider::{CallFn, CallSlot, EventSink, HookSpec, ProviderId, ReportsUsage};
pub use types::{CostBreakdown, Metadata, ModelName, ModelPricing, PriceEntry, TokenCounts, UsageEvent};
