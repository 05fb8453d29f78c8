//! Collector wire format
//!
//! A single event is the serialized [`UsageEvent`] itself; a batch wraps an
//! ordered list under an `events` key.

use costgpt_core::types::UsageEvent;
use serde::Serialize;

/// Single-event endpoint, relative to the collector base URL
pub const EVENTS_PATH: &str = "/v1/events";

/// Batch endpoint, relative to the collector base URL
pub const BATCH_PATH: &str = "/v1/events/batch";

/// Body of a batch request
#[derive(Debug, Serialize)]
pub struct BatchPayload<'a> {
    pub events: &'a [UsageEvent],
}

impl<'a> BatchPayload<'a> {
    pub fn new(events: &'a [UsageEvent]) -> Self {
        Self { events }
    }
}
