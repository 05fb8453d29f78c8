//! Best-effort delivery of usage events to the costgpt collector
//!
//! Events are POSTed as JSON with a bearer token. Every transport failure is
//! swallowed: nothing is retried, queued, or reported back to the caller
//! except through an optional error callback.

pub mod dispatcher;
pub mod wire;

pub use dispatcher::{ErrorCallback, EventDispatcher};
pub use wire::{BATCH_PATH, BatchPayload, EVENTS_PATH};
