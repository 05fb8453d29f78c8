//! costgpt - Measure and attribute the cost of LLM API calls
//!
//! This library provides functionality to:
//! - Price token usage against a built-in catalog of OpenAI and Anthropic models
//! - Record usage events with user and feature attribution
//! - Forward events to the CostGPT collector, best effort
//! - Instrument provider call sites so every call is tracked automatically
//!
//! # Examples
//!
//! ```no_run
//! use costgpt::{CostTracker, TrackerConfig, TrackOptions};
//! use costgpt::provider_anthropic::{Message, MessageRequest, MessagesHook, MessagesSlot};
//! use costgpt::CallSlot;
//! use std::sync::Arc;
//!
//! # async fn call_anthropic(_req: MessageRequest) -> Result<Message, String> { unimplemented!() }
//! #[tokio::main]
//! async fn main() -> costgpt::Result<()> {
//!     let config = TrackerConfig::from_env()?.with_default_feature("support-bot");
//!     let tracker = Arc::new(CostTracker::from_config(&config)?);
//!
//!     // The host routes its Anthropic calls through this slot
//!     let slot: Arc<MessagesSlot<String>> = Arc::new(CallSlot::new(call_anthropic));
//!     tracker.instrument(Arc::new(MessagesHook::new(Arc::clone(&slot))))?;
//!
//!     let request = MessageRequest::user("claude-3-5-sonnet-20241022", 512, "Hello");
//!     let _reply = slot.call(request).await;
//!
//!     // Manual tracking works alongside instrumentation
//!     tracker
//!         .track("gpt-4o", 1000, 500, TrackOptions::new().user_id("user-42"))
//!         .await;
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod instrument;
pub mod output;
pub mod tracker;

pub use costgpt_dispatch as dispatch;
pub use costgpt_pricing as pricing;
pub use costgpt_provider_anthropic as provider_anthropic;
pub use costgpt_provider_openai as provider_openai;

// Re-export commonly used types
pub use costgpt_core::{
    CallSlot, CostBreakdown, CostgptError, EventSink, HookSpec, Metadata, ModelName, ModelPricing,
    PriceEntry, ProviderId, ReportsUsage, Result, TokenCounts, TrackerConfig, UsageEvent,
};
pub use costgpt_dispatch::EventDispatcher;
pub use costgpt_pricing::{CostCalculator, PRICING_SNAPSHOT, PriceCatalog};
pub use instrument::InstrumentationRegistry;
pub use tracker::{CostTracker, TrackOptions, track_usage};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
