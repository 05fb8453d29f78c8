//! Cost tracker: builds usage events and forwards them to the collector
//!
//! [`CostTracker::track`] never fails. Unknown models are priced at zero and
//! delivery problems are absorbed by the sink, so the host only ever sees the
//! returned [`UsageEvent`].
//!
//! # Examples
//!
//! ```
//! use costgpt::{CostTracker, TrackOptions};
//!
//! # tokio_test::block_on(async {
//! let tracker = CostTracker::new().with_default_feature("chat");
//! let event = tracker
//!     .track("gpt-4o", 1000, 500, TrackOptions::new().user_id("user-42"))
//!     .await;
//!
//! assert!((event.total_cost() - 0.0075).abs() < 1e-12);
//! assert_eq!(event.user_id(), Some("user-42"));
//! assert_eq!(event.feature(), Some("chat"));
//! # });
//! ```

use crate::instrument::InstrumentationRegistry;
use costgpt_core::config::TrackerConfig;
use costgpt_core::error::Result;
use costgpt_core::provider::{EventSink, HookSpec, ReportsUsage};
use costgpt_core::types::{Metadata, ModelName, TokenCounts, UsageEvent};
use costgpt_dispatch::EventDispatcher;
use costgpt_pricing::{CostCalculator, PriceCatalog};
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

/// Per-call attribution for [`CostTracker::track`]
///
/// Unset `user_id` and `feature` fall back to the tracker defaults.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackOptions {
    pub user_id: Option<String>,
    pub feature: Option<String>,
    pub duration_ms: Option<u64>,
    pub metadata: Metadata,
}

impl TrackOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn feature(mut self, feature: impl Into<String>) -> Self {
        self.feature = Some(feature.into());
        self
    }

    pub fn duration_ms(mut self, duration_ms: u64) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }

    /// Replace all metadata
    pub fn metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Add one metadata entry
    pub fn meta(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// Tracks LLM call costs with user and feature attribution
pub struct CostTracker {
    calculator: CostCalculator,
    sink: Option<Arc<dyn EventSink>>,
    default_user_id: Option<String>,
    default_feature: Option<String>,
}

impl CostTracker {
    /// Local-only tracker over the built-in catalog
    pub fn new() -> Self {
        Self {
            calculator: CostCalculator::default(),
            sink: None,
            default_user_id: None,
            default_feature: None,
        }
    }

    /// Build a tracker from configuration
    ///
    /// When an API key is configured the HTTP client is created here, but no
    /// request is made until the first [`track`](Self::track).
    ///
    /// # Errors
    ///
    /// Returns [`costgpt_core::CostgptError::Config`] if the dispatcher
    /// cannot be built from the given key.
    pub fn from_config(config: &TrackerConfig) -> Result<Self> {
        let mut tracker = Self::new();
        tracker.default_user_id = config.default_user_id.clone();
        tracker.default_feature = config.default_feature.clone();

        if let Some(dispatcher) = EventDispatcher::from_config(config)? {
            debug!(url = dispatcher.base_url(), "Tracker will send events to collector");
            tracker.sink = Some(Arc::new(dispatcher));
        }

        Ok(tracker)
    }

    /// Price against a different catalog
    pub fn with_catalog(mut self, catalog: Arc<PriceCatalog>) -> Self {
        self.calculator = CostCalculator::new(catalog);
        self
    }

    /// Forward events to the given sink
    pub fn with_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn with_default_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.default_user_id = Some(user_id.into());
        self
    }

    pub fn with_default_feature(mut self, feature: impl Into<String>) -> Self {
        self.default_feature = Some(feature.into());
        self
    }

    /// Whether events leave the process
    pub fn is_remote(&self) -> bool {
        self.sink.is_some()
    }

    /// Record one call and return its event
    ///
    /// If a sink is configured the event is handed to it before this returns.
    pub async fn track(
        &self,
        model: &str,
        input_tokens: u64,
        output_tokens: u64,
        options: TrackOptions,
    ) -> UsageEvent {
        let tokens = TokenCounts::new(input_tokens, output_tokens);
        let cost = self.calculator.calculate(model, &tokens);

        let event = UsageEvent::new(ModelName::new(model), tokens, cost)
            .with_duration_ms(options.duration_ms)
            .with_user_id(options.user_id.or_else(|| self.default_user_id.clone()))
            .with_feature(options.feature.or_else(|| self.default_feature.clone()))
            .with_metadata(options.metadata);

        debug!(
            id = %event.id(),
            model,
            total_cost = event.total_cost(),
            "Tracked usage event"
        );

        if let Some(sink) = &self.sink {
            sink.accept(&event).await;
        }

        event
    }

    /// Wrap a provider call site in the process-wide registry
    ///
    /// A no-op if the provider is already instrumented.
    ///
    /// # Errors
    ///
    /// Returns [`costgpt_core::CostgptError::Config`] if the provider's call
    /// site cannot be located.
    pub fn instrument<S: HookSpec>(self: &Arc<Self>, spec: Arc<S>) -> Result<()> {
        InstrumentationRegistry::global().install(Arc::clone(self), spec)
    }

    /// Undo [`instrument`](Self::instrument); a no-op if not instrumented
    pub fn uninstrument<S: HookSpec>(&self, spec: &S) {
        InstrumentationRegistry::global().uninstall(spec);
    }
}

impl Default for CostTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CostTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CostTracker")
            .field("remote", &self.is_remote())
            .field("default_user_id", &self.default_user_id)
            .field("default_feature", &self.default_feature)
            .finish_non_exhaustive()
    }
}

/// Measure one call with a fixed model name
///
/// Runs `call`, times it, and tracks its reported token usage. The result is
/// returned unchanged. Results reporting no usage are not tracked.
///
/// # Examples
///
/// ```
/// use costgpt::{CostTracker, TrackOptions, track_usage};
/// use costgpt::provider_openai::{ChatCompletion, CompletionUsage};
///
/// # tokio_test::block_on(async {
/// let tracker = CostTracker::new();
/// let completion = track_usage(&tracker, "gpt-4o-mini", TrackOptions::new(), || async {
///     ChatCompletion {
///         id: "chatcmpl-1".into(),
///         model: "gpt-4o-mini".into(),
///         choices: Vec::new(),
///         usage: Some(CompletionUsage { prompt_tokens: 10, completion_tokens: 5, total_tokens: 15 }),
///     }
/// })
/// .await;
/// assert_eq!(completion.id, "chatcmpl-1");
/// # });
/// ```
pub async fn track_usage<F, Fut, T>(
    tracker: &CostTracker,
    model: &str,
    options: TrackOptions,
    call: F,
) -> T
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = T>,
    T: ReportsUsage,
{
    let start = Instant::now();
    let result = call().await;
    let duration_ms = elapsed_ms(start);

    match result.token_usage() {
        Some(tokens) => {
            tracker
                .track(
                    model,
                    tokens.input_tokens,
                    tokens.output_tokens,
                    options.duration_ms(duration_ms),
                )
                .await;
        }
        None => debug!(model, "Call reported no usage, not tracking"),
    }

    result
}

/// Whole milliseconds since `start`, saturating
pub(crate) fn elapsed_ms(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use costgpt_core::types::PriceEntry;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder(Mutex<Vec<UsageEvent>>);

    #[async_trait]
    impl EventSink for Recorder {
        async fn accept(&self, event: &UsageEvent) {
            self.0.lock().unwrap().push(event.clone());
        }
    }

    #[tokio::test]
    async fn test_track_gpt_4o() {
        let event = CostTracker::new()
            .track("gpt-4o", 1000, 500, TrackOptions::new())
            .await;

        assert!((event.input_cost() - 0.0025).abs() < 1e-12);
        assert!((event.output_cost() - 0.005).abs() < 1e-12);
        assert_eq!(event.total_cost(), event.input_cost() + event.output_cost());
        assert_eq!(event.model().as_str(), "gpt-4o");
    }

    #[tokio::test]
    async fn test_unknown_model_is_free() {
        let event = CostTracker::new()
            .track("unknown-model-xyz", 100, 100, TrackOptions::new())
            .await;
        assert_eq!(event.input_cost(), 0.0);
        assert_eq!(event.output_cost(), 0.0);
        assert_eq!(event.total_cost(), 0.0);
    }

    #[tokio::test]
    async fn test_explicit_attribution_beats_defaults() {
        let tracker = CostTracker::new()
            .with_default_user_id("default-user")
            .with_default_feature("default-feature");

        let event = tracker
            .track("o1", 1, 1, TrackOptions::new().user_id("alice"))
            .await;
        assert_eq!(event.user_id(), Some("alice"));
        assert_eq!(event.feature(), Some("default-feature"));

        let bare = CostTracker::new()
            .track("o1", 1, 1, TrackOptions::new())
            .await;
        assert_eq!(bare.user_id(), None);
        assert_eq!(bare.feature(), None);
    }

    #[tokio::test]
    async fn test_sink_receives_event_before_return() {
        let recorder = Arc::new(Recorder::default());
        let tracker = CostTracker::new().with_sink(recorder.clone());

        let event = tracker
            .track(
                "claude-3.5-sonnet",
                10,
                20,
                TrackOptions::new().duration_ms(42).meta("route", "/chat"),
            )
            .await;

        let seen = recorder.0.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0], event);
        assert_eq!(seen[0].duration_ms(), Some(42));
        assert_eq!(seen[0].metadata()["route"], "/chat");
    }

    #[tokio::test]
    async fn test_custom_catalog() {
        let catalog = PriceCatalog::new(vec![PriceEntry::new("house-model", 1.0, 2.0)], Vec::new());
        let tracker = CostTracker::new().with_catalog(Arc::new(catalog));

        let event = tracker
            .track("house-model-v2", 1_000_000, 1_000_000, TrackOptions::new())
            .await;
        assert_eq!(event.total_cost(), 3.0);

        let builtin = tracker.track("gpt-4o", 1, 1, TrackOptions::new()).await;
        assert_eq!(builtin.total_cost(), 0.0);
    }

    #[test]
    fn test_from_config_without_key_is_local() {
        let tracker = CostTracker::from_config(
            &TrackerConfig::new().with_default_feature("search"),
        )
        .unwrap();
        assert!(!tracker.is_remote());
        assert_eq!(tracker.default_feature.as_deref(), Some("search"));
    }

    #[tokio::test]
    async fn test_from_config_with_key_is_remote() {
        let config = TrackerConfig::new()
            .with_api_key("sk-test")
            .with_api_url("http://127.0.0.1:9");
        let tracker = CostTracker::from_config(&config).unwrap();
        assert!(tracker.is_remote());
    }

    #[tokio::test]
    async fn test_track_usage_skips_results_without_usage() {
        struct NoUsage;
        impl ReportsUsage for NoUsage {
            fn token_usage(&self) -> Option<TokenCounts> {
                None
            }
        }

        let recorder = Arc::new(Recorder::default());
        let tracker = CostTracker::new().with_sink(recorder.clone());
        track_usage(&tracker, "gpt-4o", TrackOptions::new(), || async { NoUsage }).await;
        assert!(recorder.0.lock().unwrap().is_empty());
    }
}
