//! HTTP dispatcher for the hosted collector
//!
//! [`EventDispatcher`] owns one `reqwest::Client` configured with the bearer
//! token and request timeout. Building it performs no network I/O.

use crate::wire::{BATCH_PATH, BatchPayload, EVENTS_PATH};
use async_trait::async_trait;
use costgpt_core::config::{DEFAULT_TIMEOUT, TrackerConfig};
use costgpt_core::error::{CostgptError, Result};
use costgpt_core::provider::EventSink;
use costgpt_core::types::UsageEvent;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Observer for dropped sends
pub type ErrorCallback = Arc<dyn Fn(&CostgptError) + Send + Sync>;

/// Fire-and-forget sender of usage events
#[derive(Clone)]
pub struct EventDispatcher {
    client: reqwest::Client,
    base_url: String,
    on_error: Option<ErrorCallback>,
}

impl EventDispatcher {
    /// Create a dispatcher with the default 10 second timeout
    ///
    /// # Errors
    ///
    /// Returns [`CostgptError::Config`] if the API key cannot be used as a
    /// header value or the HTTP client cannot be built.
    pub fn new(api_key: &str, base_url: &str) -> Result<Self> {
        Self::with_timeout(api_key, base_url, DEFAULT_TIMEOUT)
    }

    /// Create a dispatcher with an explicit request timeout
    pub fn with_timeout(api_key: &str, base_url: &str, timeout: Duration) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bearer {api_key}")).map_err(|e| {
            CostgptError::Config(format!("invalid API key header value: {e}"))
        })?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| CostgptError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            on_error: None,
        })
    }

    /// Create a dispatcher from tracker configuration
    ///
    /// Returns `Ok(None)` when no API key is configured.
    pub fn from_config(config: &TrackerConfig) -> Result<Option<Self>> {
        config
            .api_key
            .as_deref()
            .map(|key| Self::with_timeout(key, config.base_url(), config.timeout))
            .transpose()
    }

    /// Observe every dropped send
    ///
    /// The callback runs inline on the sending task and cannot change the
    /// outcome for the caller.
    pub fn with_error_callback<F>(mut self, callback: F) -> Self
    where
        F: Fn(&CostgptError) + Send + Sync + 'static,
    {
        self.on_error = Some(Arc::new(callback));
        self
    }

    /// Collector base URL without a trailing slash
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send one event; failures are dropped
    pub async fn send_event(&self, event: &UsageEvent) {
        if let Err(e) = self.post(EVENTS_PATH, event).await {
            self.drop_failure(&e, 1);
        }
    }

    /// Send several events in one request; failures are dropped
    ///
    /// An empty slice sends nothing.
    pub async fn send_batch(&self, events: &[UsageEvent]) {
        if events.is_empty() {
            debug!("Skipping empty event batch");
            return;
        }

        if let Err(e) = self.post(BATCH_PATH, &BatchPayload::new(events)).await {
            self.drop_failure(&e, events.len());
        }
    }

    async fn post<T: Serialize + ?Sized>(&self, path: &str, body: &T) -> Result<()> {
        let url = format!("{}{}", self.base_url, path);
        let response = self.client.post(&url).json(body).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(CostgptError::Collector {
                status: status.as_u16(),
            });
        }

        debug!(%status, %url, "Delivered usage payload");
        Ok(())
    }

    fn drop_failure(&self, error: &CostgptError, events: usize) {
        warn!(events, "Dropping usage events: {}", error);
        if let Some(callback) = &self.on_error {
            callback(error);
        }
    }
}

impl fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("base_url", &self.base_url)
            .field("on_error", &self.on_error.is_some())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl EventSink for EventDispatcher {
    async fn accept(&self, event: &UsageEvent) {
        self.send_event(event).await;
    }
}
