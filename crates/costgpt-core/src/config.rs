//! Tracker configuration
//!
//! [`TrackerConfig`] collects everything a tracker needs to talk to the hosted
//! collector and to attribute events. It can be built in code or read from
//! `COSTGPT_*` environment variables.

use crate::error::{CostgptError, Result};
use std::env;
use std::time::Duration;
use tracing::debug;

/// Default collector base URL
pub const DEFAULT_API_URL: &str = "https://api.cost-gpt.com";

/// Default bound on a single collector request
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Environment variable holding the collector API key
pub const ENV_API_KEY: &str = "COSTGPT_API_KEY";
/// Environment variable overriding the collector base URL
pub const ENV_API_URL: &str = "COSTGPT_API_URL";
/// Environment variable holding the default user id
pub const ENV_USER_ID: &str = "COSTGPT_USER_ID";
/// Environment variable holding the default feature tag
pub const ENV_FEATURE: &str = "COSTGPT_FEATURE";
/// Environment variable overriding the request timeout, in whole seconds
pub const ENV_TIMEOUT_SECS: &str = "COSTGPT_TIMEOUT_SECS";

/// Configuration for a cost tracker
#[derive(Debug, Clone, PartialEq)]
pub struct TrackerConfig {
    /// Collector API key; no events are sent when absent
    pub api_key: Option<String>,
    /// Collector base URL
    pub api_url: String,
    /// User id applied to events that do not name one
    pub default_user_id: Option<String>,
    /// Feature tag applied to events that do not name one
    pub default_feature: Option<String>,
    /// Bound on each collector request
    pub timeout: Duration,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: DEFAULT_API_URL.to_string(),
            default_user_id: None,
            default_feature: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl TrackerConfig {
    /// Create a local-only configuration (no collector)
    pub fn new() -> Self {
        Self::default()
    }

    /// Read configuration from `COSTGPT_*` environment variables
    ///
    /// Unset or empty variables keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`CostgptError::InvalidArgument`] if `COSTGPT_TIMEOUT_SECS`
    /// is not a whole number of seconds.
    pub fn from_env() -> Result<Self> {
        let timeout = match non_empty_var(ENV_TIMEOUT_SECS) {
            Some(raw) => {
                let secs = raw.trim().parse::<u64>().map_err(|_| {
                    CostgptError::InvalidArgument(format!(
                        "{ENV_TIMEOUT_SECS} must be a whole number of seconds, got '{raw}'"
                    ))
                })?;
                Duration::from_secs(secs)
            }
            None => DEFAULT_TIMEOUT,
        };

        let config = Self {
            api_key: non_empty_var(ENV_API_KEY),
            api_url: non_empty_var(ENV_API_URL).unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            default_user_id: non_empty_var(ENV_USER_ID),
            default_feature: non_empty_var(ENV_FEATURE),
            timeout,
        };

        debug!(
            api_url = %config.api_url,
            remote = config.api_key.is_some(),
            "Loaded tracker configuration from environment"
        );
        Ok(config)
    }

    /// Set the collector API key
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set the collector base URL
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    /// Set the default user id
    pub fn with_default_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.default_user_id = Some(user_id.into());
        self
    }

    /// Set the default feature tag
    pub fn with_default_feature(mut self, feature: impl Into<String>) -> Self {
        self.default_feature = Some(feature.into());
        self
    }

    /// Set the collector request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Base URL without a trailing slash
    pub fn base_url(&self) -> &str {
        self.api_url.trim_end_matches('/')
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.is_empty())
}
