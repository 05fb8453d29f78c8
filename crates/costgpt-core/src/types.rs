//! Core domain types for costgpt
//!
//! This module contains the fundamental types used throughout the costgpt crates:
//! model names, token counts, per-million pricing, cost breakdowns and the
//! [`UsageEvent`] value produced for every measured call.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::ops::{Add, AddAssign};
use uuid::Uuid;

/// Open key/value metadata attached to a usage event
pub type Metadata = HashMap<String, serde_json::Value>;

/// Tokens per pricing unit; catalog prices are quoted per million tokens
pub const TOKENS_PER_MILLION: f64 = 1_000_000.0;

/// Strongly-typed model name wrapper
///
/// # Examples
/// ```
/// use costgpt_core::types::ModelName;
///
/// let model = ModelName::new("gpt-4o");
/// assert_eq!(model.as_str(), "gpt-4o");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModelName(String);

impl ModelName {
    /// Create a new ModelName from any string-like type
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ModelName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for ModelName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ModelName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Token counts for a single call
///
/// # Examples
/// ```
/// use costgpt_core::types::TokenCounts;
///
/// let tokens = TokenCounts::new(100, 50);
/// assert_eq!(tokens.total(), 150);
///
/// let combined = tokens + TokenCounts::new(10, 5);
/// assert_eq!(combined.input_tokens, 110);
/// ```
#[derive(Debug, Default, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenCounts {
    /// Prompt tokens sent to the model
    pub input_tokens: u64,
    /// Completion tokens generated by the model
    pub output_tokens: u64,
}

impl TokenCounts {
    /// Create new TokenCounts
    pub fn new(input_tokens: u64, output_tokens: u64) -> Self {
        Self {
            input_tokens,
            output_tokens,
        }
    }

    /// Calculate total tokens, saturating at `u64::MAX`
    pub fn total(&self) -> u64 {
        self.input_tokens.saturating_add(self.output_tokens)
    }
}

impl Add for TokenCounts {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            input_tokens: self.input_tokens.saturating_add(other.input_tokens),
            output_tokens: self.output_tokens.saturating_add(other.output_tokens),
        }
    }
}

impl AddAssign for TokenCounts {
    fn add_assign(&mut self, other: Self) {
        *self = *self + other;
    }
}

/// Price pair for a model, in USD per million tokens
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ModelPricing {
    /// USD per million input tokens
    pub input_per_million: f64,
    /// USD per million output tokens
    pub output_per_million: f64,
}

impl ModelPricing {
    /// Create a new price pair
    pub const fn new(input_per_million: f64, output_per_million: f64) -> Self {
        Self {
            input_per_million,
            output_per_million,
        }
    }
}

/// A row of the price catalog: a canonical model id and its price pair
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceEntry {
    /// Canonical model identifier (the catalog's primary key)
    pub model: ModelName,
    /// Per-million token prices
    pub pricing: ModelPricing,
}

impl PriceEntry {
    /// Create a new catalog entry
    pub fn new(model: impl Into<String>, input_per_million: f64, output_per_million: f64) -> Self {
        Self {
            model: ModelName::new(model),
            pricing: ModelPricing::new(input_per_million, output_per_million),
        }
    }
}

/// Monetary cost of one call in USD
///
/// `total_cost` is always the plain sum of the two parts; nothing is rounded.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize)]
pub struct CostBreakdown {
    /// Cost of the input tokens
    pub input_cost: f64,
    /// Cost of the output tokens
    pub output_cost: f64,
    /// `input_cost + output_cost`
    pub total_cost: f64,
}

impl CostBreakdown {
    /// Build a breakdown from its two parts
    pub fn new(input_cost: f64, output_cost: f64) -> Self {
        Self {
            input_cost,
            output_cost,
            total_cost: input_cost + output_cost,
        }
    }

    /// The breakdown used when a model has no known price
    pub fn zero() -> Self {
        Self::default()
    }

    /// Price the given tokens at a per-million price pair
    ///
    /// # Examples
    /// ```
    /// use costgpt_core::types::{CostBreakdown, ModelPricing, TokenCounts};
    ///
    /// let cost = CostBreakdown::from_pricing(
    ///     &TokenCounts::new(1_000_000, 0),
    ///     &ModelPricing::new(3.0, 15.0),
    /// );
    /// assert_eq!(cost.input_cost, 3.0);
    /// assert_eq!(cost.total_cost, 3.0);
    /// ```
    pub fn from_pricing(tokens: &TokenCounts, pricing: &ModelPricing) -> Self {
        let input_cost = tokens.input_tokens as f64 / TOKENS_PER_MILLION * pricing.input_per_million;
        let output_cost =
            tokens.output_tokens as f64 / TOKENS_PER_MILLION * pricing.output_per_million;
        Self::new(input_cost, output_cost)
    }
}

/// A single measured LLM call and its computed cost
///
/// Events are built once and never mutated afterwards: every field is private
/// and exposed through accessors. The serialized form is the collector wire
/// schema (`duration_ms`, `user_id` and `feature` serialize as `null` when
/// absent).
///
/// # Examples
/// ```
/// use costgpt_core::types::{CostBreakdown, ModelName, TokenCounts, UsageEvent};
///
/// let event = UsageEvent::new(
///     ModelName::new("gpt-4o"),
///     TokenCounts::new(1000, 500),
///     CostBreakdown::new(0.0025, 0.005),
/// )
/// .with_feature(Some("chat".to_string()));
///
/// assert_eq!(event.feature(), Some("chat"));
/// assert_eq!(event.total_cost(), event.input_cost() + event.output_cost());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UsageEvent {
    id: Uuid,
    timestamp: DateTime<Utc>,
    model: ModelName,
    input_tokens: u64,
    output_tokens: u64,
    input_cost: f64,
    output_cost: f64,
    total_cost: f64,
    duration_ms: Option<u64>,
    user_id: Option<String>,
    feature: Option<String>,
    metadata: Metadata,
}

impl UsageEvent {
    /// Create an event with a fresh id and the current UTC time
    ///
    /// `total_cost` is recomputed from the two parts; the breakdown's own
    /// total is ignored.
    pub fn new(model: ModelName, tokens: TokenCounts, cost: CostBreakdown) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            model,
            input_tokens: tokens.input_tokens,
            output_tokens: tokens.output_tokens,
            input_cost: cost.input_cost,
            output_cost: cost.output_cost,
            total_cost: cost.input_cost + cost.output_cost,
            duration_ms: None,
            user_id: None,
            feature: None,
            metadata: Metadata::new(),
        }
    }

    /// Set the measured call duration
    pub fn with_duration_ms(mut self, duration_ms: Option<u64>) -> Self {
        self.duration_ms = duration_ms;
        self
    }

    /// Set the attributed user
    pub fn with_user_id(mut self, user_id: Option<String>) -> Self {
        self.user_id = user_id;
        self
    }

    /// Set the attributed feature
    pub fn with_feature(mut self, feature: Option<String>) -> Self {
        self.feature = feature;
        self
    }

    /// Replace the metadata map
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn model(&self) -> &ModelName {
        &self.model
    }

    pub fn tokens(&self) -> TokenCounts {
        TokenCounts::new(self.input_tokens, self.output_tokens)
    }

    pub fn input_tokens(&self) -> u64 {
        self.input_tokens
    }

    pub fn output_tokens(&self) -> u64 {
        self.output_tokens
    }

    pub fn input_cost(&self) -> f64 {
        self.input_cost
    }

    pub fn output_cost(&self) -> f64 {
        self.output_cost
    }

    pub fn total_cost(&self) -> f64 {
        self.total_cost
    }

    /// All three cost figures
    pub fn cost(&self) -> CostBreakdown {
        CostBreakdown {
            input_cost: self.input_cost,
            output_cost: self.output_cost,
            total_cost: self.total_cost,
        }
    }

    pub fn duration_ms(&self) -> Option<u64> {
        self.duration_ms
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    pub fn feature(&self) -> Option<&str> {
        self.feature.as_deref()
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }
}
