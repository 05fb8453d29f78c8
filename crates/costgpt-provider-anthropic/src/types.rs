//! Anthropic Messages API shapes
//!
//! Only the fields the instrumentation reads, plus enough of the request for
//! hosts to route calls through a typed slot.

use costgpt_core::provider::ReportsUsage;
use costgpt_core::types::TokenCounts;
use serde::{Deserialize, Serialize};

/// A chat turn sent to the API
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InputMessage {
    /// "user" or "assistant"
    pub role: String,
    /// Plain-text content
    pub content: String,
}

/// Request body for `POST /v1/messages`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MessageRequest {
    /// Requested model
    pub model: String,
    /// Maximum tokens to generate
    pub max_tokens: u32,
    /// Conversation so far
    pub messages: Vec<InputMessage>,
    /// System prompt
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
}

impl MessageRequest {
    /// Single user-turn request
    pub fn user(model: impl Into<String>, max_tokens: u32, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            max_tokens,
            messages: vec![InputMessage {
                role: "user".to_string(),
                content: prompt.into(),
            }],
            system: None,
        }
    }
}

/// A content block in a response
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    /// Text content
    Text { text: String },
    /// The model asked for a tool invocation
    ToolUse {
        id: String,
        name: String,
        input: serde_json::Value,
    },
}

/// Token usage statistics reported by the API
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Usage {
    /// Number of input tokens consumed
    pub input_tokens: u64,
    /// Number of output tokens generated
    pub output_tokens: u64,
    /// Tokens read from the prompt cache
    #[serde(default)]
    pub cache_read_input_tokens: u64,
    /// Tokens written to the prompt cache
    #[serde(default)]
    pub cache_creation_input_tokens: u64,
}

/// A full response from the Messages API
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    /// Response id
    pub id: String,
    /// Model that generated the response
    pub model: String,
    /// Content blocks
    pub content: Vec<ContentBlock>,
    /// Why generation stopped
    pub stop_reason: Option<String>,
    /// Token usage
    pub usage: Usage,
}

impl ReportsUsage for Message {
    fn token_usage(&self) -> Option<TokenCounts> {
        Some(TokenCounts::new(
            self.usage.input_tokens,
            self.usage.output_tokens,
        ))
    }
}
