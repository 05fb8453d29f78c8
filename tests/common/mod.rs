//! Common test utilities for costgpt integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use costgpt::provider_anthropic::{ContentBlock, Message, Usage};
use costgpt::provider_openai::{ChatCompletion, ChatMessage, Choice, CompletionUsage};
use costgpt::{EventSink, UsageEvent};
use std::sync::Mutex;

/// Sink that keeps every event it is handed
#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<UsageEvent>>,
}

impl RecordingSink {
    pub fn events(&self) -> Vec<UsageEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.events.lock().unwrap().len()
    }
}

#[async_trait]
impl EventSink for RecordingSink {
    async fn accept(&self, event: &UsageEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

/// Anthropic reply with the given usage
pub fn anthropic_message(model: &str, input_tokens: u64, output_tokens: u64) -> Message {
    Message {
        id: "msg_test".to_string(),
        model: model.to_string(),
        content: vec![ContentBlock::Text {
            text: "Hello from Claude".to_string(),
        }],
        stop_reason: Some("end_turn".to_string()),
        usage: Usage {
            input_tokens,
            output_tokens,
            ..Usage::default()
        },
    }
}

/// OpenAI completion, optionally without a usage block
pub fn openai_completion(model: &str, usage: Option<(u64, u64)>) -> ChatCompletion {
    ChatCompletion {
        id: "chatcmpl-test".to_string(),
        model: model.to_string(),
        choices: vec![Choice {
            index: 0,
            message: ChatMessage {
                role: "assistant".to_string(),
                content: Some("Hello from GPT".to_string()),
            },
            finish_reason: Some("stop".to_string()),
        }],
        usage: usage.map(|(prompt_tokens, completion_tokens)| CompletionUsage {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens + completion_tokens,
        }),
    }
}

pub fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-12,
        "expected {expected}, got {actual}"
    );
}
