//! OpenAI instrumentation hook for costgpt
//!
//! This crate describes the Chat Completions response shape and implements
//! [`costgpt_core::HookSpec`] for a host's `chat.completions.create` call site.

pub mod hook;
pub mod types;

pub use hook::{ChatCompletionsHook, ChatCompletionsSlot, PROVIDER};
pub use types::{ChatCompletion, ChatCompletionRequest, ChatMessage, Choice, CompletionUsage};
