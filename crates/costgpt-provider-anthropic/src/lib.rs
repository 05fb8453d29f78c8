//! Anthropic instrumentation hook for costgpt
//!
//! This crate describes the Messages API response shape and implements
//! [`costgpt_core::HookSpec`] for a host's `messages.create` call site.

pub mod hook;
pub mod types;

pub use hook::{MessagesHook, MessagesSlot, PROVIDER};
pub use types::{ContentBlock, InputMessage, Message, MessageRequest, Usage};
