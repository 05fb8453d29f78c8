//! Hook spec for the Messages `create` call site

use crate::types::{Message, MessageRequest};
use costgpt_core::error::{CostgptError, Result};
use costgpt_core::provider::{CallSlot, HookSpec, ProviderId};
use std::marker::PhantomData;
use std::sync::Arc;

/// Provider identity for Anthropic
pub const PROVIDER: ProviderId = ProviderId::new("anthropic");

/// Slot type hosts route `messages.create` calls through
pub type MessagesSlot<E> = CallSlot<MessageRequest, std::result::Result<Message, E>>;

/// Instrumentation spec for an Anthropic `messages.create` call site
///
/// `E` is the host client's error type; failed calls are never tracked.
pub struct MessagesHook<E> {
    slot: Option<Arc<MessagesSlot<E>>>,
    _error: PhantomData<fn() -> E>,
}

impl<E: Send + 'static> MessagesHook<E> {
    /// Spec bound to the host's call site
    pub fn new(slot: Arc<MessagesSlot<E>>) -> Self {
        Self {
            slot: Some(slot),
            _error: PhantomData,
        }
    }

    /// Spec for a host that has no Anthropic client wired up
    pub fn unbound() -> Self {
        Self {
            slot: None,
            _error: PhantomData,
        }
    }
}

impl<E: Send + 'static> HookSpec for MessagesHook<E> {
    type Request = MessageRequest;
    type Response = std::result::Result<Message, E>;

    fn provider(&self) -> ProviderId {
        PROVIDER
    }

    fn locate_target(&self) -> Result<Arc<MessagesSlot<E>>> {
        self.slot.clone().ok_or_else(|| {
            CostgptError::Config(
                "Anthropic client is not available: bind a messages call slot before instrumenting"
                    .to_string(),
            )
        })
    }

    fn has_usage(&self, result: &Self::Response) -> bool {
        result.is_ok()
    }

    fn model<'a>(&self, result: &'a Self::Response) -> &'a str {
        result.as_ref().map(|m| m.model.as_str()).unwrap_or_default()
    }

    fn input_tokens(&self, result: &Self::Response) -> u64 {
        result.as_ref().map(|m| m.usage.input_tokens).unwrap_or_default()
    }

    fn output_tokens(&self, result: &Self::Response) -> u64 {
        result.as_ref().map(|m| m.usage.output_tokens).unwrap_or_default()
    }
}
