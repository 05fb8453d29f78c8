//! Hook spec for the Chat Completions `create` call site

use crate::types::{ChatCompletion, ChatCompletionRequest};
use costgpt_core::error::{CostgptError, Result};
use costgpt_core::provider::{CallSlot, HookSpec, ProviderId};
use std::marker::PhantomData;
use std::sync::Arc;

/// Provider identity for OpenAI
pub const PROVIDER: ProviderId = ProviderId::new("openai");

/// Slot type hosts route `chat.completions.create` calls through
pub type ChatCompletionsSlot<E> =
    CallSlot<ChatCompletionRequest, std::result::Result<ChatCompletion, E>>;

/// Instrumentation spec for an OpenAI `chat.completions.create` call site
///
/// Responses without a `usage` block are passed through untracked.
pub struct ChatCompletionsHook<E> {
    slot: Option<Arc<ChatCompletionsSlot<E>>>,
    _error: PhantomData<fn() -> E>,
}

impl<E: Send + 'static> ChatCompletionsHook<E> {
    /// Spec bound to the host's call site
    pub fn new(slot: Arc<ChatCompletionsSlot<E>>) -> Self {
        Self {
            slot: Some(slot),
            _error: PhantomData,
        }
    }

    /// Spec for a host that has no OpenAI client wired up
    pub fn unbound() -> Self {
        Self {
            slot: None,
            _error: PhantomData,
        }
    }

    fn completion<'a>(
        &self,
        result: &'a std::result::Result<ChatCompletion, E>,
    ) -> Option<&'a ChatCompletion> {
        result.as_ref().ok()
    }
}

impl<E: Send + 'static> HookSpec for ChatCompletionsHook<E> {
    type Request = ChatCompletionRequest;
    type Response = std::result::Result<ChatCompletion, E>;

    fn provider(&self) -> ProviderId {
        PROVIDER
    }

    fn locate_target(&self) -> Result<Arc<ChatCompletionsSlot<E>>> {
        self.slot.clone().ok_or_else(|| {
            CostgptError::Config(
                "OpenAI client is not available: bind a chat completions call slot before instrumenting"
                    .to_string(),
            )
        })
    }

    fn has_usage(&self, result: &Self::Response) -> bool {
        self.completion(result).is_some_and(|c| c.usage.is_some())
    }

    fn model<'a>(&self, result: &'a Self::Response) -> &'a str {
        self.completion(result)
            .map(|c| c.model.as_str())
            .unwrap_or_default()
    }

    fn input_tokens(&self, result: &Self::Response) -> u64 {
        self.completion(result)
            .and_then(|c| c.usage)
            .map_or(0, |u| u.prompt_tokens)
    }

    fn output_tokens(&self, result: &Self::Response) -> u64 {
        self.completion(result)
            .and_then(|c| c.usage)
            .map_or(0, |u| u.completion_tokens)
    }
}
