//! Interception seam for provider clients
//!
//! Hosts route the provider calls they want measured through a [`CallSlot`],
//! a swappable async callable they own. A [`HookSpec`] tells the
//! instrumentation layer where a provider's slot lives and how to read token
//! usage out of whatever the call returns. Provider crates implement
//! `HookSpec` so that the tracker can wrap any provider with generic code.

use crate::error::Result;
use crate::types::{TokenCounts, UsageEvent};
use async_trait::async_trait;
use futures::future::BoxFuture;
use std::fmt;
use std::future::Future;
use std::sync::{Arc, RwLock};

/// Stable identity of an instrumentable provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProviderId(&'static str);

impl ProviderId {
    /// Create a provider id from a static name
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    /// Get the provider name
    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Type-erased async callable stored in a [`CallSlot`]
pub type CallFn<Req, Resp> = Arc<dyn Fn(Req) -> BoxFuture<'static, Resp> + Send + Sync>;

/// A host-owned call site whose callable can be swapped at runtime
///
/// # Examples
/// ```
/// use costgpt_core::provider::CallSlot;
///
/// # tokio_test::block_on(async {
/// let slot = CallSlot::new(|prompt: String| async move { prompt.len() });
/// assert_eq!(slot.call("hello".to_string()).await, 5);
/// # });
/// ```
pub struct CallSlot<Req, Resp> {
    current: RwLock<CallFn<Req, Resp>>,
}

impl<Req, Resp> CallSlot<Req, Resp>
where
    Req: Send + 'static,
    Resp: Send + 'static,
{
    /// Create a slot holding the given async function
    pub fn new<F, Fut>(call: F) -> Self
    where
        F: Fn(Req) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Resp> + Send + 'static,
    {
        Self::from_fn(Arc::new(move |req: Req| -> BoxFuture<'static, Resp> {
            Box::pin(call(req))
        }))
    }

    /// Create a slot from an already type-erased callable
    pub fn from_fn(call: CallFn<Req, Resp>) -> Self {
        Self {
            current: RwLock::new(call),
        }
    }

    /// Invoke whatever callable currently occupies the slot
    pub async fn call(&self, req: Req) -> Resp {
        let call = self.current();
        call(req).await
    }

    /// Get a handle to the current callable
    pub fn current(&self) -> CallFn<Req, Resp> {
        let guard = self.current.read().unwrap_or_else(|e| e.into_inner());
        Arc::clone(&guard)
    }

    /// Put a new callable in the slot, returning the one it replaced
    pub fn replace(&self, call: CallFn<Req, Resp>) -> CallFn<Req, Resp> {
        let mut guard = self.current.write().unwrap_or_else(|e| e.into_inner());
        std::mem::replace(&mut *guard, call)
    }
}

impl<Req, Resp> fmt::Debug for CallSlot<Req, Resp> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallSlot").finish_non_exhaustive()
    }
}

/// Provider-specific accessor bundle used by the generic instrumentation
///
/// The accessors are only consulted after [`HookSpec::has_usage`] returned
/// `true` for the same result.
pub trait HookSpec: Send + Sync + 'static {
    /// Argument type of the intercepted call
    type Request: Send + 'static;
    /// Return type of the intercepted call
    type Response: Send + 'static;

    /// Identity used to key the hook state
    fn provider(&self) -> ProviderId;

    /// Find the call site to wrap
    ///
    /// # Errors
    ///
    /// Returns [`crate::CostgptError::Config`] when the provider's call site
    /// is not available in this process.
    fn locate_target(&self) -> Result<Arc<CallSlot<Self::Request, Self::Response>>>;

    /// Whether the result carries token usage worth tracking
    fn has_usage(&self, result: &Self::Response) -> bool;

    /// Model name reported by the provider
    fn model<'a>(&self, result: &'a Self::Response) -> &'a str;

    /// Prompt token count
    fn input_tokens(&self, result: &Self::Response) -> u64;

    /// Completion token count
    fn output_tokens(&self, result: &Self::Response) -> u64;
}

/// Results that can report their own token usage
pub trait ReportsUsage {
    /// Token usage of the call, if the provider returned any
    fn token_usage(&self) -> Option<TokenCounts>;
}

impl<T: ReportsUsage, E> ReportsUsage for std::result::Result<T, E> {
    fn token_usage(&self) -> Option<TokenCounts> {
        self.as_ref().ok().and_then(ReportsUsage::token_usage)
    }
}

impl<T: ReportsUsage> ReportsUsage for Option<T> {
    fn token_usage(&self) -> Option<TokenCounts> {
        self.as_ref().and_then(ReportsUsage::token_usage)
    }
}

/// Destination for finished usage events
///
/// Implementations must absorb their own failures; `accept` has no error
/// channel.
#[async_trait]
pub trait EventSink: Send + Sync {
    /// Deliver a single event
    async fn accept(&self, event: &UsageEvent);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_slot_replace_returns_previous() {
        let slot = CallSlot::new(|x: u32| async move { x + 1 });
        assert_eq!(slot.call(1).await, 2);

        let previous = slot.replace(Arc::new(|x: u32| -> BoxFuture<'static, u32> {
            Box::pin(async move { x * 10 })
        }));
        assert_eq!(slot.call(2).await, 20);
        assert_eq!(previous(2).await, 3);

        slot.replace(previous);
        assert_eq!(slot.call(2).await, 3);
    }

    #[test]
    fn test_provider_id_display() {
        let id = ProviderId::new("anthropic");
        assert_eq!(id.to_string(), "anthropic");
        assert_eq!(id.as_str(), "anthropic");
    }

    struct Counted(u64, u64);

    impl ReportsUsage for Counted {
        fn token_usage(&self) -> Option<TokenCounts> {
            Some(TokenCounts::new(self.0, self.1))
        }
    }

    #[test]
    fn test_reports_usage_through_result() {
        let ok: std::result::Result<Counted, String> = Ok(Counted(3, 4));
        assert_eq!(ok.token_usage(), Some(TokenCounts::new(3, 4)));

        let err: std::result::Result<Counted, String> = Err("boom".into());
        assert_eq!(err.token_usage(), None);

        let none: Option<Counted> = None;
        assert_eq!(none.token_usage(), None);
    }
}
