//! Provider instrumentation
//!
//! Installing a hook swaps the callable in a provider's [`CallSlot`] for a
//! wrapper that times each call, forwards to the original unchanged, and
//! tracks the response when it reports usage. Uninstalling puts the original
//! callable back.
//!
//! Per-provider state lives in an [`InstrumentationRegistry`]. Hosts usually go
//! through [`InstrumentationRegistry::global`] via
//! [`CostTracker::instrument`](crate::CostTracker::instrument); tests can keep
//! a private registry.

use crate::tracker::{CostTracker, TrackOptions, elapsed_ms};
use costgpt_core::error::Result;
use costgpt_core::provider::{CallFn, HookSpec, ProviderId};
use futures::future::BoxFuture;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;
use tracing::{debug, info, warn};

static GLOBAL: Lazy<InstrumentationRegistry> = Lazy::new(InstrumentationRegistry::new);

struct HookState {
    tracker: Arc<CostTracker>,
    restore: Box<dyn FnOnce() + Send>,
}

/// Which providers are instrumented, and by which tracker
///
/// Install and uninstall hold the registry lock for the whole slot swap, so
/// concurrent calls for the same provider serialize.
#[derive(Default)]
pub struct InstrumentationRegistry {
    hooks: Mutex<HashMap<ProviderId, HookState>>,
}

impl InstrumentationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide registry
    pub fn global() -> &'static InstrumentationRegistry {
        &GLOBAL
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<ProviderId, HookState>> {
        self.hooks.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Wrap the provider's call site so every call is tracked by `tracker`
    ///
    /// A no-op if the provider is already instrumented, even by another
    /// tracker.
    ///
    /// # Errors
    ///
    /// Propagates the error from [`HookSpec::locate_target`]; the registry is
    /// left unchanged.
    pub fn install<S: HookSpec>(&self, tracker: Arc<CostTracker>, spec: Arc<S>) -> Result<()> {
        let provider = spec.provider();
        let mut hooks = self.lock();

        if hooks.contains_key(&provider) {
            debug!(%provider, "Provider already instrumented");
            return Ok(());
        }

        let slot = spec.locate_target()?;
        let original = slot.current();
        let wrapper = wrap(Arc::clone(&original), spec, Arc::clone(&tracker));
        slot.replace(Arc::clone(&wrapper));

        let restore = Box::new(move || {
            if Arc::ptr_eq(&slot.current(), &wrapper) {
                slot.replace(original);
            } else {
                warn!(%provider, "Call slot was rebound after install, leaving it as is");
            }
        });
        hooks.insert(provider, HookState { tracker, restore });

        info!(%provider, "Installed cost instrumentation");
        Ok(())
    }

    /// Put the original callable back
    ///
    /// Returns `false` if the provider was not instrumented. If the host bound
    /// a new callable to the slot after install, that callable is kept and only
    /// the registry entry is dropped.
    pub fn uninstall<S: HookSpec>(&self, spec: &S) -> bool {
        let provider = spec.provider();
        let mut hooks = self.lock();

        match hooks.remove(&provider) {
            Some(state) => {
                (state.restore)();
                info!(%provider, "Removed cost instrumentation");
                true
            }
            None => {
                debug!(%provider, "Provider not instrumented, nothing to remove");
                false
            }
        }
    }

    pub fn is_installed(&self, provider: ProviderId) -> bool {
        self.lock().contains_key(&provider)
    }

    /// Tracker that owns the provider's hook, if any
    pub fn tracker_for(&self, provider: ProviderId) -> Option<Arc<CostTracker>> {
        self.lock()
            .get(&provider)
            .map(|state| Arc::clone(&state.tracker))
    }

    /// Instrumented providers, sorted by name
    pub fn installed(&self) -> Vec<ProviderId> {
        let mut providers: Vec<_> = self.lock().keys().copied().collect();
        providers.sort();
        providers
    }
}

impl fmt::Debug for InstrumentationRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstrumentationRegistry")
            .field("installed", &self.installed())
            .finish()
    }
}

fn wrap<S: HookSpec>(
    original: CallFn<S::Request, S::Response>,
    spec: Arc<S>,
    tracker: Arc<CostTracker>,
) -> CallFn<S::Request, S::Response> {
    Arc::new(move |request: S::Request| -> BoxFuture<'static, S::Response> {
        let original = Arc::clone(&original);
        let spec = Arc::clone(&spec);
        let tracker = Arc::clone(&tracker);

        Box::pin(async move {
            let start = Instant::now();
            let result = original(request).await;
            let duration_ms = elapsed_ms(start);

            if spec.has_usage(&result) {
                let model = spec.model(&result).to_string();
                let input_tokens = spec.input_tokens(&result);
                let output_tokens = spec.output_tokens(&result);
                tracker
                    .track(
                        &model,
                        input_tokens,
                        output_tokens,
                        TrackOptions::new().duration_ms(duration_ms),
                    )
                    .await;
            }

            result
        })
    })
}
