//! SDK instance registry
//!
//! Acquiring an SDK instance is expensive (WASM loading, key fetching) and
//! must happen at most once per process. The registry owns the instance
//! lifecycle:
//!
//! ```text
//! Uninitialized -> Initializing(shared future) -> Ready(capabilities)
//!                                              -> Failed(error)
//! ```
//!
//! A caller arriving while initialization is in flight awaits the same
//! shared future instead of starting a second initialization. A failed
//! initialization stays failed until [`SdkRegistry::reset`].

use std::sync::{Arc, Mutex};

use futures::future::{BoxFuture, FutureExt, Shared};
use tracing::{debug, warn};

use crate::error::{LedgerError, LedgerResult};

use super::capabilities::SdkCapabilities;

/// Future produced by a connector; the error is a plain message so the
/// result stays cloneable across awaiting callers.
pub type SdkInitFuture = BoxFuture<'static, Result<Arc<SdkCapabilities>, String>>;

type SharedInit = Shared<SdkInitFuture>;

enum SdkState {
    Uninitialized,
    Initializing(SharedInit),
    Ready(Arc<SdkCapabilities>),
    Failed(String),
}

impl SdkState {
    fn name(&self) -> &'static str {
        match self {
            Self::Uninitialized => "uninitialized",
            Self::Initializing(_) => "initializing",
            Self::Ready(_) => "ready",
            Self::Failed(_) => "failed",
        }
    }
}

/// Process-scoped SDK instance state with single-flight initialization.
pub struct SdkRegistry {
    connector: Box<dyn Fn() -> SdkInitFuture + Send + Sync>,
    state: Mutex<SdkState>,
}

impl SdkRegistry {
    /// Create a registry that initializes through `connector` on first use
    pub fn new<F>(connector: F) -> Self
    where
        F: Fn() -> SdkInitFuture + Send + Sync + 'static,
    {
        Self {
            connector: Box::new(connector),
            state: Mutex::new(SdkState::Uninitialized),
        }
    }

    /// Create a registry whose capabilities are already known.
    ///
    /// `reset` re-resolves to the same capabilities.
    pub fn ready(capabilities: SdkCapabilities) -> Self {
        let capabilities = Arc::new(capabilities);
        Self::new(move || {
            let capabilities = capabilities.clone();
            async move { Ok(capabilities) }.boxed()
        })
    }

    /// Create a registry with no capabilities at all.
    ///
    /// Decryption through a detached registry always falls through to the
    /// metadata/hint/legacy tiers; useful for offline inspection and
    /// recovery of legacy records.
    pub fn detached() -> Self {
        Self::ready(SdkCapabilities::default())
    }

    /// Acquire the SDK capabilities, initializing on first call.
    ///
    /// Concurrent callers during initialization await the same in-flight
    /// future. Once failed, every subsequent call returns the stored error
    /// until [`SdkRegistry::reset`].
    pub async fn instance(&self) -> LedgerResult<Arc<SdkCapabilities>> {
        let pending = {
            let mut state = self.state.lock().expect("sdk state mutex poisoned");
            match &mut *state {
                SdkState::Ready(capabilities) => return Ok(capabilities.clone()),
                SdkState::Failed(message) => {
                    return Err(LedgerError::SdkUnavailable(message.clone()))
                }
                SdkState::Initializing(pending) => pending.clone(),
                slot @ SdkState::Uninitialized => {
                    debug!("starting sdk initialization");
                    let pending = (self.connector)().shared();
                    *slot = SdkState::Initializing(pending.clone());
                    pending
                }
            }
        };

        let result = pending.await;

        let mut state = self.state.lock().expect("sdk state mutex poisoned");
        match result {
            Ok(capabilities) => {
                *state = SdkState::Ready(capabilities.clone());
                Ok(capabilities)
            }
            Err(message) => {
                warn!(error = %message, "sdk initialization failed");
                *state = SdkState::Failed(message.clone());
                Err(LedgerError::SdkUnavailable(message))
            }
        }
    }

    /// Drop the current instance and return to `Uninitialized`.
    ///
    /// The next [`SdkRegistry::instance`] call runs the connector again.
    pub fn reset(&self) {
        let mut state = self.state.lock().expect("sdk state mutex poisoned");
        *state = SdkState::Uninitialized;
    }

    /// Current lifecycle state name, for diagnostics
    pub fn status(&self) -> &'static str {
        self.state.lock().expect("sdk state mutex poisoned").name()
    }
}

impl std::fmt::Debug for SdkRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SdkRegistry")
            .field("state", &self.status())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn counting_registry(counter: Arc<AtomicUsize>) -> SdkRegistry {
        SdkRegistry::new(move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(20)).await;
                Ok(Arc::new(SdkCapabilities::default()))
            }
            .boxed()
        })
    }

    #[tokio::test]
    async fn test_concurrent_callers_share_one_initialization() {
        let counter = Arc::new(AtomicUsize::new(0));
        let registry = Arc::new(counting_registry(counter.clone()));

        let a = registry.clone();
        let b = registry.clone();
        let (ra, rb) = tokio::join!(
            tokio::spawn(async move { a.instance().await.is_ok() }),
            tokio::spawn(async move { b.instance().await.is_ok() }),
        );
        assert!(ra.unwrap() && rb.unwrap());
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert_eq!(registry.status(), "ready");
    }

    #[tokio::test]
    async fn test_ready_instance_is_cached() {
        let counter = Arc::new(AtomicUsize::new(0));
        let registry = counting_registry(counter.clone());

        registry.instance().await.unwrap();
        registry.instance().await.unwrap();
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failure_is_sticky_until_reset() {
        let counter = Arc::new(AtomicUsize::new(0));
        let attempts = counter.clone();
        let registry = SdkRegistry::new(move || {
            let attempts = attempts.clone();
            async move {
                attempts.fetch_add(1, Ordering::SeqCst);
                Err("relayer unreachable".to_string())
            }
            .boxed()
        });

        let err = registry.instance().await.unwrap_err();
        assert!(err.is_sdk_unavailable());
        assert_eq!(registry.status(), "failed");

        // No second attempt while failed
        let err = registry.instance().await.unwrap_err();
        assert!(err.to_string().contains("relayer unreachable"));
        assert_eq!(counter.load(Ordering::SeqCst), 1);

        registry.reset();
        assert_eq!(registry.status(), "uninitialized");
        let _ = registry.instance().await;
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_detached_registry_has_no_capabilities() {
        let registry = SdkRegistry::detached();
        let caps = registry.instance().await.unwrap();
        assert!(!caps.can_decrypt());
    }
}
