//! Single-flight battery acquisition.
//!
//! [`AcquisitionPipeline::request`] coalesces every caller onto one
//! acquisition. The first request on an `Empty` cache starts it; callers that
//! arrive while it is in flight share the same future; once it settles, the
//! cached handle (or the cached failure) is served synchronously forever.
//!
//! When a Tokio runtime is running, the acquisition is spawned onto it so it
//! completes even if every caller drops its future. Outside a runtime, the
//! shared future is driven by whoever awaits it.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use futures::FutureExt;
use futures::future::BoxFuture;
use parking_lot::Mutex;

use crate::bridge::{EventBridge, TriggerSink};
use crate::cache::{CacheStatus, PendingHandle, ResourceState};
use crate::platform::{BatteryHandle, BatteryManager, PowerPlatform};
use crate::reading::Reading;

/// Outcome of a single [`AcquisitionPipeline::request`].
pub enum Acquisition {
    /// Acquisition already settled. `None` means unsupported or failed.
    Settled(Option<BatteryHandle>),
    /// Acquisition is in flight; every caller shares this future.
    InFlight(PendingHandle),
}

impl Acquisition {
    /// Whether the handle (or its absence) is known without awaiting.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        matches!(self, Acquisition::Settled(_))
    }

    /// The handle, if settled successfully.
    #[must_use]
    pub fn handle(&self) -> Option<&BatteryHandle> {
        match self {
            Acquisition::Settled(handle) => handle.as_ref(),
            Acquisition::InFlight(_) => None,
        }
    }

    /// Computes a reading from the handle, now or once settled.
    ///
    /// `extract` receives `None` when no battery is available and is expected
    /// to supply the fallback value.
    pub fn read<T, F>(self, extract: F) -> Reading<T>
    where
        T: Send + 'static,
        F: FnOnce(Option<&dyn BatteryManager>) -> T + Send + 'static,
    {
        match self {
            Acquisition::Settled(handle) => Reading::Ready(extract(handle.as_deref())),
            Acquisition::InFlight(pending) => Reading::Pending(
                async move {
                    let handle = pending.await;
                    extract(handle.as_deref())
                }
                .boxed(),
            ),
        }
    }
}

impl IntoFuture for Acquisition {
    type Output = Option<BatteryHandle>;
    type IntoFuture = BoxFuture<'static, Option<BatteryHandle>>;

    fn into_future(self) -> Self::IntoFuture {
        match self {
            Acquisition::Settled(handle) => futures::future::ready(handle).boxed(),
            Acquisition::InFlight(pending) => pending.boxed(),
        }
    }
}

impl std::fmt::Debug for Acquisition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Acquisition::Settled(handle) => f
                .debug_tuple("Settled")
                .field(&handle.as_ref().map(|_| "BatteryHandle"))
                .finish(),
            Acquisition::InFlight(_) => f.write_str("InFlight"),
        }
    }
}

/// Owns the cached battery handle and the acquisition that fills it.
///
/// Cloning shares the cache.
#[derive(Clone)]
pub struct AcquisitionPipeline {
    inner: Arc<PipelineInner>,
}

struct PipelineInner {
    platform: Arc<dyn PowerPlatform>,
    bridge: EventBridge,
    state: Mutex<ResourceState>,
    attempts: AtomicUsize,
}

impl AcquisitionPipeline {
    /// Creates a pipeline over `platform` whose change channels fire into
    /// `sink`.
    pub fn new(platform: Arc<dyn PowerPlatform>, sink: Arc<dyn TriggerSink>) -> Self {
        Self {
            inner: Arc::new(PipelineInner {
                platform,
                bridge: EventBridge::new(sink),
                state: Mutex::new(ResourceState::Empty),
                attempts: AtomicUsize::new(0),
            }),
        }
    }

    /// Returns the battery handle, its absence, or the in-flight acquisition.
    ///
    /// Starts an acquisition only when the platform is supported and the cache
    /// is `Empty`. A failed acquisition is never retried.
    pub fn request(&self) -> Acquisition {
        if !self.inner.platform.is_supported() {
            return Acquisition::Settled(None);
        }

        let mut state = self.inner.state.lock();
        match &*state {
            ResourceState::Ready(handle) => Acquisition::Settled(Some(Arc::clone(handle))),
            ResourceState::Failed => Acquisition::Settled(None),
            ResourceState::Acquiring(pending) => Acquisition::InFlight(pending.clone()),
            ResourceState::Empty => {
                let pending = PipelineInner::start(&self.inner);
                state.begin(pending.clone());
                Acquisition::InFlight(pending)
            }
        }
    }

    /// Current acquisition status.
    #[must_use]
    pub fn status(&self) -> CacheStatus {
        if !self.inner.platform.is_supported() {
            return CacheStatus::Unsupported;
        }
        self.inner.state.lock().status()
    }

    /// How many acquisitions this pipeline has started. Never more than one.
    #[must_use]
    pub fn attempts(&self) -> usize {
        self.inner.attempts.load(Ordering::SeqCst)
    }
}

impl std::fmt::Debug for AcquisitionPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AcquisitionPipeline")
            .field("status", &self.status())
            .field("attempts", &self.attempts())
            .finish()
    }
}

impl PipelineInner {
    /// Builds the shared acquisition future. Called with the state lock held.
    fn start(inner: &Arc<Self>) -> PendingHandle {
        inner.attempts.fetch_add(1, Ordering::SeqCst);
        tracing::debug!("acquiring battery handle");

        let settle = Arc::clone(inner).settle().boxed();
        let driven = match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                let task = runtime.spawn(settle);
                let inner = Arc::clone(inner);
                async move {
                    match task.await {
                        Ok(handle) => handle,
                        Err(error) => {
                            if inner.state.lock().fail() {
                                tracing::error!(%error, "battery acquisition task aborted");
                            }
                            None
                        }
                    }
                }
                .boxed()
            }
            Err(_) => settle,
        };
        driven.shared()
    }

    /// Runs the platform acquisition and records the outcome.
    ///
    /// Change channels are wired before the handle becomes visible as
    /// `Ready`, so no caller can observe a handle whose events are unbridged.
    async fn settle(self: Arc<Self>) -> Option<BatteryHandle> {
        match self.platform.acquire().await {
            Ok(handle) => {
                self.bridge.wire(handle.as_ref());
                self.state.lock().ready(Arc::clone(&handle));
                tracing::info!(status = ?handle.status(), "battery handle acquired");
                Some(handle)
            }
            Err(error) => {
                self.state.lock().fail();
                tracing::error!(%error, "could not get battery");
                None
            }
        }
    }
}
