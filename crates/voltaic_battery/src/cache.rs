//! Lifecycle state of the cached battery handle.
//!
//! ```text
//! Empty ──request──▶ Acquiring ──ok──▶ Ready
//!                        │
//!                        └──err──▶ Failed
//! ```
//!
//! `Ready` and `Failed` are terminal.

use futures::future::{BoxFuture, Shared};

use crate::platform::BatteryHandle;

/// The in-flight acquisition every concurrent caller awaits.
pub type PendingHandle = Shared<BoxFuture<'static, Option<BatteryHandle>>>;

pub(crate) enum ResourceState {
    Empty,
    Acquiring(PendingHandle),
    Ready(BatteryHandle),
    Failed,
}

impl ResourceState {
    /// `Empty -> Acquiring`. Returns false if the state was not `Empty`.
    pub(crate) fn begin(&mut self, pending: PendingHandle) -> bool {
        if matches!(self, ResourceState::Empty) {
            *self = ResourceState::Acquiring(pending);
            true
        } else {
            false
        }
    }

    /// `Acquiring -> Ready`. Returns false if the state was not `Acquiring`.
    pub(crate) fn ready(&mut self, handle: BatteryHandle) -> bool {
        if matches!(self, ResourceState::Acquiring(_)) {
            *self = ResourceState::Ready(handle);
            true
        } else {
            false
        }
    }

    /// `Acquiring -> Failed`. Returns false if the state was not `Acquiring`.
    pub(crate) fn fail(&mut self) -> bool {
        if matches!(self, ResourceState::Acquiring(_)) {
            *self = ResourceState::Failed;
            true
        } else {
            false
        }
    }

    pub(crate) fn status(&self) -> CacheStatus {
        match self {
            ResourceState::Empty => CacheStatus::Empty,
            ResourceState::Acquiring(_) => CacheStatus::Acquiring,
            ResourceState::Ready(_) => CacheStatus::Ready,
            ResourceState::Failed => CacheStatus::Failed,
        }
    }
}

impl std::fmt::Debug for ResourceState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.status().fmt(f)
    }
}

/// Observable acquisition status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheStatus {
    /// The platform has no battery support; nothing will ever be acquired.
    Unsupported,
    /// No acquisition has been started.
    Empty,
    /// An acquisition is in flight.
    Acquiring,
    /// A battery handle is cached and wired.
    Ready,
    /// Acquisition failed; fallback values are served from now on.
    Failed,
}

impl CacheStatus {
    /// Whether reads complete synchronously in this state.
    #[must_use]
    pub fn is_settled(self) -> bool {
        matches!(
            self,
            CacheStatus::Unsupported | CacheStatus::Ready | CacheStatus::Failed
        )
    }
}
