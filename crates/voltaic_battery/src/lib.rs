//! Battery status for voltaic hosts.
//!
//! The battery handle is acquired once, lazily, and shared by every reader:
//!
//! - [`AcquisitionPipeline`] - single-flight acquisition over a
//!   [`PowerPlatform`], caching the handle or the failure for good
//! - [`EventBridge`] - subscribes the handle's four change channels to named
//!   triggers before the handle becomes visible
//! - [`Battery`] - readings with fallbacks, synchronous once acquisition has
//!   settled
//! - [`HatsAPI`] - the default trigger sink, running registered hats
//!
//! # Example
//!
//! ```
//! use voltaic_battery::{Battery, BatteryPlugin, HatsPlugin, Unsupported};
//! use voltaic_system::server::Server;
//!
//! let mut server = Server::new();
//! server
//!     .add_plugins(HatsPlugin)
//!     .add_plugins(BatteryPlugin::new(Unsupported));
//! server.finish();
//!
//! // No battery: every reading falls back, synchronously.
//! let battery = server.get_global::<Battery>().unwrap();
//! assert_eq!(battery.level().ready(), Some(&100.0));
//! assert_eq!(battery.charging().ready(), Some(&true));
//! ```
//!
//! # Feature Flags
//!
//! - `test-utils`: enables [`testing`] with mock platforms and sinks

mod accessor;
mod bridge;
mod cache;
mod error;
mod hats;
mod pipeline;
mod platform;
mod plugin;
mod reading;
mod reporter;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use accessor::Battery;
pub use bridge::{BatteryTrigger, EXTENSION_ID, EventBridge, TriggerSink};
pub use cache::{CacheStatus, PendingHandle};
pub use error::AcquireError;
pub use hats::{HatRegistrationError, HatsAPI, HatsPlugin};
pub use pipeline::{Acquisition, AcquisitionPipeline};
pub use platform::{
    BatteryHandle, BatteryManager, BatteryStatus, ChangeChannel, ChangeListener, ChangeListeners,
    PowerPlatform, Unsupported,
};
pub use plugin::{BatteryPlugin, BatteryPlugins};
pub use reading::Reading;
pub use reporter::{Reporter, ReporterValue, UnknownReporter};

/// Commonly used battery types.
pub mod prelude {
    pub use crate::{
        Battery, BatteryPlugin, BatteryPlugins, BatteryStatus, BatteryTrigger, CacheStatus,
        HatsAPI, HatsPlugin, PowerPlatform, Reading, Reporter, ReporterValue,
    };
}
