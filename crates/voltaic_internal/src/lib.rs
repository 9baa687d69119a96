//! # Voltaic Internal Library
//!
//! Re-exports the voltaic crates for convenience.

/// Extension host: plugins, global resources, APIs.
pub use voltaic_system;

/// Tracing and other infrastructure plugins.
pub use voltaic_core_plugins;

/// Battery acquisition, caching, triggers, and accessors.
pub use voltaic_battery;

/// Linux `/sys/class/power_supply` backend.
#[cfg(feature = "sysfs")]
pub use voltaic_sysfs;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use voltaic_battery::prelude::*;
    pub use voltaic_core_plugins::{TracingConfig, TracingFormat, TracingPlugin};
    pub use voltaic_system::prelude::*;
}
