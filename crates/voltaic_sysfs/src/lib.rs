//! Linux battery backend for voltaic.
//!
//! [`SysfsPlatform`] implements [`PowerPlatform`](voltaic_battery::PowerPlatform)
//! over the kernel's `power_supply` class. Change notifications come from a
//! poll task that re-reads the battery every [`SysfsConfig::poll_interval`]
//! and emits the channels whose readings moved.
//!
//! # Configuration
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `VOLTAIC_POWER_SUPPLY_DIR` | `/sys/class/power_supply` | Supply directory |
//! | `VOLTAIC_POLL_INTERVAL_MS` | `5000` | Poll interval |

mod battery;
mod config;
mod error;
mod platform;
mod reader;

pub use battery::SysfsBattery;
pub use config::{
    DEFAULT_POLL_INTERVAL, DEFAULT_POWER_SUPPLY_DIR, MIN_POLL_INTERVAL, POLL_INTERVAL_ENV,
    POWER_SUPPLY_DIR_ENV, SysfsConfig,
};
pub use error::SysfsError;
pub use platform::SysfsPlatform;
