//! Backend configuration.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::SysfsError;

/// Default power supply class directory.
pub const DEFAULT_POWER_SUPPLY_DIR: &str = "/sys/class/power_supply";

/// Default interval between status polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Shortest interval the poll task will run at.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Overrides [`SysfsConfig::root`].
pub const POWER_SUPPLY_DIR_ENV: &str = "VOLTAIC_POWER_SUPPLY_DIR";

/// Overrides [`SysfsConfig::poll_interval`], in milliseconds.
pub const POLL_INTERVAL_ENV: &str = "VOLTAIC_POLL_INTERVAL_MS";

/// Where to look for batteries and how often to re-read them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SysfsConfig {
    /// Directory holding one subdirectory per power supply.
    pub root: PathBuf,
    /// Interval between status polls. The poll task raises anything below
    /// [`MIN_POLL_INTERVAL`] to it.
    pub poll_interval: Duration,
}

impl Default for SysfsConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from(DEFAULT_POWER_SUPPLY_DIR),
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

impl SysfsConfig {
    /// Default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults overridden by [`POWER_SUPPLY_DIR_ENV`] and
    /// [`POLL_INTERVAL_ENV`] when set.
    ///
    /// # Errors
    ///
    /// Returns [`SysfsError::InvalidConfig`] if the poll interval is not a
    /// positive integer.
    pub fn from_env() -> Result<Self, SysfsError> {
        let mut config = Self::default();

        if let Some(root) = non_empty_var(POWER_SUPPLY_DIR_ENV) {
            config.root = PathBuf::from(root);
        }

        if let Some(raw) = non_empty_var(POLL_INTERVAL_ENV) {
            let millis: u64 = raw.parse().map_err(|_| SysfsError::InvalidConfig {
                var: POLL_INTERVAL_ENV,
                reason: format!("{raw:?} is not a number of milliseconds"),
            })?;
            if millis == 0 {
                return Err(SysfsError::InvalidConfig {
                    var: POLL_INTERVAL_ENV,
                    reason: "must be greater than zero".to_string(),
                });
            }
            config.poll_interval = Duration::from_millis(millis);
        }

        Ok(config)
    }

    /// Sets the power supply directory.
    #[must_use]
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    /// Sets the poll interval, raised to at least [`MIN_POLL_INTERVAL`].
    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval.max(MIN_POLL_INTERVAL);
        self
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
