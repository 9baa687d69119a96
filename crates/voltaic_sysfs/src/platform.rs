//! The sysfs power platform.

use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use voltaic_battery::{AcquireError, BatteryHandle, PowerPlatform};

use crate::battery::{SysfsBattery, poll};
use crate::config::SysfsConfig;
use crate::error::SysfsError;
use crate::reader;

/// Battery status from `/sys/class/power_supply`.
///
/// Support is probed once, on first use: the platform is supported when a
/// system battery exists under [`SysfsConfig::root`]. Acquisition reads the
/// battery and starts a poll task on the current Tokio runtime.
///
/// ```no_run
/// use voltaic_battery::PowerPlatform;
/// use voltaic_sysfs::{SysfsConfig, SysfsPlatform};
///
/// let platform = SysfsPlatform::new(SysfsConfig::from_env()?);
/// if platform.is_supported() {
///     println!("battery at {}", platform.battery_dir().unwrap().display());
/// }
/// # Ok::<(), voltaic_sysfs::SysfsError>(())
/// ```
#[derive(Debug, Default)]
pub struct SysfsPlatform {
    config: SysfsConfig,
    probe: OnceLock<Option<PathBuf>>,
}

impl SysfsPlatform {
    /// Creates a platform over `config`.
    #[must_use]
    pub fn new(config: SysfsConfig) -> Self {
        Self {
            config,
            probe: OnceLock::new(),
        }
    }

    /// Creates a platform configured from the environment.
    ///
    /// # Errors
    ///
    /// See [`SysfsConfig::from_env`].
    pub fn from_env() -> Result<Self, SysfsError> {
        Ok(Self::new(SysfsConfig::from_env()?))
    }

    /// The configuration in use.
    #[must_use]
    pub fn config(&self) -> &SysfsConfig {
        &self.config
    }

    /// Directory of the battery found by the probe, if any.
    #[must_use]
    pub fn battery_dir(&self) -> Option<&Path> {
        self.probe
            .get_or_init(|| match reader::find_battery(&self.config.root) {
                Ok(dir) => {
                    tracing::debug!(path = %dir.display(), "battery found");
                    Some(dir)
                }
                Err(error) => {
                    tracing::debug!(%error, "no sysfs battery");
                    None
                }
            })
            .as_deref()
    }
}

#[async_trait]
impl PowerPlatform for SysfsPlatform {
    fn is_supported(&self) -> bool {
        self.battery_dir().is_some()
    }

    async fn acquire(&self) -> Result<BatteryHandle, AcquireError> {
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| {
            AcquireError::Platform("sysfs backend requires a Tokio runtime".to_string())
        })?;

        let dir = match self.battery_dir() {
            Some(dir) => dir.to_path_buf(),
            None => return Err(SysfsError::NoBattery(self.config.root.clone()).into()),
        };

        let status = reader::read_status(&dir).await?;
        let battery = Arc::new(SysfsBattery::new(dir, status));
        runtime.spawn(poll(Arc::downgrade(&battery), self.config.poll_interval));

        tracing::info!(
            path = %battery.path().display(),
            poll_ms = self.config.poll_interval.as_millis(),
            "sysfs battery opened"
        );
        Ok(battery as BatteryHandle)
    }
}
