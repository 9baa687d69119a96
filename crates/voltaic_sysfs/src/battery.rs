//! Battery handle backed by a `power_supply` directory.

use std::path::{Path, PathBuf};
use std::sync::Weak;
use std::time::Duration;

use parking_lot::RwLock;
use tokio::time::MissedTickBehavior;
use voltaic_battery::{
    BatteryManager, BatteryStatus, ChangeChannel, ChangeListener, ChangeListeners,
};

use crate::config::MIN_POLL_INTERVAL;
use crate::reader;

/// A system battery read from sysfs.
///
/// Readings are cached; a background poll refreshes them and emits the
/// channels whose values changed.
#[derive(Debug)]
pub struct SysfsBattery {
    dir: PathBuf,
    status: RwLock<BatteryStatus>,
    listeners: ChangeListeners,
}

impl SysfsBattery {
    pub(crate) fn new(dir: PathBuf, status: BatteryStatus) -> Self {
        Self {
            dir,
            status: RwLock::new(status),
            listeners: ChangeListeners::new(),
        }
    }

    /// The supply directory, e.g. `/sys/class/power_supply/BAT0`.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.dir
    }

    /// Re-reads the supply now, emitting changed channels.
    ///
    /// # Errors
    ///
    /// Returns the read error; cached readings are left untouched.
    pub async fn refresh(&self) -> Result<Vec<ChangeChannel>, crate::SysfsError> {
        let next = reader::read_status(&self.dir).await?;
        Ok(self.apply(next))
    }

    fn apply(&self, next: BatteryStatus) -> Vec<ChangeChannel> {
        let changed = {
            let mut status = self.status.write();
            let changed = status.changed_channels(&next);
            *status = next;
            changed
        };
        for channel in &changed {
            self.listeners.emit(*channel);
        }
        changed
    }
}

impl BatteryManager for SysfsBattery {
    fn charging(&self) -> bool {
        self.status.read().charging
    }

    fn level(&self) -> f64 {
        self.status.read().level
    }

    fn charging_time(&self) -> f64 {
        self.status.read().charging_time
    }

    fn discharging_time(&self) -> f64 {
        self.status.read().discharging_time
    }

    fn subscribe(&self, channel: ChangeChannel, listener: ChangeListener) {
        self.listeners.add(channel, listener);
    }

    fn status(&self) -> BatteryStatus {
        *self.status.read()
    }
}

/// Refreshes `battery` every `every` until it is dropped. Intervals shorter
/// than [`MIN_POLL_INTERVAL`] are raised to it.
pub(crate) async fn poll(battery: Weak<SysfsBattery>, every: Duration) {
    let mut ticker = tokio::time::interval(every.max(MIN_POLL_INTERVAL));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    // The first tick completes immediately; the handle was just read.
    ticker.tick().await;

    loop {
        ticker.tick().await;
        let Some(battery) = battery.upgrade() else {
            tracing::debug!("battery handle dropped, stopping poll");
            break;
        };

        match battery.refresh().await {
            Ok(changed) if !changed.is_empty() => {
                tracing::trace!(?changed, path = %battery.path().display(), "battery status changed");
            }
            Ok(_) => {}
            Err(error) => {
                tracing::warn!(%error, "battery poll failed");
            }
        }
    }
}
