//! Seams to the host power platform.
//!
//! A [`PowerPlatform`] answers whether battery status is available at all and,
//! if so, produces a [`BatteryManager`] asynchronously. The manager reports the
//! four readings and lets subscribers hear about changes on each
//! [`ChangeChannel`].

use std::sync::Arc;

use async_trait::async_trait;
use hashbrown::HashMap;
use parking_lot::RwLock;

use crate::bridge::BatteryTrigger;
use crate::error::AcquireError;

/// Callback invoked when a native change channel fires.
pub type ChangeListener = Arc<dyn Fn() + Send + Sync>;

/// Shared battery handle, as cached by the pipeline.
pub type BatteryHandle = Arc<dyn BatteryManager>;

/// The four change notifications a battery handle emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeChannel {
    /// The charging flag flipped.
    Charging,
    /// The charge level moved.
    Level,
    /// The time-to-full estimate changed.
    ChargingTime,
    /// The time-to-empty estimate changed.
    DischargingTime,
}

impl ChangeChannel {
    /// Every channel, in wiring order.
    pub const ALL: [ChangeChannel; 4] = [
        ChangeChannel::Charging,
        ChangeChannel::Level,
        ChangeChannel::ChargingTime,
        ChangeChannel::DischargingTime,
    ];

    /// Name of the native event.
    #[must_use]
    pub fn native_name(self) -> &'static str {
        match self {
            ChangeChannel::Charging => "chargingchange",
            ChangeChannel::Level => "levelchange",
            ChangeChannel::ChargingTime => "chargingtimechange",
            ChangeChannel::DischargingTime => "dischargingtimechange",
        }
    }

    /// The trigger this channel is bridged to.
    #[must_use]
    pub fn trigger(self) -> BatteryTrigger {
        match self {
            ChangeChannel::Charging => BatteryTrigger::ChargingChanged,
            ChangeChannel::Level => BatteryTrigger::LevelChanged,
            ChangeChannel::ChargingTime => BatteryTrigger::ChargeTimeChanged,
            ChangeChannel::DischargingTime => BatteryTrigger::DischargeTimeChanged,
        }
    }
}

/// Point-in-time readings, in native units.
///
/// `level` is a fraction in `[0, 1]`; times are seconds and may be
/// `f64::INFINITY` when unknown.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BatteryStatus {
    /// Whether the battery is charging.
    pub charging: bool,
    /// Charge fraction in `[0, 1]`.
    pub level: f64,
    /// Seconds until full.
    pub charging_time: f64,
    /// Seconds until empty.
    pub discharging_time: f64,
}

impl BatteryStatus {
    /// Readings reported while no battery handle is available: a device on
    /// mains power with a full battery.
    pub const ABSENT: BatteryStatus = BatteryStatus {
        charging: true,
        level: 1.0,
        charging_time: 0.0,
        discharging_time: f64::INFINITY,
    };

    /// Channels whose readings differ between `self` and `next`.
    #[must_use]
    pub fn changed_channels(&self, next: &BatteryStatus) -> Vec<ChangeChannel> {
        let mut changed = Vec::new();
        if self.charging != next.charging {
            changed.push(ChangeChannel::Charging);
        }
        if self.level != next.level {
            changed.push(ChangeChannel::Level);
        }
        if self.charging_time != next.charging_time {
            changed.push(ChangeChannel::ChargingTime);
        }
        if self.discharging_time != next.discharging_time {
            changed.push(ChangeChannel::DischargingTime);
        }
        changed
    }
}

impl Default for BatteryStatus {
    fn default() -> Self {
        Self::ABSENT
    }
}

/// A live battery handle.
///
/// Reads are synchronous; the handle keeps its own copy of the latest state.
pub trait BatteryManager: Send + Sync + 'static {
    /// Whether the battery is charging.
    fn charging(&self) -> bool;

    /// Charge fraction in `[0, 1]`.
    fn level(&self) -> f64;

    /// Seconds until full.
    fn charging_time(&self) -> f64;

    /// Seconds until empty.
    fn discharging_time(&self) -> f64;

    /// Registers `listener` on `channel`.
    ///
    /// Listeners are never removed; they live as long as the handle.
    fn subscribe(&self, channel: ChangeChannel, listener: ChangeListener);

    /// All four readings at once.
    fn status(&self) -> BatteryStatus {
        BatteryStatus {
            charging: self.charging(),
            level: self.level(),
            charging_time: self.charging_time(),
            discharging_time: self.discharging_time(),
        }
    }
}

/// Source of battery handles.
#[async_trait]
pub trait PowerPlatform: Send + Sync + 'static {
    /// Whether this platform exposes battery status at all.
    ///
    /// Must be cheap and side-effect free; it is consulted on every request.
    fn is_supported(&self) -> bool;

    /// Obtains a battery handle.
    ///
    /// Called at most once per pipeline.
    async fn acquire(&self) -> Result<BatteryHandle, AcquireError>;
}

/// A platform with no battery support.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unsupported;

#[async_trait]
impl PowerPlatform for Unsupported {
    fn is_supported(&self) -> bool {
        false
    }

    async fn acquire(&self) -> Result<BatteryHandle, AcquireError> {
        Err(AcquireError::NoBattery)
    }
}

/// Per-channel listener lists for [`BatteryManager`] implementations.
#[derive(Default)]
pub struct ChangeListeners {
    by_channel: RwLock<HashMap<ChangeChannel, Vec<ChangeListener>>>,
}

impl ChangeListeners {
    /// Creates empty listener lists.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `listener` to `channel`.
    pub fn add(&self, channel: ChangeChannel, listener: ChangeListener) {
        self.by_channel
            .write()
            .entry(channel)
            .or_default()
            .push(listener);
    }

    /// Invokes every listener on `channel`, returning how many ran.
    ///
    /// The lock is released before listeners run, so a listener may read the
    /// handle or subscribe further.
    pub fn emit(&self, channel: ChangeChannel) -> usize {
        let listeners = self
            .by_channel
            .read()
            .get(&channel)
            .cloned()
            .unwrap_or_default();
        for listener in &listeners {
            listener();
        }
        listeners.len()
    }

    /// Number of listeners on `channel`.
    #[must_use]
    pub fn count(&self, channel: ChangeChannel) -> usize {
        self.by_channel.read().get(&channel).map_or(0, Vec::len)
    }
}

impl std::fmt::Debug for ChangeListeners {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let by_channel = self.by_channel.read();
        f.debug_map()
            .entries(by_channel.iter().map(|(channel, list)| (channel, list.len())))
            .finish()
    }
}
