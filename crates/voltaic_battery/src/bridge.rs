//! Native change channels to named triggers.

use std::sync::Arc;

use crate::platform::{BatteryManager, ChangeChannel};

/// Extension identifier used as the prefix of every trigger event name.
pub const EXTENSION_ID: &str = "battery";

/// Receives trigger events by name.
pub trait TriggerSink: Send + Sync + 'static {
    /// Starts everything listening for `event`.
    fn fire(&self, event: &str);
}

/// The four battery triggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BatteryTrigger {
    /// Raised when charging starts or stops.
    ChargingChanged,
    /// Raised when the charge level moves.
    LevelChanged,
    /// Raised when the time-to-full estimate changes.
    ChargeTimeChanged,
    /// Raised when the time-to-empty estimate changes.
    DischargeTimeChanged,
}

impl BatteryTrigger {
    /// Every trigger, in channel order.
    pub const ALL: [BatteryTrigger; 4] = [
        BatteryTrigger::ChargingChanged,
        BatteryTrigger::LevelChanged,
        BatteryTrigger::ChargeTimeChanged,
        BatteryTrigger::DischargeTimeChanged,
    ];

    /// Opcode of the trigger within the extension.
    #[must_use]
    pub fn opcode(self) -> &'static str {
        match self {
            BatteryTrigger::ChargingChanged => "chargingChanged",
            BatteryTrigger::LevelChanged => "levelChanged",
            BatteryTrigger::ChargeTimeChanged => "chargeTimeChanged",
            BatteryTrigger::DischargeTimeChanged => "dischargeTimeChanged",
        }
    }

    /// Fully-qualified event name, `<extension>_<opcode>`.
    #[must_use]
    pub fn event_name(self) -> &'static str {
        match self {
            BatteryTrigger::ChargingChanged => "battery_chargingChanged",
            BatteryTrigger::LevelChanged => "battery_levelChanged",
            BatteryTrigger::ChargeTimeChanged => "battery_chargeTimeChanged",
            BatteryTrigger::DischargeTimeChanged => "battery_dischargeTimeChanged",
        }
    }

    /// Looks up a trigger by its fully-qualified event name.
    #[must_use]
    pub fn from_event_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.event_name() == name)
    }
}

impl std::fmt::Display for BatteryTrigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.event_name())
    }
}

/// Subscribes a battery handle's change channels to a [`TriggerSink`].
#[derive(Clone)]
pub struct EventBridge {
    sink: Arc<dyn TriggerSink>,
}

impl EventBridge {
    /// Creates a bridge that fires into `sink`.
    pub fn new(sink: Arc<dyn TriggerSink>) -> Self {
        Self { sink }
    }

    /// Subscribes one listener per channel on `handle`.
    ///
    /// Callers wire each handle exactly once; wiring again would fire every
    /// trigger twice per native event.
    pub fn wire(&self, handle: &dyn BatteryManager) {
        for channel in ChangeChannel::ALL {
            let sink = Arc::clone(&self.sink);
            let event = channel.trigger().event_name();
            handle.subscribe(
                channel,
                Arc::new(move || {
                    tracing::trace!(event, "battery trigger fired");
                    sink.fire(event);
                }),
            );
        }
        tracing::debug!("battery change channels bridged");
    }
}

impl std::fmt::Debug for EventBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBridge").finish_non_exhaustive()
    }
}
