//! Test doubles for battery platforms and trigger sinks.
//!
//! Available with the `test-utils` feature.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use tokio::sync::Semaphore;

use crate::bridge::TriggerSink;
use crate::error::AcquireError;
use crate::platform::{
    BatteryHandle, BatteryManager, BatteryStatus, ChangeChannel, ChangeListener, ChangeListeners,
    PowerPlatform,
};

// ─────────────────────────────────────────────────────────────────────────────
// MockBattery
// ─────────────────────────────────────────────────────────────────────────────

/// Battery handle with settable readings.
///
/// Setters store the new readings and emit the channels whose values changed,
/// mirroring how a real handle reports updates.
///
/// ```
/// use voltaic_battery::ChangeChannel;
/// use voltaic_battery::testing::MockBattery;
///
/// let battery = MockBattery::default();
/// assert_eq!(battery.set_level(0.5), vec![ChangeChannel::Level]);
/// assert!(battery.set_level(0.5).is_empty());
/// ```
#[derive(Debug, Default)]
pub struct MockBattery {
    status: RwLock<BatteryStatus>,
    listeners: ChangeListeners,
}

impl MockBattery {
    /// Creates a battery reporting `status`.
    #[must_use]
    pub fn new(status: BatteryStatus) -> Self {
        Self {
            status: RwLock::new(status),
            listeners: ChangeListeners::new(),
        }
    }

    /// Replaces every reading and emits the changed channels.
    pub fn set_status(&self, next: BatteryStatus) -> Vec<ChangeChannel> {
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

    /// Sets the charging flag.
    pub fn set_charging(&self, charging: bool) -> Vec<ChangeChannel> {
        let next = BatteryStatus {
            charging,
            ..*self.status.read()
        };
        self.set_status(next)
    }

    /// Sets the charge fraction.
    pub fn set_level(&self, level: f64) -> Vec<ChangeChannel> {
        let next = BatteryStatus {
            level,
            ..*self.status.read()
        };
        self.set_status(next)
    }

    /// Sets the seconds-until-full estimate.
    pub fn set_charging_time(&self, seconds: f64) -> Vec<ChangeChannel> {
        let next = BatteryStatus {
            charging_time: seconds,
            ..*self.status.read()
        };
        self.set_status(next)
    }

    /// Sets the seconds-until-empty estimate.
    pub fn set_discharging_time(&self, seconds: f64) -> Vec<ChangeChannel> {
        let next = BatteryStatus {
            discharging_time: seconds,
            ..*self.status.read()
        };
        self.set_status(next)
    }

    /// Emits `channel` without changing any reading.
    pub fn emit(&self, channel: ChangeChannel) -> usize {
        self.listeners.emit(channel)
    }

    /// Number of listeners subscribed to `channel`.
    #[must_use]
    pub fn listener_count(&self, channel: ChangeChannel) -> usize {
        self.listeners.count(channel)
    }
}

impl BatteryManager for MockBattery {
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

// ─────────────────────────────────────────────────────────────────────────────
// MockPlatform
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug)]
enum Outcome {
    Succeed(Arc<MockBattery>),
    Fail(String),
}

/// Scripted power platform.
///
/// Counts acquisitions and can hold them open until [`release`](Self::release)
/// is called, which makes in-flight states observable from tests.
#[derive(Debug)]
pub struct MockPlatform {
    supported: bool,
    outcome: Outcome,
    gate: Option<Semaphore>,
    attempts: AtomicUsize,
}

impl MockPlatform {
    /// A supported platform whose acquisition yields `battery`.
    #[must_use]
    pub fn with_battery(battery: Arc<MockBattery>) -> Self {
        Self {
            supported: true,
            outcome: Outcome::Succeed(battery),
            gate: None,
            attempts: AtomicUsize::new(0),
        }
    }

    /// A supported platform whose acquisition fails with `message`.
    #[must_use]
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            supported: true,
            outcome: Outcome::Fail(message.into()),
            gate: None,
            attempts: AtomicUsize::new(0),
        }
    }

    /// A platform with no battery support.
    #[must_use]
    pub fn unsupported() -> Self {
        Self {
            supported: false,
            ..Self::failing("unsupported")
        }
    }

    /// Holds every acquisition until [`release`](Self::release) is called.
    #[must_use]
    pub fn held(mut self) -> Self {
        self.gate = Some(Semaphore::new(0));
        self
    }

    /// Lets held acquisitions complete.
    pub fn release(&self) {
        if let Some(gate) = &self.gate {
            gate.add_permits(1);
        }
    }

    /// How many times [`acquire`](PowerPlatform::acquire) was entered.
    #[must_use]
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PowerPlatform for MockPlatform {
    fn is_supported(&self) -> bool {
        self.supported
    }

    async fn acquire(&self) -> Result<BatteryHandle, AcquireError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);

        if let Some(gate) = &self.gate {
            let _permit = gate
                .acquire()
                .await
                .map_err(|_| AcquireError::Platform("mock gate closed".to_string()))?;
        }

        match &self.outcome {
            Outcome::Succeed(battery) => Ok(Arc::clone(battery) as BatteryHandle),
            Outcome::Fail(message) => Err(AcquireError::Platform(message.clone())),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// RecordingSink
// ─────────────────────────────────────────────────────────────────────────────

/// Trigger sink that records every fired event name.
#[derive(Debug, Default)]
pub struct RecordingSink {
    fired: Mutex<Vec<String>>,
}

impl RecordingSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every fired event, in order.
    #[must_use]
    pub fn fired(&self) -> Vec<String> {
        self.fired.lock().clone()
    }

    /// How many times `event` fired.
    #[must_use]
    pub fn count(&self, event: &str) -> usize {
        self.fired.lock().iter().filter(|e| *e == event).count()
    }
}

impl TriggerSink for RecordingSink {
    fn fire(&self, event: &str) {
        self.fired.lock().push(event.to_string());
    }
}
