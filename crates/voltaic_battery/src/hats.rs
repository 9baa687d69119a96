//! Hat registry.
//!
//! Hats are handlers started by a named trigger event. [`HatsAPI`] is the
//! default [`TriggerSink`]: the battery bridge fires into it and every hat
//! registered on that event runs.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use voltaic_battery::{BatteryTrigger, HatsAPI};
//!
//! let hats = HatsAPI::new();
//! let started = Arc::new(AtomicUsize::new(0));
//!
//! let counter = Arc::clone(&started);
//! hats.register_trigger(BatteryTrigger::LevelChanged, "announce_level", move || {
//!     counter.fetch_add(1, Ordering::SeqCst);
//! })
//! .unwrap();
//!
//! assert_eq!(hats.start_hats("battery_levelChanged"), 1);
//! assert_eq!(started.load(Ordering::SeqCst), 1);
//! ```

use std::sync::Arc;

use hashbrown::HashMap;
use parking_lot::RwLock;
use voltaic_system::api::API;
use voltaic_system::plugin::Plugin;
use voltaic_system::server::Server;

use crate::bridge::{BatteryTrigger, TriggerSink};

type Hat = Arc<dyn Fn() + Send + Sync>;

struct HatEntry {
    name: String,
    hat: Hat,
}

/// Error returned by [`HatsAPI::register_hat`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HatRegistrationError {
    /// A hat with this name is already registered on the event.
    #[error("hat '{name}' is already registered on '{event}'")]
    Duplicate {
        /// Event name.
        event: String,
        /// Hat name.
        name: String,
    },
}

/// Registry of hats keyed by event name.
///
/// Cloning shares the registry.
#[derive(Clone, Default)]
pub struct HatsAPI {
    hats: Arc<RwLock<HashMap<String, Vec<HatEntry>>>>,
}

impl API for HatsAPI {}

impl HatsAPI {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `hat` under `name` on `event`.
    ///
    /// # Errors
    ///
    /// Returns [`HatRegistrationError::Duplicate`] if `name` is already
    /// registered on `event`.
    pub fn register_hat<F>(
        &self,
        event: impl Into<String>,
        name: impl Into<String>,
        hat: F,
    ) -> Result<&Self, HatRegistrationError>
    where
        F: Fn() + Send + Sync + 'static,
    {
        let event = event.into();
        let name = name.into();
        let mut hats = self.hats.write();
        let entries = hats.entry(event.clone()).or_default();

        if entries.iter().any(|entry| entry.name == name) {
            return Err(HatRegistrationError::Duplicate { event, name });
        }

        tracing::debug!(%event, hat = %name, "hat registered");
        entries.push(HatEntry {
            name,
            hat: Arc::new(hat),
        });
        Ok(self)
    }

    /// Registers `hat` on a battery trigger.
    ///
    /// # Errors
    ///
    /// See [`register_hat`](Self::register_hat).
    pub fn register_trigger<F>(
        &self,
        trigger: BatteryTrigger,
        name: impl Into<String>,
        hat: F,
    ) -> Result<&Self, HatRegistrationError>
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.register_hat(trigger.event_name(), name, hat)
    }

    /// Runs every hat registered on `event`, returning how many ran.
    ///
    /// Hats run outside the registry lock, so a hat may register others.
    pub fn start_hats(&self, event: &str) -> usize {
        let hats: Vec<Hat> = self
            .hats
            .read()
            .get(event)
            .map(|entries| entries.iter().map(|entry| Arc::clone(&entry.hat)).collect())
            .unwrap_or_default();

        for hat in &hats {
            hat();
        }
        hats.len()
    }

    /// Number of hats on `event`.
    #[must_use]
    pub fn hat_count(&self, event: &str) -> usize {
        self.hats.read().get(event).map_or(0, Vec::len)
    }

    /// Events with at least one hat, sorted.
    #[must_use]
    pub fn events(&self) -> Vec<String> {
        let mut events: Vec<String> = self
            .hats
            .read()
            .iter()
            .filter(|(_, entries)| !entries.is_empty())
            .map(|(event, _)| event.clone())
            .collect();
        events.sort();
        events
    }
}

impl TriggerSink for HatsAPI {
    fn fire(&self, event: &str) {
        let started = self.start_hats(event);
        tracing::trace!(event, started, "hats started");
    }
}

impl std::fmt::Debug for HatsAPI {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HatsAPI")
            .field("events", &self.events())
            .finish()
    }
}

/// Provides [`HatsAPI`].
///
/// # APIs Provided
///
/// | API | Description |
/// |-----|-------------|
/// | [`HatsAPI`] | Hat registry and default trigger sink |
#[derive(Debug, Default, Clone, Copy)]
pub struct HatsPlugin;

impl Plugin for HatsPlugin {
    fn build(&self, server: &mut Server) {
        if !server.contains_api::<HatsAPI>() {
            server.insert_api(HatsAPI::new());
        }
    }

    fn name(&self) -> &str {
        "voltaic::hats"
    }
}
