//! Battery plugin.

use std::sync::Arc;

use voltaic_system::plugin::{Plugin, PluginGroup, PluginGroupBuilder, PluginId};
use voltaic_system::server::Server;

use crate::accessor::Battery;
use crate::bridge::TriggerSink;
use crate::hats::{HatsAPI, HatsPlugin};
use crate::platform::PowerPlatform;

/// Provides the [`Battery`] accessors.
///
/// By default, change notifications fire into the server's [`HatsAPI`], so
/// [`HatsPlugin`] is a dependency. Supplying a sink with
/// [`with_trigger_sink`](Self::with_trigger_sink) removes that dependency.
///
/// With warm-up enabled (the default), acquisition starts in `ready()` so the
/// first read is usually already settled.
///
/// # Resources Provided
///
/// | Resource | Scope | Description |
/// |----------|-------|-------------|
/// | [`Battery`] | Global | Battery accessors over the shared pipeline |
///
/// # Dependencies
///
/// - [`HatsPlugin`], unless a trigger sink is supplied
pub struct BatteryPlugin {
    platform: Arc<dyn PowerPlatform>,
    sink: Option<Arc<dyn TriggerSink>>,
    warm_up: bool,
}

impl BatteryPlugin {
    /// Creates the plugin over `platform`.
    pub fn new(platform: impl PowerPlatform) -> Self {
        Self::from_shared(Arc::new(platform))
    }

    /// Creates the plugin over an already shared platform.
    pub fn from_shared(platform: Arc<dyn PowerPlatform>) -> Self {
        Self {
            platform,
            sink: None,
            warm_up: true,
        }
    }

    /// Fires change notifications into `sink` instead of [`HatsAPI`].
    #[must_use]
    pub fn with_trigger_sink(mut self, sink: Arc<dyn TriggerSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Whether to start acquisition during `ready()`.
    #[must_use]
    pub fn with_warm_up(mut self, warm_up: bool) -> Self {
        self.warm_up = warm_up;
        self
    }
}

impl Plugin for BatteryPlugin {
    fn build(&self, server: &mut Server) {
        let sink = match &self.sink {
            Some(sink) => Arc::clone(sink),
            None => {
                let Some(hats) = server.api::<HatsAPI>() else {
                    panic!("HatsAPI not found. Add HatsPlugin before BatteryPlugin.");
                };
                Arc::new(hats.clone()) as Arc<dyn TriggerSink>
            }
        };

        server.insert_global(Battery::new(Arc::clone(&self.platform), sink));
    }

    fn ready(&self, server: &mut Server) {
        if !self.warm_up {
            return;
        }
        if let Some(battery) = server.get_global::<Battery>() {
            battery.warm_up();
            tracing::debug!(status = ?battery.status(), "battery warm-up started");
        }
    }

    fn cleanup(&self, server: &mut Server) {
        if let Some(battery) = server.get_global::<Battery>() {
            tracing::debug!(status = ?battery.status(), "battery plugin shutting down");
        }
    }

    fn name(&self) -> &str {
        "voltaic::battery"
    }

    fn dependencies(&self) -> Vec<PluginId> {
        if self.sink.is_some() {
            Vec::new()
        } else {
            vec![PluginId::of::<HatsPlugin>()]
        }
    }
}

/// [`HatsPlugin`] and [`BatteryPlugin`] together.
///
/// ```
/// use voltaic_battery::{BatteryPlugins, Unsupported};
/// use voltaic_system::plugin::PluginGroup;
/// use voltaic_system::server::Server;
///
/// let mut server = Server::new();
/// server.add_plugins(BatteryPlugins::new(Unsupported).build());
/// server.finish();
/// ```
pub struct BatteryPlugins {
    battery: BatteryPlugin,
}

impl BatteryPlugins {
    /// Creates the group over `platform`.
    pub fn new(platform: impl PowerPlatform) -> Self {
        Self {
            battery: BatteryPlugin::new(platform),
        }
    }

    /// Whether to start acquisition during `ready()`.
    #[must_use]
    pub fn with_warm_up(mut self, warm_up: bool) -> Self {
        self.battery = self.battery.with_warm_up(warm_up);
        self
    }
}

impl PluginGroup for BatteryPlugins {
    fn build(self) -> PluginGroupBuilder {
        PluginGroupBuilder::new().add(HatsPlugin).add(self.battery)
    }
}
