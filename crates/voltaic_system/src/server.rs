//! The extension host.
//!
//! A [`Server`] owns the registered plugins together with two kinds of
//! shared state:
//!
//! - **Globals** - server-lifetime values handed out read-only
//!   ([`insert_global`](Server::insert_global), [`get_global`](Server::get_global))
//! - **APIs** - capability registries plugins expose to each other
//!   ([`insert_api`](Server::insert_api), [`api`](Server::api))
//!
//! # Lifecycle
//!
//! 1. [`add_plugins`](Server::add_plugins) queues plugins
//! 2. [`finish`](Server::finish) orders them by dependency, then calls every
//!    `build()` followed by every `ready()`
//! 3. [`cleanup`](Server::cleanup) calls every `cleanup()` in reverse order

use std::collections::VecDeque;
use std::sync::Arc;

use core::any::TypeId;
use hashbrown::{HashMap, HashSet};

use crate::api::API;
use crate::plugin::{Plugin, PluginId, Plugins};
use crate::resource::{GlobalResource, Resources};

type BoxedApi = Box<dyn core::any::Any + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Phase {
    #[default]
    Collecting,
    Building,
    Built,
}

struct PluginEntry {
    id: PluginId,
    name: String,
    plugin: Arc<dyn Plugin>,
}

/// The runtime extensions register with.
///
/// ```
/// use voltaic_system::plugin::Plugin;
/// use voltaic_system::resource::GlobalResource;
/// use voltaic_system::server::Server;
///
/// struct Threshold(f64);
/// impl GlobalResource for Threshold {}
///
/// struct LowBatteryPlugin;
/// impl Plugin for LowBatteryPlugin {
///     fn build(&self, server: &mut Server) {
///         server.insert_global(Threshold(0.2));
///     }
/// }
///
/// let mut server = Server::new();
/// server.add_plugins(LowBatteryPlugin);
/// server.finish();
///
/// assert_eq!(server.get_global::<Threshold>().unwrap().0, 0.2);
/// server.cleanup();
/// ```
#[derive(Default)]
pub struct Server {
    global: Resources,
    apis: HashMap<TypeId, BoxedApi>,
    pending: Vec<PluginEntry>,
    built: Vec<PluginEntry>,
    plugin_ids: HashSet<PluginId>,
    phase: Phase,
}

impl Server {
    /// Creates a server with no plugins.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Plugins
    // ─────────────────────────────────────────────────────────────────────────

    /// Adds a plugin or a [`PluginGroupBuilder`](crate::plugin::PluginGroupBuilder).
    ///
    /// Plugins added while the server is building are built immediately.
    ///
    /// # Panics
    ///
    /// Panics if a unique plugin type is added twice.
    pub fn add_plugins<P: Plugins>(&mut self, plugins: P) -> &mut Self {
        plugins.add_to_server(self);
        self
    }

    pub(crate) fn add_plugin_boxed(&mut self, id: PluginId, plugin: Box<dyn Plugin>) {
        let name = plugin.name().to_string();

        assert!(
            !(plugin.is_unique() && self.plugin_ids.contains(&id)),
            "Plugin '{name}' was already added. Return `false` from `is_unique()` \
             to allow several instances."
        );
        self.plugin_ids.insert(id);

        let entry = PluginEntry {
            id,
            name,
            plugin: Arc::from(plugin),
        };

        if self.phase == Phase::Building {
            Arc::clone(&entry.plugin).build(self);
            self.built.push(entry);
        } else {
            self.pending.push(entry);
        }
    }

    /// Returns true if plugin type `P` was added.
    #[must_use]
    pub fn has_plugin<P: Plugin>(&self) -> bool {
        self.plugin_ids.contains(&PluginId::of::<P>())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Globals
    // ─────────────────────────────────────────────────────────────────────────

    /// Stores a global, returning the previous value of the same type.
    pub fn insert_global<R: GlobalResource>(&mut self, resource: R) -> Option<R> {
        self.global.insert(resource)
    }

    /// Returns true if a global of type `R` is stored.
    #[must_use]
    pub fn contains_global<R: GlobalResource>(&self) -> bool {
        self.global.contains::<R>()
    }

    /// Borrows a global.
    #[must_use]
    pub fn get_global<R: GlobalResource>(&self) -> Option<&R> {
        self.global.get::<R>().ok()
    }

    /// Returns the globals container.
    #[must_use]
    pub fn globals(&self) -> &Resources {
        &self.global
    }

    // ─────────────────────────────────────────────────────────────────────────
    // APIs
    // ─────────────────────────────────────────────────────────────────────────

    /// Stores an API, returning the previous value of the same type.
    pub fn insert_api<A: API>(&mut self, api: A) -> Option<A> {
        self.apis
            .insert(TypeId::of::<A>(), Box::new(api))
            .and_then(|previous| previous.downcast::<A>().ok())
            .map(|boxed| *boxed)
    }

    /// Returns the API of type `A`, if stored.
    #[must_use]
    pub fn api<A: API>(&self) -> Option<&A> {
        self.apis
            .get(&TypeId::of::<A>())
            .and_then(|boxed| boxed.downcast_ref::<A>())
    }

    /// Returns true if an API of type `A` is stored.
    #[must_use]
    pub fn contains_api<A: API>(&self) -> bool {
        self.apis.contains_key(&TypeId::of::<A>())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Lifecycle
    // ─────────────────────────────────────────────────────────────────────────

    /// Returns true once [`finish`](Self::finish) has returned.
    #[must_use]
    pub fn is_built(&self) -> bool {
        self.phase == Phase::Built
    }

    /// Builds and readies every queued plugin.
    ///
    /// # Panics
    ///
    /// - If called more than once
    /// - If a declared dependency was never added
    /// - If plugin dependencies form a cycle
    pub fn finish(&mut self) {
        assert!(
            self.phase == Phase::Collecting,
            "Server::finish() was already called"
        );

        let ordered = self.dependency_order();
        self.phase = Phase::Building;

        for entry in ordered {
            Arc::clone(&entry.plugin).build(self);
            self.built.push(entry);
        }

        // Indexed so plugins added from inside ready() are readied too.
        let mut index = 0;
        while index < self.built.len() {
            let plugin = Arc::clone(&self.built[index].plugin);
            plugin.ready(self);
            index += 1;
        }

        self.phase = Phase::Built;
    }

    /// Calls `cleanup()` on every built plugin, dependents first.
    pub fn cleanup(&mut self) {
        let plugins: Vec<Arc<dyn Plugin>> = self
            .built
            .iter()
            .rev()
            .map(|entry| Arc::clone(&entry.plugin))
            .collect();

        for plugin in plugins {
            plugin.cleanup(self);
        }
    }

    /// Drains the pending queue in dependency order.
    ///
    /// Plugins without ordering constraints keep the order they were added in.
    fn dependency_order(&mut self) -> Vec<PluginEntry> {
        let pending = core::mem::take(&mut self.pending);
        let index_of: HashMap<PluginId, usize> = pending
            .iter()
            .enumerate()
            .map(|(i, entry)| (entry.id, i))
            .collect();

        let mut blockers = vec![0usize; pending.len()];
        let mut unblocks: Vec<Vec<usize>> = vec![Vec::new(); pending.len()];

        for (i, entry) in pending.iter().enumerate() {
            for dependency in entry.plugin.dependencies() {
                if let Some(&dep) = index_of.get(&dependency) {
                    blockers[i] += 1;
                    unblocks[dep].push(i);
                } else {
                    assert!(
                        self.built.iter().any(|built| built.id == dependency),
                        "Plugin '{}' requires '{}', which was not added.",
                        entry.name,
                        dependency.type_name()
                    );
                }
            }
        }

        let mut ready: VecDeque<usize> = (0..pending.len()).filter(|&i| blockers[i] == 0).collect();
        let mut order = Vec::with_capacity(pending.len());

        while let Some(i) = ready.pop_front() {
            order.push(i);
            for &next in &unblocks[i] {
                blockers[next] -= 1;
                if blockers[next] == 0 {
                    ready.push_back(next);
                }
            }
        }

        if order.len() != pending.len() {
            let cycle: Vec<&str> = (0..pending.len())
                .filter(|&i| blockers[i] > 0)
                .map(|i| pending[i].name.as_str())
                .collect();
            panic!("Circular dependency between plugins: {cycle:?}");
        }

        let mut slots: Vec<Option<PluginEntry>> = pending.into_iter().map(Some).collect();
        order
            .into_iter()
            .filter_map(|i| slots[i].take())
            .collect()
    }
}
