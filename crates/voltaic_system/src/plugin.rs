//! Plugins are how extensions attach to a [`Server`].
//!
//! A plugin registers globals and APIs in [`Plugin::build`], finishes any
//! cross-plugin setup in [`Plugin::ready`], and releases external state in
//! [`Plugin::cleanup`].
//!
//! # Example
//!
//! ```
//! use voltaic_system::plugin::{Plugin, PluginId};
//! use voltaic_system::resource::GlobalResource;
//! use voltaic_system::server::Server;
//!
//! struct Labels;
//! impl Plugin for Labels {
//!     fn build(&self, server: &mut Server) {
//!         server.insert_global(ExtensionName("battery"));
//!     }
//! }
//!
//! struct ExtensionName(&'static str);
//! impl GlobalResource for ExtensionName {}
//!
//! struct Reporters;
//! impl Plugin for Reporters {
//!     fn build(&self, server: &mut Server) {
//!         assert!(server.contains_global::<ExtensionName>());
//!     }
//!
//!     fn dependencies(&self) -> Vec<PluginId> {
//!         vec![PluginId::of::<Labels>()]
//!     }
//! }
//!
//! let mut server = Server::new();
//! server.add_plugins(Reporters).add_plugins(Labels);
//! server.finish();
//! ```

use core::any::TypeId;

use crate::server::Server;

/// Identity of a plugin type, used for dependencies and duplicate detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PluginId {
    type_id: TypeId,
    type_name: &'static str,
}

impl PluginId {
    /// Returns the identifier of plugin type `P`.
    #[must_use]
    pub fn of<P: Plugin>() -> Self {
        Self {
            type_id: TypeId::of::<P>(),
            type_name: core::any::type_name::<P>(),
        }
    }

    /// Returns the underlying `TypeId`.
    #[must_use]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Returns the plugin's type name.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

/// A unit of functionality attached to a [`Server`].
///
/// The server drives every plugin through the same lifecycle:
///
/// 1. `build()` once, in dependency order
/// 2. `ready()` once, in dependency order, after every plugin is built
/// 3. `cleanup()` once, in reverse dependency order, on shutdown
pub trait Plugin: Send + Sync + 'static {
    /// Registers globals, resources, and APIs.
    fn build(&self, server: &mut Server);

    /// Runs after all plugins are built.
    ///
    /// Work that needs other plugins' registrations, or that should start as
    /// soon as the host is up, goes here.
    fn ready(&self, _server: &mut Server) {}

    /// Runs when the server shuts down.
    fn cleanup(&self, _server: &mut Server) {}

    /// Name used in diagnostics. Defaults to the type name.
    fn name(&self) -> &str {
        core::any::type_name::<Self>()
    }

    /// Plugins that must be added before this one.
    ///
    /// [`Server::finish`] panics if any of them is missing.
    fn dependencies(&self) -> Vec<PluginId> {
        Vec::new()
    }

    /// Whether adding this plugin type twice is an error. Defaults to `true`.
    fn is_unique(&self) -> bool {
        true
    }
}

/// Values accepted by [`Server::add_plugins`]: a single plugin or a group.
pub trait Plugins {
    /// Adds the plugin(s) to `server`.
    fn add_to_server(self, server: &mut Server);
}

impl<P: Plugin> Plugins for P {
    fn add_to_server(self, server: &mut Server) {
        server.add_plugin_boxed(PluginId::of::<P>(), Box::new(self));
    }
}

impl Plugins for PluginGroupBuilder {
    fn add_to_server(self, server: &mut Server) {
        for entry in self.plugins {
            server.add_plugin_boxed(entry.id, entry.plugin);
        }
    }
}

/// A named bundle of plugins.
pub trait PluginGroup {
    /// Returns the plugins in this group, ready for customization.
    fn build(self) -> PluginGroupBuilder;
}

pub(crate) struct GroupEntry {
    pub(crate) id: PluginId,
    pub(crate) plugin: Box<dyn Plugin>,
}

/// Ordered, editable list of plugins produced by a [`PluginGroup`].
#[derive(Default)]
pub struct PluginGroupBuilder {
    pub(crate) plugins: Vec<GroupEntry>,
}

impl PluginGroupBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            plugins: Vec::new(),
        }
    }

    /// Appends a plugin.
    #[must_use]
    #[expect(
        clippy::should_implement_trait,
        reason = "builder method, not std::ops::Add"
    )]
    pub fn add<P: Plugin>(mut self, plugin: P) -> Self {
        self.plugins.push(Self::entry(plugin));
        self
    }

    /// Inserts a plugin before `Target`, or at the front if `Target` is absent.
    #[must_use]
    pub fn add_before<P: Plugin, Target: Plugin>(mut self, plugin: P) -> Self {
        let index = self.position_of::<Target>().unwrap_or(0);
        self.plugins.insert(index, Self::entry(plugin));
        self
    }

    /// Inserts a plugin after `Target`, or at the back if `Target` is absent.
    #[must_use]
    pub fn add_after<P: Plugin, Target: Plugin>(mut self, plugin: P) -> Self {
        let index = self
            .position_of::<Target>()
            .map_or(self.plugins.len(), |i| i + 1);
        self.plugins.insert(index, Self::entry(plugin));
        self
    }

    /// Removes plugin type `P` from the group. No-op if absent.
    #[must_use]
    pub fn disable<P: Plugin>(mut self) -> Self {
        let id = PluginId::of::<P>();
        self.plugins.retain(|entry| entry.id != id);
        self
    }

    /// Number of plugins in the group.
    #[must_use]
    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    /// Returns true if the group is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    /// Returns true if plugin type `P` is in the group.
    #[must_use]
    pub fn contains<P: Plugin>(&self) -> bool {
        self.position_of::<P>().is_some()
    }

    fn position_of<P: Plugin>(&self) -> Option<usize> {
        let id = PluginId::of::<P>();
        self.plugins.iter().position(|entry| entry.id == id)
    }

    fn entry<P: Plugin>(plugin: P) -> GroupEntry {
        GroupEntry {
            id: PluginId::of::<P>(),
            plugin: Box::new(plugin),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Hats;
    impl Plugin for Hats {
        fn build(&self, _server: &mut Server) {}
    }

    struct Battery;
    impl Plugin for Battery {
        fn build(&self, _server: &mut Server) {}
        fn dependencies(&self) -> Vec<PluginId> {
            vec![PluginId::of::<Hats>()]
        }
    }

    struct Tracing;
    impl Plugin for Tracing {
        fn build(&self, _server: &mut Server) {}
    }

    fn names(builder: &PluginGroupBuilder) -> Vec<&str> {
        builder
            .plugins
            .iter()
            .map(|entry| entry.plugin.name().rsplit("::").next().unwrap_or_default())
            .collect()
    }

    #[test]
    fn plugin_ids_compare_by_type() {
        assert_eq!(PluginId::of::<Hats>(), PluginId::of::<Hats>());
        assert_ne!(PluginId::of::<Hats>(), PluginId::of::<Battery>());
        assert_eq!(PluginId::of::<Hats>().type_id(), TypeId::of::<Hats>());
        assert!(PluginId::of::<Hats>().type_name().ends_with("Hats"));
    }

    #[test]
    fn plugin_defaults() {
        assert!(Hats.is_unique());
        assert!(Hats.dependencies().is_empty());
        assert!(Hats.name().ends_with("Hats"));
        assert_eq!(Battery.dependencies(), vec![PluginId::of::<Hats>()]);
    }

    #[test]
    fn builder_keeps_insertion_order() {
        let builder = PluginGroupBuilder::new().add(Tracing).add(Hats).add(Battery);
        assert_eq!(names(&builder), ["Tracing", "Hats", "Battery"]);
    }

    #[test]
    fn add_before_and_after() {
        let builder = PluginGroupBuilder::new()
            .add(Hats)
            .add_before::<_, Hats>(Tracing)
            .add_after::<_, Hats>(Battery);
        assert_eq!(names(&builder), ["Tracing", "Hats", "Battery"]);
    }

    #[test]
    fn add_relative_to_missing_target() {
        let front = PluginGroupBuilder::new()
            .add(Hats)
            .add_before::<_, Battery>(Tracing);
        assert_eq!(names(&front), ["Tracing", "Hats"]);

        let back = PluginGroupBuilder::new()
            .add(Hats)
            .add_after::<_, Battery>(Tracing);
        assert_eq!(names(&back), ["Hats", "Tracing"]);
    }

    #[test]
    fn disable_removes_only_the_named_type() {
        let builder = PluginGroupBuilder::new()
            .add(Tracing)
            .add(Hats)
            .disable::<Tracing>()
            .disable::<Battery>();

        assert_eq!(builder.len(), 1);
        assert!(builder.contains::<Hats>());
        assert!(!builder.contains::<Tracing>());
    }

    #[test]
    fn empty_builder() {
        let builder = PluginGroupBuilder::new();
        assert!(builder.is_empty());
        assert_eq!(builder.len(), 0);
    }
}
