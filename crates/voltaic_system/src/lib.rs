//! The extension host for voltaic.
//!
//! `voltaic_system` is the small runtime that extensions register with:
//!
//! - [`api`] - Marker trait for build-time capability registries
//! - [`plugin`] - Plugin trait, identifiers, and plugin groups
//! - [`resource`] - Type-keyed storage for shared state
//! - [`server`] - Plugin lifecycle orchestration
//!
//! # Example
//!
//! ```
//! use voltaic_system::plugin::Plugin;
//! use voltaic_system::server::Server;
//! use voltaic_system::resource::GlobalResource;
//!
//! #[derive(Default)]
//! struct PollSettings { interval_ms: u64 }
//! impl GlobalResource for PollSettings {}
//!
//! struct PollPlugin;
//!
//! impl Plugin for PollPlugin {
//!     fn build(&self, server: &mut Server) {
//!         server.insert_global(PollSettings::default());
//!     }
//! }
//!
//! let mut server = Server::new();
//! server.add_plugins(PollPlugin);
//! server.finish();
//! assert!(server.contains_global::<PollSettings>());
//! ```

/// Marker trait for build-time capability registries.
pub mod api;

/// Plugin trait and plugin groups.
pub mod plugin;

/// Type-keyed resource storage.
pub mod resource;

/// Plugin lifecycle orchestration.
pub mod server;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use crate::api::*;
    pub use crate::plugin::*;
    pub use crate::resource::*;
    pub use crate::server::*;
}
