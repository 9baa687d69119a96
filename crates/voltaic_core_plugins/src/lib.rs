//! Infrastructure plugins for voltaic hosts.
//!
//! - [`TracingPlugin`] - Installs a `tracing` subscriber and exposes
//!   [`TracingConfig`] as a global resource
//!
//! # Example
//!
//! ```
//! use voltaic_system::server::Server;
//! use voltaic_core_plugins::{TracingFormat, TracingPlugin};
//! use tracing::Level;
//!
//! let mut server = Server::new();
//! server.add_plugins(
//!     TracingPlugin::default()
//!         .with_level(Level::DEBUG)
//!         .with_format(TracingFormat::Compact),
//! );
//! server.finish();
//! ```

mod tracing_plugin;

pub use tracing_plugin::{TracingConfig, TracingFormat, TracingPlugin};
