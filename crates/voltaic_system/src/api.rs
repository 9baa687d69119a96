//! Capability registries shared between plugins.
//!
//! An API is stored on the [`Server`](crate::server::Server) once and handed
//! out by shared reference, so registries that accept registrations after
//! insertion use interior mutability:
//!
//! ```
//! use parking_lot::RwLock;
//! use voltaic_system::api::API;
//! use voltaic_system::server::Server;
//!
//! #[derive(Default)]
//! struct Opcodes {
//!     names: RwLock<Vec<String>>,
//! }
//!
//! impl API for Opcodes {}
//!
//! let mut server = Server::new();
//! server.insert_api(Opcodes::default());
//!
//! let opcodes = server.api::<Opcodes>().unwrap();
//! opcodes.names.write().push("charging".into());
//! assert_eq!(opcodes.names.read().len(), 1);
//! ```

/// Marker trait for capability registries.
///
/// APIs are reached by plugins through [`Server::api`](crate::server::Server::api)
/// during the build and ready phases. Shared runtime state belongs in a
/// [`GlobalResource`](crate::resource::GlobalResource) instead.
pub trait API: Send + Sync + 'static {}
