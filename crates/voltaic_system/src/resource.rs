//! Resource storage.
//!
//! [`Resources`] holds at most one value per type.
//!
//! Resources stored with
//! [`Server::insert_global`](crate::server::Server::insert_global) must
//! implement the [`GlobalResource`] marker. Those values live for as long as
//! the server and are only handed out by shared reference, so anything that
//! changes at runtime keeps its own interior mutability.

use core::any::{Any, TypeId};
use hashbrown::HashMap;

/// Anything that can be stored in [`Resources`].
///
/// Implemented for every `Send + Sync + 'static` type.
pub trait Resource: Send + Sync + 'static {}

impl<T: Send + Sync + 'static> Resource for T {}

/// Marker trait for server-lifetime, read-only resources.
///
/// ```
/// use voltaic_system::resource::GlobalResource;
/// use voltaic_system::server::Server;
///
/// struct Labels { extension: &'static str }
/// impl GlobalResource for Labels {}
///
/// let mut server = Server::new();
/// server.insert_global(Labels { extension: "battery" });
/// assert_eq!(server.get_global::<Labels>().unwrap().extension, "battery");
/// ```
pub trait GlobalResource: Resource {}

/// Errors returned when looking up a resource.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResourceError {
    /// No resource of the requested type is stored.
    #[error("resource `{0}` not found")]
    NotFound(&'static str),
}

/// Type-keyed container holding at most one value per type.
#[derive(Default)]
pub struct Resources {
    slots: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl core::fmt::Debug for Resources {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Resources")
            .field("len", &self.slots.len())
            .finish()
    }
}

impl Resources {
    /// Creates an empty container.
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: HashMap::new(),
        }
    }

    /// Stores `value`, returning the previous value of the same type.
    pub fn insert<T: Resource>(&mut self, value: T) -> Option<T> {
        self.slots
            .insert(TypeId::of::<T>(), Box::new(value))
            .and_then(|previous| previous.downcast::<T>().ok())
            .map(|boxed| *boxed)
    }

    /// Returns true if a value of type `T` is stored.
    #[must_use]
    pub fn contains<T: Resource>(&self) -> bool {
        self.slots.contains_key(&TypeId::of::<T>())
    }

    /// Borrows the value of type `T`.
    ///
    /// # Errors
    ///
    /// [`ResourceError::NotFound`] if nothing is stored.
    pub fn get<T: Resource>(&self) -> Result<&T, ResourceError> {
        self.slots
            .get(&TypeId::of::<T>())
            .and_then(|boxed| boxed.downcast_ref::<T>())
            .ok_or(ResourceError::NotFound(core::any::type_name::<T>()))
    }

    /// Number of stored values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns true if nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
