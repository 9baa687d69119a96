//! Battery status for event-driven hosts: acquired once, cached forever, never failing the caller.

pub use voltaic_internal::*;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use voltaic_internal::prelude::*;
}
