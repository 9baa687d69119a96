//! Error types for battery acquisition.

/// Failure reported by [`PowerPlatform::acquire`](crate::PowerPlatform::acquire).
///
/// These never reach accessor callers: the pipeline logs the error once and
/// serves fallback values from then on.
#[derive(Debug, thiserror::Error)]
pub enum AcquireError {
    /// The platform can report power status but found no battery.
    #[error("no battery present")]
    NoBattery,

    /// The process is not allowed to read the battery.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// Reading the battery state failed.
    #[error("failed to read battery state: {0}")]
    Io(#[from] std::io::Error),

    /// Any other platform-specific failure.
    #[error("platform error: {0}")]
    Platform(String),
}
