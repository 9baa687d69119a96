//! Error types for the sysfs backend.

use std::io;
use std::path::PathBuf;

use voltaic_battery::AcquireError;

/// Failure while locating or reading a power supply.
#[derive(Debug, thiserror::Error)]
pub enum SysfsError {
    /// No system battery was found under the power supply directory.
    #[error("no battery found under {}", .0.display())]
    NoBattery(PathBuf),

    /// A power supply attribute could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Read {
        /// Attribute path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },

    /// A power supply attribute held an unexpected value.
    #[error("unexpected value {value:?} in {}", path.display())]
    Parse {
        /// Attribute path.
        path: PathBuf,
        /// Raw attribute contents.
        value: String,
    },

    /// An environment override was malformed.
    #[error("invalid {var}: {reason}")]
    InvalidConfig {
        /// Environment variable name.
        var: &'static str,
        /// What was wrong with it.
        reason: String,
    },
}

impl From<SysfsError> for AcquireError {
    fn from(error: SysfsError) -> Self {
        match error {
            SysfsError::NoBattery(_) => AcquireError::NoBattery,
            SysfsError::Read { path, source } if source.kind() == io::ErrorKind::PermissionDenied => {
                AcquireError::PermissionDenied(path.display().to_string())
            }
            SysfsError::Read { source, .. } => AcquireError::Io(source),
            other => AcquireError::Platform(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_to_acquire_errors() {
        let no_battery = AcquireError::from(SysfsError::NoBattery(PathBuf::from("/sys")));
        assert!(matches!(no_battery, AcquireError::NoBattery));

        let denied = AcquireError::from(SysfsError::Read {
            path: PathBuf::from("/sys/class/power_supply/BAT0/status"),
            source: io::Error::from(io::ErrorKind::PermissionDenied),
        });
        assert!(
            matches!(denied, AcquireError::PermissionDenied(path) if path.ends_with("BAT0/status"))
        );

        let io = AcquireError::from(SysfsError::Read {
            path: PathBuf::from("status"),
            source: io::Error::from(io::ErrorKind::InvalidData),
        });
        assert!(matches!(io, AcquireError::Io(_)));

        let parse = AcquireError::from(SysfsError::Parse {
            path: PathBuf::from("capacity"),
            value: "lots".to_string(),
        });
        assert!(matches!(parse, AcquireError::Platform(message) if message.contains("lots")));
    }
}
