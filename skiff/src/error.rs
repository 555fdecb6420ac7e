//! Error types for the skiff library.
//!
//! All fallible operations in the library return [`Result`], whose error
//! type distinguishes user-facing validation problems, conflicts that the
//! user can resolve, and resource or runtime failures that abort the
//! current command.

use thiserror::Error;

/// Result type alias for operations that may fail with a skiff error.
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for the skiff library.
#[derive(Debug, Error)]
pub enum Error {
    /// Input failed validation before any state was touched.
    #[error("validation error for '{field}': {message}")]
    Validation {
        /// The field that failed validation.
        field: String,
        /// A description of the validation failure.
        message: String,
    },

    /// An I/O error occurred while touching the lock file or the store.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A configuration file could not be parsed.
    #[error("configuration error: {0}")]
    Config(#[from] serde_yaml::Error),

    /// The named container is unknown to both the runtime and the store.
    #[error("container '{name}' not found")]
    ContainerNotFound {
        /// The name that was looked up.
        name: String,
    },

    /// A container with this name already exists.
    #[error("container '{name}' already exists")]
    NameExists {
        /// The conflicting name.
        name: String,
    },

    /// The host port already carries a binding on this container.
    #[error("host port {host_port} is already bound on container '{container}'")]
    AlreadyBound {
        /// The container holding the binding.
        container: String,
        /// The conflicting host port.
        host_port: u16,
    },

    /// No binding exists for this host port on this container.
    #[error("host port {host_port} is not bound on container '{container}'")]
    NotBound {
        /// The container that was checked.
        container: String,
        /// The host port that was not found.
        host_port: u16,
    },

    /// Every allocatable port slot is taken.
    #[error("no free port slot starting at {start} (stride {stride}): every slot through 65535 is taken")]
    PortExhausted {
        /// First candidate port of the scan.
        start: u16,
        /// Distance between candidate ports.
        stride: u16,
    },

    /// A delegated container-runtime operation failed.
    #[error("container runtime operation '{operation}' failed: {detail}")]
    Runtime {
        /// The operation that was attempted.
        operation: String,
        /// Stderr or a description of the failure.
        detail: String,
    },
}

impl Error {
    /// Construct a runtime-failure error.
    pub(crate) fn runtime(operation: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::Runtime {
            operation: operation.into(),
            detail: detail.into(),
        }
    }

    /// True for conflicts the user can resolve by picking another port or
    /// name (as opposed to resource or runtime failures).
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            Self::NameExists { .. }
                | Self::AlreadyBound { .. }
                | Self::NotBound { .. }
                | Self::PortExhausted { .. }
        )
    }
}

impl From<crate::port::InvalidPortError> for Error {
    fn from(err: crate::port::InvalidPortError) -> Self {
        Self::Validation {
            field: "port".into(),
            message: err.to_string(),
        }
    }
}

impl From<crate::port::InvalidPortSpecError> for Error {
    fn from(err: crate::port::InvalidPortSpecError) -> Self {
        Self::Validation {
            field: "port spec".into(),
            message: err.to_string(),
        }
    }
}

impl From<crate::port::InvalidLayoutError> for Error {
    fn from(err: crate::port::InvalidLayoutError) -> Self {
        Self::Validation {
            field: "ports".into(),
            message: err.to_string(),
        }
    }
}

impl From<crate::container::InvalidNameError> for Error {
    fn from(err: crate::container::InvalidNameError) -> Self {
        Self::Validation {
            field: "name".into(),
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display() {
        let err = Error::Validation {
            field: "name".to_string(),
            message: "must start with a letter".to_string(),
        };
        let display = format!("{err}");
        assert!(display.contains("validation error"));
        assert!(display.contains("name"));
        assert!(display.contains("must start with a letter"));
    }

    #[test]
    fn test_already_bound_display() {
        let err = Error::AlreadyBound {
            container: "web".to_string(),
            host_port: 5173,
        };
        let display = format!("{err}");
        assert!(display.contains("5173"));
        assert!(display.contains("web"));
        assert!(display.contains("already bound"));
    }

    #[test]
    fn test_not_bound_display() {
        let err = Error::NotBound {
            container: "web".to_string(),
            host_port: 5173,
        };
        let display = format!("{err}");
        assert!(display.contains("5173"));
        assert!(display.contains("not bound"));
    }

    #[test]
    fn test_port_exhausted_display() {
        let err = Error::PortExhausted {
            start: 2200,
            stride: 10,
        };
        let display = format!("{err}");
        assert!(display.contains("2200"));
        assert!(display.contains("65535"));
    }

    #[test]
    fn test_runtime_error_display() {
        let err = Error::runtime("device add", "exit status 1");
        let display = format!("{err}");
        assert!(display.contains("device add"));
        assert!(display.contains("exit status 1"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: Error = io_err.into();
        assert!(format!("{err}").contains("I/O error"));
    }

    #[test]
    fn test_conflict_classification() {
        assert!(Error::NameExists {
            name: "web".into()
        }
        .is_conflict());
        assert!(Error::AlreadyBound {
            container: "web".into(),
            host_port: 80
        }
        .is_conflict());
        assert!(Error::PortExhausted {
            start: 2200,
            stride: 10
        }
        .is_conflict());
        assert!(!Error::runtime("list", "boom").is_conflict());
        assert!(!Error::ContainerNotFound {
            name: "web".into()
        }
        .is_conflict());
    }
}
