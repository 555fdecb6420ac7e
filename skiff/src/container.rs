//! Container identity and status types.
//!
//! Names are validated once at the edge and carried as a newtype from
//! then on; every store record and runtime call is keyed by a name that
//! has already passed validation. The rules double as a format guarantee
//! for the allocation store: a valid name can never contain `:`.

use std::fmt;
use std::str::FromStr;

/// Maximum length of a container name.
pub const MAX_NAME_LEN: usize = 63;

/// A validated container name.
///
/// Rules: non-empty, at most [`MAX_NAME_LEN`] characters, first character
/// alphabetic, remaining characters alphanumeric or hyphen.
///
/// # Examples
///
/// ```
/// use skiff::ContainerName;
///
/// assert!(ContainerName::new("web-1").is_ok());
/// assert!(ContainerName::new("1web").is_err());
/// assert!(ContainerName::new("web:1").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContainerName(String);

impl ContainerName {
    /// Validate and wrap a container name.
    ///
    /// # Errors
    ///
    /// Returns an error describing the violated rule.
    pub fn new(name: impl Into<String>) -> Result<Self, InvalidNameError> {
        let name = name.into();

        if name.is_empty() {
            return Err(InvalidNameError {
                name,
                reason: "name must not be empty".into(),
            });
        }
        if name.len() > MAX_NAME_LEN {
            return Err(InvalidNameError {
                name,
                reason: format!("name must be at most {MAX_NAME_LEN} characters"),
            });
        }
        let first = name.chars().next().unwrap_or_default();
        if !first.is_ascii_alphabetic() {
            return Err(InvalidNameError {
                name,
                reason: "name must start with a letter".into(),
            });
        }
        if let Some(bad) = name
            .chars()
            .find(|c| !c.is_ascii_alphanumeric() && *c != '-')
        {
            return Err(InvalidNameError {
                name,
                reason: format!("name contains invalid character {bad:?}"),
            });
        }

        Ok(Self(name))
    }

    /// The validated name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContainerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ContainerName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for ContainerName {
    type Err = InvalidNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// Error type for rejected container names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidNameError {
    /// The rejected name.
    pub name: String,
    /// The rule that was violated.
    pub reason: String,
}

impl fmt::Display for InvalidNameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid container name {:?}: {}", self.name, self.reason)
    }
}

impl std::error::Error for InvalidNameError {}

/// Status of a container as reported by the runtime.
///
/// Statuses other than running/stopped are carried through verbatim
/// rather than rejected; the runtime may grow states this tool does not
/// know about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContainerStatus {
    /// The container is running.
    Running,
    /// The container is stopped.
    Stopped,
    /// Any other status string the runtime reported.
    Other(String),
}

impl ContainerStatus {
    /// Parse a status field from the runtime's listing.
    #[must_use]
    pub fn parse(status: &str) -> Self {
        match status.trim().to_ascii_lowercase().as_str() {
            "running" => Self::Running,
            "stopped" => Self::Stopped,
            _ => Self::Other(status.trim().to_string()),
        }
    }
}

impl fmt::Display for ContainerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Running => write!(f, "running"),
            Self::Stopped => write!(f, "stopped"),
            Self::Other(s) => f.write_str(s),
        }
    }
}

/// One row of the runtime's container listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerInfo {
    /// The container's name.
    pub name: ContainerName,
    /// The container's reported status.
    pub status: ContainerStatus,
}
