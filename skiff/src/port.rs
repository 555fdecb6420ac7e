//! Port types, the port-spec argument parser, and the port layout.
//!
//! The layout ties everything together: containers are assigned an SSH
//! port from a stride-spaced sequence, and each SSH port arithmetically
//! derives a block of auxiliary service ports. The derivation is never
//! persisted; it is recomputed from the SSH port wherever it is needed.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub mod allocator;

/// A valid network port number (1-65535).
///
/// Port 0 is rejected; it has special meaning in networking contexts.
///
/// # Examples
///
/// ```
/// use skiff::Port;
///
/// let port = Port::try_from(5173).unwrap();
/// assert_eq!(port.value(), 5173);
/// assert!(Port::try_from(0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Port(u16);

impl Port {
    /// The minimum valid port number.
    pub const MIN: u16 = 1;

    /// The maximum valid port number.
    pub const MAX: u16 = 65535;

    /// Returns the underlying port number.
    #[must_use]
    pub const fn value(self) -> u16 {
        self.0
    }
}

impl TryFrom<u16> for Port {
    type Error = InvalidPortError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        if value == 0 {
            Err(InvalidPortError {
                value,
                reason: "port 0 is invalid".into(),
            })
        } else {
            Ok(Self(value))
        }
    }
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error type for invalid port numbers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidPortError {
    /// The invalid port value.
    pub value: u16,
    /// The reason the port is invalid.
    pub reason: String,
}

impl fmt::Display for InvalidPortError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid port {}: {}", self.value, self.reason)
    }
}

impl std::error::Error for InvalidPortError {}

/// An inclusive range of ports.
///
/// # Examples
///
/// ```
/// use skiff::{Port, PortRange};
///
/// let range = PortRange::new(
///     Port::try_from(8800).unwrap(),
///     Port::try_from(8809).unwrap(),
/// ).unwrap();
/// assert_eq!(range.len(), 10);
/// assert!(range.contains(Port::try_from(8805).unwrap()));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortRange {
    min: Port,
    max: Port,
}

impl PortRange {
    /// Creates a new port range.
    ///
    /// # Errors
    ///
    /// Returns an error if `max` is less than `min`.
    pub fn new(min: Port, max: Port) -> Result<Self, InvalidPortError> {
        if max < min {
            Err(InvalidPortError {
                value: max.value(),
                reason: format!("range end is below range start {min}"),
            })
        } else {
            Ok(Self { min, max })
        }
    }

    /// Returns the first port in the range.
    #[must_use]
    pub const fn min(&self) -> Port {
        self.min
    }

    /// Returns the last port in the range.
    #[must_use]
    pub const fn max(&self) -> Port {
        self.max
    }

    /// Returns `true` if the range contains the given port.
    #[must_use]
    pub const fn contains(&self, port: Port) -> bool {
        port.value() >= self.min.value() && port.value() <= self.max.value()
    }

    /// Returns the number of ports in the range (inclusive bounds).
    #[must_use]
    pub const fn len(&self) -> u16 {
        self.max.value() - self.min.value() + 1
    }

    /// A valid range always holds at least one port.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// Returns an iterator over all ports in the range.
    #[must_use]
    pub fn iter(self) -> PortRangeIter {
        PortRangeIter {
            max: self.max.value(),
            current: u32::from(self.min.value()),
        }
    }
}

impl fmt::Display for PortRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.min, self.max)
    }
}

impl IntoIterator for PortRange {
    type Item = Port;
    type IntoIter = PortRangeIter;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over ports in a [`PortRange`].
#[derive(Debug)]
pub struct PortRangeIter {
    max: u16,
    // u32 so the iterator can step past 65535 without wrapping.
    current: u32,
}

impl Iterator for PortRangeIter {
    type Item = Port;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current <= u32::from(self.max) {
            let port = Port(self.current as u16);
            self.current += 1;
            Some(port)
        } else {
            None
        }
    }
}

/// A parsed port specification argument.
///
/// Two forms are accepted: `"PORT"` forwards the same port on both sides,
/// and `"CONTAINER_PORT:HOST_PORT"` names each side explicitly.
///
/// # Examples
///
/// ```
/// use skiff::PortSpec;
///
/// let spec: PortSpec = "5173".parse().unwrap();
/// assert_eq!(spec.container_port().value(), 5173);
/// assert_eq!(spec.host_port().value(), 5173);
///
/// let spec: PortSpec = "3000:8080".parse().unwrap();
/// assert_eq!(spec.container_port().value(), 3000);
/// assert_eq!(spec.host_port().value(), 8080);
///
/// assert!("0".parse::<PortSpec>().is_err());
/// assert!("1:2:3".parse::<PortSpec>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortSpec {
    container_port: Port,
    host_port: Port,
}

impl PortSpec {
    /// The port inside the container.
    #[must_use]
    pub const fn container_port(&self) -> Port {
        self.container_port
    }

    /// The port on the host.
    #[must_use]
    pub const fn host_port(&self) -> Port {
        self.host_port
    }
}

impl FromStr for PortSpec {
    type Err = InvalidPortSpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        fn parse_port(spec: &str, field: &str, value: &str) -> Result<Port, InvalidPortSpecError> {
            let number: u32 = value.parse().map_err(|_| InvalidPortSpecError {
                spec: spec.to_string(),
                reason: format!("{field} '{value}' is not a number"),
            })?;
            if !(u32::from(Port::MIN)..=u32::from(Port::MAX)).contains(&number) {
                return Err(InvalidPortSpecError {
                    spec: spec.to_string(),
                    reason: format!("{field} must be between 1 and 65535"),
                });
            }
            Ok(Port(number as u16))
        }

        if s.contains(':') {
            let fields: Vec<&str> = s.split(':').collect();
            if fields.len() != 2 {
                return Err(InvalidPortSpecError {
                    spec: s.to_string(),
                    reason: "expected exactly PORT or CONTAINER_PORT:HOST_PORT".into(),
                });
            }
            Ok(Self {
                container_port: parse_port(s, "container port", fields[0])?,
                host_port: parse_port(s, "host port", fields[1])?,
            })
        } else {
            let port = parse_port(s, "port", s)?;
            Ok(Self {
                container_port: port,
                host_port: port,
            })
        }
    }
}

/// Error type for unparseable port specifications.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidPortSpecError {
    /// The offending specification string.
    pub spec: String,
    /// Which constraint failed.
    pub reason: String,
}

impl fmt::Display for InvalidPortSpecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid port spec '{}': {}", self.spec, self.reason)
    }
}

impl std::error::Error for InvalidPortSpecError {}

/// The port layout: where SSH ports start, how far apart container slots
/// are, and where the derived service blocks live.
///
/// Slots are spaced `stride` apart starting at `ssh_start`, and each
/// slot's service block is `service_count` wide starting at
/// `service_start + (ssh_port - ssh_start)`. Because the stride is at
/// least as wide as the block, blocks of distinct slots never overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortLayout {
    ssh_start: u16,
    stride: u16,
    service_start: u16,
    service_count: u16,
}

impl PortLayout {
    /// Default first SSH port.
    pub const DEFAULT_SSH_START: u16 = 2200;
    /// Default distance between container slots.
    pub const DEFAULT_STRIDE: u16 = 10;
    /// Default first service port.
    pub const DEFAULT_SERVICE_START: u16 = 8800;
    /// Default number of service ports per container.
    pub const DEFAULT_SERVICE_COUNT: u16 = 10;

    /// Creates a layout after checking its internal consistency.
    ///
    /// # Errors
    ///
    /// Returns an error if any value is zero or if the stride is narrower
    /// than the service block (adjacent blocks would overlap).
    pub fn new(
        ssh_start: u16,
        stride: u16,
        service_start: u16,
        service_count: u16,
    ) -> Result<Self, InvalidLayoutError> {
        if ssh_start == 0 || service_start == 0 {
            return Err(InvalidLayoutError {
                reason: "port bases must be between 1 and 65535".into(),
            });
        }
        if stride == 0 {
            return Err(InvalidLayoutError {
                reason: "stride must be at least 1".into(),
            });
        }
        if service_count == 0 {
            return Err(InvalidLayoutError {
                reason: "service count must be at least 1".into(),
            });
        }
        if stride < service_count {
            return Err(InvalidLayoutError {
                reason: format!(
                    "stride {stride} is narrower than the service block {service_count}: \
                     service ranges of adjacent slots would overlap"
                ),
            });
        }
        Ok(Self {
            ssh_start,
            stride,
            service_start,
            service_count,
        })
    }

    /// First SSH port handed out by the allocator.
    #[must_use]
    pub const fn ssh_start(&self) -> u16 {
        self.ssh_start
    }

    /// Distance between consecutive container slots.
    #[must_use]
    pub const fn stride(&self) -> u16 {
        self.stride
    }

    /// First port of the service block space.
    #[must_use]
    pub const fn service_start(&self) -> u16 {
        self.service_start
    }

    /// Number of service ports derived per container.
    #[must_use]
    pub const fn service_count(&self) -> u16 {
        self.service_count
    }

    /// Derives the service port range for an allocated SSH port.
    ///
    /// The base is `service_start + (ssh_port - ssh_start)` and the range
    /// spans `service_count` ports.
    ///
    /// # Errors
    ///
    /// Returns an error if the SSH port lies below the layout's base or
    /// if the derived range would run past 65535. Ports handed out by the
    /// allocator never trip either case.
    pub fn service_range(&self, ssh_port: Port) -> Result<PortRange, InvalidPortError> {
        let value = ssh_port.value();
        if value < self.ssh_start {
            return Err(InvalidPortError {
                value,
                reason: format!("below the SSH port base {}", self.ssh_start),
            });
        }
        let base = u32::from(self.service_start) + u32::from(value - self.ssh_start);
        let end = base + u32::from(self.service_count) - 1;
        if end > u32::from(Port::MAX) {
            return Err(InvalidPortError {
                value,
                reason: format!("derived service range {base}-{end} runs past 65535"),
            });
        }
        Ok(PortRange {
            min: Port(base as u16),
            max: Port(end as u16),
        })
    }
}

impl Default for PortLayout {
    fn default() -> Self {
        Self {
            ssh_start: Self::DEFAULT_SSH_START,
            stride: Self::DEFAULT_STRIDE,
            service_start: Self::DEFAULT_SERVICE_START,
            service_count: Self::DEFAULT_SERVICE_COUNT,
        }
    }
}

/// Error type for inconsistent port layouts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidLayoutError {
    /// Which consistency rule failed.
    pub reason: String,
}

impl fmt::Display for InvalidLayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid port layout: {}", self.reason)
    }
}

impl std::error::Error for InvalidLayoutError {}
