#![deny(missing_docs, unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! # skiff
//!
//! A library for managing isolated development containers and their
//! port bindings on top of an external container runtime.
//!
//! The core is the port subsystem: a flat-file allocation store guarded
//! by an advisory file lock, a deterministic allocator handing out
//! stride-spaced SSH port slots, the arithmetic derivation of each
//! container's service port block, and a manager for ad-hoc dynamic
//! bindings whose state lives entirely in the runtime's device
//! configuration.
//!
//! ## Core Types
//!
//! - [`Port`], [`PortRange`], [`PortSpec`], [`PortLayout`]: port types,
//!   argument parsing, and the slot layout
//! - [`AllocationStore`] and [`LockFile`]: shared persistent state
//! - [`BindingManager`]: dynamic host-to-container forwards
//! - [`ContainerRuntime`]: the seam to the external runtime
//!
//! ## Examples
//!
//! ```
//! use skiff::{ContainerName, Port, PortLayout, PortSpec};
//!
//! let name = ContainerName::new("web-1").unwrap();
//! assert_eq!(name.as_str(), "web-1");
//!
//! let spec: PortSpec = "3000:8080".parse().unwrap();
//! assert_eq!(spec.host_port().value(), 8080);
//!
//! let layout = PortLayout::default();
//! let range = layout.service_range(Port::try_from(2210).unwrap()).unwrap();
//! assert_eq!(range.min().value(), 8810);
//! ```

pub mod bindings;
pub mod config;
pub mod container;
pub mod error;
pub mod lock;
pub mod logging;
pub mod operations;
pub mod port;
pub mod runtime;
pub mod store;

// Re-export key types at crate root for convenience
pub use bindings::{Binding, BindingManager, RebindOutcome};
pub use config::{Config, ConfigBuilder};
pub use container::{ContainerInfo, ContainerName, ContainerStatus};
pub use error::{Error, Result};
pub use lock::{LockFile, LockGuard};
pub use logging::{init_logger, LogLevel};
pub use operations::{
    create_container, delete_container, CreateOptions, CreateOutcome, CreateSource, DeleteOptions,
};
pub use port::allocator::PortAllocator;
pub use port::{Port, PortLayout, PortRange, PortSpec};
pub use runtime::lxd::LxdRuntime;
pub use runtime::ContainerRuntime;
pub use store::AllocationStore;
