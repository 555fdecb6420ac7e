//! The boundary with the external container runtime.
//!
//! Everything skiff knows about containers flows through the
//! [`ContainerRuntime`] trait: existence, status, lifecycle verbs, and
//! the per-container device list that carries port forwards. The
//! production implementation ([`lxd::LxdRuntime`]) shells out to the
//! runtime's CLI; tests substitute an in-memory mock.

use crate::container::{ContainerInfo, ContainerName, ContainerStatus};
use crate::error::{Error, Result};
use crate::Port;

pub mod lxd;

/// Operations skiff needs from the external container runtime.
///
/// All calls are synchronous request/response against the runtime's
/// control plane. The runtime is the system of record for containers and
/// their devices; skiff never caches answers across calls.
pub trait ContainerRuntime {
    /// Enumerate all managed containers with their status.
    fn list(&self) -> Result<Vec<ContainerInfo>>;

    /// Create and start a container from an image.
    fn launch(&self, image: &str, name: &ContainerName) -> Result<()>;

    /// Create a container by copying an existing container or snapshot.
    fn copy(&self, source: &str, name: &ContainerName) -> Result<()>;

    /// Start a stopped container.
    fn start(&self, name: &ContainerName) -> Result<()>;

    /// Stop a running container.
    fn stop(&self, name: &ContainerName, force: bool) -> Result<()>;

    /// Delete a container and all its devices.
    fn delete(&self, name: &ContainerName, force: bool) -> Result<()>;

    /// Names of the devices configured on a container.
    fn list_devices(&self, name: &ContainerName) -> Result<Vec<String>>;

    /// The forwarding target of a device, as a `scheme:address:port`
    /// string.
    fn device_connect(&self, name: &ContainerName, device: &str) -> Result<String>;

    /// Add a proxy device forwarding `host_port` to `container_port`.
    fn add_proxy(
        &self,
        name: &ContainerName,
        device: &str,
        host_port: Port,
        container_port: Port,
    ) -> Result<()>;

    /// Remove a named device.
    fn remove_device(&self, name: &ContainerName, device: &str) -> Result<()>;

    /// Whether a container with this name exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the runtime cannot be queried.
    fn exists(&self, name: &ContainerName) -> Result<bool> {
        Ok(self.list()?.iter().any(|info| &info.name == name))
    }

    /// The status of a named container.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ContainerNotFound`] if the runtime does not know
    /// the name.
    fn status(&self, name: &ContainerName) -> Result<ContainerStatus> {
        self.list()?
            .into_iter()
            .find(|info| &info.name == name)
            .map(|info| info.status)
            .ok_or_else(|| Error::ContainerNotFound {
                name: name.to_string(),
            })
    }
}
