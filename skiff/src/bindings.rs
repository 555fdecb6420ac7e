//! Dynamic port bindings: ad-hoc host-to-container forwards layered on
//! the runtime's proxy devices.
//!
//! The runtime's per-container device list is the only source of truth
//! for bindings; nothing here is persisted by skiff. Identity is encoded
//! in device names: a binding for host port `N` is always the device
//! `skiff-bind-N`, so the name alone recovers the host port and distinct
//! ports can never collide. The static devices wired at container
//! creation (`skiff-ssh`, `skiff-svc-<i>`) use a different prefix and
//! are invisible to every operation in this module.
//!
//! All naming-convention knowledge lives in this file; callers only see
//! typed [`Binding`] values.

use std::fmt;

use log::warn;

use crate::container::ContainerName;
use crate::error::{Error, Result};
use crate::runtime::ContainerRuntime;
use crate::Port;

/// Device name of the static SSH forward created with the container.
pub const SSH_DEVICE: &str = "skiff-ssh";

/// Prefix of dynamic binding device names.
const BINDING_PREFIX: &str = "skiff-bind-";

/// Prefix of the numbered static service forwards.
const SERVICE_PREFIX: &str = "skiff-svc-";

/// Device name of the `index`-th static service forward.
#[must_use]
pub fn service_device(index: u16) -> String {
    format!("{SERVICE_PREFIX}{index}")
}

/// Deterministic device name for the binding on `host_port`.
fn binding_device(host_port: Port) -> String {
    format!("{BINDING_PREFIX}{host_port}")
}

/// Recover the host port from a dynamic binding device name.
fn host_port_of_device(device: &str) -> Option<Port> {
    let suffix = device.strip_prefix(BINDING_PREFIX)?;
    let value: u16 = suffix.parse().ok()?;
    Port::try_from(value).ok()
}

/// Parse the port out of a `scheme:address:port` connect string.
fn port_of_connect(connect: &str) -> Option<Port> {
    let (_, port) = connect.rsplit_once(':')?;
    let value: u16 = port.trim().parse().ok()?;
    Port::try_from(value).ok()
}

/// One dynamic host-to-container port forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Binding {
    /// The listening port on the host.
    pub host_port: Port,
    /// The destination port inside the container.
    pub container_port: Port,
}

/// What a [`BindingManager::rebind`] call actually did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RebindOutcome {
    /// The target already held the binding; nothing changed.
    Unchanged,
    /// The port was unbound everywhere; this was a fresh bind.
    Bound,
    /// The binding was relocated from another container.
    Moved {
        /// The container that previously held the binding.
        from: ContainerName,
    },
}

impl fmt::Display for RebindOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unchanged => write!(f, "already bound"),
            Self::Bound => write!(f, "bound"),
            Self::Moved { from } => write!(f, "moved from '{from}'"),
        }
    }
}

/// Queries and mutates dynamic bindings through the runtime.
///
/// Mutating operations (bind, unbind, rebind) must run under the
/// exclusive lock so that concurrent skiff invocations serialize; the
/// manager itself performs no locking. The lock cannot defend against
/// devices being edited outside this tool.
#[derive(Debug)]
pub struct BindingManager<'a, R: ContainerRuntime> {
    runtime: &'a R,
}

impl<'a, R: ContainerRuntime> BindingManager<'a, R> {
    /// Create a manager over the given runtime.
    pub fn new(runtime: &'a R) -> Self {
        Self { runtime }
    }

    /// List the dynamic bindings on a container.
    ///
    /// Static devices are skipped by prefix. A device with an
    /// unparseable name or connect string is skipped with a warning;
    /// the rest of the listing is still returned.
    ///
    /// # Errors
    ///
    /// Returns an error if the runtime cannot be queried at all.
    pub fn list(&self, container: &ContainerName) -> Result<Vec<Binding>> {
        let mut bindings = Vec::new();
        for device in self.runtime.list_devices(container)? {
            if !device.starts_with(BINDING_PREFIX) {
                continue;
            }
            let Some(host_port) = host_port_of_device(&device) else {
                warn!("skipping binding device with malformed name: {device:?}");
                continue;
            };
            let connect = self.runtime.device_connect(container, &device)?;
            let Some(container_port) = port_of_connect(&connect) else {
                warn!("skipping binding {device:?} with malformed connect target: {connect:?}");
                continue;
            };
            bindings.push(Binding {
                host_port,
                container_port,
            });
        }
        Ok(bindings)
    }

    /// Create a binding forwarding `host_port` to `container_port`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AlreadyBound`] if the container already holds a
    /// binding on this host port, and a runtime error if the device
    /// cannot be added.
    pub fn bind(
        &self,
        container: &ContainerName,
        host_port: Port,
        container_port: Port,
    ) -> Result<()> {
        let device = binding_device(host_port);
        if self.owns(container, &device)? {
            return Err(Error::AlreadyBound {
                container: container.to_string(),
                host_port: host_port.value(),
            });
        }
        self.runtime
            .add_proxy(container, &device, host_port, container_port)
    }

    /// Remove the binding on `host_port`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotBound`] if the container holds no binding on
    /// this host port, and a runtime error if the device cannot be
    /// removed.
    pub fn unbind(&self, container: &ContainerName, host_port: Port) -> Result<()> {
        let device = binding_device(host_port);
        if !self.owns(container, &device)? {
            return Err(Error::NotBound {
                container: container.to_string(),
                host_port: host_port.value(),
            });
        }
        self.runtime.remove_device(container, &device)
    }

    /// Find which container, if any, holds the binding on `host_port`.
    ///
    /// Walks every managed container, so this costs one device-list
    /// query per container. Fine at CLI scale.
    ///
    /// # Errors
    ///
    /// Returns an error if the runtime cannot be queried.
    pub fn find_owner(&self, host_port: Port) -> Result<Option<ContainerName>> {
        let device = binding_device(host_port);
        for info in self.runtime.list()? {
            if self.owns(&info.name, &device)? {
                return Ok(Some(info.name));
            }
        }
        Ok(None)
    }

    /// Move the binding on `host_port` to `target`, creating it if it
    /// exists nowhere.
    ///
    /// If the target already holds the binding this is a no-op. If
    /// another container holds it, that binding is removed first; a
    /// failure there aborts the whole operation, leaving the port where
    /// it was rather than risking two simultaneous forwards.
    ///
    /// The two runtime mutations are not atomic: a crash between the
    /// unbind and the bind leaves the host port unbound everywhere. The
    /// exclusive lock held by the caller serializes skiff's own
    /// invocations; nothing can be done about direct runtime edits.
    ///
    /// # Errors
    ///
    /// Returns a runtime error if the removal or the creation fails.
    pub fn rebind(
        &self,
        target: &ContainerName,
        host_port: Port,
        container_port: Port,
    ) -> Result<RebindOutcome> {
        if self.owns(target, &binding_device(host_port))? {
            return Ok(RebindOutcome::Unchanged);
        }

        match self.find_owner(host_port)? {
            Some(owner) => {
                self.unbind(&owner, host_port)?;
                self.bind(target, host_port, container_port)?;
                Ok(RebindOutcome::Moved { from: owner })
            }
            None => {
                self.bind(target, host_port, container_port)?;
                Ok(RebindOutcome::Bound)
            }
        }
    }

    /// Remove every dynamic binding device from a container.
    ///
    /// Used by the creation path after cloning from a snapshot: the
    /// copy inherits the source's binding devices, which would collide
    /// with the source's live forwards on the host side.
    ///
    /// # Errors
    ///
    /// Returns an error if the device list cannot be read or a device
    /// cannot be removed.
    pub fn strip_all(&self, container: &ContainerName) -> Result<usize> {
        let mut stripped = 0;
        for device in self.runtime.list_devices(container)? {
            if device.starts_with(BINDING_PREFIX) {
                self.runtime.remove_device(container, &device)?;
                stripped += 1;
            }
        }
        Ok(stripped)
    }

    fn owns(&self, container: &ContainerName, device: &str) -> Result<bool> {
        Ok(self
            .runtime
            .list_devices(container)?
            .iter()
            .any(|d| d == device))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::mock::MockRuntime;

    fn name(s: &str) -> ContainerName {
        ContainerName::new(s).unwrap()
    }

    fn port(n: u16) -> Port {
        Port::try_from(n).unwrap()
    }

    #[test]
    fn test_bind_then_list() {
        let runtime = MockRuntime::new();
        runtime.add_container("web");
        let manager = BindingManager::new(&runtime);

        manager.bind(&name("web"), port(5173), port(5173)).unwrap();

        let bindings = manager.list(&name("web")).unwrap();
        assert_eq!(
            bindings,
            vec![Binding {
                host_port: port(5173),
                container_port: port(5173),
            }]
        );
    }

    #[test]
    fn test_double_bind_is_a_conflict() {
        let runtime = MockRuntime::new();
        runtime.add_container("web");
        let manager = BindingManager::new(&runtime);

        manager.bind(&name("web"), port(5173), port(5173)).unwrap();
        let err = manager
            .bind(&name("web"), port(5173), port(8080))
            .unwrap_err();
        assert!(matches!(err, Error::AlreadyBound { host_port: 5173, .. }));
    }

    #[test]
    fn test_unbind_then_unbind_again() {
        let runtime = MockRuntime::new();
        runtime.add_container("web");
        let manager = BindingManager::new(&runtime);

        manager.bind(&name("web"), port(5173), port(5173)).unwrap();
        manager.unbind(&name("web"), port(5173)).unwrap();

        let err = manager.unbind(&name("web"), port(5173)).unwrap_err();
        assert!(matches!(err, Error::NotBound { host_port: 5173, .. }));
        assert!(manager.list(&name("web")).unwrap().is_empty());
    }

    #[test]
    fn test_differing_host_and_container_ports() {
        let runtime = MockRuntime::new();
        runtime.add_container("web");
        let manager = BindingManager::new(&runtime);

        manager.bind(&name("web"), port(8080), port(3000)).unwrap();

        let bindings = manager.list(&name("web")).unwrap();
        assert_eq!(bindings[0].host_port, port(8080));
        assert_eq!(bindings[0].container_port, port(3000));
    }

    #[test]
    fn test_list_skips_static_devices() {
        let runtime = MockRuntime::new();
        runtime.add_container("web");
        runtime.insert_device("web", SSH_DEVICE, "tcp:127.0.0.1:22");
        runtime.insert_device("web", &service_device(0), "tcp:127.0.0.1:8800");
        runtime.insert_device("web", "root", "disk");
        let manager = BindingManager::new(&runtime);

        manager.bind(&name("web"), port(5173), port(5173)).unwrap();

        let bindings = manager.list(&name("web")).unwrap();
        assert_eq!(bindings.len(), 1);
        assert_eq!(bindings[0].host_port, port(5173));
    }

    #[test]
    fn test_list_skips_malformed_binding_devices() {
        let runtime = MockRuntime::new();
        runtime.add_container("web");
        runtime.insert_device("web", "skiff-bind-banana", "tcp:127.0.0.1:80");
        runtime.insert_device("web", "skiff-bind-0", "tcp:127.0.0.1:80");
        runtime.insert_device("web", "skiff-bind-8080", "garbage");
        runtime.insert_device("web", "skiff-bind-5173", "tcp:127.0.0.1:5173");
        let manager = BindingManager::new(&runtime);

        // Only the fully well-formed binding survives the listing.
        let bindings = manager.list(&name("web")).unwrap();
        assert_eq!(bindings.len(), 1);
        assert_eq!(bindings[0].host_port, port(5173));
    }

    #[test]
    fn test_find_owner() {
        let runtime = MockRuntime::new();
        runtime.add_container("web");
        runtime.add_container("db");
        let manager = BindingManager::new(&runtime);

        assert_eq!(manager.find_owner(port(5173)).unwrap(), None);

        manager.bind(&name("db"), port(5173), port(5173)).unwrap();
        assert_eq!(manager.find_owner(port(5173)).unwrap(), Some(name("db")));
    }

    #[test]
    fn test_rebind_when_unbound_anywhere_is_a_fresh_bind() {
        let runtime = MockRuntime::new();
        runtime.add_container("web");
        let manager = BindingManager::new(&runtime);

        let outcome = manager
            .rebind(&name("web"), port(5173), port(5173))
            .unwrap();
        assert_eq!(outcome, RebindOutcome::Bound);
        assert_eq!(manager.list(&name("web")).unwrap().len(), 1);
    }

    #[test]
    fn test_rebind_relocates_between_containers() {
        let runtime = MockRuntime::new();
        runtime.add_container("a");
        runtime.add_container("b");
        let manager = BindingManager::new(&runtime);

        manager.bind(&name("a"), port(5173), port(5173)).unwrap();

        let outcome = manager.rebind(&name("b"), port(5173), port(5173)).unwrap();
        assert_eq!(outcome, RebindOutcome::Moved { from: name("a") });

        assert!(manager.list(&name("a")).unwrap().is_empty());
        assert_eq!(manager.list(&name("b")).unwrap().len(), 1);
        assert_eq!(manager.find_owner(port(5173)).unwrap(), Some(name("b")));
    }

    #[test]
    fn test_rebind_to_current_owner_is_idempotent() {
        let runtime = MockRuntime::new();
        runtime.add_container("web");
        let manager = BindingManager::new(&runtime);

        manager.bind(&name("web"), port(5173), port(5173)).unwrap();
        let outcome = manager
            .rebind(&name("web"), port(5173), port(9999))
            .unwrap();
        assert_eq!(outcome, RebindOutcome::Unchanged);

        // The original container port is untouched.
        let bindings = manager.list(&name("web")).unwrap();
        assert_eq!(bindings[0].container_port, port(5173));
    }

    #[test]
    fn test_rebind_aborts_when_unbind_fails() {
        let runtime = MockRuntime::new();
        runtime.add_container("a");
        runtime.add_container("b");
        let manager = BindingManager::new(&runtime);

        manager.bind(&name("a"), port(5173), port(5173)).unwrap();
        runtime.fail_on("remove_device");

        let err = manager
            .rebind(&name("b"), port(5173), port(5173))
            .unwrap_err();
        assert!(matches!(err, Error::Runtime { .. }));

        // The port stays with its old owner; the new bind was never
        // attempted.
        assert_eq!(manager.find_owner(port(5173)).unwrap(), Some(name("a")));
        assert!(manager.list(&name("b")).unwrap().is_empty());
    }

    #[test]
    fn test_strip_all_removes_only_dynamic_devices() {
        let runtime = MockRuntime::new();
        runtime.add_container("web");
        runtime.insert_device("web", SSH_DEVICE, "tcp:127.0.0.1:22");
        runtime.insert_device("web", "skiff-bind-5173", "tcp:127.0.0.1:5173");
        runtime.insert_device("web", "skiff-bind-8080", "tcp:127.0.0.1:80");
        let manager = BindingManager::new(&runtime);

        let stripped = manager.strip_all(&name("web")).unwrap();
        assert_eq!(stripped, 2);
        assert_eq!(runtime.devices_of("web"), vec![SSH_DEVICE.to_string()]);
    }

    #[test]
    fn test_device_name_round_trip() {
        let device = binding_device(port(5173));
        assert_eq!(device, "skiff-bind-5173");
        assert_eq!(host_port_of_device(&device), Some(port(5173)));
        assert_eq!(host_port_of_device("skiff-ssh"), None);
        assert_eq!(host_port_of_device("skiff-bind-"), None);
    }

    #[test]
    fn test_connect_string_parsing() {
        assert_eq!(port_of_connect("tcp:127.0.0.1:8080"), Some(port(8080)));
        assert_eq!(port_of_connect("tcp:127.0.0.1:0"), None);
        assert_eq!(port_of_connect("nonsense"), None);
    }
}
