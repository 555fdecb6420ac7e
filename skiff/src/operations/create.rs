//! Container creation.

use log::{info, warn};

use crate::bindings::{service_device, BindingManager, SSH_DEVICE};
use crate::container::ContainerName;
use crate::error::{Error, Result};
use crate::lock::LockFile;
use crate::port::allocator::PortAllocator;
use crate::runtime::ContainerRuntime;
use crate::store::AllocationStore;
use crate::{Port, PortLayout, PortRange};

/// Port inside the container that the static SSH forward targets.
const SSH_CONTAINER_PORT: u16 = 22;

/// Where a new container comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateSource {
    /// Launch a fresh container from an image.
    Image(String),
    /// Copy an existing container or snapshot (`container[/snapshot]`).
    Snapshot(String),
}

/// Options for [`create_container`].
#[derive(Debug, Clone)]
pub struct CreateOptions {
    /// Name of the container to create.
    pub name: ContainerName,
    /// Image or snapshot to create it from.
    pub source: CreateSource,
}

/// Ports assigned to a freshly created container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreateOutcome {
    /// The allocated SSH port.
    pub ssh_port: Port,
    /// The derived service port range.
    pub service_range: PortRange,
}

/// Create a container and assign its ports.
///
/// Holds the exclusive lock across the whole allocate-create-record
/// sequence. The allocation record is written only after the container
/// and its static forwards exist, so a record always describes a real
/// container; conversely, any failure after the container came into
/// being tears it down again (best-effort: a cleanup failure is logged
/// as a warning and does not mask the original error).
///
/// # Errors
///
/// Returns [`Error::NameExists`] if the runtime already knows the name,
/// [`Error::PortExhausted`] when no slot is free, and I/O or runtime
/// errors from the underlying steps.
pub fn create_container<R: ContainerRuntime>(
    runtime: &R,
    store: &AllocationStore,
    lock: &LockFile,
    layout: &PortLayout,
    options: &CreateOptions,
) -> Result<CreateOutcome> {
    let name = &options.name;

    if runtime.exists(name)? {
        return Err(Error::NameExists {
            name: name.to_string(),
        });
    }

    let _guard = lock.exclusive()?;

    // A record left behind by an interrupted delete must not shadow the
    // new allocation.
    if store.get(name)?.is_some() {
        warn!("dropping stale allocation record for '{name}'");
        store.remove(name)?;
    }

    let allocator = PortAllocator::new(*layout);
    let ssh_port = allocator.allocate(store)?;
    let service_range = layout.service_range(ssh_port).map_err(Error::from)?;

    match &options.source {
        CreateSource::Image(image) => runtime.launch(image, name)?,
        CreateSource::Snapshot(source) => runtime.copy(source, name)?,
    }

    // The container exists from here on: every failure path below must
    // tear it down again.
    let wired = wire(runtime, options, layout, ssh_port, service_range)
        .and_then(|()| store.save(name, ssh_port));
    if let Err(err) = wired {
        if let Err(cleanup) = runtime.delete(name, true) {
            warn!("failed to clean up partially created container '{name}': {cleanup}");
        }
        return Err(err);
    }

    info!("created container '{name}' with ssh port {ssh_port}");
    Ok(CreateOutcome {
        ssh_port,
        service_range,
    })
}

fn wire<R: ContainerRuntime>(
    runtime: &R,
    options: &CreateOptions,
    layout: &PortLayout,
    ssh_port: Port,
    service_range: PortRange,
) -> Result<()> {
    let name = &options.name;

    // A copy inherits the source's binding devices; their host ports are
    // still held by the source.
    if matches!(options.source, CreateSource::Snapshot(_)) {
        let stripped = BindingManager::new(runtime).strip_all(name)?;
        if stripped > 0 {
            info!("removed {stripped} inherited binding(s) from '{name}'");
        }
    }

    let ssh_target = Port::try_from(SSH_CONTAINER_PORT).map_err(Error::from)?;
    runtime.add_proxy(name, SSH_DEVICE, ssh_port, ssh_target)?;

    for (index, host_port) in service_range.iter().enumerate() {
        // Inside the container, services listen on the fixed base block;
        // only the host side varies per container.
        let container_port =
            Port::try_from(layout.service_start() + index as u16).map_err(Error::from)?;
        runtime.add_proxy(name, &service_device(index as u16), host_port, container_port)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::mock::MockRuntime;
    use tempfile::TempDir;

    struct Fixture {
        _dir: TempDir,
        store: AllocationStore,
        lock: LockFile,
        layout: PortLayout,
    }

    impl Fixture {
        fn new() -> Self {
            let dir = TempDir::new().unwrap();
            let store = AllocationStore::new(dir.path().join("ports"));
            let lock = LockFile::new(dir.path().join(".lock"));
            Self {
                _dir: dir,
                store,
                lock,
                layout: PortLayout::default(),
            }
        }
    }

    fn name(s: &str) -> ContainerName {
        ContainerName::new(s).unwrap()
    }

    fn image_options(s: &str) -> CreateOptions {
        CreateOptions {
            name: name(s),
            source: CreateSource::Image("ubuntu/22.04".to_string()),
        }
    }

    #[test]
    fn test_create_allocates_wires_and_records() {
        let fx = Fixture::new();
        let runtime = MockRuntime::new();

        let outcome =
            create_container(&runtime, &fx.store, &fx.lock, &fx.layout, &image_options("web"))
                .unwrap();

        assert_eq!(outcome.ssh_port.value(), 2200);
        assert_eq!(outcome.service_range.min().value(), 8800);
        assert_eq!(outcome.service_range.max().value(), 8809);

        // One SSH forward plus ten service forwards.
        let devices = runtime.devices_of("web");
        assert_eq!(devices.len(), 11);
        assert!(devices.contains(&SSH_DEVICE.to_string()));
        assert!(devices.contains(&service_device(0)));
        assert!(devices.contains(&service_device(9)));

        assert_eq!(
            fx.store.get(&name("web")).unwrap(),
            Some(outcome.ssh_port)
        );
    }

    #[test]
    fn test_create_existing_name_is_a_conflict() {
        let fx = Fixture::new();
        let runtime = MockRuntime::new();
        runtime.add_container("web");

        let err =
            create_container(&runtime, &fx.store, &fx.lock, &fx.layout, &image_options("web"))
                .unwrap_err();
        assert!(matches!(err, Error::NameExists { .. }));
    }

    #[test]
    fn test_sequential_creates_get_distinct_slots() {
        let fx = Fixture::new();
        let runtime = MockRuntime::new();

        let first =
            create_container(&runtime, &fx.store, &fx.lock, &fx.layout, &image_options("a"))
                .unwrap();
        let second =
            create_container(&runtime, &fx.store, &fx.lock, &fx.layout, &image_options("b"))
                .unwrap();

        assert_eq!(first.ssh_port.value(), 2200);
        assert_eq!(second.ssh_port.value(), 2210);
    }

    #[test]
    fn test_create_failure_tears_the_container_down() {
        let fx = Fixture::new();
        let runtime = MockRuntime::new();
        runtime.fail_on("add_proxy");

        let err =
            create_container(&runtime, &fx.store, &fx.lock, &fx.layout, &image_options("web"))
                .unwrap_err();
        assert!(matches!(err, Error::Runtime { .. }));

        // Compensation: no container, no record.
        assert!(!runtime.has_container("web"));
        assert_eq!(fx.store.get(&name("web")).unwrap(), None);
    }

    #[test]
    fn test_create_cleanup_failure_does_not_mask_original_error() {
        let fx = Fixture::new();
        let runtime = MockRuntime::new();
        runtime.fail_on("add_proxy");
        runtime.fail_on("delete");

        let err =
            create_container(&runtime, &fx.store, &fx.lock, &fx.layout, &image_options("web"))
                .unwrap_err();
        // The surfaced error is the device failure, not the cleanup one.
        match err {
            Error::Runtime { operation, .. } => assert_eq!(operation, "add_proxy"),
            other => panic!("expected runtime error, got {other}"),
        }
    }

    #[test]
    fn test_clone_strips_inherited_bindings() {
        let fx = Fixture::new();
        let runtime = MockRuntime::new();
        runtime.add_container("base");
        runtime.insert_device("base", "skiff-bind-5173", "tcp:127.0.0.1:5173");

        let options = CreateOptions {
            name: name("web"),
            source: CreateSource::Snapshot("base/snap0".to_string()),
        };
        create_container(&runtime, &fx.store, &fx.lock, &fx.layout, &options).unwrap();

        let devices = runtime.devices_of("web");
        assert!(!devices.iter().any(|d| d.starts_with("skiff-bind-")));
        // The source keeps its own binding.
        assert!(runtime
            .devices_of("base")
            .contains(&"skiff-bind-5173".to_string()));
    }

    #[test]
    fn test_create_drops_stale_record_for_reused_name() {
        let fx = Fixture::new();
        let runtime = MockRuntime::new();

        // Simulate an interrupted delete: record present, container gone.
        fx.store
            .save(&name("web"), Port::try_from(2200).unwrap())
            .unwrap();

        let outcome =
            create_container(&runtime, &fx.store, &fx.lock, &fx.layout, &image_options("web"))
                .unwrap();

        // The stale record no longer shadows the fresh allocation.
        assert_eq!(outcome.ssh_port.value(), 2200);
        assert_eq!(fx.store.entries().unwrap().len(), 1);
    }
}
