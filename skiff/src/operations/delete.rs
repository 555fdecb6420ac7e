//! Container deletion.

use log::info;

use crate::container::ContainerName;
use crate::error::{Error, Result};
use crate::lock::LockFile;
use crate::runtime::ContainerRuntime;
use crate::store::AllocationStore;

/// Options for [`delete_container`].
#[derive(Debug, Clone)]
pub struct DeleteOptions {
    /// Name of the container to delete.
    pub name: ContainerName,
    /// Delete even if the container is running.
    pub force: bool,
}

/// Delete a container and release its port slot.
///
/// Deleting the container discards its devices, dynamic bindings
/// included; only the allocation record needs explicit removal. If the
/// runtime no longer knows the name but a record remains (an interrupted
/// earlier delete), the record alone is cleaned up.
///
/// # Errors
///
/// Returns [`Error::ContainerNotFound`] if neither the runtime nor the
/// store knows the name; runtime errors abort before the record is
/// touched, so a failed delete never orphans the port slot.
pub fn delete_container<R: ContainerRuntime>(
    runtime: &R,
    store: &AllocationStore,
    lock: &LockFile,
    options: &DeleteOptions,
) -> Result<()> {
    let name = &options.name;
    let exists = runtime.exists(name)?;

    let _guard = lock.exclusive()?;

    if !exists && store.get(name)?.is_none() {
        return Err(Error::ContainerNotFound {
            name: name.to_string(),
        });
    }

    if exists {
        runtime.delete(name, options.force)?;
    }
    store.remove(name)?;

    info!("deleted container '{name}'");
    Ok(())
}
