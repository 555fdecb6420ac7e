//! Deterministic SSH port allocation.
//!
//! The allocator walks stride-spaced candidates upward from the layout's
//! base until it finds one absent from the store. It holds no state of
//! its own: everything comes from the store contents, so identical store
//! contents always produce the identical result.

use crate::error::{Error, Result};
use crate::store::AllocationStore;
use crate::{Port, PortLayout};

/// Stateless port allocator over an [`AllocationStore`].
///
/// Callers must hold the exclusive lock across the read-allocate-save
/// sequence; the allocator itself performs no locking.
#[derive(Debug, Clone, Copy)]
pub struct PortAllocator {
    layout: PortLayout,
}

impl PortAllocator {
    /// Create an allocator for the given layout.
    #[must_use]
    pub const fn new(layout: PortLayout) -> Self {
        Self { layout }
    }

    /// The layout this allocator hands slots out of.
    #[must_use]
    pub const fn layout(&self) -> &PortLayout {
        &self.layout
    }

    /// Find the lowest free SSH port slot.
    ///
    /// Malformed store lines are skipped by the store's read path; they
    /// never block allocation.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PortExhausted`] when no candidate at or below
    /// 65535 is free (or the derived service range of the next free
    /// candidate would run past 65535), and an I/O error if the store
    /// cannot be read.
    pub fn allocate(&self, store: &AllocationStore) -> Result<Port> {
        let taken = store.allocated_ports()?;

        let exhausted = || Error::PortExhausted {
            start: self.layout.ssh_start(),
            stride: self.layout.stride(),
        };

        let mut candidate = u32::from(self.layout.ssh_start());
        loop {
            if candidate > u32::from(Port::MAX) {
                return Err(exhausted());
            }
            let value = candidate as u16;
            if !taken.contains(&value) {
                let port = Port::try_from(value).map_err(Error::from)?;
                // Higher candidates derive even higher service ranges, so
                // a range that no longer fits means the space is spent.
                if self.layout.service_range(port).is_err() {
                    return Err(exhausted());
                }
                return Ok(port);
            }
            candidate += u32::from(self.layout.stride());
        }
    }
}
