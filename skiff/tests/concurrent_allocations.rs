//! Serialization of concurrent allocation attempts through the lock.
//!
//! True multi-process races need an external harness; these tests
//! simulate concurrent invocations with threads, each taking the
//! exclusive lock around its read-allocate-save sequence, and assert
//! that the lock serializes them into unique assignments.

use std::collections::HashSet;
use std::sync::{Arc, Barrier};

use skiff::{AllocationStore, ContainerName, LockFile, PortAllocator, PortLayout};
use tempfile::TempDir;

#[test]
fn locked_allocations_from_many_threads_never_collide() {
    let dir = TempDir::new().expect("temp dir");
    let store_path = dir.path().join("ports");
    let lock_path = dir.path().join(".lock");

    const WORKERS: usize = 8;
    let barrier = Arc::new(Barrier::new(WORKERS));

    let handles: Vec<_> = (0..WORKERS)
        .map(|worker| {
            let store_path = store_path.clone();
            let lock_path = lock_path.clone();
            let barrier = Arc::clone(&barrier);
            std::thread::spawn(move || {
                let store = AllocationStore::new(store_path);
                let lock = LockFile::new(lock_path);
                let allocator = PortAllocator::new(PortLayout::default());
                let name =
                    ContainerName::new(format!("worker{worker}")).expect("valid name");

                // Maximize contention: everyone races for the lock at
                // once.
                barrier.wait();
                let _guard = lock.exclusive().expect("lock");
                let port = allocator.allocate(&store).expect("allocate");
                store.save(&name, port).expect("save");
                port.value()
            })
        })
        .collect();

    let ports: Vec<u16> = handles
        .into_iter()
        .map(|handle| handle.join().expect("worker thread"))
        .collect();

    let unique: HashSet<_> = ports.iter().collect();
    assert_eq!(unique.len(), WORKERS, "duplicate assignment in {ports:?}");

    for port in &ports {
        assert_eq!((port - 2200) % 10, 0, "off-stride port {port}");
    }
}

#[test]
fn readers_see_consistent_state_between_writers() {
    let dir = TempDir::new().expect("temp dir");
    let store_path = dir.path().join("ports");
    let lock_path = dir.path().join(".lock");

    let writer = {
        let store_path = store_path.clone();
        let lock_path = lock_path.clone();
        std::thread::spawn(move || {
            let store = AllocationStore::new(store_path);
            let lock = LockFile::new(lock_path);
            let allocator = PortAllocator::new(PortLayout::default());
            for k in 0..5u16 {
                let name = ContainerName::new(format!("w{k}")).expect("valid name");
                let _guard = lock.exclusive().expect("lock");
                let port = allocator.allocate(&store).expect("allocate");
                store.save(&name, port).expect("save");
            }
        })
    };

    let reader = std::thread::spawn(move || {
        let store = AllocationStore::new(store_path);
        let lock = LockFile::new(lock_path);
        for _ in 0..20 {
            let _guard = lock.shared().expect("lock");
            let entries = store.entries().expect("read");
            // Every entry a reader observes is fully formed; a torn
            // half-written record would have been skipped and broken
            // the count invariant below.
            let ports: HashSet<u16> =
                entries.iter().map(|(_, port)| port.value()).collect();
            assert_eq!(ports.len(), entries.len());
        }
    });

    writer.join().expect("writer");
    reader.join().expect("reader");
}
