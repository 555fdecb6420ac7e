//! Container lifecycle operations.
//!
//! These compose the runtime, the allocation store, and the lock into
//! the two flows with real ordering constraints: creation (allocate,
//! bring the container up, wire its static forwards, persist the record,
//! tear down on failure) and deletion (tear down, drop the record).

pub mod create;
pub mod delete;

pub use create::{create_container, CreateOptions, CreateOutcome, CreateSource};
pub use delete::{delete_container, DeleteOptions};
