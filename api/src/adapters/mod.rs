//! Adapters layer
//!
//! Implementations of port traits for external systems.

pub mod firebase;
pub mod memory;

pub use firebase::FirebaseRecordStore;
pub use memory::InMemoryRecordStore;
