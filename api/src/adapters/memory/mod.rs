//! In-memory adapter
//!
//! Process-local Record Store for development and tests.

pub mod record_store;

pub use record_store::InMemoryRecordStore;
