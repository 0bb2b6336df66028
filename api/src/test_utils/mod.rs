//! Test utilities
//!
//! Manual mock implementations and test fixtures for unit testing.
//!
//! Happy-path tests use the real `InMemoryRecordStore` adapter; the mocks here
//! cover failure paths that adapter cannot produce.

pub mod fixtures;
pub mod mocks;

pub use fixtures::*;
pub use mocks::*;
