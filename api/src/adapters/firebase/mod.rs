//! Firebase adapter
//!
//! Record Store backed by Firebase Realtime Database: REST for reads and
//! writes, the streaming endpoint for live snapshots.

pub mod client;
pub mod stream;

pub use client::FirebaseRecordStore;
