//! Record Store port
//!
//! The external collection the board's ideas live in. Implementations are
//! provided by adapters (Firebase Realtime Database, in-memory).

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::watch;

use crate::domain::entities::{IdeaId, NewIdea, Snapshot, Vote};
use crate::error::DomainError;

/// Receiver of full-collection snapshots. Holds the most recent snapshot;
/// `changed()` resolves whenever the store pushes a new one and errors once
/// the subscription has ended.
pub type SnapshotReceiver = watch::Receiver<Arc<Snapshot>>;

/// Key-value collection of idea records
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Read the whole collection once
    async fn snapshot(&self) -> Result<Snapshot, DomainError>;

    /// Write a new record under a freshly generated id. The store assigns the
    /// creation timestamp and starts both counters at zero.
    async fn append(&self, idea: &NewIdea) -> Result<IdeaId, DomainError>;

    /// Atomically increment the counter matching the vote by one
    async fn increment(&self, id: &IdeaId, vote: Vote) -> Result<(), DomainError>;

    /// Subscribe to pushed snapshots of the whole collection
    async fn subscribe(&self) -> Result<SnapshotReceiver, DomainError>;
}
