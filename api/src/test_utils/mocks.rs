//! Mock implementations of port traits

use async_trait::async_trait;

use crate::domain::entities::{IdeaId, NewIdea, Snapshot, Vote};
use crate::domain::ports::{RecordStore, SnapshotReceiver};
use crate::error::DomainError;

// ============================================================================
// Failing Record Store
// ============================================================================

/// A store that is never reachable
#[derive(Default)]
pub struct FailingRecordStore;

fn unreachable_store() -> DomainError {
    DomainError::Store("connection refused".to_string())
}

#[async_trait]
impl RecordStore for FailingRecordStore {
    async fn snapshot(&self) -> Result<Snapshot, DomainError> {
        Err(unreachable_store())
    }

    async fn append(&self, _idea: &NewIdea) -> Result<IdeaId, DomainError> {
        Err(unreachable_store())
    }

    async fn increment(&self, _id: &IdeaId, _vote: Vote) -> Result<(), DomainError> {
        Err(unreachable_store())
    }

    async fn subscribe(&self) -> Result<SnapshotReceiver, DomainError> {
        Err(unreachable_store())
    }
}
