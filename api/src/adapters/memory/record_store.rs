//! In-memory implementation of RecordStore
//!
//! The collection lives inside a `watch` channel, so every write is applied
//! under the channel's lock and pushed to subscribers in one step.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::watch;
use uuid::Uuid;

use crate::app::now_millis;
use crate::domain::entities::{IdeaId, IdeaRecord, NewIdea, Snapshot, Vote};
use crate::domain::ports::{RecordStore, SnapshotReceiver};
use crate::error::DomainError;

type Clock = Arc<dyn Fn() -> i64 + Send + Sync>;

pub struct InMemoryRecordStore {
    records: watch::Sender<Arc<Snapshot>>,
    clock: Clock,
}

impl Default for InMemoryRecordStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        let (records, _) = watch::channel(Arc::new(Snapshot::new()));
        Self {
            records,
            clock: Arc::new(now_millis),
        }
    }
}

#[cfg(test)]
impl InMemoryRecordStore {
    /// Pre-populate with records
    pub fn with_records(self, snapshot: Snapshot) -> Self {
        self.records.send_replace(Arc::new(snapshot));
        self
    }

    /// Use a fixed clock for creation timestamps
    pub fn with_clock(mut self, clock: impl Fn() -> i64 + Send + Sync + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn snapshot(&self) -> Result<Snapshot, DomainError> {
        Ok(self.records.borrow().as_ref().clone())
    }

    async fn append(&self, idea: &NewIdea) -> Result<IdeaId, DomainError> {
        // v7 ids sort by creation time, like Firebase push ids
        let id = IdeaId(Uuid::now_v7().simple().to_string());
        let record = IdeaRecord {
            author: idea.author.clone(),
            text: idea.text.clone(),
            created_at: Some((self.clock)()),
            like_count: 0,
            dislike_count: 0,
        };

        self.records.send_modify(|snapshot| {
            Arc::make_mut(snapshot).insert(id.clone(), record);
        });
        Ok(id)
    }

    async fn increment(&self, id: &IdeaId, vote: Vote) -> Result<(), DomainError> {
        let found = self.records.send_if_modified(|snapshot| {
            if !snapshot.contains_key(id) {
                return false;
            }
            if let Some(record) = Arc::make_mut(snapshot).get_mut(id) {
                match vote {
                    Vote::Like => record.like_count += 1,
                    Vote::Dislike => record.dislike_count += 1,
                }
            }
            true
        });

        if found {
            Ok(())
        } else {
            Err(DomainError::NotFound(format!("Idea {}", id)))
        }
    }

    async fn subscribe(&self) -> Result<SnapshotReceiver, DomainError> {
        let mut receiver = self.records.subscribe();
        // Deliver the current collection as the first notification
        receiver.mark_changed();
        Ok(receiver)
    }
}
