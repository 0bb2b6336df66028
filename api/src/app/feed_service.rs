//! Feed service
//!
//! Keeps the latest snapshot pushed by the Record Store and materializes the
//! board feed from it on demand. Callers never wait on the store to render:
//! they always read whatever snapshot arrived last.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::watch;

use crate::domain::entities::{FilterMode, Snapshot};
use crate::domain::ports::{RecordStore, SnapshotReceiver};
use crate::error::DomainError;
use crate::feed::{materialize, IdeaView, RelativeTimeFormatter};

/// Pause before re-subscribing after the store stream ends
const RESUBSCRIBE_DELAY: Duration = Duration::from_secs(5);

/// The materialized board for one filter mode
#[derive(Debug, Clone, Serialize)]
pub struct Feed {
    pub mode: FilterMode,
    /// Number of ideas in the whole collection, regardless of filter
    pub total_ideas: usize,
    pub items: Vec<FeedItem>,
}

/// An idea plus its display-only relative age
#[derive(Debug, Clone, Serialize)]
pub struct FeedItem {
    #[serde(flatten)]
    pub idea: IdeaView,
    /// e.g. "5 min ago"
    pub relative_time: String,
}

/// Service for generating board feeds
pub struct FeedService<S>
where
    S: RecordStore,
{
    store: Arc<S>,
    formatter: RelativeTimeFormatter,
    latest: watch::Sender<Arc<Snapshot>>,
}

impl<S> FeedService<S>
where
    S: RecordStore,
{
    pub fn new(store: Arc<S>, formatter: RelativeTimeFormatter) -> Self {
        let (latest, _) = watch::channel(Arc::new(Snapshot::new()));
        Self {
            store,
            formatter,
            latest,
        }
    }

    /// Replace the cached snapshot with a one-shot read from the store
    pub async fn refresh(&self) -> Result<(), DomainError> {
        let snapshot = self.store.snapshot().await?;
        self.publish(Arc::new(snapshot));
        Ok(())
    }

    /// Receiver that is notified on every new snapshot
    pub fn changes(&self) -> SnapshotReceiver {
        self.latest.subscribe()
    }

    /// Feed for a filter mode, from the cached snapshot
    pub fn feed(&self, mode: FilterMode, now: i64) -> Feed {
        let snapshot = self.latest.borrow().clone();
        self.build_feed(&snapshot, mode, now)
    }

    /// Feed for a filter mode, from an explicit snapshot
    pub fn build_feed(&self, snapshot: &Snapshot, mode: FilterMode, now: i64) -> Feed {
        let items = materialize(snapshot, mode, now)
            .into_iter()
            .map(|idea| FeedItem {
                relative_time: self.formatter.format(Some(idea.created_at), now),
                idea,
            })
            .collect();

        Feed {
            mode,
            total_ideas: snapshot.len(),
            items,
        }
    }

    /// Follow the store's subscription for the lifetime of the process
    pub async fn run(self: Arc<Self>) {
        loop {
            match self.store.subscribe().await {
                Ok(receiver) => {
                    tracing::info!("Subscribed to record store");
                    self.follow(receiver).await;
                    tracing::warn!("Record store subscription ended, re-subscribing");
                }
                Err(e) => {
                    tracing::warn!("Failed to subscribe to record store: {}", e);
                }
            }

            tokio::time::sleep(RESUBSCRIBE_DELAY).await;
        }
    }

    async fn follow(&self, mut receiver: SnapshotReceiver) {
        while receiver.changed().await.is_ok() {
            let snapshot = receiver.borrow_and_update().clone();
            tracing::debug!(ideas = snapshot.len(), "Received snapshot");
            self.publish(snapshot);
        }
    }

    fn publish(&self, snapshot: Arc<Snapshot>) {
        self.latest.send_replace(snapshot);
    }
}
