//! Idea service
//!
//! Handles submissions and votes. Both are single writes against the Record
//! Store; the resulting change reaches readers through the subscription.

use std::sync::Arc;

use crate::app::SubmissionPolicy;
use crate::domain::entities::{IdeaId, Vote};
use crate::domain::ports::RecordStore;
use crate::error::DomainError;

/// Service for writing ideas and votes
pub struct IdeaService<S>
where
    S: RecordStore,
{
    store: Arc<S>,
    policy: SubmissionPolicy,
}

impl<S> IdeaService<S>
where
    S: RecordStore,
{
    pub fn new(store: Arc<S>, policy: SubmissionPolicy) -> Self {
        Self { store, policy }
    }

    pub fn policy(&self) -> &SubmissionPolicy {
        &self.policy
    }

    /// Validate and store a new idea. Nothing is written when validation fails.
    pub async fn submit(&self, author: Option<&str>, text: &str) -> Result<IdeaId, DomainError> {
        let idea = self.policy.validate(author, text)?;
        let id = self.store.append(&idea).await?;

        tracing::info!(idea_id = %id, author = %idea.author, "Idea submitted");
        Ok(id)
    }

    /// Count a like or dislike
    pub async fn vote(&self, id: &IdeaId, vote: Vote) -> Result<(), DomainError> {
        self.store.increment(id, vote).await?;

        tracing::debug!(idea_id = %id, %vote, "Vote counted");
        Ok(())
    }
}
