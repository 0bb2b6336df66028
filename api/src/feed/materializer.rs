//! Feed materializer
//!
//! Turns a raw snapshot of stored ideas into the ordered, freshness-annotated
//! list the board displays. Everything here is a pure function of the
//! snapshot, the filter mode and the caller's clock.

use std::cmp::Reverse;

use serde::Serialize;

use crate::domain::entities::{FilterMode, IdeaId, IdeaRecord, Snapshot};

/// Width of the `today` window
pub const DAY_MS: i64 = 86_400_000;

/// Ideas younger than this are flagged as new
pub const FRESH_WINDOW_MS: i64 = 10_000;

/// A display-ready idea
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdeaView {
    pub id: IdeaId,
    pub author: String,
    pub text: String,
    pub created_at: i64,
    pub like_count: u64,
    pub dislike_count: u64,
    pub is_new: bool,
}

impl IdeaView {
    fn project(id: &IdeaId, record: &IdeaRecord, now: i64) -> Self {
        // Undated records are treated as just created
        let created_at = record.created_at.unwrap_or(now);
        Self {
            id: id.clone(),
            author: record.author.clone(),
            text: record.text.clone(),
            created_at,
            like_count: record.like_count,
            dislike_count: record.dislike_count,
            is_new: is_fresh(created_at, now),
        }
    }

    /// Net score used by the `top` ordering
    pub fn score(&self) -> i64 {
        i64::try_from(self.like_count)
            .unwrap_or(i64::MAX)
            .saturating_sub(i64::try_from(self.dislike_count).unwrap_or(i64::MAX))
    }
}

/// Whether an idea created at `created_at` still counts as new at `now`
pub fn is_fresh(created_at: i64, now: i64) -> bool {
    now.saturating_sub(created_at) < FRESH_WINDOW_MS
}

/// Materialize the feed for a filter mode.
///
/// The snapshot iterates in id order and every sort below is stable, so ties
/// keep ascending id order and the result is deterministic.
pub fn materialize(records: &Snapshot, mode: FilterMode, now: i64) -> Vec<IdeaView> {
    let mut ideas: Vec<IdeaView> = records
        .iter()
        .map(|(id, record)| IdeaView::project(id, record, now))
        .collect();

    match mode {
        FilterMode::Newest => {
            ideas.sort_by_key(|idea| Reverse(idea.created_at));
        }
        FilterMode::Top => {
            ideas.sort_by_key(|idea| Reverse(idea.score()));
        }
        FilterMode::Today => {
            let window_start = now.saturating_sub(DAY_MS);
            ideas.retain(|idea| idea.created_at > window_start);
            ideas.sort_by_key(|idea| Reverse(idea.like_count));
        }
    }

    ideas
}
