//! Test fixtures
//!
//! Factory functions for creating test data with sensible defaults.

use crate::domain::entities::{IdeaId, IdeaRecord, Snapshot};

/// Fixed "now" for deterministic feed tests (2023-11-14T22:13:20Z)
pub const TEST_NOW: i64 = 1_700_000_000_000;

/// Create a test record with the given text, timestamp and votes
pub fn test_record(text: &str, created_at: i64, likes: u64, dislikes: u64) -> IdeaRecord {
    IdeaRecord {
        author: "Tester".to_string(),
        text: text.to_string(),
        created_at: Some(created_at),
        like_count: likes,
        dislike_count: dislikes,
    }
}

/// Create a test record whose server timestamp has not resolved yet
pub fn test_record_undated(text: &str) -> IdeaRecord {
    IdeaRecord {
        author: "Tester".to_string(),
        text: text.to_string(),
        created_at: None,
        like_count: 0,
        dislike_count: 0,
    }
}

/// Build a snapshot from `(id, record)` pairs
pub fn snapshot_of(entries: Vec<(&str, IdeaRecord)>) -> Snapshot {
    entries
        .into_iter()
        .map(|(id, record)| (IdeaId::from(id), record))
        .collect()
}
