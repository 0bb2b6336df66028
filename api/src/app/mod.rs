//! Application layer
//!
//! Contains use cases and service orchestration.
//! Services coordinate between domain entities, ports, and the feed pipeline.

pub mod feed_service;
pub mod idea_service;
pub mod presence_service;
pub mod submission;

pub use feed_service::{Feed, FeedItem, FeedService};
pub use idea_service::IdeaService;
pub use presence_service::{PresenceService, SWEEP_INTERVAL};
pub use submission::{OverflowPolicy, SubmissionPolicy};

/// Current wall-clock time in milliseconds since epoch
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
