//! HTTP handlers
//!
//! Axum request handlers for the board.

pub mod ideas;
pub mod page;
pub mod presence;
pub mod stream;

pub use ideas::{list_ideas, submit_idea, vote_idea};
pub use page::index;
pub use presence::{get_presence, heartbeat};
pub use stream::stream_feed;
