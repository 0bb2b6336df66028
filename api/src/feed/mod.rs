//! Feed module
//!
//! The feed materialization pipeline and its HTML rendering.

pub mod materializer;
pub mod renderer;
pub mod time_format;

pub use materializer::{materialize, IdeaView};
pub use renderer::{render_feed_html, render_page, FeedUpdate};
pub use time_format::RelativeTimeFormatter;
