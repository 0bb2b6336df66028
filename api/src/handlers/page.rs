//! Board page handler

use axum::{
    extract::{Query, State},
    response::Html,
};

use crate::app::now_millis;
use crate::domain::ports::RecordStore;
use crate::error::AppError;
use crate::feed::render_page;
use crate::handlers::ideas::FeedQuery;
use crate::AppState;

/// GET /
///
/// The full board page, pre-rendered with the current feed.
pub async fn index<S>(
    State(state): State<AppState<S>>,
    Query(query): Query<FeedQuery>,
) -> Result<Html<String>, AppError>
where
    S: RecordStore + 'static,
{
    let now = now_millis();
    let feed = state.feed_service.feed(query.mode()?, now);
    let online = state.presence_service.online(now).await;
    let max_text_len = state.idea_service.policy().max_text_len;

    Ok(Html(render_page(&feed, online, max_text_len)))
}
