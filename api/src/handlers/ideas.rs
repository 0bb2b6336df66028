//! Idea handlers
//!
//! Endpoints for reading the feed, submitting ideas and voting.
//! Supports content negotiation: Accept: application/json for JSON, otherwise HTML.

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::app::now_millis;
use crate::domain::entities::{FilterMode, IdeaId, Vote};
use crate::domain::ports::RecordStore;
use crate::error::AppError;
use crate::feed::render_feed_html;
use crate::AppState;

/// Check if the client wants JSON response
fn wants_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.contains("application/json"))
        .unwrap_or(false)
}

/// `?filter=` query shared by the feed endpoints
#[derive(Debug, Default, Deserialize)]
pub struct FeedQuery {
    pub filter: Option<String>,
}

impl FeedQuery {
    pub fn mode(&self) -> Result<FilterMode, AppError> {
        match &self.filter {
            Some(filter) => filter.parse().map_err(AppError::BadRequest),
            None => Ok(FilterMode::default()),
        }
    }
}

/// GET /ideas
///
/// Returns the materialized feed.
/// - Accept: application/json → JSON response
/// - Otherwise → HTML fragment (idea cards or the empty-state placeholder)
pub async fn list_ideas<S>(
    State(state): State<AppState<S>>,
    Query(query): Query<FeedQuery>,
    headers: HeaderMap,
) -> Result<Response, AppError>
where
    S: RecordStore + 'static,
{
    let feed = state.feed_service.feed(query.mode()?, now_millis());

    if wants_json(&headers) {
        Ok(Json(feed).into_response())
    } else {
        Ok(Html(render_feed_html(&feed)).into_response())
    }
}

/// Request body for POST /ideas
#[derive(Debug, Deserialize)]
pub struct SubmitIdeaRequest {
    #[serde(default)]
    pub name: Option<String>,
    pub text: String,
}

/// JSON response for write actions
#[derive(Serialize)]
pub struct ActionResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

/// POST /ideas
///
/// Validate and store a new idea.
pub async fn submit_idea<S>(
    State(state): State<AppState<S>>,
    Json(body): Json<SubmitIdeaRequest>,
) -> Result<(StatusCode, Json<ActionResponse>), AppError>
where
    S: RecordStore + 'static,
{
    let id = state
        .idea_service
        .submit(body.name.as_deref(), &body.text)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ActionResponse {
            success: true,
            message: "Idea posted!".to_string(),
            id: Some(id.to_string()),
        }),
    ))
}

/// POST /ideas/:id/:vote
///
/// Count a vote. `vote` is `likes` or `dislikes`.
pub async fn vote_idea<S>(
    State(state): State<AppState<S>>,
    Path((id, vote)): Path<(String, String)>,
) -> Result<Json<ActionResponse>, AppError>
where
    S: RecordStore + 'static,
{
    let id = IdeaId::parse(&id)?;
    let vote: Vote = vote.parse().map_err(AppError::BadRequest)?;

    state.idea_service.vote(&id, vote).await?;

    Ok(Json(ActionResponse {
        success: true,
        message: format!("Counted {} for {}", vote, id),
        id: Some(id.to_string()),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feed_query_defaults_to_newest() {
        assert_eq!(FeedQuery::default().mode().unwrap(), FilterMode::Newest);
    }

    #[test]
    fn feed_query_rejects_unknown_filter() {
        let query = FeedQuery {
            filter: Some("hot".to_string()),
        };
        assert!(matches!(query.mode(), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn wants_json_checks_accept_header() {
        let mut headers = HeaderMap::new();
        assert!(!wants_json(&headers));

        headers.insert(header::ACCEPT, "application/json".parse().unwrap());
        assert!(wants_json(&headers));
    }
}
