//! Presence handlers

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::app::now_millis;
use crate::domain::ports::RecordStore;
use crate::error::AppError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct HeartbeatRequest {
    pub session_id: String,
}

#[derive(Debug, Serialize)]
pub struct PresenceResponse {
    pub online: usize,
}

/// POST /presence
///
/// Heartbeat from an open page; returns how many sessions are online.
pub async fn heartbeat<S>(
    State(state): State<AppState<S>>,
    Json(body): Json<HeartbeatRequest>,
) -> Result<Json<PresenceResponse>, AppError>
where
    S: RecordStore + 'static,
{
    let online = state
        .presence_service
        .heartbeat(&body.session_id, now_millis())
        .await?;

    Ok(Json(PresenceResponse { online }))
}

/// GET /presence
pub async fn get_presence<S>(State(state): State<AppState<S>>) -> Json<PresenceResponse>
where
    S: RecordStore + 'static,
{
    Json(PresenceResponse {
        online: state.presence_service.online(now_millis()).await,
    })
}
