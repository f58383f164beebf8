use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use std::sync::Arc;
use validator::Validate;

use super::{engine_error_status, session_service};
use crate::models::leaderboard::SaveScoreRequest;
use crate::services::leaderboard_service::LeaderboardService;
use crate::services::AppState;

pub async fn get_leaderboard(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let service = LeaderboardService::new(state.mongo.clone());
    let board = service.top_scores().await;
    (StatusCode::OK, Json(board))
}

/// Saves the score of an existing session under a chosen display name.
/// The score comes from the engine, never from the client.
pub async fn save_score(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SaveScoreRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    req.validate()
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;

    let sessions = session_service(&state);
    let score = sessions
        .session_score(&req.session_id)
        .await
        .map_err(|e| (engine_error_status(&e), e.to_string()))?;

    let service = LeaderboardService::new(state.mongo.clone());
    if !service.is_persistent() {
        return Err((
            StatusCode::SERVICE_UNAVAILABLE,
            "score store is not configured".to_string(),
        ));
    }

    match service.save_score(&req.player_name, score).await {
        Ok(response) => Ok((StatusCode::CREATED, Json(response))),
        Err(e) => {
            tracing::error!("Failed to save score: {}", e);
            Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
        }
    }
}
