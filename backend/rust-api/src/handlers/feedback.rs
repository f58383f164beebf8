use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;
use std::sync::Arc;

use super::{engine_error_status, session_service};
use crate::metrics::FEEDBACK_VOTES_TOTAL;
use crate::models::feedback::{Language, VoteDirection, VoteRequest, VoteResponse};
use crate::services::community_service::CommunityService;
use crate::services::session_service::EngineError;
use crate::services::AppState;

/// One vote per feedback line per session, tracked on the session itself.
/// POST /api/v1/feedback/{id}/vote
pub async fn vote_feedback(
    State(state): State<Arc<AppState>>,
    Path(feedback_id): Path<String>,
    Json(req): Json<VoteRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let community = CommunityService::new(state.mongo.clone());
    if !community.is_persistent() {
        return Err((
            StatusCode::SERVICE_UNAVAILABLE,
            "feedback store is not configured".to_string(),
        ));
    }

    let sessions = session_service(&state);
    let already = sessions
        .has_voted(&req.session_id, &feedback_id)
        .await
        .map_err(|e| (engine_error_status(&e), e.to_string()))?;
    if already {
        let e = EngineError::AlreadyVoted;
        return Err((engine_error_status(&e), e.to_string()));
    }

    match community.vote(&feedback_id, req.direction).await {
        Ok(true) => {
            sessions
                .mark_voted(&req.session_id, &feedback_id)
                .await
                .map_err(|e| (engine_error_status(&e), e.to_string()))?;

            let direction_label = match req.direction {
                VoteDirection::Up => "up",
                VoteDirection::Down => "down",
            };
            FEEDBACK_VOTES_TOTAL
                .with_label_values(&[direction_label])
                .inc();

            Ok((
                StatusCode::OK,
                Json(VoteResponse {
                    feedback_id,
                    recorded: true,
                }),
            ))
        }
        Ok(false) => Err((
            StatusCode::NOT_FOUND,
            "feedback line not found".to_string(),
        )),
        Err(e) => {
            tracing::error!("Failed to record vote: {}", e);
            Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
        }
    }
}

/// GET /api/v1/roast-of-the-day
pub async fn roast_of_the_day(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let community = CommunityService::new(state.mongo.clone());
    (StatusCode::OK, Json(community.roast_of_the_day()))
}

/// GET /api/v1/languages
pub async fn list_languages() -> impl IntoResponse {
    let languages: Vec<_> = Language::ALL
        .iter()
        .map(|language| {
            json!({
                "id": language,
                "name": language.display_name(),
            })
        })
        .collect();

    (StatusCode::OK, Json(json!({ "languages": languages })))
}
