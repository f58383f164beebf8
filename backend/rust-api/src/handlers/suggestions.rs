use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use validator::Validate;

use super::session_service;
use crate::metrics::SUGGESTIONS_TOTAL;
use crate::models::feedback::FeedbackKind;
use crate::models::suggestion::{
    CreateSuggestionRequest, CreateSuggestionResponse, ListSuggestionsQuery,
};
use crate::services::community_service::CommunityService;
use crate::services::AppState;

pub async fn list_suggestions(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListSuggestionsQuery>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let service = CommunityService::new(state.mongo.clone());

    match service.list_suggestions(query.kind, query.limit).await {
        Ok(suggestions) => Ok((StatusCode::OK, Json(suggestions))),
        Err(e) => {
            tracing::error!("Failed to list suggestions: {}", e);
            Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
        }
    }
}

/// Accepts a community line. Always acknowledged: with no store configured
/// the text still becomes the session's degraded-mode substitute.
pub async fn create_suggestion(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateSuggestionRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    req.validate()
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;

    if let Some(session_id) = &req.session_id {
        let sessions = session_service(&state);
        if let Err(e) = sessions.attach_suggestion(session_id, &req.text).await {
            tracing::debug!("Suggestion not attached to session {}: {}", session_id, e);
        }
    }

    let kind_label = match req.kind {
        FeedbackKind::Roast => "roast",
        FeedbackKind::Compliment => "compliment",
    };
    SUGGESTIONS_TOTAL.with_label_values(&[kind_label]).inc();

    let service = CommunityService::new(state.mongo.clone());
    match service.create_suggestion(req.kind, &req.text).await {
        Ok(id) => {
            let persisted = id.is_some();
            Ok((
                StatusCode::CREATED,
                Json(CreateSuggestionResponse { id, persisted }),
            ))
        }
        Err(e) => {
            tracing::error!("Failed to record suggestion: {}", e);
            Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
        }
    }
}
