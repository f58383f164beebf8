use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;

use super::{engine_error_status, session_service};
use crate::models::{CreateSessionRequest, SubmitAnswerRequest};
use crate::services::AppState;

pub async fn create_session(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateSessionRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let language = req.language.unwrap_or_default();
    tracing::info!("Creating session with language={:?}", language);

    let service = session_service(&state);
    let response = service.create_session(language).await;
    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let service = session_service(&state);

    match service.get_snapshot(&session_id).await {
        Ok(snapshot) => Ok((StatusCode::OK, Json(snapshot))),
        Err(e) => Err((engine_error_status(&e), e.to_string())),
    }
}

pub async fn submit_answer(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
    Json(req): Json<SubmitAnswerRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    tracing::info!("Submitting answer for session: {}", session_id);

    let service = session_service(&state);

    match service.submit_answer(&session_id, &req.answer).await {
        Ok(response) => Ok((StatusCode::OK, Json(response))),
        Err(e) => {
            tracing::warn!("Answer rejected for session {}: {}", session_id, e);
            Err((engine_error_status(&e), e.to_string()))
        }
    }
}

pub async fn advance_session(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    tracing::info!("Advancing session: {}", session_id);

    let service = session_service(&state);

    match service.advance_to_next(&session_id).await {
        Ok(response) => Ok((StatusCode::OK, Json(response))),
        Err(e) => Err((engine_error_status(&e), e.to_string())),
    }
}
