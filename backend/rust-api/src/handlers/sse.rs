use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse,
    },
};
use chrono::Utc;
use futures::stream::{self, Stream};
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

use super::{engine_error_status, session_service};
use crate::metrics::SSE_CONNECTIONS_ACTIVE;
use crate::models::timer::{CountdownEvent, CountdownTick, TimeExpired};
use crate::services::AppState;

/// SSE countdown for the current round. Display-only: the authoritative
/// timeout is the engine's own timer, this stream just mirrors it.
/// GET /api/v1/sessions/{id}/stream
pub async fn session_stream(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    tracing::info!("Client connected to SSE stream: session={}", session_id);

    let service = session_service(&state);
    let snapshot = service
        .get_snapshot(&session_id)
        .await
        .map_err(|e| (engine_error_status(&e), e.to_string()))?;

    let stream = create_countdown_stream(
        session_id,
        snapshot.round,
        snapshot.remaining_seconds,
        snapshot.round_seconds,
    );

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

/// Releases the connection gauge when the stream is dropped, whether it ran
/// to completion or the client disconnected mid-countdown.
struct StreamGuard;

impl Drop for StreamGuard {
    fn drop(&mut self) {
        SSE_CONNECTIONS_ACTIVE.dec();
    }
}

/// Create a stream of countdown events
fn create_countdown_stream(
    session_id: String,
    round: u32,
    remaining_seconds: u32,
    total_seconds: u32,
) -> impl Stream<Item = Result<Event, Infallible>> {
    SSE_CONNECTIONS_ACTIVE.inc();
    stream::unfold(
        (session_id, remaining_seconds, false, StreamGuard),
        move |(sid, remaining, final_sent, guard)| async move {
            if final_sent {
                return None;
            }

            if remaining == 0 {
                // Send final time-expired event once
                let expired_event = CountdownEvent::TimeExpired(TimeExpired {
                    session_id: sid.clone(),
                    round,
                    timestamp: Utc::now(),
                });

                let event = Event::default()
                    .event(expired_event.event_name())
                    .data(expired_event.to_sse_data());

                tracing::info!("Countdown expired: session={}", sid);
                return Some((Ok(event), (sid, 0, true, guard)));
            }

            let tick_event = CountdownEvent::CountdownTick(CountdownTick {
                session_id: sid.clone(),
                round,
                remaining_seconds: remaining,
                total_seconds,
                timestamp: Utc::now(),
            });

            let event = Event::default()
                .event(tick_event.event_name())
                .data(tick_event.to_sse_data());

            // Wait 1 second before next tick
            sleep(Duration::from_secs(1)).await;

            Some((Ok(event), (sid, remaining - 1, false, guard)))
        },
    )
}
