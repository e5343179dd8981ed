//! Streaming endpoints
//!
//! `start_stream` kicks off a background aggregation job and returns the
//! session id and topic name immediately. `subscribe_stream` upgrades to
//! a WebSocket and forwards each broadcast event as one JSON text frame,
//! closing the socket after the terminal frame.

use crate::api::middleware::bearer_token;
use crate::api::models::{StartStreamRequest, StartStreamResponse};
use crate::core::error::{Result, SetlistError};
use crate::stream::{SessionBroadcaster, SessionId, StreamEvent};
use axum::{
    extract::{
        ws::{Message, WebSocket},
        Path, State, WebSocketUpgrade,
    },
    http::HeaderMap,
    response::{IntoResponse, Response},
    Json,
};
use tokio::sync::broadcast;
use super::AppState;

/// Handler for POST /api/v1/artists/songs/stream - start a streaming job
pub async fn start_stream(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<StartStreamRequest>,
) -> Result<impl IntoResponse> {
    let token = bearer_token(&headers)?;
    let session_id = state.jobs.clone().start(&request.query, &token).await?;

    Ok(Json(StartStreamResponse {
        session_id,
        topic: SessionBroadcaster::topic_name(&session_id),
    }))
}

/// Handler for GET /api/v1/stream/:session_id - subscribe to a session topic
pub async fn subscribe_stream(
    State(state): State<AppState>,
    Path(session_id): Path<SessionId>,
    ws: WebSocketUpgrade,
) -> Result<Response> {
    let receiver = state
        .broadcaster
        .subscribe(&session_id)
        .await
        .ok_or_else(|| {
            SetlistError::NotFound(format!("no open stream session '{}'", session_id))
        })?;

    Ok(ws.on_upgrade(move |socket| forward_events(socket, receiver)))
}

/// Forward broadcast events to the socket until the terminal event
///
/// A lagging receiver has dropped events; that is surfaced to the client
/// as a terminal error frame rather than a silent gap.
async fn forward_events(mut socket: WebSocket, mut receiver: broadcast::Receiver<StreamEvent>) {
    loop {
        match receiver.recv().await {
            Ok(event) => {
                let done = event.done;
                let frame = match serde_json::to_string(&event) {
                    Ok(json) => json,
                    Err(err) => {
                        tracing::error!(error = %err, "failed to serialize stream event");
                        break;
                    }
                };
                if socket.send(Message::Text(frame)).await.is_err() {
                    // Client went away
                    return;
                }
                if done {
                    break;
                }
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "stream subscriber lagged, closing");
                let event = StreamEvent::failed(0, format!("subscriber lagged by {} events", skipped));
                if let Ok(frame) = serde_json::to_string(&event) {
                    let _ = socket.send(Message::Text(frame)).await;
                }
                break;
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }

    let _ = socket.send(Message::Close(None)).await;
}
